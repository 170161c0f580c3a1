// RouteSim: Network Topology and Routing Simulator
// Copyright (C) 2021  Tibor Schneider
//
// This program is free software; you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation; either version 2 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along
// with this program; if not, write to the Free Software Foundation, Inc.,
// 51 Franklin Street, Fifth Floor, Boston, MA 02110-1301 USA.

//! # Multi-Area Network

use super::ExampleNetwork;
use crate::netsim::{AsType, LinkSubtype::Ethernet, Network, NodeSubtype::Router};

/// # AreaNet
///
/// Five routers in a chain, split into two areas connected over the backbone:
///
/// ```text
///   r1 ---- r2 ---- r3 ---- r4 ---- r5
///   | area1 |   backbone    | area2 |
/// ```
///
/// # Variant 0
/// OSPF domain `igp`. The links `r1-r2` and `r4-r5` are in `area1` and `area2`, the links `r2-r3`
/// and `r3-r4` in the backbone. `r2` and `r4` become area border routers.
///
/// # Variant 1
/// IS-IS domain `igp`. `r1` and `r2` are in `area1`, `r3` in the backbone, and `r4` and `r5` in
/// `area2`. The links `r2-r3` and `r3-r4` connect different areas, they become backbone links and
/// `r2`, `r3` and `r4` become border routers. `r1` and `r5` are level-1 routers.
pub struct AreaNet {}

impl ExampleNetwork for AreaNet {
    fn net(variant: usize) -> Network {
        let mut net = Network::new();
        let r1 = net.create_node("r1", Router);
        let r2 = net.create_node("r2", Router);
        let r3 = net.create_node("r3", Router);
        let r4 = net.create_node("r4", Router);
        let r5 = net.create_node("r5", Router);
        let l12 = net.create_link(Ethernet, r1, r2).unwrap();
        let l23 = net.create_link(Ethernet, r2, r3).unwrap();
        let l34 = net.create_link(Ethernet, r3, r4).unwrap();
        let l45 = net.create_link(Ethernet, r4, r5).unwrap();

        let as_type = match variant {
            0 => AsType::Ospf,
            1 => AsType::Isis,
            _ => panic!("Invalid variant number"),
        };
        let igp = net.create_as(as_type, "igp").unwrap();
        net.add_to_as(
            igp,
            vec![
                r1.into(),
                r2.into(),
                r3.into(),
                r4.into(),
                r5.into(),
                l12.into(),
                l23.into(),
                l34.into(),
                l45.into(),
            ],
        )
        .unwrap();
        let area1 = net.create_area(igp, "area1").unwrap();
        let area2 = net.create_area(igp, "area2").unwrap();

        if variant == 0 {
            net.add_to_area(igp, area1, vec![l12.into()]).unwrap();
            net.add_to_area(igp, area2, vec![l45.into()]).unwrap();
        } else {
            net.add_to_area(igp, area1, vec![r1.into(), r2.into()]).unwrap();
            net.add_to_area(igp, area2, vec![r4.into(), r5.into()]).unwrap();
        }
        net.update_as_topology().unwrap();

        net
    }
}
