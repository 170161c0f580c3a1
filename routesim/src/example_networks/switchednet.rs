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

//! # Switched Network

use super::ExampleNetwork;
use crate::netsim::{default_route, AsType, LinkSubtype::Ethernet, Network, NodeSubtype::*};
use std::net::Ipv4Addr;

/// # SwitchedNet
///
/// Three routers attached to the switch `s1`, and a fourth router behind `r3`. All nodes and
/// links are in the OSPF domain `igp`.
///
/// ```text
///   r1 ---+
///         |
///   r2 -- s1 -- r3 ---- r4
/// ```
///
/// After address allocation, the segment of `s1` gets one `/24`, and automatic layer-3 virtual
/// connections connect `r1`, `r2` and `r3` pairwise.
///
/// # Variant 0
/// As described above.
///
/// # Variant 1
/// `r4` is not a member of `igp`. It reaches the rest of the network over a static default route
/// toward the address of `r3` on the link `r3-r4` (`10.0.0.1`, the first transfer network).
pub struct SwitchedNet {}

impl ExampleNetwork for SwitchedNet {
    fn net(variant: usize) -> Network {
        if variant > 1 {
            panic!("Invalid variant number");
        }
        let mut net = Network::new();
        let r1 = net.create_node("r1", Router);
        let r2 = net.create_node("r2", Router);
        let r3 = net.create_node("r3", Router);
        let r4 = net.create_node("r4", Router);
        let s1 = net.create_node("s1", Switch);
        let l1 = net.create_link(Ethernet, r1, s1).unwrap();
        let l2 = net.create_link(Ethernet, r2, s1).unwrap();
        let l3 = net.create_link(Ethernet, r3, s1).unwrap();
        let l34 = net.create_link(Ethernet, r3, r4).unwrap();

        let igp = net.create_as(AsType::Ospf, "igp").unwrap();
        net.add_to_as(igp, vec![r1.into(), r2.into(), r3.into(), s1.into()]).unwrap();
        net.add_to_as(igp, vec![l1.into(), l2.into(), l3.into(), l34.into()]).unwrap();
        if variant == 0 {
            net.add_to_as(igp, vec![r4.into()]).unwrap();
        } else {
            net.add_static_route(r4, default_route(), Ipv4Addr::new(10, 0, 0, 1)).unwrap();
        }

        net
    }
}
