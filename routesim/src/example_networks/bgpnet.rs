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

//! # BGP Network

use super::ExampleNetwork;
use crate::netsim::{AsType, LinkSubtype::Ethernet, Network, NodeSubtype::Router};
use crate::routing::bgp::BgpSessionType::*;

/// # BgpNet
///
/// Three routers in a chain, all in the RIP domain `igp`. `r1` and `r2` form the BGP AS `as100`,
/// `r3` the BGP AS `as200`.
///
/// ```text
///   r1 ---- r2 ---- r3
///    (iBGP)   (eBGP)
/// ```
///
/// Weights: `r1` assigns 200 to routes from `r2`, `r2` assigns 200 to routes from `r1` and 100 to
/// routes from `r3`, and `r3` assigns 100 to routes from `r2`.
///
/// # Variant 0
/// As described above.
///
/// # Variant 1
/// `r1` assigns weight 0 to routes from `r2`.
pub struct BgpNet {}

impl ExampleNetwork for BgpNet {
    fn net(variant: usize) -> Network {
        if variant > 1 {
            panic!("Invalid variant number");
        }
        let mut net = Network::new();
        let r1 = net.create_node("r1", Router);
        let r2 = net.create_node("r2", Router);
        let r3 = net.create_node("r3", Router);
        let l12 = net.create_link(Ethernet, r1, r2).unwrap();
        let l23 = net.create_link(Ethernet, r2, r3).unwrap();

        let igp = net.create_as(AsType::Rip, "igp").unwrap();
        net.add_to_as(igp, vec![r1.into(), r2.into(), r3.into(), l12.into(), l23.into()])
            .unwrap();
        let as100 = net.create_as(AsType::Bgp, "as100").unwrap();
        net.add_to_as(as100, vec![r1.into(), r2.into()]).unwrap();
        let as200 = net.create_as(AsType::Bgp, "as200").unwrap();
        net.add_to_as(as200, vec![r3.into()]).unwrap();

        let p12 = net.create_bgp_peering(r1, r2, IBgp).unwrap();
        let p23 = net.create_bgp_peering(r2, r3, EBgp).unwrap();
        net.set_bgp_weight(p12, r1, if variant == 1 { 0 } else { 200 }).unwrap();
        net.set_bgp_weight(p12, r2, 200).unwrap();
        net.set_bgp_weight(p23, r2, 100).unwrap();
        net.set_bgp_weight(p23, r3, 100).unwrap();

        net
    }
}
