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

//! # Flow Network

use super::ExampleNetwork;
use crate::netsim::{LinkSubtype::Ethernet, Network, NodeSubtype::Router};

/// # FlowNet
///
/// Directed capacity network with a maximum flow of 19 from `s` to `t`. Every link only has
/// capacity in one direction, the reverse direction has capacity 0. All costs are 1.
///
/// ```text
///        10       4        10
///    s ----> 1 ----> 3 ------> t
///    |       | \     ^         ^
///  10|      2|  \8   |6        |10
///    v       v   v   |         |
///    +-----> 2 ----> 4 --------+
///             9
/// ```
pub struct FlowNet {}

impl ExampleNetwork for FlowNet {
    fn net(variant: usize) -> Network {
        if variant != 0 {
            panic!("Invalid variant number");
        }
        let mut net = Network::new();
        let s = net.create_node("s", Router);
        let n1 = net.create_node("1", Router);
        let n2 = net.create_node("2", Router);
        let n3 = net.create_node("3", Router);
        let n4 = net.create_node("4", Router);
        let t = net.create_node("t", Router);

        for (a, b, capacity) in vec![
            (s, n1, 10.0),
            (s, n2, 10.0),
            (n1, n2, 2.0),
            (n1, n3, 4.0),
            (n1, n4, 8.0),
            (n2, n4, 9.0),
            (n4, n3, 6.0),
            (n3, t, 10.0),
            (n4, t, 10.0),
        ] {
            let link = net.create_link(Ethernet, a, b).unwrap();
            net.set_capacity_toward(link, a, capacity).unwrap();
            net.set_capacity_toward(link, b, 0.0).unwrap();
        }

        net
    }
}
