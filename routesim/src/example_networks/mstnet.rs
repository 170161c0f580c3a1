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

//! # MST Network

use super::ExampleNetwork;
use crate::netsim::{LinkSubtype::Ethernet, Network, NodeSubtype::Router};

/// # MstNet
///
/// Four nodes and five links with symmetric costs 1, 2, 2, 4 and 4. Every minimum spanning tree
/// has the costs {1, 2, 4}.
///
/// ```text
///       1
///   a ----- b
///    \     / \
///    2\  2/   \4
///      \ /     \
///       c ----- d
///           4
/// ```
///
/// Links: `a-b: 1`, `b-c: 2`, `a-c: 2`, `c-d: 4`, `b-d: 4`.
pub struct MstNet {}

impl ExampleNetwork for MstNet {
    fn net(variant: usize) -> Network {
        if variant != 0 {
            panic!("Invalid variant number");
        }
        let mut net = Network::new();
        let a = net.create_node("a", Router);
        let b = net.create_node("b", Router);
        let c = net.create_node("c", Router);
        let d = net.create_node("d", Router);

        for (x, y, cost) in vec![(a, b, 1.0), (b, c, 2.0), (a, c, 2.0), (c, d, 4.0), (b, d, 4.0)] {
            let link = net.create_link(Ethernet, x, y).unwrap();
            net.set_cost_toward(link, x, cost).unwrap();
            net.set_cost_toward(link, y, cost).unwrap();
        }

        net
    }
}
