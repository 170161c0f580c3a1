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

//! # Shortest Path Network

use super::ExampleNetwork;
use crate::netsim::{LinkSubtype::Ethernet, Network, NodeSubtype::Router};

/// # PathNet
///
/// Six routers with symmetric link costs, such that the shortest paths between the pairs
/// `(a, f)`, `(b, e)` and `(a, d)` are unique:
///
/// - `a -> f`: `a b c d e f`, cost 9
/// - `b -> e`: `b c d e`, cost 4
/// - `a -> d`: `a b c d`, cost 5
///
/// Links: `a-b: 2`, `a-c: 5`, `b-c: 1`, `b-d: 6`, `c-d: 2`, `c-e: 7`, `d-e: 1`, `d-f: 8`,
/// `e-f: 3`.
pub struct PathNet {}

impl ExampleNetwork for PathNet {
    fn net(variant: usize) -> Network {
        if variant != 0 {
            panic!("Invalid variant number");
        }
        let mut net = Network::new();
        let a = net.create_node("a", Router);
        let b = net.create_node("b", Router);
        let c = net.create_node("c", Router);
        let d = net.create_node("d", Router);
        let e = net.create_node("e", Router);
        let f = net.create_node("f", Router);

        for (x, y, cost) in vec![
            (a, b, 2.0),
            (a, c, 5.0),
            (b, c, 1.0),
            (b, d, 6.0),
            (c, d, 2.0),
            (c, e, 7.0),
            (d, e, 1.0),
            (d, f, 8.0),
            (e, f, 3.0),
        ] {
            let link = net.create_link(Ethernet, x, y).unwrap();
            net.set_cost_toward(link, x, cost).unwrap();
            net.set_cost_toward(link, y, cost).unwrap();
        }

        net
    }
}
