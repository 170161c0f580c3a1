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

//! # Random Networks
//!
//! Seeded random topologies, used to compare the graph algorithms against each other. The same
//! seed always produces the same network.

use crate::netsim::{LinkSubtype::Ethernet, Network, NetworkError, NodeId, NodeSubtype::Router};
use rand::prelude::*;

/// Parameters of a random network
#[derive(Debug, Clone, PartialEq)]
pub struct RandomNetParams {
    /// Number of routers
    pub n_nodes: usize,
    /// Number of links added on top of the random spanning tree
    pub n_extra_links: usize,
    /// Link costs are drawn uniformly from `1..=max_cost`, for each direction separately.
    pub max_cost: u32,
    /// Link capacities are drawn uniformly from `1..=max_capacity`, for each direction separately.
    pub max_capacity: u32,
}

impl Default for RandomNetParams {
    fn default() -> Self {
        Self { n_nodes: 10, n_extra_links: 10, max_cost: 10, max_capacity: 20 }
    }
}

/// Generate a connected random network. Every node `i > 0` is connected to one random node `j <
/// i`, which makes the network connected. Then, the extra links are placed between random pairs
/// of distinct nodes.
pub fn random_net(params: &RandomNetParams, seed: u64) -> Result<Network, NetworkError> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut net = Network::new();
    let nodes: Vec<NodeId> =
        (0..params.n_nodes).map(|i| net.create_node(format!("n{}", i), Router)).collect();

    let mut pairs: Vec<(NodeId, NodeId)> = Vec::new();
    for i in 1..nodes.len() {
        pairs.push((nodes[rng.gen_range(0..i)], nodes[i]));
    }
    if nodes.len() > 1 {
        for _ in 0..params.n_extra_links {
            let mut chosen = nodes.choose_multiple(&mut rng, 2);
            if let (Some(a), Some(b)) = (chosen.next(), chosen.next()) {
                pairs.push((*a, *b));
            }
        }
    }

    for (a, b) in pairs {
        let link = net.create_link(Ethernet, a, b)?;
        for node in [a, b] {
            net.set_cost_toward(link, node, rng.gen_range(1..=params.max_cost.max(1)) as f64)?;
            net.set_capacity_toward(
                link,
                node,
                rng.gen_range(1..=params.max_capacity.max(1)) as f64,
            )?;
        }
    }

    Ok(net)
}
