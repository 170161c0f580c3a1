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

//! # Spanning Tree
//!
//! Root election and forwarding tree of a spanning tree domain. The root bridge is the member
//! with the lowest `(priority, node id)`. The tree is the shortest-path tree from the root, where
//! every link costs 1. Equal-cost alternatives are resolved by the lowest link id.

use crate::netsim::{AutonomousSystem, ExclusionSet, LinkId, LinkSubtype, NodeId, Topology};
use std::collections::{BTreeSet, HashSet, VecDeque};

/// Compute the root bridge and the links in forwarding state of the domain.
pub fn spanning_tree(
    topology: &Topology,
    domain: &AutonomousSystem,
    exclusions: &ExclusionSet,
) -> (Option<NodeId>, BTreeSet<LinkId>) {
    let mut tree = BTreeSet::new();
    let root = domain
        .nodes()
        .iter()
        .filter(|n| !exclusions.contains_node(**n))
        .filter_map(|n| topology.get_node(*n).ok())
        .map(|n| (n.as_properties(domain.as_id()).priority, n.node_id()))
        .min()
        .map(|(_, n)| n);
    let root = match root {
        Some(root) => root,
        None => return (None, tree),
    };

    // with unit costs, the breadth-first order is the Dijkstra order.
    let mut seen: HashSet<NodeId> = HashSet::new();
    let mut queue: VecDeque<NodeId> = VecDeque::new();
    seen.insert(root);
    queue.push_back(root);
    while let Some(node) = queue.pop_front() {
        for (neighbor, link) in topology.neighbors(node, &LinkSubtype::PHYSICAL) {
            if seen.contains(&neighbor)
                || !domain.nodes().contains(&neighbor)
                || !domain.links().contains(&link)
                || !topology.is_usable(link, exclusions)
            {
                continue;
            }
            seen.insert(neighbor);
            tree.insert(link);
            queue.push_back(neighbor);
        }
    }
    (Some(root), tree)
}
