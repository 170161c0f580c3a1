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

//! # Minimum Spanning Tree
//!
//! Kruskal's algorithm over an explicit subset of nodes. Only links with both endpoints in the
//! subset are considered. Links are processed by ascending cost, and equal costs by ascending link
//! id. The cost of a link is the lower cost of its two directions.

use crate::algorithms::CostGraph;
use crate::netsim::{ExclusionSet, LinkId, LinkWeight, NodeId};
use itertools::Itertools;
use ordered_float::NotNan;
use petgraph::unionfind::UnionFind;
use std::collections::{BTreeMap, BTreeSet};

/// Returns the links of a minimum spanning forest of the subgraph induced by `nodes`, in the order
/// they were chosen.
pub fn kruskal(
    graph: &CostGraph,
    nodes: &BTreeSet<NodeId>,
    exclusions: &ExclusionSet,
) -> Vec<LinkId> {
    let mut links: BTreeMap<LinkId, (NodeId, NodeId, LinkWeight)> = BTreeMap::new();
    for (id, from, to, arc) in graph.arcs() {
        if !nodes.contains(&from)
            || !nodes.contains(&to)
            || !arc.cost.is_finite()
            || !graph.is_allowed(id, exclusions)
        {
            continue;
        }
        let entry = links.entry(arc.link).or_insert((from, to, arc.cost));
        entry.2 = entry.2.min(arc.cost);
    }

    let mut forest: UnionFind<usize> = UnionFind::new(graph.node_bound());
    links
        .into_iter()
        .filter_map(|(link, (a, b, cost))| NotNan::new(cost).ok().map(|c| (c, link, a, b)))
        .sorted()
        .filter(|(_, _, a, b)| forest.union(a.index(), b.index()))
        .map(|(_, link, _, _)| link)
        .collect()
}
