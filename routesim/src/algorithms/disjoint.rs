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

//! # Link-Disjoint Path Pairs
//!
//! Two algorithms searching for a pair of paths from a source to a target, that do not share any
//! link, with minimal total cost. Both compute a first shortest path, modify the costs of a
//! private copy of the graph, search a second path on the modified graph, and combine both paths
//! by removing the links traversed in opposite directions (the symmetric difference).
//!
//! - **Bhandari**: The arcs of the first path are removed, and their reverse arcs get the negated
//!   cost (`-1` on unit-cost graphs). The second path is found by Bellman-Ford.
//! - **Suurbale**: All arcs are reweighted by the distances of the first Dijkstra run,
//!   `cost(a, b) - dist(b) + dist(a)`, such that the tree arcs cost zero. The arcs of the first
//!   path are removed, their reverse arcs cost zero, and the second path is found by A*.

use crate::algorithms::shortest_path::{
    a_star, bellman_ford, dijkstra, BellmanFord, BellmanFordMode,
};
use crate::algorithms::{ArcId, CostGraph, Path, PathConstraints};
use crate::netsim::{ExclusionSet, LinkId, LinkWeight, NodeId};
use std::collections::{BTreeMap, HashSet};

/// Algorithm used by [`disjoint_pair`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DisjointPairAlgorithm {
    /// Bhandari's algorithm
    Bhandari,
    /// Suurbale's algorithm
    Suurbale,
}

/// Search two link-disjoint paths from `source` to `target`. Returns `None` if no such pair
/// exists. The cheaper path is returned first.
pub fn disjoint_pair(
    graph: &CostGraph,
    source: NodeId,
    target: NodeId,
    algorithm: DisjointPairAlgorithm,
    exclusions: &ExclusionSet,
) -> Option<(Path, Path)> {
    match algorithm {
        DisjointPairAlgorithm::Bhandari => bhandari(graph, source, target, exclusions),
        DisjointPairAlgorithm::Suurbale => suurbale(graph, source, target, exclusions),
    }
}

/// Bhandari's algorithm
pub fn bhandari(
    graph: &CostGraph,
    source: NodeId,
    target: NodeId,
    exclusions: &ExclusionSet,
) -> Option<(Path, Path)> {
    if source == target {
        return None;
    }
    let constraints = PathConstraints::with_exclusions(exclusions.clone());
    let first = a_star(graph, source, target, &constraints);
    if first.is_empty() {
        return None;
    }
    let mut modified = graph.clone();
    for arc in first.arcs.iter() {
        let cost = graph.cost(*arc);
        modified.set_cost(*arc, LinkWeight::INFINITY);
        if let Some(rev) = graph.reverse_arc(*arc) {
            modified.set_cost(rev, -cost);
        }
    }
    let second = match bellman_ford(&modified, source, target, &constraints, BellmanFordMode::Path)
    {
        BellmanFord::Path(p) => p,
        _ => return None,
    };
    combine(graph, source, target, &first, &second)
}

/// Suurbale's algorithm
pub fn suurbale(
    graph: &CostGraph,
    source: NodeId,
    target: NodeId,
    exclusions: &ExclusionSet,
) -> Option<(Path, Path)> {
    if source == target {
        return None;
    }
    let tree = dijkstra(graph, source, exclusions);
    let first = tree.path_to(graph, target);
    if first.is_empty() {
        return None;
    }
    let mut modified = graph.clone();
    for (arc, from, to, data) in graph.arcs() {
        if let (Some(d_from), Some(d_to)) = (tree.distance(from), tree.distance(to)) {
            modified.set_cost(arc, (data.cost - d_to + d_from).max(0.0));
        }
    }
    for arc in first.arcs.iter() {
        modified.set_cost(*arc, LinkWeight::INFINITY);
        if let Some(rev) = graph.reverse_arc(*arc) {
            modified.set_cost(rev, 0.0);
        }
    }
    let second =
        a_star(&modified, source, target, &PathConstraints::with_exclusions(exclusions.clone()));
    if second.is_empty() {
        return None;
    }
    combine(graph, source, target, &first, &second)
}

/// Remove all links that the two paths traverse in opposite directions, and decompose the
/// remaining arcs into two paths.
fn combine(
    graph: &CostGraph,
    source: NodeId,
    target: NodeId,
    first: &Path,
    second: &Path,
) -> Option<(Path, Path)> {
    let second_links: HashSet<LinkId> = second.links.iter().copied().collect();
    let first_links: HashSet<LinkId> = first.links.iter().copied().collect();
    let mut remaining: Vec<ArcId> = first
        .arcs
        .iter()
        .zip(first.links.iter())
        .filter(|(_, l)| !second_links.contains(l))
        .map(|(a, _)| *a)
        .collect();
    remaining.extend(
        second
            .arcs
            .iter()
            .zip(second.links.iter())
            .filter(|(_, l)| !first_links.contains(l))
            .map(|(a, _)| *a),
    );

    let mut outgoing: BTreeMap<NodeId, Vec<ArcId>> = BTreeMap::new();
    for arc in remaining {
        if let Some((from, _, _)) = graph.arc(arc) {
            outgoing.entry(from).or_insert_with(Vec::new).push(arc);
        }
    }

    let mut paths = Vec::with_capacity(2);
    for _ in 0..2 {
        let mut arcs: Vec<ArcId> = Vec::new();
        let mut nodes: Vec<NodeId> = vec![source];
        let mut node = source;
        while node != target {
            let arc = outgoing.get_mut(&node).and_then(|arcs| arcs.pop())?;
            let (_, to, _) = graph.arc(arc)?;
            // cut a loop, if the walk returns to a node it already visited
            if let Some(pos) = nodes.iter().position(|n| *n == to) {
                nodes.truncate(pos + 1);
                arcs.truncate(pos);
            } else {
                nodes.push(to);
                arcs.push(arc);
            }
            node = to;
        }
        paths.push(graph.path_from_arcs(source, arcs));
    }
    let second = paths.pop()?;
    let first = paths.pop()?;
    if first.cost <= second.cost {
        Some((first, second))
    } else {
        Some((second, first))
    }
}
