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

//! # Shortest Paths
//!
//! Single-source and all-pairs shortest path algorithms:
//!
//! - [`dijkstra`]: priority-queue search, returning the shortest-path tree.
//! - [`a_star`]: search from a source to a target, visiting an ordered list of waypoints, while
//!   avoiding the excluded nodes and links. Every time the next waypoint is reached, the search
//!   continues with a fresh set of visited nodes.
//! - [`bellman_ford`]: supports negative costs, and reports negative cycles as a value. The
//!   search can be restricted to a set of allowed nodes and links.
//! - [`floyd_warshall`]: all-pairs distances, `None` if there is a negative cycle.
//!
//! On equal costs, the arc with the lower id is preferred, which makes all results
//! deterministic.

use crate::algorithms::{lp, ArcId, CostGraph, Path, PathConstraints};
use crate::netsim::{ExclusionSet, LinkId, LinkWeight, NodeId};
use itertools::Itertools;
use ordered_float::NotNan;
use std::cmp::Reverse;
use std::collections::{BTreeMap, BinaryHeap, HashSet};

/// Algorithm used by [`shortest_path`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShortestPathAlgorithm {
    /// Dijkstra, chained over the waypoints
    Dijkstra,
    /// Constrained A*
    AStar,
    /// Bellman-Ford, chained over the waypoints
    BellmanFord,
    /// Linear program, chained over the waypoints
    LinearProgram,
}

/// Shortest-path tree, computed by [`dijkstra`].
#[derive(Debug, Clone, PartialEq)]
pub struct ShortestPathTree {
    /// Root of the tree
    pub source: NodeId,
    /// Distance of every reached node
    pub dist: BTreeMap<NodeId, LinkWeight>,
    /// Arc used to reach every node (except the source)
    pub pred: BTreeMap<NodeId, ArcId>,
}

impl ShortestPathTree {
    /// Returns the distance of a node, or `None` if it is not reachable
    pub fn distance(&self, node: NodeId) -> Option<LinkWeight> {
        self.dist.get(&node).copied()
    }

    /// Returns the path from the source to `target`, or the empty path if it is not reachable.
    pub fn path_to(&self, graph: &CostGraph, target: NodeId) -> Path {
        if !self.dist.contains_key(&target) {
            return Path::empty();
        }
        let mut arcs = Vec::new();
        let mut node = target;
        while node != self.source {
            match self.pred.get(&node).and_then(|a| graph.arc(*a).map(|(from, _, _)| (*a, from))) {
                Some((arc, from)) if arcs.len() <= self.pred.len() => {
                    arcs.push(arc);
                    node = from;
                }
                _ => return Path::empty(),
            }
        }
        arcs.reverse();
        graph.path_from_arcs(self.source, arcs)
    }
}

/// Dijkstra's algorithm from `source`. Arcs with negative cost must not be present.
pub fn dijkstra(graph: &CostGraph, source: NodeId, exclusions: &ExclusionSet) -> ShortestPathTree {
    let mut tree = ShortestPathTree { source, dist: BTreeMap::new(), pred: BTreeMap::new() };
    if !graph.nodes().contains(&source) || exclusions.contains_node(source) {
        return tree;
    }
    let mut settled: HashSet<NodeId> = HashSet::new();
    let mut queue: BinaryHeap<Reverse<(NotNan<LinkWeight>, NodeId)>> = BinaryHeap::new();
    tree.dist.insert(source, 0.0);
    queue.push(Reverse((NotNan::default(), source)));

    while let Some(Reverse((dist, node))) = queue.pop() {
        if !settled.insert(node) {
            continue;
        }
        for (arc, next, data) in graph.outgoing(node, exclusions) {
            if !data.cost.is_finite() || settled.contains(&next) {
                continue;
            }
            let new_dist = dist.into_inner() + data.cost;
            if new_dist < tree.dist.get(&next).copied().unwrap_or(LinkWeight::INFINITY) {
                if let Ok(key) = NotNan::new(new_dist) {
                    tree.dist.insert(next, new_dist);
                    tree.pred.insert(next, arc);
                    queue.push(Reverse((key, next)));
                }
            }
        }
    }
    tree
}

/// Constrained A* from `source` to `target`, with a zero heuristic. The path visits all waypoints
/// of the constraints in order, avoids every excluded node and link, and uses only the allowed
/// ones. If no such path exists, the empty path is returned once the queue is exhausted.
pub fn a_star(
    graph: &CostGraph,
    source: NodeId,
    target: NodeId,
    constraints: &PathConstraints,
) -> Path {
    let exclusions = &constraints.effective_exclusions(graph);
    let waypoints = &constraints.waypoints;
    if !graph.nodes().contains(&source) || exclusions.contains_node(source) {
        return Path::empty();
    }
    let mut visited: HashSet<(NodeId, usize)> = HashSet::new();
    let mut queue: BinaryHeap<Reverse<(NotNan<LinkWeight>, NodeId, usize, Vec<ArcId>)>> =
        BinaryHeap::new();
    queue.push(Reverse((NotNan::default(), source, 0, Vec::new())));

    while let Some(Reverse((cost, node, mut stage, arcs))) = queue.pop() {
        while stage < waypoints.len() && waypoints[stage] == node {
            stage += 1;
        }
        if stage == waypoints.len() && node == target {
            return graph.path_from_arcs(source, arcs);
        }
        if !visited.insert((node, stage)) {
            continue;
        }
        for (arc, next, data) in graph.outgoing(node, exclusions) {
            if !data.cost.is_finite() || visited.contains(&(next, stage)) {
                continue;
            }
            if let Ok(new_cost) = NotNan::new(cost.into_inner() + data.cost) {
                let mut new_arcs = arcs.clone();
                new_arcs.push(arc);
                queue.push(Reverse((new_cost, next, stage, new_arcs)));
            }
        }
    }
    Path::empty()
}

/// Result of [`bellman_ford`]
#[derive(Debug, Clone, PartialEq)]
pub enum BellmanFord {
    /// Shortest path from the source to the target
    Path(Path),
    /// The target cannot be reached
    Unreachable,
    /// A negative cycle was found, given by its links in traversal order
    NegativeCycle(Vec<LinkId>),
}

/// Mode of [`bellman_ford`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BellmanFordMode {
    /// Search the shortest path to the target. Any negative cycle reachable from the source is
    /// reported.
    Path,
    /// Walk the predecessors from the target until a node repeats, and report that cycle. If the
    /// walk reaches the source, this behaves like [`BellmanFordMode::Path`].
    Cycle,
}

/// Bellman-Ford from `source` to `target`, using only the arcs permitted by the exclusions and the
/// allowed sets of the constraints. The waypoints are ignored.
pub fn bellman_ford(
    graph: &CostGraph,
    source: NodeId,
    target: NodeId,
    constraints: &PathConstraints,
    mode: BellmanFordMode,
) -> BellmanFord {
    let exclusions = &constraints.effective_exclusions(graph);
    let n = graph.node_bound();
    if !graph.nodes().contains(&source) || exclusions.contains_node(source) {
        return BellmanFord::Unreachable;
    }
    let arcs: Vec<(ArcId, usize, usize, LinkWeight)> = graph
        .arcs()
        .filter(|(id, _, _, a)| a.cost.is_finite() && graph.is_allowed(*id, exclusions))
        .map(|(id, from, to, a)| (id, from.index(), to.index(), a.cost))
        .collect();
    let mut dist = vec![LinkWeight::INFINITY; n];
    let mut pred: Vec<Option<(ArcId, usize)>> = vec![None; n];
    dist[source.index()] = 0.0;

    for _ in 1..n.max(2) {
        let mut changed = false;
        for (arc, from, to, cost) in arcs.iter() {
            if dist[*from].is_finite() && dist[*from] + cost < dist[*to] {
                dist[*to] = dist[*from] + cost;
                pred[*to] = Some((*arc, *from));
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }

    // one more round: any relaxation witnesses a negative cycle
    let mut witness = None;
    for (arc, from, to, cost) in arcs.iter() {
        if dist[*from].is_finite() && dist[*from] + cost < dist[*to] {
            dist[*to] = dist[*from] + cost;
            pred[*to] = Some((*arc, *from));
            witness.get_or_insert(*to);
        }
    }

    if mode == BellmanFordMode::Cycle {
        let mut seen: HashSet<usize> = HashSet::new();
        let mut node = target.index();
        while let Some((_, from)) = pred.get(node).copied().flatten() {
            if !seen.insert(node) {
                return BellmanFord::NegativeCycle(cycle_from(graph, &pred, node));
            }
            node = from;
        }
    }

    if let Some(w) = witness {
        // walk back n steps to be sure to end up on the cycle
        let mut node = w;
        for _ in 0..n {
            match pred[node] {
                Some((_, from)) => node = from,
                None => break,
            }
        }
        return BellmanFord::NegativeCycle(cycle_from(graph, &pred, node));
    }

    if target.index() >= n || !dist[target.index()].is_finite() {
        return BellmanFord::Unreachable;
    }
    let mut path_arcs = Vec::new();
    let mut node = target.index();
    while node != source.index() {
        match pred[node] {
            Some((arc, from)) if path_arcs.len() < n => {
                path_arcs.push(arc);
                node = from;
            }
            _ => return BellmanFord::Unreachable,
        }
    }
    path_arcs.reverse();
    BellmanFord::Path(graph.path_from_arcs(source, path_arcs))
}

/// Collect the cycle of predecessors that contains `start`.
fn cycle_from(graph: &CostGraph, pred: &[Option<(ArcId, usize)>], start: usize) -> Vec<LinkId> {
    let mut links = Vec::new();
    let mut node = start;
    while let Some((arc, from)) = pred[node] {
        if let Some((_, _, data)) = graph.arc(arc) {
            links.push(data.link);
        }
        node = from;
        if node == start || links.len() > pred.len() {
            break;
        }
    }
    links.reverse();
    links
}

/// All-pairs distances. Only reachable pairs are present.
pub type DistanceMatrix = BTreeMap<(NodeId, NodeId), LinkWeight>;

/// Floyd-Warshall over all allowed arcs. Of several arcs between the same pair of nodes, the
/// cheapest one is used. Returns `None` if the graph has a negative cycle.
pub fn floyd_warshall(graph: &CostGraph, exclusions: &ExclusionSet) -> Option<DistanceMatrix> {
    let n = graph.node_bound();
    let nodes: Vec<usize> = graph
        .nodes()
        .iter()
        .filter(|x| !exclusions.contains_node(**x))
        .map(|x| x.index())
        .collect();
    let mut dist = vec![vec![LinkWeight::INFINITY; n]; n];
    for i in nodes.iter() {
        dist[*i][*i] = 0.0;
    }
    for (arc, from, to, data) in graph.arcs() {
        if data.cost.is_finite() && graph.is_allowed(arc, exclusions) {
            let d = &mut dist[from.index()][to.index()];
            *d = d.min(data.cost);
        }
    }

    for k in nodes.iter() {
        for i in nodes.iter() {
            let via = dist[*i][*k];
            if !via.is_finite() {
                continue;
            }
            for j in nodes.iter() {
                let new_dist = via + dist[*k][*j];
                if new_dist < dist[*i][*j] {
                    dist[*i][*j] = new_dist;
                }
            }
        }
    }

    if nodes.iter().any(|i| dist[*i][*i] < 0.0) {
        return None;
    }
    Some(
        nodes
            .iter()
            .cartesian_product(nodes.iter())
            .filter(|(i, j)| dist[**i][**j].is_finite())
            .map(|(i, j)| ((NodeId::new(*i), NodeId::new(*j)), dist[*i][*j]))
            .collect(),
    )
}

/// Shortest path from `source` to `target` with the chosen algorithm, visiting all waypoints of
/// the constraints in order. Algorithms other than A* compute one segment per pair of
/// consecutive waypoints.
pub fn shortest_path(
    graph: &CostGraph,
    source: NodeId,
    target: NodeId,
    algorithm: ShortestPathAlgorithm,
    constraints: &PathConstraints,
) -> Path {
    if algorithm == ShortestPathAlgorithm::AStar {
        return a_star(graph, source, target, constraints);
    }
    let exclusions = &constraints.effective_exclusions(graph);
    let mut points = vec![source];
    points.extend(constraints.waypoints.iter().copied());
    points.push(target);

    let mut arcs = Vec::new();
    for segment in points.windows(2) {
        let (a, b) = (segment[0], segment[1]);
        let path = match algorithm {
            ShortestPathAlgorithm::Dijkstra => dijkstra(graph, a, exclusions).path_to(graph, b),
            ShortestPathAlgorithm::BellmanFord => {
                match bellman_ford(graph, a, b, constraints, BellmanFordMode::Path) {
                    BellmanFord::Path(p) => p,
                    _ => Path::empty(),
                }
            }
            ShortestPathAlgorithm::LinearProgram => lp::shortest_path_lp(graph, a, b, exclusions),
            ShortestPathAlgorithm::AStar => {
                a_star(graph, a, b, &PathConstraints::with_exclusions(exclusions.clone()))
            }
        };
        if path.is_empty() {
            return Path::empty();
        }
        arcs.extend(path.arcs);
    }
    graph.path_from_arcs(source, arcs)
}
