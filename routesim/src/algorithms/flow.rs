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

//! # Flows
//!
//! Maximum flow and minimum-cost flow on the capacities of a [`CostGraph`]. All combinatorial
//! algorithms work on a residual graph, where every arc is paired with a reverse residual edge.
//!
//! - **Ford-Fulkerson**: augment along any path, found by a recursive depth-first search.
//! - **Edmonds-Karp**: augment along a shortest path (in hops), found by a breadth-first search.
//! - **Dinic**: build the level graph, and augment a blocking flow on it.
//! - **Linear Program**: see [`lp::max_flow_lp`].
//!
//! The minimum-cost flow uses successive shortest paths, found by Bellman-Ford on the residual
//! costs.

use crate::algorithms::{lp, ArcId, CostGraph};
use crate::netsim::{ExclusionSet, LinkWeight, NodeId};
use log::*;
use std::collections::{BTreeMap, VecDeque};

const EPS: f64 = 1e-9;

/// Algorithm used by [`max_flow`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MaxFlowAlgorithm {
    /// Depth-first augmentation
    FordFulkerson,
    /// Breadth-first augmentation
    EdmondsKarp,
    /// Blocking flows on the level graph
    Dinic,
    /// Linear program, solved by the simplex method
    LinearProgram,
}

/// Result of a maximum flow computation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Flow {
    /// Total flow from the source to the target
    pub value: f64,
    /// Flow on every arc carrying flow
    pub arcs: BTreeMap<ArcId, f64>,
}

/// Result of a minimum-cost flow computation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MinCostFlow {
    /// Flow that could be sent (at most the requested amount)
    pub value: f64,
    /// Total cost of the flow
    pub cost: LinkWeight,
    /// Flow on every arc carrying flow
    pub arcs: BTreeMap<ArcId, f64>,
}

#[derive(Debug, Clone)]
struct Edge {
    to: usize,
    capacity: f64,
    cost: f64,
    /// arc of the cost graph, `None` for reverse residual edges
    arc: Option<ArcId>,
}

/// Residual graph. Edge `2i` is the forward edge of some arc, and `2i + 1` its reverse.
#[derive(Debug, Clone)]
struct Residual {
    edges: Vec<Edge>,
    adj: Vec<Vec<usize>>,
    source: usize,
    target: usize,
}

impl Residual {
    fn new(graph: &CostGraph, source: NodeId, target: NodeId, exclusions: &ExclusionSet) -> Self {
        let n = graph.node_bound();
        let mut residual = Self {
            edges: Vec::new(),
            adj: vec![Vec::new(); n],
            source: source.index(),
            target: target.index(),
        };
        for (id, from, to, arc) in graph.arcs() {
            if arc.capacity <= EPS || !graph.is_allowed(id, exclusions) {
                continue;
            }
            let cost = if arc.cost.is_finite() { arc.cost } else { 0.0 };
            let (from, to) = (from.index(), to.index());
            residual.adj[from].push(residual.edges.len());
            residual.edges.push(Edge { to, capacity: arc.capacity, cost, arc: Some(id) });
            residual.adj[to].push(residual.edges.len());
            residual.edges.push(Edge { to: from, capacity: 0.0, cost: -cost, arc: None });
        }
        residual
    }

    fn is_valid(&self, graph: &CostGraph, exclusions: &ExclusionSet) -> bool {
        let valid = |i: usize| {
            i < self.adj.len()
                && graph.nodes().contains(&NodeId::new(i))
                && !exclusions.contains_node(NodeId::new(i))
        };
        valid(self.source) && valid(self.target) && self.source != self.target
    }

    fn push(&mut self, edge: usize, amount: f64) {
        self.edges[edge].capacity -= amount;
        self.edges[edge ^ 1].capacity += amount;
    }

    /// Flow on every arc: the capacity that moved onto the reverse edge.
    fn arc_flows(&self) -> BTreeMap<ArcId, f64> {
        self.edges
            .chunks(2)
            .filter_map(|pair| match (pair[0].arc, pair.get(1)) {
                (Some(arc), Some(rev)) if rev.capacity > EPS => Some((arc, rev.capacity)),
                _ => None,
            })
            .collect()
    }

    fn ford_fulkerson(&mut self) -> f64 {
        let mut total = 0.0;
        loop {
            let mut visited = vec![false; self.adj.len()];
            let pushed = self.dfs(self.source, f64::INFINITY, &mut visited);
            if pushed <= EPS {
                break;
            }
            total += pushed;
        }
        total
    }

    fn dfs(&mut self, node: usize, limit: f64, visited: &mut [bool]) -> f64 {
        if node == self.target {
            return limit;
        }
        visited[node] = true;
        for i in 0..self.adj[node].len() {
            let e = self.adj[node][i];
            let (to, capacity) = (self.edges[e].to, self.edges[e].capacity);
            if visited[to] || capacity <= EPS {
                continue;
            }
            let pushed = self.dfs(to, limit.min(capacity), visited);
            if pushed > EPS {
                self.push(e, pushed);
                return pushed;
            }
        }
        0.0
    }

    fn edmonds_karp(&mut self) -> f64 {
        let mut total = 0.0;
        loop {
            let mut parent: Vec<Option<usize>> = vec![None; self.adj.len()];
            let mut queue = VecDeque::from(vec![self.source]);
            while let Some(node) = queue.pop_front() {
                if node == self.target {
                    break;
                }
                for e in self.adj[node].iter() {
                    let edge = &self.edges[*e];
                    if edge.capacity > EPS && edge.to != self.source && parent[edge.to].is_none() {
                        parent[edge.to] = Some(*e);
                        queue.push_back(edge.to);
                    }
                }
            }
            let path = match self.trace(&parent) {
                Some(path) => path,
                None => break,
            };
            let bottleneck =
                path.iter().map(|e| self.edges[*e].capacity).fold(f64::INFINITY, f64::min);
            for e in path {
                self.push(e, bottleneck);
            }
            total += bottleneck;
        }
        total
    }

    /// Follow the parent edges from the target back to the source.
    fn trace(&self, parent: &[Option<usize>]) -> Option<Vec<usize>> {
        let mut path = Vec::new();
        let mut node = self.target;
        while node != self.source {
            let e = parent[node]?;
            path.push(e);
            node = self.edges[e ^ 1].to;
            if path.len() > self.edges.len() {
                return None;
            }
        }
        Some(path)
    }

    fn dinic(&mut self) -> f64 {
        let mut total = 0.0;
        loop {
            let level = self.levels();
            if level[self.target].is_none() {
                break;
            }
            let mut next = vec![0; self.adj.len()];
            loop {
                let pushed = self.blocking(self.source, f64::INFINITY, &level, &mut next);
                if pushed <= EPS {
                    break;
                }
                total += pushed;
            }
        }
        total
    }

    fn levels(&self) -> Vec<Option<usize>> {
        let mut level = vec![None; self.adj.len()];
        level[self.source] = Some(0);
        let mut queue = VecDeque::from(vec![self.source]);
        while let Some(node) = queue.pop_front() {
            for e in self.adj[node].iter() {
                let edge = &self.edges[*e];
                if edge.capacity > EPS && level[edge.to].is_none() {
                    level[edge.to] = level[node].map(|l| l + 1);
                    queue.push_back(edge.to);
                }
            }
        }
        level
    }

    fn blocking(
        &mut self,
        node: usize,
        limit: f64,
        level: &[Option<usize>],
        next: &mut [usize],
    ) -> f64 {
        if node == self.target {
            return limit;
        }
        while next[node] < self.adj[node].len() {
            let e = self.adj[node][next[node]];
            let (to, capacity) = (self.edges[e].to, self.edges[e].capacity);
            let deeper = match (level[node], level[to]) {
                (Some(a), Some(b)) => b == a + 1,
                _ => false,
            };
            if deeper && capacity > EPS {
                let pushed = self.blocking(to, limit.min(capacity), level, next);
                if pushed > EPS {
                    self.push(e, pushed);
                    return pushed;
                }
            }
            next[node] += 1;
        }
        0.0
    }

    /// Bellman-Ford on the residual costs. Returns the parent edges and the distance of the
    /// target.
    fn cheapest_path(&self) -> (Vec<Option<usize>>, f64) {
        let n = self.adj.len();
        let mut dist = vec![f64::INFINITY; n];
        let mut parent: Vec<Option<usize>> = vec![None; n];
        dist[self.source] = 0.0;
        for _ in 0..n {
            let mut changed = false;
            for (node, edges) in self.adj.iter().enumerate() {
                if !dist[node].is_finite() {
                    continue;
                }
                for e in edges {
                    let edge = &self.edges[*e];
                    if edge.capacity > EPS && dist[node] + edge.cost < dist[edge.to] - EPS {
                        dist[edge.to] = dist[node] + edge.cost;
                        parent[edge.to] = Some(*e);
                        changed = true;
                    }
                }
            }
            if !changed {
                break;
            }
        }
        (parent, dist[self.target])
    }
}

/// Maximum flow from `source` to `target`, using the chosen algorithm.
pub fn max_flow(
    graph: &CostGraph,
    source: NodeId,
    target: NodeId,
    algorithm: MaxFlowAlgorithm,
    exclusions: &ExclusionSet,
) -> Flow {
    if algorithm == MaxFlowAlgorithm::LinearProgram {
        let (value, arcs) = lp::max_flow_lp(graph, source, target, exclusions);
        return Flow { value, arcs: arcs.into_iter().collect() };
    }
    let mut residual = Residual::new(graph, source, target, exclusions);
    if !residual.is_valid(graph, exclusions) {
        return Flow::default();
    }
    let value = match algorithm {
        MaxFlowAlgorithm::FordFulkerson => residual.ford_fulkerson(),
        MaxFlowAlgorithm::EdmondsKarp => residual.edmonds_karp(),
        MaxFlowAlgorithm::Dinic => residual.dinic(),
        MaxFlowAlgorithm::LinearProgram => 0.0,
    };
    debug!("{:?}: maximum flow {}", algorithm, value);
    Flow { value, arcs: residual.arc_flows() }
}

/// Send up to `amount` from `source` to `target` at minimum cost. If less can be sent, the
/// maximum flow is sent.
pub fn min_cost_flow(
    graph: &CostGraph,
    source: NodeId,
    target: NodeId,
    amount: f64,
    exclusions: &ExclusionSet,
) -> MinCostFlow {
    let mut residual = Residual::new(graph, source, target, exclusions);
    if !residual.is_valid(graph, exclusions) {
        return MinCostFlow::default();
    }
    let mut value = 0.0;
    let mut cost = 0.0;
    while value < amount - EPS {
        let (parent, dist) = residual.cheapest_path();
        if !dist.is_finite() {
            break;
        }
        let path = match residual.trace(&parent) {
            Some(path) => path,
            None => break,
        };
        let bottleneck = path
            .iter()
            .map(|e| residual.edges[*e].capacity)
            .fold(amount - value, f64::min);
        for e in path {
            residual.push(e, bottleneck);
        }
        value += bottleneck;
        cost += bottleneck * dist;
    }
    MinCostFlow { value, cost, arcs: residual.arc_flows() }
}
