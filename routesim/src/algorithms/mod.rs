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

//! # Graph Algorithms
//!
//! Graph-only algorithms, operating on a [`CostGraph`]: a directed graph, where every physical
//! link of the topology is represented by two arcs (one per direction), each carrying the cost and
//! the capacity of its direction. The node indices of the cost graph are the same as in the
//! topology.
//!
//! Every algorithm takes an [`ExclusionSet`] as an explicit parameter. Arcs whose link or whose
//! endpoints are excluded are ignored. Path searches take [`PathConstraints`] instead, which may
//! also restrict the search to a set of allowed nodes and links. Arcs with a non-finite cost are
//! treated as removed by all path algorithms.
//!
//! Failures of the algorithms are values: no path is reported by an empty [`Path`], and no pair of
//! disjoint paths by `None`.

pub mod disjoint;
pub mod flow;
pub mod lp;
pub mod mst;
pub mod shortest_path;

pub use disjoint::{disjoint_pair, DisjointPairAlgorithm};
pub use flow::{max_flow, min_cost_flow, Flow, MaxFlowAlgorithm, MinCostFlow};
pub use mst::kruskal;
pub use shortest_path::{
    a_star, bellman_ford, dijkstra, floyd_warshall, shortest_path, BellmanFord, BellmanFordMode,
    DistanceMatrix, ShortestPathAlgorithm, ShortestPathTree,
};

use crate::netsim::{Direction, ExclusionSet, LinkId, LinkWeight, NodeId, Topology};
use petgraph::prelude::*;
use std::collections::BTreeSet;

/// Arc Identification (index into the cost graph)
pub type ArcId = EdgeIndex<u32>;

/// A directed arc of the cost graph.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Arc {
    /// Link represented by the arc
    pub link: LinkId,
    /// Cost of traversing the arc
    pub cost: LinkWeight,
    /// Capacity of the arc
    pub capacity: f64,
}

/// # Cost Graph
/// Directed multigraph with costs and capacities. It is either extracted from a topology with
/// [`CostGraph::from_topology`], or built by hand.
#[derive(Debug, Clone, Default)]
pub struct CostGraph {
    graph: Graph<(), Arc, Directed, u32>,
    nodes: BTreeSet<NodeId>,
}

impl CostGraph {
    /// Create a graph with nodes `0..n` and no arcs.
    pub fn new(n: usize) -> Self {
        let mut graph = Graph::default();
        let nodes = (0..n).map(|_| graph.add_node(())).collect();
        Self { graph, nodes }
    }

    /// Extract the cost graph of all usable physical links of the topology.
    pub fn from_topology(topology: &Topology, exclusions: &ExclusionSet) -> Self {
        let mut graph: Graph<(), Arc, Directed, u32> = Graph::default();
        for _ in 0..topology.node_bound() {
            graph.add_node(());
        }
        let nodes = topology
            .nodes()
            .map(|n| n.node_id())
            .filter(|n| !exclusions.contains_node(*n))
            .collect();
        for link in topology.links() {
            if !link.subtype().is_physical() || !topology.is_usable(link.link_id(), exclusions) {
                continue;
            }
            for (from, to, dir) in [
                (link.source(), link.destination(), Direction::SourceToDestination),
                (link.destination(), link.source(), Direction::DestinationToSource),
            ] {
                let (cost, capacity) = (link.cost(dir), link.capacity(dir));
                graph.add_edge(from, to, Arc { link: link.link_id(), cost, capacity });
            }
        }
        Self { graph, nodes }
    }

    /// Add an arc, returning its id.
    pub fn add_arc(
        &mut self,
        from: NodeId,
        to: NodeId,
        link: LinkId,
        cost: LinkWeight,
        capacity: f64,
    ) -> ArcId {
        self.graph.add_edge(from, to, Arc { link, cost, capacity })
    }

    /// Add a link, represented by two arcs with the same cost and capacity.
    pub fn add_link(
        &mut self,
        a: NodeId,
        b: NodeId,
        cost: LinkWeight,
        capacity: f64,
    ) -> (ArcId, ArcId) {
        let link = LinkId::new(self.graph.edge_count() / 2);
        (self.add_arc(a, b, link, cost, capacity), self.add_arc(b, a, link, cost, capacity))
    }

    /// Returns the underlying petgraph graph.
    pub fn graph(&self) -> &Graph<(), Arc, Directed, u32> {
        &self.graph
    }

    /// Returns all nodes of the graph (excluded and removed nodes of the topology are missing).
    pub fn nodes(&self) -> &BTreeSet<NodeId> {
        &self.nodes
    }

    /// Upper bound of all node indices
    pub fn node_bound(&self) -> usize {
        self.graph.node_count()
    }

    /// Returns the endpoints and the data of an arc
    pub fn arc(&self, arc: ArcId) -> Option<(NodeId, NodeId, &Arc)> {
        let (from, to) = self.graph.edge_endpoints(arc)?;
        Some((from, to, self.graph.edge_weight(arc)?))
    }

    /// Iterate over all arcs, ordered by their id
    pub fn arcs(&self) -> impl Iterator<Item = (ArcId, NodeId, NodeId, &Arc)> {
        self.graph.edge_references().map(|e| (e.id(), e.source(), e.target(), e.weight()))
    }

    /// Returns all arcs leaving `node` that are not excluded, ordered by their id.
    pub fn outgoing(&self, node: NodeId, exclusions: &ExclusionSet) -> Vec<(ArcId, NodeId, Arc)> {
        let mut arcs: Vec<(ArcId, NodeId, Arc)> = self
            .graph
            .edges(node)
            .filter(|e| self.is_allowed(e.id(), exclusions))
            .map(|e| (e.id(), e.target(), *e.weight()))
            .collect();
        arcs.sort_by_key(|(a, _, _)| *a);
        arcs
    }

    /// Returns the arc of the same link in the opposite direction.
    pub fn reverse_arc(&self, arc: ArcId) -> Option<ArcId> {
        let (from, to, data) = self.arc(arc)?;
        self.graph
            .edges(to)
            .find(|e| e.target() == from && e.weight().link == data.link)
            .map(|e| e.id())
    }

    /// Returns true if neither the link nor the endpoints of the arc are excluded.
    pub fn is_allowed(&self, arc: ArcId, exclusions: &ExclusionSet) -> bool {
        match self.arc(arc) {
            Some((from, to, data)) => {
                self.nodes.contains(&from)
                    && self.nodes.contains(&to)
                    && !exclusions.contains_node(from)
                    && !exclusions.contains_node(to)
                    && !exclusions.contains_link(data.link)
            }
            None => false,
        }
    }

    /// Change the cost of an arc
    pub(crate) fn set_cost(&mut self, arc: ArcId, cost: LinkWeight) {
        if let Some(data) = self.graph.edge_weight_mut(arc) {
            data.cost = cost;
        }
    }

    /// Returns the cost of an arc, or infinity if it does not exist.
    pub fn cost(&self, arc: ArcId) -> LinkWeight {
        self.graph.edge_weight(arc).map(|a| a.cost).unwrap_or(LinkWeight::INFINITY)
    }

    /// Build a path from a sequence of arcs, starting at `source`.
    pub fn path_from_arcs(&self, source: NodeId, arcs: Vec<ArcId>) -> Path {
        let mut nodes = vec![source];
        let mut links = Vec::with_capacity(arcs.len());
        let mut cost = 0.0;
        for arc in arcs.iter() {
            if let Some((_, to, data)) = self.arc(*arc) {
                nodes.push(to);
                links.push(data.link);
                cost += data.cost;
            }
        }
        Path { nodes, links, arcs, cost }
    }
}

/// A path through the graph. A path without any node means that no path exists.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Path {
    /// Visited nodes, including source and target
    pub nodes: Vec<NodeId>,
    /// Traversed links
    pub links: Vec<LinkId>,
    /// Traversed arcs
    pub arcs: Vec<ArcId>,
    /// Total cost
    pub cost: LinkWeight,
}

impl Path {
    /// Returns the empty path, meaning that no path was found.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns true if no path was found.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Constraints of a path search: an ordered list of waypoints that must be visited, a set of
/// excluded nodes and links, and optionally the only nodes and links the search may use.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PathConstraints {
    /// Nodes that must be visited, in order
    pub waypoints: Vec<NodeId>,
    /// Nodes and links that must not be used
    pub exclusions: ExclusionSet,
    /// If set, only these nodes may be used
    pub allowed_nodes: Option<BTreeSet<NodeId>>,
    /// If set, only these links may be used
    pub allowed_links: Option<BTreeSet<LinkId>>,
}

impl PathConstraints {
    /// No constraints at all
    pub fn new() -> Self {
        Self::default()
    }

    /// Only exclusions, no waypoints
    pub fn with_exclusions(exclusions: ExclusionSet) -> Self {
        Self { exclusions, ..Default::default() }
    }

    /// Restrict the search to the given nodes
    pub fn allow_nodes(mut self, nodes: impl IntoIterator<Item = NodeId>) -> Self {
        self.allowed_nodes = Some(nodes.into_iter().collect());
        self
    }

    /// Restrict the search to the given links
    pub fn allow_links(mut self, links: impl IntoIterator<Item = LinkId>) -> Self {
        self.allowed_links = Some(links.into_iter().collect());
        self
    }

    /// Returns the exclusions, extended by every node and link of the graph outside of the
    /// allowed sets.
    pub fn effective_exclusions(&self, graph: &CostGraph) -> ExclusionSet {
        let mut exclusions = self.exclusions.clone();
        if let Some(allowed) = self.allowed_nodes.as_ref() {
            for node in graph.nodes().iter().filter(|n| !allowed.contains(n)) {
                exclusions.exclude_node(*node);
            }
        }
        if let Some(allowed) = self.allowed_links.as_ref() {
            for (_, _, _, arc) in graph.arcs().filter(|(_, _, _, a)| !allowed.contains(&a.link)) {
                exclusions.exclude_link(arc.link);
            }
        }
        exclusions
    }
}
