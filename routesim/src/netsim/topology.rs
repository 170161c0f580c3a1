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

//! # Topology Graph
//!
//! Adjacency store over nodes and links. The graph itself is a
//! [`StableGraph`](petgraph::stable_graph::StableGraph), such that the ids of nodes and links stay
//! valid while other objects are removed. The node and link data is kept in separate maps,
//! indexed by the graph ids.

use crate::netsim::{
    Direction, ExclusionSet, Link, LinkId, LinkSubtype, LinkWeight, NetworkError, Node, NodeId,
    NodeSubtype,
};
use petgraph::prelude::*;
use petgraph::stable_graph::StableGraph;
use petgraph::visit::NodeIndexable;
use std::collections::BTreeMap;
use std::net::Ipv4Addr;

/// Graph storing only the adjacency and the subtype of each link.
pub(crate) type AdjacencyGraph = StableGraph<(), LinkSubtype, Undirected, u32>;

/// # Topology
/// Arena of all nodes and links. Self-loops are rejected, while parallel links between the same
/// pair of nodes are allowed, and they are distinguished by their id.
#[derive(Debug, Clone, Default)]
pub struct Topology {
    graph: AdjacencyGraph,
    nodes: BTreeMap<NodeId, Node>,
    links: BTreeMap<LinkId, Link>,
}

impl Topology {
    /// Create an empty topology
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a new node, returning its id.
    pub fn add_node(&mut self, name: String, subtype: NodeSubtype) -> NodeId {
        let node_id = self.graph.add_node(());
        self.nodes.insert(node_id, Node::new(name, node_id, subtype));
        node_id
    }

    /// Add a new physical link or BGP peering between two distinct nodes. Virtual connections must
    /// be created with [`Topology::add_virtual_connection`].
    pub fn add_link(
        &mut self,
        subtype: LinkSubtype,
        source: NodeId,
        destination: NodeId,
    ) -> Result<LinkId, NetworkError> {
        self.get_node(source)?;
        self.get_node(destination)?;
        if source == destination {
            return Err(NetworkError::SelfLoop(source));
        }
        if subtype.is_virtual() {
            return Err(NetworkError::UnexpectedSubtype(subtype));
        }
        let link_id = self.graph.add_edge(source, destination, subtype);
        let name = format!("{}{}", subtype, link_id.index());
        self.links.insert(link_id, Link::new(name, link_id, subtype, source, destination));
        Ok(link_id)
    }

    /// Add a virtual connection from `source` to `destination`. The connection uses the physical
    /// link `via_source` at the source, and `via_destination` at the destination.
    pub fn add_virtual_connection(
        &mut self,
        subtype: LinkSubtype,
        source: NodeId,
        destination: NodeId,
        via_source: LinkId,
        via_destination: LinkId,
    ) -> Result<LinkId, NetworkError> {
        let invalid = NetworkError::InvalidVirtualConnection(via_source, via_destination);
        if !subtype.is_virtual() {
            return Err(NetworkError::UnexpectedSubtype(subtype));
        }
        if source == destination {
            return Err(NetworkError::SelfLoop(source));
        }
        let ls = self.get_link(via_source)?;
        let ld = self.get_link(via_destination)?;
        if !ls.subtype().is_physical() || !ld.subtype().is_physical() {
            return Err(invalid);
        }
        if !ls.has_endpoint(source) || !ld.has_endpoint(destination) {
            return Err(invalid);
        }
        let subnet = ls.subnet();
        let link_id = self.graph.add_edge(source, destination, subtype);
        let name = format!("{}{}", subtype, link_id.index());
        let mut link = Link::new(name, link_id, subtype, source, destination);
        link.underlay = Some((via_source, via_destination));
        link.subnet = subnet;
        self.links.insert(link_id, link);
        Ok(link_id)
    }

    /// Remove a link, and every virtual connection that is built on top of it. The function
    /// returns the ids of all removed links.
    pub fn remove_link(&mut self, link: LinkId) -> Result<Vec<LinkId>, NetworkError> {
        self.get_link(link)?;
        let mut removed: Vec<LinkId> = self
            .links
            .values()
            .filter(|l| matches!(l.underlay, Some((a, b)) if a == link || b == link))
            .map(|l| l.link_id())
            .collect();
        removed.push(link);
        for l in removed.iter() {
            self.graph.remove_edge(*l);
            self.links.remove(l);
        }
        Ok(removed)
    }

    /// Remove a node, together with all its incident links (and the virtual connections built on
    /// them). The function returns all removed links, such that the caller can remove them from
    /// every AS and Area.
    pub fn remove_node(&mut self, node: NodeId) -> Result<Vec<LinkId>, NetworkError> {
        self.get_node(node)?;
        let incident: Vec<LinkId> = self.graph.edges(node).map(|e| e.id()).collect();
        let mut removed: Vec<LinkId> = Vec::new();
        for link in incident {
            // the link may already be removed as a virtual connection of a removed link
            if self.links.contains_key(&link) {
                removed.extend(self.remove_link(link)?);
            }
        }
        self.graph.remove_node(node);
        self.nodes.remove(&node);
        removed.sort();
        removed.dedup();
        Ok(removed)
    }

    /// Returns a reference to a node
    pub fn get_node(&self, node: NodeId) -> Result<&Node, NetworkError> {
        self.nodes.get(&node).ok_or(NetworkError::NodeNotFound(node))
    }

    pub(crate) fn get_node_mut(&mut self, node: NodeId) -> Result<&mut Node, NetworkError> {
        self.nodes.get_mut(&node).ok_or(NetworkError::NodeNotFound(node))
    }

    /// Returns a reference to a link
    pub fn get_link(&self, link: LinkId) -> Result<&Link, NetworkError> {
        self.links.get(&link).ok_or(NetworkError::LinkNotFound(link))
    }

    pub(crate) fn get_link_mut(&mut self, link: LinkId) -> Result<&mut Link, NetworkError> {
        self.links.get_mut(&link).ok_or(NetworkError::LinkNotFound(link))
    }

    /// Returns the id of the node with the given name.
    pub fn get_node_id(&self, name: impl AsRef<str>) -> Result<NodeId, NetworkError> {
        self.nodes
            .values()
            .find(|n| n.name() == name.as_ref())
            .map(|n| n.node_id())
            .ok_or_else(|| NetworkError::NodeNameNotFound(name.as_ref().to_string()))
    }

    /// Iterate over all nodes, ordered by their id
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    pub(crate) fn nodes_mut(&mut self) -> impl Iterator<Item = &mut Node> {
        self.nodes.values_mut()
    }

    /// Iterate over all links, ordered by their id
    pub fn links(&self) -> impl Iterator<Item = &Link> {
        self.links.values()
    }

    pub(crate) fn links_mut(&mut self) -> impl Iterator<Item = &mut Link> {
        self.links.values_mut()
    }

    /// Returns the ids of all routers, ordered by their id.
    pub fn routers(&self) -> Vec<NodeId> {
        self.nodes.values().filter(|n| n.is_router()).map(|n| n.node_id()).collect()
    }

    /// Returns the ids of all physical links, ordered by their id.
    pub fn physical_links(&self) -> Vec<LinkId> {
        self.links.values().filter(|l| l.subtype().is_physical()).map(|l| l.link_id()).collect()
    }

    /// Upper bound of all node indices (exclusive).
    pub fn node_bound(&self) -> usize {
        self.graph.node_bound()
    }

    /// Returns all neighbors of the node over links of the given subtypes. Each neighbor is
    /// returned together with the link connecting it, ordered by the link id. If `subtypes` is
    /// empty, links of any subtype are considered.
    pub fn neighbors(&self, node: NodeId, subtypes: &[LinkSubtype]) -> Vec<(NodeId, LinkId)> {
        self.incident(node, subtypes, None)
    }

    /// Returns all neighbors reached over links of the given subtypes, for which `node` is the
    /// source.
    pub fn neighbors_outgoing(
        &self,
        node: NodeId,
        subtypes: &[LinkSubtype],
    ) -> Vec<(NodeId, LinkId)> {
        self.incident(node, subtypes, Some(Direction::SourceToDestination))
    }

    /// Returns all neighbors reached over links of the given subtypes, for which `node` is the
    /// destination.
    pub fn neighbors_incoming(
        &self,
        node: NodeId,
        subtypes: &[LinkSubtype],
    ) -> Vec<(NodeId, LinkId)> {
        self.incident(node, subtypes, Some(Direction::DestinationToSource))
    }

    fn incident(
        &self,
        node: NodeId,
        subtypes: &[LinkSubtype],
        direction: Option<Direction>,
    ) -> Vec<(NodeId, LinkId)> {
        if !self.nodes.contains_key(&node) {
            return Vec::new();
        }
        let mut result: Vec<(NodeId, LinkId)> = self
            .graph
            .edges(node)
            .filter(|e| subtypes.is_empty() || subtypes.contains(e.weight()))
            .filter_map(|e| self.links.get(&e.id()))
            .filter(|l| direction.is_none() || l.direction_from(node) == direction)
            .filter_map(|l| l.other_end(node).map(|n| (n, l.link_id())))
            .collect();
        result.sort_by_key(|(_, l)| *l);
        result.dedup();
        result
    }

    /// Returns all links between `a` and `b`, of any subtype, ordered by their id.
    pub fn links_between(&self, a: NodeId, b: NodeId) -> Vec<LinkId> {
        self.neighbors(a, &[]).into_iter().filter(|(n, _)| *n == b).map(|(_, l)| l).collect()
    }

    /// Returns the physical link used when leaving `node` over `link`. For physical links, this is
    /// the link itself. For virtual connections, this is the underlying link at the side of `node`.
    pub fn physical_link_at(&self, link: LinkId, node: NodeId) -> Result<LinkId, NetworkError> {
        let l = self.get_link(link)?;
        let dir = l.direction_from(node).ok_or(NetworkError::NotAnEndpoint(link, node))?;
        match (l.underlay, dir) {
            (None, _) => Ok(link),
            (Some((s, _)), Direction::SourceToDestination) => Ok(s),
            (Some((_, d)), Direction::DestinationToSource) => Ok(d),
        }
    }

    /// Returns the physical link and its direction when leaving `node` over `link`.
    fn physical_direction(
        &self,
        link: LinkId,
        node: NodeId,
    ) -> Result<(LinkId, Direction), NetworkError> {
        let phys = self.physical_link_at(link, node)?;
        let dir = self
            .get_link(phys)?
            .direction_from(node)
            .ok_or(NetworkError::NotAnEndpoint(phys, node))?;
        Ok((phys, dir))
    }

    /// Returns the cost of the link in the direction leaving `node`.
    pub fn cost_toward(&self, link: LinkId, node: NodeId) -> Result<LinkWeight, NetworkError> {
        let (phys, dir) = self.physical_direction(link, node)?;
        Ok(self.get_link(phys)?.cost(dir))
    }

    /// Set the cost of the link in the direction leaving `node`.
    pub fn set_cost_toward(
        &mut self,
        link: LinkId,
        node: NodeId,
        cost: LinkWeight,
    ) -> Result<(), NetworkError> {
        let (phys, dir) = self.physical_direction(link, node)?;
        self.get_link_mut(phys)?.cost[dir.idx()] = cost;
        Ok(())
    }

    /// Returns the capacity of the link in the direction leaving `node`.
    pub fn capacity_toward(&self, link: LinkId, node: NodeId) -> Result<f64, NetworkError> {
        let (phys, dir) = self.physical_direction(link, node)?;
        Ok(self.get_link(phys)?.capacity(dir))
    }

    /// Set the capacity of the link in the direction leaving `node`.
    pub fn set_capacity_toward(
        &mut self,
        link: LinkId,
        node: NodeId,
        capacity: f64,
    ) -> Result<(), NetworkError> {
        let (phys, dir) = self.physical_direction(link, node)?;
        self.get_link_mut(phys)?.capacity[dir.idx()] = capacity;
        Ok(())
    }

    /// Returns the traffic of the link in the direction leaving `node`.
    pub fn traffic_toward(&self, link: LinkId, node: NodeId) -> Result<f64, NetworkError> {
        let (phys, dir) = self.physical_direction(link, node)?;
        Ok(self.get_link(phys)?.traffic(dir))
    }

    /// Returns the IP address of the interface of `node` on `link` (resolving virtual connections
    /// to the underlying physical link).
    pub fn interface_ip(&self, link: LinkId, node: NodeId) -> Option<Ipv4Addr> {
        let phys = self.physical_link_at(link, node).ok()?;
        self.links.get(&phys)?.interface_of(node)?.ip
    }

    /// Returns true if neither the link, nor its endpoints, nor any of its underlying physical
    /// links are excluded.
    pub fn is_usable(&self, link: LinkId, exclusions: &ExclusionSet) -> bool {
        let l = match self.links.get(&link) {
            Some(l) => l,
            None => return false,
        };
        if exclusions.contains_link(link)
            || exclusions.contains_node(l.source())
            || exclusions.contains_node(l.destination())
        {
            return false;
        }
        match l.underlay {
            Some((a, b)) => [a, b].iter().all(|u| match self.links.get(u) {
                Some(u) => {
                    !exclusions.contains_link(u.link_id())
                        && !exclusions.contains_node(u.source())
                        && !exclusions.contains_node(u.destination())
                }
                None => false,
            }),
            None => true,
        }
    }
}
