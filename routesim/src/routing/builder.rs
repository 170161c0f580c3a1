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

//! # Route Builder
//!
//! Generic route table construction for one source router within one interior gateway protocol
//! domain. The builder runs a Dijkstra-style expansion, driven by the state machine
//! `Init -> Expand -> Relax -> Expand -> ... -> Done`:
//!
//! - **Init**: install the connected routes and push the source onto the queue.
//! - **Expand**: pop the best candidate from the queue. If the queue is empty, we are done.
//! - **Relax**: learn the routes of the reached node, and push a candidate for every neighbor.
//!
//! A state `(node, exit link)` is visited at most once. Hence, the same node can be reached once
//! per first-hop link, which is what allows equal-cost paths over distinct exit links to coexist.
//! Candidates of equal cost are ordered by the node id, and then by the exit link id.
//!
//! The protocol-specific behavior is defined by the [`RouteRules`] trait.

use crate::netsim::{
    AsId, AsType, AutonomousSystem, ExclusionSet, LinkId, LinkSubtype, LinkWeight, Network,
    NetworkError, NodeId, Subnet, Topology,
};
use crate::routing::isis::IsisRules;
use crate::routing::ospf::OspfRules;
use crate::routing::rip::RipRules;
use crate::routing::{RouteEntry, RouteKind, RouteTable};
use ipnetwork::Ipv4Network;
use log::*;
use ordered_float::NotNan;
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashSet};
use std::net::Ipv4Addr;

/// Protocol-specific rules of the route builder.
pub trait RouteRules {
    /// Cost of leaving `from` over `link`. By default, this is the configured link cost in that
    /// direction.
    fn edge_cost(
        &self,
        topology: &Topology,
        link: LinkId,
        from: NodeId,
    ) -> Result<LinkWeight, NetworkError> {
        topology.cost_toward(link, from)
    }

    /// Returns true if the edge may be traversed. `out_link` and `in_link` are the physical
    /// links at the departing and at the arriving side.
    fn may_traverse(&self, _out_link: LinkId, _in_link: LinkId) -> bool {
        true
    }

    /// Classify a route, reached with the physical first-hop link `exit` and the physical last
    /// link `last`. If `None` is returned, the candidate is rejected, and not expanded further.
    fn classify(&self, exit: LinkId, last: LinkId) -> Option<RouteKind>;

    /// Additional routes learned when reaching `node`, routed like its loopback.
    fn extra_routes(&mut self, _node: NodeId) -> Vec<(Subnet, RouteKind)> {
        Vec::new()
    }

    /// Maximum number of hops a route may have.
    fn max_hops(&self) -> Option<usize> {
        None
    }
}

/// Build the route table of `source`, for the IGP domain `as_id`. Routers and links contained in
/// the exclusion set are ignored. For domains that are not an IGP, an empty table is returned.
pub fn build_route_table(
    net: &Network,
    as_id: AsId,
    source: NodeId,
    exclusions: &ExclusionSet,
) -> Result<RouteTable, NetworkError> {
    let domain = net.get_as(as_id)?;
    let topology = net.topology();
    let max_paths = topology.get_node(source)?.lb_paths(as_id);
    match domain.as_type() {
        AsType::Rip => {
            RouteBuilder::new(topology, domain, RipRules, source, exclusions, max_paths).run()
        }
        AsType::Ospf => {
            let rules = OspfRules::new(domain)?;
            RouteBuilder::new(topology, domain, rules, source, exclusions, max_paths).run()
        }
        AsType::Isis => {
            let rules = IsisRules::new(domain, source)?;
            RouteBuilder::new(topology, domain, rules, source, exclusions, max_paths).run()
        }
        AsType::Bgp | AsType::Stp | AsType::Vlan => Ok(RouteTable::new()),
    }
}

/// Edge of the routing graph, leaving a router toward `neighbor`.
#[derive(Debug, Clone, Copy)]
struct RoutingEdge {
    neighbor: NodeId,
    /// the link used, either physical or a virtual connection
    link: LinkId,
    /// physical link at the departing side
    out_link: LinkId,
    /// physical link at the arriving side
    in_link: LinkId,
}

/// Entry of the priority queue. The derived ordering compares the fields in order, which yields
/// the tie-break on equal cost: lowest node id first, then lowest exit link id.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) struct Candidate {
    cost: NotNan<LinkWeight>,
    node: NodeId,
    exit: Option<LinkId>,
    hops: usize,
    path: Vec<LinkId>,
    exit_phys: Option<LinkId>,
    last_phys: Option<LinkId>,
    next_hop: Option<NodeId>,
    next_hop_ip: Option<Ipv4Addr>,
    exit_interface: Option<Ipv4Addr>,
}

enum State {
    Init,
    Expand,
    Relax(Candidate),
    Done,
}

/// Route builder for one source router.
pub(crate) struct RouteBuilder<'a, R: RouteRules> {
    topology: &'a Topology,
    domain: &'a AutonomousSystem,
    rules: R,
    source: NodeId,
    exclusions: &'a ExclusionSet,
    max_paths: usize,
    queue: BinaryHeap<Reverse<Candidate>>,
    visited: HashSet<(NodeId, Option<LinkId>)>,
    table: RouteTable,
}

impl<'a, R: RouteRules> RouteBuilder<'a, R> {
    pub(crate) fn new(
        topology: &'a Topology,
        domain: &'a AutonomousSystem,
        rules: R,
        source: NodeId,
        exclusions: &'a ExclusionSet,
        max_paths: usize,
    ) -> Self {
        Self {
            topology,
            domain,
            rules,
            source,
            exclusions,
            max_paths,
            queue: BinaryHeap::new(),
            visited: HashSet::new(),
            table: RouteTable::new(),
        }
    }

    /// Run the state machine until the queue is exhausted.
    pub(crate) fn run(mut self) -> Result<RouteTable, NetworkError> {
        if self.exclusions.contains_node(self.source) || !self.domain.nodes().contains(&self.source)
        {
            return Ok(self.table);
        }
        let mut state = State::Init;
        loop {
            state = match state {
                State::Init => {
                    self.init()?;
                    State::Expand
                }
                State::Expand => match self.queue.pop() {
                    Some(Reverse(candidate)) => State::Relax(candidate),
                    None => State::Done,
                },
                State::Relax(candidate) => {
                    self.relax(candidate)?;
                    State::Expand
                }
                State::Done => break,
            }
        }
        debug!(
            "{} {:?}: built {} routes for {:?}",
            self.domain.name(),
            self.domain.as_type(),
            self.table.len(),
            self.source
        );
        Ok(self.table)
    }

    fn init(&mut self) -> Result<(), NetworkError> {
        if let Some(lo) = self.topology.get_node(self.source)?.loopback() {
            self.table.offer(Ipv4Network::from(lo), RouteEntry::connected(None, Some(lo)), 1);
        }
        for (_, link) in self.topology.neighbors(self.source, &LinkSubtype::PHYSICAL) {
            if !self.domain.links().contains(&link)
                || !self.topology.is_usable(link, self.exclusions)
            {
                continue;
            }
            if let Some(subnet) = self.topology.get_link(link)?.subnet() {
                let ip = self.topology.interface_ip(link, self.source);
                self.table.offer(subnet, RouteEntry::connected(Some(link), ip), self.max_paths);
            }
        }
        self.queue.push(Reverse(Candidate {
            cost: NotNan::default(),
            node: self.source,
            exit: None,
            hops: 0,
            path: Vec::new(),
            exit_phys: None,
            last_phys: None,
            next_hop: None,
            next_hop_ip: None,
            exit_interface: None,
        }));
        Ok(())
    }

    fn relax(&mut self, c: Candidate) -> Result<(), NetworkError> {
        let kind = match (c.exit_phys, c.last_phys) {
            (Some(exit), Some(last)) => match self.rules.classify(exit, last) {
                Some(kind) => Some(kind),
                None => return Ok(()),
            },
            _ => None,
        };
        if !self.visited.insert((c.node, c.exit)) {
            return Ok(());
        }

        if let Some(kind) = kind {
            self.learn(&c, kind)?;
        }

        if self.rules.max_hops().map(|max| c.hops >= max).unwrap_or(false) {
            return Ok(());
        }

        for edge in self.edges(c.node)? {
            if edge.neighbor == self.source || !self.rules.may_traverse(edge.out_link, edge.in_link)
            {
                continue;
            }
            let weight = self.rules.edge_cost(self.topology, edge.link, c.node)?;
            let cost = match NotNan::new(c.cost.into_inner() + weight) {
                Ok(cost) if cost.is_finite() => cost,
                _ => continue,
            };
            let first = c.exit.is_none();
            let mut path = c.path.clone();
            path.push(edge.link);
            self.queue.push(Reverse(Candidate {
                cost,
                node: edge.neighbor,
                exit: c.exit.or(Some(edge.link)),
                hops: c.hops + 1,
                path,
                exit_phys: c.exit_phys.or(Some(edge.out_link)),
                last_phys: Some(edge.in_link),
                next_hop: c.next_hop.or(Some(edge.neighbor)),
                next_hop_ip: if first {
                    self.topology.interface_ip(edge.link, edge.neighbor)
                } else {
                    c.next_hop_ip
                },
                exit_interface: if first {
                    self.topology.interface_ip(edge.link, self.source)
                } else {
                    c.exit_interface
                },
            }));
        }
        Ok(())
    }

    /// Learn the loopback of the reached node and the subnet of the last link.
    fn learn(&mut self, c: &Candidate, kind: RouteKind) -> Result<(), NetworkError> {
        let entry = RouteEntry {
            kind,
            next_hop_ip: c.next_hop_ip,
            exit_interface: c.exit_interface,
            cost: c.cost.into_inner(),
            next_hop: c.next_hop,
            exit_link: c.exit,
        };
        let mut subnets: Vec<(Subnet, RouteKind)> = Vec::new();
        if let Some(lo) = self.topology.get_node(c.node)?.loopback() {
            subnets.push((Ipv4Network::from(lo), kind));
        }
        if let Some(last) = c.path.last() {
            if let Some(subnet) = self.topology.get_link(*last)?.subnet() {
                subnets.push((subnet, kind));
            }
        }
        subnets.extend(self.rules.extra_routes(c.node));
        for (subnet, kind) in subnets {
            let entry = RouteEntry { kind, ..entry.clone() };
            self.table.offer(subnet, entry, self.max_paths);
        }
        Ok(())
    }

    /// Returns all usable edges of the domain leaving `node`, toward other routers of the domain.
    /// Physical links must be members of the domain. Layer-3 virtual connections are used if both
    /// of their underlying physical links are members.
    fn edges(&self, node: NodeId) -> Result<Vec<RoutingEdge>, NetworkError> {
        let subtypes = [LinkSubtype::Ethernet, LinkSubtype::Optical, LinkSubtype::L3Vc];
        let mut result = Vec::new();
        for (neighbor, link) in self.topology.neighbors(node, &subtypes) {
            if !self.domain.nodes().contains(&neighbor)
                || !self.topology.get_node(neighbor)?.is_router()
                || !self.topology.is_usable(link, self.exclusions)
            {
                continue;
            }
            let l = self.topology.get_link(link)?;
            let (out_link, in_link) = match l.underlay() {
                None => (link, link),
                Some((s, d)) if l.source() == node => (s, d),
                Some((s, d)) => (d, s),
            };
            if self.domain.links().contains(&out_link) && self.domain.links().contains(&in_link) {
                result.push(RoutingEdge { neighbor, link, out_link, in_link });
            }
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use petgraph::graph::{EdgeIndex, NodeIndex};

    fn candidate(cost: f64, node: u32, exit: Option<u32>) -> Candidate {
        Candidate {
            cost: NotNan::new(cost).unwrap(),
            node: NodeIndex::new(node as usize),
            exit: exit.map(|e| EdgeIndex::new(e as usize)),
            hops: 0,
            path: Vec::new(),
            exit_phys: None,
            last_phys: None,
            next_hop: None,
            next_hop_ip: None,
            exit_interface: None,
        }
    }

    #[test]
    fn queue_order() {
        let mut queue = BinaryHeap::new();
        queue.push(Reverse(candidate(2.0, 0, Some(0))));
        queue.push(Reverse(candidate(1.0, 5, Some(3))));
        queue.push(Reverse(candidate(1.0, 5, Some(1))));
        queue.push(Reverse(candidate(1.0, 2, Some(7))));
        let order: Vec<(f64, usize, Option<usize>)> = std::iter::from_fn(|| queue.pop())
            .map(|Reverse(c)| (c.cost.into_inner(), c.node.index(), c.exit.map(|e| e.index())))
            .collect();
        assert_eq!(
            order,
            vec![(1.0, 2, Some(7)), (1.0, 5, Some(1)), (1.0, 5, Some(3)), (2.0, 0, Some(0))]
        );
    }
}
