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

//! # Path Finder
//!
//! Maps a traffic demand onto the computed route tables. Starting at the source router with the
//! full throughput, every router looks up the destination subnet (falling back to the default
//! route), splits the throughput evenly over all live entries, and forwards each share to the
//! next-hop. The traffic is accumulated on every traversed physical link, in the direction it is
//! traversed. Virtual connections load both of their underlying physical links.
//!
//! Throughput that cannot be forwarded (no entry and no default route), or that enters a
//! forwarding loop, is not an error. It is reported in the [`TrafficPath`].

use crate::netsim::{
    Direction, ExclusionSet, LinkId, NetworkError, NodeId, Subnet, Topology, TrafficId,
};
use ipnetwork::Ipv4Network;
use log::*;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// # Traffic Demand
/// Throughput from a source router toward the loopback of the destination router.
#[derive(Debug, Clone, PartialEq)]
pub struct Traffic {
    traffic_id: TrafficId,
    source: NodeId,
    destination: NodeId,
    throughput: f64,
    pub(crate) path: TrafficPath,
}

impl Traffic {
    pub(crate) fn new(
        traffic_id: TrafficId,
        source: NodeId,
        destination: NodeId,
        throughput: f64,
    ) -> Self {
        Self { traffic_id, source, destination, throughput, path: TrafficPath::default() }
    }

    /// Returns the id of the demand
    pub fn traffic_id(&self) -> TrafficId {
        self.traffic_id
    }

    /// Returns the source router
    pub fn source(&self) -> NodeId {
        self.source
    }

    /// Returns the destination router
    pub fn destination(&self) -> NodeId {
        self.destination
    }

    /// Returns the throughput of the demand
    pub fn throughput(&self) -> f64 {
        self.throughput
    }

    /// Returns the path computed by the last run of the path finder
    pub fn path(&self) -> &TrafficPath {
        &self.path
    }
}

/// Result of routing a single demand
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrafficPath {
    /// Throughput carried by each traversed link (physical links or virtual connections)
    pub links: BTreeMap<LinkId, f64>,
    /// All traversed nodes
    pub nodes: BTreeSet<NodeId>,
    /// Throughput reaching the destination
    pub delivered: f64,
    /// Throughput dropped, because some router had no route
    pub dropped: f64,
    /// Throughput that entered a forwarding loop
    pub looped: f64,
}

impl TrafficPath {
    /// Returns true if the whole throughput reached the destination
    pub fn is_complete(&self) -> bool {
        self.dropped == 0.0 && self.looped == 0.0
    }
}

/// Traffic accumulated on each physical link during one run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinkLoad {
    load: HashMap<LinkId, [f64; 2]>,
}

impl LinkLoad {
    /// Returns the traffic of the link, `[SD, DS]`
    pub fn get(&self, link: LinkId) -> [f64; 2] {
        self.load.get(&link).copied().unwrap_or([0.0, 0.0])
    }

    /// Returns the traffic of the link in the given direction
    pub fn get_dir(&self, link: LinkId, direction: Direction) -> f64 {
        self.get(link)[direction.idx()]
    }

    /// Iterate over all loaded links
    pub fn iter(&self) -> impl Iterator<Item = (&LinkId, &[f64; 2])> {
        self.load.iter()
    }

    fn add(&mut self, link: LinkId, direction: Direction, amount: f64) {
        self.load.entry(link).or_insert([0.0, 0.0])[direction.idx()] += amount;
    }
}

/// # Traffic Report
/// Result of one run of the path finder
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrafficReport {
    /// Path of every demand
    pub paths: BTreeMap<TrafficId, TrafficPath>,
    /// Accumulated load on the physical links
    pub load: LinkLoad,
}

impl TrafficReport {
    /// Returns the throughput of the demand that reached its destination
    pub fn delivered(&self, traffic: TrafficId) -> Option<f64> {
        self.paths.get(&traffic).map(|p| p.delivered)
    }

    /// Returns the throughput of the demand that was dropped or looped
    pub fn undelivered(&self, traffic: TrafficId) -> Option<f64> {
        self.paths.get(&traffic).map(|p| p.dropped + p.looped)
    }

    /// Returns all demands that were not completely delivered
    pub fn unrouted(&self) -> Vec<TrafficId> {
        self.paths.iter().filter(|(_, p)| !p.is_complete()).map(|(id, _)| *id).collect()
    }

    /// Returns the accumulated traffic on a physical link, `[SD, DS]`
    pub fn link_traffic(&self, link: LinkId) -> [f64; 2] {
        self.load.get(link)
    }
}

struct Forwarder<'a> {
    topology: &'a Topology,
    exclusions: &'a ExclusionSet,
    destination: NodeId,
    subnet: Subnet,
    on_path: Vec<NodeId>,
}

/// Route a single demand over the route tables, adding its traffic to `load`.
pub fn route_traffic(
    topology: &Topology,
    traffic: &Traffic,
    exclusions: &ExclusionSet,
    load: &mut LinkLoad,
) -> Result<TrafficPath, NetworkError> {
    let mut path = TrafficPath::default();
    let subnet = topology.get_node(traffic.destination)?.loopback().map(Ipv4Network::from);
    let subnet = match subnet {
        Some(subnet) => subnet,
        None => {
            warn!("Destination of traffic {:?} has no address", traffic.traffic_id);
            path.dropped = traffic.throughput;
            return Ok(path);
        }
    };
    if exclusions.contains_node(traffic.source) {
        path.dropped = traffic.throughput;
        return Ok(path);
    }
    let mut forwarder = Forwarder {
        topology,
        exclusions,
        destination: traffic.destination,
        subnet,
        on_path: Vec::new(),
    };
    forwarder.forward(traffic.source, traffic.throughput, &mut path, load)?;
    if !path.is_complete() {
        warn!(
            "Traffic {:?}: {} dropped, {} looped",
            traffic.traffic_id, path.dropped, path.looped
        );
    }
    Ok(path)
}

impl<'a> Forwarder<'a> {
    fn forward(
        &mut self,
        node: NodeId,
        amount: f64,
        path: &mut TrafficPath,
        load: &mut LinkLoad,
    ) -> Result<(), NetworkError> {
        path.nodes.insert(node);
        if node == self.destination {
            path.delivered += amount;
            return Ok(());
        }
        if self.on_path.contains(&node) {
            path.looped += amount;
            return Ok(());
        }

        let hops: Vec<(LinkId, NodeId)> = match self
            .topology
            .get_node(node)?
            .route_table()
            .lookup(&self.subnet)
        {
            Some(entries) => entries
                .iter()
                .filter_map(|e| Some((e.exit_link?, e.next_hop?)))
                .filter(|(l, n)| {
                    self.topology.is_usable(*l, self.exclusions)
                        && !self.exclusions.contains_node(*n)
                })
                .collect(),
            None => Vec::new(),
        };
        if hops.is_empty() {
            path.dropped += amount;
            return Ok(());
        }

        let share = amount / hops.len() as f64;
        self.on_path.push(node);
        for (link, next) in hops {
            self.add_load(link, node, next, share, load)?;
            *path.links.entry(link).or_insert(0.0) += share;
            self.forward(next, share, path, load)?;
        }
        self.on_path.pop();
        Ok(())
    }

    /// Add the traffic sent from `from` to `to` over `link` onto the physical links.
    fn add_load(
        &self,
        link: LinkId,
        from: NodeId,
        to: NodeId,
        amount: f64,
        load: &mut LinkLoad,
    ) -> Result<(), NetworkError> {
        let l = self.topology.get_link(link)?;
        match l.underlay() {
            None => {
                let dir = l.direction_from(from).ok_or(NetworkError::NotAnEndpoint(link, from))?;
                load.add(link, dir, amount);
            }
            Some(_) => {
                let out = self.topology.physical_link_at(link, from)?;
                let dir = self
                    .topology
                    .get_link(out)?
                    .direction_from(from)
                    .ok_or(NetworkError::NotAnEndpoint(out, from))?;
                load.add(out, dir, amount);
                let inc = self.topology.physical_link_at(link, to)?;
                let dir = self
                    .topology
                    .get_link(inc)?
                    .direction_from(to)
                    .ok_or(NetworkError::NotAnEndpoint(inc, to))?;
                load.add(inc, dir.reverse(), amount);
            }
        }
        Ok(())
    }
}
