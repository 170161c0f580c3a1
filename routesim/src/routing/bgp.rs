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

//! # BGP Table Builder
//!
//! Path-vector expansion over the BGP peerings. For every router, the builder explores the
//! peering graph outward, in the order of the accumulated inverse weight: crossing a peering that
//! the departing router configured with weight `w` costs `1 / w` (infinite for `w = 0`). The first
//! time a router is reached, all subnets it originates (its connected subnets) are installed with
//! the weight of the first-hop peering, and the AS path accumulated so far. The AS path only grows
//! when crossing an eBGP session, by the BGP AS of the router on the far side.
//!
//! Locally originated routes are installed with weight [`LOCAL_WEIGHT`].

use crate::netsim::{
    AsId, AsType, Direction, ExclusionSet, LinkSubtype, Network, NetworkError, NodeId, Subnet,
};
use crate::routing::RouteKind;
use log::*;
use ordered_float::NotNan;
use std::cmp::Reverse;
use std::collections::{BTreeMap, BinaryHeap, HashMap, HashSet};
use std::net::Ipv4Addr;

/// Weight of locally originated routes
pub const LOCAL_WEIGHT: u32 = 32768;

/// Kind of a BGP session
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BgpSessionType {
    /// Session within the same AS
    IBgp,
    /// Session between different AS
    EBgp,
}

/// Entry of a BGP table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BgpEntry {
    /// Weight, local to the router owning the table (higher is preferred)
    pub weight: u32,
    /// IP address of the first-hop peer
    pub next_hop_ip: Option<Ipv4Addr>,
    /// Router originating the subnet
    pub boundary_node: NodeId,
    /// AS path accumulated over eBGP sessions
    pub as_path: Vec<AsId>,
}

/// # BGP Table
/// All BGP entries of a router, indexed by the subnet, in the order they were learned.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BgpTable {
    routes: BTreeMap<Subnet, Vec<BgpEntry>>,
}

impl BgpTable {
    /// Create an empty BGP table
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all entries of the subnet
    pub fn get(&self, subnet: &Subnet) -> Option<&Vec<BgpEntry>> {
        self.routes.get(subnet)
    }

    /// Returns the best entry of the subnet: highest weight, then shortest AS path, then the entry
    /// learned first.
    pub fn best(&self, subnet: &Subnet) -> Option<&BgpEntry> {
        let key = |e: &BgpEntry| (e.weight, Reverse(e.as_path.len()));
        self.routes.get(subnet)?.iter().fold(None, |best: Option<&BgpEntry>, e| match best {
            Some(b) if key(b) >= key(e) => Some(b),
            _ => Some(e),
        })
    }

    /// Iterate over all subnets and their entries
    pub fn iter(&self) -> impl Iterator<Item = (&Subnet, &Vec<BgpEntry>)> {
        self.routes.iter()
    }

    /// Returns the number of subnets
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Returns true if the table is empty
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Remove all entries
    pub fn clear(&mut self) {
        self.routes.clear();
    }

    fn insert(&mut self, subnet: Subnet, entry: BgpEntry) {
        self.routes.entry(subnet).or_insert_with(Vec::new).push(entry);
    }
}

/// Returns the BGP AS of every router that is a member of one. A router that is a member of more
/// than one BGP AS is reported as an error.
pub fn bgp_membership(net: &Network) -> Result<HashMap<NodeId, AsId>, NetworkError> {
    let mut membership: HashMap<NodeId, AsId> = HashMap::new();
    for domain in net.autonomous_systems().filter(|a| a.as_type() == AsType::Bgp) {
        for node in domain.nodes() {
            if membership.insert(*node, domain.as_id()).is_some() {
                return Err(NetworkError::MultipleBgpAs(*node));
            }
        }
    }
    Ok(membership)
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct Candidate {
    cost: NotNan<f64>,
    node: NodeId,
    weight: u32,
    as_path: Vec<AsId>,
    next_hop_ip: Option<Ipv4Addr>,
}

fn inverse_weight(weight: u32) -> NotNan<f64> {
    NotNan::new(if weight == 0 { f64::INFINITY } else { 1.0 / weight as f64 })
        .unwrap_or_default()
}

/// Build the BGP table of `source`. The route tables must already be computed, since every
/// router originates its connected subnets.
pub fn build_bgp_table(
    net: &Network,
    source: NodeId,
    exclusions: &ExclusionSet,
    membership: &HashMap<NodeId, AsId>,
) -> Result<BgpTable, NetworkError> {
    let topology = net.topology();
    let mut table = BgpTable::new();
    if exclusions.contains_node(source) {
        return Ok(table);
    }
    let mut visited: HashSet<NodeId> = HashSet::new();
    let mut queue: BinaryHeap<Reverse<Candidate>> = BinaryHeap::new();
    queue.push(Reverse(Candidate {
        cost: NotNan::default(),
        node: source,
        weight: LOCAL_WEIGHT,
        as_path: Vec::new(),
        next_hop_ip: None,
    }));

    while let Some(Reverse(c)) = queue.pop() {
        if !visited.insert(c.node) {
            continue;
        }
        let node = topology.get_node(c.node)?;
        for (subnet, entries) in node.route_table().iter() {
            if entries.iter().any(|e| e.kind == RouteKind::Connected) {
                table.insert(
                    *subnet,
                    BgpEntry {
                        weight: c.weight,
                        next_hop_ip: c.next_hop_ip,
                        boundary_node: c.node,
                        as_path: c.as_path.clone(),
                    },
                );
            }
        }

        for (peer, link) in topology.neighbors(c.node, &[LinkSubtype::BgpPeering]) {
            if visited.contains(&peer) || !topology.is_usable(link, exclusions) {
                continue;
            }
            let l = topology.get_link(link)?;
            let peering = match l.bgp_peering() {
                Some(p) => p,
                None => continue,
            };
            let dir = l.direction_from(c.node).unwrap_or(Direction::SourceToDestination);
            let weight = peering.weight(dir);
            let mut as_path = c.as_path.clone();
            if peering.session_type == BgpSessionType::EBgp {
                match membership.get(&peer) {
                    Some(as_id) => as_path.push(*as_id),
                    None => return Err(NetworkError::NoBgpAs(peer)),
                }
            }
            let first = c.node == source;
            queue.push(Reverse(Candidate {
                cost: NotNan::new(c.cost.into_inner() + inverse_weight(weight).into_inner())
                    .unwrap_or_default(),
                node: peer,
                weight: if first { weight } else { c.weight },
                as_path,
                next_hop_ip: if first {
                    topology.get_node(peer)?.loopback()
                } else {
                    c.next_hop_ip
                },
            }));
        }
    }
    debug!("BGP table of {}: {} subnets", topology.get_node(source)?.name(), table.len());
    Ok(table)
}
