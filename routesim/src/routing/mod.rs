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

//! # Routing
//!
//! This module computes the routing state of a [`Network`](crate::netsim::Network). For every
//! router, the [`RouteTable`] is filled by running the route builder of every interior gateway
//! protocol the router participates in ([`rip`], [`ospf`] and [`isis`]), together with the
//! configured [`static_routes`]. Afterwards, [`bgp`] computes the BGP tables, and the
//! [`path_finder`] maps every traffic demand onto the route tables.
//!
//! Several protocols may write into the same route table. An entry with a better administrative
//! preference (see [`RouteKind::preference`]) replaces all entries of worse preference. Entries of
//! the same preference follow the cost and ECMP rules: a strictly better cost replaces the set,
//! an equal cost is added as long as less than `K` entries are stored.

pub mod bgp;
pub mod builder;
pub mod isis;
pub mod ospf;
pub mod path_finder;
pub mod rip;
pub mod static_routes;
pub mod stp;

pub use path_finder::{Traffic, TrafficPath};

use crate::netsim::{default_route, LinkId, LinkWeight, NodeId, Subnet};
use std::collections::BTreeMap;
use std::fmt;
use std::net::Ipv4Addr;

/// Kind of a route entry, carrying the protocol that installed it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RouteKind {
    /// Directly attached subnet
    Connected,
    /// Configured static route
    Static,
    /// Learned by RIP
    Rip,
    /// Learned by OSPF within the same area
    OspfIntra,
    /// Learned by OSPF across areas
    OspfInterArea,
    /// Learned by IS-IS within a level-1 area
    IsisL1,
    /// Default route of a level-1 router, pointing to the closest L1/L2 router
    IsisL1Default,
    /// Learned by IS-IS over the level-2 backbone
    IsisL2,
}

impl RouteKind {
    /// Administrative preference of the route kind. Lower is better.
    pub fn preference(&self) -> u8 {
        match self {
            Self::Connected => 0,
            Self::Static => 1,
            Self::OspfIntra => 10,
            Self::OspfInterArea => 11,
            Self::IsisL1 => 20,
            Self::IsisL2 => 21,
            Self::IsisL1Default => 22,
            Self::Rip => 30,
        }
    }
}

impl fmt::Display for RouteKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            Self::Connected => "C",
            Self::Static => "S",
            Self::Rip => "R",
            Self::OspfIntra => "O",
            Self::OspfInterArea => "O IA",
            Self::IsisL1 => "i L1",
            Self::IsisL1Default => "i*L1",
            Self::IsisL2 => "i L2",
        };
        write!(f, "{}", s)
    }
}

/// # Route Entry
/// One way of reaching a subnet. Connected routes have neither a next-hop nor an exit link.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteEntry {
    /// Kind of the route
    pub kind: RouteKind,
    /// IP address of the next-hop interface
    pub next_hop_ip: Option<Ipv4Addr>,
    /// IP address of the local exit interface
    pub exit_interface: Option<Ipv4Addr>,
    /// Accumulated cost
    pub cost: LinkWeight,
    /// Next-hop router
    pub next_hop: Option<NodeId>,
    /// First link on the way (may be a virtual connection)
    pub exit_link: Option<LinkId>,
}

impl RouteEntry {
    /// Create a route entry for a directly attached subnet
    pub fn connected(exit_link: Option<LinkId>, exit_interface: Option<Ipv4Addr>) -> Self {
        Self {
            kind: RouteKind::Connected,
            next_hop_ip: None,
            exit_interface,
            cost: 0.0,
            next_hop: None,
            exit_link,
        }
    }

    /// Returns true if both entries use the same first hop.
    fn same_hop(&self, other: &Self) -> bool {
        self.exit_link == other.exit_link && self.next_hop == other.next_hop
    }
}

/// # Route Table
/// Mapping from subnet to the set of equal-cost entries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RouteTable {
    routes: BTreeMap<Subnet, Vec<RouteEntry>>,
}

impl RouteTable {
    /// Create an empty route table
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the entries of exactly this subnet
    pub fn get(&self, subnet: &Subnet) -> Option<&Vec<RouteEntry>> {
        self.routes.get(subnet)
    }

    /// Returns the entries used to forward toward `subnet`. If the table has no entry for the
    /// subnet, the default route `0.0.0.0/0` is used.
    pub fn lookup(&self, subnet: &Subnet) -> Option<&Vec<RouteEntry>> {
        self.routes.get(subnet).or_else(|| self.routes.get(&default_route()))
    }

    /// Returns true if an entry for the subnet exists
    pub fn contains(&self, subnet: &Subnet) -> bool {
        self.routes.contains_key(subnet)
    }

    /// Iterate over all subnets and their entries, ordered by the subnet.
    pub fn iter(&self) -> impl Iterator<Item = (&Subnet, &Vec<RouteEntry>)> {
        self.routes.iter()
    }

    /// Returns the number of subnets in the table
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Returns true if the table has no entry
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Remove all entries
    pub fn clear(&mut self) {
        self.routes.clear()
    }

    /// Offer a new entry for a subnet, keeping at most `max_paths` entries. Returns true if the
    /// entry was stored.
    pub(crate) fn offer(&mut self, subnet: Subnet, entry: RouteEntry, max_paths: usize) -> bool {
        let max_paths = max_paths.max(1);
        let entries = self.routes.entry(subnet).or_insert_with(Vec::new);
        let current = match entries.first() {
            Some(e) => (e.kind.preference(), e.cost),
            None => {
                entries.push(entry);
                return true;
            }
        };
        let pref = entry.kind.preference();
        if pref < current.0 || (pref == current.0 && entry.cost < current.1) {
            entries.clear();
            entries.push(entry);
            true
        } else if pref == current.0
            && entry.cost == current.1
            && entries.len() < max_paths
            && !entries.iter().any(|e| e.same_hop(&entry))
        {
            entries.push(entry);
            true
        } else {
            false
        }
    }

    /// Merge all entries of `other` into this table.
    pub(crate) fn merge(&mut self, other: RouteTable, max_paths: usize) {
        for (subnet, entries) in other.routes {
            for entry in entries {
                self.offer(subnet, entry, max_paths);
            }
        }
    }
}
