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

//! Module defining a network node with its route tables.

use crate::netsim::{AsId, LinkId, NodeId, NodeSubtype, Subnet};
use crate::routing::bgp::BgpTable;
use crate::routing::RouteTable;
use std::collections::{BTreeMap, HashMap};
use std::net::Ipv4Addr;

/// Default number of equal-cost paths retained per subnet
pub const DEFAULT_LB_PATHS: usize = 1;

/// Properties of a node that are specific to one AS it belongs to.
#[derive(Debug, Clone, PartialEq)]
pub struct AsProperties {
    /// Maximum number of ECMP entries retained per subnet (`K`)
    pub lb_paths: usize,
    /// Router ID in this AS
    pub router_id: Option<Ipv4Addr>,
    /// Priority, used by the spanning tree root election (lower is better)
    pub priority: u32,
}

impl Default for AsProperties {
    fn default() -> Self {
        Self { lb_paths: DEFAULT_LB_PATHS, router_id: None, priority: 32768 }
    }
}

/// # Node
/// A node in the topology. Routers own a route table and a BGP table, which are rebuilt from
/// scratch by the computation pipeline.
#[derive(Debug, Clone)]
pub struct Node {
    name: String,
    node_id: NodeId,
    subtype: NodeSubtype,
    pub(crate) loopback: Option<Ipv4Addr>,
    pub(crate) as_properties: HashMap<AsId, AsProperties>,
    /// configured static routes, mapping the subnet to the next-hop IP
    pub(crate) static_routes: BTreeMap<Subnet, Ipv4Addr>,
    pub(crate) route_table: RouteTable,
    pub(crate) bgp_table: BgpTable,
    pub(crate) arp_table: BTreeMap<Ipv4Addr, (LinkId, NodeId)>,
}

impl Node {
    pub(crate) fn new(name: String, node_id: NodeId, subtype: NodeSubtype) -> Self {
        Self {
            name,
            node_id,
            subtype,
            loopback: None,
            as_properties: HashMap::new(),
            static_routes: BTreeMap::new(),
            route_table: RouteTable::new(),
            bgp_table: BgpTable::new(),
            arp_table: BTreeMap::new(),
        }
    }

    /// Return the id of the node
    pub fn node_id(&self) -> NodeId {
        self.node_id
    }

    /// Return the name of the node
    pub fn name(&self) -> &str {
        self.name.as_ref()
    }

    /// Return the subtype of the node
    pub fn subtype(&self) -> NodeSubtype {
        self.subtype
    }

    /// Returns true if the node is a router
    pub fn is_router(&self) -> bool {
        self.subtype.is_router()
    }

    /// Return the loopback address (after address allocation)
    pub fn loopback(&self) -> Option<Ipv4Addr> {
        self.loopback
    }

    /// Returns the properties of the node in an AS. If the node is not a member of the AS, the
    /// default properties are returned.
    pub fn as_properties(&self, as_id: AsId) -> AsProperties {
        self.as_properties.get(&as_id).cloned().unwrap_or_default()
    }

    /// Returns the maximum number of ECMP paths (`K`) in the AS.
    pub fn lb_paths(&self, as_id: AsId) -> usize {
        self.as_properties.get(&as_id).map(|p| p.lb_paths).unwrap_or(DEFAULT_LB_PATHS)
    }

    /// Returns the configured static routes
    pub fn static_routes(&self) -> &BTreeMap<Subnet, Ipv4Addr> {
        &self.static_routes
    }

    /// Returns the route table, mapping every known subnet to its set of routes.
    pub fn route_table(&self) -> &RouteTable {
        &self.route_table
    }

    /// Returns the BGP table
    pub fn bgp_table(&self) -> &BgpTable {
        &self.bgp_table
    }

    /// Returns the ARP table, mapping neighbor interface addresses to the link and the neighbor.
    pub fn arp_table(&self) -> &BTreeMap<Ipv4Addr, (LinkId, NodeId)> {
        &self.arp_table
    }

    /// Clear every computed table
    pub(crate) fn clear_tables(&mut self) {
        self.route_table.clear();
        self.bgp_table.clear();
    }
}
