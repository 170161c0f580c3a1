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

//! # Static Routes
//!
//! Static routes are configured per router as a mapping from a subnet to a next-hop IP address.
//! The next-hop is resolved with the ARP table of the router, which maps the IP address of every
//! neighboring interface to the link and the neighbor owning it. Routes whose next-hop cannot be
//! resolved (or whose link is excluded) are skipped.

use crate::netsim::{ExclusionSet, NetworkError, NodeId, Topology};
use crate::routing::{RouteEntry, RouteKind, RouteTable};
use ipnetwork::Ipv4Network;
use log::*;

/// Build the table containing the loopback of `source` and all its resolvable static routes.
pub fn static_route_table(
    topology: &Topology,
    source: NodeId,
    exclusions: &ExclusionSet,
) -> Result<RouteTable, NetworkError> {
    let mut table = RouteTable::new();
    if exclusions.contains_node(source) {
        return Ok(table);
    }
    let node = topology.get_node(source)?;
    if let Some(lo) = node.loopback() {
        table.offer(Ipv4Network::from(lo), RouteEntry::connected(None, Some(lo)), 1);
    }
    for (subnet, next_hop_ip) in node.static_routes() {
        match node.arp_table().get(next_hop_ip) {
            Some((link, neighbor)) if topology.is_usable(*link, exclusions) => {
                let entry = RouteEntry {
                    kind: RouteKind::Static,
                    next_hop_ip: Some(*next_hop_ip),
                    exit_interface: topology.interface_ip(*link, source),
                    cost: 0.0,
                    next_hop: Some(*neighbor),
                    exit_link: Some(*link),
                };
                table.offer(*subnet, entry, 1);
            }
            Some(_) => {
                debug!("{}: next-hop {} of {} is excluded", node.name(), next_hop_ip, subnet)
            }
            None => warn!(
                "{}: cannot resolve next-hop {} of static route {}",
                node.name(),
                next_hop_ip,
                subnet
            ),
        }
    }
    Ok(table)
}
