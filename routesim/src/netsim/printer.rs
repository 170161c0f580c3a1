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

//! # Helper (printer) functions for the Network
//! Module containing helper functions to get formatted strings of the computed state, where all
//! node names are inserted.

use crate::algorithms::Path;
use crate::netsim::config::{Config, ConfigExpr};
use crate::netsim::network::{Network, TrafficReport};
use crate::netsim::{Direction, NetworkError, NodeId};
use crate::routing::RouteEntry;

fn name_of(net: &Network, node: Option<NodeId>) -> Result<String, NetworkError> {
    Ok(match node {
        Some(n) => net.get_node_name(n)?.to_string(),
        None => String::from("-"),
    })
}

/// Returns the formatted string of a single route entry.
pub fn route_entry(net: &Network, entry: &RouteEntry) -> Result<String, NetworkError> {
    Ok(format!(
        "{kind:<5} cost: {cost}, via: {nh}, next hop IP: {ip}, exit: {exit}",
        kind = entry.kind.to_string(),
        cost = entry.cost,
        nh = name_of(net, entry.next_hop)?,
        ip = entry.next_hop_ip.map(|ip| ip.to_string()).unwrap_or_else(|| String::from("-")),
        exit = match entry.exit_link {
            Some(link) => net.get_link(link)?.name().to_string(),
            None => String::from("-"),
        },
    ))
}

/// Returns the route table of a router, one subnet per block, with all its entries.
pub fn route_table(net: &Network, router: NodeId) -> Result<String, NetworkError> {
    let node = net.get_node(router)?;
    let mut result = format!("Route table of {}\n", node.name());
    for (subnet, entries) in node.route_table().iter() {
        result.push_str(&format!("{}\n", subnet));
        for entry in entries {
            result.push_str(&format!("    {}\n", route_entry(net, entry)?));
        }
    }
    Ok(result)
}

/// Returns the BGP table of a router. The best entry of each subnet is prefixed with a `*`, while
/// all other entries are prefixed with nothing (` `).
pub fn bgp_table(net: &Network, router: NodeId) -> Result<String, NetworkError> {
    let node = net.get_node(router)?;
    let table = node.bgp_table();
    let mut result = format!("BGP table of {}\n", node.name());
    for (subnet, entries) in table.iter() {
        let best = table.best(subnet);
        for entry in entries {
            result.push_str(&format!(
                "{} {}, weight: {}, as_path: {:?}, next hop IP: {}, origin: {}\n",
                if Some(entry) == best { "*" } else { " " },
                subnet,
                entry.weight,
                entry.as_path.iter().map(|x| x.0).collect::<Vec<u32>>(),
                entry.next_hop_ip.map(|ip| ip.to_string()).unwrap_or_else(|| String::from("-")),
                net.get_node_name(entry.boundary_node)?,
            ));
        }
    }
    Ok(result)
}

/// Returns the path as a sequence of node names, together with its cost.
pub fn path(net: &Network, path: &Path) -> Result<String, NetworkError> {
    if path.is_empty() {
        return Ok(String::from("no path"));
    }
    Ok(format!(
        "{} (cost: {})",
        path.nodes
            .iter()
            .map(|n| net.get_node_name(*n).map(String::from))
            .collect::<Result<Vec<String>, NetworkError>>()?
            .join(" -> "),
        path.cost
    ))
}

/// Returns one line per traffic demand, stating how much of the throughput was delivered.
pub fn traffic_report(net: &Network, report: &TrafficReport) -> Result<String, NetworkError> {
    let mut result = String::new();
    for (id, path) in report.paths.iter() {
        let traffic = net.get_traffic(*id)?;
        result.push_str(&format!(
            "{} -> {}: {} of {} delivered, {} dropped, {} looped\n",
            net.get_node_name(traffic.source())?,
            net.get_node_name(traffic.destination())?,
            path.delivered,
            traffic.throughput(),
            path.dropped,
            path.looped,
        ));
    }
    Ok(result)
}

/// Returns the traffic, the flow and the capacity of every physical link, in both directions.
pub fn link_traffic(net: &Network) -> Result<String, NetworkError> {
    let mut result = String::new();
    for link_id in net.topology().physical_links() {
        let link = net.get_link(link_id)?;
        for dir in [Direction::SourceToDestination, Direction::DestinationToSource] {
            let (from, to) = match dir {
                Direction::SourceToDestination => (link.source(), link.destination()),
                Direction::DestinationToSource => (link.destination(), link.source()),
            };
            result.push_str(&format!(
                "{} -> {}: traffic: {}, flow: {}, capacity: {}\n",
                net.get_node_name(from)?,
                net.get_node_name(to)?,
                link.traffic(dir),
                link.flow(dir),
                link.capacity(dir),
            ));
        }
    }
    Ok(result)
}

/// Returns the config expr as a string, where all node names are inserted.
pub fn config_expr(net: &Network, expr: &ConfigExpr) -> Result<String, NetworkError> {
    Ok(match expr {
        ConfigExpr::LinkCost { link, from, cost } => format!(
            "Link Cost: {} from {}: {}",
            net.get_link(*link)?.name(),
            net.get_node_name(*from)?,
            cost
        ),
        ConfigExpr::LinkCapacity { link, from, capacity } => format!(
            "Link Capacity: {} from {}: {}",
            net.get_link(*link)?.name(),
            net.get_node_name(*from)?,
            capacity
        ),
        ConfigExpr::StaticRoute { router, subnet, next_hop } => format!(
            "Static Route: {}: Subnet {} via {}",
            net.get_node_name(*router)?,
            subnet,
            next_hop
        ),
        ConfigExpr::LoadBalancing { router, as_id, paths } => format!(
            "Load Balancing: {} in {}: {} paths",
            net.get_node_name(*router)?,
            net.get_as(*as_id)?.name(),
            paths
        ),
        ConfigExpr::RouterPriority { router, as_id, priority } => format!(
            "Router Priority: {} in {}: {}",
            net.get_node_name(*router)?,
            net.get_as(*as_id)?.name(),
            priority
        ),
        ConfigExpr::ReferenceBandwidth { as_id, bandwidth } => {
            format!("Reference Bandwidth: {}: {}", net.get_as(*as_id)?.name(), bandwidth)
        }
        ConfigExpr::BgpWeight { peering, from, weight } => format!(
            "BGP Weight: {} from {}: {}",
            net.get_link(*peering)?.name(),
            net.get_node_name(*from)?,
            weight
        ),
    })
}

/// Returns the complete configuration, one expression per line.
pub fn config(net: &Network, config: &Config) -> Result<String, NetworkError> {
    let mut lines = config.iter().map(|e| config_expr(net, e)).collect::<Result<Vec<_>, _>>()?;
    lines.sort();
    let body = lines.iter().map(|l| format!("    {}", l)).collect::<Vec<_>>().join("\n");
    Ok(format!("Config {{\n{}\n}}", body))
}
