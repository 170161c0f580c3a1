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

//! # Address Allocation
//!
//! Assigns the IP addresses of the whole topology, from scratch:
//!
//! - every router gets a `/32` loopback from `192.168.0.0/16`, in the order of the node id,
//! - every physical link between two routers gets a `/30` from `10.0.0.0/8`, where the source
//!   interface gets the first and the destination interface the second host address,
//! - every layer-2 segment (set of switches connected by physical links) gets a `/24` from
//!   `172.16.0.0/12`, and each interface attached to the segment gets the next host address.
//!   Between every pair of routers attached to the same segment, an automatic layer-3 virtual
//!   connection is created.
//!
//! Afterwards, the ARP table of every router maps the IP address of each neighboring interface to
//! the link and the neighbor owning it.

use crate::netsim::types::subnet;
use crate::netsim::{LinkId, LinkSubtype, NetworkError, NodeId, NodeSubtype, Topology};
use itertools::Itertools;
use log::*;
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::net::Ipv4Addr;

const LOOPBACK_BASE: [u8; 4] = [192, 168, 0, 0];
const TRANSFER_BASE: [u8; 4] = [10, 0, 0, 0];
const SEGMENT_BASE: [u8; 4] = [172, 16, 0, 0];

/// Reassign every address, and recreate all automatic virtual connections.
pub fn allocate(topology: &mut Topology) -> Result<(), NetworkError> {
    clear(topology)?;
    allocate_loopbacks(topology)?;
    allocate_transfer_links(topology)?;
    for (idx, segment) in segments(topology).into_iter().enumerate() {
        allocate_segment(topology, idx as u32, &segment)?;
    }
    build_arp_tables(topology)?;
    Ok(())
}

fn clear(topology: &mut Topology) -> Result<(), NetworkError> {
    let automatic: Vec<LinkId> =
        topology.links().filter(|l| l.automatic).map(|l| l.link_id()).collect();
    for link in automatic {
        topology.remove_link(link)?;
    }
    for link in topology.links_mut() {
        link.subnet = None;
        link.interfaces[0].ip = None;
        link.interfaces[1].ip = None;
    }
    for node in topology.nodes_mut() {
        node.loopback = None;
        node.arp_table.clear();
    }
    Ok(())
}

fn allocate_loopbacks(topology: &mut Topology) -> Result<(), NetworkError> {
    let base = u32::from(Ipv4Addr::from(LOOPBACK_BASE));
    for (idx, router) in topology.routers().into_iter().enumerate() {
        topology.get_node_mut(router)?.loopback = Some(Ipv4Addr::from(base + 1 + idx as u32));
    }
    Ok(())
}

fn allocate_transfer_links(topology: &mut Topology) -> Result<(), NetworkError> {
    let base = u32::from(Ipv4Addr::from(TRANSFER_BASE));
    let links: Vec<LinkId> = topology
        .links()
        .filter(|l| l.subtype().is_physical())
        .filter(|l| is_router(topology, l.source()) && is_router(topology, l.destination()))
        .map(|l| l.link_id())
        .collect();
    for (idx, link) in links.into_iter().enumerate() {
        let network = base + 4 * idx as u32;
        let l = topology.get_link_mut(link)?;
        l.subnet = Some(subnet(network, 30));
        l.interfaces[0].ip = Some(Ipv4Addr::from(network + 1));
        l.interfaces[1].ip = Some(Ipv4Addr::from(network + 2));
    }
    Ok(())
}

/// A layer-2 segment: its switches and all physical links touching them.
struct Segment {
    links: BTreeSet<LinkId>,
}

/// Returns all segments, ordered by their lowest switch id.
fn segments(topology: &Topology) -> Vec<Segment> {
    let switches: Vec<NodeId> = topology
        .nodes()
        .filter(|n| n.subtype() == NodeSubtype::Switch)
        .map(|n| n.node_id())
        .collect();
    let mut seen: BTreeSet<NodeId> = BTreeSet::new();
    let mut result = Vec::new();
    for start in switches {
        if !seen.insert(start) {
            continue;
        }
        let mut links = BTreeSet::new();
        let mut queue = VecDeque::from(vec![start]);
        while let Some(switch) = queue.pop_front() {
            for (neighbor, link) in topology.neighbors(switch, &LinkSubtype::PHYSICAL) {
                links.insert(link);
                if !is_switch(topology, neighbor) || !seen.insert(neighbor) {
                    continue;
                }
                queue.push_back(neighbor);
            }
        }
        result.push(Segment { links });
    }
    result
}

fn allocate_segment(
    topology: &mut Topology,
    idx: u32,
    segment: &Segment,
) -> Result<(), NetworkError> {
    let network = u32::from(Ipv4Addr::from(SEGMENT_BASE)) + 256 * idx;
    let net = subnet(network, 24);
    let mut next_host = network + 1;
    let mut attached: Vec<(NodeId, LinkId)> = Vec::new();
    for link in segment.links.iter() {
        let (source, destination) = {
            let l = topology.get_link(*link)?;
            (l.source(), l.destination())
        };
        let ends = [(0, source), (1, destination)]
            .map(|(i, n)| (i, n, !is_switch(topology, n), is_router(topology, n)));
        let l = topology.get_link_mut(*link)?;
        l.subnet = Some(net);
        for (i, node, is_attached, router) in ends {
            if is_attached {
                l.interfaces[i].ip = Some(Ipv4Addr::from(next_host));
                next_host += 1;
                if router {
                    attached.push((node, *link));
                }
            }
        }
    }

    for ((a, la), (b, lb)) in attached.iter().tuple_combinations() {
        if a == b {
            continue;
        }
        let vc = topology.add_virtual_connection(LinkSubtype::L3Vc, *a, *b, *la, *lb)?;
        topology.get_link_mut(vc)?.automatic = true;
    }
    debug!("segment {}: {} attached routers", net, attached.len());
    Ok(())
}

fn build_arp_tables(topology: &mut Topology) -> Result<(), NetworkError> {
    let mut arp: BTreeMap<NodeId, Vec<(Ipv4Addr, LinkId, NodeId)>> = BTreeMap::new();
    for l in topology.links() {
        if l.subtype() == LinkSubtype::BgpPeering {
            continue;
        }
        for (node, neighbor) in [(l.source(), l.destination()), (l.destination(), l.source())] {
            if !is_router(topology, node) {
                continue;
            }
            if let Some(ip) = topology.interface_ip(l.link_id(), neighbor) {
                arp.entry(node).or_insert_with(Vec::new).push((ip, l.link_id(), neighbor));
            }
        }
    }
    for (node, entries) in arp {
        let table = &mut topology.get_node_mut(node)?.arp_table;
        for (ip, link, neighbor) in entries {
            table.entry(ip).or_insert((link, neighbor));
        }
    }
    Ok(())
}

fn is_router(topology: &Topology, node: NodeId) -> bool {
    topology.get_node(node).map(|n| n.is_router()).unwrap_or(false)
}

fn is_switch(topology: &Topology, node: NodeId) -> bool {
    topology.get_node(node).map(|n| n.subtype() == NodeSubtype::Switch).unwrap_or(false)
}
