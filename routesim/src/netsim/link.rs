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

//! Module defining links, their per-direction state and their interfaces.

use crate::netsim::{LinkId, LinkSubtype, LinkWeight, NodeId, Subnet};
use crate::routing::bgp::BgpSessionType;
use std::net::Ipv4Addr;

/// Default capacity of each direction of a physical link
pub const DEFAULT_CAPACITY: f64 = 100.0;

/// Direction of a link, relative to its source and destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Direction {
    /// From the source to the destination (`SD`)
    SourceToDestination,
    /// From the destination to the source (`DS`)
    DestinationToSource,
}

impl Direction {
    pub(crate) fn idx(&self) -> usize {
        match self {
            Self::SourceToDestination => 0,
            Self::DestinationToSource => 1,
        }
    }

    /// Returns the opposite direction
    pub fn reverse(&self) -> Self {
        match self {
            Self::SourceToDestination => Self::DestinationToSource,
            Self::DestinationToSource => Self::SourceToDestination,
        }
    }
}

/// Interface of a link on one of its endpoints.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Interface {
    /// Name of the interface
    pub name: String,
    /// IP address, assigned during address allocation
    pub ip: Option<Ipv4Addr>,
}

/// Properties of a BGP peering. The weight is local to the router assigning it: `weight[SD]` is
/// the weight the source assigns to routes received from the destination.
#[derive(Debug, Clone, PartialEq)]
pub struct BgpPeering {
    /// Kind of the session
    pub session_type: BgpSessionType,
    pub(crate) weight: [u32; 2],
}

impl BgpPeering {
    /// Weight assigned by the router on the departing side of `direction` to the routes received
    /// over this peering.
    pub fn weight(&self, direction: Direction) -> u32 {
        self.weight[direction.idx()]
    }
}

/// # Link
/// A link between two nodes. Physical links own their per-direction state (cost, capacity,
/// traffic and flow). Virtual connections only reference the physical link on each endpoint, and
/// the [`Topology`](crate::netsim::Topology) resolves every per-direction access onto those.
#[derive(Debug, Clone)]
pub struct Link {
    name: String,
    link_id: LinkId,
    subtype: LinkSubtype,
    source: NodeId,
    destination: NodeId,
    pub(crate) cost: [LinkWeight; 2],
    pub(crate) capacity: [f64; 2],
    pub(crate) traffic: [f64; 2],
    pub(crate) flow: [f64; 2],
    pub(crate) interfaces: [Interface; 2],
    pub(crate) subnet: Option<Subnet>,
    /// physical link at the source and at the destination, only for virtual connections
    pub(crate) underlay: Option<(LinkId, LinkId)>,
    /// the link was created by the address allocation, and will be recreated by it
    pub(crate) automatic: bool,
    pub(crate) bgp: Option<BgpPeering>,
}

impl Link {
    pub(crate) fn new(
        name: String,
        link_id: LinkId,
        subtype: LinkSubtype,
        source: NodeId,
        destination: NodeId,
    ) -> Self {
        let interfaces = [
            Interface { name: format!("{}-{}", name, source.index()), ip: None },
            Interface { name: format!("{}-{}", name, destination.index()), ip: None },
        ];
        Self {
            name,
            link_id,
            subtype,
            source,
            destination,
            cost: [1.0, 1.0],
            capacity: [DEFAULT_CAPACITY, DEFAULT_CAPACITY],
            traffic: [0.0, 0.0],
            flow: [0.0, 0.0],
            interfaces,
            subnet: None,
            underlay: None,
            automatic: false,
            bgp: None,
        }
    }

    /// Return the id of the link
    pub fn link_id(&self) -> LinkId {
        self.link_id
    }

    /// Return the name of the link
    pub fn name(&self) -> &str {
        self.name.as_ref()
    }

    /// Return the subtype of the link
    pub fn subtype(&self) -> LinkSubtype {
        self.subtype
    }

    /// Return the source node
    pub fn source(&self) -> NodeId {
        self.source
    }

    /// Return the destination node
    pub fn destination(&self) -> NodeId {
        self.destination
    }

    /// Returns the subnet assigned to the link (after address allocation)
    pub fn subnet(&self) -> Option<Subnet> {
        self.subnet
    }

    /// Returns the properties of a BGP peering
    pub fn bgp_peering(&self) -> Option<&BgpPeering> {
        self.bgp.as_ref()
    }

    /// Returns the physical links at the source and destination of a virtual connection.
    pub fn underlay(&self) -> Option<(LinkId, LinkId)> {
        self.underlay
    }

    /// Returns true if the node is either the source or the destination.
    pub fn has_endpoint(&self, node: NodeId) -> bool {
        self.source == node || self.destination == node
    }

    /// Direction of the link when leaving `node`.
    pub fn direction_from(&self, node: NodeId) -> Option<Direction> {
        if node == self.source {
            Some(Direction::SourceToDestination)
        } else if node == self.destination {
            Some(Direction::DestinationToSource)
        } else {
            None
        }
    }

    /// Returns the endpoint at the other side of `node`.
    pub fn other_end(&self, node: NodeId) -> Option<NodeId> {
        match self.direction_from(node)? {
            Direction::SourceToDestination => Some(self.destination),
            Direction::DestinationToSource => Some(self.source),
        }
    }

    /// Returns the interface of the link at `node`.
    pub fn interface_of(&self, node: NodeId) -> Option<&Interface> {
        self.direction_from(node).map(|d| &self.interfaces[d.idx()])
    }

    /// Returns the traffic of a direction. For virtual connections, this is always zero, the
    /// traffic is accounted on the underlying physical links.
    pub fn traffic(&self, direction: Direction) -> f64 {
        self.traffic[direction.idx()]
    }

    /// Returns the flow of a direction, as computed by the last flow computation.
    pub fn flow(&self, direction: Direction) -> f64 {
        self.flow[direction.idx()]
    }

    /// Returns the cost of a direction, as stored on this link.
    pub fn cost(&self, direction: Direction) -> LinkWeight {
        self.cost[direction.idx()]
    }

    /// Returns the capacity of a direction, as stored on this link.
    pub fn capacity(&self, direction: Direction) -> f64 {
        self.capacity[direction.idx()]
    }

    /// Traffic from the source to the destination
    pub fn traffic_sd(&self) -> f64 {
        self.traffic[0]
    }

    /// Traffic from the destination to the source
    pub fn traffic_ds(&self) -> f64 {
        self.traffic[1]
    }
}
