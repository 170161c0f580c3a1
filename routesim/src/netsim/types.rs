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

//! Module containing all type definitions

use ipnetwork::Ipv4Network;
use petgraph::prelude::*;
use std::collections::HashSet;
use std::fmt;
use std::net::Ipv4Addr;
use thiserror::Error;

type IndexType = u32;
/// Node Identification (and index into the topology graph)
pub type NodeId = NodeIndex<IndexType>;
/// Link Identification (and index into the topology graph)
pub type LinkId = EdgeIndex<IndexType>;
/// IP Subnetwork, the key of all route tables.
pub type Subnet = Ipv4Network;
/// Cost of a link direction
pub type LinkWeight = f64;

/// Identification of an Autonomous System (protocol domain, not a public AS number)
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Clone, Copy)]
pub struct AsId(pub u32);

/// Identification of an Area, local to its Autonomous System.
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Clone, Copy)]
pub struct AreaId(pub u32);

impl AreaId {
    /// The backbone area, which exists in every AS that supports areas.
    pub const BACKBONE: AreaId = AreaId(0);

    /// Returns true if the area is the backbone area.
    pub fn is_backbone(&self) -> bool {
        *self == Self::BACKBONE
    }
}

/// Identification of a traffic demand
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Clone, Copy)]
pub struct TrafficId(pub u32);

/// Kind of a node
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Clone, Copy)]
pub enum NodeSubtype {
    /// Layer-3 device, computes route tables
    Router,
    /// Layer-2 device, attached routers share a multi-access segment
    Switch,
    /// End host
    Host,
}

impl NodeSubtype {
    /// Returns true if the node is a router
    pub fn is_router(&self) -> bool {
        matches!(self, Self::Router)
    }
}

/// Kind of a link.
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Clone, Copy)]
pub enum LinkSubtype {
    /// Physical ethernet link
    Ethernet,
    /// Physical optical link
    Optical,
    /// Layer-2 virtual connection over a multi-access segment
    L2Vc,
    /// Layer-3 virtual connection over a multi-access segment
    L3Vc,
    /// Logical BGP peering between two routers
    BgpPeering,
}

impl LinkSubtype {
    /// All physical link subtypes
    pub const PHYSICAL: [LinkSubtype; 2] = [LinkSubtype::Ethernet, LinkSubtype::Optical];

    /// Returns true if the link owns cost, capacity and traffic state.
    pub fn is_physical(&self) -> bool {
        matches!(self, Self::Ethernet | Self::Optical)
    }

    /// Returns true if the link is a virtual connection, delegating to physical links.
    pub fn is_virtual(&self) -> bool {
        matches!(self, Self::L2Vc | Self::L3Vc)
    }
}

impl fmt::Display for LinkSubtype {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Ethernet => write!(f, "ethernet"),
            Self::Optical => write!(f, "optical"),
            Self::L2Vc => write!(f, "l2vc"),
            Self::L3Vc => write!(f, "l3vc"),
            Self::BgpPeering => write!(f, "bgp-peering"),
        }
    }
}

/// Type of an Autonomous System
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Clone, Copy)]
pub enum AsType {
    /// Routing Information Protocol
    Rip,
    /// Open Shortest Path First
    Ospf,
    /// Intermediate System to Intermediate System
    Isis,
    /// Border Gateway Protocol
    Bgp,
    /// Spanning Tree Protocol
    Stp,
    /// Virtual LAN (membership only)
    Vlan,
}

impl AsType {
    /// Returns true if the domain is partitioned into areas.
    pub fn has_areas(&self) -> bool {
        matches!(self, Self::Ospf | Self::Isis)
    }

    /// Returns true if the domain computes IGP route tables.
    pub fn is_igp(&self) -> bool {
        matches!(self, Self::Rip | Self::Ospf | Self::Isis)
    }
}

/// Reference to any object that can be a member of an AS or an Area.
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Clone, Copy)]
pub enum ObjectId {
    /// A node
    Node(NodeId),
    /// A link
    Link(LinkId),
}

impl From<NodeId> for ObjectId {
    fn from(id: NodeId) -> Self {
        Self::Node(id)
    }
}

impl From<LinkId> for ObjectId {
    fn from(id: LinkId) -> Self {
        Self::Link(id)
    }
}

/// # Exclusion Set
/// Set of nodes and links that are considered failed for one computation. The set is passed
/// explicitly into every algorithm, route builder and the path finder, such that several what-if
/// computations never interfere with each other.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExclusionSet {
    nodes: HashSet<NodeId>,
    links: HashSet<LinkId>,
}

impl ExclusionSet {
    /// Create an empty exclusion set, nothing has failed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an exclusion set with a single failed link
    pub fn from_link(link: LinkId) -> Self {
        let mut s = Self::new();
        s.exclude_link(link);
        s
    }

    /// Create an exclusion set with a single failed node
    pub fn from_node(node: NodeId) -> Self {
        let mut s = Self::new();
        s.exclude_node(node);
        s
    }

    /// Mark a node as failed
    pub fn exclude_node(&mut self, node: NodeId) {
        self.nodes.insert(node);
    }

    /// Mark a link as failed
    pub fn exclude_link(&mut self, link: LinkId) {
        self.links.insert(link);
    }

    /// Returns true if the node is excluded
    pub fn contains_node(&self, node: NodeId) -> bool {
        self.nodes.contains(&node)
    }

    /// Returns true if the link is excluded
    pub fn contains_link(&self, link: LinkId) -> bool {
        self.links.contains(&link)
    }

    /// Returns true if nothing is excluded
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.links.is_empty()
    }
}

/// Build a subnet from a raw address and a prefix length. The address is masked with the prefix.
pub(crate) fn subnet(address: u32, prefix: u8) -> Subnet {
    let prefix = prefix.min(32);
    let mask = if prefix == 0 { 0 } else { u32::MAX << (32 - prefix) };
    let network = Ipv4Addr::from(address & mask);
    // the prefix is clamped to at most 32, which is always accepted.
    Ipv4Network::new(network, prefix).unwrap_or_else(|_| Ipv4Network::from(network))
}

/// The default route, `0.0.0.0/0`
pub fn default_route() -> Subnet {
    subnet(0, 0)
}

/// Configuration Error
#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    /// The added expression would overwrite an existing expression
    #[error("The new ConfigExpr would overwrite an existing one!")]
    ConfigExprOverload,
    /// The expression to remove does not exist
    #[error("The ConfigExpr does not exist!")]
    ConfigExprNotFound,
}

/// Network Errors
#[derive(Error, Debug, PartialEq)]
pub enum NetworkError {
    /// Configuration error
    #[error("Configuration Error: {0}")]
    ConfigError(#[from] ConfigError),
    /// Node is not present in the topology
    #[error("Node was not found in topology: {0:?}")]
    NodeNotFound(NodeId),
    /// Node name is not present in the topology
    #[error("Node name was not found in topology: {0}")]
    NodeNameNotFound(String),
    /// Link is not present in the topology
    #[error("Link was not found in topology: {0:?}")]
    LinkNotFound(LinkId),
    /// The node is not an endpoint of the link
    #[error("Node {1:?} is not an endpoint of link {0:?}")]
    NotAnEndpoint(LinkId, NodeId),
    /// Links from a node to itself are not allowed
    #[error("Cannot create a link from {0:?} to itself")]
    SelfLoop(NodeId),
    /// The link has the wrong subtype for the operation
    #[error("Link {0:?} has the wrong subtype: {1}")]
    WrongLinkSubtype(LinkId, LinkSubtype),
    /// The subtype cannot be used for the operation
    #[error("Unexpected link subtype: {0}")]
    UnexpectedSubtype(LinkSubtype),
    /// The node must be a router
    #[error("Node {0:?} is not a router")]
    NotARouter(NodeId),
    /// A virtual connection must be built on physical links attached to its endpoints
    #[error("Invalid virtual connection over {0:?} and {1:?}")]
    InvalidVirtualConnection(LinkId, LinkId),
    /// Autonomous system does not exist
    #[error("Autonomous system was not found: {0:?}")]
    AsNotFound(AsId),
    /// An AS with the same name already exists
    #[error("Autonomous system name already exists: {0}")]
    AsNameAlreadyExists(String),
    /// Area does not exist in the AS
    #[error("Area {1:?} was not found in {0:?}")]
    AreaNotFound(AsId, AreaId),
    /// The AS type does not support areas
    #[error("Autonomous system {0:?} does not support areas")]
    AreasNotSupported(AsId),
    /// The object must be a member of the AS before it joins an area
    #[error("Object {1:?} is not a member of {0:?}")]
    NotAMember(AsId, ObjectId),
    /// The object has not exactly the number of areas required by its protocol
    #[error("Invariant violation in {as_id:?}: {object:?} belongs to {areas} areas")]
    AreaMembership {
        /// The affected AS
        as_id: AsId,
        /// The object with the wrong number of areas
        object: ObjectId,
        /// The number of areas the object belongs to
        areas: usize,
    },
    /// A router is a member of several BGP autonomous systems
    #[error("Invariant violation: router {0:?} belongs to several BGP AS")]
    MultipleBgpAs(NodeId),
    /// A router with an eBGP peering is not a member of any BGP AS
    #[error("Router {0:?} has an eBGP peering, but belongs to no BGP AS")]
    NoBgpAs(NodeId),
    /// Addresses are not yet allocated
    #[error("No address allocated for {0:?}")]
    NoAddress(NodeId),
    /// Traffic demand does not exist
    #[error("Traffic demand was not found: {0:?}")]
    TrafficNotFound(TrafficId),
}
