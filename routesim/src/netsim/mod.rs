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

#![deny(missing_docs, missing_debug_implementations)]

//! # NetSim
//!
//! This module contains the topology model of the simulator: nodes and links stored in an arena
//! (a [`StableGraph`](petgraph::stable_graph::StableGraph) indexed by [`NodeId`] and [`LinkId`]),
//! the protocol domains ([`AutonomousSystem`](autonomous_system::AutonomousSystem) with their
//! [`Areas`](autonomous_system::Area)), the address allocation and the network-wide
//! configuration. Everything is accessed through the [`Network`].
//!
//! ## Example usage
//!
//! The following example builds two OSPF areas connected by the backbone. Router `r2` touches
//! both areas, and becomes an area border router after the AS topology was updated.
//!
//! ```rust
//! use routesim::netsim::{AreaId, AsType, LinkSubtype::*, Network, NodeSubtype::*};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut net = Network::new();
//!     let r1 = net.create_node("r1", Router);
//!     let r2 = net.create_node("r2", Router);
//!     let r3 = net.create_node("r3", Router);
//!     let l12 = net.create_link(Ethernet, r1, r2)?;
//!     let l23 = net.create_link(Ethernet, r2, r3)?;
//!
//!     let ospf = net.create_as(AsType::Ospf, "ospf")?;
//!     net.add_to_as(ospf, vec![r1.into(), r2.into(), r3.into(), l12.into(), l23.into()])?;
//!     let area = net.create_area(ospf, "area1")?;
//!     net.add_to_area(ospf, area, vec![l23.into()])?;
//!     net.update_as_topology()?;
//!
//!     let domain = net.get_as(ospf)?;
//!     assert!(domain.is_border_router(r2));
//!     assert_eq!(domain.areas_of_node(r1), vec![AreaId::BACKBONE].into_iter().collect());
//!     Ok(())
//! }
//! ```

pub mod addressing;
pub mod autonomous_system;
pub mod config;
pub mod link;
pub(crate) mod network;
pub mod node;
pub mod printer;
pub mod topology;
pub(crate) mod types;

pub use autonomous_system::{Area, AutonomousSystem};
pub use link::{BgpPeering, Direction, Interface, Link};
pub use network::{Network, TrafficReport};
pub use node::{AsProperties, Node};
pub use topology::Topology;
pub use types::{
    default_route, AreaId, AsId, AsType, ConfigError, ExclusionSet, LinkId, LinkSubtype, LinkWeight,
    NetworkError, NodeId, NodeSubtype, ObjectId, Subnet, TrafficId,
};
