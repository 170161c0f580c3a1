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

#![deny(missing_docs)]

//! # RouteSim: Network Topology and Routing Simulator
//! This is a library for computing the routing state of a network topology. Given a graph of
//! nodes and links, it computes the per-protocol routing tables (RIP, OSPF, IS-IS and BGP), maps
//! traffic demands onto those tables, and provides a toolkit of graph algorithms (shortest paths,
//! link-disjoint path pairs, maximum and minimum-cost flows, minimum spanning trees).
//!
//! ## Structure
//!
//! This library is structured in the following way:
//!
//! - **[`NetSim`](netsim)**: Topology model, consisting of [`Nodes`](netsim::node::Node),
//!   [`Links`](netsim::link::Link), and the protocol domains
//!   ([`AutonomousSystem`](netsim::autonomous_system::AutonomousSystem) and
//!   [`Area`](netsim::autonomous_system::Area)). The main structure is
//!   [`Network`](netsim::Network), through which the topology is edited and all computations are
//!   triggered.
//!
//! - **[`Algorithms`](algorithms)**: Graph-only algorithms (Dijkstra, constrained A*,
//!   Bellman-Ford, Floyd-Warshall, Bhandari, Suurbale, Ford-Fulkerson, Edmonds-Karp, Dinic,
//!   Kruskal and linear-program formulations). They operate on a
//!   [`CostGraph`](algorithms::CostGraph), which is extracted from the network while honoring an
//!   [`ExclusionSet`](netsim::ExclusionSet).
//!
//! - **[`Routing`](routing)**: Route table construction for every interior gateway protocol, static
//!   routes, spanning trees, the BGP table builder and the path finder mapping traffic demands onto
//!   the route tables.
//!
//! - **[`ExampleNetworks`](example_networks)**: Collection of prepared networks, used for testing
//!   and by the command-line interface.
//!
//! ## Usage
//!
//! The computation is a batch pipeline. Edit the topology, assign the protocol domains, and then
//! run the pipeline. Failure scenarios are expressed by passing an
//! [`ExclusionSet`](netsim::ExclusionSet), the network itself is never marked as failed.
//!
//! ```
//! use routesim::netsim::{AsType, ExclusionSet, LinkSubtype, Network, NodeSubtype};
//! use routesim::routing::RouteKind;
//! use routesim::Error;
//!
//! fn main() -> Result<(), Error> {
//!     let mut net = Network::new();
//!     let r1 = net.create_node("r1", NodeSubtype::Router);
//!     let r2 = net.create_node("r2", NodeSubtype::Router);
//!     let r3 = net.create_node("r3", NodeSubtype::Router);
//!     let l12 = net.create_link(LinkSubtype::Ethernet, r1, r2)?;
//!     let l23 = net.create_link(LinkSubtype::Ethernet, r2, r3)?;
//!
//!     let rip = net.create_as(AsType::Rip, "rip")?;
//!     net.add_to_as(rip, vec![r1.into(), r2.into(), r3.into(), l12.into(), l23.into()])?;
//!
//!     let demand = net.create_traffic(r1, r3, 10.0)?;
//!     let report = net.run_pipeline(&ExclusionSet::new())?;
//!
//!     let loopback = net.loopback_subnet(r3)?;
//!     let routes = net.get_node(r1)?.route_table().get(&loopback).unwrap();
//!     assert_eq!(routes[0].kind, RouteKind::Rip);
//!     assert_eq!(routes[0].cost, 2.0);
//!     assert_eq!(report.delivered(demand), Some(10.0));
//!
//!     Ok(())
//! }
//! ```

pub mod algorithms;
pub mod example_networks;
pub mod netsim;
pub mod routing;
mod test;

mod error;
pub use error::Error;
