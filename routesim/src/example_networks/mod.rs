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

//! Networks for testing

use crate::netsim::Network;

mod flownet;
pub use flownet::FlowNet;

mod mstnet;
pub use mstnet::MstNet;

mod pathnet;
pub use pathnet::PathNet;

mod areanet;
pub use areanet::AreaNet;

mod bgpnet;
pub use bgpnet::BgpNet;

mod switchednet;
pub use switchednet::SwitchedNet;

pub mod random;

/// Trait for easier access to example networks.
pub trait ExampleNetwork {
    /// Get the network with the chosen variant. Panics if the variant does not exist.
    fn net(variant: usize) -> Network;
}
