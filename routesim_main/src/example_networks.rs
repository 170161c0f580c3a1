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

use routesim::example_networks::random::{random_net, RandomNetParams};
use routesim::example_networks::*;
use routesim::netsim::{Network, NetworkError};

use clap::ValueEnum;
use std::fmt;

/// Network on which the command is run
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topology {
    /// Small network for maximum-flow problems
    FlowNet,
    /// Small network for minimum spanning trees
    MstNet,
    /// Small network with unique shortest paths
    PathNet,
    /// Chain of routers split into areas (variant 0: OSPF, variant 1: IS-IS)
    AreaNet,
    /// Three routers in two BGP AS
    BgpNet,
    /// Routers attached to a switched segment
    SwitchedNet,
    /// Random network, generated from the seed
    Random,
}

impl fmt::Display for Topology {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Topology::FlowNet => write!(f, "FlowNet"),
            Topology::MstNet => write!(f, "MstNet"),
            Topology::PathNet => write!(f, "PathNet"),
            Topology::AreaNet => write!(f, "AreaNet"),
            Topology::BgpNet => write!(f, "BgpNet"),
            Topology::SwitchedNet => write!(f, "SwitchedNet"),
            Topology::Random => write!(f, "Random"),
        }
    }
}

/// Build the selected network. The variant is ignored for networks without variants, and used as
/// the seed for the random network.
pub fn get_net(topology: Topology, variant: usize) -> Result<Network, NetworkError> {
    Ok(match topology {
        Topology::FlowNet => FlowNet::net(0),
        Topology::MstNet => MstNet::net(0),
        Topology::PathNet => PathNet::net(0),
        Topology::AreaNet => AreaNet::net(variant.min(1)),
        Topology::BgpNet => BgpNet::net(variant.min(1)),
        Topology::SwitchedNet => SwitchedNet::net(variant.min(1)),
        Topology::Random => random_net(&RandomNetParams::default(), variant as u64)?,
    })
}
