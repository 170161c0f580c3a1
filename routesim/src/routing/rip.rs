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

//! # RIP
//!
//! Distance-vector routing: every hop costs 1, independent of the configured link cost. Routes
//! with more than [`RIP_MAX_HOPS`] hops are unreachable.

use crate::netsim::{LinkId, LinkWeight, NetworkError, NodeId, Topology};
use crate::routing::builder::RouteRules;
use crate::routing::RouteKind;

/// Maximum hop count of a RIP route. A metric of 16 means infinity.
pub const RIP_MAX_HOPS: usize = 15;

/// Rules of the RIP route builder
#[derive(Debug, Clone, Copy, Default)]
pub struct RipRules;

impl RouteRules for RipRules {
    fn edge_cost(&self, _: &Topology, _: LinkId, _: NodeId) -> Result<LinkWeight, NetworkError> {
        Ok(1.0)
    }

    fn classify(&self, _exit: LinkId, _last: LinkId) -> Option<RouteKind> {
        Some(RouteKind::Rip)
    }

    fn max_hops(&self) -> Option<usize> {
        Some(RIP_MAX_HOPS)
    }
}
