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

//! # OSPF
//!
//! Link-state routing with areas. The cost of each link direction is the configured cost, which
//! defaults to `reference_bandwidth / capacity` when the link is added to the domain. A route is
//! intra-area if its first link and its last link belong to the same area, and inter-area
//! otherwise. Intra-area routes are preferred over inter-area routes, independent of their cost
//! (see [`RouteKind::preference`]).

use crate::netsim::{AreaId, AutonomousSystem, LinkId, NetworkError};
use crate::routing::builder::RouteRules;
use crate::routing::RouteKind;
use std::collections::BTreeMap;

/// Rules of the OSPF route builder
#[derive(Debug, Clone)]
pub struct OspfRules {
    link_area: BTreeMap<LinkId, AreaId>,
}

impl OspfRules {
    /// Create the rules for the given OSPF domain. Every link of the domain must be in exactly
    /// one area.
    pub fn new(domain: &AutonomousSystem) -> Result<Self, NetworkError> {
        Ok(Self { link_area: domain.link_areas()? })
    }
}

impl RouteRules for OspfRules {
    fn classify(&self, exit: LinkId, last: LinkId) -> Option<RouteKind> {
        if self.link_area.get(&exit)? == self.link_area.get(&last)? {
            Some(RouteKind::OspfIntra)
        } else {
            Some(RouteKind::OspfInterArea)
        }
    }
}
