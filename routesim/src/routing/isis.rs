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

//! # IS-IS
//!
//! Two-level link-state routing. Every router belongs to exactly one area. Routers of a
//! non-backbone area that have no link into another area are level-1 routers: they only learn
//! routes within their own area, plus a default route toward the closest L1/L2 border router.
//! Only the first border router reached provides the default route, equal-cost paths toward it
//! are kept. All other routers (L1/L2 border routers and backbone routers) learn the full
//! topology. Their routes are classified as [`RouteKind::IsisL1`] if the first and the last link
//! are in the same non-backbone area, and as [`RouteKind::IsisL2`] otherwise.
//!
//! A router of a non-backbone area never reaches another non-backbone area by leaving over a link
//! of its own area. Such a route would skip the backbone, and it is rejected.

use crate::netsim::{
    default_route, AreaId, AutonomousSystem, LinkId, NetworkError, NodeId, Subnet,
};
use crate::routing::builder::RouteRules;
use crate::routing::RouteKind;
use std::collections::BTreeMap;

/// Rules of the IS-IS route builder for one source router
#[derive(Debug, Clone)]
pub struct IsisRules<'a> {
    domain: &'a AutonomousSystem,
    link_area: BTreeMap<LinkId, AreaId>,
    source_area: AreaId,
    level_1: bool,
    /// border router the default route was learned at
    default_via: Option<NodeId>,
}

impl<'a> IsisRules<'a> {
    /// Create the rules for the given source. The source and every link of the domain must be in
    /// exactly one area.
    pub fn new(domain: &'a AutonomousSystem, source: NodeId) -> Result<Self, NetworkError> {
        let source_area = domain.single_area(source.into())?;
        let link_area = domain.link_areas()?;
        let level_1 = !source_area.is_backbone() && !domain.is_border_router(source);
        Ok(Self { domain, link_area, source_area, level_1, default_via: None })
    }

    /// Returns true if the source is a level-1 router
    pub fn is_level_1(&self) -> bool {
        self.level_1
    }

    fn area(&self, link: LinkId) -> Option<AreaId> {
        self.link_area.get(&link).copied()
    }
}

impl<'a> RouteRules for IsisRules<'a> {
    fn may_traverse(&self, out_link: LinkId, in_link: LinkId) -> bool {
        let own = Some(self.source_area);
        !self.level_1 || (self.area(out_link) == own && self.area(in_link) == own)
    }

    fn classify(&self, exit: LinkId, last: LinkId) -> Option<RouteKind> {
        if self.level_1 {
            return Some(RouteKind::IsisL1);
        }
        let exit_area = self.area(exit)?;
        let last_area = self.area(last)?;
        if exit_area == last_area && !exit_area.is_backbone() {
            Some(RouteKind::IsisL1)
        } else if !self.source_area.is_backbone()
            && exit_area == self.source_area
            && !last_area.is_backbone()
            && last_area != self.source_area
        {
            None
        } else {
            Some(RouteKind::IsisL2)
        }
    }

    fn extra_routes(&mut self, node: NodeId) -> Vec<(Subnet, RouteKind)> {
        if self.level_1 && self.domain.is_border_router(node) {
            if *self.default_via.get_or_insert(node) != node {
                return Vec::new();
            }
            vec![(default_route(), RouteKind::IsisL1Default)]
        } else {
            Vec::new()
        }
    }
}
