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

//! # AS/Area Membership
//!
//! Partition of the topology into named protocol domains. An object may belong to several
//! [`AutonomousSystem`]s, and within an AS that supports areas (OSPF and IS-IS) to a set of
//! [`Area`]s. The area membership is recomputed by [`AutonomousSystem::update_topology`]:
//!
//! - **IS-IS**: every node belongs to exactly one area. A link joins the area of its endpoints if
//!   both share the same area. Otherwise, the link is assigned to the backbone, and both endpoints
//!   become border routers (L1/L2).
//! - **OSPF**: every link belongs to exactly one area. A node joins every area of its incident
//!   links. A node with more than one area is an area border router, and is forced into the
//!   backbone.
//!
//! Both recomputations only derive state from the authoritative tags (node tags for IS-IS, link
//! tags for OSPF). Hence, running them twice without a topology change yields the same result.

use crate::netsim::{
    AreaId, AsId, AsType, LinkId, LinkWeight, NetworkError, NodeId, ObjectId, Topology,
};
use log::*;
use std::collections::{BTreeMap, BTreeSet};

/// Default reference bandwidth, used to derive OSPF and IS-IS link costs from the capacity.
pub const DEFAULT_REFERENCE_BANDWIDTH: LinkWeight = 100.0;

/// Area within an Autonomous System
#[derive(Debug, Clone, PartialEq)]
pub struct Area {
    area_id: AreaId,
    name: String,
    pub(crate) nodes: BTreeSet<NodeId>,
    pub(crate) links: BTreeSet<LinkId>,
}

impl Area {
    fn new(area_id: AreaId, name: String) -> Self {
        Self { area_id, name, nodes: BTreeSet::new(), links: BTreeSet::new() }
    }

    /// Returns the id of the area
    pub fn area_id(&self) -> AreaId {
        self.area_id
    }

    /// Returns the name of the area
    pub fn name(&self) -> &str {
        self.name.as_ref()
    }

    /// Returns the nodes of the area
    pub fn nodes(&self) -> &BTreeSet<NodeId> {
        &self.nodes
    }

    /// Returns the links of the area
    pub fn links(&self) -> &BTreeSet<LinkId> {
        &self.links
    }

    /// Returns true if the object is a member of the area
    pub fn contains(&self, object: ObjectId) -> bool {
        match object {
            ObjectId::Node(n) => self.nodes.contains(&n),
            ObjectId::Link(l) => self.links.contains(&l),
        }
    }

    fn insert(&mut self, object: ObjectId) -> bool {
        match object {
            ObjectId::Node(n) => self.nodes.insert(n),
            ObjectId::Link(l) => self.links.insert(l),
        }
    }

    fn remove(&mut self, object: ObjectId) -> bool {
        match object {
            ObjectId::Node(n) => self.nodes.remove(&n),
            ObjectId::Link(l) => self.links.remove(&l),
        }
    }
}

/// # Autonomous System
/// A protocol domain, grouping nodes and links. For hierarchical protocols, the AS owns a map of
/// areas, the backbone area ([`AreaId::BACKBONE`]) always exists.
#[derive(Debug, Clone)]
pub struct AutonomousSystem {
    as_id: AsId,
    name: String,
    as_type: AsType,
    pub(crate) nodes: BTreeSet<NodeId>,
    pub(crate) links: BTreeSet<LinkId>,
    pub(crate) areas: BTreeMap<AreaId, Area>,
    pub(crate) border_routers: BTreeSet<NodeId>,
    pub(crate) reference_bandwidth: LinkWeight,
    pub(crate) stp_root: Option<NodeId>,
    pub(crate) stp_tree: BTreeSet<LinkId>,
}

impl AutonomousSystem {
    pub(crate) fn new(as_id: AsId, name: String, as_type: AsType) -> Self {
        let mut areas = BTreeMap::new();
        if as_type.has_areas() {
            areas.insert(AreaId::BACKBONE, Area::new(AreaId::BACKBONE, String::from("Backbone")));
        }
        Self {
            as_id,
            name,
            as_type,
            nodes: BTreeSet::new(),
            links: BTreeSet::new(),
            areas,
            border_routers: BTreeSet::new(),
            reference_bandwidth: DEFAULT_REFERENCE_BANDWIDTH,
            stp_root: None,
            stp_tree: BTreeSet::new(),
        }
    }

    /// Returns the id of the AS
    pub fn as_id(&self) -> AsId {
        self.as_id
    }

    /// Returns the name of the AS
    pub fn name(&self) -> &str {
        self.name.as_ref()
    }

    /// Returns the type of the AS
    pub fn as_type(&self) -> AsType {
        self.as_type
    }

    /// Returns all member nodes
    pub fn nodes(&self) -> &BTreeSet<NodeId> {
        &self.nodes
    }

    /// Returns all member links
    pub fn links(&self) -> &BTreeSet<LinkId> {
        &self.links
    }

    /// Returns the reference bandwidth, used to derive link costs
    pub fn reference_bandwidth(&self) -> LinkWeight {
        self.reference_bandwidth
    }

    /// Returns true if the object is a member of the AS
    pub fn contains(&self, object: ObjectId) -> bool {
        match object {
            ObjectId::Node(n) => self.nodes.contains(&n),
            ObjectId::Link(l) => self.links.contains(&l),
        }
    }

    /// Returns true if the node is a border router (touching more than one area).
    pub fn is_border_router(&self, node: NodeId) -> bool {
        self.border_routers.contains(&node)
    }

    /// Returns all border routers, computed during the last topology update.
    pub fn border_routers(&self) -> &BTreeSet<NodeId> {
        &self.border_routers
    }

    /// Returns the root bridge of a spanning tree domain
    pub fn stp_root(&self) -> Option<NodeId> {
        self.stp_root
    }

    /// Returns the links in forwarding state of a spanning tree domain. All other links of the AS
    /// are blocked.
    pub fn stp_tree(&self) -> &BTreeSet<LinkId> {
        &self.stp_tree
    }

    /// Iterate over all areas
    pub fn areas(&self) -> impl Iterator<Item = &Area> {
        self.areas.values()
    }

    /// Returns a reference to an area
    pub fn get_area(&self, area: AreaId) -> Result<&Area, NetworkError> {
        self.areas.get(&area).ok_or(NetworkError::AreaNotFound(self.as_id, area))
    }

    /// Returns the id of the area with the given name
    pub fn get_area_id(&self, name: impl AsRef<str>) -> Option<AreaId> {
        self.areas.values().find(|a| a.name() == name.as_ref()).map(|a| a.area_id())
    }

    /// Create a new area, or return the existing area with the same name.
    pub fn area_factory(&mut self, name: impl Into<String>) -> Result<AreaId, NetworkError> {
        if !self.as_type.has_areas() {
            return Err(NetworkError::AreasNotSupported(self.as_id));
        }
        let name = name.into();
        if let Some(id) = self.get_area_id(&name) {
            return Ok(id);
        }
        let area_id = AreaId(self.areas.keys().map(|a| a.0 + 1).max().unwrap_or(1));
        self.areas.insert(area_id, Area::new(area_id, name));
        Ok(area_id)
    }

    /// Returns the areas of which the node is a member.
    pub fn areas_of_node(&self, node: NodeId) -> BTreeSet<AreaId> {
        self.areas_of(node.into())
    }

    /// Returns the areas of which the link is a member.
    pub fn areas_of_link(&self, link: LinkId) -> BTreeSet<AreaId> {
        self.areas_of(link.into())
    }

    fn areas_of(&self, object: ObjectId) -> BTreeSet<AreaId> {
        self.areas.values().filter(|a| a.contains(object)).map(|a| a.area_id()).collect()
    }

    /// Returns the only area of an object. If the object is not in exactly one area, an
    /// invariant violation is reported.
    pub fn single_area(&self, object: ObjectId) -> Result<AreaId, NetworkError> {
        let areas = self.areas_of(object);
        match (areas.len(), areas.iter().next()) {
            (1, Some(area)) => Ok(*area),
            (n, _) => {
                Err(NetworkError::AreaMembership { as_id: self.as_id, object, areas: n })
            }
        }
    }

    /// Returns the only area of every link of the AS. Fails on the first link that is not in
    /// exactly one area.
    pub fn link_areas(&self) -> Result<BTreeMap<LinkId, AreaId>, NetworkError> {
        self.links.iter().map(|l| self.single_area((*l).into()).map(|area| (*l, area))).collect()
    }

    /// Add an object to the AS. Objects of an AS with areas initially join the backbone.
    pub(crate) fn add_member(&mut self, object: ObjectId) -> bool {
        let inserted = match object {
            ObjectId::Node(n) => self.nodes.insert(n),
            ObjectId::Link(l) => self.links.insert(l),
        };
        if inserted && self.as_type.has_areas() && self.areas_of(object).is_empty() {
            if let Some(backbone) = self.areas.get_mut(&AreaId::BACKBONE) {
                backbone.insert(object);
            }
        }
        inserted
    }

    /// Remove an object from the AS and from every area.
    pub(crate) fn remove_member(&mut self, object: ObjectId) -> bool {
        for area in self.areas.values_mut() {
            area.remove(object);
        }
        match object {
            ObjectId::Node(n) => {
                self.border_routers.remove(&n);
                if self.stp_root == Some(n) {
                    self.stp_root = None;
                }
                self.nodes.remove(&n)
            }
            ObjectId::Link(l) => {
                self.stp_tree.remove(&l);
                self.links.remove(&l)
            }
        }
    }

    /// Add an object to an area. The object must already be a member of the AS. IS-IS nodes and
    /// OSPF links belong to exactly one area, they are moved out of their previous area.
    pub(crate) fn add_to_area(
        &mut self,
        area: AreaId,
        object: ObjectId,
    ) -> Result<(), NetworkError> {
        if !self.as_type.has_areas() {
            return Err(NetworkError::AreasNotSupported(self.as_id));
        }
        self.get_area(area)?;
        if !self.contains(object) {
            return Err(NetworkError::NotAMember(self.as_id, object));
        }
        let exclusive = matches!(
            (self.as_type, object),
            (AsType::Isis, ObjectId::Node(_)) | (AsType::Ospf, ObjectId::Link(_))
        );
        if exclusive {
            for a in self.areas.values_mut() {
                a.remove(object);
            }
        }
        if let Some(a) = self.areas.get_mut(&area) {
            a.insert(object);
        }
        Ok(())
    }

    /// Remove an object from an area.
    pub(crate) fn remove_from_area(
        &mut self,
        area: AreaId,
        object: ObjectId,
    ) -> Result<(), NetworkError> {
        self.areas
            .get_mut(&area)
            .ok_or(NetworkError::AreaNotFound(self.as_id, area))?
            .remove(object);
        Ok(())
    }

    /// Recompute the area membership and the border routers from the current topology.
    pub fn update_topology(&mut self, topology: &Topology) -> Result<(), NetworkError> {
        match self.as_type {
            AsType::Isis => self.update_isis_topology(topology),
            AsType::Ospf => self.update_ospf_topology(topology),
            _ => Ok(()),
        }
    }

    fn update_isis_topology(&mut self, topology: &Topology) -> Result<(), NetworkError> {
        let mut node_area: BTreeMap<NodeId, AreaId> = BTreeMap::new();
        for node in self.nodes.iter() {
            node_area.insert(*node, self.single_area((*node).into())?);
        }

        let mut border_routers = BTreeSet::new();
        let mut link_area: BTreeMap<LinkId, AreaId> = BTreeMap::new();
        for link in self.links.iter() {
            let l = topology.get_link(*link)?;
            let area = match (node_area.get(&l.source()), node_area.get(&l.destination())) {
                (Some(a), Some(b)) if a == b => *a,
                (Some(_), Some(_)) => {
                    border_routers.insert(l.source());
                    border_routers.insert(l.destination());
                    AreaId::BACKBONE
                }
                _ => AreaId::BACKBONE,
            };
            link_area.insert(*link, area);
        }

        for area in self.areas.values_mut() {
            area.links.clear();
        }
        for (link, area) in link_area {
            if let Some(a) = self.areas.get_mut(&area) {
                a.links.insert(link);
            }
        }
        debug!("IS-IS {}: border routers {:?}", self.name, border_routers);
        self.border_routers = border_routers;
        Ok(())
    }

    fn update_ospf_topology(&mut self, topology: &Topology) -> Result<(), NetworkError> {
        let mut link_area: BTreeMap<LinkId, AreaId> = BTreeMap::new();
        for link in self.links.iter() {
            link_area.insert(*link, self.single_area((*link).into())?);
        }

        let mut border_routers = BTreeSet::new();
        let mut node_areas: BTreeMap<NodeId, BTreeSet<AreaId>> = BTreeMap::new();
        for node in self.nodes.iter() {
            let mut areas: BTreeSet<AreaId> = topology
                .neighbors(*node, &[])
                .into_iter()
                .filter_map(|(_, l)| link_area.get(&l))
                .copied()
                .collect();
            if areas.is_empty() {
                // a node without any link in the AS keeps its current areas
                areas = self.areas_of_node(*node);
                if areas.is_empty() {
                    areas.insert(AreaId::BACKBONE);
                }
            }
            if areas.len() > 1 {
                border_routers.insert(*node);
                areas.insert(AreaId::BACKBONE);
            }
            node_areas.insert(*node, areas);
        }

        for area in self.areas.values_mut() {
            area.nodes.clear();
        }
        for (node, areas) in node_areas {
            for area in areas {
                if let Some(a) = self.areas.get_mut(&area) {
                    a.nodes.insert(node);
                }
            }
        }
        debug!("OSPF {}: area border routers {:?}", self.name, border_routers);
        self.border_routers = border_routers;
        Ok(())
    }
}
