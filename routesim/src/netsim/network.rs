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

//! # Top-level Network module
//!
//! This module contains the [`Network`], through which the topology is edited, the protocol
//! domains are assigned, and all computations are triggered.

use crate::algorithms::{
    self, CostGraph, DisjointPairAlgorithm, DistanceMatrix, MaxFlowAlgorithm, MinCostFlow, Path,
    PathConstraints, ShortestPathAlgorithm,
};
use crate::netsim::addressing;
use crate::netsim::config::{Config, ConfigExpr};
use crate::netsim::printer;
use crate::netsim::{
    AreaId, AsId, AsType, AutonomousSystem, BgpPeering, Direction, ExclusionSet, Link, LinkId,
    LinkSubtype, LinkWeight, NetworkError, Node, NodeId, NodeSubtype, ObjectId, Subnet, Topology,
    TrafficId,
};
use crate::routing::bgp::{bgp_membership, build_bgp_table, BgpSessionType};
use crate::routing::builder::build_route_table;
use crate::routing::path_finder::route_traffic;
use crate::routing::static_routes::static_route_table;
use crate::routing::stp::spanning_tree;
use crate::routing::{RouteTable, Traffic};
use crate::Error;

pub use crate::routing::path_finder::TrafficReport;

use ipnetwork::Ipv4Network;
use log::*;
use std::collections::{BTreeMap, BTreeSet};
use std::net::Ipv4Addr;
use std::thread;

/// # Network struct
/// The struct contains the topology (nodes and links), the protocol domains (autonomous systems
/// and their areas), the traffic demands and the configuration.
///
/// The routing state is computed by a batch pipeline ([`Network::run_pipeline`]):
///
/// 1. [`Network::update_as_topology`] recomputes the area membership,
/// 2. [`Network::allocate_addresses`] assigns all IP addresses,
/// 3. [`Network::rebuild_route_tables`] computes the route table of every router,
/// 4. [`Network::rebuild_bgp_tables`] computes the BGP table of every router, and
/// 5. [`Network::run_path_finder`] maps all traffic demands onto the route tables.
///
/// Every edit of the network invalidates all computed tables. They are never patched
/// incrementally, but recomputed from scratch.
#[derive(Debug, Clone, Default)]
pub struct Network {
    topology: Topology,
    autonomous_systems: BTreeMap<AsId, AutonomousSystem>,
    traffics: BTreeMap<TrafficId, Traffic>,
    config: Config,
    next_as_id: u32,
    next_traffic_id: u32,
}

impl Network {
    /// Generate an empty network
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a new node to the network, returning its id.
    pub fn create_node(&mut self, name: impl Into<String>, subtype: NodeSubtype) -> NodeId {
        self.invalidate();
        self.topology.add_node(name.into(), subtype)
    }

    /// Add a physical link between two nodes. Virtual connections and BGP peerings have their own
    /// factories.
    pub fn create_link(
        &mut self,
        subtype: LinkSubtype,
        source: NodeId,
        destination: NodeId,
    ) -> Result<LinkId, NetworkError> {
        if !subtype.is_physical() {
            return Err(NetworkError::UnexpectedSubtype(subtype));
        }
        self.invalidate();
        self.topology.add_link(subtype, source, destination)
    }

    /// Add a virtual connection between two nodes. The connection uses the physical link
    /// `via_source` at the source and `via_destination` at the destination.
    pub fn create_virtual_connection(
        &mut self,
        subtype: LinkSubtype,
        source: NodeId,
        destination: NodeId,
        via_source: LinkId,
        via_destination: LinkId,
    ) -> Result<LinkId, NetworkError> {
        self.invalidate();
        self.topology.add_virtual_connection(
            subtype,
            source,
            destination,
            via_source,
            via_destination,
        )
    }

    /// Add a BGP peering between two routers. Both routers assign weight 0 to the routes received
    /// over the peering, until configured otherwise.
    pub fn create_bgp_peering(
        &mut self,
        source: NodeId,
        destination: NodeId,
        session_type: BgpSessionType,
    ) -> Result<LinkId, NetworkError> {
        for node in [source, destination] {
            if !self.topology.get_node(node)?.is_router() {
                return Err(NetworkError::NotARouter(node));
            }
        }
        self.invalidate();
        let link = self.topology.add_link(LinkSubtype::BgpPeering, source, destination)?;
        self.topology.get_link_mut(link)?.bgp = Some(BgpPeering { session_type, weight: [0, 0] });
        Ok(link)
    }

    /// Remove a node, together with all its links and all traffic demands from or to it. The node
    /// and the links are removed from every AS and Area.
    pub fn remove_node(&mut self, node: NodeId) -> Result<(), NetworkError> {
        let links = self.topology.remove_node(node)?;
        for domain in self.autonomous_systems.values_mut() {
            domain.remove_member(node.into());
            for link in links.iter() {
                domain.remove_member((*link).into());
            }
        }
        self.traffics.retain(|_, t| t.source() != node && t.destination() != node);
        self.invalidate();
        Ok(())
    }

    /// Remove a link, together with all virtual connections built on top of it. All removed links
    /// are removed from every AS and Area.
    pub fn remove_link(&mut self, link: LinkId) -> Result<(), NetworkError> {
        let links = self.topology.remove_link(link)?;
        for domain in self.autonomous_systems.values_mut() {
            for link in links.iter() {
                domain.remove_member((*link).into());
            }
        }
        self.invalidate();
        Ok(())
    }

    /// Returns a reference to the topology
    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    /// Returns a reference to a node
    pub fn get_node(&self, node: NodeId) -> Result<&Node, NetworkError> {
        self.topology.get_node(node)
    }

    /// Returns a reference to a link
    pub fn get_link(&self, link: LinkId) -> Result<&Link, NetworkError> {
        self.topology.get_link(link)
    }

    /// Returns the id of the node with the given name
    pub fn get_node_id(&self, name: impl AsRef<str>) -> Result<NodeId, NetworkError> {
        self.topology.get_node_id(name)
    }

    /// Returns the name of a node
    pub fn get_node_name(&self, node: NodeId) -> Result<&str, NetworkError> {
        Ok(self.topology.get_node(node)?.name())
    }

    /// Returns the ids of all routers
    pub fn routers(&self) -> Vec<NodeId> {
        self.topology.routers()
    }

    /// Returns a reference to an AS
    pub fn get_as(&self, as_id: AsId) -> Result<&AutonomousSystem, NetworkError> {
        self.autonomous_systems.get(&as_id).ok_or(NetworkError::AsNotFound(as_id))
    }

    fn get_as_mut(&mut self, as_id: AsId) -> Result<&mut AutonomousSystem, NetworkError> {
        self.autonomous_systems.get_mut(&as_id).ok_or(NetworkError::AsNotFound(as_id))
    }

    /// Returns the id of the AS with the given name
    pub fn get_as_id(&self, name: impl AsRef<str>) -> Option<AsId> {
        self.autonomous_systems.values().find(|a| a.name() == name.as_ref()).map(|a| a.as_id())
    }

    /// Iterate over all AS, ordered by their id
    pub fn autonomous_systems(&self) -> impl Iterator<Item = &AutonomousSystem> {
        self.autonomous_systems.values()
    }

    /// Returns the configuration applied last with [`Network::set_config`].
    pub fn current_config(&self) -> &Config {
        &self.config
    }

    /// Create a new AS. The name must be unique.
    pub fn create_as(
        &mut self,
        as_type: AsType,
        name: impl Into<String>,
    ) -> Result<AsId, NetworkError> {
        let name = name.into();
        if self.get_as_id(&name).is_some() {
            return Err(NetworkError::AsNameAlreadyExists(name));
        }
        let as_id = AsId(self.next_as_id);
        self.next_as_id += 1;
        self.autonomous_systems.insert(as_id, AutonomousSystem::new(as_id, name, as_type));
        self.invalidate();
        Ok(as_id)
    }

    /// Add nodes and links to an AS. The protocol-specific defaults are applied to every new
    /// physical link: OSPF and IS-IS derive the cost of each direction from the reference
    /// bandwidth and the capacity, RIP and STP use cost 1.
    pub fn add_to_as(
        &mut self,
        as_id: AsId,
        objects: impl IntoIterator<Item = ObjectId>,
    ) -> Result<(), NetworkError> {
        let (as_type, reference_bandwidth) = {
            let domain = self.get_as(as_id)?;
            (domain.as_type(), domain.reference_bandwidth())
        };
        for object in objects {
            match object {
                ObjectId::Node(node) => {
                    self.topology
                        .get_node_mut(node)?
                        .as_properties
                        .entry(as_id)
                        .or_insert_with(Default::default);
                }
                ObjectId::Link(link) => {
                    self.topology.get_link(link)?;
                    self.apply_link_defaults(as_type, reference_bandwidth, link)?;
                }
            }
            self.get_as_mut(as_id)?.add_member(object);
        }
        self.invalidate();
        Ok(())
    }

    fn apply_link_defaults(
        &mut self,
        as_type: AsType,
        reference_bandwidth: LinkWeight,
        link: LinkId,
    ) -> Result<(), NetworkError> {
        let l = self.topology.get_link_mut(link)?;
        if !l.subtype().is_physical() {
            return Ok(());
        }
        match as_type {
            AsType::Ospf | AsType::Isis => {
                for dir in [Direction::SourceToDestination, Direction::DestinationToSource] {
                    let capacity = l.capacity(dir);
                    l.cost[dir.idx()] = if capacity > 0.0 {
                        reference_bandwidth / capacity
                    } else {
                        LinkWeight::INFINITY
                    };
                }
            }
            AsType::Rip | AsType::Stp => l.cost = [1.0, 1.0],
            AsType::Bgp | AsType::Vlan => {}
        }
        Ok(())
    }

    /// Remove nodes and links from an AS, and from all its areas.
    pub fn remove_from_as(
        &mut self,
        as_id: AsId,
        objects: impl IntoIterator<Item = ObjectId>,
    ) -> Result<(), NetworkError> {
        for object in objects {
            if !self.get_as_mut(as_id)?.remove_member(object) {
                return Err(NetworkError::NotAMember(as_id, object));
            }
            if let ObjectId::Node(node) = object {
                self.topology.get_node_mut(node)?.as_properties.remove(&as_id);
            }
        }
        self.invalidate();
        Ok(())
    }

    /// Create a new area in an OSPF or IS-IS domain, or return the existing area with this name.
    pub fn create_area(
        &mut self,
        as_id: AsId,
        name: impl Into<String>,
    ) -> Result<AreaId, NetworkError> {
        let area = self.get_as_mut(as_id)?.area_factory(name)?;
        self.invalidate();
        Ok(area)
    }

    /// Add objects of an AS to one of its areas. IS-IS nodes and OSPF links are moved out of
    /// their previous area.
    pub fn add_to_area(
        &mut self,
        as_id: AsId,
        area: AreaId,
        objects: impl IntoIterator<Item = ObjectId>,
    ) -> Result<(), NetworkError> {
        let domain = self.get_as_mut(as_id)?;
        for object in objects {
            domain.add_to_area(area, object)?;
        }
        self.invalidate();
        Ok(())
    }

    /// Remove objects from an area.
    pub fn remove_from_area(
        &mut self,
        as_id: AsId,
        area: AreaId,
        objects: impl IntoIterator<Item = ObjectId>,
    ) -> Result<(), NetworkError> {
        let domain = self.get_as_mut(as_id)?;
        for object in objects {
            domain.remove_from_area(area, object)?;
        }
        self.invalidate();
        Ok(())
    }

    /// Recompute the area membership and the border routers of all OSPF and IS-IS domains.
    pub fn update_as_topology(&mut self) -> Result<(), NetworkError> {
        let topology = &self.topology;
        for domain in self.autonomous_systems.values_mut() {
            domain.update_topology(topology)?;
        }
        Ok(())
    }

    /// Returns the cost of the link, in the direction leaving `node`.
    pub fn cost_toward(&self, link: LinkId, node: NodeId) -> Result<LinkWeight, NetworkError> {
        self.topology.cost_toward(link, node)
    }

    /// Set the cost of the link, in the direction leaving `node`.
    pub fn set_cost_toward(
        &mut self,
        link: LinkId,
        node: NodeId,
        cost: LinkWeight,
    ) -> Result<(), NetworkError> {
        self.invalidate();
        self.topology.set_cost_toward(link, node, cost)
    }

    /// Returns the capacity of the link, in the direction leaving `node`.
    pub fn capacity_toward(&self, link: LinkId, node: NodeId) -> Result<f64, NetworkError> {
        self.topology.capacity_toward(link, node)
    }

    /// Set the capacity of the link, in the direction leaving `node`.
    pub fn set_capacity_toward(
        &mut self,
        link: LinkId,
        node: NodeId,
        capacity: f64,
    ) -> Result<(), NetworkError> {
        self.invalidate();
        self.topology.set_capacity_toward(link, node, capacity)
    }

    /// Returns the traffic on the link, in the direction leaving `node`.
    pub fn traffic_toward(&self, link: LinkId, node: NodeId) -> Result<f64, NetworkError> {
        self.topology.traffic_toward(link, node)
    }

    /// Set the number of equal-cost paths `K` the router keeps in the given AS.
    pub fn set_lb_paths(
        &mut self,
        router: NodeId,
        as_id: AsId,
        paths: usize,
    ) -> Result<(), NetworkError> {
        self.get_as(as_id)?;
        self.invalidate();
        self.topology
            .get_node_mut(router)?
            .as_properties
            .entry(as_id)
            .or_insert_with(Default::default)
            .lb_paths = paths.max(1);
        Ok(())
    }

    /// Set the priority of a node in the given AS.
    pub fn set_router_priority(
        &mut self,
        router: NodeId,
        as_id: AsId,
        priority: u32,
    ) -> Result<(), NetworkError> {
        self.get_as(as_id)?;
        self.invalidate();
        self.topology
            .get_node_mut(router)?
            .as_properties
            .entry(as_id)
            .or_insert_with(Default::default)
            .priority = priority;
        Ok(())
    }

    /// Set the reference bandwidth of an AS, and recompute the cost of all its physical links.
    pub fn set_reference_bandwidth(
        &mut self,
        as_id: AsId,
        bandwidth: LinkWeight,
    ) -> Result<(), NetworkError> {
        let domain = self.get_as_mut(as_id)?;
        domain.reference_bandwidth = bandwidth;
        let as_type = domain.as_type();
        let links: Vec<LinkId> = domain.links().iter().copied().collect();
        for link in links {
            self.apply_link_defaults(as_type, bandwidth, link)?;
        }
        self.invalidate();
        Ok(())
    }

    /// Set the weight `from` assigns to routes received over a BGP peering.
    pub fn set_bgp_weight(
        &mut self,
        peering: LinkId,
        from: NodeId,
        weight: u32,
    ) -> Result<(), NetworkError> {
        let link = self.topology.get_link_mut(peering)?;
        let dir = link.direction_from(from).ok_or(NetworkError::NotAnEndpoint(peering, from))?;
        match link.bgp.as_mut() {
            Some(bgp) => bgp.weight[dir.idx()] = weight,
            None => return Err(NetworkError::WrongLinkSubtype(peering, link.subtype())),
        }
        self.invalidate();
        Ok(())
    }

    /// Add a static route to a router. Use `0.0.0.0/0` for a default route.
    pub fn add_static_route(
        &mut self,
        router: NodeId,
        subnet: Subnet,
        next_hop: Ipv4Addr,
    ) -> Result<(), NetworkError> {
        let node = self.topology.get_node_mut(router)?;
        if !node.is_router() {
            return Err(NetworkError::NotARouter(router));
        }
        node.static_routes.insert(subnet, next_hop);
        self.invalidate();
        Ok(())
    }

    /// Remove a static route from a router
    pub fn remove_static_route(
        &mut self,
        router: NodeId,
        subnet: Subnet,
    ) -> Result<Option<Ipv4Addr>, NetworkError> {
        let removed = self.topology.get_node_mut(router)?.static_routes.remove(&subnet);
        self.invalidate();
        Ok(removed)
    }

    /// Set the provided network-wide configuration. The expressions are applied in the order of
    /// [`Config::ordered`]. If an expression cannot be applied, the error is returned, and the
    /// network is left with the expressions applied so far.
    pub fn set_config(&mut self, config: &Config) -> Result<(), NetworkError> {
        for expr in config.ordered() {
            debug!("Applying config: {:?}", expr);
            self.apply_config_expr(expr)?;
        }
        self.config = config.clone();
        Ok(())
    }

    fn apply_config_expr(&mut self, expr: &ConfigExpr) -> Result<(), NetworkError> {
        match expr {
            ConfigExpr::LinkCost { link, from, cost } => self.set_cost_toward(*link, *from, *cost),
            ConfigExpr::LinkCapacity { link, from, capacity } => {
                self.set_capacity_toward(*link, *from, *capacity)
            }
            ConfigExpr::StaticRoute { router, subnet, next_hop } => {
                self.add_static_route(*router, *subnet, *next_hop)
            }
            ConfigExpr::LoadBalancing { router, as_id, paths } => {
                self.set_lb_paths(*router, *as_id, *paths)
            }
            ConfigExpr::RouterPriority { router, as_id, priority } => {
                self.set_router_priority(*router, *as_id, *priority)
            }
            ConfigExpr::ReferenceBandwidth { as_id, bandwidth } => {
                self.set_reference_bandwidth(*as_id, *bandwidth)
            }
            ConfigExpr::BgpWeight { peering, from, weight } => {
                self.set_bgp_weight(*peering, *from, *weight)
            }
        }
    }

    /// Add a traffic demand from the router `source` to the loopback of the router `destination`.
    pub fn create_traffic(
        &mut self,
        source: NodeId,
        destination: NodeId,
        throughput: f64,
    ) -> Result<TrafficId, NetworkError> {
        for node in [source, destination] {
            if !self.topology.get_node(node)?.is_router() {
                return Err(NetworkError::NotARouter(node));
            }
        }
        let traffic_id = TrafficId(self.next_traffic_id);
        self.next_traffic_id += 1;
        self.traffics.insert(traffic_id, Traffic::new(traffic_id, source, destination, throughput));
        Ok(traffic_id)
    }

    /// Remove a traffic demand
    pub fn remove_traffic(&mut self, traffic: TrafficId) -> Result<(), NetworkError> {
        self.traffics.remove(&traffic).map(|_| ()).ok_or(NetworkError::TrafficNotFound(traffic))
    }

    /// Returns a reference to a traffic demand
    pub fn get_traffic(&self, traffic: TrafficId) -> Result<&Traffic, NetworkError> {
        self.traffics.get(&traffic).ok_or(NetworkError::TrafficNotFound(traffic))
    }

    /// Iterate over all traffic demands, ordered by their id
    pub fn traffics(&self) -> impl Iterator<Item = &Traffic> {
        self.traffics.values()
    }

    /// Assign all IP addresses, and recreate the automatic virtual connections of switched
    /// segments.
    pub fn allocate_addresses(&mut self) -> Result<(), NetworkError> {
        self.invalidate();
        addressing::allocate(&mut self.topology)
    }

    /// Returns the `/32` subnet of the loopback of a router. Addresses must be allocated.
    pub fn loopback_subnet(&self, router: NodeId) -> Result<Subnet, NetworkError> {
        self.topology
            .get_node(router)?
            .loopback()
            .map(Ipv4Network::from)
            .ok_or(NetworkError::NoAddress(router))
    }

    /// Clear every computed table, and all traffic.
    fn invalidate(&mut self) {
        for node in self.topology.nodes_mut() {
            node.clear_tables();
        }
        for link in self.topology.links_mut() {
            link.traffic = [0.0, 0.0];
        }
        for traffic in self.traffics.values_mut() {
            traffic.path = Default::default();
        }
    }

    /// Recompute the route table of every router from scratch: the connected and static routes,
    /// and the routes of every IGP domain the router is a member of. Spanning tree domains compute
    /// their forwarding tree.
    pub fn rebuild_route_tables(&mut self, exclusions: &ExclusionSet) -> Result<(), NetworkError> {
        info!("Rebuilding route tables");
        let mut tables: Vec<(NodeId, RouteTable, usize)> = Vec::new();
        for router in self.topology.routers() {
            if !exclusions.contains_node(router) {
                tables.push((router, static_route_table(&self.topology, router, exclusions)?, 1));
            }
        }
        for domain in self.autonomous_systems.values().filter(|a| a.as_type().is_igp()) {
            for node in domain.nodes() {
                let max_paths = {
                    let n = self.topology.get_node(*node)?;
                    if !n.is_router() || exclusions.contains_node(*node) {
                        continue;
                    }
                    n.lb_paths(domain.as_id())
                };
                let table = build_route_table(self, domain.as_id(), *node, exclusions)?;
                tables.push((*node, table, max_paths));
            }
        }

        let trees: Vec<(AsId, Option<NodeId>, BTreeSet<LinkId>)> = self
            .autonomous_systems
            .values()
            .filter(|a| a.as_type() == AsType::Stp)
            .map(|a| {
                let (root, tree) = spanning_tree(&self.topology, a, exclusions);
                (a.as_id(), root, tree)
            })
            .collect();

        for node in self.topology.nodes_mut() {
            node.route_table.clear();
        }
        for (node, table, max_paths) in tables {
            self.topology.get_node_mut(node)?.route_table.merge(table, max_paths);
        }
        for (as_id, root, tree) in trees {
            let domain = self.get_as_mut(as_id)?;
            domain.stp_root = root;
            domain.stp_tree = tree;
        }
        if log_enabled!(Level::Trace) {
            for router in self.topology.routers() {
                trace!("{}", printer::route_table(self, router)?);
            }
        }
        Ok(())
    }

    /// Recompute the BGP table of every router. The route tables must be computed.
    pub fn rebuild_bgp_tables(&mut self, exclusions: &ExclusionSet) -> Result<(), NetworkError> {
        info!("Rebuilding BGP tables");
        let membership = bgp_membership(self)?;
        let mut tables = Vec::new();
        for router in self.topology.routers() {
            let speaker = membership.contains_key(&router)
                || !self.topology.neighbors(router, &[LinkSubtype::BgpPeering]).is_empty();
            if speaker {
                tables.push((router, build_bgp_table(self, router, exclusions, &membership)?));
            }
        }
        for node in self.topology.nodes_mut() {
            node.bgp_table = Default::default();
        }
        for (router, table) in tables {
            self.topology.get_node_mut(router)?.bgp_table = table;
        }
        Ok(())
    }

    /// Route every traffic demand over the route tables, and store the traffic on the links. The
    /// route tables must be computed.
    pub fn run_path_finder(
        &mut self,
        exclusions: &ExclusionSet,
    ) -> Result<TrafficReport, NetworkError> {
        info!("Routing {} traffic demands", self.traffics.len());
        let mut report = TrafficReport::default();
        for traffic in self.traffics.values() {
            let path = route_traffic(&self.topology, traffic, exclusions, &mut report.load)?;
            report.paths.insert(traffic.traffic_id(), path);
        }
        for link in self.topology.links_mut() {
            link.traffic = report.load.get(link.link_id());
        }
        for (id, path) in report.paths.iter() {
            if let Some(traffic) = self.traffics.get_mut(id) {
                traffic.path = path.clone();
            }
        }
        Ok(report)
    }

    /// Run the complete pipeline, with the given objects considered as failed.
    pub fn run_pipeline(
        &mut self,
        exclusions: &ExclusionSet,
    ) -> Result<TrafficReport, NetworkError> {
        self.update_as_topology()?;
        self.allocate_addresses()?;
        self.rebuild_route_tables(exclusions)?;
        self.rebuild_bgp_tables(exclusions)?;
        self.run_path_finder(exclusions)
    }

    /// # Worst-case dimensioning
    /// For every physical link, run the pipeline with this link failed, and return for every
    /// physical link the maximum traffic of each direction over all scenarios (including the
    /// scenario without any failure). The scenarios are distributed over `n_threads` worker
    /// threads (by default, one per CPU), each owning its own copy of the network.
    pub fn worst_case_dimensioning(
        &self,
        n_threads: Option<usize>,
    ) -> Result<BTreeMap<LinkId, [f64; 2]>, Error> {
        let links = self.topology.physical_links();
        let mut scenarios = vec![ExclusionSet::new()];
        scenarios.extend(links.iter().map(|l| ExclusionSet::from_link(*l)));
        let n_threads = n_threads.unwrap_or_else(num_cpus::get).max(1).min(scenarios.len());
        info!("Running {} failure scenarios on {} threads", scenarios.len(), n_threads);

        let handles = (0..n_threads)
            .map(|i| {
                let net = self.clone();
                let jobs: Vec<ExclusionSet> =
                    scenarios.iter().skip(i).step_by(n_threads).cloned().collect();
                thread::spawn(move || -> Result<BTreeMap<LinkId, [f64; 2]>, NetworkError> {
                    let mut worst = BTreeMap::new();
                    for exclusions in jobs {
                        let mut n = net.clone();
                        let report = n.run_pipeline(&exclusions)?;
                        for (link, load) in report.load.iter() {
                            merge_max(&mut worst, *link, *load);
                        }
                    }
                    Ok(worst)
                })
            })
            .collect::<Vec<_>>();

        let mut worst: BTreeMap<LinkId, [f64; 2]> =
            links.iter().map(|l| (*l, [0.0, 0.0])).collect();
        for handle in handles {
            let result = handle.join().map_err(|_| Error::WorkerPanicked)??;
            for (link, load) in result {
                merge_max(&mut worst, link, load);
            }
        }
        Ok(worst)
    }

    /// Extract the cost graph of the physical topology.
    pub fn cost_graph(&self, exclusions: &ExclusionSet) -> CostGraph {
        CostGraph::from_topology(&self.topology, exclusions)
    }

    /// Compute the shortest path from `source` to `target`, visiting the waypoints and avoiding the
    /// exclusions of the constraints. If no path exists, the empty path is returned.
    pub fn shortest_path(
        &self,
        source: NodeId,
        target: NodeId,
        algorithm: ShortestPathAlgorithm,
        constraints: &PathConstraints,
    ) -> Result<Path, NetworkError> {
        self.topology.get_node(source)?;
        self.topology.get_node(target)?;
        let graph = self.cost_graph(&constraints.exclusions);
        Ok(algorithms::shortest_path(&graph, source, target, algorithm, constraints))
    }

    /// Compute two link-disjoint paths from `source` to `target`.
    pub fn disjoint_pair(
        &self,
        source: NodeId,
        target: NodeId,
        algorithm: DisjointPairAlgorithm,
        exclusions: &ExclusionSet,
    ) -> Result<Option<(Path, Path)>, NetworkError> {
        self.topology.get_node(source)?;
        self.topology.get_node(target)?;
        let graph = self.cost_graph(exclusions);
        Ok(algorithms::disjoint_pair(&graph, source, target, algorithm, exclusions))
    }

    /// Compute the maximum flow from `source` to `target` over the link capacities. The flow of
    /// every link is stored on the link.
    pub fn max_flow(
        &mut self,
        source: NodeId,
        target: NodeId,
        algorithm: MaxFlowAlgorithm,
        exclusions: &ExclusionSet,
    ) -> Result<f64, NetworkError> {
        self.topology.get_node(source)?;
        self.topology.get_node(target)?;
        let graph = self.cost_graph(exclusions);
        let flow = algorithms::max_flow(&graph, source, target, algorithm, exclusions);
        self.write_flows(&graph, &flow.arcs)?;
        Ok(flow.value)
    }

    /// Send up to `amount` from `source` to `target` at minimum cost. The flow of every link is
    /// stored on the link.
    pub fn min_cost_flow(
        &mut self,
        source: NodeId,
        target: NodeId,
        amount: f64,
        exclusions: &ExclusionSet,
    ) -> Result<MinCostFlow, NetworkError> {
        self.topology.get_node(source)?;
        self.topology.get_node(target)?;
        let graph = self.cost_graph(exclusions);
        let flow = algorithms::min_cost_flow(&graph, source, target, amount, exclusions);
        self.write_flows(&graph, &flow.arcs)?;
        Ok(flow)
    }

    fn write_flows(
        &mut self,
        graph: &CostGraph,
        flows: &BTreeMap<algorithms::ArcId, f64>,
    ) -> Result<(), NetworkError> {
        for link in self.topology.links_mut() {
            link.flow = [0.0, 0.0];
        }
        for (arc, flow) in flows {
            if let Some((from, _, data)) = graph.arc(*arc) {
                let link = self.topology.get_link_mut(data.link)?;
                let dir =
                    link.direction_from(from).ok_or(NetworkError::NotAnEndpoint(data.link, from))?;
                link.flow[dir.idx()] += flow;
            }
        }
        Ok(())
    }

    /// Compute a minimum spanning tree (or forest) of the given nodes.
    pub fn minimum_spanning_tree(
        &self,
        nodes: &BTreeSet<NodeId>,
        exclusions: &ExclusionSet,
    ) -> Result<Vec<LinkId>, NetworkError> {
        for node in nodes {
            self.topology.get_node(*node)?;
        }
        Ok(algorithms::kruskal(&self.cost_graph(exclusions), nodes, exclusions))
    }

    /// Compute the cost between all pairs of nodes. Returns `None` if there is a negative cycle.
    pub fn all_pairs_costs(&self, exclusions: &ExclusionSet) -> Option<DistanceMatrix> {
        algorithms::floyd_warshall(&self.cost_graph(exclusions), exclusions)
    }
}

fn merge_max(worst: &mut BTreeMap<LinkId, [f64; 2]>, link: LinkId, load: [f64; 2]) {
    let entry = worst.entry(link).or_insert([0.0, 0.0]);
    entry[0] = entry[0].max(load[0]);
    entry[1] = entry[1].max(load[1]);
}
