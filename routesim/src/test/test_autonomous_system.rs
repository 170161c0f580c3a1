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

//! Test the membership of nodes and links in autonomous systems and areas.

use crate::example_networks::{AreaNet, ExampleNetwork};
use crate::netsim::{
    AreaId, AsId, AsType, ExclusionSet, LinkSubtype::*, Network, NetworkError, NodeSubtype::*,
    ObjectId,
};
use assert_approx_eq::assert_approx_eq;
use maplit::btreeset;

#[test]
fn test_create_as() {
    let mut net = Network::new();
    let rip = net.create_as(AsType::Rip, "rip").unwrap();
    let ospf = net.create_as(AsType::Ospf, "ospf").unwrap();
    assert_eq!(rip, AsId(0));
    assert_eq!(ospf, AsId(1));
    assert_eq!(
        net.create_as(AsType::Isis, "rip"),
        Err(NetworkError::AsNameAlreadyExists("rip".to_string()))
    );
    assert_eq!(net.get_as_id("ospf"), Some(ospf));
    assert_eq!(net.create_area(rip, "area1"), Err(NetworkError::AreasNotSupported(rip)));

    // the backbone exists with every AS that has areas
    let domain = net.get_as(ospf).unwrap();
    assert_eq!(domain.get_area_id("Backbone"), Some(AreaId::BACKBONE));
    assert_eq!(domain.areas().count(), 1);

    // the area factory returns the existing area of the same name
    let a1 = net.create_area(ospf, "area1").unwrap();
    assert_eq!(net.create_area(ospf, "area1"), Ok(a1));
    assert_eq!(a1, AreaId(1));
}

#[test]
fn test_link_defaults() {
    let mut net = Network::new();
    let r1 = net.create_node("r1", Router);
    let r2 = net.create_node("r2", Router);
    let l = net.create_link(Ethernet, r1, r2).unwrap();
    net.set_capacity_toward(l, r1, 50.0).unwrap();
    net.set_capacity_toward(l, r2, 0.0).unwrap();

    let ospf = net.create_as(AsType::Ospf, "ospf").unwrap();
    net.add_to_as(ospf, vec![r1.into(), r2.into(), l.into()]).unwrap();
    assert_approx_eq!(net.cost_toward(l, r1).unwrap(), 2.0);
    assert!(net.cost_toward(l, r2).unwrap().is_infinite());

    net.set_reference_bandwidth(ospf, 200.0).unwrap();
    assert_approx_eq!(net.cost_toward(l, r1).unwrap(), 4.0);

    let rip = net.create_as(AsType::Rip, "rip").unwrap();
    net.add_to_as(rip, vec![l.into()]).unwrap();
    assert_approx_eq!(net.cost_toward(l, r1).unwrap(), 1.0);
    assert_approx_eq!(net.cost_toward(l, r2).unwrap(), 1.0);
}

#[test]
fn test_not_a_member() {
    let mut net = Network::new();
    let r1 = net.create_node("r1", Router);
    let ospf = net.create_as(AsType::Ospf, "ospf").unwrap();
    let area = net.create_area(ospf, "area1").unwrap();
    assert_eq!(
        net.add_to_area(ospf, area, vec![r1.into()]),
        Err(NetworkError::NotAMember(ospf, ObjectId::Node(r1)))
    );
    assert_eq!(
        net.add_to_area(ospf, AreaId(7), vec![r1.into()]),
        Err(NetworkError::AreaNotFound(ospf, AreaId(7)))
    );
    assert_eq!(
        net.remove_from_as(ospf, vec![r1.into()]),
        Err(NetworkError::NotAMember(ospf, ObjectId::Node(r1)))
    );
}

#[test]
fn test_ospf_areas() {
    let net = AreaNet::net(0);
    let igp = net.get_as_id("igp").unwrap();
    let domain = net.get_as(igp).unwrap();
    let r1 = net.get_node_id("r1").unwrap();
    let r2 = net.get_node_id("r2").unwrap();
    let r3 = net.get_node_id("r3").unwrap();
    let r4 = net.get_node_id("r4").unwrap();
    let area1 = domain.get_area_id("area1").unwrap();
    let area2 = domain.get_area_id("area2").unwrap();

    assert_eq!(domain.border_routers(), &btreeset! {r2, r4});
    assert_eq!(domain.areas_of_node(r1), btreeset! {area1});
    assert_eq!(domain.areas_of_node(r2), btreeset! {AreaId::BACKBONE, area1});
    assert_eq!(domain.areas_of_node(r3), btreeset! {AreaId::BACKBONE});
    assert_eq!(domain.areas_of_node(r4), btreeset! {AreaId::BACKBONE, area2});
}

#[test]
fn test_isis_areas() {
    let net = AreaNet::net(1);
    let igp = net.get_as_id("igp").unwrap();
    let domain = net.get_as(igp).unwrap();
    let r1 = net.get_node_id("r1").unwrap();
    let r2 = net.get_node_id("r2").unwrap();
    let r3 = net.get_node_id("r3").unwrap();
    let r4 = net.get_node_id("r4").unwrap();
    let area1 = domain.get_area_id("area1").unwrap();
    let l12 = net.topology().links_between(r1, r2)[0];
    let l23 = net.topology().links_between(r2, r3)[0];

    assert_eq!(domain.border_routers(), &btreeset! {r2, r3, r4});
    assert_eq!(domain.areas_of_link(l12), btreeset! {area1});
    assert_eq!(domain.areas_of_link(l23), btreeset! {AreaId::BACKBONE});
    assert_eq!(domain.single_area(r2.into()), Ok(area1));
    assert_eq!(domain.single_area(r3.into()), Ok(AreaId::BACKBONE));
}

#[test]
fn test_update_topology_idempotent() {
    for variant in 0..2 {
        let mut net = AreaNet::net(variant);
        let igp = net.get_as_id("igp").unwrap();
        let before = net.get_as(igp).unwrap().clone();
        net.update_as_topology().unwrap();
        let after = net.get_as(igp).unwrap();
        assert_eq!(before.border_routers(), after.border_routers());
        assert_eq!(
            before.areas().cloned().collect::<Vec<_>>(),
            after.areas().cloned().collect::<Vec<_>>()
        );
    }
}

#[test]
fn test_area_invariant_violation() {
    let mut net = AreaNet::net(1);
    let igp = net.get_as_id("igp").unwrap();
    let r1 = net.get_node_id("r1").unwrap();
    let area1 = net.get_as(igp).unwrap().get_area_id("area1").unwrap();
    net.remove_from_area(igp, area1, vec![r1.into()]).unwrap();
    assert_eq!(
        net.update_as_topology(),
        Err(NetworkError::AreaMembership { as_id: igp, object: r1.into(), areas: 0 })
    );
}

#[test]
fn test_remove_link_from_as() {
    let mut net = AreaNet::net(0);
    let igp = net.get_as_id("igp").unwrap();
    let r4 = net.get_node_id("r4").unwrap();
    let r5 = net.get_node_id("r5").unwrap();
    let l45 = net.topology().links_between(r4, r5)[0];
    net.remove_link(l45).unwrap();
    net.update_as_topology().unwrap();
    let domain = net.get_as(igp).unwrap();
    assert!(!domain.contains(l45.into()));
    assert!(!domain.is_border_router(r4));
}

#[test]
fn test_spanning_tree() {
    let mut net = Network::new();
    let s1 = net.create_node("s1", Switch);
    let s2 = net.create_node("s2", Switch);
    let s3 = net.create_node("s3", Switch);
    let l12 = net.create_link(Ethernet, s1, s2).unwrap();
    let l23 = net.create_link(Ethernet, s2, s3).unwrap();
    let l13 = net.create_link(Ethernet, s1, s3).unwrap();
    let stp = net.create_as(AsType::Stp, "stp").unwrap();
    net.add_to_as(stp, vec![s1.into(), s2.into(), s3.into(), l12.into(), l23.into(), l13.into()])
        .unwrap();

    net.rebuild_route_tables(&ExclusionSet::new()).unwrap();
    assert_eq!(net.get_as(stp).unwrap().stp_root(), Some(s1));
    assert_eq!(net.get_as(stp).unwrap().stp_tree(), &btreeset! {l12, l13});

    // a lower priority wins the root election
    net.set_router_priority(s3, stp, 100).unwrap();
    net.rebuild_route_tables(&ExclusionSet::new()).unwrap();
    assert_eq!(net.get_as(stp).unwrap().stp_root(), Some(s3));
    assert_eq!(net.get_as(stp).unwrap().stp_tree(), &btreeset! {l23, l13});

    // failures are respected
    net.rebuild_route_tables(&ExclusionSet::from_link(l13)).unwrap();
    assert_eq!(net.get_as(stp).unwrap().stp_tree(), &btreeset! {l23, l12});
}
