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

//! Test the route tables built for RIP, OSPF, IS-IS and static routes.

use crate::example_networks::{AreaNet, ExampleNetwork, SwitchedNet};
use crate::netsim::{
    default_route, AsType, ExclusionSet, LinkId, LinkSubtype::*, Network, NetworkError, NodeId,
    NodeSubtype::Router, ObjectId, Subnet,
};
use crate::routing::{RouteEntry, RouteKind, RouteKind::*, RouteTable};
use maplit::btreemap;
use std::collections::BTreeMap;

type Snapshot = BTreeMap<Subnet, Vec<(RouteKind, f64, Option<NodeId>)>>;

fn node(net: &Network, name: &str) -> NodeId {
    net.get_node_id(name).unwrap()
}

fn lo(net: &Network, name: &str) -> Subnet {
    net.loopback_subnet(node(net, name)).unwrap()
}

fn subnet_between(net: &Network, a: &str, b: &str) -> Subnet {
    let link = net.topology().links_between(node(net, a), node(net, b))[0];
    net.get_link(link).unwrap().subnet().unwrap()
}

fn snapshot(net: &Network, name: &str) -> Snapshot {
    net.get_node(node(net, name))
        .unwrap()
        .route_table()
        .iter()
        .map(|(s, entries)| (*s, entries.iter().map(|e| (e.kind, e.cost, e.next_hop)).collect()))
        .collect()
}

fn entry(kind: RouteKind, cost: f64, next_hop: usize, exit_link: usize) -> RouteEntry {
    RouteEntry {
        kind,
        next_hop_ip: None,
        exit_interface: None,
        cost,
        next_hop: Some(NodeId::new(next_hop)),
        exit_link: Some(LinkId::new(exit_link)),
    }
}

#[test]
fn test_route_table_offer() {
    let s: Subnet = "192.168.0.1/32".parse().unwrap();
    let mut table = RouteTable::new();
    assert!(table.offer(s, entry(Rip, 3.0, 1, 1), 2));
    // worse cost
    assert!(!table.offer(s, entry(Rip, 4.0, 2, 2), 2));
    // same first hop
    assert!(!table.offer(s, entry(Rip, 3.0, 1, 1), 2));
    // equal cost
    assert!(table.offer(s, entry(Rip, 3.0, 2, 2), 2));
    // at most K entries
    assert!(!table.offer(s, entry(Rip, 3.0, 3, 3), 2));
    assert_eq!(table.get(&s).unwrap().len(), 2);
    // better cost replaces all entries
    assert!(table.offer(s, entry(Rip, 2.0, 3, 3), 2));
    assert_eq!(table.get(&s).unwrap().len(), 1);
    // better preference replaces, even with a higher cost
    assert!(table.offer(s, entry(OspfInterArea, 20.0, 4, 4), 2));
    assert!(table.offer(s, entry(OspfIntra, 30.0, 5, 5), 2));
    assert!(!table.offer(s, entry(OspfInterArea, 1.0, 6, 6), 2));
    assert_eq!(table.get(&s).unwrap()[0].kind, OspfIntra);

    // the default route is used if nothing else matches
    let other: Subnet = "192.168.0.2/32".parse().unwrap();
    assert!(table.lookup(&other).is_none());
    table.offer(default_route(), entry(Static, 0.0, 7, 7), 1);
    assert_eq!(table.lookup(&other).unwrap()[0].kind, Static);
    assert_eq!(table.lookup(&s).unwrap()[0].kind, OspfIntra);
}

#[test]
fn test_route_kind_order() {
    let kinds =
        vec![Connected, Static, OspfIntra, OspfInterArea, IsisL1, IsisL2, IsisL1Default, Rip];
    for (a, b) in kinds.iter().zip(kinds.iter().skip(1)) {
        assert!(a.preference() < b.preference(), "{} < {}", a, b);
    }
}

/// Chain of 17 routers r0 - r1 - ... - r16 in a RIP domain.
fn rip_chain() -> Network {
    let mut net = Network::new();
    let nodes: Vec<NodeId> = (0..17).map(|i| net.create_node(format!("r{}", i), Router)).collect();
    let rip = net.create_as(AsType::Rip, "rip").unwrap();
    net.add_to_as(rip, nodes.iter().map(|n| ObjectId::from(*n))).unwrap();
    for (a, b) in nodes.iter().zip(nodes.iter().skip(1)) {
        let link = net.create_link(Ethernet, *a, *b).unwrap();
        net.add_to_as(rip, vec![link.into()]).unwrap();
    }
    net
}

#[test]
fn test_rip_hop_limit() {
    let mut net = rip_chain();
    net.run_pipeline(&ExclusionSet::new()).unwrap();
    let table = net.get_node(node(&net, "r0")).unwrap().route_table();

    let r1 = &table.get(&lo(&net, "r1")).unwrap()[0];
    assert_eq!((r1.kind, r1.cost, r1.next_hop), (Rip, 1.0, Some(node(&net, "r1"))));
    let r15 = &table.get(&lo(&net, "r15")).unwrap()[0];
    assert_eq!((r15.kind, r15.cost, r15.next_hop), (Rip, 15.0, Some(node(&net, "r1"))));
    assert!(table.contains(&subnet_between(&net, "r14", "r15")));

    // 16 hops are unreachable
    assert!(!table.contains(&lo(&net, "r16")));
    assert!(!table.contains(&subnet_between(&net, "r15", "r16")));
}

/// Square of four routers in a RIP domain, with two equal-cost paths from r1 to r4.
///
/// ```text
/// r1 ---- r2
///  |       |
/// r3 ---- r4
/// ```
fn rip_square() -> Network {
    let mut net = Network::new();
    let r1 = net.create_node("r1", Router);
    let r2 = net.create_node("r2", Router);
    let r3 = net.create_node("r3", Router);
    let r4 = net.create_node("r4", Router);
    let l12 = net.create_link(Ethernet, r1, r2).unwrap();
    let l13 = net.create_link(Ethernet, r1, r3).unwrap();
    let l24 = net.create_link(Ethernet, r2, r4).unwrap();
    let l34 = net.create_link(Ethernet, r3, r4).unwrap();
    let rip = net.create_as(AsType::Rip, "rip").unwrap();
    let members: Vec<ObjectId> = vec![
        r1.into(),
        r2.into(),
        r3.into(),
        r4.into(),
        l12.into(),
        l13.into(),
        l24.into(),
        l34.into(),
    ];
    net.add_to_as(rip, members).unwrap();
    net
}

#[test]
fn test_ecmp() {
    let mut net = rip_square();
    let rip = net.get_as_id("rip").unwrap();
    let (r1, r2, r3) = (node(&net, "r1"), node(&net, "r2"), node(&net, "r3"));

    // with a single path, the lowest exit link wins
    net.run_pipeline(&ExclusionSet::new()).unwrap();
    let entries = net.get_node(r1).unwrap().route_table().get(&lo(&net, "r4")).unwrap().clone();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].next_hop, Some(r2));

    net.set_lb_paths(r1, rip, 2).unwrap();
    net.run_pipeline(&ExclusionSet::new()).unwrap();
    let entries = net.get_node(r1).unwrap().route_table().get(&lo(&net, "r4")).unwrap().clone();
    assert_eq!(entries.iter().map(|e| e.next_hop).collect::<Vec<_>>(), vec![Some(r2), Some(r3)]);
    assert!(entries.iter().all(|e| e.cost == 2.0));

    // the number of entries never exceeds K
    for router in net.routers() {
        let k = net.get_node(router).unwrap().lb_paths(rip);
        for (_, entries) in net.get_node(router).unwrap().route_table().iter() {
            assert!(entries.len() <= k);
        }
    }
}

#[test]
fn test_ospf_areas() {
    let mut net = AreaNet::net(0);
    net.run_pipeline(&ExclusionSet::new()).unwrap();
    let r2 = Some(node(&net, "r2"));
    let r1 = Some(node(&net, "r1"));
    let r3 = Some(node(&net, "r3"));

    let expected: Snapshot = btreemap! {
        lo(&net, "r1") => vec![(Connected, 0.0, None)],
        lo(&net, "r2") => vec![(OspfIntra, 1.0, r2)],
        lo(&net, "r3") => vec![(OspfInterArea, 2.0, r2)],
        lo(&net, "r4") => vec![(OspfInterArea, 3.0, r2)],
        lo(&net, "r5") => vec![(OspfInterArea, 4.0, r2)],
        subnet_between(&net, "r1", "r2") => vec![(Connected, 0.0, None)],
        subnet_between(&net, "r2", "r3") => vec![(OspfInterArea, 2.0, r2)],
        subnet_between(&net, "r3", "r4") => vec![(OspfInterArea, 3.0, r2)],
        subnet_between(&net, "r4", "r5") => vec![(OspfInterArea, 4.0, r2)],
    };
    assert_eq!(snapshot(&net, "r1"), expected);

    let expected: Snapshot = btreemap! {
        lo(&net, "r1") => vec![(OspfIntra, 1.0, r1)],
        lo(&net, "r2") => vec![(Connected, 0.0, None)],
        lo(&net, "r3") => vec![(OspfIntra, 1.0, r3)],
        lo(&net, "r4") => vec![(OspfIntra, 2.0, r3)],
        lo(&net, "r5") => vec![(OspfInterArea, 3.0, r3)],
        subnet_between(&net, "r1", "r2") => vec![(Connected, 0.0, None)],
        subnet_between(&net, "r2", "r3") => vec![(Connected, 0.0, None)],
        subnet_between(&net, "r3", "r4") => vec![(OspfIntra, 2.0, r3)],
        subnet_between(&net, "r4", "r5") => vec![(OspfInterArea, 3.0, r3)],
    };
    assert_eq!(snapshot(&net, "r2"), expected);

    // a failed link removes the routes behind it, without any error
    let l34 = net.topology().links_between(node(&net, "r3"), node(&net, "r4"))[0];
    net.run_pipeline(&ExclusionSet::from_link(l34)).unwrap();
    let table = net.get_node(node(&net, "r1")).unwrap().route_table();
    assert!(table.contains(&lo(&net, "r3")));
    assert!(!table.contains(&lo(&net, "r4")));
    assert!(!table.contains(&lo(&net, "r5")));
}

#[test]
fn test_ospf_intra_area_preferred() {
    // r1 reaches r2 within area1 at cost 10, or over the backbone and r3 at cost 2.
    let mut net = Network::new();
    let r1 = net.create_node("r1", Router);
    let r2 = net.create_node("r2", Router);
    let r3 = net.create_node("r3", Router);
    let l12 = net.create_link(Ethernet, r1, r2).unwrap();
    let l13 = net.create_link(Ethernet, r1, r3).unwrap();
    let l32 = net.create_link(Ethernet, r3, r2).unwrap();
    let ospf = net.create_as(AsType::Ospf, "ospf").unwrap();
    net.add_to_as(ospf, vec![r1.into(), r2.into(), r3.into(), l12.into(), l13.into(), l32.into()])
        .unwrap();
    let area1 = net.create_area(ospf, "area1").unwrap();
    net.add_to_area(ospf, area1, vec![l12.into(), l32.into()]).unwrap();
    net.set_cost_toward(l12, r1, 10.0).unwrap();

    for _ in 0..2 {
        net.run_pipeline(&ExclusionSet::new()).unwrap();
        let lo2 = net.loopback_subnet(r2).unwrap();
        let entries = net.get_node(r1).unwrap().route_table().get(&lo2).unwrap().clone();
        assert_eq!(entries.len(), 1);
        assert_eq!((entries[0].kind, entries[0].cost), (OspfIntra, 10.0));
        assert_eq!(entries[0].exit_link, Some(l12));
    }
}

#[test]
fn test_isis_snapshot() {
    let mut net = AreaNet::net(1);
    net.run_pipeline(&ExclusionSet::new()).unwrap();
    let r1 = Some(node(&net, "r1"));
    let r2 = Some(node(&net, "r2"));
    let r3 = Some(node(&net, "r3"));
    let r4 = Some(node(&net, "r4"));

    // level-1 router: own area, and a default route toward the closest border router
    let expected: Snapshot = btreemap! {
        default_route() => vec![(IsisL1Default, 1.0, r2)],
        lo(&net, "r1") => vec![(Connected, 0.0, None)],
        lo(&net, "r2") => vec![(IsisL1, 1.0, r2)],
        subnet_between(&net, "r1", "r2") => vec![(Connected, 0.0, None)],
    };
    assert_eq!(snapshot(&net, "r1"), expected);

    // border router of area1
    let expected: Snapshot = btreemap! {
        lo(&net, "r1") => vec![(IsisL1, 1.0, r1)],
        lo(&net, "r2") => vec![(Connected, 0.0, None)],
        lo(&net, "r3") => vec![(IsisL2, 1.0, r3)],
        lo(&net, "r4") => vec![(IsisL2, 2.0, r3)],
        lo(&net, "r5") => vec![(IsisL2, 3.0, r3)],
        subnet_between(&net, "r1", "r2") => vec![(Connected, 0.0, None)],
        subnet_between(&net, "r2", "r3") => vec![(Connected, 0.0, None)],
        subnet_between(&net, "r3", "r4") => vec![(IsisL2, 2.0, r3)],
        subnet_between(&net, "r4", "r5") => vec![(IsisL2, 3.0, r3)],
    };
    assert_eq!(snapshot(&net, "r2"), expected);

    // backbone router
    let expected: Snapshot = btreemap! {
        lo(&net, "r1") => vec![(IsisL2, 2.0, r2)],
        lo(&net, "r2") => vec![(IsisL2, 1.0, r2)],
        lo(&net, "r3") => vec![(Connected, 0.0, None)],
        lo(&net, "r4") => vec![(IsisL2, 1.0, r4)],
        lo(&net, "r5") => vec![(IsisL2, 2.0, r4)],
        subnet_between(&net, "r1", "r2") => vec![(IsisL2, 2.0, r2)],
        subnet_between(&net, "r2", "r3") => vec![(Connected, 0.0, None)],
        subnet_between(&net, "r3", "r4") => vec![(Connected, 0.0, None)],
        subnet_between(&net, "r4", "r5") => vec![(IsisL2, 2.0, r4)],
    };
    assert_eq!(snapshot(&net, "r3"), expected);

    // level-1 router of area2
    let expected: Snapshot = btreemap! {
        default_route() => vec![(IsisL1Default, 1.0, r4)],
        lo(&net, "r4") => vec![(IsisL1, 1.0, r4)],
        lo(&net, "r5") => vec![(Connected, 0.0, None)],
        subnet_between(&net, "r4", "r5") => vec![(Connected, 0.0, None)],
    };
    assert_eq!(snapshot(&net, "r5"), expected);
}

#[test]
fn test_isis_level_1_area_confined() {
    // a second path from r1 to r5 over a direct link does not exist in the level-1 view: the
    // additional link connects two areas and is a backbone link.
    let mut net = AreaNet::net(1);
    let (r1, r5) = (node(&net, "r1"), node(&net, "r5"));
    let l15 = net.create_link(Ethernet, r1, r5).unwrap();
    let igp = net.get_as_id("igp").unwrap();
    net.add_to_as(igp, vec![l15.into()]).unwrap();
    net.run_pipeline(&ExclusionSet::new()).unwrap();

    // r1 and r5 are now border routers, and learn the full topology
    assert!(net.get_as(igp).unwrap().is_border_router(r1));
    let table = net.get_node(r1).unwrap().route_table();
    let entries = table.get(&lo(&net, "r5")).unwrap();
    assert_eq!((entries[0].kind, entries[0].cost, entries[0].next_hop), (IsisL2, 1.0, Some(r5)));
    assert!(!table.contains(&default_route()));
}

#[test]
fn test_isis_single_default_route() {
    // a second border router r6 of area1, at the same distance from r1 as r2
    let mut net = AreaNet::net(1);
    let (r1, r3) = (node(&net, "r1"), node(&net, "r3"));
    let r6 = net.create_node("r6", Router);
    let l16 = net.create_link(Ethernet, r1, r6).unwrap();
    let l36 = net.create_link(Ethernet, r3, r6).unwrap();
    let igp = net.get_as_id("igp").unwrap();
    net.add_to_as(igp, vec![r6.into(), l16.into(), l36.into()]).unwrap();
    let area1 = net.get_as(igp).unwrap().get_area_id("area1").unwrap();
    net.add_to_area(igp, area1, vec![ObjectId::from(r6)]).unwrap();
    net.set_lb_paths(r1, igp, 2).unwrap();
    net.run_pipeline(&ExclusionSet::new()).unwrap();
    assert!(net.get_as(igp).unwrap().is_border_router(r6));

    // only the first border router reached provides the default route
    let (r2, r6) = (Some(node(&net, "r2")), Some(r6));
    let expected: Snapshot = btreemap! {
        default_route() => vec![(IsisL1Default, 1.0, r2)],
        lo(&net, "r1") => vec![(Connected, 0.0, None)],
        lo(&net, "r2") => vec![(IsisL1, 1.0, r2)],
        lo(&net, "r6") => vec![(IsisL1, 1.0, r6)],
        subnet_between(&net, "r1", "r2") => vec![(Connected, 0.0, None)],
        subnet_between(&net, "r1", "r6") => vec![(Connected, 0.0, None)],
    };
    assert_eq!(snapshot(&net, "r1"), expected);
}

#[test]
fn test_area_membership_violation() {
    // OSPF link without any area
    let mut net = AreaNet::net(0);
    net.run_pipeline(&ExclusionSet::new()).unwrap();
    let igp = net.get_as_id("igp").unwrap();
    let area1 = net.get_as(igp).unwrap().get_area_id("area1").unwrap();
    let l12 = net.topology().links_between(node(&net, "r1"), node(&net, "r2"))[0];
    net.remove_from_area(igp, area1, vec![ObjectId::from(l12)]).unwrap();
    let expected = || NetworkError::AreaMembership { as_id: igp, object: l12.into(), areas: 0 };
    assert_eq!(net.rebuild_route_tables(&ExclusionSet::new()), Err(expected()));
    // the pipeline reports the violation while updating the area topology
    assert_eq!(net.run_pipeline(&ExclusionSet::new()).map(|_| ()), Err(expected()));

    // IS-IS link in two areas
    let mut net = AreaNet::net(1);
    net.run_pipeline(&ExclusionSet::new()).unwrap();
    let igp = net.get_as_id("igp").unwrap();
    let area2 = net.get_as(igp).unwrap().get_area_id("area2").unwrap();
    let l12 = net.topology().links_between(node(&net, "r1"), node(&net, "r2"))[0];
    net.add_to_area(igp, area2, vec![ObjectId::from(l12)]).unwrap();
    let expected = NetworkError::AreaMembership { as_id: igp, object: l12.into(), areas: 2 };
    assert_eq!(net.rebuild_route_tables(&ExclusionSet::new()), Err(expected));
}

#[test]
fn test_switched_segment() {
    let mut net = SwitchedNet::net(0);
    net.run_pipeline(&ExclusionSet::new()).unwrap();
    let r1 = node(&net, "r1");
    let r3 = node(&net, "r3");
    let table = net.get_node(r1).unwrap().route_table();

    // the segment is directly connected
    let segment: Subnet = "172.16.0.0/24".parse().unwrap();
    assert_eq!(table.get(&segment).unwrap()[0].kind, Connected);

    // r4 is reached over the automatic virtual connection to r3
    let entry = &table.get(&lo(&net, "r4")).unwrap()[0];
    assert_eq!((entry.kind, entry.cost, entry.next_hop), (OspfIntra, 2.0, Some(r3)));
    let exit = net.get_link(entry.exit_link.unwrap()).unwrap();
    assert_eq!(exit.subtype(), L3Vc);
    assert_eq!(entry.next_hop_ip, net.topology().interface_ip(exit.link_id(), r3));
    assert_eq!(entry.next_hop_ip, Some("172.16.0.3".parse().unwrap()));
}

#[test]
fn test_static_default_route() {
    let mut net = SwitchedNet::net(1);
    net.run_pipeline(&ExclusionSet::new()).unwrap();
    let (r3, r4) = (node(&net, "r3"), node(&net, "r4"));
    let l34 = net.topology().links_between(r3, r4)[0];

    let expected: Snapshot = btreemap! {
        default_route() => vec![(Static, 0.0, Some(r3))],
        lo(&net, "r4") => vec![(Connected, 0.0, None)],
    };
    assert_eq!(snapshot(&net, "r4"), expected);
    let entry = &net.get_node(r4).unwrap().route_table().get(&default_route()).unwrap()[0];
    assert_eq!(entry.exit_link, Some(l34));

    // a failed link makes the static route unusable
    net.run_pipeline(&ExclusionSet::from_link(l34)).unwrap();
    assert!(!net.get_node(r4).unwrap().route_table().contains(&default_route()));

    // an unresolved next-hop is skipped
    let mut net = SwitchedNet::net(1);
    net.add_static_route(r4, "10.1.0.0/16".parse().unwrap(), "10.9.9.9".parse().unwrap()).unwrap();
    net.run_pipeline(&ExclusionSet::new()).unwrap();
    assert!(!net.get_node(r4).unwrap().route_table().contains(&"10.1.0.0/16".parse().unwrap()));
}
