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

//! Test the path finder and the worst-case dimensioning.

use crate::example_networks::{ExampleNetwork, SwitchedNet};
use crate::netsim::{
    printer, AsType, Direction::*, ExclusionSet, LinkId, LinkSubtype::Ethernet, Network,
    NetworkError, NodeId, NodeSubtype::Router, ObjectId,
};
use assert_approx_eq::assert_approx_eq;
use std::collections::BTreeMap;

fn node(net: &Network, name: &str) -> NodeId {
    net.get_node_id(name).unwrap()
}

fn link(net: &Network, a: &str, b: &str) -> LinkId {
    net.topology().links_between(node(net, a), node(net, b))[0]
}

/// The physical link attaching the router `r` to the switch `s1`.
fn access(net: &Network, r: &str) -> LinkId {
    link(net, r, "s1")
}

#[test]
fn test_switched_segment_load() {
    let mut net = SwitchedNet::net(0);
    let (r1, r3, r4) = (node(&net, "r1"), node(&net, "r3"), node(&net, "r4"));
    let t = net.create_traffic(r1, r4, 10.0).unwrap();
    let report = net.run_pipeline(&ExclusionSet::new()).unwrap();

    assert_eq!(report.delivered(t), Some(10.0));
    assert!(report.unrouted().is_empty());
    // the virtual connection loads the access links of both r1 and r3
    assert_eq!(report.link_traffic(access(&net, "r1")), [10.0, 0.0]);
    assert_eq!(report.link_traffic(access(&net, "r2")), [0.0, 0.0]);
    assert_eq!(report.link_traffic(access(&net, "r3")), [0.0, 10.0]);
    assert_eq!(report.link_traffic(link(&net, "r3", "r4")), [10.0, 0.0]);

    // the results are stored in the network
    let l34 = net.get_link(link(&net, "r3", "r4")).unwrap();
    assert_eq!(l34.traffic(SourceToDestination), 10.0);
    assert_eq!(l34.traffic(DestinationToSource), 0.0);
    let path = net.get_traffic(t).unwrap().path();
    assert_eq!(path.nodes, vec![r1, r3, r4].into_iter().collect());
    assert_eq!(path.links.len(), 2);
    assert!(path.is_complete());

    assert_eq!(
        printer::traffic_report(&net, &report).unwrap(),
        "r1 -> r4: 10 of 10 delivered, 0 dropped, 0 looped\n"
    );
}

#[test]
fn test_static_default_route_traffic() {
    let mut net = SwitchedNet::net(1);
    let (r1, r4) = (node(&net, "r1"), node(&net, "r4"));
    let up = net.create_traffic(r4, r1, 10.0).unwrap();
    let down = net.create_traffic(r1, r4, 4.0).unwrap();
    let report = net.run_pipeline(&ExclusionSet::new()).unwrap();

    assert_eq!(report.delivered(up), Some(10.0));
    assert_eq!(report.link_traffic(link(&net, "r3", "r4")), [0.0, 10.0]);
    assert_eq!(report.link_traffic(access(&net, "r3")), [10.0, 0.0]);
    assert_eq!(report.link_traffic(access(&net, "r1")), [0.0, 10.0]);

    // r1 has no route toward r4
    assert_eq!(report.delivered(down), Some(0.0));
    assert_eq!(report.undelivered(down), Some(4.0));
    assert_eq!(net.get_traffic(down).unwrap().path().dropped, 4.0);
    assert_eq!(report.unrouted(), vec![down]);
}

#[test]
fn test_ecmp_split() {
    let mut net = Network::new();
    let r1 = net.create_node("r1", Router);
    let r2 = net.create_node("r2", Router);
    let r3 = net.create_node("r3", Router);
    let r4 = net.create_node("r4", Router);
    let l12 = net.create_link(Ethernet, r1, r2).unwrap();
    let l13 = net.create_link(Ethernet, r1, r3).unwrap();
    let l24 = net.create_link(Ethernet, r2, r4).unwrap();
    let l34 = net.create_link(Ethernet, r3, r4).unwrap();
    let ospf = net.create_as(AsType::Ospf, "ospf").unwrap();
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
    net.add_to_as(ospf, members).unwrap();
    net.set_lb_paths(r1, ospf, 2).unwrap();
    let t = net.create_traffic(r1, r4, 10.0).unwrap();
    let report = net.run_pipeline(&ExclusionSet::new()).unwrap();

    assert_approx_eq!(report.delivered(t).unwrap(), 10.0);
    for l in [l12, l13, l24, l34].iter() {
        assert_approx_eq!(report.link_traffic(*l)[0], 5.0);
        assert_approx_eq!(report.link_traffic(*l)[1], 0.0);
    }

    // a failed link moves all traffic to the other path
    let report = net.run_pipeline(&ExclusionSet::from_link(l24)).unwrap();
    assert_approx_eq!(report.delivered(t).unwrap(), 10.0);
    assert_approx_eq!(report.link_traffic(l13)[0], 10.0);
    assert_approx_eq!(report.link_traffic(l12)[0], 0.0);
}

#[test]
fn test_forwarding_loop() {
    // r1 and r2 point their default routes at each other, and r3 is not connected.
    let mut net = Network::new();
    let r1 = net.create_node("r1", Router);
    let r2 = net.create_node("r2", Router);
    let r3 = net.create_node("r3", Router);
    let l12 = net.create_link(Ethernet, r1, r2).unwrap();
    net.add_static_route(r1, "0.0.0.0/0".parse().unwrap(), "10.0.0.2".parse().unwrap()).unwrap();
    net.add_static_route(r2, "0.0.0.0/0".parse().unwrap(), "10.0.0.1".parse().unwrap()).unwrap();
    let t = net.create_traffic(r1, r3, 6.0).unwrap();
    let report = net.run_pipeline(&ExclusionSet::new()).unwrap();

    let path = &report.paths[&t];
    assert_eq!(path.looped, 6.0);
    assert_eq!(path.delivered, 0.0);
    assert_eq!(report.link_traffic(l12), [6.0, 6.0]);
    assert_eq!(
        printer::traffic_report(&net, &report).unwrap(),
        "r1 -> r3: 0 of 6 delivered, 0 dropped, 6 looped\n"
    );
}

#[test]
fn test_excluded_source() {
    let mut net = SwitchedNet::net(0);
    let (r1, r4) = (node(&net, "r1"), node(&net, "r4"));
    let t = net.create_traffic(r1, r4, 10.0).unwrap();
    let report = net.run_pipeline(&ExclusionSet::from_node(r1)).unwrap();
    assert_eq!(report.undelivered(t), Some(10.0));
    assert_eq!(report.link_traffic(access(&net, "r1")), [0.0, 0.0]);
}

#[test]
fn test_traffic_errors() {
    let mut net = SwitchedNet::net(0);
    let (r1, s1) = (node(&net, "r1"), node(&net, "s1"));
    assert_eq!(net.create_traffic(r1, s1, 1.0), Err(NetworkError::NotARouter(s1)));
    let t = net.create_traffic(r1, node(&net, "r2"), 1.0).unwrap();
    assert_eq!(net.traffics().count(), 1);
    net.remove_traffic(t).unwrap();
    assert_eq!(net.remove_traffic(t), Err(NetworkError::TrafficNotFound(t)));
    assert!(net.get_traffic(t).is_err());

    // removing a node removes its traffic
    let t = net.create_traffic(r1, node(&net, "r4"), 1.0).unwrap();
    net.remove_node(node(&net, "r4")).unwrap();
    assert!(net.get_traffic(t).is_err());
}

#[test]
fn test_worst_case_dimensioning() {
    let mut net = SwitchedNet::net(0);
    let (r1, r4) = (node(&net, "r1"), node(&net, "r4"));
    net.create_traffic(r1, r4, 10.0).unwrap();
    net.run_pipeline(&ExclusionSet::new()).unwrap();

    let expected: BTreeMap<LinkId, [f64; 2]> = vec![
        (access(&net, "r1"), [10.0, 0.0]),
        (access(&net, "r2"), [0.0, 0.0]),
        (access(&net, "r3"), [0.0, 10.0]),
        (link(&net, "r3", "r4"), [10.0, 0.0]),
    ]
    .into_iter()
    .collect();
    assert_eq!(net.worst_case_dimensioning(Some(1)).unwrap(), expected);
    assert_eq!(net.worst_case_dimensioning(Some(3)).unwrap(), expected);
    assert_eq!(net.worst_case_dimensioning(None).unwrap(), expected);
}

#[test]
fn test_worst_case_dimensioning_reroute() {
    // a ring of four routers: every failure moves the demand to the other side
    let mut net = Network::new();
    let r: Vec<NodeId> = (0..4).map(|i| net.create_node(format!("r{}", i), Router)).collect();
    let ring: Vec<LinkId> =
        (0..4).map(|i| net.create_link(Ethernet, r[i], r[(i + 1) % 4]).unwrap()).collect();
    let ospf = net.create_as(AsType::Ospf, "ospf").unwrap();
    net.add_to_as(ospf, r.iter().map(|n| ObjectId::from(*n))).unwrap();
    net.add_to_as(ospf, ring.iter().map(|l| ObjectId::from(*l))).unwrap();
    net.create_traffic(r[0], r[1], 10.0).unwrap();

    let worst = net.worst_case_dimensioning(Some(2)).unwrap();
    // directly over r0 -> r1, or backwards over r0 -> r3 -> r2 -> r1
    assert_eq!(worst[&ring[0]], [10.0, 0.0]);
    assert_eq!(worst[&ring[1]], [0.0, 10.0]);
    assert_eq!(worst[&ring[2]], [0.0, 10.0]);
    assert_eq!(worst[&ring[3]], [0.0, 10.0]);

    // the network itself is not modified
    assert_eq!(net.get_link(ring[0]).unwrap().traffic(SourceToDestination), 0.0);
}
