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

//! Test the graph algorithms on the fixed example networks, and compare them against each other
//! on seeded random networks.

use crate::algorithms::{
    self, a_star, bellman_ford, dijkstra, floyd_warshall, BellmanFord, BellmanFordMode, CostGraph,
    DisjointPairAlgorithm, MaxFlowAlgorithm, PathConstraints, ShortestPathAlgorithm,
};
use crate::example_networks::random::{random_net, RandomNetParams};
use crate::example_networks::{ExampleNetwork, FlowNet, MstNet, PathNet};
use crate::netsim::{
    Direction, ExclusionSet, LinkId, LinkSubtype::Ethernet, Network, NodeId, NodeSubtype::Router,
};
use assert_approx_eq::assert_approx_eq;
use itertools::Itertools;
use std::collections::{BTreeSet, HashSet};

const ALL_SHORTEST_PATH: [ShortestPathAlgorithm; 4] = [
    ShortestPathAlgorithm::Dijkstra,
    ShortestPathAlgorithm::AStar,
    ShortestPathAlgorithm::BellmanFord,
    ShortestPathAlgorithm::LinearProgram,
];

const ALL_MAX_FLOW: [MaxFlowAlgorithm; 4] = [
    MaxFlowAlgorithm::FordFulkerson,
    MaxFlowAlgorithm::EdmondsKarp,
    MaxFlowAlgorithm::Dinic,
    MaxFlowAlgorithm::LinearProgram,
];

fn links(ids: &[usize]) -> Vec<LinkId> {
    ids.iter().map(|i| LinkId::new(*i)).collect()
}

fn node(net: &Network, name: &str) -> NodeId {
    net.get_node_id(name).unwrap()
}

#[test]
fn test_max_flow_19() {
    let mut net = FlowNet::net(0);
    let s = node(&net, "s");
    let t = node(&net, "t");
    for algorithm in ALL_MAX_FLOW.iter() {
        let value = net.max_flow(s, t, *algorithm, &ExclusionSet::new()).unwrap();
        assert_approx_eq!(value, 19.0, 1e-6);

        // the flow stored on the links respects the capacities
        for link in net.topology().physical_links() {
            let l = net.get_link(link).unwrap();
            for dir in [Direction::SourceToDestination, Direction::DestinationToSource] {
                assert!(l.flow(dir) <= l.capacity(dir) + 1e-6);
            }
        }
        // everything leaving s arrives at t
        let out: f64 = net
            .topology()
            .neighbors(s, &[])
            .into_iter()
            .map(|(_, l)| net.get_link(l).unwrap().flow(Direction::SourceToDestination))
            .sum();
        assert_approx_eq!(out, 19.0, 1e-6);
    }
}

#[test]
fn test_max_flow_with_failure() {
    let mut net = FlowNet::net(0);
    let s = node(&net, "s");
    let t = node(&net, "t");
    let n4 = node(&net, "4");
    let l4t = net.topology().links_between(n4, t)[0];
    for algorithm in ALL_MAX_FLOW.iter() {
        let value = net.max_flow(s, t, *algorithm, &ExclusionSet::from_link(l4t)).unwrap();
        assert_approx_eq!(value, 10.0, 1e-6);
    }
}

#[test]
fn test_min_cost_flow() {
    let mut net = FlowNet::net(0);
    let s = node(&net, "s");
    let t = node(&net, "t");
    // every shortest path has three hops
    let flow = net.min_cost_flow(s, t, 5.0, &ExclusionSet::new()).unwrap();
    assert_approx_eq!(flow.value, 5.0);
    assert_approx_eq!(flow.cost, 15.0);

    // more than the maximum flow cannot be sent
    let flow = net.min_cost_flow(s, t, 100.0, &ExclusionSet::new()).unwrap();
    assert_approx_eq!(flow.value, 19.0);
}

#[test]
fn test_mst() {
    let net = MstNet::net(0);
    let nodes: BTreeSet<NodeId> = net.topology().nodes().map(|n| n.node_id()).collect();
    let tree = net.minimum_spanning_tree(&nodes, &ExclusionSet::new()).unwrap();
    assert_eq!(tree.len(), 3);
    let mut costs: Vec<f64> = tree
        .iter()
        .map(|l| net.cost_toward(*l, net.get_link(*l).unwrap().source()).unwrap())
        .collect();
    costs.sort_by(|a, b| a.partial_cmp(b).unwrap());
    assert_eq!(costs, vec![1.0, 2.0, 4.0]);
}

#[test]
fn test_mst_subset() {
    let net = MstNet::net(0);
    let nodes: BTreeSet<NodeId> = vec![node(&net, "b"), node(&net, "c"), node(&net, "d")]
        .into_iter()
        .collect();
    let tree = net.minimum_spanning_tree(&nodes, &ExclusionSet::new()).unwrap();
    // b-c (2) and one of c-d or b-d (4)
    assert_eq!(tree.len(), 2);
    assert_eq!(tree[0], LinkId::new(1));
}

#[test]
fn test_shortest_path_three_pairs() {
    let net = PathNet::net(0);
    let expected = vec![
        ("a", "f", links(&[0, 2, 4, 6, 8]), 9.0),
        ("b", "e", links(&[2, 4, 6]), 4.0),
        ("a", "d", links(&[0, 2, 4]), 5.0),
    ];
    for (src, dst, path, cost) in expected {
        for algorithm in ALL_SHORTEST_PATH.iter() {
            let (s, t) = (node(&net, src), node(&net, dst));
            let p = net.shortest_path(s, t, *algorithm, &PathConstraints::new()).unwrap();
            assert_eq!(p.links, path, "{:?} from {} to {}", algorithm, src, dst);
            assert_approx_eq!(p.cost, cost);
        }
    }
}

#[test]
fn test_shortest_path_exclusions() {
    let net = PathNet::net(0);
    let constraints = PathConstraints::with_exclusions(ExclusionSet::from_link(LinkId::new(4)));
    for algorithm in ALL_SHORTEST_PATH.iter() {
        let (a, f) = (node(&net, "a"), node(&net, "f"));
        let p = net.shortest_path(a, f, *algorithm, &constraints).unwrap();
        assert_eq!(p.links, links(&[0, 3, 6, 8]), "{:?}", algorithm);
        assert_approx_eq!(p.cost, 12.0);
    }
}

#[test]
fn test_shortest_path_waypoints() {
    let mut net = PathNet::net(0);
    let mut constraints = PathConstraints::new();
    constraints.waypoints.push(node(&net, "f"));
    for algorithm in ALL_SHORTEST_PATH.iter() {
        let (a, d) = (node(&net, "a"), node(&net, "d"));
        let p = net.shortest_path(a, d, *algorithm, &constraints).unwrap();
        assert_eq!(p.links, links(&[0, 2, 4, 6, 8, 8, 6]), "{:?}", algorithm);
        assert_approx_eq!(p.cost, 13.0);
    }

    // an unreachable waypoint results in no path
    let g = net.create_node("g", Router);
    constraints.waypoints = vec![g];
    for algorithm in ALL_SHORTEST_PATH.iter() {
        let (a, d) = (node(&net, "a"), node(&net, "d"));
        let p = net.shortest_path(a, d, *algorithm, &constraints).unwrap();
        assert!(p.is_empty(), "{:?}", algorithm);
    }
}

#[test]
fn test_bellman_ford_negative_cycle() {
    let mut graph = CostGraph::new(4);
    let n: Vec<NodeId> = (0..4).map(NodeId::new).collect();
    graph.add_arc(n[0], n[1], LinkId::new(0), 1.0, 1.0);
    graph.add_arc(n[1], n[2], LinkId::new(1), -3.0, 1.0);
    graph.add_arc(n[2], n[0], LinkId::new(2), 1.0, 1.0);
    let excl = ExclusionSet::new();
    let constraints = PathConstraints::new();

    for mode in [BellmanFordMode::Path, BellmanFordMode::Cycle] {
        match bellman_ford(&graph, n[0], n[2], &constraints, mode) {
            BellmanFord::NegativeCycle(cycle) => {
                let cycle: BTreeSet<LinkId> = cycle.into_iter().collect();
                assert_eq!(cycle, links(&[0, 1, 2]).into_iter().collect());
            }
            other => panic!("expected a negative cycle, got {:?}", other),
        }
    }
    assert!(floyd_warshall(&graph, &excl).is_none());

    // without the negative arc, the node 3 is unreachable
    let excl = ExclusionSet::from_link(LinkId::new(1));
    let constraints = PathConstraints::with_exclusions(excl.clone());
    assert_eq!(
        bellman_ford(&graph, n[0], n[3], &constraints, BellmanFordMode::Path),
        BellmanFord::Unreachable
    );
    assert!(floyd_warshall(&graph, &excl).is_some());
}

#[test]
fn test_disjoint_pair_fixed() {
    let net = PathNet::net(0);
    let (a, f) = (node(&net, "a"), node(&net, "f"));
    for algorithm in [DisjointPairAlgorithm::Bhandari, DisjointPairAlgorithm::Suurbale] {
        let (p1, p2) = net.disjoint_pair(a, f, algorithm, &ExclusionSet::new()).unwrap().unwrap();
        let l1: HashSet<LinkId> = p1.links.iter().copied().collect();
        assert!(p2.links.iter().all(|l| !l1.contains(l)));
        assert_eq!(p1.nodes.first(), Some(&a));
        assert_eq!(p1.nodes.last(), Some(&f));
        assert_eq!(p2.nodes.first(), Some(&a));
        assert_eq!(p2.nodes.last(), Some(&f));
        assert!(p1.cost <= p2.cost);
    }

    // with only a single link left at f, no pair exists
    let excl = ExclusionSet::from_link(LinkId::new(7));
    for algorithm in [DisjointPairAlgorithm::Bhandari, DisjointPairAlgorithm::Suurbale] {
        assert_eq!(net.disjoint_pair(a, f, algorithm, &excl).unwrap(), None);
    }
}

#[test]
fn test_all_pairs_costs() {
    let net = PathNet::net(0);
    let costs = net.all_pairs_costs(&ExclusionSet::new()).unwrap();
    assert_eq!(costs.get(&(node(&net, "a"), node(&net, "f"))), Some(&9.0));
    assert_eq!(costs.get(&(node(&net, "f"), node(&net, "a"))), Some(&9.0));
    assert_eq!(costs.get(&(node(&net, "b"), node(&net, "b"))), Some(&0.0));
}

#[test]
fn test_all_pairs_parallel_links() {
    let mut net = Network::new();
    let a = net.create_node("a", Router);
    let b = net.create_node("b", Router);
    let cheap = net.create_link(Ethernet, a, b).unwrap();
    let expensive = net.create_link(Ethernet, a, b).unwrap();
    for (link, cost) in [(cheap, 3.0), (expensive, 6.0)] {
        net.set_cost_toward(link, a, cost).unwrap();
        net.set_cost_toward(link, b, cost).unwrap();
    }

    let excl = ExclusionSet::new();
    let costs = net.all_pairs_costs(&excl).unwrap();
    assert_eq!(costs.get(&(a, b)), Some(&3.0));
    assert_eq!(costs.get(&(b, a)), Some(&3.0));
    assert_eq!(dijkstra(&net.cost_graph(&excl), a, &excl).distance(b), Some(3.0));

    // with the cheap link failed, only the expensive one is left
    let excl = ExclusionSet::from_link(cheap);
    let costs = net.all_pairs_costs(&excl).unwrap();
    assert_eq!(costs.get(&(a, b)), Some(&6.0));
}

#[test]
fn test_bellman_ford_allowed_sets() {
    let net = PathNet::net(0);
    let graph = net.cost_graph(&ExclusionSet::new());
    let (a, d, f) = (node(&net, "a"), node(&net, "d"), node(&net, "f"));
    let path = |constraints: &PathConstraints| {
        match bellman_ford(&graph, a, f, constraints, BellmanFordMode::Path) {
            BellmanFord::Path(p) => Some((p.links, p.cost)),
            BellmanFord::Unreachable => None,
            other => panic!("unexpected {:?}", other),
        }
    };
    assert_eq!(path(&PathConstraints::new()), Some((links(&[0, 2, 4, 6, 8]), 9.0)));

    // all nodes except d: a b c e f
    let nodes: Vec<NodeId> = graph.nodes().iter().copied().filter(|n| *n != d).collect();
    let constraints = PathConstraints::new().allow_nodes(nodes);
    assert_eq!(path(&constraints), Some((links(&[0, 2, 5, 8]), 13.0)));

    // only the links of the detour a c e f
    let constraints = PathConstraints::new().allow_links(links(&[1, 5, 8]));
    assert_eq!(path(&constraints), Some((links(&[1, 5, 8]), 15.0)));

    // allowed and excluded links combine
    let mut constraints = PathConstraints::new().allow_links(links(&[1, 5, 8]));
    constraints.exclusions.exclude_link(LinkId::new(5));
    assert_eq!(path(&constraints), None);

    // the other algorithms honour the allowed sets as well
    let constraints = PathConstraints::new().allow_links(links(&[1, 5, 8]));
    for algorithm in ALL_SHORTEST_PATH.iter() {
        let p = net.shortest_path(a, f, *algorithm, &constraints).unwrap();
        assert_eq!(p.links, links(&[1, 5, 8]));
    }
    let constraints = PathConstraints::new().allow_nodes(vec![a, f]);
    for algorithm in ALL_SHORTEST_PATH.iter() {
        assert!(net.shortest_path(a, f, *algorithm, &constraints).unwrap().is_empty());
    }
}

#[test]
fn test_random_shortest_paths_agree() {
    let params = RandomNetParams::default();
    let excl = ExclusionSet::new();
    let constraints = PathConstraints::new();
    for seed in 0..10 {
        let net = random_net(&params, seed).unwrap();
        let graph = net.cost_graph(&excl);
        let all = floyd_warshall(&graph, &excl).unwrap();
        for source in net.routers() {
            let tree = dijkstra(&graph, source, &excl);
            for target in net.routers() {
                let expected = all.get(&(source, target)).copied();
                assert_eq!(tree.distance(target), expected);
                let expected = match expected {
                    Some(cost) => cost,
                    None => continue,
                };
                let p = a_star(&graph, source, target, &constraints);
                assert_approx_eq!(p.cost, expected);
                match bellman_ford(&graph, source, target, &constraints, BellmanFordMode::Path) {
                    BellmanFord::Path(p) => assert_approx_eq!(p.cost, expected),
                    other => panic!("seed {}: unexpected {:?}", seed, other),
                }
            }
        }
    }
}

#[test]
fn test_random_max_flows_agree() {
    let params = RandomNetParams::default();
    let excl = ExclusionSet::new();
    let constraints = PathConstraints::new();
    for seed in 0..10 {
        let net = random_net(&params, seed).unwrap();
        let graph = net.cost_graph(&excl);
        let routers = net.routers();
        for (s, t) in routers.iter().tuple_combinations().take(10) {
            let values: Vec<f64> = ALL_MAX_FLOW
                .iter()
                .map(|a| algorithms::max_flow(&graph, *s, *t, *a, &excl).value)
                .collect();
            for v in values.iter() {
                assert_approx_eq!(*v, values[0], 1e-6);
            }
        }
    }
}

#[test]
fn test_random_disjoint_pairs() {
    let params = RandomNetParams::default();
    let excl = ExclusionSet::new();
    let constraints = PathConstraints::new();
    for seed in 0..10 {
        let net = random_net(&params, seed).unwrap();
        let graph = net.cost_graph(&excl);
        let routers = net.routers();
        for (s, t) in routers.iter().tuple_combinations().take(10) {
            let bhandari =
                algorithms::disjoint_pair(&graph, *s, *t, DisjointPairAlgorithm::Bhandari, &excl);
            let suurbale =
                algorithms::disjoint_pair(&graph, *s, *t, DisjointPairAlgorithm::Suurbale, &excl);
            assert_eq!(bhandari.is_some(), suurbale.is_some(), "seed {}", seed);
            for (p1, p2) in bhandari.into_iter().chain(suurbale) {
                let l1: HashSet<LinkId> = p1.links.iter().copied().collect();
                assert!(p2.links.iter().all(|l| !l1.contains(l)), "seed {}", seed);
                assert_eq!(p1.nodes.last(), Some(t));
                assert_eq!(p2.nodes.last(), Some(t));
            }
        }
    }
}
