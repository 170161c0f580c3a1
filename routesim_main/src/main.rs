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

use routesim::algorithms::{
    DisjointPairAlgorithm, MaxFlowAlgorithm, PathConstraints, ShortestPathAlgorithm,
};
use routesim::netsim::{printer, ExclusionSet, LinkId, Network, NodeId};

use clap::{Parser, Subcommand, ValueEnum};
use log::*;
use std::collections::BTreeSet;
use std::error::Error;

mod example_networks;
use example_networks::*;

fn main() -> Result<(), Box<dyn Error>> {
    // initialize the env logger
    pretty_env_logger::init();
    // run clap
    let args = CommandLineArguments::parse();

    let mut net = get_net(args.topology, args.variant)?;
    let exclusions = get_exclusions(&net, &args.fail)?;
    info!("Running on {} (variant {})", args.topology, args.variant);

    match args.cmd {
        MainCommand::Routes { bgp } => {
            net.run_pipeline(&exclusions)?;
            for router in net.routers() {
                println!("{}", printer::route_table(&net, router)?);
                if bgp && !net.get_node(router)?.bgp_table().is_empty() {
                    println!("{}", printer::bgp_table(&net, router)?);
                }
            }
        }
        MainCommand::Path { source, target, algorithm, waypoints, disjoint } => {
            let source = net.get_node_id(source)?;
            let target = net.get_node_id(target)?;
            if let Some(algorithm) = disjoint {
                match net.disjoint_pair(source, target, algorithm.into(), &exclusions)? {
                    Some((a, b)) => {
                        println!("{}", printer::path(&net, &a)?);
                        println!("{}", printer::path(&net, &b)?);
                    }
                    None => println!("no disjoint pair"),
                }
            } else {
                let mut constraints = PathConstraints::with_exclusions(exclusions);
                for waypoint in waypoints {
                    constraints.waypoints.push(net.get_node_id(waypoint)?);
                }
                let path = net.shortest_path(source, target, algorithm.into(), &constraints)?;
                println!("{}", printer::path(&net, &path)?);
            }
        }
        MainCommand::Flow { source, target, algorithm, amount } => {
            let source = net.get_node_id(source)?;
            let target = net.get_node_id(target)?;
            match amount {
                Some(amount) => {
                    let flow = net.min_cost_flow(source, target, amount, &exclusions)?;
                    println!("Flow: {} of {}, cost: {}", flow.value, amount, flow.cost);
                }
                None => {
                    let value = net.max_flow(source, target, algorithm.into(), &exclusions)?;
                    println!("Maximum flow: {}", value);
                }
            }
            print!("{}", printer::link_traffic(&net)?);
        }
        MainCommand::Mst { nodes } => {
            let nodes = if nodes.is_empty() {
                net.topology().nodes().map(|n| n.node_id()).collect()
            } else {
                nodes.iter().map(|n| net.get_node_id(n)).collect::<Result<BTreeSet<NodeId>, _>>()?
            };
            let tree = net.minimum_spanning_tree(&nodes, &exclusions)?;
            for link in tree {
                let l = net.get_link(link)?;
                println!(
                    "{} - {} (cost: {})",
                    net.get_node_name(l.source())?,
                    net.get_node_name(l.destination())?,
                    net.cost_toward(link, l.source())?
                );
            }
        }
        MainCommand::Traffic { demands, worst_case, num_threads } => {
            add_demands(&mut net, &demands)?;
            let report = net.run_pipeline(&exclusions)?;
            print!("{}", printer::traffic_report(&net, &report)?);
            if worst_case {
                let worst = net.worst_case_dimensioning(num_threads)?;
                println!("Worst case over all single link failures:");
                for (link, [sd, ds]) in worst {
                    let l = net.get_link(link)?;
                    println!(
                        "{} -- {}: {} / {}",
                        net.get_node_name(l.source())?,
                        net.get_node_name(l.destination())?,
                        sd,
                        ds
                    );
                }
            } else {
                print!("{}", printer::link_traffic(&net)?);
            }
        }
    }

    Ok(())
}

/// Resolve the failed links, given as `a-b`.
fn get_exclusions(net: &Network, fail: &[String]) -> Result<ExclusionSet, Box<dyn Error>> {
    let mut exclusions = ExclusionSet::new();
    for f in fail {
        let (name_a, name_b) = f.split_once('-').ok_or_else(|| format!("Invalid link: {}", f))?;
        let links: Vec<LinkId> = net
            .topology()
            .links_between(net.get_node_id(name_a)?, net.get_node_id(name_b)?)
            .into_iter()
            .filter(|l| net.get_link(*l).map(|l| l.subtype().is_physical()).unwrap_or(false))
            .collect();
        if links.is_empty() {
            return Err(format!("No link between {} and {}", name_a, name_b).into());
        }
        for link in links {
            exclusions.exclude_link(link);
        }
    }
    Ok(exclusions)
}

/// Add the traffic demands, given as `source:target:throughput`.
fn add_demands(net: &mut Network, demands: &[String]) -> Result<(), Box<dyn Error>> {
    for d in demands {
        let parts: Vec<&str> = d.split(':').collect();
        if parts.len() != 3 {
            return Err(format!("Invalid demand: {}", d).into());
        }
        let source = net.get_node_id(parts[0])?;
        let target = net.get_node_id(parts[1])?;
        let throughput: f64 = parts[2].parse()?;
        net.create_traffic(source, target, throughput)?;
    }
    Ok(())
}

/// Simulate the routing state of a network topology, and run graph algorithms on it.
#[derive(Parser, Debug)]
#[command(name = "routesim", author = "Tibor Schneider")]
struct CommandLineArguments {
    /// Network to use
    #[arg(value_enum, short = 'n', long = "network", default_value_t = Topology::AreaNet)]
    topology: Topology,
    /// Variant of the network (seed of the random network)
    #[arg(short = 'v', long, default_value_t = 0)]
    variant: usize,
    /// Failed links, given as `a-b` (can be repeated)
    #[arg(short = 'x', long)]
    fail: Vec<String>,
    /// Action to perform
    #[command(subcommand)]
    cmd: MainCommand,
}

#[derive(Subcommand, Debug)]
enum MainCommand {
    /// Compute and print the route tables of all routers
    #[command(name = "routes")]
    Routes {
        /// Also print the BGP tables
        #[arg(short = 'b', long)]
        bgp: bool,
    },
    /// Compute the shortest path, or a pair of disjoint paths
    #[command(name = "path")]
    Path {
        /// Source node
        source: String,
        /// Target node
        target: String,
        /// Shortest path algorithm
        #[arg(value_enum, short = 'a', long, default_value_t = PathAlgorithm::Dijkstra)]
        algorithm: PathAlgorithm,
        /// Nodes to visit in order (can be repeated)
        #[arg(short = 'w', long = "waypoint")]
        waypoints: Vec<String>,
        /// Compute two link-disjoint paths with the given algorithm
        #[arg(value_enum, short = 'd', long)]
        disjoint: Option<DisjointAlgorithm>,
    },
    /// Compute the maximum flow, or a minimum-cost flow of the given amount
    #[command(name = "flow")]
    Flow {
        /// Source node
        source: String,
        /// Target node
        target: String,
        /// Maximum flow algorithm
        #[arg(value_enum, short = 'a', long, default_value_t = FlowAlgorithm::Dinic)]
        algorithm: FlowAlgorithm,
        /// Compute a minimum-cost flow of this amount instead
        #[arg(short = 'm', long)]
        amount: Option<f64>,
    },
    /// Compute a minimum spanning tree
    #[command(name = "mst")]
    Mst {
        /// Nodes to span (all nodes if empty)
        nodes: Vec<String>,
    },
    /// Route traffic demands over the computed route tables
    #[command(name = "traffic")]
    Traffic {
        /// Traffic demands, given as `source:target:throughput`
        #[arg(required = true)]
        demands: Vec<String>,
        /// Compute the worst-case link load over all single link failures
        #[arg(short = 'w', long)]
        worst_case: bool,
        /// Number of parallel execution units (by default, one per CPU)
        #[arg(long)]
        num_threads: Option<usize>,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum PathAlgorithm {
    Dijkstra,
    AStar,
    BellmanFord,
    LinearProgram,
}

impl From<PathAlgorithm> for ShortestPathAlgorithm {
    fn from(a: PathAlgorithm) -> Self {
        match a {
            PathAlgorithm::Dijkstra => ShortestPathAlgorithm::Dijkstra,
            PathAlgorithm::AStar => ShortestPathAlgorithm::AStar,
            PathAlgorithm::BellmanFord => ShortestPathAlgorithm::BellmanFord,
            PathAlgorithm::LinearProgram => ShortestPathAlgorithm::LinearProgram,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum DisjointAlgorithm {
    Bhandari,
    Suurbale,
}

impl From<DisjointAlgorithm> for DisjointPairAlgorithm {
    fn from(a: DisjointAlgorithm) -> Self {
        match a {
            DisjointAlgorithm::Bhandari => DisjointPairAlgorithm::Bhandari,
            DisjointAlgorithm::Suurbale => DisjointPairAlgorithm::Suurbale,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum FlowAlgorithm {
    FordFulkerson,
    EdmondsKarp,
    Dinic,
    LinearProgram,
}

impl From<FlowAlgorithm> for MaxFlowAlgorithm {
    fn from(a: FlowAlgorithm) -> Self {
        match a {
            FlowAlgorithm::FordFulkerson => MaxFlowAlgorithm::FordFulkerson,
            FlowAlgorithm::EdmondsKarp => MaxFlowAlgorithm::EdmondsKarp,
            FlowAlgorithm::Dinic => MaxFlowAlgorithm::Dinic,
            FlowAlgorithm::LinearProgram => MaxFlowAlgorithm::LinearProgram,
        }
    }
}
