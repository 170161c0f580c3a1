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

//! # Network Configuration
//! This module represents the configuration of the network, that is, every parameter that is set
//! on top of the topology and the protocol domains.
//!
//! - [`Config`]: Network-wide configuration. The datastructure is a collection of several
//!   [`ConfigExpr`].
//! - [`ConfigExpr`]: Single configuration expression (one parameter of a node or a link).
//! - [`ConfigExprKey`]: The thing a [`ConfigExpr`] configures, without its value.
//!
//! The configuration is applied with [`Network::set_config`](crate::netsim::Network::set_config).
//!
//! # Example Usage
//!
//! ```rust
//! use routesim::netsim::config::{Config, ConfigExpr::LinkCost};
//! use routesim::netsim::ConfigError;
//!
//! fn main() -> Result<(), ConfigError> {
//!     let (r0, r1) = (0.into(), 1.into());
//!     let link = 0.into();
//!
//!     let mut config = Config::new();
//!     config.add(LinkCost { link, from: r0, cost: 10.0 })?;
//!     config.add(LinkCost { link, from: r1, cost: 20.0 })?;
//!
//!     // the cost leaving r0 is already configured
//!     assert_eq!(
//!         config.add(LinkCost { link, from: r0, cost: 5.0 }),
//!         Err(ConfigError::ConfigExprOverload)
//!     );
//!     assert_eq!(config.len(), 2);
//!
//!     Ok(())
//! }
//! ```

use crate::netsim::{AsId, ConfigError, LinkId, LinkWeight, NodeId, Subnet};

use std::collections::HashMap;
use std::net::Ipv4Addr;

/// # Network Configuration
/// This struct represents the configuration of a network. It is made up of several *unordered*
/// [`ConfigExpr`].
///
/// The `Config` struct contains only "unique" `ConfigExpr`. This means, that a config cannot have
/// an expression to set the cost of a specific link direction to 1, and another expression setting
/// the same link direction to 2.0.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// All lines of configuration
    pub(crate) expr: HashMap<ConfigExprKey, ConfigExpr>,
}

impl Config {
    /// Create an empty configuration
    pub fn new() -> Self {
        Self { expr: HashMap::new() }
    }

    /// Add a single configuration expression. This fails if a similar expression already exists.
    pub fn add(&mut self, expr: ConfigExpr) -> Result<(), ConfigError> {
        // check if there is an expression which this one would overwrite
        if let Some(old_expr) = self.expr.insert(expr.key(), expr) {
            self.expr.insert(old_expr.key(), old_expr);
            Err(ConfigError::ConfigExprOverload)
        } else {
            Ok(())
        }
    }

    /// Remove the expression with the given key, returning it.
    pub fn remove(&mut self, key: &ConfigExprKey) -> Result<ConfigExpr, ConfigError> {
        self.expr.remove(key).ok_or(ConfigError::ConfigExprNotFound)
    }

    /// Returns the expression with the given key
    pub fn get(&self, key: &ConfigExprKey) -> Option<&ConfigExpr> {
        self.expr.get(key)
    }

    /// Returns the number of config expressions in the config.
    pub fn len(&self) -> usize {
        self.expr.len()
    }

    /// Returns `true` if the config is empty
    pub fn is_empty(&self) -> bool {
        self.expr.is_empty()
    }

    /// Returns an iterator over all expressions in the configuration.
    pub fn iter(&self) -> std::collections::hash_map::Values<ConfigExprKey, ConfigExpr> {
        self.expr.values()
    }

    /// Returns all expressions in the order they are applied: first the link capacities, then
    /// the reference bandwidths (deriving the link costs from the capacities), and then all
    /// others. Hence, an explicit link cost always overrides the derived cost. Within each stage,
    /// the expressions are ordered by their key.
    pub fn ordered(&self) -> Vec<&ConfigExpr> {
        let mut exprs: Vec<(&ConfigExprKey, &ConfigExpr)> = self.expr.iter().collect();
        exprs.sort_by_key(|(key, _)| (key.stage(), *key));
        exprs.into_iter().map(|(_, expr)| expr).collect()
    }
}

impl PartialEq for Config {
    fn eq(&self, other: &Self) -> bool {
        self.expr.len() == other.expr.len()
            && self.expr.iter().all(|(key, e)| other.expr.get(key) == Some(e))
    }
}

/// # Single configuration expression
/// The expression sets a specific parameter in the network.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigExpr {
    /// Sets the cost of a link, in the direction leaving `from`
    LinkCost {
        /// Link to configure (a virtual connection configures its underlying physical link)
        link: LinkId,
        /// The direction leaving this node is configured
        from: NodeId,
        /// Cost of the direction
        cost: LinkWeight,
    },
    /// Sets the capacity of a link, in the direction leaving `from`
    LinkCapacity {
        /// Link to configure
        link: LinkId,
        /// The direction leaving this node is configured
        from: NodeId,
        /// Capacity of the direction
        capacity: f64,
    },
    /// Set a static route
    StaticRoute {
        /// On which router set the static route
        router: NodeId,
        /// For which subnet to set the static route (`0.0.0.0/0` for the default route)
        subnet: Subnet,
        /// IP address of the neighboring interface to forward packets to.
        next_hop: Ipv4Addr,
    },
    /// Set the maximum number of equal-cost paths of a router in an AS
    LoadBalancing {
        /// Router to configure
        router: NodeId,
        /// Domain in which the value applies
        as_id: AsId,
        /// Number of paths, at least 1
        paths: usize,
    },
    /// Set the priority of a router in an AS (used by the spanning tree root election)
    RouterPriority {
        /// Router to configure
        router: NodeId,
        /// Domain in which the value applies
        as_id: AsId,
        /// Priority, lower is better
        priority: u32,
    },
    /// Set the reference bandwidth of an AS. The cost of all its links is recomputed.
    ReferenceBandwidth {
        /// Domain to configure
        as_id: AsId,
        /// Reference bandwidth
        bandwidth: f64,
    },
    /// Set the weight a router assigns to routes received over a BGP peering
    BgpWeight {
        /// BGP peering link
        peering: LinkId,
        /// Router assigning the weight
        from: NodeId,
        /// Weight (0 means not preferred at all)
        weight: u32,
    },
}

impl ConfigExpr {
    /// Returns the key of the config expression. The idea behind the key is that the `ConfigExpr`
    /// cannot be hashed and used as a key for a `HashMap`. But `ConfigExprKey` implements `Hash`,
    /// and can therefore be used as a key.
    pub fn key(&self) -> ConfigExprKey {
        match self {
            ConfigExpr::LinkCost { link, from, .. } => {
                ConfigExprKey::LinkCost { link: *link, from: *from }
            }
            ConfigExpr::LinkCapacity { link, from, .. } => {
                ConfigExprKey::LinkCapacity { link: *link, from: *from }
            }
            ConfigExpr::StaticRoute { router, subnet, .. } => {
                ConfigExprKey::StaticRoute { router: *router, subnet: *subnet }
            }
            ConfigExpr::LoadBalancing { router, as_id, .. } => {
                ConfigExprKey::LoadBalancing { router: *router, as_id: *as_id }
            }
            ConfigExpr::RouterPriority { router, as_id, .. } => {
                ConfigExprKey::RouterPriority { router: *router, as_id: *as_id }
            }
            ConfigExpr::ReferenceBandwidth { as_id, .. } => {
                ConfigExprKey::ReferenceBandwidth { as_id: *as_id }
            }
            ConfigExpr::BgpWeight { peering, from, .. } => {
                ConfigExprKey::BgpWeight { peering: *peering, from: *from }
            }
        }
    }
}

/// # Key for Config Expressions
/// Key for a single configuration expression, where the value is missing. Two expressions with
/// the same key configure the same parameter, and cannot both be part of a [`Config`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ConfigExprKey {
    /// Cost of a link direction
    LinkCost {
        /// Link
        link: LinkId,
        /// Departing node
        from: NodeId,
    },
    /// Capacity of a link direction
    LinkCapacity {
        /// Link
        link: LinkId,
        /// Departing node
        from: NodeId,
    },
    /// Static route
    StaticRoute {
        /// Router
        router: NodeId,
        /// Subnet
        subnet: Subnet,
    },
    /// Number of equal-cost paths
    LoadBalancing {
        /// Router
        router: NodeId,
        /// Domain
        as_id: AsId,
    },
    /// Router priority
    RouterPriority {
        /// Router
        router: NodeId,
        /// Domain
        as_id: AsId,
    },
    /// Reference bandwidth
    ReferenceBandwidth {
        /// Domain
        as_id: AsId,
    },
    /// BGP weight
    BgpWeight {
        /// BGP peering link
        peering: LinkId,
        /// Router assigning the weight
        from: NodeId,
    },
}

impl ConfigExprKey {
    fn stage(&self) -> u8 {
        match self {
            ConfigExprKey::LinkCapacity { .. } => 0,
            ConfigExprKey::ReferenceBandwidth { .. } => 1,
            _ => 2,
        }
    }
}
