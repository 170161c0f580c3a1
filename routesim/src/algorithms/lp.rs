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

//! # Linear Programs
//!
//! A small dense simplex solver, and the linear-program formulations of the maximum flow and the
//! shortest path problems. The solver handles problems of the form
//!
//! ```text
//! maximize    c^T x
//! subject to  A x <= b,   x >= 0,   b >= 0
//! ```
//!
//! Since `b >= 0`, the origin is a feasible basis, and no first phase is needed. Pivots follow
//! Bland's rule (lowest index entering and leaving variable), which guarantees termination on
//! degenerate problems.

use crate::algorithms::{ArcId, CostGraph, Path};
use crate::netsim::{ExclusionSet, NodeId};
use log::*;
use std::collections::HashMap;

const EPS: f64 = 1e-9;
const MAX_ITERATIONS: usize = 100_000;

/// Result of the simplex solver
#[derive(Debug, Clone, PartialEq)]
pub enum LpResult {
    /// Optimal solution, with the objective value and the assignment of all variables
    Optimal {
        /// Objective value
        value: f64,
        /// Variable assignment
        x: Vec<f64>,
    },
    /// The objective is unbounded
    Unbounded,
    /// The iteration limit was reached
    IterationLimit,
}

/// Solve `max c^T x` subject to `A x <= b` and `x >= 0`, where every entry of `b` must be
/// non-negative. Rows with a negative `b` are clamped to zero.
pub fn maximize(c: &[f64], a: &[Vec<f64>], b: &[f64]) -> LpResult {
    let n = c.len();
    let m = a.len();
    let width = n + m + 1;
    // tableau: m constraint rows, followed by the objective row. The last column holds b.
    let mut tab: Vec<Vec<f64>> = Vec::with_capacity(m + 1);
    for (i, row) in a.iter().enumerate() {
        let mut r = vec![0.0; width];
        for (j, v) in row.iter().enumerate().take(n) {
            r[j] = *v;
        }
        r[n + i] = 1.0;
        r[width - 1] = b.get(i).copied().unwrap_or(0.0).max(0.0);
        tab.push(r);
    }
    let mut obj = vec![0.0; width];
    for (j, v) in c.iter().enumerate() {
        obj[j] = -v;
    }
    tab.push(obj);
    let mut basis: Vec<usize> = (n..n + m).collect();

    for _ in 0..MAX_ITERATIONS {
        let entering = match (0..n + m).find(|j| tab[m][*j] < -EPS) {
            Some(j) => j,
            None => {
                let mut x = vec![0.0; n];
                for (i, var) in basis.iter().enumerate() {
                    if *var < n {
                        x[*var] = tab[i][width - 1];
                    }
                }
                return LpResult::Optimal { value: tab[m][width - 1], x };
            }
        };

        let mut leaving: Option<(usize, f64)> = None;
        for i in 0..m {
            if tab[i][entering] > EPS {
                let ratio = tab[i][width - 1] / tab[i][entering];
                leaving = match leaving {
                    Some((l, r)) if r < ratio - EPS => Some((l, r)),
                    Some((l, r)) if (r - ratio).abs() <= EPS && basis[l] < basis[i] => {
                        Some((l, r))
                    }
                    _ => Some((i, ratio)),
                };
            }
        }
        let row = match leaving {
            Some((row, _)) => row,
            None => return LpResult::Unbounded,
        };

        let pivot = tab[row][entering];
        for v in tab[row].iter_mut() {
            *v /= pivot;
        }
        let pivot_row = tab[row].clone();
        for (i, r) in tab.iter_mut().enumerate() {
            if i == row {
                continue;
            }
            let factor = r[entering];
            if factor.abs() > EPS {
                for (v, p) in r.iter_mut().zip(pivot_row.iter()) {
                    *v -= factor * p;
                }
            }
        }
        basis[row] = entering;
    }
    warn!("Simplex reached the iteration limit");
    LpResult::IterationLimit
}

/// Allowed arcs used as LP variables, and the index of each node.
fn variables(
    graph: &CostGraph,
    exclusions: &ExclusionSet,
    usable: impl Fn(f64, f64) -> bool,
) -> Vec<(ArcId, NodeId, NodeId, f64, f64)> {
    graph
        .arcs()
        .filter(|(id, _, _, a)| graph.is_allowed(*id, exclusions) && usable(a.cost, a.capacity))
        .map(|(id, from, to, a)| (id, from, to, a.cost, a.capacity))
        .collect()
}

/// Add the flow conservation of `node` as two inequalities. `extra` is the coefficient of
/// additional variables in the balance `inflow - outflow + extra = 0`.
fn conservation(
    rows: &mut Vec<Vec<f64>>,
    b: &mut Vec<f64>,
    width: usize,
    node: NodeId,
    vars: &[(ArcId, NodeId, NodeId, f64, f64)],
    extra: &[(usize, f64)],
) {
    let mut row = vec![0.0; width];
    for (j, (_, from, to, _, _)) in vars.iter().enumerate() {
        if *to == node {
            row[j] += 1.0;
        }
        if *from == node {
            row[j] -= 1.0;
        }
    }
    for (j, v) in extra {
        row[*j] += v;
    }
    let neg: Vec<f64> = row.iter().map(|v| -v).collect();
    rows.push(row);
    b.push(0.0);
    rows.push(neg);
    b.push(0.0);
}

/// Maximum flow from `source` to `target` as a linear program. Returns the flow value and the flow
/// on every arc.
pub fn max_flow_lp(
    graph: &CostGraph,
    source: NodeId,
    target: NodeId,
    exclusions: &ExclusionSet,
) -> (f64, HashMap<ArcId, f64>) {
    let vars = variables(graph, exclusions, |_, capacity| capacity > EPS);
    let n = vars.len();
    if source == target || n == 0 {
        return (0.0, HashMap::new());
    }
    let mut rows = Vec::new();
    let mut b = Vec::new();
    for (j, (_, _, _, _, capacity)) in vars.iter().enumerate() {
        let mut row = vec![0.0; n];
        row[j] = 1.0;
        rows.push(row);
        b.push(*capacity);
    }
    for node in graph.nodes().iter().filter(|v| **v != source && **v != target) {
        conservation(&mut rows, &mut b, n, *node, &vars, &[]);
    }
    let c: Vec<f64> = vars
        .iter()
        .map(|(_, from, to, _, _)| match (*from == source, *to == source) {
            (true, false) => 1.0,
            (false, true) => -1.0,
            _ => 0.0,
        })
        .collect();

    match maximize(&c, &rows, &b) {
        LpResult::Optimal { value, x } => {
            let flows = vars
                .iter()
                .zip(x)
                .filter(|(_, f)| *f > EPS)
                .map(|((arc, _, _, _, _), f)| (*arc, f))
                .collect();
            (value, flows)
        }
        _ => (0.0, HashMap::new()),
    }
}

/// Shortest path from `source` to `target` as a linear program. The program routes one unit of
/// flow from the target back to the source over a return variable `f <= 1`, and maximizes
/// `M f - cost`, where `M` exceeds the cost of every simple path. Arcs with negative costs must
/// not be present.
pub fn shortest_path_lp(
    graph: &CostGraph,
    source: NodeId,
    target: NodeId,
    exclusions: &ExclusionSet,
) -> Path {
    if source == target {
        return graph.path_from_arcs(source, Vec::new());
    }
    let vars = variables(graph, exclusions, |cost, _| cost.is_finite() && cost >= 0.0);
    let n = vars.len();
    let f = n;
    let width = n + 1;
    let big_m = 1.0 + vars.iter().map(|(_, _, _, c, _)| c.abs()).sum::<f64>();

    let mut rows = Vec::new();
    let mut b = Vec::new();
    for j in 0..width {
        let mut row = vec![0.0; width];
        row[j] = 1.0;
        rows.push(row);
        b.push(1.0);
    }
    for node in graph.nodes().iter() {
        let extra = if *node == source {
            vec![(f, 1.0)]
        } else if *node == target {
            vec![(f, -1.0)]
        } else {
            Vec::new()
        };
        conservation(&mut rows, &mut b, width, *node, &vars, &extra);
    }
    let mut c: Vec<f64> = vars.iter().map(|(_, _, _, cost, _)| -cost).collect();
    c.push(big_m);

    let x = match maximize(&c, &rows, &b) {
        LpResult::Optimal { x, .. } if x[f] > 0.5 => x,
        _ => return Path::empty(),
    };

    // follow the arcs carrying the unit of flow
    let mut arcs = Vec::new();
    let mut node = source;
    let mut used = vec![false; n];
    while node != target {
        let next = vars
            .iter()
            .enumerate()
            .find(|(j, (_, from, _, _, _))| !used[*j] && *from == node && x[*j] > 0.5);
        match next {
            Some((j, (arc, _, to, _, _))) => {
                used[j] = true;
                arcs.push(*arc);
                node = *to;
            }
            None => return Path::empty(),
        }
    }
    graph.path_from_arcs(source, arcs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn simple_program() {
        // max 3x + 2y, x + y <= 4, x + 3y <= 6, x <= 3
        let c = vec![3.0, 2.0];
        let a = vec![vec![1.0, 1.0], vec![1.0, 3.0], vec![1.0, 0.0]];
        let b = vec![4.0, 6.0, 3.0];
        match maximize(&c, &a, &b) {
            LpResult::Optimal { value, x } => {
                assert_approx_eq!(value, 11.0);
                assert_approx_eq!(x[0], 3.0);
                assert_approx_eq!(x[1], 1.0);
            }
            r => panic!("unexpected result: {:?}", r),
        }
    }

    #[test]
    fn unbounded_program() {
        // max x, -x + y <= 1
        let c = vec![1.0, 0.0];
        let a = vec![vec![-1.0, 1.0]];
        let b = vec![1.0];
        assert_eq!(maximize(&c, &a, &b), LpResult::Unbounded);
    }

    #[test]
    fn degenerate_program() {
        // max x + y, x - y <= 0, -x + y <= 0, x <= 2
        let c = vec![1.0, 1.0];
        let a = vec![vec![1.0, -1.0], vec![-1.0, 1.0], vec![1.0, 0.0]];
        let b = vec![0.0, 0.0, 2.0];
        match maximize(&c, &a, &b) {
            LpResult::Optimal { value, .. } => assert_approx_eq!(value, 4.0),
            r => panic!("unexpected result: {:?}", r),
        }
    }
}
