//! Recovers truck routes and UAV sorties from an engine assignment.

use std::collections::{BTreeMap, BTreeSet};

use dronevrp_structs::{
    plan::{Plan, PlanStatus, UavSortie},
    problem::Problem,
    NodeId, HUB,
};
use log::trace;
use ordered_float::OrderedFloat;
use thiserror::Error;

/// Values above this read as 1.
pub const TRUE_THRESHOLD: f64 = 0.9;
/// Values below this read as 0.
pub const FALSE_THRESHOLD: f64 = 0.1;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum Inconsistency {
    #[error("expected {expected} variable values, got {found}")]
    ValueCount { expected: usize, found: usize },
    #[error("assignment covers {found} nodes, instance has {expected}")]
    NodeCount { expected: usize, found: usize },
    #[error("{var} = {value} is neither near 0 nor near 1")]
    Fractional { var: String, value: f64 },
    #[error("node {0} is not truck-served and not UAV-eligible")]
    UnservedNode(NodeId),
    #[error("UAV-served node {0} has no launch point")]
    MissingLaunch(NodeId),
    #[error("UAV-served node {0} has no recovery point")]
    MissingRecovery(NodeId),
    #[error("UAV-served node {0} has launch candidates {1:?}")]
    AmbiguousLaunch(NodeId, Vec<NodeId>),
    #[error("UAV-served node {0} has recovery candidates {1:?}")]
    AmbiguousRecovery(NodeId, Vec<NodeId>),
    #[error("truck leaves node {0} on more than one arc")]
    BranchingRoute(NodeId),
    #[error("truck route stops at node {0}")]
    DanglingRoute(NodeId),
    #[error("truck arc {from} -> {to} is not part of any route")]
    StrayArc { from: NodeId, to: NodeId },
    #[error("nodes {0:?} are not reachable from the hub")]
    OrphanSubtour(Vec<NodeId>),
}

/// Terminal variable values in arc/node form. `s` has an unused hub entry.
#[derive(Debug, Clone)]
pub struct Assignment {
    n: usize,
    x: Vec<Vec<f64>>,
    y: Vec<Vec<f64>>,
    s: Vec<f64>,
    load: Vec<Vec<f64>>,
}

impl Assignment {
    pub fn new(node_count: usize) -> Self {
        let square = vec![vec![0.0; node_count + 1]; node_count + 1];
        Self {
            n: node_count,
            x: square.clone(),
            y: square.clone(),
            s: vec![0.0; node_count + 1],
            load: square,
        }
    }

    pub fn node_count(&self) -> usize {
        self.n
    }

    pub fn set_x(&mut self, i: NodeId, j: NodeId, value: f64) {
        self.x[i][j] = value;
    }

    pub fn set_y(&mut self, i: NodeId, j: NodeId, value: f64) {
        self.y[i][j] = value;
    }

    pub fn set_s(&mut self, i: NodeId, value: f64) {
        self.s[i] = value;
    }

    pub fn set_load(&mut self, i: NodeId, j: NodeId, value: f64) {
        self.load[i][j] = value;
    }

    pub fn x(&self, i: NodeId, j: NodeId) -> f64 {
        self.x[i][j]
    }

    pub fn y(&self, i: NodeId, j: NodeId) -> f64 {
        self.y[i][j]
    }

    pub fn s(&self, i: NodeId) -> f64 {
        self.s[i]
    }

    pub fn load(&self, i: NodeId, j: NodeId) -> f64 {
        self.load[i][j]
    }

    fn binaries(&self) -> impl Iterator<Item = f64> + '_ {
        self.x
            .iter()
            .chain(self.y.iter())
            .flat_map(|row| row.iter().copied())
            .chain(self.s.iter().skip(1).copied())
    }

    /// Largest distance of a binary value from the nearest integer.
    pub fn max_integrality_residual(&self) -> f64 {
        self.binaries()
            .map(|v| OrderedFloat((v - v.round()).abs()))
            .max()
            .map(|r| r.0)
            .unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Decoded {
    pub routes: Vec<Vec<NodeId>>,
    pub uav_sorties: BTreeMap<NodeId, UavSortie>,
}

impl Decoded {
    pub fn into_plan(self, status: PlanStatus, objective: f64, bound: f64) -> Plan {
        Plan {
            routes: self.routes,
            uav_sorties: self.uav_sorties,
            status,
            objective,
            bound,
        }
    }
}

fn near_binary(value: f64, var: impl FnOnce() -> String) -> Result<bool, Inconsistency> {
    if value > TRUE_THRESHOLD {
        Ok(true)
    } else if value < FALSE_THRESHOLD {
        Ok(false)
    } else {
        Err(Inconsistency::Fractional { var: var(), value })
    }
}

fn arcs(prefix: &str, values: &[Vec<f64>]) -> Result<Vec<Vec<bool>>, Inconsistency> {
    values
        .iter()
        .enumerate()
        .map(|(i, row)| {
            row.iter()
                .enumerate()
                .map(|(j, v)| near_binary(*v, || format!("{}[{},{}]", prefix, i, j)))
                .collect::<Result<Vec<_>, _>>()
        })
        .collect()
}

fn unique(
    node: NodeId,
    candidates: Vec<NodeId>,
    missing: fn(NodeId) -> Inconsistency,
    ambiguous: fn(NodeId, Vec<NodeId>) -> Inconsistency,
) -> Result<NodeId, Inconsistency> {
    match candidates.len() {
        0 => Err(missing(node)),
        1 => Ok(candidates[0]),
        _ => Err(ambiguous(node, candidates)),
    }
}

pub fn decode(problem: &Problem, assignment: &Assignment) -> Result<Decoded, Inconsistency> {
    if problem.node_count != assignment.n {
        return Err(Inconsistency::NodeCount {
            expected: problem.node_count,
            found: assignment.n,
        });
    }
    let n = assignment.n;

    let x = arcs("x", &assignment.x)?;
    let y = arcs("y", &assignment.y)?;
    let truck_served = problem
        .delivery_nodes()
        .map(|i| near_binary(assignment.s[i], || format!("s[{}]", i)))
        .collect::<Result<Vec<_>, _>>()?;
    let truck_served = |i: NodeId| i == HUB || truck_served[i - 1];

    // UAV sorties
    let mut uav_sorties = BTreeMap::new();
    for j in problem.delivery_nodes().filter(|j| !truck_served(*j)) {
        if !problem.is_uav_eligible(j) {
            return Err(Inconsistency::UnservedNode(j));
        }
        let launch = unique(
            j,
            (0..=n).filter(|i| y[*i][j]).collect(),
            Inconsistency::MissingLaunch,
            Inconsistency::AmbiguousLaunch,
        )?;
        let recover = unique(
            j,
            (0..=n).filter(|k| y[j][*k]).collect(),
            Inconsistency::MissingRecovery,
            Inconsistency::AmbiguousRecovery,
        )?;
        uav_sorties.insert(j, UavSortie { launch, recover });
    }
    trace!("uav sorties {:?}", uav_sorties);

    // Truck routes
    let mut remaining = problem
        .nodes()
        .filter(|i| truck_served(*i))
        .collect::<BTreeSet<_>>();
    let mut routes = Vec::new();
    while remaining.len() > 1 {
        let first = remaining.iter().copied().find(|j| *j != HUB && x[HUB][*j]);
        let Some(first) = first else {
            return Err(Inconsistency::OrphanSubtour(
                remaining.into_iter().filter(|i| *i != HUB).collect(),
            ));
        };

        let mut route = vec![HUB, first];
        remaining.remove(&first);
        let mut current = first;
        loop {
            let next = (0..=n).filter(|k| x[current][*k]).collect::<Vec<_>>();
            match next.as_slice() {
                [] => return Err(Inconsistency::DanglingRoute(current)),
                [HUB] => {
                    route.push(HUB);
                    break;
                }
                [k] => {
                    if !remaining.remove(k) {
                        return Err(Inconsistency::StrayArc {
                            from: current,
                            to: *k,
                        });
                    }
                    route.push(*k);
                    current = *k;
                }
                _ => return Err(Inconsistency::BranchingRoute(current)),
            }
        }
        trace!("truck route {:?}", route);
        routes.push(route);
    }

    // Every true truck arc, hub arcs included, must lie on a route.
    let used = routes
        .iter()
        .flat_map(|r| r.windows(2).map(|w| (w[0], w[1])))
        .collect::<BTreeSet<_>>();
    for i in 0..=n {
        if let Some(j) = (0..=n).find(|j| x[i][*j] && !used.contains(&(i, *j))) {
            return Err(Inconsistency::StrayArc { from: i, to: j });
        }
    }

    Ok(Decoded {
        routes,
        uav_sorties,
    })
}
