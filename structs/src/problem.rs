use std::collections::BTreeSet;
use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{NodeId, HUB};

/// A truck + UAV routing instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Problem {
    pub node_count: usize,
    pub uav_eligible: BTreeSet<NodeId>,
    /// `demand[i]` is the demand of node `i + 1`.
    pub demand: Vec<f64>,
    pub load_capacity: f64,
    /// `(node_count + 1) x (node_count + 1)`, row/column 0 is the hub.
    pub distance: Vec<Vec<f64>>,
    pub uav_cost_factor: f64,
}

#[derive(Debug, Error, PartialEq)]
pub enum InstanceError {
    #[error("node_count must be at least 1")]
    NoNodes,
    #[error("demand has {found} entries, expected {expected}")]
    DemandLength { expected: usize, found: usize },
    #[error("demand of node {0} is negative")]
    NegativeDemand(NodeId),
    #[error("demand of node {0} is not finite")]
    NonFiniteDemand(NodeId),
    #[error("load_capacity must be positive and finite")]
    NonPositiveCapacity,
    #[error("distance matrix must be {expected}x{expected}")]
    DistanceShape { expected: usize },
    #[error("distance[{0}][{1}] must be finite and non-negative")]
    InvalidDistance(NodeId, NodeId),
    #[error("uav_eligible contains node {0}, outside 1..={1}")]
    EligibleOutOfRange(NodeId, usize),
    #[error("uav_cost_factor must be positive and finite")]
    NonPositiveUavFactor,
}

impl Problem {
    pub fn nodes(&self) -> RangeInclusive<NodeId> {
        HUB..=self.node_count
    }

    pub fn delivery_nodes(&self) -> RangeInclusive<NodeId> {
        1..=self.node_count
    }

    pub fn weight(&self, node: NodeId) -> f64 {
        if node == HUB {
            0.0
        } else {
            self.demand[node - 1]
        }
    }

    pub fn is_uav_eligible(&self, node: NodeId) -> bool {
        self.uav_eligible.contains(&node)
    }

    pub fn cost(&self, i: NodeId, j: NodeId) -> f64 {
        self.distance[i][j]
    }

    pub fn total_demand(&self) -> f64 {
        self.demand.iter().sum()
    }

    /// Lower bound on the number of trucks, `ceil(total demand / capacity)`.
    pub fn min_trucks(&self) -> usize {
        let ratio = self.total_demand() / self.load_capacity;
        // Absorb rounding noise such as 0.1 + 0.2 over 0.3.
        (ratio - 1e-9).ceil().max(0.0) as usize
    }

    pub fn validate(&self) -> Result<(), InstanceError> {
        if self.node_count == 0 {
            return Err(InstanceError::NoNodes);
        }
        if self.demand.len() != self.node_count {
            return Err(InstanceError::DemandLength {
                expected: self.node_count,
                found: self.demand.len(),
            });
        }
        for (idx, w) in self.demand.iter().enumerate() {
            if !w.is_finite() {
                return Err(InstanceError::NonFiniteDemand(idx + 1));
            }
            if *w < 0.0 {
                return Err(InstanceError::NegativeDemand(idx + 1));
            }
        }
        if !(self.load_capacity.is_finite() && self.load_capacity > 0.0) {
            return Err(InstanceError::NonPositiveCapacity);
        }

        let n = self.node_count + 1;
        if self.distance.len() != n || self.distance.iter().any(|row| row.len() != n) {
            return Err(InstanceError::DistanceShape { expected: n });
        }
        for (i, row) in self.distance.iter().enumerate() {
            if let Some(j) = row.iter().position(|d| !d.is_finite() || *d < 0.0) {
                return Err(InstanceError::InvalidDistance(i, j));
            }
        }

        if let Some(node) = self
            .uav_eligible
            .iter()
            .find(|u| **u == HUB || **u > self.node_count)
        {
            return Err(InstanceError::EligibleOutOfRange(*node, self.node_count));
        }
        if !(self.uav_cost_factor.is_finite() && self.uav_cost_factor > 0.0) {
            return Err(InstanceError::NonPositiveUavFactor);
        }
        Ok(())
    }
}

/// Budget handed to the MIP engine. Not interpreted by the formulation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverParams {
    pub time_limit_seconds: f64,
    pub optimality_gap: f64,
}

impl Default for SolverParams {
    fn default() -> Self {
        Self {
            time_limit_seconds: 600.0,
            optimality_gap: 0.05,
        }
    }
}
