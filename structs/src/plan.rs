use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::{problem::Problem, NodeId, HUB};

/// Where a UAV serving a node leaves and rejoins its truck.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UavSortie {
    pub launch: NodeId,
    pub recover: NodeId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlanStatus {
    /// The engine proved optimality within the requested gap.
    Optimal,
    /// Best assignment found before the time limit.
    TimeLimit,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plan {
    /// Truck routes, each starting and ending at the hub.
    pub routes: Vec<Vec<NodeId>>,
    pub uav_sorties: BTreeMap<NodeId, UavSortie>,
    pub status: PlanStatus,
    pub objective: f64,
    pub bound: f64,
}

impl Plan {
    pub fn print(&self) {
        println!("plan ({:?}, obj={:.2}, bound={:.2})", self.status, self.objective, self.bound);
        for (i, route) in self.routes.iter().enumerate() {
            println!("truck {}", i);
            println!("  - {:?}", route);
        }
        for (node, sortie) in self.uav_sorties.iter() {
            println!("uav {} <- {} -> {}", node, sortie.launch, sortie.recover);
        }
    }

    pub fn num_trucks(&self) -> usize {
        self.routes.len()
    }

    pub fn is_optimal(&self) -> bool {
        self.status == PlanStatus::Optimal
    }

    /// Interior nodes of all routes, in route order.
    pub fn truck_served(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.routes
            .iter()
            .flat_map(|r| r.iter().copied().filter(|n| *n != HUB))
    }

    /// Truck arcs used by the plan. Two plans with the same arcs are the same
    /// route structure regardless of route order.
    pub fn truck_arcs(&self) -> BTreeSet<(NodeId, NodeId)> {
        self.routes
            .iter()
            .flat_map(|r| r.iter().copied().zip(r.iter().copied().skip(1)))
            .collect()
    }

    /// Demand picked up for one stop: the node itself plus the sorties
    /// launched from it. Zero for the hub.
    pub fn stop_load(&self, problem: &Problem, node: NodeId) -> f64 {
        if node == HUB {
            return 0.0;
        }
        problem.weight(node)
            + self
                .uav_sorties
                .iter()
                .filter(|(_, s)| s.launch == node)
                .map(|(u, _)| problem.weight(*u))
                .sum::<f64>()
    }

    /// Demand of sorties launched at the hub that land on the route's first
    /// stop. They fly alongside the truck on its first arc.
    pub fn hub_launch_load(&self, problem: &Problem, route: &[NodeId]) -> f64 {
        let [HUB, first, ..] = route else {
            return 0.0;
        };
        self.uav_sorties
            .iter()
            .filter(|(_, s)| s.launch == HUB && s.recover == *first)
            .map(|(u, _)| problem.weight(*u))
            .sum()
    }

    /// Demand a truck leaves the hub with: its own stops, the sorties it
    /// launches from them and a hub sortie bridging its first arc.
    pub fn route_load(&self, problem: &Problem, route: &[NodeId]) -> f64 {
        self.hub_launch_load(problem, route)
            + route
                .iter()
                .map(|n| self.stop_load(problem, *n))
                .sum::<f64>()
    }

    pub fn truck_distance(&self, problem: &Problem) -> f64 {
        self.truck_arcs()
            .iter()
            .map(|(i, j)| problem.cost(*i, *j))
            .sum()
    }

    pub fn uav_distance(&self, problem: &Problem) -> f64 {
        self.uav_sorties
            .iter()
            .map(|(u, s)| {
                (problem.cost(s.launch, *u) + problem.cost(*u, s.recover)) * problem.uav_cost_factor
            })
            .sum()
    }

    pub fn total_distance(&self, problem: &Problem) -> f64 {
        self.truck_distance(problem) + self.uav_distance(problem)
    }
}
