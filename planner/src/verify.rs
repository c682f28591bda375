//! Independent checks of a decoded plan against the routing rules.

use std::collections::BTreeMap;

use dronevrp_structs::{plan::Plan, problem::Problem, NodeId, HUB};
use thiserror::Error;

const LOAD_EPS: f64 = 1e-6;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum Violation {
    #[error("route {0} does not start and end at the hub")]
    RouteNotClosed(usize),
    #[error("route {0} visits no delivery node")]
    EmptyRoute(usize),
    #[error("route {0} passes through the hub")]
    HubInsideRoute(usize),
    #[error("node {0} does not exist")]
    UnknownNode(NodeId),
    #[error("node {0} is not served")]
    Uncovered(NodeId),
    #[error("node {0} is served more than once")]
    RepeatedNode(NodeId),
    #[error("route {route} carries {load}")]
    Overloaded { route: usize, load: f64 },
    #[error("node {0} is served by UAV but not eligible")]
    IneligibleUav(NodeId),
    #[error("sortie to node {0} does not bridge a truck arc")]
    SortieOffRoute(NodeId),
    #[error("{trucks} trucks dispatched, at least {min} needed")]
    TooFewTrucks { trucks: usize, min: usize },
}

pub fn verify(problem: &Problem, plan: &Plan) -> Vec<Violation> {
    let mut out = Vec::new();
    let mut served: BTreeMap<NodeId, usize> = BTreeMap::new();

    for (idx, route) in plan.routes.iter().enumerate() {
        if route.first() != Some(&HUB) || route.last() != Some(&HUB) {
            out.push(Violation::RouteNotClosed(idx));
        }
        if route.len() <= 2 {
            out.push(Violation::EmptyRoute(idx));
        }
        let interior = route.get(1..route.len().saturating_sub(1)).unwrap_or(&[]);
        if interior.contains(&HUB) {
            out.push(Violation::HubInsideRoute(idx));
        }
        for node in interior.iter().filter(|n| **n != HUB) {
            *served.entry(*node).or_default() += 1;
        }
    }

    let arcs = plan.truck_arcs();
    for (node, sortie) in plan.uav_sorties.iter() {
        *served.entry(*node).or_default() += 1;
        if !problem.is_uav_eligible(*node) {
            out.push(Violation::IneligibleUav(*node));
        }
        if !arcs.contains(&(sortie.launch, sortie.recover)) {
            out.push(Violation::SortieOffRoute(*node));
        }
    }

    for (node, count) in served.iter() {
        if *node == HUB || *node > problem.node_count {
            out.push(Violation::UnknownNode(*node));
        } else if *count > 1 {
            out.push(Violation::RepeatedNode(*node));
        }
    }
    out.extend(
        problem
            .delivery_nodes()
            .filter(|n| !served.contains_key(n))
            .map(Violation::Uncovered),
    );

    // Loads are only meaningful once every node id is known.
    if !out.iter().any(|v| matches!(v, Violation::UnknownNode(_))) {
        for (idx, route) in plan.routes.iter().enumerate() {
            let load = plan.route_load(problem, route);
            if load > problem.load_capacity + LOAD_EPS {
                out.push(Violation::Overloaded { route: idx, load });
            }
        }
    }

    let min = problem.min_trucks();
    if plan.num_trucks() < min {
        out.push(Violation::TooFewTrucks {
            trucks: plan.num_trucks(),
            min,
        });
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use dronevrp_structs::plan::{PlanStatus, UavSortie};

    fn problem() -> Problem {
        Problem {
            node_count: 4,
            uav_eligible: [2].into_iter().collect(),
            demand: vec![10.0, 5.0, 10.0, 10.0],
            load_capacity: 20.0,
            distance: vec![vec![1.0; 5]; 5],
            uav_cost_factor: 0.5,
        }
    }

    fn plan(routes: Vec<Vec<NodeId>>, sorties: &[(NodeId, NodeId, NodeId)]) -> Plan {
        Plan {
            routes,
            uav_sorties: sorties
                .iter()
                .map(|(u, launch, recover)| {
                    (*u, UavSortie { launch: *launch, recover: *recover })
                })
                .collect(),
            status: PlanStatus::Optimal,
            objective: 0.0,
            bound: 0.0,
        }
    }

    #[test]
    fn accepts_valid_plan() {
        let p = problem();
        let pl = plan(vec![vec![0, 1, 0], vec![0, 3, 4, 0]], &[(2, 0, 1)]);
        assert_eq!(verify(&p, &pl), vec![]);
    }

    #[test]
    fn flags_route_shape() {
        let p = problem();
        let pl = plan(vec![vec![0, 1, 2, 0], vec![3, 4, 0], vec![0, 0]], &[]);
        let v = verify(&p, &pl);
        assert!(v.contains(&Violation::RouteNotClosed(1)));
        assert!(v.contains(&Violation::EmptyRoute(2)));

        let pl = plan(vec![vec![0, 1, 0, 3, 0], vec![0, 2, 4, 0]], &[]);
        assert!(verify(&p, &pl).contains(&Violation::HubInsideRoute(0)));
    }

    #[test]
    fn flags_coverage() {
        let p = problem();
        let pl = plan(vec![vec![0, 1, 3, 0], vec![0, 3, 4, 0]], &[]);
        let v = verify(&p, &pl);
        assert!(v.contains(&Violation::RepeatedNode(3)));
        assert!(v.contains(&Violation::Uncovered(2)));

        let pl = plan(vec![vec![0, 1, 2, 0], vec![0, 3, 4, 7, 0]], &[]);
        assert!(verify(&p, &pl).contains(&Violation::UnknownNode(7)));
    }

    #[test]
    fn flags_sorties() {
        let p = problem();
        let pl = plan(vec![vec![0, 1, 2, 0], vec![0, 3, 0]], &[(2, 0, 1), (4, 0, 3)]);
        let v = verify(&p, &pl);
        assert!(v.contains(&Violation::RepeatedNode(2)));
        assert!(v.contains(&Violation::IneligibleUav(4)));

        let pl = plan(vec![vec![0, 1, 0], vec![0, 3, 4, 0]], &[(2, 1, 3)]);
        assert_eq!(verify(&p, &pl), vec![Violation::SortieOffRoute(2)]);
    }

    #[test]
    fn flags_load_and_truck_count() {
        let p = problem();
        // 10 + 5 launched + 10
        let pl = plan(vec![vec![0, 1, 3, 0], vec![0, 4, 0]], &[(2, 1, 3)]);
        assert_eq!(
            verify(&p, &pl),
            vec![Violation::Overloaded { route: 0, load: 25.0 }]
        );

        // hub sortie rides with the truck on 0 -> 2
        let mut p = problem();
        p.node_count = 3;
        p.uav_eligible = [1].into_iter().collect();
        p.demand = vec![11.0, 0.0, 0.0];
        p.load_capacity = 10.0;
        p.distance = vec![vec![1.0; 4]; 4];
        let pl = plan(vec![vec![0, 2, 0], vec![0, 3, 0]], &[(1, 0, 2)]);
        assert_eq!(
            verify(&p, &pl),
            vec![Violation::Overloaded { route: 0, load: 11.0 }]
        );

        let mut p = problem();
        p.load_capacity = 100.0;
        p.demand = vec![60.0, 0.0, 60.0, 0.0];
        let pl = plan(vec![vec![0, 1, 2, 3, 4, 0]], &[]);
        let v = verify(&p, &pl);
        assert!(v.contains(&Violation::TooFewTrucks { trucks: 1, min: 2 }));
    }
}
