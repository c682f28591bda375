use dronevrp_structs::{
    plan::Plan,
    problem::{Problem, SolverParams},
    HUB,
};

use crate::{
    decode::decode,
    extsolvers::{highs::HighsSolverInstance, LpEngine},
    formulation::Formulation,
    plan, solve_highs,
    verify::verify,
    PlanError,
};

fn load_instance(name: &str) -> Problem {
    let path = format!("{}/../instances/{}.json", env!("CARGO_MANIFEST_DIR"), name);
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

// The vehicle weight dwarfs distances, so a relative gap would stop as soon
// as the truck count is right. Prove optimality instead.
fn exact() -> SolverParams {
    SolverParams {
        time_limit_seconds: 60.0,
        optimality_gap: 0.0,
    }
}

fn solve(problem: &Problem) -> Plan {
    let _ = env_logger::try_init();
    let plan = solve_highs(problem, &exact()).unwrap();
    plan.print();
    assert_eq!(verify(problem, &plan), vec![]);
    plan
}

#[test]
fn grid_needs_two_trucks() {
    let problem = load_instance("grid4");
    let plan = solve(&problem);
    assert_eq!(plan.num_trucks(), 2);
    assert!(plan.uav_sorties.is_empty());
    for route in plan.routes.iter() {
        assert!(plan.route_load(&problem, route) <= 30.0 + 1e-6);
    }
    assert!(plan.is_optimal());
}

#[test]
fn single_eligible_node_flies() {
    let problem = load_instance("single_uav");
    let plan = solve(&problem);
    assert_eq!(plan.routes, vec![vec![HUB, 2, HUB]]);
    let sortie = plan.uav_sorties.get(&1).unwrap();
    assert!([(HUB, 2), (2, HUB)].contains(&(sortie.launch, sortie.recover)));
    assert!((plan.total_distance(&problem) - 8.8).abs() < 1e-6);
}

#[test]
fn oversized_demand_is_infeasible() {
    let problem = load_instance("overload");
    let result = solve_highs(&problem, &exact());
    assert!(matches!(result, Err(PlanError::Infeasible)));
}

#[test]
fn oversized_eligible_demand_is_infeasible() {
    let problem = load_instance("overload_eligible");
    assert!(problem.is_uav_eligible(1));
    let result = solve_highs(&problem, &exact());
    assert!(matches!(result, Err(PlanError::Infeasible)));
}

#[test]
fn mixed_instance_decodes_consistently() {
    let problem = load_instance("mixed6");
    let plan = solve(&problem);
    assert!(plan.num_trucks() >= problem.min_trucks());
    assert!(plan.bound <= plan.objective + 1e-6 * plan.objective.abs());

    let f = Formulation::new(&problem).unwrap();
    let expected = f.vehicle_weight * plan.num_trucks() as f64 + plan.total_distance(&problem);
    assert!((plan.objective - expected).abs() < 1e-6 * expected);

    let assignment = f.assignment(&f.encode_plan(&problem, &plan).unwrap()).unwrap();
    let again = decode(&problem, &assignment).unwrap();
    assert_eq!(again.routes, plan.routes);
    assert_eq!(again.uav_sorties, plan.uav_sorties);
}

#[test]
fn zero_demand_nodes_join_a_route() {
    let problem = load_instance("zero_demand");
    let plan = solve(&problem);
    assert_eq!(plan.num_trucks(), 1);
    assert_eq!(plan.truck_served().count(), 4);
}

#[test]
fn model_dump_does_not_change_result() {
    let problem = load_instance("grid4");
    let path = std::env::temp_dir().join("dronevrp_grid4.lp");
    let mut engine = LpEngine::<HighsSolverInstance>::with_model_dump(path.clone());
    let plan = plan(&problem, &exact(), &mut engine).unwrap();
    assert_eq!(plan.num_trucks(), 2);
    assert!(path.exists());
}
