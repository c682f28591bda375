use std::time::Instant;

use decode::{decode, Inconsistency};
use dronevrp_structs::{
    plan::{Plan, PlanStatus},
    problem::{InstanceError, Problem, SolverParams},
};
use extsolvers::{EngineOutcome, MipEngine, SolverError};
use formulation::{Formulation, FormulationOptions};
use log::{debug, info, trace, warn};
use thiserror::Error;

pub mod decode;
pub mod extsolvers;
pub mod formulation;
pub mod milp;
pub mod verify;

#[cfg(all(test, feature = "highs"))]
mod scenario_tests;

#[derive(Debug, Error)]
pub enum PlanError {
    #[error("invalid instance: {0}")]
    InvalidInstance(#[from] InstanceError),
    #[error("no plan satisfies the routing constraints")]
    Infeasible,
    #[error("engine assignment does not decode: {0}")]
    InconsistentAssignment(#[from] Inconsistency),
    #[error("engine failed: {0}")]
    Solver(#[from] SolverError),
}

pub fn plan(
    problem: &Problem,
    params: &SolverParams,
    engine: &mut impl MipEngine,
) -> Result<Plan, PlanError> {
    plan_with_options(problem, params, FormulationOptions::default(), engine)
}

pub fn plan_with_options(
    problem: &Problem,
    params: &SolverParams,
    options: FormulationOptions,
    engine: &mut impl MipEngine,
) -> Result<Plan, PlanError> {
    problem.validate()?;
    info!(
        "planning {} nodes ({} UAV-eligible), total demand {:.1}, capacity {:.1}",
        problem.node_count,
        problem.uav_eligible.len(),
        problem.total_demand(),
        problem.load_capacity
    );

    let formulation = {
        #[cfg(feature = "prof")]
        let _p = hprof::enter("formulate");
        Formulation::with_options(problem, options)?
    };
    debug!(
        "model has {} variables ({} binary) and {} rows",
        formulation.model.num_vars(),
        formulation.model.num_binaries(),
        formulation.model.num_rows()
    );

    let t0 = Instant::now();
    let outcome = {
        #[cfg(feature = "prof")]
        let _p = hprof::enter("solve");
        engine.solve(&formulation.model, params)?
    };
    let solve_time = t0.elapsed().as_secs_f64();

    let solution = match outcome {
        EngineOutcome::Infeasible => {
            warn!("engine proved the instance infeasible in {:.2}s", solve_time);
            return Err(PlanError::Infeasible);
        }
        EngineOutcome::Solved(solution) => solution,
    };
    info!(
        "engine finished with {:?} in {:.2}s (obj={:.3}, bound={:.3})",
        solution.status, solve_time, solution.objective, solution.bound
    );
    if solution.status == PlanStatus::TimeLimit {
        warn!("time limit reached, returning the best plan found");
    }

    let plan = {
        #[cfg(feature = "prof")]
        let _p = hprof::enter("decode");
        let assignment = formulation.assignment(&solution.values)?;
        trace!(
            "largest integrality residual {:e}",
            assignment.max_integrality_residual()
        );
        decode(problem, &assignment)?.into_plan(solution.status, solution.objective, solution.bound)
    };

    info!(
        "{} trucks, {} UAV-served nodes",
        plan.num_trucks(),
        plan.uav_sorties.len()
    );
    for (i, route) in plan.routes.iter().enumerate() {
        debug!("  truck {}: {:?}", i, route);
    }
    for (node, sortie) in plan.uav_sorties.iter() {
        debug!("  uav {} <- {} -> {}", node, sortie.launch, sortie.recover);
    }
    Ok(plan)
}

/// Plans with a fresh HiGHS instance.
#[cfg(feature = "highs")]
pub fn solve_highs(problem: &Problem, params: &SolverParams) -> Result<Plan, PlanError> {
    let mut engine = extsolvers::LpEngine::<extsolvers::highs::HighsSolverInstance>::new();
    plan(problem, params, &mut engine)
}
