use dronevrp_structs::{plan::PlanStatus, problem::SolverParams};

use super::{EngineOutcome, EngineSolution, MipEngine, SolverError};
use crate::milp::Model;

enum Canned {
    Infeasible,
    NoIncumbent,
    Values(PlanStatus, Vec<f64>),
}

/// Answers every solve with the same stored outcome. Objective and bound
/// are evaluated against the model it is handed.
pub struct CannedEngine {
    canned: Canned,
    pub calls: usize,
}

impl CannedEngine {
    pub fn infeasible() -> Self {
        Self {
            canned: Canned::Infeasible,
            calls: 0,
        }
    }

    pub fn no_incumbent() -> Self {
        Self {
            canned: Canned::NoIncumbent,
            calls: 0,
        }
    }

    pub fn solved(status: PlanStatus, values: Vec<f64>) -> Self {
        Self {
            canned: Canned::Values(status, values),
            calls: 0,
        }
    }
}

impl MipEngine for CannedEngine {
    fn solve(
        &mut self,
        model: &Model,
        _params: &SolverParams,
    ) -> Result<EngineOutcome, SolverError> {
        self.calls += 1;
        match &self.canned {
            Canned::Infeasible => Ok(EngineOutcome::Infeasible),
            Canned::NoIncumbent => Err(SolverError::NoIncumbent),
            Canned::Values(status, values) => {
                let objective = model.objective_value(values);
                Ok(EngineOutcome::Solved(EngineSolution {
                    status: *status,
                    objective,
                    bound: objective,
                    values: values.clone(),
                }))
            }
        }
    }
}
