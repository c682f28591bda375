use std::cell::RefCell;
use std::path::Path;

use dronevrp_structs::plan::PlanStatus;
use grb::{expr::LinExpr, prelude::*};

use super::{EngineOutcome, EngineSolution, LPSolver, SolverError};

thread_local! {
static GLOBAL_GUROBI_ENV :RefCell<Option<grb::Env>> = const { RefCell::new(None) };
}

pub struct GurobiSolver {
    grb: grb::Model,
    added_vars: Vec<grb::Var>,
}

impl LPSolver for GurobiSolver {
    type Var = grb::Var;

    fn new() -> Result<Self, SolverError> {
        let mut grb = GLOBAL_GUROBI_ENV.with_borrow_mut(|slot| -> grb::Result<grb::Model> {
            let env = match slot.take() {
                Some(env) => env,
                None => grb::Env::new("")?,
            };
            let env = slot.insert(env);
            grb::Model::with_env("", &*env)
        })?;
        grb.set_param(param::OutputFlag, 0)?;
        Ok(Self {
            grb,
            added_vars: Vec::new(),
        })
    }

    fn add_var(&mut self, cost: f64) -> Result<Self::Var, SolverError> {
        let model = &mut self.grb;
        let var = add_ctsvar!(model, obj: cost, bounds: ..)?;
        self.added_vars.push(var);
        Ok(var)
    }

    fn set_binary(&mut self, var: Self::Var) -> Result<(), SolverError> {
        self.grb.set_obj_attr(attr::VType, &var, VarType::Binary)?;
        Ok(())
    }

    fn set_bounds(&mut self, var: Self::Var, lower: f64, upper: f64) -> Result<(), SolverError> {
        self.grb.update()?;
        self.grb.set_obj_attr(attr::LB, &var, lower)?;
        self.grb.set_obj_attr(attr::UB, &var, upper)?;
        Ok(())
    }

    fn add_constraint(
        &mut self,
        lb: f64,
        ub: f64,
        idxs: &[Self::Var],
        coeffs: &[f64],
    ) -> Result<(), SolverError> {
        let mut expr = LinExpr::new();
        for (v, c) in idxs.iter().zip(coeffs.iter()) {
            expr.add_term(*c, *v);
        }
        if lb == ub {
            self.grb.add_constr("", c!(expr == lb))?;
            return Ok(());
        }
        // Ranged rows become a pair of one-sided rows.
        if lb > -self.inf() {
            let lower = expr.clone();
            self.grb.add_constr("", c!(lower >= lb))?;
        }
        if ub < self.inf() {
            self.grb.add_constr("", c!(expr <= ub))?;
        }
        Ok(())
    }

    fn set_time_limit(&mut self, seconds: f64) -> Result<(), SolverError> {
        self.grb.set_param(param::TimeLimit, seconds)?;
        Ok(())
    }

    fn set_mip_gap(&mut self, gap: f64) -> Result<(), SolverError> {
        self.grb.set_param(param::MIPGap, gap)?;
        Ok(())
    }

    fn optimize(&mut self) -> Result<EngineOutcome, SolverError> {
        #[cfg(feature = "prof")]
        let _p = hprof::enter("gurobi optimize");

        self.grb.optimize()?;
        let status = match self.grb.status()? {
            Status::Infeasible | Status::InfOrUnbd => return Ok(EngineOutcome::Infeasible),
            Status::Optimal => PlanStatus::Optimal,
            Status::TimeLimit
            | Status::IterationLimit
            | Status::NodeLimit
            | Status::SolutionLimit
            | Status::Interrupted => {
                if self.grb.get_attr(attr::SolCount)? == 0 {
                    return Err(SolverError::NoIncumbent);
                }
                PlanStatus::TimeLimit
            }
            other => return Err(SolverError::UnexpectedStatus(format!("{:?}", other))),
        };

        let objective = self.grb.get_attr(attr::ObjVal)?;
        let bound = self.grb.get_attr(attr::ObjBound)?;
        let values = self
            .grb
            .get_obj_attr_batch(attr::X, self.added_vars.iter().cloned())?;
        Ok(EngineOutcome::Solved(EngineSolution {
            status,
            objective,
            bound,
            values,
        }))
    }

    fn write_model(&mut self, path: &Path) -> Result<(), SolverError> {
        let filename = path
            .to_str()
            .ok_or_else(|| SolverError::FileName(path.to_string_lossy().into_owned()))?;
        self.grb.write(filename)?;
        Ok(())
    }

    fn inf(&self) -> f64 {
        f64::INFINITY
    }

    fn num_vars(&self) -> usize {
        self.added_vars.len()
    }
}
