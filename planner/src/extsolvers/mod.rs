use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use dronevrp_structs::{plan::PlanStatus, problem::SolverParams};
use thiserror::Error;

use crate::milp::Model;

pub mod canned;
#[cfg(feature = "gurobi")]
pub mod gurobi;
#[cfg(feature = "highs")]
pub mod highs;

#[derive(Debug, Error)]
pub enum SolverError {
    #[error("{call} returned status {code}")]
    Status { call: &'static str, code: i64 },
    #[error("engine stopped with status {0}")]
    UnexpectedStatus(String),
    #[error("engine stopped before finding a feasible assignment")]
    NoIncumbent,
    #[error("cannot hand file name {0:?} to the engine")]
    FileName(String),
    #[cfg(feature = "gurobi")]
    #[error("gurobi: {0}")]
    Gurobi(#[from] grb::Error),
}

#[derive(Debug, Clone)]
pub struct EngineSolution {
    pub status: PlanStatus,
    pub objective: f64,
    pub bound: f64,
    /// One value per model variable, in declaration order.
    pub values: Vec<f64>,
}

#[derive(Debug, Clone)]
pub enum EngineOutcome {
    Infeasible,
    Solved(EngineSolution),
}

/// Low-level MIP backend. Variables are added one at a time and rows refer
/// to them by the backend's own handle.
pub trait LPSolver: Sized {
    type Var: Copy + Clone;
    fn new() -> Result<Self, SolverError>;
    fn add_var(&mut self, cost: f64) -> Result<Self::Var, SolverError>;
    fn set_binary(&mut self, var: Self::Var) -> Result<(), SolverError>;
    fn set_bounds(&mut self, var: Self::Var, lower: f64, upper: f64) -> Result<(), SolverError>;
    fn add_constraint(
        &mut self,
        lb: f64,
        ub: f64,
        idxs: &[Self::Var],
        coeffs: &[f64],
    ) -> Result<(), SolverError>;
    fn set_time_limit(&mut self, seconds: f64) -> Result<(), SolverError>;
    fn set_mip_gap(&mut self, gap: f64) -> Result<(), SolverError>;
    fn optimize(&mut self) -> Result<EngineOutcome, SolverError>;
    fn write_model(&mut self, path: &Path) -> Result<(), SolverError>;
    fn inf(&self) -> f64;
    fn num_vars(&self) -> usize;
}

/// Solves a declarative [`Model`] under a time limit and relative gap.
pub trait MipEngine {
    fn solve(&mut self, model: &Model, params: &SolverParams)
        -> Result<EngineOutcome, SolverError>;
}

/// Copies a [`Model`] into a fresh `LP` instance for every solve.
pub struct LpEngine<LP> {
    dump_model: Option<PathBuf>,
    _solver: PhantomData<LP>,
}

impl<LP: LPSolver> Default for LpEngine<LP> {
    fn default() -> Self {
        Self::new()
    }
}

impl<LP: LPSolver> LpEngine<LP> {
    pub fn new() -> Self {
        Self {
            dump_model: None,
            _solver: PhantomData,
        }
    }

    /// Write the backend's copy of each model to `path` before solving.
    pub fn with_model_dump(path: impl Into<PathBuf>) -> Self {
        Self {
            dump_model: Some(path.into()),
            _solver: PhantomData,
        }
    }
}

impl<LP: LPSolver> MipEngine for LpEngine<LP> {
    fn solve(
        &mut self,
        model: &Model,
        params: &SolverParams,
    ) -> Result<EngineOutcome, SolverError> {
        let mut lp = LP::new()?;
        lp.set_time_limit(params.time_limit_seconds)?;
        lp.set_mip_gap(params.optimality_gap)?;

        let inf = lp.inf();
        let mut vars = Vec::with_capacity(model.num_vars());
        for def in model.vars.iter() {
            let var = lp.add_var(def.cost)?;
            lp.set_bounds(var, def.lb.clamp(-inf, inf), def.ub.clamp(-inf, inf))?;
            if def.binary {
                lp.set_binary(var)?;
            }
            vars.push(var);
        }

        let mut idxs = Vec::new();
        for row in model.rows.iter() {
            idxs.clear();
            idxs.extend(row.idxs.iter().map(|v| vars[v.idx()]));
            lp.add_constraint(
                row.lb.clamp(-inf, inf),
                row.ub.clamp(-inf, inf),
                &idxs,
                &row.coeffs,
            )?;
        }
        debug_assert_eq!(lp.num_vars(), model.num_vars());

        if let Some(path) = self.dump_model.as_ref() {
            lp.write_model(path)?;
        }

        lp.optimize()
    }
}
