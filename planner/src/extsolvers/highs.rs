use std::ffi::{c_void, CStr, CString};
use std::fmt::{Debug, Formatter};
use std::os::raw::c_int;
use std::path::Path;

use dronevrp_structs::plan::PlanStatus;
use highs_sys::*;

use super::{EngineOutcome, EngineSolution, LPSolver, SolverError};

pub struct HighsSolverInstance {
    ptr: *mut c_void,
}

impl Drop for HighsSolverInstance {
    fn drop(&mut self) {
        unsafe {
            highs_sys::Highs_destroy(self.ptr);
        }
    }
}

fn check(call: &'static str, retval: HighsInt) -> Result<(), SolverError> {
    match HighsStatus::try_from(retval) {
        Ok(HighsStatus::OK) | Ok(HighsStatus::Warning) => Ok(()),
        _ => Err(SolverError::Status {
            call,
            code: retval.into(),
        }),
    }
}

impl HighsSolverInstance {
    fn set_double_option(&mut self, name: &CStr, value: f64) -> Result<(), SolverError> {
        check("Highs_setDoubleOptionValue", unsafe {
            highs_sys::Highs_setDoubleOptionValue(self.ptr, name.as_ptr(), value)
        })
    }

    fn double_info(&self, name: &CStr) -> Result<f64, SolverError> {
        let mut value = 0.0f64;
        check("Highs_getDoubleInfoValue", unsafe {
            highs_sys::Highs_getDoubleInfoValue(self.ptr, name.as_ptr(), &mut value)
        })?;
        Ok(value)
    }

    /// Whether the last run left a feasible primal solution.
    fn has_incumbent(&self) -> Result<bool, SolverError> {
        let mut primal_solution_status: HighsInt = 0;
        check("Highs_getIntInfoValue", unsafe {
            highs_sys::Highs_getIntInfoValue(
                self.ptr,
                c"primal_solution_status".as_ptr(),
                &mut primal_solution_status,
            )
        })?;
        Ok(primal_solution_status == highs_sys::kHighsSolutionStatusFeasible)
    }

    fn solution(&self) -> Result<Vec<f64>, SolverError> {
        let mut values = vec![0.0; self.num_vars()];
        let null = std::ptr::null_mut();
        check("Highs_getSolution", unsafe {
            highs_sys::Highs_getSolution(self.ptr, values.as_mut_ptr(), null, null, null)
        })?;
        Ok(values)
    }
}

impl LPSolver for HighsSolverInstance {
    type Var = HighsInt;

    fn new() -> Result<Self, SolverError> {
        let instance = Self {
            ptr: unsafe { highs_sys::Highs_create() },
        };
        check("Highs_setBoolOptionValue", unsafe {
            highs_sys::Highs_setBoolOptionValue(instance.ptr, c"output_flag".as_ptr(), 0)
        })?;
        check("Highs_setStringOptionValue", unsafe {
            highs_sys::Highs_setStringOptionValue(
                instance.ptr,
                c"presolve".as_ptr(),
                c"on".as_ptr(),
            )
        })?;
        Ok(instance)
    }

    fn add_var(&mut self, cost: f64) -> Result<Self::Var, SolverError> {
        let col = unsafe { highs_sys::Highs_getNumCol(self.ptr) };
        let inf = self.inf();
        check("Highs_addCol", unsafe {
            highs_sys::Highs_addCol(
                self.ptr,
                cost,
                -inf,
                inf,
                0,
                std::ptr::null(),
                std::ptr::null(),
            )
        })?;
        Ok(col)
    }

    fn set_binary(&mut self, var: Self::Var) -> Result<(), SolverError> {
        self.set_bounds(var, 0.0, 1.0)?;
        check("Highs_changeColIntegrality", unsafe {
            highs_sys::Highs_changeColIntegrality(self.ptr, var, highs_sys::kHighsVarTypeInteger)
        })
    }

    fn set_bounds(&mut self, var: Self::Var, lower: f64, upper: f64) -> Result<(), SolverError> {
        check("Highs_changeColBounds", unsafe {
            highs_sys::Highs_changeColBounds(self.ptr, var, lower, upper)
        })
    }

    fn add_constraint(
        &mut self,
        lb: f64,
        ub: f64,
        idxs: &[Self::Var],
        coeffs: &[f64],
    ) -> Result<(), SolverError> {
        assert!(idxs.len() == coeffs.len());
        check("Highs_addRow", unsafe {
            highs_sys::Highs_addRow(
                self.ptr,
                lb,
                ub,
                idxs.len() as HighsInt,
                idxs.as_ptr(),
                coeffs.as_ptr(),
            )
        })
    }

    fn set_time_limit(&mut self, seconds: f64) -> Result<(), SolverError> {
        self.set_double_option(c"time_limit", seconds)
    }

    fn set_mip_gap(&mut self, gap: f64) -> Result<(), SolverError> {
        self.set_double_option(c"mip_rel_gap", gap)
    }

    fn optimize(&mut self) -> Result<EngineOutcome, SolverError> {
        #[cfg(feature = "prof")]
        let _p = hprof::enter("highs run");

        check("Highs_run", unsafe { highs_sys::Highs_run(self.ptr) })?;
        let model_status = HighsModelStatus::try_from(unsafe {
            highs_sys::Highs_getModelStatus(self.ptr)
        })
        .map_err(|e| SolverError::UnexpectedStatus(format!("{:?}", e)))?;

        let has_incumbent = self.has_incumbent()?;

        let status = match model_status {
            HighsModelStatus::Infeasible | HighsModelStatus::UnboundedOrInfeasible => {
                return Ok(EngineOutcome::Infeasible)
            }
            HighsModelStatus::Optimal => PlanStatus::Optimal,
            HighsModelStatus::ReachedTimeLimit | HighsModelStatus::ReachedIterationLimit
                if has_incumbent =>
            {
                PlanStatus::TimeLimit
            }
            HighsModelStatus::ReachedTimeLimit | HighsModelStatus::ReachedIterationLimit => {
                return Err(SolverError::NoIncumbent)
            }
            other => return Err(SolverError::UnexpectedStatus(format!("{:?}", other))),
        };

        Ok(EngineOutcome::Solved(EngineSolution {
            status,
            objective: self.double_info(c"objective_function_value")?,
            bound: self.double_info(c"mip_dual_bound")?,
            values: self.solution()?,
        }))
    }

    fn write_model(&mut self, path: &Path) -> Result<(), SolverError> {
        let name = path.to_string_lossy().into_owned();
        let filename = CString::new(name.clone()).map_err(|_| SolverError::FileName(name))?;
        check("Highs_writeModel", unsafe {
            highs_sys::Highs_writeModel(self.ptr, filename.as_ptr())
        })
    }

    fn inf(&self) -> f64 {
        unsafe { highs_sys::Highs_getInfinity(self.ptr) }
    }

    fn num_vars(&self) -> usize {
        unsafe { highs_sys::Highs_getNumCol(self.ptr) as usize }
    }
}

/// Model status after `Highs_run`.
#[derive(Clone, Copy, Debug, PartialOrd, PartialEq, Ord, Eq)]
pub enum HighsModelStatus {
    NotSet = MODEL_STATUS_NOTSET as isize,
    LoadError = MODEL_STATUS_LOAD_ERROR as isize,
    ModelError = MODEL_STATUS_MODEL_ERROR as isize,
    PresolveError = MODEL_STATUS_PRESOLVE_ERROR as isize,
    SolveError = MODEL_STATUS_SOLVE_ERROR as isize,
    PostsolveError = MODEL_STATUS_POSTSOLVE_ERROR as isize,
    ModelEmpty = MODEL_STATUS_MODEL_EMPTY as isize,
    Infeasible = MODEL_STATUS_INFEASIBLE as isize,
    UnboundedOrInfeasible = MODEL_STATUS_UNBOUNDED_OR_INFEASIBLE as isize,
    Unbounded = MODEL_STATUS_UNBOUNDED as isize,
    Optimal = MODEL_STATUS_OPTIMAL as isize,
    ObjectiveBound = MODEL_STATUS_OBJECTIVE_BOUND as isize,
    ObjectiveTarget = MODEL_STATUS_OBJECTIVE_TARGET as isize,
    ReachedTimeLimit = MODEL_STATUS_REACHED_TIME_LIMIT as isize,
    ReachedIterationLimit = MODEL_STATUS_REACHED_ITERATION_LIMIT as isize,
    Unknown = MODEL_STATUS_UNKNOWN as isize,
}

/// A status code outside the values the bindings know about.
#[derive(PartialEq, Clone, Copy)]
pub struct InvalidStatus(pub c_int);

impl Debug for InvalidStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} is not a known HiGHS status", self.0)
    }
}

impl TryFrom<c_int> for HighsModelStatus {
    type Error = InvalidStatus;

    fn try_from(value: c_int) -> Result<Self, Self::Error> {
        match value {
            MODEL_STATUS_NOTSET => Ok(Self::NotSet),
            MODEL_STATUS_LOAD_ERROR => Ok(Self::LoadError),
            MODEL_STATUS_MODEL_ERROR => Ok(Self::ModelError),
            MODEL_STATUS_PRESOLVE_ERROR => Ok(Self::PresolveError),
            MODEL_STATUS_SOLVE_ERROR => Ok(Self::SolveError),
            MODEL_STATUS_POSTSOLVE_ERROR => Ok(Self::PostsolveError),
            MODEL_STATUS_MODEL_EMPTY => Ok(Self::ModelEmpty),
            MODEL_STATUS_INFEASIBLE => Ok(Self::Infeasible),
            MODEL_STATUS_UNBOUNDED => Ok(Self::Unbounded),
            MODEL_STATUS_UNBOUNDED_OR_INFEASIBLE => Ok(Self::UnboundedOrInfeasible),
            MODEL_STATUS_OPTIMAL => Ok(Self::Optimal),
            MODEL_STATUS_OBJECTIVE_BOUND => Ok(Self::ObjectiveBound),
            MODEL_STATUS_OBJECTIVE_TARGET => Ok(Self::ObjectiveTarget),
            MODEL_STATUS_REACHED_TIME_LIMIT => Ok(Self::ReachedTimeLimit),
            MODEL_STATUS_REACHED_ITERATION_LIMIT => Ok(Self::ReachedIterationLimit),
            MODEL_STATUS_UNKNOWN => Ok(Self::Unknown),
            n => Err(InvalidStatus(n)),
        }
    }
}

/// Return status of a HiGHS call.
#[derive(Clone, Copy, Debug, PartialOrd, PartialEq, Ord, Eq)]
pub enum HighsStatus {
    OK = 0,
    Warning = 1,
    Error = 2,
}

impl TryFrom<c_int> for HighsStatus {
    type Error = InvalidStatus;

    fn try_from(value: c_int) -> Result<Self, InvalidStatus> {
        match value {
            STATUS_OK => Ok(Self::OK),
            STATUS_WARNING => Ok(Self::Warning),
            STATUS_ERROR => Ok(Self::Error),
            n => Err(InvalidStatus(n)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // pick at most one of two binaries, each worth 1
    fn choice(limit: f64) -> HighsSolverInstance {
        let mut lp = HighsSolverInstance::new().unwrap();
        let a = lp.add_var(-1.0).unwrap();
        let b = lp.add_var(-1.0).unwrap();
        lp.set_binary(a).unwrap();
        lp.set_binary(b).unwrap();
        let inf = lp.inf();
        lp.add_constraint(-inf, 1.0, &[a, b], &[1.0, 1.0]).unwrap();
        lp.add_constraint(limit, inf, &[a, b], &[1.0, 1.0]).unwrap();
        lp
    }

    #[test]
    fn solved_model_has_incumbent() {
        let mut lp = choice(0.0);
        let EngineOutcome::Solved(solution) = lp.optimize().unwrap() else {
            panic!("expected a solution");
        };
        assert!(lp.has_incumbent().unwrap());
        assert_eq!(solution.status, PlanStatus::Optimal);
        assert!((solution.objective + 1.0).abs() < 1e-6);
        assert_eq!(solution.values.len(), 2);
    }

    #[test]
    fn infeasible_model_has_no_incumbent() {
        let mut lp = choice(2.0);
        assert!(matches!(lp.optimize().unwrap(), EngineOutcome::Infeasible));
        assert!(!lp.has_incumbent().unwrap());
    }
}
