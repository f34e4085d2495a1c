//! Solver interfaces used to optimize a [`Problem`]
use thiserror::Error;

use crate::configuration::SolverBackend;
use crate::optimize::problem::{Problem, ProblemType};
use crate::optimize::ProblemSolution;

#[cfg(feature = "highs")]
pub mod highs;
#[cfg(feature = "microlp")]
pub mod microlp;
#[cfg(feature = "scip")]
pub mod scip;

/// A backend able to solve an optimization [`Problem`]
pub trait Solver {
    /// Whether the solver can handle integer and binary variables
    fn integer_variable_capable(&self) -> bool;

    /// Solve the problem
    ///
    /// Infeasible or unbounded problems are not errors, they are reported via the
    /// status of the returned [`ProblemSolution`].
    fn solve(&self, problem: &Problem) -> Result<ProblemSolution, SolverError>;
}

/// Create the solver for a backend
///
/// Returns [`SolverError::BackendUnavailable`] if support for the backend was not
/// compiled in (see the crate features).
pub fn backend_solver(backend: SolverBackend) -> Result<Box<dyn Solver>, SolverError> {
    match backend {
        SolverBackend::Microlp => microlp_solver(),
        SolverBackend::Highs => highs_solver(),
        SolverBackend::Scip => scip_solver(),
    }
}

cfg_if::cfg_if! {
    if #[cfg(feature = "microlp")] {
        fn microlp_solver() -> Result<Box<dyn Solver>, SolverError> {
            Ok(Box::new(self::microlp::MicrolpSolver::default()))
        }
    } else {
        fn microlp_solver() -> Result<Box<dyn Solver>, SolverError> {
            Err(SolverError::BackendUnavailable(SolverBackend::Microlp))
        }
    }
}

cfg_if::cfg_if! {
    if #[cfg(feature = "highs")] {
        fn highs_solver() -> Result<Box<dyn Solver>, SolverError> {
            Ok(Box::new(self::highs::HighsSolver::default()))
        }
    } else {
        fn highs_solver() -> Result<Box<dyn Solver>, SolverError> {
            Err(SolverError::BackendUnavailable(SolverBackend::Highs))
        }
    }
}

cfg_if::cfg_if! {
    if #[cfg(feature = "scip")] {
        fn scip_solver() -> Result<Box<dyn Solver>, SolverError> {
            Ok(Box::new(self::scip::ScipSolver::default()))
        }
    } else {
        fn scip_solver() -> Result<Box<dyn Solver>, SolverError> {
            Err(SolverError::BackendUnavailable(SolverBackend::Scip))
        }
    }
}

/// Errors raised while handing a problem to a solver
#[derive(Error, Debug)]
pub enum SolverError {
    /// The backend was not compiled in
    #[error("Solver backend {0} is not available, enable the corresponding crate feature")]
    BackendUnavailable(SolverBackend),
    /// The solver can't handle this type of problem
    #[error("Solver can't handle problems of type {0:?}")]
    UnsupportedProblem(ProblemType),
    /// The backend failed in a way that isn't a solution status
    #[error("Solver backend failed: {0}")]
    Backend(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(feature = "microlp")]
    #[test]
    fn microlp_is_available() {
        let solver = backend_solver(SolverBackend::Microlp).unwrap();
        assert!(solver.integer_variable_capable());
    }

    #[cfg(not(feature = "highs"))]
    #[test]
    fn missing_backend() {
        assert!(matches!(
            backend_solver(SolverBackend::Highs),
            Err(SolverError::BackendUnavailable(SolverBackend::Highs))
        ));
    }
}
