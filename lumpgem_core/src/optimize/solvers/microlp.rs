//! Solver interface for the pure Rust microlp MILP solver
use ::microlp::{ComparisonOp, LinearExpr, OptimizationDirection};
use indexmap::IndexMap;

use crate::optimize::objective::ObjectiveSense;
use crate::optimize::problem::Problem;
use crate::optimize::solvers::{Solver, SolverError};
use crate::optimize::variable::VariableType;
use crate::optimize::{OptimizationStatus, ProblemSolution};

/// Solver backed by microlp, which supports continuous, integer and binary variables
#[derive(Clone, Debug, Default)]
pub struct MicrolpSolver {}

impl Solver for MicrolpSolver {
    fn integer_variable_capable(&self) -> bool {
        true
    }

    fn solve(&self, problem: &Problem) -> Result<ProblemSolution, SolverError> {
        let direction = match problem.objective().sense() {
            ObjectiveSense::Maximize => OptimizationDirection::Maximize,
            ObjectiveSense::Minimize => OptimizationDirection::Minimize,
        };
        let mut lp = ::microlp::Problem::new(direction);
        let objective_coefficients = problem.objective().coefficients();

        // microlp takes objective coefficients when the variable is created
        let mut columns = IndexMap::with_capacity(problem.num_variables());
        for (id, var) in problem.variables() {
            let coefficient = objective_coefficients.get(id).copied().unwrap_or(0.0);
            let column = match var.variable_type {
                VariableType::Continuous => {
                    lp.add_var(coefficient, (var.lower_bound, var.upper_bound))
                }
                VariableType::Integer => lp.add_integer_var(
                    coefficient,
                    (
                        integer_bound(id, var.lower_bound)?,
                        integer_bound(id, var.upper_bound)?,
                    ),
                ),
                VariableType::Binary => lp.add_integer_var(coefficient, (0, 1)),
            };
            columns.insert(id.clone(), column);
        }

        for constraint in problem.constraints().values() {
            let mut expr = LinearExpr::empty();
            for term in constraint.terms() {
                let column = columns.get(&term.variable).ok_or_else(|| {
                    SolverError::Backend(format!(
                        "constraint {} references unknown variable {}",
                        constraint.get_id(),
                        term.variable
                    ))
                })?;
                expr.add(*column, term.coefficient);
            }
            let (lower, upper) = constraint.bounds();
            if lower == upper {
                lp.add_constraint(expr, ComparisonOp::Eq, lower);
                continue;
            }
            if lower.is_finite() && upper.is_finite() {
                lp.add_constraint(expr.clone(), ComparisonOp::Ge, lower);
                lp.add_constraint(expr, ComparisonOp::Le, upper);
            } else if lower.is_finite() {
                lp.add_constraint(expr, ComparisonOp::Ge, lower);
            } else if upper.is_finite() {
                lp.add_constraint(expr, ComparisonOp::Le, upper);
            }
        }

        match lp.solve() {
            Ok(solution) => {
                let variable_values = columns
                    .iter()
                    .map(|(id, column)| (id.clone(), solution[*column]))
                    .collect::<IndexMap<_, _>>();
                Ok(ProblemSolution {
                    status: OptimizationStatus::Optimal,
                    objective_value: Some(solution.objective()),
                    variable_values: Some(variable_values),
                })
            }
            Err(::microlp::Error::Infeasible) => Ok(ProblemSolution::without_values(
                OptimizationStatus::Infeasible,
            )),
            Err(::microlp::Error::Unbounded) => Ok(ProblemSolution::without_values(
                OptimizationStatus::Unbounded,
            )),
            #[allow(unreachable_patterns)]
            Err(e) => {
                log::warn!("microlp failed to solve the problem: {}", e);
                Ok(ProblemSolution::without_values(
                    OptimizationStatus::NumericalError,
                ))
            }
        }
    }
}

/// Convert a bound of an integer variable into the i32 microlp expects
fn integer_bound(id: &str, bound: f64) -> Result<i32, SolverError> {
    if bound.is_infinite() {
        return Ok(if bound > 0.0 { i32::MAX } else { i32::MIN });
    }
    if bound.fract() != 0.0 || bound.abs() > i32::MAX as f64 {
        return Err(SolverError::Backend(format!(
            "integer variable {} has non integral bound {}",
            id, bound
        )));
    }
    Ok(bound as i32)
}
