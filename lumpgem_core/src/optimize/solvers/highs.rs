//! Solver interface for the HiGHS solver
use ::highs::{HighsModelStatus, RowProblem, Sense};
use indexmap::IndexMap;

use crate::optimize::objective::ObjectiveSense;
use crate::optimize::problem::Problem;
use crate::optimize::solvers::{Solver, SolverError};
use crate::optimize::variable::VariableType;
use crate::optimize::{OptimizationStatus, ProblemSolution};

/// Solver backed by HiGHS, which supports continuous, integer and binary variables
#[derive(Clone, Debug, Default)]
pub struct HighsSolver {}

impl Solver for HighsSolver {
    fn integer_variable_capable(&self) -> bool {
        true
    }

    fn solve(&self, problem: &Problem) -> Result<ProblemSolution, SolverError> {
        let objective_coefficients = problem.objective().coefficients();
        let mut pb = RowProblem::default();
        let mut columns = IndexMap::with_capacity(problem.num_variables());
        for (id, var) in problem.variables() {
            let coefficient = objective_coefficients.get(id).copied().unwrap_or(0.0);
            let column = match var.variable_type {
                VariableType::Continuous => {
                    pb.add_column(coefficient, var.lower_bound..=var.upper_bound)
                }
                VariableType::Integer => {
                    pb.add_integer_column(coefficient, var.lower_bound..=var.upper_bound)
                }
                VariableType::Binary => pb.add_integer_column(coefficient, 0.0..=1.0),
            };
            columns.insert(id.clone(), column);
        }

        for constraint in problem.constraints().values() {
            let mut row = Vec::with_capacity(constraint.terms().len());
            for term in constraint.terms() {
                let column = columns.get(&term.variable).ok_or_else(|| {
                    SolverError::Backend(format!(
                        "constraint {} references unknown variable {}",
                        constraint.get_id(),
                        term.variable
                    ))
                })?;
                row.push((*column, term.coefficient));
            }
            let (lower, upper) = constraint.bounds();
            pb.add_row(lower..=upper, row);
        }

        let sense = match problem.objective().sense() {
            ObjectiveSense::Maximize => Sense::Maximise,
            ObjectiveSense::Minimize => Sense::Minimise,
        };
        let mut model = pb.optimise(sense);
        model.make_quiet();
        let solved = model.solve();

        let status = match solved.status() {
            HighsModelStatus::Optimal => OptimizationStatus::Optimal,
            HighsModelStatus::Infeasible => OptimizationStatus::Infeasible,
            HighsModelStatus::Unbounded | HighsModelStatus::UnboundedOrInfeasible => {
                OptimizationStatus::Unbounded
            }
            HighsModelStatus::ReachedTimeLimit | HighsModelStatus::ReachedIterationLimit => {
                OptimizationStatus::SolverHalted
            }
            other => {
                log::warn!("HiGHS finished with status {:?}", other);
                OptimizationStatus::NumericalError
            }
        };
        if status != OptimizationStatus::Optimal {
            return Ok(ProblemSolution::without_values(status));
        }

        let solution = solved.get_solution();
        let variable_values = columns
            .keys()
            .cloned()
            .zip(solution.columns().iter().copied())
            .collect::<IndexMap<_, _>>();
        Ok(ProblemSolution {
            status,
            objective_value: None,
            variable_values: Some(variable_values),
        })
    }
}
