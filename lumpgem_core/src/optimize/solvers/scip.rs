//! Implements a solver interface for SCIP, through Russcip
use indexmap::IndexMap;
use russcip::model::{Model, ObjSense};
use russcip::status::Status;
use russcip::variable::VarType;

use crate::optimize::objective::ObjectiveSense;
use crate::optimize::problem::Problem;
use crate::optimize::solvers::{Solver, SolverError};
use crate::optimize::variable::VariableType;
use crate::optimize::{OptimizationStatus, ProblemSolution};

/// Solver backed by SCIP, which supports continuous, integer and binary variables
#[derive(Clone, Debug, Default)]
pub struct ScipSolver {}

impl Solver for ScipSolver {
    fn integer_variable_capable(&self) -> bool {
        true
    }

    fn solve(&self, problem: &Problem) -> Result<ProblemSolution, SolverError> {
        let sense = match problem.objective().sense() {
            ObjectiveSense::Maximize => ObjSense::Maximize,
            ObjectiveSense::Minimize => ObjSense::Minimize,
        };
        let mut model = Model::new()
            .hide_output()
            .include_default_plugins()
            .create_prob("lumpgem")
            .set_obj_sense(sense);

        let objective_coefficients = problem.objective().coefficients();
        let mut columns = IndexMap::with_capacity(problem.num_variables());
        for (id, var) in problem.variables() {
            let coefficient = objective_coefficients.get(id).copied().unwrap_or(0.0);
            let var_type = match var.variable_type {
                VariableType::Continuous => VarType::Continuous,
                VariableType::Integer => VarType::Integer,
                VariableType::Binary => VarType::Binary,
            };
            let column = model.add_var(var.lower_bound, var.upper_bound, coefficient, id, var_type);
            columns.insert(id.clone(), column);
        }

        for constraint in problem.constraints().values() {
            let mut vars = Vec::with_capacity(constraint.terms().len());
            let mut coefs = Vec::with_capacity(constraint.terms().len());
            for term in constraint.terms() {
                let column = columns.get(&term.variable).ok_or_else(|| {
                    SolverError::Backend(format!(
                        "constraint {} references unknown variable {}",
                        constraint.get_id(),
                        term.variable
                    ))
                })?;
                vars.push(column.clone());
                coefs.push(term.coefficient);
            }
            let (lower, upper) = constraint.bounds();
            model.add_cons(vars, &coefs, lower, upper, constraint.get_id());
        }

        let solved = model.solve();
        let status = match solved.status() {
            Status::Optimal => OptimizationStatus::Optimal,
            Status::Infeasible => OptimizationStatus::Infeasible,
            Status::Unbounded | Status::Inforunbd => OptimizationStatus::Unbounded,
            Status::TimeLimit | Status::NodeLimit | Status::GapLimit => {
                OptimizationStatus::SolverHalted
            }
            other => {
                log::warn!("SCIP finished with status {:?}", other);
                OptimizationStatus::NumericalError
            }
        };
        if status != OptimizationStatus::Optimal {
            return Ok(ProblemSolution::without_values(status));
        }
        let best = solved.best_sol().ok_or_else(|| {
            SolverError::Backend("SCIP reported optimal without a solution".into())
        })?;
        let variable_values = columns
            .iter()
            .map(|(id, column)| (id.clone(), best.val(column.clone())))
            .collect::<IndexMap<_, _>>();
        Ok(ProblemSolution {
            status,
            objective_value: None,
            variable_values: Some(variable_values),
        })
    }
}
