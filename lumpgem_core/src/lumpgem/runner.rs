//! Running the optimization of a [`LumpGem`]
//!
//! The problem moves through the stages of [`OptimizationStage`] strictly in order:
//! `Built -> Prepared -> ThermoGated -> Converted -> Solved`. Each step checks the
//! current stage and fails with [`LumpGemError::OutOfOrder`] instead of operating on
//! a half built problem. A solved problem can't be run again. A failed conversion
//! moves the problem to [`OptimizationStage::Failed`], from which no step can run.
use crate::lumpgem::builder::LumpGem;
use crate::lumpgem::{LumpGemError, OptimizationStage};
use crate::optimize::solvers::backend_solver;
use crate::optimize::ProblemSolution;
use crate::thermo::engine::ThermoEngine;

impl<E: ThermoEngine> LumpGem<E> {
    fn require(&self, expected: OptimizationStage) -> Result<(), LumpGemError> {
        if self.stage != expected {
            return Err(LumpGemError::OutOfOrder {
                expected,
                found: self.stage,
            });
        }
        Ok(())
    }

    fn enter(&mut self, next: OptimizationStage) {
        log::debug!("{}: {} -> {}", self.tfa_model.name, self.stage, next);
        self.stage = next;
    }

    /// Let the thermodynamic engine annotate the reactions
    pub fn prepare(&mut self) -> Result<(), LumpGemError> {
        self.require(OptimizationStage::Built)?;
        self.tfa_model.prepare()?;
        self.enter(OptimizationStage::Prepared);
        Ok(())
    }

    /// Disable thermodynamic computation for every non-core reaction
    ///
    /// Core and biomass reactions keep their thermodynamic annotation unchanged.
    pub fn thermo_gate(&mut self) -> Result<(), LumpGemError> {
        self.require(OptimizationStage::Prepared)?;
        let mut gated = 0;
        for reaction_id in &self.partition.non_core {
            if self.tfa_model.set_thermo_computed(reaction_id, false)? {
                gated += 1;
            }
        }
        log::info!(
            "Disabled thermodynamic computation for {} non-core reactions",
            gated
        );
        self.enter(OptimizationStage::ThermoGated);
        Ok(())
    }

    /// Add the thermodynamic constraints of the remaining reactions to the problem
    ///
    /// An engine error is terminal, the constraints added before the failure stay
    /// in the problem.
    pub fn convert(&mut self) -> Result<(), LumpGemError> {
        self.require(OptimizationStage::ThermoGated)?;
        if let Err(e) = self.tfa_model.convert() {
            log::warn!(
                "{}: thermodynamic conversion failed: {}",
                self.tfa_model.name,
                e
            );
            self.enter(OptimizationStage::Failed);
            return Err(e.into());
        }
        self.enter(OptimizationStage::Converted);
        Ok(())
    }

    /// Solve the problem once with the configured backend
    ///
    /// Infeasible or unbounded problems are reported through the status of the
    /// returned solution.
    pub fn solve(&mut self) -> Result<ProblemSolution, LumpGemError> {
        self.require(OptimizationStage::Converted)?;
        let solver = backend_solver(self.solver)?;
        let solution = self.tfa_model.optimize(solver.as_ref())?;
        self.enter(OptimizationStage::Solved);
        if let Some(values) = &solution.variable_values {
            let violated = self.tfa_model.problem().violated_constraints(values);
            if !violated.is_empty() {
                log::warn!(
                    "{} solution violates {} constraints, first {}",
                    self.tfa_model.name,
                    violated.len(),
                    violated[0]
                );
            }
        }
        match solution.objective_value {
            Some(objective) => log::info!(
                "{} solved with {}: {} (objective {})",
                self.tfa_model.name,
                self.solver,
                solution.status,
                objective
            ),
            None => log::info!(
                "{} solved with {}: {}",
                self.tfa_model.name,
                self.solver,
                solution.status
            ),
        }
        Ok(solution)
    }

    /// Prepare, gate, convert and solve the problem
    pub fn run_optimisation(&mut self) -> Result<ProblemSolution, LumpGemError> {
        self.prepare()?;
        self.thermo_gate()?;
        self.convert()?;
        self.solve()
    }
}
