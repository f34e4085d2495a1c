//! Construction of the LumpGEM mixed integer problem
use indexmap::IndexMap;

use crate::configuration::{ConfigError, LumpGemConfig, SolverBackend};
use crate::lumpgem::partition::ReactionPartition;
use crate::lumpgem::{LumpGemError, OptimizationStage};
use crate::metabolic_model::model::Model;
use crate::optimize::problem::ProblemError;
use crate::optimize::variable::Variable;
use crate::optimize::ProblemSolution;
use crate::thermo::database::ThermoDatabase;
use crate::thermo::engine::{GibbsEnergyEngine, ThermoEngine};
use crate::thermo::model::ThermoModel;
use crate::thermo::ThermoError;

/// Binary variable switching off a non-core reaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LumpingIndicator {
    /// Id of the non-core reaction
    pub reaction_id: String,
    /// Id of the binary variable in the problem
    pub variable_id: String,
    /// Id of the carbon uptake constraint the variable appears in
    pub constraint_id: String,
}

/// The LumpGEM algorithm applied to a single model
///
/// Construction partitions the reactions, builds the flux problem and adds the
/// lumping indicators, the carbon uptake and growth rate constraints and the
/// objective. The problem is then solved with [`LumpGem::run_optimisation`], or
/// step by step (see [`crate::lumpgem::runner`]).
#[derive(Debug)]
pub struct LumpGem<E: ThermoEngine> {
    pub(super) partition: ReactionPartition,
    indicators: IndexMap<String, LumpingIndicator>,
    carbon_uptake: f64,
    growth_rate: f64,
    indicator_reward: f64,
    pub(super) solver: SolverBackend,
    pub(super) tfa_model: ThermoModel<E>,
    pub(super) stage: OptimizationStage,
}

impl LumpGem<GibbsEnergyEngine> {
    /// Build a LumpGEM problem, loading the thermodynamic database named in `config`
    pub fn new(model: Model, config: &LumpGemConfig) -> Result<Self, LumpGemError> {
        config.validate()?;
        let database = ThermoDatabase::load(&config.thermo_data_path)?;
        let engine = GibbsEnergyEngine::new(database, config.thermo.clone())?;
        Self::with_engine(model, config, engine)
    }
}

impl<E: ThermoEngine> LumpGem<E> {
    /// Build a LumpGEM problem using the given thermodynamic engine
    ///
    /// `config.thermo_data_path` and `config.thermo` are not used, the engine is
    /// expected to carry its own data.
    pub fn with_engine(
        model: Model,
        config: &LumpGemConfig,
        engine: E,
    ) -> Result<Self, LumpGemError> {
        config.validate()?;
        let partition =
            ReactionPartition::new(&model, &config.biomass_rxns, &config.core_subsystems)?;
        let tfa_model = ThermoModel::new(engine, model)?;

        let mut lumpgem = LumpGem {
            partition,
            indicators: IndexMap::new(),
            carbon_uptake: config.carbon_uptake,
            growth_rate: config.growth_rate,
            indicator_reward: config.indicator_reward,
            solver: config.solver,
            tfa_model,
            stage: OptimizationStage::Built,
        };
        lumpgem.generate_lumping_indicators()?;
        lumpgem.generate_carbon_uptake_constraints()?;
        lumpgem.generate_growth_rate_constraints()?;
        lumpgem.set_objective()?;
        log::info!(
            "Built {} with {} variables and {} constraints",
            lumpgem.tfa_model.name,
            lumpgem.tfa_model.problem().num_variables(),
            lumpgem.tfa_model.problem().num_constraints()
        );
        Ok(lumpgem)
    }

    /// Forward and reverse flux variable ids of a partitioned reaction
    fn flux_variables(&self, reaction_id: &str) -> Result<(String, String), LumpGemError> {
        let lookup = || -> Result<(String, String), ThermoError> {
            Ok((
                self.tfa_model.forward_variable_id(reaction_id)?,
                self.tfa_model.reverse_variable_id(reaction_id)?,
            ))
        };
        lookup().map_err(|e| match e {
            ThermoError::ReactionNotFound(id) => LumpGemError::ModelConsistency(format!(
                "reaction {} is partitioned but has no flux variables",
                id
            )),
            other => other.into(),
        })
    }

    /// Add one binary indicator for every non-core reaction
    fn generate_lumping_indicators(&mut self) -> Result<(), LumpGemError> {
        for reaction_id in &self.partition.non_core {
            let indicator = LumpingIndicator {
                reaction_id: reaction_id.clone(),
                variable_id: format!("LUMP_{}", reaction_id),
                constraint_id: format!("CU_{}", reaction_id),
            };
            self.tfa_model
                .problem_mut()
                .add_variable(Variable::new_binary(&indicator.variable_id))?;
            self.indicators.insert(reaction_id.clone(), indicator);
        }
        log::debug!("Generated {} lumping indicators", self.indicators.len());
        Ok(())
    }

    /// Cap the flux of every non-core reaction at the carbon uptake, or at 0 if its
    /// indicator is set: forward + reverse + C * indicator <= C
    fn generate_carbon_uptake_constraints(&mut self) -> Result<(), LumpGemError> {
        for indicator in self.indicators.values() {
            let (forward, reverse) = self.flux_variables(&indicator.reaction_id)?;
            self.tfa_model.problem_mut().add_new_inequality_constraint(
                &indicator.constraint_id,
                &[&forward, &reverse, &indicator.variable_id],
                &[1.0, 1.0, self.carbon_uptake],
                f64::NEG_INFINITY,
                self.carbon_uptake,
            )?;
        }
        Ok(())
    }

    /// Force every biomass reaction to carry at least the growth rate
    fn generate_growth_rate_constraints(&mut self) -> Result<(), LumpGemError> {
        for reaction_id in &self.partition.biomass {
            self.tfa_model
                .set_reaction_lower_bound(reaction_id, self.growth_rate)
                .map_err(|e| match e {
                    ThermoError::ReactionNotFound(id) => LumpGemError::ModelConsistency(
                        format!("biomass reaction {} is missing from the model", id),
                    ),
                    ThermoError::Problem(ProblemError::InvalidVariableBounds(id)) => {
                        ConfigError::Invalid(format!(
                            "growth_rate {} exceeds the upper bound of biomass reaction {}",
                            self.growth_rate, id
                        ))
                        .into()
                    }
                    other => other.into(),
                })?;
        }
        Ok(())
    }

    /// Maximize the summed net flux of the biomass reactions, plus the reward for
    /// every reaction lumped away
    fn set_objective(&mut self) -> Result<(), LumpGemError> {
        let biomass_variables = self
            .partition
            .biomass
            .iter()
            .map(|id| self.flux_variables(id))
            .collect::<Result<Vec<_>, _>>()?;
        let problem = self.tfa_model.problem_mut();
        problem.remove_all_objective_terms();
        for (forward, reverse) in biomass_variables {
            problem.add_new_linear_objective_term(&forward, 1.0)?;
            problem.add_new_linear_objective_term(&reverse, -1.0)?;
        }
        if self.indicator_reward != 0.0 {
            for indicator in self.indicators.values() {
                problem.add_new_linear_objective_term(
                    &indicator.variable_id,
                    self.indicator_reward,
                )?;
            }
        }
        Ok(())
    }

    // region Accessors
    /// Partition of the reactions
    pub fn partition(&self) -> &ReactionPartition {
        &self.partition
    }

    /// Lumping indicators, keyed by non-core reaction id
    pub fn indicators(&self) -> &IndexMap<String, LumpingIndicator> {
        &self.indicators
    }

    /// Lumping indicator of a non-core reaction
    pub fn indicator(&self, reaction_id: &str) -> Option<&LumpingIndicator> {
        self.indicators.get(reaction_id)
    }

    pub fn carbon_uptake(&self) -> f64 {
        self.carbon_uptake
    }

    pub fn growth_rate(&self) -> f64 {
        self.growth_rate
    }

    /// Solver backend used by [`LumpGem::solve`]
    pub fn solver(&self) -> SolverBackend {
        self.solver
    }

    /// The model with its flux problem
    pub fn thermo_model(&self) -> &ThermoModel<E> {
        &self.tfa_model
    }

    /// Current stage of the optimization sequence
    pub fn stage(&self) -> OptimizationStage {
        self.stage
    }

    /// Objective coefficient of every biomass reaction, keyed by reaction id
    pub fn objective_coefficients(&self) -> IndexMap<String, f64> {
        let coefficients = self.tfa_model.problem().objective().coefficients();
        self.partition
            .biomass
            .iter()
            .map(|id| {
                let coefficient = self
                    .tfa_model
                    .model()
                    .reactions
                    .get(id)
                    .and_then(|rxn| coefficients.get(&rxn.get_forward_id()))
                    .copied()
                    .unwrap_or(0.0);
                (id.clone(), coefficient)
            })
            .collect()
    }
    // endregion Accessors

    // region Solution helpers
    /// Net flux (forward - reverse) of a reaction in a solution
    pub fn reaction_flux(&self, solution: &ProblemSolution, reaction_id: &str) -> Option<f64> {
        let reaction = self.tfa_model.model().reactions.get(reaction_id)?;
        let forward = solution.value(&reaction.get_forward_id())?;
        let reverse = solution.value(&reaction.get_reverse_id())?;
        Some(forward - reverse)
    }

    /// Non-core reactions left active by a solution, i.e. the lumped pathway
    pub fn retained_reactions(&self, solution: &ProblemSolution) -> Vec<String> {
        self.indicators
            .values()
            .filter(|indicator| {
                solution
                    .value(&indicator.variable_id)
                    .is_some_and(|value| value < 0.5)
            })
            .map(|indicator| indicator.reaction_id.clone())
            .collect()
    }
    // endregion Solution helpers
}
