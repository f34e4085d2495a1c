//! A metabolic model bundled with its flux problem and a thermodynamic engine
use indexmap::IndexMap;

use crate::metabolic_model::model::Model;
use crate::metabolic_model::reaction::{Reaction, ThermoAnnotation};
use crate::optimize::problem::{Problem, ProblemError};
use crate::optimize::solvers::Solver;
use crate::optimize::variable::Variable;
use crate::optimize::ProblemSolution;
use crate::thermo::engine::ThermoEngine;
use crate::thermo::ThermoError;

/// Name given to every newly created [`ThermoModel`]
pub const LUMPED_MODEL_NAME: &str = "Lumped Model";

/// A metabolic model augmented with a flux problem and a thermodynamic engine
///
/// On creation the problem holds a forward and a reverse flux variable for every
/// reaction and a steady state mass balance for every metabolite. Thermodynamic
/// variables and constraints are only added by [`ThermoModel::convert`], for the
/// reactions whose thermodynamic computation is enabled at that point.
#[derive(Debug, Clone)]
pub struct ThermoModel<E: ThermoEngine> {
    /// Human-readable name of the model
    pub name: String,
    model: Model,
    problem: Problem,
    engine: E,
}

impl<E: ThermoEngine> ThermoModel<E> {
    /// Create the flux problem for `model`
    pub fn new(engine: E, model: Model) -> Result<Self, ThermoError> {
        if model.reactions.is_empty() {
            return Err(ThermoError::EmptyModel);
        }
        let problem = Self::build_flux_problem(&model)?;
        log::debug!(
            "Built flux problem with {} variables and {} constraints",
            problem.num_variables(),
            problem.num_constraints()
        );
        Ok(ThermoModel {
            name: LUMPED_MODEL_NAME.to_string(),
            model,
            problem,
            engine,
        })
    }

    fn build_flux_problem(model: &Model) -> Result<Problem, ProblemError> {
        let mut problem = Problem::new_maximization();
        for reaction in model.reactions.values() {
            let (f_lb, f_ub) = reaction.get_forward_bounds();
            let (r_lb, r_ub) = reaction.get_reverse_bounds();
            problem.add_variable(Variable::new_continuous(
                &reaction.get_forward_id(),
                f_lb,
                f_ub,
            ))?;
            problem.add_variable(Variable::new_continuous(
                &reaction.get_reverse_id(),
                r_lb,
                r_ub,
            ))?;
        }

        // Gather the flux terms of every metabolite, S * (forward - reverse) = 0
        let mut balances: IndexMap<String, (Vec<String>, Vec<f64>)> = model
            .metabolite_ids()
            .into_iter()
            .map(|met| (met, (Vec::new(), Vec::new())))
            .collect();
        for reaction in model.reactions.values() {
            for (met, coef) in &reaction.metabolites {
                if let Some((variables, coefficients)) = balances.get_mut(met) {
                    variables.push(reaction.get_forward_id());
                    coefficients.push(*coef);
                    variables.push(reaction.get_reverse_id());
                    coefficients.push(-coef);
                }
            }
        }
        for (met, (variables, coefficients)) in balances {
            if variables.is_empty() {
                continue;
            }
            let variables = variables.iter().map(String::as_str).collect::<Vec<_>>();
            problem.add_new_equality_constraint(
                &format!("{}_mass_balance", met),
                &variables,
                &coefficients,
                0.0,
            )?;
        }
        Ok(problem)
    }

    /// The underlying metabolic model
    pub fn model(&self) -> &Model {
        &self.model
    }

    /// The flux problem, including any constraints added since creation
    pub fn problem(&self) -> &Problem {
        &self.problem
    }

    /// Mutable access to the flux problem
    pub fn problem_mut(&mut self) -> &mut Problem {
        &mut self.problem
    }

    /// The thermodynamic engine
    pub fn engine(&self) -> &E {
        &self.engine
    }

    fn reaction(&self, reaction_id: &str) -> Result<&Reaction, ThermoError> {
        self.model
            .reactions
            .get(reaction_id)
            .ok_or_else(|| ThermoError::ReactionNotFound(reaction_id.to_string()))
    }

    /// Id of the forward flux variable of a reaction
    pub fn forward_variable_id(&self, reaction_id: &str) -> Result<String, ThermoError> {
        let id = self.reaction(reaction_id)?.get_forward_id();
        self.require_variable(reaction_id, id)
    }

    /// Id of the reverse flux variable of a reaction
    pub fn reverse_variable_id(&self, reaction_id: &str) -> Result<String, ThermoError> {
        let id = self.reaction(reaction_id)?.get_reverse_id();
        self.require_variable(reaction_id, id)
    }

    fn require_variable(&self, reaction_id: &str, id: String) -> Result<String, ThermoError> {
        match self.problem.get_variable(&id) {
            Some(_) => Ok(id),
            None => Err(ThermoError::ReactionNotFound(reaction_id.to_string())),
        }
    }

    /// Thermodynamic annotation of a reaction, None if it was never annotated
    pub fn thermo_annotation(
        &self,
        reaction_id: &str,
    ) -> Result<Option<&ThermoAnnotation>, ThermoError> {
        Ok(self.reaction(reaction_id)?.thermo.as_ref())
    }

    /// Whether thermodynamic constraints will be generated for a reaction
    pub fn thermo_computed(&self, reaction_id: &str) -> Result<bool, ThermoError> {
        Ok(self.reaction(reaction_id)?.thermo_computed())
    }

    /// Enable or disable thermodynamic computation for a reaction
    ///
    /// Returns false, leaving the reaction untouched, if it was never annotated.
    pub fn set_thermo_computed(
        &mut self,
        reaction_id: &str,
        computed: bool,
    ) -> Result<bool, ThermoError> {
        let reaction = self
            .model
            .reactions
            .get_mut(reaction_id)
            .ok_or_else(|| ThermoError::ReactionNotFound(reaction_id.to_string()))?;
        match reaction.thermo.as_mut() {
            Some(annotation) => {
                annotation.computed = computed;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Change the lower flux bound of a reaction, updating its flux variables
    pub fn set_reaction_lower_bound(
        &mut self,
        reaction_id: &str,
        lower_bound: f64,
    ) -> Result<(), ThermoError> {
        let mut updated = self.reaction(reaction_id)?.clone();
        updated.lower_bound = lower_bound;
        if updated.lower_bound > updated.upper_bound {
            return Err(ProblemError::InvalidVariableBounds(reaction_id.to_string()).into());
        }
        let (f_lb, f_ub) = updated.get_forward_bounds();
        let (r_lb, r_ub) = updated.get_reverse_bounds();
        self.problem
            .update_variable_bounds(&updated.get_forward_id(), f_lb, f_ub)?;
        self.problem
            .update_variable_bounds(&updated.get_reverse_id(), r_lb, r_ub)?;
        self.model.add_reaction(updated);
        Ok(())
    }

    /// Annotate the reactions with thermodynamic data
    pub fn prepare(&mut self) -> Result<usize, ThermoError> {
        self.engine.prepare(&mut self.model)
    }

    /// Add thermodynamic constraints for every reaction with computation enabled
    pub fn convert(&mut self) -> Result<usize, ThermoError> {
        self.engine.convert(&self.model, &mut self.problem)
    }

    /// Solve the problem
    pub fn optimize(&mut self, solver: &dyn Solver) -> Result<ProblemSolution, ThermoError> {
        Ok(self.problem.solve(solver)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metabolic_model::reaction::ReactionBuilder;
    use crate::optimize::constraint::Constraint;

    /// Engine stand-in which annotates every reaction without adding constraints
    struct AnnotateAll;

    impl ThermoEngine for AnnotateAll {
        fn prepare(&self, model: &mut Model) -> Result<usize, ThermoError> {
            for reaction in model.reactions.values_mut() {
                reaction.thermo = Some(ThermoAnnotation {
                    computed: true,
                    delta_g_std: -1.0,
                    delta_g_err: 0.0,
                });
            }
            Ok(model.reactions.len())
        }

        fn convert(&self, model: &Model, _problem: &mut Problem) -> Result<usize, ThermoError> {
            Ok(model
                .reactions
                .values()
                .filter(|r| r.thermo_computed())
                .count())
        }
    }

    fn toy_model() -> Model {
        let mut model = Model::new_empty();
        model.add_reaction(
            ReactionBuilder::default()
                .id("EX_A".to_string())
                .metabolites(IndexMap::from([("A".to_string(), 1.0)]))
                .lower_bound(0.)
                .upper_bound(10.)
                .build()
                .unwrap(),
        );
        model.add_reaction(
            ReactionBuilder::default()
                .id("R1".to_string())
                .metabolites(IndexMap::from([
                    ("A".to_string(), -1.0),
                    ("B".to_string(), 2.0),
                ]))
                .build()
                .unwrap(),
        );
        model
    }

    #[test]
    fn flux_problem() {
        let tmodel = ThermoModel::new(AnnotateAll, toy_model()).unwrap();
        assert_eq!(tmodel.name, LUMPED_MODEL_NAME);
        assert_eq!(tmodel.problem().num_variables(), 4);
        assert_eq!(tmodel.problem().num_constraints(), 2);

        let forward = tmodel.forward_variable_id("R1").unwrap();
        let reverse = tmodel.reverse_variable_id("R1").unwrap();
        match tmodel.problem().get_constraint("B_mass_balance").unwrap() {
            Constraint::Equality { terms, equals, .. } => {
                assert_eq!(*equals, 0.0);
                assert_eq!(terms.len(), 2);
                assert_eq!(terms[0].variable, forward);
                assert_eq!(terms[0].coefficient, 2.0);
                assert_eq!(terms[1].variable, reverse);
                assert_eq!(terms[1].coefficient, -2.0);
            }
            Constraint::Inequality { .. } => panic!("Mass balance should be an equality"),
        }
        assert!(matches!(
            tmodel.forward_variable_id("R9"),
            Err(ThermoError::ReactionNotFound(_))
        ));
    }

    #[test]
    fn empty_model() {
        assert!(matches!(
            ThermoModel::new(AnnotateAll, Model::new_empty()),
            Err(ThermoError::EmptyModel)
        ));
    }

    #[test]
    fn thermo_flags() {
        let mut tmodel = ThermoModel::new(AnnotateAll, toy_model()).unwrap();
        // Nothing annotated before prepare
        assert!(!tmodel.set_thermo_computed("R1", false).unwrap());
        assert!(tmodel.thermo_annotation("R1").unwrap().is_none());

        assert_eq!(tmodel.prepare().unwrap(), 2);
        assert!(tmodel.thermo_computed("R1").unwrap());
        assert!(tmodel.set_thermo_computed("R1", false).unwrap());
        assert!(!tmodel.thermo_computed("R1").unwrap());
        assert_eq!(tmodel.convert().unwrap(), 1);
    }

    #[test]
    fn lower_bound_update() {
        let mut tmodel = ThermoModel::new(AnnotateAll, toy_model()).unwrap();
        tmodel.set_reaction_lower_bound("R1", 0.5).unwrap();
        assert_eq!(tmodel.model().reactions["R1"].lower_bound, 0.5);
        let forward = tmodel.forward_variable_id("R1").unwrap();
        let reverse = tmodel.reverse_variable_id("R1").unwrap();
        assert_eq!(tmodel.problem().get_variable(&forward).unwrap().lower_bound, 0.5);
        assert_eq!(tmodel.problem().get_variable(&reverse).unwrap().upper_bound, 0.0);

        assert!(tmodel.set_reaction_lower_bound("EX_A", 20.).is_err());
        assert!(matches!(
            tmodel.set_reaction_lower_bound("R9", 0.),
            Err(ThermoError::ReactionNotFound(_))
        ));
    }
}
