//! Engines adding thermodynamic feasibility constraints to a flux problem
//!
//! A [`ThermoEngine`] works in two steps. [`ThermoEngine::prepare`] annotates the
//! reactions of a [`Model`] with thermodynamic data, and [`ThermoEngine::convert`]
//! turns every annotated reaction whose `computed` flag is still set into variables
//! and constraints of a [`Problem`]. Flags may be cleared between the two steps to
//! exclude reactions from the thermodynamic formulation.
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::metabolic_model::metabolite::Metabolite;
use crate::metabolic_model::model::Model;
use crate::metabolic_model::reaction::{Reaction, ThermoAnnotation};
use crate::optimize::problem::Problem;
use crate::optimize::variable::{Variable, VariableType};
use crate::thermo::database::ThermoDatabase;
use crate::thermo::ThermoError;

/// Gas constant in kJ/(mol K)
pub const GAS_CONSTANT: f64 = 8.314_462_618e-3;

/// Something that can augment a flux problem with thermodynamic constraints
pub trait ThermoEngine {
    /// Annotate the reactions of `model` with thermodynamic data
    ///
    /// Returns the number of annotated reactions.
    fn prepare(&self, model: &mut Model) -> Result<usize, ThermoError>;

    /// Add thermodynamic variables and constraints to `problem` for every reaction of
    /// `model` with thermodynamic computation enabled
    ///
    /// Returns the number of constrained reactions.
    fn convert(&self, model: &Model, problem: &mut Problem) -> Result<usize, ThermoError>;
}

/// Parameters of the thermodynamic formulation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThermoSettings {
    /// Temperature (K)
    pub temperature: f64,
    /// Lowest allowed metabolite concentration (M)
    pub min_concentration: f64,
    /// Highest allowed metabolite concentration (M)
    pub max_concentration: f64,
    /// Big-M coupling flux variables to their direction indicators
    pub flux_big_m: f64,
    /// Big-M coupling Gibbs energies to the direction indicators (kJ/mol)
    pub gibbs_big_m: f64,
    /// Margin by which the Gibbs energy of an active direction must be negative (kJ/mol)
    pub epsilon: f64,
}

impl Default for ThermoSettings {
    fn default() -> Self {
        ThermoSettings {
            temperature: 298.15,
            min_concentration: 1e-8,
            max_concentration: 0.05,
            flux_big_m: 1000.,
            gibbs_big_m: 1000.,
            epsilon: 1e-6,
        }
    }
}

impl ThermoSettings {
    /// RT in kJ/mol
    pub fn rt(&self) -> f64 {
        GAS_CONSTANT * self.temperature
    }

    /// Check that the settings describe a usable formulation
    pub fn validate(&self) -> Result<(), String> {
        if !(self.temperature > 0.0) {
            return Err(format!("temperature must be positive, got {}", self.temperature));
        }
        if !(self.min_concentration > 0.0 && self.min_concentration < self.max_concentration) {
            return Err(format!(
                "concentration bounds must satisfy 0 < min < max, got [{}, {}]",
                self.min_concentration, self.max_concentration
            ));
        }
        if !(self.flux_big_m > 0.0 && self.gibbs_big_m > 0.0) {
            return Err("big-M values must be positive".to_string());
        }
        if !(self.epsilon >= 0.0 && self.epsilon < self.gibbs_big_m) {
            return Err(format!("epsilon must be in [0, gibbs_big_m), got {}", self.epsilon));
        }
        Ok(())
    }
}

/// Thermodynamic engine based on standard Gibbs energies of formation
///
/// For every computed reaction `r` with forward flux `f`, reverse flux `b` and
/// metabolites `m` with stoichiometry `s`, it adds the Gibbs energy `DG_r`,
/// direction indicators `FU_r`, `BU_r` and log concentrations `LC_m`:
///
/// ```text
/// dG0 - err <= DG_r - RT * sum(s * LC_m) <= dG0 + err
/// f - M * FU_r <= 0
/// b - M * BU_r <= 0
/// FU_r + BU_r <= 1
///  DG_r + K * FU_r <= K - eps
/// -DG_r + K * BU_r <= K - eps
/// ```
///
/// `M` is the largest of the flux big-M and the flux bounds of the reaction.
/// Constrained reactions must have finite flux bounds.
#[derive(Debug, Clone)]
pub struct GibbsEnergyEngine {
    database: ThermoDatabase,
    settings: ThermoSettings,
}

impl GibbsEnergyEngine {
    pub fn new(database: ThermoDatabase, settings: ThermoSettings) -> Result<Self, ThermoError> {
        settings.validate().map_err(ThermoError::InvalidSettings)?;
        Ok(GibbsEnergyEngine { database, settings })
    }

    pub fn database(&self) -> &ThermoDatabase {
        &self.database
    }

    pub fn settings(&self) -> &ThermoSettings {
        &self.settings
    }

    /// Standard Gibbs energy of reaction and its uncertainty, None if any metabolite
    /// lacks formation data
    fn reaction_delta_g(
        &self,
        metabolites: &IndexMap<String, Metabolite>,
        reaction: &Reaction,
    ) -> Option<(f64, f64)> {
        let mut delta_g = 0.0;
        let mut variance = 0.0;
        for (met, coef) in &reaction.metabolites {
            let key = metabolites.get(met).map_or(met.as_str(), Metabolite::thermo_key);
            let data = self.database.get(key)?;
            delta_g += coef * data.delta_gf;
            variance += (coef * data.delta_gf_err).powi(2);
        }
        Some((delta_g, variance.sqrt()))
    }

    /// Add the log concentration variable of a metabolite if not yet present
    fn ensure_log_concentration(
        &self,
        metabolites: &IndexMap<String, Metabolite>,
        problem: &mut Problem,
        metabolite: &str,
    ) -> Result<String, ThermoError> {
        let id = format!("LC_{}", metabolite);
        if problem.get_variable(&id).is_none() {
            let (min, max) = metabolites
                .get(metabolite)
                .and_then(|met| met.concentration_bounds)
                .unwrap_or((
                    self.settings.min_concentration,
                    self.settings.max_concentration,
                ));
            if !(min > 0.0 && min <= max) {
                return Err(ThermoError::InvalidSettings(format!(
                    "concentration bounds of {} must satisfy 0 < min <= max, got [{}, {}]",
                    metabolite, min, max
                )));
            }
            problem.add_variable(Variable::new_continuous(&id, min.ln(), max.ln()))?;
        }
        Ok(id)
    }

    fn constrain_reaction(
        &self,
        metabolites: &IndexMap<String, Metabolite>,
        reaction: &Reaction,
        annotation: &ThermoAnnotation,
        problem: &mut Problem,
    ) -> Result<(), ThermoError> {
        let id = &reaction.id;
        let (_, forward_ub) = reaction.get_forward_bounds();
        let (_, reverse_ub) = reaction.get_reverse_bounds();
        if !(forward_ub.is_finite() && reverse_ub.is_finite()) {
            return Err(ThermoError::InvalidSettings(format!(
                "reaction {} has an unbounded flux, thermodynamic constraints need finite bounds",
                id
            )));
        }
        let forward = reaction.get_forward_id();
        let reverse = reaction.get_reverse_id();
        let dg = format!("DG_{}", id);
        let fu = format!("FU_{}", id);
        let bu = format!("BU_{}", id);

        problem.add_new_variable(
            &dg,
            None,
            VariableType::Continuous,
            f64::NEG_INFINITY,
            f64::INFINITY,
        )?;
        problem.add_variable(Variable::new_binary(&fu))?;
        problem.add_variable(Variable::new_binary(&bu))?;

        // Gibbs energy of reaction from standard energy and concentrations
        let rt = self.settings.rt();
        let mut variables = vec![dg.clone()];
        let mut coefficients = vec![1.0];
        for (met, coef) in &reaction.metabolites {
            variables.push(self.ensure_log_concentration(metabolites, problem, met)?);
            coefficients.push(-rt * coef);
        }
        let variables = variables.iter().map(String::as_str).collect::<Vec<_>>();
        problem.add_new_inequality_constraint(
            &format!("{}_dG", id),
            &variables,
            &coefficients,
            annotation.delta_g_std - annotation.delta_g_err,
            annotation.delta_g_std + annotation.delta_g_err,
        )?;

        // Flux may only be carried in a direction whose indicator is set
        let big_m = self.settings.flux_big_m.max(forward_ub).max(reverse_ub);
        problem.add_new_inequality_constraint(
            &format!("{}_forward_use", id),
            &[&forward, &fu],
            &[1.0, -big_m],
            f64::NEG_INFINITY,
            0.0,
        )?;
        problem.add_new_inequality_constraint(
            &format!("{}_reverse_use", id),
            &[&reverse, &bu],
            &[1.0, -big_m],
            f64::NEG_INFINITY,
            0.0,
        )?;
        problem.add_new_inequality_constraint(
            &format!("{}_use_exclusive", id),
            &[&fu, &bu],
            &[1.0, 1.0],
            f64::NEG_INFINITY,
            1.0,
        )?;

        // A direction can only be used if its Gibbs energy is negative
        let k = self.settings.gibbs_big_m;
        let eps = self.settings.epsilon;
        problem.add_new_inequality_constraint(
            &format!("{}_forward_dG", id),
            &[&dg, &fu],
            &[1.0, k],
            f64::NEG_INFINITY,
            k - eps,
        )?;
        problem.add_new_inequality_constraint(
            &format!("{}_reverse_dG", id),
            &[&dg, &bu],
            &[-1.0, k],
            f64::NEG_INFINITY,
            k - eps,
        )?;
        Ok(())
    }
}

impl ThermoEngine for GibbsEnergyEngine {
    fn prepare(&self, model: &mut Model) -> Result<usize, ThermoError> {
        let mut annotated = 0;
        let metabolites = &model.metabolites;
        for reaction in model.reactions.values_mut() {
            if reaction.is_boundary() {
                continue;
            }
            match self.reaction_delta_g(metabolites, reaction) {
                Some((delta_g_std, delta_g_err)) => {
                    reaction.thermo = Some(ThermoAnnotation {
                        computed: true,
                        delta_g_std,
                        delta_g_err,
                    });
                    annotated += 1;
                }
                None => log::debug!("No thermodynamic data for reaction {}", reaction.id),
            }
        }
        log::info!(
            "Annotated {} of {} reactions with thermodynamic data",
            annotated,
            model.reactions.len()
        );
        Ok(annotated)
    }

    fn convert(&self, model: &Model, problem: &mut Problem) -> Result<usize, ThermoError> {
        let mut constrained = 0;
        for reaction in model.reactions.values() {
            let Some(annotation) = reaction.thermo.as_ref().filter(|t| t.computed) else {
                continue;
            };
            self.constrain_reaction(&model.metabolites, reaction, annotation, problem)?;
            constrained += 1;
        }
        log::info!(
            "Added thermodynamic constraints for {} reactions",
            constrained
        );
        Ok(constrained)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metabolic_model::metabolite::MetaboliteBuilder;
    use crate::metabolic_model::reaction::ReactionBuilder;
    use crate::thermo::database::ThermoMetabolite;

    fn engine() -> GibbsEnergyEngine {
        let mut database = ThermoDatabase::default();
        database.units = "kJ/mol".to_string();
        database.metabolites.insert(
            "A".to_string(),
            ThermoMetabolite {
                delta_gf: -10.0,
                delta_gf_err: 3.0,
            },
        );
        database.metabolites.insert(
            "B".to_string(),
            ThermoMetabolite {
                delta_gf: -25.0,
                delta_gf_err: 4.0,
            },
        );
        GibbsEnergyEngine::new(database, ThermoSettings::default()).unwrap()
    }

    fn model() -> Model {
        let mut model = Model::new_empty();
        for (id, mets) in [
            ("EX_A", vec![("A", 1.0)]),
            ("R1", vec![("A", -1.0), ("B", 1.0)]),
            ("R2", vec![("A", -1.0), ("C", 1.0)]),
        ] {
            model.add_reaction(
                ReactionBuilder::default()
                    .id(id.to_string())
                    .metabolites(
                        mets.into_iter()
                            .map(|(m, s)| (m.to_string(), s))
                            .collect::<IndexMap<_, _>>(),
                    )
                    .build()
                    .unwrap(),
            );
        }
        model
    }

    #[test]
    fn prepare_annotates_reactions_with_data() {
        let mut model = model();
        assert_eq!(engine().prepare(&mut model).unwrap(), 1);

        let annotation = model.reactions["R1"].thermo.unwrap();
        assert!(annotation.computed);
        assert!((annotation.delta_g_std + 15.0).abs() < 1e-12);
        assert!((annotation.delta_g_err - 5.0).abs() < 1e-12);
        // Boundary reaction and reaction with missing data stay unannotated
        assert!(model.reactions["EX_A"].thermo.is_none());
        assert!(model.reactions["R2"].thermo.is_none());
    }

    #[test]
    fn convert_skips_disabled_reactions() {
        let engine = engine();
        let mut model = model();
        engine.prepare(&mut model).unwrap();

        let mut problem = Problem::new_maximization();
        for rxn in model.reactions.values() {
            let (f_lb, f_ub) = rxn.get_forward_bounds();
            let (r_lb, r_ub) = rxn.get_reverse_bounds();
            problem
                .add_variable(Variable::new_continuous(
                    &rxn.get_forward_id(),
                    f_lb,
                    f_ub,
                ))
                .unwrap();
            problem
                .add_variable(Variable::new_continuous(
                    &rxn.get_reverse_id(),
                    r_lb,
                    r_ub,
                ))
                .unwrap();
        }

        let mut disabled = model.clone();
        disabled.reactions["R1"].thermo.as_mut().unwrap().computed = false;
        let mut untouched = problem.clone();
        assert_eq!(engine.convert(&disabled, &mut untouched).unwrap(), 0);
        assert_eq!(untouched.num_constraints(), 0);

        assert_eq!(engine.convert(&model, &mut problem).unwrap(), 1);
        for id in ["DG_R1", "FU_R1", "BU_R1", "LC_A", "LC_B"] {
            assert!(problem.get_variable(id).is_some(), "missing variable {}", id);
        }
        assert_eq!(problem.num_constraints(), 6);
        assert_eq!(
            problem.get_variable("FU_R1").unwrap().variable_type,
            VariableType::Binary
        );
    }

    #[test]
    fn metabolite_overrides() {
        let engine = engine();
        let mut model = Model::new_empty();
        model.add_reaction(
            ReactionBuilder::default()
                .id("R1".to_string())
                .metabolites(IndexMap::from([
                    ("A_c".to_string(), -1.0),
                    ("B".to_string(), 1.0),
                ]))
                .build()
                .unwrap(),
        );
        // Without a declared metabolite A_c has no data
        assert_eq!(engine.prepare(&mut model.clone()).unwrap(), 0);

        model.add_metabolite(
            MetaboliteBuilder::default()
                .id("A_c".to_string())
                .thermo_id(Some("A".to_string()))
                .concentration_bounds(Some((1e-3, 1e-2)))
                .build()
                .unwrap(),
        );
        assert_eq!(engine.prepare(&mut model).unwrap(), 1);

        let mut problem = Problem::new_maximization();
        let rxn = &model.reactions["R1"];
        for id in [rxn.get_forward_id(), rxn.get_reverse_id()] {
            problem
                .add_variable(Variable::new_continuous(&id, 0., 1000.))
                .unwrap();
        }
        engine.convert(&model, &mut problem).unwrap();
        let lc_a = problem.get_variable("LC_A_c").unwrap();
        assert!((lc_a.lower_bound - 1e-3f64.ln()).abs() < 1e-12);
        assert!((lc_a.upper_bound - 1e-2f64.ln()).abs() < 1e-12);
        let lc_b = problem.get_variable("LC_B").unwrap();
        assert!((lc_b.upper_bound - 0.05f64.ln()).abs() < 1e-12);
    }

    #[test]
    fn unbounded_reaction_is_rejected() {
        let engine = engine();
        let mut model = model();
        model.reactions["R1"].upper_bound = f64::INFINITY;
        engine.prepare(&mut model).unwrap();
        assert!(model.reactions["R1"].thermo_computed());

        let mut problem = Problem::new_maximization();
        let rxn = &model.reactions["R1"];
        let (f_lb, f_ub) = rxn.get_forward_bounds();
        let (r_lb, r_ub) = rxn.get_reverse_bounds();
        problem
            .add_variable(Variable::new_continuous(&rxn.get_forward_id(), f_lb, f_ub))
            .unwrap();
        problem
            .add_variable(Variable::new_continuous(&rxn.get_reverse_id(), r_lb, r_ub))
            .unwrap();
        assert!(matches!(
            engine.convert(&model, &mut problem),
            Err(ThermoError::InvalidSettings(_))
        ));
        // Nothing was added for the rejected reaction
        assert!(problem.get_variable("DG_R1").is_none());

        // Finite bounds above the flux big-M raise the big-M instead
        model.reactions["R1"].upper_bound = 5000.;
        let mut problem = Problem::new_maximization();
        let rxn = &model.reactions["R1"];
        for (id, (lb, ub)) in [
            (rxn.get_forward_id(), rxn.get_forward_bounds()),
            (rxn.get_reverse_id(), rxn.get_reverse_bounds()),
        ] {
            problem
                .add_variable(Variable::new_continuous(&id, lb, ub))
                .unwrap();
        }
        engine.convert(&model, &mut problem).unwrap();
        let forward_use = problem.get_constraint("R1_forward_use").unwrap();
        assert_eq!(forward_use.terms()[1].coefficient, -5000.0);
    }

    #[test]
    fn invalid_settings() {
        let settings = ThermoSettings {
            min_concentration: 1.0,
            max_concentration: 0.1,
            ..ThermoSettings::default()
        };
        assert!(matches!(
            GibbsEnergyEngine::new(ThermoDatabase::default(), settings),
            Err(ThermoError::InvalidSettings(_))
        ));
    }
}
