//! This module provides a struct for representing reactions
use derive_builder::Builder;
use indexmap::IndexMap;

use crate::configuration::CONFIGURATION;
use crate::utils::hashing::hash_as_hex_string;

/// Represents a reaction in the metabolic model
#[derive(Builder, Debug, Clone, PartialEq)]
pub struct Reaction {
    /// Used to identify the reaction
    pub id: String,
    /// Metabolite stoichiometry of the reaction
    #[builder(default = "IndexMap::new()")]
    pub metabolites: IndexMap<String, f64>,
    /// Human-readable reaction name
    #[builder(default = "None")]
    pub name: Option<String>,
    /// Lower flux bound
    #[builder(default = "default_lower_bound()")]
    pub lower_bound: f64,
    /// Upper flux bound
    #[builder(default = "default_upper_bound()")]
    pub upper_bound: f64,
    /// Reaction subsystem
    #[builder(default = "None")]
    pub subsystem: Option<String>,
    /// Thermodynamic data, None until a thermodynamic engine annotates the reaction
    #[builder(default = "None")]
    pub thermo: Option<ThermoAnnotation>,
}

fn default_lower_bound() -> f64 {
    CONFIGURATION
        .read()
        .map(|config| config.lower_bound)
        .unwrap_or(-1000.)
}

fn default_upper_bound() -> f64 {
    CONFIGURATION
        .read()
        .map(|config| config.upper_bound)
        .unwrap_or(1000.)
}

impl Reaction {
    /// Determine the id to be associated with the forward reaction in the optimization problem
    ///
    /// # Note:
    /// The forward id is "{reaction_id}_forward"
    pub fn get_forward_id(&self) -> String {
        format!("{}_forward", &self.id)
    }

    /// Determine the id to be associated with the reverse reaction in the optimization problem
    ///
    /// # Note:
    /// The reverse id is "{reaction_id}_reverse_{hexidecimal hash of reaction_id}"
    pub fn get_reverse_id(&self) -> String {
        format!("{}_reverse_{}", &self.id, hash_as_hex_string(&self.id))
    }

    /// Bounds of the variable associated with the forward reaction
    pub(crate) fn get_forward_bounds(&self) -> (f64, f64) {
        (self.lower_bound.max(0.), self.upper_bound.max(0.))
    }

    /// Bounds of the variable associated with the reverse reaction
    pub(crate) fn get_reverse_bounds(&self) -> (f64, f64) {
        ((-self.upper_bound).max(0.), (-self.lower_bound).max(0.))
    }

    /// Whether the reaction only involves a single metabolite (exchange, sink or demand)
    pub fn is_boundary(&self) -> bool {
        self.metabolites.len() <= 1
    }

    /// Whether thermodynamic constraints are computed for this reaction
    pub fn thermo_computed(&self) -> bool {
        self.thermo.as_ref().is_some_and(|t| t.computed)
    }
}

/// Thermodynamic data attached to a reaction
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThermoAnnotation {
    /// Whether thermodynamic constraints are generated for the reaction
    pub computed: bool,
    /// Standard transformed Gibbs energy of reaction (kJ/mol)
    pub delta_g_std: f64,
    /// Uncertainty of the standard Gibbs energy (kJ/mol)
    pub delta_g_err: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flux_variable_bounds() {
        let reversible = ReactionBuilder::default()
            .id("R1".to_string())
            .lower_bound(-5.)
            .upper_bound(10.)
            .build()
            .unwrap();
        assert_eq!(reversible.get_forward_bounds(), (0., 10.));
        assert_eq!(reversible.get_reverse_bounds(), (0., 5.));

        let forced = ReactionBuilder::default()
            .id("B1".to_string())
            .lower_bound(0.1)
            .upper_bound(1000.)
            .build()
            .unwrap();
        assert_eq!(forced.get_forward_bounds(), (0.1, 1000.));
        assert_eq!(forced.get_reverse_bounds(), (0., 0.));

        let backward = ReactionBuilder::default()
            .id("R2".to_string())
            .lower_bound(-10.)
            .upper_bound(-2.)
            .build()
            .unwrap();
        assert_eq!(backward.get_forward_bounds(), (0., 0.));
        assert_eq!(backward.get_reverse_bounds(), (2., 10.));
    }

    #[test]
    fn variable_ids() {
        let rxn = ReactionBuilder::default()
            .id("R1".to_string())
            .build()
            .unwrap();
        assert_eq!(rxn.get_forward_id(), "R1_forward");
        assert!(rxn.get_reverse_id().starts_with("R1_reverse_"));
        assert_ne!(rxn.get_forward_id(), rxn.get_reverse_id());
        assert!(!rxn.thermo_computed());
        assert!(rxn.is_boundary());
    }
}
