//! This module provides the metabolite struct representing a metabolite
use derive_builder::Builder;

/// Represents a metabolite
///
/// Metabolites only need to be declared in a [`crate::metabolic_model::model::Model`]
/// when they carry data beyond their id, reactions may reference undeclared ids.
#[derive(Builder, Debug, Clone, PartialEq)]
pub struct Metabolite {
    /// Used to identify the metabolite (must be unique)
    pub id: String,
    /// Human Readable name of the metabolite
    #[builder(default = "None")]
    pub name: Option<String>,
    /// Which compartment the metabolite is in
    #[builder(default = "None")]
    pub compartment: Option<String>,
    /// Key of the metabolite in the thermodynamic database, if it differs from `id`
    #[builder(default = "None")]
    pub thermo_id: Option<String>,
    /// Concentration range (M), replacing the global range of the thermodynamic settings
    #[builder(default = "None")]
    pub concentration_bounds: Option<(f64, f64)>,
}

impl Metabolite {
    /// Id used to look the metabolite up in a thermodynamic database
    pub fn thermo_key(&self) -> &str {
        self.thermo_id.as_deref().unwrap_or(&self.id)
    }
}
