//! Thermodynamic reference data for metabolites
use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::thermo::ThermoError;

/// Standard Gibbs energies of formation, keyed by metabolite id
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ThermoDatabase {
    /// Name of the database
    #[serde(default)]
    pub name: Option<String>,
    /// Units of the energies, only kJ/mol is understood
    #[serde(default = "default_units")]
    pub units: String,
    /// Formation data for each metabolite
    pub metabolites: IndexMap<String, ThermoMetabolite>,
}

fn default_units() -> String {
    "kJ/mol".to_string()
}

/// Formation energy of a single metabolite
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThermoMetabolite {
    /// Standard transformed Gibbs energy of formation
    pub delta_gf: f64,
    /// Uncertainty of `delta_gf`
    #[serde(default)]
    pub delta_gf_err: f64,
}

impl ThermoDatabase {
    /// Load a database from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ThermoError> {
        let path = path.as_ref();
        let json_data = fs::read_to_string(path).map_err(|source| ThermoError::DatabaseRead {
            path: path.to_path_buf(),
            source,
        })?;
        let database = Self::from_json_str(&json_data)?;
        log::info!(
            "Loaded thermodynamic data for {} metabolites from {:?}",
            database.metabolites.len(),
            path
        );
        Ok(database)
    }

    /// Parse a database from a JSON string
    pub fn from_json_str(json: &str) -> Result<Self, ThermoError> {
        let database: ThermoDatabase = serde_json::from_str(json)?;
        if database.units != "kJ/mol" {
            return Err(ThermoError::UnsupportedUnits(database.units));
        }
        Ok(database)
    }

    /// Formation data of a metabolite
    pub fn get(&self, metabolite_id: &str) -> Option<&ThermoMetabolite> {
        self.metabolites.get(metabolite_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_database() {
        let json = r#"{
            "name": "toy",
            "metabolites": {
                "A": {"delta_gf": -10.0, "delta_gf_err": 1.5},
                "B": {"delta_gf": -20.0}
            }
        }"#;
        let db = ThermoDatabase::from_json_str(json).unwrap();
        assert_eq!(db.units, "kJ/mol");
        assert_eq!(db.get("A").unwrap().delta_gf_err, 1.5);
        assert_eq!(db.get("B").unwrap().delta_gf_err, 0.0);
        assert!(db.get("C").is_none());
    }

    #[test]
    fn reject_units() {
        let json = r#"{"units": "kcal/mol", "metabolites": {}}"#;
        assert!(matches!(
            ThermoDatabase::from_json_str(json),
            Err(ThermoError::UnsupportedUnits(_))
        ));
    }

    #[test]
    fn missing_file() {
        assert!(matches!(
            ThermoDatabase::load("/nonexistent/thermo.json"),
            Err(ThermoError::DatabaseRead { .. })
        ));
    }
}
