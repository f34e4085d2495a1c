//! Global defaults, and the configuration of a single LumpGEM run
use std::fmt::{Display, Formatter};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{LazyLock, RwLock};

use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::thermo::engine::ThermoSettings;

pub static CONFIGURATION: LazyLock<RwLock<Configuration>> =
    LazyLock::new(|| RwLock::new(Configuration::default()));

/// Process wide defaults
pub struct Configuration {
    /// Default lower flux bound of new reactions
    pub lower_bound: f64,
    /// Default upper flux bound of new reactions
    pub upper_bound: f64,
    /// Tolerance used when checking solutions against constraints
    pub tolerance: f64,
    /// Default solver backend
    pub solver: SolverBackend,
}

impl Default for Configuration {
    fn default() -> Self {
        Configuration {
            lower_bound: -1000.,
            upper_bound: 1000.,
            tolerance: 1e-07,
            solver: SolverBackend::default(),
        }
    }
}

/// Read the default solver backend
pub(crate) fn default_solver() -> SolverBackend {
    CONFIGURATION
        .read()
        .map(|config| config.solver)
        .unwrap_or_default()
}

/// Read the default tolerance used when checking solutions
pub(crate) fn default_tolerance() -> f64 {
    CONFIGURATION
        .read()
        .map(|config| config.tolerance)
        .unwrap_or(1e-07)
}

/// Enum used to specify the solver to use
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SolverBackend {
    /// Use the pure Rust microlp MILP solver, requires the microlp feature (on by default)
    Microlp,
    /// Use the HiGHS solver, requires the highs feature to be enabled
    Highs,
    /// Use the SCIP Mixed Integer Solver, requires the scip feature to be enabled
    Scip,
}

cfg_if::cfg_if! {
    if #[cfg(feature = "microlp")] {
        const DEFAULT_BACKEND: SolverBackend = SolverBackend::Microlp;
    } else if #[cfg(feature = "highs")] {
        const DEFAULT_BACKEND: SolverBackend = SolverBackend::Highs;
    } else if #[cfg(feature = "scip")] {
        const DEFAULT_BACKEND: SolverBackend = SolverBackend::Scip;
    } else {
        const DEFAULT_BACKEND: SolverBackend = SolverBackend::Microlp;
    }
}

impl Default for SolverBackend {
    /// The first backend compiled in, in the order microlp, HiGHS, SCIP
    fn default() -> Self {
        DEFAULT_BACKEND
    }
}

impl Display for SolverBackend {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            SolverBackend::Microlp => write!(f, "microlp"),
            SolverBackend::Highs => write!(f, "highs"),
            SolverBackend::Scip => write!(f, "scip"),
        }
    }
}

/// Parameters of a LumpGEM run
///
/// # Examples
/// ```rust
/// use lumpgem_core::configuration::LumpGemConfigBuilder;
/// let config = LumpGemConfigBuilder::default()
///     .biomass_rxns(vec!["B1".to_string()])
///     .core_subsystems(vec![vec!["R1".to_string()]])
///     .carbon_uptake(10.0)
///     .growth_rate(0.1)
///     .thermo_data_path("thermo.json")
///     .build()
///     .unwrap();
/// assert!(config.validate().is_ok());
/// ```
#[derive(Builder, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[builder(setter(into))]
pub struct LumpGemConfig {
    /// Ids of the reactions producing biomass building blocks
    pub biomass_rxns: Vec<String>,
    /// Groups of reaction ids making up the core network
    pub core_subsystems: Vec<Vec<String>>,
    /// Cap on the combined flux of each non-core reaction
    pub carbon_uptake: f64,
    /// Minimum flux through every biomass reaction
    pub growth_rate: f64,
    /// Path to the thermodynamic database
    pub thermo_data_path: PathBuf,
    /// Solver backend to use
    #[builder(default = "default_solver()")]
    #[serde(default = "default_solver")]
    pub solver: SolverBackend,
    /// Objective reward for every non-core reaction switched off, 0 leaves the
    /// lumping indicators out of the objective
    #[builder(default = "0.0")]
    #[serde(default)]
    pub indicator_reward: f64,
    /// Settings of the thermodynamic constraints
    #[builder(default)]
    #[serde(default)]
    pub thermo: ThermoSettings,
}

impl LumpGemConfig {
    /// Read a configuration from a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json_data = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: LumpGemConfig = serde_json::from_str(&json_data)?;
        log::info!("Loaded LumpGEM configuration from {:?}", path);
        Ok(config)
    }

    /// Check that the parameters are usable
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.carbon_uptake.is_finite() && self.carbon_uptake > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "carbon_uptake must be a positive number, got {}",
                self.carbon_uptake
            )));
        }
        if !(self.growth_rate.is_finite() && self.growth_rate >= 0.0) {
            return Err(ConfigError::Invalid(format!(
                "growth_rate must be a non-negative number, got {}",
                self.growth_rate
            )));
        }
        if !self.indicator_reward.is_finite() {
            return Err(ConfigError::Invalid(
                "indicator_reward must be finite".to_string(),
            ));
        }
        if self.biomass_rxns.is_empty() {
            return Err(ConfigError::Invalid(
                "at least one biomass reaction is required".to_string(),
            ));
        }
        if self.core_subsystems.iter().all(|subsystem| subsystem.is_empty()) {
            return Err(ConfigError::Invalid(
                "the core subsystems contain no reactions".to_string(),
            ));
        }
        self.thermo.validate().map_err(ConfigError::Invalid)
    }
}

/// Errors associated with loading or validating a configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration file could not be read
    #[error("Unable to read configuration file {path:?}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The configuration file is not valid JSON for a [`LumpGemConfig`]
    #[error("Unable to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
    /// A parameter is out of range
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
