//! Thermodynamic augmentation of flux problems
pub mod database;
pub mod engine;
pub mod model;

use std::path::PathBuf;

use thiserror::Error;

use crate::optimize::problem::ProblemError;

/// Errors associated with thermodynamic data and constraints
#[derive(Error, Debug)]
pub enum ThermoError {
    /// The database file could not be read
    #[error("Unable to read thermodynamic database {path:?}")]
    DatabaseRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The database is not valid JSON
    #[error("Unable to parse thermodynamic database: {0}")]
    DatabaseParse(#[from] serde_json::Error),
    /// The database uses units the engine doesn't understand
    #[error("Unsupported thermodynamic database units {0}, expected kJ/mol")]
    UnsupportedUnits(String),
    /// The engine settings are not usable
    #[error("Invalid thermodynamic settings: {0}")]
    InvalidSettings(String),
    /// A reaction was requested which is not in the model
    #[error("Reaction {0} is not in the thermodynamic model")]
    ReactionNotFound(String),
    /// The thermodynamic model has no reactions
    #[error("The thermodynamic model has no reactions")]
    EmptyModel,
    /// Building the problem failed
    #[error(transparent)]
    Problem(#[from] ProblemError),
}
