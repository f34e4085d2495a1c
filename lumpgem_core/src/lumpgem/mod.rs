//! The LumpGEM algorithm
//!
//! [`LumpGem`] selects which non-core reactions of a genome scale model can remain
//! active while the biomass reactions sustain a minimum growth rate. Each non-core
//! reaction gets a binary lumping indicator which, when set, forces the reaction to
//! carry no flux. Thermodynamic constraints are only applied to the core network.
pub mod builder;
pub mod partition;
pub mod runner;

use std::fmt::{Display, Formatter};

use thiserror::Error;

use crate::configuration::ConfigError;
use crate::optimize::problem::ProblemError;
use crate::optimize::solvers::SolverError;
use crate::thermo::ThermoError;

pub use builder::{LumpGem, LumpingIndicator};
pub use partition::{PartitionError, ReactionPartition, ReactionRole};

/// Stage of a [`LumpGem`] in the prepare, gate, convert, solve sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum OptimizationStage {
    /// Variables, constraints and objective have been generated
    Built,
    /// The thermodynamic engine has annotated the reactions
    Prepared,
    /// Thermodynamic computation has been disabled for non-core reactions
    ThermoGated,
    /// Thermodynamic constraints have been added to the problem
    Converted,
    /// The problem has been handed to the solver
    Solved,
    /// Adding the thermodynamic constraints failed, leaving the problem partially
    /// converted
    Failed,
}

impl Display for OptimizationStage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            OptimizationStage::Built => write!(f, "built"),
            OptimizationStage::Prepared => write!(f, "prepared"),
            OptimizationStage::ThermoGated => write!(f, "thermo-gated"),
            OptimizationStage::Converted => write!(f, "converted"),
            OptimizationStage::Solved => write!(f, "solved"),
            OptimizationStage::Failed => write!(f, "failed"),
        }
    }
}

/// Errors associated with building and running a [`LumpGem`]
#[derive(Error, Debug)]
pub enum LumpGemError {
    /// The parameters of the run are not usable
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),
    /// The reactions could not be partitioned
    #[error("Configuration error: {0}")]
    Partition(#[from] PartitionError),
    /// A partitioned reaction is missing from the thermodynamic model
    #[error("Model consistency error: {0}")]
    ModelConsistency(String),
    /// A step was called out of order
    #[error("Step requires the {expected} stage, but the model is {found}")]
    OutOfOrder {
        expected: OptimizationStage,
        found: OptimizationStage,
    },
    /// Thermodynamic data or constraints could not be handled
    #[error(transparent)]
    Thermo(#[from] ThermoError),
    /// The problem could not be built
    #[error(transparent)]
    Problem(#[from] ProblemError),
    /// The solver could not be run
    #[error(transparent)]
    Solver(#[from] SolverError),
}
