//! Core rust implementation of LumpGEM, which identifies the minimal sets of
//! non-core reactions a genome scale metabolic model needs to produce its biomass
//! building blocks, under thermodynamic constraints on the core network.

pub mod configuration;
pub mod lumpgem;
pub mod metabolic_model;
pub mod optimize;
pub mod thermo;
mod utils;

pub use lumpgem::{LumpGem, LumpGemError, OptimizationStage};
