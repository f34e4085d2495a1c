//! Metabolic model types: reactions, metabolites and the model holding them

pub mod metabolite;
pub mod model;
pub mod reaction;
