//! This module provides the Model struct for representing an entire metabolic model
use indexmap::{IndexMap, IndexSet};

use crate::metabolic_model::metabolite::Metabolite;
use crate::metabolic_model::reaction::Reaction;

/// Represents a Genome Scale Metabolic Model
#[derive(Clone, Debug, Default)]
pub struct Model {
    /// Map of reaction ids to Reactions
    pub reactions: IndexMap<String, Reaction>,
    /// Map of metabolite ids to Metabolites
    pub metabolites: IndexMap<String, Metabolite>,
    /// Id associated with the Model
    pub id: Option<String>,
}

impl Model {
    pub fn new_empty() -> Self {
        Model::default()
    }

    /// Add a reaction to the model
    ///
    /// # Parameters
    /// - reaction: Reaction to add
    ///
    /// # Examples
    /// ```rust
    /// use lumpgem_core::metabolic_model::model::Model;
    /// use lumpgem_core::metabolic_model::reaction::ReactionBuilder;
    /// let mut model = Model::new_empty();
    /// let new_reaction = ReactionBuilder::default().id("new_reaction".to_string()).build().unwrap();
    /// model.add_reaction(new_reaction);
    /// assert!(model.reactions.contains_key("new_reaction"));
    /// ```
    pub fn add_reaction(&mut self, reaction: Reaction) {
        let id = reaction.id.clone();
        self.reactions.insert(id, reaction);
    }

    /// Add a metabolite to the model
    pub fn add_metabolite(&mut self, metabolite: Metabolite) {
        let id = metabolite.id.clone();
        self.metabolites.insert(id, metabolite);
    }

    /// Ids of every metabolite in the model, whether declared in `metabolites` or
    /// only appearing in a reaction's stoichiometry
    pub fn metabolite_ids(&self) -> IndexSet<String> {
        let mut ids: IndexSet<String> = self.metabolites.keys().cloned().collect();
        for reaction in self.reactions.values() {
            ids.extend(reaction.metabolites.keys().cloned());
        }
        ids
    }

    /// Ids of the reactions annotated with the given subsystem
    ///
    /// Useful for assembling the core subsystems of a LumpGEM run
    pub fn subsystem_reactions(&self, subsystem: &str) -> Vec<String> {
        self.reactions
            .values()
            .filter(|rxn| rxn.subsystem.as_deref() == Some(subsystem))
            .map(|rxn| rxn.id.clone())
            .collect()
    }
}
