//! Split the reactions of a model into biomass, core and non-core reactions
use indexmap::IndexSet;
use thiserror::Error;

use crate::metabolic_model::model::Model;

/// Role of a reaction in a LumpGEM run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReactionRole {
    /// Produces a biomass building block
    Biomass,
    /// Member of a core subsystem, always retained
    Core,
    /// Candidate for removal by lumping
    NonCore,
}

/// Partition of the reactions of a model
///
/// Every reaction of the model belongs to exactly one of `biomass`, `core` and
/// `non_core`. A reaction both designated as biomass and listed in a core
/// subsystem is a biomass reaction.
#[derive(Debug, Clone, PartialEq)]
pub struct ReactionPartition {
    /// Reactions producing biomass building blocks (Rbbb)
    pub biomass: IndexSet<String>,
    /// Reactions of the core subsystems (Rcore)
    pub core: IndexSet<String>,
    /// All remaining reactions (Rncore)
    pub non_core: IndexSet<String>,
    /// Metabolites taking part in a core reaction (Mcore)
    pub core_metabolites: IndexSet<String>,
}

impl ReactionPartition {
    /// Partition the reactions of `model`
    ///
    /// # Parameters
    /// - `model`: Model whose reactions are partitioned
    /// - `biomass_rxns`: Ids of the biomass reactions
    /// - `core_subsystems`: Groups of reaction ids forming the core network
    ///
    /// # Examples
    /// ```rust
    /// use lumpgem_core::lumpgem::partition::ReactionPartition;
    /// use lumpgem_core::metabolic_model::model::Model;
    /// use lumpgem_core::metabolic_model::reaction::ReactionBuilder;
    /// let mut model = Model::new_empty();
    /// for id in ["R1", "R2", "B1"] {
    ///     model.add_reaction(ReactionBuilder::default().id(id.to_string()).build().unwrap());
    /// }
    /// let partition = ReactionPartition::new(
    ///     &model,
    ///     &["B1".to_string()],
    ///     &[vec!["R1".to_string()]],
    /// ).unwrap();
    /// assert!(partition.non_core.contains("R2"));
    /// ```
    pub fn new(
        model: &Model,
        biomass_rxns: &[String],
        core_subsystems: &[Vec<String>],
    ) -> Result<Self, PartitionError> {
        if model.reactions.is_empty() {
            return Err(PartitionError::NoReactions);
        }
        for id in biomass_rxns.iter().chain(core_subsystems.iter().flatten()) {
            if !model.reactions.contains_key(id) {
                return Err(PartitionError::UnknownReaction(id.clone()));
            }
        }

        let biomass: IndexSet<String> = model
            .reactions
            .keys()
            .filter(|id| biomass_rxns.contains(id))
            .cloned()
            .collect();

        let mut core = IndexSet::new();
        for id in core_subsystems.iter().flatten() {
            if biomass.contains(id) {
                log::warn!(
                    "Reaction {} is both a biomass reaction and in a core subsystem, treating it as biomass",
                    id
                );
                continue;
            }
            core.insert(id.clone());
        }

        let core_metabolites = core
            .iter()
            .flat_map(|id| model.reactions[id].metabolites.keys().cloned())
            .collect();

        let non_core = model
            .reactions
            .keys()
            .filter(|id| !biomass.contains(*id) && !core.contains(*id))
            .cloned()
            .collect::<IndexSet<_>>();

        log::info!(
            "Partitioned {} reactions into {} biomass, {} core and {} non-core reactions",
            model.reactions.len(),
            biomass.len(),
            core.len(),
            non_core.len()
        );
        Ok(ReactionPartition {
            biomass,
            core,
            non_core,
            core_metabolites,
        })
    }

    /// Role of a reaction, None if the reaction was not partitioned
    pub fn role(&self, reaction_id: &str) -> Option<ReactionRole> {
        if self.biomass.contains(reaction_id) {
            Some(ReactionRole::Biomass)
        } else if self.core.contains(reaction_id) {
            Some(ReactionRole::Core)
        } else if self.non_core.contains(reaction_id) {
            Some(ReactionRole::NonCore)
        } else {
            None
        }
    }

    /// Total number of partitioned reactions
    pub fn len(&self) -> usize {
        self.biomass.len() + self.core.len() + self.non_core.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Errors associated with partitioning a model
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PartitionError {
    /// The model has no reactions to partition
    #[error("The model has no reactions")]
    NoReactions,
    /// A biomass or core reaction id is not in the model
    #[error("Reaction {0} is not in the model")]
    UnknownReaction(String),
}
