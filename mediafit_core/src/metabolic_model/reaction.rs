//! This module provides a struct for representing reactions
use crate::configuration::Configuration;
use crate::utils::hashing::hash_as_hex_string;
use derive_builder::Builder;
use indexmap::IndexMap;

/// Represents a reaction in the metabolic model
#[derive(Builder, Debug, Clone)]
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
    #[builder(default = "Configuration::current().lower_bound")]
    pub lower_bound: f64,
    /// Upper flux bound
    #[builder(default = "Configuration::current().upper_bound")]
    pub upper_bound: f64,
    /// Reaction subsystem
    #[builder(default = "None")]
    pub subsystem: Option<String>,
    /// Gene reaction rule, kept as written in the model file
    #[builder(default = "None")]
    pub gene_reaction_rule: Option<String>,
    /// Notes about the reaction
    #[builder(default = "None")]
    pub notes: Option<String>,
    /// Reaction Annotations
    #[builder(default = "None")]
    pub annotation: Option<String>,
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

    /// A boundary reaction has a single metabolite, and so moves it into or out of the system
    pub fn is_boundary(&self) -> bool {
        self.metabolites.len() == 1
    }

    /// Bounds of the forward and reverse variables for the reaction's current flux bounds
    pub fn directional_bounds(&self) -> DirectionalBounds {
        DirectionalBounds::from_flux_bounds(self.lower_bound, self.upper_bound)
    }
}

/// Bounds on the two non-negative solver variables a reaction is split into
///
/// The flux through the reaction is `forward - reverse`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DirectionalBounds {
    /// (lower, upper) bounds of the forward variable
    pub forward: (f64, f64),
    /// (lower, upper) bounds of the reverse variable
    pub reverse: (f64, f64),
}

impl DirectionalBounds {
    /// Split flux bounds into forward and reverse variable bounds
    pub fn from_flux_bounds(lower_bound: f64, upper_bound: f64) -> Self {
        DirectionalBounds {
            forward: (lower_bound.max(0.), upper_bound.max(0.)),
            reverse: ((-upper_bound).max(0.), (-lower_bound).max(0.)),
        }
    }
}
