//! This module provides the Model struct for representing an entire metabolic model
use crate::configuration::Configuration;
use crate::metabolic_model::metabolite::Metabolite;
use crate::metabolic_model::reaction::Reaction;
use crate::optimize::objective::ObjectiveSense;
use crate::optimize::problem::{Problem, ProblemError};

use indexmap::IndexMap;
use thiserror::Error;

/// Represents a Genome Scale Metabolic Model
#[derive(Clone, Debug)]
pub struct Model {
    /// Map of reaction ids to Reaction Objects, in the order they were read
    pub reactions: IndexMap<String, Reaction>,
    /// Map of metabolite ids to Metabolite Objects
    pub metabolites: IndexMap<String, Metabolite>,
    /// Map of reaction ids to objective function coefficients
    pub objective: IndexMap<String, f64>,
    /// Id associated with the Model
    pub id: Option<String>,
    /// Compartments in the model
    ///
    /// An IndexMap<String, String> of {short name: long name}
    pub compartments: Option<IndexMap<String, String>>,
    /// A version identifier for the Model, stored as a string
    pub version: Option<String>,
}

impl Model {
    pub fn new_empty() -> Self {
        Model {
            reactions: IndexMap::new(),
            metabolites: IndexMap::new(),
            objective: IndexMap::new(),
            id: None,
            compartments: None,
            version: None,
        }
    }

    /// Add a reaction to the model
    ///
    /// # Parameters
    /// - reaction: Reaction to add
    ///
    /// # Examples
    /// ```rust
    /// use mediafit_core::metabolic_model::model::Model;
    /// use mediafit_core::metabolic_model::reaction::ReactionBuilder;
    /// let mut model = Model::new_empty();
    /// let new_reaction = ReactionBuilder::default()
    ///     .id("new_reaction".to_string())
    ///     .build()
    ///     .unwrap();
    /// model.add_reaction(new_reaction);
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

    /// Make a single reaction the (maximized) objective of the model
    pub fn set_objective(&mut self, reaction_id: &str) -> Result<(), ModelError> {
        if !self.reactions.contains_key(reaction_id) {
            return Err(ModelError::ReactionNotFound(reaction_id.to_string()));
        }
        self.objective.clear();
        self.objective.insert(reaction_id.to_string(), 1.);
        Ok(())
    }

    /// Update the flux bounds of a reaction
    pub fn update_reaction_bounds(
        &mut self,
        reaction_id: &str,
        lower_bound: f64,
        upper_bound: f64,
    ) -> Result<(), ModelError> {
        if lower_bound > upper_bound {
            return Err(ModelError::InvalidBounds {
                id: reaction_id.to_string(),
                lower_bound,
                upper_bound,
            });
        }
        match self.reactions.get_mut(reaction_id) {
            Some(rxn) => {
                rxn.lower_bound = lower_bound;
                rxn.upper_bound = upper_bound;
                Ok(())
            }
            None => Err(ModelError::ReactionNotFound(reaction_id.to_string())),
        }
    }

    // region Exchange Reactions
    /// Whether a reaction exchanges a metabolite with the environment
    ///
    /// A boundary reaction is an exchange when its metabolite sits in the extracellular
    /// compartment. Metabolites without a known compartment fall back to the `EX_` prefix
    /// convention. Objective reactions are never exchanges.
    pub fn is_exchange(&self, reaction: &Reaction) -> bool {
        if !reaction.is_boundary() || self.objective.contains_key(&reaction.id) {
            return false;
        }
        let compartment = Configuration::current().exchange_compartment;
        let metabolite = reaction
            .metabolites
            .keys()
            .next()
            .and_then(|met_id| self.metabolites.get(met_id));
        match metabolite {
            Some(met) if met.compartment.is_some() => met.in_compartment(&compartment),
            _ => reaction.id.starts_with("EX_"),
        }
    }

    /// Ids of the exchange reactions, in the model's reaction order
    pub fn exchange_ids(&self) -> Vec<String> {
        self.reactions
            .values()
            .filter(|rxn| self.is_exchange(rxn))
            .map(|rxn| rxn.id.clone())
            .collect()
    }

    /// Set every exchange reaction to the given bounds
    pub fn open_exchanges(&mut self, lower_bound: f64, upper_bound: f64) -> Result<(), ModelError> {
        for id in self.exchange_ids() {
            self.update_reaction_bounds(&id, lower_bound, upper_bound)?;
        }
        Ok(())
    }

    /// Display names of the metabolites taking part in a reaction
    ///
    /// Metabolites missing from the model are reported by id.
    pub fn reaction_metabolite_names(&self, reaction_id: &str) -> Result<Vec<String>, ModelError> {
        let reaction = self
            .reactions
            .get(reaction_id)
            .ok_or_else(|| ModelError::ReactionNotFound(reaction_id.to_string()))?;
        Ok(reaction
            .metabolites
            .keys()
            .map(|met_id| match self.metabolites.get(met_id) {
                Some(met) => met.display_name().to_string(),
                None => met_id.clone(),
            })
            .collect())
    }
    // endregion Exchange Reactions

    // region Optimization Problem
    /// Build the flux balance analysis problem for the model
    ///
    /// Every reaction is split into a non-negative forward and reverse variable, and every
    /// metabolite gets a steady state mass balance constraint. The objective maximizes the
    /// net flux through the objective reactions.
    pub fn build_problem(&self) -> Result<Problem, ProblemError> {
        let mut problem = Problem::new(ObjectiveSense::Maximize);
        let mut mass_balance: IndexMap<String, (Vec<String>, Vec<f64>)> = IndexMap::new();
        for rxn in self.reactions.values() {
            let bounds = rxn.directional_bounds();
            let forward_id = rxn.get_forward_id();
            let reverse_id = rxn.get_reverse_id();
            let (forward_lb, forward_ub) = bounds.forward;
            let (reverse_lb, reverse_ub) = bounds.reverse;
            problem.add_new_variable(&forward_id, rxn.name.as_deref(), forward_lb, forward_ub)?;
            problem.add_new_variable(&reverse_id, rxn.name.as_deref(), reverse_lb, reverse_ub)?;
            for (met_id, coef) in &rxn.metabolites {
                let (variables, coefficients) = mass_balance.entry(met_id.clone()).or_default();
                variables.push(forward_id.clone());
                coefficients.push(*coef);
                variables.push(reverse_id.clone());
                coefficients.push(-*coef);
            }
        }
        for (met_id, (variables, coefficients)) in &mass_balance {
            let variables: Vec<&str> = variables.iter().map(String::as_str).collect();
            problem.add_new_equality_constraint_by_id(met_id, &variables, coefficients, 0.)?;
        }
        for (rxn_id, coef) in &self.objective {
            let rxn = self
                .reactions
                .get(rxn_id)
                .ok_or(ProblemError::NonExistentVariablesInObjective)?;
            problem.add_new_linear_objective_term_by_id(&rxn.get_forward_id(), *coef)?;
            problem.add_new_linear_objective_term_by_id(&rxn.get_reverse_id(), -*coef)?;
        }
        Ok(problem)
    }
    // endregion Optimization Problem
}

/// Errors associated with the Model
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    /// Tried to access a reaction which isn't in the model
    #[error("Reaction {0} is not present in the model")]
    ReactionNotFound(String),
    /// Tried to set bounds with lower_bound > upper_bound
    #[error("Invalid bounds for {id}: lower bound {lower_bound} > upper bound {upper_bound}")]
    InvalidBounds {
        id: String,
        lower_bound: f64,
        upper_bound: f64,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metabolic_model::metabolite::MetaboliteBuilder;
    use crate::metabolic_model::reaction::ReactionBuilder;

    fn metabolite(id: &str, name: Option<&str>, compartment: Option<&str>) -> Metabolite {
        MetaboliteBuilder::default()
            .id(id.to_string())
            .name(name.map(str::to_string))
            .compartment(compartment.map(str::to_string))
            .build()
            .unwrap()
    }

    fn reaction(
        id: &str,
        metabolites: &[(&str, f64)],
        lower_bound: f64,
        upper_bound: f64,
    ) -> Reaction {
        ReactionBuilder::default()
            .id(id.to_string())
            .metabolites(
                metabolites
                    .iter()
                    .map(|(m, c)| (m.to_string(), *c))
                    .collect(),
            )
            .lower_bound(lower_bound)
            .upper_bound(upper_bound)
            .build()
            .unwrap()
    }

    fn setup_model() -> Model {
        let mut model = Model::new_empty();
        model.add_metabolite(metabolite("glc__D_e", Some("D-Glucose"), Some("e")));
        model.add_metabolite(metabolite("glc__D_c", Some("D-Glucose"), Some("c")));
        model.add_metabolite(metabolite("atp_c", None, Some("c")));
        model.add_reaction(reaction("GLCt", &[("glc__D_e", -1.), ("glc__D_c", 1.)], 0., 10.));
        model.add_reaction(reaction("EX_glc__D_e", &[("glc__D_e", -1.)], -10., 1000.));
        // Sink in the cytosol, boundary but not an exchange
        model.add_reaction(reaction("DM_atp_c", &[("atp_c", -1.)], 0., 1000.));
        // Metabolite without compartment information, falls back to the prefix
        model.add_reaction(reaction("EX_unknown", &[("unknown_met", -1.)], -1000., 1000.));
        model.add_reaction(reaction("GLC_consume", &[("glc__D_c", -1.)], 0., 1000.));
        model
    }

    #[test]
    fn exchange_ids() {
        let model = setup_model();
        assert_eq!(model.exchange_ids(), vec!["EX_glc__D_e", "EX_unknown"]);
    }

    #[test]
    fn objective_is_not_an_exchange() {
        let mut model = setup_model();
        // Single extracellular metabolite, so a boundary reaction in the e compartment
        model.add_reaction(reaction("BIOMASS", &[("glc__D_e", -1.)], 0., 1000.));
        model.set_objective("BIOMASS").unwrap();
        assert_eq!(model.exchange_ids(), vec!["EX_glc__D_e", "EX_unknown"]);

        model.open_exchanges(-1000., 1000.).unwrap();
        assert!((model.reactions["BIOMASS"].lower_bound - 0.).abs() < 1e-25);
    }

    #[test]
    fn set_objective() {
        let mut model = setup_model();
        model.set_objective("GLC_consume").unwrap();
        assert_eq!(model.objective.len(), 1);
        assert!((model.objective["GLC_consume"] - 1.).abs() < 1e-25);

        let err = model.set_objective("BIOMASS").unwrap_err();
        assert_eq!(err, ModelError::ReactionNotFound("BIOMASS".to_string()));
        // A failed update leaves the objective alone
        assert!(model.objective.contains_key("GLC_consume"));
    }

    #[test]
    fn update_bounds() {
        let mut model = setup_model();
        model.update_reaction_bounds("EX_glc__D_e", -2., 1000.).unwrap();
        assert!((model.reactions["EX_glc__D_e"].lower_bound + 2.).abs() < 1e-25);

        if let Err(ModelError::InvalidBounds { .. }) =
            model.update_reaction_bounds("EX_glc__D_e", 5., 1.)
        {
        } else {
            panic!("Invalid bounds not caught")
        }
        assert!(model.update_reaction_bounds("missing", 0., 1.).is_err());
    }

    #[test]
    fn open_exchanges() {
        let mut model = setup_model();
        model.open_exchanges(-1000., 1000.).unwrap();
        assert!((model.reactions["EX_glc__D_e"].lower_bound + 1000.).abs() < 1e-25);
        // Non exchange reactions are left alone
        assert!((model.reactions["DM_atp_c"].lower_bound - 0.).abs() < 1e-25);
        assert!((model.reactions["GLCt"].upper_bound - 10.).abs() < 1e-25);
    }

    #[test]
    fn metabolite_names() {
        let model = setup_model();
        assert_eq!(
            model.reaction_metabolite_names("EX_glc__D_e").unwrap(),
            vec!["D-Glucose"]
        );
        assert_eq!(
            model.reaction_metabolite_names("DM_atp_c").unwrap(),
            vec!["atp_c"]
        );
        assert_eq!(
            model.reaction_metabolite_names("EX_unknown").unwrap(),
            vec!["unknown_met"]
        );
        assert!(model.reaction_metabolite_names("missing").is_err());
    }

    #[test]
    fn build_problem() {
        let mut model = setup_model();
        model.set_objective("GLC_consume").unwrap();
        let problem = model.build_problem().unwrap();
        // Two variables per reaction
        assert_eq!(problem.num_variables(), 10);
        // One mass balance per metabolite used by a reaction
        assert_eq!(problem.num_constraints(), 4);
        assert_eq!(problem.objective().terms().len(), 2);
        let reverse = problem
            .get_variable(&model.reactions["EX_glc__D_e"].get_reverse_id())
            .unwrap();
        assert!((reverse.upper_bound - 10.).abs() < 1e-25);
    }
}
