//! The optimization oracle consulted by the media search
//!
//! An oracle answers "what is the optimal growth with these exchange bounds applied?". The
//! bounds are handed over as an explicit [`BoundAssignment`] on every call, so the search
//! never mutates a shared model and can be driven by a fake oracle in tests.
use indexmap::IndexMap;
use log::warn;
use serde::Serialize;
use thiserror::Error;

use crate::media::bounds::BoundAssignment;
use crate::metabolic_model::model::{Model, ModelError};
use crate::metabolic_model::reaction::DirectionalBounds;
use crate::optimize::problem::{Problem, ProblemError};
use crate::optimize::solvers::clarabel::ClarabelSolver;
use crate::optimize::solvers::{LinearSolver, SolverError};
use crate::optimize::OptimizationStatus;

/// Answer of the oracle for one bound assignment
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct OracleSolution {
    /// Status of the optimization
    pub status: OptimizationStatus,
    /// Optimal objective value, None if the problem couldn't be solved
    pub objective_value: Option<f64>,
    /// Net flux of every reaction at the optimum, when the oracle provides them
    #[serde(skip)]
    pub fluxes: Option<IndexMap<String, f64>>,
}

impl OracleSolution {
    /// Optimal solution without flux values
    pub fn optimal(objective_value: f64) -> Self {
        OracleSolution {
            status: OptimizationStatus::Optimal,
            objective_value: Some(objective_value),
            fluxes: None,
        }
    }

    pub fn infeasible() -> Self {
        OracleSolution {
            status: OptimizationStatus::Infeasible,
            objective_value: None,
            fluxes: None,
        }
    }

    /// Growth used for decisions, anything without a solution counts as no growth
    pub fn growth(&self) -> f64 {
        match (self.status.has_solution(), self.objective_value) {
            (true, Some(value)) => value,
            _ => 0.,
        }
    }

    pub fn is_feasible(&self) -> bool {
        self.status.has_solution()
    }

    /// Net flux through a reaction
    pub fn flux_of(&self, reaction_id: &str) -> Option<f64> {
        self.fluxes.as_ref()?.get(reaction_id).copied()
    }
}

/// Something that can optimize the objective of a network under a bound assignment
pub trait Oracle {
    /// Optimize with `bounds` applied on top of the oracle's baseline bounds
    fn optimize(&mut self, bounds: &BoundAssignment) -> Result<OracleSolution, OracleError>;
}

/// Flux balance analysis oracle over a private copy of a model
///
/// On construction every exchange reaction is opened to `±default_bound`, which is the
/// baseline each bound assignment is applied to. The objective reaction is never opened.
#[derive(Clone, Debug)]
pub struct FbaOracle<S: LinearSolver = ClarabelSolver> {
    model: Model,
    problem: Problem,
    solver: S,
    /// Reactions whose variable bounds differ from the baseline after the last call
    touched: Vec<String>,
}

impl FbaOracle<ClarabelSolver> {
    /// FBA oracle using the default Clarabel solver
    pub fn with_clarabel(
        model: &Model,
        objective_reaction: &str,
        default_bound: f64,
    ) -> Result<Self, OracleError> {
        FbaOracle::new(model, objective_reaction, default_bound, ClarabelSolver::default())
    }
}

impl<S: LinearSolver> FbaOracle<S> {
    pub fn new(
        model: &Model,
        objective_reaction: &str,
        default_bound: f64,
        solver: S,
    ) -> Result<Self, OracleError> {
        let mut model = model.clone();
        model.set_objective(objective_reaction)?;
        model.open_exchanges(-default_bound, default_bound)?;
        let problem = model.build_problem()?;
        Ok(FbaOracle {
            model,
            problem,
            solver,
            touched: Vec::new(),
        })
    }

    /// The oracle's copy of the model, with the baseline bounds
    pub fn model(&self) -> &Model {
        &self.model
    }

    fn set_reaction_bounds(
        &mut self,
        reaction_id: &str,
        bounds: DirectionalBounds,
    ) -> Result<(), OracleError> {
        let rxn = self
            .model
            .reactions
            .get(reaction_id)
            .ok_or_else(|| OracleError::UnknownReaction(reaction_id.to_string()))?;
        self.problem
            .update_variable_bounds(&rxn.get_forward_id(), bounds.forward.0, bounds.forward.1)?;
        self.problem
            .update_variable_bounds(&rxn.get_reverse_id(), bounds.reverse.0, bounds.reverse.1)?;
        Ok(())
    }

    fn restore_baseline(&mut self) -> Result<(), OracleError> {
        for reaction_id in std::mem::take(&mut self.touched) {
            let baseline = match self.model.reactions.get(&reaction_id) {
                Some(rxn) => rxn.directional_bounds(),
                None => continue,
            };
            self.set_reaction_bounds(&reaction_id, baseline)?;
        }
        Ok(())
    }

    fn net_fluxes(&self, variable_values: &IndexMap<String, f64>) -> IndexMap<String, f64> {
        self.model
            .reactions
            .values()
            .map(|rxn| {
                let forward = variable_values.get(&rxn.get_forward_id()).copied().unwrap_or(0.);
                let reverse = variable_values.get(&rxn.get_reverse_id()).copied().unwrap_or(0.);
                (rxn.id.clone(), forward - reverse)
            })
            .collect()
    }
}

impl<S: LinearSolver> Oracle for FbaOracle<S> {
    fn optimize(&mut self, bounds: &BoundAssignment) -> Result<OracleSolution, OracleError> {
        self.restore_baseline()?;
        for (reaction_id, pair) in bounds.iter() {
            if pair.lower > pair.upper {
                return Err(OracleError::InvalidBounds(reaction_id.clone()));
            }
            self.touched.push(reaction_id.clone());
            self.set_reaction_bounds(
                reaction_id,
                DirectionalBounds::from_flux_bounds(pair.lower, pair.upper),
            )?;
        }
        let solution = self.problem.solve(&self.solver)?;
        if !solution.status.has_solution() {
            warn!(
                "Optimization ended with status {:?}, treating it as no growth",
                solution.status
            );
        }
        let fluxes = solution
            .variable_values
            .as_ref()
            .map(|values| self.net_fluxes(values));
        Ok(OracleSolution {
            status: solution.status,
            objective_value: solution.objective_value,
            fluxes,
        })
    }
}

/// Errors raised by an oracle
///
/// Infeasibility is not an error, it is reported through [`OracleSolution::status`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OracleError {
    #[error("Model error: {0}")]
    Model(#[from] ModelError),
    #[error("Problem error: {0}")]
    Problem(#[from] ProblemError),
    #[error("Solver error: {0}")]
    Solver(#[from] SolverError),
    /// The bound assignment names a reaction the network doesn't have
    #[error("Reaction {0} is not in the network")]
    UnknownReaction(String),
    /// The bound assignment has lower > upper for a reaction
    #[error("Invalid bounds assigned to {0}")]
    InvalidBounds(String),
}
