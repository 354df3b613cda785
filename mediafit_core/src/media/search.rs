//! Greedy search for the exchange bounds consistent with an observed growth rate
//!
//! Exchange reactions measured in the media keep their measured uptake. Every other
//! non-essential exchange is closed in turn, and reopened when the network can no longer reach
//! the observed growth without it. Decisions are committed immediately, so later reactions are
//! tested against every earlier decision. A reaction is never revisited.
use derive_builder::Builder;
use indexmap::{IndexMap, IndexSet};
use log::{debug, info, warn};
use serde::Serialize;

use crate::configuration::Configuration;
use crate::media::bounds::{BoundAssignment, BoundPair};
use crate::media::oracle::{Oracle, OracleError, OracleSolution};

/// Order in which unassigned exchange reactions are visited
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchOrder {
    /// Order the network enumerates its exchange reactions in
    #[default]
    Natural,
    /// Reaction ids sorted lexicographically
    Sorted,
    /// Listed reactions first, in the given order, then the rest in natural order
    Explicit(Vec<String>),
}

impl SearchOrder {
    /// Arrange reaction ids (given in natural order) into visiting order
    pub fn arrange(&self, natural: &[String]) -> Vec<String> {
        match self {
            SearchOrder::Natural => natural.to_vec(),
            SearchOrder::Sorted => {
                let mut ids = natural.to_vec();
                ids.sort();
                ids
            }
            SearchOrder::Explicit(listed) => {
                let available: IndexSet<&String> = natural.iter().collect();
                let mut ids: IndexSet<String> = listed
                    .iter()
                    .filter(|id| available.contains(id))
                    .cloned()
                    .collect();
                ids.extend(natural.iter().cloned());
                ids.into_iter().collect()
            }
        }
    }
}

/// Settings of a single media search
#[derive(Builder, Clone, Debug, PartialEq)]
pub struct SearchSettings {
    /// Observed growth rate (h⁻¹) the media has to support
    pub experimental_growth: f64,
    /// Growth at or below this is treated as no growth
    #[builder(default = "Configuration::current().tolerance")]
    pub growth_tolerance: f64,
    #[builder(default)]
    pub order: SearchOrder,
    /// Magnitude of the unconstrained bounds
    #[builder(default = "Configuration::current().upper_bound")]
    pub default_bound: f64,
}

/// How the search resolved an exchange reaction
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
    /// Observed growth is reached with the reaction closed
    Closed,
    /// Closing the reaction left no growth
    ReopenedNoGrowth,
    /// Closing the reaction left growth below the observed growth
    ReopenedBelowObserved,
}

impl Resolution {
    pub fn is_reopened(&self) -> bool {
        !matches!(self, Resolution::Closed)
    }
}

/// Record of the decision made for one exchange reaction
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SearchStep {
    pub reaction_id: String,
    /// Growth with the reaction closed and every earlier decision applied
    pub closed_growth: f64,
    /// Whether the closed test had a solution at all
    pub closed_feasible: bool,
    pub resolution: Resolution,
    /// Growth after reopening, only recorded for reopened reactions
    pub reopened_growth: Option<f64>,
}

/// Final state of a media search
#[derive(Clone, Debug, PartialEq)]
pub struct SearchOutcome {
    /// Bounds of every non-essential exchange reaction
    pub bounds: BoundAssignment,
    /// One step per reaction that wasn't defined by the media, in visiting order
    pub steps: Vec<SearchStep>,
    /// Oracle answer with the complete assignment applied
    pub final_solution: OracleSolution,
}

impl SearchOutcome {
    pub fn final_growth(&self) -> f64 {
        self.final_solution.growth()
    }
}

/// Assign the measured uptake to every non-essential exchange reaction found in the media
///
/// The assignment follows the order of `exchange_ids`.
pub fn seed_bounds(
    exchange_ids: &[String],
    essential: &IndexSet<String>,
    uptakes: &IndexMap<String, f64>,
    default_bound: f64,
) -> BoundAssignment {
    let mut bounds = BoundAssignment::new();
    for id in exchange_ids {
        let Some(uptake) = uptakes.get(id) else {
            continue;
        };
        if essential.contains(id) {
            info!("{} is essential, its measured uptake is not applied", id);
            continue;
        }
        bounds.insert(id, BoundPair::defined(*uptake, default_bound));
    }
    bounds
}

/// Resolve the bounds of every non-essential exchange reaction
///
/// # Parameters
/// - oracle: Oracle to evaluate growth with, the assignment is applied on top of its baseline
/// - exchange_ids: Exchange reactions of the network, in natural order
/// - essential: Reactions which are never constrained
/// - uptakes: Measured uptake magnitude by exchange reaction id
/// - settings: Observed growth and numeric settings
pub fn search<O: Oracle + ?Sized>(
    oracle: &mut O,
    exchange_ids: &[String],
    essential: &IndexSet<String>,
    uptakes: &IndexMap<String, f64>,
    settings: &SearchSettings,
) -> Result<SearchOutcome, OracleError> {
    let default_bound = settings.default_bound;
    let mut bounds = seed_bounds(exchange_ids, essential, uptakes, default_bound);
    info!("Seeded {} exchange reactions from the media", bounds.len());

    let mut steps = Vec::new();
    for reaction_id in settings.order.arrange(exchange_ids) {
        if essential.contains(&reaction_id) || bounds.contains(&reaction_id) {
            continue;
        }
        bounds.insert(&reaction_id, BoundPair::closed(default_bound));
        let closed = oracle.optimize(&bounds)?;
        let closed_growth = closed.growth();
        let resolution = if closed_growth <= settings.growth_tolerance {
            Resolution::ReopenedNoGrowth
        } else if closed_growth < settings.experimental_growth {
            Resolution::ReopenedBelowObserved
        } else {
            Resolution::Closed
        };
        let reopened_growth = if resolution.is_reopened() {
            bounds.insert(&reaction_id, BoundPair::reopened(default_bound));
            Some(oracle.optimize(&bounds)?.growth())
        } else {
            None
        };
        debug!(
            "{}: growth {} when closed, {:?}",
            reaction_id, closed_growth, resolution
        );
        steps.push(SearchStep {
            reaction_id,
            closed_growth,
            closed_feasible: closed.is_feasible(),
            resolution,
            reopened_growth,
        });
    }

    let final_solution = oracle.optimize(&bounds)?;
    let final_growth = final_solution.growth();
    if final_growth <= settings.growth_tolerance {
        warn!("No growth with the inferred media, the measured media is insufficient");
    } else if final_growth < settings.experimental_growth {
        warn!(
            "Growth with the inferred media ({}) is below the observed growth ({})",
            final_growth, settings.experimental_growth
        );
    } else {
        info!("Growth with the inferred media: {}", final_growth);
    }
    Ok(SearchOutcome {
        bounds,
        steps,
        final_solution,
    })
}
