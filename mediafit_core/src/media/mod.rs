//! Inference of the media conditions consistent with an observed growth rate
//!
//! The inference runs in three stages:
//! 1. [`essential::compute_essential`] finds the exchange reactions the network can't grow
//!    without. These are never constrained.
//! 2. [`search::search`] seeds the measured uptakes and decides, reaction by reaction, whether
//!    every other exchange can be closed or has to be reopened to reach the observed growth.
//! 3. [`classify::classify`] partitions the final bounds for reporting.
//!
//! Growth is evaluated by an [`oracle::Oracle`]. [`infer_media`] uses flux balance analysis
//! solved with Clarabel, [`infer_media_with`] accepts any oracle.
pub mod bounds;
pub mod classify;
pub mod essential;
pub mod oracle;
pub mod search;

use indexmap::IndexMap;
use log::info;
use serde::Serialize;
use thiserror::Error;

use crate::io::media_table::MediaTable;
use crate::media::bounds::BoundAssignment;
use crate::media::classify::{classify, doubling_time, ClassCounts, Classification};
use crate::media::essential::compute_essential;
use crate::media::oracle::{FbaOracle, Oracle, OracleError};
use crate::media::search::{search, SearchSettings, SearchStep};
use crate::metabolic_model::model::Model;
use crate::optimize::OptimizationStatus;

/// Outcome of a media inference, ready for serialization
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MediaResult {
    /// Id of the reaction whose flux is the growth rate
    pub objective: String,
    pub experimental_growth: f64,
    /// Growth with the inferred media applied
    pub final_growth: f64,
    pub final_status: OptimizationStatus,
    /// Reciprocal of the final growth, None without growth
    pub doubling_time: Option<f64>,
    /// Bounds of every non-essential exchange reaction
    pub bounds: BoundAssignment,
    #[serde(flatten)]
    pub classification: Classification,
    pub counts: ClassCounts,
    pub essential: Vec<String>,
    /// Media reaction ids which aren't exchange reactions of the model
    pub unmatched_media: Vec<String>,
    /// Metabolite names of the defined and reopened reactions
    pub metabolite_names: IndexMap<String, Vec<String>>,
    /// Net flux of every exchange reaction in the final solution
    pub exchange_fluxes: IndexMap<String, f64>,
    pub steps: Vec<SearchStep>,
}

/// Infer the media of `model` using flux balance analysis
///
/// # Parameters
/// - model: Network to infer the media for, it isn't modified
/// - biomass_id: Id of the reaction whose flux is the growth rate
/// - media: Measured media
/// - settings: Observed growth and search settings
///
/// # Returns
/// The inferred bounds, their classification and the growth they support
pub fn infer_media(
    model: &Model,
    biomass_id: &str,
    media: &MediaTable,
    settings: &SearchSettings,
) -> Result<MediaResult, MediaError> {
    let exchange_ids = validate(model, biomass_id, settings)?;
    let mut oracle = FbaOracle::with_clarabel(model, biomass_id, settings.default_bound)?;
    run_inference(&mut oracle, model, &exchange_ids, biomass_id, media, settings)
}

/// Infer the media of `model`, evaluating growth with `oracle`
///
/// The oracle must evaluate the same network, with every exchange reaction open to
/// `±settings.default_bound` at its baseline.
pub fn infer_media_with<O: Oracle + ?Sized>(
    oracle: &mut O,
    model: &Model,
    biomass_id: &str,
    media: &MediaTable,
    settings: &SearchSettings,
) -> Result<MediaResult, MediaError> {
    let exchange_ids = validate(model, biomass_id, settings)?;
    run_inference(oracle, model, &exchange_ids, biomass_id, media, settings)
}

fn run_inference<O: Oracle + ?Sized>(
    oracle: &mut O,
    model: &Model,
    exchange_ids: &[String],
    biomass_id: &str,
    media: &MediaTable,
    settings: &SearchSettings,
) -> Result<MediaResult, MediaError> {
    let matched = media.match_against(exchange_ids);
    if !matched.unmatched.is_empty() {
        info!(
            "{} media entries don't match an exchange reaction",
            matched.unmatched.len()
        );
    }

    let essential = compute_essential(oracle, exchange_ids, settings.growth_tolerance)?;
    let outcome = search(oracle, exchange_ids, &essential, &matched.uptakes, settings)?;

    let classification = classify(&outcome.bounds, settings.default_bound);
    let final_growth = outcome.final_growth();
    let exchange_fluxes = exchange_ids
        .iter()
        .filter_map(|id| outcome.final_solution.flux_of(id).map(|flux| (id.clone(), flux)))
        .collect();
    Ok(MediaResult {
        objective: biomass_id.to_string(),
        experimental_growth: settings.experimental_growth,
        final_growth,
        final_status: outcome.final_solution.status,
        doubling_time: doubling_time(final_growth),
        counts: classification.counts(),
        metabolite_names: classification.metabolite_names(model),
        classification,
        bounds: outcome.bounds,
        essential: essential.into_iter().collect(),
        unmatched_media: matched.unmatched,
        exchange_fluxes,
        steps: outcome.steps,
    })
}

/// Reject inputs no search can be run on, returning the exchange reactions to search over
///
/// The biomass reaction is left out even when it looks like an exchange.
fn validate(
    model: &Model,
    biomass_id: &str,
    settings: &SearchSettings,
) -> Result<Vec<String>, MediaError> {
    if model.reactions.is_empty() {
        return Err(MediaError::EmptyNetwork);
    }
    if !model.reactions.contains_key(biomass_id) {
        return Err(MediaError::MissingObjective(biomass_id.to_string()));
    }
    let exchange_ids: Vec<String> = model
        .exchange_ids()
        .into_iter()
        .filter(|id| id != biomass_id)
        .collect();
    if exchange_ids.is_empty() {
        return Err(MediaError::NoExchangeReactions);
    }
    if !settings.experimental_growth.is_finite() || settings.experimental_growth < 0. {
        return Err(MediaError::InvalidGrowth(settings.experimental_growth));
    }
    if !settings.growth_tolerance.is_finite() || settings.growth_tolerance < 0. {
        return Err(MediaError::InvalidSettings(format!(
            "growth tolerance must be finite and non-negative, got {}",
            settings.growth_tolerance
        )));
    }
    if !settings.default_bound.is_finite() || settings.default_bound <= 0. {
        return Err(MediaError::InvalidSettings(format!(
            "default bound must be finite and positive, got {}",
            settings.default_bound
        )));
    }
    Ok(exchange_ids)
}

/// Errors raised while inferring media
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MediaError {
    #[error("The network has no reactions")]
    EmptyNetwork,
    #[error("Objective reaction {0} is not in the network")]
    MissingObjective(String),
    #[error("The network has no exchange reactions")]
    NoExchangeReactions,
    #[error("Experimental growth must be finite and non-negative, got {0}")]
    InvalidGrowth(f64),
    #[error("Invalid search settings: {0}")]
    InvalidSettings(String),
    #[error("Oracle error: {0}")]
    Oracle(#[from] OracleError),
}
