//! Core of mediafit, a crate for inferring the media conditions of a genome scale metabolic
//! model from a partially measured media and an observed growth rate.

pub mod configuration;
pub mod io;
pub mod media;
pub mod metabolic_model;
pub mod optimize;
mod utils;
