//! Process wide defaults for reaction bounds, solver tolerance, and exchange detection
use std::sync::{LazyLock, RwLock};

pub static CONFIGURATION: LazyLock<RwLock<Configuration>> =
    LazyLock::new(|| RwLock::new(Configuration::default()));

/// Default values used when building reactions, solvers, and bound assignments
#[derive(Clone, Debug)]
pub struct Configuration {
    /// Default lower bound of a reaction, also the uptake limit of a reopened exchange
    pub lower_bound: f64,
    /// Default upper bound of a reaction
    pub upper_bound: f64,
    /// Solver tolerance, also used to decide whether a growth rate is effectively zero
    pub tolerance: f64,
    /// Id of the extracellular compartment, boundary reactions of metabolites in this
    /// compartment are exchange reactions
    pub exchange_compartment: String,
}

impl Default for Configuration {
    fn default() -> Self {
        Configuration {
            lower_bound: -1000.,
            upper_bound: 1000.,
            tolerance: 1e-07,
            exchange_compartment: "e".to_string(),
        }
    }
}

impl Configuration {
    /// Snapshot of the current global configuration
    ///
    /// A poisoned lock still holds a usable configuration, so it is read through.
    pub fn current() -> Configuration {
        match CONFIGURATION.read() {
            Ok(config) => config.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Configuration::default();
        assert!((config.lower_bound + 1000.).abs() < 1e-25);
        assert!((config.upper_bound - 1000.).abs() < 1e-25);
        assert_eq!(config.exchange_compartment, "e");
    }

    #[test]
    fn current_matches_global() {
        let config = Configuration::current();
        assert!(config.tolerance > 0.);
        assert!(config.lower_bound < config.upper_bound);
    }
}
