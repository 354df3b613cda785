//! Classify which exchange reactions the network can't grow without
use indexmap::IndexSet;
use log::{debug, info, warn};

use crate::media::bounds::{BoundAssignment, BoundPair};
use crate::media::oracle::{Oracle, OracleError};

/// Find the exchange reactions whose blocking alone eliminates growth
///
/// Each reaction in `exchange_ids` is blocked on its own while every other exchange keeps the
/// oracle's baseline (fully open) bounds. Growth at or below `tolerance` counts as no growth.
/// An infeasible test counts as no growth, so the reaction is reported as essential.
///
/// If the open network itself can't grow no reaction can be singled out, so the essential set
/// is empty.
pub fn compute_essential<O: Oracle + ?Sized>(
    oracle: &mut O,
    exchange_ids: &[String],
    tolerance: f64,
) -> Result<IndexSet<String>, OracleError> {
    let mut essential = IndexSet::new();
    let baseline = oracle.optimize(&BoundAssignment::new())?;
    if baseline.growth() <= tolerance {
        warn!(
            "The network can't grow with every exchange open (growth {}), no reaction is essential",
            baseline.growth()
        );
        return Ok(essential);
    }
    for reaction_id in exchange_ids {
        let blocked = BoundAssignment::single(reaction_id, BoundPair::blocked());
        let solution = oracle.optimize(&blocked)?;
        if !solution.is_feasible() {
            warn!(
                "Blocking {} made the problem {:?}, counting it as essential",
                reaction_id, solution.status
            );
        }
        if solution.growth() <= tolerance {
            debug!("{} is essential", reaction_id);
            essential.insert(reaction_id.clone());
        }
    }
    info!(
        "Found {} essential exchange reactions out of {}",
        essential.len(),
        exchange_ids.len()
    );
    Ok(essential)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::oracle::{FbaOracle, OracleSolution};
    use crate::metabolic_model::model::Model;
    use std::path::PathBuf;

    /// Oracle that grows unless one of its required reactions has no uptake
    struct RequiresUptake {
        required: Vec<&'static str>,
        infeasible_when_blocked: Vec<&'static str>,
        calls: usize,
    }

    impl Oracle for RequiresUptake {
        fn optimize(&mut self, bounds: &BoundAssignment) -> Result<OracleSolution, OracleError> {
            self.calls += 1;
            for (id, pair) in bounds.iter() {
                if pair.lower >= 0. && self.infeasible_when_blocked.contains(&id.as_str()) {
                    return Ok(OracleSolution::infeasible());
                }
                if pair.lower >= 0. && self.required.contains(&id.as_str()) {
                    return Ok(OracleSolution::optimal(0.));
                }
            }
            Ok(OracleSolution::optimal(1.))
        }
    }

    fn exchange_ids() -> Vec<String> {
        ["EX_a", "EX_b", "EX_c", "EX_d"].map(String::from).to_vec()
    }

    #[test]
    fn single_pass() {
        let mut oracle = RequiresUptake {
            required: vec!["EX_b"],
            infeasible_when_blocked: vec!["EX_d"],
            calls: 0,
        };
        let essential = compute_essential(&mut oracle, &exchange_ids(), 1e-7).unwrap();
        assert_eq!(essential.into_iter().collect::<Vec<_>>(), vec!["EX_b", "EX_d"]);
        // Baseline plus one test per reaction
        assert_eq!(oracle.calls, 5);
    }

    #[test]
    fn tolerance_absorbs_noise() {
        struct Noisy;
        impl Oracle for Noisy {
            fn optimize(
                &mut self,
                bounds: &BoundAssignment,
            ) -> Result<OracleSolution, OracleError> {
                if bounds.is_empty() {
                    Ok(OracleSolution::optimal(1.))
                } else {
                    Ok(OracleSolution::optimal(1e-9))
                }
            }
        }
        let ids = vec!["EX_a".to_string()];
        assert_eq!(compute_essential(&mut Noisy, &ids, 1e-7).unwrap().len(), 1);
        assert!(compute_essential(&mut Noisy, &ids, 0.).unwrap().is_empty());
    }

    #[test]
    fn no_baseline_growth() {
        let mut oracle = RequiresUptake {
            required: vec![],
            infeasible_when_blocked: vec![],
            calls: 0,
        };
        let ids = exchange_ids();
        // Growth of 1 is below this tolerance, so nothing is tested
        let essential = compute_essential(&mut oracle, &ids, 2.).unwrap();
        assert!(essential.is_empty());
        assert_eq!(oracle.calls, 1);
    }

    #[test]
    fn toy_network() {
        let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("test_data")
            .join("test_models")
            .join("toy_network.json");
        let model = Model::read_json(path).unwrap();
        let mut oracle = FbaOracle::with_clarabel(&model, "BIOMASS", 1000.).unwrap();
        let ids = model.exchange_ids();
        let essential = compute_essential(&mut oracle, &ids, 1e-6).unwrap();
        assert_eq!(
            essential.into_iter().collect::<Vec<_>>(),
            vec!["EX_nh4_e", "EX_o2_e"]
        );
    }
}
