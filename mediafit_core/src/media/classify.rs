//! Partition a bound assignment into defined, closed and reopened exchange reactions
use indexmap::IndexMap;
use serde::Serialize;

use crate::media::bounds::{BoundAssignment, BoundPair};
use crate::metabolic_model::model::Model;

/// Exchange reactions by kind of bound, each in assignment order
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Classification {
    /// Reactions limited to a measured uptake
    pub defined: Vec<String>,
    /// Reactions with no uptake
    pub closed: Vec<String>,
    /// Reactions with unconstrained uptake
    pub reopened: Vec<String>,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ClassCounts {
    pub defined: usize,
    pub closed: usize,
    pub reopened: usize,
}

/// Partition the assignment by bound pair identity
///
/// The canonical reopened pair is `reopened`, the canonical closed pair is `closed`, and every
/// other pair counts as `defined`. A measured uptake of zero has the closed pair, so it is
/// reported as closed.
pub fn classify(bounds: &BoundAssignment, default_bound: f64) -> Classification {
    let closed_pair = BoundPair::closed(default_bound);
    let reopened_pair = BoundPair::reopened(default_bound);
    let mut classification = Classification::default();
    for (id, pair) in bounds.iter() {
        if *pair == reopened_pair {
            classification.reopened.push(id.clone());
        } else if *pair == closed_pair {
            classification.closed.push(id.clone());
        } else {
            classification.defined.push(id.clone());
        }
    }
    classification
}

impl Classification {
    pub fn counts(&self) -> ClassCounts {
        ClassCounts {
            defined: self.defined.len(),
            closed: self.closed.len(),
            reopened: self.reopened.len(),
        }
    }

    /// Metabolite display names of the defined and reopened reactions
    ///
    /// Reactions unknown to the model are left out.
    pub fn metabolite_names(&self, model: &Model) -> IndexMap<String, Vec<String>> {
        self.defined
            .iter()
            .chain(self.reopened.iter())
            .filter_map(|id| {
                model
                    .reaction_metabolite_names(id)
                    .ok()
                    .map(|names| (id.clone(), names))
            })
            .collect()
    }
}

/// Doubling time for a growth rate, undefined without positive growth
pub fn doubling_time(growth: f64) -> Option<f64> {
    if growth > 0. {
        Some(1. / growth)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metabolic_model::metabolite::MetaboliteBuilder;
    use crate::metabolic_model::reaction::ReactionBuilder;

    fn assignment() -> BoundAssignment {
        let mut bounds = BoundAssignment::new();
        bounds.insert("EX_glc", BoundPair::defined(2., 1000.));
        bounds.insert("EX_ac", BoundPair::closed(1000.));
        bounds.insert("EX_fe", BoundPair::reopened(1000.));
        bounds.insert("EX_zero", BoundPair::defined(0., 1000.));
        bounds.insert("EX_o2", BoundPair::closed(1000.));
        bounds
    }

    #[test]
    fn partition() {
        let bounds = assignment();
        let classification = classify(&bounds, 1000.);
        assert_eq!(classification.defined, vec!["EX_glc"]);
        assert_eq!(classification.closed, vec!["EX_ac", "EX_zero", "EX_o2"]);
        assert_eq!(classification.reopened, vec!["EX_fe"]);
        assert_eq!(
            classification.counts(),
            ClassCounts {
                defined: 1,
                closed: 3,
                reopened: 1
            }
        );
        let total = classification.defined.len()
            + classification.closed.len()
            + classification.reopened.len();
        assert_eq!(total, bounds.len());
    }

    #[test]
    fn idempotent() {
        let bounds = assignment();
        assert_eq!(classify(&bounds, 1000.), classify(&bounds, 1000.));
    }

    #[test]
    fn depends_on_default_bound() {
        // With another default the pairs are no longer canonical
        let classification = classify(&assignment(), 500.);
        assert_eq!(classification.defined.len(), 5);
    }

    #[test]
    fn doubling() {
        assert_eq!(doubling_time(0.5), Some(2.));
        assert_eq!(doubling_time(0.), None);
        assert_eq!(doubling_time(-1.), None);
    }

    #[test]
    fn metabolite_names() {
        let mut model = Model::new_empty();
        model.add_metabolite(
            MetaboliteBuilder::default()
                .id("fe2_e".to_string())
                .name(Some("Fe2+".to_string()))
                .compartment(Some("e".to_string()))
                .build()
                .unwrap(),
        );
        model.add_reaction(
            ReactionBuilder::default()
                .id("EX_fe".to_string())
                .metabolites(IndexMap::from([("fe2_e".to_string(), -1.)]))
                .build()
                .unwrap(),
        );
        let names = classify(&assignment(), 1000.).metabolite_names(&model);
        assert_eq!(names.len(), 1);
        assert_eq!(names["EX_fe"], vec!["Fe2+"]);
    }
}
