//! Bound pairs and the bound assignment worked on by the media search
use indexmap::IndexMap;
use serde::Serialize;

/// Lower and upper flux bound of an exchange reaction
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct BoundPair {
    pub lower: f64,
    pub upper: f64,
}

impl BoundPair {
    pub fn new(lower: f64, upper: f64) -> Self {
        BoundPair { lower, upper }
    }

    /// Uptake limited to the measured `uptake`, secretion unconstrained
    pub fn defined(uptake: f64, default_bound: f64) -> Self {
        let uptake = uptake.abs();
        // Avoid a negative zero lower bound for a zero uptake
        let lower = if uptake == 0. { 0. } else { -uptake };
        BoundPair::new(lower, default_bound)
    }

    /// No uptake, secretion unconstrained
    pub fn closed(default_bound: f64) -> Self {
        BoundPair::new(0., default_bound)
    }

    /// Unconstrained uptake and secretion
    pub fn reopened(default_bound: f64) -> Self {
        BoundPair::new(-default_bound, default_bound)
    }

    /// No flux in either direction
    pub fn blocked() -> Self {
        BoundPair::new(0., 0.)
    }
}

/// The bounds currently assigned to exchange reactions, in assignment order
///
/// Reactions not in the assignment keep the baseline bounds of the oracle.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct BoundAssignment {
    bounds: IndexMap<String, BoundPair>,
}

impl BoundAssignment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assignment holding a single bound pair
    pub fn single(reaction_id: &str, bounds: BoundPair) -> Self {
        let mut assignment = BoundAssignment::new();
        assignment.insert(reaction_id, bounds);
        assignment
    }

    /// Assign bounds to a reaction, returning the bounds previously assigned
    ///
    /// Reassigning keeps the reaction's original position.
    pub fn insert(&mut self, reaction_id: &str, bounds: BoundPair) -> Option<BoundPair> {
        self.bounds.insert(reaction_id.to_string(), bounds)
    }

    pub fn get(&self, reaction_id: &str) -> Option<&BoundPair> {
        self.bounds.get(reaction_id)
    }

    pub fn contains(&self, reaction_id: &str) -> bool {
        self.bounds.contains_key(reaction_id)
    }

    pub fn len(&self) -> usize {
        self.bounds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bounds.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &BoundPair)> {
        self.bounds.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = &String> {
        self.bounds.keys()
    }
}
