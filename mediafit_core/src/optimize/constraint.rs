//! Provides struct for representing a constraint in an optimization problem
use std::fmt::{Display, Formatter};

/// Represents a linear equality constraint, where the sum of `terms` = `equals`
///
/// Flux balance problems only need equalities (the steady state mass balances), variable
/// bounds carry every inequality.
#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    /// Used to identify the constraint
    id: String,
    /// Linear terms which are added together, see [`ConstraintTerm`] for more
    terms: Vec<ConstraintTerm>,
    /// The right hand side of the equality constraint
    equals: f64,
}

impl Constraint {
    /// Create a new equality constraint
    ///
    /// # Parameters
    /// - `id`: Identifier of the constraint
    /// - `terms`: Linear terms of the left hand side
    /// - `equals`: The right hand side of the equality
    pub fn new_equality(id: &str, terms: Vec<ConstraintTerm>, equals: f64) -> Self {
        Constraint {
            id: id.to_string(),
            terms,
            equals,
        }
    }

    pub fn get_id(&self) -> &str {
        &self.id
    }

    pub fn terms(&self) -> &[ConstraintTerm] {
        &self.terms
    }

    pub fn equals(&self) -> f64 {
        self.equals
    }

    /// Convert the terms into a String representation
    fn terms_to_string(&self) -> String {
        if self.terms.is_empty() {
            return "0".to_string();
        }
        self.terms
            .iter()
            .map(|t| t.to_string())
            .collect::<Vec<_>>()
            .join(" + ")
    }
}

impl Display for Constraint {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {} = {}", self.id, self.terms_to_string(), self.equals)
    }
}

/// Represents a single term in a constraint, specifically
/// represents the multiplication of the variable by the `coefficient`
#[derive(Debug, Clone, PartialEq)]
pub struct ConstraintTerm {
    /// Id of the variable
    pub variable_id: String,
    /// Index of the variable in the problem
    pub variable_index: usize,
    /// The coefficient for the variable
    pub coefficient: f64,
}

impl Display for ConstraintTerm {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}*{}", self.coefficient, self.variable_id)
    }
}
