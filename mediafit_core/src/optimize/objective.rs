//! Provides struct for representing an optimization problem's objective

/// Represents the linear Objective of an optimization problem
#[derive(Debug, Clone, PartialEq)]
pub struct Objective {
    /// Terms included in the objective (See [`ObjectiveTerm`])
    terms: Vec<ObjectiveTerm>,
    /// Sense of the objective (maximize, or minimize), see [`ObjectiveSense`]
    sense: ObjectiveSense,
}

impl Objective {
    /// Create a new empty objective, with a given sense
    pub fn new(sense: ObjectiveSense) -> Self {
        Self {
            terms: Vec::new(),
            sense,
        }
    }

    pub fn sense(&self) -> ObjectiveSense {
        self.sense
    }

    pub fn terms(&self) -> &[ObjectiveTerm] {
        &self.terms
    }

    /// Add a new term to the objective
    pub fn add_term(&mut self, term: ObjectiveTerm) {
        self.terms.push(term);
    }

    /// Dense coefficient vector over `num_variables` variables, repeated terms are summed
    pub fn coefficients(&self, num_variables: usize) -> Vec<f64> {
        let mut coefficients = vec![0.; num_variables];
        for term in &self.terms {
            if let Some(c) = coefficients.get_mut(term.variable_index) {
                *c += term.coefficient;
            }
        }
        coefficients
    }

    /// Value of the objective for the given variable values (indexed like the problem)
    pub fn evaluate(&self, values: &[f64]) -> f64 {
        self.terms
            .iter()
            .map(|t| t.coefficient * values.get(t.variable_index).copied().unwrap_or(0.))
            .sum()
    }
}

/// Represents the sense of the objective, whether it should be maximized or minimized
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectiveSense {
    /// The objective should be minimized
    Minimize,
    /// The objective should be maximized
    Maximize,
}

/// A linear term in the objective
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectiveTerm {
    /// Id of the variable in the term
    pub variable_id: String,
    /// Index of the variable in the problem
    pub variable_index: usize,
    /// Coefficient for the term
    pub coefficient: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn term(index: usize, coefficient: f64) -> ObjectiveTerm {
        ObjectiveTerm {
            variable_id: format!("v{}", index),
            variable_index: index,
            coefficient,
        }
    }

    #[test]
    fn coefficients() {
        let mut objective = Objective::new(ObjectiveSense::Maximize);
        objective.add_term(term(0, 1.));
        objective.add_term(term(2, -1.));
        objective.add_term(term(2, 0.5));
        assert_eq!(objective.coefficients(3), vec![1., 0., -0.5]);
    }

    #[test]
    fn evaluate() {
        let mut objective = Objective::new(ObjectiveSense::Minimize);
        objective.add_term(term(0, 2.));
        objective.add_term(term(1, -1.));
        assert!((objective.evaluate(&[3., 4.]) - 2.).abs() < 1e-12);
        // Variables past the end of the values count as zero
        assert!((objective.evaluate(&[3.]) - 6.).abs() < 1e-12);
    }

    #[test]
    fn sense() {
        let objective = Objective::new(ObjectiveSense::Minimize);
        assert_eq!(objective.sense(), ObjectiveSense::Minimize);
        assert!(objective.terms().is_empty());
    }
}
