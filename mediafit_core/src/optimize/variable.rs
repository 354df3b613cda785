//! Module providing representation of optimization problem variables
use std::fmt::{Display, Formatter};

use derive_builder::Builder;

/// A continuous variable of an optimization problem
#[derive(Builder, Debug, Clone, PartialEq)]
pub struct Variable {
    /// Used to identify the variable (must be unique within a problem)
    #[builder(setter(into))]
    pub id: String,
    /// Optional human-readable name
    #[builder(setter(into, strip_option), default = "None")]
    pub name: Option<String>,
    /// Position of the variable in the problem, set when the variable is added
    #[builder(default = "0")]
    pub index: usize,
    /// Lowest value the variable can take
    #[builder(default = "f64::NEG_INFINITY")]
    pub lower_bound: f64,
    /// Highest value the variable can take
    #[builder(default = "f64::INFINITY")]
    pub upper_bound: f64,
}

impl Display for Variable {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.name {
            Some(name) => write!(
                f,
                "{}:[{}, {}]",
                name, self.lower_bound, self.upper_bound
            ),
            None => write!(
                f,
                "{}:[{}, {}]",
                self.id, self.lower_bound, self.upper_bound
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_defaults() {
        let x = VariableBuilder::default().id("x").build().unwrap();
        assert_eq!(x.index, 0);
        assert!(x.lower_bound.is_infinite() && x.lower_bound < 0.);
        assert!(x.upper_bound.is_infinite() && x.upper_bound > 0.);
    }

    #[test]
    fn display() {
        let x = VariableBuilder::default()
            .id("x")
            .lower_bound(0.)
            .upper_bound(10.)
            .build()
            .unwrap();
        assert_eq!(format!("{}", x), "x:[0, 10]");
        let y = VariableBuilder::default()
            .id("y")
            .name("glucose uptake")
            .lower_bound(0.)
            .upper_bound(2.5)
            .build()
            .unwrap();
        assert_eq!(format!("{}", y), "glucose uptake:[0, 2.5]");
    }
}
