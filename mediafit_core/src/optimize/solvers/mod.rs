//! Solver interfaces for optimization problems
pub mod clarabel;

use crate::optimize::problem::Problem;
use crate::optimize::ProblemSolution;
use thiserror::Error;

/// A solver for linear problems over continuous variables
pub trait LinearSolver {
    /// Solve the problem
    ///
    /// Infeasible or unbounded problems are not errors, they are reported through the
    /// status of the returned [`ProblemSolution`]. Errors are reserved for problems the
    /// solver can't be set up for.
    fn solve(&self, problem: &Problem) -> Result<ProblemSolution, SolverError>;
}

/// Errors raised while setting up a solver
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolverError {
    /// The solver settings were rejected
    #[error("Invalid solver settings: {0}")]
    InvalidSettings(String),
    /// The problem has no variables
    #[error("Tried to solve a problem without variables")]
    EmptyProblem,
}
