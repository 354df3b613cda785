//! Provides struct representing an optimization problem
use crate::optimize::constraint::{Constraint, ConstraintTerm};
use crate::optimize::objective::{Objective, ObjectiveSense, ObjectiveTerm};
use crate::optimize::solvers::{LinearSolver, SolverError};
use crate::optimize::variable::{Variable, VariableBuilder};
use crate::optimize::{OptimizationStatus, ProblemSolution};
use indexmap::IndexMap;
use thiserror::Error;

/// A linear optimization problem over continuous variables
#[derive(Debug, Clone)]
pub struct Problem {
    /// Objective to optimize
    objective: Objective,
    /// Variables of the optimization problem
    variables: IndexMap<String, Variable>,
    /// Constraints of the optimization problem
    constraints: IndexMap<String, Constraint>,
    /// Status of the most recent optimization
    status: OptimizationStatus,
}

impl Problem {
    // region Creation Functions
    /// Create a new optimization problem
    pub fn new(objective_sense: ObjectiveSense) -> Self {
        Self {
            objective: Objective::new(objective_sense),
            variables: IndexMap::new(),
            constraints: IndexMap::new(),
            status: OptimizationStatus::Unoptimized,
        }
    }

    /// Create a new maximization problem
    pub fn new_maximization() -> Self {
        Self::new(ObjectiveSense::Maximize)
    }

    /// Create a new minimization problem
    pub fn new_minimization() -> Self {
        Self::new(ObjectiveSense::Minimize)
    }
    // endregion Creation Functions

    // region Accessors
    pub fn objective(&self) -> &Objective {
        &self.objective
    }

    pub fn status(&self) -> OptimizationStatus {
        self.status
    }

    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    /// Variables in index order
    pub fn variables(&self) -> impl Iterator<Item = &Variable> {
        self.variables.values()
    }

    pub fn get_variable(&self, id: &str) -> Option<&Variable> {
        self.variables.get(id)
    }

    /// Constraints in insertion order
    pub fn constraints(&self) -> impl Iterator<Item = &Constraint> {
        self.constraints.values()
    }
    // endregion Accessors

    // region Adding Variables
    /// Add a variable to the optimization problem
    pub fn add_variable(&mut self, mut variable: Variable) -> Result<(), ProblemError> {
        // Validate that the variable can in fact be added to the problem
        if self.variables.contains_key(&variable.id) {
            return Err(ProblemError::VariableIdAlreadyExists);
        }
        if variable.lower_bound > variable.upper_bound {
            return Err(ProblemError::InvalidVariableBounds);
        }
        // Update the index of the variable to reflect the current variable count
        variable.index = self.variables.len();
        self.variables.insert(variable.id.clone(), variable);
        Ok(())
    }

    /// Create a new variable and add it to the optimization problem
    pub fn add_new_variable(
        &mut self,
        id: &str,
        name: Option<&str>,
        lower_bound: f64,
        upper_bound: f64,
    ) -> Result<(), ProblemError> {
        let mut builder = VariableBuilder::default();
        builder.id(id).lower_bound(lower_bound).upper_bound(upper_bound);
        if let Some(name) = name {
            builder.name(name);
        }
        let variable = builder
            .build()
            .map_err(|e| ProblemError::UnableToBuildVariable(e.to_string()))?;
        self.add_variable(variable)
    }
    // endregion Adding Variables

    // region Adding Constraints
    /// Create a new equality constraint using variable ids, and add it to the problem
    pub fn add_new_equality_constraint_by_id(
        &mut self,
        id: &str,
        variables: &[&str],
        coefficients: &[f64],
        equals: f64,
    ) -> Result<(), ProblemError> {
        if self.constraints.contains_key(id) {
            return Err(ProblemError::ConstraintAlreadyExists);
        }
        let terms = variables
            .iter()
            .zip(coefficients)
            .map(|(var_id, coef)| match self.variables.get(*var_id) {
                Some(var) => Ok(ConstraintTerm {
                    variable_id: var.id.clone(),
                    variable_index: var.index,
                    coefficient: *coef,
                }),
                None => Err(ProblemError::NonExistentVariablesInConstraint),
            })
            .collect::<Result<Vec<_>, _>>()?;
        self.constraints
            .insert(id.to_string(), Constraint::new_equality(id, terms, equals));
        Ok(())
    }
    // endregion Adding Constraints

    // region Objective
    /// Add a new linear term to the objective using the variable id
    pub fn add_new_linear_objective_term_by_id(
        &mut self,
        variable_id: &str,
        coefficient: f64,
    ) -> Result<(), ProblemError> {
        let variable = match self.variables.get(variable_id) {
            Some(variable) => variable,
            None => return Err(ProblemError::NonExistentVariablesInObjective),
        };
        self.objective.add_term(ObjectiveTerm {
            variable_id: variable.id.clone(),
            variable_index: variable.index,
            coefficient,
        });
        Ok(())
    }
    // endregion Objective

    // region update variable bounds
    /// Update the bounds of a variable
    pub fn update_variable_bounds(
        &mut self,
        id: &str,
        lower_bound: f64,
        upper_bound: f64,
    ) -> Result<(), ProblemError> {
        if lower_bound > upper_bound {
            return Err(ProblemError::InvalidVariableBounds);
        }
        match self.variables.get_mut(id) {
            Some(var) => {
                var.lower_bound = lower_bound;
                var.upper_bound = upper_bound;
                Ok(())
            }
            None => Err(ProblemError::NonExistentVariable),
        }
    }
    // endregion update variable bounds

    /// Solve the problem with the given solver, recording the resulting status
    pub fn solve<S: LinearSolver + ?Sized>(
        &mut self,
        solver: &S,
    ) -> Result<ProblemSolution, SolverError> {
        let solution = solver.solve(self)?;
        self.status = solution.status;
        Ok(solution)
    }
}

/// Errors associated with the Problem
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProblemError {
    /// Error when trying to add a variable with the same id as an existing variable
    #[error("Tried to add a variable with the same id as an existing variable")]
    VariableIdAlreadyExists,
    /// Error when trying to add variable with invalid bounds
    #[error("Tried to add a variable with lower_bound>upper_bound")]
    InvalidVariableBounds,
    /// Error when the variable builder fails
    #[error("Unable to build variable: {0}")]
    UnableToBuildVariable(String),
    /// Error when trying to add a constraint with the same id as an existing constraint
    #[error("Tried to add a constraint with the same id as an existing constraint")]
    ConstraintAlreadyExists,
    /// Error when trying to add a constraint that contains variables not in the model
    #[error("Tried to add a constraint with variables not in the model")]
    NonExistentVariablesInConstraint,
    /// Error when trying to add an objective term which includes variables not in the model
    #[error("Tried adding an objective term with variables not in the model")]
    NonExistentVariablesInObjective,
    /// Error when trying to perform an update on a variable that doesn't exist
    #[error("Tried to access a variable that doesn't exist")]
    NonExistentVariable,
}
