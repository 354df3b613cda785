//! Implements a solver interface for Clarabel
//!
//! Clarabel solves `min 1/2 x'Px + q'x` subject to `Ax + s = b`, `s` in a product of cones.
//! Linear problems use `P = 0`, equality constraints map to the zero cone, and finite
//! variable bounds map to rows of the non-negative cone.
use ::clarabel::algebra::CscMatrix;
use ::clarabel::solver::*;
use derive_builder::Builder;
use indexmap::IndexMap;
use nalgebra_sparse::{coo::CooMatrix, csc::CscMatrix as SparseCsc};

use crate::configuration::Configuration;
use crate::optimize::objective::ObjectiveSense;
use crate::optimize::problem::Problem;
use crate::optimize::solvers::{LinearSolver, SolverError};
use crate::optimize::{OptimizationStatus, ProblemSolution};

/// Interior point solver backed by Clarabel
#[derive(Builder, Clone, Debug)]
pub struct ClarabelSolver {
    /// Print solver progress
    #[builder(default = "false")]
    pub verbose: bool,
    /// Maximum number of interior point iterations
    #[builder(default = "200")]
    pub max_iter: u32,
    /// Feasibility and duality gap tolerance
    #[builder(default = "Configuration::current().tolerance")]
    pub tolerance: f64,
}

impl Default for ClarabelSolver {
    fn default() -> Self {
        ClarabelSolver {
            verbose: false,
            max_iter: 200,
            tolerance: Configuration::current().tolerance,
        }
    }
}

/// Constraint data in Clarabel's standard form
struct StandardForm {
    a: CscMatrix<f64>,
    b: Vec<f64>,
    cones: Vec<SupportedConeT<f64>>,
}

impl ClarabelSolver {
    fn settings(&self) -> Result<DefaultSettings<f64>, SolverError> {
        DefaultSettingsBuilder::default()
            .verbose(self.verbose)
            .max_iter(self.max_iter)
            .tol_feas(self.tolerance)
            .tol_gap_abs(self.tolerance)
            .tol_gap_rel(self.tolerance)
            .build()
            .map_err(|e| SolverError::InvalidSettings(e.to_string()))
    }

    /// Assemble the equality rows, followed by one row per finite variable bound
    fn standard_form(problem: &Problem) -> StandardForm {
        let num_variables = problem.num_variables();
        let num_equalities = problem.num_constraints();
        let num_bound_rows: usize = problem
            .variables()
            .map(|v| v.lower_bound.is_finite() as usize + v.upper_bound.is_finite() as usize)
            .sum();
        let num_rows = num_equalities + num_bound_rows;

        let mut coo = CooMatrix::<f64>::new(num_rows, num_variables);
        let mut b = Vec::with_capacity(num_rows);
        for (row, constraint) in problem.constraints().enumerate() {
            for term in constraint.terms() {
                coo.push(row, term.variable_index, term.coefficient);
            }
            b.push(constraint.equals());
        }
        let mut row = num_equalities;
        for variable in problem.variables() {
            // x <= ub  ->  x + s = ub
            if variable.upper_bound.is_finite() {
                coo.push(row, variable.index, 1.);
                b.push(variable.upper_bound);
                row += 1;
            }
            // x >= lb  ->  -x + s = -lb
            if variable.lower_bound.is_finite() {
                coo.push(row, variable.index, -1.);
                b.push(-variable.lower_bound);
                row += 1;
            }
        }

        // Conversion sums duplicate entries and sorts row indices within each column
        let csc = SparseCsc::from(&coo);
        let (col_offsets, row_indices, values) = csc.disassemble();
        let a = CscMatrix::new(num_rows, num_variables, col_offsets, row_indices, values);

        let mut cones = Vec::new();
        if num_equalities > 0 {
            cones.push(SupportedConeT::ZeroConeT(num_equalities));
        }
        if num_bound_rows > 0 {
            cones.push(SupportedConeT::NonnegativeConeT(num_bound_rows));
        }
        StandardForm { a, b, cones }
    }
}

impl LinearSolver for ClarabelSolver {
    fn solve(&self, problem: &Problem) -> Result<ProblemSolution, SolverError> {
        let num_variables = problem.num_variables();
        if num_variables == 0 {
            return Err(SolverError::EmptyProblem);
        }
        let settings = self.settings()?;

        let p = CscMatrix::new(
            num_variables,
            num_variables,
            vec![0; num_variables + 1],
            Vec::new(),
            Vec::new(),
        );
        // Clarabel minimizes, so flip the linear cost for maximization
        let mut q = problem.objective().coefficients(num_variables);
        if problem.objective().sense() == ObjectiveSense::Maximize {
            q.iter_mut().for_each(|c| *c = -*c);
        }
        let StandardForm { a, b, cones } = Self::standard_form(problem);

        let mut solver = DefaultSolver::new(&p, &q, &a, &b, &cones, settings);
        solver.solve();

        let status = map_status(solver.solution.status);
        if !status.has_solution() {
            return Ok(ProblemSolution::unsolved(status));
        }
        let x = &solver.solution.x;
        let variable_values: IndexMap<String, f64> = problem
            .variables()
            .map(|v| (v.id.clone(), x[v.index]))
            .collect();
        Ok(ProblemSolution {
            status,
            objective_value: Some(problem.objective().evaluate(x)),
            variable_values: Some(variable_values),
        })
    }
}

fn map_status(status: SolverStatus) -> OptimizationStatus {
    match status {
        SolverStatus::Solved => OptimizationStatus::Optimal,
        SolverStatus::AlmostSolved => OptimizationStatus::AlmostOptimal,
        SolverStatus::PrimalInfeasible | SolverStatus::AlmostPrimalInfeasible => {
            OptimizationStatus::Infeasible
        }
        SolverStatus::DualInfeasible | SolverStatus::AlmostDualInfeasible => {
            OptimizationStatus::Unbounded
        }
        SolverStatus::NumericalError => OptimizationStatus::NumericalError,
        SolverStatus::Unsolved => OptimizationStatus::Unoptimized,
        _ => OptimizationStatus::SolverHalted,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn simple_lp() {
        // maximize x + 2y, x + y = 4, 0 <= x <= 3, 0 <= y <= 1
        let mut problem = Problem::new_maximization();
        problem.add_new_variable("x", None, 0., 3.).unwrap();
        problem.add_new_variable("y", None, 0., 1.).unwrap();
        problem
            .add_new_equality_constraint_by_id("sum", &["x", "y"], &[1., 1.], 4.)
            .unwrap();
        problem.add_new_linear_objective_term_by_id("x", 1.).unwrap();
        problem.add_new_linear_objective_term_by_id("y", 2.).unwrap();

        let solution = problem.solve(&ClarabelSolver::default()).unwrap();
        assert_eq!(solution.status, OptimizationStatus::Optimal);
        assert_eq!(problem.status(), OptimizationStatus::Optimal);
        assert_relative_eq!(solution.objective_value.unwrap(), 5., epsilon = 1e-5);
        let values = solution.variable_values.unwrap();
        assert_relative_eq!(values["x"], 3., epsilon = 1e-5);
        assert_relative_eq!(values["y"], 1., epsilon = 1e-5);
    }

    #[test]
    fn minimization() {
        // minimize x, x >= 2
        let mut problem = Problem::new_minimization();
        problem.add_new_variable("x", None, 2., 10.).unwrap();
        problem.add_new_linear_objective_term_by_id("x", 1.).unwrap();
        let solution = problem.solve(&ClarabelSolver::default()).unwrap();
        assert_relative_eq!(solution.objective_value.unwrap(), 2., epsilon = 1e-5);
    }

    #[test]
    fn infeasible_lp() {
        // x + y = 10 with x, y <= 1
        let mut problem = Problem::new_maximization();
        problem.add_new_variable("x", None, 0., 1.).unwrap();
        problem.add_new_variable("y", None, 0., 1.).unwrap();
        problem
            .add_new_equality_constraint_by_id("sum", &["x", "y"], &[1., 1.], 10.)
            .unwrap();
        problem.add_new_linear_objective_term_by_id("x", 1.).unwrap();

        let solution = problem.solve(&ClarabelSolver::default()).unwrap();
        assert_eq!(solution.status, OptimizationStatus::Infeasible);
        assert!(solution.objective_value.is_none());
        assert!(solution.variable_values.is_none());
    }

    #[test]
    fn empty_problem() {
        let mut problem = Problem::new_maximization();
        assert_eq!(
            problem.solve(&ClarabelSolver::default()),
            Err(SolverError::EmptyProblem)
        );
    }

    #[test]
    fn builder() {
        let solver = ClarabelSolverBuilder::default()
            .max_iter(50)
            .build()
            .unwrap();
        assert_eq!(solver.max_iter, 50);
        assert!(!solver.verbose);
    }
}
