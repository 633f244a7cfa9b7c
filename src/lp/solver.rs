//! LP solver interface.

use super::model::LpModel;
use std::collections::HashMap;

/// Status of the solver after execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SolverStatus {
    /// Proven optimal solution found.
    Optimal,
    /// No feasible solution exists.
    Infeasible,
    /// The objective is unbounded below.
    Unbounded,
    /// Model is invalid or malformed.
    ModelInvalid,
    /// Solver exceeded time limit.
    Timeout,
    /// No solution found for unknown reasons.
    Unknown,
}

impl SolverStatus {
    /// Whether solution values can be read.
    pub fn is_optimal(&self) -> bool {
        matches!(self, SolverStatus::Optimal)
    }
}

/// Solution from an LP solver.
///
/// All values are keyed by variable or constraint name. Duals and reduced
/// costs are only reported for models without integer variables.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LpSolution {
    /// Solver status.
    pub status: SolverStatus,
    /// Objective function value (if solved).
    pub objective_value: Option<f64>,
    /// Primal value per variable.
    pub values: HashMap<String, f64>,
    /// Reduced cost per variable.
    pub reduced_costs: HashMap<String, f64>,
    /// Dual price per constraint.
    pub duals: HashMap<String, f64>,
    /// Slack per constraint: `activity - rhs` for `>=`, `rhs - activity` otherwise.
    pub slacks: HashMap<String, f64>,
    /// Solve time in milliseconds.
    pub solve_time_ms: i64,
}

impl LpSolution {
    /// Creates an empty solution with the given status.
    pub fn empty(status: SolverStatus) -> Self {
        Self {
            status,
            objective_value: None,
            values: HashMap::new(),
            reduced_costs: HashMap::new(),
            duals: HashMap::new(),
            slacks: HashMap::new(),
            solve_time_ms: 0,
        }
    }

    /// Whether an optimal solution was found.
    pub fn is_solution_found(&self) -> bool {
        self.status.is_optimal()
    }

    /// Primal value of a variable.
    pub fn value(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }

    /// Dual price of a constraint.
    pub fn dual(&self, name: &str) -> Option<f64> {
        self.duals.get(name).copied()
    }

    /// Slack of a constraint.
    pub fn slack(&self, name: &str) -> Option<f64> {
        self.slacks.get(name).copied()
    }

    /// Reduced cost of a variable.
    pub fn reduced_cost(&self, name: &str) -> Option<f64> {
        self.reduced_costs.get(name).copied()
    }
}

/// Solver configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SolverConfig {
    /// Maximum time per solve in milliseconds. `None` waits indefinitely.
    ///
    /// Bounds how long the caller waits, not how long the engine runs. With
    /// [`MicroLpSolver`](super::MicroLpSolver) a timed-out solve keeps its
    /// worker thread busy until the engine finishes, and a stabilization run
    /// can leave one such thread per trial.
    pub time_limit_ms: Option<u64>,
}

impl SolverConfig {
    pub fn with_time_limit_ms(mut self, ms: u64) -> Self {
        self.time_limit_ms = Some(ms);
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.time_limit_ms == Some(0) {
            return Err("time_limit_ms must be positive".into());
        }
        Ok(())
    }
}

/// Trait for LP solver implementations.
///
/// Implementors wrap an external solving engine. The master problem only
/// talks to engines through this trait, so CBC, HiGHS or SCIP bindings can
/// replace the bundled [`MicroLpSolver`](super::MicroLpSolver).
pub trait LpSolver: Send + Sync {
    /// Solves the model and returns a solution.
    ///
    /// Non-optimal outcomes are reported through [`LpSolution::status`].
    fn solve(&self, model: &LpModel, config: &SolverConfig) -> LpSolution;
}
