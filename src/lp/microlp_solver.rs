//! [`LpSolver`] backed by the pure-Rust `microlp` engine.
//!
//! `microlp` reports primal values only. Dual prices are obtained by handing
//! the LP dual of the model to the same engine:
//!
//! ```text
//!   primal:  min c·x   s.t.  a_i·x (>=|<=|=) b_i,   l <= x <= u
//!   dual:    max Σ_i (b_i - a_i·l) y_i + Σ_j (u_j - l_j) z_j
//!            s.t. Σ_i a_ij y_i + z_j <= c_j          for every x_j
//!                 y_i >= 0 (>=),  y_i <= 0 (<=),  y_i free (=),  z_j <= 0
//! ```
//!
//! Reduced costs are `c_j - Σ_i a_ij y_i`. Models with binary variables get
//! primal values and slacks only.

use super::model::{LpModel, Sense};
use super::solver::{LpSolution, LpSolver, SolverConfig, SolverStatus};
use super::variables::VarDomain;
use microlp::{ComparisonOp, OptimizationDirection, Problem, Variable};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Magnitudes below this are reported as exactly zero.
const ZERO_TOLERANCE: f64 = 1e-9;

/// LP/MILP solver using `microlp`.
///
/// With a time limit configured, the engine runs on a worker thread and the
/// call returns [`SolverStatus::Timeout`] once the limit elapses. The worker
/// is detached, not interrupted.
///
/// # Examples
///
/// ```
/// use u_colgen::lp::{LpModel, LpSolver, LpVariable, MicroLpSolver, Sense, SolverConfig};
///
/// let mut model = LpModel::new("demo");
/// model.add_variable(LpVariable::continuous("x", 0.0));
/// model.set_objective(vec![("x".into(), 3.0)]);
/// model.add_constraint("c", vec![("x".into(), 1.0)], Sense::Ge, 2.0);
///
/// let solution = MicroLpSolver::new().solve(&model, &SolverConfig::default());
/// assert!(solution.is_solution_found());
/// assert!((solution.objective_value.unwrap() - 6.0).abs() < 1e-9);
/// assert!((solution.dual("c").unwrap() - 3.0).abs() < 1e-9);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct MicroLpSolver;

impl MicroLpSolver {
    pub fn new() -> Self {
        Self
    }
}

impl LpSolver for MicroLpSolver {
    fn solve(&self, model: &LpModel, config: &SolverConfig) -> LpSolution {
        if let Err(msg) = model.validate() {
            warn!(model = model.name(), %msg, "rejecting invalid model");
            return LpSolution::empty(SolverStatus::ModelInvalid);
        }

        let start = Instant::now();
        let mut solution = match config.time_limit_ms {
            None => solve_model(model),
            Some(ms) => solve_with_timeout(model, Duration::from_millis(ms)),
        };
        solution.solve_time_ms = start.elapsed().as_millis() as i64;

        debug!(
            model = model.name(),
            status = ?solution.status,
            objective = ?solution.objective_value,
            time_ms = solution.solve_time_ms,
            "microlp solve finished"
        );
        solution
    }
}

fn solve_with_timeout(model: &LpModel, limit: Duration) -> LpSolution {
    let owned = model.clone();
    let (tx, rx) = mpsc::channel();
    std::thread::spawn(move || {
        // the receiver is gone if the caller already timed out
        let _ = tx.send(solve_model(&owned));
    });

    match rx.recv_timeout(limit) {
        Ok(solution) => solution,
        Err(RecvTimeoutError::Timeout) => {
            warn!(model = model.name(), limit_ms = limit.as_millis() as u64, "solve timed out");
            LpSolution::empty(SolverStatus::Timeout)
        }
        Err(RecvTimeoutError::Disconnected) => {
            warn!(model = model.name(), "solver thread terminated without a result");
            LpSolution::empty(SolverStatus::Unknown)
        }
    }
}

fn solve_model(model: &LpModel) -> LpSolution {
    let costs = objective_costs(model);

    let values = match solve_primal(model, &costs) {
        Ok(values) => values,
        Err(status) => return LpSolution::empty(status),
    };

    let mut solution = LpSolution::empty(SolverStatus::Optimal);
    solution.objective_value = Some(costs.iter().zip(&values).map(|(c, x)| c * x).sum());

    for constraint in model.constraints() {
        let activity = constraint.activity(|name| {
            model.variable_position(name).map_or(0.0, |i| values[i])
        });
        let slack = match constraint.sense {
            Sense::Ge => activity - constraint.rhs,
            Sense::Le | Sense::Eq => constraint.rhs - activity,
        };
        solution.slacks.insert(constraint.name.clone(), snap(slack));
    }

    if !model.has_integer_vars() {
        match solve_dual(model, &costs) {
            Some((duals, reduced_costs)) => {
                for (constraint, y) in model.constraints().iter().zip(duals) {
                    solution.duals.insert(constraint.name.clone(), y);
                }
                for (var, d) in model.variables().iter().zip(reduced_costs) {
                    solution.reduced_costs.insert(var.name.clone(), d);
                }
            }
            None => {
                warn!(model = model.name(), "dual solve failed on an optimal primal");
                return LpSolution::empty(SolverStatus::Unknown);
            }
        }
    }

    for (var, x) in model.variables().iter().zip(values) {
        solution.values.insert(var.name.clone(), x);
    }
    solution
}

/// Objective coefficient per variable position.
fn objective_costs(model: &LpModel) -> Vec<f64> {
    let mut costs = vec![0.0; model.num_variables()];
    for (name, coef) in model.objective() {
        if let Some(i) = model.variable_position(name) {
            costs[i] += coef;
        }
    }
    costs
}

fn solve_primal(model: &LpModel, costs: &[f64]) -> Result<Vec<f64>, SolverStatus> {
    let mut problem = Problem::new(OptimizationDirection::Minimize);
    let vars: Vec<Variable> = model
        .variables()
        .iter()
        .zip(costs)
        .map(|(v, &cost)| match v.domain {
            VarDomain::Continuous => problem.add_var(cost, (v.lower, v.upper_bound())),
            VarDomain::Binary => problem.add_binary_var(cost),
        })
        .collect();

    for constraint in model.constraints() {
        if constraint.terms.is_empty() {
            if !holds(0.0, constraint.sense, constraint.rhs) {
                return Err(SolverStatus::Infeasible);
            }
            continue;
        }
        let expr: Vec<(Variable, f64)> = constraint
            .terms
            .iter()
            .filter_map(|(name, coef)| model.variable_position(name).map(|i| (vars[i], *coef)))
            .collect();
        problem.add_constraint(expr, comparison(constraint.sense), constraint.rhs);
    }

    match problem.solve() {
        Ok(solution) => Ok(vars.iter().map(|&v| snap(solution[v])).collect()),
        Err(microlp::Error::Infeasible) => Err(SolverStatus::Infeasible),
        Err(microlp::Error::Unbounded) => Err(SolverStatus::Unbounded),
        Err(err) => {
            warn!(model = model.name(), %err, "microlp internal error");
            Err(SolverStatus::Unknown)
        }
    }
}

/// Returns (dual per constraint, reduced cost per variable), both in model order.
fn solve_dual(model: &LpModel, costs: &[f64]) -> Option<(Vec<f64>, Vec<f64>)> {
    let mut dual = Problem::new(OptimizationDirection::Maximize);
    let mut columns: Vec<Vec<(Variable, f64)>> = vec![Vec::new(); model.num_variables()];

    let mut row_vars: Vec<Option<Variable>> = Vec::with_capacity(model.num_constraints());
    for constraint in model.constraints() {
        if constraint.terms.is_empty() {
            row_vars.push(None);
            continue;
        }
        let shifted_rhs = constraint.rhs
            - constraint.activity(|name| {
                model
                    .variable(name)
                    .map_or(0.0, |v| v.lower)
            });
        let bounds = match constraint.sense {
            Sense::Ge => (0.0, f64::INFINITY),
            Sense::Le => (f64::NEG_INFINITY, 0.0),
            Sense::Eq => (f64::NEG_INFINITY, f64::INFINITY),
        };
        let y = dual.add_var(shifted_rhs, bounds);
        for (name, coef) in &constraint.terms {
            if let Some(j) = model.variable_position(name) {
                columns[j].push((y, *coef));
            }
        }
        row_vars.push(Some(y));
    }

    for (j, var) in model.variables().iter().enumerate() {
        if let Some(upper) = var.upper {
            let z = dual.add_var(upper - var.lower, (f64::NEG_INFINITY, 0.0));
            columns[j].push((z, 1.0));
        }
    }

    for (column, &cost) in columns.iter().zip(costs) {
        if !column.is_empty() {
            dual.add_constraint(column.clone(), ComparisonOp::Le, cost);
        }
    }

    let solution = match dual.solve() {
        Ok(solution) => solution,
        Err(err) => {
            debug!(model = model.name(), %err, "dual program not solved");
            return None;
        }
    };

    let duals: Vec<f64> = row_vars
        .iter()
        .map(|y| y.map_or(0.0, |y| snap(solution[y])))
        .collect();

    let mut reduced_costs = costs.to_vec();
    for (constraint, &y) in model.constraints().iter().zip(&duals) {
        for (name, coef) in &constraint.terms {
            if let Some(j) = model.variable_position(name) {
                reduced_costs[j] -= coef * y;
            }
        }
    }
    let reduced_costs = reduced_costs.into_iter().map(snap).collect();

    Some((duals, reduced_costs))
}

fn comparison(sense: Sense) -> ComparisonOp {
    match sense {
        Sense::Le => ComparisonOp::Le,
        Sense::Ge => ComparisonOp::Ge,
        Sense::Eq => ComparisonOp::Eq,
    }
}

fn holds(lhs: f64, sense: Sense, rhs: f64) -> bool {
    match sense {
        Sense::Le => lhs <= rhs + ZERO_TOLERANCE,
        Sense::Ge => lhs + ZERO_TOLERANCE >= rhs,
        Sense::Eq => (lhs - rhs).abs() <= ZERO_TOLERANCE,
    }
}

fn snap(value: f64) -> f64 {
    if value.abs() < ZERO_TOLERANCE {
        0.0
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lp::LpVariable;

    fn var_terms(names: &[&str]) -> Vec<(String, f64)> {
        names.iter().map(|n| (n.to_string(), 1.0)).collect()
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-7
    }

    #[test]
    fn test_simple_lp() {
        // min x + y  s.t.  x + 2y >= 4,  3x + y >= 6
        let mut model = LpModel::new("simple");
        model.add_variable(LpVariable::continuous("x", 0.0));
        model.add_variable(LpVariable::continuous("y", 0.0));
        model.set_objective(var_terms(&["x", "y"]));
        model.add_constraint("a", vec![("x".into(), 1.0), ("y".into(), 2.0)], Sense::Ge, 4.0);
        model.add_constraint("b", vec![("x".into(), 3.0), ("y".into(), 1.0)], Sense::Ge, 6.0);

        let s = MicroLpSolver::new().solve(&model, &SolverConfig::default());
        assert_eq!(s.status, SolverStatus::Optimal);
        // x = 1.6, y = 1.2
        assert!(approx(s.objective_value.expect("objective"), 2.8));
        assert!(approx(s.value("x").expect("x"), 1.6));
        assert!(approx(s.value("y").expect("y"), 1.2));
        // duals: y_a = 0.4, y_b = 0.2 ; strong duality 4*0.4 + 6*0.2 = 2.8
        assert!(approx(s.dual("a").expect("dual a"), 0.4));
        assert!(approx(s.dual("b").expect("dual b"), 0.2));
        assert_eq!(s.slack("a"), Some(0.0));
        assert_eq!(s.reduced_cost("x"), Some(0.0));
    }

    #[test]
    fn test_le_constraint_dual_sign_and_slack() {
        // min -x  s.t. x <= 3
        let mut model = LpModel::new("le");
        model.add_variable(LpVariable::continuous("x", 0.0));
        model.set_objective(vec![("x".into(), -1.0)]);
        model.add_constraint("cap", var_terms(&["x"]), Sense::Le, 3.0);
        model.add_constraint("loose", var_terms(&["x"]), Sense::Le, 5.0);

        let s = MicroLpSolver::new().solve(&model, &SolverConfig::default());
        assert!(s.is_solution_found());
        assert!(approx(s.value("x").expect("x"), 3.0));
        assert!(approx(s.dual("cap").expect("dual"), -1.0));
        assert_eq!(s.dual("loose"), Some(0.0));
        assert!(approx(s.slack("loose").expect("slack"), 2.0));
    }

    #[test]
    fn test_lower_bound_shift() {
        // min x  s.t. x >= 1 with x >= 2 as a bound: constraint is slack, dual 0
        let mut model = LpModel::new("shift");
        model.add_variable(LpVariable::continuous("x", 2.0));
        model.set_objective(var_terms(&["x"]));
        model.add_constraint("c", var_terms(&["x"]), Sense::Ge, 1.0);

        let s = MicroLpSolver::new().solve(&model, &SolverConfig::default());
        assert!(approx(s.value("x").expect("x"), 2.0));
        assert_eq!(s.dual("c"), Some(0.0));
        assert!(approx(s.slack("c").expect("slack"), 1.0));
        assert!(approx(s.reduced_cost("x").expect("dj"), 1.0));
    }

    #[test]
    fn test_infeasible() {
        let mut model = LpModel::new("infeasible");
        model.add_variable(LpVariable::continuous("x", 0.0).with_upper(1.0));
        model.set_objective(var_terms(&["x"]));
        model.add_constraint("c", var_terms(&["x"]), Sense::Ge, 2.0);

        let s = MicroLpSolver::new().solve(&model, &SolverConfig::default());
        assert_eq!(s.status, SolverStatus::Infeasible);
        assert!(s.values.is_empty());
    }

    #[test]
    fn test_empty_row_infeasible() {
        let mut model = LpModel::new("empty-row");
        model.add_variable(LpVariable::continuous("x", 0.0));
        model.set_objective(var_terms(&["x"]));
        model.add_constraint("uncovered", vec![], Sense::Ge, 1.0);

        let s = MicroLpSolver::new().solve(&model, &SolverConfig::default());
        assert_eq!(s.status, SolverStatus::Infeasible);
    }

    #[test]
    fn test_unbounded() {
        let mut model = LpModel::new("unbounded");
        model.add_variable(LpVariable::continuous("x", 0.0));
        model.set_objective(vec![("x".into(), -1.0)]);
        model.add_constraint("c", var_terms(&["x"]), Sense::Ge, 1.0);

        let s = MicroLpSolver::new().solve(&model, &SolverConfig::default());
        assert_eq!(s.status, SolverStatus::Unbounded);
    }

    #[test]
    fn test_invalid_model() {
        let model = LpModel::new("nothing");
        let s = MicroLpSolver::new().solve(&model, &SolverConfig::default());
        assert_eq!(s.status, SolverStatus::ModelInvalid);
    }

    #[test]
    fn test_binary_model_has_no_duals() {
        let mut model = LpModel::new("binary");
        model.add_variable(LpVariable::binary("a"));
        model.add_variable(LpVariable::binary("b"));
        model.set_objective(vec![("a".into(), 3.0), ("b".into(), 2.0)]);
        model.add_constraint("c", var_terms(&["a", "b"]), Sense::Ge, 1.0);

        let s = MicroLpSolver::new().solve(&model, &SolverConfig::default());
        assert!(s.is_solution_found());
        assert!(approx(s.value("b").expect("b"), 1.0));
        assert!(approx(s.value("a").expect("a"), 0.0));
        assert!(s.duals.is_empty());
        assert!(s.reduced_costs.is_empty());
        assert_eq!(s.slack("c"), Some(0.0));
    }

    #[test]
    fn test_with_time_limit() {
        let mut model = LpModel::new("limited");
        model.add_variable(LpVariable::continuous("x", 0.0));
        model.set_objective(var_terms(&["x"]));
        model.add_constraint("c", var_terms(&["x"]), Sense::Ge, 1.0);

        let config = SolverConfig::default().with_time_limit_ms(10_000);
        let s = MicroLpSolver::new().solve(&model, &config);
        assert!(s.is_solution_found());
        assert!(approx(s.value("x").expect("x"), 1.0));
    }

    /// Covering LP with `rows` rows; column j covers three pseudo-random rows.
    fn wide_covering_model(rows: usize, columns: usize) -> LpModel {
        let mut model = LpModel::new("wide");
        let mut rows_terms: Vec<Vec<(String, f64)>> = vec![Vec::new(); rows];
        let mut objective = Vec::with_capacity(columns);
        for j in 0..columns {
            let name = format!("Rt_{j}");
            model.add_variable(LpVariable::continuous(name.clone(), 0.0));
            objective.push((name.clone(), 1.0 + (j % 17) as f64));
            let mut covered = vec![j % rows, (j * 7 + 3) % rows, (j * 13 + 5) % rows];
            covered.sort_unstable();
            covered.dedup();
            for r in covered {
                rows_terms[r].push((name.clone(), 1.0));
            }
        }
        model.set_objective(objective);
        for (r, terms) in rows_terms.into_iter().enumerate() {
            model.add_constraint(format!("Cust_{r}"), terms, Sense::Ge, 1.0);
        }
        model
    }

    #[test]
    fn test_time_limit_elapses() {
        let model = wide_covering_model(150, 600);
        assert!(model.validate().is_ok());

        let config = SolverConfig::default().with_time_limit_ms(1);
        let start = Instant::now();
        let s = MicroLpSolver::new().solve(&model, &config);

        assert_eq!(s.status, SolverStatus::Timeout);
        assert!(!s.is_solution_found());
        assert!(s.values.is_empty());
        assert!(s.duals.is_empty());
        assert!(s.objective_value.is_none());
        // the caller is released well before the engine would finish
        assert!(start.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn test_snap() {
        assert_eq!(snap(1e-12), 0.0);
        assert_eq!(snap(-1e-12), 0.0);
        assert_eq!(snap(0.5), 0.5);
    }
}
