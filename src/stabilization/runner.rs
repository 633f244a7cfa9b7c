//! Stabilization execution loop.

use super::config::StabilizationConfig;
use crate::lp::{LpModel, LpSolver, SolverConfig, SolverStatus};
use crate::master::SolutionComponents;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// The solved master state that trials perturb.
///
/// `cov_cons` and `route_vars` pair customer numbers and route ids with
/// their constraint and variable names in `model`.
#[derive(Debug, Clone, Copy)]
pub struct PerturbationBase<'a> {
    /// Model of the last relaxed solve. Never modified; each trial clones it.
    pub model: &'a LpModel,
    /// Components of the last relaxed solve.
    pub components: &'a SolutionComponents,
    /// (customer number, coverage constraint name).
    pub cov_cons: &'a [(usize, String)],
    /// (route id, variable name).
    pub route_vars: &'a [(usize, String)],
    /// Number of non-depot customers; one uniform is drawn per customer and trial.
    pub total_customers: usize,
}

/// Result of a stabilization run.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StabilizationResult {
    /// Customer number → averaged dual.
    pub duals: BTreeMap<usize, f64>,

    /// Number of trials that entered the average.
    pub trials: usize,

    /// Number of trials whose solve did not reach optimality.
    pub failed_trials: usize,
}

struct TrialOutcome {
    status: SolverStatus,
    duals: Vec<f64>,
}

/// Executes randomized dual stabilization.
pub struct StabilizationRunner;

impl StabilizationRunner {
    /// Runs all trials and averages their coverage duals.
    ///
    /// `config.enabled` is not consulted here; callers decide whether to run.
    pub fn run<S: LpSolver>(
        base: &PerturbationBase<'_>,
        solver: &S,
        solver_config: &SolverConfig,
        config: &StabilizationConfig,
    ) -> StabilizationResult {
        let mut rng = StdRng::seed_from_u64(config.seed);

        // R_star: routes in the support of the current solution
        let in_support: Vec<bool> = base
            .route_vars
            .iter()
            .map(|(id, _)| base.components.primal.get(id).is_some_and(|&x| x > 0.0))
            .collect();
        // Not_C: coverage constraints without positive slack
        let binding: Vec<bool> = base
            .cov_cons
            .iter()
            .map(|(no, _)| base.components.slack.get(no).is_none_or(|&s| s <= 0.0))
            .collect();

        // Drawn up front so that trial order, not solve order, fixes the stream.
        let width = base.total_customers.max(base.cov_cons.len());
        let draws: Vec<Vec<f64>> = (0..config.trials)
            .map(|_| (0..width).map(|_| rng.random::<f64>()).collect())
            .collect();

        debug!(
            trials = config.trials,
            binding = binding.iter().filter(|&&b| b).count(),
            support = in_support.iter().filter(|&&s| s).count(),
            "stabilization started"
        );

        let solve =
            |u: &Vec<f64>| run_trial(base, &binding, &in_support, u, solver, solver_config);

        #[cfg(feature = "parallel")]
        let outcomes: Vec<TrialOutcome> = if config.parallel {
            draws.par_iter().map(solve).collect()
        } else {
            draws.iter().map(solve).collect()
        };

        #[cfg(not(feature = "parallel"))]
        let outcomes: Vec<TrialOutcome> = {
            if config.parallel {
                debug!("built without the `parallel` feature, solving trials sequentially");
            }
            draws.iter().map(solve).collect()
        };

        let mut accepted = Vec::with_capacity(outcomes.len());
        let mut failed_trials = 0;
        for (trial, outcome) in outcomes.into_iter().enumerate() {
            debug!(trial, status = ?outcome.status, "stabilization trial solved");
            if !outcome.status.is_optimal() {
                failed_trials += 1;
                warn!(trial, status = ?outcome.status, "stabilization trial did not reach optimality");
                if config.skip_failed_trials {
                    continue;
                }
            }
            accepted.push(outcome.duals);
        }
        if accepted.is_empty() {
            warn!("no stabilization trial entered the average, duals stay at zero");
        }

        let averaged = average_duals(&accepted);
        let duals = base
            .cov_cons
            .iter()
            .enumerate()
            .map(|(k, (no, _))| (*no, averaged.get(k).copied().unwrap_or(0.0)))
            .collect();

        StabilizationResult {
            duals,
            trials: accepted.len(),
            failed_trials,
        }
    }
}

fn run_trial<S: LpSolver>(
    base: &PerturbationBase<'_>,
    binding: &[bool],
    in_support: &[bool],
    u: &[f64],
    solver: &S,
    solver_config: &SolverConfig,
) -> TrialOutcome {
    let mut model = base.model.clone();

    for (k, (_, name)) in base.cov_cons.iter().enumerate() {
        let rhs = if binding[k] { u[k] } else { 0.0 };
        model.set_rhs(name, rhs);
    }
    for ((_, name), &positive) in base.route_vars.iter().zip(in_support) {
        model.set_lower_bound(name, trial_lower_bound(positive));
    }

    let solution = solver.solve(&model, solver_config);
    let duals = base
        .cov_cons
        .iter()
        .map(|(_, name)| solution.dual(name).unwrap_or(0.0))
        .collect();

    TrialOutcome {
        status: solution.status,
        duals,
    }
}

/// Lower bound given to a route variable during a trial.
///
/// Routes inside and outside the current support are both released to zero.
/// Bound-pinning variants of the procedure plug in here.
fn trial_lower_bound(_in_support: bool) -> f64 {
    0.0
}

/// Component-wise mean of equally long dual vectors.
///
/// Uses a running mean, so a component that is the same value `v` in every
/// vector averages to exactly `v`.
///
/// # Examples
///
/// ```
/// use u_colgen::stabilization::average_duals;
///
/// let avg = average_duals(&[vec![1.0, 0.1], vec![3.0, 0.1], vec![5.0, 0.1]]);
/// assert_eq!(avg, vec![3.0, 0.1]);
/// assert!(average_duals(&[]).is_empty());
/// ```
pub fn average_duals(trials: &[Vec<f64>]) -> Vec<f64> {
    let width = trials.first().map_or(0, Vec::len);
    let mut mean = vec![0.0; width];
    for (n, duals) in trials.iter().enumerate() {
        let count = (n + 1) as f64;
        for (m, &d) in mean.iter_mut().zip(duals) {
            *m += (d - *m) / count;
        }
    }
    mean
}
