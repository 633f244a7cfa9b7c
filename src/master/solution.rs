//! Reading results out of a solved master problem.

use super::config::VariableMode;
use super::problem::{MasterProblem, VEHICLE_CONSTRAINT};
use crate::error::MasterError;
use crate::lp::{LpSolution, LpSolver};
use std::collections::BTreeMap;
use tracing::info;

/// Values strictly above this are treated as selected in an integer solution.
pub const ROUNDING_THRESHOLD: f64 = 0.5;

/// Primal, slack, dual and reduced-cost values of an optimal master solution.
///
/// Route quantities are keyed by route id and coverage quantities by
/// customer number, so nothing depends on the order in which the solver
/// returned them. Duals and reduced costs are empty for integer solves.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SolutionComponents {
    /// Route id → variable value.
    pub primal: BTreeMap<usize, f64>,
    /// Customer number → slack of its coverage constraint.
    pub slack: BTreeMap<usize, f64>,
    /// Customer number → dual price of its coverage constraint.
    pub dual: BTreeMap<usize, f64>,
    /// Route id → reduced cost.
    pub reduced_cost: BTreeMap<usize, f64>,
}

impl SolutionComponents {
    /// Extracts the components tracked by the master problem from a raw solution.
    pub fn extract(
        solution: &LpSolution,
        route_vars: &[(usize, String)],
        cov_cons: &[(usize, String)],
    ) -> Self {
        Self {
            primal: keyed(route_vars, |name| solution.value(name)),
            slack: keyed(cov_cons, |name| solution.slack(name)),
            dual: keyed(cov_cons, |name| solution.dual(name)),
            reduced_cost: keyed(route_vars, |name| solution.reduced_cost(name)),
        }
    }
}

fn keyed(
    names: &[(usize, String)],
    lookup: impl Fn(&str) -> Option<f64>,
) -> BTreeMap<usize, f64> {
    names
        .iter()
        .filter_map(|(key, name)| lookup(name).map(|value| (*key, value)))
        .collect()
}

/// A route chosen by an integer solution.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SelectedRoute {
    /// Route id.
    pub id: usize,
    /// Customer numbers in visit order.
    pub stops: Vec<usize>,
}

/// Ids of routes whose value is strictly greater than [`ROUNDING_THRESHOLD`].
///
/// # Examples
///
/// ```
/// use std::collections::BTreeMap;
/// use u_colgen::master::select_routes;
///
/// let primal = BTreeMap::from([(0, 1.0), (1, 0.5), (2, 0.51), (3, 0.0)]);
/// assert_eq!(select_routes(&primal), vec![0, 2]);
/// ```
pub fn select_routes(primal: &BTreeMap<usize, f64>) -> Vec<usize> {
    primal
        .iter()
        .filter(|(_, &value)| value > ROUNDING_THRESHOLD)
        .map(|(&id, _)| id)
        .collect()
}

impl<S: LpSolver> MasterProblem<S> {
    fn optimal_solution(&self) -> Result<&LpSolution, MasterError> {
        match &self.last_solution {
            Some(solution) if solution.is_solution_found() => Ok(solution),
            Some(solution) => Err(MasterError::NotSolved {
                status: Some(solution.status),
            }),
            None => Err(MasterError::NotSolved { status: None }),
        }
    }

    /// Primal values, coverage slacks, coverage duals and reduced costs of
    /// the last solve.
    ///
    /// Fails with [`MasterError::NotSolved`] unless the last solve was optimal.
    pub fn solution_components(&self) -> Result<SolutionComponents, MasterError> {
        let solution = self.optimal_solution()?;
        Ok(SolutionComponents::extract(
            solution,
            &self.route_vars,
            &self.cov_cons,
        ))
    }

    /// Objective value of the last optimal solve.
    pub fn objective_value(&self) -> Option<f64> {
        self.optimal_solution().ok()?.objective_value
    }

    /// Dual price of the vehicle constraint in the last optimal relaxed solve.
    pub fn vehicle_dual(&self) -> Option<f64> {
        self.optimal_solution().ok()?.dual(VEHICLE_CONSTRAINT)
    }

    /// Routes used by the last integer solution, with their customer sequences.
    ///
    /// Only meaningful for models built in [`VariableMode::Integer`].
    pub fn selected_routes(&self) -> Result<Vec<SelectedRoute>, MasterError> {
        if self.config.mode != VariableMode::Integer {
            return Err(MasterError::InvalidMode(
                "route selection needs a model built in integer mode",
            ));
        }
        let components = self.solution_components()?;

        let selected: Vec<SelectedRoute> = select_routes(&components.primal)
            .into_iter()
            .filter_map(|id| {
                self.routes.get(id).map(|route| SelectedRoute {
                    id,
                    stops: route.stops().to_vec(),
                })
            })
            .collect();

        for route in &selected {
            info!(route = route.id, stops = ?route.stops, "selected route");
        }
        Ok(selected)
    }
}
