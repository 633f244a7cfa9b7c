//! Restricted master problem: model construction and solving.

use super::config::{MasterConfig, VariableMode};
use crate::entities::{Problem, RouteStore};
use crate::error::MasterError;
use crate::lp::{
    LpModel, LpSolution, LpSolver, LpVariable, MicroLpSolver, Sense, SolverStatus, VarDomain,
};
use crate::stabilization::{PerturbationBase, StabilizationResult, StabilizationRunner};
use std::path::Path;
use tracing::{debug, info, warn};

/// Name of the LP model.
pub const MODEL_NAME: &str = "Master";

/// Name of the fleet-size constraint.
pub const VEHICLE_CONSTRAINT: &str = "Vehicles";

/// Name of the decision variable bound to a route.
pub fn route_var_name(route_id: usize) -> String {
    format!("Rt_{route_id}")
}

/// Name of a customer's coverage constraint.
pub fn coverage_name(cust_no: usize) -> String {
    format!("Cust_{cust_no}")
}

/// The restricted master problem of a column-generation loop.
///
/// Owns the problem instance, the route pool and the transient LP model.
/// The model is rebuilt in full whenever routes are added or the variable
/// mode changes; only dual values and constraint bindings copied into the
/// customers outlive a rebuild.
///
/// # Examples
///
/// ```
/// use u_colgen::entities::{Customer, Problem, Route, RouteStore, Vehicles};
/// use u_colgen::master::MasterProblem;
/// use u_colgen::lp::SolverStatus;
///
/// let problem = Problem::new(
///     vec![Customer::depot(0), Customer::new(1), Customer::new(2)],
///     Vehicles { number: 2 },
/// ).unwrap();
/// let mut routes = RouteStore::new();
/// routes.add(Route::new(0, 4.0, vec![1]).unwrap()).unwrap();
/// routes.add(Route::new(1, 5.0, vec![2]).unwrap()).unwrap();
///
/// let mut master = MasterProblem::new(problem, routes);
/// master.formulate_problem().unwrap();
/// master.vehicle_constraint().unwrap();
/// assert_eq!(master.solve(true).unwrap(), SolverStatus::Optimal);
/// assert!((master.objective_value().unwrap() - 9.0).abs() < 1e-9);
/// ```
#[derive(Debug)]
pub struct MasterProblem<S: LpSolver = MicroLpSolver> {
    pub(super) problem: Problem,
    pub(super) routes: RouteStore,
    pub(super) solver: S,
    pub(super) config: MasterConfig,
    pub(super) model: Option<LpModel>,
    /// (route id, variable name) in variable creation order
    pub(super) route_vars: Vec<(usize, String)>,
    /// (customer number, constraint name) in constraint creation order
    pub(super) cov_cons: Vec<(usize, String)>,
    pub(super) last_solution: Option<LpSolution>,
}

impl MasterProblem<MicroLpSolver> {
    /// Creates a master problem with the bundled solver and default settings.
    pub fn new(problem: Problem, routes: RouteStore) -> Self {
        Self::build(problem, routes, MicroLpSolver::new(), MasterConfig::default())
    }
}

impl<S: LpSolver> MasterProblem<S> {
    /// Creates a master problem with a custom solver and configuration.
    pub fn with_solver(
        problem: Problem,
        routes: RouteStore,
        solver: S,
        config: MasterConfig,
    ) -> Result<Self, MasterError> {
        config.validate().map_err(MasterError::InvalidConfig)?;
        Ok(Self::build(problem, routes, solver, config))
    }

    fn build(problem: Problem, routes: RouteStore, solver: S, config: MasterConfig) -> Self {
        Self {
            problem,
            routes,
            solver,
            config,
            model: None,
            route_vars: Vec::new(),
            cov_cons: Vec::new(),
            last_solution: None,
        }
    }

    /// The problem instance, including current customer duals.
    pub fn problem(&self) -> &Problem {
        &self.problem
    }

    /// The route pool.
    pub fn routes(&self) -> &RouteStore {
        &self.routes
    }

    /// Mutable access to the route pool, for appending priced routes.
    ///
    /// The current model becomes stale once routes are added; rebuild it
    /// before the next solve.
    pub fn routes_mut(&mut self) -> &mut RouteStore {
        &mut self.routes
    }

    /// Active configuration.
    pub fn config(&self) -> &MasterConfig {
        &self.config
    }

    /// Current variable mode.
    pub fn mode(&self) -> VariableMode {
        self.config.mode
    }

    /// Switches the variable domain.
    ///
    /// The current model is discarded: the domain is fixed at build time,
    /// so the caller must rebuild before solving again.
    pub fn set_mode(&mut self, mode: VariableMode) {
        if mode != self.config.mode {
            debug!(from = ?self.config.mode, to = ?mode, "variable mode changed, model discarded");
            self.config.mode = mode;
            self.discard_model();
        }
    }

    /// Replaces the stabilization settings.
    pub fn set_stabilization(
        &mut self,
        stabilization: crate::stabilization::StabilizationConfig,
    ) -> Result<(), MasterError> {
        stabilization.validate().map_err(MasterError::InvalidConfig)?;
        self.config.stabilization = stabilization;
        Ok(())
    }

    /// The current model, if built.
    pub fn model(&self) -> Option<&LpModel> {
        self.model.as_ref()
    }

    /// Coverage constraints as (customer number, constraint name), in creation order.
    pub fn cov_cons(&self) -> &[(usize, String)] {
        &self.cov_cons
    }

    /// Route variables as (route id, variable name), in creation order.
    pub fn route_vars(&self) -> &[(usize, String)] {
        &self.route_vars
    }

    /// Raw solver output of the last solve.
    pub fn last_solution(&self) -> Option<&LpSolution> {
        self.last_solution.as_ref()
    }

    fn discard_model(&mut self) {
        self.model = None;
        self.route_vars.clear();
        self.cov_cons.clear();
        self.last_solution = None;
        for customer in self.problem.customers_mut() {
            customer.unbind_constraint();
        }
    }

    /// Starts a fresh model with one variable per route.
    ///
    /// Binary variables in [`VariableMode::Integer`], continuous variables
    /// with lower bound 0 otherwise. Fails if the pool is empty or a route
    /// stop does not name a known non-depot customer; on failure no model
    /// remains.
    pub fn add_variables(&mut self) -> Result<(), MasterError> {
        self.discard_model();

        if self.routes.is_empty() {
            return Err(MasterError::EmptyRoutePool);
        }
        for route in self.routes.iter() {
            for &customer in route.stops() {
                match self.problem.customer(customer) {
                    None => {
                        return Err(MasterError::UnknownCustomer {
                            route: route.id(),
                            customer,
                        })
                    }
                    Some(c) if c.is_depot() => {
                        return Err(MasterError::DepotStop {
                            route: route.id(),
                            customer,
                        })
                    }
                    Some(_) => {}
                }
            }
        }

        let mut model = LpModel::new(MODEL_NAME);
        for route in self.routes.iter() {
            let name = route_var_name(route.id());
            let var = match self.config.mode.domain() {
                VarDomain::Continuous => LpVariable::continuous(name.clone(), 0.0),
                VarDomain::Binary => LpVariable::binary(name.clone()),
            };
            model.add_variable(var);
            self.route_vars.push((route.id(), name));
        }

        debug!(
            routes = self.route_vars.len(),
            mode = ?self.config.mode,
            "master variables created"
        );
        self.model = Some(model);
        Ok(())
    }

    /// Sets the objective: minimize total route cost.
    pub fn set_objective(&mut self) -> Result<(), MasterError> {
        let model = self.model.as_mut().ok_or(MasterError::ModelNotBuilt)?;
        let terms = self
            .route_vars
            .iter()
            .filter_map(|(id, name)| self.routes.get(*id).map(|r| (name.clone(), r.cost())))
            .collect();
        model.set_objective(terms);
        Ok(())
    }

    /// Adds `Σ routes visiting c ≥ 1` for every non-depot customer `c`.
    ///
    /// Each constraint is named after its customer and the name is recorded
    /// on the customer and in [`cov_cons`](Self::cov_cons).
    pub fn coverage_constraint(&mut self) -> Result<(), MasterError> {
        let model = self.model.as_mut().ok_or(MasterError::ModelNotBuilt)?;
        self.cov_cons.clear();

        for customer in self.problem.customers_mut() {
            if customer.is_depot() {
                continue;
            }
            let name = coverage_name(customer.cust_no());
            let terms: Vec<(String, f64)> = self
                .routes
                .in_routes(customer.cust_no())
                .map(|id| (route_var_name(id), 1.0))
                .collect();
            if terms.is_empty() {
                warn!(customer = customer.cust_no(), "customer is not covered by any route");
            }
            model.add_constraint(name.clone(), terms, Sense::Ge, 1.0);
            customer.bind_constraint(name.clone());
            self.cov_cons.push((customer.cust_no(), name));
        }

        debug!(constraints = self.cov_cons.len(), "coverage constraints added");
        Ok(())
    }

    /// Adds `Σ all routes ≤ fleet size`.
    pub fn vehicle_constraint(&mut self) -> Result<(), MasterError> {
        let model = self.model.as_mut().ok_or(MasterError::ModelNotBuilt)?;
        let terms = self
            .route_vars
            .iter()
            .map(|(_, name)| (name.clone(), 1.0))
            .collect();
        let fleet = self.problem.vehicles().number as f64;
        model.add_constraint(VEHICLE_CONSTRAINT, terms, Sense::Le, fleet);
        Ok(())
    }

    /// Variables, objective and coverage constraints, in that order.
    ///
    /// The vehicle constraint is left to the caller.
    pub fn formulate_problem(&mut self) -> Result<(), MasterError> {
        self.add_variables()?;
        self.set_objective()?;
        self.coverage_constraint()
    }

    /// Writes the current model in LP text format, to `_lp.lp` by default.
    pub fn write_lp(&self, path: Option<&Path>) -> Result<(), MasterError> {
        let model = self.model.as_ref().ok_or(MasterError::ModelNotBuilt)?;
        model.write_lp(path)?;
        Ok(())
    }

    /// Solves the current model.
    ///
    /// With `relaxed`, the coverage duals of an optimal solution are copied
    /// into the customers. Non-optimal outcomes are returned as the status;
    /// customer duals are then left untouched.
    pub fn solve(&mut self, relaxed: bool) -> Result<SolverStatus, MasterError> {
        let model = self.model.as_ref().ok_or(MasterError::ModelNotBuilt)?;
        if self.route_vars.len() != self.routes.len() {
            return Err(MasterError::StaleModel {
                built: self.route_vars.len(),
                available: self.routes.len(),
            });
        }
        if relaxed && self.config.mode == VariableMode::Integer {
            return Err(MasterError::InvalidMode(
                "dual prices need a model built in relaxed mode",
            ));
        }

        let solution = self.solver.solve(model, &self.config.solver);
        let status = solution.status;

        if status.is_optimal() {
            info!(
                objective = ?solution.objective_value,
                routes = self.route_vars.len(),
                time_ms = solution.solve_time_ms,
                "master solved"
            );
            if relaxed {
                for (cust_no, name) in &self.cov_cons {
                    let Some(customer) = self.problem.customer_mut(*cust_no) else {
                        continue;
                    };
                    match solution.dual(name) {
                        Some(dual) => customer.set_dual(dual),
                        None => warn!(constraint = %name, "solver reported no dual price"),
                    }
                }
            }
        } else {
            warn!(?status, "master solve did not reach optimality");
        }

        self.last_solution = Some(solution);
        Ok(status)
    }

    /// Runs randomized dual stabilization on the last relaxed solution.
    ///
    /// Returns `Ok(None)` without touching any dual when stabilization is
    /// disabled. Otherwise every customer dual is reset to zero and then
    /// overwritten with the average of the perturbed re-solves.
    pub fn stabilize_duals(&mut self) -> Result<Option<StabilizationResult>, MasterError> {
        if !self.config.stabilization.enabled {
            return Ok(None);
        }
        if self.config.mode == VariableMode::Integer {
            return Err(MasterError::InvalidMode(
                "stabilization needs a model built in relaxed mode",
            ));
        }
        let components = self.solution_components()?;
        let model = self.model.as_ref().ok_or(MasterError::ModelNotBuilt)?;
        if self.cov_cons.is_empty() {
            return Err(MasterError::InvalidModel(
                "no coverage constraints to stabilize".into(),
            ));
        }

        let base = PerturbationBase {
            model,
            components: &components,
            cov_cons: &self.cov_cons,
            route_vars: &self.route_vars,
            total_customers: self.problem.total_customers(),
        };
        let result = StabilizationRunner::run(
            &base,
            &self.solver,
            &self.config.solver,
            &self.config.stabilization,
        );

        for customer in self.problem.customers_mut() {
            customer.set_dual(0.0);
        }
        for (&cust_no, &dual) in &result.duals {
            if let Some(customer) = self.problem.customer_mut(cust_no) {
                customer.set_dual(dual);
            }
        }

        info!(
            trials = result.trials,
            failed = result.failed_trials,
            "Duals updated"
        );
        Ok(Some(result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{Customer, Route, Vehicles};

    fn problem(customers: usize, vehicles: usize) -> Problem {
        let mut list = vec![Customer::depot(0)];
        list.extend((1..=customers).map(Customer::new));
        Problem::new(list, Vehicles { number: vehicles }).expect("valid problem")
    }

    fn store(routes: &[(usize, f64, &[usize])]) -> RouteStore {
        let mut store = RouteStore::new();
        for &(id, cost, stops) in routes {
            store
                .add(Route::new(id, cost, stops.to_vec()).expect("valid route"))
                .expect("unique id");
        }
        store
    }

    /// Three customers; route A covers {1,2} for 10, route B covers {1,2,3} for 12.
    fn scenario() -> MasterProblem {
        MasterProblem::new(
            problem(3, 2),
            store(&[(0, 10.0, &[1, 2]), (1, 12.0, &[1, 2, 3])]),
        )
    }

    #[test]
    fn test_empty_route_pool() {
        let mut master = MasterProblem::new(problem(2, 1), RouteStore::new());
        assert!(matches!(
            master.add_variables(),
            Err(MasterError::EmptyRoutePool)
        ));
        assert!(master.model().is_none());
    }

    #[test]
    fn test_unknown_customer() {
        let mut master = MasterProblem::new(problem(2, 1), store(&[(0, 1.0, &[1, 9])]));
        assert!(matches!(
            master.formulate_problem(),
            Err(MasterError::UnknownCustomer { route: 0, customer: 9 })
        ));
        assert!(master.model().is_none());
    }

    #[test]
    fn test_depot_stop() {
        let mut master = MasterProblem::new(problem(2, 1), store(&[(3, 1.0, &[0, 1])]));
        assert!(matches!(
            master.add_variables(),
            Err(MasterError::DepotStop { route: 3, customer: 0 })
        ));
    }

    #[test]
    fn test_requires_variables_first() {
        let mut master = scenario();
        assert!(matches!(master.set_objective(), Err(MasterError::ModelNotBuilt)));
        assert!(matches!(
            master.coverage_constraint(),
            Err(MasterError::ModelNotBuilt)
        ));
        assert!(matches!(
            master.vehicle_constraint(),
            Err(MasterError::ModelNotBuilt)
        ));
        assert!(matches!(master.solve(true), Err(MasterError::ModelNotBuilt)));
    }

    #[test]
    fn test_formulation_shape() {
        let mut master = scenario();
        master.formulate_problem().expect("build");
        master.vehicle_constraint().expect("vehicles");

        let model = master.model().expect("built");
        assert_eq!(model.num_variables(), 2);
        assert_eq!(model.num_constraints(), 4);
        assert_eq!(
            model.objective(),
            &[("Rt_0".to_string(), 10.0), ("Rt_1".to_string(), 12.0)]
        );

        let c3 = model.constraint("Cust_3").expect("coverage of 3");
        assert_eq!(c3.terms, vec![("Rt_1".to_string(), 1.0)]);
        assert_eq!(c3.sense, Sense::Ge);
        assert_eq!(c3.rhs, 1.0);

        let v = model.constraint(VEHICLE_CONSTRAINT).expect("vehicles");
        assert_eq!(v.sense, Sense::Le);
        assert_eq!(v.rhs, 2.0);
        assert_eq!(v.terms.len(), 2);

        assert_eq!(
            master.cov_cons(),
            &[
                (1, "Cust_1".to_string()),
                (2, "Cust_2".to_string()),
                (3, "Cust_3".to_string())
            ]
        );
        let c1 = master.problem().customer(1).expect("customer 1");
        assert_eq!(c1.constraint_name(), Some("Cust_1"));
        assert!(master.problem().customer(0).expect("depot").constraint_name().is_none());
    }

    #[test]
    fn test_scenario_relaxation() {
        let mut master = scenario();
        master.formulate_problem().expect("build");
        master.vehicle_constraint().expect("vehicles");

        assert_eq!(master.solve(true).expect("solve"), SolverStatus::Optimal);
        assert!((master.objective_value().expect("objective") - 12.0).abs() < 1e-9);

        let solution = master.last_solution().expect("solved");
        assert_eq!(solution.slack("Cust_1"), Some(0.0));
        assert_eq!(solution.slack("Cust_2"), Some(0.0));
        assert_eq!(solution.slack("Cust_3"), Some(0.0));
        assert!((solution.slack(VEHICLE_CONSTRAINT).expect("slack") - 1.0).abs() < 1e-9);

        // any optimal dual prices route B at its cost
        let duals = master.problem().duals();
        let priced: f64 = duals.values().sum();
        assert!((priced - 12.0).abs() < 1e-7);
        assert!(duals.values().all(|&d| d >= -1e-9));
        assert_eq!(master.vehicle_dual(), Some(0.0));
    }

    #[test]
    fn test_rebuild_is_idempotent() {
        let mut master = scenario();
        master.formulate_problem().expect("build");
        let first_text = master.model().expect("built").to_lp_string();
        master.solve(true).expect("solve");
        let first = master.objective_value().expect("objective");

        master.formulate_problem().expect("rebuild");
        assert_eq!(master.model().expect("built").to_lp_string(), first_text);
        master.solve(true).expect("solve");
        assert_eq!(master.objective_value(), Some(first));
    }

    #[test]
    fn test_adding_route_never_increases_objective() {
        let mut master = scenario();
        master.formulate_problem().expect("build");
        master.solve(true).expect("solve");
        let before = master.objective_value().expect("objective");

        let id = master.routes().next_id();
        master
            .routes_mut()
            .add(Route::new(id, 3.0, vec![3]).expect("route"))
            .expect("add");
        assert!(matches!(
            master.solve(true),
            Err(MasterError::StaleModel { built: 2, available: 3 })
        ));

        master.formulate_problem().expect("rebuild");
        master.solve(true).expect("solve");
        let after = master.objective_value().expect("objective");
        assert!(after <= before + 1e-9);
        // A + {3} = 13 is worse than B alone, so the optimum stays at 12
        assert!((after - 12.0).abs() < 1e-9);
    }

    #[test]
    fn test_uncovered_customer_is_infeasible() {
        let mut master = MasterProblem::new(problem(3, 2), store(&[(0, 10.0, &[1, 2])]));
        master.formulate_problem().expect("build");
        assert_eq!(master.solve(true).expect("solve"), SolverStatus::Infeasible);
        assert!(matches!(
            master.solution_components(),
            Err(MasterError::NotSolved {
                status: Some(SolverStatus::Infeasible)
            })
        ));
        assert!(master.objective_value().is_none());
    }

    #[test]
    fn test_mode_switch_requires_rebuild() {
        let mut master = scenario();
        master.formulate_problem().expect("build");
        master.set_mode(VariableMode::Integer);
        assert!(master.model().is_none());
        assert!(master.cov_cons().is_empty());
        assert!(matches!(master.solve(false), Err(MasterError::ModelNotBuilt)));

        master.formulate_problem().expect("rebuild");
        assert!(master.model().expect("built").has_integer_vars());
        assert!(matches!(master.solve(true), Err(MasterError::InvalidMode(_))));
        assert_eq!(master.solve(false).expect("solve"), SolverStatus::Optimal);
    }

    #[test]
    fn test_variable_domain_follows_mode() {
        let mut master = scenario();
        for mode in [VariableMode::Relaxed, VariableMode::Integer] {
            master.set_mode(mode);
            master.add_variables().expect("variables");
            let model = master.model().expect("built");
            for var in model.variables() {
                assert_eq!(var.domain, mode.domain());
                assert_eq!(var.lower, 0.0);
            }
            let upper = model.variable("Rt_0").expect("route var").upper;
            match mode {
                VariableMode::Relaxed => assert_eq!(upper, None),
                VariableMode::Integer => assert_eq!(upper, Some(1.0)),
            }
        }
    }

    #[test]
    fn test_integer_solve_leaves_duals() {
        let mut master = scenario();
        master.set_mode(VariableMode::Integer);
        master.formulate_problem().expect("build");
        master.solve(false).expect("solve");
        assert!(master.problem().duals().values().all(|&d| d == 0.0));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = MasterConfig::default().with_stabilization(
            crate::stabilization::StabilizationConfig::default().with_trials(0),
        );
        let result = MasterProblem::with_solver(
            problem(1, 1),
            RouteStore::new(),
            MicroLpSolver::new(),
            config,
        );
        assert!(matches!(result, Err(MasterError::InvalidConfig(_))));
    }

    #[test]
    fn test_write_lp() {
        let mut master = scenario();
        assert!(matches!(master.write_lp(None), Err(MasterError::ModelNotBuilt)));

        master.formulate_problem().expect("build");
        master.vehicle_constraint().expect("vehicles");
        let path = std::env::temp_dir().join(format!("u_colgen_master_{}.lp", std::process::id()));
        master.write_lp(Some(&path)).expect("write");
        let text = std::fs::read_to_string(&path).expect("read");
        let _ = std::fs::remove_file(&path);

        assert!(text.contains("OBJ: 10 Rt_0 + 12 Rt_1"));
        assert!(text.contains("Cust_3: Rt_1 >= 1"));
        assert!(text.contains("Vehicles: Rt_0 + Rt_1 <= 2"));
    }
}
