//! Restricted master problem (RMP) of a column-generation loop.
//!
//! A set-covering LP over the current route pool:
//!
//! ```text
//!   min  Σ_r cost_r · x_r
//!   s.t. Σ_{r ∋ c} x_r >= 1      for every non-depot customer c   [Cust_c]
//!        Σ_r x_r <= fleet size                                     [Vehicles]
//!        x_r >= 0  (relaxed)   or   x_r ∈ {0, 1}  (integer)
//! ```
//!
//! The driver rebuilds the model whenever pricing adds routes, solves the
//! relaxation, optionally smooths the coverage duals with
//! [`MasterProblem::stabilize_duals`], and hands the customers' duals plus
//! [`MasterProblem::vehicle_dual`] to pricing. A final integer solve picks
//! routes with [`MasterProblem::selected_routes`].

mod config;
mod problem;
mod solution;

pub use config::{MasterConfig, VariableMode};
pub use problem::{coverage_name, route_var_name, MasterProblem, MODEL_NAME, VEHICLE_CONSTRAINT};
pub use solution::{select_routes, SelectedRoute, SolutionComponents, ROUNDING_THRESHOLD};
