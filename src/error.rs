//! Error type for master problem construction and extraction.
//!
//! Structural problems (bad entities, missing model, wrong mode) are errors.
//! Solver outcomes such as infeasibility are reported as
//! [`SolverStatus`](crate::lp::SolverStatus) values, not as errors, except
//! when a caller asks for solution values that do not exist.

use crate::lp::SolverStatus;

/// Errors raised while building or reading the restricted master problem.
#[derive(Debug)]
pub enum MasterError {
    /// The route pool is empty; an objective over zero variables is degenerate.
    EmptyRoutePool,
    /// A route stop names a customer the problem does not know.
    UnknownCustomer { route: usize, customer: usize },
    /// A route stop names a depot.
    DepotStop { route: usize, customer: usize },
    /// A route visits the same customer twice.
    DuplicateStop { route: usize, customer: usize },
    /// A route with this id is already registered.
    DuplicateRoute(usize),
    /// Two customers share the same number.
    DuplicateCustomer(usize),
    /// Route cost is negative or not finite.
    InvalidCost { route: usize, cost: f64 },
    /// No model has been built since construction or the last mode switch.
    ModelNotBuilt,
    /// The model was built from fewer routes than the store now holds.
    StaleModel { built: usize, available: usize },
    /// The operation is not meaningful in the current variable mode.
    InvalidMode(&'static str),
    /// No optimal solution is available to read values from.
    NotSolved { status: Option<SolverStatus> },
    /// The LP model is internally inconsistent.
    InvalidModel(String),
    /// A configuration value is out of range.
    InvalidConfig(String),
    /// Writing the model export failed.
    Io(std::io::Error),
}

impl std::fmt::Display for MasterError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MasterError::EmptyRoutePool => write!(f, "route pool is empty"),
            MasterError::UnknownCustomer { route, customer } => {
                write!(f, "route {route} visits unknown customer {customer}")
            }
            MasterError::DepotStop { route, customer } => {
                write!(f, "route {route} lists depot {customer} as a stop")
            }
            MasterError::DuplicateStop { route, customer } => {
                write!(f, "route {route} visits customer {customer} more than once")
            }
            MasterError::DuplicateRoute(id) => write!(f, "route {id} is already registered"),
            MasterError::DuplicateCustomer(no) => write!(f, "customer {no} is defined twice"),
            MasterError::InvalidCost { route, cost } => {
                write!(f, "route {route} has invalid cost {cost}")
            }
            MasterError::ModelNotBuilt => write!(f, "master model has not been built"),
            MasterError::StaleModel { built, available } => write!(
                f,
                "master model was built from {built} routes but {available} are available"
            ),
            MasterError::InvalidMode(msg) => write!(f, "invalid mode: {msg}"),
            MasterError::NotSolved { status: Some(status) } => {
                write!(f, "no optimal solution available (status: {status:?})")
            }
            MasterError::NotSolved { status: None } => write!(f, "model has not been solved"),
            MasterError::InvalidModel(msg) => write!(f, "invalid model: {msg}"),
            MasterError::InvalidConfig(msg) => write!(f, "invalid config: {msg}"),
            MasterError::Io(err) => write!(f, "failed to write model: {err}"),
        }
    }
}

impl std::error::Error for MasterError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            MasterError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for MasterError {
    fn from(err: std::io::Error) -> Self {
        MasterError::Io(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = MasterError::UnknownCustomer { route: 3, customer: 9 };
        assert_eq!(err.to_string(), "route 3 visits unknown customer 9");

        let err = MasterError::NotSolved {
            status: Some(SolverStatus::Infeasible),
        };
        assert!(err.to_string().contains("Infeasible"));
    }

    #[test]
    fn test_io_source() {
        use std::error::Error;

        let err = MasterError::from(std::io::Error::other("disk full"));
        assert!(err.source().is_some());
        assert!(MasterError::EmptyRoutePool.source().is_none());
    }
}
