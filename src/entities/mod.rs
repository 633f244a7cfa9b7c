//! Passive data holders for the master problem.
//!
//! Customers and the fleet size live in a [`Problem`]; candidate routes
//! produced by pricing accumulate in a [`RouteStore`]. Neither knows about
//! the LP model: the master problem reads them to build a model and writes
//! dual values back into customers after each solve.

mod customer;
mod problem;
mod route;
mod route_store;

pub use customer::Customer;
pub use problem::{Problem, Vehicles};
pub use route::Route;
pub use route_store::RouteStore;
