//! Linear programming modeling layer.
//!
//! Provides a small, engine-agnostic model for linear minimization
//! problems with named variables and constraints, plus the contract an
//! external solving engine fulfils.
//!
//! # Key Components
//!
//! - **Variables**: [`LpVariable`]: bounds and a continuous/binary domain
//! - **Model**: [`LpModel`]: variables, [`LpConstraint`]s, objective, LP export
//! - **Solver**: [`LpSolver`] trait: status, primal values, duals, slacks,
//!   reduced costs
//! - **Engine**: [`MicroLpSolver`]: adapter over the `microlp` crate
//!
//! # Design
//!
//! This module does NOT implement simplex or branch-and-bound. Engines plug
//! in through [`LpSolver`]; all results are keyed by name so callers never
//! depend on positional alignment.

mod export;
mod microlp_solver;
mod model;
mod solver;
mod variables;

pub use export::DEFAULT_LP_FILE;
pub use microlp_solver::MicroLpSolver;
pub use model::{LpConstraint, LpModel, Sense};
pub use solver::{LpSolution, LpSolver, SolverConfig, SolverStatus};
pub use variables::{LpVariable, VarDomain};
