//! Restricted master problem for column-generation vehicle routing.
//!
//! Provides the LP side of a column-generation loop over a route pool:
//!
//! - **Entities**: customers (with their current dual prices), the fleet,
//!   and an append-only route store with a customer → routes index.
//! - **LP layer**: a small solver-independent modeling layer (variables,
//!   named constraints, objective), LP-format export, and a [`microlp`]
//!   backed solver that reports primal values, slacks, duals and reduced
//!   costs.
//! - **Master problem**: builds the set-covering formulation, solves it
//!   relaxed or integer, copies coverage duals into customers, and exposes
//!   the selected routes of an integer solution.
//! - **Stabilization**: randomized interior-point smoothing of the
//!   coverage duals by averaging perturbed re-solves.
//!
//! # Architecture
//!
//! Route generation (pricing) is not part of this crate. A driver alternates
//! between [`master::MasterProblem`] and its own pricing routine, feeding new
//! routes in through [`master::MasterProblem::routes_mut`] and reading duals
//! back from [`entities::Problem`].

pub mod entities;
pub mod error;
pub mod lp;
pub mod master;
pub mod stabilization;

pub use error::MasterError;
