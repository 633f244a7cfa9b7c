//! Randomized dual stabilization.
//!
//! A single LP solve returns an extreme-point dual, which tends to jump
//! between iterations of column generation. This module re-solves the master
//! a fixed number of times with randomly perturbed coverage right-hand sides
//! and averages the resulting duals, approximating a point in the interior
//! of the optimal dual face.
//!
//! # Procedure
//!
//! 1. Split routes by primal value (`> 0` vs the rest) and coverage
//!    constraints by slack (`> 0` non-binding vs binding).
//! 2. For each trial draw one uniform `u[k]` in `[0, 1)` per customer; set
//!    binding constraint `k` to `rhs = u[k]` and non-binding ones to `0`.
//! 3. Release every route variable to a zero lower bound.
//! 4. Solve an independent copy of the model and record the coverage duals.
//! 5. Average the recorded duals component-wise.
//!
//! The generator is seeded at the start of every run, so repeated calls on
//! the same master state give identical duals.
//!
//! # References
//!
//! - Rousseau, Gendreau & Feillet (2007), "Interior point stabilization for
//!   column generation"
//! - du Merle, Villeneuve, Desrosiers & Hansen (1999), "Stabilized column
//!   generation"

mod config;
mod runner;

pub use config::StabilizationConfig;
pub use runner::{average_duals, PerturbationBase, StabilizationResult, StabilizationRunner};
