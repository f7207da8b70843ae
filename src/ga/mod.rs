//! Feasibility-preserving genetic optimization of soft constraints.
//!
//! The population is seeded from hard-feasible schedules and never leaves
//! the feasible region: every operator checks a move against the
//! constraint engine before committing it and rolls back otherwise. The
//! objective is the weighted soft penalty (lower is better).
//!
//! # Submodules
//!
//! - [`operators`]: perturbation, crossover with repair, mutation
//!
//! # Reference
//! - Burke & Petrovic (2002), "Recent research directions in automated
//!   timetabling"
//! - Goldberg (1989), *Genetic Algorithms in Search, Optimization, and
//!   Machine Learning*

mod chromosome;
pub mod operators;
mod runner;
mod selection;

pub use chromosome::Individual;
pub use runner::{GaResult, GaRunner, GaStats, SeedSource, TerminationReason};
pub use selection::tournament;
