//! Course timetabling engine.
//!
//! Assigns every weekly session of every course to a (professor, room,
//! time slot) triple so that all hard rules hold, then improves the
//! weighted soft-rule score.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Course`, `Professor`, `Room`, `TimeSlot`,
//!   the compiled `Instance`, index-based `Schedule` and `Assignment`
//! - **`validation`**: Input integrity checks (duplicate IDs, dangling
//!   references, courses nobody can teach)
//! - **`constraints`**: Hard and soft rules, the `ConstraintEngine` and the
//!   compiled `ConstraintGraph`
//! - **`cp`**: Backtracking search with forward checking for a feasible
//!   schedule
//! - **`ga`**: Feasibility-preserving genetic optimizer
//! - **`scheduler`**: The `Scheduler` façade, reports and KPIs
//! - **`config`**: Serde-loadable configuration
//!
//! # Outcomes
//!
//! Malformed input is a [`TimetableError`]. Infeasibility and budget
//! exhaustion are ordinary [`scheduler::SolveOutcome`] values.
//!
//! # Logging
//!
//! Emits `tracing` events with an `event` field; installing a subscriber is
//! left to the caller.
//!
//! # References
//!
//! - Schaerf (1999), "A survey of automated timetabling"
//! - Burke & Petrovic (2002), "Recent research directions in automated
//!   timetabling"
//! - Russell & Norvig, "Artificial Intelligence: A Modern Approach", Ch. 6

pub mod config;
pub mod constraints;
pub mod cp;
pub mod error;
pub mod ga;
pub mod models;
pub mod scheduler;
pub mod validation;

#[cfg(test)]
mod test_utils;

pub use error::{Result, TimetableError};
