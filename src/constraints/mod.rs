//! Constraint model.
//!
//! Constraints are named predicates over a (partial or complete)
//! [`Schedule`]. Hard constraints must hold in every returned schedule;
//! soft constraints contribute a weighted penalty to the score. Both
//! reference entities through the compiled [`Instance`] indices only, so
//! one constraint set serves every cloned candidate.
//!
//! # Submodules
//!
//! - [`hard`]: built-in hard constraints (clashes, capacity, availability)
//! - [`soft`]: built-in soft constraints (preferences, compactness, balance)
//!
//! # Reference
//! - Schaerf (1999), "A Survey of Automated Timetabling"
//! - Burke & Petrovic (2002), "Recent research directions in automated
//!   timetabling"

mod engine;
mod graph;
pub mod hard;
pub mod soft;

use std::fmt::Debug;

use crate::models::{Assignment, Instance, Schedule};

pub use engine::{ConstraintEngine, SoftScore, Verdict, Violation};
pub use graph::{ConstraintGraph, EmptyDomain};

/// A rule that must hold in every returned schedule.
pub trait HardConstraint: Debug + Send + Sync {
    /// Stable identifier, used in diagnostics.
    fn name(&self) -> &'static str;

    /// Whether the rule depends on the candidate alone.
    ///
    /// Static rules are folded into the static domains when the
    /// constraint graph is compiled.
    fn is_static(&self) -> bool {
        false
    }

    /// Whether adding `candidate` to `schedule` keeps the rule satisfied.
    ///
    /// Cells occupied by the candidate's own session count as free.
    fn check(&self, instance: &Instance, schedule: &Schedule, candidate: &Assignment) -> bool;
}

/// A rule whose violation is penalized, not prohibited.
pub trait SoftConstraint: Debug + Send + Sync {
    /// Stable identifier, also the key of its weight.
    fn name(&self) -> &'static str;

    /// Weight used when the configuration names none.
    fn default_weight(&self) -> f64;

    /// Raw (unweighted) penalty of a schedule.
    fn penalty(&self, instance: &Instance, schedule: &Schedule) -> f64;

    /// Penalty of one assignment in isolation, if the rule decomposes
    /// over assignments. Used as a value-ordering hint.
    fn unary_penalty(&self, _instance: &Instance, _assignment: &Assignment) -> Option<f64> {
        None
    }
}

/// A hard or soft constraint, as accepted by
/// [`ConstraintEngine::register`].
#[derive(Debug)]
pub enum Constraint {
    Hard(Box<dyn HardConstraint>),
    Soft(Box<dyn SoftConstraint>),
}

impl Constraint {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Hard(c) => c.name(),
            Self::Soft(c) => c.name(),
        }
    }

    pub fn is_hard(&self) -> bool {
        matches!(self, Self::Hard(_))
    }
}
