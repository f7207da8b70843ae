//! Search outcomes and statistics.

use serde::Serialize;
use std::time::Duration;

use crate::constraints::EmptyDomain;
use crate::models::Schedule;

/// Best-effort explanation of a failure.
///
/// Not guaranteed minimal: it names the rules and courses involved in the
/// deepest failed branch, or the rules blocking an empty static domain.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Diagnostic {
    /// Rule names, sorted and unique.
    pub constraints: Vec<&'static str>,
    /// Course ids, sorted and unique.
    pub courses: Vec<String>,
    pub message: String,
}

impl Diagnostic {
    /// Explains courses with no legal value at all.
    pub fn from_empty_domains(empty: &[EmptyDomain]) -> Option<Self> {
        if empty.is_empty() {
            return None;
        }
        let mut constraints: Vec<&'static str> =
            empty.iter().flat_map(|e| e.blocking.iter().copied()).collect();
        constraints.sort_unstable();
        constraints.dedup();
        let mut courses: Vec<String> = empty.iter().map(|e| e.course_id.clone()).collect();
        courses.sort();
        courses.dedup();
        let message = format!(
            "no legal (professor, room, slot) for {} blocked by {}",
            courses.join(", "),
            constraints.join(", ")
        );
        Some(Self {
            constraints,
            courses,
            message,
        })
    }
}

/// Which budget stopped the search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetLimit {
    Nodes,
    TimeLimit,
    Deadline,
}

/// Search counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CspStats {
    /// Values tried.
    pub nodes: u64,
    /// Variables whose values were exhausted.
    pub backtracks: u64,
    /// Propagations that emptied a domain.
    pub wipeouts: u64,
    pub max_depth: usize,
    pub elapsed: Duration,
}

/// How a search ended.
#[derive(Debug, Clone)]
pub enum CspOutcome {
    /// Every session assigned, every hard rule satisfied.
    Feasible(Schedule),
    /// The search space was exhausted.
    ProvenInfeasible(Diagnostic),
    /// A budget ran out first; feasibility is unknown.
    BudgetExceeded {
        limit: BudgetLimit,
        /// Conflict of the deepest failed branch so far.
        deepest: Option<Diagnostic>,
    },
}

impl CspOutcome {
    pub fn is_feasible(&self) -> bool {
        matches!(self, Self::Feasible(_))
    }

    pub fn into_schedule(self) -> Option<Schedule> {
        match self {
            Self::Feasible(s) => Some(s),
            _ => None,
        }
    }
}

/// Outcome plus statistics of one search.
#[derive(Debug, Clone)]
pub struct CspResult {
    pub outcome: CspOutcome,
    pub stats: CspStats,
}
