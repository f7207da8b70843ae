//! Solve outcomes and reports.

use serde::Serialize;
use std::time::Duration;

use super::kpi::ScheduleKpi;
use crate::config::Strategy;
use crate::constraints::SoftScore;
use crate::cp::{CspStats, Diagnostic};
use crate::ga::GaStats;
use crate::models::{AssignmentRecord, Schedule};

/// Feasibility verdict of a solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SolveVerdict {
    Feasible,
    ProvenInfeasible,
    BudgetExceeded,
}

/// What a solve produced. Callers branch on this; infeasibility is not an
/// error.
#[derive(Debug, Clone)]
pub enum SolveOutcome {
    /// A complete schedule satisfying every hard constraint.
    Solved(Schedule),
    /// No schedule exists.
    ProvenInfeasible(Diagnostic),
    /// The budget ran out before a verdict.
    BudgetExceeded(Diagnostic),
}

impl SolveOutcome {
    pub fn verdict(&self) -> SolveVerdict {
        match self {
            Self::Solved(_) => SolveVerdict::Feasible,
            Self::ProvenInfeasible(_) => SolveVerdict::ProvenInfeasible,
            Self::BudgetExceeded(_) => SolveVerdict::BudgetExceeded,
        }
    }

    pub fn schedule(&self) -> Option<&Schedule> {
        match self {
            Self::Solved(s) => Some(s),
            _ => None,
        }
    }

    pub fn diagnostic(&self) -> Option<&Diagnostic> {
        match self {
            Self::Solved(_) => None,
            Self::ProvenInfeasible(d) | Self::BudgetExceeded(d) => Some(d),
        }
    }
}

/// Structured account of a solve, for a presentation collaborator.
#[derive(Debug, Clone, Serialize)]
pub struct SolveReport {
    pub verdict: SolveVerdict,
    pub strategy: Strategy,
    /// Weighted soft score of the returned schedule.
    pub score: Option<f64>,
    /// Soft constraints only; hard ones are zero in a returned schedule.
    pub breakdown: Vec<SoftScore>,
    pub kpi: Option<ScheduleKpi>,
    /// One entry per feasibility search attempt.
    pub csp_attempts: Vec<CspStats>,
    pub ga: Option<GaStats>,
    pub diagnostic: Option<Diagnostic>,
    /// The returned schedule by identifier.
    pub records: Vec<AssignmentRecord>,
    pub elapsed: Duration,
}

impl SolveReport {
    pub(crate) fn new(strategy: Strategy) -> Self {
        Self {
            verdict: SolveVerdict::BudgetExceeded,
            strategy,
            score: None,
            breakdown: Vec::new(),
            kpi: None,
            csp_attempts: Vec::new(),
            ga: None,
            diagnostic: None,
            records: Vec::new(),
            elapsed: Duration::ZERO,
        }
    }

    /// Feasibility searches beyond the first.
    pub fn retries(&self) -> usize {
        self.csp_attempts.len().saturating_sub(1)
    }

    /// Total CSP nodes over every attempt.
    pub fn nodes_explored(&self) -> u64 {
        self.csp_attempts.iter().map(|s| s.nodes).sum()
    }

    /// Optimizer generations, 0 if it did not run.
    pub fn generations(&self) -> usize {
        self.ga.as_ref().map_or(0, |g| g.generations)
    }
}

/// Outcome of [`Scheduler::solve`](super::Scheduler::solve) with its report.
#[derive(Debug, Clone)]
pub struct SolveResult {
    pub outcome: SolveOutcome,
    pub report: SolveReport,
}

impl SolveResult {
    pub fn is_solved(&self) -> bool {
        matches!(self.outcome, SolveOutcome::Solved(_))
    }

    pub fn schedule(&self) -> Option<&Schedule> {
        self.outcome.schedule()
    }
}
