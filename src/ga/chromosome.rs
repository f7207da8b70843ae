//! Population individuals.
//!
//! The chromosome is the schedule itself: one placement per session,
//! indexed by session. Cloning it is a flat array copy.

use std::cmp::Ordering;

use crate::constraints::ConstraintEngine;
use crate::models::{Instance, Schedule};

/// A complete, hard-feasible schedule with its cached soft score.
#[derive(Debug, Clone)]
pub struct Individual {
    schedule: Schedule,
    score: f64,
}

impl Individual {
    /// Scores a schedule.
    pub fn evaluate(instance: &Instance, engine: &ConstraintEngine, schedule: Schedule) -> Self {
        let score = engine.score(instance, &schedule);
        Self { schedule, score }
    }

    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    pub fn into_schedule(self) -> Schedule {
        self.schedule
    }

    /// Weighted soft penalty (lower is better).
    pub fn score(&self) -> f64 {
        self.score
    }

    /// `1 / (1 + score)`, in `(0, 1]`.
    pub fn fitness(&self) -> f64 {
        1.0 / (1.0 + self.score)
    }

    /// Total order: lower score first, exact ties broken by the
    /// canonical schedule order.
    pub fn rank_cmp(&self, other: &Individual) -> Ordering {
        self.score
            .total_cmp(&other.score)
            .then_with(|| self.schedule.canonical_cmp(&other.schedule))
    }
}
