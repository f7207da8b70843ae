//! Constraint registry and scorer.

use serde::Serialize;
use tracing::debug;

use super::graph::ConstraintGraph;
use super::hard::{self, SESSION_COMPLETENESS};
use super::{soft, Constraint, HardConstraint, SoftConstraint};
use crate::config::SoftWeights;
use crate::models::{Assignment, Instance, Schedule, SessionIdx};

/// Result of a partial check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Satisfied,
    /// The first violated hard constraint, in registration order.
    Violated(&'static str),
}

impl Verdict {
    pub fn is_satisfied(&self) -> bool {
        matches!(self, Self::Satisfied)
    }
}

/// One hard-constraint violation found by [`ConstraintEngine::violations`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Violation {
    pub constraint: &'static str,
    pub session: SessionIdx,
    pub message: String,
}

/// Contribution of one soft constraint to the score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SoftScore {
    pub name: &'static str,
    /// Raw penalty.
    pub penalty: f64,
    pub weight: f64,
    /// `penalty * weight`.
    pub cost: f64,
}

#[derive(Debug)]
struct WeightedSoft {
    constraint: Box<dyn SoftConstraint>,
    weight: f64,
}

/// The active rule set.
///
/// Built once per run from explicit configuration and shared read-only by
/// every search branch and population member.
///
/// # Example
/// ```
/// use u_timetable::config::SoftWeights;
/// use u_timetable::constraints::ConstraintEngine;
///
/// let weights = SoftWeights::new().with("room_balance", 2.0);
/// let engine = ConstraintEngine::standard(&weights);
/// assert_eq!(engine.weight("room_balance"), Some(2.0));
/// assert_eq!(engine.weight("group_compactness"), Some(1.0));
/// ```
#[derive(Debug)]
pub struct ConstraintEngine {
    hard: Vec<Box<dyn HardConstraint>>,
    soft: Vec<WeightedSoft>,
    weights: SoftWeights,
}

impl ConstraintEngine {
    /// Creates an engine with no rules.
    pub fn new(weights: &SoftWeights) -> Self {
        Self {
            hard: Vec::new(),
            soft: Vec::new(),
            weights: weights.clone(),
        }
    }

    /// Creates an engine with every built-in rule.
    pub fn standard(weights: &SoftWeights) -> Self {
        let mut engine = Self::new(weights);
        for c in hard::builtin() {
            engine.register_hard(c);
        }
        for c in soft::builtin() {
            engine.register_soft(c);
        }
        engine
    }

    /// Adds a rule. A rule with the same name and kind is replaced.
    pub fn register(&mut self, constraint: Constraint) {
        match constraint {
            Constraint::Hard(c) => self.register_hard(c),
            Constraint::Soft(c) => self.register_soft(c),
        }
    }

    pub fn register_hard(&mut self, constraint: Box<dyn HardConstraint>) {
        let name = constraint.name();
        if let Some(slot) = self.hard.iter_mut().find(|c| c.name() == name) {
            debug!(event = "constraint_replaced", name, kind = "hard");
            *slot = constraint;
        } else {
            self.hard.push(constraint);
        }
    }

    /// Adds a soft rule, weighted from the configured weights.
    pub fn register_soft(&mut self, constraint: Box<dyn SoftConstraint>) {
        let name = constraint.name();
        let weight = self.weights.weight_for(name, constraint.default_weight());
        let entry = WeightedSoft { constraint, weight };
        if let Some(slot) = self.soft.iter_mut().find(|c| c.constraint.name() == name) {
            debug!(event = "constraint_replaced", name, kind = "soft");
            *slot = entry;
        } else {
            self.soft.push(entry);
        }
    }

    pub fn hard_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.hard.iter().map(|c| c.name())
    }

    pub fn soft_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.soft.iter().map(|c| c.constraint.name())
    }

    /// Effective weight of a registered soft rule.
    pub fn weight(&self, name: &str) -> Option<f64> {
        self.soft
            .iter()
            .find(|c| c.constraint.name() == name)
            .map(|c| c.weight)
    }

    /// Checks the hard rules touched by adding `candidate` to `schedule`.
    ///
    /// Every rule is local to the changed assignment, so the cost is one
    /// constant-time lookup per rule.
    pub fn check_partial(
        &self,
        instance: &Instance,
        schedule: &Schedule,
        candidate: &Assignment,
    ) -> Verdict {
        self.hard
            .iter()
            .find(|c| !c.check(instance, schedule, candidate))
            .map_or(Verdict::Satisfied, |c| Verdict::Violated(c.name()))
    }

    /// Weighted sum of soft penalties. Lower is better.
    pub fn score(&self, instance: &Instance, schedule: &Schedule) -> f64 {
        self.soft
            .iter()
            .filter(|c| c.weight != 0.0)
            .map(|c| c.weight * c.constraint.penalty(instance, schedule))
            .sum()
    }

    /// Per-rule soft penalties, in registration order.
    pub fn breakdown(&self, instance: &Instance, schedule: &Schedule) -> Vec<SoftScore> {
        self.soft
            .iter()
            .map(|c| {
                let penalty = c.constraint.penalty(instance, schedule);
                SoftScore {
                    name: c.constraint.name(),
                    penalty,
                    weight: c.weight,
                    cost: penalty * c.weight,
                }
            })
            .collect()
    }

    /// Weighted unary soft penalty of one assignment.
    ///
    /// Used only to order values; feasibility never depends on it.
    pub fn value_hint(&self, instance: &Instance, assignment: &Assignment) -> f64 {
        self.soft
            .iter()
            .filter_map(|c| {
                c.constraint
                    .unary_penalty(instance, assignment)
                    .map(|p| p * c.weight)
            })
            .sum()
    }

    /// Every hard violation of a possibly invalid schedule.
    ///
    /// Occupancy is rebuilt from the placements alone, so corrupted
    /// occupancy tables in `schedule` cannot hide a clash.
    pub fn violations(&self, instance: &Instance, schedule: &Schedule) -> Vec<Violation> {
        let mut found = Vec::new();
        let mut replay = Schedule::new(instance);
        for a in schedule.assignments() {
            for c in &self.hard {
                if !c.check(instance, &replay, &a) {
                    found.push(Violation {
                        constraint: c.name(),
                        session: a.session,
                        message: describe(instance, &a, c.name()),
                    });
                }
            }
            replay.assign(instance, a.session, a.placement());
        }

        for s in instance.session_indices() {
            if schedule.placement(s).is_none() {
                let session = instance.session(s);
                found.push(Violation {
                    constraint: SESSION_COMPLETENESS,
                    session: s,
                    message: format!(
                        "{}#{} is not scheduled",
                        instance.course(session.course).id,
                        session.ordinal
                    ),
                });
            }
        }
        found
    }

    /// Every session assigned and every hard rule satisfied.
    pub fn is_complete_and_feasible(&self, instance: &Instance, schedule: &Schedule) -> bool {
        schedule.is_complete() && self.violations(instance, schedule).is_empty()
    }

    /// Compiles static domains and neighbourhoods for the search.
    pub fn compile(&self, instance: &Instance) -> ConstraintGraph {
        let statics: Vec<&dyn HardConstraint> = self
            .hard
            .iter()
            .filter(|c| c.is_static())
            .map(|c| c.as_ref())
            .collect();
        let graph = ConstraintGraph::build(instance, &statics);
        debug!(
            event = "constraint_graph_compiled",
            sessions = instance.session_count(),
            static_rules = statics.len(),
            domain_values = graph.total_domain_size(),
            empty_domains = graph.empty_domains().len()
        );
        graph
    }
}

fn describe(instance: &Instance, a: &Assignment, constraint: &str) -> String {
    let session = instance.session(a.session);
    format!(
        "{}#{} with {} in {} at {} violates {}",
        instance.course(session.course).id,
        session.ordinal,
        instance.professor(a.professor).id,
        instance.room(a.room).id,
        instance.slot(a.slot).id,
        constraint
    )
}
