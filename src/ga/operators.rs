//! Feasibility-preserving genetic operators.
//!
//! Every operator takes a hard-feasible schedule and leaves a
//! hard-feasible schedule behind: values are drawn from static domains and
//! admitted only after [`ConstraintEngine::check_partial`], and any step
//! that cannot be completed is rolled back.
//!
//! # Operators
//!
//! - [`perturb`]: swap the (slot, room) of two sessions
//! - [`crossover`]: session-wise uniform crossover with local repair
//! - [`mutate`]: move one session to another legal value

use rand::seq::IndexedRandom;
use rand::Rng;

use crate::constraints::{ConstraintEngine, ConstraintGraph};
use crate::models::{Assignment, Instance, Placement, Schedule, SessionIdx};

/// Shared read-only inputs of the operators.
#[derive(Debug, Clone, Copy)]
pub struct OperatorContext<'a> {
    pub instance: &'a Instance,
    pub engine: &'a ConstraintEngine,
    pub graph: &'a ConstraintGraph,
}

/// Outcome counters of crossover repair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RepairCounts {
    /// Inherited values whose displaced sessions were all reassigned.
    pub repaired: u64,
    /// Inherited values abandoned for the first parent's value.
    pub fallbacks: u64,
}

impl RepairCounts {
    pub fn merge(&mut self, other: RepairCounts) {
        self.repaired += other.repaired;
        self.fallbacks += other.fallbacks;
    }
}

impl<'a> OperatorContext<'a> {
    pub fn new(
        instance: &'a Instance,
        engine: &'a ConstraintEngine,
        graph: &'a ConstraintGraph,
    ) -> Self {
        Self {
            instance,
            engine,
            graph,
        }
    }

    #[inline]
    fn admits(&self, schedule: &Schedule, session: SessionIdx, value: Placement) -> bool {
        self.engine
            .check_partial(self.instance, schedule, &Assignment::new(session, value))
            .is_satisfied()
    }

    /// Values of the static domain legal for `session` given the rest of
    /// `schedule`.
    pub fn legal_values(&self, schedule: &Schedule, session: SessionIdx) -> Vec<Placement> {
        self.graph
            .domain(self.instance.session_course(session))
            .iter()
            .copied()
            .filter(|&v| self.admits(schedule, session, v))
            .collect()
    }

    /// Sessions that would clash with `candidate` on room, professor,
    /// group or course, in its slot or any slot overlapping it.
    fn occupants(&self, schedule: &Schedule, candidate: &Assignment) -> Vec<SessionIdx> {
        let course = self.instance.session_course(candidate.session);
        let groups = self.instance.course_groups(course);
        let mut found: Vec<SessionIdx> = self
            .instance
            .slot_overlaps(candidate.slot)
            .iter()
            .flat_map(|&slot| {
                [
                    schedule.room_occupant(candidate.room, slot),
                    schedule.professor_occupant(candidate.professor, slot),
                    schedule.course_occupant(course, slot),
                ]
                .into_iter()
                .flatten()
                .chain(groups.iter().filter_map(move |&g| schedule.group_occupant(g, slot)))
            })
            .filter(|&s| s != candidate.session)
            .collect();
        found.sort_unstable();
        found.dedup();
        found
    }
}

/// Applies up to `attempts` random (slot, room) swaps between two sessions,
/// each kept only if both moved sessions stay legal. Returns the number of
/// swaps kept.
pub fn perturb<R: Rng>(
    ctx: &OperatorContext<'_>,
    schedule: &mut Schedule,
    attempts: usize,
    rng: &mut R,
) -> usize {
    let n = schedule.session_count();
    if n < 2 {
        return 0;
    }
    let mut kept = 0;
    for _ in 0..attempts {
        let a = SessionIdx::new(rng.random_range(0..n));
        let b = SessionIdx::new(rng.random_range(0..n));
        if a == b {
            continue;
        }
        let (Some(pa), Some(pb)) = (schedule.placement(a), schedule.placement(b)) else {
            continue;
        };
        if (pa.room, pa.slot) == (pb.room, pb.slot) {
            continue;
        }
        let na = Placement::new(pa.professor, pb.room, pb.slot);
        let nb = Placement::new(pb.professor, pa.room, pa.slot);

        schedule.unassign(ctx.instance, a);
        schedule.unassign(ctx.instance, b);
        if ctx.admits(schedule, a, na) {
            schedule.assign(ctx.instance, a, na);
            if ctx.admits(schedule, b, nb) {
                schedule.assign(ctx.instance, b, nb);
                kept += 1;
                continue;
            }
            schedule.unassign(ctx.instance, a);
        }
        schedule.assign(ctx.instance, a, pa);
        schedule.assign(ctx.instance, b, pb);
    }
    kept
}

/// Session-wise uniform crossover.
///
/// The child starts as `first`; each session inherits `second`'s value
/// with probability `bias`. Sessions displaced by an inherited value are
/// reassigned from their legal domains; if any cannot be, the inherited
/// value is dropped and the first parent's values are restored.
pub fn crossover<R: Rng>(
    ctx: &OperatorContext<'_>,
    first: &Schedule,
    second: &Schedule,
    bias: f64,
    rng: &mut R,
) -> (Schedule, RepairCounts) {
    let mut child = first.clone();
    let mut counts = RepairCounts::default();
    for session in ctx.instance.session_indices() {
        if !rng.random_bool(bias) {
            continue;
        }
        let Some(value) = second.placement(session) else {
            continue;
        };
        if child.placement(session) == Some(value) {
            continue;
        }
        match inherit(ctx, &mut child, session, value, rng) {
            Some(true) => counts.repaired += 1,
            Some(false) => {}
            None => counts.fallbacks += 1,
        }
    }
    (child, counts)
}

/// Moves `session` to `value`, reassigning displaced sessions.
///
/// Returns `Some(true)` if a repair was needed and succeeded, `Some(false)`
/// if none was needed, `None` if the schedule was restored.
fn inherit<R: Rng>(
    ctx: &OperatorContext<'_>,
    child: &mut Schedule,
    session: SessionIdx,
    value: Placement,
    rng: &mut R,
) -> Option<bool> {
    let instance = ctx.instance;
    let candidate = Assignment::new(session, value);
    let displaced = ctx.occupants(child, &candidate);

    let original = child.unassign(instance, session);
    let saved: Vec<(SessionIdx, Placement)> = displaced
        .iter()
        .filter_map(|&d| child.unassign(instance, d).map(|p| (d, p)))
        .collect();

    let restore = |child: &mut Schedule, moved: &[SessionIdx]| {
        child.unassign(instance, session);
        for &m in moved {
            child.unassign(instance, m);
        }
        if let Some(p) = original {
            child.assign(instance, session, p);
        }
        for &(d, p) in &saved {
            child.assign(instance, d, p);
        }
    };

    if !ctx.admits(child, session, value) {
        restore(child, &[]);
        return None;
    }
    child.assign(instance, session, value);

    let mut moved = Vec::with_capacity(saved.len());
    for &(d, _) in &saved {
        let legal = ctx.legal_values(child, d);
        let Some(&pick) = legal.choose(rng) else {
            restore(child, &moved);
            return None;
        };
        child.assign(instance, d, pick);
        moved.push(d);
    }
    Some(!saved.is_empty())
}

/// Moves one random session to a different legal value. Returns whether
/// the schedule changed.
pub fn mutate<R: Rng>(ctx: &OperatorContext<'_>, schedule: &mut Schedule, rng: &mut R) -> bool {
    const ATTEMPTS: usize = 8;
    let n = schedule.session_count();
    if n == 0 {
        return false;
    }
    for _ in 0..ATTEMPTS {
        let session = SessionIdx::new(rng.random_range(0..n));
        let current = schedule.placement(session);
        let legal: Vec<Placement> = ctx
            .legal_values(schedule, session)
            .into_iter()
            .filter(|&v| Some(v) != current)
            .collect();
        if let Some(&pick) = legal.choose(rng) {
            schedule.assign(ctx.instance, session, pick);
            return true;
        }
    }
    false
}
