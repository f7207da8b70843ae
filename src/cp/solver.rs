//! Backtracking search with forward checking.

use std::cmp::Reverse;
use std::collections::BTreeSet;
use std::time::{Duration, Instant};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{info, warn};

use super::outcome::{BudgetLimit, CspOutcome, CspResult, CspStats, Diagnostic};
use super::store::{DomainStore, Reasons};
use crate::config::CspConfig;
use crate::constraints::{ConstraintEngine, ConstraintGraph, Verdict};
use crate::models::{Assignment, Instance, Placement, Schedule, SessionIdx};

/// Feasibility search over session variables.
///
/// Deterministic for identical input: variable and value orders are total,
/// and the only randomness is the optional tie-break seed.
///
/// # Algorithm
/// 1. Pick the unassigned session with the smallest live domain, then the
///    most course/group neighbours, then the lowest index (MRV).
/// 2. Order its live values by how many neighbour values they would prune,
///    then by the weighted unary soft penalty, then by the seeded
///    tie-break key, then by value index (LCV).
/// 3. After each assignment, prune values of unassigned sessions that
///    share the room, professor, group or course in the same slot, and
///    every value of a professor whose load is now full. An emptied
///    domain undoes the assignment immediately.
///
/// # Reference
/// - Haralick & Elliott (1980), "Increasing tree search efficiency for
///   constraint satisfaction problems"
/// - Russell & Norvig, "Artificial Intelligence: A Modern Approach", Ch. 6
#[derive(Debug, Clone)]
pub struct CspSolver<'a> {
    instance: &'a Instance,
    engine: &'a ConstraintEngine,
    graph: &'a ConstraintGraph,
    max_nodes: Option<u64>,
    time_limit: Option<Duration>,
    deadline: Option<Instant>,
    tie_break_seed: Option<u64>,
}

impl<'a> CspSolver<'a> {
    /// Creates an unbounded solver.
    pub fn new(
        instance: &'a Instance,
        engine: &'a ConstraintEngine,
        graph: &'a ConstraintGraph,
    ) -> Self {
        Self {
            instance,
            engine,
            graph,
            max_nodes: None,
            time_limit: None,
            deadline: None,
            tie_break_seed: None,
        }
    }

    /// Applies the node and time budget of a configuration.
    pub fn with_budget(mut self, config: &CspConfig) -> Self {
        self.max_nodes = config.max_nodes;
        self.time_limit = config.time_limit();
        self
    }

    pub fn with_max_nodes(mut self, max_nodes: Option<u64>) -> Self {
        self.max_nodes = max_nodes;
        self
    }

    pub fn with_time_limit(mut self, limit: Option<Duration>) -> Self {
        self.time_limit = limit;
        self
    }

    /// Absolute deadline shared with the caller.
    pub fn with_deadline(mut self, deadline: Option<Instant>) -> Self {
        self.deadline = deadline;
        self
    }

    /// Randomizes the last value-ordering tie-break.
    pub fn with_tie_break_seed(mut self, seed: u64) -> Self {
        self.tie_break_seed = Some(seed);
        self
    }

    /// Runs the search.
    pub fn solve(&self) -> CspResult {
        let start = Instant::now();
        info!(
            event = "csp_search_started",
            sessions = self.instance.session_count(),
            domain_values = self.graph.total_domain_size(),
            max_nodes = ?self.max_nodes,
            seeded = self.tie_break_seed.is_some()
        );

        if let Some(diagnostic) = Diagnostic::from_empty_domains(self.graph.empty_domains()) {
            info!(
                event = "csp_search_finished",
                verdict = "infeasible",
                constraints = ?diagnostic.constraints,
                courses = ?diagnostic.courses
            );
            return CspResult {
                outcome: CspOutcome::ProvenInfeasible(diagnostic),
                stats: CspStats {
                    elapsed: start.elapsed(),
                    ..CspStats::default()
                },
            };
        }

        let mut search = Search::new(self, start);
        let outcome = search.run();
        let mut stats = search.stats;
        stats.elapsed = start.elapsed();

        match &outcome {
            CspOutcome::Feasible(_) => info!(
                event = "csp_search_finished",
                verdict = "feasible",
                nodes = stats.nodes,
                backtracks = stats.backtracks,
                wipeouts = stats.wipeouts,
                max_depth = stats.max_depth,
                elapsed_ms = stats.elapsed.as_millis() as u64
            ),
            CspOutcome::ProvenInfeasible(d) => info!(
                event = "csp_search_finished",
                verdict = "infeasible",
                nodes = stats.nodes,
                constraints = ?d.constraints,
                courses = ?d.courses
            ),
            CspOutcome::BudgetExceeded { limit, .. } => warn!(
                event = "csp_budget_exhausted",
                limit = ?limit,
                nodes = stats.nodes,
                max_depth = stats.max_depth,
                elapsed_ms = stats.elapsed.as_millis() as u64
            ),
        }

        CspResult { outcome, stats }
    }
}

/// One decision level.
struct Frame {
    session: SessionIdx,
    /// Value indices in trial order.
    order: Vec<u32>,
    next: usize,
    /// Trail length before this level's first assignment.
    mark: usize,
}

struct Search<'s, 'a> {
    solver: &'s CspSolver<'a>,
    schedule: Schedule,
    store: DomainStore,
    stats: CspStats,
    /// Per course and value; empty when unseeded.
    keys: Vec<Vec<u64>>,
    deepest: Option<(usize, Diagnostic)>,
    rejected: BTreeSet<&'static str>,
    start: Instant,
}

impl<'s, 'a> Search<'s, 'a> {
    fn new(solver: &'s CspSolver<'a>, start: Instant) -> Self {
        let instance = solver.instance;
        let keys = match solver.tie_break_seed {
            Some(seed) => {
                let mut rng = ChaCha8Rng::seed_from_u64(seed);
                instance
                    .course_indices()
                    .map(|c| {
                        (0..solver.graph.domain(c).len())
                            .map(|_| rng.random::<u64>())
                            .collect()
                    })
                    .collect()
            }
            None => Vec::new(),
        };
        Self {
            solver,
            schedule: Schedule::new(instance),
            store: DomainStore::new(instance, solver.graph),
            stats: CspStats::default(),
            keys,
            deepest: None,
            rejected: BTreeSet::new(),
            start,
        }
    }

    fn run(&mut self) -> CspOutcome {
        let instance = self.solver.instance;
        let mut stack: Vec<Frame> = Vec::new();

        loop {
            let Some(session) = self.select_variable() else {
                return CspOutcome::Feasible(self.schedule.clone());
            };
            let order = self.order_values(session);
            stack.push(Frame {
                session,
                order,
                next: 0,
                mark: self.store.mark(),
            });
            self.stats.max_depth = self.stats.max_depth.max(stack.len());

            loop {
                let depth = stack.len();
                let Some(frame) = stack.last_mut() else {
                    return CspOutcome::ProvenInfeasible(self.infeasibility());
                };
                if self.schedule.placement(frame.session).is_some() {
                    self.schedule.unassign(instance, frame.session);
                    self.store.undo_to(frame.mark);
                }
                if frame.next == frame.order.len() {
                    stack.pop();
                    self.stats.backtracks += 1;
                    continue;
                }
                if let Some(limit) = self.exhausted_limit() {
                    return CspOutcome::BudgetExceeded {
                        limit,
                        deepest: self.deepest.as_ref().map(|(_, d)| d.clone()),
                    };
                }

                let value = frame.order[frame.next] as usize;
                frame.next += 1;
                let session = frame.session;
                self.stats.nodes += 1;

                let course = instance.session_course(session);
                let placement = self.solver.graph.domain(course)[value];
                let candidate = Assignment::new(session, placement);
                if let Verdict::Violated(name) =
                    self.solver
                        .engine
                        .check_partial(instance, &self.schedule, &candidate)
                {
                    self.rejected.insert(name);
                    continue;
                }

                self.schedule.assign(instance, session, placement);
                if self.propagate(session, placement, depth) {
                    break;
                }
                self.stats.wipeouts += 1;
            }
        }
    }

    fn exhausted_limit(&self) -> Option<BudgetLimit> {
        if self.solver.max_nodes.is_some_and(|max| self.stats.nodes >= max) {
            return Some(BudgetLimit::Nodes);
        }
        if self
            .solver
            .time_limit
            .is_some_and(|limit| self.start.elapsed() >= limit)
        {
            return Some(BudgetLimit::TimeLimit);
        }
        if self
            .solver
            .deadline
            .is_some_and(|deadline| Instant::now() >= deadline)
        {
            return Some(BudgetLimit::Deadline);
        }
        None
    }

    fn unassigned(&self) -> impl Iterator<Item = SessionIdx> + '_ {
        self.solver
            .instance
            .session_indices()
            .filter(|&s| self.schedule.placement(s).is_none())
    }

    fn select_variable(&self) -> Option<SessionIdx> {
        let graph = self.solver.graph;
        self.unassigned().min_by_key(|&s| {
            (
                self.store.live_count(s),
                Reverse(graph.neighbours(s).len()),
                s,
            )
        })
    }

    fn order_values(&self, session: SessionIdx) -> Vec<u32> {
        let instance = self.solver.instance;
        let course = instance.session_course(session);
        let domain = self.solver.graph.domain(course);
        let keys = self.keys.get(course.get());

        let mut scored: Vec<(u64, f64, u64, u32)> = self
            .store
            .live_values(session)
            .map(|v| {
                let value = domain[v];
                let hint = self
                    .solver
                    .engine
                    .value_hint(instance, &Assignment::new(session, value));
                let key = keys.map_or(0, |k| k[v]);
                (self.impact(session, value), hint, key, v as u32)
            })
            .collect();
        scored.sort_by(|a, b| {
            a.0.cmp(&b.0)
                .then(a.1.total_cmp(&b.1))
                .then(a.2.cmp(&b.2))
                .then(a.3.cmp(&b.3))
        });
        scored.into_iter().map(|(_, _, _, v)| v).collect()
    }

    /// Live neighbour values that `value` would prune.
    fn impact(&self, session: SessionIdx, value: Placement) -> u64 {
        let instance = self.solver.instance;
        let graph = self.solver.graph;
        let neighbours = graph.neighbours(session);
        let fills_load = self.schedule.professor_load(value.professor) + 1
            >= instance.professor(value.professor).max_weekly_sessions;
        let overlaps = instance.slot_overlaps(value.slot);

        let mut count = 0u64;
        for other in self.unassigned().filter(|&o| o != session) {
            let other_course = instance.session_course(other);
            let domain = graph.domain(other_course);
            let neighbour = neighbours.binary_search(&other).is_ok();
            for &slot in overlaps {
                for v in graph.slot_range(other_course, slot) {
                    let o = domain[v];
                    if self.store.is_alive(other, v)
                        && (neighbour || o.room == value.room || o.professor == value.professor)
                    {
                        count += 1;
                    }
                }
            }
            if fills_load {
                count += domain
                    .iter()
                    .enumerate()
                    .filter(|(v, o)| {
                        o.professor == value.professor
                            && !overlaps.contains(&o.slot)
                            && self.store.is_alive(other, *v)
                    })
                    .count() as u64;
            }
        }
        count
    }

    /// Forward checking after `session` took `placement`. Returns `false`
    /// on a domain wipeout.
    fn propagate(&mut self, session: SessionIdx, placement: Placement, depth: usize) -> bool {
        let instance = self.solver.instance;
        let graph = self.solver.graph;
        let course = instance.session_course(session);
        let groups = instance.course_groups(course);
        let neighbours = graph.neighbours(session);
        let load_full = self.schedule.professor_load(placement.professor)
            >= instance.professor(placement.professor).max_weekly_sessions;

        let pending: Vec<SessionIdx> = self.unassigned().collect();
        for other in pending {
            let other_course = instance.session_course(other);
            let domain = graph.domain(other_course);

            let mut shared = Reasons::default();
            if neighbours.binary_search(&other).is_ok() {
                if other_course == course {
                    shared.insert(Reasons::COURSE);
                }
                if instance
                    .course_groups(other_course)
                    .iter()
                    .any(|g| groups.contains(g))
                {
                    shared.insert(Reasons::GROUP);
                }
            }

            for &slot in instance.slot_overlaps(placement.slot) {
                for v in graph.slot_range(other_course, slot) {
                    let o = domain[v];
                    let mut reasons = shared;
                    if o.room == placement.room {
                        reasons.insert(Reasons::ROOM);
                    }
                    if o.professor == placement.professor {
                        reasons.insert(Reasons::PROFESSOR);
                    }
                    if !reasons.is_empty() {
                        self.store.prune(other, v, session, reasons);
                    }
                }
            }

            if load_full {
                for (v, o) in domain.iter().enumerate() {
                    if o.professor == placement.professor {
                        self.store.prune(other, v, session, Reasons::LOAD);
                    }
                }
            }

            if self.store.live_count(other) == 0 {
                self.record_wipeout(other, depth);
                return false;
            }
        }
        true
    }

    /// Keeps the conflict set of the deepest wipeout.
    fn record_wipeout(&mut self, session: SessionIdx, depth: usize) {
        if self.deepest.as_ref().is_some_and(|(d, _)| *d >= depth) {
            return;
        }
        let instance = self.solver.instance;
        let mut constraints = BTreeSet::new();
        let mut courses = BTreeSet::new();
        courses.insert(instance.course(instance.session_course(session)).id.clone());
        for p in self.store.prunings_of(session) {
            constraints.extend(p.reasons.names());
            courses.insert(instance.course(instance.session_course(p.cause)).id.clone());
        }

        let s = instance.session(session);
        let message = format!(
            "no value left for {}#{} at depth {}",
            instance.course(s.course).id,
            s.ordinal,
            depth
        );
        self.deepest = Some((
            depth,
            Diagnostic {
                constraints: constraints.into_iter().collect(),
                courses: courses.into_iter().collect(),
                message,
            },
        ));
    }

    fn infeasibility(&mut self) -> Diagnostic {
        let mut diagnostic = match self.deepest.take() {
            Some((_, d)) => d,
            None => Diagnostic {
                message: "search space exhausted".to_string(),
                ..Diagnostic::default()
            },
        };
        if !self.rejected.is_empty() {
            let mut merged: BTreeSet<&'static str> =
                diagnostic.constraints.iter().copied().collect();
            merged.extend(self.rejected.iter().copied());
            diagnostic.constraints = merged.into_iter().collect();
        }
        diagnostic
    }
}
