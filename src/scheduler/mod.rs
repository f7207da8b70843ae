//! Orchestration of feasibility search and optimization.
//!
//! [`Scheduler`] compiles a [`Problem`], finds a hard-feasible schedule
//! with the CSP solver (retrying with a growing budget when it runs out),
//! improves it with the genetic optimizer, validates the result once more
//! and returns it with a [`SolveReport`].
//!
//! # Strategies
//!
//! | Strategy | Feasibility | Optimization |
//! |----------|-------------|--------------|
//! | `CspOnly` | CSP search | none |
//! | `GaOnly` | supplied seed | GA |
//! | `CspThenGa` | CSP search | GA seeded with the CSP result |
//!
//! A supplied seed schedule replaces the CSP search for every strategy.
//!
//! # KPI
//!
//! [`ScheduleKpi`] computes descriptive room, professor and seat metrics
//! of the returned schedule.

mod kpi;
mod report;
mod seed;

pub use kpi::ScheduleKpi;
pub use report::{SolveOutcome, SolveReport, SolveResult, SolveVerdict};

use std::time::Instant;
use tracing::{debug, error, info};

use crate::config::{SchedulerConfig, Strategy};
use crate::constraints::{Constraint, ConstraintEngine, ConstraintGraph};
use crate::cp::{BudgetLimit, CspOutcome, CspSolver, CspStats, Diagnostic};
use crate::error::{Result, TimetableError};
use crate::ga::GaRunner;
use crate::models::{AssignmentRecord, Instance, Problem, Schedule};
use crate::validation::{ValidationError, ValidationErrorKind};

/// Timetabling façade.
///
/// Holds the validated configuration and the active rule set. One
/// scheduler can solve any number of problems; runs share no state.
///
/// # Example
///
/// ```
/// use u_timetable::config::{SchedulerConfig, Strategy};
/// use u_timetable::models::{Course, Problem, Professor, Room, TimeSlot, Weekday};
/// use u_timetable::scheduler::{Scheduler, SolveOutcome};
///
/// let problem = Problem::new()
///     .with_time_slot(TimeSlot::new("mon-9", Weekday::Monday, 540, 600))
///     .with_time_slot(TimeSlot::new("mon-10", Weekday::Monday, 600, 660))
///     .with_room(Room::new("R1", 40))
///     .with_professor(Professor::new("P1"))
///     .with_course(Course::new("C1").with_sessions(2).with_enrollment(30).with_instructor("P1"));
///
/// let config = SchedulerConfig::default().with_strategy(Strategy::CspOnly);
/// let result = Scheduler::new(config).unwrap().solve(&problem).unwrap();
/// match result.outcome {
///     SolveOutcome::Solved(schedule) => assert!(schedule.is_complete()),
///     other => panic!("unexpected {other:?}"),
/// }
/// ```
#[derive(Debug)]
pub struct Scheduler {
    config: SchedulerConfig,
    engine: ConstraintEngine,
}

impl Scheduler {
    /// Creates a scheduler with every built-in constraint.
    ///
    /// # Errors
    /// [`TimetableError::InvalidConfig`] if the configuration is out of range.
    pub fn new(config: SchedulerConfig) -> Result<Self> {
        config.validate()?;
        let engine = ConstraintEngine::standard(&config.weights);
        Ok(Self { config, engine })
    }

    /// Adds or replaces a constraint.
    pub fn with_constraint(mut self, constraint: Constraint) -> Self {
        self.engine.register(constraint);
        self
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    pub fn engine(&self) -> &ConstraintEngine {
        &self.engine
    }

    /// Solves a problem from scratch.
    ///
    /// # Errors
    /// [`TimetableError::InvalidInput`] if the entity data is malformed, or
    /// if the strategy is `GaOnly` (which needs a seed).
    pub fn solve(&self, problem: &Problem) -> Result<SolveResult> {
        self.solve_with_seed(problem, &[])
    }

    /// Solves a problem starting from a caller-supplied schedule.
    ///
    /// An empty `seed` means no seed. A non-empty seed must be complete and
    /// hard-feasible; it then replaces the feasibility search.
    ///
    /// # Errors
    /// [`TimetableError::InvalidInput`] if the entity data is malformed or
    /// the seed is invalid.
    ///
    /// # Panics
    /// If the schedule about to be returned breaks a hard constraint. This
    /// indicates a defect in a constraint or operator, never bad input.
    pub fn solve_with_seed(
        &self,
        problem: &Problem,
        seed: &[AssignmentRecord],
    ) -> Result<SolveResult> {
        let start = Instant::now();
        let deadline = self.config.time_limit().map(|limit| start + limit);
        let strategy = self.config.strategy;

        let instance = Instance::compile(problem)?;
        let seed = if seed.is_empty() {
            None
        } else {
            Some(
                seed::import_seed(&instance, &self.engine, seed)
                    .map_err(TimetableError::InvalidInput)?,
            )
        };
        if strategy == Strategy::GaOnly && seed.is_none() {
            return Err(TimetableError::InvalidInput(vec![ValidationError::new(
                ValidationErrorKind::InvalidSeed,
                "Strategy ga_only requires a seed schedule",
            )]));
        }

        info!(
            event = "solve_started",
            strategy = ?strategy,
            courses = instance.course_count(),
            sessions = instance.session_count(),
            seeded = seed.is_some(),
            time_limit_ms = ?self.config.time_limit_ms
        );
        let graph = self.engine.compile(&instance);
        let mut report = SolveReport::new(strategy);

        let feasible = match seed {
            Some(schedule) => schedule,
            None => match self.search(&instance, &graph, deadline, &mut report.csp_attempts) {
                CspOutcome::Feasible(schedule) => schedule,
                CspOutcome::ProvenInfeasible(diagnostic) => {
                    return Ok(self.finish(
                        SolveOutcome::ProvenInfeasible(diagnostic),
                        report,
                        start,
                    ));
                }
                CspOutcome::BudgetExceeded { limit, deepest } => {
                    let diagnostic = budget_diagnostic(limit, deepest);
                    return Ok(self.finish(SolveOutcome::BudgetExceeded(diagnostic), report, start));
                }
            },
        };

        let schedule = match strategy {
            Strategy::CspOnly => feasible,
            Strategy::GaOnly | Strategy::CspThenGa => {
                self.optimize(&instance, &graph, feasible, deadline, &mut report)
            }
        };

        let violations = self.engine.violations(&instance, &schedule);
        if !violations.is_empty() {
            error!(
                event = "invariant_violation",
                count = violations.len(),
                violations = ?violations,
                records = ?schedule.to_records(&instance)
            );
            panic!(
                "internal invariant violation: returned schedule breaks {} hard \
                 constraint(s): {:?}",
                violations.len(),
                violations
            );
        }

        report.score = Some(self.engine.score(&instance, &schedule));
        report.breakdown = self.engine.breakdown(&instance, &schedule);
        report.kpi = Some(ScheduleKpi::calculate(&instance, &schedule));
        report.records = schedule.to_records(&instance);
        Ok(self.finish(SolveOutcome::Solved(schedule), report, start))
    }

    /// Feasibility search with bounded retries. Every attempt's
    /// statistics are appended to `attempts`.
    fn search(
        &self,
        instance: &Instance,
        graph: &ConstraintGraph,
        deadline: Option<Instant>,
        attempts: &mut Vec<CspStats>,
    ) -> CspOutcome {
        let mut attempt = 0u32;
        loop {
            let budget = self.config.csp.scaled(attempt);
            let result = CspSolver::new(instance, &self.engine, graph)
                .with_budget(&budget)
                .with_deadline(deadline)
                .solve();
            attempts.push(result.stats);

            match result.outcome {
                CspOutcome::BudgetExceeded { limit, .. }
                    if limit != BudgetLimit::Deadline && attempt < self.config.csp.max_retries =>
                {
                    attempt += 1;
                    let next = self.config.csp.scaled(attempt);
                    debug!(
                        event = "csp_retry",
                        attempt,
                        max_nodes = ?next.max_nodes,
                        time_limit_ms = ?next.time_limit_ms
                    );
                }
                outcome => return outcome,
            }
        }
    }

    fn optimize(
        &self,
        instance: &Instance,
        graph: &ConstraintGraph,
        seed: Schedule,
        deadline: Option<Instant>,
        report: &mut SolveReport,
    ) -> Schedule {
        let refill = |tie_break: u64| {
            CspSolver::new(instance, &self.engine, graph)
                .with_budget(&self.config.csp)
                .with_deadline(deadline)
                .with_tie_break_seed(tie_break)
                .solve()
                .outcome
                .into_schedule()
        };
        let runner = GaRunner::new(instance, &self.engine, graph, self.config.ga.clone())
            .with_seed(self.config.seed)
            .with_deadline(deadline)
            .with_refill(&refill);

        match runner.run(std::slice::from_ref(&seed)) {
            Some(result) => {
                report.ga = Some(result.stats);
                result.best
            }
            None => seed,
        }
    }

    fn finish(
        &self,
        outcome: SolveOutcome,
        mut report: SolveReport,
        start: Instant,
    ) -> SolveResult {
        report.verdict = outcome.verdict();
        report.diagnostic = outcome.diagnostic().cloned();
        report.elapsed = start.elapsed();
        info!(
            event = "solve_finished",
            verdict = ?report.verdict,
            score = ?report.score,
            retries = report.retries(),
            nodes = report.nodes_explored(),
            generations = report.generations(),
            elapsed_ms = report.elapsed.as_millis() as u64
        );
        SolveResult { outcome, report }
    }
}

fn budget_diagnostic(limit: BudgetLimit, deepest: Option<Diagnostic>) -> Diagnostic {
    let reason = match limit {
        BudgetLimit::Nodes => "node budget",
        BudgetLimit::TimeLimit => "time limit",
        BudgetLimit::Deadline => "deadline",
    };
    match deepest {
        Some(d) => Diagnostic {
            message: format!(
                "{reason} exhausted before a verdict; deepest conflict: {}",
                d.message
            ),
            ..d
        },
        None => Diagnostic {
            message: format!("{reason} exhausted before a verdict"),
            ..Diagnostic::default()
        },
    }
}
