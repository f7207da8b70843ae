//! Constraint-satisfaction search for a feasible timetable.
//!
//! Single-threaded backtracking over session variables with forward
//! checking. Finds one schedule satisfying every hard constraint, proves
//! that none exists, or stops at a node/time budget with an "unknown"
//! verdict that is kept distinct from a proof.
//!
//! # Example
//! ```
//! use u_timetable::config::SoftWeights;
//! use u_timetable::constraints::ConstraintEngine;
//! use u_timetable::cp::CspSolver;
//! use u_timetable::models::{Course, Instance, Problem, Professor, Room, TimeSlot, Weekday};
//!
//! let problem = Problem::new()
//!     .with_time_slot(TimeSlot::new("mon-9", Weekday::Monday, 540, 600))
//!     .with_room(Room::new("R1", 40))
//!     .with_professor(Professor::new("P1"))
//!     .with_course(Course::new("C1").with_enrollment(30).with_instructor("P1"));
//! let instance = Instance::compile(&problem).unwrap();
//! let engine = ConstraintEngine::standard(&SoftWeights::default());
//! let graph = engine.compile(&instance);
//!
//! let result = CspSolver::new(&instance, &engine, &graph).solve();
//! assert!(result.outcome.is_feasible());
//! ```

mod outcome;
mod solver;
mod store;

pub use outcome::{BudgetLimit, CspOutcome, CspResult, CspStats, Diagnostic};
pub use solver::CspSolver;
