//! Shared fixtures for unit tests.

use crate::constraints::ConstraintEngine;
use crate::config::SoftWeights;
use crate::models::{
    Course, Instance, Problem, Professor, Room, SlotKind, TimeSlot, Weekday, LAB_CAPABILITY,
};

/// Six Monday/Tuesday slots, three rooms, three professors, four courses
/// (five sessions). Feasible, with room for soft improvement.
///
/// - `P1` prefers `mon-9` and `R1`; `P2` is unavailable on `mon-9`;
///   `P3` may teach at most three sessions.
/// - `C1` (2 sessions) and `C2` share group `G1`; `C3` (lab) and `C4`
///   share group `G2`.
pub fn small_problem() -> Problem {
    let mut problem = Problem::new();
    for (day, prefix) in [(Weekday::Monday, "mon"), (Weekday::Tuesday, "tue")] {
        for hour in [9u16, 10, 11] {
            problem = problem.with_time_slot(TimeSlot::new(
                format!("{prefix}-{hour}"),
                day,
                hour * 60,
                hour * 60 + 60,
            ));
        }
    }

    problem
        .with_room(Room::new("R1", 40).with_capability("projector"))
        .with_room(Room::new("R2", 60))
        .with_room(Room::new("LAB1", 30).with_capability(LAB_CAPABILITY))
        .with_professor(
            Professor::new("P1")
                .with_preferred_slot("mon-9")
                .with_preferred_slot("mon-10")
                .with_preferred_room("R1"),
        )
        .with_professor(Professor::new("P2").with_availability([
            "mon-10", "mon-11", "tue-9", "tue-10", "tue-11",
        ]))
        .with_professor(Professor::new("P3").with_max_sessions(3))
        .with_course(
            Course::new("C1")
                .with_sessions(2)
                .with_enrollment(35)
                .with_group("G1")
                .with_instructor("P1"),
        )
        .with_course(
            Course::new("C2")
                .with_enrollment(50)
                .with_group("G1")
                .with_instructor("P2")
                .with_instructor("P3"),
        )
        .with_course(
            Course::new("C3")
                .with_enrollment(20)
                .with_group("G2")
                .with_capability(LAB_CAPABILITY)
                .with_instructor("P3"),
        )
        .with_course(
            Course::new("C4")
                .with_enrollment(30)
                .with_group("G2")
                .with_instructor("P1")
                .with_instructor("P2"),
        )
}

/// Compiled [`small_problem`].
pub fn small_instance() -> Instance {
    Instance::compile(&small_problem()).expect("fixture must compile")
}

/// A larger feasible problem: `courses` single-group courses spread over
/// five days of five slots, with plenty of rooms and shared professors.
pub fn grid_problem(courses: usize) -> Problem {
    let days = [
        (Weekday::Monday, "mon"),
        (Weekday::Tuesday, "tue"),
        (Weekday::Wednesday, "wed"),
        (Weekday::Thursday, "thu"),
        (Weekday::Friday, "fri"),
    ];
    let mut problem = Problem::new();
    for (day, prefix) in days {
        for hour in [8u16, 9, 10, 11, 14] {
            problem = problem.with_time_slot(TimeSlot::new(
                format!("{prefix}-{hour}"),
                day,
                hour * 60,
                hour * 60 + 60,
            ));
        }
    }
    for r in 0..4 {
        problem = problem.with_room(Room::new(format!("R{r}"), 30 + 10 * r as u32));
    }
    for p in 0..4 {
        problem = problem.with_professor(
            Professor::new(format!("P{p}"))
                .with_preferred_slot(format!("{}-9", days[p % days.len()].1))
                .with_preferred_room(format!("R{p}")),
        );
    }
    for c in 0..courses {
        problem = problem.with_course(
            Course::new(format!("C{c}"))
                .with_sessions(2)
                .with_enrollment(25)
                .with_group(format!("G{}", c % 3))
                .with_instructor(format!("P{}", c % 4))
                .with_instructor(format!("P{}", (c + 1) % 4)),
        );
    }
    problem
}

/// A lecture and a three-hour lab taught by `P1` to group `G`. The lecture
/// only fits `mon-10`, the lab only fits the extended `mon-lab` slot, and
/// the two slots overlap, so no feasible schedule exists.
pub fn overlap_problem() -> Problem {
    Problem::new()
        .with_time_slot(TimeSlot::new("mon-10", Weekday::Monday, 600, 660))
        .with_time_slot(
            TimeSlot::new("mon-lab", Weekday::Monday, 600, 780).with_kind(SlotKind::Extended),
        )
        .with_room(Room::new("R1", 40))
        .with_room(Room::new("LAB", 40).with_capability(LAB_CAPABILITY))
        .with_professor(Professor::new("P1"))
        .with_course(Course::new("LEC").with_group("G").with_instructor("P1"))
        .with_course(
            Course::new("LABC")
                .with_duration(180)
                .with_group("G")
                .with_capability(LAB_CAPABILITY)
                .with_instructor("P1"),
        )
}

/// Engine with every built-in constraint and default weights.
pub fn standard_engine() -> ConstraintEngine {
    ConstraintEngine::standard(&SoftWeights::default())
}
