//! Built-in soft constraints.
//!
//! Each returns a raw, unweighted penalty; weights are applied by the
//! engine. Penalties are deterministic and non-negative.
//!
//! | Name | Default weight | Penalty |
//! |------|----------------|---------|
//! | `preference_deviation` | 1.0 | rank / list length per slot and room, 1.0 if unlisted |
//! | `group_compactness` | 1.0 | idle slots between a group's sessions per day |
//! | `professor_compactness` | 0.5 | idle slots between a professor's sessions per day |
//! | `room_balance` | 0.5 | variance of sessions per room |
//! | `time_of_day` | 0.25 | `1 - time_of_day_score` per session |
//! | `seat_waste` | 0.25 | fraction of empty seats per session |

use crate::models::{Assignment, Instance, Schedule};

use super::SoftConstraint;

pub const PREFERENCE_DEVIATION: &str = "preference_deviation";
pub const GROUP_COMPACTNESS: &str = "group_compactness";
pub const PROFESSOR_COMPACTNESS: &str = "professor_compactness";
pub const ROOM_BALANCE: &str = "room_balance";
pub const TIME_OF_DAY: &str = "time_of_day";
pub const SEAT_WASTE: &str = "seat_waste";

/// Deviation from a preference list: `rank / len`, or 1.0 if the value is
/// missing from a non-empty list. An empty list expresses no preference.
fn rank_penalty(rank: Option<u32>, list_len: usize) -> f64 {
    match (rank, list_len) {
        (_, 0) => 0.0,
        (Some(r), n) => r as f64 / n as f64,
        (None, _) => 1.0,
    }
}

/// Counts idle positions between occupied positions of the same
/// `(owner, day)`. Entries are `(owner, day, position)`.
fn idle_positions(mut entries: Vec<(usize, u8, u16)>) -> f64 {
    entries.sort_unstable();
    entries.dedup();
    let mut gaps = 0u32;
    for pair in entries.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        if a.0 == b.0 && a.1 == b.1 {
            gaps += (b.2 - a.2 - 1) as u32;
        }
    }
    gaps as f64
}

/// Professors' ranked slot and room preferences.
#[derive(Debug, Clone, Copy, Default)]
pub struct PreferenceDeviation;

impl SoftConstraint for PreferenceDeviation {
    fn name(&self) -> &'static str {
        PREFERENCE_DEVIATION
    }

    fn default_weight(&self) -> f64 {
        1.0
    }

    fn penalty(&self, instance: &Instance, schedule: &Schedule) -> f64 {
        schedule
            .assignments()
            .filter_map(|a| self.unary_penalty(instance, &a))
            .sum()
    }

    fn unary_penalty(&self, instance: &Instance, assignment: &Assignment) -> Option<f64> {
        let prof = instance.professor(assignment.professor);
        let slot = rank_penalty(
            instance.slot_preference_rank(assignment.professor, assignment.slot),
            prof.preferred_slots.len(),
        );
        let room = rank_penalty(
            instance.room_preference_rank(assignment.professor, assignment.room),
            prof.preferred_rooms.len(),
        );
        Some(slot + room)
    }
}

/// Idle slots in student groups' days.
#[derive(Debug, Clone, Copy, Default)]
pub struct GroupCompactness;

impl SoftConstraint for GroupCompactness {
    fn name(&self) -> &'static str {
        GROUP_COMPACTNESS
    }

    fn default_weight(&self) -> f64 {
        1.0
    }

    fn penalty(&self, instance: &Instance, schedule: &Schedule) -> f64 {
        let mut entries = Vec::new();
        for a in schedule.assignments() {
            let day = instance.slot_day(a.slot);
            for g in instance.course_groups(instance.session_course(a.session)) {
                for &pos in instance.slot_day_positions(a.slot) {
                    entries.push((g.get(), day, pos));
                }
            }
        }
        idle_positions(entries)
    }
}

/// Idle slots in professors' days.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProfessorCompactness;

impl SoftConstraint for ProfessorCompactness {
    fn name(&self) -> &'static str {
        PROFESSOR_COMPACTNESS
    }

    fn default_weight(&self) -> f64 {
        0.5
    }

    fn penalty(&self, instance: &Instance, schedule: &Schedule) -> f64 {
        let entries = schedule
            .assignments()
            .flat_map(|a| {
                let day = instance.slot_day(a.slot);
                instance
                    .slot_day_positions(a.slot)
                    .iter()
                    .map(move |&pos| (a.professor.get(), day, pos))
            })
            .collect();
        idle_positions(entries)
    }
}

/// Even use of rooms: population variance of sessions per room.
#[derive(Debug, Clone, Copy, Default)]
pub struct RoomBalance;

impl SoftConstraint for RoomBalance {
    fn name(&self) -> &'static str {
        ROOM_BALANCE
    }

    fn default_weight(&self) -> f64 {
        0.5
    }

    fn penalty(&self, instance: &Instance, schedule: &Schedule) -> f64 {
        let n = instance.room_count();
        if n == 0 {
            return 0.0;
        }
        let mut usage = vec![0u32; n];
        for a in schedule.assignments() {
            usage[a.room.get()] += 1;
        }
        let mean = usage.iter().sum::<u32>() as f64 / n as f64;
        usage
            .iter()
            .map(|&u| (u as f64 - mean).powi(2))
            .sum::<f64>()
            / n as f64
    }
}

/// Early-morning and late sessions.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimeOfDay;

impl SoftConstraint for TimeOfDay {
    fn name(&self) -> &'static str {
        TIME_OF_DAY
    }

    fn default_weight(&self) -> f64 {
        0.25
    }

    fn penalty(&self, instance: &Instance, schedule: &Schedule) -> f64 {
        schedule
            .assignments()
            .filter_map(|a| self.unary_penalty(instance, &a))
            .sum()
    }

    fn unary_penalty(&self, instance: &Instance, assignment: &Assignment) -> Option<f64> {
        Some(1.0 - instance.slot(assignment.slot).time_of_day_score())
    }
}

/// Oversized rooms.
#[derive(Debug, Clone, Copy, Default)]
pub struct SeatWaste;

impl SoftConstraint for SeatWaste {
    fn name(&self) -> &'static str {
        SEAT_WASTE
    }

    fn default_weight(&self) -> f64 {
        0.25
    }

    fn penalty(&self, instance: &Instance, schedule: &Schedule) -> f64 {
        schedule
            .assignments()
            .filter_map(|a| self.unary_penalty(instance, &a))
            .sum()
    }

    fn unary_penalty(&self, instance: &Instance, assignment: &Assignment) -> Option<f64> {
        let course = instance.course(instance.session_course(assignment.session));
        Some(instance.room(assignment.room).seat_waste(course.enrollment))
    }
}

/// Every built-in soft constraint.
pub fn builtin() -> Vec<Box<dyn SoftConstraint>> {
    vec![
        Box::new(PreferenceDeviation),
        Box::new(GroupCompactness),
        Box::new(ProfessorCompactness),
        Box::new(RoomBalance),
        Box::new(TimeOfDay),
        Box::new(SeatWaste),
    ]
}
