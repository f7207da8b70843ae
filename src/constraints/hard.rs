//! Built-in hard constraints.
//!
//! Static constraints depend on the candidate assignment alone and are
//! folded into each course's static domain when the constraint graph is
//! compiled. Dynamic constraints look at the occupancy tables of the
//! schedule the candidate is being added to; the candidate's own session
//! never conflicts with itself, so re-checking an assigned session against
//! its current schedule is well defined.

use crate::models::{Assignment, Instance, Schedule, SessionIdx};

use super::HardConstraint;

pub const PROFESSOR_ELIGIBILITY: &str = "professor_eligibility";
pub const PROFESSOR_AVAILABILITY: &str = "professor_availability";
pub const ROOM_CAPACITY: &str = "room_capacity";
pub const ROOM_CAPABILITY: &str = "room_capability";
pub const ROOM_AVAILABILITY: &str = "room_availability";
pub const SLOT_FIT: &str = "slot_fit";
pub const ROOM_CLASH: &str = "room_clash";
pub const PROFESSOR_CLASH: &str = "professor_clash";
pub const GROUP_CLASH: &str = "group_clash";
pub const COURSE_CLASH: &str = "course_clash";
pub const PROFESSOR_LOAD: &str = "professor_load";
/// Checked on complete schedules only: every session is assigned.
pub const SESSION_COMPLETENESS: &str = "session_completeness";

#[inline]
fn free_for(occupant: Option<SessionIdx>, session: SessionIdx) -> bool {
    occupant.is_none() || occupant == Some(session)
}

/// The professor is one of the course's candidate instructors.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProfessorEligibility;

impl HardConstraint for ProfessorEligibility {
    fn name(&self) -> &'static str {
        PROFESSOR_ELIGIBILITY
    }

    fn is_static(&self) -> bool {
        true
    }

    fn check(&self, instance: &Instance, _schedule: &Schedule, candidate: &Assignment) -> bool {
        let course = instance.session_course(candidate.session);
        instance
            .course_instructors(course)
            .contains(&candidate.professor)
    }
}

/// The professor is available in the slot.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProfessorAvailability;

impl HardConstraint for ProfessorAvailability {
    fn name(&self) -> &'static str {
        PROFESSOR_AVAILABILITY
    }

    fn is_static(&self) -> bool {
        true
    }

    fn check(&self, instance: &Instance, _schedule: &Schedule, candidate: &Assignment) -> bool {
        instance.professor_available(candidate.professor, candidate.slot)
    }
}

/// The room seats the whole enrollment.
#[derive(Debug, Clone, Copy, Default)]
pub struct RoomCapacity;

impl HardConstraint for RoomCapacity {
    fn name(&self) -> &'static str {
        ROOM_CAPACITY
    }

    fn is_static(&self) -> bool {
        true
    }

    fn check(&self, instance: &Instance, _schedule: &Schedule, candidate: &Assignment) -> bool {
        let course = instance.course(instance.session_course(candidate.session));
        instance.room(candidate.room).capacity >= course.enrollment
    }
}

/// The room carries every capability the course requires.
#[derive(Debug, Clone, Copy, Default)]
pub struct RoomCapability;

impl HardConstraint for RoomCapability {
    fn name(&self) -> &'static str {
        ROOM_CAPABILITY
    }

    fn is_static(&self) -> bool {
        true
    }

    fn check(&self, instance: &Instance, _schedule: &Schedule, candidate: &Assignment) -> bool {
        let course = instance.course(instance.session_course(candidate.session));
        instance
            .room(candidate.room)
            .has_capabilities(&course.required_capabilities)
    }
}

/// The room is not under maintenance in the slot.
#[derive(Debug, Clone, Copy, Default)]
pub struct RoomAvailability;

impl HardConstraint for RoomAvailability {
    fn name(&self) -> &'static str {
        ROOM_AVAILABILITY
    }

    fn is_static(&self) -> bool {
        true
    }

    fn check(&self, instance: &Instance, _schedule: &Schedule, candidate: &Assignment) -> bool {
        instance.room_available(candidate.room, candidate.slot)
    }
}

/// The slot kind admits the course and the slot is long enough.
#[derive(Debug, Clone, Copy, Default)]
pub struct SlotFit;

impl HardConstraint for SlotFit {
    fn name(&self) -> &'static str {
        SLOT_FIT
    }

    fn is_static(&self) -> bool {
        true
    }

    fn check(&self, instance: &Instance, _schedule: &Schedule, candidate: &Assignment) -> bool {
        let course = instance.course(instance.session_course(candidate.session));
        instance
            .slot(candidate.slot)
            .fits(course.duration_minutes, course.is_lab())
    }
}

/// At most one session per room at any moment. Overlapping slots count
/// as the same moment for all four clash rules.
#[derive(Debug, Clone, Copy, Default)]
pub struct RoomClash;

impl HardConstraint for RoomClash {
    fn name(&self) -> &'static str {
        ROOM_CLASH
    }

    fn check(&self, instance: &Instance, schedule: &Schedule, candidate: &Assignment) -> bool {
        instance.slot_overlaps(candidate.slot).iter().all(|&s| {
            free_for(schedule.room_occupant(candidate.room, s), candidate.session)
        })
    }
}

/// At most one session per (professor, slot).
#[derive(Debug, Clone, Copy, Default)]
pub struct ProfessorClash;

impl HardConstraint for ProfessorClash {
    fn name(&self) -> &'static str {
        PROFESSOR_CLASH
    }

    fn check(&self, instance: &Instance, schedule: &Schedule, candidate: &Assignment) -> bool {
        instance.slot_overlaps(candidate.slot).iter().all(|&s| {
            free_for(schedule.professor_occupant(candidate.professor, s), candidate.session)
        })
    }
}

/// At most one session per (student group, slot).
#[derive(Debug, Clone, Copy, Default)]
pub struct GroupClash;

impl HardConstraint for GroupClash {
    fn name(&self) -> &'static str {
        GROUP_CLASH
    }

    fn check(&self, instance: &Instance, schedule: &Schedule, candidate: &Assignment) -> bool {
        let course = instance.session_course(candidate.session);
        let overlaps = instance.slot_overlaps(candidate.slot);
        instance.course_groups(course).iter().all(|&g| {
            overlaps
                .iter()
                .all(|&s| free_for(schedule.group_occupant(g, s), candidate.session))
        })
    }
}

/// Two sessions of one course never share a slot.
#[derive(Debug, Clone, Copy, Default)]
pub struct CourseClash;

impl HardConstraint for CourseClash {
    fn name(&self) -> &'static str {
        COURSE_CLASH
    }

    fn check(&self, instance: &Instance, schedule: &Schedule, candidate: &Assignment) -> bool {
        let course = instance.session_course(candidate.session);
        instance
            .slot_overlaps(candidate.slot)
            .iter()
            .all(|&s| free_for(schedule.course_occupant(course, s), candidate.session))
    }
}

/// A professor teaches at most `max_weekly_sessions` sessions.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProfessorLoad;

impl HardConstraint for ProfessorLoad {
    fn name(&self) -> &'static str {
        PROFESSOR_LOAD
    }

    fn check(&self, instance: &Instance, schedule: &Schedule, candidate: &Assignment) -> bool {
        let mut load = schedule.professor_load(candidate.professor);
        if schedule
            .placement(candidate.session)
            .is_some_and(|p| p.professor == candidate.professor)
        {
            load -= 1;
        }
        load < instance.professor(candidate.professor).max_weekly_sessions
    }
}

/// Every built-in pairwise and unary hard constraint, static ones first.
pub fn builtin() -> Vec<Box<dyn HardConstraint>> {
    vec![
        Box::new(ProfessorEligibility),
        Box::new(ProfessorAvailability),
        Box::new(RoomCapacity),
        Box::new(RoomCapability),
        Box::new(RoomAvailability),
        Box::new(SlotFit),
        Box::new(RoomClash),
        Box::new(ProfessorClash),
        Box::new(GroupClash),
        Box::new(CourseClash),
        Box::new(ProfessorLoad),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Placement, SessionIdx};
    use crate::test_utils;

    fn candidate(inst: &Instance, session: usize, p: &str, r: &str, s: &str) -> Assignment {
        Assignment::new(
            SessionIdx::new(session),
            Placement::new(
                inst.professor_index(p).unwrap(),
                inst.room_index(r).unwrap(),
                inst.slot_index(s).unwrap(),
            ),
        )
    }

    #[test]
    fn test_static_constraints() {
        let inst = test_utils::small_instance();
        let empty = Schedule::new(&inst);

        // s2 = C2 (enrollment 50, P2/P3)
        let ok = candidate(&inst, 2, "P2", "R2", "tue-9");
        for c in builtin().iter().filter(|c| c.is_static()) {
            assert!(c.check(&inst, &empty, &ok), "{} rejected a legal value", c.name());
        }

        let rejects = |c: &dyn HardConstraint, s: usize, p: &str, r: &str, t: &str| {
            !c.check(&inst, &empty, &candidate(&inst, s, p, r, t))
        };
        assert!(rejects(&ProfessorEligibility, 2, "P1", "R2", "tue-9"));
        assert!(rejects(&ProfessorAvailability, 2, "P2", "R2", "mon-9"));
        assert!(rejects(&RoomCapacity, 2, "P2", "R1", "tue-9"));
        // s3 = C3 (lab)
        assert!(rejects(&RoomCapability, 3, "P3", "R2", "tue-9"));
        assert!(!rejects(&RoomCapability, 3, "P3", "LAB1", "tue-9"));
    }

    #[test]
    fn test_clashes_ignore_own_session() {
        let inst = test_utils::small_instance();
        let mut schedule = Schedule::new(&inst);
        let first = candidate(&inst, 0, "P1", "R1", "mon-9");
        schedule.assign(&inst, first.session, first.placement());

        // Re-checking the placed session against itself is fine.
        assert!(RoomClash.check(&inst, &schedule, &first));
        assert!(CourseClash.check(&inst, &schedule, &first));

        // s1 is the second C1 session: same course, same group.
        let sibling = candidate(&inst, 1, "P1", "R2", "mon-9");
        assert!(!ProfessorClash.check(&inst, &schedule, &sibling));
        assert!(!CourseClash.check(&inst, &schedule, &sibling));
        assert!(!GroupClash.check(&inst, &schedule, &sibling));
        assert!(RoomClash.check(&inst, &schedule, &sibling));

        // s2 = C2 shares group G1 and would share room R1.
        let other = candidate(&inst, 2, "P3", "R1", "mon-9");
        assert!(!RoomClash.check(&inst, &schedule, &other));
        assert!(!GroupClash.check(&inst, &schedule, &other));
        assert!(CourseClash.check(&inst, &schedule, &other));
    }

    #[test]
    fn test_clashes_span_overlapping_slots() {
        let inst = Instance::compile(&test_utils::overlap_problem()).unwrap();
        let mut schedule = Schedule::new(&inst);
        // s0 = LEC, s1 = LABC
        let lecture = candidate(&inst, 0, "P1", "R1", "mon-10");
        schedule.assign(&inst, lecture.session, lecture.placement());

        let lab = candidate(&inst, 1, "P1", "LAB", "mon-lab");
        assert!(!ProfessorClash.check(&inst, &schedule, &lab));
        assert!(!GroupClash.check(&inst, &schedule, &lab));
        assert!(RoomClash.check(&inst, &schedule, &lab));
        assert!(CourseClash.check(&inst, &schedule, &lab));

        // Same room through the other direction of the overlap.
        let mut schedule = Schedule::new(&inst);
        schedule.assign(&inst, lab.session, lab.placement());
        let lecture_in_lab = candidate(&inst, 0, "P1", "LAB", "mon-10");
        assert!(!RoomClash.check(&inst, &schedule, &lecture_in_lab));
        assert!(RoomClash.check(&inst, &schedule, &lab));
    }

    #[test]
    fn test_professor_load() {
        let inst = test_utils::small_instance();
        let mut schedule = Schedule::new(&inst);
        // P3 may teach three sessions.
        for (s, slot) in [(0, "mon-9"), (1, "mon-10"), (2, "mon-11")] {
            let placed = candidate(&inst, s, "P3", "R2", slot);
            schedule.assign(&inst, placed.session, placed.placement());
        }

        let fourth = candidate(&inst, 3, "P3", "LAB1", "tue-9");
        assert!(!ProfessorLoad.check(&inst, &schedule, &fourth));

        // Moving an already-counted session does not raise the load.
        let moved = candidate(&inst, 2, "P3", "R2", "tue-10");
        assert!(ProfessorLoad.check(&inst, &schedule, &moved));
    }
}
