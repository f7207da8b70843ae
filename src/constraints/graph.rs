//! Compiled constraint graph.
//!
//! Holds what the search needs to know before the first decision: every
//! course's static domain (the (professor, room, slot) triples passing all
//! static hard rules), which sessions always conflict when they share a
//! slot, and which courses have no legal value at all.

use std::ops::Range;

use serde::Serialize;

use super::HardConstraint;
use crate::models::{
    Assignment, CourseIdx, Instance, Placement, ProfessorIdx, RoomIdx, Schedule, SessionIdx,
    SlotIdx,
};

/// A course whose static domain is empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmptyDomain {
    pub course: CourseIdx,
    pub course_id: String,
    /// Rules that alone reject values passing every other rule, or every
    /// rejecting rule if no single one is responsible.
    pub blocking: Vec<&'static str>,
}

/// Read-only search structure shared by every branch and individual.
#[derive(Debug, Clone)]
pub struct ConstraintGraph {
    /// Per course, sorted by (slot, room, professor).
    domains: Vec<Vec<Placement>>,
    /// Per course, `slot_count + 1` offsets into the domain.
    slot_offsets: Vec<Vec<u32>>,
    /// Per session, sessions of the same course or a shared group.
    neighbours: Vec<Vec<SessionIdx>>,
    empty: Vec<EmptyDomain>,
}

impl ConstraintGraph {
    pub(crate) fn build(instance: &Instance, statics: &[&dyn HardConstraint]) -> Self {
        let blank = Schedule::new(instance);
        let mut domains = Vec::with_capacity(instance.course_count());
        let mut slot_offsets = Vec::with_capacity(instance.course_count());
        let mut empty = Vec::new();

        for course in instance.course_indices() {
            let Some(&probe) = instance.course_sessions(course).first() else {
                domains.push(Vec::new());
                slot_offsets.push(vec![0; instance.slot_count() + 1]);
                continue;
            };

            let mut domain = Vec::new();
            let mut offsets = Vec::with_capacity(instance.slot_count() + 1);
            for s in 0..instance.slot_count() {
                offsets.push(domain.len() as u32);
                for r in 0..instance.room_count() {
                    for &p in instance.course_instructors(course) {
                        let value = Placement::new(p, RoomIdx::new(r), SlotIdx::new(s));
                        let candidate = Assignment::new(probe, value);
                        if statics.iter().all(|c| c.check(instance, &blank, &candidate)) {
                            domain.push(value);
                        }
                    }
                }
            }
            offsets.push(domain.len() as u32);

            if domain.is_empty() {
                empty.push(EmptyDomain {
                    course,
                    course_id: instance.course(course).id.clone(),
                    blocking: blocking_rules(instance, &blank, probe, statics),
                });
            }
            domains.push(domain);
            slot_offsets.push(offsets);
        }

        Self {
            domains,
            slot_offsets,
            neighbours: neighbours(instance),
            empty,
        }
    }

    /// Static domain of a course.
    #[inline]
    pub fn domain(&self, course: CourseIdx) -> &[Placement] {
        &self.domains[course.get()]
    }

    /// Indices into [`domain`](Self::domain) of the values in `slot`.
    #[inline]
    pub fn slot_range(&self, course: CourseIdx, slot: SlotIdx) -> Range<usize> {
        let offsets = &self.slot_offsets[course.get()];
        offsets[slot.get()] as usize..offsets[slot.get() + 1] as usize
    }

    /// Sessions that can never share a slot with `session`.
    #[inline]
    pub fn neighbours(&self, session: SessionIdx) -> &[SessionIdx] {
        &self.neighbours[session.get()]
    }

    pub fn empty_domains(&self) -> &[EmptyDomain] {
        &self.empty
    }

    pub fn total_domain_size(&self) -> usize {
        self.domains.iter().map(Vec::len).sum()
    }
}

/// Enumerates every triple (any professor) and names the rules responsible
/// for rejecting all of them.
fn blocking_rules(
    instance: &Instance,
    blank: &Schedule,
    probe: SessionIdx,
    statics: &[&dyn HardConstraint],
) -> Vec<&'static str> {
    let mut sole = vec![false; statics.len()];
    let mut any = vec![false; statics.len()];
    let mut failing = Vec::with_capacity(statics.len());

    for s in 0..instance.slot_count() {
        for r in 0..instance.room_count() {
            for p in 0..instance.professor_count() {
                let candidate = Assignment::new(
                    probe,
                    Placement::new(ProfessorIdx::new(p), RoomIdx::new(r), SlotIdx::new(s)),
                );
                failing.clear();
                failing.extend(
                    statics
                        .iter()
                        .enumerate()
                        .filter(|(_, c)| !c.check(instance, blank, &candidate))
                        .map(|(i, _)| i),
                );
                if let [only] = failing[..] {
                    sole[only] = true;
                }
                for &i in &failing {
                    any[i] = true;
                }
            }
        }
    }

    let chosen = if sole.iter().any(|&b| b) { &sole } else { &any };
    statics
        .iter()
        .zip(chosen)
        .filter(|(_, hit)| **hit)
        .map(|(c, _)| c.name())
        .collect()
}

fn neighbours(instance: &Instance) -> Vec<Vec<SessionIdx>> {
    let mut by_group: Vec<Vec<CourseIdx>> = vec![Vec::new(); instance.group_count()];
    for course in instance.course_indices() {
        for g in instance.course_groups(course) {
            by_group[g.get()].push(course);
        }
    }

    instance
        .session_indices()
        .map(|session| {
            let course = instance.session_course(session);
            let mut courses = vec![course];
            for g in instance.course_groups(course) {
                courses.extend(&by_group[g.get()]);
            }
            courses.sort_unstable();
            courses.dedup();

            courses
                .iter()
                .flat_map(|&c| instance.course_sessions(c).iter().copied())
                .filter(|&other| other != session)
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use crate::constraints::hard::{PROFESSOR_AVAILABILITY, ROOM_CAPABILITY, ROOM_CAPACITY};
    use crate::models::{Course, Instance, Professor, Room, TimeSlot, Weekday, LAB_CAPABILITY};
    use crate::models::{CourseIdx, SessionIdx, SlotIdx};
    use crate::test_utils;

    #[test]
    fn test_static_domains() {
        let inst = test_utils::small_instance();
        let graph = test_utils::standard_engine().compile(&inst);
        assert!(graph.empty_domains().is_empty());

        // C3 (lab) only fits LAB1 with P3, in all six slots.
        let c3 = inst.course_index("C3").unwrap();
        let lab = inst.room_index("LAB1").unwrap();
        assert_eq!(graph.domain(c3).len(), 6);
        assert!(graph.domain(c3).iter().all(|v| v.room == lab));

        // C2 (50 students) only fits R2; P2 misses mon-9.
        let c2 = inst.course_index("C2").unwrap();
        assert_eq!(graph.domain(c2).len(), 6 + 5);

        // Domains are slot-major and slot ranges partition them.
        let d = graph.domain(c2);
        assert!(d.windows(2).all(|w| w[0].slot <= w[1].slot));
        let total: usize = (0..inst.slot_count())
            .map(|s| graph.slot_range(c2, SlotIdx::new(s)).len())
            .sum();
        assert_eq!(total, d.len());
        assert_eq!(graph.slot_range(c2, SlotIdx::new(0)).len(), 1);
    }

    #[test]
    fn test_neighbours_share_course_or_group() {
        let inst = test_utils::small_instance();
        let graph = test_utils::standard_engine().compile(&inst);
        // s0, s1 = C1; s2 = C2; all in G1. s3, s4 in G2.
        assert_eq!(graph.neighbours(SessionIdx::new(0)), &[SessionIdx::new(1), SessionIdx::new(2)]);
        assert_eq!(graph.neighbours(SessionIdx::new(3)), &[SessionIdx::new(4)]);
    }

    #[test]
    fn test_empty_domain_names_single_blocking_rule() {
        let problem = test_utils::small_problem().with_course(
            Course::new("BIG")
                .with_enrollment(200)
                .with_group("G9")
                .with_instructor("P1"),
        );
        let inst = Instance::compile(&problem).unwrap();
        let graph = test_utils::standard_engine().compile(&inst);

        let empty = graph.empty_domains();
        assert_eq!(empty.len(), 1);
        assert_eq!(empty[0].course, CourseIdx::new(4));
        assert_eq!(empty[0].blocking, vec![ROOM_CAPACITY]);
    }

    #[test]
    fn test_empty_domain_reports_all_rules_when_jointly_blocked() {
        let problem = crate::models::Problem::new()
            .with_time_slot(TimeSlot::new("mon-9", Weekday::Monday, 540, 600))
            .with_time_slot(TimeSlot::new("mon-10", Weekday::Monday, 600, 660))
            .with_room(Room::new("SMALL-LAB", 10).with_capability(LAB_CAPABILITY))
            .with_room(Room::new("HALL", 100))
            .with_professor(Professor::new("P1").with_availability(["mon-9"]))
            .with_professor(Professor::new("P2").with_availability(["mon-10"]))
            .with_course(
                Course::new("LAB")
                    .with_enrollment(50)
                    .with_capability(LAB_CAPABILITY)
                    .with_instructor("P1"),
            );
        let inst = Instance::compile(&problem).unwrap();
        let graph = test_utils::standard_engine().compile(&inst);

        let blocking = &graph.empty_domains()[0].blocking;
        // HALL lacks the capability, SMALL-LAB the seats: each alone
        // rejects a value that everything else accepts.
        assert!(blocking.contains(&ROOM_CAPABILITY));
        assert!(blocking.contains(&ROOM_CAPACITY));
        assert!(!blocking.contains(&PROFESSOR_AVAILABILITY));
    }
}
