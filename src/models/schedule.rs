//! Schedule (solution) model.
//!
//! A schedule maps every session to at most one [`Placement`]. It is
//! index-based: placements live in a flat per-session vector and the
//! occupancy tables used for O(1) clash lookups are flat vectors too, so
//! cloning a candidate is a plain array copy.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use super::{CourseIdx, GroupIdx, Instance, ProfessorIdx, RoomIdx, SessionIdx, SlotIdx};

/// A (professor, room, slot) triple: one value in a session's domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Placement {
    pub professor: ProfessorIdx,
    pub room: RoomIdx,
    pub slot: SlotIdx,
}

impl Placement {
    pub fn new(professor: ProfessorIdx, room: RoomIdx, slot: SlotIdx) -> Self {
        Self {
            professor,
            room,
            slot,
        }
    }
}

/// One session bound to a (professor, room, slot) triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Assignment {
    pub session: SessionIdx,
    pub professor: ProfessorIdx,
    pub room: RoomIdx,
    pub slot: SlotIdx,
}

impl Assignment {
    /// Binds a session to a placement.
    pub fn new(session: SessionIdx, placement: Placement) -> Self {
        Self {
            session,
            professor: placement.professor,
            room: placement.room,
            slot: placement.slot,
        }
    }

    /// The placement part of this assignment.
    #[inline]
    pub fn placement(&self) -> Placement {
        Placement::new(self.professor, self.room, self.slot)
    }
}

/// Identifier-based view of an assignment, for export and seed import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentRecord {
    pub course_id: String,
    /// 0-based session ordinal within the course.
    pub session: u32,
    pub professor_id: String,
    pub room_id: String,
    pub time_slot_id: String,
}

/// A (partial or complete) timetable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schedule {
    placements: Vec<Option<Placement>>,
    slot_count: usize,
    /// `[room * slots + slot]`
    room_busy: Vec<Option<SessionIdx>>,
    /// `[professor * slots + slot]`
    professor_busy: Vec<Option<SessionIdx>>,
    /// `[group * slots + slot]`
    group_busy: Vec<Option<SessionIdx>>,
    /// `[course * slots + slot]`
    course_busy: Vec<Option<SessionIdx>>,
    professor_load: Vec<u32>,
    assigned: usize,
}

impl Schedule {
    /// Creates an empty schedule sized for the instance.
    pub fn new(instance: &Instance) -> Self {
        let t = instance.slot_count();
        Self {
            placements: vec![None; instance.session_count()],
            slot_count: t,
            room_busy: vec![None; instance.room_count() * t],
            professor_busy: vec![None; instance.professor_count() * t],
            group_busy: vec![None; instance.group_count() * t],
            course_busy: vec![None; instance.course_count() * t],
            professor_load: vec![0; instance.professor_count()],
            assigned: 0,
        }
    }

    /// Binds `session` to `placement`, replacing any previous placement.
    ///
    /// Does not check hard constraints; callers go through the constraint
    /// engine first. Writing over an occupied cell would corrupt the
    /// occupancy tables, which the final validation detects.
    pub fn assign(&mut self, instance: &Instance, session: SessionIdx, placement: Placement) {
        self.unassign(instance, session);
        let t = self.slot_count;
        let s = placement.slot.get();
        let course = instance.session_course(session);

        self.room_busy[placement.room.get() * t + s] = Some(session);
        self.professor_busy[placement.professor.get() * t + s] = Some(session);
        for g in instance.course_groups(course) {
            self.group_busy[g.get() * t + s] = Some(session);
        }
        self.course_busy[course.get() * t + s] = Some(session);
        self.professor_load[placement.professor.get()] += 1;
        self.placements[session.get()] = Some(placement);
        self.assigned += 1;
    }

    /// Removes the placement of `session`, returning it.
    pub fn unassign(&mut self, instance: &Instance, session: SessionIdx) -> Option<Placement> {
        let placement = self.placements[session.get()].take()?;
        let t = self.slot_count;
        let s = placement.slot.get();
        let course = instance.session_course(session);

        clear_if(&mut self.room_busy[placement.room.get() * t + s], session);
        clear_if(&mut self.professor_busy[placement.professor.get() * t + s], session);
        for g in instance.course_groups(course) {
            clear_if(&mut self.group_busy[g.get() * t + s], session);
        }
        clear_if(&mut self.course_busy[course.get() * t + s], session);
        self.professor_load[placement.professor.get()] -= 1;
        self.assigned -= 1;
        Some(placement)
    }

    /// Placement of a session, if assigned.
    #[inline]
    pub fn placement(&self, session: SessionIdx) -> Option<Placement> {
        self.placements[session.get()]
    }

    /// Assignment of a session, if assigned.
    #[inline]
    pub fn assignment(&self, session: SessionIdx) -> Option<Assignment> {
        self.placement(session).map(|p| Assignment::new(session, p))
    }

    /// Iterates assignments in canonical session order.
    pub fn assignments(&self) -> impl Iterator<Item = Assignment> + '_ {
        self.placements
            .iter()
            .enumerate()
            .filter_map(|(i, p)| p.map(|p| Assignment::new(SessionIdx::new(i), p)))
    }

    /// Number of sessions the schedule is sized for.
    pub fn session_count(&self) -> usize {
        self.placements.len()
    }

    /// Number of assigned sessions.
    pub fn assigned_count(&self) -> usize {
        self.assigned
    }

    /// Whether every session is assigned.
    pub fn is_complete(&self) -> bool {
        self.assigned == self.placements.len()
    }

    #[inline]
    pub fn room_occupant(&self, room: RoomIdx, slot: SlotIdx) -> Option<SessionIdx> {
        self.room_busy[room.get() * self.slot_count + slot.get()]
    }

    #[inline]
    pub fn professor_occupant(&self, professor: ProfessorIdx, slot: SlotIdx) -> Option<SessionIdx> {
        self.professor_busy[professor.get() * self.slot_count + slot.get()]
    }

    #[inline]
    pub fn group_occupant(&self, group: GroupIdx, slot: SlotIdx) -> Option<SessionIdx> {
        self.group_busy[group.get() * self.slot_count + slot.get()]
    }

    #[inline]
    pub fn course_occupant(&self, course: CourseIdx, slot: SlotIdx) -> Option<SessionIdx> {
        self.course_busy[course.get() * self.slot_count + slot.get()]
    }

    /// Number of sessions assigned to a professor.
    #[inline]
    pub fn professor_load(&self, professor: ProfessorIdx) -> u32 {
        self.professor_load[professor.get()]
    }

    /// Canonical total order over schedules: lexicographic over the
    /// per-session placements (unassigned sorts first).
    pub fn canonical_cmp(&self, other: &Schedule) -> Ordering {
        self.placements.cmp(&other.placements)
    }

    /// Sessions per course in this schedule.
    pub fn course_session_counts(&self, instance: &Instance) -> Vec<u32> {
        let mut counts = vec![0u32; instance.course_count()];
        for a in self.assignments() {
            counts[instance.session_course(a.session).get()] += 1;
        }
        counts
    }

    /// Exports the schedule as identifier-based records.
    pub fn to_records(&self, instance: &Instance) -> Vec<AssignmentRecord> {
        self.assignments()
            .map(|a| {
                let session = instance.session(a.session);
                AssignmentRecord {
                    course_id: instance.course(session.course).id.clone(),
                    session: session.ordinal,
                    professor_id: instance.professor(a.professor).id.clone(),
                    room_id: instance.room(a.room).id.clone(),
                    time_slot_id: instance.slot(a.slot).id.clone(),
                }
            })
            .collect()
    }
}

#[inline]
fn clear_if(cell: &mut Option<SessionIdx>, session: SessionIdx) {
    if *cell == Some(session) {
        *cell = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils;

    fn placement(inst: &Instance, p: &str, r: &str, s: &str) -> Placement {
        Placement::new(
            inst.professor_index(p).unwrap(),
            inst.room_index(r).unwrap(),
            inst.slot_index(s).unwrap(),
        )
    }

    #[test]
    fn test_assign_updates_occupancy() {
        let inst = test_utils::small_instance();
        let mut s = Schedule::new(&inst);
        let s0 = SessionIdx::new(0);
        let pl = placement(&inst, "P1", "R1", "mon-9");
        s.assign(&inst, s0, pl);

        assert_eq!(s.assigned_count(), 1);
        assert_eq!(s.room_occupant(pl.room, pl.slot), Some(s0));
        assert_eq!(s.professor_occupant(pl.professor, pl.slot), Some(s0));
        assert_eq!(s.professor_load(pl.professor), 1);
        let course = inst.session_course(s0);
        assert_eq!(s.course_occupant(course, pl.slot), Some(s0));
        for g in inst.course_groups(course) {
            assert_eq!(s.group_occupant(*g, pl.slot), Some(s0));
        }
    }

    #[test]
    fn test_reassign_and_unassign_restore_tables() {
        let inst = test_utils::small_instance();
        let mut s = Schedule::new(&inst);
        let s0 = SessionIdx::new(0);
        let first = placement(&inst, "P1", "R1", "mon-9");
        let second = placement(&inst, "P1", "R2", "tue-9");

        s.assign(&inst, s0, first);
        s.assign(&inst, s0, second);
        assert_eq!(s.assigned_count(), 1);
        assert_eq!(s.room_occupant(first.room, first.slot), None);
        assert_eq!(s.room_occupant(second.room, second.slot), Some(s0));
        assert_eq!(s.professor_load(first.professor), 1);

        assert_eq!(s.unassign(&inst, s0), Some(second));
        assert_eq!(s.assigned_count(), 0);
        assert_eq!(s.professor_load(first.professor), 0);
        assert_eq!(s, Schedule::new(&inst));
        assert_eq!(s.unassign(&inst, s0), None);
    }

    #[test]
    fn test_canonical_order_and_records() {
        let inst = test_utils::small_instance();
        let mut a = Schedule::new(&inst);
        let mut b = Schedule::new(&inst);
        a.assign(&inst, SessionIdx::new(0), placement(&inst, "P1", "R1", "mon-9"));
        b.assign(&inst, SessionIdx::new(0), placement(&inst, "P1", "R1", "tue-9"));
        assert_eq!(a.canonical_cmp(&b), Ordering::Less);
        assert_eq!(a.canonical_cmp(&a.clone()), Ordering::Equal);

        let records = a.to_records(&inst);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].professor_id, "P1");
        assert_eq!(records[0].time_slot_id, "mon-9");
        assert_eq!(records[0].session, 0);
    }
}
