//! Problem input and its compiled, index-based form.
//!
//! [`Problem`] is the raw entity set handed over by the loading
//! collaborator. [`Instance`] is the read-only compiled view shared by
//! every search branch and population member: ids are interned, slots
//! are sorted into their total order, courses are expanded into sessions
//! and availability masks are flattened into lookup tables.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::{
    Course, CourseIdx, GroupIdx, Professor, ProfessorIdx, Room, RoomIdx, SessionIdx, SlotIdx,
    SlotKind, TimeSlot,
};
use crate::error::{Result, TimetableError};
use crate::validation::validate_input;

/// The entity set for one term.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Problem {
    pub courses: Vec<Course>,
    pub professors: Vec<Professor>,
    pub rooms: Vec<Room>,
    pub time_slots: Vec<TimeSlot>,
}

impl Problem {
    /// Creates an empty problem.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a course.
    pub fn with_course(mut self, course: Course) -> Self {
        self.courses.push(course);
        self
    }

    /// Adds a professor.
    pub fn with_professor(mut self, professor: Professor) -> Self {
        self.professors.push(professor);
        self
    }

    /// Adds a room.
    pub fn with_room(mut self, room: Room) -> Self {
        self.rooms.push(room);
        self
    }

    /// Adds a time slot.
    pub fn with_time_slot(mut self, slot: TimeSlot) -> Self {
        self.time_slots.push(slot);
        self
    }
}

/// One weekly meeting of a course.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Session {
    /// Owning course.
    pub course: CourseIdx,
    /// 0-based ordinal among the course's sessions.
    pub ordinal: u32,
}

/// Compiled, index-based problem.
#[derive(Debug, Clone)]
pub struct Instance {
    courses: Vec<Course>,
    professors: Vec<Professor>,
    rooms: Vec<Room>,
    slots: Vec<TimeSlot>,
    groups: Vec<String>,
    sessions: Vec<Session>,

    course_ids: HashMap<String, CourseIdx>,
    professor_ids: HashMap<String, ProfessorIdx>,
    room_ids: HashMap<String, RoomIdx>,
    slot_ids: HashMap<String, SlotIdx>,

    course_groups: Vec<Vec<GroupIdx>>,
    course_instructors: Vec<Vec<ProfessorIdx>>,
    course_sessions: Vec<Vec<SessionIdx>>,

    /// `[professor * slots + slot]`
    professor_available: Vec<bool>,
    /// `[room * slots + slot]`
    room_available: Vec<bool>,
    /// `[professor * slots + slot]`, rank in the preference list.
    slot_rank: Vec<Option<u32>>,
    /// `[professor * rooms + room]`, rank in the preference list.
    room_rank: Vec<Option<u32>>,

    slot_day: Vec<u8>,
    /// Teaching slots sharing wall-clock time with each slot, itself included.
    slot_overlaps: Vec<Vec<SlotIdx>>,
    /// Regular-slot positions within the day covered by each slot.
    slot_positions: Vec<Vec<u16>>,
}

impl Instance {
    /// Validates and compiles a problem.
    ///
    /// # Errors
    /// [`TimetableError::InvalidInput`] with every detected problem if the
    /// entity data is malformed or self-contradictory.
    pub fn compile(problem: &Problem) -> Result<Self> {
        validate_input(problem).map_err(TimetableError::InvalidInput)?;

        let mut slots = problem.time_slots.clone();
        slots.sort();
        let courses = problem.courses.clone();
        let professors = problem.professors.clone();
        let rooms = problem.rooms.clone();

        let course_ids: HashMap<String, CourseIdx> = courses
            .iter()
            .enumerate()
            .map(|(i, c)| (c.id.clone(), CourseIdx::new(i)))
            .collect();
        let professor_ids: HashMap<String, ProfessorIdx> = professors
            .iter()
            .enumerate()
            .map(|(i, p)| (p.id.clone(), ProfessorIdx::new(i)))
            .collect();
        let room_ids: HashMap<String, RoomIdx> = rooms
            .iter()
            .enumerate()
            .map(|(i, r)| (r.id.clone(), RoomIdx::new(i)))
            .collect();
        let slot_ids: HashMap<String, SlotIdx> = slots
            .iter()
            .enumerate()
            .map(|(i, s)| (s.id.clone(), SlotIdx::new(i)))
            .collect();

        // Groups are interned in first-appearance order.
        let mut groups: Vec<String> = Vec::new();
        let mut group_ids: HashMap<String, GroupIdx> = HashMap::new();
        let mut course_groups = Vec::with_capacity(courses.len());
        for course in &courses {
            let mut idxs = Vec::with_capacity(course.groups.len());
            for g in &course.groups {
                let idx = *group_ids.entry(g.clone()).or_insert_with(|| {
                    groups.push(g.clone());
                    GroupIdx::new(groups.len() - 1)
                });
                if !idxs.contains(&idx) {
                    idxs.push(idx);
                }
            }
            course_groups.push(idxs);
        }

        let course_instructors: Vec<Vec<ProfessorIdx>> = courses
            .iter()
            .map(|c| {
                let mut idxs: Vec<ProfessorIdx> = c
                    .instructors
                    .iter()
                    .filter_map(|p| professor_ids.get(p).copied())
                    .collect();
                idxs.sort();
                idxs.dedup();
                idxs
            })
            .collect();

        let mut sessions = Vec::new();
        let mut course_sessions = Vec::with_capacity(courses.len());
        for (ci, course) in courses.iter().enumerate() {
            let mut own = Vec::with_capacity(course.sessions_per_week as usize);
            for ordinal in 0..course.sessions_per_week {
                own.push(SessionIdx::new(sessions.len()));
                sessions.push(Session {
                    course: CourseIdx::new(ci),
                    ordinal,
                });
            }
            course_sessions.push(own);
        }

        let n_slots = slots.len();
        let mut professor_available = vec![false; professors.len() * n_slots];
        let mut slot_rank = vec![None; professors.len() * n_slots];
        let mut room_rank = vec![None; professors.len() * rooms.len()];
        for (pi, p) in professors.iter().enumerate() {
            for (si, s) in slots.iter().enumerate() {
                professor_available[pi * n_slots + si] = p.is_available_at(&s.id);
            }
            for (rank, sid) in p.preferred_slots.iter().enumerate() {
                if let Some(si) = slot_ids.get(sid) {
                    let cell = &mut slot_rank[pi * n_slots + si.get()];
                    cell.get_or_insert(rank as u32);
                }
            }
            for (rank, rid) in p.preferred_rooms.iter().enumerate() {
                if let Some(ri) = room_ids.get(rid) {
                    let cell = &mut room_rank[pi * rooms.len() + ri.get()];
                    cell.get_or_insert(rank as u32);
                }
            }
        }

        let mut room_available = vec![false; rooms.len() * n_slots];
        for (ri, r) in rooms.iter().enumerate() {
            for (si, s) in slots.iter().enumerate() {
                room_available[ri * n_slots + si] = r.is_available_at(&s.id);
            }
        }

        // Only regular slots are numbered; breaks and lunches are not gaps.
        let mut regular: Vec<(usize, u16)> = Vec::new();
        let mut position = 0u16;
        for (si, s) in slots.iter().enumerate() {
            if si > 0 && slots[si - 1].day != s.day {
                position = 0;
            }
            if s.kind == SlotKind::Regular {
                regular.push((si, position));
                position += 1;
            }
        }

        let mut slot_day = Vec::with_capacity(n_slots);
        let mut slot_overlaps = Vec::with_capacity(n_slots);
        let mut slot_positions = Vec::with_capacity(n_slots);
        for (si, s) in slots.iter().enumerate() {
            slot_day.push(s.day as u8);
            slot_overlaps.push(
                slots
                    .iter()
                    .enumerate()
                    .filter(|&(oi, o)| oi == si || (o.is_teaching() && o.overlaps(s)))
                    .map(|(oi, _)| SlotIdx::new(oi))
                    .collect::<Vec<_>>(),
            );
            let positions: Vec<u16> = match s.kind {
                SlotKind::Regular => regular
                    .iter()
                    .filter(|&&(ri, _)| ri == si)
                    .map(|&(_, p)| p)
                    .collect(),
                SlotKind::Extended => regular
                    .iter()
                    .filter(|&&(ri, _)| slots[ri].overlaps(s))
                    .map(|&(_, p)| p)
                    .collect(),
                SlotKind::Break | SlotKind::Lunch => Vec::new(),
            };
            slot_positions.push(positions);
        }

        Ok(Self {
            courses,
            professors,
            rooms,
            slots,
            groups,
            sessions,
            course_ids,
            professor_ids,
            room_ids,
            slot_ids,
            course_groups,
            course_instructors,
            course_sessions,
            professor_available,
            room_available,
            slot_rank,
            room_rank,
            slot_day,
            slot_overlaps,
            slot_positions,
        })
    }

    // ---- sizes ----

    pub fn course_count(&self) -> usize {
        self.courses.len()
    }

    pub fn professor_count(&self) -> usize {
        self.professors.len()
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    // ---- entity access ----

    pub fn course(&self, idx: CourseIdx) -> &Course {
        &self.courses[idx.get()]
    }

    pub fn professor(&self, idx: ProfessorIdx) -> &Professor {
        &self.professors[idx.get()]
    }

    pub fn room(&self, idx: RoomIdx) -> &Room {
        &self.rooms[idx.get()]
    }

    pub fn slot(&self, idx: SlotIdx) -> &TimeSlot {
        &self.slots[idx.get()]
    }

    pub fn group(&self, idx: GroupIdx) -> &str {
        &self.groups[idx.get()]
    }

    pub fn session(&self, idx: SessionIdx) -> Session {
        self.sessions[idx.get()]
    }

    /// Course owning a session.
    #[inline]
    pub fn session_course(&self, idx: SessionIdx) -> CourseIdx {
        self.sessions[idx.get()].course
    }

    /// Iterates all session indices in canonical order.
    pub fn session_indices(&self) -> impl Iterator<Item = SessionIdx> + '_ {
        (0..self.sessions.len()).map(SessionIdx::new)
    }

    /// Iterates all course indices.
    pub fn course_indices(&self) -> impl Iterator<Item = CourseIdx> + '_ {
        (0..self.courses.len()).map(CourseIdx::new)
    }

    pub fn course_groups(&self, idx: CourseIdx) -> &[GroupIdx] {
        &self.course_groups[idx.get()]
    }

    pub fn course_instructors(&self, idx: CourseIdx) -> &[ProfessorIdx] {
        &self.course_instructors[idx.get()]
    }

    pub fn course_sessions(&self, idx: CourseIdx) -> &[SessionIdx] {
        &self.course_sessions[idx.get()]
    }

    // ---- id lookup ----

    pub fn course_index(&self, id: &str) -> Option<CourseIdx> {
        self.course_ids.get(id).copied()
    }

    pub fn professor_index(&self, id: &str) -> Option<ProfessorIdx> {
        self.professor_ids.get(id).copied()
    }

    pub fn room_index(&self, id: &str) -> Option<RoomIdx> {
        self.room_ids.get(id).copied()
    }

    pub fn slot_index(&self, id: &str) -> Option<SlotIdx> {
        self.slot_ids.get(id).copied()
    }

    // ---- masks ----

    #[inline]
    pub fn professor_available(&self, p: ProfessorIdx, s: SlotIdx) -> bool {
        self.professor_available[p.get() * self.slots.len() + s.get()]
    }

    #[inline]
    pub fn room_available(&self, r: RoomIdx, s: SlotIdx) -> bool {
        self.room_available[r.get() * self.slots.len() + s.get()]
    }

    /// Rank of `s` in the professor's slot preference list.
    #[inline]
    pub fn slot_preference_rank(&self, p: ProfessorIdx, s: SlotIdx) -> Option<u32> {
        self.slot_rank[p.get() * self.slots.len() + s.get()]
    }

    /// Rank of `r` in the professor's room preference list.
    #[inline]
    pub fn room_preference_rank(&self, p: ProfessorIdx, r: RoomIdx) -> Option<u32> {
        self.room_rank[p.get() * self.rooms.len() + r.get()]
    }

    /// Day number (Monday = 0) of a slot.
    #[inline]
    pub fn slot_day(&self, s: SlotIdx) -> u8 {
        self.slot_day[s.get()]
    }

    /// Teaching slots overlapping `s` in wall-clock time, `s` included,
    /// in slot order. Clash rules and propagation consult every one.
    #[inline]
    pub fn slot_overlaps(&self, s: SlotIdx) -> &[SlotIdx] {
        &self.slot_overlaps[s.get()]
    }

    /// Positions of the regular slots a slot covers within its day.
    ///
    /// A regular slot covers its own position, an extended slot the
    /// regular slots it overlaps, a break or lunch none.
    #[inline]
    pub fn slot_day_positions(&self, s: SlotIdx) -> &[u16] {
        &self.slot_positions[s.get()]
    }
}
