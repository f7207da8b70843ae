//! Timetabling domain models.
//!
//! Entities ([`Course`], [`Professor`], [`Room`], [`TimeSlot`]) are created
//! once per run from external input and are read-only afterwards. The
//! compiled [`Instance`] interns their ids into dense indices; search code
//! works on [`Schedule`]s of index-based [`Assignment`]s.
//!
//! # Domain Mappings
//!
//! | u-timetable | University | School | Training Center |
//! |-------------|-----------|--------|-----------------|
//! | Course | Course/Module | Subject | Workshop |
//! | Professor | Lecturer | Teacher | Trainer |
//! | Room | Lecture Hall/Lab | Classroom | Studio |
//! | Group | Cohort | Class | Team |

mod course;
mod index;
mod instance;
mod professor;
mod room;
mod schedule;
mod time_slot;

pub use course::{Course, LAB_CAPABILITY};
pub use index::{CourseIdx, GroupIdx, ProfessorIdx, RoomIdx, SessionIdx, SlotIdx};
pub use instance::{Instance, Problem, Session};
pub use professor::Professor;
pub use room::Room;
pub use schedule::{Assignment, AssignmentRecord, Placement, Schedule};
pub use time_slot::{SlotKind, TimeSlot, Weekday};
