//! Course model.
//!
//! A course requires a fixed number of weekly sessions. Each session needs
//! one professor from the course's candidate set, one room with enough
//! seats and the required capabilities, and one time slot long enough to
//! hold it.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Capability tag marking laboratory courses and rooms.
pub const LAB_CAPABILITY: &str = "lab";

/// A course to be timetabled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
    /// Unique course identifier.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Number of sessions per week.
    pub sessions_per_week: u32,
    /// Length of one session (minutes).
    pub duration_minutes: u16,
    /// Number of enrolled students.
    pub enrollment: u32,
    /// Student groups attending every session.
    pub groups: Vec<String>,
    /// Capability tags the room must carry (e.g. "lab", "projector").
    pub required_capabilities: BTreeSet<String>,
    /// Professors allowed to teach this course.
    pub instructors: Vec<String>,
}

impl Course {
    /// Creates a course with one 60-minute session per week.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            sessions_per_week: 1,
            duration_minutes: 60,
            enrollment: 0,
            groups: Vec::new(),
            required_capabilities: BTreeSet::new(),
            instructors: Vec::new(),
        }
    }

    /// Sets the course name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the weekly session count.
    pub fn with_sessions(mut self, sessions_per_week: u32) -> Self {
        self.sessions_per_week = sessions_per_week;
        self
    }

    /// Sets the session length in minutes.
    pub fn with_duration(mut self, minutes: u16) -> Self {
        self.duration_minutes = minutes;
        self
    }

    /// Sets the enrollment.
    pub fn with_enrollment(mut self, enrollment: u32) -> Self {
        self.enrollment = enrollment;
        self
    }

    /// Adds a student group.
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.groups.push(group.into());
        self
    }

    /// Adds a required room capability.
    pub fn with_capability(mut self, capability: impl Into<String>) -> Self {
        self.required_capabilities.insert(capability.into());
        self
    }

    /// Adds a candidate instructor.
    pub fn with_instructor(mut self, professor_id: impl Into<String>) -> Self {
        self.instructors.push(professor_id.into());
        self
    }

    /// Whether sessions of this course are laboratory sessions.
    pub fn is_lab(&self) -> bool {
        self.required_capabilities.contains(LAB_CAPABILITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_course_builder() {
        let c = Course::new("CS101")
            .with_name("Intro to Programming")
            .with_sessions(3)
            .with_duration(90)
            .with_enrollment(40)
            .with_group("CS-Y1")
            .with_capability("projector")
            .with_instructor("P1")
            .with_instructor("P2");

        assert_eq!(c.id, "CS101");
        assert_eq!(c.sessions_per_week, 3);
        assert_eq!(c.duration_minutes, 90);
        assert_eq!(c.enrollment, 40);
        assert_eq!(c.groups, vec!["CS-Y1".to_string()]);
        assert_eq!(c.instructors.len(), 2);
        assert!(!c.is_lab());
    }

    #[test]
    fn test_lab_detection() {
        let c = Course::new("CH201").with_capability(LAB_CAPABILITY);
        assert!(c.is_lab());
    }
}
