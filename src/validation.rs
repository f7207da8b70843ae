//! Input validation for timetabling problems.
//!
//! Checks structural integrity of courses, professors, rooms and time
//! slots before any search starts. Detects:
//! - Duplicate IDs
//! - References to unknown professors, rooms or slots
//! - Courses with no eligible professor
//! - Zero session counts, zero durations and empty slots
//!
//! Every problem is collected; validation never stops at the first one.

use crate::models::Problem;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationErrorKind {
    /// Two entities of the same kind share an ID.
    DuplicateId,
    /// A course names a professor that doesn't exist.
    InvalidProfessorReference,
    /// A professor or room names a time slot that doesn't exist.
    InvalidSlotReference,
    /// A professor prefers a room that doesn't exist.
    InvalidRoomReference,
    /// A course has no professor who could teach it.
    NoEligibleProfessor,
    /// A numeric field is zero or inverted.
    InvalidValue,
    /// Courses exist but there are no rooms or no slots to put them in.
    MissingResources,
    /// A seed schedule does not match the problem.
    InvalidSeed,
}

impl ValidationError {
    pub fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates the entity data of a problem.
///
/// Checks:
/// 1. No duplicate course, professor, room or slot IDs
/// 2. Every slot ends after it starts
/// 3. Every course has at least one session and a positive duration
/// 4. Every instructor reference points to an existing professor
/// 5. Every course has at least one eligible professor
/// 6. Availability, maintenance and preference references point to
///    existing slots and rooms
/// 7. Rooms and slots exist whenever courses do
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_input(problem: &Problem) -> ValidationResult {
    let mut errors = Vec::new();

    let slot_ids = collect_ids(
        problem.time_slots.iter().map(|s| s.id.as_str()),
        "time slot",
        &mut errors,
    );
    let room_ids = collect_ids(problem.rooms.iter().map(|r| r.id.as_str()), "room", &mut errors);
    let professor_ids = collect_ids(
        problem.professors.iter().map(|p| p.id.as_str()),
        "professor",
        &mut errors,
    );
    collect_ids(problem.courses.iter().map(|c| c.id.as_str()), "course", &mut errors);

    for slot in &problem.time_slots {
        if slot.end_minute <= slot.start_minute {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidValue,
                format!("Time slot '{}' does not end after it starts", slot.id),
            ));
        }
    }

    for course in &problem.courses {
        if course.sessions_per_week == 0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidValue,
                format!("Course '{}' requires zero sessions", course.id),
            ));
        }
        if course.duration_minutes == 0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidValue,
                format!("Course '{}' has zero session duration", course.id),
            ));
        }

        let mut eligible = 0;
        for prof in &course.instructors {
            if professor_ids.contains(prof.as_str()) {
                eligible += 1;
            } else {
                errors.push(ValidationError::new(
                    ValidationErrorKind::InvalidProfessorReference,
                    format!("Course '{}' references unknown professor '{}'", course.id, prof),
                ));
            }
        }
        if eligible == 0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::NoEligibleProfessor,
                format!("Course '{}' has no eligible professor", course.id),
            ));
        }
    }

    for prof in &problem.professors {
        let referenced = prof
            .availability
            .iter()
            .flatten()
            .chain(prof.preferred_slots.iter());
        for slot in referenced {
            if !slot_ids.contains(slot.as_str()) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::InvalidSlotReference,
                    format!("Professor '{}' references unknown time slot '{}'", prof.id, slot),
                ));
            }
        }
        for room in &prof.preferred_rooms {
            if !room_ids.contains(room.as_str()) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::InvalidRoomReference,
                    format!("Professor '{}' prefers unknown room '{}'", prof.id, room),
                ));
            }
        }
    }

    for room in &problem.rooms {
        for slot in &room.unavailable_slots {
            if !slot_ids.contains(slot.as_str()) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::InvalidSlotReference,
                    format!("Room '{}' references unknown time slot '{}'", room.id, slot),
                ));
            }
        }
    }

    if !problem.courses.is_empty() {
        if problem.rooms.is_empty() {
            errors.push(ValidationError::new(
                ValidationErrorKind::MissingResources,
                "Courses were given but no rooms",
            ));
        }
        if problem.time_slots.is_empty() {
            errors.push(ValidationError::new(
                ValidationErrorKind::MissingResources,
                "Courses were given but no time slots",
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn collect_ids<'a>(
    ids: impl Iterator<Item = &'a str>,
    what: &str,
    errors: &mut Vec<ValidationError>,
) -> HashSet<&'a str> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate {what} ID: {id}"),
            ));
        }
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Course, Professor, Room, TimeSlot, Weekday};
    use crate::test_utils;

    fn has_kind(errors: &[ValidationError], kind: ValidationErrorKind) -> bool {
        errors.iter().any(|e| e.kind == kind)
    }

    #[test]
    fn test_valid_input() {
        assert!(validate_input(&test_utils::small_problem()).is_ok());
    }

    #[test]
    fn test_duplicate_room_id() {
        let problem = test_utils::small_problem().with_room(Room::new("R1", 10));
        let errors = validate_input(&problem).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::DuplicateId && e.message.contains("room")));
    }

    #[test]
    fn test_course_without_eligible_professor() {
        let problem = test_utils::small_problem().with_course(Course::new("ORPHAN"));
        let errors = validate_input(&problem).unwrap_err();
        assert!(has_kind(&errors, ValidationErrorKind::NoEligibleProfessor));
    }

    #[test]
    fn test_unknown_professor_reference() {
        let problem = test_utils::small_problem()
            .with_course(Course::new("X").with_instructor("P1").with_instructor("NOBODY"));
        let errors = validate_input(&problem).unwrap_err();
        assert!(has_kind(&errors, ValidationErrorKind::InvalidProfessorReference));
        // P1 is still eligible, so only the reference is reported.
        assert!(!has_kind(&errors, ValidationErrorKind::NoEligibleProfessor));
    }

    #[test]
    fn test_unknown_slot_and_room_references() {
        let problem = test_utils::small_problem()
            .with_professor(
                Professor::new("PX")
                    .with_availability(["sat-9"])
                    .with_preferred_room("HALL-9"),
            )
            .with_room(Room::new("RX", 10).with_unavailable_slot("sun-9"));
        let errors = validate_input(&problem).unwrap_err();
        assert_eq!(
            errors
                .iter()
                .filter(|e| e.kind == ValidationErrorKind::InvalidSlotReference)
                .count(),
            2
        );
        assert!(has_kind(&errors, ValidationErrorKind::InvalidRoomReference));
    }

    #[test]
    fn test_invalid_values() {
        let problem = test_utils::small_problem()
            .with_time_slot(TimeSlot::new("bad", Weekday::Friday, 600, 600))
            .with_course(Course::new("Z").with_sessions(0).with_duration(0).with_instructor("P1"));
        let errors = validate_input(&problem).unwrap_err();
        assert_eq!(
            errors
                .iter()
                .filter(|e| e.kind == ValidationErrorKind::InvalidValue)
                .count(),
            3
        );
    }

    #[test]
    fn test_missing_resources() {
        let problem = Problem::new()
            .with_professor(Professor::new("P1"))
            .with_course(Course::new("C1").with_instructor("P1"));
        let errors = validate_input(&problem).unwrap_err();
        assert_eq!(
            errors
                .iter()
                .filter(|e| e.kind == ValidationErrorKind::MissingResources)
                .count(),
            2
        );
    }

    #[test]
    fn test_empty_problem_is_valid() {
        assert!(validate_input(&Problem::new()).is_ok());
    }
}
