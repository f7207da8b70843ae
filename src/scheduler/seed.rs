//! Import of caller-supplied seed schedules.

use std::collections::HashSet;

use crate::constraints::{ConstraintEngine, Verdict};
use crate::models::{Assignment, AssignmentRecord, Instance, Placement, Schedule, SessionIdx};
use crate::validation::{ValidationError, ValidationErrorKind};

/// Builds a schedule from identifier records.
///
/// A seed must be complete and satisfy every hard constraint. Records are
/// checked in order against the records before them; every problem is
/// collected.
pub(crate) fn import_seed(
    instance: &Instance,
    engine: &ConstraintEngine,
    records: &[AssignmentRecord],
) -> Result<Schedule, Vec<ValidationError>> {
    let mut errors = Vec::new();
    let mut schedule = Schedule::new(instance);
    let mut seen: HashSet<SessionIdx> = HashSet::new();
    let invalid = |message: String| ValidationError::new(ValidationErrorKind::InvalidSeed, message);

    for record in records {
        let label = format!("{}#{}", record.course_id, record.session);
        let Some(session) = resolve_session(instance, record) else {
            errors.push(invalid(format!("Seed names unknown session {label}")));
            continue;
        };
        let (Some(professor), Some(room), Some(slot)) = (
            instance.professor_index(&record.professor_id),
            instance.room_index(&record.room_id),
            instance.slot_index(&record.time_slot_id),
        ) else {
            errors.push(invalid(format!(
                "Seed assignment {label} references unknown professor, room or slot"
            )));
            continue;
        };
        if !seen.insert(session) {
            errors.push(invalid(format!("Seed assigns {label} more than once")));
            continue;
        }

        let placement = Placement::new(professor, room, slot);
        match engine.check_partial(instance, &schedule, &Assignment::new(session, placement)) {
            Verdict::Satisfied => schedule.assign(instance, session, placement),
            Verdict::Violated(name) => {
                errors.push(invalid(format!("Seed assignment {label} violates {name}")))
            }
        }
    }

    if errors.is_empty() && !schedule.is_complete() {
        let missing = schedule.session_count() - schedule.assigned_count();
        errors.push(invalid(format!("Seed leaves {missing} session(s) unscheduled")));
    }

    if errors.is_empty() {
        Ok(schedule)
    } else {
        Err(errors)
    }
}

fn resolve_session(instance: &Instance, record: &AssignmentRecord) -> Option<SessionIdx> {
    let course = instance.course_index(&record.course_id)?;
    instance
        .course_sessions(course)
        .get(record.session as usize)
        .copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cp::CspSolver;
    use crate::test_utils;

    fn feasible_records() -> (Instance, ConstraintEngine, Vec<AssignmentRecord>) {
        let inst = test_utils::small_instance();
        let engine = test_utils::standard_engine();
        let graph = engine.compile(&inst);
        let schedule = CspSolver::new(&inst, &engine, &graph)
            .solve()
            .outcome
            .into_schedule()
            .unwrap();
        let records = schedule.to_records(&inst);
        (inst, engine, records)
    }

    #[test]
    fn test_import_roundtrip() {
        let (inst, engine, records) = feasible_records();
        let schedule = import_seed(&inst, &engine, &records).unwrap();
        assert_eq!(schedule.to_records(&inst), records);
    }

    #[test]
    fn test_rejects_clash() {
        let (inst, engine, mut records) = feasible_records();
        // Move C1#1 onto C1#0's slot and room.
        records[1].time_slot_id = records[0].time_slot_id.clone();
        records[1].room_id = records[0].room_id.clone();
        let errors = import_seed(&inst, &engine, &records).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ValidationErrorKind::InvalidSeed);
        assert!(errors[0].message.contains("C1#1"));
    }

    #[test]
    fn test_collects_every_problem() {
        let (inst, engine, mut records) = feasible_records();
        records[0].room_id = "NOPE".into();
        records[2].course_id = "C9".into();
        let errors = import_seed(&inst, &engine, &records).unwrap_err();
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_rejects_incomplete_and_duplicate() {
        let (inst, engine, records) = feasible_records();
        let errors = import_seed(&inst, &engine, &records[..3]).unwrap_err();
        assert!(errors[0].message.contains("unscheduled"));

        let mut doubled = records.clone();
        doubled.push(records[0].clone());
        let errors = import_seed(&inst, &engine, &doubled).unwrap_err();
        assert!(errors[0].message.contains("more than once"));
    }
}
