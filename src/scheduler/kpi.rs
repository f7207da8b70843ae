//! Timetable quality metrics (KPIs).
//!
//! Computes descriptive indicators from a schedule and its compiled
//! instance. Unlike soft scores they carry no weights and do not feed the
//! search.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Sessions scheduled | Assigned sessions |
//! | Rooms / professors / slots used | Distinct entities with at least one session |
//! | Room usage | Sessions per room |
//! | Avg room utilization | Mean over rooms of sessions / teaching slots |
//! | Professor load | Sessions per professor |
//! | Avg seat occupancy | Mean of enrollment / capacity over assignments |
//!
//! # Reference
//! Schaerf (1999), "A survey of automated timetabling"

use serde::Serialize;
use std::collections::BTreeMap;

use crate::models::{Instance, ProfessorIdx, RoomIdx, Schedule, SlotIdx};

/// Timetable performance indicators.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScheduleKpi {
    pub sessions_scheduled: usize,
    pub rooms_used: usize,
    pub professors_used: usize,
    pub slots_used: usize,
    /// Sessions per room id (every room listed).
    pub room_usage: BTreeMap<String, usize>,
    /// Mean fraction of teaching slots in which a room is busy (0.0..1.0).
    pub avg_room_utilization: f64,
    /// Sessions per professor id (every professor listed).
    pub professor_load: BTreeMap<String, u32>,
    /// Mean enrollment / capacity over assignments (0.0..1.0).
    pub avg_seat_occupancy: f64,
}

impl ScheduleKpi {
    /// Computes KPIs of a (possibly partial) schedule.
    pub fn calculate(instance: &Instance, schedule: &Schedule) -> Self {
        let mut room_counts = vec![0usize; instance.room_count()];
        let mut slot_used = vec![false; instance.slot_count()];
        let mut occupancy_sum = 0.0;
        let mut sessions = 0usize;

        for a in schedule.assignments() {
            sessions += 1;
            room_counts[a.room.get()] += 1;
            slot_used[a.slot.get()] = true;
            let capacity = instance.room(a.room).capacity;
            if capacity > 0 {
                let enrollment = instance.course(instance.session_course(a.session)).enrollment;
                occupancy_sum += (enrollment as f64 / capacity as f64).min(1.0);
            }
        }

        let teaching_slots = (0..instance.slot_count())
            .filter(|&i| instance.slot(SlotIdx::new(i)).is_teaching())
            .count();
        let avg_room_utilization = if room_counts.is_empty() || teaching_slots == 0 {
            0.0
        } else {
            let sum: f64 = room_counts
                .iter()
                .map(|&n| n as f64 / teaching_slots as f64)
                .sum();
            sum / room_counts.len() as f64
        };

        let room_usage = room_counts
            .iter()
            .enumerate()
            .map(|(i, &n)| (instance.room(RoomIdx::new(i)).id.clone(), n))
            .collect();
        let professor_load: BTreeMap<String, u32> = (0..instance.professor_count())
            .map(|i| {
                let p = ProfessorIdx::new(i);
                (instance.professor(p).id.clone(), schedule.professor_load(p))
            })
            .collect();

        Self {
            sessions_scheduled: sessions,
            rooms_used: room_counts.iter().filter(|&&n| n > 0).count(),
            professors_used: professor_load.values().filter(|&&n| n > 0).count(),
            slots_used: slot_used.iter().filter(|&&u| u).count(),
            room_usage,
            avg_room_utilization,
            professor_load,
            avg_seat_occupancy: if sessions == 0 {
                0.0
            } else {
                occupancy_sum / sessions as f64
            },
        }
    }

    /// Whether the schedule meets the given utilization thresholds.
    pub fn meets_thresholds(&self, min_room_utilization: f64, min_seat_occupancy: f64) -> bool {
        self.avg_room_utilization >= min_room_utilization
            && self.avg_seat_occupancy >= min_seat_occupancy
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Placement, SessionIdx};
    use crate::test_utils;

    fn two_sessions() -> (Instance, Schedule) {
        let inst = test_utils::small_instance();
        let p1 = inst.professor_index("P1").unwrap();
        let r1 = inst.room_index("R1").unwrap();
        let mut s = Schedule::new(&inst);
        // C1 (35 students) twice in R1 (40 seats).
        let at = |slot: &str| Placement::new(p1, r1, inst.slot_index(slot).unwrap());
        s.assign(&inst, SessionIdx::new(0), at("mon-9"));
        s.assign(&inst, SessionIdx::new(1), at("tue-9"));
        (inst, s)
    }

    #[test]
    fn test_kpi_basic() {
        let (inst, s) = two_sessions();
        let kpi = ScheduleKpi::calculate(&inst, &s);
        assert_eq!(kpi.sessions_scheduled, 2);
        assert_eq!(kpi.rooms_used, 1);
        assert_eq!(kpi.professors_used, 1);
        assert_eq!(kpi.slots_used, 2);
        assert_eq!(kpi.room_usage["R1"], 2);
        assert_eq!(kpi.room_usage["R2"], 0);
        assert_eq!(kpi.professor_load["P1"], 2);
        assert_eq!(kpi.professor_load["P3"], 0);
        assert!((kpi.avg_seat_occupancy - 35.0 / 40.0).abs() < 1e-10);
    }

    #[test]
    fn test_kpi_utilization() {
        let (inst, s) = two_sessions();
        let kpi = ScheduleKpi::calculate(&inst, &s);
        // R1: 2 of 6 slots, R2 and LAB1 idle.
        assert!((kpi.avg_room_utilization - (2.0 / 6.0) / 3.0).abs() < 1e-10);
    }

    #[test]
    fn test_kpi_empty() {
        let inst = test_utils::small_instance();
        let kpi = ScheduleKpi::calculate(&inst, &Schedule::new(&inst));
        assert_eq!(kpi.sessions_scheduled, 0);
        assert_eq!(kpi.rooms_used, 0);
        assert!(kpi.avg_room_utilization.abs() < 1e-10);
        assert!(kpi.avg_seat_occupancy.abs() < 1e-10);
    }

    #[test]
    fn test_meets_thresholds() {
        let (inst, s) = two_sessions();
        let kpi = ScheduleKpi::calculate(&inst, &s);
        assert!(kpi.meets_thresholds(0.1, 0.8));
        assert!(!kpi.meets_thresholds(0.5, 0.0));
        assert!(!kpi.meets_thresholds(0.0, 0.9));
    }
}
