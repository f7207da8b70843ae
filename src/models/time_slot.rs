//! Time slot model.
//!
//! A term has a finite, fixed set of weekly time slots. Slots are totally
//! ordered day-major, time-minor; the order drives deterministic
//! tie-breaks and the compactness (gap) scoring.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Day of the week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

/// Slot classification.
///
/// Break and lunch slots exist in the calendar but never host a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SlotKind {
    /// Ordinary teaching slot.
    #[default]
    Regular,
    /// Long slot reserved for laboratory sessions.
    Extended,
    /// Short break.
    Break,
    /// Lunch break.
    Lunch,
}

/// A weekly time slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    /// Unique slot identifier.
    pub id: String,
    /// Day of the week.
    pub day: Weekday,
    /// Start time in minutes from midnight.
    pub start_minute: u16,
    /// End time in minutes from midnight (exclusive).
    pub end_minute: u16,
    /// Slot classification.
    pub kind: SlotKind,
}

impl TimeSlot {
    /// Creates a regular slot.
    pub fn new(id: impl Into<String>, day: Weekday, start_minute: u16, end_minute: u16) -> Self {
        Self {
            id: id.into(),
            day,
            start_minute,
            end_minute,
            kind: SlotKind::Regular,
        }
    }

    /// Sets the slot kind.
    pub fn with_kind(mut self, kind: SlotKind) -> Self {
        self.kind = kind;
        self
    }

    /// Slot length in minutes.
    #[inline]
    pub fn duration_minutes(&self) -> u16 {
        self.end_minute.saturating_sub(self.start_minute)
    }

    /// Whether sessions can be placed in this slot at all.
    #[inline]
    pub fn is_teaching(&self) -> bool {
        matches!(self.kind, SlotKind::Regular | SlotKind::Extended)
    }

    /// Whether a session of the given length and lab requirement fits.
    ///
    /// Lab sessions may use regular or extended slots; everything else
    /// uses regular slots only.
    pub fn fits(&self, duration_minutes: u16, is_lab: bool) -> bool {
        let kind_ok = match self.kind {
            SlotKind::Regular => true,
            SlotKind::Extended => is_lab,
            SlotKind::Break | SlotKind::Lunch => false,
        };
        kind_ok && self.duration_minutes() >= duration_minutes
    }

    /// Total order key: day-major, time-minor, id last.
    pub fn order_key(&self) -> (Weekday, u16, u16, &str) {
        (self.day, self.start_minute, self.end_minute, self.id.as_str())
    }

    /// Whether two slots overlap in wall-clock time.
    pub fn overlaps(&self, other: &TimeSlot) -> bool {
        self.day == other.day
            && self.start_minute < other.end_minute
            && other.start_minute < self.end_minute
    }

    /// Time-of-day desirability (higher = better), in `[0.2, 1.0]`.
    ///
    /// | Start hour | Score |
    /// |------------|-------|
    /// | 9–12 | 1.0 |
    /// | 12–14 | 0.8 |
    /// | 14–17 | 0.6 |
    /// | 8–9 | 0.4 |
    /// | other | 0.2 |
    pub fn time_of_day_score(&self) -> f64 {
        match self.start_minute / 60 {
            9..=11 => 1.0,
            12..=13 => 0.8,
            14..=16 => 0.6,
            8 => 0.4,
            _ => 0.2,
        }
    }
}

impl PartialOrd for TimeSlot {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TimeSlot {
    fn cmp(&self, other: &Self) -> Ordering {
        self.order_key()
            .cmp(&other.order_key())
            .then_with(|| (self.kind as u8).cmp(&(other.kind as u8)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_order_is_day_major() {
        let mut slots = vec![
            TimeSlot::new("tue-9", Weekday::Tuesday, 540, 600),
            TimeSlot::new("mon-14", Weekday::Monday, 840, 900),
            TimeSlot::new("mon-9", Weekday::Monday, 540, 600),
        ];
        slots.sort();
        let ids: Vec<&str> = slots.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["mon-9", "mon-14", "tue-9"]);
    }

    #[test]
    fn test_fits_respects_kind_and_length() {
        let regular = TimeSlot::new("r", Weekday::Monday, 540, 600);
        let extended = TimeSlot::new("e", Weekday::Monday, 600, 780).with_kind(SlotKind::Extended);
        let lunch = TimeSlot::new("l", Weekday::Monday, 780, 840).with_kind(SlotKind::Lunch);

        assert!(regular.fits(60, false));
        assert!(!regular.fits(90, false));
        assert!(regular.fits(60, true));
        assert!(extended.fits(180, true));
        assert!(!extended.fits(60, false));
        assert!(!lunch.fits(30, false));
        assert!(!lunch.is_teaching());
    }

    #[test]
    fn test_overlap_and_time_of_day() {
        let a = TimeSlot::new("a", Weekday::Monday, 540, 600);
        let b = TimeSlot::new("b", Weekday::Monday, 570, 630);
        let c = TimeSlot::new("c", Weekday::Tuesday, 540, 600);
        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c));

        assert!((a.time_of_day_score() - 1.0).abs() < 1e-10);
        let evening = TimeSlot::new("ev", Weekday::Monday, 1080, 1140);
        assert!((evening.time_of_day_score() - 0.2).abs() < 1e-10);
    }
}
