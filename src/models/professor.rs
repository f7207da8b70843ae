//! Professor model.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A professor who can be assigned to course sessions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Professor {
    /// Unique professor identifier.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Slots the professor can teach in. `None` = always available.
    pub availability: Option<BTreeSet<String>>,
    /// Maximum number of sessions per week.
    pub max_weekly_sessions: u32,
    /// Preferred time slots, most preferred first.
    pub preferred_slots: Vec<String>,
    /// Preferred rooms, most preferred first.
    pub preferred_rooms: Vec<String>,
}

impl Professor {
    /// Creates an always-available professor with a 20-session weekly cap.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            availability: None,
            max_weekly_sessions: 20,
            preferred_slots: Vec::new(),
            preferred_rooms: Vec::new(),
        }
    }

    /// Sets the name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Restricts availability to the given slots.
    pub fn with_availability<I, S>(mut self, slots: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.availability = Some(slots.into_iter().map(Into::into).collect());
        self
    }

    /// Sets the weekly session cap.
    pub fn with_max_sessions(mut self, max: u32) -> Self {
        self.max_weekly_sessions = max;
        self
    }

    /// Appends a preferred slot (lower rank than those already added).
    pub fn with_preferred_slot(mut self, slot_id: impl Into<String>) -> Self {
        self.preferred_slots.push(slot_id.into());
        self
    }

    /// Appends a preferred room (lower rank than those already added).
    pub fn with_preferred_room(mut self, room_id: impl Into<String>) -> Self {
        self.preferred_rooms.push(room_id.into());
        self
    }

    /// Whether the professor can teach in the given slot.
    pub fn is_available_at(&self, slot_id: &str) -> bool {
        match &self.availability {
            None => true,
            Some(slots) => slots.contains(slot_id),
        }
    }
}
