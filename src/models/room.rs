//! Room model.
//!
//! Rooms carry a seat capacity, capability tags (lab, projector, ...)
//! and a maintenance mask of slots in which they cannot be used.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A teaching room.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Room {
    /// Unique room identifier.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Number of seats.
    pub capacity: u32,
    /// Capability tags.
    pub capabilities: BTreeSet<String>,
    /// Slots in which the room is closed.
    pub unavailable_slots: BTreeSet<String>,
}

impl Room {
    /// Creates a room with the given capacity.
    pub fn new(id: impl Into<String>, capacity: u32) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            capacity,
            capabilities: BTreeSet::new(),
            unavailable_slots: BTreeSet::new(),
        }
    }

    /// Sets the room name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Adds a capability tag.
    pub fn with_capability(mut self, capability: impl Into<String>) -> Self {
        self.capabilities.insert(capability.into());
        self
    }

    /// Marks a slot as unavailable.
    pub fn with_unavailable_slot(mut self, slot_id: impl Into<String>) -> Self {
        self.unavailable_slots.insert(slot_id.into());
        self
    }

    /// Whether the room carries every required capability.
    pub fn has_capabilities(&self, required: &BTreeSet<String>) -> bool {
        required.is_subset(&self.capabilities)
    }

    /// Whether the room is open in the given slot.
    pub fn is_available_at(&self, slot_id: &str) -> bool {
        !self.unavailable_slots.contains(slot_id)
    }

    /// Fraction of seats left empty by a class of `enrollment` students.
    ///
    /// Returns 0.0 for an over-full or zero-capacity room.
    pub fn seat_waste(&self, enrollment: u32) -> f64 {
        if self.capacity == 0 || enrollment >= self.capacity {
            return 0.0;
        }
        (self.capacity - enrollment) as f64 / self.capacity as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_builder() {
        let r = Room::new("R1", 30)
            .with_name("Lab A")
            .with_capability("lab")
            .with_capability("projector")
            .with_unavailable_slot("fri-16");

        assert_eq!(r.capacity, 30);
        assert!(r.is_available_at("mon-9"));
        assert!(!r.is_available_at("fri-16"));

        let mut required = BTreeSet::new();
        required.insert("lab".to_string());
        assert!(r.has_capabilities(&required));
        required.insert("computers".to_string());
        assert!(!r.has_capabilities(&required));
    }

    #[test]
    fn test_seat_waste() {
        let r = Room::new("R1", 40);
        assert!((r.seat_waste(30) - 0.25).abs() < 1e-10);
        assert!((r.seat_waste(40) - 0.0).abs() < 1e-10);
        assert!((r.seat_waste(50) - 0.0).abs() < 1e-10);
    }
}
