//! Dense typed indices.
//!
//! String identifiers are interned once when an [`Instance`](super::Instance)
//! is compiled. Search code works exclusively on these indices, so
//! constraints and heuristics never hold references into entity data.

use serde::{Deserialize, Serialize};

macro_rules! typed_index {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        pub struct $name(pub u32);

        impl $name {
            /// Creates an index from a `usize` position.
            #[inline]
            pub fn new(index: usize) -> Self {
                Self(index as u32)
            }

            /// Returns the position as `usize`.
            #[inline]
            pub fn get(self) -> usize {
                self.0 as usize
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }
    };
}

typed_index!(
    /// Index of a course.
    CourseIdx
);
typed_index!(
    /// Index of a professor.
    ProfessorIdx
);
typed_index!(
    /// Index of a room.
    RoomIdx
);
typed_index!(
    /// Index of a time slot in the total slot order.
    SlotIdx
);
typed_index!(
    /// Index of a student group.
    GroupIdx
);
typed_index!(
    /// Index of a session (one weekly meeting of a course).
    SessionIdx
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_roundtrip_and_order() {
        let a = SlotIdx::new(3);
        let b = SlotIdx::new(7);
        assert_eq!(a.get(), 3);
        assert!(a < b);
        assert_eq!(format!("{a}"), "SlotIdx(3)");
    }
}
