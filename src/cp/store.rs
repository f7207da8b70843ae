//! Trail-based domain store.
//!
//! Live domains are flags over each session's static domain. Every
//! pruning is appended to a trail together with its cause, and
//! backtracking pops the trail down to a frame mark; domains are never
//! copied.

use crate::constraints::hard::{
    COURSE_CLASH, GROUP_CLASH, PROFESSOR_CLASH, PROFESSOR_LOAD, ROOM_CLASH,
};
use crate::constraints::ConstraintGraph;
use crate::models::{Instance, SessionIdx};

/// Set of built-in rules that justified one pruning.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Reasons(u8);

impl Reasons {
    pub const ROOM: Self = Self(1);
    pub const PROFESSOR: Self = Self(1 << 1);
    pub const GROUP: Self = Self(1 << 2);
    pub const COURSE: Self = Self(1 << 3);
    pub const LOAD: Self = Self(1 << 4);

    const NAMES: [(Self, &'static str); 5] = [
        (Self::ROOM, ROOM_CLASH),
        (Self::PROFESSOR, PROFESSOR_CLASH),
        (Self::GROUP, GROUP_CLASH),
        (Self::COURSE, COURSE_CLASH),
        (Self::LOAD, PROFESSOR_LOAD),
    ];

    #[inline]
    pub fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn names(self) -> impl Iterator<Item = &'static str> {
        Self::NAMES
            .into_iter()
            .filter(move |(r, _)| self.0 & r.0 != 0)
            .map(|(_, name)| name)
    }
}

/// One removed value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Pruning {
    pub session: SessionIdx,
    pub value: u32,
    /// The assigned session whose placement removed the value.
    pub cause: SessionIdx,
    pub reasons: Reasons,
}

#[derive(Debug, Clone)]
pub(crate) struct DomainStore {
    alive: Vec<Vec<bool>>,
    live: Vec<usize>,
    trail: Vec<Pruning>,
}

impl DomainStore {
    pub fn new(instance: &Instance, graph: &ConstraintGraph) -> Self {
        let alive: Vec<Vec<bool>> = instance
            .session_indices()
            .map(|s| vec![true; graph.domain(instance.session_course(s)).len()])
            .collect();
        let live = alive.iter().map(Vec::len).collect();
        Self {
            alive,
            live,
            trail: Vec::new(),
        }
    }

    #[inline]
    pub fn is_alive(&self, session: SessionIdx, value: usize) -> bool {
        self.alive[session.get()][value]
    }

    #[inline]
    pub fn live_count(&self, session: SessionIdx) -> usize {
        self.live[session.get()]
    }

    /// Live value indices of a session, ascending.
    pub fn live_values(&self, session: SessionIdx) -> impl Iterator<Item = usize> + '_ {
        self.alive[session.get()]
            .iter()
            .enumerate()
            .filter(|(_, a)| **a)
            .map(|(v, _)| v)
    }

    /// Removes a value; already-removed values are left untouched.
    #[inline]
    pub fn prune(
        &mut self,
        session: SessionIdx,
        value: usize,
        cause: SessionIdx,
        reasons: Reasons,
    ) {
        let cell = &mut self.alive[session.get()][value];
        if *cell {
            *cell = false;
            self.live[session.get()] -= 1;
            self.trail.push(Pruning {
                session,
                value: value as u32,
                cause,
                reasons,
            });
        }
    }

    #[inline]
    pub fn mark(&self) -> usize {
        self.trail.len()
    }

    /// Restores every value removed since `mark`.
    pub fn undo_to(&mut self, mark: usize) {
        while self.trail.len() > mark {
            if let Some(p) = self.trail.pop() {
                self.alive[p.session.get()][p.value as usize] = true;
                self.live[p.session.get()] += 1;
            }
        }
    }

    /// Active prunings of one session, oldest first.
    pub fn prunings_of(&self, session: SessionIdx) -> impl Iterator<Item = &Pruning> + '_ {
        self.trail.iter().filter(move |p| p.session == session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils;

    #[test]
    fn test_reason_names() {
        let mut r = Reasons::default();
        assert!(r.is_empty());
        r.insert(Reasons::ROOM);
        r.insert(Reasons::LOAD);
        assert_eq!(r.names().collect::<Vec<_>>(), vec![ROOM_CLASH, PROFESSOR_LOAD]);
    }

    #[test]
    fn test_prune_and_undo() {
        let inst = test_utils::small_instance();
        let graph = test_utils::standard_engine().compile(&inst);
        let mut store = DomainStore::new(&inst, &graph);
        let s0 = SessionIdx::new(0);
        let s1 = SessionIdx::new(1);
        let full = store.live_count(s1);

        let mark = store.mark();
        store.prune(s1, 0, s0, Reasons::COURSE);
        store.prune(s1, 0, s0, Reasons::ROOM);
        store.prune(s1, 2, s0, Reasons::ROOM);
        assert_eq!(store.live_count(s1), full - 2);
        assert!(!store.is_alive(s1, 0));
        assert_eq!(store.prunings_of(s1).count(), 2);
        assert_eq!(store.live_values(s1).next(), Some(1));

        store.undo_to(mark);
        assert_eq!(store.live_count(s1), full);
        assert!(store.is_alive(s1, 0));
        assert_eq!(store.prunings_of(s1).count(), 0);
    }
}
