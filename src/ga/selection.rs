//! Parent selection.

use rand::Rng;
use std::cmp::Ordering;

use super::chromosome::Individual;

/// Tournament selection: draws `size` contestants uniformly (with
/// replacement) and returns the index of the best by
/// [`Individual::rank_cmp`].
///
/// # Panics
/// If `population` is empty.
pub fn tournament<R: Rng>(population: &[Individual], size: usize, rng: &mut R) -> usize {
    let mut best = rng.random_range(0..population.len());
    for _ in 1..size.max(1) {
        let challenger = rng.random_range(0..population.len());
        if population[challenger].rank_cmp(&population[best]) == Ordering::Less {
            best = challenger;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Placement, Schedule, SessionIdx};
    use crate::test_utils;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn population() -> Vec<Individual> {
        let inst = test_utils::small_instance();
        let engine = test_utils::standard_engine();
        let p1 = inst.professor_index("P1").unwrap();
        let r1 = inst.room_index("R1").unwrap();
        ["tue-11", "mon-9", "mon-10"]
            .iter()
            .map(|slot| {
                let mut s = Schedule::new(&inst);
                s.assign(
                    &inst,
                    SessionIdx::new(0),
                    Placement::new(p1, r1, inst.slot_index(slot).unwrap()),
                );
                Individual::evaluate(&inst, &engine, s)
            })
            .collect()
    }

    #[test]
    fn test_large_tournament_finds_best() {
        let pop = population();
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        // mon-9 is P1's first preference.
        for _ in 0..10 {
            assert_eq!(tournament(&pop, 64, &mut rng), 1);
        }
    }

    #[test]
    fn test_single_contestant_is_uniform_pick() {
        let pop = population();
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let mut seen = [false; 3];
        for _ in 0..100 {
            seen[tournament(&pop, 1, &mut rng)] = true;
        }
        assert!(seen.iter().all(|&s| s));
    }
}
