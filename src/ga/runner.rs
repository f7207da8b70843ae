//! Generational loop.

use std::time::{Duration, Instant};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info, trace};

use super::chromosome::Individual;
use super::operators::{self, OperatorContext, RepairCounts};
use super::selection::tournament;
use crate::config::GaConfig;
use crate::constraints::{ConstraintEngine, ConstraintGraph};
use crate::models::{Instance, Schedule};

/// Source of extra feasible schedules for the initial population, called
/// with a derived seed when perturbing a seed yields nothing new.
pub trait SeedSource: Sync {
    fn generate(&self, seed: u64) -> Option<Schedule>;
}

impl<F> SeedSource for F
where
    F: Fn(u64) -> Option<Schedule> + Sync,
{
    fn generate(&self, seed: u64) -> Option<Schedule> {
        self(seed)
    }
}

/// Why the optimizer stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminationReason {
    GenerationLimit,
    Stalled,
    TargetReached,
    Deadline,
}

/// Optimizer counters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GaStats {
    pub generations: usize,
    pub evaluations: u64,
    /// Initial individuals that came from the seed source.
    pub refills: u64,
    pub repairs: u64,
    pub repair_fallbacks: u64,
    pub mutations: u64,
    /// Best score of the population, per generation (index 0 = initial).
    pub best_history: Vec<f64>,
    pub termination: TerminationReason,
    pub elapsed: Duration,
}

/// Best schedule found plus statistics.
#[derive(Debug, Clone)]
pub struct GaResult {
    pub best: Schedule,
    pub best_score: f64,
    pub stats: GaStats,
}

/// Counters of one bred child.
#[derive(Debug, Clone, Copy, Default)]
struct BreedCounts {
    repair: RepairCounts,
    mutated: bool,
}

/// Feasibility-preserving genetic optimizer.
///
/// Every individual is a complete hard-feasible schedule; operators never
/// leave the feasible region. Randomness is derived from `seed`: each
/// population slot of each generation owns a ChaCha8 stream, so results
/// do not depend on how rayon schedules the work.
///
/// # Algorithm
/// 1. Clone the seeds, perturb the clones by feasible (slot, room) swaps,
///    and refill from the seed source where no swap succeeds.
/// 2. Per generation: keep `elite_count` best individuals, breed the rest
///    by tournament selection, crossover and mutation.
/// 3. Stop at the generation limit, after `stall_generations` without
///    improvement, at the target score, or at the deadline.
///
/// # Reference
/// - Goldberg (1989), *Genetic Algorithms in Search, Optimization, and
///   Machine Learning*
/// - Burke, Newall & Weare (1996), "A memetic algorithm for university
///   exam timetabling"
pub struct GaRunner<'a> {
    ctx: OperatorContext<'a>,
    config: GaConfig,
    seed: u64,
    deadline: Option<Instant>,
    refill: Option<&'a dyn SeedSource>,
}

impl<'a> GaRunner<'a> {
    pub fn new(
        instance: &'a Instance,
        engine: &'a ConstraintEngine,
        graph: &'a ConstraintGraph,
        config: GaConfig,
    ) -> Self {
        Self {
            ctx: OperatorContext::new(instance, engine, graph),
            config,
            seed: 0,
            deadline: None,
            refill: None,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_deadline(mut self, deadline: Option<Instant>) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn with_refill(mut self, source: &'a dyn SeedSource) -> Self {
        self.refill = Some(source);
        self
    }

    /// Generator of one population slot in one generation.
    fn stream(&self, generation: usize, slot: usize) -> ChaCha8Rng {
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        let width = self.config.population_size.max(1) as u64;
        rng.set_stream(generation as u64 * width + slot as u64);
        rng
    }

    fn evaluate(&self, schedule: Schedule) -> Individual {
        Individual::evaluate(self.ctx.instance, self.ctx.engine, schedule)
    }

    /// Optimizes from hard-feasible seed schedules.
    ///
    /// Returns `None` if `seeds` is empty.
    pub fn run(&self, seeds: &[Schedule]) -> Option<GaResult> {
        if seeds.is_empty() {
            return None;
        }
        let start = Instant::now();
        let pop_size = self.config.population_size.max(1);
        let elites = self.config.elite_count.clamp(1, pop_size);
        info!(
            event = "ga_started",
            population = pop_size,
            elites,
            max_generations = self.config.max_generations,
            seeds = seeds.len(),
            parallel = self.config.parallel
        );

        let init = |i: usize| self.initial(seeds, i);
        let initial: Vec<(Individual, bool)> = if self.config.parallel {
            (0..pop_size).into_par_iter().map(init).collect()
        } else {
            (0..pop_size).map(init).collect()
        };
        let refills = initial.iter().filter(|(_, r)| *r).count() as u64;
        let mut population: Vec<Individual> = initial.into_iter().map(|(ind, _)| ind).collect();
        population.sort_by(|a, b| a.rank_cmp(b));

        let mut best = population[0].clone();
        let mut evaluations = pop_size as u64;
        let mut history = vec![best.score()];
        let mut repair = RepairCounts::default();
        let mut mutations = 0u64;
        let mut stall = 0usize;
        let mut generation = 0usize;

        let termination = loop {
            if self.config.target_score.is_some_and(|t| best.score() <= t) {
                break TerminationReason::TargetReached;
            }
            if self.deadline.is_some_and(|d| Instant::now() >= d) {
                break TerminationReason::Deadline;
            }
            if generation >= self.config.max_generations {
                break TerminationReason::GenerationLimit;
            }
            if self.config.stall_generations > 0 && stall >= self.config.stall_generations {
                break TerminationReason::Stalled;
            }
            generation += 1;

            let breed = |i: usize| self.breed(&population, generation, i);
            let offspring: Vec<(Individual, BreedCounts)> = if self.config.parallel {
                (elites..pop_size).into_par_iter().map(breed).collect()
            } else {
                (elites..pop_size).map(breed).collect()
            };
            evaluations += offspring.len() as u64;

            let mut next: Vec<Individual> = population[..elites].to_vec();
            for (child, counts) in offspring {
                repair.merge(counts.repair);
                mutations += counts.mutated as u64;
                next.push(child);
            }
            next.sort_by(|a, b| a.rank_cmp(b));
            population = next;

            let leader = &population[0];
            if leader.score() < best.score() {
                debug!(
                    event = "ga_improvement",
                    generation,
                    score = leader.score(),
                    previous = best.score()
                );
                stall = 0;
            } else {
                stall += 1;
            }
            if leader.rank_cmp(&best).is_lt() {
                best = leader.clone();
            }
            history.push(leader.score());
            trace!(
                event = "ga_generation",
                generation,
                best = leader.score(),
                worst = population[population.len() - 1].score(),
                stall
            );
        };

        let stats = GaStats {
            generations: generation,
            evaluations,
            refills,
            repairs: repair.repaired,
            repair_fallbacks: repair.fallbacks,
            mutations,
            best_history: history,
            termination,
            elapsed: start.elapsed(),
        };
        info!(
            event = "ga_finished",
            termination = ?stats.termination,
            generations = stats.generations,
            best_score = best.score(),
            evaluations = stats.evaluations,
            elapsed_ms = stats.elapsed.as_millis() as u64
        );

        Some(GaResult {
            best_score: best.score(),
            best: best.into_schedule(),
            stats,
        })
    }

    /// Builds initial slot `i`. The flag is set when the seed source
    /// supplied the individual.
    fn initial(&self, seeds: &[Schedule], i: usize) -> (Individual, bool) {
        if let Some(seed) = seeds.get(i) {
            return (self.evaluate(seed.clone()), false);
        }
        let mut rng = self.stream(0, i);
        let mut schedule = seeds[i % seeds.len()].clone();
        let kept = operators::perturb(
            &self.ctx,
            &mut schedule,
            self.config.perturbation_swaps,
            &mut rng,
        );
        if kept == 0 {
            let fresh = self
                .refill
                .and_then(|source| source.generate(rng.random::<u64>()))
                .filter(|s| self.ctx.engine.is_complete_and_feasible(self.ctx.instance, s));
            if let Some(fresh) = fresh {
                return (self.evaluate(fresh), true);
            }
        }
        (self.evaluate(schedule), false)
    }

    fn breed(
        &self,
        population: &[Individual],
        generation: usize,
        i: usize,
    ) -> (Individual, BreedCounts) {
        let mut rng = self.stream(generation, i);
        let mut counts = BreedCounts::default();
        let size = self.config.tournament_size;

        let first = &population[tournament(population, size, &mut rng)];
        let mut child = if rng.random_bool(self.config.crossover_rate) {
            let second = &population[tournament(population, size, &mut rng)];
            let (child, repair) = operators::crossover(
                &self.ctx,
                first.schedule(),
                second.schedule(),
                self.config.crossover_bias,
                &mut rng,
            );
            counts.repair = repair;
            child
        } else {
            first.schedule().clone()
        };
        if rng.random_bool(self.config.mutation_rate) {
            counts.mutated = operators::mutate(&self.ctx, &mut child, &mut rng);
        }
        (self.evaluate(child), counts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cp::CspSolver;
    use crate::test_utils;

    struct Fixture {
        instance: Instance,
        engine: ConstraintEngine,
        graph: ConstraintGraph,
    }

    impl Fixture {
        fn grid(courses: usize) -> Self {
            let instance = Instance::compile(&test_utils::grid_problem(courses)).unwrap();
            let engine = test_utils::standard_engine();
            let graph = engine.compile(&instance);
            Self {
                instance,
                engine,
                graph,
            }
        }

        fn seed(&self) -> Schedule {
            CspSolver::new(&self.instance, &self.engine, &self.graph)
                .solve()
                .outcome
                .into_schedule()
                .unwrap()
        }

        fn runner(&self, config: GaConfig) -> GaRunner<'_> {
            GaRunner::new(&self.instance, &self.engine, &self.graph, config)
        }
    }

    fn small_config() -> GaConfig {
        GaConfig::default()
            .with_population_size(12)
            .with_max_generations(15)
            .with_stall_generations(0)
            .with_elite_count(2)
    }

    #[test]
    fn test_result_is_feasible_and_no_worse_than_seed() {
        let f = Fixture::grid(8);
        let seed = f.seed();
        let seed_score = f.engine.score(&f.instance, &seed);
        let result = f.runner(small_config()).with_seed(7).run(&[seed]).unwrap();

        assert!(f.engine.is_complete_and_feasible(&f.instance, &result.best));
        assert!(result.best_score <= seed_score + 1e-10);
        assert!((f.engine.score(&f.instance, &result.best) - result.best_score).abs() < 1e-10);
        assert_eq!(result.stats.termination, TerminationReason::GenerationLimit);
        assert_eq!(result.stats.generations, 15);
        assert_eq!(result.stats.best_history.len(), 16);
    }

    #[test]
    fn test_best_history_never_worsens() {
        let f = Fixture::grid(8);
        let result = f.runner(small_config()).with_seed(3).run(&[f.seed()]).unwrap();
        for pair in result.stats.best_history.windows(2) {
            assert!(pair[1] <= pair[0] + 1e-10, "{:?}", result.stats.best_history);
        }
    }

    #[test]
    fn test_seeded_runs_are_identical() {
        let f = Fixture::grid(8);
        let seed = f.seed();
        let a = f.runner(small_config()).with_seed(42).run(&[seed.clone()]).unwrap();
        let b = f.runner(small_config()).with_seed(42).run(&[seed]).unwrap();
        assert_eq!(a.best, b.best);
        assert_eq!(a.stats.best_history, b.stats.best_history);
    }

    #[test]
    fn test_parallel_and_serial_agree() {
        let f = Fixture::grid(6);
        let seed = f.seed();
        let par = f.runner(small_config()).with_seed(5).run(&[seed.clone()]).unwrap();
        let ser = f
            .runner(small_config().with_parallel(false))
            .with_seed(5)
            .run(&[seed])
            .unwrap();
        assert_eq!(par.best, ser.best);
        assert_eq!(par.stats.best_history, ser.stats.best_history);
    }

    #[test]
    fn test_target_score_stops_immediately() {
        let f = Fixture::grid(4);
        let config = small_config().with_target_score(Some(f64::MAX));
        let result = f.runner(config).run(&[f.seed()]).unwrap();
        assert_eq!(result.stats.termination, TerminationReason::TargetReached);
        assert_eq!(result.stats.generations, 0);
    }

    #[test]
    fn test_stall_limit() {
        let f = Fixture::grid(4);
        let config = small_config()
            .with_max_generations(1_000)
            .with_stall_generations(3)
            .with_mutation_rate(0.0)
            .with_crossover_rate(0.0);
        // Without variation no generation can improve.
        let result = f.runner(config).run(&[f.seed()]).unwrap();
        assert_eq!(result.stats.termination, TerminationReason::Stalled);
        assert_eq!(result.stats.generations, 3);
    }

    #[test]
    fn test_deadline() {
        let f = Fixture::grid(4);
        let result = f
            .runner(small_config())
            .with_deadline(Some(Instant::now()))
            .run(&[f.seed()])
            .unwrap();
        assert_eq!(result.stats.termination, TerminationReason::Deadline);
    }

    #[test]
    fn test_refill_used_when_perturbation_fails() {
        let f = Fixture::grid(4);
        let calls = std::sync::atomic::AtomicUsize::new(0);
        let source = |seed: u64| {
            calls.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
            CspSolver::new(&f.instance, &f.engine, &f.graph)
                .with_tie_break_seed(seed)
                .solve()
                .outcome
                .into_schedule()
        };
        let config = small_config()
            .with_perturbation_swaps(0)
            .with_max_generations(0);
        let result = f.runner(config).with_refill(&source).run(&[f.seed()]).unwrap();
        assert_eq!(result.stats.refills, 11);
        assert_eq!(calls.load(std::sync::atomic::Ordering::Relaxed), 11);
        assert!(f.engine.is_complete_and_feasible(&f.instance, &result.best));
    }

    #[test]
    fn test_no_seeds() {
        let f = Fixture::grid(2);
        assert!(f.runner(small_config()).run(&[]).is_none());
    }
}
