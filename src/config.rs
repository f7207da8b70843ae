//! Engine configuration.
//!
//! All sections deserialize with serde and fall back to defaults for
//! missing fields, so a collaborator can load them from any format. Every
//! section also has `with_*` builders for programmatic use.
//!
//! # Example
//! ```
//! use u_timetable::config::{SchedulerConfig, Strategy};
//!
//! let config = SchedulerConfig::default()
//!     .with_strategy(Strategy::CspThenGa)
//!     .with_seed(7)
//!     .with_soft_weight("group_compactness", 2.0);
//! assert!(config.validate().is_ok());
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

use crate::error::{Result, TimetableError};

/// Which engines run, selected explicitly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Feasibility search only; the first feasible schedule is returned.
    CspOnly,
    /// Optimize a supplied seed schedule without running the CSP solver.
    GaOnly,
    /// Feasibility search, then optimization seeded with its result.
    #[default]
    CspThenGa,
}

/// Soft-constraint weights keyed by constraint name.
///
/// Names without an entry use the constraint's default weight.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SoftWeights {
    weights: BTreeMap<String, f64>,
}

impl SoftWeights {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the weight of a constraint.
    pub fn with(mut self, name: impl Into<String>, weight: f64) -> Self {
        self.weights.insert(name.into(), weight);
        self
    }

    /// Configured weight, or `default` if none.
    pub fn weight_for(&self, name: &str, default: f64) -> f64 {
        self.weights.get(name).copied().unwrap_or(default)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.weights.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

/// Feasibility search budget and retry policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CspConfig {
    /// Maximum search nodes per attempt. `None` = unlimited.
    pub max_nodes: Option<u64>,
    /// Wall-clock limit per attempt (ms). `None` = unlimited.
    pub time_limit_ms: Option<u64>,
    /// Extra attempts after a budget-exhausted attempt.
    pub max_retries: u32,
    /// Budget multiplier applied on each retry (>= 1).
    pub budget_growth: f64,
}

impl Default for CspConfig {
    fn default() -> Self {
        Self {
            max_nodes: Some(200_000),
            time_limit_ms: None,
            max_retries: 2,
            budget_growth: 4.0,
        }
    }
}

impl CspConfig {
    pub fn with_max_nodes(mut self, max_nodes: Option<u64>) -> Self {
        self.max_nodes = max_nodes;
        self
    }

    pub fn with_time_limit(mut self, limit: Option<Duration>) -> Self {
        self.time_limit_ms = limit.map(|d| d.as_millis() as u64);
        self
    }

    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    pub fn with_budget_growth(mut self, growth: f64) -> Self {
        self.budget_growth = growth;
        self
    }

    pub fn time_limit(&self) -> Option<Duration> {
        self.time_limit_ms.map(Duration::from_millis)
    }

    /// Budget for the given attempt (0-based), grown geometrically.
    pub fn scaled(&self, attempt: u32) -> Self {
        let factor = self.budget_growth.powi(attempt as i32);
        Self {
            max_nodes: self.max_nodes.map(|n| (n as f64 * factor).ceil() as u64),
            time_limit_ms: self.time_limit_ms.map(|t| (t as f64 * factor).ceil() as u64),
            ..self.clone()
        }
    }
}

/// Population optimizer parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GaConfig {
    /// Individuals per generation.
    pub population_size: usize,
    /// Generation budget.
    pub max_generations: usize,
    /// Stop after this many generations without improvement.
    pub stall_generations: usize,
    /// Stop once the best score is at or below this value.
    pub target_score: Option<f64>,
    /// Contestants per tournament.
    pub tournament_size: usize,
    /// Probability that a child is bred by crossover (else cloned).
    pub crossover_rate: f64,
    /// Per-session probability of inheriting from the second parent.
    pub crossover_bias: f64,
    /// Probability of mutating a child.
    pub mutation_rate: f64,
    /// Best individuals copied unchanged into the next generation (>= 1).
    pub elite_count: usize,
    /// Swap attempts per perturbed initial individual.
    pub perturbation_swaps: usize,
    /// Breed and evaluate offspring on the rayon pool.
    pub parallel: bool,
}

impl Default for GaConfig {
    fn default() -> Self {
        Self {
            population_size: 40,
            max_generations: 200,
            stall_generations: 40,
            target_score: None,
            tournament_size: 3,
            crossover_rate: 0.8,
            crossover_bias: 0.5,
            mutation_rate: 0.3,
            elite_count: 2,
            perturbation_swaps: 8,
            parallel: true,
        }
    }
}

impl GaConfig {
    pub fn with_population_size(mut self, size: usize) -> Self {
        self.population_size = size;
        self
    }

    pub fn with_max_generations(mut self, generations: usize) -> Self {
        self.max_generations = generations;
        self
    }

    pub fn with_stall_generations(mut self, generations: usize) -> Self {
        self.stall_generations = generations;
        self
    }

    pub fn with_target_score(mut self, target: Option<f64>) -> Self {
        self.target_score = target;
        self
    }

    pub fn with_tournament_size(mut self, size: usize) -> Self {
        self.tournament_size = size;
        self
    }

    pub fn with_crossover_rate(mut self, rate: f64) -> Self {
        self.crossover_rate = rate;
        self
    }

    pub fn with_crossover_bias(mut self, bias: f64) -> Self {
        self.crossover_bias = bias;
        self
    }

    pub fn with_mutation_rate(mut self, rate: f64) -> Self {
        self.mutation_rate = rate;
        self
    }

    pub fn with_elite_count(mut self, count: usize) -> Self {
        self.elite_count = count;
        self
    }

    pub fn with_perturbation_swaps(mut self, swaps: usize) -> Self {
        self.perturbation_swaps = swaps;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}

/// Top-level configuration for one solve.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    pub strategy: Strategy,
    pub weights: SoftWeights,
    pub csp: CspConfig,
    pub ga: GaConfig,
    /// Seed for every random decision of the run.
    pub seed: u64,
    /// Overall wall-clock limit (ms). `None` = unlimited.
    pub time_limit_ms: Option<u64>,
}

impl SchedulerConfig {
    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_weights(mut self, weights: SoftWeights) -> Self {
        self.weights = weights;
        self
    }

    pub fn with_soft_weight(mut self, name: impl Into<String>, weight: f64) -> Self {
        self.weights = self.weights.with(name, weight);
        self
    }

    pub fn with_csp(mut self, csp: CspConfig) -> Self {
        self.csp = csp;
        self
    }

    pub fn with_ga(mut self, ga: GaConfig) -> Self {
        self.ga = ga;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_time_limit(mut self, limit: Option<Duration>) -> Self {
        self.time_limit_ms = limit.map(|d| d.as_millis() as u64);
        self
    }

    pub fn time_limit(&self) -> Option<Duration> {
        self.time_limit_ms.map(Duration::from_millis)
    }

    /// Checks every value range.
    ///
    /// # Errors
    /// [`TimetableError::InvalidConfig`] naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        let ga = &self.ga;
        let invalid = |msg: String| Err(TimetableError::InvalidConfig(msg));

        if ga.population_size == 0 {
            return invalid("ga.population_size must be positive".into());
        }
        if ga.tournament_size == 0 {
            return invalid("ga.tournament_size must be positive".into());
        }
        if ga.elite_count == 0 || ga.elite_count >= ga.population_size {
            return invalid(format!(
                "ga.elite_count must be in 1..{} (got {})",
                ga.population_size, ga.elite_count
            ));
        }
        for (name, rate) in [
            ("ga.crossover_rate", ga.crossover_rate),
            ("ga.crossover_bias", ga.crossover_bias),
            ("ga.mutation_rate", ga.mutation_rate),
        ] {
            if !(0.0..=1.0).contains(&rate) {
                return invalid(format!("{name} must be within [0, 1] (got {rate})"));
            }
        }
        if !(self.csp.budget_growth >= 1.0) {
            return invalid(format!(
                "csp.budget_growth must be >= 1 (got {})",
                self.csp.budget_growth
            ));
        }
        for (name, weight) in self.weights.iter() {
            if !(weight >= 0.0) || !weight.is_finite() {
                return invalid(format!("weight for '{name}' must be finite and >= 0"));
            }
        }
        Ok(())
    }
}
