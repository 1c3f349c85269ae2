//! Solver configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::CourierError;
use crate::pathfinding::SearchParams;

/// Improvement loop run by one worker, with its strength parameter.
///
/// Strength is the largest window size a perturbation may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StrategyKind {
    /// Swap two random windows of exactly this size; keep improvements.
    Greedy(usize),
    /// Perturb with a window size shrinking as time runs out; keep
    /// improvements.
    TwoOpt(usize),
    /// Perturb like [`StrategyKind::TwoOpt`] and accept worse tours with a
    /// probability that falls with the temperature.
    Annealing(usize),
}

impl StrategyKind {
    /// Strength parameter of the strategy.
    pub fn strength(&self) -> usize {
        match *self {
            Self::Greedy(s) | Self::TwoOpt(s) | Self::Annealing(s) => s,
        }
    }
}

/// Worker mix used unless configured otherwise.
pub const DEFAULT_PORTFOLIO: [StrategyKind; 8] = [
    StrategyKind::TwoOpt(5),
    StrategyKind::TwoOpt(6),
    StrategyKind::Greedy(1),
    StrategyKind::Greedy(2),
    StrategyKind::Greedy(4),
    StrategyKind::Greedy(5),
    StrategyKind::Annealing(5),
    StrategyKind::Annealing(6),
];

/// Configuration for [`ParallelOptimizer`](super::ParallelOptimizer).
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use u_courier::optimizer::{SolverConfig, StrategyKind};
///
/// let config = SolverConfig::default()
///     .with_time_limit(Duration::from_secs(2))
///     .with_seed(7)
///     .with_portfolio(vec![StrategyKind::Greedy(1), StrategyKind::Annealing(5)]);
/// assert!(config.validate().is_ok());
/// assert!((config.search_budget().as_secs_f64() - 1.92).abs() < 1e-6);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Wall-clock limit for a whole solve.
    pub time_limit: Duration,
    /// Share of `time_limit` spent improving tours; the rest is left for
    /// route expansion.
    pub time_limit_ratio: f64,
    /// Workers for the proximity precomputation.
    pub num_threads: usize,
    /// Base seed; worker `i` uses `seed + i`.
    pub seed: u64,
    /// One improvement worker per entry.
    pub portfolio: Vec<StrategyKind>,
    /// Cost model of the path engine.
    pub search: SearchParams,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            time_limit: Duration::from_secs(30),
            time_limit_ratio: 0.96,
            num_threads: 8,
            seed: 0,
            portfolio: DEFAULT_PORTFOLIO.to_vec(),
            search: SearchParams::default(),
        }
    }
}

impl SolverConfig {
    /// Sets the wall-clock limit.
    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = limit;
        self
    }

    /// Sets the share of the limit spent improving tours.
    pub fn with_time_limit_ratio(mut self, ratio: f64) -> Self {
        self.time_limit_ratio = ratio;
        self
    }

    /// Sets the proximity worker count.
    pub fn with_num_threads(mut self, n: usize) -> Self {
        self.num_threads = n;
        self
    }

    /// Sets the base seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Replaces the worker mix.
    pub fn with_portfolio(mut self, portfolio: Vec<StrategyKind>) -> Self {
        self.portfolio = portfolio;
        self
    }

    /// Sets the path engine cost model.
    pub fn with_search_params(mut self, search: SearchParams) -> Self {
        self.search = search;
        self
    }

    /// Time the improvement workers may run, measured from the solve start.
    pub fn search_budget(&self) -> Duration {
        let ratio = if self.time_limit_ratio > 0.0 {
            self.time_limit_ratio.min(1.0)
        } else {
            0.0
        };
        self.time_limit.mul_f64(ratio)
    }

    /// Checks the configuration for values the solver cannot work with.
    ///
    /// # Errors
    ///
    /// [`CourierError::InvalidConfig`] naming the first offending field.
    pub fn validate(&self) -> Result<(), CourierError> {
        if self.num_threads == 0 {
            return Err(CourierError::InvalidConfig("num_threads must be at least 1"));
        }
        if !(self.time_limit_ratio > 0.0 && self.time_limit_ratio <= 1.0) {
            return Err(CourierError::InvalidConfig("time_limit_ratio must be in (0, 1]"));
        }
        if self.portfolio.is_empty() {
            return Err(CourierError::InvalidConfig("portfolio must not be empty"));
        }
        if !(self.search.turn_penalty.is_finite() && self.search.turn_penalty >= 0.0) {
            return Err(CourierError::InvalidConfig("turn_penalty must be finite and non-negative"));
        }
        if !(self.search.max_speed_kmh.is_finite() && self.search.max_speed_kmh > 0.0) {
            return Err(CourierError::InvalidConfig("max_speed_kmh must be positive"));
        }
        Ok(())
    }
}
