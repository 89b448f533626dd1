//! Generic convergence loop shared by link-analysis algorithms.
//!
//! An algorithm supplies an initial ranking state and a transition
//! function; [`run_to_convergence`] applies the transition until the
//! inter-round error drops to the configured tolerance or the iteration
//! cap is reached. PageRank is the bundled algorithm; anything ranking
//! nodes by repeated application of a score update (HITS, SALSA) fits the
//! same contract.

use crate::common::{GraphError, NodeId};
use thiserror::Error;
use tracing::{debug, info};

/// Configuration errors, rejected before any iteration runs
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Damping factor outside (0, 1]
    #[error("damping factor {0} is outside (0, 1]")]
    DampingFactor(f64),

    /// Negative or non-finite tolerance
    #[error("tolerance {0} must be a non-negative finite number")]
    Tolerance(f64),

    /// Iteration cap set to zero
    #[error("max iterations must be positive when set")]
    MaxIterations,
}

/// Errors surfaced by a ranking run
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RankError {
    /// Invalid configuration
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// Graph inconsistency observed while iterating
    #[error("graph inconsistency: {0}")]
    Graph(#[from] GraphError),
}

pub type RankResult<T> = Result<T, RankError>;

/// Parameters shared by all convergence-driven ranking algorithms.
///
/// Construction validates every field, so a held `RankConfig` is always
/// usable; there is no mid-run configuration failure.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RankConfig {
    damping_factor: f64,
    max_iterations: Option<usize>,
    tolerance: f64,
}

impl Default for RankConfig {
    fn default() -> Self {
        Self {
            damping_factor: 0.85,
            max_iterations: Some(10),
            tolerance: 1e-8,
        }
    }
}

impl RankConfig {
    /// Create a validated configuration.
    pub fn new(
        damping_factor: f64,
        max_iterations: Option<usize>,
        tolerance: f64,
    ) -> Result<Self, ConfigError> {
        let config = Self {
            damping_factor,
            max_iterations,
            tolerance,
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !self.damping_factor.is_finite()
            || self.damping_factor <= 0.0
            || self.damping_factor > 1.0
        {
            return Err(ConfigError::DampingFactor(self.damping_factor));
        }
        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err(ConfigError::Tolerance(self.tolerance));
        }
        if self.max_iterations == Some(0) {
            return Err(ConfigError::MaxIterations);
        }
        Ok(())
    }

    /// Set the damping factor
    pub fn with_damping_factor(mut self, damping_factor: f64) -> Result<Self, ConfigError> {
        self.damping_factor = damping_factor;
        self.validate()?;
        Ok(self)
    }

    /// Set or clear the iteration cap. `None` means tolerance-only stopping.
    pub fn with_max_iterations(mut self, max_iterations: Option<usize>) -> Result<Self, ConfigError> {
        self.max_iterations = max_iterations;
        self.validate()?;
        Ok(self)
    }

    /// Set the convergence tolerance
    pub fn with_tolerance(mut self, tolerance: f64) -> Result<Self, ConfigError> {
        self.tolerance = tolerance;
        self.validate()?;
        Ok(self)
    }

    pub fn damping_factor(&self) -> f64 {
        self.damping_factor
    }

    pub fn max_iterations(&self) -> Option<usize> {
        self.max_iterations
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }
}

/// One round of a ranking computation.
///
/// A state is a snapshot: each round allocates a fresh score array and the
/// driver only ever holds the previous round, so older states can be
/// dropped freely.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RankState {
    /// Scores indexed by node id; zero for non-existent ids.
    pub scores: Vec<f64>,
    /// L1 distance to the previous round's scores.
    pub error: f64,
    /// Round counter, 0 for the initial state.
    pub iteration: usize,
}

impl RankState {
    pub fn new(scores: Vec<f64>, error: f64, iteration: usize) -> Self {
        Self {
            scores,
            error,
            iteration,
        }
    }

    /// Score of a node, 0.0 for ids outside the score array.
    pub fn score(&self, node: NodeId) -> f64 {
        self.scores.get(node as usize).copied().unwrap_or(0.0)
    }

    /// The `n` highest-scoring ids, descending.
    pub fn top_n(&self, n: usize) -> Vec<(NodeId, f64)> {
        let mut indexed: Vec<_> = self
            .scores
            .iter()
            .enumerate()
            .map(|(id, &score)| (id as NodeId, score))
            .collect();
        indexed.sort_by(|a, b| b.1.total_cmp(&a.1));
        indexed.truncate(n);
        indexed
    }
}

/// Contract between the convergence driver and a concrete algorithm.
pub trait RankingAlgorithm {
    /// The parameters the driver stops on.
    fn config(&self) -> &RankConfig;

    /// Round-zero state. Its error carries a sentinel above any tolerance,
    /// so the driver always performs at least one real round.
    fn initial_state(&self) -> RankState;

    /// Produce the next round from the previous one. Must increment
    /// `iteration` by exactly one and never mutate `prev`.
    fn transition(&self, prev: &RankState) -> RankResult<RankState>;
}

/// Drive an algorithm to a fixed point.
///
/// Returns the last computed state both on convergence and on cap
/// exhaustion; callers needing to distinguish the two compare
/// `state.iteration` against the configured cap. A transition failure
/// aborts the run; there are no retries.
pub fn run_to_convergence<A: RankingAlgorithm>(algo: &A) -> RankResult<RankState> {
    let config = algo.config();
    let mut current = algo.initial_state();

    loop {
        if let Some(cap) = config.max_iterations() {
            if current.iteration >= cap {
                info!(
                    "iteration cap {} reached with error {:e}",
                    cap, current.error
                );
                return Ok(current);
            }
        }

        let next = algo.transition(&current)?;
        debug!("round {} error {:e}", next.iteration, next.error);

        if next.error <= config.tolerance() {
            info!(
                "converged after {} iterations (error {:e})",
                next.iteration, next.error
            );
            return Ok(next);
        }
        current = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Toy algorithm: score decays toward zero, error halves every round.
    struct Halving {
        config: RankConfig,
    }

    impl RankingAlgorithm for Halving {
        fn config(&self) -> &RankConfig {
            &self.config
        }

        fn initial_state(&self) -> RankState {
            RankState::new(vec![1.0], 100.0 + self.config.tolerance(), 0)
        }

        fn transition(&self, prev: &RankState) -> RankResult<RankState> {
            let scores = vec![prev.scores[0] / 2.0];
            let error = (prev.scores[0] - scores[0]).abs();
            Ok(RankState::new(scores, error, prev.iteration + 1))
        }
    }

    #[test]
    fn test_driver_stops_on_tolerance() {
        let algo = Halving {
            config: RankConfig::new(0.85, None, 1e-3).unwrap(),
        };
        let state = run_to_convergence(&algo).unwrap();
        assert!(state.error <= 1e-3);
        // error after k rounds is 2^-k, first <= 1e-3 at k = 10
        assert_eq!(state.iteration, 10);
    }

    #[test]
    fn test_driver_stops_on_iteration_cap() {
        let algo = Halving {
            config: RankConfig::new(0.85, Some(3), 0.0).unwrap(),
        };
        let state = run_to_convergence(&algo).unwrap();
        assert_eq!(state.iteration, 3);
        assert!(state.error > 0.0);
    }

    #[test]
    fn test_driver_runs_at_least_one_round() {
        // Huge tolerance: still one transition, because only the error of a
        // computed round is compared against it.
        let algo = Halving {
            config: RankConfig::new(0.85, Some(10), 1e6).unwrap(),
        };
        let state = run_to_convergence(&algo).unwrap();
        assert_eq!(state.iteration, 1);
    }

    #[test]
    fn test_config_defaults() {
        let config = RankConfig::default();
        assert_eq!(config.damping_factor(), 0.85);
        assert_eq!(config.max_iterations(), Some(10));
        assert_eq!(config.tolerance(), 1e-8);
    }

    #[test]
    fn test_config_rejects_bad_damping() {
        assert!(matches!(
            RankConfig::new(0.0, None, 1e-8),
            Err(ConfigError::DampingFactor(_))
        ));
        assert!(matches!(
            RankConfig::new(1.5, None, 1e-8),
            Err(ConfigError::DampingFactor(_))
        ));
        assert!(matches!(
            RankConfig::new(f64::NAN, None, 1e-8),
            Err(ConfigError::DampingFactor(_))
        ));
        // 1.0 is inclusive
        assert!(RankConfig::new(1.0, None, 1e-8).is_ok());
    }

    #[test]
    fn test_config_rejects_negative_tolerance() {
        assert!(matches!(
            RankConfig::new(0.85, None, -1e-8),
            Err(ConfigError::Tolerance(_))
        ));
        // zero tolerance is allowed
        assert!(RankConfig::new(0.85, Some(5), 0.0).is_ok());
    }

    #[test]
    fn test_config_rejects_zero_cap() {
        assert!(matches!(
            RankConfig::new(0.85, Some(0), 1e-8),
            Err(ConfigError::MaxIterations)
        ));
    }

    #[test]
    fn test_config_builder_setters() {
        let config = RankConfig::default()
            .with_damping_factor(0.5)
            .unwrap()
            .with_max_iterations(None)
            .unwrap()
            .with_tolerance(1e-6)
            .unwrap();
        assert_eq!(config.damping_factor(), 0.5);
        assert_eq!(config.max_iterations(), None);
        assert_eq!(config.tolerance(), 1e-6);

        assert!(RankConfig::default().with_damping_factor(2.0).is_err());
    }

    #[test]
    fn test_state_accessors() {
        let state = RankState::new(vec![0.1, 0.7, 0.2], 0.0, 4);
        assert_eq!(state.score(1), 0.7);
        assert_eq!(state.score(99), 0.0);

        let top = state.top_n(2);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0], (1, 0.7));
        assert_eq!(top[1], (2, 0.2));
    }
}
