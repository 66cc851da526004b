//! Scoring configuration and results

use super::policy::Policy;

/// Tuning knobs for one scoring call
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreOptions {
    /// Number of suggestions returned
    pub top_k: usize,
    /// Temperature applied to the priors; `None` or `<= 0` disables it
    pub tau: Option<f64>,
    /// Pools larger than this are scored against a sample of secrets
    pub sample_cutoff: usize,
    /// Number of secrets sampled when sampling applies
    ///
    /// Sampled EIG stays within about 0.1 bits of the exact value only when
    /// the sample covers roughly 70% of the pool or more. With skewed priors
    /// a 50% sample can be off by 0.2 bits, a 25% sample by 0.5.
    pub sample_size: usize,
    /// Pools larger than this only score prefiltered guesses
    pub prefilter_limit: usize,
    /// Guesses scored between progress reports and cancellation checks
    pub chunk_size: usize,
    /// Abandon guesses that provably cannot beat the best score so far
    pub early_cut: bool,
    /// Safety margin for early cut
    pub epsilon: f64,
    /// Seed for secret sampling
    pub seed: u64,
    pub policy: Policy,
}

impl Default for ScoreOptions {
    fn default() -> Self {
        Self {
            top_k: 10,
            tau: None,
            sample_cutoff: 2500,
            sample_size: 1200,
            prefilter_limit: 2000,
            chunk_size: 64,
            early_cut: false,
            epsilon: 1e-9,
            seed: 0x5eed,
            policy: Policy::Blend,
        }
    }
}

/// A ranked guess
#[derive(Debug, Clone, PartialEq)]
pub struct Suggestion {
    pub guess: String,
    /// Position of the guess in the scored word list
    pub index: usize,
    /// Expected information gain in bits
    pub eig: f64,
    /// Probability that the guess is the secret
    pub solve_prob: f64,
    /// Weight of `eig` in `score`
    pub alpha: f64,
    /// Expected number of candidates left after the guess
    pub expected_remaining: f64,
    pub score: f64,
}
