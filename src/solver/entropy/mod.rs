//! Entropy calculation for weighted pattern distributions
//!
//! The arithmetic behind expected information gain: prior normalization,
//! temperature, Shannon entropy and per-pattern buckets.

mod calculator;

pub use calculator::{
    Bucket, BucketMap, apply_temperature, expected_remaining, group_by_pattern, information_gain,
    normalize, normalize_priors, partial_pattern_entropy, shannon_entropy,
};
