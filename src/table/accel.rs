//! Accelerated row evaluation
//!
//! Computes a whole feedback row as packed `u16` codes. Only short words are
//! supported; the cache falls back to the scalar path on any error.

use rayon::prelude::*;
use thiserror::Error;

use super::format::MAX_TABLE_LEN;
use crate::core::{Word, encode_code, fill_trits};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccelError {
    #[error("word length {len} exceeds evaluator limit {max}")]
    Unsupported { len: usize, max: usize },
    #[error("secret '{secret}' does not match guess length {len}")]
    LengthMismatch { secret: String, len: usize },
}

/// Computes the feedback codes of one guess against every word
pub trait RowEvaluator: Send + Sync {
    /// Longest supported word
    fn max_len(&self) -> usize;

    /// # Errors
    /// If the guess is too long or any secret differs in length.
    fn evaluate(&self, guess: &Word, secrets: &[Word]) -> Result<Vec<u16>, AccelError>;
}

/// Rayon-parallel evaluator over stack buffers
#[derive(Debug, Clone, Copy, Default)]
pub struct ParallelEvaluator;

impl RowEvaluator for ParallelEvaluator {
    fn max_len(&self) -> usize {
        MAX_TABLE_LEN
    }

    fn evaluate(&self, guess: &Word, secrets: &[Word]) -> Result<Vec<u16>, AccelError> {
        let len = guess.len();
        if len > self.max_len() {
            return Err(AccelError::Unsupported {
                len,
                max: self.max_len(),
            });
        }
        secrets
            .par_iter()
            .map(|secret| {
                if secret.len() != len {
                    return Err(AccelError::LengthMismatch {
                        secret: secret.text().to_string(),
                        len,
                    });
                }
                let mut trits = [0u8; MAX_TABLE_LEN];
                fill_trits(guess.bytes(), secret.bytes(), &mut trits[..len]);
                Ok(encode_code(&trits[..len]) as u16)
            })
            .collect()
    }
}
