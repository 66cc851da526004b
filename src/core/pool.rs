//! Candidate pool
//!
//! The subset of the vocabulary still consistent with every feedback observed
//! so far. Bits only ever go from alive to eliminated; when history changes
//! retroactively, build a new pool with [`CandidatePool::from_history`].

use super::bitset::BitSet;
use super::feedback::pattern_between;
use super::{Pattern, Vocabulary, Word, patterns_equal};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct CandidatePool {
    vocab: Arc<Vocabulary>,
    alive: BitSet,
}

impl CandidatePool {
    /// Pool with every vocabulary word alive
    #[must_use]
    pub fn new(vocab: Arc<Vocabulary>) -> Self {
        let alive = BitSet::full(vocab.len());
        Self { vocab, alive }
    }

    /// Fold a guess history into a fresh pool
    #[must_use]
    pub fn from_history(vocab: Arc<Vocabulary>, history: &[(Word, Pattern)]) -> Self {
        let mut pool = Self::new(vocab);
        for (guess, pattern) in history {
            pool.apply_feedback(guess, pattern);
        }
        pool
    }

    #[must_use]
    pub fn vocabulary(&self) -> &Arc<Vocabulary> {
        &self.vocab
    }

    /// Eliminate every alive word that would not have produced `pattern`
    ///
    /// Each alive word is re-scored against `guess` and both patterns are
    /// decoded before comparison. Words of a different length than the guess
    /// never match.
    pub fn apply_feedback(&mut self, guess: &Word, pattern: &Pattern) {
        let len = guess.len();
        let alive: Vec<usize> = self.alive.iter_ones().collect();

        for index in alive {
            let word = &self.vocab.words()[index];
            let keep = word.len() == len
                && patterns_equal(&pattern_between(guess, word), pattern, len);
            if !keep {
                self.alive.clear(index);
            }
        }
    }

    /// Keep only words alive in both pools
    ///
    /// # Panics
    /// Panics if the pools cover vocabularies of different sizes
    pub fn intersect(&mut self, other: &Self) {
        self.alive.and_assign(&other.alive);
    }

    /// Alive words in vocabulary order
    #[must_use]
    pub fn alive_words(&self) -> Vec<&Word> {
        self.alive
            .iter_ones()
            .map(|i| &self.vocab.words()[i])
            .collect()
    }

    /// Alive vocabulary indices, ascending
    #[must_use]
    pub fn alive_indices(&self) -> Vec<usize> {
        self.alive.iter_ones().collect()
    }

    #[must_use]
    pub fn alive_count(&self) -> usize {
        self.alive.count_ones()
    }

    /// # Panics
    /// Panics if `index` is outside the vocabulary
    #[must_use]
    pub fn is_alive(&self, index: usize) -> bool {
        self.alive.get(index)
    }
}
