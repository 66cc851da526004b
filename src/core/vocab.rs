//! Vocabulary and prior mass
//!
//! A vocabulary is the ordered word list every other component indexes into.
//! Its content hash binds precomputed pattern tables to one exact word list.

use super::Word;
use rustc_hash::FxHashMap;
use thiserror::Error;

/// Error building a vocabulary
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VocabularyError {
    #[error("vocabulary is empty")]
    Empty,
    #[error("word {word:?} has {found} letters, expected {expected}")]
    MixedLengths {
        word: String,
        expected: usize,
        found: usize,
    },
}

/// Ordered, fixed-length word list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vocabulary {
    words: Vec<Word>,
    word_len: usize,
    index: FxHashMap<String, usize>,
}

impl Vocabulary {
    /// Create a vocabulary, keeping the given order
    ///
    /// Duplicate words keep their first index for lookups.
    ///
    /// # Errors
    /// Returns `VocabularyError` if the list is empty or lengths differ.
    pub fn new(words: Vec<Word>) -> Result<Self, VocabularyError> {
        let word_len = words.first().ok_or(VocabularyError::Empty)?.len();

        if let Some(bad) = words.iter().find(|w| w.len() != word_len) {
            return Err(VocabularyError::MixedLengths {
                word: bad.text().to_string(),
                expected: word_len,
                found: bad.len(),
            });
        }

        let mut index = FxHashMap::default();
        for (i, word) in words.iter().enumerate() {
            index.entry(word.text().to_string()).or_insert(i);
        }

        Ok(Self {
            words,
            word_len,
            index,
        })
    }

    /// Convenience constructor from string slices, skipping invalid entries
    ///
    /// # Errors
    /// Same as [`Vocabulary::new`].
    pub fn from_strs(words: &[&str]) -> Result<Self, VocabularyError> {
        Self::new(words.iter().filter_map(|&w| Word::new(w).ok()).collect())
    }

    #[inline]
    #[must_use]
    pub fn words(&self) -> &[Word] {
        &self.words
    }

    #[inline]
    #[must_use]
    pub fn word_len(&self) -> usize {
        self.word_len
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.words.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Word> {
        self.words.get(index)
    }

    /// Index of a word, if present
    #[must_use]
    pub fn index_of(&self, word: &str) -> Option<usize> {
        self.index.get(word).copied()
    }

    /// Words joined by `'\n'`
    #[must_use]
    pub fn canonical_join(&self) -> String {
        let mut joined = String::with_capacity(self.words.len() * (self.word_len + 1));
        for (i, word) in self.words.iter().enumerate() {
            if i > 0 {
                joined.push('\n');
            }
            joined.push_str(word.text());
        }
        joined
    }

    /// FNV-1a 32 of the canonical join
    #[must_use]
    pub fn hash32(&self) -> u32 {
        fnv1a32(self.canonical_join().as_bytes())
    }
}

/// 32-bit FNV-1a
#[must_use]
pub fn fnv1a32(bytes: &[u8]) -> u32 {
    const OFFSET: u32 = 0x811c_9dc5;
    const PRIME: u32 = 0x0100_0193;
    bytes
        .iter()
        .fold(OFFSET, |hash, &b| (hash ^ u32::from(b)).wrapping_mul(PRIME))
}

/// Sparse word → weight map, not necessarily normalized
///
/// Absent words, negative and non-finite weights all count as zero mass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Priors {
    weights: FxHashMap<String, f64>,
}

impl Priors {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the weight of a word
    pub fn insert(&mut self, word: impl Into<String>, weight: f64) {
        self.weights.insert(word.into(), weight);
    }

    /// Mass of a word, zero when absent or invalid
    #[must_use]
    pub fn mass(&self, word: &str) -> f64 {
        self.weights
            .get(word)
            .copied()
            .filter(|w| w.is_finite() && *w > 0.0)
            .unwrap_or(0.0)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, f64)> for Priors {
    fn from_iter<I: IntoIterator<Item = (S, f64)>>(iter: I) -> Self {
        Self {
            weights: iter.into_iter().map(|(w, m)| (w.into(), m)).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fnv1a32_reference_values() {
        assert_eq!(fnv1a32(b""), 0x811c_9dc5);
        assert_eq!(fnv1a32(b"a"), 0xe40c_292c);
        assert_eq!(fnv1a32(b"foobar"), 0xbf9c_f968);
    }

    #[test]
    fn canonical_join_and_hash() {
        let vocab = Vocabulary::from_strs(&["crane", "slate"]).unwrap();
        assert_eq!(vocab.canonical_join(), "crane\nslate");
        assert_eq!(vocab.hash32(), fnv1a32(b"crane\nslate"));

        let reordered = Vocabulary::from_strs(&["slate", "crane"]).unwrap();
        assert_ne!(vocab.hash32(), reordered.hash32());
    }

    #[test]
    fn rejects_mixed_lengths_and_empty() {
        assert_eq!(Vocabulary::new(vec![]), Err(VocabularyError::Empty));
        assert!(matches!(
            Vocabulary::from_strs(&["crane", "cranes"]),
            Err(VocabularyError::MixedLengths { found: 6, .. })
        ));
    }

    #[test]
    fn index_lookup() {
        let vocab = Vocabulary::from_strs(&["crane", "slate", "irate"]).unwrap();
        assert_eq!(vocab.index_of("slate"), Some(1));
        assert_eq!(vocab.index_of("zzzzz"), None);
        assert_eq!(vocab.word_len(), 5);
    }

    #[test]
    fn priors_treat_invalid_weights_as_zero() {
        let priors: Priors = [("a", 2.0), ("b", -1.0), ("c", f64::NAN)].into_iter().collect();
        assert!((priors.mass("a") - 2.0).abs() < f64::EPSILON);
        assert!(priors.mass("b").abs() < f64::EPSILON);
        assert!(priors.mass("c").abs() < f64::EPSILON);
        assert!(priors.mass("missing").abs() < f64::EPSILON);
    }
}
