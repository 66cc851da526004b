//! Core domain types
//!
//! Words, the feedback codec and the candidate pool. Everything here is pure
//! and deterministic; the scoring engine and caches are built on top.

mod bitset;
mod feedback;
mod pattern;
mod pool;
mod vocab;
mod word;

pub use bitset::BitSet;
pub use feedback::{FeedbackError, feedback, pattern_between};
pub(crate) use feedback::fill_trits;
pub use pattern::{
    ABSENT, CORRECT, MAX_CODE_LEN, PRESENT, Pattern, PatternParseError, Trits, patterns_equal,
};
pub(crate) use pattern::encode_code;
pub use pool::CandidatePool;
pub use vocab::{Priors, Vocabulary, VocabularyError, fnv1a32};
pub use word::{MAX_WORD_LEN, Word, WordError};
