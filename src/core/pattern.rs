//! Feedback trits and their compact encodings
//!
//! Feedback for one guess is a vector of trits, one per letter:
//! - 0 = Absent (letter not in the secret, or all copies already used)
//! - 1 = Present (letter in the secret, wrong position)
//! - 2 = Correct (letter in the correct position)
//!
//! A [`Pattern`] is the compact, hashable form. Which variant is used depends
//! only on the word length, decided once at encode time:
//! - `L <= 40`: [`Pattern::Code`], a base-3 integer where position `i`
//!   contributes `trit × 3^i` (3^40 − 1 still fits in a `u64`)
//! - longer words: [`Pattern::Digits`], the trits as a `'0'..='2'` string

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Longest word length whose pattern is encoded as a number
pub const MAX_CODE_LEN: usize = 40;

pub const ABSENT: u8 = 0;
pub const PRESENT: u8 = 1;
pub const CORRECT: u8 = 2;

/// Per-position feedback for one guess
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Trits(Vec<u8>);

/// Error returned when a feedback string cannot be parsed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid feedback pattern: {0:?}")]
pub struct PatternParseError(pub String);

impl Trits {
    /// Build from raw trit values
    ///
    /// Returns `None` if any value is not 0, 1 or 2.
    #[must_use]
    pub fn from_vec(trits: Vec<u8>) -> Option<Self> {
        trits.iter().all(|&t| t <= CORRECT).then_some(Self(trits))
    }

    pub(crate) fn from_raw(trits: Vec<u8>) -> Self {
        debug_assert!(trits.iter().all(|&t| t <= CORRECT));
        Self(trits)
    }

    /// All-correct feedback of the given length
    #[must_use]
    pub fn solved(len: usize) -> Self {
        Self(vec![CORRECT; len])
    }

    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Count the number of correct positions
    #[must_use]
    pub fn count_correct(&self) -> usize {
        self.0.iter().filter(|&&t| t == CORRECT).count()
    }

    /// Count the number of present-but-misplaced positions
    #[must_use]
    pub fn count_present(&self) -> usize {
        self.0.iter().filter(|&&t| t == PRESENT).count()
    }

    /// Check if every position is correct
    #[must_use]
    pub fn is_solved(&self) -> bool {
        self.0.iter().all(|&t| t == CORRECT)
    }

    /// Render as a digit string like `"21001"`
    #[must_use]
    pub fn to_digits(&self) -> String {
        self.0.iter().map(|&t| char::from(b'0' + t)).collect()
    }

    /// Render as emoji squares
    #[must_use]
    pub fn to_emoji(&self) -> String {
        self.0
            .iter()
            .map(|&t| match t {
                CORRECT => '🟩',
                PRESENT => '🟨',
                _ => '⬜',
            })
            .collect()
    }

    /// Parse feedback from a string
    ///
    /// Accepts per position:
    /// - `2`, `G`/`g`, 🟩 for correct
    /// - `1`, `Y`/`y`, 🟨 for present
    /// - `0`, `-`, `_`, `.`, ⬜/⬛ for absent
    ///
    /// # Errors
    /// Returns `PatternParseError` on an empty string or unknown character.
    ///
    /// # Examples
    /// ```
    /// use wordle_assist::core::Trits;
    ///
    /// let a = Trits::parse("GY-GY").unwrap();
    /// let b = Trits::parse("21021").unwrap();
    /// assert_eq!(a, b);
    /// assert_eq!(a.to_emoji(), "🟩🟨⬜🟩🟨");
    /// ```
    pub fn parse(s: &str) -> Result<Self, PatternParseError> {
        let trits = s
            .trim()
            .chars()
            .map(|ch| match ch {
                '2' | 'G' | 'g' | '🟩' => Some(CORRECT),
                '1' | 'Y' | 'y' | '🟨' => Some(PRESENT),
                '0' | '-' | '_' | '.' | '⬜' | '⬛' => Some(ABSENT),
                _ => None,
            })
            .collect::<Option<Vec<u8>>>()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| PatternParseError(s.to_string()))?;

        Ok(Self(trits))
    }
}

impl FromStr for Trits {
    type Err = PatternParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Trits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_digits())
    }
}

/// Compact, hashable feedback pattern
///
/// Two patterns of the same word length always use the same variant, so they
/// can be compared and hashed directly. Across lengths, use [`patterns_equal`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Pattern {
    /// Little-endian base-3 code, for `L <= MAX_CODE_LEN`
    Code(u64),
    /// Literal digit string, for longer words
    Digits(String),
}

impl Pattern {
    /// Encode trits, choosing the representation from their length
    #[must_use]
    pub fn encode(trits: &Trits) -> Self {
        Self::from_slice(trits.as_slice())
    }

    pub(crate) fn from_slice(trits: &[u8]) -> Self {
        if trits.len() <= MAX_CODE_LEN {
            Self::Code(encode_code(trits))
        } else {
            Self::Digits(trits.iter().map(|&t| char::from(b'0' + t)).collect())
        }
    }

    /// Decode back to `len` trits
    ///
    /// For [`Pattern::Code`] exactly `len` trits are read, least significant
    /// first. For [`Pattern::Digits`] the stored digits are returned.
    #[must_use]
    pub fn decode(&self, len: usize) -> Trits {
        match self {
            Self::Code(code) => {
                let mut val = *code;
                let trits = (0..len)
                    .map(|_| {
                        let digit = (val % 3) as u8;
                        val /= 3;
                        digit
                    })
                    .collect();
                Trits(trits)
            }
            Self::Digits(digits) => {
                debug_assert_eq!(digits.len(), len, "digit pattern length mismatch");
                Trits(digits.bytes().map(|b| b - b'0').collect())
            }
        }
    }

    /// Numeric code, if this pattern is numeric
    #[must_use]
    pub const fn code(&self) -> Option<u64> {
        match self {
            Self::Code(code) => Some(*code),
            Self::Digits(_) => None,
        }
    }

    /// The all-correct pattern for a word length
    #[must_use]
    pub fn solved(len: usize) -> Self {
        Self::encode(&Trits::solved(len))
    }
}

/// Base-3 packing, position 0 least significant
#[inline]
pub(crate) fn encode_code(trits: &[u8]) -> u64 {
    debug_assert!(trits.len() <= MAX_CODE_LEN);
    trits
        .iter()
        .rev()
        .fold(0u64, |acc, &t| acc * 3 + u64::from(t))
}

/// Value equality of two patterns of length `len`
///
/// Same-variant patterns compare directly; mixed variants are decoded to
/// trits first. A digit pattern of any other length than `len` never matches.
#[must_use]
pub fn patterns_equal(a: &Pattern, b: &Pattern, len: usize) -> bool {
    let wrong_len = |p: &Pattern| matches!(p, Pattern::Digits(d) if d.len() != len);
    if wrong_len(a) || wrong_len(b) {
        return false;
    }
    match (a, b) {
        (Pattern::Code(x), Pattern::Code(y)) => x == y,
        (Pattern::Digits(x), Pattern::Digits(y)) => x == y,
        _ => a.decode(len) == b.decode(len),
    }
}
