//! Feedback computation
//!
//! Implements the game's exact feedback rules, including duplicate letters:
//! 1. First pass: mark exact matches correct and consume them from the
//!    secret's remaining letter counts
//! 2. Second pass: left to right over the other positions, mark present while
//!    the letter still has a remaining count (consuming one), else absent

use super::pattern::{CORRECT, PRESENT, Pattern, Trits};
use super::word::{MAX_WORD_LEN, Word, letter_counts};
use thiserror::Error;

/// Error from a direct feedback call
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FeedbackError {
    #[error("guess has {guess} letters but secret has {secret}")]
    LengthMismatch { guess: usize, secret: usize },
}

/// Compute the feedback for `guess` when `secret` is the target
///
/// # Errors
/// Returns `FeedbackError::LengthMismatch` if the words differ in length.
///
/// # Examples
/// ```
/// use wordle_assist::core::{Word, feedback};
///
/// let guess = Word::new("civic").unwrap();
/// let secret = Word::new("cigar").unwrap();
/// assert_eq!(feedback(&guess, &secret).unwrap().as_slice(), &[2, 2, 0, 0, 0]);
/// ```
pub fn feedback(guess: &Word, secret: &Word) -> Result<Trits, FeedbackError> {
    if guess.len() != secret.len() {
        return Err(FeedbackError::LengthMismatch {
            guess: guess.len(),
            secret: secret.len(),
        });
    }

    let mut trits = vec![0u8; guess.len()];
    fill_trits(guess.bytes(), secret.bytes(), &mut trits);
    Ok(Trits::from_raw(trits))
}

/// Pattern for two words of equal length, without allocating for short words
///
/// Callers guarantee equal lengths; used on hot paths where a mismatch has
/// already been ruled out.
#[inline]
#[must_use]
pub fn pattern_between(guess: &Word, secret: &Word) -> Pattern {
    debug_assert_eq!(guess.len(), secret.len());
    let mut buf = [0u8; MAX_WORD_LEN];
    let trits = &mut buf[..guess.len()];
    fill_trits(guess.bytes(), secret.bytes(), trits);
    Pattern::from_slice(trits)
}

/// Two-pass feedback into `out`
///
/// Both slices must be lowercase ASCII of the same length as `out`.
#[inline]
pub(crate) fn fill_trits(guess: &[u8], secret: &[u8], out: &mut [u8]) {
    let mut remaining = letter_counts(secret);

    // First pass: exact matches
    for (i, (&g, &s)) in guess.iter().zip(secret).enumerate() {
        if g == s {
            out[i] = CORRECT;
            remaining[usize::from(g - b'a')] -= 1;
        } else {
            out[i] = 0;
        }
    }

    // Second pass: misplaced letters from what is left
    for (i, &g) in guess.iter().enumerate() {
        if out[i] == CORRECT {
            continue;
        }
        let slot = &mut remaining[usize::from(g - b'a')];
        if *slot > 0 {
            out[i] = PRESENT;
            *slot -= 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trits(guess: &str, secret: &str) -> Vec<u8> {
        let g = Word::new(guess).unwrap();
        let s = Word::new(secret).unwrap();
        feedback(&g, &s).unwrap().as_slice().to_vec()
    }

    #[test]
    fn repeated_guess_letter_single_in_secret() {
        assert_eq!(trits("civic", "cigar"), vec![2, 2, 0, 0, 0]);
    }

    #[test]
    fn present_letters_consume_residual_counts() {
        assert_eq!(trits("eagle", "allee"), vec![1, 1, 0, 1, 2]);
        assert_eq!(trits("cabal", "abbey"), vec![0, 1, 2, 0, 0]);
    }

    #[test]
    fn duplicate_letters_green_takes_priority() {
        // S(present) P(absent) E(present) E(present) D(absent)
        assert_eq!(trits("speed", "erase"), vec![1, 0, 1, 1, 0]);
        // R(present) O(present) B(absent) O(correct) T(absent)
        assert_eq!(trits("robot", "floor"), vec![1, 1, 0, 2, 0]);
    }

    #[test]
    fn all_absent_and_all_correct() {
        assert_eq!(trits("abcde", "fghij"), vec![0; 5]);
        assert!(feedback(&Word::new("crane").unwrap(), &Word::new("crane").unwrap())
            .unwrap()
            .is_solved());
    }

    #[test]
    fn length_mismatch_is_an_error() {
        let g = Word::new("crane").unwrap();
        let s = Word::new("cranes").unwrap();
        assert_eq!(
            feedback(&g, &s),
            Err(FeedbackError::LengthMismatch { guess: 5, secret: 6 })
        );
    }

    #[test]
    fn pattern_between_matches_encoded_feedback() {
        let g = Word::new("crane").unwrap();
        let s = Word::new("slate").unwrap();
        assert_eq!(pattern_between(&g, &s), Pattern::Code(180));
        assert_eq!(
            pattern_between(&g, &s),
            Pattern::encode(&feedback(&g, &s).unwrap())
        );
    }

    #[test]
    fn other_lengths() {
        assert_eq!(trits("ab", "ba"), vec![1, 1]);
        assert_eq!(trits("aaab", "abcd"), vec![2, 0, 0, 1]);
    }
}
