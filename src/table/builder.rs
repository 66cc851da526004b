//! Offline pattern-table construction
//!
//! Picks the seed guesses most worth precomputing and fills their feedback
//! rows against the whole vocabulary.

use std::cmp::Ordering;

use rayon::prelude::*;
use tracing::{debug, info};

use super::format::{PatternTable, TableError};
use crate::core::{Priors, Vocabulary, pattern_between};

const RANK_WEIGHT: f64 = 0.7;
const VARIETY_WEIGHT: f64 = 0.3;

/// Vocabulary indices of the best `count` seed guesses, best first
///
/// Each word scores `0.7 * rank + 0.3 * distinct / L`, where `rank` maps the
/// word's position in prior order linearly onto `[0, 1]` (best is 1). Ties in
/// both orders go to the lexicographically smaller word.
#[must_use]
pub fn select_seeds(vocab: &Vocabulary, priors: &Priors, count: usize) -> Vec<usize> {
    let words = vocab.words();
    let n = words.len();
    if n == 0 || count == 0 {
        return Vec::new();
    }

    let mut by_prior: Vec<usize> = (0..n).collect();
    by_prior.sort_by(|&a, &b| {
        priors
            .mass(words[b].text())
            .total_cmp(&priors.mass(words[a].text()))
            .then_with(|| words[a].text().cmp(words[b].text()))
    });

    let mut scores = vec![0.0; n];
    for (rank, &idx) in by_prior.iter().enumerate() {
        let rank_score = if n == 1 {
            1.0
        } else {
            1.0 - rank as f64 / (n - 1) as f64
        };
        let variety = words[idx].distinct_letters() as f64 / vocab.word_len() as f64;
        scores[idx] = RANK_WEIGHT * rank_score + VARIETY_WEIGHT * variety;
    }

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| match scores[b].total_cmp(&scores[a]) {
        Ordering::Equal => words[a].text().cmp(words[b].text()),
        other => other,
    });
    order.truncate(count.min(n));
    order
}

/// Build the table for `seed_count` seeds of `vocab`
///
/// # Errors
/// `TableError::Overflow` if any seed produces a code above `u16::MAX`, which
/// is certain for words longer than ten letters.
pub fn build_table(
    vocab: &Vocabulary,
    priors: &Priors,
    seed_count: usize,
) -> Result<PatternTable, TableError> {
    let seeds = select_seeds(vocab, priors, seed_count);
    let words = vocab.words();
    debug!(
        word_len = vocab.word_len(),
        vocab = words.len(),
        seeds = seeds.len(),
        "building pattern table"
    );

    let rows: Vec<Vec<u16>> = seeds
        .par_iter()
        .map(|&seed| {
            let guess = &words[seed];
            words
                .iter()
                .map(|secret| {
                    pattern_between(guess, secret)
                        .code()
                        .and_then(|code| u16::try_from(code).ok())
                        .ok_or_else(|| TableError::Overflow {
                            guess: guess.text().to_string(),
                            word_len: vocab.word_len(),
                        })
                })
                .collect()
        })
        .collect::<Result<_, _>>()?;

    let table = PatternTable::new(
        vocab.word_len(),
        words.len(),
        vocab.hash32(),
        seeds.iter().map(|&s| s as u32).collect(),
        rows.concat(),
    );
    info!(
        word_len = table.word_len(),
        seeds = table.seeds().len(),
        bytes = table.byte_len(),
        "pattern table built"
    );
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Word;
    use crate::table::format::Expectation;

    fn vocab(list: &[&str]) -> Vocabulary {
        Vocabulary::from_strs(list).unwrap()
    }

    #[test]
    fn seeds_favor_prior_then_variety() {
        let v = vocab(&["aaaa", "abcd", "abca", "dcba"]);
        let priors: Priors = [("aaaa", 10.0), ("abca", 5.0)].into_iter().collect();
        // ranks: aaaa 0, abca 1, abcd 2, dcba 3 (n = 4)
        // aaaa: 0.7 + 0.075 = 0.775, abca: 0.467 + 0.225 = 0.692
        // abcd: 0.233 + 0.3 = 0.533, dcba: 0 + 0.3 = 0.3
        assert_eq!(select_seeds(&v, &priors, 4), vec![0, 2, 1, 3]);
    }

    #[test]
    fn seed_count_capped_by_vocabulary() {
        let v = vocab(&["ab", "cd", "ef"]);
        assert_eq!(select_seeds(&v, &Priors::new(), 10).len(), 3);
        assert!(select_seeds(&v, &Priors::new(), 0).is_empty());
    }

    #[test]
    fn single_word_vocabulary() {
        let v = vocab(&["solo"]);
        assert_eq!(select_seeds(&v, &Priors::new(), 3), vec![0]);
    }

    #[test]
    fn ties_break_lexicographically() {
        let v = vocab(&["cd", "ab", "ef"]);
        // Equal priors rank ab, cd, ef; equal variety keeps that order
        assert_eq!(select_seeds(&v, &Priors::new(), 3), vec![1, 0, 2]);
    }

    #[test]
    fn build_serialize_parse_matches_direct_computation() {
        let v = vocab(&["crane", "slate", "eagle", "allee", "cigar", "civic"]);
        let priors: Priors = [("slate", 3.0), ("cigar", 2.0)].into_iter().collect();
        let table = build_table(&v, &priors, 3).unwrap();

        let bytes = table.to_bytes();
        let expectation = Expectation {
            word_len: 5,
            vocab_len: v.len(),
            vocab_hash: v.hash32(),
        };
        let parsed = PatternTable::parse(&bytes, &expectation).unwrap();

        let expected_seeds: Vec<u32> = select_seeds(&v, &priors, 3)
            .into_iter()
            .map(|s| s as u32)
            .collect();
        assert_eq!(parsed.seeds(), expected_seeds.as_slice());
        for (row, &seed) in parsed.seeds().iter().enumerate() {
            let guess: &Word = &v.words()[seed as usize];
            let direct: Vec<u16> = v
                .words()
                .iter()
                .map(|s| pattern_between(guess, s).code().unwrap() as u16)
                .collect();
            assert_eq!(parsed.row(row), direct.as_slice());
        }
    }

    #[test]
    fn long_words_overflow() {
        let v = vocab(&["abcdefghijk", "kjihgfedcba"]);
        assert!(matches!(
            build_table(&v, &Priors::new(), 2),
            Err(TableError::Overflow { word_len: 11, .. })
        ));
    }

    #[test]
    fn ten_letters_fit() {
        let v = vocab(&["abcdefghij", "jihgfedcba"]);
        let table = build_table(&v, &Priors::new(), 2).unwrap();
        assert_eq!(table.seeds().len(), 2);
    }
}
