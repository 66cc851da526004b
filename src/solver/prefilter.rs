//! Guess prefiltering for large pools
//!
//! Scores every word by how much probability mass shares its letter in each
//! position, with a small bonus for letter variety, and keeps the best ones.
//! The heaviest words by prior are always kept so a likely answer can still
//! be suggested directly.

use crate::core::Word;

/// Number of top-prior words always kept
pub const KEEP_TOP_PRIOR: usize = 50;

/// Bonus weight for distinct letters (fraction of the word length)
const VARIETY_BONUS: f64 = 0.05;

/// Indices of the guesses worth scoring, ascending
///
/// `probs` is aligned with `words`. Returns all indices when the pool is not
/// larger than `limit`.
#[must_use]
pub fn prefilter_guesses(words: &[Word], probs: &[f64], limit: usize) -> Vec<usize> {
    if words.len() <= limit {
        return (0..words.len()).collect();
    }

    let len = words[0].len();
    let mut freq = vec![[0.0f64; 26]; len];
    for (word, &p) in words.iter().zip(probs) {
        for (pos, &b) in word.bytes().iter().enumerate() {
            freq[pos][usize::from(b - b'a')] += p;
        }
    }

    let heuristic: Vec<f64> = words
        .iter()
        .map(|word| {
            let positional: f64 = word
                .bytes()
                .iter()
                .enumerate()
                .map(|(pos, &b)| freq[pos][usize::from(b - b'a')])
                .sum();
            positional + VARIETY_BONUS * word.distinct_letters() as f64 / len as f64
        })
        .collect();

    let mut keep = vec![false; words.len()];
    for i in top_by(&heuristic, limit) {
        keep[i] = true;
    }
    for i in top_by(probs, KEEP_TOP_PRIOR) {
        keep[i] = true;
    }

    (0..words.len()).filter(|&i| keep[i]).collect()
}

/// Indices of the `k` largest values, ties by lower index
fn top_by(values: &[f64], k: usize) -> Vec<usize> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[b].total_cmp(&values[a]).then(a.cmp(&b)));
    order.truncate(k);
    order
}
