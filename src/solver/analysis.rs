//! Candidate and guess analysis
//!
//! Read-only views over the current candidate distribution, used to explain a
//! suggestion rather than to pick one.

use super::entropy::{
    expected_remaining, group_by_pattern, information_gain, normalize_priors, shannon_entropy,
};
use crate::core::{FeedbackError, Priors, Trits, Word};

/// Letter mass per position over the candidate distribution
#[derive(Debug, Clone, PartialEq)]
pub struct LetterHeatmap {
    pub word_len: usize,
    /// `positions[i][letter]` = mass of candidates with `letter` at position `i`
    pub positions: Vec<[f64; 26]>,
    /// `presence[letter]` = mass of candidates containing `letter` anywhere
    pub presence: [f64; 26],
    pub candidates: usize,
}

impl LetterHeatmap {
    /// Most likely letter at each position
    #[must_use]
    pub fn likeliest_letters(&self) -> Vec<(u8, f64)> {
        self.positions
            .iter()
            .map(|row| {
                let (idx, &mass) = row
                    .iter()
                    .enumerate()
                    .max_by(|a, b| a.1.total_cmp(b.1).then(b.0.cmp(&a.0)))
                    .unwrap_or((0, &0.0));
                (b'a' + idx as u8, mass)
            })
            .collect()
    }
}

/// Build the letter heatmap of `words` weighted by `priors`
#[must_use]
pub fn letter_heatmap(words: &[Word], priors: &Priors) -> LetterHeatmap {
    let word_len = words.first().map_or(0, Word::len);
    let probs = normalize_priors(words, priors);
    let mut positions = vec![[0.0; 26]; word_len];
    let mut presence = [0.0; 26];

    for (word, &p) in words.iter().zip(&probs) {
        for (pos, &b) in word.bytes().iter().enumerate().take(word_len) {
            positions[pos][usize::from(b - b'a')] += p;
        }
        for (letter, &count) in word.letter_counts().iter().enumerate() {
            if count > 0 {
                presence[letter] += p;
            }
        }
    }

    LetterHeatmap {
        word_len,
        positions,
        presence,
        candidates: words.len(),
    }
}

/// One feedback outcome of a guess
#[derive(Debug, Clone, PartialEq)]
pub struct BucketSummary {
    pub pattern: Trits,
    pub count: usize,
    pub mass: f64,
}

/// Full breakdown of a single guess against the candidates
#[derive(Debug, Clone, PartialEq)]
pub struct GuessAnalysis {
    pub guess: String,
    pub eig: f64,
    pub solve_prob: f64,
    pub expected_remaining: f64,
    pub max_bucket: usize,
    /// Outcomes sorted by mass, heaviest first
    pub buckets: Vec<BucketSummary>,
    pub candidates: usize,
}

/// Analyze `guess` against `words` weighted by `priors`
///
/// # Errors
/// Returns `FeedbackError::LengthMismatch` if the guess length differs from
/// the candidates'.
pub fn analyze_guess(
    guess: &Word,
    words: &[Word],
    priors: &Priors,
) -> Result<GuessAnalysis, FeedbackError> {
    if let Some(secret) = words.iter().find(|w| w.len() != guess.len()) {
        return Err(FeedbackError::LengthMismatch {
            guess: guess.len(),
            secret: secret.len(),
        });
    }

    let probs = normalize_priors(words, priors);
    let secrets: Vec<(&Word, f64)> = words.iter().zip(probs.iter().copied()).collect();
    let buckets = group_by_pattern(guess, &secrets);

    let solve_prob = words
        .iter()
        .zip(&probs)
        .filter(|(w, _)| *w == guess)
        .map(|(_, &p)| p)
        .sum();

    let mut summaries: Vec<BucketSummary> = buckets
        .iter()
        .map(|(pattern, bucket)| BucketSummary {
            pattern: pattern.decode(guess.len()),
            count: bucket.count,
            mass: bucket.mass,
        })
        .collect();
    summaries.sort_by(|a, b| {
        b.mass
            .total_cmp(&a.mass)
            .then_with(|| a.pattern.to_digits().cmp(&b.pattern.to_digits()))
    });

    Ok(GuessAnalysis {
        guess: guess.text().to_string(),
        eig: information_gain(shannon_entropy(&probs), &buckets),
        solve_prob,
        expected_remaining: expected_remaining(&buckets, 1.0),
        max_bucket: summaries.iter().map(|b| b.count).max().unwrap_or(0),
        buckets: summaries,
        candidates: words.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(list: &[&str]) -> Vec<Word> {
        list.iter().map(|w| Word::new(*w).unwrap()).collect()
    }

    #[test]
    fn heatmap_masses_sum_to_one_per_position() {
        let list = words(&["crane", "slate", "irate", "crate"]);
        let heatmap = letter_heatmap(&list, &Priors::new());
        assert_eq!(heatmap.word_len, 5);
        for row in &heatmap.positions {
            assert!((row.iter().sum::<f64>() - 1.0).abs() < 1e-12);
        }
        // Every word ends in 'e'
        assert!((heatmap.presence[usize::from(b'e' - b'a')] - 1.0).abs() < 1e-12);
        assert_eq!(heatmap.likeliest_letters()[4].0, b'e');
    }

    #[test]
    fn heatmap_of_nothing() {
        let heatmap = letter_heatmap(&[], &Priors::new());
        assert_eq!(heatmap.word_len, 0);
        assert!(heatmap.positions.is_empty());
    }

    #[test]
    fn analysis_of_a_perfect_split() {
        let list = words(&["slate", "zzzzz"]);
        let analysis = analyze_guess(&list[0], &list, &Priors::new()).unwrap();
        assert!((analysis.eig - 1.0).abs() < 1e-12);
        assert!((analysis.solve_prob - 0.5).abs() < 1e-12);
        assert_eq!(analysis.max_bucket, 1);
        assert_eq!(analysis.buckets.len(), 2);
        assert_eq!(analysis.candidates, 2);
    }

    #[test]
    fn analysis_buckets_sorted_by_mass() {
        let list = words(&["crane", "slate", "irate", "crate", "grate"]);
        let priors: Priors = [("crane", 5.0), ("slate", 1.0), ("irate", 1.0), ("crate", 1.0)]
            .into_iter()
            .collect();
        let guess = Word::new("zzzzz").unwrap();
        let analysis = analyze_guess(&guess, &list, &priors).unwrap();
        assert_eq!(analysis.buckets.len(), 1);
        assert!(analysis.eig.abs() < 1e-12);
        assert!(analysis.solve_prob.abs() < f64::EPSILON);

        let analysis = analyze_guess(&list[1], &list, &priors).unwrap();
        assert!(analysis.buckets.windows(2).all(|w| w[0].mass >= w[1].mass));
        let total: usize = analysis.buckets.iter().map(|b| b.count).sum();
        assert_eq!(total, 5);
    }

    #[test]
    fn analysis_rejects_length_mismatch() {
        let list = words(&["crane"]);
        let guess = Word::new("cranes").unwrap();
        assert!(analyze_guess(&guess, &list, &Priors::new()).is_err());
    }
}
