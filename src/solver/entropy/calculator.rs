//! Entropy arithmetic over weighted candidates
//!
//! Candidates carry probability mass rather than unit counts. Secrets are
//! grouped by the pattern a guess produces; each group keeps its total mass and
//! `Σ mass·log₂(mass)` so its conditional entropy falls out directly:
//!
//! ```text
//! H_bucket = log₂(M) − (Σ mᵢ log₂ mᵢ) / M
//! EIG      = H − Σ_bucket M · H_bucket
//! ```

use crate::core::{Pattern, Priors, Word, pattern_between};
use rustc_hash::FxHashMap;

/// Accumulated mass of the secrets sharing one pattern
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Bucket {
    pub mass: f64,
    pub mass_log_mass: f64,
    pub count: usize,
}

impl Bucket {
    #[inline]
    pub fn add(&mut self, mass: f64) {
        self.mass += mass;
        if mass > 0.0 {
            self.mass_log_mass += mass * mass.log2();
        }
        self.count += 1;
    }

    /// Entropy of the secret distribution inside this bucket, in bits
    #[inline]
    #[must_use]
    pub fn entropy(&self) -> f64 {
        if self.mass <= 0.0 {
            return 0.0;
        }
        self.mass.log2() - self.mass_log_mass / self.mass
    }
}

/// Buckets keyed by pattern
pub type BucketMap = FxHashMap<Pattern, Bucket>;

/// Renormalize prior mass over `words`
///
/// Falls back to uniform when every word has zero mass.
#[must_use]
pub fn normalize_priors(words: &[Word], priors: &Priors) -> Vec<f64> {
    let raw: Vec<f64> = words.iter().map(|w| priors.mass(w.text())).collect();
    normalize(raw)
}

/// Scale non-negative weights to sum to one, uniform if they sum to zero
#[must_use]
pub fn normalize(mut weights: Vec<f64>) -> Vec<f64> {
    if weights.is_empty() {
        return weights;
    }
    let total: f64 = weights.iter().sum();
    if total > 0.0 && total.is_finite() {
        for w in &mut weights {
            *w /= total;
        }
    } else {
        let uniform = 1.0 / weights.len() as f64;
        weights.fill(uniform);
    }
    weights
}

/// Temperature reshaping `p ← p^(1/τ)`, renormalized
///
/// `τ < 1` sharpens, `τ > 1` flattens; `None` or `τ <= 0` leaves `probs` as is.
pub fn apply_temperature(probs: &mut Vec<f64>, tau: Option<f64>) {
    let Some(tau) = tau.filter(|t| *t > 0.0 && t.is_finite()) else {
        return;
    };
    if (tau - 1.0).abs() < f64::EPSILON {
        return;
    }
    let exponent = 1.0 / tau;
    let reshaped = probs.iter().map(|&p| p.powf(exponent)).collect();
    *probs = normalize(reshaped);
}

/// Shannon entropy `H = −Σ p log₂ p` in bits
///
/// # Examples
/// ```
/// use wordle_assist::solver::entropy::shannon_entropy;
///
/// let uniform = [0.25, 0.25, 0.25, 0.25];
/// assert!((shannon_entropy(&uniform) - 2.0).abs() < 1e-12);
/// ```
#[must_use]
pub fn shannon_entropy(probs: &[f64]) -> f64 {
    probs
        .iter()
        .filter(|&&p| p > 0.0)
        .map(|&p| -p * p.log2())
        .sum()
}

/// Group weighted secrets by the pattern they produce with `guess`
#[must_use]
pub fn group_by_pattern(guess: &Word, secrets: &[(&Word, f64)]) -> BucketMap {
    let mut buckets = BucketMap::default();
    for &(secret, mass) in secrets {
        buckets
            .entry(pattern_between(guess, secret))
            .or_default()
            .add(mass);
    }
    buckets
}

/// Expected information gain given the baseline entropy and final buckets
///
/// Clamped at zero to absorb rounding.
#[must_use]
pub fn information_gain(baseline: f64, buckets: &BucketMap) -> f64 {
    let expected_post: f64 = buckets.values().map(|b| b.mass * b.entropy()).sum();
    (baseline - expected_post).max(0.0)
}

/// Expected number of candidates left after the guess
///
/// `scale` is population/sample when the buckets were built from a sample.
#[must_use]
pub fn expected_remaining(buckets: &BucketMap, scale: f64) -> f64 {
    buckets
        .values()
        .map(|b| b.mass * b.count as f64 * scale)
        .sum()
}

/// `−Σ M log₂ M` over the buckets filled so far
///
/// Together with the entropy of the secrets not yet bucketed this bounds the
/// final information gain from above.
#[must_use]
pub fn partial_pattern_entropy(buckets: &BucketMap) -> f64 {
    buckets
        .values()
        .filter(|b| b.mass > 0.0)
        .map(|b| -b.mass * b.mass.log2())
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(list: &[&str]) -> Vec<Word> {
        list.iter().map(|w| Word::new(*w).unwrap()).collect()
    }

    fn uniform_secrets(list: &[Word]) -> Vec<(&Word, f64)> {
        let p = 1.0 / list.len() as f64;
        list.iter().map(|w| (w, p)).collect()
    }

    #[test]
    fn shannon_entropy_bounds() {
        assert!(shannon_entropy(&[1.0]).abs() < 1e-12);
        assert!(shannon_entropy(&[]).abs() < 1e-12);
        let skewed = shannon_entropy(&[0.97, 0.01, 0.01, 0.01]);
        assert!(skewed > 0.0 && skewed < 2.0);
    }

    #[test]
    fn normalize_falls_back_to_uniform() {
        let probs = normalize(vec![0.0, 0.0, 0.0, 0.0]);
        assert_eq!(probs, vec![0.25; 4]);
        let probs = normalize(vec![1.0, 3.0]);
        assert!((probs[1] - 0.75).abs() < 1e-12);
    }

    #[test]
    fn normalize_priors_ignores_missing_words() {
        let list = words(&["crane", "slate"]);
        let priors: Priors = [("slate", 4.0)].into_iter().collect();
        assert_eq!(normalize_priors(&list, &priors), vec![0.0, 1.0]);
    }

    #[test]
    fn temperature_sharpens_and_flattens() {
        let base = vec![0.2, 0.8];
        let mut sharp = base.clone();
        apply_temperature(&mut sharp, Some(0.5));
        assert!(sharp[1] > 0.8);

        let mut flat = base.clone();
        apply_temperature(&mut flat, Some(4.0));
        assert!(flat[1] < 0.8 && flat[1] > 0.5);

        let mut same = base.clone();
        apply_temperature(&mut same, Some(-1.0));
        apply_temperature(&mut same, None);
        assert_eq!(same, base);
    }

    #[test]
    fn perfect_split_gives_one_bit() {
        let list = words(&["slate", "zzzzz"]);
        let secrets = uniform_secrets(&list);
        let buckets = group_by_pattern(&list[0], &secrets);
        assert_eq!(buckets.len(), 2);
        assert!((information_gain(1.0, &buckets) - 1.0).abs() < 1e-12);
        assert!((expected_remaining(&buckets, 1.0) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn single_bucket_gives_zero_gain() {
        let list = words(&["aaaaa", "bbbbb", "ccccc"]);
        let guess = Word::new("zzzzz").unwrap();
        let secrets = uniform_secrets(&list);
        let buckets = group_by_pattern(&guess, &secrets);
        assert_eq!(buckets.len(), 1);
        let h = (3.0f64).log2();
        assert!(information_gain(h, &buckets).abs() < 1e-12);
        assert!((expected_remaining(&buckets, 1.0) - 3.0).abs() < 1e-12);
    }

    #[test]
    fn gain_equals_pattern_entropy() {
        let list = words(&["slate", "irate", "trace", "raise", "crate"]);
        let guess = Word::new("crane").unwrap();
        let probs = [0.1, 0.2, 0.3, 0.25, 0.15];
        let secrets: Vec<(&Word, f64)> = list.iter().zip(probs).collect();
        let buckets = group_by_pattern(&guess, &secrets);

        let gain = information_gain(shannon_entropy(&probs), &buckets);
        assert!((gain - partial_pattern_entropy(&buckets)).abs() < 1e-9);
    }

    #[test]
    fn bucket_entropy_of_uniform_members() {
        let mut bucket = Bucket::default();
        for _ in 0..4 {
            bucket.add(0.125);
        }
        assert_eq!(bucket.count, 4);
        assert!((bucket.entropy() - 2.0).abs() < 1e-12);
    }
}
