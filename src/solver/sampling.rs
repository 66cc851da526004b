//! Prior-weighted sampling without replacement
//!
//! Draws go through the cumulative distribution with a binary search; a
//! repeated index is simply redrawn. The generator is seeded so the same
//! inputs always give the same sample.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Redraw budget per requested sample before filling deterministically
const DRAWS_PER_SAMPLE: usize = 16;

/// Sample `k` distinct indices from `probs`, weighted by mass
///
/// Returns every index when `k >= probs.len()`. If the redraw budget runs out
/// (heavy skew, or `k` close to the number of positive entries) the rest is
/// filled with the heaviest unsampled indices.
#[must_use]
pub fn sample_weighted(probs: &[f64], k: usize, seed: u64) -> Vec<usize> {
    let n = probs.len();
    if k >= n {
        return (0..n).collect();
    }

    let mut cdf = Vec::with_capacity(n);
    let mut total = 0.0;
    for &p in probs {
        total += p.max(0.0);
        cdf.push(total);
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut taken = vec![false; n];
    let mut picked = Vec::with_capacity(k);

    if total > 0.0 {
        let max_draws = k * DRAWS_PER_SAMPLE + 64;
        let mut draws = 0;
        while picked.len() < k && draws < max_draws {
            draws += 1;
            let u = rng.random::<f64>() * total;
            let idx = cdf.partition_point(|&c| c <= u).min(n - 1);
            if !taken[idx] {
                taken[idx] = true;
                picked.push(idx);
            }
        }
    }

    if picked.len() < k {
        let mut rest: Vec<usize> = (0..n).filter(|&i| !taken[i]).collect();
        rest.sort_by(|&a, &b| probs[b].total_cmp(&probs[a]).then(a.cmp(&b)));
        picked.extend(rest.into_iter().take(k - picked.len()));
    }

    picked
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn returns_all_when_k_covers_population() {
        assert_eq!(sample_weighted(&[0.5, 0.5], 5, 1), vec![0, 1]);
    }

    #[test]
    fn distinct_and_sized() {
        let probs = vec![1.0 / 100.0; 100];
        let sample = sample_weighted(&probs, 40, 7);
        assert_eq!(sample.len(), 40);
        let mut sorted = sample.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), 40);
    }

    #[test]
    fn reproducible_for_a_seed() {
        let probs: Vec<f64> = (1..=50).map(f64::from).collect();
        assert_eq!(sample_weighted(&probs, 10, 42), sample_weighted(&probs, 10, 42));
    }

    #[test]
    fn zero_mass_entries_come_last() {
        let mut probs = vec![0.0; 20];
        probs[3] = 0.5;
        probs[11] = 0.5;
        let sample = sample_weighted(&probs, 3, 9);
        assert!(sample[..2].contains(&3));
        assert!(sample[..2].contains(&11));
        assert_eq!(sample.len(), 3);
    }

    #[test]
    fn heavy_entries_are_favoured() {
        let mut probs = vec![0.001; 200];
        probs[17] = 10.0;
        let hits = (0..20)
            .filter(|&seed| sample_weighted(&probs, 5, seed).contains(&17))
            .count();
        assert_eq!(hits, 20);
    }
}
