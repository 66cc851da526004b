//! Guess scoring engine
//!
//! Ranks candidate guesses by `α·EIG + (1 − α)·solve_prob`.
//!
//! # Pipeline
//! 1. Renormalize priors over the candidates, apply the optional temperature
//! 2. Pick the secrets to bucket against: all candidates, or a seeded,
//!    prior-weighted sample once the pool passes `sample_cutoff`
//! 3. Pick the guesses to score: all candidates, or a prefiltered subset once
//!    the pool passes `prefilter_limit`
//! 4. Score guesses chunk by chunk (in parallel inside a chunk); after each
//!    chunk report progress, then poll the cancel token
//! 5. Sort by score, ties by lower index, and keep the top K
//!
//! # Early cut
//! Pattern entropy is subadditive over the secrets still to be bucketed:
//!
//! ```text
//! EIG ≤ −Σ_b a_b log₂ a_b + Σ_{i unseen} −q_i log₂ q_i
//! ```
//!
//! where `a_b` is the mass bucketed so far. When that bound, blended with the
//! guess's solve probability, falls below the best complete score minus
//! `epsilon`, the guess is dropped. Only guesses that cannot be the winner
//! are dropped, so the top suggestion never changes.

use super::cancel::{CancelToken, Canceled};
use super::entropy::{
    BucketMap, apply_temperature, expected_remaining, information_gain, normalize,
    normalize_priors, partial_pattern_entropy,
};
use super::options::{ScoreOptions, Suggestion};
use super::prefilter::prefilter_guesses;
use super::sampling::sample_weighted;
use crate::core::{Priors, Word, pattern_between};
use rayon::prelude::*;
use tracing::debug;

/// Secrets bucketed between two early-cut bound checks
const CUT_STRIDE: usize = 32;

/// Candidates and game state for one scoring call
#[derive(Debug, Clone, Copy)]
pub struct ScoreInput<'a> {
    /// Candidate words, all of one length
    pub words: &'a [Word],
    pub priors: &'a Priors,
    pub attempts_left: u32,
    pub attempts_max: u32,
}

/// Secrets to bucket against, heaviest first
struct SecretSet<'a> {
    secrets: Vec<(&'a Word, f64)>,
    /// `tail_entropy[k]` = entropy contribution of `secrets[k..]`
    tail_entropy: Vec<f64>,
    /// Population size over sample size
    scale: f64,
}

impl<'a> SecretSet<'a> {
    fn build(words: &'a [Word], probs: &[f64], options: &ScoreOptions) -> Self {
        let n = words.len();
        let indices = if n > options.sample_cutoff && options.sample_size < n {
            sample_weighted(probs, options.sample_size.max(1), options.seed)
        } else {
            (0..n).collect()
        };

        let masses = normalize(indices.iter().map(|&i| probs[i]).collect());
        let mut ordered: Vec<(usize, f64)> = indices.into_iter().zip(masses).collect();
        ordered.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));

        let mut tail_entropy = vec![0.0; ordered.len() + 1];
        for k in (0..ordered.len()).rev() {
            let q = ordered[k].1;
            let term = if q > 0.0 { -q * q.log2() } else { 0.0 };
            tail_entropy[k] = tail_entropy[k + 1] + term;
        }

        let scale = n as f64 / ordered.len() as f64;
        let secrets = ordered.into_iter().map(|(i, q)| (&words[i], q)).collect();

        Self {
            secrets,
            tail_entropy,
            scale,
        }
    }

    fn baseline_entropy(&self) -> f64 {
        self.tail_entropy[0]
    }

    fn is_sampled(&self) -> bool {
        self.scale > 1.0
    }
}

/// Score candidate guesses
///
/// `on_progress` receives the fraction of guesses scored after every chunk;
/// `cancel` is polled right after each report and never inside a chunk.
///
/// # Errors
/// Returns `Canceled` if the token was canceled; no suggestions are produced.
///
/// # Examples
/// ```
/// use wordle_assist::core::{Priors, Word};
/// use wordle_assist::solver::{CancelToken, ScoreInput, ScoreOptions, score_guesses};
///
/// let words: Vec<Word> = ["crane", "slate", "irate", "crate"]
///     .iter()
///     .map(|w| Word::new(*w).unwrap())
///     .collect();
/// let priors = Priors::new();
/// let input = ScoreInput { words: &words, priors: &priors, attempts_left: 6, attempts_max: 6 };
///
/// let ranked = score_guesses(&input, &ScoreOptions::default(), &CancelToken::new(), &mut |_| {})
///     .unwrap();
/// assert_eq!(ranked.len(), 4);
/// assert!(ranked[0].score >= ranked[1].score);
/// ```
pub fn score_guesses(
    input: &ScoreInput<'_>,
    options: &ScoreOptions,
    cancel: &CancelToken,
    on_progress: &mut dyn FnMut(f64),
) -> Result<Vec<Suggestion>, Canceled> {
    let words = input.words;
    if words.is_empty() {
        return Ok(Vec::new());
    }
    debug_assert!(
        words.iter().all(|w| w.len() == words[0].len()),
        "scored words must share one length"
    );

    let mut probs = normalize_priors(words, input.priors);
    apply_temperature(&mut probs, options.tau);

    let set = SecretSet::build(words, &probs, options);
    let guesses = prefilter_guesses(words, &probs, options.prefilter_limit);
    let alpha = options
        .policy
        .alpha(words.len(), input.attempts_left, input.attempts_max);

    debug!(
        candidates = words.len(),
        guesses = guesses.len(),
        secrets = set.secrets.len(),
        sampled = set.is_sampled(),
        alpha,
        "scoring guesses"
    );

    let chunk_size = options.chunk_size.max(1);
    let total = guesses.len();
    let mut best = f64::NEG_INFINITY;
    let mut scored = Vec::with_capacity(total);
    let mut pruned = 0usize;

    for (chunk_no, chunk) in guesses.chunks(chunk_size).enumerate() {
        let threshold = (options.early_cut && best.is_finite()).then(|| best - options.epsilon);

        let results: Vec<Option<Suggestion>> = chunk
            .par_iter()
            .map(|&g| evaluate(g, words, &probs, &set, alpha, threshold))
            .collect();

        for result in results {
            match result {
                Some(suggestion) => {
                    best = best.max(suggestion.score);
                    scored.push(suggestion);
                }
                None => pruned += 1,
            }
        }

        let done = chunk_no * chunk_size + chunk.len();
        on_progress(done as f64 / total as f64);
        cancel.check()?;
    }

    if pruned > 0 {
        debug!(pruned, "early cut skipped guesses");
    }

    scored.sort_by(|a, b| b.score.total_cmp(&a.score).then(a.index.cmp(&b.index)));
    scored.truncate(options.top_k);
    Ok(scored)
}

/// Score one guess, or `None` if early cut proved it cannot reach `threshold`
fn evaluate(
    index: usize,
    words: &[Word],
    probs: &[f64],
    set: &SecretSet<'_>,
    alpha: f64,
    threshold: Option<f64>,
) -> Option<Suggestion> {
    let guess = &words[index];
    let solve_prob = probs[index];
    let mut buckets = BucketMap::default();

    for (k, &(secret, mass)) in set.secrets.iter().enumerate() {
        if let Some(threshold) = threshold
            && k > 0
            && k % CUT_STRIDE == 0
        {
            let eig_bound = partial_pattern_entropy(&buckets) + set.tail_entropy[k];
            let bound = alpha * eig_bound + (1.0 - alpha) * solve_prob;
            if bound < threshold {
                return None;
            }
        }
        buckets
            .entry(pattern_between(guess, secret))
            .or_default()
            .add(mass);
    }

    let eig = information_gain(set.baseline_entropy(), &buckets);
    Some(Suggestion {
        guess: guess.text().to_string(),
        index,
        eig,
        solve_prob,
        alpha,
        expected_remaining: expected_remaining(&buckets, set.scale),
        score: alpha * eig + (1.0 - alpha) * solve_prob,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::Policy;
    use crate::test_support::{all_words_over, synthetic_words};

    fn run(words: &[Word], priors: &Priors, options: &ScoreOptions) -> Vec<Suggestion> {
        let input = ScoreInput {
            words,
            priors,
            attempts_left: 6,
            attempts_max: 6,
        };
        score_guesses(&input, options, &CancelToken::new(), &mut |_| {}).unwrap()
    }

    fn words(list: &[&str]) -> Vec<Word> {
        list.iter().map(|w| Word::new(*w).unwrap()).collect()
    }

    #[test]
    fn empty_pool_returns_nothing() {
        let result = run(&[], &Priors::new(), &ScoreOptions::default());
        assert!(result.is_empty());
    }

    #[test]
    fn splitting_guess_beats_collapsing_guess() {
        let list = words(&["abcd", "abce", "abcf", "xyzw"]);
        let options = ScoreOptions {
            policy: Policy::PureEig,
            ..ScoreOptions::default()
        };
        let ranked = run(&list, &Priors::new(), &options);
        let eig_of = |w: &str| ranked.iter().find(|s| s.guess == w).unwrap().eig;

        assert!((eig_of("abcd") - 1.5).abs() < 1e-9);
        assert!(eig_of("abcd") > eig_of("xyzw"));
        assert!(ranked.iter().all(|s| s.eig >= 0.0));
    }

    #[test]
    fn map_candidate_has_highest_solve_prob() {
        let list = words(&["crane", "slate", "irate", "crate", "grate"]);
        let priors: Priors = [("crane", 1.0), ("slate", 5.0), ("irate", 2.0), ("crate", 0.5)]
            .into_iter()
            .collect();
        let options = ScoreOptions {
            policy: Policy::PureSolve,
            ..ScoreOptions::default()
        };
        let ranked = run(&list, &priors, &options);

        assert_eq!(ranked[0].guess, "slate");
        assert!(ranked.iter().all(|s| s.solve_prob <= ranked[0].solve_prob));
        let grate = ranked.iter().find(|s| s.guess == "grate").unwrap();
        assert!(grate.solve_prob.abs() < f64::EPSILON);
    }

    #[test]
    fn ties_break_by_index() {
        let list = words(&["aaaa", "bbbb"]);
        let ranked = run(&list, &Priors::new(), &ScoreOptions::default());
        assert!((ranked[0].score - ranked[1].score).abs() < 1e-12);
        assert_eq!(ranked[0].index, 0);
        assert_eq!(ranked[1].index, 1);
    }

    #[test]
    fn top_k_truncates() {
        let list = synthetic_words(40, 5, b"abcdefgh", 3);
        let options = ScoreOptions {
            top_k: 7,
            ..ScoreOptions::default()
        };
        assert_eq!(run(&list, &Priors::new(), &options).len(), 7);
    }

    #[test]
    fn alpha_and_expected_remaining_are_reported() {
        let list = synthetic_words(60, 5, b"abcdefgh", 11);
        let ranked = run(&list, &Priors::new(), &ScoreOptions::default());
        for s in &ranked {
            assert!((0.1..=0.95).contains(&s.alpha));
            assert!(s.expected_remaining >= 1.0 - 1e-9);
            assert!(s.expected_remaining <= list.len() as f64 + 1e-9);
            assert!((s.score - (s.alpha * s.eig + (1.0 - s.alpha) * s.solve_prob)).abs() < 1e-12);
        }
    }

    #[test]
    fn sampled_eig_tracks_exact_eig() {
        let list = all_words_over(b"abcdef", 4);
        assert_eq!(list.len(), 1296);
        let priors = Priors::new();

        let exact = run(
            &list,
            &priors,
            &ScoreOptions {
                top_k: usize::MAX,
                policy: Policy::PureEig,
                ..ScoreOptions::default()
            },
        );
        let sampled = run(
            &list,
            &priors,
            &ScoreOptions {
                top_k: usize::MAX,
                policy: Policy::PureEig,
                sample_cutoff: 500,
                sample_size: 1100,
                ..ScoreOptions::default()
            },
        );

        for top in exact.iter().take(10) {
            let approx = sampled.iter().find(|s| s.index == top.index).unwrap();
            assert!(
                (approx.eig - top.eig).abs() <= 0.1,
                "{}: exact {} sampled {}",
                top.guess,
                top.eig,
                approx.eig
            );
        }
    }

    #[test]
    fn sampled_eig_tracks_exact_eig_with_skewed_priors() {
        let list = all_words_over(b"abcdef", 4);
        let priors: Priors = list
            .iter()
            .enumerate()
            .map(|(i, w)| (w.text().to_string(), 1.0 + (i % 7) as f64))
            .collect();
        let options = ScoreOptions {
            top_k: usize::MAX,
            policy: Policy::PureEig,
            ..ScoreOptions::default()
        };

        let exact = run(&list, &priors, &options);
        let sampled = run(
            &list,
            &priors,
            &ScoreOptions {
                sample_cutoff: 500,
                sample_size: 1000,
                ..options
            },
        );

        for top in exact.iter().take(10) {
            let approx = sampled.iter().find(|s| s.index == top.index).unwrap();
            assert!(
                (approx.eig - top.eig).abs() <= 0.1,
                "{}: exact {} sampled {}",
                top.guess,
                top.eig,
                approx.eig
            );
        }
    }

    #[test]
    fn sampling_is_reproducible() {
        let list = synthetic_words(300, 5, b"abcdefghij", 5);
        let options = ScoreOptions {
            sample_cutoff: 100,
            sample_size: 80,
            ..ScoreOptions::default()
        };
        let priors = Priors::new();
        assert_eq!(run(&list, &priors, &options), run(&list, &priors, &options));
    }

    #[test]
    fn early_cut_keeps_the_winner() {
        let list = synthetic_words(400, 5, b"abcdefghijkl", 21);
        let priors: Priors = list
            .iter()
            .enumerate()
            .map(|(i, w)| (w.text().to_string(), 1.0 + (i % 7) as f64))
            .collect();

        for policy in [Policy::Blend, Policy::PureEig] {
            let base = ScoreOptions {
                chunk_size: 8,
                policy,
                ..ScoreOptions::default()
            };
            let full = run(&list, &priors, &base);
            let cut = run(
                &list,
                &priors,
                &ScoreOptions {
                    early_cut: true,
                    ..base.clone()
                },
            );
            assert_eq!(full[0].guess, cut[0].guess);
            assert!((full[0].score - cut[0].score).abs() < 1e-12);
        }
    }

    #[test]
    fn prefilter_limits_scored_guesses() {
        let list = synthetic_words(200, 5, b"abcdefghij", 8);
        let options = ScoreOptions {
            top_k: usize::MAX,
            prefilter_limit: 20,
            ..ScoreOptions::default()
        };
        let ranked = run(&list, &Priors::new(), &options);
        assert!(ranked.len() <= 20 + crate::solver::prefilter::KEEP_TOP_PRIOR);
        assert!(ranked.len() >= 20);
    }

    #[test]
    fn cancellation_after_first_tick() {
        let list = synthetic_words(120, 5, b"abcdefgh", 13);
        let priors = Priors::new();
        let input = ScoreInput {
            words: &list,
            priors: &priors,
            attempts_left: 6,
            attempts_max: 6,
        };
        let options = ScoreOptions {
            chunk_size: 10,
            ..ScoreOptions::default()
        };
        let token = CancelToken::new();
        let mut ticks = Vec::new();
        let result = score_guesses(&input, &options, &token, &mut |p| {
            ticks.push(p);
            token.cancel();
        });

        assert_eq!(result, Err(Canceled));
        assert_eq!(ticks.len(), 1);
        assert!(ticks[0] > 0.0 && ticks[0] < 1.0);
    }

    #[test]
    fn progress_is_monotonic_and_completes() {
        let list = synthetic_words(50, 5, b"abcdefgh", 2);
        let priors = Priors::new();
        let input = ScoreInput {
            words: &list,
            priors: &priors,
            attempts_left: 3,
            attempts_max: 6,
        };
        let options = ScoreOptions {
            chunk_size: 7,
            ..ScoreOptions::default()
        };
        let mut ticks = Vec::new();
        score_guesses(&input, &options, &CancelToken::new(), &mut |p| ticks.push(p)).unwrap();

        assert_eq!(ticks.len(), 50usize.div_ceil(7));
        assert!(ticks.windows(2).all(|w| w[1] > w[0]));
        assert!((ticks.last().unwrap() - 1.0).abs() < 1e-12);
    }
}
