//! Blend between information gain and solve probability
//!
//! `score = α·EIG + (1 − α)·solve_prob`. With many candidates α leans towards
//! information; it also rises as attempts run out.

/// Lower bound of the blend weight
pub const ALPHA_MIN: f64 = 0.1;
/// Upper bound of the blend weight
pub const ALPHA_MAX: f64 = 0.95;

/// Pool size (in candidates) at which the logistic curve is centred
const SIZE_PIVOT: f64 = 8.0;
const SIZE_SLOPE: f64 = 1.5;
const URGENCY_SLOPE: f64 = 1.0;

/// How the blend weight is chosen
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Policy {
    /// Continuous α from [`alpha`]
    #[default]
    Blend,
    /// α = 1: rank by information gain only
    PureEig,
    /// α = 0: rank by solve probability only
    PureSolve,
}

impl Policy {
    /// Create a policy from its name
    ///
    /// Supported names: "blend", "eig" / "pure-eig" / "entropy", "solve" /
    /// "pure-solve". Defaults to blend if the name is unrecognized.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name {
            "eig" | "pure-eig" | "entropy" => Self::PureEig,
            "solve" | "pure-solve" => Self::PureSolve,
            _ => Self::Blend,
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Blend => "blend",
            Self::PureEig => "pure-eig",
            Self::PureSolve => "pure-solve",
        }
    }

    /// Blend weight for a pool of `size` candidates
    #[must_use]
    pub fn alpha(self, size: usize, attempts_left: u32, attempts_max: u32) -> f64 {
        match self {
            Self::Blend => alpha(size, attempts_left, attempts_max),
            Self::PureEig => 1.0,
            Self::PureSolve => 0.0,
        }
    }
}

/// Logistic blend weight in `[ALPHA_MIN, ALPHA_MAX]`
///
/// Increases with `ln(size)` and with the fraction of attempts already spent.
#[must_use]
pub fn alpha(size: usize, attempts_left: u32, attempts_max: u32) -> f64 {
    let spent = if attempts_max == 0 {
        0.0
    } else {
        1.0 - f64::from(attempts_left.min(attempts_max)) / f64::from(attempts_max)
    };
    let z = SIZE_SLOPE * ((size.max(1) as f64).ln() - SIZE_PIVOT.ln()) + URGENCY_SLOPE * spent;
    let logistic = 1.0 / (1.0 + (-z).exp());
    (ALPHA_MIN + (ALPHA_MAX - ALPHA_MIN) * logistic).clamp(ALPHA_MIN, ALPHA_MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alpha_stays_in_range() {
        for size in [0, 1, 2, 10, 100, 10_000, 1_000_000] {
            for left in 0..=6 {
                let a = alpha(size, left, 6);
                assert!((ALPHA_MIN..=ALPHA_MAX).contains(&a), "alpha={a}");
            }
        }
    }

    #[test]
    fn alpha_grows_with_pool_size() {
        let sizes = [1, 2, 5, 20, 200, 2000];
        let alphas: Vec<f64> = sizes.iter().map(|&s| alpha(s, 6, 6)).collect();
        assert!(alphas.windows(2).all(|w| w[1] > w[0]));
    }

    #[test]
    fn alpha_grows_as_attempts_run_out() {
        let alphas: Vec<f64> = (1..=6).rev().map(|left| alpha(30, left, 6)).collect();
        assert!(alphas.windows(2).all(|w| w[1] > w[0]));
    }

    #[test]
    fn forced_policies() {
        assert!((Policy::PureEig.alpha(3, 1, 6) - 1.0).abs() < f64::EPSILON);
        assert!(Policy::PureSolve.alpha(3000, 6, 6).abs() < f64::EPSILON);
        assert_eq!(Policy::from_name("entropy"), Policy::PureEig);
        assert_eq!(Policy::from_name("pure-solve"), Policy::PureSolve);
        assert_eq!(Policy::from_name("whatever"), Policy::Blend);
    }
}
