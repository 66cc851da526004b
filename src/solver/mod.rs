//! Guess scoring
//!
//! Expected-information-gain ranking blended with solve probability, plus the
//! analysis helpers built on the same arithmetic.

pub mod analysis;
mod cancel;
mod engine;
pub mod entropy;
mod options;
pub mod policy;
pub mod prefilter;
pub mod sampling;

pub use analysis::{GuessAnalysis, LetterHeatmap, analyze_guess, letter_heatmap};
pub use cancel::{CancelToken, Canceled};
pub use engine::{ScoreInput, score_guesses};
pub use options::{ScoreOptions, Suggestion};
pub use policy::{Policy, alpha};
