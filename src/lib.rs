//! Wordle Assist
//!
//! Guess suggestions for word-deduction games of any word length: the
//! feedback codec, an entropy and solve-probability scorer, a tiered
//! pattern-table cache and a background worker that ties them together.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use wordle_assist::core::{Word, feedback};
//!
//! let guess = Word::new("crane").unwrap();
//! let secret = Word::new("slate").unwrap();
//!
//! let pattern = feedback(&guess, &secret).unwrap();
//! println!("{}", pattern.to_emoji());
//! ```

// Words, feedback and candidate pools
pub mod core;

// Guess scoring
pub mod solver;

// Pattern tables and their cache tiers
pub mod table;

// Background worker and its message protocol
pub mod worker;

// Word lists
pub mod wordlists;

// Command implementations
pub mod commands;

// Terminal output formatting
pub mod output;

#[cfg(test)]
mod test_support;
