//! Word list and prior loading

pub mod loader;

pub use loader::{load_priors, load_words, parse_priors, parse_words};
