//! Terminal output formatting
//!
//! Display utilities for CLI results and pretty-printing.

pub mod display;
pub mod formatters;

pub use display::{
    print_built_table, print_feedback, print_guess_analysis, print_heatmap, print_history,
    print_suggestions, print_table_outcome,
};
