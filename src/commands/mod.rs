//! Command implementations

pub mod analyze;
pub mod session;
pub mod suggest;
pub mod table;

pub use analyze::{analyze_word, feedback_between, letter_heatmap};
pub use session::{Observation, Session};
pub use suggest::{SuggestConfig, SuggestOutcome, run_suggest};
pub use table::{BuiltTable, TableAction, TableOutcome, build_table_file, run_table_action};
