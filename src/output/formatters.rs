//! Formatting utilities for terminal output

use colored::{ColoredString, Colorize};

use crate::core::{CORRECT, PRESENT, Trits, Word};

/// Guess letters colored by their feedback
#[must_use]
pub fn colored_guess(guess: &Word, feedback: &Trits) -> String {
    guess
        .text()
        .to_uppercase()
        .chars()
        .zip(feedback.as_slice())
        .map(|(ch, &t)| color_tile(&format!(" {ch} "), t).to_string())
        .collect()
}

fn color_tile(tile: &str, trit: u8) -> ColoredString {
    match trit {
        CORRECT => tile.black().on_green().bold(),
        PRESENT => tile.black().on_yellow().bold(),
        _ => tile.white().on_bright_black(),
    }
}

/// Create a progress bar string
#[must_use]
pub fn create_progress_bar(value: f64, max: f64, width: usize) -> String {
    let filled = if max > 0.0 {
        // Clamped to [0, width] below
        ((value / max) * width as f64).max(0.0) as usize
    } else {
        0
    };
    let filled = filled.min(width);

    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

/// Probability as a percentage with sensible precision
#[must_use]
pub fn format_probability(p: f64) -> String {
    let pct = p * 100.0;
    if pct > 0.0 && pct < 0.1 {
        "<0.1%".to_string()
    } else {
        format!("{pct:.1}%")
    }
}

/// Byte count in the largest fitting unit
#[must_use]
pub fn format_bytes(bytes: usize) -> String {
    const UNITS: [&str; 4] = ["B", "KiB", "MiB", "GiB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{value:.1} {}", UNITS[unit])
    }
}
