//! Word list and prior loading
//!
//! Word lists are plain text, one word per line. Prior files hold one
//! `word weight` pair per line, separated by whitespace or a comma. Blank
//! lines and lines starting with `#` are ignored in both.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use tracing::debug;

use crate::core::{Priors, Word};

fn content_lines(content: &str) -> impl Iterator<Item = (usize, &str)> {
    content
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
}

/// Load words from a file, skipping entries that are not valid words
///
/// # Errors
/// If the file cannot be read or holds no valid word.
///
/// # Examples
/// ```no_run
/// use wordle_assist::wordlists::loader::load_words;
///
/// let words = load_words("data/words.txt").unwrap();
/// println!("Loaded {} words", words.len());
/// ```
pub fn load_words<P: AsRef<Path>>(path: P) -> Result<Vec<Word>> {
    let path = path.as_ref();
    let content =
        fs::read_to_string(path).with_context(|| format!("reading word list {}", path.display()))?;
    let words = parse_words(&content);
    if words.is_empty() {
        bail!("no valid words in {}", path.display());
    }
    debug!(path = %path.display(), words = words.len(), "word list loaded");
    Ok(words)
}

/// Words of a word-list text, skipping invalid entries
#[must_use]
pub fn parse_words(content: &str) -> Vec<Word> {
    let mut skipped = 0usize;
    let words: Vec<Word> = content_lines(content)
        .filter_map(|(_, line)| {
            let word = Word::new(line).ok();
            if word.is_none() {
                skipped += 1;
            }
            word
        })
        .collect();
    if skipped > 0 {
        debug!(skipped, "invalid word-list entries skipped");
    }
    words
}

/// Load a prior file
///
/// # Errors
/// If the file cannot be read or a line is malformed.
pub fn load_priors<P: AsRef<Path>>(path: P) -> Result<Priors> {
    let path = path.as_ref();
    let content =
        fs::read_to_string(path).with_context(|| format!("reading priors {}", path.display()))?;
    let priors = parse_priors(&content).with_context(|| format!("parsing {}", path.display()))?;
    debug!(path = %path.display(), entries = priors.len(), "priors loaded");
    Ok(priors)
}

/// Parse `word weight` lines
///
/// # Errors
/// If a line lacks a weight or the weight is not a number.
pub fn parse_priors(content: &str) -> Result<Priors> {
    let mut priors = Priors::new();
    for (line_no, line) in content_lines(content) {
        let mut parts = line
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|p| !p.is_empty());
        let (Some(word), Some(weight)) = (parts.next(), parts.next()) else {
            bail!("line {line_no}: expected 'word weight', got '{line}'");
        };
        let weight: f64 = weight
            .parse()
            .with_context(|| format!("line {line_no}: bad weight '{weight}'"))?;
        priors.insert(word.to_ascii_lowercase(), weight);
    }
    Ok(priors)
}

/// Convert string slices to words, skipping invalid ones
#[must_use]
pub fn words_from_slice(slice: &[&str]) -> Vec<Word> {
    slice.iter().filter_map(|&s| Word::new(s).ok()).collect()
}
