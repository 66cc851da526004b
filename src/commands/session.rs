//! Game setup shared by the commands
//!
//! Loads a vocabulary and its priors, and folds observed feedback into the
//! candidate list.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow, bail};

use crate::core::{CandidatePool, Pattern, Priors, Trits, Vocabulary, Word};
use crate::wordlists::loader::{load_priors, load_words};
use crate::worker::Response;

/// One observed guess and its feedback
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Observation {
    pub guess: Word,
    pub feedback: Trits,
}

impl Observation {
    /// Parse `guess=feedback` or `guess:feedback`
    ///
    /// The feedback accepts digits (`20100`), letters (`G-Y--`) or emoji.
    ///
    /// # Errors
    /// If either half is invalid or their lengths differ.
    pub fn parse(s: &str) -> Result<Self> {
        let (guess, feedback) = s
            .split_once(['=', ':'])
            .ok_or_else(|| anyhow!("expected 'guess=feedback', got '{s}'"))?;
        let guess = Word::new(guess).with_context(|| format!("bad guess in '{s}'"))?;
        let feedback = Trits::parse(feedback).with_context(|| format!("bad feedback in '{s}'"))?;
        if feedback.len() != guess.len() {
            bail!(
                "feedback '{feedback}' has {} positions, guess '{guess}' has {}",
                feedback.len(),
                guess.len()
            );
        }
        Ok(Self { guess, feedback })
    }
}

/// A vocabulary, its priors and the dataset name used for caching
#[derive(Debug, Clone)]
pub struct Session {
    pub dataset: String,
    pub vocab: Arc<Vocabulary>,
    pub priors: Priors,
}

impl Session {
    /// Load a session from files
    ///
    /// The dataset name defaults to the word list's file stem.
    ///
    /// # Errors
    /// If a file cannot be loaded or the words do not share one length.
    pub fn load(words: &Path, priors: Option<&Path>, dataset: Option<&str>) -> Result<Self> {
        let vocab = Vocabulary::new(load_words(words)?)
            .with_context(|| format!("building vocabulary from {}", words.display()))?;
        let priors = priors.map(load_priors).transpose()?.unwrap_or_default();
        let dataset = dataset.map_or_else(
            || {
                words
                    .file_stem()
                    .map_or_else(|| "default".to_string(), |s| s.to_string_lossy().into_owned())
            },
            str::to_string,
        );
        Ok(Self::new(dataset, vocab, priors))
    }

    #[must_use]
    pub fn new(dataset: impl Into<String>, vocab: Vocabulary, priors: Priors) -> Self {
        Self {
            dataset: dataset.into(),
            vocab: Arc::new(vocab),
            priors,
        }
    }

    #[must_use]
    pub fn word_len(&self) -> usize {
        self.vocab.word_len()
    }

    /// Parse a word and check it fits this vocabulary
    ///
    /// # Errors
    /// If the word is invalid or has the wrong length.
    pub fn word(&self, text: &str) -> Result<Word> {
        let word = Word::new(text).with_context(|| format!("bad word '{text}'"))?;
        if word.len() != self.word_len() {
            bail!(
                "'{word}' has {} letters, the vocabulary uses {}",
                word.len(),
                self.word_len()
            );
        }
        Ok(word)
    }

    /// Candidates consistent with every observation
    ///
    /// # Errors
    /// If an observation has the wrong length.
    pub fn candidates(&self, history: &[Observation]) -> Result<Vec<Word>> {
        let folded = history
            .iter()
            .map(|o| {
                self.word(o.guess.text())?;
                Ok((o.guess.clone(), Pattern::encode(&o.feedback)))
            })
            .collect::<Result<Vec<_>>>()?;
        let pool = CandidatePool::from_history(Arc::clone(&self.vocab), &folded);
        Ok(pool.alive_words().into_iter().cloned().collect())
    }
}

/// Turn a worker error response into an `anyhow` error
///
/// # Errors
/// If `response` is [`Response::Error`].
pub fn check(response: Response) -> Result<Response> {
    match response {
        Response::Error { message, stack } => {
            let err = anyhow!(message);
            Err(match stack {
                Some(stack) => err.context(stack),
                None => err,
            })
        }
        other => Ok(other),
    }
}

/// Error for a response of the wrong kind
#[must_use]
pub fn unexpected(response: &Response) -> anyhow::Error {
    anyhow!("unexpected worker response '{}'", response.name())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Session {
        let vocab = Vocabulary::from_strs(&["cigar", "civic", "crane", "slate"]).unwrap();
        Session::new("test", vocab, Priors::new())
    }

    #[test]
    fn observation_notations() {
        let a = Observation::parse("crane=20100").unwrap();
        let b = Observation::parse("CRANE:G-Y--").unwrap();
        assert_eq!(a, b);
        assert!(Observation::parse("crane").is_err());
        assert!(Observation::parse("crane=201").is_err());
        assert!(Observation::parse("cr4ne=20100").is_err());
    }

    #[test]
    fn candidates_follow_history() {
        let s = session();
        assert_eq!(s.candidates(&[]).unwrap().len(), 4);
        // civic against cigar
        let history = [Observation::parse("civic=22000").unwrap()];
        let left = s.candidates(&history).unwrap();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].text(), "cigar");
    }

    #[test]
    fn wrong_length_history_is_rejected() {
        let s = session();
        let history = [Observation::parse("cranes=000000").unwrap()];
        assert!(s.candidates(&history).is_err());
        assert!(s.word("abc").is_err());
    }

    #[test]
    fn load_names_the_dataset_after_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("five.txt");
        std::fs::write(&path, "crane\nslate\n").unwrap();
        let s = Session::load(&path, None, None).unwrap();
        assert_eq!(s.dataset, "five");
        assert_eq!(s.vocab.len(), 2);
        let s = Session::load(&path, None, Some("en")).unwrap();
        assert_eq!(s.dataset, "en");
    }

    #[test]
    fn error_responses_become_errors() {
        assert!(check(Response::error("nope")).is_err());
        assert!(check(Response::Canceled).is_ok());
    }
}
