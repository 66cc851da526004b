//! Suggest command
//!
//! Ranks the next guess for the current game state on the worker.

use anyhow::Result;
use tracing::info;

use super::session::{Observation, Session, check, unexpected};
use crate::solver::{ScoreOptions, Suggestion};
use crate::worker::{Request, Response, ScoreRequest, WorkerClient};

/// Game state for one suggestion
#[derive(Debug, Clone)]
pub struct SuggestConfig {
    pub history: Vec<Observation>,
    pub attempts_max: u32,
    pub options: ScoreOptions,
}

impl Default for SuggestConfig {
    fn default() -> Self {
        Self {
            history: Vec::new(),
            attempts_max: 6,
            options: ScoreOptions::default(),
        }
    }
}

impl SuggestConfig {
    /// Attempts left after the observed guesses
    #[must_use]
    pub fn attempts_left(&self) -> u32 {
        self.attempts_max
            .saturating_sub(u32::try_from(self.history.len()).unwrap_or(u32::MAX))
    }
}

/// What a suggest run produced
#[derive(Debug, Clone)]
pub enum SuggestOutcome {
    Ranked {
        candidates: usize,
        suggestions: Vec<Suggestion>,
    },
    /// The game is already decided
    Solved { answer: String },
    /// No candidate fits the history
    Contradiction,
    Canceled,
}

/// Score the candidates left by `config.history`
///
/// # Errors
/// Invalid history or a worker error.
pub fn run_suggest(
    client: &WorkerClient,
    session: &Session,
    config: &SuggestConfig,
    on_progress: impl FnMut(f64) + Send + 'static,
) -> Result<SuggestOutcome> {
    if let Some(last) = config.history.last()
        && last.feedback.is_solved()
    {
        return Ok(SuggestOutcome::Solved {
            answer: last.guess.text().to_string(),
        });
    }

    let candidates = session.candidates(&config.history)?;
    info!(
        candidates = candidates.len(),
        observations = config.history.len(),
        "suggesting"
    );
    if candidates.is_empty() {
        return Ok(SuggestOutcome::Contradiction);
    }

    let count = candidates.len();
    let request = Request::Score(ScoreRequest {
        words: candidates,
        priors: session.priors.clone(),
        attempts_left: config.attempts_left(),
        attempts_max: config.attempts_max,
        options: config.options.clone(),
    });

    match check(client.call_with_progress(request, on_progress).wait())? {
        Response::Result { suggestions } => Ok(SuggestOutcome::Ranked {
            candidates: count,
            suggestions,
        }),
        Response::Canceled => Ok(SuggestOutcome::Canceled),
        other => Err(unexpected(&other)),
    }
}
