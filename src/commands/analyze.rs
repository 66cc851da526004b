//! Analysis commands
//!
//! Explain a guess, show where letters sit among the candidates, or compute
//! the feedback between two words.

use anyhow::{Context, Result};

use super::session::{Observation, Session, check, unexpected};
use crate::core::{Trits, Word, feedback};
use crate::solver::{GuessAnalysis, LetterHeatmap};
use crate::worker::{Request, Response, WorkerClient};

/// Break down what `guess` would reveal about the remaining candidates
///
/// # Errors
/// Invalid input or a worker error.
pub fn analyze_word(
    client: &WorkerClient,
    session: &Session,
    guess: &str,
    history: &[Observation],
) -> Result<GuessAnalysis> {
    let guess = session.word(guess)?;
    let words = session.candidates(history)?;
    let request = Request::AnalyzeGuess {
        guess,
        words,
        priors: session.priors.clone(),
    };
    match check(client.call(request).wait())? {
        Response::GuessAnalysis(analysis) => Ok(analysis),
        other => Err(unexpected(&other)),
    }
}

/// Letter mass per position over the remaining candidates
///
/// # Errors
/// Invalid history or a worker error.
pub fn letter_heatmap(
    client: &WorkerClient,
    session: &Session,
    history: &[Observation],
) -> Result<LetterHeatmap> {
    let request = Request::AnalyzeHeatmap {
        words: session.candidates(history)?,
        priors: session.priors.clone(),
    };
    match check(client.call(request).wait())? {
        Response::Heatmap(heatmap) => Ok(heatmap),
        other => Err(unexpected(&other)),
    }
}

/// Feedback `guess` would receive if `secret` were the answer
///
/// # Errors
/// Invalid words or a length mismatch.
pub fn feedback_between(guess: &str, secret: &str) -> Result<Trits> {
    let guess = Word::new(guess).with_context(|| format!("bad guess '{guess}'"))?;
    let secret = Word::new(secret).with_context(|| format!("bad secret '{secret}'"))?;
    Ok(feedback(&guess, &secret)?)
}
