//! The worker thread
//!
//! Processes one request at a time. While a score job runs, the inbox is
//! drained at every progress tick: `cancel` and `dispose` take effect at the
//! next chunk boundary, a second `score` is rejected, and anything else waits
//! until the job is done.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};

use anyhow::{Context, Result, bail};
use crossbeam_channel::{Receiver, Sender};
use tracing::{debug, info, trace};

use super::protocol::{Envelope, Request, Response, ScoreRequest, Tier};
use crate::core::Word;
use crate::solver::{CancelToken, Canceled, ScoreInput, analyze_guess, letter_heatmap, score_guesses};
use crate::table::PatternTableCache;

/// Spawn the worker thread
///
/// The worker exits after answering `dispose`, when `terminate` is raised,
/// or when every request sender is dropped.
///
/// # Errors
/// If the OS refuses to spawn the thread.
pub fn spawn_worker(
    cache: PatternTableCache,
    inbox: Receiver<Envelope<Request>>,
    outbox: Sender<Envelope<Response>>,
    terminate: Arc<AtomicBool>,
) -> std::io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("wordle-assist-worker".into())
        .spawn(move || {
            Worker {
                cache,
                inbox,
                outbox,
                terminate,
                deferred: VecDeque::new(),
            }
            .run();
        })
}

struct Worker {
    cache: PatternTableCache,
    inbox: Receiver<Envelope<Request>>,
    outbox: Sender<Envelope<Response>>,
    terminate: Arc<AtomicBool>,
    deferred: VecDeque<Envelope<Request>>,
}

/// What the main loop does after a request
enum Next {
    Continue,
    Stop,
}

impl Worker {
    fn run(mut self) {
        debug!("worker started");
        loop {
            if self.terminate.load(Ordering::Acquire) {
                debug!("worker terminated");
                break;
            }
            let envelope = match self.deferred.pop_front() {
                Some(envelope) => envelope,
                None => match self.inbox.recv() {
                    Ok(envelope) => envelope,
                    Err(_) => break,
                },
            };
            if matches!(self.handle(envelope), Next::Stop) {
                break;
            }
        }
        debug!("worker stopped");
    }

    fn reply(&self, id: u64, body: Response) {
        trace!(id, response = body.name(), "reply");
        // The client may already be gone
        let _ = self.outbox.send(Envelope { id, body });
    }

    fn handle(&mut self, envelope: Envelope<Request>) -> Next {
        let Envelope { id, body } = envelope;
        debug!(id, request = body.name(), "request");
        match body {
            Request::Score(request) => return self.run_score(id, &request),
            Request::Dispose => {
                self.reply(id, Response::Disposed);
                return Next::Stop;
            }
            // Nothing is running
            Request::Cancel => {}
            other => {
                let response = self.answer(id, other).unwrap_or_else(|e| Response::Error {
                    message: e.to_string(),
                    stack: Some(format!("{e:?}")),
                });
                self.reply(id, response);
            }
        }
        Next::Continue
    }

    /// Requests that finish in one step
    fn answer(&self, id: u64, request: Request) -> Result<Response> {
        Ok(match request {
            Request::Warmup => Response::Warmed {
                threads: rayon::current_num_threads(),
            },
            Request::AnalyzeHeatmap { words, priors } => {
                uniform_length(&words)?;
                Response::Heatmap(letter_heatmap(&words, &priors))
            }
            Request::AnalyzeGuess {
                guess,
                words,
                priors,
            } => Response::GuessAnalysis(
                analyze_guess(&guess, &words, &priors).context("analyze:guess")?,
            ),
            Request::PtabEnsure { dataset, vocab } => {
                let meta = self.cache.ensure(&dataset, &vocab, &mut |stage| {
                    self.reply(id, Response::Progress { p: stage.fraction() });
                });
                Response::TableReady(meta)
            }
            Request::PtabStats => Response::TableStats(self.cache.stats()),
            Request::PtabClearMemory => {
                self.cache.clear_memory();
                Response::Cleared {
                    tier: Tier::Memory,
                    ok: true,
                }
            }
            Request::PtabClearStore => Response::Cleared {
                tier: Tier::Store,
                ok: self.cache.clear_store(),
            },
            Request::PtabRow {
                dataset,
                vocab,
                guess,
            } => {
                if guess.len() != vocab.word_len() {
                    bail!(
                        "guess '{guess}' has length {}, vocabulary has {}",
                        guess.len(),
                        vocab.word_len()
                    );
                }
                Response::Row(self.cache.row(&dataset, &vocab, &guess))
            }
            other @ (Request::Score(_) | Request::Cancel | Request::Dispose) => {
                bail!("{} is not a one-step request", other.name())
            }
        })
    }

    fn run_score(&mut self, id: u64, request: &ScoreRequest) -> Next {
        if let Err(e) = uniform_length(&request.words) {
            self.reply(id, Response::error(e));
            return Next::Continue;
        }

        let token = CancelToken::new();
        let mut dispose_id = None;
        let input = ScoreInput {
            words: &request.words,
            priors: &request.priors,
            attempts_left: request.attempts_left,
            attempts_max: request.attempts_max,
        };

        let Self {
            inbox,
            outbox,
            terminate,
            deferred,
            ..
        } = self;
        let mut on_progress = |p: f64| {
            let _ = outbox.send(Envelope {
                id,
                body: Response::Progress { p },
            });
            if terminate.load(Ordering::Acquire) {
                token.cancel();
            }
            while let Ok(next) = inbox.try_recv() {
                match next.body {
                    Request::Cancel => {
                        debug!(id, "score job canceled");
                        token.cancel();
                    }
                    Request::Score(_) => {
                        debug!(id, rejected = next.id, "score job already running");
                        let _ = outbox.send(Envelope {
                            id: next.id,
                            body: Response::error("a score job is already running"),
                        });
                    }
                    Request::Dispose => {
                        token.cancel();
                        dispose_id = Some(next.id);
                    }
                    _ => deferred.push_back(next),
                }
            }
        };

        let outcome = score_guesses(&input, &request.options, &token, &mut on_progress);
        let response = match outcome {
            Ok(suggestions) => {
                info!(id, suggestions = suggestions.len(), "score job finished");
                Response::Result { suggestions }
            }
            Err(Canceled) => Response::Canceled,
        };
        self.reply(id, response);

        match dispose_id {
            Some(dispose) => {
                self.reply(dispose, Response::Disposed);
                Next::Stop
            }
            None => Next::Continue,
        }
    }
}

fn uniform_length(words: &[Word]) -> Result<()> {
    if let Some(first) = words.first()
        && let Some(odd) = words.iter().find(|w| w.len() != first.len())
    {
        bail!(
            "candidate words must share one length: '{first}' has {}, '{odd}' has {}",
            first.len(),
            odd.len()
        );
    }
    Ok(())
}
