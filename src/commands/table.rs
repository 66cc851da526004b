//! Pattern-table commands
//!
//! Build assets offline and inspect the worker's cache.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;

use super::session::{Session, check, unexpected};
use crate::table::{CacheStats, DirAssets, PatternRow, TableMeta, build_table};
use crate::worker::{Request, Response, Tier, WorkerClient};

/// A freshly written asset
#[derive(Debug, Clone)]
pub struct BuiltTable {
    pub path: PathBuf,
    pub word_len: usize,
    pub vocab_len: usize,
    pub seeds: Vec<String>,
    pub bytes: usize,
}

/// Build the asset for `session` and write it as `<out_dir>/<dataset>-<L>.ptab`
///
/// # Errors
/// If the words are too long for the format or the file cannot be written.
pub fn build_table_file(session: &Session, seed_count: usize, out_dir: &Path) -> Result<BuiltTable> {
    let table = build_table(&session.vocab, &session.priors, seed_count)
        .with_context(|| format!("building table for dataset '{}'", session.dataset))?;

    fs::create_dir_all(out_dir).with_context(|| format!("creating {}", out_dir.display()))?;
    let path = DirAssets::new(out_dir).path_for(&session.dataset, session.word_len());
    let bytes = table.to_bytes();
    fs::write(&path, &bytes).with_context(|| format!("writing {}", path.display()))?;
    info!(path = %path.display(), bytes = bytes.len(), "table written");

    Ok(BuiltTable {
        path,
        word_len: table.word_len(),
        vocab_len: table.vocab_len(),
        seeds: table
            .seeds()
            .iter()
            .map(|&s| session.vocab.words()[s as usize].text().to_string())
            .collect(),
        bytes: bytes.len(),
    })
}

/// Cache operations exposed on the command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableAction {
    Ensure,
    Stats,
    Row { guess: String },
    ClearMemory,
    ClearStore,
}

/// Result of a [`TableAction`]
#[derive(Debug, Clone)]
pub enum TableOutcome {
    /// Metadata plus the stage fractions reported on the way
    Ready { meta: TableMeta, stages: Vec<f64> },
    Stats(CacheStats),
    Row { guess: String, row: PatternRow },
    Cleared { tier: Tier, ok: bool },
}

/// Run a cache operation on the worker
///
/// # Errors
/// Invalid input or a worker error.
pub fn run_table_action(
    client: &WorkerClient,
    session: &Session,
    action: &TableAction,
) -> Result<TableOutcome> {
    let outcome = match action {
        TableAction::Ensure => {
            let (tx, rx) = crossbeam_channel::unbounded();
            let call = client.call_with_progress(
                Request::PtabEnsure {
                    dataset: session.dataset.clone(),
                    vocab: session.vocab.clone(),
                },
                move |p| {
                    let _ = tx.send(p);
                },
            );
            let response = check(call.wait())?;
            let stages: Vec<f64> = rx.try_iter().collect();
            match response {
                Response::TableReady(meta) => TableOutcome::Ready { meta, stages },
                other => return Err(unexpected(&other)),
            }
        }
        TableAction::Stats => match check(client.call(Request::PtabStats).wait())? {
            Response::TableStats(stats) => TableOutcome::Stats(stats),
            other => return Err(unexpected(&other)),
        },
        TableAction::Row { guess } => {
            let request = Request::PtabRow {
                dataset: session.dataset.clone(),
                vocab: session.vocab.clone(),
                guess: session.word(guess)?,
            };
            match check(client.call(request).wait())? {
                Response::Row(row) => TableOutcome::Row {
                    guess: guess.to_ascii_lowercase(),
                    row,
                },
                other => return Err(unexpected(&other)),
            }
        }
        TableAction::ClearMemory | TableAction::ClearStore => {
            let request = if *action == TableAction::ClearMemory {
                Request::PtabClearMemory
            } else {
                Request::PtabClearStore
            };
            match check(client.call(request).wait())? {
                Response::Cleared { tier, ok } => TableOutcome::Cleared { tier, ok },
                other => return Err(unexpected(&other)),
            }
        }
    };
    Ok(outcome)
}
