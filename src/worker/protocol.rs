//! Request/response messages exchanged with the worker
//!
//! Every message travels in an [`Envelope`] carrying the id of the call it
//! belongs to. Progress events reuse the id of the request that produced them.

use std::fmt;
use std::sync::Arc;

use crate::core::{Priors, Vocabulary, Word};
use crate::solver::{GuessAnalysis, LetterHeatmap, ScoreOptions, Suggestion};
use crate::table::{CacheStats, PatternRow, TableMeta};

#[derive(Debug, Clone)]
pub struct Envelope<T> {
    pub id: u64,
    pub body: T,
}

/// Everything needed for one scoring job
#[derive(Debug, Clone)]
pub struct ScoreRequest {
    pub words: Vec<Word>,
    pub priors: Priors,
    pub attempts_left: u32,
    pub attempts_max: u32,
    pub options: ScoreOptions,
}

/// Which cache tier a clear request emptied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Memory,
    Store,
}

#[derive(Debug, Clone)]
pub enum Request {
    Warmup,
    Score(ScoreRequest),
    /// Cancel the running score job, if any; never answered
    Cancel,
    Dispose,
    AnalyzeHeatmap {
        words: Vec<Word>,
        priors: Priors,
    },
    AnalyzeGuess {
        guess: Word,
        words: Vec<Word>,
        priors: Priors,
    },
    PtabEnsure {
        dataset: String,
        vocab: Arc<Vocabulary>,
    },
    PtabStats,
    PtabClearMemory,
    PtabClearStore,
    PtabRow {
        dataset: String,
        vocab: Arc<Vocabulary>,
        guess: Word,
    },
}

impl Request {
    /// Wire name of the request
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Warmup => "warmup",
            Self::Score(_) => "score",
            Self::Cancel => "cancel",
            Self::Dispose => "dispose",
            Self::AnalyzeHeatmap { .. } => "analyze:heatmap",
            Self::AnalyzeGuess { .. } => "analyze:guess",
            Self::PtabEnsure { .. } => "ptab:ensure",
            Self::PtabStats => "ptab:stats",
            Self::PtabClearMemory => "ptab:clearMemory",
            Self::PtabClearStore => "ptab:clearStore",
            Self::PtabRow { .. } => "ptab:row",
        }
    }
}

#[derive(Debug, Clone)]
pub enum Response {
    /// Fraction of the job done, in `[0, 1]`
    Progress { p: f64 },
    Result { suggestions: Vec<Suggestion> },
    Canceled,
    Error {
        message: String,
        stack: Option<String>,
    },
    Disposed,
    Warmed { threads: usize },
    Heatmap(LetterHeatmap),
    GuessAnalysis(GuessAnalysis),
    TableReady(TableMeta),
    TableStats(CacheStats),
    Cleared { tier: Tier, ok: bool },
    Row(PatternRow),
}

impl Response {
    /// Wire name of the response
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Progress { .. } => "progress",
            Self::Result { .. } => "result",
            Self::Canceled => "canceled",
            Self::Error { .. } => "error",
            Self::Disposed => "disposed",
            Self::Warmed { .. } => "warmed",
            Self::Heatmap(_) => "heatmap",
            Self::GuessAnalysis(_) => "guess-analysis",
            Self::TableReady(_) => "ptab:ready",
            Self::TableStats(_) => "ptab:stats",
            Self::Cleared { .. } => "ptab:cleared",
            Self::Row(_) => "ptab:row",
        }
    }

    /// Whether this ends the call it belongs to
    #[must_use]
    pub const fn is_final(&self) -> bool {
        !matches!(self, Self::Progress { .. })
    }

    pub(crate) fn error(message: impl fmt::Display) -> Self {
        Self::Error {
            message: message.to_string(),
            stack: None,
        }
    }
}
