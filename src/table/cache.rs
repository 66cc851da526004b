//! Tiered pattern-row cache
//!
//! A row is resolved through, in order:
//!
//! 1. the precomputed asset (seed guesses only),
//! 2. the byte-budgeted memory LRU,
//! 3. the durable store,
//! 4. computation, written back to 2 and 3.
//!
//! Concurrent misses on one key share a single computation. Failures in any
//! tier only ever turn into a miss.

use std::io;
use std::mem;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use tracing::{debug, warn};

use super::accel::RowEvaluator;
use super::format::{Expectation, MAX_TABLE_LEN, PatternTable};
use super::lru::{ByteLru, ByteSize};
use super::store::{DurableStore, StorageError, row_key};
use crate::core::{Pattern, Trits, Vocabulary, Word, pattern_between};

/// Cache tuning
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Resident bytes allowed in the memory tier
    pub memory_budget_bytes: usize,
    /// Longest word handed to the accelerated evaluator
    pub accel_max_len: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            memory_budget_bytes: 32 * 1024 * 1024,
            accel_max_len: MAX_TABLE_LEN,
        }
    }
}

/// Feedback codes of one guess against a whole vocabulary
#[derive(Debug, Clone)]
pub enum PatternRow {
    /// View into a loaded asset
    Seed { table: Arc<PatternTable>, row: usize },
    /// Packed codes, words of at most ten letters
    Packed(Arc<[u16]>),
    /// Full patterns for longer words
    Wide(Arc<[Pattern]>),
}

const TAG_PACKED: u8 = 0;
const TAG_WIDE: u8 = 1;

impl PatternRow {
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Seed { table, .. } => table.vocab_len(),
            Self::Packed(codes) => codes.len(),
            Self::Wide(patterns) => patterns.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Packed codes, unless this is a wide row
    #[must_use]
    pub fn codes(&self) -> Option<&[u16]> {
        match self {
            Self::Seed { table, row } => Some(table.row(*row)),
            Self::Packed(codes) => Some(codes),
            Self::Wide(_) => None,
        }
    }

    /// Pattern against the vocabulary word at `index`
    ///
    /// # Panics
    /// If `index` is out of range.
    #[must_use]
    pub fn pattern(&self, index: usize) -> Pattern {
        match self {
            Self::Wide(patterns) => patterns[index].clone(),
            _ => {
                let codes = self.codes().unwrap_or_default();
                Pattern::Code(u64::from(codes[index]))
            }
        }
    }

    #[must_use]
    pub fn trits(&self, index: usize, word_len: usize) -> Trits {
        self.pattern(index).decode(word_len)
    }

    /// True when both rows hold the same allocation
    #[must_use]
    pub fn shares_storage(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Seed { table: a, row: x }, Self::Seed { table: b, row: y }) => {
                Arc::ptr_eq(a, b) && x == y
            }
            (Self::Packed(a), Self::Packed(b)) => Arc::ptr_eq(a, b),
            (Self::Wide(a), Self::Wide(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Durable encoding: tag, vocabulary hash, then the row
    fn encode(&self, vocab_hash: u32, word_len: usize) -> Vec<u8> {
        let mut out = Vec::with_capacity(5 + self.byte_size());
        if let Some(codes) = self.codes() {
            out.push(TAG_PACKED);
            out.extend_from_slice(&vocab_hash.to_le_bytes());
            for code in codes {
                out.extend_from_slice(&code.to_le_bytes());
            }
        } else {
            out.push(TAG_WIDE);
            out.extend_from_slice(&vocab_hash.to_le_bytes());
            for i in 0..self.len() {
                out.extend(self.trits(i, word_len).as_slice().iter().map(|t| b'0' + t));
            }
        }
        out
    }

    fn decode(bytes: &[u8], vocab_hash: u32, word_len: usize, vocab_len: usize) -> Option<Self> {
        let (&tag, rest) = bytes.split_first()?;
        let (hash, body) = rest.split_first_chunk::<4>()?;
        if u32::from_le_bytes(*hash) != vocab_hash {
            return None;
        }
        match tag {
            TAG_PACKED if body.len() == vocab_len * 2 => Some(Self::Packed(
                body.chunks_exact(2)
                    .map(|c| u16::from_le_bytes([c[0], c[1]]))
                    .collect(),
            )),
            TAG_WIDE if body.len() == vocab_len * word_len => {
                if body.iter().any(|&b| !(b'0'..=b'2').contains(&b)) {
                    return None;
                }
                let mut trits = vec![0u8; word_len];
                Some(Self::Wide(
                    body.chunks_exact(word_len)
                        .map(|chunk| {
                            for (t, &b) in trits.iter_mut().zip(chunk) {
                                *t = b - b'0';
                            }
                            Pattern::from_slice(&trits)
                        })
                        .collect(),
                ))
            }
            _ => None,
        }
    }
}

impl ByteSize for PatternRow {
    fn byte_size(&self) -> usize {
        match self {
            Self::Seed { .. } => 0,
            Self::Packed(codes) => codes.len() * 2,
            Self::Wide(patterns) => patterns
                .iter()
                .map(|p| {
                    mem::size_of::<Pattern>()
                        + match p {
                            Pattern::Code(_) => 0,
                            Pattern::Digits(d) => d.len(),
                        }
                })
                .sum(),
        }
    }
}

/// Asset acquisition stages, always reported in this order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    Download,
    Verify,
    Parse,
    Ready,
}

impl Stage {
    pub const ALL: [Self; 4] = [Self::Download, Self::Verify, Self::Parse, Self::Ready];

    /// Progress fraction once this stage is done
    #[must_use]
    pub fn fraction(self) -> f64 {
        match self {
            Self::Download => 0.25,
            Self::Verify => 0.5,
            Self::Parse => 0.75,
            Self::Ready => 1.0,
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Download => "download",
            Self::Verify => "verify",
            Self::Parse => "parse",
            Self::Ready => "ready",
        }
    }
}

/// Where a (dataset, length) gets its rows from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableSource {
    /// A validated asset covers the seed guesses
    Asset,
    /// Every row is computed on demand
    Compute,
}

/// Outcome of [`PatternTableCache::ensure`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableMeta {
    pub dataset: String,
    pub word_len: usize,
    pub vocab_len: usize,
    pub vocab_hash: u32,
    pub source: TableSource,
    pub seeds: usize,
    pub asset_bytes: usize,
}

/// Counters and residency of the cache
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub asset_hits: u64,
    pub memory_hits: u64,
    pub store_hits: u64,
    pub computes: u64,
    pub accel_computes: u64,
    pub accel_fallbacks: u64,
    pub store_errors: u64,
    pub memory_entries: usize,
    pub memory_bytes: usize,
    pub memory_budget: usize,
    pub tables_loaded: usize,
}

/// Where precomputed assets come from
pub trait AssetSource: Send + Sync {
    /// Raw asset bytes, `None` if there is no asset
    ///
    /// # Errors
    /// Transport failures; the cache treats them like a missing asset.
    fn fetch(&self, dataset: &str, word_len: usize) -> io::Result<Option<Vec<u8>>>;
}

/// Assets read from `<dir>/<dataset>-<L>.ptab`
#[derive(Debug, Clone)]
pub struct DirAssets {
    dir: PathBuf,
}

impl DirAssets {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn path_for(&self, dataset: &str, word_len: usize) -> PathBuf {
        self.dir.join(format!("{dataset}-{word_len}.ptab"))
    }
}

impl AssetSource for DirAssets {
    fn fetch(&self, dataset: &str, word_len: usize) -> io::Result<Option<Vec<u8>>> {
        match std::fs::read(self.path_for(dataset, word_len)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }
}

/// No assets at all
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAssets;

impl AssetSource for NoAssets {
    fn fetch(&self, _dataset: &str, _word_len: usize) -> io::Result<Option<Vec<u8>>> {
        Ok(None)
    }
}

/// Per (dataset, length) state, replaced when the vocabulary changes
struct LengthState {
    vocab_hash: u32,
    table: Option<Arc<PatternTable>>,
    meta: TableMeta,
}

#[derive(Default)]
struct Counters {
    asset_hits: AtomicU64,
    memory_hits: AtomicU64,
    store_hits: AtomicU64,
    computes: AtomicU64,
    accel_computes: AtomicU64,
    accel_fallbacks: AtomicU64,
    store_errors: AtomicU64,
}

fn bump(counter: &AtomicU64) {
    counter.fetch_add(1, Ordering::Relaxed);
}

type Pending = Arc<OnceLock<PatternRow>>;

/// Owns every cache tier
pub struct PatternTableCache {
    config: CacheConfig,
    assets: Box<dyn AssetSource>,
    store: Option<Box<dyn DurableStore>>,
    evaluator: Option<Box<dyn RowEvaluator>>,
    memory: Mutex<ByteLru<String, PatternRow>>,
    pending: Mutex<FxHashMap<String, Pending>>,
    states: Mutex<FxHashMap<(String, usize), Arc<LengthState>>>,
    counters: Counters,
}

impl std::fmt::Debug for PatternTableCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PatternTableCache")
            .field("config", &self.config)
            .field("has_store", &self.store.is_some())
            .field("has_evaluator", &self.evaluator.is_some())
            .finish_non_exhaustive()
    }
}

impl PatternTableCache {
    /// Memory tier and computation only
    #[must_use]
    pub fn new(config: CacheConfig) -> Self {
        Self {
            memory: Mutex::new(ByteLru::new(config.memory_budget_bytes)),
            config,
            assets: Box::new(NoAssets),
            store: None,
            evaluator: None,
            pending: Mutex::new(FxHashMap::default()),
            states: Mutex::new(FxHashMap::default()),
            counters: Counters::default(),
        }
    }

    #[must_use]
    pub fn with_assets(mut self, assets: impl AssetSource + 'static) -> Self {
        self.assets = Box::new(assets);
        self
    }

    #[must_use]
    pub fn with_store(mut self, store: impl DurableStore + 'static) -> Self {
        self.store = Some(Box::new(store));
        self
    }

    #[must_use]
    pub fn with_evaluator(mut self, evaluator: impl RowEvaluator + 'static) -> Self {
        self.evaluator = Some(Box::new(evaluator));
        self
    }

    #[must_use]
    pub const fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Load (or reuse) the asset for `vocab`, reporting every stage
    ///
    /// A missing, unreadable or mismatched asset still reports all four
    /// stages; only the returned metadata tells the difference.
    pub fn ensure(
        &self,
        dataset: &str,
        vocab: &Vocabulary,
        on_stage: &mut dyn FnMut(Stage),
    ) -> TableMeta {
        let state = self.state_for(dataset, vocab, on_stage);
        state.meta.clone()
    }

    fn state_for(
        &self,
        dataset: &str,
        vocab: &Vocabulary,
        on_stage: &mut dyn FnMut(Stage),
    ) -> Arc<LengthState> {
        let key = (dataset.to_string(), vocab.word_len());
        let vocab_hash = vocab.hash32();

        let existing = self.states.lock().get(&key).cloned();
        if let Some(state) = existing
            && state.vocab_hash == vocab_hash
        {
            for stage in Stage::ALL {
                on_stage(stage);
            }
            return state;
        }

        let state = Arc::new(self.load_state(dataset, vocab, vocab_hash, on_stage));
        self.states.lock().insert(key, Arc::clone(&state));
        state
    }

    fn load_state(
        &self,
        dataset: &str,
        vocab: &Vocabulary,
        vocab_hash: u32,
        on_stage: &mut dyn FnMut(Stage),
    ) -> LengthState {
        let word_len = vocab.word_len();

        let bytes = match self.assets.fetch(dataset, word_len) {
            Ok(bytes) => bytes,
            Err(e) => {
                debug!(dataset, word_len, error = %e, "asset fetch failed");
                None
            }
        };
        on_stage(Stage::Download);

        let asset_bytes = bytes.as_ref().map_or(0, Vec::len);
        let expectation = Expectation {
            word_len,
            vocab_len: vocab.len(),
            vocab_hash,
        };
        let parsed = bytes.and_then(|b| match PatternTable::parse(&b, &expectation) {
            Ok(table) => Some(table),
            Err(e) => {
                debug!(dataset, word_len, error = %e, "asset rejected");
                None
            }
        });
        on_stage(Stage::Verify);

        let table = parsed.map(Arc::new);
        on_stage(Stage::Parse);

        let meta = TableMeta {
            dataset: dataset.to_string(),
            word_len,
            vocab_len: vocab.len(),
            vocab_hash,
            source: if table.is_some() {
                TableSource::Asset
            } else {
                TableSource::Compute
            },
            seeds: table.as_ref().map_or(0, |t| t.seeds().len()),
            asset_bytes: if table.is_some() { asset_bytes } else { 0 },
        };
        debug!(dataset, word_len, source = ?meta.source, seeds = meta.seeds, "table state ready");
        on_stage(Stage::Ready);

        LengthState {
            vocab_hash,
            table,
            meta,
        }
    }

    /// Feedback row of `guess` against every word of `vocab`
    ///
    /// # Panics
    /// If the guess length differs from the vocabulary's.
    pub fn row(&self, dataset: &str, vocab: &Vocabulary, guess: &Word) -> PatternRow {
        assert_eq!(
            guess.len(),
            vocab.word_len(),
            "guess length does not match vocabulary"
        );
        let state = self.state_for(dataset, vocab, &mut |_| {});

        if let Some(table) = &state.table
            && let Some(row) = vocab.index_of(guess.text()).and_then(|i| table.seed_row(i))
        {
            bump(&self.counters.asset_hits);
            return PatternRow::Seed {
                table: Arc::clone(table),
                row,
            };
        }

        let key = row_key(dataset, vocab.word_len(), guess.text());
        let memory_key = format!("{key}#{:08x}", state.vocab_hash);
        if let Some(row) = self.memory_lookup(&memory_key) {
            return row;
        }

        let cell = Arc::clone(self.pending.lock().entry(memory_key.clone()).or_default());
        let row = cell
            .get_or_init(|| self.resolve_miss(&key, &memory_key, state.vocab_hash, vocab, guess))
            .clone();

        let mut pending = self.pending.lock();
        if pending
            .get(&memory_key)
            .is_some_and(|current| Arc::ptr_eq(current, &cell))
        {
            pending.remove(&memory_key);
        }
        row
    }

    fn memory_lookup(&self, memory_key: &str) -> Option<PatternRow> {
        let row = self.memory.lock().get(memory_key).cloned()?;
        bump(&self.counters.memory_hits);
        Some(row)
    }

    fn resolve_miss(
        &self,
        key: &str,
        memory_key: &str,
        vocab_hash: u32,
        vocab: &Vocabulary,
        guess: &Word,
    ) -> PatternRow {
        // Another caller may have finished between our lookup and the pending entry
        if let Some(row) = self.memory_lookup(memory_key) {
            return row;
        }

        if let Some(row) = self.store_lookup(key, vocab_hash, vocab) {
            bump(&self.counters.store_hits);
            self.remember(memory_key, &row);
            return row;
        }

        let row = self.compute(vocab, guess);
        bump(&self.counters.computes);
        self.remember(memory_key, &row);
        if let Some(store) = &self.store
            && let Err(e) = store.put(key, &row.encode(vocab_hash, vocab.word_len()))
        {
            self.store_failed(key, &e);
        }
        row
    }

    fn store_lookup(&self, key: &str, vocab_hash: u32, vocab: &Vocabulary) -> Option<PatternRow> {
        let store = self.store.as_ref()?;
        let bytes = match store.get(key) {
            Ok(bytes) => bytes?,
            Err(e) => {
                self.store_failed(key, &e);
                return None;
            }
        };
        let row = PatternRow::decode(&bytes, vocab_hash, vocab.word_len(), vocab.len());
        if row.is_none() {
            debug!(key, "stored row is stale or corrupt");
        }
        row
    }

    fn store_failed(&self, key: &str, error: &StorageError) {
        bump(&self.counters.store_errors);
        warn!(key, %error, "durable store failed, treating as miss");
    }

    fn remember(&self, memory_key: &str, row: &PatternRow) {
        let evicted = self.memory.lock().put(memory_key.to_string(), row.clone());
        if evicted > 0 {
            debug!(evicted, "memory tier over budget");
        }
    }

    fn compute(&self, vocab: &Vocabulary, guess: &Word) -> PatternRow {
        let word_len = vocab.word_len();
        if let Some(evaluator) = &self.evaluator
            && word_len <= self.config.accel_max_len.min(evaluator.max_len())
        {
            match evaluator.evaluate(guess, vocab.words()) {
                Ok(codes) if codes.len() == vocab.len() => {
                    bump(&self.counters.accel_computes);
                    return PatternRow::Packed(codes.into());
                }
                Ok(codes) => {
                    debug!(got = codes.len(), want = vocab.len(), "accelerated row has wrong size");
                }
                Err(e) => debug!(error = %e, "accelerated row failed"),
            }
            bump(&self.counters.accel_fallbacks);
        }

        if word_len <= MAX_TABLE_LEN {
            PatternRow::Packed(
                vocab
                    .words()
                    .iter()
                    .map(|secret| pattern_between(guess, secret).code().unwrap_or_default() as u16)
                    .collect(),
            )
        } else {
            PatternRow::Wide(
                vocab
                    .words()
                    .iter()
                    .map(|secret| pattern_between(guess, secret))
                    .collect(),
            )
        }
    }

    #[must_use]
    pub fn stats(&self) -> CacheStats {
        let memory = self.memory.lock();
        let load = |c: &AtomicU64| c.load(Ordering::Relaxed);
        CacheStats {
            asset_hits: load(&self.counters.asset_hits),
            memory_hits: load(&self.counters.memory_hits),
            store_hits: load(&self.counters.store_hits),
            computes: load(&self.counters.computes),
            accel_computes: load(&self.counters.accel_computes),
            accel_fallbacks: load(&self.counters.accel_fallbacks),
            store_errors: load(&self.counters.store_errors),
            memory_entries: memory.len(),
            memory_bytes: memory.bytes(),
            memory_budget: memory.budget(),
            tables_loaded: self
                .states
                .lock()
                .values()
                .filter(|s| s.table.is_some())
                .count(),
        }
    }

    /// Drop the memory tier
    pub fn clear_memory(&self) {
        self.memory.lock().clear();
        debug!("memory tier cleared");
    }

    /// Drop the durable tier; returns whether it was cleared
    pub fn clear_store(&self) -> bool {
        let Some(store) = &self.store else {
            return false;
        };
        match store.clear() {
            Ok(()) => {
                debug!("durable store cleared");
                true
            }
            Err(e) => {
                self.store_failed("*", &e);
                false
            }
        }
    }
}
