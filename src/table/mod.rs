//! Pattern tables
//!
//! Precomputed feedback rows for seed guesses, the binary asset they ship in,
//! and the tiered cache that resolves any guess's row.

pub mod accel;
pub mod builder;
pub mod cache;
pub mod format;
pub mod lru;
pub mod store;

pub use accel::{AccelError, ParallelEvaluator, RowEvaluator};
pub use builder::{build_table, select_seeds};
pub use cache::{
    AssetSource, CacheConfig, CacheStats, DirAssets, NoAssets, PatternRow, PatternTableCache,
    Stage, TableMeta, TableSource,
};
pub use format::{Expectation, FormatError, MAX_TABLE_LEN, PatternTable, TableError};
pub use store::{DurableStore, FsStore, MemoryStore, StorageError, row_key};
