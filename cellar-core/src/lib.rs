//! Transport-free data model and algorithms for the Cellar data-plane
//! client: row selections and their narrowing arithmetic, the chunk-reader
//! state machine, mutation builders with idempotency classification, filters,
//! and timestamps.

pub mod error;
pub mod filter;
pub mod mutation;
pub mod reader;
pub mod row;
pub mod rowset;
pub mod stats;
pub mod timestamp;

pub use error::{Error, Result};
pub use filter::Filter;
pub use mutation::{mutations_are_retryable, CondMutation, Mutation, ReadModifyWrite, MAX_MUTATIONS};
pub use reader::{ChunkReader, ScanDirection};
pub use row::{ReadItem, Row};
pub use rowset::{prefix_successor, RowList, RowRange, RowRangeList, RowSet};
pub use stats::{FullReadStats, ReadIterationStats, RequestLatencyStats};
pub use timestamp::Timestamp;
