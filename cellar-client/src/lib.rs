//! Data-plane client for Bigtable-compatible wide-column table stores.
//!
//! A [`Client`] addresses one project/instance pair and vends cheap
//! [`Table`] handles. Reads stream rows through a resumable retry loop that
//! shrinks the outstanding selection past already-delivered rows; writes go
//! through single-row apply, the bulk orchestrator, or read-modify-write.
//!
//! ```no_run
//! use cellar_client::{Client, Mutation, RowRange, Timestamp};
//!
//! # async fn example() -> cellar_client::Result<()> {
//! let client = Client::connect("my-project", "my-instance").await?;
//! let table = client.open("events");
//!
//! table
//!     .apply(
//!         "event#1",
//!         Mutation::new().set_cell("cf", "payload", Timestamp::now(), "hello"),
//!     )
//!     .await?;
//!
//! table
//!     .read_rows(RowRange::prefix("event#"))
//!     .limit(10)
//!     .run(|row| {
//!         println!("{:?}", row.key());
//!         true
//!     })
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod error;
pub mod read;
pub mod retry;
pub mod table;
pub mod transport;

mod bulk;

pub use client::{Client, ClientConfig, MTLS_PROD_ENDPOINT, PROD_ENDPOINT};
pub use error::{Error, Result};
pub use read::ReadRows;
pub use retry::{Backoff, RetryPolicy};
pub use table::Table;
pub use transport::{DataTransport, GrpcTransport, MessageStream};

// The model types callers hold while talking to a table.
pub use cellar_core::{
    Filter, FullReadStats, Mutation, ReadItem, ReadModifyWrite, Row, RowList, RowRange,
    RowRangeList, RowSet, Timestamp,
};
