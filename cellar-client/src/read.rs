//! The resumable row-streaming read path.

use bytes::Bytes;
use futures_util::StreamExt;
use tracing::debug;

use cellar_core::{ChunkReader, Filter, FullReadStats, Row, RowSet};
use cellar_proto::v2 as pb;

use crate::table::Table;
use crate::{Error, Result};

impl Table {
    /// Starts a streaming read over `rows`. Configure the returned builder,
    /// then drive it with [`ReadRows::run`] or [`ReadRows::collect`].
    ///
    /// By default every cell of every selected row is yielded; use
    /// [`ReadRows::filter`] to limit the cells returned.
    pub fn read_rows(&self, rows: impl Into<RowSet>) -> ReadRows<'_> {
        ReadRows {
            table: self,
            rows: rows.into(),
            filter: None,
            limit: None,
            reversed: false,
            stats_sink: None,
        }
    }

    /// Reads a single row; `Ok(None)` if it does not exist.
    pub async fn read_row(&self, key: impl Into<Bytes>) -> Result<Option<Row>> {
        let mut found = None;
        self.read_rows(RowSet::single_row(key))
            .limit(1)
            .run(|row| {
                found = Some(row);
                true
            })
            .await?;
        Ok(found)
    }
}

/// A configured streaming read, created by [`Table::read_rows`].
pub struct ReadRows<'a> {
    table: &'a Table,
    rows: RowSet,
    filter: Option<Filter>,
    limit: Option<i64>,
    reversed: bool,
    stats_sink: Option<Box<dyn FnMut(&FullReadStats) + Send + 'a>>,
}

impl<'a> ReadRows<'a> {
    /// Applies a server-side filter to the cells of each row.
    pub fn filter(mut self, filter: Filter) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Reads at most `limit` rows, counted across retries.
    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Streams rows in reverse lexicographic key order. Row ranges keep
    /// their forward orientation; only the delivery order flips. Useful for
    /// reading the last N rows before a key.
    pub fn reversed(mut self) -> Self {
        self.reversed = true;
        self
    }

    /// Requests the full server-side stats view and invokes `sink` with it,
    /// at most once per stream.
    pub fn full_read_stats(mut self, sink: impl FnMut(&FullReadStats) + Send + 'a) -> Self {
        self.stats_sink = Some(Box::new(sink));
        self
    }

    /// Runs the read, invoking `sink` once per row, serially, in key order
    /// (reverse order for reversed scans). Returning `false` from the sink
    /// stops the read early and counts as success. The sink runs on the
    /// stream's task: blocking in it delays chunk processing and
    /// back-pressures the server.
    ///
    /// Transient stream failures are retried transparently; the outstanding
    /// selection shrinks past already-delivered rows first, so no row is
    /// yielded twice.
    pub async fn run<F>(self, mut sink: F) -> Result<()>
    where
        F: FnMut(Row) -> bool,
    {
        let ReadRows {
            table,
            mut rows,
            filter,
            limit,
            reversed,
            mut stats_sink,
        } = self;

        let filter_proto = filter.as_ref().map(Filter::to_proto);
        let stats_view = if stats_sink.is_some() {
            pb::read_rows_request::RequestStatsView::RequestStatsFull as i32
        } else {
            pb::read_rows_request::RequestStatsView::Unspecified as i32
        };

        let policy = table.retry_policy().clone();
        let mut backoff = policy.backoff();
        let mut remaining_limit = limit;
        let mut last_row_key: Option<Bytes> = None;

        loop {
            // An exhausted selection or limit means the read already
            // completed; issuing the RPC anyway would re-read the table,
            // because an empty row set means "all rows" on the wire.
            if !rows.is_valid() {
                return Ok(());
            }
            if matches!(remaining_limit, Some(n) if n <= 0) {
                return Ok(());
            }

            let request = pb::ReadRowsRequest {
                table_name: table.name().to_string(),
                app_profile_id: table.app_profile().to_string(),
                rows: Some(rows.to_proto()),
                filter: filter_proto.clone(),
                rows_limit: remaining_limit.unwrap_or(0),
                request_stats_view: stats_view,
                reversed,
            };

            let err: Error = match table.transport().read_rows(table.new_request(request)).await {
                Err(status) => status.into(),
                Ok(mut stream) => {
                    let mut reader = if reversed {
                        ChunkReader::reversed()
                    } else {
                        ChunkReader::new()
                    };

                    loop {
                        match stream.next().await {
                            None => {
                                // Natural EOF: the reader must be between
                                // rows, or the server broke framing.
                                reader.close()?;
                                return Ok(());
                            }
                            Some(Err(status)) => break status.into(),
                            Some(Ok(response)) => {
                                for chunk in response.chunks {
                                    if let Some(row) = reader.process(chunk)? {
                                        last_row_key = Some(row.key().clone());
                                        if let Some(n) = remaining_limit.as_mut() {
                                            *n -= 1;
                                        }
                                        if !sink(row) {
                                            // Voluntary stop: dropping the
                                            // stream cancels the RPC. Not an
                                            // error.
                                            return Ok(());
                                        }
                                    }
                                }
                                if !response.last_scanned_row_key.is_empty() {
                                    last_row_key =
                                        Some(Bytes::from(response.last_scanned_row_key));
                                }
                                if let (Some(stats), Some(stats_sink)) =
                                    (response.request_stats.as_ref(), stats_sink.as_mut())
                                {
                                    stats_sink(&FullReadStats::from_proto(stats));
                                }
                            }
                        }
                    }
                }
            };

            if !policy.is_retryable(&err) {
                return Err(err);
            }
            if let Some(key) = &last_row_key {
                rows = if reversed {
                    rows.retain_rows_before(key)
                } else {
                    rows.retain_rows_after(key)
                };
            }
            let delay = backoff.next_delay();
            debug!(
                error = %err,
                last_row_key = ?last_row_key.as_ref().map(|k| String::from_utf8_lossy(k).into_owned()),
                ?delay,
                "retrying ReadRows with narrowed selection"
            );
            tokio::time::sleep(delay).await;
        }
    }

    /// Runs the read and collects every row.
    pub async fn collect(self) -> Result<Vec<Row>> {
        let mut rows = Vec::new();
        self.run(|row| {
            rows.push(row);
            true
        })
        .await?;
        Ok(rows)
    }
}
