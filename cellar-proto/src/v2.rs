//! Messages and client stub for the `google.bigtable.v2` data API subset.

// ---------------------------------------------------------------------------
// Data model messages
// ---------------------------------------------------------------------------

/// A row read back from the server, keyed and grouped by column family.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Row {
    #[prost(bytes, tag = "1")]
    pub key: Vec<u8>,
    #[prost(message, repeated, tag = "2")]
    pub families: Vec<Family>,
}

/// All cells of one column family within a row.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Family {
    /// Family name; never contains a colon.
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(message, repeated, tag = "2")]
    pub columns: Vec<Column>,
}

/// All cells of one column (qualifier) within a family.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Column {
    #[prost(bytes, tag = "1")]
    pub qualifier: Vec<u8>,
    #[prost(message, repeated, tag = "2")]
    pub cells: Vec<Cell>,
}

/// One versioned cell value.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Cell {
    #[prost(int64, tag = "1")]
    pub timestamp_micros: i64,
    #[prost(bytes, tag = "2")]
    pub value: Vec<u8>,
    #[prost(string, repeated, tag = "3")]
    pub labels: Vec<String>,
}

/// A contiguous range of row keys. Absent bounds are unbounded.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RowRange {
    #[prost(oneof = "row_range::StartKey", tags = "1, 2")]
    pub start_key: Option<row_range::StartKey>,
    #[prost(oneof = "row_range::EndKey", tags = "3, 4")]
    pub end_key: Option<row_range::EndKey>,
}

pub mod row_range {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum StartKey {
        #[prost(bytes, tag = "1")]
        StartKeyClosed(Vec<u8>),
        #[prost(bytes, tag = "2")]
        StartKeyOpen(Vec<u8>),
    }

    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum EndKey {
        #[prost(bytes, tag = "3")]
        EndKeyOpen(Vec<u8>),
        #[prost(bytes, tag = "4")]
        EndKeyClosed(Vec<u8>),
    }
}

/// A selection of rows: discrete keys and/or a union of ranges. An empty
/// `RowSet` selects all rows in the table.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RowSet {
    #[prost(bytes, repeated, tag = "1")]
    pub row_keys: Vec<Vec<u8>>,
    #[prost(message, repeated, tag = "2")]
    pub row_ranges: Vec<RowRange>,
}

/// A contiguous range of qualifiers within a single family.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ColumnRange {
    #[prost(string, tag = "1")]
    pub family_name: String,
    #[prost(oneof = "column_range::StartQualifier", tags = "2, 3")]
    pub start_qualifier: Option<column_range::StartQualifier>,
    #[prost(oneof = "column_range::EndQualifier", tags = "4, 5")]
    pub end_qualifier: Option<column_range::EndQualifier>,
}

pub mod column_range {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum StartQualifier {
        #[prost(bytes, tag = "2")]
        StartQualifierClosed(Vec<u8>),
        #[prost(bytes, tag = "3")]
        StartQualifierOpen(Vec<u8>),
    }

    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum EndQualifier {
        #[prost(bytes, tag = "4")]
        EndQualifierClosed(Vec<u8>),
        #[prost(bytes, tag = "5")]
        EndQualifierOpen(Vec<u8>),
    }
}

/// Half-open microsecond timestamp range; zero means unbounded.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TimestampRange {
    #[prost(int64, tag = "1")]
    pub start_timestamp_micros: i64,
    #[prost(int64, tag = "2")]
    pub end_timestamp_micros: i64,
}

/// A contiguous range of cell values.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ValueRange {
    #[prost(oneof = "value_range::StartValue", tags = "1, 2")]
    pub start_value: Option<value_range::StartValue>,
    #[prost(oneof = "value_range::EndValue", tags = "3, 4")]
    pub end_value: Option<value_range::EndValue>,
}

pub mod value_range {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum StartValue {
        #[prost(bytes, tag = "1")]
        StartValueClosed(Vec<u8>),
        #[prost(bytes, tag = "2")]
        StartValueOpen(Vec<u8>),
    }

    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum EndValue {
        #[prost(bytes, tag = "3")]
        EndValueClosed(Vec<u8>),
        #[prost(bytes, tag = "4")]
        EndValueOpen(Vec<u8>),
    }
}

/// Server-side filter applied to the cells of each scanned row.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RowFilter {
    #[prost(
        oneof = "row_filter::Filter",
        tags = "1, 2, 3, 16, 17, 18, 4, 14, 5, 6, 7, 8, 9, 15, 10, 11, 12, 13, 19"
    )]
    pub filter: Option<row_filter::Filter>,
}

pub mod row_filter {
    /// Filters applied in sequence; the output of one feeds the next.
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Chain {
        #[prost(message, repeated, tag = "1")]
        pub filters: Vec<super::RowFilter>,
    }

    /// Filters applied to separate copies of the input, outputs interleaved.
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Interleave {
        #[prost(message, repeated, tag = "1")]
        pub filters: Vec<super::RowFilter>,
    }

    /// Applies `true_filter` or `false_filter` depending on whether
    /// `predicate_filter` outputs any cells.
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Condition {
        #[prost(message, optional, boxed, tag = "1")]
        pub predicate_filter: Option<Box<super::RowFilter>>,
        #[prost(message, optional, boxed, tag = "2")]
        pub true_filter: Option<Box<super::RowFilter>>,
        #[prost(message, optional, boxed, tag = "3")]
        pub false_filter: Option<Box<super::RowFilter>>,
    }

    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Filter {
        #[prost(message, tag = "1")]
        Chain(Chain),
        #[prost(message, tag = "2")]
        Interleave(Interleave),
        #[prost(message, tag = "3")]
        Condition(Box<Condition>),
        #[prost(bool, tag = "16")]
        Sink(bool),
        #[prost(bool, tag = "17")]
        PassAllFilter(bool),
        #[prost(bool, tag = "18")]
        BlockAllFilter(bool),
        #[prost(bytes, tag = "4")]
        RowKeyRegexFilter(Vec<u8>),
        #[prost(double, tag = "14")]
        RowSampleFilter(f64),
        #[prost(string, tag = "5")]
        FamilyNameRegexFilter(String),
        #[prost(bytes, tag = "6")]
        ColumnQualifierRegexFilter(Vec<u8>),
        #[prost(message, tag = "7")]
        ColumnRangeFilter(super::ColumnRange),
        #[prost(message, tag = "8")]
        TimestampRangeFilter(super::TimestampRange),
        #[prost(bytes, tag = "9")]
        ValueRegexFilter(Vec<u8>),
        #[prost(message, tag = "15")]
        ValueRangeFilter(super::ValueRange),
        #[prost(int32, tag = "10")]
        CellsPerRowOffsetFilter(i32),
        #[prost(int32, tag = "11")]
        CellsPerRowLimitFilter(i32),
        #[prost(int32, tag = "12")]
        CellsPerColumnLimitFilter(i32),
        #[prost(bool, tag = "13")]
        StripValueTransformer(bool),
        #[prost(string, tag = "19")]
        ApplyLabelTransformer(String),
    }
}

/// A single row-scoped change.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Mutation {
    #[prost(oneof = "mutation::Mutation", tags = "1, 2, 3, 4")]
    pub mutation: Option<mutation::Mutation>,
}

pub mod mutation {
    /// Writes one cell; `timestamp_micros == -1` asks the server to stamp it.
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct SetCell {
        #[prost(string, tag = "1")]
        pub family_name: String,
        #[prost(bytes, tag = "2")]
        pub column_qualifier: Vec<u8>,
        #[prost(int64, tag = "3")]
        pub timestamp_micros: i64,
        #[prost(bytes, tag = "4")]
        pub value: Vec<u8>,
    }

    /// Deletes cells in a column, optionally limited to a timestamp range.
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct DeleteFromColumn {
        #[prost(string, tag = "1")]
        pub family_name: String,
        #[prost(bytes, tag = "2")]
        pub column_qualifier: Vec<u8>,
        #[prost(message, optional, tag = "3")]
        pub time_range: Option<super::TimestampRange>,
    }

    /// Deletes all cells in a family.
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct DeleteFromFamily {
        #[prost(string, tag = "1")]
        pub family_name: String,
    }

    /// Deletes the entire row.
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct DeleteFromRow {}

    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Mutation {
        #[prost(message, tag = "1")]
        SetCell(SetCell),
        #[prost(message, tag = "2")]
        DeleteFromColumn(DeleteFromColumn),
        #[prost(message, tag = "3")]
        DeleteFromFamily(DeleteFromFamily),
        #[prost(message, tag = "4")]
        DeleteFromRow(DeleteFromRow),
    }
}

/// An atomic read-modify-write rule for one cell.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ReadModifyWriteRule {
    #[prost(string, tag = "1")]
    pub family_name: String,
    #[prost(bytes, tag = "2")]
    pub column_qualifier: Vec<u8>,
    #[prost(oneof = "read_modify_write_rule::Rule", tags = "3, 4")]
    pub rule: Option<read_modify_write_rule::Rule>,
}

pub mod read_modify_write_rule {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Rule {
        #[prost(bytes, tag = "3")]
        AppendValue(Vec<u8>),
        #[prost(int64, tag = "4")]
        IncrementAmount(i64),
    }
}

// ---------------------------------------------------------------------------
// Request stats
// ---------------------------------------------------------------------------

/// Row/cell accounting over the course of one read.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ReadIterationStats {
    #[prost(int64, tag = "1")]
    pub rows_seen_count: i64,
    #[prost(int64, tag = "2")]
    pub rows_returned_count: i64,
    #[prost(int64, tag = "3")]
    pub cells_seen_count: i64,
    #[prost(int64, tag = "4")]
    pub cells_returned_count: i64,
}

/// Server-side latency measurements for one request.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RequestLatencyStats {
    #[prost(message, optional, tag = "1")]
    pub frontend_server_latency: Option<::prost_types::Duration>,
}

/// The full stats view, sent when `REQUEST_STATS_FULL` was requested.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct FullReadStatsView {
    #[prost(message, optional, tag = "1")]
    pub read_iteration_stats: Option<ReadIterationStats>,
    #[prost(message, optional, tag = "2")]
    pub request_latency_stats: Option<RequestLatencyStats>,
}

/// Stats attached to at most one response message per read stream.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RequestStats {
    #[prost(oneof = "request_stats::StatsView", tags = "1")]
    pub stats_view: Option<request_stats::StatsView>,
}

pub mod request_stats {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum StatsView {
        #[prost(message, tag = "1")]
        FullReadStatsView(super::FullReadStatsView),
    }
}

// ---------------------------------------------------------------------------
// RPC messages
// ---------------------------------------------------------------------------

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ReadRowsRequest {
    #[prost(string, tag = "1")]
    pub table_name: String,
    #[prost(string, tag = "5")]
    pub app_profile_id: String,
    #[prost(message, optional, tag = "2")]
    pub rows: Option<RowSet>,
    #[prost(message, optional, tag = "3")]
    pub filter: Option<RowFilter>,
    /// Maximum number of rows to return; zero means no limit.
    #[prost(int64, tag = "4")]
    pub rows_limit: i64,
    #[prost(enumeration = "read_rows_request::RequestStatsView", tag = "6")]
    pub request_stats_view: i32,
    /// Stream rows in reverse lexicographic key order.
    #[prost(bool, tag = "7")]
    pub reversed: bool,
}

pub mod read_rows_request {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
    #[repr(i32)]
    pub enum RequestStatsView {
        Unspecified = 0,
        RequestStatsNone = 1,
        RequestStatsFull = 2,
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ReadRowsResponse {
    #[prost(message, repeated, tag = "1")]
    pub chunks: Vec<read_rows_response::CellChunk>,
    /// Progress marker: all rows up to (or, reversed, down to) this key have
    /// been scanned even though none of them were delivered.
    #[prost(bytes, tag = "2")]
    pub last_scanned_row_key: Vec<u8>,
    #[prost(message, optional, tag = "3")]
    pub request_stats: Option<RequestStats>,
}

pub mod read_rows_response {
    /// A fragment of one cell. Rows span one or more chunks; a cell value may
    /// be split across chunks when `value_size` is nonzero.
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct CellChunk {
        /// Set on the first chunk of each new row.
        #[prost(bytes, tag = "1")]
        pub row_key: Vec<u8>,
        /// Set when the family changes; wrapper distinguishes unset from "".
        #[prost(message, optional, tag = "2")]
        pub family_name: Option<String>,
        /// Set when the qualifier changes; wrapper distinguishes unset from empty.
        #[prost(message, optional, tag = "3")]
        pub qualifier: Option<Vec<u8>>,
        #[prost(int64, tag = "4")]
        pub timestamp_micros: i64,
        #[prost(string, repeated, tag = "5")]
        pub labels: Vec<String>,
        #[prost(bytes, tag = "6")]
        pub value: Vec<u8>,
        /// Nonzero iff this cell's value continues in following chunks.
        #[prost(int32, tag = "7")]
        pub value_size: i32,
        #[prost(oneof = "cell_chunk::RowStatus", tags = "8, 9")]
        pub row_status: Option<cell_chunk::RowStatus>,
    }

    pub mod cell_chunk {
        #[derive(Clone, PartialEq, ::prost::Oneof)]
        pub enum RowStatus {
            /// Discard the row accumulated so far and start it over.
            #[prost(bool, tag = "8")]
            ResetRow(bool),
            /// The row is complete.
            #[prost(bool, tag = "9")]
            CommitRow(bool),
        }
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SampleRowKeysRequest {
    #[prost(string, tag = "1")]
    pub table_name: String,
    #[prost(string, tag = "2")]
    pub app_profile_id: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SampleRowKeysResponse {
    #[prost(bytes, tag = "1")]
    pub row_key: Vec<u8>,
    #[prost(int64, tag = "2")]
    pub offset_bytes: i64,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct MutateRowRequest {
    #[prost(string, tag = "1")]
    pub table_name: String,
    #[prost(string, tag = "4")]
    pub app_profile_id: String,
    #[prost(bytes, tag = "2")]
    pub row_key: Vec<u8>,
    #[prost(message, repeated, tag = "3")]
    pub mutations: Vec<Mutation>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct MutateRowResponse {}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct MutateRowsRequest {
    #[prost(string, tag = "1")]
    pub table_name: String,
    #[prost(string, tag = "3")]
    pub app_profile_id: String,
    #[prost(message, repeated, tag = "2")]
    pub entries: Vec<mutate_rows_request::Entry>,
}

pub mod mutate_rows_request {
    /// One row's mutations; applied atomically, independent of other entries.
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Entry {
        #[prost(bytes, tag = "1")]
        pub row_key: Vec<u8>,
        #[prost(message, repeated, tag = "2")]
        pub mutations: Vec<super::Mutation>,
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct MutateRowsResponse {
    #[prost(message, repeated, tag = "1")]
    pub entries: Vec<mutate_rows_response::Entry>,
}

pub mod mutate_rows_response {
    /// Outcome for the request entry at `index`.
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Entry {
        #[prost(int64, tag = "1")]
        pub index: i64,
        #[prost(message, optional, tag = "2")]
        pub status: Option<crate::rpc::Status>,
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CheckAndMutateRowRequest {
    #[prost(string, tag = "1")]
    pub table_name: String,
    #[prost(string, tag = "7")]
    pub app_profile_id: String,
    #[prost(bytes, tag = "2")]
    pub row_key: Vec<u8>,
    #[prost(message, optional, tag = "6")]
    pub predicate_filter: Option<RowFilter>,
    #[prost(message, repeated, tag = "4")]
    pub true_mutations: Vec<Mutation>,
    #[prost(message, repeated, tag = "5")]
    pub false_mutations: Vec<Mutation>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CheckAndMutateRowResponse {
    /// Whether the predicate matched any cell of the row.
    #[prost(bool, tag = "1")]
    pub predicate_matched: bool,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ReadModifyWriteRowRequest {
    #[prost(string, tag = "1")]
    pub table_name: String,
    #[prost(string, tag = "4")]
    pub app_profile_id: String,
    #[prost(bytes, tag = "2")]
    pub row_key: Vec<u8>,
    #[prost(message, repeated, tag = "3")]
    pub rules: Vec<ReadModifyWriteRule>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ReadModifyWriteRowResponse {
    /// The newly written cells.
    #[prost(message, optional, tag = "1")]
    pub row: Option<Row>,
}

// ---------------------------------------------------------------------------
// Client stub
// ---------------------------------------------------------------------------

pub mod bigtable_client {
    //! Hand-maintained stub for the `google.bigtable.v2.Bigtable` data
    //! service, built directly on [`tonic::client::Grpc`].

    use http::uri::PathAndQuery;
    use tonic::codec::ProstCodec;
    use tonic::transport::Channel;
    use tonic::{Request, Response, Status, Streaming};

    use super::*;

    /// Typed stub over a single channel. Clones share the channel and are
    /// cheap; one clone per in-flight call.
    #[derive(Debug, Clone)]
    pub struct BigtableClient {
        inner: tonic::client::Grpc<Channel>,
    }

    impl BigtableClient {
        pub fn new(channel: Channel) -> Self {
            Self {
                inner: tonic::client::Grpc::new(channel),
            }
        }

        /// Caps the size of encoded request and decoded response messages.
        pub fn max_message_size(mut self, limit: usize) -> Self {
            self.inner = self
                .inner
                .max_decoding_message_size(limit)
                .max_encoding_message_size(limit);
            self
        }

        async fn ready(&mut self) -> Result<(), Status> {
            self.inner
                .ready()
                .await
                .map_err(|e| Status::unknown(format!("transport not ready: {e}")))
        }

        pub async fn read_rows(
            &mut self,
            request: Request<ReadRowsRequest>,
        ) -> Result<Response<Streaming<ReadRowsResponse>>, Status> {
            self.ready().await?;
            let codec: ProstCodec<ReadRowsRequest, ReadRowsResponse> = ProstCodec::default();
            self.inner
                .server_streaming(
                    request,
                    PathAndQuery::from_static("/google.bigtable.v2.Bigtable/ReadRows"),
                    codec,
                )
                .await
        }

        pub async fn sample_row_keys(
            &mut self,
            request: Request<SampleRowKeysRequest>,
        ) -> Result<Response<Streaming<SampleRowKeysResponse>>, Status> {
            self.ready().await?;
            let codec: ProstCodec<SampleRowKeysRequest, SampleRowKeysResponse> =
                ProstCodec::default();
            self.inner
                .server_streaming(
                    request,
                    PathAndQuery::from_static("/google.bigtable.v2.Bigtable/SampleRowKeys"),
                    codec,
                )
                .await
        }

        pub async fn mutate_row(
            &mut self,
            request: Request<MutateRowRequest>,
        ) -> Result<Response<MutateRowResponse>, Status> {
            self.ready().await?;
            let codec: ProstCodec<MutateRowRequest, MutateRowResponse> = ProstCodec::default();
            self.inner
                .unary(
                    request,
                    PathAndQuery::from_static("/google.bigtable.v2.Bigtable/MutateRow"),
                    codec,
                )
                .await
        }

        pub async fn mutate_rows(
            &mut self,
            request: Request<MutateRowsRequest>,
        ) -> Result<Response<Streaming<MutateRowsResponse>>, Status> {
            self.ready().await?;
            let codec: ProstCodec<MutateRowsRequest, MutateRowsResponse> = ProstCodec::default();
            self.inner
                .server_streaming(
                    request,
                    PathAndQuery::from_static("/google.bigtable.v2.Bigtable/MutateRows"),
                    codec,
                )
                .await
        }

        pub async fn check_and_mutate_row(
            &mut self,
            request: Request<CheckAndMutateRowRequest>,
        ) -> Result<Response<CheckAndMutateRowResponse>, Status> {
            self.ready().await?;
            let codec: ProstCodec<CheckAndMutateRowRequest, CheckAndMutateRowResponse> =
                ProstCodec::default();
            self.inner
                .unary(
                    request,
                    PathAndQuery::from_static("/google.bigtable.v2.Bigtable/CheckAndMutateRow"),
                    codec,
                )
                .await
        }

        pub async fn read_modify_write_row(
            &mut self,
            request: Request<ReadModifyWriteRowRequest>,
        ) -> Result<Response<ReadModifyWriteRowResponse>, Status> {
            self.ready().await?;
            let codec: ProstCodec<ReadModifyWriteRowRequest, ReadModifyWriteRowResponse> =
                ProstCodec::default();
            self.inner
                .unary(
                    request,
                    PathAndQuery::from_static("/google.bigtable.v2.Bigtable/ReadModifyWriteRow"),
                    codec,
                )
                .await
        }
    }
}
