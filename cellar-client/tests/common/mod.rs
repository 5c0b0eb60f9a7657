//! Shared test harness: a scripted in-memory transport driven through the
//! public client API.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use futures_util::stream;
use tonic::{Request, Status};

use cellar_client::{
    Client, ClientConfig, DataTransport, MessageStream, RetryPolicy, Table,
};
use cellar_proto::v2 as pb;
use cellar_proto::v2::read_rows_response::cell_chunk::RowStatus;
use cellar_proto::v2::read_rows_response::CellChunk;

/// A scripted outcome for one streaming RPC: either the call fails up
/// front, or it yields the given sequence of messages/errors.
pub type StreamScript<T> = Result<Vec<Result<T, Status>>, Status>;

/// In-memory [`DataTransport`] that records every request and replays
/// scripted responses in order.
#[derive(Default)]
pub struct ScriptedTransport {
    pub read_rows_requests: Mutex<Vec<pb::ReadRowsRequest>>,
    read_rows_script: Mutex<VecDeque<StreamScript<pb::ReadRowsResponse>>>,

    pub sample_requests: Mutex<Vec<pb::SampleRowKeysRequest>>,
    sample_script: Mutex<VecDeque<StreamScript<pb::SampleRowKeysResponse>>>,

    pub mutate_row_requests: Mutex<Vec<pb::MutateRowRequest>>,
    mutate_row_script: Mutex<VecDeque<Result<pb::MutateRowResponse, Status>>>,

    pub mutate_rows_requests: Mutex<Vec<pb::MutateRowsRequest>>,
    mutate_rows_script: Mutex<VecDeque<StreamScript<pb::MutateRowsResponse>>>,

    pub check_and_mutate_requests: Mutex<Vec<pb::CheckAndMutateRowRequest>>,
    check_and_mutate_script: Mutex<VecDeque<Result<pb::CheckAndMutateRowResponse, Status>>>,

    pub read_modify_write_requests: Mutex<Vec<pb::ReadModifyWriteRowRequest>>,
    read_modify_write_script: Mutex<VecDeque<Result<pb::ReadModifyWriteRowResponse, Status>>>,

    /// Metadata of every request, in arrival order across all RPCs.
    pub request_metadata: Mutex<Vec<tonic::metadata::MetadataMap>>,
}

impl ScriptedTransport {
    pub fn new() -> Arc<ScriptedTransport> {
        Arc::new(ScriptedTransport::default())
    }

    pub fn script_read_rows(&self, script: StreamScript<pb::ReadRowsResponse>) {
        self.read_rows_script.lock().unwrap().push_back(script);
    }

    pub fn script_sample(&self, script: StreamScript<pb::SampleRowKeysResponse>) {
        self.sample_script.lock().unwrap().push_back(script);
    }

    pub fn script_mutate_row(&self, outcome: Result<pb::MutateRowResponse, Status>) {
        self.mutate_row_script.lock().unwrap().push_back(outcome);
    }

    pub fn script_mutate_rows(&self, script: StreamScript<pb::MutateRowsResponse>) {
        self.mutate_rows_script.lock().unwrap().push_back(script);
    }

    pub fn script_check_and_mutate(
        &self,
        outcome: Result<pb::CheckAndMutateRowResponse, Status>,
    ) {
        self.check_and_mutate_script.lock().unwrap().push_back(outcome);
    }

    pub fn script_read_modify_write(
        &self,
        outcome: Result<pb::ReadModifyWriteRowResponse, Status>,
    ) {
        self.read_modify_write_script.lock().unwrap().push_back(outcome);
    }

    fn record<T: Clone>(&self, requests: &Mutex<Vec<T>>, request: Request<T>) -> T {
        self.request_metadata
            .lock()
            .unwrap()
            .push(request.metadata().clone());
        let message = request.into_inner();
        requests.lock().unwrap().push(message.clone());
        message
    }

    fn next_stream<T: Send + 'static>(
        script: &Mutex<VecDeque<StreamScript<T>>>,
        rpc: &str,
    ) -> Result<MessageStream<T>, Status> {
        match script.lock().unwrap().pop_front() {
            Some(Ok(items)) => Ok(Box::pin(stream::iter(items))),
            Some(Err(status)) => Err(status),
            None => Err(Status::failed_precondition(format!(
                "no scripted {rpc} outcome left"
            ))),
        }
    }

    fn next_unary<T>(
        script: &Mutex<VecDeque<Result<T, Status>>>,
        rpc: &str,
    ) -> Result<T, Status> {
        script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(Status::failed_precondition(format!(
                "no scripted {rpc} outcome left"
            ))))
    }
}

#[async_trait]
impl DataTransport for ScriptedTransport {
    async fn read_rows(
        &self,
        request: Request<pb::ReadRowsRequest>,
    ) -> Result<MessageStream<pb::ReadRowsResponse>, Status> {
        self.record(&self.read_rows_requests, request);
        Self::next_stream(&self.read_rows_script, "ReadRows")
    }

    async fn sample_row_keys(
        &self,
        request: Request<pb::SampleRowKeysRequest>,
    ) -> Result<MessageStream<pb::SampleRowKeysResponse>, Status> {
        self.record(&self.sample_requests, request);
        Self::next_stream(&self.sample_script, "SampleRowKeys")
    }

    async fn mutate_row(
        &self,
        request: Request<pb::MutateRowRequest>,
    ) -> Result<pb::MutateRowResponse, Status> {
        self.record(&self.mutate_row_requests, request);
        Self::next_unary(&self.mutate_row_script, "MutateRow")
    }

    async fn mutate_rows(
        &self,
        request: Request<pb::MutateRowsRequest>,
    ) -> Result<MessageStream<pb::MutateRowsResponse>, Status> {
        self.record(&self.mutate_rows_requests, request);
        Self::next_stream(&self.mutate_rows_script, "MutateRows")
    }

    async fn check_and_mutate_row(
        &self,
        request: Request<pb::CheckAndMutateRowRequest>,
    ) -> Result<pb::CheckAndMutateRowResponse, Status> {
        self.record(&self.check_and_mutate_requests, request);
        Self::next_unary(&self.check_and_mutate_script, "CheckAndMutateRow")
    }

    async fn read_modify_write_row(
        &self,
        request: Request<pb::ReadModifyWriteRowRequest>,
    ) -> Result<pb::ReadModifyWriteRowResponse, Status> {
        self.record(&self.read_modify_write_requests, request);
        Self::next_unary(&self.read_modify_write_script, "ReadModifyWriteRow")
    }
}

/// A table over the scripted transport with millisecond-scale backoff so
/// retrying tests stay fast.
pub fn test_table(transport: Arc<ScriptedTransport>) -> Table {
    let retry = RetryPolicy {
        initial_backoff: Duration::from_millis(1),
        max_backoff: Duration::from_millis(5),
        ..RetryPolicy::default()
    };
    let config = ClientConfig::new()
        .with_app_profile("profile-1")
        .with_retry(retry);
    Client::with_transport(transport, "proj", "inst", config).open("events")
}

/// A committed single-cell chunk: one whole row.
pub fn row_chunk(key: &[u8], value: &[u8]) -> CellChunk {
    CellChunk {
        row_key: key.to_vec(),
        family_name: Some("cf".to_string()),
        qualifier: Some(b"col".to_vec()),
        timestamp_micros: 1_000,
        labels: vec![],
        value: value.to_vec(),
        value_size: 0,
        row_status: Some(RowStatus::CommitRow(true)),
    }
}

/// A response delivering one whole row per key.
pub fn rows_response(keys: &[&[u8]]) -> pb::ReadRowsResponse {
    pb::ReadRowsResponse {
        chunks: keys.iter().map(|key| row_chunk(key, b"v")).collect(),
        last_scanned_row_key: vec![],
        request_stats: None,
    }
}

/// A bulk response entry with the given per-entry status code.
pub fn bulk_entry(index: i64, code: tonic::Code) -> pb::mutate_rows_response::Entry {
    pb::mutate_rows_response::Entry {
        index,
        status: Some(cellar_proto::rpc::Status {
            code: code as i32,
            message: if code == tonic::Code::Ok {
                String::new()
            } else {
                format!("entry {index} failed")
            },
        }),
    }
}

pub fn bulk_response(entries: Vec<pb::mutate_rows_response::Entry>) -> pb::MutateRowsResponse {
    pb::MutateRowsResponse { entries }
}
