use std::future::Future;
use std::sync::Arc;

use bytes::Bytes;
use tonic::metadata::{AsciiMetadataKey, AsciiMetadataValue, MetadataMap};
use tonic::{Request, Status};
use tracing::{debug, instrument, warn};

use cellar_core::{mutations_are_retryable, Mutation, ReadModifyWrite, Row};
use cellar_proto::v2 as pb;

use crate::client::{full_table_name, request_params_header_value, Inner};
use crate::retry::RetryPolicy;
use crate::transport::DataTransport;
use crate::{Error, Result};

const RESOURCE_PREFIX_HEADER: &str = "google-cloud-resource-prefix";
const REQUEST_PARAMS_HEADER: &str = "x-goog-request-params";

/// A handle on one table.
///
/// Tables are thin views sharing the client's connection pool; clone freely
/// and use concurrently.
#[derive(Clone)]
pub struct Table {
    inner: Arc<Inner>,
    name: String,
    metadata: MetadataMap,
}

impl Table {
    pub(crate) fn open(inner: Arc<Inner>, table: &str) -> Table {
        let name = full_table_name(&inner.project, &inner.instance, table);
        let mut metadata = MetadataMap::new();
        insert_ascii(&mut metadata, RESOURCE_PREFIX_HEADER, &name);
        insert_ascii(
            &mut metadata,
            REQUEST_PARAMS_HEADER,
            &request_params_header_value(&name, &inner.app_profile),
        );
        for (key, value) in &inner.metadata {
            match (
                AsciiMetadataKey::from_bytes(key.as_bytes()),
                AsciiMetadataValue::try_from(value.as_str()),
            ) {
                (Ok(key), Ok(value)) => {
                    metadata.append(key, value);
                }
                _ => warn!(key = %key, "skipping invalid metadata entry"),
            }
        }
        Table {
            inner,
            name,
            metadata,
        }
    }

    /// Fully-qualified table name.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn app_profile(&self) -> &str {
        &self.inner.app_profile
    }

    pub(crate) fn transport(&self) -> &Arc<dyn DataTransport> {
        &self.inner.transport
    }

    pub(crate) fn retry_policy(&self) -> &RetryPolicy {
        &self.inner.retry
    }

    /// Wraps a message with the table-scoped metadata every data RPC
    /// carries.
    pub(crate) fn new_request<T>(&self, message: T) -> Request<T> {
        let mut request = Request::new(message);
        *request.metadata_mut() = self.metadata.clone();
        request
    }

    /// Mutates a row atomically.
    ///
    /// An unconditional mutation is retried iff it is idempotent (no
    /// server-time cell writes) and returns `Ok(None)`. A conditional
    /// mutation is retried iff both branches are idempotent and returns
    /// `Ok(Some(predicate_matched))`.
    #[instrument(skip(self, mutation), fields(table = %self.name), err)]
    pub async fn apply(
        &self,
        row_key: impl Into<Bytes> + std::fmt::Debug,
        mutation: Mutation,
    ) -> Result<Option<bool>> {
        let row_key = row_key.into();

        let Some(cond) = mutation.cond() else {
            let retryable = mutation.is_retryable();
            let request = pb::MutateRowRequest {
                table_name: self.name.clone(),
                app_profile_id: self.app_profile().to_string(),
                row_key: row_key.to_vec(),
                mutations: mutation.ops().to_vec(),
            };
            self.retry_unary(retryable, || {
                let request = self.new_request(request.clone());
                async move { self.transport().mutate_row(request).await }
            })
            .await?;
            return Ok(None);
        };

        if cond.on_match.as_ref().is_some_and(Mutation::is_conditional)
            || cond
                .on_no_match
                .as_ref()
                .is_some_and(Mutation::is_conditional)
        {
            return Err(Error::InvalidArgument(
                "conditional mutations cannot be nested".to_string(),
            ));
        }

        let true_mutations: Vec<pb::Mutation> = cond
            .on_match
            .as_ref()
            .map(|m| m.ops().to_vec())
            .unwrap_or_default();
        let false_mutations: Vec<pb::Mutation> = cond
            .on_no_match
            .as_ref()
            .map(|m| m.ops().to_vec())
            .unwrap_or_default();
        let retryable =
            mutations_are_retryable(&true_mutations) && mutations_are_retryable(&false_mutations);

        let request = pb::CheckAndMutateRowRequest {
            table_name: self.name.clone(),
            app_profile_id: self.app_profile().to_string(),
            row_key: row_key.to_vec(),
            predicate_filter: Some(cond.predicate.to_proto()),
            true_mutations,
            false_mutations,
        };
        let response = self
            .retry_unary(retryable, || {
                let request = self.new_request(request.clone());
                async move { self.transport().check_and_mutate_row(request).await }
            })
            .await?;
        Ok(Some(response.predicate_matched))
    }

    /// Applies a read-modify-write to a row and returns the newly written
    /// cells. Inherently non-idempotent; never retried.
    #[instrument(skip(self, rules), fields(table = %self.name), err)]
    pub async fn apply_read_modify_write(
        &self,
        row_key: impl Into<Bytes> + std::fmt::Debug,
        rules: ReadModifyWrite,
    ) -> Result<Row> {
        let row_key = row_key.into();
        let request = self.new_request(pb::ReadModifyWriteRowRequest {
            table_name: self.name.clone(),
            app_profile_id: self.app_profile().to_string(),
            row_key: row_key.to_vec(),
            rules: rules.into_rules(),
        });

        let response = self.transport().read_modify_write_row(request).await?;
        let row = response.row.ok_or_else(|| {
            Error::Rpc(Status::internal("read-modify-write response carried no row"))
        })?;
        Ok(Row::from_proto(row_key, row))
    }

    /// Returns a sample of row keys delimiting contiguous sections of the
    /// table of roughly equal size, suitable for splitting up scans.
    /// Retryable end-to-end: a failed attempt discards everything it
    /// accumulated.
    #[instrument(skip(self), fields(table = %self.name), err)]
    pub async fn sample_row_keys(&self) -> Result<Vec<Bytes>> {
        use futures_util::StreamExt;

        let policy = self.retry_policy().clone();
        let mut backoff = policy.backoff();

        loop {
            let request = self.new_request(pb::SampleRowKeysRequest {
                table_name: self.name.clone(),
                app_profile_id: self.app_profile().to_string(),
            });

            let mut keys = Vec::new();
            let mut attempt_err: Option<Error> = None;

            match self.transport().sample_row_keys(request).await {
                Err(status) => attempt_err = Some(status.into()),
                Ok(mut stream) => loop {
                    match stream.next().await {
                        None => break,
                        Some(Err(status)) => {
                            attempt_err = Some(status.into());
                            break;
                        }
                        Some(Ok(response)) => {
                            if !response.row_key.is_empty() {
                                keys.push(Bytes::from(response.row_key));
                            }
                        }
                    }
                },
            }

            match attempt_err {
                None => return Ok(keys),
                Some(err) if policy.is_retryable(&err) => {
                    let delay = backoff.next_delay();
                    debug!(error = %err, ?delay, "retrying SampleRowKeys");
                    tokio::time::sleep(delay).await;
                }
                Some(err) => return Err(err),
            }
        }
    }

    /// Runs `call` until it succeeds, a non-retryable status comes back, or
    /// `retryable` is false.
    pub(crate) async fn retry_unary<T, F, Fut>(&self, retryable: bool, mut call: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = std::result::Result<T, Status>>,
    {
        let policy = self.retry_policy();
        let mut backoff = policy.backoff();
        loop {
            match call().await {
                Ok(value) => return Ok(value),
                Err(status) => {
                    let err = Error::from(status);
                    if !retryable || !policy.is_retryable(&err) {
                        return Err(err);
                    }
                    let delay = backoff.next_delay();
                    debug!(error = %err, ?delay, "retrying idempotent mutation");
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}

fn insert_ascii(metadata: &mut MetadataMap, key: &'static str, value: &str) {
    match AsciiMetadataValue::try_from(value) {
        Ok(value) => {
            metadata.insert(key, value);
        }
        // Table names are expected to be printable ASCII; anything else
        // cannot ride a metadata header.
        Err(_) => warn!(key, "skipping metadata header with non-ASCII value"),
    }
}
