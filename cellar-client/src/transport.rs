//! The transport seam between the data-plane engines and gRPC.
//!
//! The engines drive [`DataTransport`], an object-safe trait with one method
//! per data RPC. Production uses [`GrpcTransport`], a round-robin pool of
//! tonic channels; tests substitute scripted in-memory implementations.

use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use futures_core::Stream;
use tonic::transport::Endpoint;
use tonic::{Request, Status, Streaming};

use cellar_proto::v2 as pb;
use cellar_proto::v2::bigtable_client::BigtableClient;

use crate::Error;

/// A server-streaming response as the engines consume it. Dropping the
/// stream cancels the underlying RPC.
pub type MessageStream<T> = Pin<Box<dyn Stream<Item = Result<T, Status>> + Send>>;

/// The contract the data-plane engines consume from the transport layer.
///
/// Implementations must be safe for concurrent use; the client issues calls
/// from many tasks against one shared transport.
#[async_trait]
pub trait DataTransport: Send + Sync {
    async fn read_rows(
        &self,
        request: Request<pb::ReadRowsRequest>,
    ) -> Result<MessageStream<pb::ReadRowsResponse>, Status>;

    async fn sample_row_keys(
        &self,
        request: Request<pb::SampleRowKeysRequest>,
    ) -> Result<MessageStream<pb::SampleRowKeysResponse>, Status>;

    async fn mutate_row(
        &self,
        request: Request<pb::MutateRowRequest>,
    ) -> Result<pb::MutateRowResponse, Status>;

    async fn mutate_rows(
        &self,
        request: Request<pb::MutateRowsRequest>,
    ) -> Result<MessageStream<pb::MutateRowsResponse>, Status>;

    async fn check_and_mutate_row(
        &self,
        request: Request<pb::CheckAndMutateRowRequest>,
    ) -> Result<pb::CheckAndMutateRowResponse, Status>;

    async fn read_modify_write_row(
        &self,
        request: Request<pb::ReadModifyWriteRowRequest>,
    ) -> Result<pb::ReadModifyWriteRowResponse, Status>;
}

fn boxed<T: Send + 'static>(streaming: Streaming<T>) -> MessageStream<T> {
    Box::pin(streaming)
}

/// A fixed-size pool of independent channels to one endpoint, handed out
/// round-robin per call so concurrent operations spread across connections.
pub struct GrpcTransport {
    clients: Vec<BigtableClient>,
    next: AtomicUsize,
}

impl GrpcTransport {
    /// Dials `pool_size` channels to `endpoint` eagerly, so configuration
    /// errors surface at connect time rather than on first use.
    pub async fn connect(
        endpoint: &str,
        pool_size: usize,
        max_message_size: usize,
    ) -> Result<GrpcTransport, Error> {
        let pool_size = pool_size.max(1);
        let target = Endpoint::from_shared(endpoint.to_string())
            .map_err(|e| Error::Connection(format!("invalid endpoint {endpoint:?}: {e}")))?;

        let mut clients = Vec::with_capacity(pool_size);
        for _ in 0..pool_size {
            let channel = target
                .clone()
                .connect()
                .await
                .map_err(|e| Error::Connection(format!("failed to connect to {endpoint:?}: {e}")))?;
            clients.push(BigtableClient::new(channel).max_message_size(max_message_size));
        }

        Ok(GrpcTransport {
            clients,
            next: AtomicUsize::new(0),
        })
    }

    fn pick(&self) -> BigtableClient {
        let index = self.next.fetch_add(1, Ordering::Relaxed) % self.clients.len();
        self.clients[index].clone()
    }
}

#[async_trait]
impl DataTransport for GrpcTransport {
    async fn read_rows(
        &self,
        request: Request<pb::ReadRowsRequest>,
    ) -> Result<MessageStream<pb::ReadRowsResponse>, Status> {
        let response = self.pick().read_rows(request).await?;
        Ok(boxed(response.into_inner()))
    }

    async fn sample_row_keys(
        &self,
        request: Request<pb::SampleRowKeysRequest>,
    ) -> Result<MessageStream<pb::SampleRowKeysResponse>, Status> {
        let response = self.pick().sample_row_keys(request).await?;
        Ok(boxed(response.into_inner()))
    }

    async fn mutate_row(
        &self,
        request: Request<pb::MutateRowRequest>,
    ) -> Result<pb::MutateRowResponse, Status> {
        let response = self.pick().mutate_row(request).await?;
        Ok(response.into_inner())
    }

    async fn mutate_rows(
        &self,
        request: Request<pb::MutateRowsRequest>,
    ) -> Result<MessageStream<pb::MutateRowsResponse>, Status> {
        let response = self.pick().mutate_rows(request).await?;
        Ok(boxed(response.into_inner()))
    }

    async fn check_and_mutate_row(
        &self,
        request: Request<pb::CheckAndMutateRowRequest>,
    ) -> Result<pb::CheckAndMutateRowResponse, Status> {
        let response = self.pick().check_and_mutate_row(request).await?;
        Ok(response.into_inner())
    }

    async fn read_modify_write_row(
        &self,
        request: Request<pb::ReadModifyWriteRowRequest>,
    ) -> Result<pb::ReadModifyWriteRowResponse, Status> {
        let response = self.pick().read_modify_write_row(request).await?;
        Ok(response.into_inner())
    }
}
