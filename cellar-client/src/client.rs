use std::sync::Arc;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::retry::RetryPolicy;
use crate::table::Table;
use crate::transport::{DataTransport, GrpcTransport};
use crate::Result;

/// Production data endpoint.
pub const PROD_ENDPOINT: &str = "https://bigtable.googleapis.com";
/// Production data endpoint for mTLS deployments.
pub const MTLS_PROD_ENDPOINT: &str = "https://bigtable.mtls.googleapis.com";

/// Matches the escaping of the request-params header: unreserved characters
/// pass through, everything else is percent-encoded.
const HEADER_ESCAPE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Configuration for a data-plane client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Endpoint URL to dial.
    pub endpoint: String,
    /// App profile tag attached to every request; empty selects the
    /// instance's default profile.
    pub app_profile: String,
    /// Number of independent channels in the connection pool.
    pub pool_size: usize,
    /// Per-RPC send and receive message size cap.
    pub max_message_size: usize,
    /// Retry classification and backoff shared by all data operations.
    pub retry: RetryPolicy,
    /// Extra metadata joined into every outgoing request.
    pub metadata: Vec<(String, String)>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: PROD_ENDPOINT.to_string(),
            app_profile: String::new(),
            pool_size: 4,
            max_message_size: 1 << 28,
            retry: RetryPolicy::default(),
            metadata: Vec::new(),
        }
    }
}

impl ClientConfig {
    pub fn new() -> ClientConfig {
        ClientConfig::default()
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> ClientConfig {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_app_profile(mut self, app_profile: impl Into<String>) -> ClientConfig {
        self.app_profile = app_profile.into();
        self
    }

    pub fn with_pool_size(mut self, pool_size: usize) -> ClientConfig {
        self.pool_size = pool_size;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> ClientConfig {
        self.retry = retry;
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> ClientConfig {
        self.metadata.push((key.into(), value.into()));
        self
    }
}

pub(crate) struct Inner {
    pub(crate) transport: Arc<dyn DataTransport>,
    pub(crate) project: String,
    pub(crate) instance: String,
    pub(crate) app_profile: String,
    pub(crate) retry: RetryPolicy,
    pub(crate) metadata: Vec<(String, String)>,
}

/// A client for reading and writing data in the tables of one instance.
///
/// Safe to share across tasks; clones are cheap handles on the same
/// connection pool. The pool closes when the last handle (including every
/// [`Table`] opened from it) is dropped.
#[derive(Clone)]
pub struct Client {
    inner: Arc<Inner>,
}

impl Client {
    /// Connects to the production endpoint with the default configuration.
    pub async fn connect(project: &str, instance: &str) -> Result<Client> {
        Client::connect_with_config(project, instance, ClientConfig::default()).await
    }

    pub async fn connect_with_config(
        project: &str,
        instance: &str,
        config: ClientConfig,
    ) -> Result<Client> {
        let transport =
            GrpcTransport::connect(&config.endpoint, config.pool_size, config.max_message_size)
                .await?;
        Ok(Client::with_transport(
            Arc::new(transport),
            project,
            instance,
            config,
        ))
    }

    /// Builds a client over a caller-supplied transport. The endpoint and
    /// pool fields of `config` are ignored; everything else applies. Useful
    /// for in-memory and instrumented transports.
    pub fn with_transport(
        transport: Arc<dyn DataTransport>,
        project: &str,
        instance: &str,
        config: ClientConfig,
    ) -> Client {
        Client {
            inner: Arc::new(Inner {
                transport,
                project: project.to_string(),
                instance: instance.to_string(),
                app_profile: config.app_profile,
                retry: config.retry,
                metadata: config.metadata,
            }),
        }
    }

    /// Opens a handle on one table. Cheap; handles share the client's pool.
    pub fn open(&self, table: &str) -> Table {
        Table::open(self.inner.clone(), table)
    }

    /// Fully-qualified resource name of `table`.
    pub fn full_table_name(&self, table: &str) -> String {
        full_table_name(&self.inner.project, &self.inner.instance, table)
    }
}

pub(crate) fn full_table_name(project: &str, instance: &str, table: &str) -> String {
    format!("projects/{project}/instances/{instance}/tables/{table}")
}

pub(crate) fn request_params_header_value(full_table_name: &str, app_profile: &str) -> String {
    format!(
        "table_name={}&app_profile_id={}",
        utf8_percent_encode(full_table_name, HEADER_ESCAPE),
        utf8_percent_encode(app_profile, HEADER_ESCAPE),
    )
}
