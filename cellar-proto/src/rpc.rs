//! The `google.rpc` subset consumed by the data plane.

/// Canonical RPC status payload. Carried per entry in streaming bulk
/// mutation responses; `code` holds a canonical gRPC status code.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Status {
    #[prost(int32, tag = "1")]
    pub code: i32,
    #[prost(string, tag = "2")]
    pub message: String,
}
