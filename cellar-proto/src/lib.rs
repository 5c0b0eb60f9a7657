//! Wire protocol bindings for the Cellar data-plane client.
//!
//! The data plane speaks the `google.bigtable.v2` protocol; these bindings
//! cover the data-plane subset (reads, mutations, samples) plus the
//! `google.rpc.Status` payload carried by per-entry mutation results.
//!
//! The message types are hand-maintained prost structs rather than build-time
//! codegen output, so the workspace builds without `protoc`. Field numbers
//! follow the published protocol and must not be changed.

pub mod rpc;
pub mod v2;
