use thiserror::Error;
use tonic::{Code, Status};

/// Errors returned by data-plane operations.
///
/// Every error maps to a canonical status code via [`Error::code`], so
/// callers classify failures uniformly regardless of which layer produced
/// them.
#[derive(Error, Debug)]
pub enum Error {
    /// The server or transport failed the RPC.
    #[error("rpc failed: {0}")]
    Rpc(#[from] Status),

    /// Establishing the channel pool failed.
    #[error("connection error: {0}")]
    Connection(String),

    /// The read stream violated chunk framing. Fatal for the stream; never
    /// retried.
    #[error(transparent)]
    Chunk(#[from] cellar_core::Error),

    /// The request was rejected client-side before anything hit the wire.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl Error {
    /// The canonical status code for this error.
    pub fn code(&self) -> Code {
        match self {
            Error::Rpc(status) => status.code(),
            Error::Connection(_) => Code::Unavailable,
            Error::Chunk(_) => Code::Internal,
            Error::InvalidArgument(_) => Code::InvalidArgument,
        }
    }

    /// Rebuilds a status-shaped error from a wire `(code, message)` pair, as
    /// carried per entry in bulk mutation responses.
    pub(crate) fn from_wire_status(code: i32, message: String) -> Error {
        Error::Rpc(Status::new(Code::from_i32(code), message))
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_classification() {
        assert_eq!(
            Error::Rpc(Status::unavailable("down")).code(),
            Code::Unavailable
        );
        assert_eq!(
            Error::InvalidArgument("bad".to_string()).code(),
            Code::InvalidArgument
        );
        assert_eq!(
            Error::Chunk(cellar_core::Error::InvalidChunk("bad".to_string())).code(),
            Code::Internal
        );
    }

    #[test]
    fn test_from_wire_status_round_trips_code() {
        let err = Error::from_wire_status(Code::Aborted as i32, "conflict".to_string());
        assert_eq!(err.code(), Code::Aborted);
    }
}
