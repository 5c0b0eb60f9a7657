use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The server's read stream violated the cell-chunk framing protocol.
    /// Fatal for the stream it came from; never retried.
    #[error("malformed cell chunk: {0}")]
    InvalidChunk(String),
}

pub type Result<T> = std::result::Result<T, Error>;
