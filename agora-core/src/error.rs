use std::fmt;

/// Errors surfaced by the node runtime and its supporting crates.
///
/// Handler-level failures are always caught at the request dispatcher and
/// turned into an `{error: ...}` reply; this type exists for the plumbing
/// underneath that boundary (sockets, the wire codec, persistence).
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("zeromq error: {0}")]
    Zmq(#[from] zmq::Error),

    #[error("wire codec error: {0}")]
    Codec(String),

    #[error("persistence error: {0}")]
    Persistence(String),

    #[error("{0}")]
    Internal(String),
}

impl Error {
    pub fn codec(msg: impl fmt::Display) -> Self {
        Error::Codec(msg.to_string())
    }

    pub fn persistence(msg: impl fmt::Display) -> Self {
        Error::Persistence(msg.to_string())
    }

    pub fn internal(msg: impl fmt::Display) -> Self {
        Error::Internal(msg.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
