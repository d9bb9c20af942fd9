//! Error types for the swap agent
//!
//! Every remote failure is tagged with an [`ErrorKind`] at the point where it
//! is created, so the retry executor only ever asks `error.kind()`.

use cosmrs::rpc::error::ErrorDetail;
use thiserror::Error;

/// How a failure should be treated by the retry executor and its callers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Rate limiting or a connection/header timeout; retried indefinitely
    Transient,
    /// On-chain state that does not exist (unknown contract, missing pool)
    NotFound,
    /// Anything else; terminates the run
    Permanent,
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("rate limited by {endpoint} (HTTP 429)")]
    RateLimited { endpoint: String },

    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("RPC error: {0}")]
    Rpc(String),

    #[error("transaction {hash} failed with code {code}: {log}")]
    TransactionFailed { hash: String, code: u32, log: String },

    #[error("transaction rejected: {0}")]
    Broadcast(String),

    #[error("Wallet error: {0}")]
    Wallet(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Encoding error: {0}")]
    Encoding(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// The single mapping from error variants to retry classification.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::RateLimited { .. } | Error::Timeout(_) => ErrorKind::Transient,
            Error::NotFound(_) => ErrorKind::NotFound,
            Error::Rpc(_)
            | Error::TransactionFailed { .. }
            | Error::Broadcast(_)
            | Error::Wallet(_)
            | Error::Config(_)
            | Error::InvalidArgument(_)
            | Error::Encoding(_)
            | Error::Network(_)
            | Error::Json(_)
            | Error::Io(_) => ErrorKind::Permanent,
        }
    }

    pub fn is_transient(&self) -> bool {
        self.kind() == ErrorKind::Transient
    }

    /// Classify a failure reported by the Tendermint RPC client.
    ///
    /// An HTTP 429 becomes [`Error::RateLimited`] and a request timeout
    /// becomes [`Error::Timeout`]. A JSON-RPC error whose data reports missing
    /// state becomes [`Error::NotFound`]. Everything else is permanent.
    pub fn from_rpc(endpoint: &str, err: cosmrs::rpc::Error) -> Self {
        match err.detail() {
            ErrorDetail::HttpRequestFailed(e) if e.status.as_u16() == 429 => Error::RateLimited {
                endpoint: endpoint.to_string(),
            },
            ErrorDetail::Http(e) if e.source.is_timeout() => {
                Error::Timeout(format!("{}: {}", endpoint, err))
            }
            ErrorDetail::Response(e) if e.source.data().is_some_and(mentions_missing) => {
                Error::NotFound(err.to_string())
            }
            ErrorDetail::Response(_) => Error::Rpc(err.to_string()),
            _ => Error::Network(format!("{}: {}", endpoint, err)),
        }
    }
}

/// Whether a node message reports a missing transaction, account or contract
pub(crate) fn mentions_missing(text: &str) -> bool {
    let text = text.to_lowercase();
    text.contains("not found") || text.contains("no such contract")
}

impl From<prost::DecodeError> for Error {
    fn from(value: prost::DecodeError) -> Self {
        Error::Encoding(value.to_string())
    }
}

impl From<prost::EncodeError> for Error {
    fn from(value: prost::EncodeError) -> Self {
        Error::Encoding(value.to_string())
    }
}

impl From<cosmrs::ErrorReport> for Error {
    fn from(value: cosmrs::ErrorReport) -> Self {
        Error::Encoding(value.to_string())
    }
}

impl From<bip32::Error> for Error {
    fn from(value: bip32::Error) -> Self {
        Error::Wallet(value.to_string())
    }
}

impl From<cosmrs::tendermint::Error> for Error {
    fn from(value: cosmrs::tendermint::Error) -> Self {
        Error::Encoding(value.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
