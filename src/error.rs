// src/error.rs
//
//! Error taxonomy for the crate.
//!
//! Which variants surface where is part of the contract: `stat_object`
//! raises `NotFound`, the existence checks swallow everything into `false`,
//! uploads degrade to a boolean, downloads propagate.

use thiserror::Error;

/// Boxed source for errors bubbled out of the AWS SDK.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum Error {
    /// The remote object does not exist (service-reported 404).
    #[error("object not found: {uri}")]
    NotFound { uri: String },

    /// Construction-time validation failure; always propagated.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Network or storage failure while talking to the service.
    #[error("transfer failed for {uri}: {source}")]
    Transfer {
        uri: String,
        #[source]
        source: BoxError,
    },

    /// Local filesystem failure.
    #[error("local I/O error: {0}")]
    LocalIo(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
