// src/config.rs
//
//! Client construction knobs.

/// Endpoint and retry settings for [`crate::S3Client`].
///
/// A plain immutable value: construct one per client (or rely on
/// `Default`) and hand it over. Retries themselves are executed by the
/// SDK; this only configures its policy.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Endpoint override, e.g. `http://localhost:9000` for MinIO.
    /// When `None`, `AWS_ENDPOINT_URL` is consulted at build time.
    pub endpoint_url: Option<String>,
    /// Retry attempt cap (default: 10).
    pub max_attempts: u32,
    /// Use the SDK's adaptive client-side rate limiting (default: true).
    pub adaptive_retry: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint_url: None,
            max_attempts: 10,
            adaptive_retry: true,
        }
    }
}

impl ClientConfig {
    /// Default policy pointed at a specific endpoint.
    pub fn with_endpoint(endpoint_url: impl Into<String>) -> Self {
        Self {
            endpoint_url: Some(endpoint_url.into()),
            ..Self::default()
        }
    }
}
