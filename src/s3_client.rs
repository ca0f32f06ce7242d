// src/s3_client.rs
//
// Copyright, 2025.  Signal65 / Futurum Group.
//
//! Thread-safe, blocking wrapper around the async AWS Rust SDK.
//!
//! Every byte-moving operation delegates to the SDK; retries and backoff run
//! inside the SDK under the policy configured by [`ClientConfig`]. Each
//! blocking method has an `_async` twin that is safe to call from any async
//! context.

use std::collections::HashMap;
use std::env;
use std::path::Path;

use aws_config::meta::region::RegionProviderChain;
use aws_config::retry::RetryConfig;
use aws_sdk_s3::operation::head_object::HeadObjectOutput;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::{Client, config::Region};
use chrono::{DateTime, Utc};
use log::{debug, error, info};
use once_cell::sync::Lazy;
use tokio::runtime::Handle;
use tokio::task;

use crate::config::ClientConfig;
use crate::error::{Error, Result};

pub const DEFAULT_REGION: &str = "us-east-1";

/// URI scheme marker for remote paths.
pub const S3_SCHEME: &str = "s3://";

// -----------------------------------------------------------------------------
//  Helper: synchronously wait on a future -------------------------------------
// -----------------------------------------------------------------------------
pub(crate) fn block_on<F: std::future::Future>(fut: F) -> F::Output {
    match Handle::try_current() {
        Ok(handle) => task::block_in_place(|| handle.block_on(fut)),
        Err(_) => {
            static RT: Lazy<tokio::runtime::Runtime> =
                Lazy::new(|| tokio::runtime::Runtime::new().expect("tokio runtime"));
            RT.block_on(fut)
        }
    }
}

// -----------------------------------------------------------------------------
//  URI helpers ----------------------------------------------------------------
// -----------------------------------------------------------------------------

/// Format the canonical remote URI for `(bucket, key)`.
///
/// Pure string formatting; no validation, no side effects.
pub fn s3_path(bucket: &str, key: &str) -> String {
    format!("{S3_SCHEME}{bucket}/{key}")
}

/// Split `s3://bucket/key` into (`bucket`, `key`).
///
/// The key may contain slashes and may be empty (`s3://bucket` names a bare
/// bucket). A URI without the `s3://` scheme is rejected.
pub fn parse_s3_uri(uri: &str) -> Result<(String, String)> {
    let trimmed = uri
        .strip_prefix(S3_SCHEME)
        .ok_or_else(|| Error::InvalidArgument(format!("URI must start with s3://: {uri}")))?;
    let (bucket, key) = match trimmed.split_once('/') {
        Some((bucket, key)) => (bucket, key),
        None => (trimmed, ""),
    };
    if bucket.is_empty() {
        return Err(Error::InvalidArgument(format!("URI has no bucket: {uri}")));
    }
    Ok((bucket.to_owned(), key.to_owned()))
}

// -----------------------------------------------------------------------------
//  Object metadata ------------------------------------------------------------
// -----------------------------------------------------------------------------

/// Recognized metadata fields of a HEAD response. Everything else the
/// service returns is dropped.
#[derive(Debug, Clone)]
pub struct ObjectStat {
    pub last_modified: Option<DateTime<Utc>>,
    /// ContentLength in bytes.
    pub size: u64,
    pub e_tag: Option<String>,
    pub version_id: Option<String>,
    pub content_type: Option<String>,
    /// User metadata (`x-amz-meta-*`).
    pub metadata: HashMap<String, String>,
}

impl ObjectStat {
    fn from_head(out: &HeadObjectOutput) -> Self {
        Self {
            last_modified: out
                .last_modified()
                .and_then(|t| DateTime::from_timestamp(t.secs(), t.subsec_nanos())),
            size: out.content_length().unwrap_or_default() as u64,
            e_tag: out.e_tag().map(str::to_owned),
            version_id: out.version_id().map(str::to_owned),
            content_type: out.content_type().map(str::to_owned),
            metadata: out.metadata().cloned().unwrap_or_default(),
        }
    }
}

// -----------------------------------------------------------------------------
//  Client facade --------------------------------------------------------------
// -----------------------------------------------------------------------------

/// Stateless facade over the SDK client.
///
/// Cheap to clone and safe to share across threads. Note the contractual
/// asymmetry between the transfer directions: [`upload_file`] swallows
/// failures into a boolean, [`download_file`] propagates them.
///
/// There is no cross-caller exclusivity: two callers racing a
/// skip-if-exists check on the same key may both transfer, and the remote
/// store keeps the last writer.
///
/// [`upload_file`]: S3Client::upload_file
/// [`download_file`]: S3Client::download_file
#[derive(Debug, Clone)]
pub struct S3Client {
    client: Client,
    endpoint: Option<String>,
}

impl S3Client {
    /// Build a client with the default [`ClientConfig`].
    pub fn new() -> Self {
        Self::with_config(ClientConfig::default())
    }

    pub fn with_config(config: ClientConfig) -> Self {
        block_on(Self::with_config_async(config))
    }

    pub async fn with_config_async(config: ClientConfig) -> Self {
        // Load .env first so AWS_* vars are available. Credentials are left
        // to the SDK's default provider chain (env, profile, IMDS).
        dotenvy::dotenv().ok();

        let region = RegionProviderChain::first_try(env::var("AWS_REGION").ok().map(Region::new))
            .or_default_provider()
            .or_else(Region::new(DEFAULT_REGION));

        let retry = if config.adaptive_retry {
            RetryConfig::adaptive()
        } else {
            RetryConfig::standard()
        }
        .with_max_attempts(config.max_attempts);

        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(region)
            .retry_config(retry);

        let endpoint = config
            .endpoint_url
            .or_else(|| env::var("AWS_ENDPOINT_URL").ok().filter(|e| !e.is_empty()));
        if let Some(endpoint) = &endpoint {
            loader = loader.endpoint_url(endpoint);
        }

        let cfg = loader.load().await;

        // Path-style addressing: virtual-hosted style (bucket.endpoint) does
        // not work with custom endpoints (MinIO, Ceph).
        let s3_config = aws_sdk_s3::config::Builder::from(&cfg)
            .force_path_style(true)
            .build();

        Self {
            client: Client::from_conf(s3_config),
            endpoint,
        }
    }

    /// The configured endpoint override, if any.
    pub fn endpoint(&self) -> Option<&str> {
        self.endpoint.as_deref()
    }

    /// HEAD an object and return its recognized metadata fields.
    ///
    /// A service-reported 404 surfaces as [`Error::NotFound`]; any other
    /// failure as [`Error::Transfer`].
    pub fn stat_object(&self, bucket: &str, key: &str) -> Result<ObjectStat> {
        block_on(self.stat_object_async(bucket, key))
    }

    pub async fn stat_object_async(&self, bucket: &str, key: &str) -> Result<ObjectStat> {
        match self
            .client
            .head_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
        {
            Ok(out) => Ok(ObjectStat::from_head(&out)),
            Err(e) => {
                let uri = s3_path(bucket, key);
                if e.as_service_error().is_some_and(|se| se.is_not_found()) {
                    Err(Error::NotFound { uri })
                } else {
                    Err(Error::Transfer {
                        uri,
                        source: Box::new(e),
                    })
                }
            }
        }
    }

    /// Whether the object exists. Never raises: any failure, not just a
    /// 404, reads as absent. Callers that need to tell a missing object
    /// from a broken connection should use [`stat_object`] instead.
    ///
    /// [`stat_object`]: S3Client::stat_object
    pub fn exists(&self, bucket: &str, key: &str) -> bool {
        block_on(self.exists_async(bucket, key))
    }

    pub async fn exists_async(&self, bucket: &str, key: &str) -> bool {
        match self.stat_object_async(bucket, key).await {
            Ok(_) => true,
            Err(Error::NotFound { .. }) => false,
            Err(e) => {
                debug!(
                    "exists check for {} failed, treating as absent: {e}",
                    s3_path(bucket, key)
                );
                false
            }
        }
    }

    /// Upload a local file.
    ///
    /// An empty or absent `key` is derived from the file's base name. When
    /// `overwrite` is false and the object already exists the transfer is
    /// skipped and the call still reports success. Failures are logged and
    /// degrade to `false`; this method never raises.
    pub fn upload_file(
        &self,
        path: impl AsRef<Path>,
        bucket: &str,
        key: Option<&str>,
        overwrite: bool,
    ) -> bool {
        block_on(self.upload_file_async(path.as_ref(), bucket, key, overwrite))
    }

    pub async fn upload_file_async(
        &self,
        path: &Path,
        bucket: &str,
        key: Option<&str>,
        overwrite: bool,
    ) -> bool {
        let key = match key.filter(|k| !k.is_empty()) {
            Some(k) => k.to_owned(),
            None => match path.file_name() {
                Some(name) => name.to_string_lossy().into_owned(),
                None => {
                    error!("upload: cannot derive a key from {}", path.display());
                    return false;
                }
            },
        };
        let uri = s3_path(bucket, &key);

        if !overwrite && self.exists_async(bucket, &key).await {
            info!("upload: {uri} already exists, skipping");
            return true;
        }

        let body = match ByteStream::from_path(path).await {
            Ok(body) => body,
            Err(e) => {
                error!("upload: cannot read {}: {e}", path.display());
                return false;
            }
        };
        match self
            .client
            .put_object()
            .bucket(bucket)
            .key(&key)
            .body(body)
            .send()
            .await
        {
            Ok(_) => {
                info!("uploaded {} -> {uri}", path.display());
                true
            }
            Err(e) => {
                error!("upload of {uri} failed: {e}");
                false
            }
        }
    }

    /// Download an object to `target`.
    ///
    /// When `target` already exists and `overwrite` is false the transfer is
    /// skipped. The target's parent directory is created on demand. Unlike
    /// [`upload_file`], transfer and filesystem failures propagate.
    ///
    /// [`upload_file`]: S3Client::upload_file
    pub fn download_file(
        &self,
        bucket: &str,
        key: &str,
        target: impl AsRef<Path>,
        overwrite: bool,
    ) -> Result<()> {
        block_on(self.download_file_async(bucket, key, target.as_ref(), overwrite))
    }

    pub async fn download_file_async(
        &self,
        bucket: &str,
        key: &str,
        target: &Path,
        overwrite: bool,
    ) -> Result<()> {
        if target.exists() && !overwrite {
            info!("download: {} already present, skipping", target.display());
            return Ok(());
        }
        if let Some(parent) = target.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let uri = s3_path(bucket, key);
        info!("downloading {uri} -> {}", target.display());

        let resp = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                if e.as_service_error().is_some_and(|se| se.is_no_such_key()) {
                    Error::NotFound { uri: uri.clone() }
                } else {
                    Error::Transfer {
                        uri: uri.clone(),
                        source: Box::new(e),
                    }
                }
            })?;
        let data = resp.body.collect().await.map_err(|e| Error::Transfer {
            uri: uri.clone(),
            source: Box::new(e),
        })?;
        tokio::fs::write(target, data.into_bytes()).await?;
        Ok(())
    }
}

impl Default for S3Client {
    fn default() -> Self {
        Self::new()
    }
}
