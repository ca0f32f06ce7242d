// src/s3_object.rs
//
// Copyright, 2025.  Signal65 / Futurum Group.
//
//! [`S3Object`] pairs a remote `(bucket, prefix)` identity with a local
//! filesystem path and orchestrates the idempotent transfers between them.
//!
//! Derived properties (local path, canonical URI, name, extension, header)
//! are computed once per instance and cached; identity fields never change
//! after construction.

use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use log::{info, warn};
use once_cell::sync::OnceCell;

use crate::error::{Error, Result};
use crate::s3_client::{ObjectStat, S3Client, parse_s3_uri, s3_path};

/// Bucket name used when an object is derived from a local path without an
/// explicit bucket.
pub const DEFAULT_LOCAL_BUCKET: &str = "local";

/// Optional overrides for the [`S3Object`] factories.
///
/// Named fields instead of an open-ended parameter bag: `key`, `local_path`,
/// `base_dir`, and `client` apply to every factory; `bucket` and `prefix`
/// are consulted only by [`S3Object::from_local_path`], where they override
/// the derived values.
#[derive(Debug, Clone, Default)]
pub struct ObjectOpts {
    /// Opaque caller bookkeeping; no effect on storage operations.
    pub key: Option<String>,
    /// Explicit local path, overriding the `base_dir/prefix` derivation.
    pub local_path: Option<PathBuf>,
    /// Local root under which objects materialize (default: the system
    /// temp directory).
    pub base_dir: Option<PathBuf>,
    pub bucket: Option<String>,
    pub prefix: Option<String>,
    /// Injected client; one is built lazily on first use otherwise.
    pub client: Option<S3Client>,
}

/// A remote object and its local counterpart, as one value.
#[derive(Debug, Clone)]
pub struct S3Object {
    bucket: String,
    prefix: String,
    key: Option<String>,
    base_dir: PathBuf,
    client: OnceCell<S3Client>,
    local_path: OnceCell<PathBuf>,
    s3_path: OnceCell<String>,
    name: OnceCell<String>,
    ext: OnceCell<String>,
    header: OnceCell<ObjectStat>,
}

impl S3Object {
    pub fn new(bucket: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self::with_opts(bucket, prefix, ObjectOpts::default())
    }

    pub fn with_opts(
        bucket: impl Into<String>,
        prefix: impl Into<String>,
        opts: ObjectOpts,
    ) -> Self {
        let ObjectOpts {
            key,
            local_path,
            base_dir,
            client,
            ..
        } = opts;
        Self {
            bucket: bucket.into(),
            prefix: prefix.into(),
            key,
            base_dir: base_dir.unwrap_or_else(env::temp_dir),
            client: client.map(OnceCell::with_value).unwrap_or_default(),
            local_path: local_path.map(OnceCell::with_value).unwrap_or_default(),
            s3_path: OnceCell::new(),
            name: OnceCell::new(),
            ext: OnceCell::new(),
            header: OnceCell::new(),
        }
    }

    /// Construct from a full `s3://bucket/key` URI.
    pub fn from_s3_uri(uri: &str, opts: ObjectOpts) -> Result<Self> {
        let (bucket, prefix) = parse_s3_uri(uri)?;
        Ok(Self::with_opts(bucket, prefix, opts))
    }

    /// Construct from a local path lying under `base_dir`.
    ///
    /// The prefix defaults to the path relative to `base_dir` and the
    /// bucket to [`DEFAULT_LOCAL_BUCKET`]; both can be overridden through
    /// `opts`. A path outside `base_dir` is rejected with
    /// [`Error::InvalidArgument`].
    pub fn from_local_path(local_path: impl Into<PathBuf>, mut opts: ObjectOpts) -> Result<Self> {
        let local_path = local_path.into();
        let base_dir = opts.base_dir.take().unwrap_or_else(env::temp_dir);
        let relative = local_path.strip_prefix(&base_dir).map_err(|_| {
            Error::InvalidArgument(format!(
                "base_dir {} not part of {}",
                base_dir.display(),
                local_path.display()
            ))
        })?;
        let bucket = opts
            .bucket
            .take()
            .unwrap_or_else(|| DEFAULT_LOCAL_BUCKET.to_owned());
        let prefix = match opts.prefix.take() {
            Some(prefix) => prefix,
            None => relative.to_string_lossy().into_owned(),
        };
        opts.local_path = Some(local_path);
        opts.base_dir = Some(base_dir);
        Ok(Self::with_opts(bucket, prefix, opts))
    }

    // -- identity ----------------------------------------------------------

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Caller bookkeeping key, if any.
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    // -- derived, memoized -------------------------------------------------

    /// The explicit local path if one was given, else `base_dir/prefix`.
    pub fn local_path(&self) -> &Path {
        self.local_path.get_or_init(|| self.base_dir.join(&self.prefix))
    }

    /// Canonical remote URI, `s3://bucket/prefix`.
    pub fn s3_path(&self) -> &str {
        self.s3_path.get_or_init(|| s3_path(&self.bucket, &self.prefix))
    }

    /// Extension of the final path segment, lower-cased; empty when the
    /// segment has no extension.
    pub fn extension(&self) -> &str {
        self.ext.get_or_init(|| {
            Path::new(&self.prefix)
                .extension()
                .map(|e| e.to_string_lossy().to_lowercase())
                .unwrap_or_default()
        })
    }

    /// Final path segment with the extension suffix removed.
    pub fn name(&self) -> &str {
        self.name.get_or_init(|| {
            Path::new(&self.prefix)
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default()
        })
    }

    /// Final path segment of the prefix, unmodified.
    pub fn basename(&self) -> &str {
        Path::new(&self.prefix)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("")
    }

    /// Remote metadata, fetched once and cached.
    pub fn header(&self) -> Result<&ObjectStat> {
        self.header
            .get_or_try_init(|| self.client().stat_object(&self.bucket, &self.prefix))
    }

    /// The injected client, or a lazily built default one.
    pub fn client(&self) -> &S3Client {
        self.client.get_or_init(S3Client::new)
    }

    // -- operations --------------------------------------------------------

    /// Download the remote object to [`local_path`](Self::local_path).
    /// Skipped when the file is already present and `overwrite` is false.
    pub fn download(&self, overwrite: bool) -> Result<()> {
        self.client()
            .download_file(&self.bucket, &self.prefix, self.local_path(), overwrite)
    }

    /// Upload [`local_path`](Self::local_path) to the remote identity.
    /// Skipped (still reporting success) when the object already exists and
    /// `overwrite` is false; failures are logged and degrade to `false`.
    pub fn upload(&self, overwrite: bool) -> bool {
        self.client()
            .upload_file(self.local_path(), &self.bucket, Some(self.prefix.as_str()), overwrite)
    }

    /// Whether the local file exists.
    pub fn exists_local(&self) -> bool {
        self.local_path().exists()
    }

    /// Whether the remote object exists. Never raises; any client failure
    /// reads as absent.
    pub fn exists_remote(&self) -> bool {
        self.client().exists(&self.bucket, &self.prefix)
    }

    /// Best-effort removal of the local file. Failures (missing file,
    /// permissions) are logged as a warning and swallowed. The remote
    /// object is untouched.
    pub fn delete(&self) {
        match fs::remove_file(self.local_path()) {
            Ok(()) => info!("removed {}", self.local_path().display()),
            Err(e) => warn!("delete of {} failed: {e}", self.local_path().display()),
        }
    }
}

impl fmt::Display for S3Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "S3Object(name={}, s3_path={}, local_path={})",
            self.name(),
            self.s3_path(),
            self.local_path().display()
        )
    }
}
