// tests/local_ops.rs
//
// Filesystem-side behavior and the error-propagation contract, exercised
// without a live object store. The client is pointed at a dead local
// endpoint with retries cut to one attempt, so transport failures are
// immediate and nothing leaves the host. Idempotence pre-checks run before
// any request is made, so the skip paths never touch the endpoint at all.

use std::fs;
use std::sync::Once;

use s3obj::{ClientConfig, Error, ObjectOpts, S3Client, S3Object};
use tempfile::TempDir;

static ENV: Once = Once::new();

fn dead_endpoint_client() -> S3Client {
    ENV.call_once(|| unsafe {
        std::env::set_var("AWS_ACCESS_KEY_ID", "test");
        std::env::set_var("AWS_SECRET_ACCESS_KEY", "test");
        std::env::set_var("AWS_REGION", "us-east-1");
    });
    let config = ClientConfig {
        endpoint_url: Some("http://127.0.0.1:1".to_string()),
        max_attempts: 1,
        adaptive_retry: false,
    };
    S3Client::with_config(config)
}

fn object_at(client: &S3Client, local_path: std::path::PathBuf) -> S3Object {
    let opts = ObjectOpts {
        local_path: Some(local_path),
        client: Some(client.clone()),
        ..Default::default()
    };
    S3Object::with_opts("test-bucket", "data/obj.bin", opts)
}

#[test]
fn test_download_skips_preseeded_target() {
    let tmp = TempDir::new().unwrap();
    let target = tmp.path().join("obj.bin");
    fs::write(&target, b"already here").unwrap();

    let client = dead_endpoint_client();
    // Two non-overwrite downloads against a pre-seeded target: neither may
    // transfer (the endpoint is dead, so a transfer attempt would error).
    client
        .download_file("test-bucket", "data/obj.bin", &target, false)
        .unwrap();
    client
        .download_file("test-bucket", "data/obj.bin", &target, false)
        .unwrap();
    assert_eq!(fs::read(&target).unwrap(), b"already here");
}

#[test]
fn test_object_download_skips_preseeded_local_path() {
    let tmp = TempDir::new().unwrap();
    let local = tmp.path().join("obj.bin");
    fs::write(&local, b"stale copy").unwrap();

    let client = dead_endpoint_client();
    let obj = object_at(&client, local.clone());
    obj.download(false).unwrap();
    assert_eq!(fs::read(&local).unwrap(), b"stale copy");
}

#[test]
fn test_download_transfer_failure_propagates() {
    let tmp = TempDir::new().unwrap();
    let client = dead_endpoint_client();
    let err = client
        .download_file("test-bucket", "data/obj.bin", tmp.path().join("obj.bin"), false)
        .unwrap_err();
    assert!(matches!(err, Error::Transfer { .. }));
}

#[test]
fn test_download_creates_parent_directories() {
    let tmp = TempDir::new().unwrap();
    let target = tmp.path().join("deep/nested/dir/obj.bin");

    let client = dead_endpoint_client();
    // The transfer itself fails (dead endpoint), but the parent directory
    // must already have been created by then.
    let _ = client.download_file("test-bucket", "data/obj.bin", &target, false);
    assert!(target.parent().unwrap().is_dir());
}

#[test]
fn test_upload_failure_degrades_to_false() {
    let tmp = TempDir::new().unwrap();
    let source = tmp.path().join("obj.bin");
    fs::write(&source, b"payload").unwrap();

    let client = dead_endpoint_client();
    assert!(!client.upload_file(&source, "test-bucket", Some("data/obj.bin"), false));
}

#[test]
fn test_upload_missing_source_degrades_to_false() {
    let tmp = TempDir::new().unwrap();
    let client = dead_endpoint_client();
    assert!(!client.upload_file(tmp.path().join("nope.bin"), "test-bucket", None, true));
}

#[test]
fn test_exists_swallows_transport_errors() {
    let client = dead_endpoint_client();
    assert!(!client.exists("test-bucket", "data/obj.bin"));
}

#[test]
fn test_stat_object_raises_on_transport_errors() {
    // The asymmetry with exists(): the raw metadata fetch does propagate.
    let client = dead_endpoint_client();
    let err = client.stat_object("test-bucket", "data/obj.bin").unwrap_err();
    assert!(matches!(err, Error::Transfer { .. }));
}

#[test]
fn test_exists_local() {
    let tmp = TempDir::new().unwrap();
    let local = tmp.path().join("obj.bin");

    let client = dead_endpoint_client();
    let obj = object_at(&client, local.clone());
    assert!(!obj.exists_local());

    fs::write(&local, b"x").unwrap();
    assert!(obj.exists_local());
}

#[test]
fn test_delete_removes_local_file() {
    let tmp = TempDir::new().unwrap();
    let local = tmp.path().join("obj.bin");
    fs::write(&local, b"x").unwrap();

    let client = dead_endpoint_client();
    let obj = object_at(&client, local.clone());
    obj.delete();
    assert!(!local.exists());
}

#[test]
fn test_delete_missing_file_is_swallowed() {
    let tmp = TempDir::new().unwrap();
    let client = dead_endpoint_client();
    let obj = object_at(&client, tmp.path().join("never-existed.bin"));
    // Logs a warning and returns normally.
    obj.delete();
    obj.delete();
}

#[test]
fn test_delete_leaves_object_value_usable() {
    let tmp = TempDir::new().unwrap();
    let local = tmp.path().join("obj.bin");
    fs::write(&local, b"x").unwrap();

    let client = dead_endpoint_client();
    let obj = object_at(&client, local);
    obj.delete();
    // Identity fields survive the delete; only the referenced file is gone.
    assert_eq!(obj.bucket(), "test-bucket");
    assert_eq!(obj.s3_path(), "s3://test-bucket/data/obj.bin");
    assert!(!obj.exists_local());
}
