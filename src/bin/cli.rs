// src/bin/cli.rs
//
// Copyright, 2025.  Signal65 / Futurum Group.
//
//! CLI supporting `stat`, `exists`, `upload`, `download`, and `path`.
//!
//! Examples:
//! ```bash
//! s3obj-cli stat     s3://bucket/key.json
//! s3obj-cli exists   s3://bucket/key.json
//! s3obj-cli upload   local-file s3://bucket/key.json
//! s3obj-cli download s3://bucket/key.json --base-dir /tmp/cache
//! s3obj-cli path     s3://bucket/key.json
//! ```

use anyhow::{Result, bail};
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

use s3obj::{ObjectOpts, S3Object};

#[derive(Parser)]
#[command(name = "s3obj-cli", about = "Idempotent S3 upload/download tool")]
struct Cli {
    /// Increase log verbosity (-v = info, -vv = debug)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the recognized header fields of a remote object
    Stat { uri: String },

    /// Print whether the remote object exists
    Exists { uri: String },

    /// Upload a local file; the key falls back to the file's base name
    /// when the URI names a bare bucket
    Upload {
        file: PathBuf,
        uri: String,
        #[arg(long)]
        overwrite: bool,
    },

    /// Download an object to its derived local path, or an explicit target
    Download {
        uri: String,
        target: Option<PathBuf>,
        #[arg(long)]
        base_dir: Option<PathBuf>,
        #[arg(long)]
        overwrite: bool,
    },

    /// Print the derived local path and name parts; no network access
    Path {
        uri: String,
        #[arg(long)]
        base_dir: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        _ => log::LevelFilter::Debug,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    match cli.cmd {
        Command::Stat { uri } => {
            let obj = S3Object::from_s3_uri(&uri, ObjectOpts::default())?;
            let stat = obj.header()?;
            println!("{}", obj.s3_path());
            if let Some(t) = stat.last_modified {
                println!("  last-modified: {t}");
            }
            println!("  size:          {}", stat.size);
            if let Some(etag) = &stat.e_tag {
                println!("  etag:          {etag}");
            }
            if let Some(version) = &stat.version_id {
                println!("  version-id:    {version}");
            }
            if let Some(ct) = &stat.content_type {
                println!("  content-type:  {ct}");
            }
            for (k, v) in &stat.metadata {
                println!("  meta:{k} = {v}");
            }
        }
        Command::Exists { uri } => {
            let obj = S3Object::from_s3_uri(&uri, ObjectOpts::default())?;
            println!("{}", obj.exists_remote());
        }
        Command::Upload {
            file,
            uri,
            overwrite,
        } => {
            let opts = ObjectOpts {
                local_path: Some(file),
                ..Default::default()
            };
            let obj = S3Object::from_s3_uri(&uri, opts)?;
            if !obj.upload(overwrite) {
                bail!("upload failed for {}", obj.s3_path());
            }
        }
        Command::Download {
            uri,
            target,
            base_dir,
            overwrite,
        } => {
            let opts = ObjectOpts {
                local_path: target,
                base_dir,
                ..Default::default()
            };
            let obj = S3Object::from_s3_uri(&uri, opts)?;
            obj.download(overwrite)?;
            println!("{}", obj.local_path().display());
        }
        Command::Path { uri, base_dir } => {
            let opts = ObjectOpts {
                base_dir,
                ..Default::default()
            };
            let obj = S3Object::from_s3_uri(&uri, opts)?;
            println!("local_path: {}", obj.local_path().display());
            println!("name:       {}", obj.name());
            println!("extension:  {}", obj.extension());
            println!("basename:   {}", obj.basename());
        }
    }
    Ok(())
}
