//! Stowage - Uniform file storage from the command line

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use futures::StreamExt;
use std::path::PathBuf;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod config;

use config::Config;
use stowage::{Disk, DiskManager, PutOptions};

/// Stowage - Uniform file storage from the command line
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "stowage.toml", env = "STOWAGE_CONFIG")]
    config: String,

    /// Disk to operate on (defaults to the configured default disk)
    #[arg(short, long, env = "STOWAGE_DISK")]
    disk: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Upload a local file
    Put {
        /// Destination path on the disk
        path: String,
        /// Local file to upload
        file: PathBuf,
        /// Content type to store with the object
        #[arg(long)]
        mime_type: Option<String>,
    },
    /// Print an object to standard output
    Cat { path: String },
    /// Download an object to a local file
    Get { path: String, file: PathBuf },
    /// Print the public URL of a path
    Url { path: String },
    /// Print a time-boxed download URL
    Sign {
        path: String,
        /// Validity in seconds
        #[arg(long, default_value_t = 900)]
        ttl: u64,
    },
    /// Print a time-boxed upload URL
    SignUpload {
        path: String,
        /// Validity in seconds
        #[arg(long, default_value_t = 900)]
        ttl: u64,
    },
    /// Delete an object
    Rm { path: String },
    /// Check whether an object exists
    Exists { path: String },
    /// Copy an object within the disk
    Cp { from: String, to: String },
    /// Move an object within the disk
    Mv { from: String, to: String },
    /// Print the size of an object in bytes
    Size { path: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Load configuration
    let config = Config::load(&args.config)?;

    // Initialize logging
    init_logging(&config.logging.level);

    let manager =
        DiskManager::from_config(&config.storage).context("Failed to build disk registry")?;

    let disk = match &args.disk {
        Some(name) => manager
            .get_disk(name)
            .with_context(|| format!("Disk '{}' is not configured", name))?,
        None => manager
            .get_default()
            .context("No default disk configured")?,
    };

    match args.command {
        Command::Put {
            path,
            file,
            mime_type,
        } => {
            let mut options = PutOptions::new();
            if let Some(mime_type) = mime_type {
                options = options.with_mime_type(mime_type);
            }
            let location = disk.put_file(&path, &file, options).await?;
            println!("{}", location);
        }
        Command::Cat { path } => {
            let mut stream = disk.get_stream(&path).await?;
            let mut stdout = tokio::io::stdout();
            while let Some(chunk) = stream.next().await {
                stdout.write_all(&chunk?).await?;
            }
            stdout.flush().await?;
        }
        Command::Get { path, file } => {
            disk.download(&path, &file).await?;
            println!("{}", file.display());
        }
        Command::Url { path } => {
            println!("{}", disk.url(&path));
        }
        Command::Sign { path, ttl } => {
            let url = disk.signed_url(&path, Duration::from_secs(ttl)).await?;
            println!("{}", url);
        }
        Command::SignUpload { path, ttl } => {
            let url = disk.upload_url(&path, Duration::from_secs(ttl)).await?;
            println!("{}", url);
        }
        Command::Rm { path } => {
            disk.delete(&path).await?;
        }
        Command::Exists { path } => {
            println!("{}", disk.exists(&path).await);
        }
        Command::Cp { from, to } => {
            disk.copy(&from, &to).await?;
        }
        Command::Mv { from, to } => {
            disk.rename(&from, &to).await?;
        }
        Command::Size { path } => {
            println!("{}", disk.size(&path).await?);
        }
    }

    Ok(())
}

/// Initialize logging
fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    // Command output goes to stdout, so keep diagnostics on stderr.
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}
