//! Stowage
//!
//! A uniform file-storage layer over the local filesystem and
//! S3-compatible object stores. Disks are registered by name in a
//! [`DiskManager`], which also acts as a facade over a configurable
//! default disk.

pub mod config;
pub mod disk;
pub mod error;
pub mod local;
pub mod manager;
pub mod options;
pub mod s3;

pub use config::{DiskConfig, DriverKind, LocalDiskConfig, S3DiskConfig, StorageConfig};
pub use disk::{bytes_stream, file_stream, AnyDisk, ByteStream, Disk};
pub use error::StorageError;
pub use local::LocalDisk;
pub use manager::DiskManager;
pub use options::{Acl, PutOptions};
pub use s3::S3Disk;
