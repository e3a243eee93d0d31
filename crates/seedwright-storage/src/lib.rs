//! Seedwright Storage - Persistence sessions for the exporter
//!
//! This crate provides an in-memory session that owns the live objects an
//! export reads, and a JSON snapshot format that fills one.

pub mod error;
pub mod memory;
pub mod snapshot;

pub use error::{StorageError, StorageResult};
pub use memory::MemorySession;
pub use snapshot::{Snapshot, SNAPSHOT_VERSION};
