//! Seedwright Core - Object graph to YAML fixture export
//!
//! This crate turns a graph of persistent entities into a block-style YAML
//! fixture document. References between entities are written as symbolic
//! identifiers, and every entity is emitted once, after the entities it
//! references.

pub mod classify;
pub mod error;
pub mod export;
pub mod identity;
pub mod model;
pub mod registry;
pub mod session;
pub mod sink;
pub mod transcode;
pub mod writer;

pub use classify::{classify, Encoded, FieldEncoding, FieldKind};
pub use error::{Error, Result};
pub use export::{export, export_to_file, export_with_stats, ExportConfig, ExportStats};
pub use identity::resolve_identifier;
pub use model::{Field, FieldMarkers, Handle, Instance, Object, Proxy, Value};
pub use registry::{EntityNode, Registry};
pub use session::Session;
pub use sink::Provenance;
pub use transcode::transcode;
pub use writer::render;
