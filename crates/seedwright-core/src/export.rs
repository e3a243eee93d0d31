//! Export entry points

use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::identity::resolve_identifier;
use crate::model::Handle;
use crate::registry::Registry;
use crate::session::Session;
use crate::sink::{self, Provenance};
use crate::transcode::transcode_with_references;
use crate::writer;

/// Settings for one export
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Also export entities that are only reachable through references
    #[serde(default = "default_follow_references")]
    pub follow_references: bool,

    /// Header comment written at the top of the document
    #[serde(default)]
    pub provenance: Provenance,
}

fn default_follow_references() -> bool {
    true
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            follow_references: default_follow_references(),
            provenance: Provenance::default(),
        }
    }
}

impl ExportConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn follow_references(mut self, follow: bool) -> Self {
        self.follow_references = follow;
        self
    }

    pub fn with_provenance(mut self, provenance: Provenance) -> Self {
        self.provenance = provenance;
        self
    }
}

/// Summary of a finished export
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportStats {
    /// Entities transcoded into the registry
    pub entities: usize,
    /// Root identifiers, in caller order
    pub roots: Vec<String>,
}

/// Builds the registry for one export invocation
struct Collector<'s, S: ?Sized> {
    session: &'s S,
    follow_references: bool,
    registry: Registry,
    roots: Vec<String>,
}

impl<'s, S: Session + ?Sized> Collector<'s, S> {
    fn new(session: &'s S, follow_references: bool) -> Self {
        Self {
            session,
            follow_references,
            registry: Registry::new(),
            roots: Vec::new(),
        }
    }

    fn add_root(&mut self, handle: Handle) -> Result<()> {
        let identifier = resolve_identifier(self.session, handle)?
            .ok_or_else(|| Error::identity(format!("root {} has no identifier", handle)))?;

        let mut pending = VecDeque::from([handle]);
        while let Some(next) = pending.pop_front() {
            let Some(id) = resolve_identifier(self.session, next)? else {
                continue;
            };
            if self.registry.contains(&id) {
                continue;
            }
            let (node, references) = transcode_with_references(self.session, next)?;
            self.registry.insert(node);
            if self.follow_references {
                pending.extend(references);
            }
        }

        if !self.roots.contains(&identifier) {
            self.roots.push(identifier);
        }
        Ok(())
    }

    fn finish(mut self) -> (String, ExportStats) {
        if self.registry.is_empty() {
            tracing::warn!("No entities to export");
        }
        let body = writer::render(&mut self.registry, self.roots.as_slice());
        let stats = ExportStats {
            entities: self.registry.len(),
            roots: self.roots,
        };
        (body, stats)
    }
}

/// Export the entities behind `roots` and return the document body
///
/// Blocks appear children first. The registry lives only for this call.
pub fn export<S: Session + ?Sized>(
    session: &S,
    roots: &[Handle],
    config: &ExportConfig,
) -> Result<String> {
    export_with_stats(session, roots, config).map(|(body, _)| body)
}

/// Like [`export`], also reporting what was exported
pub fn export_with_stats<S: Session + ?Sized>(
    session: &S,
    roots: &[Handle],
    config: &ExportConfig,
) -> Result<(String, ExportStats)> {
    tracing::debug!(
        "Exporting {} roots (follow_references={})",
        roots.len(),
        config.follow_references
    );

    let mut collector = Collector::new(session, config.follow_references);
    for &root in roots {
        collector.add_root(root)?;
    }
    Ok(collector.finish())
}

/// Export `roots` and write the document to `<output_dir>/<filename>.yml`
pub fn export_to_file<S: Session + ?Sized>(
    session: &S,
    roots: &[Handle],
    config: &ExportConfig,
    output_dir: &Path,
    filename: &str,
) -> Result<(PathBuf, ExportStats)> {
    let (body, stats) = export_with_stats(session, roots, config)?;
    let path = sink::output_path(output_dir, filename);
    sink::write(&path, &config.provenance, &body)?;

    tracing::info!(
        "Exported {} entities from {} roots to {:?}",
        stats.entities,
        stats.roots.len(),
        path
    );
    Ok((path, stats))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Field, Instance, Object, Proxy, Value};
    use tempfile::TempDir;

    /// Author_1 with two books, Book_11 reached through a proxy
    fn library() -> Vec<Object> {
        vec![
            Instance::new("Author")
                .with_primary_key(1)
                .with_field("name", "Ada")
                .with_field("books", Value::list(vec![Value::from(Handle(1)), Value::from(Handle(3))]))
                .into(),
            Instance::new("Book")
                .with_primary_key(10)
                .with_field("title", "Notes")
                .into(),
            Instance::new("Book")
                .with_primary_key(11)
                .with_field("title", "Sketch")
                .into(),
            Proxy::new("Book_$$_proxy_5", Some(Handle(2))).into(),
        ]
    }

    fn position(body: &str, header: &str) -> usize {
        body.find(header)
            .unwrap_or_else(|| panic!("{} missing from:\n{}", header, body))
    }

    #[test]
    fn test_scenario_children_first() {
        let session = library();
        let body = export(
            &session,
            &[Handle(1), Handle(2), Handle(0)],
            &ExportConfig::default(),
        )
        .unwrap();

        let book10 = position(&body, "Book(Book_10):");
        let book11 = position(&body, "Book(Book_11):");
        let author = position(&body, "Author(Author_1):");
        assert!(book10 < book11 && book11 < author);
        assert!(body.contains("    books:\n        - Book_10\n        - Book_11\n"));
        assert_eq!(body.matches("Book(Book_11):").count(), 1);
    }

    #[test]
    fn test_mutual_references() {
        let session: Vec<Object> = vec![
            Instance::new("A")
                .with_primary_key(1)
                .with_field("partner", Handle(1))
                .into(),
            Instance::new("B")
                .with_primary_key(2)
                .with_field("partner", Handle(0))
                .into(),
        ];

        let body = export(&session, &[Handle(0), Handle(1)], &ExportConfig::default()).unwrap();
        assert_eq!(
            body,
            "\nB(B_2):\n    partner: A_1\n\nA(A_1):\n    partner: B_2\n"
        );
    }

    #[test]
    fn test_follow_references_pulls_in_children() {
        let session = library();
        let body = export(&session, &[Handle(0)], &ExportConfig::default()).unwrap();

        assert!(body.contains("Book(Book_10):"));
        assert!(body.contains("Book(Book_11):"));
        assert!(body.ends_with("        - Book_11\n"));
    }

    #[test]
    fn test_unsupplied_children_are_dangling() {
        let session = library();
        let config = ExportConfig::new().follow_references(false);
        let body = export(&session, &[Handle(0)], &config).unwrap();

        assert!(!body.contains("Book(Book_10):"));
        assert!(body.starts_with("\nAuthor(Author_1):\n"));
        assert!(body.contains("        - Book_10\n"));
    }

    #[test]
    fn test_output_is_deterministic() {
        let session = library();
        let roots = [Handle(0), Handle(2)];
        let first = export(&session, &roots, &ExportConfig::default()).unwrap();
        let second = export(&session, &roots, &ExportConfig::default()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_temporal_and_empty_fields() {
        let session: Vec<Object> = vec![Instance::new("Event")
            .with_primary_key(3)
            .with_field("held", Value::temporal("23-11-05 10:00:00"))
            .with_field("guests", Value::list(vec![]))
            .with(Field::new("notes", Value::Null).large_text())
            .into()];

        let body = export(&session, &[Handle(0)], &ExportConfig::default()).unwrap();
        assert_eq!(body, "\nEvent(Event_3):\n    held: 2023-11-05\n");
    }

    #[test]
    fn test_error_aborts_export() {
        let session: Vec<Object> = vec![Instance::new("Event")
            .with_primary_key(3)
            .with_field("held", Value::temporal("next tuesday"))
            .into()];

        assert!(matches!(
            export(&session, &[Handle(0)], &ExportConfig::default()),
            Err(Error::TemporalParse { .. })
        ));
    }

    #[test]
    fn test_stats_and_root_order() {
        let session = library();
        let (_, stats) =
            export_with_stats(&session, &[Handle(3), Handle(0), Handle(2)], &ExportConfig::default())
                .unwrap();

        assert_eq!(stats.roots, vec!["Book_11", "Author_1"]);
        assert_eq!(stats.entities, 3);
    }

    #[test]
    fn test_export_to_file() {
        let dir = TempDir::new().unwrap();
        let session = library();

        let (path, stats) = export_to_file(
            &session,
            &[Handle(0)],
            &ExportConfig::default(),
            dir.path(),
            "library",
        )
        .unwrap();

        assert_eq!(path, dir.path().join("library.yml"));
        assert_eq!(stats.entities, 3);
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("# Generated by seedwright ("));
        assert!(text.contains("\n\nBook(Book_10):\n    title: Notes\n"));
    }
}
