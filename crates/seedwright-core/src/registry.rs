//! Entity nodes and the per-export registry that owns them

use std::collections::HashMap;

/// One entity, rendered and ready to be emitted
#[derive(Debug, Clone, PartialEq)]
pub struct EntityNode {
    /// `<ClassName>_<PrimaryKey>`
    pub identifier: String,

    /// Rendered block (header line plus field lines)
    pub fragment: String,

    /// Identifiers referenced by this entity's fields, in field order
    pub children: Vec<String>,

    written: bool,
}

impl EntityNode {
    pub fn new(identifier: impl Into<String>, fragment: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            fragment: fragment.into(),
            children: Vec::new(),
            written: false,
        }
    }

    pub fn with_children(mut self, children: Vec<String>) -> Self {
        self.children = children;
        self
    }

    pub fn is_written(&self) -> bool {
        self.written
    }
}

/// Arena of nodes addressed by identifier
///
/// Iteration follows insertion order so that output is reproducible.
#[derive(Debug, Default)]
pub struct Registry {
    nodes: Vec<EntityNode>,
    index: HashMap<String, usize>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a node unless one with the same identifier exists
    ///
    /// Returns `false` when the identifier was already registered; the
    /// existing node is kept.
    pub fn insert(&mut self, node: EntityNode) -> bool {
        if self.index.contains_key(&node.identifier) {
            return false;
        }
        self.index.insert(node.identifier.clone(), self.nodes.len());
        self.nodes.push(node);
        true
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.index.contains_key(identifier)
    }

    pub fn get(&self, identifier: &str) -> Option<&EntityNode> {
        self.index.get(identifier).map(|&slot| &self.nodes[slot])
    }

    /// Mark a node written; returns `true` only on the first call for a
    /// registered, unwritten node.
    pub fn mark_written(&mut self, identifier: &str) -> bool {
        match self.index.get(identifier) {
            Some(&slot) if !self.nodes[slot].written => {
                self.nodes[slot].written = true;
                true
            }
            _ => false,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Identifiers in insertion order
    pub fn identifiers(&self) -> Vec<String> {
        self.nodes.iter().map(|n| n.identifier.clone()).collect()
    }
}
