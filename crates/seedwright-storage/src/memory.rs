//! In-memory persistence session

use crate::error::{StorageError, StorageResult};
use seedwright_core::identity::{resolve_identifier, simple_class_name};
use seedwright_core::{Error, Handle, Object, Result, Session};
use std::collections::HashMap;

/// In-memory session
///
/// Owns every object an export can reach. Objects are addressed by the
/// handle returned on insertion and optionally by a caller-chosen key.
#[derive(Debug, Default)]
pub struct MemorySession {
    objects: Vec<Option<Object>>,
    keys: HashMap<String, Handle>,
}

impl MemorySession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an object and return its handle
    pub fn insert(&mut self, object: impl Into<Object>) -> Handle {
        self.objects.push(Some(object.into()));
        Handle(self.objects.len() - 1)
    }

    /// Reserve a handle to be filled later, so that objects can refer to
    /// each other before both exist
    pub fn reserve(&mut self) -> Handle {
        self.objects.push(None);
        Handle(self.objects.len() - 1)
    }

    /// Fill (or replace) the object behind a handle
    pub fn fill(&mut self, handle: Handle, object: impl Into<Object>) -> StorageResult<()> {
        match self.objects.get_mut(handle.0) {
            Some(slot) => {
                *slot = Some(object.into());
                Ok(())
            }
            None => Err(StorageError::UnknownKey(handle.to_string())),
        }
    }

    /// Attach a key to a handle
    pub fn bind(&mut self, key: impl Into<String>, handle: Handle) -> StorageResult<()> {
        let key = key.into();
        if self.keys.contains_key(&key) {
            return Err(StorageError::DuplicateKey(key));
        }
        self.keys.insert(key, handle);
        Ok(())
    }

    /// Handle bound to a key
    pub fn handle(&self, key: &str) -> Option<Handle> {
        self.keys.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Handles of loaded instances (proxies excluded), in insertion order
    pub fn instances(&self) -> Vec<Handle> {
        self.objects
            .iter()
            .enumerate()
            .filter(|(_, slot)| matches!(slot, Some(Object::Instance(_))))
            .map(|(i, _)| Handle(i))
            .collect()
    }

    /// Loaded instances whose simple class name is one of `classes`
    pub fn instances_of(&self, classes: &[String]) -> Vec<Handle> {
        self.objects
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| match slot {
                Some(Object::Instance(instance))
                    if classes
                        .iter()
                        .any(|c| c == simple_class_name(&instance.class_name)) =>
                {
                    Some(Handle(i))
                }
                _ => None,
            })
            .collect()
    }

    /// Find the instance carrying an identifier
    ///
    /// Instances whose identifier cannot be resolved are passed over.
    pub fn find_by_identifier(&self, identifier: &str) -> Option<Handle> {
        self.instances().into_iter().find(|&handle| {
            matches!(resolve_identifier(self, handle), Ok(Some(id)) if id == identifier)
        })
    }
}

impl Session for MemorySession {
    fn lookup(&self, handle: Handle) -> Result<&Object> {
        match self.objects.get(handle.0) {
            Some(Some(object)) => Ok(object),
            Some(None) => Err(Error::Reflection(format!(
                "object {} was reserved but never filled",
                handle
            ))),
            None => Err(Error::Reflection(format!("no object behind handle {}", handle))),
        }
    }
}
