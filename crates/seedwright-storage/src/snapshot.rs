//! JSON snapshot of a persistence context
//!
//! A snapshot lists records in load order. Instance records carry a class,
//! an optional primary key and ordered fields; proxy records stand in for
//! a lazily loaded record. Entity references use record keys:
//!
//! ```json
//! {
//!   "version": "1",
//!   "records": [
//!     { "key": "ada", "class": "Author", "pk": 1, "fields": [
//!         { "name": "name", "value": "Ada" },
//!         { "name": "books", "value": { "list": [ { "ref": "notes" } ] } }
//!     ] },
//!     { "key": "notes", "class": "Book", "pk": 10, "fields": [] },
//!     { "key": "lazy", "proxy": "Book_$$_proxy_3", "target": "notes" }
//!   ]
//! }
//! ```

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{StorageError, StorageResult};
use crate::memory::MemorySession;
use seedwright_core::{Field, FieldMarkers, Handle, Instance, Object, Proxy, Value};

/// Snapshot format version this crate reads
pub const SNAPSHOT_VERSION: &str = "1";

/// Top-level snapshot document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub version: String,
    pub records: Vec<Record>,
}

/// One stored object
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Record {
    Instance(InstanceRecord),
    Proxy(ProxyRecord),
}

impl Record {
    pub fn key(&self) -> &str {
        match self {
            Self::Instance(r) => &r.key,
            Self::Proxy(r) => &r.key,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstanceRecord {
    pub key: String,
    pub class: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pk: Option<PrimaryKey>,
    #[serde(default)]
    pub fields: Vec<FieldRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProxyRecord {
    pub key: String,
    /// Generated proxy class name
    pub proxy: String,
    /// Key of the backing record; absent when the load cannot complete
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PrimaryKey {
    Int(i64),
    Text(String),
}

impl std::fmt::Display for PrimaryKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{}", n),
            Self::Text(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldRecord {
    pub name: String,
    #[serde(default)]
    pub value: ValueRecord,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub large_text: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub identity: bool,
}

/// Field value: plain JSON scalars, or a single-key object for the rest
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ValueRecord {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Tagged(TaggedValue),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaggedValue {
    Ref(String),
    Temporal(String),
    List(Vec<ValueRecord>),
    /// Entries as `[key, value]` pairs, in order
    Map(Vec<(String, ValueRecord)>),
    Set(Vec<ValueRecord>),
}

impl Snapshot {
    /// Read a snapshot from a JSON file
    pub fn read(path: impl AsRef<Path>) -> StorageResult<Self> {
        let path = path.as_ref();
        tracing::debug!("Reading snapshot from {:?}", path);
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> StorageResult<Self> {
        let snapshot: Snapshot = serde_json::from_str(content)?;
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(StorageError::UnsupportedVersion(snapshot.version));
        }
        Ok(snapshot)
    }

    /// Build a session holding every record, handles in record order
    pub fn into_session(self) -> StorageResult<MemorySession> {
        let mut session = MemorySession::new();
        let mut handles: HashMap<String, Handle> = HashMap::new();

        for record in &self.records {
            let handle = session.reserve();
            session.bind(record.key(), handle)?;
            handles.insert(record.key().to_string(), handle);
        }

        let resolve = |key: &str| -> StorageResult<Handle> {
            handles
                .get(key)
                .copied()
                .ok_or_else(|| StorageError::UnknownKey(key.to_string()))
        };

        for record in self.records {
            let handle = resolve(record.key())?;
            let object: Object = match record {
                Record::Instance(r) => {
                    let mut instance = Instance::new(r.class);
                    instance.primary_key = r.pk.map(|pk| pk.to_string());
                    for field in r.fields {
                        instance.fields.push(Field {
                            name: field.name,
                            value: convert(field.value, &resolve)?,
                            markers: FieldMarkers {
                                large_text: field.large_text,
                                identity: field.identity,
                            },
                        });
                    }
                    instance.into()
                }
                Record::Proxy(r) => {
                    let target = r.target.as_deref().map(resolve).transpose()?;
                    Proxy::new(r.proxy, target).into()
                }
            };
            session.fill(handle, object)?;
        }

        tracing::debug!("Loaded {} records into session", session.len());
        Ok(session)
    }
}

fn convert<F>(value: ValueRecord, resolve: &F) -> StorageResult<Value>
where
    F: Fn(&str) -> StorageResult<Handle>,
{
    let convert_all = |items: Vec<ValueRecord>| -> StorageResult<Vec<Value>> {
        items.into_iter().map(|v| convert(v, resolve)).collect()
    };

    Ok(match value {
        ValueRecord::Null => Value::Null,
        ValueRecord::Bool(b) => Value::Bool(b),
        ValueRecord::Int(n) => Value::Int(n),
        ValueRecord::Float(n) => Value::Float(n),
        ValueRecord::Text(s) => Value::Text(s),
        ValueRecord::Tagged(TaggedValue::Ref(key)) => Value::Entity(resolve(&key)?),
        ValueRecord::Tagged(TaggedValue::Temporal(raw)) => Value::Temporal(raw),
        ValueRecord::Tagged(TaggedValue::List(items)) => Value::List(convert_all(items)?),
        ValueRecord::Tagged(TaggedValue::Set(items)) => Value::set(convert_all(items)?),
        ValueRecord::Tagged(TaggedValue::Map(entries)) => {
            let mut converted = Vec::with_capacity(entries.len());
            for (key, value) in entries {
                converted.push((key, convert(value, resolve)?));
            }
            Value::map(converted)
        }
    })
}
