//! Live object model handed to the exporter by the persistence layer

use std::fmt;

/// Arena handle of an object owned by a [`Session`](crate::session::Session)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Handle(pub usize);

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Runtime value of an entity field
///
/// The variants form the closed set the field classifier dispatches over.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    /// Date/time value, held in the default string form the host produced
    /// (e.g. `2023-11-05 10:00:00.0`).
    Temporal(String),
    /// Ordered sequence
    List(Vec<Value>),
    /// Key/value mapping, kept in insertion order
    Map(Vec<(String, Value)>),
    /// Unordered unique collection
    Set(Vec<Value>),
    /// Reference to another entity (loaded instance or lazy proxy)
    Entity(Handle),
}

impl Value {
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    pub fn temporal(s: impl Into<String>) -> Self {
        Self::Temporal(s.into())
    }

    /// Temporal value in `yyyy-MM-dd hh:mm:ss.f` form
    pub fn timestamp(at: chrono::NaiveDateTime) -> Self {
        Self::Temporal(at.format("%Y-%m-%d %H:%M:%S%.1f").to_string())
    }

    pub fn list(items: impl IntoIterator<Item = Value>) -> Self {
        Self::List(items.into_iter().collect())
    }

    /// Build a mapping; a repeated key replaces the earlier entry's value.
    pub fn map<K: Into<String>>(entries: impl IntoIterator<Item = (K, Value)>) -> Self {
        let mut out: Vec<(String, Value)> = Vec::new();
        for (key, value) in entries {
            let key = key.into();
            match out.iter_mut().find(|(k, _)| *k == key) {
                Some(slot) => slot.1 = value,
                None => out.push((key, value)),
            }
        }
        Self::Map(out)
    }

    /// Build a set, dropping repeated elements and keeping first-seen order.
    pub fn set(items: impl IntoIterator<Item = Value>) -> Self {
        let mut out: Vec<Value> = Vec::new();
        for item in items {
            if !out.contains(&item) {
                out.push(item);
            }
        }
        Self::Set(out)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_entity(&self) -> Option<Handle> {
        match self {
            Self::Entity(handle) => Some(*handle),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Self::Int(n.into())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Float(n)
    }
}

impl From<Handle> for Value {
    fn from(handle: Handle) -> Self {
        Self::Entity(handle)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map(Into::into).unwrap_or(Self::Null)
    }
}

fn join(f: &mut fmt::Formatter<'_>, items: &[Value]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

/// Default string form of a value
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(b) => write!(f, "{}", b),
            Self::Int(n) => write!(f, "{}", n),
            Self::Float(n) => write!(f, "{:?}", n),
            Self::Text(s) | Self::Temporal(s) => f.write_str(s),
            Self::List(items) | Self::Set(items) => {
                f.write_str("[")?;
                join(f, items)?;
                f.write_str("]")
            }
            Self::Map(entries) => {
                f.write_str("{")?;
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}={}", key, value)?;
                }
                f.write_str("}")
            }
            Self::Entity(handle) => write!(f, "{}", handle),
        }
    }
}

/// Metadata markers attached to a field declaration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FieldMarkers {
    /// Large text column; always exported as a plain string
    pub large_text: bool,
    /// Identity column, used when the entity has no primary key convention
    pub identity: bool,
}

/// A declared field and its current value
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub value: Value,
    pub markers: FieldMarkers,
}

impl Field {
    pub fn new(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            markers: FieldMarkers::default(),
        }
    }

    pub fn large_text(mut self) -> Self {
        self.markers.large_text = true;
        self
    }

    pub fn identity(mut self) -> Self {
        self.markers.identity = true;
        self
    }
}

/// A loaded entity instance
#[derive(Debug, Clone, PartialEq)]
pub struct Instance {
    /// Runtime class name; may carry a generated proxy marker
    pub class_name: String,

    /// Primary key for entities following the model convention
    pub primary_key: Option<String>,

    /// Fields in declaration order
    pub fields: Vec<Field>,
}

impl Instance {
    pub fn new(class_name: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            primary_key: None,
            fields: Vec::new(),
        }
    }

    pub fn with_primary_key(mut self, pk: impl ToString) -> Self {
        self.primary_key = Some(pk.to_string());
        self
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.push(Field::new(name, value));
        self
    }

    /// Append a fully described field (markers included)
    pub fn with(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// The last field carrying the identity marker
    pub fn identity_field(&self) -> Option<&Field> {
        self.fields.iter().rev().find(|f| f.markers.identity)
    }
}

/// A lazy-loading stand-in for an instance
#[derive(Debug, Clone, PartialEq)]
pub struct Proxy {
    /// Generated class name, e.g. `Book_$$_proxy_12`
    pub class_name: String,

    /// Backing object; `None` when the load cannot complete
    pub target: Option<Handle>,
}

impl Proxy {
    pub fn new(class_name: impl Into<String>, target: Option<Handle>) -> Self {
        Self {
            class_name: class_name.into(),
            target,
        }
    }
}

/// Object stored behind a handle
#[derive(Debug, Clone, PartialEq)]
pub enum Object {
    Instance(Instance),
    Proxy(Proxy),
}

impl From<Instance> for Object {
    fn from(instance: Instance) -> Self {
        Self::Instance(instance)
    }
}

impl From<Proxy> for Object {
    fn from(proxy: Proxy) -> Self {
        Self::Proxy(proxy)
    }
}
