//! Symbolic identifiers for entities
//!
//! An identifier is `<ClassName>_<PrimaryKey>`. Lazy proxies are
//! initialized first so that a proxy and its backing instance share one
//! identifier.

use crate::error::Result;
use crate::model::{Handle, Object, Value};
use crate::session::Session;

/// Infix the persistence layer injects into generated proxy class names
pub const PROXY_MARKER: &str = "_$$_";

/// Whether a runtime class name belongs to a generated proxy class
pub fn is_proxy_class(class_name: &str) -> bool {
    class_name.contains(PROXY_MARKER)
}

/// Simple class name with any generated proxy marker removed
///
/// `Book_$$_proxy_12` becomes `Book`.
pub fn simple_class_name(class_name: &str) -> &str {
    let simple = class_name.rsplit(['.', ':']).next().unwrap_or(class_name);
    match simple.find(PROXY_MARKER) {
        Some(pos) => &simple[..pos],
        None => simple,
    }
}

/// Trailing segment of a generated proxy class name (`12` for
/// `Book_$$_proxy_12`)
pub fn proxy_suffix(class_name: &str) -> Option<&str> {
    if !is_proxy_class(class_name) {
        return None;
    }
    class_name
        .rsplit('_')
        .next()
        .filter(|segment| !segment.is_empty())
}

/// Compute the identifier of the entity behind `handle`
///
/// Returns `Ok(None)` when the entity has neither a primary key nor an
/// identity field; callers treat that as "unknown" and leave it out of
/// the children list.
pub fn resolve_identifier<S: Session + ?Sized>(
    session: &S,
    handle: Handle,
) -> Result<Option<String>> {
    let proxy_name = match session.lookup(handle)? {
        Object::Proxy(proxy) => Some(proxy.class_name.as_str()),
        Object::Instance(_) => None,
    };
    let instance = session.instance(handle)?;
    let class_name = simple_class_name(&instance.class_name);

    if let Some(pk) = &instance.primary_key {
        return Ok(Some(format!("{}_{}", class_name, pk)));
    }

    if let Some(field) = instance.identity_field() {
        if !field.value.is_null() {
            return Ok(Some(field.value.to_string()));
        }
    }

    // Generated proxy naming: fall back to the opaque suffix of the class name
    let generated = proxy_name.or_else(|| {
        is_proxy_class(&instance.class_name).then_some(instance.class_name.as_str())
    });
    if let Some(suffix) = generated.and_then(proxy_suffix) {
        return Ok(Some(format!("{}_{}", class_name, suffix)));
    }

    tracing::debug!("No identifier for {} ({})", handle, instance.class_name);
    Ok(None)
}

/// Identifier of a value when it refers to an entity
pub fn entity_identifier<S: Session + ?Sized>(
    session: &S,
    value: &Value,
) -> Result<Option<String>> {
    match value.as_entity() {
        Some(handle) => resolve_identifier(session, handle),
        None => Ok(None),
    }
}
