//! Entity to YAML block conversion

use crate::classify::{classify, Encoded, FieldEncoding};
use crate::error::{Error, Result};
use crate::identity::{resolve_identifier, simple_class_name};
use crate::model::{Field, Handle, Value};
use crate::registry::EntityNode;
use crate::session::Session;

/// One indentation level
pub const INDENT: &str = "    ";

/// Render one entity into an unwritten [`EntityNode`]
pub fn transcode<S: Session + ?Sized>(session: &S, handle: Handle) -> Result<EntityNode> {
    transcode_with_references(session, handle).map(|(node, _)| node)
}

/// Render one entity and also report the handles its children came from
///
/// The handles let a caller pull referenced entities into the same export.
pub fn transcode_with_references<S: Session + ?Sized>(
    session: &S,
    handle: Handle,
) -> Result<(EntityNode, Vec<Handle>)> {
    let identifier = resolve_identifier(session, handle)?
        .ok_or_else(|| Error::identity(format!("entity {} has no identifier", handle)))?;
    let instance = session.instance(handle)?;

    tracing::info!(
        "Generate YML for {} ({} fields)",
        identifier,
        instance.fields.len()
    );

    let mut fragment = format!(
        "\n{}({}):\n",
        simple_class_name(&instance.class_name),
        identifier
    );
    let mut children = Vec::new();
    let mut references = Vec::new();

    for field in &instance.fields {
        let Some(encoding) = classify(session, field)? else {
            continue;
        };
        fragment.push_str(&render_field(&encoding)?);
        if !encoding.children.is_empty() {
            references.extend(referenced_handles(field));
        }
        children.extend(encoding.children);
    }

    Ok((
        EntityNode::new(identifier, fragment).with_children(children),
        references,
    ))
}

/// Entity handles held by a field that contributed children
fn referenced_handles(field: &Field) -> Vec<Handle> {
    match &field.value {
        Value::Entity(handle) => vec![*handle],
        Value::List(items) | Value::Set(items) => {
            items.iter().filter_map(Value::as_entity).collect()
        }
        Value::Map(entries) => entries.iter().filter_map(|(_, v)| v.as_entity()).collect(),
        _ => Vec::new(),
    }
}

/// Render a classified field as indented block-style lines
///
/// Scalars become `    name: value`; lists become `    name:` followed by
/// one `        - item` line per element, with every line of an item one
/// level deeper than the key.
pub fn render_field(encoding: &FieldEncoding) -> Result<String> {
    let (value, is_list) = match &encoding.value {
        Encoded::Scalar(value) => (value.clone(), false),
        Encoded::Reference(id) => (serde_yaml::Value::String(id.clone()), false),
        Encoded::References(ids) => (
            serde_yaml::Value::Sequence(
                ids.iter().cloned().map(serde_yaml::Value::String).collect(),
            ),
            true,
        ),
    };

    let mut mapping = serde_yaml::Mapping::new();
    mapping.insert(serde_yaml::Value::String(encoding.name.clone()), value);
    let dumped = serde_yaml::to_string(&mapping)?;

    let mut out = String::with_capacity(dumped.len() + 16);
    for (i, line) in dumped.lines().enumerate() {
        out.push_str(INDENT);
        // Everything below the key line belongs to a list item, including
        // the continuation lines of multi-line block scalars
        if is_list && i > 0 {
            out.push_str(INDENT);
        }
        out.push_str(line);
        out.push('\n');
    }
    Ok(out)
}
