//! Field classification and encoding
//!
//! Each exported field is matched against an ordered rule set; the first
//! rule that applies decides how the value is written and which entities
//! it contributes as children.

use chrono::{Datelike, Local, NaiveDate, NaiveDateTime};

use crate::error::{Error, Result};
use crate::identity::{entity_identifier, resolve_identifier};
use crate::model::{Field, Value};
use crate::session::Session;

/// Field names that are never exported
pub const SKIPPED_FIELDS: [&str; 2] = ["id", "willBeSaved"];

/// Pattern temporal values are written with
pub const TEMPORAL_OUTPUT_FORMAT: &str = "%Y-%m-%d";

/// Classification chosen for a field, in rule order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Sequence,
    Mapping,
    Set,
    LargeText,
    EntityReference,
    Temporal,
    Scalar,
}

/// Encoded form of a field value
#[derive(Debug, Clone, PartialEq)]
pub enum Encoded {
    /// Single scalar written inline after the key
    Scalar(serde_yaml::Value),
    /// Identifier of one referenced entity
    Reference(String),
    /// Block list of identifiers (or element string forms)
    References(Vec<String>),
}

/// Result of classifying one field
#[derive(Debug, Clone, PartialEq)]
pub struct FieldEncoding {
    pub name: String,
    pub kind: FieldKind,
    pub value: Encoded,
    /// Identifiers of referenced entities, duplicates allowed
    pub children: Vec<String>,
}

impl FieldEncoding {
    fn new(name: &str, kind: FieldKind, value: Encoded) -> Self {
        Self {
            name: name.to_string(),
            kind,
            value,
            children: Vec::new(),
        }
    }

    fn with_children(mut self, children: Vec<String>) -> Self {
        self.children = children;
        self
    }
}

/// Whether a field takes part in the export at all
pub fn is_exported(field: &Field) -> bool {
    !SKIPPED_FIELDS.contains(&field.name.as_str())
}

/// Classify and encode one field
///
/// Returns `Ok(None)` when the field produces no output: null values,
/// empty collections, and the reserved field names.
pub fn classify<S: Session + ?Sized>(session: &S, field: &Field) -> Result<Option<FieldEncoding>> {
    if !is_exported(field) {
        return Ok(None);
    }

    let name = field.name.as_str();
    let encoding = match &field.value {
        Value::Null => None,
        Value::List(items) => references(session, name, FieldKind::Sequence, items.iter())?,
        Value::Map(entries) => references(
            session,
            name,
            FieldKind::Mapping,
            entries.iter().map(|(_, value)| value),
        )?,
        Value::Set(items) => references(session, name, FieldKind::Set, items.iter())?,
        value if field.markers.large_text => Some(FieldEncoding::new(
            name,
            FieldKind::LargeText,
            Encoded::Scalar(serde_yaml::Value::String(forced_string(session, value)?)),
        )),
        Value::Entity(handle) => {
            let id = resolve_identifier(session, *handle)?.ok_or_else(|| {
                Error::identity(format!(
                    "field '{}' references {} which has no identifier",
                    name, handle
                ))
            })?;
            Some(
                FieldEncoding::new(name, FieldKind::EntityReference, Encoded::Reference(id.clone()))
                    .with_children(vec![id]),
            )
        }
        Value::Temporal(raw) => {
            let date = reparse_date(raw).ok_or_else(|| Error::TemporalParse {
                field: name.to_string(),
                value: raw.clone(),
            })?;
            Some(FieldEncoding::new(
                name,
                FieldKind::Temporal,
                Encoded::Scalar(serde_yaml::Value::String(
                    date.format(TEMPORAL_OUTPUT_FORMAT).to_string(),
                )),
            ))
        }
        value => Some(FieldEncoding::new(
            name,
            FieldKind::Scalar,
            Encoded::Scalar(scalar(value)),
        )),
    };

    match &encoding {
        Some(encoding) => tracing::debug!("Field {} type is {:?}", name, encoding.kind),
        None => tracing::debug!("Field {} omitted", name),
    }
    Ok(encoding)
}

/// Encode collection elements as a list of identifiers
///
/// Entities contribute their identifier and become children; entities
/// without a known identifier are left out. Other elements are written
/// with their default string form.
fn references<'a, S, I>(
    session: &S,
    name: &str,
    kind: FieldKind,
    elements: I,
) -> Result<Option<FieldEncoding>>
where
    S: Session + ?Sized,
    I: Iterator<Item = &'a Value>,
{
    let mut items = Vec::new();
    let mut children = Vec::new();

    for element in elements {
        match element {
            Value::Null => {}
            Value::Entity(handle) => match entity_identifier(session, element)? {
                Some(id) => {
                    children.push(id.clone());
                    items.push(id);
                }
                None => tracing::debug!("Field {} element {} has no identifier", name, handle),
            },
            other => items.push(other.to_string()),
        }
    }

    if items.is_empty() {
        return Ok(None);
    }
    Ok(Some(
        FieldEncoding::new(name, kind, Encoded::References(items)).with_children(children),
    ))
}

/// String conversion forced on large-text fields
fn forced_string<S: Session + ?Sized>(session: &S, value: &Value) -> Result<String> {
    match value {
        Value::Entity(handle) => Ok(resolve_identifier(session, *handle)?
            .unwrap_or_else(|| handle.to_string())),
        other => Ok(other.to_string()),
    }
}

/// YAML scalar for a primitive value
fn scalar(value: &Value) -> serde_yaml::Value {
    match value {
        Value::Bool(b) => serde_yaml::Value::Bool(*b),
        Value::Int(n) => serde_yaml::Value::Number((*n).into()),
        Value::Float(n) => serde_yaml::Value::Number((*n).into()),
        other => serde_yaml::Value::String(other.to_string()),
    }
}

/// Years before the reference year where the two-digit year window opens
const CENTURY_WINDOW_LAG: i32 = 80;

/// Reparse a temporal default string form as `yy-MM-dd hh:mm:ss` and keep
/// the date part
///
/// A two-digit year lands in the hundred-year window that opens 80 years
/// before the current year. Trailing text after the seconds, such as a
/// fractional part, is ignored. Anything else that does not match the
/// pattern yields `None`.
pub fn reparse_date(raw: &str) -> Option<NaiveDate> {
    reparse_date_at(raw, Local::now().year())
}

/// [`reparse_date`] with an explicit reference year for the two-digit
/// year window
pub fn reparse_date_at(raw: &str, reference_year: i32) -> Option<NaiveDate> {
    let raw = raw.trim();
    let year_len = raw.find('-')?;
    let pattern = if year_len == 2 {
        "%y-%m-%d %H:%M:%S"
    } else {
        "%Y-%m-%d %H:%M:%S"
    };
    let (parsed, _) = NaiveDateTime::parse_and_remainder(raw, pattern).ok()?;
    let date = parsed.date();
    if year_len != 2 {
        return Some(date);
    }
    date.with_year(expand_two_digit_year(date.year() % 100, reference_year))
}

fn expand_two_digit_year(yy: i32, reference_year: i32) -> i32 {
    let start = reference_year - CENTURY_WINDOW_LAG;
    let year = start - start.rem_euclid(100) + yy;
    if year < start {
        year + 100
    } else {
        year
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Handle, Instance, Object, Proxy};

    fn books() -> Vec<Object> {
        vec![
            Instance::new("Book").with_primary_key(10).into(),
            Instance::new("Book").with_primary_key(11).into(),
            Instance::new("Note").with_field("text", "no id").into(),
            Proxy::new("Book_$$_proxy_2", Some(Handle(1))).into(),
        ]
    }

    #[test]
    fn test_null_is_omitted() {
        let session = books();
        let field = Field::new("title", Value::Null);
        assert!(classify(&session, &field).unwrap().is_none());
    }

    #[test]
    fn test_reserved_fields_are_skipped() {
        let session = books();
        assert!(classify(&session, &Field::new("id", 5)).unwrap().is_none());
        assert!(classify(&session, &Field::new("willBeSaved", true))
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_sequence_of_entities() {
        let session = books();
        let field = Field::new(
            "books",
            Value::list(vec![Handle(0).into(), Value::Null, Handle(3).into()]),
        );

        let encoding = classify(&session, &field).unwrap().unwrap();
        assert_eq!(encoding.kind, FieldKind::Sequence);
        assert_eq!(
            encoding.value,
            Encoded::References(vec!["Book_10".to_string(), "Book_11".to_string()])
        );
        assert_eq!(encoding.children, vec!["Book_10", "Book_11"]);
    }

    #[test]
    fn test_empty_sequence_is_omitted() {
        let session = books();
        let field = Field::new("books", Value::list(vec![]));
        assert!(classify(&session, &field).unwrap().is_none());
    }

    #[test]
    fn test_mapping_uses_entry_values() {
        let session = books();
        let field = Field::new(
            "shelves",
            Value::map(vec![("a", Value::from(Handle(1))), ("b", Value::from(Handle(2)))]),
        );

        let encoding = classify(&session, &field).unwrap().unwrap();
        assert_eq!(encoding.kind, FieldKind::Mapping);
        assert_eq!(encoding.value, Encoded::References(vec!["Book_11".to_string()]));
        assert_eq!(encoding.children, vec!["Book_11"]);
    }

    #[test]
    fn test_set_of_plain_values() {
        let session = books();
        let field = Field::new("tags", Value::set(vec![Value::from("scifi"), Value::from("classic")]));

        let encoding = classify(&session, &field).unwrap().unwrap();
        assert_eq!(encoding.kind, FieldKind::Set);
        assert_eq!(
            encoding.value,
            Encoded::References(vec!["scifi".to_string(), "classic".to_string()])
        );
        assert!(encoding.children.is_empty());
    }

    #[test]
    fn test_large_text_forces_string() {
        let session = books();
        let field = Field::new("body", 42).large_text();

        let encoding = classify(&session, &field).unwrap().unwrap();
        assert_eq!(encoding.kind, FieldKind::LargeText);
        assert_eq!(
            encoding.value,
            Encoded::Scalar(serde_yaml::Value::String("42".to_string()))
        );
    }

    #[test]
    fn test_entity_reference() {
        let session = books();
        let field = Field::new("favorite", Handle(3));

        let encoding = classify(&session, &field).unwrap().unwrap();
        assert_eq!(encoding.kind, FieldKind::EntityReference);
        assert_eq!(encoding.value, Encoded::Reference("Book_11".to_string()));
        assert_eq!(encoding.children, vec!["Book_11"]);
    }

    #[test]
    fn test_entity_reference_without_identifier() {
        let session = books();
        let field = Field::new("note", Handle(2));
        assert!(matches!(classify(&session, &field), Err(Error::Identity(_))));
    }

    #[test]
    fn test_temporal_reparsed_to_date() {
        let session = books();
        let field = Field::new("published", Value::temporal("23-11-05 10:00:00"));

        let encoding = classify(&session, &field).unwrap().unwrap();
        assert_eq!(encoding.kind, FieldKind::Temporal);
        assert_eq!(
            encoding.value,
            Encoded::Scalar(serde_yaml::Value::String("2023-11-05".to_string()))
        );
    }

    #[test]
    fn test_temporal_parse_failure() {
        let session = books();
        let field = Field::new("published", Value::temporal("Nov 5, 2023"));
        assert!(matches!(
            classify(&session, &field),
            Err(Error::TemporalParse { .. })
        ));
    }

    #[test]
    fn test_reparse_date_variants() {
        let expected = NaiveDate::from_ymd_opt(2023, 11, 5);
        assert_eq!(reparse_date("23-11-05 10:00:00"), expected);
        assert_eq!(reparse_date("2023-11-05 10:00:00.0"), expected);
        assert_eq!(reparse_date("2023-11-05"), None);
        assert_eq!(reparse_date(""), None);
    }

    #[test]
    fn test_two_digit_year_window() {
        let date = |y, m, d| NaiveDate::from_ymd_opt(y, m, d);
        // Window for 2026 is 1946..=2045
        assert_eq!(reparse_date_at("55-03-02 00:00:00", 2026), date(1955, 3, 2));
        assert_eq!(reparse_date_at("69-03-02 00:00:00", 2026), date(1969, 3, 2));
        assert_eq!(reparse_date_at("70-03-02 00:00:00", 2026), date(1970, 3, 2));
        assert_eq!(reparse_date_at("46-03-02 00:00:00", 2026), date(1946, 3, 2));
        assert_eq!(reparse_date_at("45-03-02 00:00:00", 2026), date(2045, 3, 2));
        assert_eq!(reparse_date_at("00-02-29 00:00:00", 2026), date(2000, 2, 29));
        assert_eq!(reparse_date_at("99-12-31 00:00:00", 2026), date(1999, 12, 31));
    }

    #[test]
    fn test_two_digit_year_window_moves() {
        let date = |y, m, d| NaiveDate::from_ymd_opt(y, m, d);
        assert_eq!(reparse_date_at("55-03-02 00:00:00", 2140), date(2155, 3, 2));
        assert_eq!(reparse_date_at("60-03-02 00:00:00", 2140), date(2060, 3, 2));
        assert_eq!(reparse_date_at("2055-03-02 00:00:00", 2140), date(2055, 3, 2));
    }

    #[test]
    fn test_float_form_matches_scalar_field() {
        let session = books();
        let scalar = classify(&session, &Field::new("weight", 1.0)).unwrap().unwrap();
        let listed = classify(&session, &Field::new("weights", Value::list(vec![Value::Float(1.0)])))
            .unwrap()
            .unwrap();

        let Encoded::Scalar(value) = scalar.value else {
            panic!("expected a scalar");
        };
        let inline = serde_yaml::to_string(&value).unwrap();
        assert_eq!(listed.value, Encoded::References(vec![inline.trim().to_string()]));
    }

    #[test]
    fn test_scalar_keeps_type() {
        let session = books();
        let encoding = classify(&session, &Field::new("pages", 412)).unwrap().unwrap();
        assert_eq!(encoding.kind, FieldKind::Scalar);
        assert_eq!(encoding.value, Encoded::Scalar(serde_yaml::Value::Number(412.into())));
    }
}
