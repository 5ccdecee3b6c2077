//! Declarative projections over raw records.
//!
//! A [`FieldMapper`] is a named table of field name to either a key path or
//! a transform. It is built once and then [`project`](FieldMapper::project)ed
//! over any number of raw records; each [`Projection`] resolves fields on
//! demand and never mutates the record it wraps.
//!
//! ```
//! use orcid_core::mapper::{FieldMapper, FieldSource};
//! use serde_json::json;
//!
//! let person =
//!     FieldMapper::new("Person", [("name", FieldSource::path(&["person", "name"]))]).unwrap();
//! let raw = json!({"person": {"name": "John"}});
//! assert_eq!(person.project(&raw).text("name").as_deref(), Some("John"));
//! ```

use std::borrow::Cow;

use serde_json::Value;
use thiserror::Error;

use crate::access;

/// Raised while a mapper is being defined; never while reading data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MapperError {
    #[error("{typename}.{field}: key paths need at least one key")]
    EmptyPath { typename: String, field: String },

    #[error("{typename}.{field} is declared more than once")]
    DuplicateField { typename: String, field: String },
}

/// Derives a value from the whole backing record.
pub type Transform = fn(&Value) -> Value;

#[derive(Debug, Clone)]
pub enum FieldSource {
    Path(Vec<String>),
    Transform(Transform),
}

impl FieldSource {
    pub fn path(keys: &[&str]) -> Self {
        FieldSource::Path(keys.iter().map(|key| key.to_string()).collect())
    }
}

#[derive(Debug, Clone)]
pub struct FieldMapper {
    typename: String,
    fields: Vec<(String, FieldSource)>,
}

impl FieldMapper {
    pub fn new<I, N>(typename: &str, fields: I) -> Result<Self, MapperError>
    where
        I: IntoIterator<Item = (N, FieldSource)>,
        N: Into<String>,
    {
        let mut declared: Vec<(String, FieldSource)> = Vec::new();
        for (name, source) in fields {
            let name = name.into();
            if let FieldSource::Path(keys) = &source {
                if keys.is_empty() {
                    return Err(MapperError::EmptyPath {
                        typename: typename.to_string(),
                        field: name,
                    });
                }
            }
            if declared.iter().any(|(existing, _)| *existing == name) {
                return Err(MapperError::DuplicateField {
                    typename: typename.to_string(),
                    field: name,
                });
            }
            declared.push((name, source));
        }
        Ok(Self {
            typename: typename.to_string(),
            fields: declared,
        })
    }

    pub fn typename(&self) -> &str {
        &self.typename
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    pub fn project<'a>(&'a self, raw: &'a Value) -> Projection<'a> {
        Projection { mapper: self, raw }
    }

    pub fn declares(&self, field: &str) -> bool {
        self.fields.iter().any(|(name, _)| name == field)
    }

    /// Panics on an undeclared field: a misspelled name is a programming
    /// error, not missing data.
    fn source(&self, field: &str) -> &FieldSource {
        match self.fields.iter().find(|(name, _)| name == field) {
            Some((_, source)) => source,
            None => panic!("{}.{field} is not a declared field", self.typename),
        }
    }
}

/// Read-only view of one raw record through a [`FieldMapper`].
#[derive(Debug, Clone, Copy)]
pub struct Projection<'a> {
    mapper: &'a FieldMapper,
    raw: &'a Value,
}

impl<'a> Projection<'a> {
    /// Resolves `field`. Unresolvable paths and null transform results come
    /// back as `None`.
    ///
    /// # Panics
    ///
    /// When `field` was never declared on the mapper.
    pub fn get(&self, field: &str) -> Option<Cow<'a, Value>> {
        let mapper: &'a FieldMapper = self.mapper;
        let source = mapper.source(field);
        if self.raw.is_null() {
            return None;
        }
        match source {
            FieldSource::Path(keys) => {
                access::lookup(Some(self.raw), keys.as_slice()).map(Cow::Borrowed)
            }
            FieldSource::Transform(transform) => {
                let value = transform(self.raw);
                if value.is_null() {
                    None
                } else {
                    Some(Cow::Owned(value))
                }
            }
        }
    }

    pub fn text(&self, field: &str) -> Option<String> {
        self.get(field).map(|value| access::text(&value))
    }

    pub fn text_or(&self, field: &str, default: &str) -> String {
        self.text(field).unwrap_or_else(|| default.to_string())
    }

    /// Array-valued field as display strings; empty when absent.
    pub fn texts(&self, field: &str) -> Vec<String> {
        match self.get(field).as_deref() {
            Some(Value::Array(items)) => items.iter().map(access::text).collect(),
            _ => Vec::new(),
        }
    }

    /// Array-valued path field borrowed from the backing record; empty when
    /// absent or produced by a transform.
    pub fn list(&self, field: &str) -> &'a [Value] {
        match self.get(field) {
            Some(Cow::Borrowed(Value::Array(items))) => items.as_slice(),
            _ => &[],
        }
    }

    pub fn raw(&self) -> &'a Value {
        self.raw
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn name_count(raw: &Value) -> Value {
        json!(access::list(Some(raw), &["names"]).len())
    }

    fn person() -> FieldMapper {
        FieldMapper::new(
            "Person",
            [
                ("name", FieldSource::path(&["person", "name"])),
                ("count", FieldSource::Transform(name_count)),
            ],
        )
        .unwrap()
    }

    #[test]
    fn path_fields_resolve_through_accessor() {
        let mapper = person();
        let raw = json!({"person": {"name": "John"}});
        let projection = mapper.project(&raw);
        assert_eq!(projection.text("name").as_deref(), Some("John"));

        let raw = json!({"person": "not a mapping"});
        assert_eq!(mapper.project(&raw).text("name"), None);
    }

    #[test]
    fn transform_fields_see_the_whole_record() {
        let mapper = person();
        let raw = json!({"names": ["a", "b", "c"]});
        assert_eq!(mapper.project(&raw).text("count").as_deref(), Some("3"));
    }

    #[test]
    fn list_borrows_path_arrays_only() {
        let mapper = FieldMapper::new(
            "Groups",
            [
                ("groups", FieldSource::path(&["groups"])),
                ("count", FieldSource::Transform(name_count)),
            ],
        )
        .unwrap();
        let raw = json!({"groups": [{"a": 1}, null], "names": ["x"]});
        let projection = mapper.project(&raw);
        assert_eq!(projection.list("groups").len(), 2);
        assert!(projection.list("count").is_empty());

        let raw = json!({"names": []});
        assert!(mapper.project(&raw).list("groups").is_empty());
    }

    #[test]
    fn null_backing_record_resolves_nothing() {
        let mapper = person();
        let projection = mapper.project(&Value::Null);
        assert_eq!(projection.get("name"), None);
        assert_eq!(projection.get("count"), None);
        assert_eq!(projection.text_or("name", "N/A"), "N/A");
    }

    #[test]
    #[should_panic(expected = "Person.nmae is not a declared field")]
    fn misspelled_field_panics() {
        let mapper = person();
        let raw = json!({"person": {"name": "John"}});
        mapper.project(&raw).text_or("nmae", "N/A");
    }

    #[test]
    #[should_panic(expected = "Person.age is not a declared field")]
    fn undeclared_field_panics_even_on_null_record() {
        person().project(&Value::Null).get("age");
    }

    #[test]
    fn declares_reports_the_field_table() {
        let mapper = person();
        assert!(mapper.declares("name"));
        assert!(!mapper.declares("age"));
    }

    #[test]
    fn empty_path_is_rejected_at_definition() {
        let err =
            FieldMapper::new("Broken", [("name", FieldSource::Path(Vec::new()))]).unwrap_err();
        assert_eq!(
            err,
            MapperError::EmptyPath {
                typename: "Broken".into(),
                field: "name".into()
            }
        );
    }

    #[test]
    fn duplicate_field_is_rejected_at_definition() {
        let err = FieldMapper::new(
            "Broken",
            [
                ("name", FieldSource::path(&["a"])),
                ("name", FieldSource::path(&["b"])),
            ],
        )
        .unwrap_err();
        assert!(matches!(err, MapperError::DuplicateField { .. }));
    }

    #[test]
    fn field_names_keep_declaration_order() {
        let mapper = person();
        assert_eq!(mapper.typename(), "Person");
        assert_eq!(mapper.field_names().collect::<Vec<_>>(), vec!["name", "count"]);
    }
}
