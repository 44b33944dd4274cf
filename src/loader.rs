//! Declarative record loading.
//!
//! Records arrive loosely typed: phrase fields may be a single string or a
//! list, optional fields may be missing or `null`, and the metadata maps are
//! arbitrary. Everything is coerced here, at the boundary, so the rest of the
//! crate only ever sees a validated [`KeywordEntry`].
//!
//! Loading is all-or-nothing: one malformed record fails the whole source
//! with `InvalidRegistry`.

use crate::engine::KeywordRegistry;
use crate::error::{KeywordError, Result};
use crate::source::KeywordSource;
use crate::{KeywordEntry, Metadata};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use tracing::debug;

/// A scalar phrase value. Numbers and booleans are accepted and stringified.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Text(s) => f.write_str(s),
            Scalar::Integer(n) => write!(f, "{n}"),
            Scalar::Float(n) => write!(f, "{n}"),
            Scalar::Bool(b) => write!(f, "{b}"),
        }
    }
}

/// Either a single value or a list of values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
    One(Scalar),
    Many(Vec<Scalar>),
}

impl OneOrMany {
    /// Trimmed, non-empty strings in declaration order.
    pub fn into_phrases(self) -> Vec<String> {
        let values = match self {
            OneOrMany::One(value) => vec![value],
            OneOrMany::Many(values) => values,
        };
        values.into_iter().map(|v| v.to_string().trim().to_string()).filter(|s| !s.is_empty()).collect()
    }
}

impl Default for OneOrMany {
    fn default() -> Self {
        OneOrMany::Many(Vec::new())
    }
}

/// One keyword record as written in the declarative source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeywordRecord {
    pub id: Option<Scalar>,
    pub terms: Option<OneOrMany>,
    pub synonyms: Option<OneOrMany>,
    pub typos: Option<OneOrMany>,
    pub negative_terms: Option<OneOrMany>,
    pub filters: Option<serde_json::Value>,
    pub boosts: Option<serde_json::Value>,
    pub rerank: Option<serde_json::Value>,
}

/// Parse a YAML (or JSON) document holding a sequence of records.
///
/// An empty document yields no records. Each record is deserialized on its
/// own so a bad one is reported with its position.
pub fn records_from_yaml(content: &str) -> Result<Vec<KeywordRecord>> {
    let document: serde_yaml::Value =
        serde_yaml::from_str(content).map_err(|source| KeywordError::Syntax { path: PathBuf::new(), source })?;

    let items = match document {
        serde_yaml::Value::Null => return Ok(Vec::new()),
        serde_yaml::Value::Sequence(items) => items,
        _ => {
            return Err(KeywordError::InvalidRegistry {
                reason: "source must contain a sequence of keyword entries".to_string(),
            });
        }
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            if !item.is_mapping() {
                return Err(invalid_registry(KeywordError::InvalidEntry {
                    index,
                    reason: "each keyword entry must be a mapping".to_string(),
                }));
            }
            serde_yaml::from_value::<KeywordRecord>(item)
                .map_err(|err| invalid_registry(KeywordError::InvalidEntry { index, reason: err.to_string() }))
        })
        .collect()
}

/// Validate one record and turn it into an entry.
pub fn build_entry(index: usize, record: KeywordRecord) -> Result<KeywordEntry> {
    let invalid = |reason: String| KeywordError::InvalidEntry { index, reason };

    let canonical_id = match record.id {
        Some(id) => id.to_string().trim().to_string(),
        None => return Err(invalid("keyword entry missing required 'id'".to_string())),
    };
    if canonical_id.is_empty() {
        return Err(invalid("keyword entry 'id' may not be blank".to_string()));
    }

    let terms = phrases(record.terms);
    if terms.is_empty() {
        return Err(invalid(format!("keyword '{canonical_id}' requires at least one term")));
    }

    Ok(KeywordEntry {
        terms,
        synonyms: phrases(record.synonyms),
        typos: phrases(record.typos),
        negative_terms: phrases(record.negative_terms),
        filters: metadata(record.filters, "filters").map_err(invalid)?,
        boosts: metadata(record.boosts, "boosts").map_err(invalid)?,
        rerank: metadata(record.rerank, "rerank").map_err(invalid)?,
        canonical_id,
    })
}

/// Validate every record; the first bad one fails the whole batch.
pub fn build_entries(records: impl IntoIterator<Item = KeywordRecord>) -> Result<Vec<KeywordEntry>> {
    records
        .into_iter()
        .enumerate()
        .map(|(index, record)| build_entry(index, record).map_err(invalid_registry))
        .collect()
}

/// Load, validate and index everything `source` provides.
pub fn load_registry(source: &dyn KeywordSource) -> Result<KeywordRegistry> {
    let records = source.load()?;
    debug!(source = %source.describe(), records = records.len(), "keyword records loaded");
    KeywordRegistry::new(build_entries(records)?)
}

fn phrases(value: Option<OneOrMany>) -> Vec<String> {
    value.map(OneOrMany::into_phrases).unwrap_or_default()
}

fn metadata(value: Option<serde_json::Value>, key: &str) -> std::result::Result<Metadata, String> {
    match value {
        None | Some(serde_json::Value::Null) => Ok(Metadata::new()),
        Some(serde_json::Value::Object(map)) => Ok(map),
        Some(_) => Err(format!("expected '{key}' to be a mapping")),
    }
}

fn invalid_registry(err: KeywordError) -> KeywordError {
    match err {
        err @ KeywordError::InvalidEntry { .. } => KeywordError::InvalidRegistry { reason: err.to_string() },
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(yaml: &str) -> KeywordRecord {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn string_or_list_is_coerced() {
        let entry = build_entry(
            0,
            record("id: password_reset\nterms: password reset\nsynonyms: [' credential reset ', '', 42]\ntypos: ~"),
        )
        .unwrap();
        assert_eq!(entry.canonical_id, "password_reset");
        assert_eq!(entry.terms, vec!["password reset"]);
        assert_eq!(entry.synonyms, vec!["credential reset", "42"]);
        assert!(entry.typos.is_empty());
        assert!(entry.negative_terms.is_empty());
        assert!(entry.filters.is_empty());
    }

    #[test]
    fn metadata_keeps_declaration_order() {
        let entry = build_entry(0, record("id: a\nterms: alpha\nboosts:\n  subject: 4.0\n  body: 1.5\n  from: 2")).unwrap();
        let keys: Vec<&str> = entry.boosts.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["subject", "body", "from"]);
        assert_eq!(entry.boosts["subject"], json!(4.0));
    }

    #[test]
    fn missing_or_blank_id_is_rejected() {
        let err = build_entry(3, record("terms: alpha")).unwrap_err();
        assert!(matches!(err, KeywordError::InvalidEntry { index: 3, .. }));

        let err = build_entry(0, record("id: '  '\nterms: alpha")).unwrap_err();
        assert!(matches!(err, KeywordError::InvalidEntry { .. }));
    }

    #[test]
    fn entry_without_terms_is_rejected() {
        for yaml in ["id: a", "id: a\nterms: []", "id: a\nterms: '   '"] {
            let err = build_entry(0, record(yaml)).unwrap_err();
            assert!(matches!(err, KeywordError::InvalidEntry { .. }), "yaml: {yaml}");
        }
    }

    #[test]
    fn non_mapping_metadata_is_rejected() {
        let err = build_entry(0, record("id: a\nterms: alpha\nfilters: [1, 2]")).unwrap_err();
        assert!(err.to_string().contains("filters"));
    }

    #[test]
    fn one_bad_record_fails_the_batch() {
        let records = records_from_yaml("- id: a\n  terms: alpha\n- id: b\n").unwrap();
        let err = build_entries(records).unwrap_err();
        match err {
            KeywordError::InvalidRegistry { reason } => assert!(reason.contains("#1"), "reason: {reason}"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn document_shape_is_validated() {
        assert!(records_from_yaml("").unwrap().is_empty());
        assert!(records_from_yaml("~").unwrap().is_empty());
        assert!(matches!(records_from_yaml("id: a"), Err(KeywordError::InvalidRegistry { .. })));
        assert!(matches!(records_from_yaml("- just a string"), Err(KeywordError::InvalidRegistry { .. })));
        assert!(matches!(records_from_yaml("- id: a\n  filters: {1: x}"), Err(KeywordError::InvalidRegistry { .. })));
    }

    #[test]
    fn json_documents_are_accepted() {
        let records = records_from_yaml(r#"[{"id": "a", "terms": ["alpha", "first"]}]"#).unwrap();
        let entries = build_entries(records).unwrap();
        assert_eq!(entries[0].terms, vec!["alpha", "first"]);
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let entries = build_entries(records_from_yaml("- id: a\n  terms: alpha\n  owner: security").unwrap()).unwrap();
        assert_eq!(entries.len(), 1);
    }
}
