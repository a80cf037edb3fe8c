/**
This module loads an annotation file into an `AnnotationMap`, keyed by the anonymized text of
each record.

The canonical document is `{ "data": [ {"text": ..., "entity": ..., "types": ...}, ... ] }`. The
legacy documents, an object holding a single key of any name whose value is the record
collection, are adapted at this boundary when the configuration allows them.
*/
use crate::anonymizer::anonymize;
use crate::config::EvalConfig;
use crate::error::{EvalError, Result};
use crate::metrics::DivByZeroStrat;
use ahash::{AHashMap, AHashSet};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs::File;
use std::io::{BufReader, Read};
use std::ops::Deref;
use std::path::Path;
use std::str::FromStr;

/// Key holding the record collection in the canonical document.
pub const DATA_KEY: &str = "data";

/// A single annotated example, as found in the annotation files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotationRecord {
    pub text: String,
    pub entity: Option<String>,
    /// Space separated labels.
    pub types: String,
}

impl AnnotationRecord {
    /// Validates a raw JSON record. `text` and `types` must be strings and `entity` must be
    /// present, either as a string or as `null`.
    fn try_from_value(value: Value) -> std::result::Result<Self, String> {
        let mut object = match value {
            Value::Object(object) => object,
            other => return Err(format!("expected an object, found {}", other)),
        };
        let text = take_string(&mut object, "text")?;
        let types = take_string(&mut object, "types")?;
        let entity = match object.remove("entity") {
            Some(Value::String(entity)) => Some(entity),
            Some(Value::Null) => None,
            Some(other) => return Err(format!("field `entity` is not a string: {}", other)),
            None => return Err(String::from("missing field `entity`")),
        };
        Ok(Self {
            text,
            entity,
            types,
        })
    }

    /// Normalized text of the record, used as join key.
    pub fn key(&self) -> String {
        anonymize(&self.text, self.entity.as_deref()).into_owned()
    }
}

fn take_string(object: &mut Map<String, Value>, field: &str) -> std::result::Result<String, String> {
    match object.remove(field) {
        Some(Value::String(s)) => Ok(s),
        Some(other) => Err(format!("field `{}` is not a string: {}", field, other)),
        None => Err(format!("missing field `{}`", field)),
    }
}

/// Entity and labels stored for a normalized text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    pub entity: Option<String>,
    pub types: String,
}

impl Annotation {
    /// Labels in their original order, duplicates included.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.types.split_whitespace()
    }

    pub fn label_set(&self) -> AHashSet<&str> {
        self.labels().collect()
    }
}

impl From<AnnotationRecord> for (String, Annotation) {
    fn from(value: AnnotationRecord) -> Self {
        let key = value.key();
        (
            key,
            Annotation {
                entity: value.entity,
                types: value.types,
            },
        )
    }
}

/// Number of records read and rejected while loading a map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct LoadStats {
    pub total: usize,
    pub skipped: usize,
}

/// Mapping from the normalized text to its annotation. When two records share a normalized
/// text, the last one wins.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnnotationMap {
    annotations: AHashMap<String, Annotation>,
    stats: LoadStats,
}

impl Deref for AnnotationMap {
    type Target = AHashMap<String, Annotation>;
    fn deref(&self) -> &Self::Target {
        &self.annotations
    }
}

impl FromIterator<AnnotationRecord> for AnnotationMap {
    fn from_iter<I: IntoIterator<Item = AnnotationRecord>>(iter: I) -> Self {
        Self::from_records(iter)
    }
}

impl FromStr for AnnotationMap {
    type Err = EvalError;
    fn from_str(s: &str) -> Result<Self> {
        Self::from_json_str(s, &EvalConfig::<DivByZeroStrat>::default())
    }
}

impl AnnotationMap {
    /// Builds the map from already validated records.
    pub fn from_records<I: IntoIterator<Item = AnnotationRecord>>(records: I) -> Self {
        let mut annotations = AHashMap::default();
        let mut total = 0;
        for record in records {
            total += 1;
            let (key, annotation): (String, Annotation) = record.into();
            annotations.insert(key, annotation);
        }
        Self {
            annotations,
            stats: LoadStats { total, skipped: 0 },
        }
    }

    pub fn stats(&self) -> LoadStats {
        self.stats
    }

    /// Parses a JSON annotation document.
    pub fn from_json_str<Z>(content: &str, config: &EvalConfig<Z>) -> Result<Self>
    where
        Z: Into<DivByZeroStrat> + Copy,
    {
        let document: Value = serde_json::from_str(content)?;
        Self::from_value(document, config)
    }

    /// Reads and parses a JSON annotation document.
    pub fn from_reader<R: Read, Z>(reader: R, config: &EvalConfig<Z>) -> Result<Self>
    where
        Z: Into<DivByZeroStrat> + Copy,
    {
        let document: Value = serde_json::from_reader(reader)?;
        Self::from_value(document, config)
    }

    /// Opens, reads and parses a JSON annotation file.
    pub fn from_path<P: AsRef<Path>, Z>(path: P, config: &EvalConfig<Z>) -> Result<Self>
    where
        Z: Into<DivByZeroStrat> + Copy,
    {
        let path = path.as_ref();
        log::info!("Loading annotations from {}", path.display());
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file), config)
    }

    /// Builds the map out of a parsed JSON document. Invalid records are logged and skipped.
    pub fn from_value<Z>(document: Value, config: &EvalConfig<Z>) -> Result<Self>
    where
        Z: Into<DivByZeroStrat> + Copy,
    {
        let records = extract_records(document, config.legacy_shape())?;
        if records.is_empty() {
            return Err(EvalError::EmptyCollection);
        }
        let total = records.len();
        let mut skipped = 0;
        let mut annotations = AHashMap::with_capacity(total);
        for (index, value) in records.into_iter().enumerate() {
            match AnnotationRecord::try_from_value(value) {
                Ok(record) => {
                    let (key, annotation): (String, Annotation) = record.into();
                    annotations.insert(key, annotation);
                }
                Err(reason) => {
                    log::warn!("Invalid annotation record at index {}: {}", index, reason);
                    skipped += 1;
                }
            }
        }
        if annotations.is_empty() {
            return Err(EvalError::NoUsableRecords { skipped });
        }
        log::debug!(
            "Loaded {} annotations from {} records ({} skipped)",
            annotations.len(),
            total,
            skipped
        );
        Ok(Self {
            annotations,
            stats: LoadStats { total, skipped },
        })
    }
}

fn extract_records(document: Value, legacy_shape: bool) -> Result<Vec<Value>> {
    let mut object = match document {
        Value::Object(object) => object,
        _ => {
            return Err(EvalError::unsupported_shape(
                "expected an object holding the record collection",
            ))
        }
    };
    let collection = match object.remove(DATA_KEY) {
        Some(collection) => collection,
        None if legacy_shape && object.len() == 1 => {
            let (key, collection) = object.into_iter().next().ok_or_else(|| {
                EvalError::unsupported_shape("expected an object with a single key")
            })?;
            log::warn!(
                "Reading the record collection from the legacy key {:?}, expected {:?}",
                key,
                DATA_KEY
            );
            collection
        }
        None => {
            return Err(EvalError::unsupported_shape(format!(
                "expected the record collection under the key {:?}",
                DATA_KEY
            )))
        }
    };
    match collection {
        Value::Array(records) => Ok(records),
        _ => Err(EvalError::unsupported_shape(
            "the record collection is not an array",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EvalConfigBuilder;
    use rstest::rstest;
    use std::io::Write;

    const SAMPLE: &str = r#"{"data": [
        {"text": "John saw Mary", "entity": "John", "types": "PERSON"},
        {"text": "He lives in Paris", "entity": "Paris", "types": "/location/city LOCATION"}
    ]}"#;

    #[test]
    fn test_load_canonical_document() {
        let map: AnnotationMap = SAMPLE.parse().unwrap();
        assert_eq!(map.len(), 2);
        let annotation = map.get("XXXX XXXX saw Mary").unwrap();
        assert_eq!(annotation.entity.as_deref(), Some("John"));
        assert_eq!(annotation.label_set(), AHashSet::from_iter(["PERSON"]));
        assert!(map.contains_key("He lives in XXXX XXXX"));
        assert_eq!(map.stats(), LoadStats { total: 2, skipped: 0 });
    }

    #[test]
    fn test_load_legacy_document() {
        let content = r#"{"submission": [{"text": "John saw Mary", "entity": "John", "types": "PERSON"}]}"#;
        let map: AnnotationMap = content.parse().unwrap();
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_reject_legacy_document_when_disabled() {
        let content = r#"{"submission": [{"text": "John saw Mary", "entity": "John", "types": "PERSON"}]}"#;
        let config = EvalConfigBuilder::default().legacy_shape(false).build();
        let res = AnnotationMap::from_json_str(content, &config);
        assert!(matches!(res, Err(EvalError::UnsupportedShape(_))));
    }

    #[rstest]
    #[case(r#"[{"text": "a", "entity": "a", "types": "A"}]"#)]
    #[case(r#"{"a": [], "b": []}"#)]
    #[case(r#"{"data": {"text": "a"}}"#)]
    fn test_unsupported_shapes(#[case] content: &str) {
        let res: Result<AnnotationMap> = content.parse();
        assert!(matches!(res, Err(EvalError::UnsupportedShape(_))));
    }

    #[test]
    fn test_invalid_json() {
        let res: Result<AnnotationMap> = "{\"data\": [".parse();
        assert!(matches!(res, Err(EvalError::Json(_))));
    }

    #[test]
    fn test_empty_collection() {
        let res: Result<AnnotationMap> = r#"{"data": []}"#.parse();
        assert!(matches!(res, Err(EvalError::EmptyCollection)));
    }

    #[test]
    fn test_invalid_records_are_skipped() {
        let content = r#"{"data": [
            {"text": "John saw Mary", "types": "PERSON"},
            {"entity": "John", "types": "PERSON"},
            {"text": "John saw Mary", "entity": "John"},
            {"text": "John saw Mary", "entity": "John", "types": ["PERSON"]},
            "not a record",
            {"text": "Paris is big", "entity": "Paris", "types": "LOCATION"}
        ]}"#;
        let map: AnnotationMap = content.parse().unwrap();
        assert_eq!(map.len(), 1);
        assert!(map.contains_key("XXXX XXXX is big"));
        assert_eq!(map.stats(), LoadStats { total: 6, skipped: 5 });
    }

    #[test]
    fn test_no_usable_record() {
        let content = r#"{"data": [{"text": "John saw Mary"}]}"#;
        let res: Result<AnnotationMap> = content.parse();
        assert!(matches!(
            res,
            Err(EvalError::NoUsableRecords { skipped: 1 })
        ));
    }

    #[test]
    fn test_null_entity_keeps_text() {
        let content = r#"{"data": [{"text": "John saw Mary", "entity": null, "types": "PERSON"}]}"#;
        let map: AnnotationMap = content.parse().unwrap();
        let annotation = map.get("John saw Mary").unwrap();
        assert_eq!(annotation.entity, None);
    }

    #[test]
    fn test_last_record_wins() {
        let content = r#"{"data": [
            {"text": "John saw Mary", "entity": "John", "types": "PERSON"},
            {"text": "John saw Mary", "entity": "John", "types": "LOCATION"}
        ]}"#;
        let map: AnnotationMap = content.parse().unwrap();
        assert_eq!(map.len(), 1);
        assert_eq!(map.get("XXXX XXXX saw Mary").unwrap().types, "LOCATION");
    }

    #[test]
    fn test_from_records_last_record_wins() {
        let first = AnnotationRecord {
            text: String::from("John saw Mary"),
            entity: Some(String::from("John")),
            types: String::from("PERSON"),
        };
        let second = AnnotationRecord {
            types: String::from("ORGANIZATION"),
            ..first.clone()
        };
        assert_eq!(first.key(), second.key());
        let map: AnnotationMap = vec![first, second].into_iter().collect();
        assert_eq!(map.len(), 1);
        assert_eq!(map.get(&String::from("XXXX XXXX saw Mary")).unwrap().types, "ORGANIZATION");
    }

    #[test]
    fn test_labels_keep_duplicates() {
        let annotation = Annotation {
            entity: None,
            types: String::from("PERSON  PERSON LOCATION"),
        };
        assert_eq!(
            annotation.labels().collect::<Vec<_>>(),
            vec!["PERSON", "PERSON", "LOCATION"]
        );
        assert_eq!(annotation.label_set().len(), 2);
    }

    #[test]
    fn test_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();
        let config = EvalConfigBuilder::default().build();
        let map = AnnotationMap::from_path(file.path(), &config).unwrap();
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_from_missing_path() {
        let config = EvalConfigBuilder::default().build();
        let res = AnnotationMap::from_path("does/not/exist.json", &config);
        assert!(matches!(res, Err(EvalError::Io(_))));
    }
}
