//! Frequency of the entities of each type in a set of annotations. This is the input of charting
//! tools: it is computed on demand out of an `AnnotationMap` and never takes part in the metrics.
use crate::annotations::{Annotation, AnnotationMap};
use itertools::Itertools;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Display;

/// Type name, then entity, then number of annotations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct EntityTally {
    types: BTreeMap<String, BTreeMap<String, usize>>,
}

/// The type of an annotation is the last `/` separated segment of its raw `types` field, e.g.
/// `/location/country` is tallied as `country`.
fn type_name(annotation: &Annotation) -> &str {
    annotation.types.rsplit('/').next().unwrap_or_default()
}

impl EntityTally {
    pub fn from_annotations(annotations: &AnnotationMap) -> Self {
        annotations.values().collect()
    }

    pub fn get(&self, type_name: &str, entity: &str) -> usize {
        self.types
            .get(type_name)
            .and_then(|entities| entities.get(entity))
            .copied()
            .unwrap_or(0)
    }

    /// Entities and their frequency for the given type, in alphabetical order.
    pub fn entities(&self, type_name: &str) -> impl Iterator<Item = (&str, usize)> {
        self.types
            .get(type_name)
            .into_iter()
            .flat_map(|entities| entities.iter().map(|(e, n)| (e.as_str(), *n)))
    }

    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl<'a> FromIterator<&'a Annotation> for EntityTally {
    fn from_iter<I: IntoIterator<Item = &'a Annotation>>(iter: I) -> Self {
        let mut types: BTreeMap<String, BTreeMap<String, usize>> = BTreeMap::new();
        for annotation in iter {
            let entity = annotation.entity.clone().unwrap_or_default();
            *types
                .entry(String::from(type_name(annotation)))
                .or_default()
                .entry(entity)
                .or_insert(0) += 1;
        }
        Self { types }
    }
}

impl Display for EntityTally {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (type_name, entities) in self.types.iter() {
            let listing = entities
                .iter()
                .map(|(entity, count)| format!("{}:{}", entity, count))
                .join(", ");
            writeln!(f, "{}: {}", type_name, listing)?
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotations::AnnotationRecord;

    fn record(text: &str, entity: Option<&str>, types: &str) -> AnnotationRecord {
        AnnotationRecord {
            text: String::from(text),
            entity: entity.map(String::from),
            types: String::from(types),
        }
    }

    fn tally() -> EntityTally {
        let map = AnnotationMap::from_records(vec![
            record("I was born in India", Some("India"), "/location/country"),
            record("India won", Some("India"), "/location/country"),
            record("She visited the USA", Some("USA"), "/location/country"),
            record("A nurse helped", Some("nurse"), "/profession"),
            record("Someone left", None, "/profession"),
        ]);
        EntityTally::from_annotations(&map)
    }

    #[test]
    fn test_counts() {
        let tally = tally();
        assert_eq!(tally.get("country", "India"), 2);
        assert_eq!(tally.get("country", "USA"), 1);
        assert_eq!(tally.get("profession", "nurse"), 1);
        assert_eq!(tally.get("profession", ""), 1);
        assert_eq!(tally.get("profession", "India"), 0);
        assert_eq!(tally.get("city", "Paris"), 0);
    }

    #[test]
    fn test_type_names_are_sorted() {
        assert_eq!(
            tally().type_names().collect::<Vec<_>>(),
            vec!["country", "profession"]
        );
    }

    #[test]
    fn test_entities() {
        assert_eq!(
            tally().entities("country").collect::<Vec<_>>(),
            vec![("India", 2), ("USA", 1)]
        );
        assert_eq!(tally().entities("city").count(), 0);
    }

    #[test]
    fn test_plain_types_are_kept_whole() {
        let map = AnnotationMap::from_records(vec![record("John saw Mary", Some("John"), "PERSON")]);
        let tally = EntityTally::from_annotations(&map);
        assert_eq!(tally.get("PERSON", "John"), 1);
    }

    #[test]
    fn test_display() {
        let expected = "country: India:2, USA:1\nprofession: :1, nurse:1\n";
        assert_eq!(tally().to_string(), expected);
    }

    #[test]
    fn test_serialize() {
        let value = serde_json::to_value(tally()).unwrap();
        assert_eq!(value["country"]["India"], 2);
    }
}
