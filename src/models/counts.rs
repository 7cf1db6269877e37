//! Order-preserving label → count mapping.
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};

use super::lenient;

/// Category label → count, in the order the backend delivered the keys.
///
/// Key order becomes the slice order of the charts. Re-inserting an
/// existing label replaces its count in place. Counts may arrive as
/// numbers or numeric strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CountMap {
    entries: IndexMap<String, u64>,
}

impl CountMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the count for `label`, keeping its original position if present.
    pub fn insert(&mut self, label: impl Into<String>, count: u64) {
        self.entries.insert(label.into(), count);
    }

    /// Add `by` to the count for `label`, appending it if unseen.
    pub fn increment(&mut self, label: &str, by: u64) {
        *self.entries.entry(label.to_string()).or_insert(0) += by;
    }

    pub fn get(&self, label: &str) -> Option<u64> {
        self.entries.get(label).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total(&self) -> u64 {
        self.entries.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.entries.iter().map(|(l, c)| (l.as_str(), *c))
    }
}

impl<S: Into<String>> FromIterator<(S, u64)> for CountMap {
    fn from_iter<I: IntoIterator<Item = (S, u64)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (label, count) in iter {
            map.insert(label, count);
        }
        map
    }
}

impl<'de> Deserialize<'de> for CountMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<IndexMap<String, lenient::Count>>::deserialize(deserializer)?;
        Ok(raw
            .into_iter()
            .flatten()
            .map(|(label, lenient::Count(count))| (label, count))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_keeps_server_order() {
        let map: CountMap =
            serde_json::from_str(r#"{"Completed": 2, "Active": 3, "Dropped": 0}"#).unwrap();
        let labels: Vec<&str> = map.iter().map(|(l, _)| l).collect();
        assert_eq!(labels, vec!["Completed", "Active", "Dropped"]);
        assert_eq!(map.total(), 5);
    }

    #[test]
    fn null_deserializes_to_empty() {
        let map: CountMap = serde_json::from_str("null").unwrap();
        assert!(map.is_empty());
    }

    #[test]
    fn duplicate_key_keeps_first_position() {
        let map: CountMap = serde_json::from_str(r#"{"A": 1, "B": 2, "A": 5}"#).unwrap();
        assert_eq!(map.iter().collect::<Vec<_>>(), vec![("A", 5), ("B", 2)]);
    }

    #[test]
    fn increment_appends_unseen_labels() {
        let mut map = CountMap::new();
        map.increment("Active", 1);
        map.increment("Completed", 1);
        map.increment("Active", 1);
        assert_eq!(map.get("Active"), Some(2));
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn string_counts_are_accepted() {
        let map: CountMap =
            serde_json::from_str(r#"{"Active": "3", "Completed": 2, "Dropped": null}"#).unwrap();
        assert_eq!(map.iter().collect::<Vec<_>>(), vec![("Active", 3), ("Completed", 2), ("Dropped", 0)]);
        assert!(serde_json::from_str::<CountMap>(r#"{"Active": "many"}"#).is_err());
    }

    #[test]
    fn serialize_preserves_order() {
        let map: CountMap = [("Z", 1u64), ("A", 2)].into_iter().collect();
        assert_eq!(serde_json::to_string(&map).unwrap(), r#"{"Z":1,"A":2}"#);
    }
}
