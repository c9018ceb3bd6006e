//! Query Parameters
//!
//! Insertion-ordered parameter map shared by URL building, form bodies and
//! the reporting query layers.

use url::form_urlencoded;

/// A single parameter value.
#[derive(Clone, Debug, PartialEq)]
pub enum ParamValue {
    Text(String),
    Integer(i64),
    Float(f64),
    /// Encoded as one comma-separated value.
    List(Vec<String>),
}

impl ParamValue {
    /// Render the value as it appears on the wire (before form encoding).
    pub fn to_wire(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::Integer(i) => i.to_string(),
            Self::Float(f) => f.to_string(),
            Self::List(items) => items.join(","),
        }
    }

    /// Get the value as text, if it is text.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&String> for ParamValue {
    fn from(value: &String) -> Self {
        Self::Text(value.clone())
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for ParamValue {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<u32> for ParamValue {
    fn from(value: u32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<Vec<String>> for ParamValue {
    fn from(value: Vec<String>) -> Self {
        Self::List(value)
    }
}

impl From<Vec<&str>> for ParamValue {
    fn from(value: Vec<&str>) -> Self {
        Self::List(value.into_iter().map(String::from).collect())
    }
}

/// Ordered mapping of parameter names to values.
///
/// Replacing an existing key keeps its original position; new keys are
/// appended. Merging layers therefore reproduces the order in which keys
/// first appeared.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct QueryParams {
    entries: Vec<(String, ParamValue)>,
}

impl QueryParams {
    /// Create an empty parameter map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert or replace a value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Look up a value.
    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Remove a value, returning it.
    pub fn remove(&mut self, key: &str) -> Option<ParamValue> {
        let index = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(index).1)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over entries in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Keys in order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Shallow merge: every key of `other` overrides the same key here.
    pub fn merge(&mut self, other: &QueryParams) {
        for (key, value) in &other.entries {
            self.insert(key.clone(), value.clone());
        }
    }

    /// Merge layers left to right into a new map.
    pub fn merged<'a>(layers: impl IntoIterator<Item = &'a QueryParams>) -> QueryParams {
        let mut result = QueryParams::new();
        for layer in layers {
            result.merge(layer);
        }
        result
    }

    /// Serialize as `application/x-www-form-urlencoded`.
    pub fn to_form_encoded(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (key, value) in &self.entries {
            serializer.append_pair(key, &value.to_wire());
        }
        serializer.finish()
    }
}

impl<K: Into<String>, V: Into<ParamValue>> FromIterator<(K, V)> for QueryParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = QueryParams::new();
        for (key, value) in iter {
            params.insert(key, value);
        }
        params
    }
}

impl<K: Into<String>, V: Into<ParamValue>, const N: usize> From<[(K, V); N]> for QueryParams {
    fn from(entries: [(K, V); N]) -> Self {
        entries.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_replaces_in_place() {
        let mut params = QueryParams::from([("a", "1"), ("b", "2")]);
        params.insert("a", "3");
        params.insert("c", "4");

        let keys: Vec<&str> = params.keys().collect();
        assert_eq!(keys, vec!["a", "b", "c"]);
        assert_eq!(params.get("a"), Some(&ParamValue::from("3")));
    }

    #[test]
    fn test_layer_merge_precedence() {
        let library = QueryParams::from([
            ("start-date", "2024-01-01"),
            ("end-date", "2024-02-01"),
            ("metrics", "ga:visits"),
        ]);
        let configured = QueryParams::from([("metrics", "ga:pageviews"), ("max-results", "50")]);
        let overrides = QueryParams::from([("end-date", "2024-01-15"), ("metrics", "ga:users")]);

        let merged = QueryParams::merged([&library, &configured, &overrides]);

        // override wins, configured beats library, library fills the rest
        assert_eq!(merged.get("metrics").and_then(ParamValue::as_str), Some("ga:users"));
        assert_eq!(merged.get("end-date").and_then(ParamValue::as_str), Some("2024-01-15"));
        assert_eq!(merged.get("start-date").and_then(ParamValue::as_str), Some("2024-01-01"));
        assert_eq!(merged.get("max-results").and_then(ParamValue::as_str), Some("50"));
        assert_eq!(merged.len(), 4);
    }

    #[test]
    fn test_merge_is_shallow() {
        let mut base = QueryParams::new().with("metrics", vec!["ga:visits", "ga:bounces"]);
        base.merge(&QueryParams::new().with("metrics", vec!["ga:pageviews"]));
        assert_eq!(base.get("metrics"), Some(&ParamValue::from(vec!["ga:pageviews"])));
    }

    #[test]
    fn test_form_encoding() {
        let params = QueryParams::new()
            .with("redirect_uri", "https://app/cb")
            .with("metrics", vec!["ga:visits", "ga:pageviews"])
            .with("max-results", 25)
            .with("q", "a b");

        assert_eq!(
            params.to_form_encoded(),
            "redirect_uri=https%3A%2F%2Fapp%2Fcb&metrics=ga%3Avisits%2Cga%3Apageviews&max-results=25&q=a+b"
        );
    }

    #[test]
    fn test_remove() {
        let mut params = QueryParams::from([("a", "1"), ("b", "2")]);
        assert_eq!(params.remove("a"), Some(ParamValue::from("1")));
        assert!(!params.contains_key("a"));
        assert_eq!(params.remove("missing"), None);
    }
}
