//! Domain entities: input records and node identity

use std::fmt;

use itertools::Itertools;
use serde::{Serialize, Serializer};

/// Labels that collapse to "no value" regardless of case.
const BLANK_SENTINELS: [&str; 3] = ["null", "(blank)", "(empty)"];

/// One input row: ordered level labels plus an optional weight.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    pub labels: Vec<Option<String>>,
    pub weight: Option<f64>,
}

impl Record {
    pub fn new<I, S>(labels: I, weight: Option<f64>) -> Self
    where
        I: IntoIterator<Item = Option<S>>,
        S: Into<String>,
    {
        Self {
            labels: labels.into_iter().map(|l| l.map(Into::into)).collect(),
            weight,
        }
    }

    /// Record whose labels are all present.
    pub fn from_path<I, S>(labels: I, weight: Option<f64>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(labels.into_iter().map(Some), weight)
    }

    /// Normalized labels up to (excluding) the first blank one.
    ///
    /// An empty result means the record contributes nothing.
    pub fn truncated_path(&self) -> Vec<String> {
        self.labels
            .iter()
            .map(|l| l.as_deref().and_then(normalize_label))
            .take_while(Option::is_some)
            .flatten()
            .collect()
    }
}

/// Trim a label; `None` if it is blank.
///
/// Blank means empty after trimming, or one of `null`, `(blank)`, `(empty)`
/// compared case-insensitively.
pub fn normalize_label(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty()
        || BLANK_SENTINELS
            .iter()
            .any(|s| trimmed.eq_ignore_ascii_case(s))
    {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Root-to-node name sequence (root exclusive).
///
/// Stable across rebuilds: two trees built from the same rows agree on
/// every key even though arena indices differ.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PathKey(Vec<String>);

impl PathKey {
    pub const SEPARATOR: char = '/';

    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(names.into_iter().map(Into::into).collect())
    }

    /// Parse a `/`-joined key; empty segments are dropped.
    pub fn parse(s: &str) -> Self {
        Self(
            s.split(Self::SEPARATOR)
                .map(str::trim)
                .filter(|seg| !seg.is_empty())
                .map(String::from)
                .collect(),
        )
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn depth(&self) -> usize {
        self.0.len()
    }

    pub fn names(&self) -> &[String] {
        &self.0
    }

    pub fn last(&self) -> Option<&str> {
        self.0.last().map(String::as_str)
    }

    pub fn child(&self, name: impl Into<String>) -> Self {
        let mut names = self.0.clone();
        names.push(name.into());
        Self(names)
    }

    pub fn parent(&self) -> Option<Self> {
        if self.is_root() {
            None
        } else {
            Some(Self(self.0[..self.0.len() - 1].to_vec()))
        }
    }

    /// Every prefix from depth 1 up to and including `self`.
    pub fn prefixes(&self) -> Vec<PathKey> {
        (1..=self.0.len())
            .map(|n| Self(self.0[..n].to_vec()))
            .collect()
    }
}

/// Serialized as the `/`-joined display form.
impl Serialize for PathKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl fmt::Display for PathKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.iter().join("/"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("  A ", Some("A"))]
    #[case("", None)]
    #[case("   ", None)]
    #[case("NULL", None)]
    #[case("(Blank)", None)]
    #[case("(EMPTY)", None)]
    #[case("nullable", Some("nullable"))]
    fn test_normalize_label(#[case] raw: &str, #[case] expected: Option<&str>) {
        assert_eq!(normalize_label(raw).as_deref(), expected);
    }

    #[test]
    fn test_truncated_path_stops_at_first_blank() {
        let record = Record::new(vec![Some("A"), Some(" "), Some("C")], None);
        assert_eq!(record.truncated_path(), vec!["A".to_string()]);

        let record = Record::new(vec![None, Some("X")], Some(2.0));
        assert!(record.truncated_path().is_empty());
    }

    #[test]
    fn test_path_key_parse_and_display() {
        let key = PathKey::parse("/A// B /");
        assert_eq!(key, PathKey::new(["A", "B"]));
        assert_eq!(key.to_string(), "A/B");
        assert_eq!(key.parent(), Some(PathKey::new(["A"])));
        assert!(PathKey::parse("").is_root());
        assert_eq!(PathKey::root().parent(), None);
    }

    #[test]
    fn test_path_key_serializes_as_joined_string() {
        let value = serde_json::to_value(PathKey::new(["A", "B"])).unwrap();
        assert_eq!(value, serde_json::json!("A/B"));
        assert_eq!(serde_json::to_value(PathKey::root()).unwrap(), serde_json::json!(""));
    }

    #[test]
    fn test_path_key_names_with_separator_do_not_collide() {
        let joined = PathKey::new(["A/B"]);
        let split = PathKey::new(["A", "B"]);
        assert_ne!(joined, split);
    }
}
