//! Chapter results: the ordered title → text map and per-chapter outcomes.

use std::collections::HashMap;
use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::Result;

/// Text recorded for a navigation target that matches no item.
pub const CONTENT_NOT_FOUND: &str = "Content not found";

/// Prefix of the text recorded for a chapter whose content failed to parse.
pub const EXTRACTION_ERROR_PREFIX: &str = "Error extracting content: ";

/// What happened when a single chapter was extracted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChapterOutcome {
    Extracted(String),
    /// No item has the target href.
    NotFound,
    /// The item exists but its content could not be decoded or parsed.
    Failed(String),
}

impl ChapterOutcome {
    pub fn is_extracted(&self) -> bool {
        matches!(self, ChapterOutcome::Extracted(_))
    }

    /// The text stored in a [`ChapterMap`]: the content, or a sentinel.
    pub fn into_text(self) -> String {
        match self {
            ChapterOutcome::Extracted(text) => text,
            ChapterOutcome::NotFound => CONTENT_NOT_FOUND.to_string(),
            ChapterOutcome::Failed(reason) => format!("{EXTRACTION_ERROR_PREFIX}{reason}"),
        }
    }
}

/// One navigation entry together with its extraction outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterResult {
    /// Title with surrounding whitespace removed.
    pub title: String,
    pub href: String,
    pub outcome: ChapterOutcome,
}

/// Chapter title → plain text, in navigation order.
///
/// Inserting a title that is already present replaces its text but keeps
/// its original position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChapterMap {
    entries: Vec<(String, String)>,
    index: HashMap<String, usize>,
}

impl ChapterMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a chapter, returning the text it replaced.
    pub fn insert(&mut self, title: impl Into<String>, text: impl Into<String>) -> Option<String> {
        let title = title.into();
        let text = text.into();
        match self.index.get(&title) {
            Some(&i) => Some(std::mem::replace(&mut self.entries[i].1, text)),
            None => {
                self.index.insert(title.clone(), self.entries.len());
                self.entries.push((title, text));
                None
            }
        }
    }

    pub fn get(&self, title: &str) -> Option<&str> {
        self.index.get(title).map(|&i| self.entries[i].1.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn titles(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(title, _)| title.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(t, x)| (t.as_str(), x.as_str()))
    }

    /// Pretty JSON object, 4-space indented, non-ASCII left unescaped.
    pub fn to_json_string(&self) -> Result<String> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.serialize(&mut ser)?;
        Ok(String::from_utf8(buf)?)
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl FromIterator<(String, String)> for ChapterMap {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        let mut map = ChapterMap::new();
        for (title, text) in iter {
            map.insert(title, text);
        }
        map
    }
}

impl Serialize for ChapterMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (title, text) in &self.entries {
            map.serialize_entry(title, text)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ChapterMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct ChapterMapVisitor;

        impl<'de> Visitor<'de> for ChapterMapVisitor {
            type Value = ChapterMap;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of chapter titles to text")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> std::result::Result<ChapterMap, A::Error> {
                let mut map = ChapterMap::new();
                while let Some((title, text)) = access.next_entry::<String, String>()? {
                    map.insert(title, text);
                }
                Ok(map)
            }
        }

        deserializer.deserialize_map(ChapterMapVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_outcome_sentinels() {
        assert_eq!(ChapterOutcome::Extracted("x".into()).into_text(), "x");
        assert_eq!(ChapterOutcome::NotFound.into_text(), "Content not found");
        assert_eq!(
            ChapterOutcome::Failed("bad bytes".into()).into_text(),
            "Error extracting content: bad bytes"
        );
    }

    #[test]
    fn test_duplicate_title_overwrites_in_place() {
        let mut map = ChapterMap::new();
        assert_eq!(map.insert("A", "1"), None);
        assert_eq!(map.insert("B", "2"), None);
        assert_eq!(map.insert("A", "3"), Some("1".to_string()));

        assert_eq!(map.len(), 2);
        assert_eq!(map.get("A"), Some("3"));
        assert_eq!(map.titles().collect::<Vec<_>>(), vec!["A", "B"]);
    }

    #[test]
    fn test_json_format() {
        let mut map = ChapterMap::new();
        map.insert("Zweites Kapitel", "Grüße");
        map.insert("Erstes", "a\nb");

        let json = map.to_json_string().unwrap();
        assert_eq!(
            json,
            "{\n    \"Zweites Kapitel\": \"Grüße\",\n    \"Erstes\": \"a\\nb\"\n}"
        );
    }

    #[test]
    fn test_empty_map_json() {
        assert_eq!(ChapterMap::new().to_json_string().unwrap(), "{}");
    }

    proptest! {
        #[test]
        fn prop_json_round_trip(pairs in proptest::collection::vec((".*", ".*"), 0..16)) {
            let map: ChapterMap = pairs.into_iter().collect();
            let json = map.to_json_string().unwrap();
            let back = ChapterMap::from_json_str(&json).unwrap();
            prop_assert_eq!(back, map);
        }
    }
}
