//! Per-language resources: translation tables and knowledge bases.
//!
//! Resources are fetched as a pair through a [`ResourceSource`] and kept
//! together in a [`ResourceBundle`], so a language is either fully loaded or
//! not loaded at all.
//!
//! # Structure
//!
//! - [`LanguageTag`]: validated language identifier
//! - [`TranslationTable`]: key to display string mapping
//! - [`KnowledgeBase`]: example questions and backend topics
//! - [`source`]: HTTP and filesystem resource sources

pub mod source;

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, WidgetError};

#[cfg(not(target_arch = "wasm32"))]
pub use source::FsResourceSource;
pub use source::{HttpResourceSource, ResourceSource, load_bundle};

/// Tag of the language the original content is written in.
pub const SOURCE_LANGUAGE: &str = "ja";

/// Identifier selecting a locale's resources, such as `ja` or `en`.
///
/// Tags are spliced into resource paths, so construction rejects anything
/// other than a short alphanumeric primary subtag optionally followed by
/// `-` or `_` separated subtags.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct LanguageTag(String);

impl LanguageTag {
    /// Parse and validate a tag.
    pub fn parse(value: &str) -> Result<Self> {
        let value = value.trim();
        let mut parts = value.split(['-', '_']);
        let primary = parts.next().unwrap_or_default();
        let primary_ok = (2..=8).contains(&primary.len())
            && primary.chars().all(|c| c.is_ascii_alphanumeric());
        let rest_ok = parts.all(|p| {
            (1..=8).contains(&p.len()) && p.chars().all(|c| c.is_ascii_alphanumeric())
        });
        if primary_ok && rest_ok {
            Ok(Self(value.to_string()))
        } else {
            Err(WidgetError::InvalidLanguage(value.to_string()))
        }
    }

    /// The tag as written.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this tag is the designated secondary language (English).
    pub fn is_english(&self) -> bool {
        self.primary().eq_ignore_ascii_case("en")
    }

    /// The primary subtag (`en` of `en-US` or `en_US`).
    pub fn primary(&self) -> &str {
        self.0.split(['-', '_']).next().unwrap_or_default()
    }
}

impl fmt::Display for LanguageTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for LanguageTag {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

impl Default for LanguageTag {
    fn default() -> Self {
        Self(SOURCE_LANGUAGE.to_string())
    }
}

/// Localized display strings for one language.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct TranslationTable(HashMap<String, String>);

impl TranslationTable {
    /// Look up a key. Empty strings count as missing so that an element is
    /// never blanked by an unfinished translation.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .get(key)
            .map(String::as_str)
            .filter(|s| !s.is_empty())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, String)> for TranslationTable {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Per-language knowledge document.
///
/// Only `example_questions` is rendered by the widget; `data` holds the
/// topic texts the answering backend works from and is kept as-is.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct KnowledgeBase {
    pub example_questions: Vec<String>,
    #[serde(default)]
    pub data: BTreeMap<String, serde_json::Value>,
}

/// Translation table and knowledge base of one language, loaded together.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceBundle {
    pub translations: TranslationTable,
    pub knowledge: KnowledgeBase,
}

impl ResourceBundle {
    /// Parse both documents; fails if either is malformed.
    pub fn from_json(translations: &[u8], knowledge: &[u8]) -> Result<Self> {
        Ok(Self {
            translations: serde_json::from_slice(translations)?,
            knowledge: serde_json::from_slice(knowledge)?,
        })
    }
}

/// Relative path of the translation document for `tag`.
pub fn translations_path(tag: &LanguageTag) -> String {
    format!("translations/{tag}.json")
}

/// Relative path of the knowledge document for `tag`.
pub fn knowledge_path(tag: &LanguageTag) -> String {
    format!("knowledge/{tag}.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_tag_validation() {
        assert_eq!(LanguageTag::parse("ja").unwrap().as_str(), "ja");
        assert_eq!(LanguageTag::parse(" en ").unwrap().as_str(), "en");
        assert!(LanguageTag::parse("zh-Hant").is_ok());
        assert!(LanguageTag::parse("pt_BR").is_ok());

        assert!(LanguageTag::parse("").is_err());
        assert!(LanguageTag::parse("e").is_err());
        assert!(LanguageTag::parse("../secrets").is_err());
        assert!(LanguageTag::parse("en-").is_err());
        assert!(LanguageTag::parse("en/us").is_err());
    }

    #[test]
    fn test_english_detection() {
        assert!(LanguageTag::parse("en").unwrap().is_english());
        assert!(LanguageTag::parse("en-GB").unwrap().is_english());
        assert!(!LanguageTag::parse("ja").unwrap().is_english());
        assert!(!LanguageTag::parse("eng").unwrap().is_english());
        assert!(LanguageTag::parse("en_US").unwrap().is_english());
        assert!(LanguageTag::parse("EN_gb").unwrap().is_english());
        assert_eq!(LanguageTag::parse("pt_BR").unwrap().primary(), "pt");
    }

    #[test]
    fn test_empty_translation_counts_as_missing() {
        let table: TranslationTable = [
            ("title".to_string(), "LARUbot".to_string()),
            ("subtitle".to_string(), String::new()),
        ]
        .into_iter()
        .collect();

        assert_eq!(table.get("title"), Some("LARUbot"));
        assert_eq!(table.get("subtitle"), None);
        assert_eq!(table.get("missing"), None);
    }

    #[test]
    fn test_bundle_parsing() {
        let bundle = ResourceBundle::from_json(
            br#"{"title": "Support"}"#,
            br#"{"example_questions": ["a?", "b?"], "data": {"fees": "Free"}}"#,
        )
        .unwrap();
        assert_eq!(bundle.translations.get("title"), Some("Support"));
        assert_eq!(bundle.knowledge.example_questions, vec!["a?", "b?"]);
        assert_eq!(bundle.knowledge.data["fees"], "Free");

        let bare = ResourceBundle::from_json(b"{}", br#"{"example_questions": []}"#).unwrap();
        assert!(bare.knowledge.example_questions.is_empty());
        assert!(bare.knowledge.data.is_empty());

        // A knowledge document must list its example questions.
        assert!(ResourceBundle::from_json(b"{}", b"{}").is_err());
        assert!(ResourceBundle::from_json(b"{}", br#"{"data": {"fees": "Free"}}"#).is_err());

        assert!(ResourceBundle::from_json(b"{}", b"[not json").is_err());
        assert!(ResourceBundle::from_json(b"[1, 2]", br#"{"example_questions": []}"#).is_err());
    }
}
