//! Reference-frame catalog and identifier resolution.
//!
//! The registry is built once from [`catalog::FRAME_MENU`] and never mutated
//! afterwards, so it can be shared freely across concurrent requests through
//! [`registry`].

pub mod catalog;

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

use crate::error::UnknownFrame;

static REGISTRY: LazyLock<FrameRegistry> =
    LazyLock::new(|| FrameRegistry::from_catalog(catalog::FRAME_MENU));

/// The process-wide registry over the HTDP frame menu.
pub fn registry() -> &'static FrameRegistry {
    &REGISTRY
}

/// A user-supplied frame identifier: a menu index or free text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FrameId {
    Numeric(i64),
    Text(String),
}

impl From<i64> for FrameId {
    fn from(index: i64) -> Self {
        FrameId::Numeric(index)
    }
}

impl From<&str> for FrameId {
    fn from(text: &str) -> Self {
        FrameId::Text(text.to_string())
    }
}

impl From<String> for FrameId {
    fn from(text: String) -> Self {
        FrameId::Text(text)
    }
}

impl fmt::Display for FrameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameId::Numeric(index) => write!(f, "{index}"),
            FrameId::Text(text) => f.write_str(text),
        }
    }
}

/// One entry of the frame listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameEntry {
    pub index: u32,
    pub label: String,
}

/// Lower-case and drop everything that is not a letter or digit.
pub fn normalize(text: &str) -> String {
    text.chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Immutable index → label catalog plus the alias index derived from it.
#[derive(Debug)]
pub struct FrameRegistry {
    labels: BTreeMap<u32, &'static str>,
    aliases: HashMap<String, u32>,
}

impl FrameRegistry {
    /// Build the registry. Entries are processed in slice order; for each
    /// label the full form, its leading word and the part before any `(`
    /// are registered as aliases, first registration winning.
    pub fn from_catalog(entries: &[(u32, &'static str)]) -> Self {
        let mut registry = Self {
            labels: BTreeMap::new(),
            aliases: HashMap::new(),
        };

        for &(index, label) in entries {
            registry.labels.insert(index, label);

            registry.register_alias(label, index);
            if let Some(leading) = label.split_whitespace().next() {
                registry.register_alias(leading, index);
            }
            if let Some((before_paren, _)) = label.split_once('(') {
                registry.register_alias(before_paren, index);
            }
        }

        registry
    }

    /// Returns `false` (and leaves the mapping alone) when the normalized
    /// alias is empty or already taken.
    fn register_alias(&mut self, alias: &str, index: u32) -> bool {
        let key = normalize(alias);
        if key.is_empty() || self.aliases.contains_key(&key) {
            return false;
        }
        self.aliases.insert(key, index);
        true
    }

    /// Resolve a numeric or textual identifier to a menu index.
    pub fn resolve(&self, id: &FrameId) -> Result<u32, UnknownFrame> {
        match id {
            FrameId::Numeric(index) => self.resolve_index(*index),
            FrameId::Text(text) => self.resolve_text(text),
        }
    }

    fn resolve_index(&self, index: i64) -> Result<u32, UnknownFrame> {
        u32::try_from(index)
            .ok()
            .filter(|idx| self.labels.contains_key(idx))
            .ok_or(UnknownFrame::NoSuchIndex(index))
    }

    fn resolve_text(&self, raw: &str) -> Result<u32, UnknownFrame> {
        let text = raw.trim();
        if text.is_empty() {
            return Err(UnknownFrame::EmptyIdentifier);
        }

        if text.chars().all(|c| c.is_ascii_digit()) {
            if let Ok(index) = text.parse::<i64>() {
                return self.resolve_index(index);
            }
        }

        self.aliases
            .get(&normalize(text))
            .copied()
            .ok_or_else(|| UnknownFrame::NoSuchAlias {
                input: raw.to_string(),
                choices: self.labels.values().copied().collect::<Vec<_>>().join(", "),
            })
    }

    pub fn label(&self, index: u32) -> Option<&'static str> {
        self.labels.get(&index).copied()
    }

    /// All frames, sorted by index.
    pub fn list(&self) -> Vec<FrameEntry> {
        self.labels
            .iter()
            .map(|(&index, &label)| FrameEntry {
                index,
                label: label.to_string(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve(id: impl Into<FrameId>) -> Result<u32, UnknownFrame> {
        registry().resolve(&id.into())
    }

    #[test]
    fn normalize_strips_punctuation_and_case() {
        assert_eq!(normalize("NAD_83(2011/CORS96/2007)"), "nad832011cors962007");
        assert_eq!(normalize("  ITRF-2014 "), "itrf2014");
        assert_eq!(normalize("()/"), "");
    }

    #[test]
    fn resolution_ignores_case_and_punctuation() {
        let expected = resolve(25_i64).unwrap();
        assert_eq!(resolve("itrf2014").unwrap(), expected);
        assert_eq!(resolve("ITRF2014").unwrap(), expected);
        assert_eq!(resolve("itrf-2014").unwrap(), expected);
        assert_eq!(resolve("ITRF2014 or IGS14/IGb14").unwrap(), expected);
    }

    #[test]
    fn digit_strings_resolve_as_indices() {
        assert_eq!(resolve("1").unwrap(), 1);
        assert_eq!(resolve(" 26 ").unwrap(), 26);
    }

    #[test]
    fn unknown_identifiers_fail() {
        assert_eq!(resolve("999"), Err(UnknownFrame::NoSuchIndex(999)));
        assert_eq!(resolve(0_i64), Err(UnknownFrame::NoSuchIndex(0)));
        assert_eq!(resolve(-3_i64), Err(UnknownFrame::NoSuchIndex(-3)));
        assert!(matches!(
            resolve("not-a-frame"),
            Err(UnknownFrame::NoSuchAlias { .. })
        ));
        assert!(matches!(
            resolve("99999999999999999999999"),
            Err(UnknownFrame::NoSuchAlias { .. })
        ));
    }

    #[test]
    fn unknown_alias_lists_choices() {
        let err = resolve("GDA2020").unwrap_err();
        assert!(err.to_string().contains("WGS84(G730)"));
    }

    #[test]
    fn empty_identifier_is_reported_distinctly() {
        assert_eq!(resolve(""), Err(UnknownFrame::EmptyIdentifier));
        assert_eq!(resolve("   "), Err(UnknownFrame::EmptyIdentifier));
    }

    #[test]
    fn short_forms_go_to_first_registered_frame() {
        // "NAD_83" is the prefix of frames 1..=3; "WGS84" of 5..=12.
        assert_eq!(resolve("NAD_83").unwrap(), 1);
        assert_eq!(resolve("nad83").unwrap(), 1);
        assert_eq!(resolve("WGS84").unwrap(), 5);
        assert_eq!(resolve("wgs84(g1762)").unwrap(), 10);
        assert_eq!(resolve("ITRF2008").unwrap(), 24);
    }

    #[test]
    fn first_registration_wins_on_collision() {
        let registry = FrameRegistry::from_catalog(&[
            (7, "ALPHA (first)"),
            (3, "Alpha (second)"),
            (9, "alpha"),
        ]);
        for _ in 0..3 {
            assert_eq!(registry.resolve(&"ALPHA".into()).unwrap(), 7);
        }
        assert_eq!(registry.resolve(&"alpha (second)".into()).unwrap(), 3);
        assert_eq!(registry.resolve(&FrameId::Numeric(9)).unwrap(), 9);
    }

    #[test]
    fn list_is_sorted_by_index() {
        let frames = registry().list();
        assert_eq!(frames.len(), catalog::FRAME_MENU.len());
        assert!(frames.windows(2).all(|w| w[0].index < w[1].index));
        assert_eq!(frames[0].label, "NAD_83(2011/CORS96/2007)");
        assert_eq!(registry().label(25), Some("ITRF2014 or IGS14/IGb14"));
    }

    #[test]
    fn frame_id_deserializes_number_or_text() {
        let numeric: FrameId = serde_json::from_str("25").unwrap();
        let text: FrameId = serde_json::from_str("\"ITRF2014\"").unwrap();
        assert_eq!(numeric, FrameId::Numeric(25));
        assert_eq!(text, FrameId::Text("ITRF2014".into()));
    }
}
