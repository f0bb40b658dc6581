//! Element and toposheet extraction from free text.
//!
//! Elements are found by scanning the vocabulary, not the text: the result
//! follows [`ELEMENTS`](crate::vocab::ELEMENTS) order no matter where the
//! names appear. A hit is either the full name on word boundaries or the
//! code as a whole word. Sheet ids are whole words shaped digits-letters-digits
//! (e.g. `55K14`), reported in order of first appearance.

use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

use crate::vocab::ELEMENTS;

fn sheet_id_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b\d+[A-Za-z]+\d+\b").expect("sheet id pattern"))
}

fn word_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b\w+\b").expect("word pattern"))
}

/// Maximal runs of word characters in `text`.
pub(crate) fn words(text: &str) -> impl Iterator<Item = &str> {
    word_re().find_iter(text).map(|m| m.as_str())
}

/// Everything extracted from one piece of text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Entities {
    pub elements: Vec<String>,
    pub sheet_ids: Vec<String>,
}

impl Entities {
    pub fn from_text(text: &str) -> Self {
        Self {
            elements: extract_elements(text),
            sheet_ids: extract_sheet_ids(text),
        }
    }

    /// First sheet (text order) and first element (vocabulary order).
    pub fn primary(&self) -> Option<(&str, &str)> {
        Some((self.sheet_ids.first()?.as_str(), self.elements.first()?.as_str()))
    }
}

/// Element codes mentioned in `text`, in vocabulary order.
pub fn extract_elements(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    let words: Vec<&str> = words(&lower).collect();
    ELEMENTS
        .iter()
        .filter(|(name, code)| contains_phrase(&lower, &name.to_lowercase()) || words.contains(code))
        .map(|(_, code)| code.to_string())
        .collect()
}

/// Toposheet ids in `text`, in order of first appearance, without repeats.
pub fn extract_sheet_ids(text: &str) -> Vec<String> {
    let mut ids: Vec<String> = Vec::new();
    for m in sheet_id_re().find_iter(text) {
        if !ids.iter().any(|id| id == m.as_str()) {
            ids.push(m.as_str().to_string());
        }
    }
    ids
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// `phrase` occurs in `haystack` with no word character directly on either side.
fn contains_phrase(haystack: &str, phrase: &str) -> bool {
    haystack.match_indices(phrase).any(|(start, m)| {
        let before = haystack[..start].chars().next_back();
        let after = haystack[start + m.len()..].chars().next();
        !before.is_some_and(is_word_char) && !after.is_some_and(is_word_char)
    })
}
