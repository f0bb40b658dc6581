//! Splitting a corrected query into independently dispatchable sub-queries.
//!
//! Single pass over the token stream, no backtracking:
//! - `.` ends the current fragment
//! - a connector word ("also", "show", ...) ends the current fragment and is
//!   dropped
//! - "and" never splits: it is kept when the continuation flag is set or the
//!   fragment so far is exactly an element name
//! - completing a bridging phrase ("maximum and minimum") clears the
//!   continuation flag
//! - anything else is appended and sets the continuation flag
//!
//! Only fragments of more than one word survive a flush.

use crate::tokenize::{RuleTokenizer, Token, Tokenizer};
use crate::vocab::is_element_name;

/// Two-word phrases whose inner "and" belongs to the phrase.
pub const BRIDGING_PHRASES: &[&str] = &["maximum and minimum", "longitude and latitude"];

/// Imperative/connector words that start a new sub-query.
pub const CONNECTORS: &[&str] = &["also", "display", "create", "produce", "tell", "describe", "show"];

/// Segment with the built-in [`RuleTokenizer`].
pub fn segment(text: &str) -> Vec<String> {
    segment_with(&RuleTokenizer, text)
}

pub fn segment_with<T: Tokenizer + ?Sized>(tokenizer: &T, text: &str) -> Vec<String> {
    let tokens = tokenizer.tokenize(text);
    let mut subqueries = Vec::new();
    let mut fragment = String::new();
    let mut continuation = false;

    for (i, token) in tokens.iter().enumerate() {
        let word = token.text.trim().to_lowercase();

        if completes_bridging_phrase(&tokens, i) {
            fragment.push_str(&token.text_with_ws());
            continuation = false;
        } else if token.is_sentence_terminal || CONNECTORS.contains(&word.as_str()) {
            flush(&mut subqueries, &mut fragment);
            continuation = false;
        } else if word == "and" && (continuation || is_element_name(fragment.trim())) {
            fragment.push_str(&token.text_with_ws());
        } else {
            fragment.push_str(&token.text_with_ws());
            continuation = true;
        }
    }
    flush(&mut subqueries, &mut fragment);

    log::debug!("segmented {text:?} into {subqueries:?}");
    subqueries
}

/// Token `i` is the last word of a bridging phrase spelled by tokens `i-2..=i`.
fn completes_bridging_phrase(tokens: &[Token], i: usize) -> bool {
    if i < 2 {
        return false;
    }
    let phrase = tokens[i - 2..=i]
        .iter()
        .map(|t| t.text.trim().to_lowercase())
        .collect::<Vec<_>>()
        .join(" ");
    BRIDGING_PHRASES.contains(&phrase.as_str())
}

fn flush(subqueries: &mut Vec<String>, fragment: &mut String) {
    let text = fragment.trim();
    if text.split_whitespace().count() > 1 {
        subqueries.push(text.to_string());
    }
    fragment.clear();
}
