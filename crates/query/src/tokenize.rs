//! Tokenizer capability used by the segmenter.
//!
//! Segmentation only needs each token's text, the whitespace that follows
//! it, and whether it ends a sentence. Any linguistic tokenizer can stand in
//! behind [`Tokenizer`]; [`RuleTokenizer`] is the built-in whitespace +
//! punctuation splitter.

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    pub text: String,
    /// Whitespace between this token and the next, as it appeared.
    pub whitespace: String,
    pub is_sentence_terminal: bool,
}

impl Token {
    /// Text followed by its trailing whitespace.
    pub fn text_with_ws(&self) -> String {
        format!("{}{}", self.text, self.whitespace)
    }
}

pub trait Tokenizer {
    fn tokenize(&self, text: &str) -> Vec<Token>;
}

/// Splits on whitespace, then peels trailing punctuation off each word.
///
/// `"55K14."` becomes `55K14` + `.`; decimals such as `3.5` stay whole.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleTokenizer;

const TRAILING_PUNCT: &[char] = &['.', ',', ';', ':', '?', '!'];

impl Tokenizer for RuleTokenizer {
    fn tokenize(&self, text: &str) -> Vec<Token> {
        let mut tokens = Vec::new();
        let mut rest = text.trim_start();

        while !rest.is_empty() {
            let word_end = rest.find(char::is_whitespace).unwrap_or(rest.len());
            let word = &rest[..word_end];
            let after = &rest[word_end..];
            let ws_len = after.len() - after.trim_start().len();
            let whitespace = &after[..ws_len];
            rest = &after[ws_len..];

            let core = word.trim_end_matches(TRAILING_PUNCT);
            let (core, punct) = if core.is_empty() {
                (word, "")
            } else {
                (core, &word[core.len()..])
            };

            let mut pieces: Vec<&str> = vec![core];
            pieces.extend(punct.char_indices().map(|(i, c)| &punct[i..i + c.len_utf8()]));
            let last = pieces.len() - 1;
            for (i, piece) in pieces.into_iter().enumerate() {
                tokens.push(Token {
                    text: piece.to_string(),
                    whitespace: if i == last { whitespace.to_string() } else { String::new() },
                    is_sentence_terminal: piece == ".",
                });
            }
        }
        tokens
    }
}
