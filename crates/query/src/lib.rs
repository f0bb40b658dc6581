//! `geochem-query`: understanding free-text geochemistry questions.
//!
//! Pure text processing: corrected text in, sub-queries and intents out.
//! Knows nothing about the dataset or the analyses.

pub mod extract;
pub mod intent;
pub mod segment;
pub mod tokenize;
pub mod typo;
pub mod vocab;

pub use extract::{extract_elements, extract_sheet_ids, Entities};
pub use intent::{route, ExtremumMode, Intent};
pub use segment::{segment, segment_with};
pub use tokenize::{RuleTokenizer, Token, Tokenizer};
pub use typo::{correct, TypoCorrector};
