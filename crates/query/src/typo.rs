//! Per-word typo correction against a domain vocabulary.
//!
//! Similarity is Jaccard over character multisets: |A ∩ B| / |A ∪ B| where
//! each character counts with multiplicity. A word is replaced by the best
//! vocabulary entry scoring at or above the threshold; the earliest entry wins
//! ties. Everything else passes through untouched.

use std::collections::HashMap;

use crate::vocab::TYPO_WORDS;

pub const DEFAULT_THRESHOLD: f64 = 0.5;

#[derive(Debug, Clone)]
pub struct TypoCorrector {
    words: Vec<String>,
    threshold: f64,
}

impl Default for TypoCorrector {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD)
    }
}

impl TypoCorrector {
    /// Corrector over the built-in word list.
    pub fn new(threshold: f64) -> Self {
        Self {
            words: TYPO_WORDS.iter().map(|w| w.to_string()).collect(),
            threshold,
        }
    }

    /// Append words to the vocabulary. They rank after the built-ins on ties.
    pub fn with_words<I, S>(mut self, extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.words.extend(extra.into_iter().map(Into::into));
        self
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Correct every whitespace-separated word; words are re-joined with a
    /// single space. Empty input gives empty output.
    pub fn correct(&self, text: &str) -> String {
        text.split_whitespace()
            .map(|word| self.correct_word(word))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn correct_word<'a>(&'a self, word: &'a str) -> &'a str {
        let mut best: Option<(&str, f64)> = None;
        for candidate in &self.words {
            let score = jaccard(candidate, word);
            if score < self.threshold {
                continue;
            }
            if best.map_or(true, |(_, s)| score > s) {
                best = Some((candidate, score));
            }
        }
        match best {
            Some((replacement, _)) => {
                if replacement != word {
                    log::trace!("typo: {word:?} -> {replacement:?}");
                }
                replacement
            }
            None => word,
        }
    }
}

/// Correct `text` with the built-in vocabulary and default threshold.
pub fn correct(text: &str) -> String {
    TypoCorrector::default().correct(text)
}

/// Multiset Jaccard similarity of two strings' characters. Two empty
/// strings are identical.
pub fn jaccard(a: &str, b: &str) -> f64 {
    let counts = |s: &str| {
        let mut m: HashMap<char, usize> = HashMap::new();
        for c in s.chars() {
            *m.entry(c).or_insert(0) += 1;
        }
        m
    };
    let ca = counts(a);
    let cb = counts(b);

    let mut intersection = 0usize;
    let mut union = 0usize;
    for (c, &na) in &ca {
        let nb = cb.get(c).copied().unwrap_or(0);
        intersection += na.min(nb);
        union += na.max(nb);
    }
    union += cb
        .iter()
        .filter(|(c, _)| !ca.contains_key(c))
        .map(|(_, &n)| n)
        .sum::<usize>();

    if union == 0 {
        1.0
    } else {
        intersection as f64 / union as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jaccard_counts_multiplicity() {
        assert_eq!(jaccard("abc", "abc"), 1.0);
        assert_eq!(jaccard("", ""), 1.0);
        assert_eq!(jaccard("abc", "xyz"), 0.0);
        // max ∩ maximum = {m, a, x}; ∪ = {m, m, m, a, x, i, u}
        assert_eq!(jaccard("max", "maximum"), 3.0 / 7.0);
    }

    #[test]
    fn fixes_misspellings() {
        assert_eq!(correct("krigging map for gold"), "kriging map for gold");
        assert_eq!(correct("show maximun value"), "show maximum value");
        assert_eq!(correct("toposheat 55K14"), "toposheet 55K14");
    }

    #[test]
    fn leaves_unrelated_words_alone() {
        assert_eq!(correct("copper for the 55K14"), "copper for the 55K14");
    }

    #[test]
    fn abbreviations_stay_below_threshold() {
        // 3/7 against maximum and minimum; the router reads them as whole words
        assert_eq!(correct("max gold"), "max gold");
        assert_eq!(correct("min gold"), "min gold");
    }

    #[test]
    fn empty_and_whitespace() {
        assert_eq!(correct(""), "");
        assert_eq!(correct("   \t "), "");
        assert_eq!(correct("  kriging   map "), "kriging map");
    }

    #[test]
    fn extra_words_and_threshold() {
        let strict = TypoCorrector::new(0.95);
        assert_eq!(strict.correct("krigging"), "krigging");

        let extended = TypoCorrector::default().with_words(["anomaly"]);
        assert_eq!(extended.correct("anomaley"), "anomaly");
    }
}
