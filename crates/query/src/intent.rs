//! Keyword routing of a sub-query to the analysis it asks for.
//!
//! Precedence, first match wins:
//! 1. "maximum" and "minimum"      → extremum lookup, both
//! 2. "maximum"                    → extremum lookup, max
//! 3. "minimum"                    → extremum lookup, min
//! 4. "idw" / "inverse distance weighted map" → IDW anomaly map
//! 5. "idw" and "kriging"          → both maps
//! 6. "kriging"                    → kriging map
//! 7. otherwise                    → unsupported
//!
//! "max"/"min" as whole words count as "maximum"/"minimum". Extremum
//! keywords outrank map keywords, so "max gold kriging map" is a lookup.
//! Rule 5 can never fire because rule 4 already matched; it is kept so
//! the order stays the documented one.

use std::fmt;

use serde::Serialize;

use crate::extract::words;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtremumMode {
    Max,
    Min,
    Both,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "intent", content = "mode", rename_all = "snake_case")]
pub enum Intent {
    ExtremumLookup(ExtremumMode),
    KrigingMap,
    IdwAnomalyMap,
    Both,
    Unsupported,
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Intent::ExtremumLookup(ExtremumMode::Max) => write!(f, "extremum lookup (max)"),
            Intent::ExtremumLookup(ExtremumMode::Min) => write!(f, "extremum lookup (min)"),
            Intent::ExtremumLookup(ExtremumMode::Both) => write!(f, "extremum lookup (max+min)"),
            Intent::KrigingMap => write!(f, "kriging map"),
            Intent::IdwAnomalyMap => write!(f, "idw anomaly map"),
            Intent::Both => write!(f, "idw + kriging maps"),
            Intent::Unsupported => write!(f, "unsupported"),
        }
    }
}

pub fn route(subquery: &str) -> Intent {
    let lower = subquery.to_lowercase();

    let max = lower.contains("maximum") || words(&lower).any(|w| w == "max");
    let min = lower.contains("minimum") || words(&lower).any(|w| w == "min");
    let idw = lower.contains("idw") || lower.contains("inverse distance weighted map");
    let kriging = lower.contains("kriging");

    let intent = if max && min {
        Intent::ExtremumLookup(ExtremumMode::Both)
    } else if max {
        Intent::ExtremumLookup(ExtremumMode::Max)
    } else if min {
        Intent::ExtremumLookup(ExtremumMode::Min)
    } else if idw {
        Intent::IdwAnomalyMap
    } else if idw && kriging {
        Intent::Both
    } else if kriging {
        Intent::KrigingMap
    } else {
        Intent::Unsupported
    };
    log::debug!("routed {subquery:?} -> {intent}");
    intent
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extremum_precedence() {
        assert_eq!(route("maximum and minimum gold 55K14"), Intent::ExtremumLookup(ExtremumMode::Both));
        assert_eq!(route("MAX and MIN gold 55K14"), Intent::ExtremumLookup(ExtremumMode::Both));
        assert_eq!(route("maximum gold 55K14"), Intent::ExtremumLookup(ExtremumMode::Max));
        assert_eq!(route("min gold on 55K14"), Intent::ExtremumLookup(ExtremumMode::Min));
    }

    #[test]
    fn extremum_outranks_maps() {
        assert_eq!(
            route("kriging map of maximum gold for 55K14"),
            Intent::ExtremumLookup(ExtremumMode::Max)
        );
    }

    #[test]
    fn maps() {
        assert_eq!(route("idw map for zinc 55K14"), Intent::IdwAnomalyMap);
        assert_eq!(route("inverse distance weighted map for zinc"), Intent::IdwAnomalyMap);
        assert_eq!(route("idw and kriging for zinc"), Intent::IdwAnomalyMap);
        assert_eq!(route("Kriging map for copper"), Intent::KrigingMap);
    }

    #[test]
    fn abbreviations_need_whole_words() {
        assert_eq!(route("determine mining output"), Intent::Unsupported);
        assert_eq!(route("what is the weather"), Intent::Unsupported);
        assert_eq!(route("max_gold 55K14"), Intent::Unsupported);
        assert_eq!(route("gold (max) on 55K14"), Intent::ExtremumLookup(ExtremumMode::Max));
    }

    #[test]
    fn display_names() {
        assert_eq!(Intent::ExtremumLookup(ExtremumMode::Both).to_string(), "extremum lookup (max+min)");
        assert_eq!(Intent::IdwAnomalyMap.to_string(), "idw anomaly map");
    }
}
