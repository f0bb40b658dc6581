// Response assembly: pick the surfaced result(s) and tag the response

use geochem_protocol::ResultType;

use crate::config::Surface;
use crate::dispatch::fallback_text;
use crate::model::{AnalysisResult, MapKind};

/// Merge per-sub-query results into one response result and its tag.
///
/// With [`Surface::First`] only the first sub-query's result reaches the
/// caller; the rest were computed and are dropped here. [`Surface::All`]
/// returns every result as a `Multi` (or the lone result unwrapped). No
/// results at all gives the fallback apology.
///
/// The tag looks at what is surfaced: any kriging grid → `kriging_map`,
/// else any IDW grid → `idw_map`, else `text`.
pub fn assemble(results: Vec<AnalysisResult>, surface: Surface, region: &str) -> (AnalysisResult, ResultType) {
    let mut results = results;
    let surfaced = match (surface, results.len()) {
        (_, 0) => AnalysisResult::Text(fallback_text(region)),
        (Surface::First, _) | (Surface::All, 1) => results.swap_remove(0),
        (Surface::All, _) => AnalysisResult::Multi(results),
    };
    let tag = result_type(&surfaced);
    (surfaced, tag)
}

pub fn result_type(result: &AnalysisResult) -> ResultType {
    if result.contains_map(MapKind::Kriging) {
        ResultType::KrigingMap
    } else if result.contains_map(MapKind::Idw) {
        ResultType::IdwMap
    } else {
        ResultType::Text
    }
}
