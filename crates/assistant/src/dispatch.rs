//! Per-sub-query dispatch: route, extract, run the analysis, and turn any
//! failure into apology text for that sub-query alone.

use geochem_engine::{extremes, idw_anomalies, krige, AnalysisError, Dataset, Extremes};
use geochem_protocol::SubQueryTrace;
use geochem_query::{route, Entities, ExtremumMode, Intent};

use crate::config::AssistantConfig;
use crate::model::{AnalysisResult, MapResult, QueryFailure};

// ---------------------------------------------------------------------------
// Apology texts
// ---------------------------------------------------------------------------

pub fn unsupported_text(region: &str) -> String {
    format!(
        "I'm only able to provide information related to {region} data. Please enter a valid \
         query about {region} toposheet data. Thank you for your understanding and patience."
    )
}

pub fn failure_text(region: &str) -> String {
    format!(
        "There was problem processing your query, please try again and make sure the query is \
         valid on {region} toposheet data. Thank you for your understanding and patience."
    )
}

pub fn fallback_text(region: &str) -> String {
    format!(
        "Sorry, I am unable to respond to this query. I am currently equipped to provide \
         information on {region} Geochemistry Toposheet data and can handle one query at a time. \
         Thank you for your understanding."
    )
}

fn empty_subset_text(region: &str, sheet: &str, element: &str) -> String {
    format!(
        "Sorry, there are no {element} values for toposheet {sheet} in the {region} data. \
         Please check the toposheet number and the element name."
    )
}

fn insufficient_text(sheet: &str, element: &str, found: usize) -> String {
    format!(
        "Sorry, toposheet {sheet} has only {found} usable sample location(s) for {element}. \
         At least 3 locations that are not on one line are needed to build a map."
    )
}

/// User-facing text for a failed sub-query. Logs at warn for data problems
/// and at error for numerical failures.
pub fn apology(failure: &QueryFailure, region: &str) -> String {
    match failure {
        QueryFailure::Unrecognized(why) => {
            log::warn!("unrecognized sub-query: {why}");
            unsupported_text(region)
        }
        QueryFailure::Analysis(AnalysisError::EmptyDataSubset { sheet, element }) => {
            log::warn!("{failure}");
            empty_subset_text(region, sheet, element)
        }
        QueryFailure::Analysis(AnalysisError::InsufficientData { sheet, element, found }) => {
            log::warn!("{failure}");
            insufficient_text(sheet, element, *found)
        }
        QueryFailure::Analysis(e) if e.is_numerical() => {
            log::error!("analysis failed: {e}");
            failure_text(region)
        }
        QueryFailure::Analysis(e) => {
            log::warn!("analysis failed: {e}");
            failure_text(region)
        }
    }
}

// ---------------------------------------------------------------------------
// Extremum lookup
// ---------------------------------------------------------------------------

/// Extremum answer text for `element` on `sheet_id`; an apology when the
/// subset is empty or the column does not exist.
pub fn lookup(mode: ExtremumMode, sheet_id: &str, element: &str, dataset: &Dataset, region: &str) -> String {
    match extremes(dataset, sheet_id, element) {
        Ok(ex) => extremum_text(mode, sheet_id, element, &ex),
        Err(e) => apology(&QueryFailure::Analysis(e), region),
    }
}

/// Floats print with at least one decimal, so 12 reads "12.0".
fn extremum_text(mode: ExtremumMode, sheet: &str, element: &str, ex: &Extremes) -> String {
    let (max, min) = (&ex.max, &ex.min);
    match mode {
        ExtremumMode::Max => format!(
            "For the toposheet {sheet}, the element {element} has maximum PPM value {:?} at latitude {:?} and longitude {:?}.",
            max.value, max.lat, max.lon
        ),
        ExtremumMode::Min => format!(
            "For the toposheet {sheet}, the element {element} has minimum PPM value {:?} at latitude {:?} and longitude {:?}.",
            min.value, min.lat, min.lon
        ),
        ExtremumMode::Both => format!(
            "For the toposheet {sheet}, the element {element} has maximum PPM value {:?} at latitude {:?} and longitude {:?}, \
             and has minimum PPM value {:?} at latitude {:?} and longitude {:?}.",
            max.value, max.lat, max.lon, min.value, min.lat, min.lon
        ),
    }
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

/// Outcome of one sub-query, kept with what was understood from it.
#[derive(Debug)]
pub struct SubQueryOutcome {
    pub text: String,
    pub intent: Intent,
    pub entities: Entities,
    pub result: Result<AnalysisResult, QueryFailure>,
}

impl SubQueryOutcome {
    /// The result, with failures replaced by apology text.
    pub fn into_result(self, region: &str) -> AnalysisResult {
        match self.result {
            Ok(r) => r,
            Err(failure) => AnalysisResult::Text(apology(&failure, region)),
        }
    }

    pub fn trace(&self) -> SubQueryTrace {
        let outcome = match &self.result {
            Ok(AnalysisResult::Text(_)) => "text".to_string(),
            Ok(AnalysisResult::Grid(map)) => format!("{}_map", map.kind),
            Ok(AnalysisResult::Multi(results)) => format!("multi({})", results.len()),
            Err(failure) => failure.class().to_string(),
        };
        SubQueryTrace {
            text: self.text.clone(),
            intent: self.intent.to_string(),
            elements: self.entities.elements.clone(),
            sheet_ids: self.entities.sheet_ids.clone(),
            outcome,
        }
    }
}

pub struct Dispatcher<'a> {
    dataset: &'a Dataset,
    config: &'a AssistantConfig,
}

impl<'a> Dispatcher<'a> {
    pub fn new(dataset: &'a Dataset, config: &'a AssistantConfig) -> Self {
        Self { dataset, config }
    }

    /// Route and run one sub-query. Entities come from this sub-query's own
    /// text: the first sheet id in text order and the first element in
    /// vocabulary order.
    pub fn run(&self, subquery: &str) -> SubQueryOutcome {
        let intent = route(subquery);
        let entities = Entities::from_text(subquery);
        let result = self.execute(intent, &entities);
        SubQueryOutcome {
            text: subquery.to_string(),
            intent,
            entities,
            result,
        }
    }

    fn execute(&self, intent: Intent, entities: &Entities) -> Result<AnalysisResult, QueryFailure> {
        if intent == Intent::Unsupported {
            return Err(QueryFailure::Unrecognized("no analysis keyword".into()));
        }
        let (sheet, element) = entities.primary().ok_or_else(|| {
            QueryFailure::Unrecognized(format!(
                "need a toposheet id and an element (found sheets {:?}, elements {:?})",
                entities.sheet_ids, entities.elements
            ))
        })?;

        match intent {
            Intent::ExtremumLookup(mode) => {
                let ex = extremes(self.dataset, sheet, element)?;
                Ok(AnalysisResult::Text(extremum_text(mode, sheet, element, &ex)))
            }
            Intent::KrigingMap => self.kriging(sheet, element),
            Intent::IdwAnomalyMap => self.idw(sheet, element),
            Intent::Both => Ok(AnalysisResult::Multi(vec![
                self.idw(sheet, element)?,
                self.kriging(sheet, element)?,
            ])),
            Intent::Unsupported => Err(QueryFailure::Unrecognized("no analysis keyword".into())),
        }
    }

    fn kriging(&self, sheet: &str, element: &str) -> Result<AnalysisResult, QueryFailure> {
        let map = krige(self.dataset, sheet, element, &self.config.kriging.params())?;
        Ok(AnalysisResult::Grid(MapResult::from(map)))
    }

    fn idw(&self, sheet: &str, element: &str) -> Result<AnalysisResult, QueryFailure> {
        let map = idw_anomalies(self.dataset, sheet, element, &self.config.anomaly.params())?;
        Ok(AnalysisResult::Grid(MapResult::from(map)))
    }
}
