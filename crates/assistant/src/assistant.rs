use std::sync::Arc;

use geochem_engine::Dataset;
use geochem_protocol::Explain;
use geochem_query::{segment, TypoCorrector};

use crate::assemble::assemble;
use crate::config::AssistantConfig;
use crate::dispatch::Dispatcher;
use crate::model::{Query, Response};

/// Answers free-text questions against one loaded dataset.
///
/// The dataset is shared read-only; `respond` takes `&self` and keeps no
/// state between calls, so one `Assistant` can serve many threads.
#[derive(Debug, Clone)]
pub struct Assistant {
    dataset: Arc<Dataset>,
    config: AssistantConfig,
    corrector: TypoCorrector,
}

impl Assistant {
    pub fn new(dataset: Arc<Dataset>, config: AssistantConfig) -> Self {
        let corrector = config.typo.corrector();
        Self { dataset, config, corrector }
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn config(&self) -> &AssistantConfig {
        &self.config
    }

    /// Typo-correct the query text.
    pub fn correct(&self, text: &str) -> String {
        self.corrector.correct(text)
    }

    /// correct → segment → (route → analyse) per sub-query → assemble.
    pub fn respond(&self, query: &Query) -> Response {
        if let Some(topic) = &query.topic {
            log::debug!("topic {topic:?} (not used for dispatch)");
        }

        let corrected = self.correct(&query.text);
        log::debug!("corrected {:?} -> {corrected:?}", query.text);
        let subqueries = segment(&corrected);

        let dispatcher = Dispatcher::new(&self.dataset, &self.config);
        let mut traces = Vec::with_capacity(subqueries.len());
        let mut results = Vec::with_capacity(subqueries.len());
        for subquery in &subqueries {
            let outcome = dispatcher.run(subquery);
            traces.push(outcome.trace());
            results.push(outcome.into_result(&self.config.region));
        }

        let (result, result_type) = assemble(results, self.config.response.surface, &self.config.region);
        log::info!(
            "answered {:?}: {} sub-quer{}, result type {result_type}",
            query.text,
            subqueries.len(),
            if subqueries.len() == 1 { "y" } else { "ies" }
        );

        Response {
            result,
            result_type,
            explain: Explain {
                original: query.text.clone(),
                corrected,
                subqueries: traces,
            },
        }
    }
}
