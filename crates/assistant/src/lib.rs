//! `geochem-assistant`: answers free-text geochemistry questions.
//!
//! Wires the query pipeline to the analysis engine: correct, segment,
//! route and run each sub-query, then assemble one response. Holds the
//! dataset read-only; no IO beyond reading its own config file.

pub mod assemble;
pub mod assistant;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod model;

pub use assemble::assemble;
pub use assistant::Assistant;
pub use config::{AssistantConfig, Surface};
pub use dispatch::{lookup, Dispatcher};
pub use error::AssistantError;
pub use model::{AnalysisResult, MapKind, MapResult, Query, QueryFailure, Response};
