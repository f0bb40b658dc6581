// geoq - free-text queries over geochemical toposheet samples
// Every command writes exactly one JSON value to stdout; logs go to stderr.

mod exit_codes;

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use serde::Serialize;

use geochem_assistant::{AnalysisResult, Assistant, AssistantConfig, AssistantError, MapResult, Query};
use geochem_config::Settings;
use geochem_engine::{extremes, idw_anomalies, krige, Dataset, Extremes};
use geochem_io::{load_dataset, LoadError};
use geochem_query::{route, segment, vocab, Entities, Intent};

use exit_codes::{EXIT_CONFIG, EXIT_ERROR, EXIT_LOAD, EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "geoq")]
#[command(about = "Ask questions about geochemical toposheet samples")]
#[command(long_version = long_version())]
#[command(version)]
struct Cli {
    /// Log level (error, warn, info, debug, trace); overrides RUST_LOG
    #[arg(long, global = true, value_name = "LEVEL")]
    log_level: Option<String>,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pretty: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Where the samples and assistant tuning come from. Falls back to the
/// paths in settings.json.
#[derive(Args)]
struct Sources {
    /// Sample CSV (toposheet, latitude, longitude, one column per element)
    #[arg(long, short = 'd', value_name = "CSV")]
    data: Option<PathBuf>,

    /// Assistant config TOML
    #[arg(long, short = 'c', value_name = "TOML")]
    config: Option<PathBuf>,
}

/// One (sheet, element) subset.
#[derive(Args)]
struct Target {
    /// Toposheet id, e.g. 55K14
    #[arg(long, short = 's')]
    sheet: String,

    /// Element code or name, e.g. cu or copper
    #[arg(long, short = 'e')]
    element: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Answer a free-text query
    #[command(after_help = "\
Examples:
  geoq ask 'Create a kriging map for copper for the toposheet number 55K14' -d nagpur.csv
  geoq ask 'show max gold for 55K14' -d nagpur.csv --explain --pretty
  geoq ask 'idw map for zinc on 55K14' -d nagpur.csv -c assistant.toml")]
    Ask {
        /// The question, as typed
        query: String,

        /// Topic hint passed along with the query
        #[arg(long)]
        topic: Option<String>,

        /// Include corrected text and per-sub-query routing in the output
        #[arg(long)]
        explain: bool,

        #[command(flatten)]
        sources: Sources,
    },

    /// Typo-correct text against the query vocabulary
    Correct {
        text: String,

        #[arg(long, short = 'c', value_name = "TOML")]
        config: Option<PathBuf>,
    },

    /// Split text into sub-queries
    Segment { text: String },

    /// List element codes and toposheet ids mentioned in text
    Extract { text: String },

    /// Show which analysis a sub-query routes to
    Route { text: String },

    /// Max and min concentration on one toposheet
    #[command(after_help = "\
Examples:
  geoq extremes -s 55K14 -e au -d nagpur.csv")]
    Extremes {
        #[command(flatten)]
        target: Target,

        #[command(flatten)]
        sources: Sources,
    },

    /// Kriging surface for one toposheet
    #[command(after_help = "\
Examples:
  geoq krige -s 55K14 -e copper -d nagpur.csv > cu.json")]
    Krige {
        #[command(flatten)]
        target: Target,

        #[command(flatten)]
        sources: Sources,
    },

    /// IDW deviation map with anomaly overlay for one toposheet
    Anomalies {
        #[command(flatten)]
        target: Target,

        #[command(flatten)]
        sources: Sources,
    },
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        " (", env!("GIT_COMMIT_HASH"), ")",
        "\ntarget:  ", env!("TARGET"),
    )
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let settings = Settings::load();
    init_logging(cli.log_level.as_deref(), &settings);
    let pretty = cli.pretty || settings.pretty;

    let result = match cli.command {
        Commands::Ask { query, topic, explain, sources } => cmd_ask(query, topic, explain, &sources, &settings),
        Commands::Correct { text, config } => cmd_correct(text, config.as_deref(), &settings),
        Commands::Segment { text } => Ok(to_value(&SegmentOutput { subqueries: segment(&text), text })),
        Commands::Extract { text } => Ok(to_value(&Entities::from_text(&text))),
        Commands::Route { text } => {
            let intent = route(&text);
            Ok(to_value(&RouteOutput { label: intent.to_string(), route: intent, text }))
        }
        Commands::Extremes { target, sources } => cmd_extremes(&target, &sources, &settings),
        Commands::Krige { target, sources } => cmd_krige(&target, &sources, &settings),
        Commands::Anomalies { target, sources } => cmd_anomalies(&target, &sources, &settings),
    };

    match result.and_then(|value| write_json(&value, pretty)) {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

/// `--log-level`, then `RUST_LOG`, then settings.json, then `warn`.
fn init_logging(flag: Option<&str>, settings: &Settings) {
    let mut builder = env_logger::Builder::new();
    match (flag, std::env::var("RUST_LOG").ok()) {
        (Some(level), _) => builder.parse_filters(level),
        (None, Some(env)) => builder.parse_filters(&env),
        (None, None) => builder.parse_filters(settings.log_level.as_deref().unwrap_or("warn")),
    };
    builder.target(env_logger::Target::Stderr).init();
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn usage(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self { code: EXIT_ERROR, message: msg.into(), hint: None }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl From<LoadError> for CliError {
    fn from(err: LoadError) -> Self {
        let hint = match &err {
            LoadError::MissingColumn(_) => Some("the file needs toposheet, latitude and longitude columns".to_string()),
            _ => None,
        };
        Self { code: EXIT_LOAD, message: format!("cannot load dataset: {err}"), hint }
    }
}

impl From<AssistantError> for CliError {
    fn from(err: AssistantError) -> Self {
        Self { code: EXIT_CONFIG, message: err.to_string(), hint: None }
    }
}

// ============================================================================
// Inputs
// ============================================================================

fn load_config(path: Option<&Path>, settings: &Settings) -> Result<AssistantConfig, CliError> {
    match path.or(settings.assistant_config.as_deref()) {
        Some(path) => Ok(AssistantConfig::from_file(path)?),
        None => Ok(AssistantConfig::default()),
    }
}

fn load_data(sources: &Sources, settings: &Settings) -> Result<Dataset, CliError> {
    let path = sources
        .data
        .as_deref()
        .or(settings.data_path.as_deref())
        .ok_or_else(|| {
            CliError::usage("no dataset given").with_hint(format!(
                "pass --data <CSV> or set \"data.path\" in {}",
                Settings::config_path_display()
            ))
        })?;
    Ok(load_dataset(path)?)
}

/// Accept either a code ("cu") or a full name ("copper").
fn element_code(arg: &str) -> String {
    let arg = arg.trim();
    vocab::code_for(arg)
        .map(str::to_string)
        .unwrap_or_else(|| arg.to_lowercase())
}

// ============================================================================
// Commands
// ============================================================================

#[derive(Serialize)]
struct CorrectOutput {
    original: String,
    corrected: String,
}

#[derive(Serialize)]
struct SegmentOutput {
    text: String,
    subqueries: Vec<String>,
}

#[derive(Serialize)]
struct RouteOutput {
    text: String,
    label: String,
    route: Intent,
}

#[derive(Serialize)]
struct ExtremesOutput {
    sheet: String,
    element: String,
    #[serde(flatten)]
    extremes: Extremes,
}

fn cmd_ask(
    query: String,
    topic: Option<String>,
    explain: bool,
    sources: &Sources,
    settings: &Settings,
) -> Result<serde_json::Value, CliError> {
    let config = load_config(sources.config.as_deref(), settings)?;
    let dataset = load_data(sources, settings)?;
    let assistant = Assistant::new(Arc::new(dataset), config);

    let mut query = Query::new(query);
    if let Some(topic) = topic {
        query = query.with_topic(topic);
    }
    let response = assistant.respond(&query);
    Ok(to_value(&response.to_wire(explain)))
}

fn cmd_correct(text: String, config: Option<&Path>, settings: &Settings) -> Result<serde_json::Value, CliError> {
    let config = load_config(config, settings)?;
    let corrected = config.typo.corrector().correct(&text);
    Ok(to_value(&CorrectOutput { original: text, corrected }))
}

fn cmd_extremes(target: &Target, sources: &Sources, settings: &Settings) -> Result<serde_json::Value, CliError> {
    let dataset = load_data(sources, settings)?;
    let element = element_code(&target.element);
    let ex = extremes(&dataset, &target.sheet, &element).map_err(analysis_error)?;
    Ok(to_value(&ExtremesOutput { sheet: target.sheet.clone(), element, extremes: ex }))
}

fn cmd_krige(target: &Target, sources: &Sources, settings: &Settings) -> Result<serde_json::Value, CliError> {
    let config = load_config(sources.config.as_deref(), settings)?;
    let dataset = load_data(sources, settings)?;
    let element = element_code(&target.element);
    let map = krige(&dataset, &target.sheet, &element, &config.kriging.params()).map_err(analysis_error)?;
    log::info!(
        "fitted {} variogram for {element} on {}",
        config.kriging.variogram_model,
        target.sheet
    );
    Ok(to_value(&AnalysisResult::Grid(MapResult::from(map)).to_wire()))
}

fn cmd_anomalies(target: &Target, sources: &Sources, settings: &Settings) -> Result<serde_json::Value, CliError> {
    let config = load_config(sources.config.as_deref(), settings)?;
    let dataset = load_data(sources, settings)?;
    let element = element_code(&target.element);
    let map = idw_anomalies(&dataset, &target.sheet, &element, &config.anomaly.params()).map_err(analysis_error)?;
    Ok(to_value(&AnalysisResult::Grid(MapResult::from(map)).to_wire()))
}

/// Direct analysis commands have no apology layer: failures are errors.
fn analysis_error(err: geochem_engine::AnalysisError) -> CliError {
    let hint = if err.is_numerical() {
        None
    } else {
        Some("check the toposheet id and element code; `geoq extract` shows what a query mentions".to_string())
    };
    CliError { code: EXIT_ERROR, message: err.to_string(), hint }
}

// ============================================================================
// Output
// ============================================================================

fn to_value<T: Serialize>(value: &T) -> serde_json::Value {
    // Output types hold no maps with non-string keys, so this cannot fail.
    serde_json::to_value(value).unwrap_or(serde_json::Value::Null)
}

fn write_json(value: &serde_json::Value, pretty: bool) -> Result<(), CliError> {
    let text = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
    .map_err(|e| CliError::io(e.to_string()))?;

    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{}", text).map_err(|e| CliError::io(format!("cannot write output: {e}")))
}
