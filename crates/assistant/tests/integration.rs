use std::sync::Arc;
use std::thread;

use geochem_assistant::{AnalysisResult, Assistant, AssistantConfig, MapKind, Query};
use geochem_engine::{Dataset, Sample};
use geochem_protocol::{ResultType, WireResult};

fn survey() -> Dataset {
    let rows = [
        (21.00, 79.00, 0.5, 12.0, 40.0),
        (21.02, 79.05, 1.5, 30.0, 55.0),
        (21.07, 79.01, 0.8, 18.0, 61.0),
        (21.10, 79.09, 3.0, 45.0, 47.0),
        (21.04, 79.12, 1.1, 22.0, 190.0),
        (21.13, 79.03, 0.2, 9.0, 52.0),
        (21.09, 79.06, 0.9, 27.0, 44.0),
        (21.01, 79.10, 2.4, 35.0, 58.0),
    ];
    let mut samples: Vec<Sample> = rows
        .iter()
        .map(|&(lat, lon, au, cu, zn)| {
            Sample::new("55K14", lat, lon).with("au", au).with("cu", cu).with("zn", zn)
        })
        .collect();
    samples.push(Sample::new("55K15", 22.0, 80.0).with("au", 7.0).with("cu", 1.0));
    samples.push(Sample::new("55K15", 22.1, 80.1).with("au", 8.0).with("cu", 2.0));
    Dataset::from_samples(samples)
}

fn small_grids() -> AssistantConfig {
    AssistantConfig::from_toml("[kriging]\ngrid_size = 20\n[anomaly]\ngrid_size = 20\n").unwrap()
}

fn assistant() -> Assistant {
    Assistant::new(Arc::new(survey()), small_grids())
}

// -------------------------------------------------------------------------
// End-to-end answers
// -------------------------------------------------------------------------

#[test]
fn kriging_request_returns_kriging_map() {
    let response = assistant().respond(&Query::new(
        "Create a kriging map for copper for the toposheet number 55K14",
    ));
    assert_eq!(response.result_type, ResultType::KrigingMap);
    let AnalysisResult::Grid(map) = &response.result else {
        panic!("expected a grid, got {:?}", response.result);
    };
    assert_eq!(map.kind, MapKind::Kriging);
    assert_eq!(map.grid.shape(), (20, 20));
    assert_eq!(map.extremes.max.value, 45.0);
    assert_eq!(map.extremes.min.value, 9.0);
    assert_eq!(response.explain.subqueries.len(), 1);
    assert_eq!(response.explain.subqueries[0].intent, "kriging map");
}

#[test]
fn map_annotations_come_from_the_mapped_sheet() {
    // 55K15 holds the dataset-wide gold maximum (8.0)
    let response = assistant().respond(&Query::new("idw map for gold on 55K14"));
    let AnalysisResult::Grid(map) = &response.result else {
        panic!("expected a grid, got {:?}", response.result);
    };
    assert_eq!(map.kind, MapKind::Idw);
    assert_eq!(map.extremes.max.value, 3.0);
    assert_eq!(map.extremes.min.value, 0.2);
    assert!(map.extremes.max.lon < 80.0);
}

#[test]
fn compound_query_surfaces_first_subquery_only() {
    let response = assistant().respond(&Query::new(
        "show max gold for 55K14. also show kriging map for copper for 55K14.",
    ));
    assert_eq!(response.explain.corrected, "show max gold for 55K14. also show kriging map for copper for 55K14.");
    assert_eq!(response.explain.subqueries.len(), 2);
    assert_eq!(response.explain.subqueries[1].outcome, "kriging_map");
    assert_eq!(response.result_type, ResultType::Text);
    assert_eq!(
        response.result.as_text(),
        Some("For the toposheet 55K14, the element au has maximum PPM value 3.0 at latitude 21.1 and longitude 79.09.")
    );
}

#[test]
fn surface_all_returns_every_subquery() {
    let mut config = small_grids();
    config.response.surface = geochem_assistant::Surface::All;
    let assistant = Assistant::new(Arc::new(survey()), config);
    let response = assistant.respond(&Query::new(
        "show max gold for 55K14. also show kriging map for copper for 55K14.",
    ));
    assert_eq!(response.result_type, ResultType::KrigingMap);
    let AnalysisResult::Multi(results) = &response.result else {
        panic!("expected multi");
    };
    assert_eq!(results.len(), 2);
    assert!(results[0].as_text().is_some());
}

#[test]
fn both_extremes() {
    let response = assistant().respond(&Query::new(
        "the maximum and minimum longitude and latitude values for 55K14 for gold",
    ));
    let text = response.result.as_text().unwrap();
    assert!(text.contains("maximum PPM value 3.0 at latitude 21.1 and longitude 79.09"));
    assert!(text.contains("minimum PPM value 0.2 at latitude 21.13 and longitude 79.03"));
}

#[test]
fn extremum_keyword_outranks_map_keyword() {
    let response = assistant().respond(&Query::new("maximum zinc kriging map for 55K14"));
    assert_eq!(response.result_type, ResultType::Text);
    assert!(response.result.as_text().unwrap().contains("maximum PPM value 190.0"));
}

#[test]
fn idw_map_has_deviation_grid_and_overlay() {
    let response = assistant().respond(&Query::new("idw map for zinc on 55K14"));
    assert_eq!(response.result_type, ResultType::IdwMap);
    let AnalysisResult::Grid(map) = &response.result else {
        panic!("expected a grid");
    };
    // zinc sorted: 40 44 47 52 55 58 61 190 -> median 53.5
    assert_eq!(map.baseline, Some(53.5));
    assert_eq!(map.threshold, Some(190.0 - 53.5));
    assert!(map.anomalies.is_empty());
    assert_eq!(map.title, "Geochemical IDW Map for zn (Toposheet 55K14)");
    let sample_max = map.grid.sample_points.iter().map(|p| p.value).fold(f64::MIN, f64::max);
    assert_eq!(sample_max, 190.0 - 53.5);
}

// -------------------------------------------------------------------------
// Degraded answers
// -------------------------------------------------------------------------

#[test]
fn unsupported_query_apologizes() {
    let response = assistant().respond(&Query::new("hello there friend"));
    assert_eq!(response.result_type, ResultType::Text);
    assert!(response.result.as_text().unwrap().starts_with("I'm only able to provide information related to Nagpur data"));
}

#[test]
fn empty_query_gets_fallback() {
    let response = assistant().respond(&Query::new(""));
    assert!(response.explain.subqueries.is_empty());
    assert!(response.result.as_text().unwrap().starts_with("Sorry, I am unable to respond"));
}

#[test]
fn unknown_sheet_is_empty_subset_for_every_analysis() {
    let a = assistant();
    for q in [
        "maximum gold for 99Z99",
        "kriging map for gold for 99Z99",
        "idw map for gold for 99Z99",
    ] {
        let response = a.respond(&Query::new(q));
        assert_eq!(response.explain.subqueries[0].outcome, "empty_data_subset", "{q}");
        assert!(response.result.as_text().unwrap().contains("no au values for toposheet 99Z99"));
    }
}

#[test]
fn two_point_sheet_is_insufficient() {
    let response = assistant().respond(&Query::new("kriging map for gold for 55K15"));
    assert_eq!(response.explain.subqueries[0].outcome, "insufficient_data");
    assert_eq!(response.result_type, ResultType::Text);
}

#[test]
fn region_comes_from_config() {
    let config = AssistantConfig::from_toml("region = \"Chhindwara\"\n").unwrap();
    let response = Assistant::new(Arc::new(survey()), config).respond(&Query::new("hello there friend"));
    assert!(response.result.as_text().unwrap().contains("Chhindwara toposheet data"));
}

// -------------------------------------------------------------------------
// Wire form
// -------------------------------------------------------------------------

#[test]
fn wire_response_has_no_nan() {
    let response = assistant().respond(&Query::new("idw map for zinc on 55K14").with_topic("geochemistry"));
    let wire = response.to_wire(true);
    assert!(wire.explain.is_some());
    let json = serde_json::to_string(&wire).unwrap();
    assert!(!json.contains("NaN"));
    let WireResult::IdwMap(map) = &wire.result else {
        panic!("expected idw map");
    };
    assert_eq!(map.grid.shape(), (20, 20));
    assert_eq!(map.grid.null_count(), response_nan_count(&response.result));
    assert!(response.to_wire(false).explain.is_none());
}

fn response_nan_count(result: &AnalysisResult) -> usize {
    match result {
        AnalysisResult::Grid(map) => map.grid.nan_count(),
        _ => 0,
    }
}

#[test]
fn config_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("assistant.toml");
    std::fs::write(&path, "[anomaly]\npercentile = 50.0\ngrid_size = 12\n").unwrap();
    let config = AssistantConfig::from_file(&path).unwrap();
    let response = Assistant::new(Arc::new(survey()), config).respond(&Query::new("idw map for zinc on 55K14"));
    let AnalysisResult::Grid(map) = &response.result else {
        panic!("expected a grid");
    };
    assert_eq!(map.grid.shape(), (12, 12));
    assert!(!map.anomalies.is_empty());
}

// -------------------------------------------------------------------------
// Concurrency
// -------------------------------------------------------------------------

#[test]
fn concurrent_queries_match_sequential_answers() {
    let assistant = Arc::new(assistant());
    let queries = [
        "maximum gold for 55K14",
        "minimum copper for 55K14",
        "kriging map for copper for 55K14",
        "idw map for zinc on 55K14",
        "hello there friend",
    ];
    let expected: Vec<String> = queries
        .iter()
        .map(|q| format!("{:?}", assistant.respond(&Query::new(*q)).to_wire(false)))
        .collect();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let assistant = Arc::clone(&assistant);
            thread::spawn(move || {
                queries
                    .iter()
                    .map(|q| format!("{:?}", assistant.respond(&Query::new(*q)).to_wire(false)))
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), expected);
    }
}
