// Property tests for the interpolators.
// CI: 256 cases (default). Soak: PROPTEST_CASES=10000 cargo test --release

use proptest::prelude::*;
use geochem_engine::clough_tocher::CloughTocher;
use geochem_engine::{
    idw_anomalies, krige, AnalysisError, AnomalyParams, Dataset, KrigingParams, Sample, VariogramModel,
};

fn config_256() -> ProptestConfig {
    ProptestConfig {
        cases: std::env::var("PROPTEST_CASES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(256),
        failure_persistence: None,
        ..ProptestConfig::default()
    }
}

// ---------------------------------------------------------------------------
// Generators
// ---------------------------------------------------------------------------

/// 3×3 lattice with each node nudged by less than a third of the spacing,
/// so locations stay distinct and never all collinear.
fn arb_locations() -> impl Strategy<Value = Vec<(f64, f64)>> {
    prop::collection::vec((-0.3f64..0.3, -0.3f64..0.3), 9).prop_map(|jitter| {
        jitter
            .into_iter()
            .enumerate()
            .map(|(k, (jx, jy))| {
                let (i, j) = ((k % 3) as f64, (k / 3) as f64);
                (79.0 + (i + jx) * 0.01, 21.0 + (j + jy) * 0.01)
            })
            .collect()
    })
}

fn arb_survey() -> impl Strategy<Value = (Vec<(f64, f64)>, Vec<f64>)> {
    (arb_locations(), prop::collection::vec(0.0f64..500.0, 9))
}

fn dataset(locations: &[(f64, f64)], values: &[f64]) -> Dataset {
    Dataset::from_samples(
        locations
            .iter()
            .zip(values)
            .map(|(&(lon, lat), &v)| Sample::new("55K14", lat, lon).with("cu", v))
            .collect(),
    )
}

fn arb_model() -> impl Strategy<Value = VariogramModel> {
    prop_oneof![
        Just(VariogramModel::Spherical),
        Just(VariogramModel::Exponential),
        Just(VariogramModel::Gaussian),
        Just(VariogramModel::Linear),
    ]
}

// ---------------------------------------------------------------------------
// Clough–Tocher
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(config_256())]

    #[test]
    fn clough_tocher_passes_through_data((locations, values) in arb_survey()) {
        let surface = CloughTocher::new(locations.clone(), values.clone()).unwrap();
        for (&(x, y), &v) in locations.iter().zip(&values) {
            let got = surface.eval(x, y);
            prop_assert!((got - v).abs() <= 1e-6 * (1.0 + v.abs()), "at ({x}, {y}): {got} vs {v}");
        }
    }

    #[test]
    fn clough_tocher_is_nan_outside_hull((locations, values) in arb_survey()) {
        let surface = CloughTocher::new(locations, values).unwrap();
        prop_assert!(surface.eval(78.0, 20.0).is_nan());
        prop_assert!(surface.eval(80.0, 22.0).is_nan());
    }
}

// ---------------------------------------------------------------------------
// Deviation anomalies
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(config_256())]

    #[test]
    fn flagged_samples_exceed_threshold(
        (locations, values) in arb_survey(),
        percentile in 0.0f64..=100.0,
    ) {
        let ds = dataset(&locations, &values);
        let params = AnomalyParams { grid_size: 6, percentile };
        let map = idw_anomalies(&ds, "55K14", "cu", &params).unwrap();

        let lo = values.iter().copied().fold(f64::INFINITY, f64::min);
        let hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        prop_assert!(map.baseline >= lo && map.baseline <= hi);

        for &(lon, lat) in &map.anomalies {
            let k = locations.iter().position(|&p| p == (lon, lat)).unwrap();
            prop_assert!(values[k] - map.baseline > map.threshold);
        }
        let expected = values.iter().filter(|&&v| v - map.baseline > map.threshold).count();
        prop_assert_eq!(map.anomalies.len(), expected);
        prop_assert_eq!(map.grid.shape(), (6, 6));
    }

    #[test]
    fn top_percentile_flags_nothing((locations, values) in arb_survey()) {
        let ds = dataset(&locations, &values);
        let map = idw_anomalies(&ds, "55K14", "cu", &AnomalyParams { grid_size: 4, percentile: 100.0 }).unwrap();
        prop_assert!(map.anomalies.is_empty());
    }
}

// ---------------------------------------------------------------------------
// Kriging
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(config_256())]

    #[test]
    fn kriging_grid_shape_and_annotations(
        (locations, values) in arb_survey(),
        model in arb_model(),
    ) {
        let ds = dataset(&locations, &values);
        let params = KrigingParams { grid_size: 8, variogram_model: model, nlags: 6 };
        match krige(&ds, "55K14", "cu", &params) {
            Ok(map) => {
                prop_assert_eq!(map.grid.shape(), (8, 8));
                prop_assert_eq!(map.variance.len(), 8);
                let hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                let lo = values.iter().copied().fold(f64::INFINITY, f64::min);
                prop_assert_eq!(map.extremes.max.value, hi);
                prop_assert_eq!(map.extremes.min.value, lo);
            }
            // Constant columns and singular systems are the only acceptable failures
            Err(e) => prop_assert!(e.is_numerical(), "unexpected {e}"),
        }
    }

    #[test]
    fn unknown_sheet_is_empty_subset((locations, values) in arb_survey()) {
        let ds = dataset(&locations, &values);
        let err = krige(&ds, "99Z99", "cu", &KrigingParams::default()).unwrap_err();
        let is_empty = matches!(err, AnalysisError::EmptyDataSubset { .. });
        prop_assert!(is_empty);
    }
}
