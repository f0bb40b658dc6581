// Integration tests enforcing the geoq stdout contract.
//
// Every command prints exactly one JSON value on stdout. Queries the
// assistant cannot answer still succeed with a text result; only bad
// arguments, unreadable data and broken config change the exit code.
//
// Run with: cargo test -p geochem-cli --test json_contract -- --nocapture

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

const SURVEY: &str = "\
toposheet,latitude,longitude,sample_type,au,cu,zn
55K14,21.00,79.00,stream,0.5,12,40
55K14,21.02,79.05,stream,1.5,30,55
55K14,21.07,79.01,stream,0.8,18,61
55K14,21.10,79.09,stream,3.0,45,47
55K14,21.04,79.12,stream,1.1,22,190
55K14,21.13,79.03,stream,0.2,9,52
55K14,21.09,79.06,stream,0.9,27,44
55K14,21.01,79.10,stream,2.4,35,58
55K15,22.00,80.00,stream,7.0,1,
";

struct Fixture {
    dir: TempDir,
}

impl Fixture {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("survey.csv"), SURVEY).unwrap();
        std::fs::write(
            dir.path().join("assistant.toml"),
            "[kriging]\ngrid_size = 15\n[anomaly]\ngrid_size = 15\n",
        )
        .unwrap();
        Self { dir }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn data(&self) -> String {
        self.path("survey.csv").to_string_lossy().into_owned()
    }

    fn config(&self) -> String {
        self.path("assistant.toml").to_string_lossy().into_owned()
    }

    /// geoq with settings.json isolated under the fixture dir.
    fn geoq(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_geoq"));
        cmd.env("XDG_CONFIG_HOME", self.dir.path().join("xdg"))
            .env("HOME", self.dir.path())
            .env_remove("RUST_LOG");
        cmd
    }

    fn run(&self, args: &[&str]) -> Output {
        self.geoq().args(args).output().expect("run geoq")
    }
}

/// Assert stdout is a single, parseable JSON value.
fn assert_single_json(output: &Output) -> serde_json::Value {
    assert!(
        output.status.success(),
        "exit code: {:?}\nstderr: {}",
        output.status,
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    let trimmed = stdout.trim();
    assert!(!trimmed.is_empty(), "stdout should not be empty");
    serde_json::from_str(trimmed)
        .unwrap_or_else(|e| panic!("stdout must be valid JSON.\nParse error: {}\nstdout:\n{}", e, trimmed))
}

fn exit_code(output: &Output) -> Option<i32> {
    output.status.code()
}

// ===========================================================================
// geoq ask
// ===========================================================================

#[test]
fn ask_kriging_map() {
    let fx = Fixture::new();
    let out = fx.run(&[
        "ask",
        "Create a kriging map for copper for the toposheet number 55K14",
        "--data",
        &fx.data(),
        "--config",
        &fx.config(),
    ]);
    let val = assert_single_json(&out);
    assert_eq!(val["protocol_version"], 1);
    assert_eq!(val["result_type"], "kriging_map");
    assert_eq!(val["result"]["kind"], "kriging_map");
    assert_eq!(val["result"]["element"], "cu");
    assert_eq!(val["result"]["title"], "Stream Sediment samples showing cu Values(ppm)");
    assert_eq!(val["result"]["grid"]["z"].as_array().unwrap().len(), 15);
    assert_eq!(val["result"]["annotations"]["max"]["value"], 45.0);
    assert!(val.get("explain").is_none());
}

#[test]
fn ask_idw_map_has_overlay_fields() {
    let fx = Fixture::new();
    let out = fx.run(&["ask", "idw map for zinc on 55K14", "-d", &fx.data(), "-c", &fx.config()]);
    let val = assert_single_json(&out);
    assert_eq!(val["result_type"], "idw_map");
    assert_eq!(val["result"]["baseline"], 53.5);
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(!stdout.contains("NaN"));
}

#[test]
fn ask_with_explain() {
    let fx = Fixture::new();
    let out = fx.run(&[
        "ask",
        "show max gold for 55K14. also show kriging map for copper for 55K14.",
        "-d",
        &fx.data(),
        "-c",
        &fx.config(),
        "--explain",
        "--topic",
        "geochemistry",
    ]);
    let val = assert_single_json(&out);
    assert_eq!(val["result_type"], "text");
    let content = val["result"]["content"].as_str().unwrap();
    assert!(content.contains("maximum PPM value 3.0"), "{content}");
    assert_eq!(
        val["explain"]["corrected"],
        "show max gold for 55K14. also show kriging map for copper for 55K14."
    );
    let subqueries = val["explain"]["subqueries"].as_array().unwrap();
    assert_eq!(subqueries.len(), 2);
    assert_eq!(subqueries[1]["outcome"], "kriging_map");
}

#[test]
fn unsupported_query_is_not_a_failure() {
    let fx = Fixture::new();
    let out = fx.run(&["ask", "hello there friend", "-d", &fx.data()]);
    let val = assert_single_json(&out);
    assert_eq!(val["result_type"], "text");
    assert!(val["result"]["content"]
        .as_str()
        .unwrap()
        .starts_with("I'm only able to provide information related to Nagpur data"));
}

#[test]
fn pretty_output_is_still_one_value() {
    let fx = Fixture::new();
    let out = fx.run(&["ask", "minimum copper for 55K14", "-d", &fx.data(), "--pretty"]);
    let val = assert_single_json(&out);
    assert!(String::from_utf8_lossy(&out.stdout).lines().count() > 1);
    assert!(val["result"]["content"].as_str().unwrap().contains("minimum PPM value 9.0"));
}

// ===========================================================================
// Pipeline stages
// ===========================================================================

#[test]
fn correct_command() {
    let fx = Fixture::new();
    let val = assert_single_json(&fx.run(&["correct", "show max krigin map"]));
    assert_eq!(val["original"], "show max krigin map");
    assert_eq!(val["corrected"], "show max kriging map");
}

#[test]
fn segment_command() {
    let fx = Fixture::new();
    let val = assert_single_json(&fx.run(&["segment", "show max gold for 55K14. also make a kriging map"]));
    let subqueries: Vec<&str> = val["subqueries"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap())
        .collect();
    assert_eq!(subqueries, ["max gold for 55K14", "make a kriging map"]);
}

#[test]
fn extract_command() {
    let fx = Fixture::new();
    let val = assert_single_json(&fx.run(&["extract", "gold and copper on 55K14 and 56A01"]));
    assert_eq!(val["elements"], serde_json::json!(["cu", "au"]));
    assert_eq!(val["sheet_ids"], serde_json::json!(["55K14", "56A01"]));
}

#[test]
fn route_command() {
    let fx = Fixture::new();
    let val = assert_single_json(&fx.run(&["route", "maximum and minimum gold"]));
    assert_eq!(val["route"]["intent"], "extremum_lookup");
    assert_eq!(val["route"]["mode"], "both");
    assert_eq!(val["label"], "extremum lookup (max+min)");

    let val = assert_single_json(&fx.run(&["route", "inverse distance weighted map of zinc"]));
    assert_eq!(val["route"]["intent"], "idw_anomaly_map");
}

// ===========================================================================
// Direct analyses
// ===========================================================================

#[test]
fn extremes_accepts_element_names() {
    let fx = Fixture::new();
    let val = assert_single_json(&fx.run(&["extremes", "-s", "55K14", "-e", "gold", "-d", &fx.data()]));
    assert_eq!(val["element"], "au");
    assert_eq!(val["max"]["value"], 3.0);
    assert_eq!(val["min"]["lat"], 21.13);
}

#[test]
fn krige_and_anomalies_commands() {
    let fx = Fixture::new();
    let val = assert_single_json(&fx.run(&[
        "krige", "-s", "55K14", "-e", "cu", "-d", &fx.data(), "-c", &fx.config(),
    ]));
    assert_eq!(val["kind"], "kriging_map");
    assert_eq!(val["grid"]["x"].as_array().unwrap().len(), 15);

    let val = assert_single_json(&fx.run(&[
        "anomalies", "-s", "55K14", "-e", "zn", "-d", &fx.data(), "-c", &fx.config(),
    ]));
    assert_eq!(val["kind"], "idw_map");
    assert_eq!(val["title"], "Geochemical IDW Map for zn (Toposheet 55K14)");
}

// ===========================================================================
// Exit codes
// ===========================================================================

#[test]
fn unknown_sheet_is_an_error_for_direct_analyses() {
    let fx = Fixture::new();
    let out = fx.run(&["krige", "-s", "99Z99", "-e", "cu", "-d", &fx.data()]);
    assert_eq!(exit_code(&out), Some(1));
    assert!(out.stdout.is_empty());
}

#[test]
fn missing_dataset_is_usage_error() {
    let fx = Fixture::new();
    let out = fx.run(&["ask", "maximum gold for 55K14"]);
    assert_eq!(exit_code(&out), Some(2));
    assert!(String::from_utf8_lossy(&out.stderr).contains("no dataset given"));
}

#[test]
fn unreadable_dataset_is_load_error() {
    let fx = Fixture::new();
    let out = fx.run(&["ask", "maximum gold for 55K14", "-d", "/nonexistent/survey.csv"]);
    assert_eq!(exit_code(&out), Some(3));

    let bad = fx.path("bad.csv");
    std::fs::write(&bad, "sheet,lat,lon\n55K14,21,79\n").unwrap();
    let out = fx.run(&["ask", "maximum gold for 55K14", "-d", bad.to_str().unwrap()]);
    assert_eq!(exit_code(&out), Some(3));
}

#[test]
fn invalid_config_is_config_error() {
    let fx = Fixture::new();
    let config = fx.path("bad.toml");
    std::fs::write(&config, "[anomaly]\npercentile = 150.0\n").unwrap();
    let out = fx.run(&["ask", "maximum gold for 55K14", "-d", &fx.data(), "-c", config.to_str().unwrap()]);
    assert_eq!(exit_code(&out), Some(4));
}

#[test]
fn settings_supply_default_dataset() {
    let fx = Fixture::new();
    let settings_dir = fx.path("xdg").join("geochem");
    std::fs::create_dir_all(&settings_dir).unwrap();
    let settings = serde_json::json!({ "data.path": fx.data() });
    std::fs::write(settings_dir.join("settings.json"), settings.to_string()).unwrap();

    let val = assert_single_json(&fx.run(&["ask", "maximum zinc for 55K14"]));
    assert!(val["result"]["content"].as_str().unwrap().contains("190.0"));
    assert!(Path::new(&fx.data()).exists());
}
