//! Integration tests for the gravpoly binary
//!
//! Every command is run with `--json` and its stdout parsed, inside a scratch
//! directory so no stray `gravpoly.toml` or `GRAVPOLY_*` variable leaks in.

use gravpoly_core::models::{ObservationGrid, VertexSet};
use gravpoly_model::{build_polygon, gravity};
use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

fn gravpoly(dir: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_gravpoly"));
    cmd.current_dir(dir);
    for (key, _) in std::env::vars() {
        if key.starts_with("GRAVPOLY_") {
            cmd.env_remove(key);
        }
    }
    cmd
}

fn run_json(cmd: &mut Command) -> serde_json::Value {
    let output = cmd.output().expect("Failed to execute command");
    assert_success(&output);
    let stdout = String::from_utf8_lossy(&output.stdout);
    let parsed: serde_json::Value =
        serde_json::from_str(&stdout).expect("Output should be valid JSON");
    assert_eq!(parsed["status"], "success");
    parsed["data"].clone()
}

fn assert_success(output: &Output) {
    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
}

/// Forward-modelled triangle written as a km / mGal profile
fn write_synthetic_profile(dir: &Path) -> std::path::PathBuf {
    let truth = VertexSet::from_pairs(&[(2000.0, 0.0), (6000.0, 0.0), (4000.0, 3000.0)]);
    let grid = ObservationGrid::linspace(0.0, 10_000.0, 41).unwrap();
    let gz = gravity(&grid, &build_polygon(&truth), 450.0);

    let mut content = String::from("# distance_km,gravity_mgal\n");
    for (x, g) in grid.iter().zip(&gz) {
        content.push_str(&format!("{},{}\n", x / 1000.0, g));
    }
    let path = dir.join("synthetic.csv");
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_forward_json_output() {
    let dir = TempDir::new().unwrap();
    let data = run_json(gravpoly(dir.path()).args([
        "forward", "--vertex", "2000,0", "--vertex", "6000,0", "--vertex", "4000,3000",
        "--density", "450", "--json",
    ]));

    // Display grid: 100 points per vertex over [-1000, 9000] m
    let grid = data["grid"].as_array().unwrap();
    let gz = data["gravity"].as_array().unwrap();
    assert_eq!(grid.len(), 300);
    assert_eq!(gz.len(), 300);
    assert!((grid[0].as_f64().unwrap() + 1000.0).abs() < 1e-9);
    assert!((grid[299].as_f64().unwrap() - 9000.0).abs() < 1e-9);

    let peak = data["peak"]["gravity"].as_f64().unwrap();
    assert!(peak > 23.0 && peak < 24.5, "peak {}", peak);
    assert!(data["signed_area"].as_f64().unwrap() > 0.0);
    assert_eq!(data["simple"], true);
    assert!(data["comparison"].is_null());
}

#[test]
fn test_forward_against_own_profile() {
    let dir = TempDir::new().unwrap();
    let profile = write_synthetic_profile(dir.path());

    // Interpolating spline on the sample positions reproduces the samples
    let data = run_json(gravpoly(dir.path()).env("GRAVPOLY_SMOOTHING", "0").args([
        "forward", "--vertex", "4000,3000", "--vertex", "2000,0", "--vertex", "6000,0",
        "--profile", profile.to_str().unwrap(), "--points", "41", "--json",
    ]));

    assert_eq!(data["grid"].as_array().unwrap().len(), 41);
    assert_eq!(data["comparison"]["profile_name"], "synthetic");
    let rms = data["comparison"]["rms_residual"].as_f64().unwrap();
    assert!(rms < 1e-6, "rms {}", rms);
}

#[test]
fn test_forward_rejects_two_vertices() {
    let dir = TempDir::new().unwrap();
    let output = gravpoly(dir.path())
        .args(["forward", "--vertex", "0,0", "--vertex", "10,10", "--json"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("error"));
}

#[test]
fn test_forward_rejects_vertex_above_surface() {
    let dir = TempDir::new().unwrap();
    let output = gravpoly(dir.path())
        .args(["forward", "--vertex", "2000,0", "--vertex", "6000,-300", "--vertex", "4000,3000"])
        .args(["--json"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("above the observation surface"));
}

#[test]
fn test_resample_interpolates_with_zero_smoothing() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("field.csv");
    fs::write(&path, "distance,gravity\n0,1.0\n2.5,4.0\n5,6.0\n7.5,3.0\n10,2.0\n").unwrap();

    let data = run_json(gravpoly(dir.path()).args([
        "resample", path.to_str().unwrap(), "--points", "5", "--smoothing", "0", "--json",
    ]));

    assert_eq!(data["samples"], 5);
    assert_eq!(data["profile_name"], "field");
    let gz: Vec<f64> =
        data["gravity"].as_array().unwrap().iter().map(|v| v.as_f64().unwrap()).collect();
    for (got, want) in gz.iter().zip([1.0, 4.0, 6.0, 3.0, 2.0]) {
        assert!((got - want).abs() < 1e-9, "{} vs {}", got, want);
    }
}

#[test]
fn test_resample_rejects_short_profile() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("short.csv");
    fs::write(&path, "0,1\n1,2\n2,3\n").unwrap();

    let output =
        gravpoly(dir.path()).args(["resample", path.to_str().unwrap(), "--json"]).output().unwrap();
    assert!(!output.status.success());
}

#[test]
fn test_invert_then_inspect() {
    let dir = TempDir::new().unwrap();
    let profile = write_synthetic_profile(dir.path());
    let model = dir.path().join("model.json");

    let data = run_json(gravpoly(dir.path()).args([
        "invert",
        profile.to_str().unwrap(),
        "--grid-points",
        "50",
        "--max-depth",
        "3000",
        "--max-generations",
        "5",
        "--seed",
        "1",
        "--output",
        model.to_str().unwrap(),
        "--json",
    ]));

    assert!(data["generations"].as_u64().unwrap() <= 5);
    assert_eq!(data["vertices"].as_array().unwrap().len(), 3);
    assert!(data["misfit"].as_f64().unwrap().is_finite());
    assert!(model.exists());

    let inspected =
        run_json(gravpoly(dir.path()).args(["inspect", model.to_str().unwrap(), "--json"]));
    assert_eq!(inspected["version"], 1);
    assert_eq!(inspected["grid_points"], 50);
    assert_eq!(inspected["profile_name"], "synthetic");
    assert_eq!(inspected["misfit"], data["misfit"]);
    assert_eq!(inspected["vertices"], data["vertices"]);
}

#[test]
fn test_config_reports_sources() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("gravpoly.toml"), "density = 300.0\nn_vertices = 4\n").unwrap();

    let data = run_json(
        gravpoly(dir.path())
            .env("GRAVPOLY_SEED", "9")
            .args(["config", "--max-generations", "7", "--json"]),
    );

    let values = data["values"].as_array().unwrap();
    assert_eq!(values.len(), 11);
    let source = |key: &str| {
        values.iter().find(|v| v["key"] == key).map(|v| v["source"].clone()).unwrap()
    };
    assert_eq!(source("density"), "File");
    assert_eq!(source("n_vertices"), "File");
    assert_eq!(source("seed"), "Environment");
    assert_eq!(source("max_generations"), "Cli");
    assert_eq!(source("tolerance"), "Default");
}

#[test]
fn test_explicit_missing_config_fails() {
    let dir = TempDir::new().unwrap();
    let output = gravpoly(dir.path())
        .args(["--config", "missing.toml", "config", "--json"])
        .output()
        .unwrap();
    assert!(!output.status.success());
}
