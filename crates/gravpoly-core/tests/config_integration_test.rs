//! Integration tests for layered configuration
//!
//! These tests verify that configuration loading follows the correct precedence:
//! CLI arguments > Environment variables > Config file > Defaults

use gravpoly_core::config::{CliConfigOverrides, ConfigSource, LayeredConfig};
use gravpoly_core::models::MutationStrategy;
use serial_test::serial;
use std::env;
use std::fs;
use std::io::Write;
use std::time::Duration;
use tempfile::{NamedTempFile, TempDir};

const ENV_VARS: &[&str] = &[
    "GRAVPOLY_DENSITY",
    "GRAVPOLY_MAX_DEPTH",
    "GRAVPOLY_N_VERTICES",
    "GRAVPOLY_GRID_POINTS",
    "GRAVPOLY_SMOOTHING",
    "GRAVPOLY_POPULATION_SIZE",
    "GRAVPOLY_MAX_GENERATIONS",
    "GRAVPOLY_TOLERANCE",
    "GRAVPOLY_STRATEGY",
    "GRAVPOLY_SEED",
    "GRAVPOLY_TIME_LIMIT",
];

fn clear_env() {
    for name in ENV_VARS {
        env::remove_var(name);
    }
}

#[test]
fn test_default_configuration() {
    let config = LayeredConfig::with_defaults();

    assert_eq!(config.density.value, 450.0);
    assert_eq!(config.density.source, ConfigSource::Default);
    assert_eq!(config.max_depth.value, 20_000.0);
    assert_eq!(config.grid_points.value, 1000);
    assert_eq!(config.population_size.value, 15);
    assert_eq!(config.max_generations.value, 1000);
    assert_eq!(config.tolerance.value, 0.01);
    assert!(config.smoothing.value.is_none());
    assert!(config.time_limit().is_none());
}

#[test]
fn test_file_overrides_defaults() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
density = 2670.0
grid_points = 250
smoothing = 0.5
max_generations = 40
tolerance = 0.001
time_limit_secs = 30
"#
    )
    .unwrap();

    let config = LayeredConfig::with_defaults().load_from_file(file.path()).unwrap();

    assert_eq!(config.density.value, 2670.0);
    assert_eq!(config.density.source, ConfigSource::File);
    assert_eq!(config.grid_points.value, 250);
    assert_eq!(config.smoothing.value, Some(0.5));
    assert_eq!(config.max_generations.value, 40);
    assert_eq!(config.tolerance.value, 0.001);
    assert_eq!(config.time_limit(), Some(Duration::from_secs(30)));
    // Untouched keys keep their defaults
    assert_eq!(config.n_vertices.source, ConfigSource::Default);
}

#[test]
fn test_unknown_file_key_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("gravpoly.toml");
    fs::write(&path, "densty = 300.0\n").unwrap();

    let err = LayeredConfig::with_defaults().load_from_file(&path).unwrap_err();
    assert!(err.is_configuration());
}

#[test]
fn test_missing_file_is_configuration_error() {
    let dir = TempDir::new().unwrap();
    let err = LayeredConfig::with_defaults()
        .load_from_file(dir.path().join("absent.toml"))
        .unwrap_err();
    assert!(err.is_configuration());
}

#[test]
#[serial]
fn test_environment_overrides_file() {
    clear_env();
    env::set_var("GRAVPOLY_DENSITY", "800");
    env::set_var("GRAVPOLY_N_VERTICES", "5");
    env::set_var("GRAVPOLY_STRATEGY", "rand1bin");
    env::set_var("GRAVPOLY_SEED", "7");

    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
density = 300.0
n_vertices = 4
max_depth = 4000.0
"#
    )
    .unwrap();

    let config = LayeredConfig::with_defaults()
        .load_from_file(file.path())
        .unwrap()
        .load_from_env();

    assert_eq!(config.density.value, 800.0);
    assert_eq!(config.density.source, ConfigSource::Environment);
    assert_eq!(config.n_vertices.value, 5);
    assert_eq!(config.strategy.value, MutationStrategy::Rand1Bin);
    assert_eq!(config.seed.value, Some(7));
    // File value survives where no env var is set
    assert_eq!(config.max_depth.value, 4000.0);
    assert_eq!(config.max_depth.source, ConfigSource::File);

    clear_env();
}

#[test]
#[serial]
fn test_invalid_environment_values_are_ignored() {
    clear_env();
    env::set_var("GRAVPOLY_DENSITY", "heavy");
    env::set_var("GRAVPOLY_STRATEGY", "simplex");
    env::set_var("GRAVPOLY_TIME_LIMIT", "-3");

    let config = LayeredConfig::with_defaults().load_from_env();

    assert_eq!(config.density.value, 450.0);
    assert_eq!(config.density.source, ConfigSource::Default);
    assert_eq!(config.strategy.value, MutationStrategy::Best1Bin);
    assert!(config.time_limit_secs.value.is_none());

    clear_env();
}

#[test]
#[serial]
fn test_cli_overrides_all() {
    clear_env();
    env::set_var("GRAVPOLY_DENSITY", "800");
    env::set_var("GRAVPOLY_MAX_GENERATIONS", "50");

    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "density = 300.0\nmax_generations = 20\n").unwrap();

    let mut config = LayeredConfig::with_defaults()
        .load_from_file(file.path())
        .unwrap()
        .load_from_env();

    config.update_from_cli(CliConfigOverrides {
        density: Some(1000.0),
        seed: Some(99),
        ..Default::default()
    });

    assert_eq!(config.density.value, 1000.0);
    assert_eq!(config.density.source, ConfigSource::Cli);
    assert_eq!(config.seed.value, Some(99));
    assert_eq!(config.max_generations.value, 50);
    assert_eq!(config.max_generations.source, ConfigSource::Environment);
    assert!(config.validate().is_ok());

    clear_env();
}

#[test]
fn test_inspection_map_reports_sources() {
    let mut config = LayeredConfig::with_defaults();
    config.update_from_cli(CliConfigOverrides {
        smoothing: Some(0.0),
        time_limit_secs: Some(60),
        ..Default::default()
    });

    let map = config.to_inspection_map();
    assert_eq!(map.len(), 11);
    assert_eq!(map["smoothing"], ("0".to_string(), ConfigSource::Cli));
    assert_eq!(map["time_limit_secs"], ("60".to_string(), ConfigSource::Cli));
    assert_eq!(map["max_depth"], ("20000 m".to_string(), ConfigSource::Default));
}
