use crate::error::{GravpolyError, Result};
use crate::models::search::MutationStrategy;
use crate::models::vertex::MIN_VERTICES;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// Configuration source for tracking where values come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Default value
    Default,
    /// Loaded from config file
    File,
    /// Loaded from environment variable
    Environment,
    /// Provided via CLI argument
    Cli,
}

impl ConfigSource {
    /// Returns the precedence level (higher = higher priority)
    pub fn precedence(&self) -> u8 {
        match self {
            ConfigSource::Default => 0,
            ConfigSource::File => 1,
            ConfigSource::Environment => 2,
            ConfigSource::Cli => 3,
        }
    }
}

/// A configuration value with its source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }

    /// Update the value if the new source has higher precedence
    pub fn update(&mut self, value: T, source: ConfigSource) {
        if source.precedence() > self.source.precedence() {
            self.value = value;
            self.source = source;
        }
    }
}

/// Layered configuration for modelling and inversion runs
#[derive(Debug, Clone)]
pub struct LayeredConfig {
    /// Density contrast, kg/m³
    pub density: ConfigValue<f64>,
    /// Deepest allowed vertex, metres
    pub max_depth: ConfigValue<f64>,
    pub n_vertices: ConfigValue<usize>,
    /// Points in the inversion observation grid
    pub grid_points: ConfigValue<usize>,
    /// Target residual sum of squares for the profile spline; `None` uses
    /// the number of samples
    pub smoothing: ConfigValue<Option<f64>>,
    /// Population size as a multiple of the number of coordinates
    pub population_size: ConfigValue<usize>,
    pub max_generations: ConfigValue<usize>,
    /// Relative convergence tolerance on the population's cost spread
    pub tolerance: ConfigValue<f64>,
    pub strategy: ConfigValue<MutationStrategy>,
    pub seed: ConfigValue<Option<u64>>,
    pub time_limit_secs: ConfigValue<Option<u64>>,
}

impl LayeredConfig {
    /// Create a new configuration with default values
    pub fn with_defaults() -> Self {
        Self {
            density: ConfigValue::new(450.0, ConfigSource::Default),
            max_depth: ConfigValue::new(20_000.0, ConfigSource::Default),
            n_vertices: ConfigValue::new(3, ConfigSource::Default),
            grid_points: ConfigValue::new(1000, ConfigSource::Default),
            smoothing: ConfigValue::new(None, ConfigSource::Default),
            population_size: ConfigValue::new(15, ConfigSource::Default),
            max_generations: ConfigValue::new(1000, ConfigSource::Default),
            tolerance: ConfigValue::new(0.01, ConfigSource::Default),
            strategy: ConfigValue::new(MutationStrategy::Best1Bin, ConfigSource::Default),
            seed: ConfigValue::new(None, ConfigSource::Default),
            time_limit_secs: ConfigValue::new(None, ConfigSource::Default),
        }
    }

    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self> {
        let content =
            fs::read_to_string(path.as_ref()).map_err(|e| GravpolyError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to read config file: {}", e),
            })?;

        let file_config: FileConfig =
            toml::from_str(&content).map_err(|e| GravpolyError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to parse TOML: {}", e),
            })?;

        if let Some(density) = file_config.density {
            self.density.update(density, ConfigSource::File);
        }
        if let Some(max_depth) = file_config.max_depth {
            self.max_depth.update(max_depth, ConfigSource::File);
        }
        if let Some(n_vertices) = file_config.n_vertices {
            self.n_vertices.update(n_vertices, ConfigSource::File);
        }
        if let Some(grid_points) = file_config.grid_points {
            self.grid_points.update(grid_points, ConfigSource::File);
        }
        if let Some(smoothing) = file_config.smoothing {
            self.smoothing.update(Some(smoothing), ConfigSource::File);
        }
        if let Some(population_size) = file_config.population_size {
            self.population_size.update(population_size, ConfigSource::File);
        }
        if let Some(max_generations) = file_config.max_generations {
            self.max_generations.update(max_generations, ConfigSource::File);
        }
        if let Some(tolerance) = file_config.tolerance {
            self.tolerance.update(tolerance, ConfigSource::File);
        }
        if let Some(strategy) = file_config.strategy {
            self.strategy.update(parse_strategy(&strategy)?, ConfigSource::File);
        }
        if let Some(seed) = file_config.seed {
            self.seed.update(Some(seed), ConfigSource::File);
        }
        if let Some(time_limit_secs) = file_config.time_limit_secs {
            self.time_limit_secs.update(Some(time_limit_secs), ConfigSource::File);
        }

        Ok(self)
    }

    /// Load configuration from environment variables
    pub fn load_from_env(mut self) -> Self {
        if let Some(density) = env_parsed::<f64>("GRAVPOLY_DENSITY", "number in kg/m^3") {
            self.density.update(density, ConfigSource::Environment);
        }
        if let Some(max_depth) = env_parsed::<f64>("GRAVPOLY_MAX_DEPTH", "depth in metres") {
            self.max_depth.update(max_depth, ConfigSource::Environment);
        }
        if let Some(n) = env_parsed::<usize>("GRAVPOLY_N_VERTICES", "positive integer") {
            self.n_vertices.update(n, ConfigSource::Environment);
        }
        if let Some(n) = env_parsed::<usize>("GRAVPOLY_GRID_POINTS", "positive integer") {
            self.grid_points.update(n, ConfigSource::Environment);
        }
        if let Some(s) = env_parsed::<f64>("GRAVPOLY_SMOOTHING", "non-negative number") {
            self.smoothing.update(Some(s), ConfigSource::Environment);
        }
        if let Some(n) = env_parsed::<usize>("GRAVPOLY_POPULATION_SIZE", "positive integer") {
            self.population_size.update(n, ConfigSource::Environment);
        }
        if let Some(n) = env_parsed::<usize>("GRAVPOLY_MAX_GENERATIONS", "positive integer") {
            self.max_generations.update(n, ConfigSource::Environment);
        }
        if let Some(tol) = env_parsed::<f64>("GRAVPOLY_TOLERANCE", "non-negative number") {
            self.tolerance.update(tol, ConfigSource::Environment);
        }

        // GRAVPOLY_STRATEGY
        if let Ok(strategy_str) = env::var("GRAVPOLY_STRATEGY") {
            match parse_strategy(&strategy_str) {
                Ok(strategy) => self.strategy.update(strategy, ConfigSource::Environment),
                Err(_) => tracing::warn!(
                    "Invalid GRAVPOLY_STRATEGY value '{}': expected best1bin or rand1bin",
                    strategy_str
                ),
            }
        }

        if let Some(seed) = env_parsed::<u64>("GRAVPOLY_SEED", "unsigned integer") {
            self.seed.update(Some(seed), ConfigSource::Environment);
        }
        if let Some(secs) = env_parsed::<u64>("GRAVPOLY_TIME_LIMIT", "whole seconds") {
            self.time_limit_secs.update(Some(secs), ConfigSource::Environment);
        }

        self
    }

    /// Update configuration from CLI arguments
    pub fn update_from_cli(&mut self, overrides: CliConfigOverrides) {
        if let Some(density) = overrides.density {
            self.density.update(density, ConfigSource::Cli);
        }
        if let Some(max_depth) = overrides.max_depth {
            self.max_depth.update(max_depth, ConfigSource::Cli);
        }
        if let Some(n_vertices) = overrides.n_vertices {
            self.n_vertices.update(n_vertices, ConfigSource::Cli);
        }
        if let Some(grid_points) = overrides.grid_points {
            self.grid_points.update(grid_points, ConfigSource::Cli);
        }
        if let Some(smoothing) = overrides.smoothing {
            self.smoothing.update(Some(smoothing), ConfigSource::Cli);
        }
        if let Some(population_size) = overrides.population_size {
            self.population_size.update(population_size, ConfigSource::Cli);
        }
        if let Some(max_generations) = overrides.max_generations {
            self.max_generations.update(max_generations, ConfigSource::Cli);
        }
        if let Some(tolerance) = overrides.tolerance {
            self.tolerance.update(tolerance, ConfigSource::Cli);
        }
        if let Some(strategy) = overrides.strategy {
            self.strategy.update(strategy, ConfigSource::Cli);
        }
        if let Some(seed) = overrides.seed {
            self.seed.update(Some(seed), ConfigSource::Cli);
        }
        if let Some(time_limit_secs) = overrides.time_limit_secs {
            self.time_limit_secs.update(Some(time_limit_secs), ConfigSource::Cli);
        }
    }

    /// Reject configurations no run can start from
    pub fn validate(&self) -> Result<()> {
        let density = self.density.value;
        if !density.is_finite() || density <= 0.0 {
            return Err(GravpolyError::InvalidDensity { value: density });
        }

        if self.n_vertices.value < MIN_VERTICES {
            return Err(GravpolyError::TooFewVertices { found: self.n_vertices.value });
        }

        let max_depth = self.max_depth.value;
        if !max_depth.is_finite() || max_depth <= 0.0 {
            return Err(invalid("max_depth", format!("must be positive, got {}", max_depth)));
        }

        if self.grid_points.value < 2 {
            return Err(invalid(
                "grid_points",
                format!("at least 2 points are required, got {}", self.grid_points.value),
            ));
        }

        if let Some(s) = self.smoothing.value {
            if !s.is_finite() || s < 0.0 {
                return Err(invalid("smoothing", format!("must be non-negative, got {}", s)));
            }
        }

        if self.population_size.value == 0 {
            return Err(invalid("population_size", "must be at least 1".to_string()));
        }

        let tol = self.tolerance.value;
        if !tol.is_finite() || tol < 0.0 {
            return Err(invalid("tolerance", format!("must be non-negative, got {}", tol)));
        }

        Ok(())
    }

    pub fn time_limit(&self) -> Option<Duration> {
        self.time_limit_secs.value.map(Duration::from_secs)
    }

    /// Get all configuration values as a map for inspection
    pub fn to_inspection_map(&self) -> HashMap<String, (String, ConfigSource)> {
        let mut map = HashMap::new();

        map.insert(
            "density".to_string(),
            (format!("{} kg/m^3", self.density.value), self.density.source),
        );
        map.insert(
            "max_depth".to_string(),
            (format!("{} m", self.max_depth.value), self.max_depth.source),
        );
        map.insert(
            "n_vertices".to_string(),
            (self.n_vertices.value.to_string(), self.n_vertices.source),
        );
        map.insert(
            "grid_points".to_string(),
            (self.grid_points.value.to_string(), self.grid_points.source),
        );
        map.insert(
            "smoothing".to_string(),
            (
                self.smoothing
                    .value
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "sample count".to_string()),
                self.smoothing.source,
            ),
        );
        map.insert(
            "population_size".to_string(),
            (self.population_size.value.to_string(), self.population_size.source),
        );
        map.insert(
            "max_generations".to_string(),
            (self.max_generations.value.to_string(), self.max_generations.source),
        );
        map.insert(
            "tolerance".to_string(),
            (self.tolerance.value.to_string(), self.tolerance.source),
        );
        map.insert(
            "strategy".to_string(),
            (self.strategy.value.as_str().to_string(), self.strategy.source),
        );
        map.insert(
            "seed".to_string(),
            (
                self.seed.value.map(|s| s.to_string()).unwrap_or_else(|| "random".to_string()),
                self.seed.source,
            ),
        );
        map.insert(
            "time_limit_secs".to_string(),
            (
                self.time_limit_secs
                    .value
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "none".to_string()),
                self.time_limit_secs.source,
            ),
        );

        map
    }
}

/// Configuration loaded from TOML file
#[derive(Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    density: Option<f64>,
    max_depth: Option<f64>,
    n_vertices: Option<usize>,
    grid_points: Option<usize>,
    smoothing: Option<f64>,
    population_size: Option<usize>,
    max_generations: Option<usize>,
    tolerance: Option<f64>,
    strategy: Option<String>,
    seed: Option<u64>,
    time_limit_secs: Option<u64>,
}

/// CLI configuration overrides
#[derive(Debug, Default)]
pub struct CliConfigOverrides {
    pub density: Option<f64>,
    pub max_depth: Option<f64>,
    pub n_vertices: Option<usize>,
    pub grid_points: Option<usize>,
    pub smoothing: Option<f64>,
    pub population_size: Option<usize>,
    pub max_generations: Option<usize>,
    pub tolerance: Option<f64>,
    pub strategy: Option<MutationStrategy>,
    pub seed: Option<u64>,
    pub time_limit_secs: Option<u64>,
}

/// Parse mutation strategy from string
pub fn parse_strategy(s: &str) -> Result<MutationStrategy> {
    match s.to_lowercase().as_str() {
        "best1bin" | "best" => Ok(MutationStrategy::Best1Bin),
        "rand1bin" | "rand" => Ok(MutationStrategy::Rand1Bin),
        _ => Err(GravpolyError::ConfigInvalid {
            key: "strategy".to_string(),
            reason: format!("Invalid strategy: {}. Use best1bin or rand1bin", s),
        }),
    }
}

fn invalid(key: &str, reason: String) -> GravpolyError {
    GravpolyError::ConfigInvalid { key: key.to_string(), reason }
}

/// Read and parse an environment variable, warning on malformed values
fn env_parsed<T: FromStr>(name: &str, expected: &str) -> Option<T> {
    let raw = env::var(name).ok()?;
    match raw.trim().parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!("Invalid {} value '{}': expected {}", name, raw, expected);
            None
        }
    }
}
