//! Inversion driver
//!
//! Resamples the profile onto the observation grid, runs differential
//! evolution over the vertex coordinates and packages the best body found.
//! Running out of generations or time, or being cancelled, still returns the
//! best-so-far result, tagged with the reason the run stopped.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use gravpoly_core::config::LayeredConfig;
use gravpoly_core::error::{GravpolyError, Result};
use gravpoly_core::models::{
    ObservationGrid, OptimizationResult, Profile, SearchBounds, Termination, VertexSet,
    MIN_VERTICES,
};
use gravpoly_model::ProfileResampler;

use crate::evolution::{DifferentialEvolution, EvolutionConfig};
use crate::misfit::MisfitObjective;

/// Cancellation flag shared between the engine and any other thread
#[derive(Debug, Clone, Default)]
pub struct StopSignal {
    flag: Arc<AtomicBool>,
}

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the running inversion to return its best-so-far result
    pub fn stop(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    pub fn reset(&self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

/// Current phase of an inversion run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InversionPhase {
    Resampling,
    Initializing,
    Evolving,
    Finished,
}

/// Progress information for an inversion run
#[derive(Debug, Clone, PartialEq)]
pub struct InversionProgress {
    pub phase: InversionPhase,
    pub generation: usize,
    pub max_generations: usize,
    pub best_cost: f64,
    /// Standard deviation of the population's costs
    pub spread: f64,
    pub evaluations: usize,
}

/// Everything an inversion run needs besides its inputs
#[derive(Debug, Clone, PartialEq, Default)]
pub struct InversionSettings {
    pub evolution: EvolutionConfig,
    /// Target residual sum of squares for the profile spline
    pub smoothing: Option<f64>,
    pub time_limit: Option<Duration>,
}

impl InversionSettings {
    pub fn from_config(config: &LayeredConfig) -> Self {
        Self {
            evolution: EvolutionConfig {
                population_size: config.population_size.value,
                max_generations: config.max_generations.value,
                tolerance: config.tolerance.value,
                strategy: config.strategy.value,
                seed: config.seed.value,
                ..EvolutionConfig::default()
            },
            smoothing: config.smoothing.value,
            time_limit: config.time_limit(),
        }
    }
}

/// Runs polygon shape inversions
#[derive(Debug, Clone, Default)]
pub struct InversionEngine {
    settings: InversionSettings,
    stop: StopSignal,
}

impl InversionEngine {
    pub fn new(settings: InversionSettings) -> Self {
        Self { settings, stop: StopSignal::new() }
    }

    pub fn from_config(config: &LayeredConfig) -> Self {
        Self::new(InversionSettings::from_config(config))
    }

    /// Use an externally owned stop signal
    pub fn with_stop_signal(mut self, stop: StopSignal) -> Self {
        self.stop = stop;
        self
    }

    /// Handle that cancels runs of this engine
    pub fn stop_signal(&self) -> StopSignal {
        self.stop.clone()
    }

    pub fn settings(&self) -> &InversionSettings {
        &self.settings
    }

    /// Invert `profile` for an `n_vertices` polygon within `bounds`
    pub fn invert(
        &self,
        grid: &ObservationGrid,
        profile: &Profile,
        bounds: &SearchBounds,
        n_vertices: usize,
        density: f64,
    ) -> Result<OptimizationResult> {
        self.invert_with_progress(grid, profile, bounds, n_vertices, density, |_| {})
    }

    /// Invert with progress reporting after every generation
    pub fn invert_with_progress<F>(
        &self,
        grid: &ObservationGrid,
        profile: &Profile,
        bounds: &SearchBounds,
        n_vertices: usize,
        density: f64,
        mut progress: F,
    ) -> Result<OptimizationResult>
    where
        F: FnMut(&InversionProgress),
    {
        validate_request(bounds, n_vertices, density)?;
        self.settings.evolution.validate()?;

        let started = Instant::now();
        let max_generations = self.settings.evolution.max_generations;
        let report = |phase, generation, best_cost, spread, evaluations| InversionProgress {
            phase,
            generation,
            max_generations,
            best_cost,
            spread,
            evaluations,
        };

        progress(&report(InversionPhase::Resampling, 0, f64::INFINITY, f64::NAN, 0));
        let resampler = ProfileResampler::new(self.settings.smoothing);
        let objective = MisfitObjective::from_profile(profile, grid.clone(), density, &resampler)?;

        progress(&report(InversionPhase::Initializing, 0, f64::INFINITY, f64::NAN, 0));
        let mut de = DifferentialEvolution::new(&objective, bounds, self.settings.evolution.clone())?;

        tracing::info!(
            n_vertices,
            density,
            grid_points = grid.len(),
            population = de.population_size(),
            max_generations,
            "Starting inversion"
        );

        let termination = loop {
            if self.stop.is_stopped() {
                break Termination::Cancelled;
            }
            if self.settings.time_limit.is_some_and(|limit| started.elapsed() >= limit) {
                break Termination::TimeLimit;
            }
            if de.generation() >= max_generations {
                break Termination::MaxGenerations;
            }

            let stats = de.step();
            progress(&report(
                InversionPhase::Evolving,
                stats.generation,
                stats.best_cost,
                stats.spread,
                stats.evaluations,
            ));

            if de.converged() {
                break Termination::Converged;
            }
        };

        let vertices = VertexSet::from_flat(de.best());
        let (polygon, modeled) = objective.model(&vertices);
        let result = OptimizationResult {
            vertices,
            polygon,
            grid: grid.clone(),
            modeled,
            observed: objective.observed().to_vec(),
            misfit: de.best_cost(),
            generations: de.generation(),
            evaluations: de.evaluations(),
            termination,
        };

        progress(&report(
            InversionPhase::Finished,
            result.generations,
            result.misfit,
            de.spread(),
            result.evaluations,
        ));

        tracing::info!(
            termination = termination.as_str(),
            generations = result.generations,
            evaluations = result.evaluations,
            misfit = result.misfit,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Inversion finished"
        );

        Ok(result)
    }

    /// Invert with the grid and bounds derived from the profile and config:
    /// `grid_points` uniform points over the profile, x limited to the
    /// profile, z from the surface to `max_depth`
    pub fn invert_profile<F>(
        &self,
        profile: &Profile,
        config: &LayeredConfig,
        progress: F,
    ) -> Result<OptimizationResult>
    where
        F: FnMut(&InversionProgress),
    {
        config.validate()?;
        let grid = default_grid(profile, config.grid_points.value)?;
        let n_vertices = config.n_vertices.value;
        let bounds = SearchBounds::for_profile(profile, n_vertices, config.max_depth.value)?;
        self.invert_with_progress(&grid, profile, &bounds, n_vertices, config.density.value, progress)
    }
}

/// `points` evenly spaced grid points spanning the profile
pub fn default_grid(profile: &Profile, points: usize) -> Result<ObservationGrid> {
    let (start, end) = profile.span();
    ObservationGrid::linspace(start, end, points)
}

fn validate_request(bounds: &SearchBounds, n_vertices: usize, density: f64) -> Result<()> {
    if n_vertices < MIN_VERTICES {
        return Err(GravpolyError::TooFewVertices { found: n_vertices });
    }
    if bounds.n_vertices() != n_vertices {
        return Err(GravpolyError::BoundsLengthMismatch {
            expected: 2 * n_vertices,
            found: bounds.dimensions(),
        });
    }
    if !density.is_finite() || density <= 0.0 {
        return Err(GravpolyError::InvalidDensity { value: density });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use gravpoly_model::{build_polygon, gravity};

    fn synthetic() -> (ObservationGrid, Profile) {
        let truth = VertexSet::from_pairs(&[(2000.0, 0.0), (6000.0, 0.0), (4000.0, 3000.0)]);
        let grid = ObservationGrid::linspace(0.0, 10_000.0, 41).unwrap();
        let gz = gravity(&grid, &build_polygon(&truth), 450.0);
        let pairs: Vec<(f64, f64)> = grid.iter().map(|x| x / 1000.0).zip(gz).collect();
        (grid, Profile::from_km_mgal(&pairs).unwrap())
    }

    fn bounds() -> SearchBounds {
        SearchBounds::uniform(3, (0.0, 10_000.0), (0.0, 3000.0)).unwrap()
    }

    fn settings(max_generations: usize) -> InversionSettings {
        InversionSettings {
            evolution: EvolutionConfig {
                max_generations,
                seed: Some(1),
                ..EvolutionConfig::default()
            },
            smoothing: Some(0.0),
            time_limit: None,
        }
    }

    #[test]
    fn test_rejects_bad_requests_before_running() {
        let (grid, profile) = synthetic();
        let engine = InversionEngine::new(settings(5));

        let err = engine.invert(&grid, &profile, &bounds(), 2, 450.0).unwrap_err();
        assert!(matches!(err, GravpolyError::TooFewVertices { found: 2 }));

        let err = engine.invert(&grid, &profile, &bounds(), 4, 450.0).unwrap_err();
        assert!(matches!(err, GravpolyError::BoundsLengthMismatch { expected: 8, found: 6 }));

        let err = engine.invert(&grid, &profile, &bounds(), 3, -450.0).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_generation_budget_returns_best_so_far() {
        let (grid, profile) = synthetic();
        let engine = InversionEngine::new(settings(3));

        let result = engine.invert(&grid, &profile, &bounds(), 3, 450.0).unwrap();
        assert_eq!(result.termination, Termination::MaxGenerations);
        assert_eq!(result.generations, 3);
        assert_eq!(result.evaluations, 90 * 4);
        assert_eq!(result.vertices.len(), 3);
        assert_eq!(result.polygon.ring().len(), 4);
        assert_eq!(result.modeled.len(), grid.len());
        assert!(result.misfit.is_finite());
    }

    #[test]
    fn test_stop_signal_cancels() {
        let (grid, profile) = synthetic();
        let engine = InversionEngine::new(settings(1000));
        let stop = engine.stop_signal();
        stop.stop();

        let result = engine.invert(&grid, &profile, &bounds(), 3, 450.0).unwrap();
        assert_eq!(result.termination, Termination::Cancelled);
        assert_eq!(result.generations, 0);

        stop.reset();
        assert!(!engine.stop_signal().is_stopped());
    }

    #[test]
    fn test_cancel_from_progress_callback() {
        let (grid, profile) = synthetic();
        let engine = InversionEngine::new(settings(1000));
        let stop = engine.stop_signal();

        let result = engine
            .invert_with_progress(&grid, &profile, &bounds(), 3, 450.0, |p| {
                if p.generation >= 2 {
                    stop.stop();
                }
            })
            .unwrap();
        assert_eq!(result.termination, Termination::Cancelled);
        assert_eq!(result.generations, 2);
    }

    #[test]
    fn test_time_limit() {
        let (grid, profile) = synthetic();
        let mut settings = settings(1000);
        settings.time_limit = Some(Duration::ZERO);
        let engine = InversionEngine::new(settings);

        let result = engine.invert(&grid, &profile, &bounds(), 3, 450.0).unwrap();
        assert_eq!(result.termination, Termination::TimeLimit);
    }

    #[test]
    fn test_progress_phases_in_order() {
        let (grid, profile) = synthetic();
        let engine = InversionEngine::new(settings(4));
        let mut phases = Vec::new();
        let mut generations = Vec::new();

        engine
            .invert_with_progress(&grid, &profile, &bounds(), 3, 450.0, |p| {
                phases.push(p.phase);
                generations.push(p.generation);
            })
            .unwrap();

        assert_eq!(phases.first(), Some(&InversionPhase::Resampling));
        assert_eq!(phases[1], InversionPhase::Initializing);
        assert_eq!(phases.last(), Some(&InversionPhase::Finished));
        assert_eq!(&generations[2..6], &[1, 2, 3, 4]);
    }

    #[test]
    fn test_settings_from_config() {
        let mut config = LayeredConfig::with_defaults();
        config.update_from_cli(gravpoly_core::config::CliConfigOverrides {
            max_generations: Some(25),
            seed: Some(8),
            time_limit_secs: Some(3),
            ..Default::default()
        });

        let settings = InversionSettings::from_config(&config);
        assert_eq!(settings.evolution.max_generations, 25);
        assert_eq!(settings.evolution.seed, Some(8));
        assert_eq!(settings.evolution.population_size, 15);
        assert_eq!(settings.time_limit, Some(Duration::from_secs(3)));
        assert!(settings.smoothing.is_none());
    }

    #[test]
    fn test_default_grid_spans_profile() {
        let (_, profile) = synthetic();
        let grid = default_grid(&profile, 1000).unwrap();
        assert_eq!(grid.len(), 1000);
        assert_eq!(grid.span(), profile.span());
    }
}
