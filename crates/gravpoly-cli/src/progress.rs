use gravpoly_core::models::OptimizationResult;
use gravpoly_inversion::{InversionPhase, InversionProgress};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::time::Duration;

/// Create a spinner for indeterminate progress
pub fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.blue} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Create a progress bar for determinate progress
pub fn create_progress_bar(total: u64, message: &str) -> ProgressBar {
    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{msg}\n[{bar:40.cyan/blue}] {pos}/{len} ({percent}%) ETA: {eta}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓▒░ "),
    );
    pb.set_message(message.to_string());
    pb
}

/// Finish a progress bar with success message
pub fn finish_success(pb: &ProgressBar, message: &str) {
    pb.finish_with_message(format!("✓ {}", message));
}

/// Finish a progress bar with warning message
pub fn finish_warning(pb: &ProgressBar, message: &str) {
    pb.finish_with_message(format!("⚠ {}", message));
}

/// Progress display for an inversion run, driven by engine events
pub struct InversionProgressBar {
    setup: ProgressBar,
    generations: ProgressBar,
    visible: bool,
}

impl InversionProgressBar {
    pub fn new(max_generations: usize) -> Self {
        let setup = create_spinner("Resampling profile...");
        // Drawn once the population is evaluated, below the finished spinner
        let generations = create_progress_bar(max_generations as u64, "Evolving population");
        generations.set_draw_target(ProgressDrawTarget::hidden());
        Self { setup, generations, visible: true }
    }

    /// Draws nothing; used for JSON output and `--no-progress`
    pub fn hidden() -> Self {
        Self { setup: ProgressBar::hidden(), generations: ProgressBar::hidden(), visible: false }
    }

    pub fn update(&self, progress: &InversionProgress) {
        match progress.phase {
            InversionPhase::Resampling => self.setup.set_message("Resampling profile..."),
            InversionPhase::Initializing => self.setup.set_message("Initialising population..."),
            InversionPhase::Evolving => {
                if !self.setup.is_finished() {
                    finish_success(
                        &self.setup,
                        &format!("Initial population evaluated ({} models)", progress.evaluations),
                    );
                    if self.visible {
                        self.generations.set_draw_target(ProgressDrawTarget::stderr());
                    }
                }
                self.generations.set_position(progress.generation as u64);
                self.generations.set_message(format!(
                    "Evolving population (best misfit {:.4} mGal, spread {:.3e})",
                    progress.best_cost, progress.spread
                ));
            }
            InversionPhase::Finished => {}
        }
    }

    pub fn finish(&self, result: &OptimizationResult) {
        if !self.setup.is_finished() {
            self.setup.finish_and_clear();
        }
        let message = format!(
            "{} after {} generations (misfit {:.4} mGal)",
            result.termination.as_str(),
            result.generations,
            result.misfit
        );
        if result.converged() {
            finish_success(&self.generations, &message);
        } else {
            finish_warning(&self.generations, &message);
        }
    }
}
