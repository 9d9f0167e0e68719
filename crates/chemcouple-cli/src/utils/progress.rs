use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::time::Duration;

const SPINNER_TICK_MS: u64 = 80;

/// Progress display for a coupled run: the initial calculation followed by `total_steps` steps.
pub struct StepProgress {
    pb: ProgressBar,
}

impl StepProgress {
    pub fn new(total_steps: u64) -> Self {
        let pb = ProgressBar::with_draw_target(Some(total_steps), ProgressDrawTarget::stderr())
            .with_style(Self::spinner_style());
        Self { pb }
    }

    /// A progress bar that never draws, for quiet runs.
    pub fn hidden(total_steps: u64) -> Self {
        Self {
            pb: ProgressBar::with_draw_target(Some(total_steps), ProgressDrawTarget::hidden()),
        }
    }

    pub fn start_initial_calculation(&self) {
        self.pb.set_message("Initial calculation");
        self.pb
            .enable_steady_tick(Duration::from_millis(SPINNER_TICK_MS));
    }

    pub fn start_stepping(&self) {
        self.pb.disable_steady_tick();
        self.pb.set_style(Self::bar_style());
        self.pb.set_position(0);
        self.pb.set_message("Time stepping");
    }

    pub fn step_done(&self) {
        self.pb.inc(1);
    }

    pub fn position(&self) -> u64 {
        self.pb.position()
    }

    pub fn finish(&self) {
        self.pb.disable_steady_tick();
        self.pb.finish_with_message("Done");
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::with_template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }

    fn bar_style() -> ProgressStyle {
        ProgressStyle::with_template("{msg:<20} [{bar:40.cyan/blue}] {pos}/{len} ({elapsed})")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("##-")
    }
}
