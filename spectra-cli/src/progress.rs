//! Terminal progress display for synchronisation runs.

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use spectra_sync::SyncProgress;

/// A progress bar over the species of the current phase, with the phase
/// message shown as a spinner between phases.
pub(crate) struct BarProgress {
    bar: ProgressBar,
}

impl BarProgress {
    /// When `quiet` is true nothing is drawn.
    pub(crate) fn new(quiet: bool) -> Self {
        let bar = ProgressBar::new_spinner();
        if quiet {
            bar.set_draw_target(ProgressDrawTarget::hidden());
        }
        bar.set_style(spinner_style());
        Self { bar }
    }

    pub(crate) fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

fn spinner_style() -> ProgressStyle {
    ProgressStyle::with_template("  {spinner:.cyan} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_chars("/-\\|")
}

fn bar_style() -> ProgressStyle {
    ProgressStyle::with_template("  [{bar:30.cyan/blue}] {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=> ")
}

impl SyncProgress for BarProgress {
    fn on_species(&self, current: usize, total: usize, species_id: &str) {
        if current == 1 {
            self.bar.disable_steady_tick();
            self.bar.set_style(bar_style());
            self.bar.set_length(total as u64);
        }
        self.bar.set_position(current as u64);
        self.bar.set_message(species_id.to_string());
    }

    fn on_phase(&self, message: &str) {
        self.bar.set_style(spinner_style());
        self.bar.enable_steady_tick(std::time::Duration::from_millis(100));
        self.bar.set_message(message.to_string());
    }

    fn on_complete(&self, message: &str) {
        self.bar.disable_steady_tick();
        self.bar.set_message("");
        self.bar.suspend(|| log::info!("{message}"));
    }
}
