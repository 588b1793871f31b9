//! Synchronisation progress reporting.

/// Trait for receiving synchronisation progress updates.
pub trait SyncProgress {
    /// Called before each species is processed.
    fn on_species(&self, current: usize, total: usize, species_id: &str);

    /// Called when a phase starts (e.g., "Checking CDMS for new species").
    fn on_phase(&self, message: &str);

    /// Called when a phase is complete.
    fn on_complete(&self, message: &str);
}

/// A no-op progress reporter that discards all updates.
pub struct SilentProgress;

impl SyncProgress for SilentProgress {
    fn on_species(&self, _current: usize, _total: usize, _species_id: &str) {}
    fn on_phase(&self, _message: &str) {}
    fn on_complete(&self, _message: &str) {}
}

/// A progress reporter that logs to the `log` crate.
pub struct LogProgress;

impl SyncProgress for LogProgress {
    fn on_species(&self, current: usize, total: usize, species_id: &str) {
        log::info!("  [{}/{}] {}", current, total, species_id);
    }

    fn on_phase(&self, message: &str) {
        log::info!("{}", message);
    }

    fn on_complete(&self, message: &str) {
        log::info!("{}", message);
    }
}
