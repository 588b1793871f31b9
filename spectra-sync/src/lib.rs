//! Catalogue synchronisation against remote data nodes.
//!
//! Drives the record lifecycle: freshness checks, per-species import with
//! progressive identity refinement, partition function assignment and
//! discovery of new species.

pub mod discover;
pub mod error;
pub mod freshness;
pub mod metadata;
pub mod partition;
pub mod progress;
pub mod resolve;
pub mod settings;
pub mod transitions;
pub mod update;

pub use discover::{discover_species, discovery_nodes};
pub use error::SyncError;
pub use freshness::{check_freshness, freshness_event, parse_checked_at};
pub use metadata::SpeciesMetadata;
pub use progress::{LogProgress, SilentProgress, SyncProgress};
pub use resolve::{IdentityTable, Resolution, Resolved};
pub use settings::{Settings, default_database_path, settings_path};
pub use transitions::{ImportCounts, PlannedLine, elec_label, import_lines, plan_lines, vib_label};
pub use update::{SyncOptions, SyncReport, fetch_species, run_sync, update_species};
