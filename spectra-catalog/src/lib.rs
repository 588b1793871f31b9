//! Spectroscopic catalogue data model types.
//!
//! This crate defines the persistent data model for the species/transition
//! catalogue without any database or network dependencies: the composite
//! sub-state identity key, the record lifecycle status machine, the fixed
//! partition-function temperature grid, and the naming conventions used for
//! species and transitions. `spectra-db` persists these types and
//! `spectra-sync` drives them.

pub mod grid;
pub mod key;
pub mod naming;
pub mod status;
pub mod types;

pub use grid::{PartitionFunction, TEMPERATURES, grid_index};
pub use key::{PromotionRank, SubStateKey};
pub use naming::{atom_name, compose_name, name_for_key, numeric_species_id, state_segment};
pub use status::{Status, StatusError, StatusEvent};
pub use types::*;
