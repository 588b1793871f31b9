//! SQLite persistence layer for the spectroscopic catalogue.
//!
//! Provides schema creation, CRUD operations, and query APIs
//! backed by SQLite (via rusqlite with bundled feature).

pub mod operations;
pub mod queries;
pub mod schema;

pub use operations::{
    assign_partition_function, copy_partition_function, delete_species, delete_species_record,
    delete_transitions_for, insert_species, insert_transition, mark_species_finished,
    rekey_species, update_species_status, write_partition_function, OperationError,
};
pub use queries::{
    all_species, catalog_stats, count_transitions, distinct_resource_ids, find_species_by_key,
    get_species, partition_function, species_by_status, species_exists, species_for_species_id,
    transitions_for, transitions_in_range, CatalogStats, LineRow,
};
pub use rusqlite::Connection;
pub use schema::{open_database, open_memory};
