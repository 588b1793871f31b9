//! SQLite schema creation and versioning.

use rusqlite::Connection;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Catalogue schema version {found} is newer than supported version {expected}")]
    VersionMismatch { expected: i32, found: i32 },
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Current schema version. Increment when adding migrations.
pub const CURRENT_VERSION: i32 = 1;

/// Create all tables and indexes if they don't exist.
///
/// Idempotent, so safe to call on an existing database.
pub fn create_schema(conn: &Connection) -> Result<(), SchemaError> {
    conn.execute_batch(SCHEMA_SQL)?;
    if get_schema_version(conn)? == 0 {
        set_schema_version(conn, CURRENT_VERSION)?;
    }
    Ok(())
}

/// Open or create a catalogue database at the given path.
pub fn open_database(path: &std::path::Path) -> Result<Connection, SchemaError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let conn = Connection::open(path)?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;

    let version = get_schema_version(&conn)?;
    if version == 0 {
        create_schema(&conn)?;
    } else if version > CURRENT_VERSION {
        return Err(SchemaError::VersionMismatch {
            expected: CURRENT_VERSION,
            found: version,
        });
    }

    Ok(conn)
}

/// Open an in-memory database with the full schema. Useful for testing.
pub fn open_memory() -> Result<Connection, SchemaError> {
    let conn = Connection::open_in_memory()?;
    conn.execute_batch("PRAGMA foreign_keys=ON;")?;
    create_schema(&conn)?;
    Ok(conn)
}

/// Get the current schema version, or 0 if no schema exists.
pub fn get_schema_version(conn: &Connection) -> Result<i32, SchemaError> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version')",
        [],
        |row| row.get(0),
    )?;

    if !exists {
        return Ok(0);
    }

    let version: i32 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |row| row.get(0),
    )?;
    Ok(version)
}

fn set_schema_version(conn: &Connection, version: i32) -> Result<(), SchemaError> {
    conn.execute(
        "INSERT INTO schema_version (version) VALUES (?1)",
        [version],
    )?;
    Ok(())
}

const SCHEMA_SQL: &str = r#"
-- Schema version tracking
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER NOT NULL,
    applied_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- One row per distinct physical sub-state of a species
CREATE TABLE IF NOT EXISTS species (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    species_id TEXT NOT NULL,
    vamdc_species_id TEXT,
    stoichiometric_formula TEXT,
    ordinary_structural_formula TEXT,
    chemical_name TEXT,
    nuclear_spin_isomer TEXT,
    vib_state TEXT,
    hfs TEXT,
    elec_state TEXT,
    comment TEXT,
    resource_id TEXT,
    url TEXT,
    recommendation BOOLEAN NOT NULL DEFAULT 0,
    query_uuid TEXT,
    status TEXT NOT NULL DEFAULT 'New',
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    checked_at TEXT
);
CREATE INDEX IF NOT EXISTS idx_species_name ON species(name);
CREATE INDEX IF NOT EXISTS idx_species_identity
    ON species(species_id, nuclear_spin_isomer, vib_state, hfs, elec_state);
CREATE INDEX IF NOT EXISTS idx_species_status ON species(status);
CREATE INDEX IF NOT EXISTS idx_species_vamdc ON species(vamdc_species_id);

-- Partition function values on the fixed temperature grid
CREATE TABLE IF NOT EXISTS partition_functions (
    species_record_id INTEGER NOT NULL REFERENCES species(id) ON DELETE CASCADE,
    grid_index INTEGER NOT NULL,
    temperature REAL NOT NULL,
    value REAL NOT NULL,
    PRIMARY KEY (species_record_id, grid_index)
);

-- Radiative transitions
CREATE TABLE IF NOT EXISTS transitions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    species_record_id INTEGER NOT NULL REFERENCES species(id) ON DELETE CASCADE,
    name TEXT NOT NULL,
    frequency REAL NOT NULL,
    einstein_a REAL,
    uncertainty REAL NOT NULL,
    energy_lower REAL,
    upper_state_degeneracy INTEGER NOT NULL,
    hfs TEXT,
    upper_state_qn TEXT,
    lower_state_qn TEXT
);
CREATE INDEX IF NOT EXISTS idx_transitions_owner ON transitions(species_record_id);
CREATE INDEX IF NOT EXISTS idx_transitions_frequency ON transitions(frequency, energy_lower);
"#;
