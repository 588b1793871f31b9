//! CRUD operations for species records, transitions and partition functions.

use rusqlite::{params, Connection};
use spectra_catalog::*;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OperationError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Entity not found: {entity_type} with id '{id}'")]
    NotFound { entity_type: String, id: String },
}

impl OperationError {
    fn species_not_found(id: i64) -> Self {
        Self::NotFound {
            entity_type: "species".to_string(),
            id: id.to_string(),
        }
    }
}

// ── Species Operations ──────────────────────────────────────────────────────

/// Insert a species record. Returns the generated row id.
pub fn insert_species(conn: &Connection, species: &NewSpecies) -> Result<i64, OperationError> {
    conn.execute(
        "INSERT INTO species (name, species_id, vamdc_species_id, stoichiometric_formula,
             ordinary_structural_formula, chemical_name, nuclear_spin_isomer, vib_state, hfs,
             elec_state, comment, resource_id, url, recommendation, status)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
        params![
            species.name,
            species.key.species_id,
            species.vamdc_species_id,
            species.stoichiometric_formula,
            species.ordinary_structural_formula,
            species.chemical_name,
            species.key.nsi,
            species.key.vibstate,
            species.key.hfs,
            species.key.elecstate,
            species.comment,
            species.resource_id,
            species.url,
            species.recommendation,
            species.status.as_str(),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Move a record to a new identity key and name, keeping its row id.
///
/// The species id of a record never changes; only the sub-state dimensions
/// are rewritten.
pub fn rekey_species(
    conn: &Connection,
    id: i64,
    key: &SubStateKey,
    name: &str,
) -> Result<(), OperationError> {
    let changed = conn.execute(
        "UPDATE species SET name = ?2, nuclear_spin_isomer = ?3, vib_state = ?4, hfs = ?5,
             elec_state = ?6
         WHERE id = ?1",
        params![id, name, key.nsi, key.vibstate, key.hfs, key.elecstate],
    )?;
    if changed == 0 {
        return Err(OperationError::species_not_found(id));
    }
    Ok(())
}

/// Set the status of a single record.
pub fn update_species_status(
    conn: &Connection,
    id: i64,
    status: Status,
) -> Result<(), OperationError> {
    let changed = conn.execute(
        "UPDATE species SET status = ?2 WHERE id = ?1",
        params![id, status.as_str()],
    )?;
    if changed == 0 {
        return Err(OperationError::species_not_found(id));
    }
    Ok(())
}

/// Record the outcome of a synchronisation pass: final status, the query
/// UUID it was fetched with, and the check date.
pub fn mark_species_finished(
    conn: &Connection,
    id: i64,
    status: Status,
    query_uuid: Option<&str>,
) -> Result<(), OperationError> {
    let changed = conn.execute(
        "UPDATE species SET status = ?2, query_uuid = COALESCE(?3, query_uuid),
             checked_at = datetime('now')
         WHERE id = ?1",
        params![id, status.as_str(), query_uuid],
    )?;
    if changed == 0 {
        return Err(OperationError::species_not_found(id));
    }
    Ok(())
}

/// Delete one record. Its transitions and partition function go with it.
pub fn delete_species_record(conn: &Connection, id: i64) -> Result<(), OperationError> {
    conn.execute("DELETE FROM species WHERE id = ?1", params![id])?;
    Ok(())
}

/// Delete every record of a species together with all its transitions.
///
/// Returns the names of the deleted records.
pub fn delete_species(conn: &Connection, species_id: &str) -> Result<Vec<String>, OperationError> {
    let mut stmt = conn.prepare("SELECT name FROM species WHERE species_id = ?1 ORDER BY id")?;
    let names = stmt
        .query_map(params![species_id], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;
    conn.execute(
        "DELETE FROM species WHERE species_id = ?1",
        params![species_id],
    )?;
    Ok(names)
}

// ── Transition Operations ───────────────────────────────────────────────────

/// Insert a transition owned by `species_record_id`. Returns the generated ID.
pub fn insert_transition(
    conn: &Connection,
    species_record_id: i64,
    transition: &NewTransition,
) -> Result<i64, OperationError> {
    let mut stmt = conn.prepare_cached(
        "INSERT INTO transitions (species_record_id, name, frequency, einstein_a, uncertainty,
             energy_lower, upper_state_degeneracy, hfs, upper_state_qn, lower_state_qn)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
    )?;
    stmt.execute(params![
        species_record_id,
        transition.name,
        transition.frequency,
        transition.einstein_a,
        transition.uncertainty,
        transition.energy_lower,
        transition.upper_state_degeneracy,
        transition.hfs,
        transition.upper_state_quantum_numbers,
        transition.lower_state_quantum_numbers,
    ])?;
    Ok(conn.last_insert_rowid())
}

/// Delete all transitions of one record. Returns the number deleted.
pub fn delete_transitions_for(
    conn: &Connection,
    species_record_id: i64,
) -> Result<usize, OperationError> {
    let deleted = conn.execute(
        "DELETE FROM transitions WHERE species_record_id = ?1",
        params![species_record_id],
    )?;
    Ok(deleted)
}

// ── Partition Function Operations ───────────────────────────────────────────

/// Replace the stored partition function of one record.
pub fn write_partition_function(
    conn: &Connection,
    species_record_id: i64,
    pf: &PartitionFunction,
) -> Result<(), OperationError> {
    conn.execute(
        "DELETE FROM partition_functions WHERE species_record_id = ?1",
        params![species_record_id],
    )?;
    let mut stmt = conn.prepare_cached(
        "INSERT INTO partition_functions (species_record_id, grid_index, temperature, value)
         VALUES (?1, ?2, ?3, ?4)",
    )?;
    for (index, temperature, value) in pf.iter() {
        stmt.execute(params![species_record_id, index as i64, temperature, value])?;
    }
    Ok(())
}

/// Copy the partition function of `from` onto `to`, replacing what `to` had.
///
/// Returns the number of grid points copied.
pub fn copy_partition_function(conn: &Connection, from: i64, to: i64) -> Result<usize, OperationError> {
    conn.execute(
        "DELETE FROM partition_functions WHERE species_record_id = ?1",
        params![to],
    )?;
    let copied = conn.execute(
        "INSERT INTO partition_functions (species_record_id, grid_index, temperature, value)
         SELECT ?2, grid_index, temperature, value
         FROM partition_functions WHERE species_record_id = ?1",
        params![from, to],
    )?;
    Ok(copied)
}

/// Write grid values onto every record of a species with the given isomer
/// (`None` selects records without an isomer). Each record's grid is
/// replaced, so points missing from `pf` are cleared. Records under the
/// `Keep` override are skipped.
///
/// Returns the number of records touched.
pub fn assign_partition_function(
    conn: &Connection,
    species_id: &str,
    nsi: Option<&str>,
    pf: &PartitionFunction,
) -> Result<usize, OperationError> {
    let mut stmt = conn.prepare(
        "SELECT id FROM species
         WHERE species_id = ?1 AND nuclear_spin_isomer IS ?2 AND status <> ?3",
    )?;
    let ids = stmt
        .query_map(params![species_id, nsi, Status::Keep.as_str()], |row| {
            row.get::<_, i64>(0)
        })?
        .collect::<Result<Vec<_>, _>>()?;

    for &id in &ids {
        write_partition_function(conn, id, pf)?;
    }
    Ok(ids.len())
}
