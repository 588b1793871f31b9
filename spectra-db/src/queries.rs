//! Read queries for the catalogue database.
//!
//! Provides lookup by row id and identity key, listing by species and
//! status, partition functions, transitions and summary statistics.

use rusqlite::{params, Connection, OptionalExtension};
use spectra_catalog::*;

use crate::operations::OperationError;

/// `SELECT` over the species columns in the order `row_to_species` expects,
/// followed by the given SQL tail.
macro_rules! species_query {
    ($tail:literal) => {
        concat!(
            "SELECT id, name, species_id, nuclear_spin_isomer, vib_state, hfs, elec_state,
                    vamdc_species_id, stoichiometric_formula, ordinary_structural_formula,
                    chemical_name, comment, resource_id, url, recommendation, query_uuid,
                    status, created_at, checked_at
             FROM species ",
            $tail
        )
    };
}

// ── Species Lookups ─────────────────────────────────────────────────────────

/// Get a species record by row id.
pub fn get_species(conn: &Connection, id: i64) -> Result<Option<SpeciesRecord>, OperationError> {
    let record = conn
        .query_row(species_query!("WHERE id = ?1"), params![id], row_to_species)
        .optional()?;
    Ok(record)
}

/// Find the record with exactly this identity key. Absent dimensions only
/// match NULL columns. When several rows share the key the lowest id wins.
pub fn find_species_by_key(
    conn: &Connection,
    key: &SubStateKey,
) -> Result<Option<SpeciesRecord>, OperationError> {
    match conn.query_row(
        species_query!(
            "WHERE species_id = ?1 AND nuclear_spin_isomer IS ?2 AND vib_state IS ?3
               AND hfs IS ?4 AND elec_state IS ?5
             ORDER BY id LIMIT 1"
        ),
        params![key.species_id, key.nsi, key.vibstate, key.hfs, key.elecstate],
        row_to_species,
    ) {
        Ok(record) => Ok(Some(record)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// All records of one species, in insertion order.
pub fn species_for_species_id(
    conn: &Connection,
    species_id: &str,
) -> Result<Vec<SpeciesRecord>, OperationError> {
    let mut stmt = conn.prepare(species_query!("WHERE species_id = ?1 ORDER BY id"))?;
    let rows = stmt.query_map(params![species_id], row_to_species)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

/// All records whose status is one of `statuses`, ordered by species id
/// then row id.
pub fn species_by_status(
    conn: &Connection,
    statuses: &[Status],
) -> Result<Vec<SpeciesRecord>, OperationError> {
    let mut stmt = conn.prepare(species_query!("WHERE status = ?1 ORDER BY species_id, id"))?;
    let mut out = Vec::new();
    for status in statuses {
        let rows = stmt.query_map(params![status.as_str()], row_to_species)?;
        for row in rows {
            out.push(row?);
        }
    }
    out.sort_by(|a, b| (&a.key.species_id, a.id).cmp(&(&b.key.species_id, b.id)));
    Ok(out)
}

/// Every record in the catalogue, ordered by name.
pub fn all_species(conn: &Connection) -> Result<Vec<SpeciesRecord>, OperationError> {
    let mut stmt = conn.prepare(species_query!("ORDER BY name, id"))?;
    let rows = stmt.query_map([], row_to_species)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

/// Node identifiers that at least one record was imported from.
pub fn distinct_resource_ids(conn: &Connection) -> Result<Vec<String>, OperationError> {
    let mut stmt = conn.prepare(
        "SELECT DISTINCT resource_id FROM species
         WHERE resource_id IS NOT NULL ORDER BY resource_id",
    )?;
    let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

/// Whether any record of the species exists.
pub fn species_exists(conn: &Connection, species_id: &str) -> Result<bool, OperationError> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM species WHERE species_id = ?1)",
        params![species_id],
        |row| row.get(0),
    )?;
    Ok(exists)
}

// ── Partition Functions ─────────────────────────────────────────────────────

/// The stored partition function of a record. Grid points without a value
/// are empty.
pub fn partition_function(
    conn: &Connection,
    species_record_id: i64,
) -> Result<PartitionFunction, OperationError> {
    let mut stmt = conn.prepare(
        "SELECT grid_index, value FROM partition_functions
         WHERE species_record_id = ?1 ORDER BY grid_index",
    )?;
    let rows = stmt.query_map(params![species_record_id], |row| {
        Ok((row.get::<_, i64>(0)?, row.get::<_, f64>(1)?))
    })?;
    let mut pf = PartitionFunction::new();
    for row in rows {
        let (index, value) = row?;
        pf.set(index as usize, value);
    }
    Ok(pf)
}

// ── Transitions ─────────────────────────────────────────────────────────────

/// All transitions of one record, ordered by frequency.
pub fn transitions_for(
    conn: &Connection,
    species_record_id: i64,
) -> Result<Vec<TransitionRecord>, OperationError> {
    let mut stmt = conn.prepare(
        "SELECT id, species_record_id, name, frequency, einstein_a, uncertainty,
                energy_lower, upper_state_degeneracy, hfs, upper_state_qn, lower_state_qn
         FROM transitions WHERE species_record_id = ?1 ORDER BY frequency, id",
    )?;
    let rows = stmt.query_map(params![species_record_id], row_to_transition)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

/// Number of transitions owned by one record.
pub fn count_transitions(conn: &Connection, species_record_id: i64) -> Result<i64, OperationError> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM transitions WHERE species_record_id = ?1",
        params![species_record_id],
        |row| row.get(0),
    )?;
    Ok(count)
}

/// Transitions with `fmin <= frequency <= fmax` (MHz), joined with the
/// owning record's name.
pub fn transitions_in_range(
    conn: &Connection,
    fmin: f64,
    fmax: f64,
    limit: u32,
) -> Result<Vec<LineRow>, OperationError> {
    let mut stmt = conn.prepare(
        "SELECT s.name, t.name, t.frequency, t.uncertainty, t.einstein_a, t.energy_lower,
                t.upper_state_degeneracy
         FROM transitions t JOIN species s ON s.id = t.species_record_id
         WHERE t.frequency BETWEEN ?1 AND ?2
         ORDER BY t.frequency, t.id
         LIMIT ?3",
    )?;
    let rows = stmt.query_map(params![fmin, fmax, limit], |row| {
        Ok(LineRow {
            species_name: row.get(0)?,
            name: row.get(1)?,
            frequency: row.get(2)?,
            uncertainty: row.get(3)?,
            einstein_a: row.get(4)?,
            energy_lower: row.get(5)?,
            upper_state_degeneracy: row.get(6)?,
        })
    })?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

/// A transition joined with its species record name.
#[derive(Debug)]
pub struct LineRow {
    pub species_name: String,
    pub name: String,
    pub frequency: f64,
    pub uncertainty: f64,
    pub einstein_a: Option<f64>,
    pub energy_lower: Option<f64>,
    pub upper_state_degeneracy: i64,
}

// ── Statistics ──────────────────────────────────────────────────────────────

/// Get overall catalogue statistics.
pub fn catalog_stats(conn: &Connection) -> Result<CatalogStats, OperationError> {
    let records: i64 = conn.query_row("SELECT COUNT(*) FROM species", [], |r| r.get(0))?;
    let species: i64 = conn.query_row(
        "SELECT COUNT(DISTINCT species_id) FROM species",
        [],
        |r| r.get(0),
    )?;
    let transitions: i64 = conn.query_row("SELECT COUNT(*) FROM transitions", [], |r| r.get(0))?;
    let with_partition_function: i64 = conn.query_row(
        "SELECT COUNT(DISTINCT species_record_id) FROM partition_functions",
        [],
        |r| r.get(0),
    )?;

    let mut stmt = conn.prepare("SELECT COUNT(*) FROM species WHERE status = ?1")?;
    let mut by_status = Vec::with_capacity(Status::ALL.len());
    for status in Status::ALL {
        let count: i64 = stmt.query_row(params![status.as_str()], |r| r.get(0))?;
        if count > 0 {
            by_status.push((status, count));
        }
    }

    Ok(CatalogStats {
        records,
        species,
        transitions,
        with_partition_function,
        by_status,
    })
}

/// Summary statistics for the catalogue.
#[derive(Debug)]
pub struct CatalogStats {
    pub records: i64,
    pub species: i64,
    pub transitions: i64,
    pub with_partition_function: i64,
    /// Record count per status, omitting statuses with no records.
    pub by_status: Vec<(Status, i64)>,
}

// ── Row Mapping Helpers ─────────────────────────────────────────────────────

fn row_to_species(row: &rusqlite::Row<'_>) -> rusqlite::Result<SpeciesRecord> {
    let status_str: String = row.get(16)?;
    Ok(SpeciesRecord {
        id: row.get(0)?,
        name: row.get(1)?,
        key: SubStateKey::new(
            row.get::<_, String>(2)?,
            row.get(3)?,
            row.get(4)?,
            row.get(5)?,
            row.get(6)?,
        ),
        vamdc_species_id: row.get(7)?,
        stoichiometric_formula: row.get(8)?,
        ordinary_structural_formula: row.get(9)?,
        chemical_name: row.get(10)?,
        comment: row.get(11)?,
        resource_id: row.get(12)?,
        url: row.get(13)?,
        recommendation: row.get(14)?,
        query_uuid: row.get(15)?,
        status: Status::from_str_loose(&status_str),
        created_at: row.get(17)?,
        checked_at: row.get(18)?,
    })
}

fn row_to_transition(row: &rusqlite::Row<'_>) -> rusqlite::Result<TransitionRecord> {
    Ok(TransitionRecord {
        id: row.get(0)?,
        species_record_id: row.get(1)?,
        name: row.get(2)?,
        frequency: row.get(3)?,
        einstein_a: row.get(4)?,
        uncertainty: row.get(5)?,
        energy_lower: row.get(6)?,
        upper_state_degeneracy: row.get(7)?,
        hfs: row.get(8)?,
        upper_state_quantum_numbers: row.get(9)?,
        lower_state_quantum_numbers: row.get(10)?,
    })
}
