//! The synchronisation driver.
//!
//! One run checks freshness, updates eligible species and discovers species
//! the catalogue does not know yet. Each species is fetched, then imported
//! inside its own transaction; a failing species is marked `Update Failed`
//! and the run moves on. A species its node no longer offers is archived
//! like in the freshness check.

use std::collections::{BTreeMap, HashSet};

use rusqlite::Connection;
use spectra_catalog::*;
use spectra_db::{delete_species_record, delete_transitions_for, mark_species_finished, update_species_status};
use spectra_node::{Gateway, Node, NodeRegistry, QueryResult, SpeciesQuery};

use crate::discover::discover_species;
use crate::error::SyncError;
use crate::freshness::{archive, check_freshness};
use crate::metadata::SpeciesMetadata;
use crate::partition;
use crate::progress::SyncProgress;
use crate::resolve::IdentityTable;
use crate::transitions::{import_lines, plan_lines};

/// Options for a synchronisation run.
#[derive(Debug, Clone)]
pub struct SyncOptions {
    /// Update every non-`Keep` record, not only the eligible ones.
    pub force: bool,
    /// Restrict checks and updates to these species ids. Empty means all.
    pub species_ids: Vec<String>,
    /// Only discover new species.
    pub insert_only: bool,
    /// Skip discovery.
    pub update_only: bool,
    /// Ask the nodes for last-modified dates before updating.
    pub check_freshness: bool,
    /// Delete species the node no longer offers instead of marking them
    /// `Outdated`.
    pub delete_archived: bool,
    /// Nodes searched for new species besides those already in the catalogue.
    pub extra_nodes: Vec<Node>,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            force: false,
            species_ids: Vec::new(),
            insert_only: false,
            update_only: false,
            check_freshness: true,
            delete_archived: false,
            extra_nodes: Vec::new(),
        }
    }
}

impl SyncOptions {
    pub(crate) fn selects(&self, species_id: &str) -> bool {
        self.species_ids.is_empty() || self.species_ids.iter().any(|s| s == species_id)
    }
}

/// Counts from a synchronisation run.
#[derive(Debug, Default)]
pub struct SyncReport {
    pub species_checked: u64,
    pub marked_available: u64,
    pub marked_outdated: u64,
    pub records_deleted: u64,
    pub species_updated: u64,
    pub species_failed: u64,
    pub transitions_inserted: u64,
    pub lines_excluded: u64,
    pub records_promoted: u64,
    pub records_created: u64,
    pub records_reaped: u64,
    pub partition_functions: u64,
    pub species_discovered: u64,
    /// `(species id, error)` for every failed species.
    pub failures: Vec<(String, String)>,
}

impl SyncReport {
    pub(crate) fn fail(&mut self, species_id: &str, error: &SyncError) {
        self.species_failed += 1;
        self.failures.push((species_id.to_string(), error.to_string()));
    }
}

/// Run freshness check, update and discovery as selected by `options`.
pub fn run_sync(
    conn: &Connection,
    gateway: &dyn Gateway,
    registry: &dyn NodeRegistry,
    options: &SyncOptions,
    progress: &dyn SyncProgress,
) -> Result<SyncReport, SyncError> {
    let mut report = SyncReport::default();

    if !options.insert_only {
        if options.check_freshness {
            check_freshness(conn, gateway, registry, options, progress, &mut report)?;
        }
        update_species(conn, gateway, registry, options, progress, &mut report)?;
    }
    if !options.update_only {
        discover_species(conn, gateway, registry, options, progress, &mut report)?;
    }

    Ok(report)
}

/// Numeric species ids sort numerically, everything else after them.
fn species_order(species_id: &str) -> (u64, String) {
    let numeric = numeric_species_id(species_id).parse().unwrap_or(u64::MAX);
    (numeric, species_id.to_string())
}

/// Update every eligible species.
pub fn update_species(
    conn: &Connection,
    gateway: &dyn Gateway,
    registry: &dyn NodeRegistry,
    options: &SyncOptions,
    progress: &dyn SyncProgress,
    report: &mut SyncReport,
) -> Result<(), SyncError> {
    let statuses: Vec<Status> = if options.force {
        Status::ALL.into_iter().filter(|s| *s != Status::Keep).collect()
    } else {
        Status::ALL.into_iter().filter(Status::is_update_trigger).collect()
    };

    let mut groups: BTreeMap<(u64, String), Vec<SpeciesRecord>> = BTreeMap::new();
    for record in spectra_db::species_by_status(conn, &statuses)? {
        if options.selects(&record.key.species_id) {
            groups
                .entry(species_order(&record.key.species_id))
                .or_default()
                .push(record);
        }
    }

    progress.on_phase(&format!("Updating {} species", groups.len()));
    let total = groups.len();
    for (i, ((_, species_id), selected)) in groups.into_iter().enumerate() {
        progress.on_species(i + 1, total, &species_id);

        match sync_one(conn, gateway, registry, &species_id, &selected, options.force) {
            Ok(outcome) => {
                log::info!(
                    "{species_id}: {} transitions, {} promoted, {} created, {} reaped",
                    outcome.inserted,
                    outcome.promoted,
                    outcome.created,
                    outcome.reaped
                );
                report.species_updated += 1;
                report.transitions_inserted += outcome.inserted as u64;
                report.lines_excluded += outcome.excluded as u64;
                report.records_promoted += outcome.promoted as u64;
                report.records_created += outcome.created as u64;
                report.records_reaped += outcome.reaped as u64;
                report.partition_functions += outcome.partition_functions as u64;
            }
            Err(SyncError::NoRemoteContent { target }) => {
                log::warn!("{species_id}: node has no content for {target}, archiving");
                let archived = spectra_db::species_for_species_id(conn, &species_id)
                    .map_err(SyncError::from)
                    .and_then(|records| {
                        archive(conn, &species_id, &records, options.delete_archived, report)
                    });
                if let Err(e) = archived {
                    log::error!("{species_id}: could not archive: {e}");
                    report.fail(&species_id, &e);
                }
            }
            Err(e) => {
                log::error!("{species_id}: {e}");
                report.fail(&species_id, &e);
                if let Err(e) = mark_failed(conn, &species_id) {
                    log::error!("{species_id}: could not mark failed: {e}");
                }
            }
        }
    }

    progress.on_complete(&format!(
        "Updated {} species, {} failed",
        report.species_updated, report.species_failed
    ));
    Ok(())
}

/// What happened to one species.
#[derive(Debug, Default)]
struct SpeciesOutcome {
    inserted: usize,
    excluded: usize,
    promoted: usize,
    created: usize,
    reaped: usize,
    partition_functions: usize,
}

fn node_for<'a>(
    registry: &'a dyn NodeRegistry,
    records: &[SpeciesRecord],
) -> Result<&'a Node, SyncError> {
    let resource = records
        .iter()
        .find_map(|r| r.resource_id.as_deref())
        .unwrap_or_default();
    registry
        .find(resource)
        .ok_or_else(|| SyncError::UnknownNode(resource.to_string()))
}

/// Fetch a species by its node-local id, falling back to its cross-reference
/// id when that fails or comes back without the species.
pub fn fetch_species(
    gateway: &dyn Gateway,
    node: &Node,
    species_id: &str,
    vamdc_species_id: Option<&str>,
) -> Result<QueryResult, SyncError> {
    let primary = SpeciesQuery::by_species_id(species_id)
        .and_then(|query| gateway.fetch(node, &query))
        .map_err(SyncError::from);
    let primary_error = match primary {
        Ok(result) if result.contains_species(species_id) => return Ok(result),
        Ok(_) => SyncError::SpeciesNotReturned {
            target: species_id.to_string(),
        },
        Err(e) => e,
    };

    let Some(key) = vamdc_species_id else {
        return Err(primary_error);
    };
    log::info!("{species_id}: {primary_error}; retrying by species key {key}");

    let result = gateway.fetch(node, &SpeciesQuery::by_inchikey(key)?)?;
    if result.contains_species(species_id) {
        Ok(result)
    } else {
        Err(SyncError::SpeciesNotReturned {
            target: format!("{species_id} ({key})"),
        })
    }
}

fn sync_one(
    conn: &Connection,
    gateway: &dyn Gateway,
    registry: &dyn NodeRegistry,
    species_id: &str,
    selected: &[SpeciesRecord],
    force: bool,
) -> Result<SpeciesOutcome, SyncError> {
    let node = node_for(registry, selected)?;
    let vamdc_id = selected.iter().find_map(|r| r.vamdc_species_id.as_deref());
    let result = fetch_species(gateway, node, species_id, vamdc_id)?;
    let metadata = SpeciesMetadata::from_result(&result, species_id, node).ok_or_else(|| {
        SyncError::SpeciesNotReturned {
            target: species_id.to_string(),
        }
    })?;
    let selected_ids: HashSet<i64> = selected.iter().map(|r| r.id).collect();

    let mut tx = conn.unchecked_transaction()?;
    let mut table = IdentityTable::load(&tx, species_id)?;

    // ── Start the pass ──
    // Siblings of the selected records are refreshed with them.
    for record in table.records() {
        if record.status == Status::Keep {
            continue;
        }
        let forced = !selected_ids.contains(&record.id) || force;
        let status = record.status.apply(StatusEvent::PassStarted { forced })?;
        update_species_status(&tx, record.id, status)?;
        delete_transitions_for(&tx, record.id)?;
    }

    // ── Import ──
    let sp = tx.savepoint()?;
    let imported = plan_lines(&result, species_id).and_then(|lines| {
        let counts = import_lines(&sp, &mut table, &metadata, lines)?;
        let pf = partition::assign(&sp, &result, species_id)?;
        Ok((counts, pf))
    });
    let (counts, partition_functions) = match imported {
        Ok(imported) => {
            sp.commit()?;
            imported
        }
        Err(e) => {
            drop(sp);
            fail_updating(&tx, species_id)?;
            tx.commit()?;
            return Err(e);
        }
    };

    // ── Reap and finalise ──
    let mut outcome = SpeciesOutcome {
        inserted: counts.inserted,
        excluded: counts.excluded,
        promoted: counts.promoted,
        created: counts.created,
        partition_functions,
        ..Default::default()
    };
    let uuid = result.uuid();
    for record in spectra_db::species_for_species_id(&tx, species_id)? {
        if record.status != Status::Updating {
            continue;
        }
        if table.any_received() && !table.has_received(record.id) {
            log::debug!("Reaping record {} ({}) without transitions", record.id, record.name);
            delete_species_record(&tx, record.id)?;
            outcome.reaped += 1;
        } else {
            let status = record.status.apply(StatusEvent::PassSucceeded)?;
            mark_species_finished(&tx, record.id, status, uuid)?;
        }
    }

    tx.commit()?;
    Ok(outcome)
}

/// Move the species' `Updating` records to `Update Failed`.
fn fail_updating(conn: &Connection, species_id: &str) -> Result<(), SyncError> {
    for record in spectra_db::species_for_species_id(conn, species_id)? {
        if record.status == Status::Updating {
            let status = record.status.apply(StatusEvent::PassFailed)?;
            update_species_status(conn, record.id, status)?;
        }
    }
    Ok(())
}

/// Mark a species failed after its pass could not run. Transitions are left
/// as they are.
fn mark_failed(conn: &Connection, species_id: &str) -> Result<(), SyncError> {
    let tx = conn.unchecked_transaction()?;
    for record in spectra_db::species_for_species_id(&tx, species_id)? {
        if matches!(record.status, Status::Keep | Status::UpdateFailed) {
            continue;
        }
        let mut status = record.status;
        if status != Status::Updating {
            status = status.apply(StatusEvent::PassStarted { forced: true })?;
        }
        let status = status.apply(StatusEvent::PassFailed)?;
        update_species_status(&tx, record.id, status)?;
    }
    tx.commit()?;
    Ok(())
}
