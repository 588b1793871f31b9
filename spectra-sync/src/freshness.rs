//! Freshness check: compare each species' last-modified date on its node
//! with the date the catalogue last checked it.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDateTime, Utc};
use rusqlite::Connection;
use spectra_catalog::*;
use spectra_db::{delete_species_record, update_species_status};
use spectra_node::{Gateway, NodeError, NodeRegistry};

use crate::error::SyncError;
use crate::progress::SyncProgress;
use crate::update::{SyncOptions, SyncReport};

/// Parse a stored check date (`YYYY-MM-DD HH:MM:SS`, UTC).
pub fn parse_checked_at(raw: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(raw.trim(), "%Y-%m-%d %H:%M:%S")
        .ok()
        .map(|naive| naive.and_utc())
}

/// The event a node's last-modified date means for one record.
pub fn freshness_event(checked_at: Option<&str>, remote: Option<DateTime<Utc>>) -> StatusEvent {
    let Some(remote) = remote else {
        return StatusEvent::RemoteUnchanged;
    };
    match checked_at.and_then(parse_checked_at) {
        Some(checked) if checked >= remote => StatusEvent::RemoteUnchanged,
        _ => StatusEvent::RemoteNewer,
    }
}

/// Check every species against its node and move records whose node has
/// newer data to `Update Available`. Species the node no longer offers are
/// marked `Outdated`, or deleted when `delete_archived` is set.
pub fn check_freshness(
    conn: &Connection,
    gateway: &dyn Gateway,
    registry: &dyn NodeRegistry,
    options: &SyncOptions,
    progress: &dyn SyncProgress,
    report: &mut SyncReport,
) -> Result<(), SyncError> {
    let mut groups: BTreeMap<String, Vec<SpeciesRecord>> = BTreeMap::new();
    for record in spectra_db::all_species(conn)? {
        if options.selects(&record.key.species_id) {
            groups
                .entry(record.key.species_id.clone())
                .or_default()
                .push(record);
        }
    }
    groups.retain(|_, records| records.iter().any(|r| r.status != Status::Keep));

    progress.on_phase(&format!("Checking {} species for updates", groups.len()));
    let total = groups.len();

    for (i, (species_id, records)) in groups.into_iter().enumerate() {
        progress.on_species(i + 1, total, &species_id);
        if let Err(e) = check_species(conn, gateway, registry, options, &species_id, &records, report) {
            log::error!("{species_id}: freshness check failed: {e}");
            report.fail(&species_id, &e);
        }
    }

    progress.on_complete(&format!(
        "{} records have updates available",
        report.marked_available
    ));
    Ok(())
}

fn check_species(
    conn: &Connection,
    gateway: &dyn Gateway,
    registry: &dyn NodeRegistry,
    options: &SyncOptions,
    species_id: &str,
    records: &[SpeciesRecord],
    report: &mut SyncReport,
) -> Result<(), SyncError> {
    let resource = records
        .iter()
        .find_map(|r| r.resource_id.as_deref())
        .unwrap_or_default();
    let Some(node) = registry.find(resource) else {
        log::warn!("{species_id}: no node registered for '{resource}', not checked");
        return Ok(());
    };

    let remote = match gateway.fetch_last_modified(node, numeric_species_id(species_id)) {
        Ok(date) => date,
        Err(NodeError::NoContent { .. }) => {
            return archive(conn, species_id, records, options.delete_archived, report);
        }
        Err(e) => {
            log::warn!("{species_id}: freshness check skipped: {e}");
            return Ok(());
        }
    };
    report.species_checked += 1;

    let tx = conn.unchecked_transaction()?;
    let mut available = 0;
    for record in records {
        let event = freshness_event(record.checked_at.as_deref(), remote);
        let status = record.status.apply(event)?;
        if status != record.status {
            log::debug!("{}: {} -> {}", record.name, record.status, status);
            update_species_status(&tx, record.id, status)?;
            if status == Status::UpdateAvailable {
                available += 1;
            }
        }
    }
    tx.commit()?;
    report.marked_available += available;
    Ok(())
}

/// Handle a species its node no longer offers: delete its records, or mark
/// them `Outdated`. Records under `Keep` are left alone.
pub(crate) fn archive(
    conn: &Connection,
    species_id: &str,
    records: &[SpeciesRecord],
    delete: bool,
    report: &mut SyncReport,
) -> Result<(), SyncError> {
    let tx = conn.unchecked_transaction()?;
    let (mut deleted, mut outdated) = (0, 0);
    for record in records.iter().filter(|r| r.status != Status::Keep) {
        if delete {
            log::info!("{species_id}: deleting archived record {}", record.name);
            delete_species_record(&tx, record.id)?;
            deleted += 1;
            continue;
        }
        let status = record.status.apply(StatusEvent::RemoteArchived)?;
        if status != record.status {
            log::info!("{species_id}: {} is no longer offered by its node", record.name);
            update_species_status(&tx, record.id, status)?;
            outdated += 1;
        }
    }
    tx.commit()?;
    report.records_deleted += deleted;
    report.marked_outdated += outdated;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn newer_remote_date() {
        let remote = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        assert_eq!(
            freshness_event(Some("2024-02-01 00:00:00"), Some(remote)),
            StatusEvent::RemoteNewer
        );
        assert_eq!(
            freshness_event(Some("2024-03-02 00:00:00"), Some(remote)),
            StatusEvent::RemoteUnchanged
        );
    }

    #[test]
    fn never_checked_is_newer() {
        let remote = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        assert_eq!(freshness_event(None, Some(remote)), StatusEvent::RemoteNewer);
        assert_eq!(freshness_event(None, None), StatusEvent::RemoteUnchanged);
    }

    #[test]
    fn checked_at_format() {
        let parsed = parse_checked_at("2023-11-05 08:30:00").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2023, 11, 5, 8, 30, 0).unwrap());
        assert!(parse_checked_at("yesterday").is_none());
    }
}
