use std::path::PathBuf;

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;
use spectra_catalog::{SpeciesRecord, Status};

use crate::CliError;

use super::{load_settings, open_existing, truncate_str};

/// List species records, optionally filtered by species id and status.
pub(crate) fn run_list(
    db: Option<PathBuf>,
    species: Option<String>,
    status: Option<String>,
    json: bool,
) -> Result<(), CliError> {
    let (_, db_path) = load_settings(db)?;
    let Some(conn) = open_existing(&db_path)? else {
        return Ok(());
    };

    let status = status.map(|s| parse_status(&s)).transpose()?;
    let records = match (&species, status) {
        (Some(species_id), _) => spectra_db::species_for_species_id(&conn, species_id),
        (None, Some(status)) => spectra_db::species_by_status(&conn, &[status]),
        (None, None) => spectra_db::all_species(&conn),
    }
    .map_err(|e| CliError::database(e.to_string()))?;
    let records: Vec<SpeciesRecord> = records
        .into_iter()
        .filter(|r| status.is_none_or(|s| r.status == s))
        .collect();

    if json {
        let rows: Vec<serde_json::Value> = records.iter().map(record_json).collect();
        let text = serde_json::to_string_pretty(&rows).map_err(|e| CliError::usage(e.to_string()))?;
        println!("{text}");
        return Ok(());
    }

    if records.is_empty() {
        log::info!("No matching records.");
        return Ok(());
    }

    log::info!(
        "{}",
        format!(
            "{:>6}  {:<12}  {:<32}  {:<16}  {}",
            "ID", "Species", "Name", "Status", "Checked"
        )
        .if_supports_color(Stdout, |t| t.bold())
    );
    for r in &records {
        let status = format!("{:<16}", r.status.as_str());
        let status = match r.status {
            Status::UpToDate => status.if_supports_color(Stdout, |t| t.green()).to_string(),
            Status::UpdateFailed => status.if_supports_color(Stdout, |t| t.red()).to_string(),
            Status::Keep => status.if_supports_color(Stdout, |t| t.cyan()).to_string(),
            Status::Outdated => status.if_supports_color(Stdout, |t| t.dimmed()).to_string(),
            _ => status.if_supports_color(Stdout, |t| t.yellow()).to_string(),
        };
        log::info!(
            "{:>6}  {:<12}  {:<32}  {}  {}",
            r.id,
            truncate_str(&r.key.species_id, 12),
            truncate_str(&r.name, 32),
            status,
            r.checked_at.as_deref().unwrap_or("-"),
        );
    }
    crate::log_blank();
    log::info!("{} records", records.len());
    Ok(())
}

fn parse_status(s: &str) -> Result<Status, CliError> {
    let wanted = s.trim().to_lowercase().replace(['-', '_'], " ");
    Status::ALL
        .into_iter()
        .find(|st| st.as_str().to_lowercase().replace('-', " ") == wanted)
        .ok_or_else(|| {
            let known: Vec<&str> = Status::ALL.iter().map(Status::as_str).collect();
            CliError::usage(format!("Unknown status '{s}' (expected one of: {})", known.join(", ")))
        })
}

fn record_json(r: &SpeciesRecord) -> serde_json::Value {
    serde_json::json!({
        "id": r.id,
        "name": r.name,
        "species_id": r.key.species_id,
        "nuclear_spin_isomer": r.key.nsi,
        "vib_state": r.key.vibstate,
        "hfs": r.key.hfs,
        "elec_state": r.key.elecstate,
        "vamdc_species_id": r.vamdc_species_id,
        "resource_id": r.resource_id,
        "url": r.url,
        "query_uuid": r.query_uuid,
        "status": r.status.as_str(),
        "created_at": r.created_at,
        "checked_at": r.checked_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_names_are_forgiving() {
        assert_eq!(parse_status("up-to-date").unwrap(), Status::UpToDate);
        assert_eq!(parse_status("Update Failed").unwrap(), Status::UpdateFailed);
        assert_eq!(parse_status("update_available").unwrap(), Status::UpdateAvailable);
        assert!(parse_status("stale").is_err());
    }
}
