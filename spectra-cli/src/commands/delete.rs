use std::path::PathBuf;

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use crate::CliError;

use super::{load_settings, open_existing};

/// Delete every record of a species together with its transitions.
pub(crate) fn run_delete(db: Option<PathBuf>, species_id: &str, confirm: bool) -> Result<(), CliError> {
    let (_, db_path) = load_settings(db)?;
    let Some(conn) = open_existing(&db_path)? else {
        return Ok(());
    };

    let records = spectra_db::species_for_species_id(&conn, species_id)
        .map_err(|e| CliError::database(e.to_string()))?;
    if records.is_empty() {
        log::info!("No records for species {species_id}.");
        return Ok(());
    }

    if !confirm {
        log::warn!("This will permanently delete {} records:", records.len());
        for r in &records {
            log::info!("  {:>6}  {}", r.id, r.name);
        }
        log::info!("Re-run with --confirm to proceed:");
        log::info!("  spectra delete {species_id} --confirm");
        return Ok(());
    }

    let names = spectra_db::delete_species(&conn, species_id)
        .map_err(|e| CliError::database(e.to_string()))?;
    log::info!(
        "{}",
        format!("Deleted {} records of {species_id}.", names.len())
            .if_supports_color(Stdout, |t| t.bold()),
    );
    for name in names {
        log::debug!("deleted {name}");
    }
    Ok(())
}
