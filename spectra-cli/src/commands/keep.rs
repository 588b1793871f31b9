use std::path::PathBuf;

use spectra_catalog::Status;

use crate::CliError;

use super::{load_settings, open_existing};

/// Set or clear the `Keep` override on one record.
///
/// Clearing moves the record to `Update Available` so the next update
/// re-imports it.
pub(crate) fn run_keep(db: Option<PathBuf>, id: i64, keep: bool) -> Result<(), CliError> {
    let (_, db_path) = load_settings(db)?;
    let Some(conn) = open_existing(&db_path)? else {
        return Ok(());
    };

    let record = spectra_db::get_species(&conn, id)
        .map_err(|e| CliError::database(e.to_string()))?
        .ok_or_else(|| CliError::usage(format!("No record with id {id}")))?;

    let next = match (keep, record.status) {
        (true, Status::Keep) | (false, Status::UpdateAvailable) => {
            log::info!("{} is already '{}'", record.name, record.status);
            return Ok(());
        }
        (true, _) => Status::Keep,
        (false, Status::Keep) => Status::UpdateAvailable,
        (false, other) => {
            log::info!("{} is not kept (status '{other}')", record.name);
            return Ok(());
        }
    };

    spectra_db::update_species_status(&conn, id, next)
        .map_err(|e| CliError::database(e.to_string()))?;
    log::info!("{}: '{}' -> '{}'", record.name, record.status, next);
    Ok(())
}
