use std::path::PathBuf;

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use crate::CliError;

use super::load_settings;

/// Create the catalogue database, or confirm that an existing one is usable.
pub(crate) fn run_init(db: Option<PathBuf>) -> Result<(), CliError> {
    let (_, db_path) = load_settings(db)?;
    let existed = db_path.exists();

    let conn = spectra_db::open_database(&db_path)
        .map_err(|e| CliError::database(format!("Failed to create catalogue database: {e}")))?;
    let version = spectra_db::schema::get_schema_version(&conn)
        .map_err(|e| CliError::database(e.to_string()))?;

    if existed {
        log::info!("Catalogue already exists at {}", db_path.display());
    } else {
        log::info!(
            "{}",
            "Catalogue database created.".if_supports_color(Stdout, |t| t.bold()),
        );
        log::info!("  Path: {}", db_path.display());
    }
    log::info!("  Schema version: {version}");
    crate::log_blank();
    log::info!("Run 'spectra discover --nodes CDMS' to add species.");
    Ok(())
}
