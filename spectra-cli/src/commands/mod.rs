pub(crate) mod config;
pub(crate) mod delete;
pub(crate) mod init;
pub(crate) mod keep;
pub(crate) mod lines;
pub(crate) mod list;
pub(crate) mod stats;
pub(crate) mod sync;

use std::path::PathBuf;

use spectra_db::Connection;
use spectra_sync::Settings;

use crate::CliError;

/// Settings and database path for a command.
pub(crate) fn load_settings(db: Option<PathBuf>) -> Result<(Settings, PathBuf), CliError> {
    let settings = Settings::load()?;
    let path = settings.database_path(db);
    Ok((settings, path))
}

/// Open an existing catalogue. A missing file is reported with a hint
/// instead of silently creating an empty catalogue.
pub(crate) fn open_existing(db_path: &std::path::Path) -> Result<Option<Connection>, CliError> {
    if !db_path.exists() {
        log::warn!("No catalogue database found at {}", db_path.display());
        log::info!("Run 'spectra init' to create one.");
        return Ok(None);
    }
    let conn = spectra_db::open_database(db_path)
        .map_err(|e| CliError::database(format!("Failed to open catalogue database: {e}")))?;
    Ok(Some(conn))
}

/// Truncate a string to a maximum width, appending "..." if needed.
pub(crate) fn truncate_str(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else if max > 3 {
        let head: String = s.chars().take(max - 3).collect();
        format!("{head}...")
    } else {
        s.chars().take(max).collect()
    }
}
