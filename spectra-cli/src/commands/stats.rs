use std::path::PathBuf;

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use crate::CliError;

use super::{load_settings, open_existing};

pub(crate) fn run_stats(db: Option<PathBuf>) -> Result<(), CliError> {
    let (_, db_path) = load_settings(db)?;
    let Some(conn) = open_existing(&db_path)? else {
        return Ok(());
    };

    let stats = spectra_db::catalog_stats(&conn)
        .map_err(|e| CliError::database(format!("Failed to query catalogue stats: {e}")))?;

    log::info!(
        "{}",
        "Catalogue Statistics".if_supports_color(Stdout, |t| t.bold()),
    );
    log::info!("  Database: {}", db_path.display());
    crate::log_blank();
    log::info!("  Species:            {:>8}", stats.species);
    log::info!("  Records:            {:>8}", stats.records);
    log::info!("  Transitions:        {:>8}", stats.transitions);
    log::info!("  With part. func.:   {:>8}", stats.with_partition_function);
    crate::log_blank();
    for (status, count) in &stats.by_status {
        log::info!("  {:<20}{:>8}", format!("{status}:"), count);
    }

    Ok(())
}
