use std::path::PathBuf;

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;
use spectra_node::NodeRegistry;
use spectra_sync::settings_path;

use crate::CliError;

use super::load_settings;

/// Show the effective settings and the node registry.
pub(crate) fn run_config_show(db: Option<PathBuf>) -> Result<(), CliError> {
    let (settings, db_path) = load_settings(db)?;
    let path = settings_path();

    log::info!("{}", "Settings".if_supports_color(Stdout, |t| t.bold()));
    let source = if path.exists() { "" } else { " (not found, using defaults)" };
    log::info!("  File:            {}{source}", path.display());
    log::info!("  Database:        {}", db_path.display());
    log::info!("  Timeout:         {} s", settings.timeout_secs);
    log::info!("  Delete archived: {}", settings.delete_archived);
    log::info!("  Resolve UUIDs:   {}", settings.resolve_uuid);
    crate::log_blank();

    log::info!("{}", "Nodes".if_supports_color(Stdout, |t| t.bold()));
    for node in settings.registry().nodes() {
        log::info!("  {:<8} {}", node.name, node.identifier);
        log::info!("  {:<8} {}", "", node.url.if_supports_color(Stdout, |t| t.dimmed()));
    }
    Ok(())
}

/// Print the settings file path.
pub(crate) fn run_config_path() -> Result<(), CliError> {
    println!("{}", settings_path().display());
    Ok(())
}
