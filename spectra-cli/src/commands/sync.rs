use std::path::PathBuf;

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;
use spectra_node::{NodeRegistry, VamdcClient};
use spectra_sync::{SyncOptions, SyncReport, check_freshness, run_sync};

use crate::CliError;
use crate::progress::BarProgress;

use super::{load_settings, open_existing};

/// Flags of `spectra update`.
pub(crate) struct UpdateFlags {
    pub species: Vec<String>,
    pub force: bool,
    pub insert_only: bool,
    pub update_only: bool,
    pub check_freshness: bool,
    pub delete_archived: bool,
}

/// Run the freshness check on its own.
pub(crate) fn run_check(
    db: Option<PathBuf>,
    species: Vec<String>,
    delete_archived: bool,
    quiet: bool,
) -> Result<(), CliError> {
    let (settings, db_path) = load_settings(db)?;
    let Some(conn) = open_existing(&db_path)? else {
        return Ok(());
    };
    let client = VamdcClient::new(settings.timeout(), settings.resolve_uuid)
        .map_err(|e| CliError::config(e.to_string()))?;
    let registry = settings.registry();

    let options = SyncOptions {
        species_ids: species,
        delete_archived: delete_archived || settings.delete_archived,
        ..Default::default()
    };
    let progress = BarProgress::new(quiet);
    let mut report = SyncReport::default();
    check_freshness(&conn, &client, &registry, &options, &progress, &mut report)?;
    progress.finish();

    print_report(&report);
    Ok(())
}

/// Freshness check, update and discovery.
pub(crate) fn run_update(db: Option<PathBuf>, flags: UpdateFlags, quiet: bool) -> Result<(), CliError> {
    let (settings, db_path) = load_settings(db)?;
    let Some(conn) = open_existing(&db_path)? else {
        return Ok(());
    };
    let client = VamdcClient::new(settings.timeout(), settings.resolve_uuid)
        .map_err(|e| CliError::config(e.to_string()))?;
    let registry = settings.registry();

    let options = SyncOptions {
        force: flags.force,
        species_ids: flags.species,
        insert_only: flags.insert_only,
        update_only: flags.update_only,
        check_freshness: flags.check_freshness,
        delete_archived: flags.delete_archived || settings.delete_archived,
        extra_nodes: Vec::new(),
    };
    let progress = BarProgress::new(quiet);
    let report = run_sync(&conn, &client, &registry, &options, &progress)?;
    progress.finish();

    print_report(&report);
    Ok(())
}

/// Discovery only, optionally on nodes the catalogue has not used yet.
pub(crate) fn run_discover(db: Option<PathBuf>, nodes: Vec<String>, quiet: bool) -> Result<(), CliError> {
    let (settings, db_path) = load_settings(db)?;
    let Some(conn) = open_existing(&db_path)? else {
        return Ok(());
    };
    let client = VamdcClient::new(settings.timeout(), settings.resolve_uuid)
        .map_err(|e| CliError::config(e.to_string()))?;
    let registry = settings.registry();

    let extra_nodes = nodes
        .iter()
        .map(|name| {
            registry
                .find(name)
                .cloned()
                .ok_or_else(|| CliError::unknown_node(name.clone()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let options = SyncOptions {
        insert_only: true,
        extra_nodes,
        ..Default::default()
    };
    let progress = BarProgress::new(quiet);
    let report = run_sync(&conn, &client, &registry, &options, &progress)?;
    progress.finish();

    print_report(&report);
    Ok(())
}

fn print_report(report: &SyncReport) {
    crate::log_blank();
    log::info!("{}", "Summary".if_supports_color(Stdout, |t| t.bold()));
    let rows = [
        ("Species checked", report.species_checked),
        ("Update available", report.marked_available),
        ("Marked outdated", report.marked_outdated),
        ("Records deleted", report.records_deleted),
        ("Species updated", report.species_updated),
        ("Transitions", report.transitions_inserted),
        ("Lines kept out", report.lines_excluded),
        ("Records promoted", report.records_promoted),
        ("Records created", report.records_created),
        ("Records reaped", report.records_reaped),
        ("New species", report.species_discovered),
    ];
    for (label, count) in rows.iter().filter(|(_, c)| *c > 0) {
        log::info!("  {:<18}{:>8}", format!("{label}:"), count);
    }

    if report.species_failed > 0 {
        log::info!(
            "  {:<18}{:>8}",
            "Species failed:",
            report
                .species_failed
                .if_supports_color(Stdout, |t| t.red())
        );
        for (species_id, error) in &report.failures {
            log::warn!("{species_id}: {error}");
        }
    }
}
