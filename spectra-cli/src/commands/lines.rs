use std::path::PathBuf;

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use crate::CliError;

use super::{load_settings, open_existing, truncate_str};

/// Print the transitions between `fmin` and `fmax` MHz.
pub(crate) fn run_lines(db: Option<PathBuf>, fmin: f64, fmax: f64, limit: u32) -> Result<(), CliError> {
    if !(fmin.is_finite() && fmax.is_finite()) || fmin > fmax {
        return Err(CliError::usage(format!(
            "Invalid frequency range {fmin}..{fmax} MHz"
        )));
    }

    let (_, db_path) = load_settings(db)?;
    let Some(conn) = open_existing(&db_path)? else {
        return Ok(());
    };

    let lines = spectra_db::transitions_in_range(&conn, fmin, fmax, limit)
        .map_err(|e| CliError::database(e.to_string()))?;
    if lines.is_empty() {
        log::info!("No lines between {fmin} and {fmax} MHz.");
        return Ok(());
    }

    log::info!(
        "{}",
        format!(
            "{:>16}  {:>10}  {:>12}  {:>12}  {:>5}  {}",
            "Frequency", "Unc.", "Einstein A", "E_low", "g_up", "Record"
        )
        .if_supports_color(Stdout, |t| t.bold())
    );
    for line in &lines {
        log::info!(
            "{:>16.4}  {:>10.4}  {:>12}  {:>12}  {:>5}  {}",
            line.frequency,
            line.uncertainty,
            line.einstein_a.map_or("-".to_string(), |a| format!("{a:.3e}")),
            line.energy_lower.map_or("-".to_string(), |e| format!("{e:.4}")),
            line.upper_state_degeneracy,
            truncate_str(&line.species_name, 40),
        );
    }
    if lines.len() as u32 == limit {
        crate::log_blank();
        log::info!("Showing the first {limit} lines; use --limit for more.");
    }
    Ok(())
}
