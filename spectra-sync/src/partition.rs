//! Partition function assignment.
//!
//! Nodes that publish a partition function have it copied onto the grid of
//! every record of the species with the matching isomer. For everything else
//! the function is summed from the species' states:
//!
//! ```text
//! Q(T) = sum_i g_i * exp(-c2 * E_i / T)
//! ```
//!
//! with energies in cm^-1 and `c2` the second radiation constant.

use std::collections::BTreeMap;

use rusqlite::Connection;
use spectra_catalog::{PartitionFunction, TEMPERATURES};
use spectra_node::{QueryResult, State};
use thiserror::Error;

use crate::error::SyncError;

/// Second radiation constant hc/k in cm K.
pub const C2: f64 = 1.438_776_877;

/// Why Q(T) could not be computed at one temperature.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum PartitionGap {
    #[error("no states")]
    NoStates,
    #[error("state {0} has no statistical weight")]
    MissingWeight(String),
    #[error("state {0} has no usable energy")]
    MissingEnergy(String),
    #[error("sum is not finite at {0} K")]
    NotFinite(f64),
}

/// Sum the partition function of `levels` (energy in cm^-1, weight) at
/// `temperature`.
pub fn partition_sum(levels: &[(f64, f64)], temperature: f64) -> Result<f64, PartitionGap> {
    if levels.is_empty() {
        return Err(PartitionGap::NoStates);
    }
    let q: f64 = levels
        .iter()
        .map(|(energy, weight)| weight * (-C2 * energy / temperature).exp())
        .sum();
    if q.is_finite() {
        Ok(q)
    } else {
        Err(PartitionGap::NotFinite(temperature))
    }
}

fn levels_of(states: &[&State], offset: f64) -> Result<Vec<(f64, f64)>, PartitionGap> {
    states
        .iter()
        .map(|s| {
            let energy = s
                .energy_wavenumber()
                .ok_or_else(|| PartitionGap::MissingEnergy(s.id.clone()))?;
            let weight = s
                .total_statistical_weight
                .ok_or_else(|| PartitionGap::MissingWeight(s.id.clone()))?;
            Ok((energy - offset, weight))
        })
        .collect()
}

/// Tabulate Q on the temperature grid. Temperatures that fail are logged and
/// left empty.
pub fn tabulate(species_id: &str, nsi: Option<&str>, states: &[&State], offset: f64) -> PartitionFunction {
    let mut pf = PartitionFunction::new();
    let levels = levels_of(states, offset);
    let mut failures = 0usize;

    for (index, &temperature) in TEMPERATURES.iter().enumerate() {
        let value = levels
            .as_ref()
            .map_err(Clone::clone)
            .and_then(|levels| partition_sum(levels, temperature));
        match value {
            Ok(q) => pf.set(index, q),
            Err(gap) => {
                if failures == 0 {
                    log::warn!(
                        "Partition function of {species_id} (nsi {}) at {temperature} K: {gap}",
                        nsi.unwrap_or("-")
                    );
                } else {
                    log::debug!("Partition function of {species_id} at {temperature} K: {gap}");
                }
                failures += 1;
            }
        }
    }
    if failures > 1 {
        log::warn!("{failures} grid temperatures left empty for {species_id}");
    }
    pf
}

/// Energy every state of an isomer is measured from: the declared
/// lowest-energy reference state, or else the lowest energy in the group.
fn isomer_offset(result: &QueryResult, states: &[&State]) -> f64 {
    let declared = states
        .iter()
        .find_map(|s| s.nsi_lowest_energy_ref.as_deref())
        .and_then(|r| result.state(r))
        .and_then(State::energy_wavenumber);
    declared.unwrap_or_else(|| {
        let lowest = states
            .iter()
            .filter_map(|s| s.energy_wavenumber())
            .fold(f64::INFINITY, f64::min);
        if lowest.is_finite() { lowest } else { 0.0 }
    })
}

/// Assign partition functions to every record of `species_id`. Returns the
/// number of records updated.
pub fn assign(conn: &Connection, result: &QueryResult, species_id: &str) -> Result<usize, SyncError> {
    let mut updated = 0;

    if let Some(molecule) = result.molecules.get(species_id) {
        if !molecule.partition_functions.is_empty() {
            for block in &molecule.partition_functions {
                let mut pf = PartitionFunction::new();
                let mut off_grid = 0usize;
                for (temperature, value) in block.points() {
                    if !pf.set_at(temperature, value) {
                        off_grid += 1;
                    }
                }
                if off_grid > 0 {
                    log::debug!("{off_grid} off-grid partition function values ignored for {species_id}");
                }
                updated += spectra_db::assign_partition_function(
                    conn,
                    species_id,
                    block.nsi.as_deref(),
                    &pf,
                )?;
            }
            return Ok(updated);
        }
    }

    let states: Vec<&State> = result.states_of(species_id).collect();
    let pf = tabulate(species_id, None, &states, 0.0);
    updated += spectra_db::assign_partition_function(conn, species_id, None, &pf)?;

    let mut isomers: BTreeMap<&str, Vec<&State>> = BTreeMap::new();
    for &state in &states {
        if let Some(nsi) = state.nsi() {
            isomers.entry(nsi).or_default().push(state);
        }
    }
    for (nsi, group) in isomers {
        let offset = isomer_offset(result, &group);
        let pf = tabulate(species_id, Some(nsi), &group, offset);
        updated += spectra_db::assign_partition_function(conn, species_id, Some(nsi), &pf)?;
    }

    Ok(updated)
}
