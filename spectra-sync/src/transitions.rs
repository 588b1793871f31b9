//! Mapping of remote radiative transitions onto catalogue records.
//!
//! Planning ([`plan_lines`]) is pure: it validates every transition of a
//! species and derives the identity key each line belongs to. Importing
//! ([`import_lines`]) resolves those keys against the [`IdentityTable`] and
//! writes the lines. A species either plans completely or fails as a whole.

use std::collections::BTreeSet;

use rusqlite::Connection;
use spectra_catalog::*;
use spectra_node::{QuantumNumbers, QueryResult, RadiativeTransition, State};

use crate::error::SyncError;
use crate::metadata::SpeciesMetadata;
use crate::resolve::{IdentityTable, Resolution, Resolved};

/// One transition destined for the record with identity `key`.
///
/// `transition.name` is filled in from the owning record at import time.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedLine {
    pub key: SubStateKey,
    pub transition: NewTransition,
}

/// Counts from importing one species.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportCounts {
    pub inserted: usize,
    /// Lines dropped because their record is under the `Keep` override.
    pub excluded: usize,
    pub promoted: usize,
    pub created: usize,
}

// ── Labels ──────────────────────────────────────────────────────────────────

/// Vibrational label of a transition.
///
/// Equal upper and lower labels collapse to that label. Otherwise every
/// vibrational quantum number of either state is listed, a number missing on
/// one side counting as `0`, and the higher state is written first:
/// `v=1-0` or `(v1,v2)=(1,0)-(0,0)`.
pub fn vib_label(upper: &QuantumNumbers, lower: &QuantumNumbers) -> Option<String> {
    let up_state = upper.vibstate();
    if up_state == lower.vibstate() {
        return up_state;
    }

    let labels: BTreeSet<&str> = upper
        .vibrational()
        .into_iter()
        .chain(lower.vibrational())
        .map(|(label, _)| label)
        .collect();
    let side = |qn: &QuantumNumbers| {
        labels
            .iter()
            .map(|l| qn.get(l).unwrap_or("0").trim().to_string())
            .collect::<Vec<_>>()
            .join(",")
    };
    let (mut up, mut low) = (side(upper), side(lower));
    if up < low {
        std::mem::swap(&mut up, &mut low);
    }

    let names = labels.iter().copied().collect::<Vec<_>>().join(",");
    if labels.len() > 1 {
        Some(format!("({names})=({up})-({low})"))
    } else {
        Some(format!("{names}={up}-{low}"))
    }
}

/// Electronic label: the shared `ElecStateLabel`, `up-low` when they differ,
/// or whichever side has one.
pub fn elec_label(upper: &QuantumNumbers, lower: &QuantumNumbers) -> Option<String> {
    match (upper.elec_state_label(), lower.elec_state_label()) {
        (Some(u), Some(l)) if u == l => Some(u.to_string()),
        (Some(u), Some(l)) => Some(format!("{u}-{l}")),
        (Some(one), None) | (None, Some(one)) => Some(one.to_string()),
        (None, None) => None,
    }
}

// ── Planning ────────────────────────────────────────────────────────────────

fn state_of<'a>(
    result: &'a QueryResult,
    species_id: &str,
    transition: &RadiativeTransition,
    state_ref: Option<&str>,
) -> Result<&'a State, SyncError> {
    let state_ref = state_ref.unwrap_or_default();
    result
        .state(state_ref)
        .ok_or_else(|| SyncError::missing_state(species_id, &transition.id, state_ref))
}

/// Validate and key every transition of `species_id` in `result`.
///
/// Atoms carry no sub-state dimensions. A molecule line whose upper state
/// belongs to a named nuclear-spin isomer is planned twice: once for the
/// isomer, with its lower energy measured from the isomer's reference state,
/// and once for the isomer-less record with the raw energy.
pub fn plan_lines(result: &QueryResult, species_id: &str) -> Result<Vec<PlannedLine>, SyncError> {
    let is_atom = result.atoms.contains_key(species_id);
    let mut lines = Vec::new();

    for transition in result.radiative_transitions.values() {
        if result.species_of(transition).as_deref() != Some(species_id) {
            continue;
        }
        let upper = state_of(result, species_id, transition, transition.upper_state_ref.as_deref())?;
        let lower = state_of(result, species_id, transition, transition.lower_state_ref.as_deref())?;

        let frequency = transition
            .frequency_mhz()
            .filter(|f| f.is_finite())
            .ok_or_else(|| SyncError::missing_field(species_id, &transition.id, "FrequencyValue"))?;
        let uncertainty = transition
            .accuracy_mhz()
            .filter(|a| a.is_finite())
            .ok_or_else(|| {
                SyncError::missing_field(species_id, &transition.id, "FrequencyAccuracy")
            })?;
        let weight = upper
            .total_statistical_weight
            .filter(|w| w.is_finite())
            .ok_or_else(|| {
                SyncError::missing_field(species_id, &transition.id, "TotalStatisticalWeight")
            })?;
        let energy_lower = lower.energy_wavenumber();
        let hfs = transition.hyperfine_tag().map(str::to_string);

        let line = NewTransition {
            name: String::new(),
            frequency,
            einstein_a: transition.einstein_a,
            uncertainty,
            energy_lower,
            upper_state_degeneracy: weight.round() as i64,
            hfs: hfs.clone(),
            upper_state_quantum_numbers: Some(upper.quantum_numbers.qn_string()),
            lower_state_quantum_numbers: Some(lower.quantum_numbers.qn_string()),
        };

        if is_atom {
            lines.push(PlannedLine {
                key: SubStateKey::placeholder(species_id, None),
                transition: line,
            });
            continue;
        }

        let vib = vib_label(&upper.quantum_numbers, &lower.quantum_numbers);
        let elec = elec_label(&upper.quantum_numbers, &lower.quantum_numbers);

        if let Some(nsi) = upper.nsi() {
            let reference_ref = upper.nsi_lowest_energy_ref.as_deref();
            let reference = state_of(result, species_id, transition, reference_ref)?;
            let offset = reference.energy_wavenumber().ok_or_else(|| {
                SyncError::missing_field(species_id, &transition.id, "StateEnergy")
            })?;
            lines.push(PlannedLine {
                key: SubStateKey::new(
                    species_id,
                    Some(nsi.to_string()),
                    vib.clone(),
                    hfs.clone(),
                    elec.clone(),
                ),
                transition: NewTransition {
                    energy_lower: energy_lower.map(|e| e - offset),
                    ..line.clone()
                },
            });
        }

        lines.push(PlannedLine {
            key: SubStateKey::new(species_id, None, vib, hfs, elec),
            transition: line,
        });
    }

    Ok(lines)
}

// ── Import ──────────────────────────────────────────────────────────────────

/// Resolve and insert planned lines. Records created on the way start in
/// `Updating` so that the end-of-pass bookkeeping covers them.
pub fn import_lines(
    conn: &Connection,
    table: &mut IdentityTable,
    metadata: &SpeciesMetadata,
    lines: Vec<PlannedLine>,
) -> Result<ImportCounts, SyncError> {
    let mut counts = ImportCounts::default();

    for PlannedLine { key, mut transition } in lines {
        let (resolved, resolution) = table.resolve(conn, &key, metadata, Status::Updating)?;
        match resolution {
            Resolution::Promoted => counts.promoted += 1,
            Resolution::Created => counts.created += 1,
            Resolution::Exact => {}
        }
        let id = match resolved {
            Resolved::Active(id) => id,
            Resolved::Excluded(id) => {
                log::debug!("Skipping line for kept record {id}");
                counts.excluded += 1;
                continue;
            }
        };

        if let Some(record) = table.get(id) {
            transition.name.clone_from(&record.name);
        }
        spectra_db::insert_transition(conn, id, &transition)?;
        table.mark_received(id);
        counts.inserted += 1;
    }

    Ok(counts)
}
