//! Discovery of species a node offers but the catalogue does not hold yet.
//!
//! Each new species is stored as a `New` placeholder. Its transitions are
//! imported by the next update pass.

use rusqlite::Connection;
use spectra_catalog::*;
use spectra_node::{Gateway, Node, NodeRegistry};

use crate::error::SyncError;
use crate::metadata::SpeciesMetadata;
use crate::progress::SyncProgress;
use crate::update::{SyncOptions, SyncReport};

/// Nodes to search: those the catalogue already imported from plus the
/// extra nodes from the options, without duplicates.
pub fn discovery_nodes(
    conn: &Connection,
    registry: &dyn NodeRegistry,
    extra: &[Node],
) -> Result<Vec<Node>, SyncError> {
    let mut nodes: Vec<Node> = Vec::new();
    for resource in spectra_db::distinct_resource_ids(conn)? {
        match registry.find(&resource) {
            Some(node) => nodes.push(node.clone()),
            None => log::warn!("No node registered for resource '{resource}', skipped"),
        }
    }
    for node in extra {
        if !nodes.iter().any(|n| n.identifier == node.identifier) {
            nodes.push(node.clone());
        }
    }
    Ok(nodes)
}

/// Insert a placeholder for every species a node offers that the catalogue
/// lacks.
pub fn discover_species(
    conn: &Connection,
    gateway: &dyn Gateway,
    registry: &dyn NodeRegistry,
    options: &SyncOptions,
    progress: &dyn SyncProgress,
    report: &mut SyncReport,
) -> Result<(), SyncError> {
    let nodes = discovery_nodes(conn, registry, &options.extra_nodes)?;
    let total = nodes.len();

    for (i, node) in nodes.iter().enumerate() {
        progress.on_phase(&format!(
            "Checking {} for new species ({}/{total})",
            node.name,
            i + 1
        ));
        let catalogue = match gateway.fetch_species_catalogue(node) {
            Ok(catalogue) => catalogue,
            Err(e) => {
                log::warn!("{}: species list unavailable: {e}", node.name);
                continue;
            }
        };

        let mut drafts = Vec::new();
        for molecule in catalogue.molecules.values() {
            drafts.push(SpeciesMetadata::from_molecule(molecule, node));
        }
        for atom in catalogue.atoms.values() {
            drafts.push(SpeciesMetadata::from_atom(atom, node));
        }

        let added = match insert_placeholders(conn, &drafts, options, report) {
            Ok(added) => added,
            Err(e) => {
                log::error!("{}: new species not stored: {e}", node.name);
                continue;
            }
        };

        report.species_discovered += added;
        progress.on_complete(&format!(
            "{}: {added} new species out of {}",
            node.name,
            catalogue.len()
        ));
    }

    Ok(())
}

/// Store a `New` placeholder for each draft the catalogue lacks. A species
/// that cannot be stored is logged and counted as failed.
fn insert_placeholders(
    conn: &Connection,
    drafts: &[SpeciesMetadata],
    options: &SyncOptions,
    report: &mut SyncReport,
) -> Result<u64, SyncError> {
    let tx = conn.unchecked_transaction()?;
    let mut added = 0u64;
    for metadata in drafts {
        if !options.selects(&metadata.species_id) {
            continue;
        }
        let stored = spectra_db::species_exists(&tx, &metadata.species_id).and_then(|exists| {
            if exists {
                return Ok(false);
            }
            let key = SubStateKey::placeholder(metadata.species_id.clone(), None);
            let draft = metadata.draft(key, Status::New);
            spectra_db::insert_species(&tx, &draft)?;
            log::info!("New species {} ({})", draft.name, metadata.species_id);
            Ok(true)
        });
        match stored {
            Ok(true) => added += 1,
            Ok(false) => {}
            Err(e) => {
                let e = SyncError::from(e);
                log::error!("{}: {e}", metadata.species_id);
                report.fail(&metadata.species_id, &e);
            }
        }
    }
    tx.commit()?;
    Ok(added)
}
