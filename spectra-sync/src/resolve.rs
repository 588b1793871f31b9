//! Identity resolution with progressive key refinement.
//!
//! A species is first stored as a placeholder that knows nothing about its
//! sub-states. As transitions reveal vibrational, electronic and hyperfine
//! states, existing records are re-keyed in place where possible and new
//! records are cloned only when no existing record can absorb the key. Row
//! ids of promoted records are stable, so external references survive.
//!
//! Resolution for a target key runs these steps in order:
//!
//! 1. exact match;
//! 2. promotion of the `(species, nsi)` placeholder;
//! 3. promotion of the best strict generalisation of the key
//!    (see [`PromotionRank`]);
//! 4. creation of a new record cloned from a template.
//!
//! A record is never promoted once it has received transitions in the
//! current pass. Records under the `Keep` override resolve to
//! [`Resolved::Excluded`] and are never promoted or cloned from.

use std::collections::{BTreeMap, HashMap, HashSet};

use rusqlite::Connection;
use spectra_catalog::*;
use spectra_db::{copy_partition_function, delete_species_record, insert_species, rekey_species};

use crate::error::SyncError;
use crate::metadata::SpeciesMetadata;

/// Outcome of resolving one identity key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolved {
    /// Transitions for the key go to this record.
    Active(i64),
    /// The key belongs to a record under the `Keep` override; its
    /// transitions are dropped.
    Excluded(i64),
}

/// How a key was resolved, for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Exact,
    Promoted,
    Created,
}

/// In-memory index of every record of one species, kept in step with the
/// database while a pass runs.
#[derive(Debug)]
pub struct IdentityTable {
    species_id: String,
    records: BTreeMap<i64, SpeciesRecord>,
    by_key: HashMap<SubStateKey, i64>,
    /// Records that received transitions in the current pass.
    received: HashSet<i64>,
    promoted: usize,
    created: usize,
}

impl IdentityTable {
    /// Load every record of `species_id`.
    ///
    /// Rows sharing one identity key are collapsed: the `Keep` row or else
    /// the lowest id survives and the others are deleted. Two `Keep` rows
    /// with the same key are an operator conflict; the species fails before
    /// anything is deleted.
    pub fn load(conn: &Connection, species_id: &str) -> Result<Self, SyncError> {
        let mut groups: BTreeMap<SubStateKey, Vec<SpeciesRecord>> = BTreeMap::new();
        for record in spectra_db::species_for_species_id(conn, species_id)? {
            groups.entry(record.key.clone()).or_default().push(record);
        }

        let mut table = Self {
            species_id: species_id.to_string(),
            records: BTreeMap::new(),
            by_key: HashMap::new(),
            received: HashSet::new(),
            promoted: 0,
            created: 0,
        };

        for (key, rows) in &groups {
            let keeps = rows.iter().filter(|r| r.status == Status::Keep).count();
            if keeps > 1 {
                return Err(SyncError::IdentityResolutionConflict {
                    key: key.to_string(),
                    ids: rows.iter().map(|r| r.id).collect(),
                });
            }
        }

        for (key, mut rows) in groups {
            // Rows arrive ordered by id; a Keep row moves to the front.
            rows.sort_by_key(|r| (r.status != Status::Keep, r.id));
            let mut rows = rows.into_iter();
            let Some(survivor) = rows.next() else {
                continue;
            };
            for duplicate in rows {
                log::warn!(
                    "{}",
                    SyncError::IdentityResolutionConflict {
                        key: key.to_string(),
                        ids: vec![survivor.id, duplicate.id],
                    }
                );
                log::warn!(
                    "Deleting duplicate record {} ({}), keeping {}",
                    duplicate.id,
                    duplicate.name,
                    survivor.id
                );
                delete_species_record(conn, duplicate.id)?;
            }
            table.by_key.insert(key, survivor.id);
            table.records.insert(survivor.id, survivor);
        }

        Ok(table)
    }

    pub fn species_id(&self) -> &str {
        &self.species_id
    }

    pub fn get(&self, id: i64) -> Option<&SpeciesRecord> {
        self.records.get(&id)
    }

    pub fn records(&self) -> impl Iterator<Item = &SpeciesRecord> {
        self.records.values()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn mark_received(&mut self, id: i64) {
        self.received.insert(id);
    }

    pub fn has_received(&self, id: i64) -> bool {
        self.received.contains(&id)
    }

    /// Whether any record received transitions in this pass.
    pub fn any_received(&self) -> bool {
        !self.received.is_empty()
    }

    pub fn promoted(&self) -> usize {
        self.promoted
    }

    pub fn created(&self) -> usize {
        self.created
    }

    /// Resolve `key` to a record, promoting or creating one when needed.
    /// New records are inserted with `new_status`.
    pub fn resolve(
        &mut self,
        conn: &Connection,
        key: &SubStateKey,
        metadata: &SpeciesMetadata,
        new_status: Status,
    ) -> Result<(Resolved, Resolution), SyncError> {
        debug_assert_eq!(key.species_id, self.species_id);

        // ── 1. Exact match ──
        if let Some(&id) = self.by_key.get(key) {
            return Ok((self.classify(id), Resolution::Exact));
        }

        // ── 2. Placeholder promotion ──
        if !key.is_placeholder() {
            if let Some(&id) = self.by_key.get(&key.placeholder_of()) {
                if self.promotable(id) {
                    self.promote(conn, id, key, metadata)?;
                    return Ok((Resolved::Active(id), Resolution::Promoted));
                }
            }
        }

        // ── 3. Partial promotion ──
        let candidate = self
            .records
            .values()
            .filter(|r| self.promotable(r.id))
            .filter_map(|r| r.key.promotion_rank(key).map(|rank| (rank, r.id)))
            .min();
        if let Some((rank, id)) = candidate {
            log::debug!("Promoting record {id} to {key} ({rank:?})");
            self.promote(conn, id, key, metadata)?;
            return Ok((Resolved::Active(id), Resolution::Promoted));
        }

        // ── 4. Creation ──
        let id = self.create(conn, key, metadata, new_status)?;
        Ok((Resolved::Active(id), Resolution::Created))
    }

    fn classify(&self, id: i64) -> Resolved {
        match self.records.get(&id) {
            Some(r) if r.status == Status::Keep => Resolved::Excluded(id),
            _ => Resolved::Active(id),
        }
    }

    fn promotable(&self, id: i64) -> bool {
        !self.received.contains(&id)
            && self
                .records
                .get(&id)
                .is_some_and(|r| r.status != Status::Keep)
    }

    fn promote(
        &mut self,
        conn: &Connection,
        id: i64,
        key: &SubStateKey,
        metadata: &SpeciesMetadata,
    ) -> Result<(), SyncError> {
        let name = metadata.record_name(key);
        rekey_species(conn, id, key, &name)?;
        if let Some(record) = self.records.get_mut(&id) {
            self.by_key.remove(&record.key);
            record.key = key.clone();
            record.name = name;
        }
        self.by_key.insert(key.clone(), id);
        self.promoted += 1;
        Ok(())
    }

    /// Pick the record a new sub-state is cloned from.
    ///
    /// A record of the same isomer carries over its partition function. Any
    /// other record of the species only lends its metadata.
    fn template(&self, key: &SubStateKey) -> Option<(&SpeciesRecord, bool)> {
        let usable = || self.records.values().filter(|r| r.status != Status::Keep);
        usable()
            .find(|r| r.key.same_isomer(key))
            .map(|r| (r, true))
            .or_else(|| usable().next().map(|r| (r, false)))
    }

    fn create(
        &mut self,
        conn: &Connection,
        key: &SubStateKey,
        metadata: &SpeciesMetadata,
        status: Status,
    ) -> Result<i64, SyncError> {
        let name = metadata.record_name(key);
        let (draft, pf_source) = match self.template(key) {
            Some((template, same_isomer)) => {
                let mut draft = template.clone_as(key.clone(), name);
                draft.status = status;
                (draft, same_isomer.then_some(template.id))
            }
            None => (metadata.draft(key.clone(), status), None),
        };

        let id = insert_species(conn, &draft)?;
        if let Some(source) = pf_source {
            copy_partition_function(conn, source, id)?;
        }
        log::debug!("Created record {id} for {key}");

        let record = SpeciesRecord {
            id,
            name: draft.name,
            key: draft.key,
            vamdc_species_id: draft.vamdc_species_id,
            stoichiometric_formula: draft.stoichiometric_formula,
            ordinary_structural_formula: draft.ordinary_structural_formula,
            chemical_name: draft.chemical_name,
            comment: draft.comment,
            resource_id: draft.resource_id,
            url: draft.url,
            recommendation: draft.recommendation,
            query_uuid: None,
            status: draft.status,
            created_at: String::new(),
            checked_at: None,
        };
        self.by_key.insert(record.key.clone(), id);
        self.records.insert(id, record);
        self.created += 1;
        Ok(id)
    }
}
