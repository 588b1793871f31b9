//! Data model types for the spectroscopic catalogue.
//!
//! These types represent the persistent catalogue schema: one species record
//! per physical sub-state of a species, and the radiative transitions that
//! belong to it.

use serde::{Deserialize, Serialize};

use crate::key::SubStateKey;
use crate::status::Status;

// ── Species ─────────────────────────────────────────────────────────────────

/// A stored species record (one distinct sub-state of a species).
#[derive(Debug, Clone, PartialEq)]
pub struct SpeciesRecord {
    pub id: i64,
    pub name: String,
    /// Composite identity: species id plus the four sub-state dimensions.
    pub key: SubStateKey,
    /// Cross-reference identifier stable across nodes (InChIKey-like).
    pub vamdc_species_id: Option<String>,
    pub stoichiometric_formula: Option<String>,
    pub ordinary_structural_formula: Option<String>,
    pub chemical_name: Option<String>,
    pub comment: Option<String>,
    /// Identifier of the node the record was imported from.
    pub resource_id: Option<String>,
    pub url: Option<String>,
    pub recommendation: bool,
    pub query_uuid: Option<String>,
    pub status: Status,
    pub created_at: String,
    pub checked_at: Option<String>,
}

impl SpeciesRecord {
    /// Build an insertable draft that carries this record's metadata under a
    /// different identity key and name.
    pub fn clone_as(&self, key: SubStateKey, name: String) -> NewSpecies {
        NewSpecies {
            name,
            key,
            vamdc_species_id: self.vamdc_species_id.clone(),
            stoichiometric_formula: self.stoichiometric_formula.clone(),
            ordinary_structural_formula: self.ordinary_structural_formula.clone(),
            chemical_name: self.chemical_name.clone(),
            comment: self.comment.clone(),
            resource_id: self.resource_id.clone(),
            url: self.url.clone(),
            recommendation: self.recommendation,
            status: self.status,
        }
    }
}

/// A species record that has not been inserted yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSpecies {
    pub name: String,
    pub key: SubStateKey,
    pub vamdc_species_id: Option<String>,
    pub stoichiometric_formula: Option<String>,
    pub ordinary_structural_formula: Option<String>,
    pub chemical_name: Option<String>,
    pub comment: Option<String>,
    pub resource_id: Option<String>,
    pub url: Option<String>,
    #[serde(default)]
    pub recommendation: bool,
    pub status: Status,
}

impl NewSpecies {
    /// A fresh `New` placeholder that only knows its species id.
    pub fn placeholder(species_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            key: SubStateKey::placeholder(species_id, None),
            vamdc_species_id: None,
            stoichiometric_formula: None,
            ordinary_structural_formula: None,
            chemical_name: None,
            comment: None,
            resource_id: None,
            url: None,
            recommendation: false,
            status: Status::New,
        }
    }
}

// ── Transitions ─────────────────────────────────────────────────────────────

/// A stored radiative transition.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionRecord {
    pub id: i64,
    pub species_record_id: i64,
    pub name: String,
    /// Frequency in MHz.
    pub frequency: f64,
    pub einstein_a: Option<f64>,
    /// Frequency uncertainty in MHz.
    pub uncertainty: f64,
    /// Lower-state energy in cm^-1.
    pub energy_lower: Option<f64>,
    pub upper_state_degeneracy: i64,
    pub hfs: Option<String>,
    pub upper_state_quantum_numbers: Option<String>,
    pub lower_state_quantum_numbers: Option<String>,
}

/// A radiative transition ready to be inserted for a species record.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransition {
    pub name: String,
    pub frequency: f64,
    pub einstein_a: Option<f64>,
    pub uncertainty: f64,
    pub energy_lower: Option<f64>,
    pub upper_state_degeneracy: i64,
    pub hfs: Option<String>,
    pub upper_state_quantum_numbers: Option<String>,
    pub lower_state_quantum_numbers: Option<String>,
}
