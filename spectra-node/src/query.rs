//! VSS2 query construction.
//!
//! Queries are built from validated identifiers only, so no caller-supplied
//! text reaches the query string unchecked.

use crate::error::NodeError;

/// The queries the synchroniser sends to a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpeciesQuery {
    /// All data for one species, by the node-local numeric id.
    BySpeciesId(String),
    /// All data for one species, by the cross-node species id (InChIKey).
    ByInchiKey(String),
    /// The list of species the node offers.
    AllSpecies,
}

impl SpeciesQuery {
    /// Accepts either a prefixed id (`XCDMS-149`) or its numeric part.
    pub fn by_species_id(species_id: &str) -> Result<Self, NodeError> {
        let numeric = match species_id.rsplit_once('-') {
            Some((_, rest)) => rest,
            None => species_id,
        };
        if numeric.is_empty() || !numeric.bytes().all(|b| b.is_ascii_digit()) {
            return Err(NodeError::invalid_query(format!(
                "species id '{species_id}' has no numeric part"
            )));
        }
        Ok(Self::BySpeciesId(numeric.to_string()))
    }

    pub fn by_inchikey(key: &str) -> Result<Self, NodeError> {
        let key = key.trim();
        let valid = !key.is_empty()
            && key.len() <= 64
            && key.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-');
        if !valid {
            return Err(NodeError::invalid_query(format!(
                "'{key}' is not a valid species key"
            )));
        }
        Ok(Self::ByInchiKey(key.to_string()))
    }

    /// The VSS2 query text.
    pub fn to_vss2(&self) -> String {
        match self {
            Self::BySpeciesId(id) => format!("SELECT ALL WHERE SpeciesID={id}"),
            Self::ByInchiKey(key) => format!("SELECT ALL WHERE VAMDCSpeciesID='{key}'"),
            Self::AllSpecies => "SELECT SPECIES".to_string(),
        }
    }
}

impl std::fmt::Display for SpeciesQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_vss2())
    }
}
