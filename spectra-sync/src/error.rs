use spectra_catalog::StatusError;
use spectra_db::OperationError;
use spectra_node::NodeError;
use thiserror::Error;

/// Errors raised while synchronising the catalogue.
///
/// Apart from `Sqlite` on the outer transaction, every variant is scoped to
/// one species: the driver logs it, marks that species failed and moves on.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Timed out waiting for {url}")]
    NetworkTimeout { url: String },

    /// The node answered with no content: it no longer offers the species.
    #[error("Node has no content for {target}")]
    NoRemoteContent { target: String },

    #[error("Node result does not contain {target}")]
    SpeciesNotReturned { target: String },

    #[error("Transition {transition} of {species_id} references missing state '{state_ref}'")]
    MissingStateReference {
        species_id: String,
        transition: String,
        state_ref: String,
    },

    #[error("Transition {transition} of {species_id} has no usable {field}")]
    MissingRequiredField {
        species_id: String,
        transition: String,
        field: &'static str,
    },

    #[error("Records {ids:?} share identity {key} and cannot be merged")]
    IdentityResolutionConflict { key: String, ids: Vec<i64> },

    #[error("Catalogue write failed: {0}")]
    StoreWriteError(#[from] OperationError),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Node error: {0}")]
    Node(NodeError),

    #[error("{0}")]
    Status(#[from] StatusError),

    #[error("No node registered for resource '{0}'")]
    UnknownNode(String),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<NodeError> for SyncError {
    fn from(e: NodeError) -> Self {
        match e {
            NodeError::Timeout { url } => Self::NetworkTimeout { url },
            NodeError::NoContent { url } => Self::NoRemoteContent { target: url },
            other => Self::Node(other),
        }
    }
}

impl SyncError {
    pub fn missing_field(species_id: &str, transition: &str, field: &'static str) -> Self {
        Self::MissingRequiredField {
            species_id: species_id.to_string(),
            transition: transition.to_string(),
            field,
        }
    }

    pub fn missing_state(species_id: &str, transition: &str, state_ref: &str) -> Self {
        Self::MissingStateReference {
            species_id: species_id.to_string(),
            transition: transition.to_string(),
            state_ref: state_ref.to_string(),
        }
    }
}
