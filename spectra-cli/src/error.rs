use thiserror::Error;

/// Errors that can occur during CLI command execution.
#[derive(Debug, Error)]
pub(crate) enum CliError {
    /// I/O error
    #[error("{0}")]
    Io(#[from] std::io::Error),

    /// Database could not be opened or queried
    #[error("Database error: {0}")]
    Database(String),

    /// Synchronisation aborted
    #[error("{0}")]
    Sync(#[from] spectra_sync::SyncError),

    /// Unknown node name or identifier
    #[error("Unknown node: {0}")]
    UnknownNode(String),

    /// Configuration error
    #[error("Config error: {0}")]
    Config(String),

    /// Invalid command-line input
    #[error("{0}")]
    Usage(String),
}

impl CliError {
    pub(crate) fn database(msg: impl Into<String>) -> Self {
        Self::Database(msg.into())
    }

    pub(crate) fn unknown_node(msg: impl Into<String>) -> Self {
        Self::UnknownNode(msg.into())
    }

    pub(crate) fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub(crate) fn usage(msg: impl Into<String>) -> Self {
        Self::Usage(msg.into())
    }
}
