//! Lifecycle status of a species record.
//!
//! ```text
//!   New ───────────────┐
//!   Update Available ──┼─ PassStarted ─> Updating ─┬─ PassSucceeded ─> Up-To-Date
//!   Update Failed ─────┘                           └─ PassFailed ────> Update Failed
//! ```
//!
//! The freshness check moves records to `Update Available` when the node has
//! newer data and resets stuck or failed records so that they are retried.
//! `Outdated` is terminal. `Keep` is an operator override that no automatic
//! event leaves.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    New,
    UpdateAvailable,
    UpToDate,
    Outdated,
    Keep,
    Updating,
    UpdateFailed,
}

/// Something that happened to a record during a check or a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusEvent {
    /// Freshness check found newer data on the node.
    RemoteNewer,
    /// Freshness check found nothing newer.
    RemoteUnchanged,
    /// The node no longer knows the species and deletion is disabled.
    RemoteArchived,
    /// A synchronisation pass picked the record up. `forced` admits records
    /// that are not normally eligible.
    PassStarted { forced: bool },
    PassSucceeded,
    PassFailed,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StatusError {
    #[error("Invalid status transition: {event:?} is not allowed from '{from}'")]
    InvalidTransition { from: Status, event: StatusEvent },
}

impl Default for Status {
    fn default() -> Self {
        Self::New
    }
}

impl Status {
    pub const ALL: [Status; 7] = [
        Status::New,
        Status::UpdateAvailable,
        Status::UpToDate,
        Status::Outdated,
        Status::Keep,
        Status::Updating,
        Status::UpdateFailed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => "New",
            Self::UpdateAvailable => "Update Available",
            Self::UpToDate => "Up-To-Date",
            Self::Outdated => "Outdated",
            Self::Keep => "Keep",
            Self::Updating => "Updating",
            Self::UpdateFailed => "Update Failed",
        }
    }

    /// Parse a stored status string. Unknown values map to `Update Available`
    /// so that the next run retries the record.
    pub fn from_str_loose(s: &str) -> Self {
        match s.trim().to_lowercase().replace(['-', '_'], " ").as_str() {
            "new" => Self::New,
            "up to date" => Self::UpToDate,
            "outdated" => Self::Outdated,
            "keep" => Self::Keep,
            "updating" | "processing update" => Self::Updating,
            "update failed" => Self::UpdateFailed,
            _ => Self::UpdateAvailable,
        }
    }

    /// Whether a normal (non-forced) pass selects records in this status.
    pub fn is_update_trigger(&self) -> bool {
        matches!(
            self,
            Self::New | Self::UpdateAvailable | Self::UpdateFailed | Self::Updating
        )
    }

    /// Apply an event, returning the next status.
    pub fn apply(self, event: StatusEvent) -> Result<Status, StatusError> {
        use Status::*;
        use StatusEvent::*;

        let next = match (self, event) {
            // Operator override and terminal state absorb check results.
            (Keep, RemoteNewer | RemoteUnchanged | RemoteArchived) => Keep,
            (Outdated, RemoteNewer | RemoteUnchanged | RemoteArchived) => Outdated,

            (_, RemoteArchived) => Outdated,
            (_, RemoteNewer) => UpdateAvailable,
            // Stuck or failed records are retried on the next pass.
            (Updating | UpdateFailed, RemoteUnchanged) => UpdateAvailable,
            (status, RemoteUnchanged) => status,

            (Keep, PassStarted { .. }) => return Err(self.invalid(event)),
            (status, PassStarted { forced }) if forced || status.is_update_trigger() => Updating,

            (Updating, PassSucceeded) => UpToDate,
            (Updating, PassFailed) => UpdateFailed,

            _ => return Err(self.invalid(event)),
        };
        Ok(next)
    }

    fn invalid(self, event: StatusEvent) -> StatusError {
        StatusError::InvalidTransition { from: self, event }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
