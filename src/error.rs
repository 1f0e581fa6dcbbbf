//! Typed error types for par-connect.
//!
//! This module provides structured error types so callers at the crate boundary
//! can match on specific error variants instead of relying on opaque `anyhow`
//! strings.

use thiserror::Error;

use crate::profile::types::ProfileId;

/// A single field-level validation failure reported by the persistence store.
///
/// Carried verbatim (field + message) so an editing surface can highlight the
/// offending field rather than showing a summarized error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldViolation {
    /// Display name of the profile the violation belongs to.
    pub profile: String,
    /// Field identifier, e.g. `name` or `port`.
    pub field: String,
    /// Human-readable description of the violation.
    pub message: String,
}

impl std::fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}: {}", self.profile, self.field, self.message)
    }
}

/// Errors produced while resolving or editing the prerequisite graph.
#[derive(Debug, Error)]
pub enum ChainError {
    // -----------------------------------------------------------------------
    // Resolution (connect-time)
    // -----------------------------------------------------------------------
    /// A prerequisite chain revisited a profile. The data is corrupt; the
    /// chain is unusable until the reference is fixed.
    #[error("dependency cycle detected while resolving '{profile}' (repeated id {id})")]
    CycleDetected {
        /// Profile whose prerequisite closed the cycle.
        profile: String,
        /// The id that was reached a second time.
        id: ProfileId,
    },

    /// A `required_connection_id` points at a profile that no longer exists
    /// in the collection.
    #[error("broken prerequisite reference: '{profile}' requires id {missing}, which does not exist")]
    BrokenReference {
        /// Profile holding the dangling reference.
        profile: String,
        /// The id that failed to resolve.
        missing: ProfileId,
    },

    /// The profile the operation started from is not in the collection.
    #[error("profile not found in collection")]
    UnknownProfile,

    // -----------------------------------------------------------------------
    // Assignment (edit-time)
    // -----------------------------------------------------------------------
    /// A profile cannot be its own prerequisite.
    #[error("'{profile}' cannot require itself")]
    SelfReference {
        /// Profile the assignment was attempted on.
        profile: String,
    },

    /// The requested prerequisite id does not resolve to any profile.
    #[error("prerequisite target id {id} does not exist")]
    UnknownTarget {
        /// The id that failed to resolve.
        id: ProfileId,
    },

    /// The requested prerequisite is not a tunnel-capable (SSH) profile.
    #[error("'{target}' cannot be used as a prerequisite: only SSH profiles can carry a tunnel")]
    IncompatibleKind {
        /// Display name of the rejected target.
        target: String,
    },

    /// Assigning the requested prerequisite would close a dependency cycle,
    /// because the target already depends (transitively) on the profile
    /// being edited.
    #[error("assigning '{target}' as prerequisite of '{profile}' would create a cycle")]
    WouldCreateCycle {
        /// Profile the assignment was attempted on.
        profile: String,
        /// Display name of the rejected target.
        target: String,
    },
}

/// Errors reported by a [`ProfileStore`](crate::profile::store::ProfileStore)
/// implementation.
#[derive(Debug, Error)]
pub enum StoreError {
    /// One or more records failed field validation when the store tried to
    /// flush. All violations are aggregated so the caller can surface every
    /// offending field at once.
    #[error("validation failed for {} field(s)", .0.len())]
    Validation(Vec<FieldViolation>),

    /// An update or delete referenced an id the store does not hold.
    #[error("no stored profile with id {id}")]
    MissingRecord {
        /// The id that was not found.
        id: ProfileId,
    },

    /// The backing medium could not be read or written.
    #[error("profile store I/O error: {0}")]
    Io(String),

    /// The backing file could not be parsed or the records could not be
    /// serialized.
    #[error("profile store serialization error: {0}")]
    Serialize(String),
}

/// Errors reported by [`EditBuffer::commit`](crate::profile::buffer::EditBuffer::commit).
///
/// After any commit error the persisted store must be treated as
/// indeterminate: the synchronizer does not roll back partial writes, so the
/// caller should re-load before retrying. The buffer itself is left
/// unchanged.
#[derive(Debug, Error)]
pub enum CommitError {
    /// The store rejected the flush with field-level validation messages.
    #[error("commit rejected by store validation ({} violation(s))", .0.len())]
    Validation(Vec<FieldViolation>),

    /// Any other persistence failure (I/O, constraint violation, ...).
    #[error("commit failed: {0}")]
    Store(#[source] StoreError),

    /// `commit` was called on a buffer that was never loaded.
    #[error("edit buffer has not been loaded from a store")]
    BufferNotLoaded,
}

impl From<StoreError> for CommitError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Validation(violations) => CommitError::Validation(violations),
            other => CommitError::Store(other),
        }
    }
}

/// Errors produced while preparing a connection hand-off for the external
/// connector program.
#[derive(Debug, Error)]
pub enum LaunchError {
    /// The prerequisite chain could not be resolved; connecting is refused
    /// until the profile graph is repaired.
    #[error(transparent)]
    Chain(#[from] ChainError),

    /// No profile with the requested id exists in the collection.
    #[error("no profile with id {id}")]
    UnknownProfile {
        /// The id the launch was requested for.
        id: ProfileId,
    },

    /// An `.rdp` artifact was requested for a profile that is not RDP-kind.
    #[error("'{profile}' is not an RDP profile")]
    NotAnRdpProfile {
        /// Display name of the offending profile.
        profile: String,
    },

    /// SSH command arguments were requested for a profile that is not
    /// SSH-kind.
    #[error("'{profile}' is not an SSH profile")]
    NotAnSshProfile {
        /// Display name of the offending profile.
        profile: String,
    },
}
