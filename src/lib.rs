// Library exports for the CLI binary, integration tests, and embedding hosts
//
// # Ownership model
//
// The profile core keeps three ownership domains strictly apart:
//
//   - `ProfileStore` implementations own the canonical persisted records.
//   - `EditBuffer` owns its deep-cloned working copies until commit; no
//     instance is ever shared by mutable reference with a store.
//   - `SharedProfilesView` hands out immutable snapshots to read-only
//     consumers (prerequisite pickers, other sessions' list surfaces).
//
// Cross-references between profiles are storage ids, never pointers, so
// cloning and diffing stay plain value operations. Every operation takes
// the collection or store it works on as an argument; there is no global
// "current collection".

/// Application version (for display in CLI output and logs).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod cli;
pub mod connector;
pub mod debug;
pub mod error;
pub mod profile;

pub use connector::{Endpoint, ExternalProgramDefinition, LaunchStep, resolve_launch_plan};
pub use error::{ChainError, CommitError, FieldViolation, LaunchError, StoreError};
pub use profile::{
    BufferState, ConnectionKind, ConnectionSettings, EditBuffer, MemoryStore, Profile,
    ProfileCollection, ProfileId, ProfileKey, ProfileStore, RdpSettings, SharedProfilesView,
    SshAuthMethod, SshSettings, YamlStore, spawn_commit,
};
