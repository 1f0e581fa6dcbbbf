//! Profile management for remote connection configurations
//!
//! This module is the data core of par-connect:
//! - Typed connection profiles (RDP, SSH) with a common addressing record
//!   and a kind-discriminated settings payload
//! - Prerequisite chains: a profile may require another profile (its jump
//!   host) to be connected first, and chains are resolved and validated here
//! - Staged editing: a detached [`EditBuffer`] working copy that reconciles
//!   against a [`ProfileStore`] on commit
//!
//! Profiles are stored in `~/.config/par-connect/profiles.yaml` by default.

pub mod buffer;
pub mod chain;
pub mod storage;
pub mod store;
pub mod types;
pub mod view;

pub use buffer::{BufferState, EditBuffer, spawn_commit};
pub use storage::{YamlStore, load_profiles_from, profiles_path, save_profiles_to};
pub use store::{MemoryStore, ProfileStore, StoreOp};
pub use types::{
    ConnectionKind, ConnectionSettings, Profile, ProfileCollection, ProfileId, ProfileKey,
    RdpSettings, SshAuthMethod, SshSettings,
};
pub use view::SharedProfilesView;
