//! Profile types and collection for remote connection configurations

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Storage identity of a persisted profile, assigned by the store on first
/// commit. A profile that has never been committed has no `ProfileId` yet.
pub type ProfileId = i64;

/// Runtime identity of a profile object.
///
/// Generated at construction and never persisted; this is how two
/// not-yet-committed profiles are told apart, and the handle that collection
/// and edit-buffer operations take. Deserialized profiles receive a fresh
/// key.
pub type ProfileKey = Uuid;

fn new_profile_key() -> ProfileKey {
    Uuid::new_v4()
}

/// Connection protocol kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionKind {
    /// Remote Desktop Protocol
    Rdp,
    /// Secure Shell
    Ssh,
}

impl ConnectionKind {
    /// Returns all variants of `ConnectionKind`
    pub fn variants() -> &'static [ConnectionKind] {
        &[ConnectionKind::Rdp, ConnectionKind::Ssh]
    }

    /// Returns a human-readable display name for this variant
    pub fn display_name(&self) -> &'static str {
        match self {
            ConnectionKind::Rdp => "RDP",
            ConnectionKind::Ssh => "SSH",
        }
    }

    /// The protocol's standard port, used when a profile leaves its port
    /// unset.
    pub fn default_port(&self) -> u16 {
        match self {
            ConnectionKind::Rdp => 3389,
            ConnectionKind::Ssh => 22,
        }
    }
}

/// How an SSH profile authenticates against the remote host
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SshAuthMethod {
    /// Password prompt at connect time
    #[default]
    Password,
    /// Public-key authentication using an identity file
    PublicKey,
}

/// RDP-specific settings payload
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RdpSettings {
    /// Open the session in full-screen mode
    #[serde(default)]
    pub full_screen: bool,

    /// Desktop width in pixels (if None, the client decides)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desktop_width: Option<u32>,

    /// Desktop height in pixels (if None, the client decides)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desktop_height: Option<u32>,

    /// Connect to the administrative (console) session
    #[serde(default)]
    pub admin: bool,
}

/// SSH-specific settings payload
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SshSettings {
    /// Authentication method for this host
    #[serde(default)]
    pub auth: SshAuthMethod,

    /// Identity file path for public-key authentication
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity_file: Option<String>,

    /// Extra arguments appended to the ssh command line
    /// (e.g., "-o StrictHostKeyChecking=no")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra_args: Option<String>,
}

/// Kind-discriminated settings payload for a profile.
///
/// A common core record plus a tagged payload, dispatched by pattern
/// matching; the `kind` tag doubles as the protocol discriminator in the
/// stored YAML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConnectionSettings {
    /// Remote Desktop settings
    Rdp(RdpSettings),
    /// Secure Shell settings
    Ssh(SshSettings),
}

impl ConnectionSettings {
    /// The protocol kind this payload belongs to
    pub fn kind(&self) -> ConnectionKind {
        match self {
            ConnectionSettings::Rdp(_) => ConnectionKind::Rdp,
            ConnectionSettings::Ssh(_) => ConnectionKind::Ssh,
        }
    }
}

/// A remote connection profile: addressing fields, kind-specific settings,
/// and at most one prerequisite reference to another profile that must be
/// connected first (the tunnel this profile rides through).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    /// Runtime identity; never persisted, fresh on deserialize
    #[serde(skip, default = "new_profile_key")]
    pub key: ProfileKey,

    /// Storage identity; None until the store assigns one at commit
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ProfileId>,

    /// Display name for the profile
    pub name: String,

    /// Hostname or IP address of the remote endpoint
    #[serde(default)]
    pub host: String,

    /// Port number (if None, the kind's standard port applies)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,

    /// Account name used to authenticate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    /// Display order in the profile list
    #[serde(default)]
    pub order: usize,

    /// Storage id of the profile that must be connected before this one.
    /// None means the profile connects directly.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_connection_id: Option<ProfileId>,

    /// Kind-specific settings payload
    pub settings: ConnectionSettings,
}

impl Profile {
    /// Create a new RDP profile with the given name
    pub fn new_rdp(name: impl Into<String>) -> Self {
        Self::new(name, ConnectionSettings::Rdp(RdpSettings::default()))
    }

    /// Create a new SSH profile with the given name
    pub fn new_ssh(name: impl Into<String>) -> Self {
        Self::new(name, ConnectionSettings::Ssh(SshSettings::default()))
    }

    /// Create a new profile with the given name and settings payload
    pub fn new(name: impl Into<String>, settings: ConnectionSettings) -> Self {
        Self {
            key: new_profile_key(),
            id: None,
            name: name.into(),
            host: String::new(),
            port: None,
            username: None,
            order: 0,
            required_connection_id: None,
            settings,
        }
    }

    /// Builder method to set the remote host
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Builder method to set the port
    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Builder method to set the username
    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Builder method to set the display order
    pub fn order(mut self, order: usize) -> Self {
        self.order = order;
        self
    }

    /// Builder method to set the prerequisite connection id
    pub fn required_connection(mut self, id: ProfileId) -> Self {
        self.required_connection_id = Some(id);
        self
    }

    /// Builder method to replace the settings payload
    pub fn settings(mut self, settings: ConnectionSettings) -> Self {
        self.settings = settings;
        self
    }

    /// The protocol kind of this profile
    pub fn kind(&self) -> ConnectionKind {
        self.settings.kind()
    }

    /// Whether the store has assigned this profile an identity yet
    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    /// The port to actually connect to: the configured port, or the kind's
    /// standard port when unset.
    pub fn effective_port(&self) -> u16 {
        self.port.unwrap_or_else(|| self.kind().default_port())
    }

    /// Get the display label (kind + name)
    pub fn display_label(&self) -> String {
        format!("[{}] {}", self.kind().display_name(), self.name)
    }

    /// New-from-template clone for quick duplication: every settings field is
    /// copied, but the duplicate gets a fresh runtime key and no storage id,
    /// so the store treats it as a brand-new profile at the next commit.
    ///
    /// The plain `Clone` impl is the edit-buffer clone: it copies `id` and
    /// `key` so the copy can later be reconciled against the original record.
    pub fn duplicate(&self) -> Self {
        let mut copy = self.clone();
        copy.key = new_profile_key();
        copy.id = None;
        copy
    }

    /// Validate the profile's own fields.
    ///
    /// Returns field-level violations; an empty vector means the profile is
    /// acceptable to the store.
    pub fn validate(&self) -> Vec<crate::error::FieldViolation> {
        let mut violations = Vec::new();
        let violation = |field: &str, message: String| crate::error::FieldViolation {
            profile: self.name.clone(),
            field: field.to_string(),
            message,
        };

        if self.name.trim().is_empty() {
            violations.push(violation("name", "profile name is empty".to_string()));
        }
        if self.host.trim().is_empty() {
            violations.push(violation("host", "host is empty".to_string()));
        }
        if self.port == Some(0) {
            violations.push(violation("port", "port 0 is not connectable".to_string()));
        }
        if let Some(required) = self.required_connection_id
            && self.id == Some(required)
        {
            violations.push(violation(
                "required_connection_id",
                "profile cannot require itself".to_string(),
            ));
        }
        violations
    }
}

/// Ordered collection of profiles.
///
/// Persisted members carry unique storage ids; members that have not been
/// committed yet are distinguished only by their runtime key. All lookups
/// and reordering operations work on runtime keys, so they behave
/// identically for both.
#[derive(Debug, Clone, Default)]
pub struct ProfileCollection {
    /// All profiles indexed by runtime key
    profiles: HashMap<ProfileKey, Profile>,

    /// Ordered list of profile keys for display
    order: Vec<ProfileKey>,
}

impl ProfileCollection {
    /// Create a new empty collection
    pub fn new() -> Self {
        Self {
            profiles: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Create a collection from a list of profiles, sorted by their
    /// persisted `order` field
    pub fn from_profiles(profiles: Vec<Profile>) -> Self {
        let mut collection = Self::new();
        for profile in profiles {
            collection.add(profile);
        }
        collection.sort_by_order();
        collection
    }

    /// Add a profile to the collection, returning its runtime key
    pub fn add(&mut self, profile: Profile) -> ProfileKey {
        let key = profile.key;
        if !self.order.contains(&key) {
            self.order.push(key);
        }
        self.profiles.insert(key, profile);
        key
    }

    /// Get a profile by runtime key
    pub fn get(&self, key: ProfileKey) -> Option<&Profile> {
        self.profiles.get(&key)
    }

    /// Get a mutable reference to a profile by runtime key
    pub fn get_mut(&mut self, key: ProfileKey) -> Option<&mut Profile> {
        self.profiles.get_mut(&key)
    }

    /// Look up a persisted profile by storage id.
    ///
    /// Takes the first match in display order. A store bug could hand us
    /// duplicate ids; the first-resolved record wins deterministically and
    /// the anomaly is flagged, never repaired here.
    pub fn get_by_id(&self, id: ProfileId) -> Option<&Profile> {
        let mut matches = self
            .profiles_ordered()
            .into_iter()
            .filter(|p| p.id == Some(id));
        let first = matches.next();
        if matches.next().is_some() {
            log::warn!("duplicate profile id {id} in collection; using first in display order");
        }
        first
    }

    /// Remove a profile by runtime key
    pub fn remove(&mut self, key: ProfileKey) -> Option<Profile> {
        self.order.retain(|k| *k != key);
        self.profiles.remove(&key)
    }

    /// Get all profiles in display order
    pub fn profiles_ordered(&self) -> Vec<&Profile> {
        self.order
            .iter()
            .filter_map(|key| self.profiles.get(key))
            .collect()
    }

    /// Get all profiles as a vector (for serialization)
    pub fn to_vec(&self) -> Vec<Profile> {
        self.profiles_ordered().into_iter().cloned().collect()
    }

    /// Get the number of profiles
    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    /// Check if there are no profiles
    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    /// Get an iterator over all profile keys in display order
    pub fn keys(&self) -> impl Iterator<Item = &ProfileKey> {
        self.order.iter()
    }

    /// Move a profile earlier in the order (towards index 0)
    pub fn move_up(&mut self, key: ProfileKey) {
        if let Some(pos) = self.order.iter().position(|k| *k == key)
            && pos > 0
        {
            self.order.swap(pos, pos - 1);
            self.update_orders();
        }
    }

    /// Move a profile later in the order (towards the end)
    pub fn move_down(&mut self, key: ProfileKey) {
        if let Some(pos) = self.order.iter().position(|k| *k == key)
            && pos < self.order.len() - 1
        {
            self.order.swap(pos, pos + 1);
            self.update_orders();
        }
    }

    /// Sort profiles by their persisted order field
    fn sort_by_order(&mut self) {
        self.order
            .sort_by_key(|key| self.profiles.get(key).map(|p| p.order).unwrap_or(usize::MAX));
    }

    /// Update the order field of all profiles to match their position
    pub(crate) fn update_orders(&mut self) {
        for (i, key) in self.order.iter().enumerate() {
            if let Some(profile) = self.profiles.get_mut(key) {
                profile.order = i;
            }
        }
    }

    /// Find a profile by name (case-insensitive)
    pub fn find_by_name(&self, name: &str) -> Option<&Profile> {
        let lower = name.to_lowercase();
        self.profiles
            .values()
            .find(|p| p.name.to_lowercase() == lower)
    }

    /// Get all profiles of a given kind, in display order
    pub fn of_kind(&self, kind: ConnectionKind) -> Vec<&Profile> {
        self.profiles_ordered()
            .into_iter()
            .filter(|p| p.kind() == kind)
            .collect()
    }
}
