//! YAML-backed profile store
//!
//! Profiles are stored in `~/.config/par-connect/profiles.yaml`

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use super::store::{MemoryStore, ProfileStore};
use super::types::{Profile, ProfileId};
use crate::error::StoreError;

/// Get the default profiles file path
pub fn profiles_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("par-connect")
        .join("profiles.yaml")
}

/// Load profiles from a specific file.
///
/// A missing or empty file yields an empty list; a file that exists but
/// cannot be parsed is an error.
pub fn load_profiles_from(path: &Path) -> Result<Vec<Profile>> {
    if !path.exists() {
        log::info!("no profiles file at {path:?}, starting empty");
        return Ok(Vec::new());
    }

    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read profiles from {path:?}"))?;

    if contents.trim().is_empty() {
        return Ok(Vec::new());
    }

    let profiles: Vec<Profile> = serde_yaml::from_str(&contents)
        .with_context(|| format!("Failed to parse profiles from {path:?}"))?;

    log::info!("loaded {} profiles from {path:?}", profiles.len());
    Ok(profiles)
}

/// Save profiles to a specific file, creating parent directories as needed
pub fn save_profiles_to(profiles: &[Profile], path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config directory {parent:?}"))?;
    }

    let contents =
        serde_yaml::to_string(profiles).context("Failed to serialize profiles")?;

    std::fs::write(path, contents)
        .with_context(|| format!("Failed to write profiles to {path:?}"))?;

    log::info!("saved {} profiles to {path:?}", profiles.len());
    Ok(())
}

/// [`ProfileStore`] backed by a YAML file.
///
/// Records live in memory between flushes; `save_all` validates and writes
/// the whole file, so a failed flush leaves the file as it was. Id
/// assignment continues from the highest id found on disk.
#[derive(Debug)]
pub struct YamlStore {
    path: PathBuf,
    inner: MemoryStore,
}

impl YamlStore {
    /// Open (or start) the store at the given path
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let profiles =
            load_profiles_from(&path).map_err(|e| StoreError::Io(format!("{e:#}")))?;
        Ok(Self {
            path,
            inner: MemoryStore::with_profiles(profiles),
        })
    }

    /// Open the store at the default profiles path
    pub fn open_default() -> Result<Self, StoreError> {
        Self::open(profiles_path())
    }

    /// The file this store flushes to
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ProfileStore for YamlStore {
    fn all(&self) -> Vec<Profile> {
        self.inner.all()
    }

    fn find_by_id(&self, id: ProfileId) -> Option<Profile> {
        self.inner.find_by_id(id)
    }

    fn insert(&mut self, profile: Profile) -> Result<Profile, StoreError> {
        self.inner.insert(profile)
    }

    fn update(&mut self, profile: &Profile) -> Result<(), StoreError> {
        self.inner.update(profile)
    }

    fn delete(&mut self, id: ProfileId) -> Result<(), StoreError> {
        self.inner.delete(id)
    }

    fn save_all(&mut self) -> Result<(), StoreError> {
        self.inner.save_all()?;
        save_profiles_to(&self.inner.all(), &self.path)
            .map_err(|e| StoreError::Io(format!("{e:#}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_load_nonexistent_file() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("nonexistent.yaml");

        let profiles = load_profiles_from(&path).unwrap();
        assert!(profiles.is_empty());
    }

    #[test]
    fn test_load_empty_file() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("empty.yaml");
        std::fs::write(&path, "").unwrap();

        let profiles = load_profiles_from(&path).unwrap();
        assert!(profiles.is_empty());
    }

    #[test]
    fn test_load_corrupt_file_returns_error() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("corrupt.yaml");
        std::fs::write(&path, "not: valid: yaml: [[[").unwrap();

        assert!(load_profiles_from(&path).is_err());
    }

    #[test]
    fn test_save_creates_parent_directory() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("nested").join("dir").join("profiles.yaml");

        save_profiles_to(&[], &path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_store_roundtrip() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("profiles.yaml");

        let mut store = YamlStore::open(&path).unwrap();
        let bastion = store
            .insert(Profile::new_ssh("Bastion").host("bastion.example.com").port(2222))
            .unwrap();
        store
            .insert(
                Profile::new_rdp("Desktop")
                    .host("10.0.0.20")
                    .username("admin")
                    .required_connection(bastion.id.unwrap()),
            )
            .unwrap();
        store.save_all().unwrap();

        let reopened = YamlStore::open(&path).unwrap();
        assert_eq!(reopened.all().len(), 2);

        let desktop = reopened.find_by_id(2).unwrap();
        assert_eq!(desktop.name, "Desktop");
        assert_eq!(desktop.username.as_deref(), Some("admin"));
        assert_eq!(desktop.required_connection_id, bastion.id);

        // Id assignment continues past what is on disk
        let mut reopened = reopened;
        let next = reopened.insert(Profile::new_ssh("Third").host("t")).unwrap();
        assert_eq!(next.id, Some(3));
    }

    #[test]
    fn test_failed_validation_leaves_file_untouched() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("profiles.yaml");

        let mut store = YamlStore::open(&path).unwrap();
        store.insert(Profile::new_ssh("Ok").host("h")).unwrap();
        store.save_all().unwrap();
        let saved = std::fs::read_to_string(&path).unwrap();

        store.insert(Profile::new_ssh("").host("")).unwrap();
        assert!(store.save_all().is_err());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), saved);
    }
}
