//! Staged editing of a profile collection.
//!
//! An [`EditBuffer`] holds a detached, deep-cloned working copy of the
//! persisted collection. Callers mutate the buffer freely (add, edit,
//! remove, reorder); nothing touches the store until [`EditBuffer::commit`]
//! reconciles the working set against it: pending deletions first, then one
//! insert or rewrite-in-place per surviving profile, then a single
//! `save_all` flush.
//!
//! The buffer belongs to exactly one editing session at a time. There is no
//! internal locking; run `commit` off the interactive thread through
//! [`spawn_commit`] if it may block on storage I/O.

use crate::error::CommitError;
use crate::profile::store::ProfileStore;
use crate::profile::types::{Profile, ProfileCollection, ProfileId, ProfileKey};

/// Lifecycle state of an edit buffer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BufferState {
    /// No working set; `load` has not been called (or `discard` was)
    #[default]
    Empty,
    /// A working set is loaded and may be mutated
    Editing,
}

/// Detached working copy of a profile collection plus the set of persisted
/// profiles removed from it since the last load.
#[derive(Debug, Default)]
pub struct EditBuffer {
    working: ProfileCollection,
    pending_deletions: Vec<ProfileId>,
    state: BufferState,
}

impl EditBuffer {
    /// Create an empty, unloaded buffer
    pub fn new() -> Self {
        Self::default()
    }

    /// Current lifecycle state
    pub fn state(&self) -> BufferState {
        self.state
    }

    /// Load the buffer from a store snapshot.
    ///
    /// Deep-clones every stored profile into the working set and clears any
    /// pending deletions from a previous session.
    pub fn load(&mut self, store: &dyn ProfileStore) {
        self.working = ProfileCollection::from_profiles(store.all());
        self.pending_deletions.clear();
        self.state = BufferState::Editing;
        log::info!("edit buffer loaded with {} profiles", self.working.len());
    }

    /// Read access to the working collection
    pub fn working(&self) -> &ProfileCollection {
        &self.working
    }

    /// Mutable access to the working collection, for field edits and
    /// prerequisite assignment.
    ///
    /// Additions and removals must go through [`add`](Self::add) and
    /// [`remove`](Self::remove) so deletion staging stays correct.
    pub fn working_mut(&mut self) -> &mut ProfileCollection {
        &mut self.working
    }

    /// Ids staged for deletion at the next commit
    pub fn pending_deletions(&self) -> &[ProfileId] {
        &self.pending_deletions
    }

    /// Append a profile to the working set. The store is not touched.
    pub fn add(&mut self, profile: Profile) -> ProfileKey {
        self.state = BufferState::Editing;
        self.working.add(profile)
    }

    /// Remove a profile from the working set.
    ///
    /// If the profile was already persisted its id is staged for deletion at
    /// commit; a buffer-local addition is simply dropped.
    pub fn remove(&mut self, key: ProfileKey) -> Option<Profile> {
        let removed = self.working.remove(key)?;
        if let Some(id) = removed.id
            && !self.pending_deletions.contains(&id)
        {
            log::debug!("staged deletion of '{}' (id {id})", removed.name);
            self.pending_deletions.push(id);
        }
        Some(removed)
    }

    /// Drop the working set and pending deletions without committing
    pub fn discard(&mut self) {
        self.working = ProfileCollection::new();
        self.pending_deletions.clear();
        self.state = BufferState::Empty;
        log::info!("edit buffer discarded");
    }

    /// Reconcile the buffer against the store.
    ///
    /// Issues one delete per pending deletion whose id still exists, then
    /// walks the working set in display order: profiles without a stored
    /// counterpart are inserted (the assigned id is written back into the
    /// working copy), existing records are rewritten in place. A single
    /// `save_all` makes the batch durable.
    ///
    /// On success the buffer is refreshed from the store's final state and
    /// the final collection is returned, so callers can republish any cached
    /// read-only views with the real ids.
    ///
    /// # Errors
    ///
    /// [`CommitError::Validation`] carries the store's field-level messages
    /// verbatim. On any error the buffer keeps its contents for retry or
    /// discard, but the store may have absorbed part of the batch: re-`load`
    /// before retrying.
    pub fn commit(&mut self, store: &mut dyn ProfileStore) -> Result<ProfileCollection, CommitError> {
        if self.state == BufferState::Empty {
            return Err(CommitError::BufferNotLoaded);
        }
        log::info!(
            "committing edit buffer: {} profiles, {} staged deletions",
            self.working.len(),
            self.pending_deletions.len()
        );

        for &id in &self.pending_deletions {
            if store.find_by_id(id).is_some() {
                store.delete(id)?;
            }
        }

        // Persist the display order along with the field edits
        self.working.update_orders();

        let keys: Vec<ProfileKey> = self.working.keys().copied().collect();
        for key in keys {
            let profile = self
                .working
                .get(key)
                .expect("key enumerated from the working set")
                .clone();
            let stored = profile.id.and_then(|id| store.find_by_id(id));
            match stored {
                None => {
                    let persisted = store.insert(profile)?;
                    if let Some(working) = self.working.get_mut(key) {
                        working.id = persisted.id;
                    }
                }
                Some(_) => store.update(&profile)?,
            }
        }

        store.save_all()?;

        self.pending_deletions.clear();
        let committed = ProfileCollection::from_profiles(store.all());
        self.working = committed.clone();
        log::info!("commit complete: {} profiles persisted", committed.len());
        Ok(committed)
    }
}

/// Run a commit to completion on the blocking thread pool.
///
/// Takes the buffer and store by value so the interactive thread is free
/// while the commit runs; both are handed back with the result. Once
/// started the commit runs to completion or failure, there is no partial
/// cancellation.
pub fn spawn_commit<S>(
    mut buffer: EditBuffer,
    mut store: S,
) -> tokio::task::JoinHandle<(EditBuffer, S, Result<ProfileCollection, CommitError>)>
where
    S: ProfileStore + Send + 'static,
{
    tokio::task::spawn_blocking(move || {
        let result = buffer.commit(&mut store);
        (buffer, store, result)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::store::{MemoryStore, StoreOp};
    use crate::profile::types::Profile;

    fn seeded_store() -> MemoryStore {
        let mut store = MemoryStore::new();
        store
            .insert(Profile::new_ssh("Bastion").host("bastion.example.com"))
            .unwrap();
        store
            .insert(
                Profile::new_rdp("Desktop")
                    .host("10.0.0.20")
                    .required_connection(1),
            )
            .unwrap();
        store.clear_journal();
        store
    }

    #[test]
    fn test_load_deep_clones() {
        let store = seeded_store();
        let mut buffer = EditBuffer::new();
        buffer.load(&store);
        assert_eq!(buffer.state(), BufferState::Editing);

        // Mutating the buffer leaves the store untouched
        let key = *buffer.working().keys().next().unwrap();
        buffer.working_mut().get_mut(key).unwrap().name = "Renamed".to_string();
        assert!(store.all().iter().all(|p| p.name != "Renamed"));
        assert!(store.journal().is_empty());
    }

    #[test]
    fn test_commit_unloaded_buffer_is_rejected() {
        let mut store = MemoryStore::new();
        let mut buffer = EditBuffer::new();
        assert!(matches!(
            buffer.commit(&mut store),
            Err(CommitError::BufferNotLoaded)
        ));
    }

    #[test]
    fn test_noop_commit_changes_nothing() {
        let mut store = seeded_store();
        let before = store.all();

        let mut buffer = EditBuffer::new();
        buffer.load(&store);
        buffer.commit(&mut store).unwrap();

        let after = store.all();
        assert_eq!(before.len(), after.len());
        for (b, a) in before.iter().zip(after.iter()) {
            assert_eq!(b.id, a.id);
            assert_eq!(b.name, a.name);
            assert_eq!(b.host, a.host);
            assert_eq!(b.required_connection_id, a.required_connection_id);
            assert_eq!(b.order, a.order);
        }
        // No inserts, no deletes: just rewrites and the flush
        assert_eq!(store.count_ops(|op| matches!(op, StoreOp::Insert(_))), 0);
        assert_eq!(store.count_ops(|op| matches!(op, StoreOp::Delete(_))), 0);
    }

    #[test]
    fn test_commit_inserts_new_profiles_and_assigns_ids() {
        let mut store = seeded_store();
        let mut buffer = EditBuffer::new();
        buffer.load(&store);

        let key = buffer.add(Profile::new_ssh("New Jump").host("jump.example.com"));
        assert!(buffer.working().get(key).unwrap().id.is_none());

        let committed = buffer.commit(&mut store).unwrap();
        assert_eq!(committed.len(), 3);
        let inserted = committed.find_by_name("New Jump").unwrap();
        assert_eq!(inserted.id, Some(3));
        // The working copy learned its real id too
        assert!(buffer
            .working()
            .profiles_ordered()
            .iter()
            .any(|p| p.name == "New Jump" && p.id == Some(3)));
    }

    #[test]
    fn test_commit_rewrites_edited_profiles() {
        let mut store = seeded_store();
        let mut buffer = EditBuffer::new();
        buffer.load(&store);

        let key = buffer
            .working()
            .profiles_ordered()
            .iter()
            .find(|p| p.name == "Desktop")
            .unwrap()
            .key;
        buffer.working_mut().get_mut(key).unwrap().username = Some("admin".to_string());
        buffer.commit(&mut store).unwrap();

        assert_eq!(
            store.find_by_id(2).unwrap().username.as_deref(),
            Some("admin")
        );
        assert_eq!(store.count_ops(|op| matches!(op, StoreOp::Insert(_))), 0);
    }

    #[test]
    fn test_removing_buffer_local_addition_issues_no_delete() {
        let mut store = seeded_store();
        let mut buffer = EditBuffer::new();
        buffer.load(&store);

        let key = buffer.add(Profile::new_ssh("Draft").host("d"));
        buffer.remove(key);
        assert!(buffer.pending_deletions().is_empty());

        buffer.commit(&mut store).unwrap();
        assert_eq!(store.count_ops(|op| matches!(op, StoreOp::Delete(_))), 0);
        assert_eq!(store.all().len(), 2);
    }

    #[test]
    fn test_removing_persisted_profile_issues_exactly_one_delete() {
        let mut store = seeded_store();
        let mut buffer = EditBuffer::new();
        buffer.load(&store);

        let key = buffer
            .working()
            .profiles_ordered()
            .iter()
            .find(|p| p.name == "Desktop")
            .unwrap()
            .key;
        buffer.remove(key);
        assert_eq!(buffer.pending_deletions(), &[2]);

        buffer.commit(&mut store).unwrap();
        assert_eq!(store.count_ops(|op| matches!(op, StoreOp::Delete(2))), 1);
        assert_eq!(store.count_ops(|op| matches!(op, StoreOp::Update(2))), 0);
        assert_eq!(store.count_ops(|op| matches!(op, StoreOp::Insert(_))), 0);
        assert!(store.find_by_id(2).is_none());
    }

    #[test]
    fn test_reorder_is_persisted() {
        let mut store = seeded_store();
        let mut buffer = EditBuffer::new();
        buffer.load(&store);

        let desktop_key = buffer
            .working()
            .profiles_ordered()
            .iter()
            .find(|p| p.name == "Desktop")
            .unwrap()
            .key;
        buffer.working_mut().move_up(desktop_key);
        buffer.commit(&mut store).unwrap();

        let stored = ProfileCollection::from_profiles(store.all());
        let names: Vec<_> = stored
            .profiles_ordered()
            .into_iter()
            .map(|p| p.name.clone())
            .collect();
        assert_eq!(names, vec!["Desktop", "Bastion"]);
    }

    #[test]
    fn test_validation_failure_surfaces_field_messages() {
        let mut store = seeded_store();
        let mut buffer = EditBuffer::new();
        buffer.load(&store);
        buffer.add(Profile::new_ssh("").host(""));

        match buffer.commit(&mut store) {
            Err(CommitError::Validation(violations)) => {
                assert!(violations.iter().any(|v| v.field == "name"));
                assert!(violations.iter().any(|v| v.field == "host"));
            }
            other => panic!("expected Validation, got {other:?}"),
        }
        // Buffer contents survive for retry or discard
        assert_eq!(buffer.working().len(), 3);
    }

    #[test]
    fn test_discard_empties_buffer() {
        let store = seeded_store();
        let mut buffer = EditBuffer::new();
        buffer.load(&store);
        buffer.discard();

        assert_eq!(buffer.state(), BufferState::Empty);
        assert!(buffer.working().is_empty());
        assert!(buffer.pending_deletions().is_empty());
    }

    #[tokio::test]
    async fn test_spawn_commit_runs_to_completion() {
        let mut store = seeded_store();
        let mut buffer = EditBuffer::new();
        buffer.load(&store);
        buffer.add(Profile::new_ssh("Async").host("a"));

        let (buffer, store, result) = spawn_commit(buffer, store).await.unwrap();
        let committed = result.unwrap();
        assert_eq!(committed.len(), 3);
        assert!(store.find_by_id(3).is_some());
        assert_eq!(buffer.working().len(), 3);
    }
}
