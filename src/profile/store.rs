//! Persistence gateway contract and the in-memory store used by tests.
//!
//! The core never talks to a storage engine directly; everything goes
//! through [`ProfileStore`]. Implementations own the canonical records and
//! their transactional semantics. `save_all` is the flush point: per-record
//! `insert`/`update`/`delete` calls stage changes, `save_all` validates and
//! makes them durable in one unit.

use crate::error::{FieldViolation, StoreError};
use crate::profile::types::{Profile, ProfileId};

/// Narrow persistence contract the synchronizer commits through.
pub trait ProfileStore {
    /// All stored profiles, in insertion order.
    fn all(&self) -> Vec<Profile>;

    /// Look up a stored profile by its assigned id.
    fn find_by_id(&self, id: ProfileId) -> Option<Profile>;

    /// Stage a new record and assign it an id. Returns the record as
    /// persisted, id included.
    fn insert(&mut self, profile: Profile) -> Result<Profile, StoreError>;

    /// Overwrite the mutable fields of an existing record by id.
    fn update(&mut self, profile: &Profile) -> Result<(), StoreError>;

    /// Stage removal of the record with the given id.
    fn delete(&mut self, id: ProfileId) -> Result<(), StoreError>;

    /// Validate and flush all staged changes as one unit.
    fn save_all(&mut self) -> Result<(), StoreError>;
}

/// One recorded gateway call, for asserting minimal-write behavior in tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreOp {
    /// An insert that assigned the given id
    Insert(ProfileId),
    /// An update of the given id
    Update(ProfileId),
    /// A delete of the given id
    Delete(ProfileId),
    /// A `save_all` flush
    SaveAll,
}

/// In-memory [`ProfileStore`] implementation.
///
/// Serves as the test double for the synchronizer and as the backing state
/// for the file store. Ids are assigned sequentially at insert; `save_all`
/// runs field validation over every record and aggregates all violations.
/// Every mutating call is appended to a journal so tests can assert exactly
/// which writes a commit issued.
#[derive(Debug)]
pub struct MemoryStore {
    records: Vec<Profile>,
    next_id: ProfileId,
    journal: Vec<StoreOp>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
            next_id: 1,
            journal: Vec::new(),
        }
    }

    /// Create a store seeded with the given profiles. Records without an id
    /// are assigned one, as if they had been committed earlier.
    pub fn with_profiles(profiles: Vec<Profile>) -> Self {
        let mut store = Self::new();
        store.next_id = profiles
            .iter()
            .filter_map(|p| p.id)
            .max()
            .unwrap_or(0)
            + 1;
        for mut profile in profiles {
            if profile.id.is_none() {
                profile.id = Some(store.next_id);
                store.next_id += 1;
            }
            store.records.push(profile);
        }
        store
    }

    /// The calls issued against this store so far
    pub fn journal(&self) -> &[StoreOp] {
        &self.journal
    }

    /// Forget the recorded calls (e.g., after seeding)
    pub fn clear_journal(&mut self) {
        self.journal.clear();
    }

    /// Number of journal entries matching a predicate
    pub fn count_ops(&self, predicate: impl Fn(&StoreOp) -> bool) -> usize {
        self.journal.iter().filter(|op| predicate(op)).count()
    }

    fn validate_records(&self) -> Vec<FieldViolation> {
        self.records
            .iter()
            .flat_map(|record| record.validate())
            .collect()
    }
}

impl ProfileStore for MemoryStore {
    fn all(&self) -> Vec<Profile> {
        self.records.clone()
    }

    fn find_by_id(&self, id: ProfileId) -> Option<Profile> {
        self.records.iter().find(|p| p.id == Some(id)).cloned()
    }

    fn insert(&mut self, mut profile: Profile) -> Result<Profile, StoreError> {
        let id = self.next_id;
        self.next_id += 1;
        profile.id = Some(id);
        self.records.push(profile.clone());
        self.journal.push(StoreOp::Insert(id));
        log::debug!("store: inserted '{}' as id {id}", profile.name);
        Ok(profile)
    }

    fn update(&mut self, profile: &Profile) -> Result<(), StoreError> {
        let Some(id) = profile.id else {
            return Err(StoreError::MissingRecord { id: 0 });
        };
        let Some(record) = self.records.iter_mut().find(|p| p.id == Some(id)) else {
            return Err(StoreError::MissingRecord { id });
        };
        // Rewrite in place: the stored record keeps its identity, the
        // mutable fields come from the caller's copy
        let mut replacement = profile.clone();
        replacement.id = Some(id);
        *record = replacement;
        self.journal.push(StoreOp::Update(id));
        Ok(())
    }

    fn delete(&mut self, id: ProfileId) -> Result<(), StoreError> {
        let before = self.records.len();
        self.records.retain(|p| p.id != Some(id));
        if self.records.len() == before {
            return Err(StoreError::MissingRecord { id });
        }
        self.journal.push(StoreOp::Delete(id));
        log::debug!("store: deleted id {id}");
        Ok(())
    }

    fn save_all(&mut self) -> Result<(), StoreError> {
        self.journal.push(StoreOp::SaveAll);
        let violations = self.validate_records();
        if violations.is_empty() {
            Ok(())
        } else {
            Err(StoreError::Validation(violations))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::types::Profile;

    #[test]
    fn test_insert_assigns_sequential_ids() {
        let mut store = MemoryStore::new();
        let a = store.insert(Profile::new_ssh("A").host("a")).unwrap();
        let b = store.insert(Profile::new_ssh("B").host("b")).unwrap();

        assert_eq!(a.id, Some(1));
        assert_eq!(b.id, Some(2));
        assert_eq!(store.all().len(), 2);
    }

    #[test]
    fn test_with_profiles_continues_id_sequence() {
        let mut seeded = Profile::new_ssh("Seeded").host("s");
        seeded.id = Some(10);
        let mut store = MemoryStore::with_profiles(vec![seeded, Profile::new_ssh("New").host("n")]);

        // The un-id'd seed got 11; the next insert continues from there
        assert!(store.find_by_id(11).is_some());
        let inserted = store.insert(Profile::new_ssh("C").host("c")).unwrap();
        assert_eq!(inserted.id, Some(12));
    }

    #[test]
    fn test_update_rewrites_in_place() {
        let mut store = MemoryStore::new();
        let persisted = store.insert(Profile::new_ssh("Old").host("old")).unwrap();

        let mut edited = persisted.clone();
        edited.name = "New".to_string();
        store.update(&edited).unwrap();

        let stored = store.find_by_id(persisted.id.unwrap()).unwrap();
        assert_eq!(stored.name, "New");
        assert_eq!(store.all().len(), 1);
    }

    #[test]
    fn test_update_missing_record() {
        let mut store = MemoryStore::new();
        let mut ghost = Profile::new_ssh("Ghost").host("g");
        ghost.id = Some(5);

        assert!(matches!(
            store.update(&ghost),
            Err(StoreError::MissingRecord { id: 5 })
        ));
    }

    #[test]
    fn test_delete() {
        let mut store = MemoryStore::new();
        let persisted = store.insert(Profile::new_ssh("Doomed").host("d")).unwrap();
        store.delete(persisted.id.unwrap()).unwrap();

        assert!(store.all().is_empty());
        assert!(matches!(
            store.delete(99),
            Err(StoreError::MissingRecord { id: 99 })
        ));
    }

    #[test]
    fn test_save_all_aggregates_violations() {
        let mut store = MemoryStore::new();
        store.insert(Profile::new_ssh("").host("")).unwrap();
        store.insert(Profile::new_ssh("Ok").host("h")).unwrap();

        match store.save_all() {
            Err(StoreError::Validation(violations)) => {
                // Both offending fields of the first record are reported
                assert_eq!(violations.len(), 2);
                assert!(violations.iter().any(|v| v.field == "name"));
                assert!(violations.iter().any(|v| v.field == "host"));
            }
            other => panic!("expected Validation, got {other:?}"),
        }
    }

    #[test]
    fn test_journal_records_calls() {
        let mut store = MemoryStore::new();
        let p = store.insert(Profile::new_ssh("P").host("h")).unwrap();
        store.update(&p).unwrap();
        store.delete(p.id.unwrap()).unwrap();
        store.save_all().unwrap();

        assert_eq!(
            store.journal(),
            &[
                StoreOp::Insert(1),
                StoreOp::Update(1),
                StoreOp::Delete(1),
                StoreOp::SaveAll,
            ]
        );
    }
}
