//! Shared read-only view of the persisted profile collection.
//!
//! Subsystems that only ever read the collection (prerequisite pickers,
//! list surfaces in other open sessions) hold a [`SharedProfilesView`] and
//! take cheap snapshots from it. After every successful commit the owner
//! republishes the final persisted collection, so freshly-inserted profiles
//! become selectable immediately, real ids included.

use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::profile::types::ProfileCollection;

/// Lock-free, shareable snapshot holder for a profile collection.
#[derive(Debug, Default)]
pub struct SharedProfilesView {
    inner: ArcSwap<ProfileCollection>,
}

impl SharedProfilesView {
    /// Create a view holding an empty collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a view seeded with an initial collection
    pub fn with_collection(collection: ProfileCollection) -> Self {
        Self {
            inner: ArcSwap::from_pointee(collection),
        }
    }

    /// Replace the published collection. Readers holding older snapshots are
    /// unaffected; new snapshots see the replacement.
    pub fn publish(&self, collection: ProfileCollection) {
        log::debug!("publishing profile view with {} profiles", collection.len());
        self.inner.store(Arc::new(collection));
    }

    /// Take a snapshot of the current collection
    pub fn snapshot(&self) -> Arc<ProfileCollection> {
        self.inner.load_full()
    }
}
