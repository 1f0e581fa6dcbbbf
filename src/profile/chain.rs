//! Prerequisite-chain resolution over a profile collection.
//!
//! A profile may declare at most one prerequisite (the tunnel it rides
//! through), so every chain is a single linear path. Resolution walks
//! `required_connection_id` links with a visited set, failing on cycles and
//! dangling references instead of repairing them. Cycle creation is also
//! rejected at edit time, before a bad reference can ever be committed;
//! the connect-time checks remain as a guard against corrupt stores.
//!
//! Back-references ("which profiles require this one?") are recomputed on
//! demand rather than stored, so the data model itself stays cycle-free.

use std::collections::HashSet;

use crate::error::ChainError;
use crate::profile::types::{ConnectionKind, Profile, ProfileCollection, ProfileId, ProfileKey};

impl ProfileCollection {
    /// Resolve the full prerequisite chain for a profile, from the outermost
    /// prerequisite down to the profile itself.
    ///
    /// # Errors
    ///
    /// - [`ChainError::UnknownProfile`] if `key` is not in the collection.
    /// - [`ChainError::CycleDetected`] if the walk revisits a profile.
    /// - [`ChainError::BrokenReference`] if a link points at an id that does
    ///   not resolve.
    pub fn chain(&self, key: ProfileKey) -> Result<Vec<&Profile>, ChainError> {
        let target = self.get(key).ok_or(ChainError::UnknownProfile)?;

        let mut chain = vec![target];
        let mut visited: Vec<ProfileId> = target.id.into_iter().collect();
        let mut current = target;

        while let Some(required) = current.required_connection_id {
            if visited.contains(&required) {
                return Err(ChainError::CycleDetected {
                    profile: current.name.clone(),
                    id: required,
                });
            }
            let Some(next) = self.get_by_id(required) else {
                return Err(ChainError::BrokenReference {
                    profile: current.name.clone(),
                    missing: required,
                });
            };
            visited.push(required);
            chain.push(next);
            current = next;
        }

        chain.reverse();
        Ok(chain)
    }

    /// Profiles that directly require the given persisted profile.
    pub fn dependents_of(&self, id: ProfileId) -> Vec<&Profile> {
        self.profiles_ordered()
            .into_iter()
            .filter(|p| p.required_connection_id == Some(id))
            .collect()
    }

    /// Runtime keys of every profile that directly or transitively requires
    /// the given profile.
    ///
    /// An unpersisted profile has no id other profiles could reference, so
    /// its descendant set is empty.
    pub fn descendant_keys(&self, key: ProfileKey) -> HashSet<ProfileKey> {
        let mut descendants = HashSet::new();
        let Some(root_id) = self.get(key).and_then(|p| p.id) else {
            return descendants;
        };

        let mut frontier = vec![root_id];
        while let Some(id) = frontier.pop() {
            for dependent in self.dependents_of(id) {
                if descendants.insert(dependent.key)
                    && let Some(dependent_id) = dependent.id
                {
                    frontier.push(dependent_id);
                }
            }
        }
        descendants
    }

    /// Profiles eligible to be assigned as the prerequisite of the profile
    /// identified by `excluding`.
    ///
    /// Safe choices only: the profile itself, everything that already
    /// depends on it (directly or transitively), and profiles that have no
    /// storage id yet are all silently excluded rather than reported as
    /// errors.
    pub fn available_targets(
        &self,
        kind: ConnectionKind,
        excluding: ProfileKey,
    ) -> Vec<&Profile> {
        let descendants = self.descendant_keys(excluding);
        self.profiles_ordered()
            .into_iter()
            .filter(|p| {
                p.kind() == kind
                    && p.key != excluding
                    && p.is_persisted()
                    && !descendants.contains(&p.key)
            })
            .collect()
    }

    /// Assign (or clear, with `None`) the prerequisite of a profile,
    /// rejecting assignments that could never resolve to a valid chain.
    ///
    /// # Errors
    ///
    /// - [`ChainError::UnknownProfile`] if `key` is not in the collection.
    /// - [`ChainError::UnknownTarget`] if the target id does not resolve.
    /// - [`ChainError::SelfReference`] if the target is the profile itself.
    /// - [`ChainError::IncompatibleKind`] if the target cannot carry a
    ///   tunnel (only SSH profiles can).
    /// - [`ChainError::WouldCreateCycle`] if the target already depends on
    ///   the profile being edited.
    pub fn assign_required_connection(
        &mut self,
        key: ProfileKey,
        target: Option<ProfileId>,
    ) -> Result<(), ChainError> {
        let profile = self.get(key).ok_or(ChainError::UnknownProfile)?;

        let Some(target_id) = target else {
            let name = profile.name.clone();
            self.get_mut(key)
                .expect("profile just resolved")
                .required_connection_id = None;
            log::debug!("cleared prerequisite of '{name}'");
            return Ok(());
        };

        if profile.id == Some(target_id) {
            return Err(ChainError::SelfReference {
                profile: profile.name.clone(),
            });
        }
        let target_profile = self
            .get_by_id(target_id)
            .ok_or(ChainError::UnknownTarget { id: target_id })?;
        if target_profile.key == key {
            return Err(ChainError::SelfReference {
                profile: profile.name.clone(),
            });
        }
        if target_profile.kind() != ConnectionKind::Ssh {
            return Err(ChainError::IncompatibleKind {
                target: target_profile.name.clone(),
            });
        }
        if self.descendant_keys(key).contains(&target_profile.key) {
            return Err(ChainError::WouldCreateCycle {
                profile: profile.name.clone(),
                target: target_profile.name.clone(),
            });
        }

        self.get_mut(key)
            .expect("profile just resolved")
            .required_connection_id = Some(target_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::types::Profile;

    /// Seed a collection with persisted profiles and return their keys.
    fn persisted(collection: &mut ProfileCollection, profile: Profile, id: ProfileId) -> ProfileKey {
        let mut profile = profile;
        profile.id = Some(id);
        collection.add(profile)
    }

    #[test]
    fn test_chain_without_prerequisite() {
        let mut collection = ProfileCollection::new();
        let key = persisted(&mut collection, Profile::new_rdp("Solo").host("h"), 1);

        let chain = collection.chain(key).unwrap();
        assert_eq!(chain.len(), 1);
        assert_eq!(chain[0].name, "Solo");
    }

    #[test]
    fn test_chain_ordering_outermost_first() {
        let mut collection = ProfileCollection::new();
        persisted(&mut collection, Profile::new_ssh("Bastion").host("b"), 1);
        persisted(
            &mut collection,
            Profile::new_ssh("Inner").host("i").required_connection(1),
            2,
        );
        let target = persisted(
            &mut collection,
            Profile::new_rdp("Desktop").host("d").required_connection(2),
            3,
        );

        let names: Vec<_> = collection
            .chain(target)
            .unwrap()
            .into_iter()
            .map(|p| p.name.as_str())
            .collect();
        assert_eq!(names, vec!["Bastion", "Inner", "Desktop"]);
    }

    #[test]
    fn test_chain_never_repeats_a_profile() {
        let mut collection = ProfileCollection::new();
        persisted(&mut collection, Profile::new_ssh("A").host("a"), 1);
        let b = persisted(
            &mut collection,
            Profile::new_ssh("B").host("b").required_connection(1),
            2,
        );

        let chain = collection.chain(b).unwrap();
        let mut ids: Vec<_> = chain.iter().map(|p| p.id).collect();
        ids.dedup();
        assert_eq!(ids.len(), chain.len());
    }

    #[test]
    fn test_chain_detects_cycle() {
        let mut collection = ProfileCollection::new();
        // Corrupt data: 1 -> 2 -> 1, written directly past the edit-time checks
        let a = persisted(
            &mut collection,
            Profile::new_ssh("A").host("a").required_connection(2),
            1,
        );
        persisted(
            &mut collection,
            Profile::new_ssh("B").host("b").required_connection(1),
            2,
        );

        assert!(matches!(
            collection.chain(a),
            Err(ChainError::CycleDetected { .. })
        ));
    }

    #[test]
    fn test_chain_detects_self_loop() {
        let mut collection = ProfileCollection::new();
        let a = persisted(
            &mut collection,
            Profile::new_ssh("A").host("a").required_connection(1),
            1,
        );

        assert!(matches!(
            collection.chain(a),
            Err(ChainError::CycleDetected { .. })
        ));
    }

    #[test]
    fn test_chain_broken_reference() {
        let mut collection = ProfileCollection::new();
        let key = persisted(
            &mut collection,
            Profile::new_rdp("Orphan").host("o").required_connection(99),
            1,
        );

        match collection.chain(key) {
            Err(ChainError::BrokenReference { profile, missing }) => {
                assert_eq!(profile, "Orphan");
                assert_eq!(missing, 99);
            }
            other => panic!("expected BrokenReference, got {other:?}"),
        }
    }

    #[test]
    fn test_dependents_and_descendants() {
        let mut collection = ProfileCollection::new();
        let bastion = persisted(&mut collection, Profile::new_ssh("Bastion").host("b"), 1);
        let inner = persisted(
            &mut collection,
            Profile::new_ssh("Inner").host("i").required_connection(1),
            2,
        );
        let desktop = persisted(
            &mut collection,
            Profile::new_rdp("Desktop").host("d").required_connection(2),
            3,
        );

        assert_eq!(collection.dependents_of(1).len(), 1);
        let descendants = collection.descendant_keys(bastion);
        assert!(descendants.contains(&inner));
        assert!(descendants.contains(&desktop));
        assert_eq!(descendants.len(), 2);
    }

    #[test]
    fn test_available_targets_excludes_self_and_descendants() {
        let mut collection = ProfileCollection::new();
        let bastion = persisted(&mut collection, Profile::new_ssh("Bastion").host("b"), 1);
        persisted(
            &mut collection,
            Profile::new_ssh("Inner").host("i").required_connection(1),
            2,
        );
        persisted(&mut collection, Profile::new_ssh("Other").host("o"), 3);

        let targets = collection.available_targets(ConnectionKind::Ssh, bastion);
        let names: Vec<_> = targets.iter().map(|p| p.name.as_str()).collect();
        // Not itself, not Inner (which already depends on it)
        assert_eq!(names, vec!["Other"]);
    }

    #[test]
    fn test_available_targets_excludes_unpersisted() {
        let mut collection = ProfileCollection::new();
        let editing = persisted(&mut collection, Profile::new_rdp("Desktop").host("d"), 1);
        collection.add(Profile::new_ssh("Draft").host("x"));
        persisted(&mut collection, Profile::new_ssh("Saved").host("s"), 2);

        let names: Vec<_> = collection
            .available_targets(ConnectionKind::Ssh, editing)
            .iter()
            .map(|p| p.name.as_str())
            .collect();
        assert_eq!(names, vec!["Saved"]);
    }

    #[test]
    fn test_assign_required_connection() {
        let mut collection = ProfileCollection::new();
        persisted(&mut collection, Profile::new_ssh("Bastion").host("b"), 1);
        let desktop = persisted(&mut collection, Profile::new_rdp("Desktop").host("d"), 2);

        collection.assign_required_connection(desktop, Some(1)).unwrap();
        assert_eq!(
            collection.get(desktop).unwrap().required_connection_id,
            Some(1)
        );

        collection.assign_required_connection(desktop, None).unwrap();
        assert!(collection.get(desktop).unwrap().required_connection_id.is_none());
    }

    #[test]
    fn test_assign_rejects_self_reference() {
        let mut collection = ProfileCollection::new();
        let bastion = persisted(&mut collection, Profile::new_ssh("Bastion").host("b"), 1);

        assert!(matches!(
            collection.assign_required_connection(bastion, Some(1)),
            Err(ChainError::SelfReference { .. })
        ));
    }

    #[test]
    fn test_assign_rejects_unknown_target() {
        let mut collection = ProfileCollection::new();
        let desktop = persisted(&mut collection, Profile::new_rdp("Desktop").host("d"), 1);

        assert!(matches!(
            collection.assign_required_connection(desktop, Some(404)),
            Err(ChainError::UnknownTarget { id: 404 })
        ));
    }

    #[test]
    fn test_assign_rejects_non_ssh_target() {
        let mut collection = ProfileCollection::new();
        persisted(&mut collection, Profile::new_rdp("Desktop A").host("a"), 1);
        let b = persisted(&mut collection, Profile::new_rdp("Desktop B").host("b"), 2);

        assert!(matches!(
            collection.assign_required_connection(b, Some(1)),
            Err(ChainError::IncompatibleKind { .. })
        ));
    }

    #[test]
    fn test_assign_rejects_descendant_target() {
        let mut collection = ProfileCollection::new();
        let bastion = persisted(&mut collection, Profile::new_ssh("Bastion").host("b"), 1);
        persisted(
            &mut collection,
            Profile::new_ssh("Inner").host("i").required_connection(1),
            2,
        );

        // Inner depends on Bastion; making Bastion require Inner would close
        // the loop
        assert!(matches!(
            collection.assign_required_connection(bastion, Some(2)),
            Err(ChainError::WouldCreateCycle { .. })
        ));
    }
}
