//! # Remote-party store.
//!
//! Read-mostly registry of roaming partners. Records are held as
//! `Arc<RemoteParty>` snapshots: readers clone the `Arc` and never observe
//! a half-mutated record, and a writer holds the map lock only for the
//! single-entry swap — the mutation itself happens on a private copy
//! outside the lock (copy-on-write).
//!
//! ## Rules
//! - Inbound authentication matches a presented token against the union
//!   of all parties' local tokens; **two distinct parties sharing a token
//!   is a configuration error** and is reported, never resolved silently.
//! - Deletion is logical: the record transitions to `Deleted` and stays
//!   resident; no hard delete exists.
//! - Every successful mutation restamps `last_updated` and the etag.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::PartyError;
use crate::parties::{PartyRef, PartyStatus, RemoteParty};

/// Authoritative in-memory registry of remote parties.
#[derive(Default)]
pub struct PartyStore {
    parties: RwLock<HashMap<PartyRef, Arc<RemoteParty>>>,
}

impl PartyStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<PartyRef, Arc<RemoteParty>>> {
        self.parties.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<PartyRef, Arc<RemoteParty>>> {
        self.parties.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Onboards a new party. Fails with [`PartyError::DuplicateParty`] if
    /// the identity is already registered.
    pub fn insert(&self, party: RemoteParty) -> Result<Arc<RemoteParty>, PartyError> {
        let mut parties = self.write();
        if parties.contains_key(&party.id) {
            return Err(PartyError::DuplicateParty {
                id: party.id.clone(),
            });
        }
        let record = Arc::new(party);
        parties.insert(record.id.clone(), Arc::clone(&record));
        Ok(record)
    }

    /// Returns the current snapshot of a party.
    pub fn get(&self, id: &PartyRef) -> Option<Arc<RemoteParty>> {
        self.read().get(id).cloned()
    }

    /// Authenticates an inbound access token against all parties.
    ///
    /// At most one party may accept the token; a second match is
    /// [`PartyError::AmbiguousToken`]. No match is `Ok(None)` — the HTTP
    /// layer decides how to reject the request.
    pub fn lookup_by_token(&self, token: &str) -> Result<Option<Arc<RemoteParty>>, PartyError> {
        let parties = self.read();
        let mut found: Option<Arc<RemoteParty>> = None;
        for party in parties.values() {
            if !party.accepts_token(token) {
                continue;
            }
            if let Some(first) = &found {
                return Err(PartyError::AmbiguousToken {
                    first: first.id.clone(),
                    second: party.id.clone(),
                });
            }
            found = Some(Arc::clone(party));
        }
        Ok(found)
    }

    /// Applies a mutation to a party's private copy, restamps it, and
    /// swaps it in. Readers holding the previous snapshot are unaffected.
    pub fn update(
        &self,
        id: &PartyRef,
        apply: impl FnOnce(&mut RemoteParty),
    ) -> Result<Arc<RemoteParty>, PartyError> {
        let current = self.get(id).ok_or_else(|| PartyError::UnknownParty {
            id: id.clone(),
        })?;

        let mut next = (*current).clone();
        apply(&mut next);
        next.restamp();

        let record = Arc::new(next);
        self.write().insert(id.clone(), Arc::clone(&record));
        Ok(record)
    }

    /// Logically deletes a party: status transition to `Deleted`,
    /// restamped. The record stays resident.
    pub fn mark_deleted(&self, id: &PartyRef) -> Result<Arc<RemoteParty>, PartyError> {
        self.update(id, |party| party.status = PartyStatus::Deleted)
    }

    /// Number of resident records, including logically deleted ones.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Whether the store holds no records at all.
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Snapshot of all resident records, sorted by identity.
    pub fn snapshot(&self) -> Vec<Arc<RemoteParty>> {
        let mut records: Vec<Arc<RemoteParty>> = self.read().values().cloned().collect();
        records.sort_unstable_by(|a, b| a.id.cmp(&b.id));
        records
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::OcpiVersion;
    use crate::parties::{LocalAccessInfo, PartyRole, RemoteAccessInfo};

    fn party(country: &str, id: &str, token: &str) -> RemoteParty {
        RemoteParty::new(
            PartyRef::new(country, id, PartyRole::Cpo),
            vec![LocalAccessInfo::new(token)],
            vec![RemoteAccessInfo::new(
                format!("out-{token}"),
                "https://partner.example/ocpi/versions",
                OcpiVersion::V2_2_1,
            )],
        )
        .with_status(PartyStatus::Active)
    }

    #[test]
    fn test_insert_rejects_duplicate_identity() {
        let store = PartyStore::new();
        store.insert(party("DE", "GEF", "t1")).unwrap();

        let again = store.insert(party("DE", "GEF", "t2"));
        assert!(matches!(again, Err(PartyError::DuplicateParty { .. })));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_token_lookup_finds_the_single_owner() {
        let store = PartyStore::new();
        store.insert(party("DE", "GEF", "alpha")).unwrap();
        store.insert(party("NL", "ABC", "beta")).unwrap();

        let hit = store.lookup_by_token("beta").unwrap().unwrap();
        assert_eq!(hit.id, PartyRef::new("NL", "ABC", PartyRole::Cpo));

        assert!(store.lookup_by_token("gamma").unwrap().is_none());
    }

    #[test]
    fn test_shared_token_is_reported_as_ambiguous() {
        let store = PartyStore::new();
        store.insert(party("DE", "GEF", "shared")).unwrap();
        store.insert(party("NL", "ABC", "shared")).unwrap();

        let res = store.lookup_by_token("shared");
        assert!(matches!(res, Err(PartyError::AmbiguousToken { .. })));
    }

    #[test]
    fn test_deleted_party_no_longer_authenticates() {
        let store = PartyStore::new();
        let id = PartyRef::new("DE", "GEF", PartyRole::Cpo);
        store.insert(party("DE", "GEF", "t1")).unwrap();

        store.mark_deleted(&id).unwrap();

        // logically deleted: still resident, but the token no longer matches
        assert!(store.get(&id).is_some());
        assert_eq!(store.get(&id).map(|p| p.status), Some(PartyStatus::Deleted));
        assert!(store.lookup_by_token("t1").unwrap().is_none());
    }

    #[test]
    fn test_update_restamps_and_preserves_old_snapshots() {
        let store = PartyStore::new();
        let id = PartyRef::new("DE", "GEF", PartyRole::Cpo);
        let before = store.insert(party("DE", "GEF", "t1")).unwrap();
        let old_etag = before.etag().clone();

        let after = store
            .update(&id, |p| p.status = PartyStatus::Suspended)
            .unwrap();

        assert_ne!(after.etag(), &old_etag);
        assert!(after.last_updated() >= before.last_updated());
        // the snapshot taken before the update still shows the old state
        assert_eq!(before.status, PartyStatus::Active);
        assert_eq!(after.status, PartyStatus::Suspended);
    }

    #[test]
    fn test_update_unknown_party_fails() {
        let store = PartyStore::new();
        let id = PartyRef::new("FR", "XYZ", PartyRole::Hub);
        let res = store.update(&id, |p| p.status = PartyStatus::Active);
        assert!(matches!(res, Err(PartyError::UnknownParty { .. })));
    }
}
