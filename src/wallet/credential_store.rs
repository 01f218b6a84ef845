// src/wallet/credential_store.rs
//! Credential storage for the wallet.
//!
//! Provides a thread-safe in-memory store holding the durable record of
//! every credential and its computed scores. The dashboard and statistics
//! views read from here; the ingestion pipeline is the only writer.
//!
//! # Concurrency
//! Each credential sits behind its own mutex. `update` takes that mutex,
//! runs the mutator on a copy and commits the copy only when the mutator
//! succeeds, so concurrent vote and note edits on one id are serialized
//! and a failed mutator leaves the previous complete record in place.
//! Mutators on different ids never wait for each other.

use crate::error::{Result, WalletError};
use crate::models::classification::FraudStatus;
use crate::models::credential::Credential;
use crate::models::trust_score::PeerVotes;
use log::{debug, info};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

/// Selection criteria for [`CredentialStore::list`].
///
/// An empty filter matches every credential.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CredentialFilter {
    pub status: Option<FraudStatus>,
    pub selected: Option<bool>,
    pub issuer: Option<String>,
}

impl CredentialFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn with_status(status: FraudStatus) -> Self {
        CredentialFilter {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn selected() -> Self {
        CredentialFilter {
            selected: Some(true),
            ..Self::default()
        }
    }

    pub fn matches(&self, credential: &Credential) -> bool {
        self.status.map_or(true, |s| credential.status() == s)
            && self.selected.map_or(true, |s| credential.selected == s)
            && self
                .issuer
                .as_deref()
                .map_or(true, |i| credential.issuer().eq_ignore_ascii_case(i))
    }
}

#[derive(Default)]
struct StoreInner {
    /// Insertion order of ids
    order: Vec<String>,
    records: HashMap<String, Arc<Mutex<Credential>>>,
}

/// Store of credentials keyed by id.
///
/// `list` returns credentials in insertion order; callers sort as they
/// need.
#[derive(Default)]
pub struct CredentialStore {
    inner: RwLock<StoreInner>,
}

impl CredentialStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding `credentials`, in the given order.
    pub fn from_credentials(credentials: Vec<Credential>) -> Self {
        let store = Self::new();
        for credential in credentials {
            store.put(credential);
        }
        store
    }

    /// Stores a credential under its id.
    ///
    /// # Returns
    /// The record previously stored under the same id, if any. A replaced
    /// record keeps its position in insertion order.
    pub fn put(&self, credential: Credential) -> Option<Credential> {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let id = credential.id.clone();

        if let Some(slot) = inner.records.get(&id) {
            let mut current = slot.lock().unwrap_or_else(PoisonError::into_inner);
            debug!("replacing credential {}", id);
            return Some(std::mem::replace(&mut *current, credential));
        }

        debug!("storing credential {}", id);
        inner.order.push(id.clone());
        inner.records.insert(id, Arc::new(Mutex::new(credential)));
        None
    }

    /// Returns a copy of the credential stored under `id`.
    ///
    /// # Errors
    /// `NotFound` when no credential has that id.
    pub fn get(&self, id: &str) -> Result<Credential> {
        let slot = self.slot(id)?;
        let credential = slot.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(credential.clone())
    }

    /// Applies `mutator` to the credential under `id` atomically.
    ///
    /// Returns whatever the mutator returns.
    pub fn update<F, R>(&self, id: &str, mutator: F) -> Result<R>
    where
        F: FnOnce(&mut Credential) -> R,
    {
        self.try_update(id, |credential| Ok(mutator(credential)))
    }

    /// Like [`update`](Self::update) but the mutator may refuse the change.
    ///
    /// # Errors
    /// - `NotFound` when no credential has that id
    /// - whatever the mutator returns; the stored record is then unchanged
    /// - `Rejected` when the mutator tried to change the credential id
    pub fn try_update<F, R>(&self, id: &str, mutator: F) -> Result<R>
    where
        F: FnOnce(&mut Credential) -> Result<R>,
    {
        let slot = self.slot(id)?;
        let mut current = slot.lock().unwrap_or_else(PoisonError::into_inner);

        let mut draft = current.clone();
        let outcome = mutator(&mut draft)?;
        if draft.id != current.id {
            return Err(WalletError::Rejected(format!(
                "credential id {} is immutable",
                current.id
            )));
        }

        *current = draft;
        Ok(outcome)
    }

    /// Returns copies of all credentials matching `filter`, in insertion
    /// order.
    pub fn list(&self, filter: &CredentialFilter) -> Vec<Credential> {
        let slots: Vec<Arc<Mutex<Credential>>> = {
            let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
            inner
                .order
                .iter()
                .filter_map(|id| inner.records.get(id).cloned())
                .collect()
        };

        slots
            .iter()
            .map(|slot| slot.lock().unwrap_or_else(PoisonError::into_inner).clone())
            .filter(|credential| filter.matches(credential))
            .collect()
    }

    /// Ids of all stored credentials, in insertion order.
    pub fn ids(&self) -> Vec<String> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .order
            .clone()
    }

    /// Returns the number of stored credentials.
    pub fn count(&self) -> usize {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .records
            .len()
    }

    /// Checks if a credential with the specified id exists.
    pub fn contains(&self, id: &str) -> bool {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .records
            .contains_key(id)
    }

    /// Explicitly removes a credential.
    ///
    /// # Errors
    /// `NotFound` when no credential has that id.
    pub fn remove(&self, id: &str) -> Result<Credential> {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let slot = inner
            .records
            .remove(id)
            .ok_or_else(|| WalletError::NotFound(id.to_string()))?;
        inner.order.retain(|existing| existing != id);

        info!("removed credential {}", id);
        let credential = slot.lock().unwrap_or_else(PoisonError::into_inner).clone();
        Ok(credential)
    }

    /// Peer vote tallies last scored for each credential.
    ///
    /// Used to seed a vote ledger when the store is restored from a
    /// snapshot, so rescoring starts from the persisted votes.
    pub fn vote_tallies(&self) -> HashMap<String, PeerVotes> {
        self.list(&CredentialFilter::all())
            .into_iter()
            .map(|credential| (credential.id, credential.trust_score.peer_votes))
            .collect()
    }

    fn slot(&self, id: &str) -> Result<Arc<Mutex<Credential>>> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .records
            .get(id)
            .cloned()
            .ok_or_else(|| WalletError::NotFound(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::credential::fixtures;
    use std::thread;

    fn create_test_credential(id: &str) -> Credential {
        fixtures::credential(id)
    }

    #[test]
    fn test_contains_credential() {
        let store = CredentialStore::new();
        let credential_id = "education-degree-123";

        assert!(!store.contains(credential_id));

        store.put(create_test_credential(credential_id));
        assert!(store.contains(credential_id));
    }

    #[test]
    fn test_remove_credential() {
        let store = CredentialStore::new();
        let credential_id = "temporary-access-pass";

        store.put(create_test_credential(credential_id));

        assert_eq!(store.remove(credential_id).unwrap().id, credential_id);
        assert!(!store.contains(credential_id));
        assert_eq!(store.count(), 0);

        assert!(matches!(
            store.remove("non-existent-id"),
            Err(WalletError::NotFound(_))
        ));
    }

    #[test]
    fn test_count_after_operations() {
        let store = CredentialStore::new();

        store.put(create_test_credential("id1"));
        store.put(create_test_credential("id2"));
        assert_eq!(store.count(), 2);

        store.remove("id1").unwrap();
        assert_eq!(store.count(), 1);

        // Same id replaces the record
        assert!(store.put(create_test_credential("id2")).is_some());
        assert_eq!(store.count(), 1);
    }

    #[test]
    fn test_get_after_remove() {
        let store = CredentialStore::new();
        let credential_id = "membership-card";

        store.put(create_test_credential(credential_id));
        store.remove(credential_id).unwrap();

        assert!(matches!(store.get(credential_id), Err(WalletError::NotFound(_))));
    }

    #[test]
    fn test_list_keeps_insertion_order_and_filters() {
        let store = CredentialStore::new();
        for id in ["c", "a", "b"] {
            store.put(create_test_credential(id));
        }
        store
            .update("a", |c| {
                c.classification.status = FraudStatus::Suspicious;
                c.selected = true;
            })
            .unwrap();

        let ids: Vec<String> = store.list(&CredentialFilter::all()).into_iter().map(|c| c.id).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);

        let valid = store.list(&CredentialFilter::with_status(FraudStatus::Valid));
        assert_eq!(valid.len(), 2);
        let suspicious = store.list(&CredentialFilter::with_status(FraudStatus::Suspicious));
        assert_eq!(suspicious.len(), 1);
        assert_eq!(suspicious[0].id, "a");
        assert_eq!(store.list(&CredentialFilter::selected()).len(), 1);
    }

    #[test]
    fn test_replaced_record_keeps_position() {
        let store = CredentialStore::new();
        store.put(create_test_credential("first"));
        store.put(create_test_credential("second"));

        let mut replacement = create_test_credential("first");
        replacement.notes = Some("re-uploaded".to_string());
        store.put(replacement);

        assert_eq!(store.ids(), vec!["first", "second"]);
        assert_eq!(store.get("first").unwrap().notes.as_deref(), Some("re-uploaded"));
    }

    #[test]
    fn test_failed_mutator_keeps_previous_record() {
        let store = CredentialStore::new();
        store.put(create_test_credential("cred-1"));

        let result: Result<()> = store.try_update("cred-1", |c| {
            c.notes = Some("half-written".to_string());
            Err(WalletError::Rejected("validation failed".to_string()))
        });

        assert!(result.is_err());
        assert!(store.get("cred-1").unwrap().notes.is_none());
    }

    #[test]
    fn test_id_is_immutable() {
        let store = CredentialStore::new();
        store.put(create_test_credential("cred-1"));

        let result = store.update("cred-1", |c| c.id = "cred-2".to_string());
        assert!(matches!(result, Err(WalletError::Rejected(_))));
        assert!(store.contains("cred-1"));
        assert!(!store.contains("cred-2"));
    }

    #[test]
    fn test_vote_tallies_follow_stored_scores() {
        let store = CredentialStore::new();
        store.put(create_test_credential("cred-1"));
        store.put(create_test_credential("cred-2"));
        store
            .update("cred-2", |credential| {
                credential.trust_score.peer_votes = PeerVotes::new(3, 7)
            })
            .unwrap();

        let tallies = store.vote_tallies();
        assert_eq!(tallies.len(), 2);
        assert_eq!(tallies["cred-1"], PeerVotes::new(20, 2));
        assert_eq!(tallies["cred-2"], PeerVotes::new(3, 7));
    }

    #[test]
    fn test_update_missing_id() {
        let store = CredentialStore::new();
        assert!(matches!(
            store.update("ghost", |c| c.selected = true),
            Err(WalletError::NotFound(_))
        ));
    }

    #[test]
    fn test_concurrent_updates_on_same_id_are_not_lost() {
        let store = Arc::new(CredentialStore::new());
        store.put(create_test_credential("cred-1"));

        let voters: Vec<_> = (0..8)
            .map(|_| {
                let store = store.clone();
                thread::spawn(move || {
                    for _ in 0..100 {
                        store
                            .update("cred-1", |c| {
                                c.trust_score.peer_votes.upvotes += 1;
                            })
                            .unwrap();
                    }
                })
            })
            .collect();

        let editor = {
            let store = store.clone();
            thread::spawn(move || {
                store
                    .update("cred-1", |c| c.notes = Some("verified by registrar".to_string()))
                    .unwrap();
            })
        };

        for handle in voters {
            handle.join().unwrap();
        }
        editor.join().unwrap();

        let credential = store.get("cred-1").unwrap();
        assert_eq!(credential.trust_score.peer_votes.upvotes, 20 + 800);
        assert_eq!(credential.notes.as_deref(), Some("verified by registrar"));
    }
}
