// src/services/directory.rs
//! External collaborators consulted during scoring.
//!
//! The engine never performs I/O itself: issuer reputation and vote
//! tallies are resolved through these traits before a score is computed.
//! The in-memory implementations here back the binary and the tests; a
//! deployment can plug in a registry or ledger service behind the same
//! traits.

use crate::config::DirectorySettings;
use crate::models::trust_score::{PeerVotes, Vote};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError, RwLock};

/// Source of issuer reputation.
pub trait IssuerDirectory: Send + Sync {
    /// Reputation of `issuer`. Unknown issuers get a low-trust default,
    /// never an error.
    fn reputation_of(&self, issuer: &str) -> i64;

    /// Whether the directory has an entry for `issuer`.
    fn is_known(&self, issuer: &str) -> bool;
}

/// Source of current peer vote tallies.
pub trait VoteLedger: Send + Sync {
    fn votes_for(&self, credential_id: &str) -> PeerVotes;

    /// Appends one vote and returns the updated tallies.
    fn record(&self, credential_id: &str, vote: Vote) -> PeerVotes;

    /// Drops everything held for a credential that left the wallet and
    /// returns its last tallies.
    fn forget(&self, credential_id: &str) -> PeerVotes;
}

/// Issuer directory backed by a fixed table.
///
/// Issuer names are matched case-insensitively with surrounding
/// whitespace ignored.
pub struct StaticIssuerDirectory {
    issuers: HashMap<String, i64>,
    default_reputation: i64,
}

impl StaticIssuerDirectory {
    pub fn new(default_reputation: i64) -> Self {
        StaticIssuerDirectory {
            issuers: HashMap::new(),
            default_reputation,
        }
    }

    pub fn from_settings(settings: &DirectorySettings) -> Self {
        let mut directory = Self::new(settings.default_reputation);
        for (issuer, reputation) in &settings.issuers {
            directory.insert(issuer, *reputation);
        }
        directory
    }

    pub fn insert(&mut self, issuer: &str, reputation: i64) {
        self.issuers.insert(normalize(issuer), reputation);
    }

    pub fn len(&self) -> usize {
        self.issuers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.issuers.is_empty()
    }
}

impl IssuerDirectory for StaticIssuerDirectory {
    fn reputation_of(&self, issuer: &str) -> i64 {
        match self.issuers.get(&normalize(issuer)) {
            Some(reputation) => *reputation,
            None => {
                debug!("issuer {:?} unknown, using default reputation", issuer);
                self.default_reputation
            }
        }
    }

    fn is_known(&self, issuer: &str) -> bool {
        self.issuers.contains_key(&normalize(issuer))
    }
}

fn normalize(issuer: &str) -> String {
    issuer.trim().to_lowercase()
}

/// One entry of the vote log.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct VoteEvent {
    pub credential_id: String,
    pub vote: Vote,
}

/// Append-only vote ledger held in memory.
///
/// Keeps the full event log next to running tallies so `votes_for` does
/// not replay the log.
#[derive(Default)]
pub struct InMemoryVoteLedger {
    events: Mutex<Vec<VoteEvent>>,
    tallies: RwLock<HashMap<String, PeerVotes>>,
}

impl InMemoryVoteLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ledger starting from known tallies, e.g. imported from elsewhere.
    pub fn with_tallies(tallies: HashMap<String, PeerVotes>) -> Self {
        InMemoryVoteLedger {
            events: Mutex::new(Vec::new()),
            tallies: RwLock::new(tallies),
        }
    }

    /// Events recorded since this ledger was created, oldest first.
    pub fn events(&self) -> Vec<VoteEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl VoteLedger for InMemoryVoteLedger {
    fn votes_for(&self, credential_id: &str) -> PeerVotes {
        self.tallies
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(credential_id)
            .copied()
            .unwrap_or_default()
    }

    fn record(&self, credential_id: &str, vote: Vote) -> PeerVotes {
        let mut tallies = self.tallies.write().unwrap_or_else(PoisonError::into_inner);
        let entry = tallies.entry(credential_id.to_string()).or_default();
        match vote {
            Vote::Upvote => entry.upvotes = entry.upvotes.saturating_add(1),
            Vote::Downvote => entry.downvotes = entry.downvotes.saturating_add(1),
        }
        let updated = *entry;

        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(VoteEvent {
                credential_id: credential_id.to_string(),
                vote,
            });
        updated
    }

    fn forget(&self, credential_id: &str) -> PeerVotes {
        let last = self
            .tallies
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(credential_id)
            .unwrap_or_default();
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|event| event.credential_id != credential_id);
        debug!("dropped votes for {}", credential_id);
        last
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_unknown_issuer_gets_default() {
        let mut directory = StaticIssuerDirectory::new(10);
        directory.insert("Stanford University", 45);

        assert_eq!(directory.reputation_of("  stanford university "), 45);
        assert!(directory.is_known("STANFORD UNIVERSITY"));
        assert_eq!(directory.reputation_of("Diploma Mill Inc."), 10);
        assert!(!directory.is_known("Diploma Mill Inc."));
    }

    #[test]
    fn test_directory_from_default_settings() {
        let directory = StaticIssuerDirectory::from_settings(&DirectorySettings::default());
        assert!(!directory.is_empty());
        assert_eq!(directory.reputation_of("Amazon Web Services"), 40);
    }

    #[test]
    fn test_ledger_tallies_and_log() {
        let ledger = InMemoryVoteLedger::new();
        assert_eq!(ledger.votes_for("cred-1"), PeerVotes::default());

        ledger.record("cred-1", Vote::Upvote);
        ledger.record("cred-1", Vote::Upvote);
        let tallies = ledger.record("cred-1", Vote::Downvote);

        assert_eq!(tallies, PeerVotes::new(2, 1));
        assert_eq!(ledger.votes_for("cred-1"), PeerVotes::new(2, 1));
        assert_eq!(ledger.events().len(), 3);
        assert_eq!(ledger.votes_for("cred-2"), PeerVotes::default());
    }

    #[test]
    fn test_ledger_resumes_from_imported_tallies() {
        let mut tallies = HashMap::new();
        tallies.insert("cred-1".to_string(), PeerVotes::new(10, 4));
        let ledger = InMemoryVoteLedger::with_tallies(tallies);

        assert_eq!(ledger.record("cred-1", Vote::Downvote), PeerVotes::new(10, 5));
        assert_eq!(ledger.events().len(), 1);
    }

    #[test]
    fn test_forget_prunes_one_credential() {
        let ledger = InMemoryVoteLedger::new();
        ledger.record("cred-1", Vote::Upvote);
        ledger.record("cred-2", Vote::Downvote);
        ledger.record("cred-1", Vote::Upvote);

        assert_eq!(ledger.forget("cred-1"), PeerVotes::new(2, 0));
        assert_eq!(ledger.votes_for("cred-1"), PeerVotes::default());
        assert_eq!(ledger.votes_for("cred-2"), PeerVotes::new(0, 1));
        assert_eq!(
            ledger.events(),
            vec![VoteEvent {
                credential_id: "cred-2".to_string(),
                vote: Vote::Downvote,
            }]
        );
        assert_eq!(ledger.forget("cred-1"), PeerVotes::default());
    }

    #[test]
    fn test_concurrent_votes_are_all_counted() {
        let ledger = Arc::new(InMemoryVoteLedger::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let ledger = ledger.clone();
                thread::spawn(move || {
                    for _ in 0..50 {
                        ledger.record("cred-1", Vote::Upvote);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(ledger.votes_for("cred-1").upvotes, 400);
        assert_eq!(ledger.events().len(), 400);
    }
}
