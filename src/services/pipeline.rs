// src/services/pipeline.rs
//! Credential ingestion pipeline.
//!
//! Wires the engine stages together:
//!
//! ```text
//! DocumentInput ─► EvidenceExtractor ─► AuthenticityClassifier
//!                                              │
//!              IssuerDirectory, VoteLedger ─► TrustScoreAggregator ─► CredentialStore
//! ```
//!
//! Classification and scoring are computed before anything is written,
//! and are written together, so a stored credential is always complete.
//! Every later mutation (votes, notes, re-evaluation) goes through
//! `CredentialStore::update` and is serialized per credential.

use crate::config::EngineConfig;
use crate::error::{Result, WalletError};
use crate::models::credential::Credential;
use crate::models::evidence::EvidenceRecord;
use crate::models::trust_score::{TrustScore, Vote};
use crate::services::classifier::AuthenticityClassifier;
use crate::services::directory::{IssuerDirectory, VoteLedger};
use crate::services::extractor::{DocumentInput, EvidenceExtractor};
use crate::services::trust::TrustScoreAggregator;
use crate::services::views::CredentialStats;
use crate::wallet::credential_store::{CredentialFilter, CredentialStore};
use chrono::NaiveDate;
use log::{debug, info, warn};
use std::sync::Arc;

/// Service running submitted credentials through extraction,
/// classification and scoring, and applying later changes to them.
///
/// Cloning is cheap: clones share the directory, ledger and store.
#[derive(Clone)]
pub struct CredentialPipeline {
    extractor: EvidenceExtractor,
    classifier: AuthenticityClassifier,
    aggregator: TrustScoreAggregator,
    directory: Arc<dyn IssuerDirectory>,
    ledger: Arc<dyn VoteLedger>,
    store: Arc<CredentialStore>,
}

impl CredentialPipeline {
    /// Creates a pipeline from configuration and its collaborators.
    ///
    /// # Arguments
    /// * `config` - Extractor, classifier and scoring settings
    /// * `directory` - Issuer reputation source
    /// * `ledger` - Peer vote source
    /// * `store` - Where credentials are kept
    pub fn new(
        config: &EngineConfig,
        directory: Arc<dyn IssuerDirectory>,
        ledger: Arc<dyn VoteLedger>,
        store: Arc<CredentialStore>,
    ) -> Self {
        CredentialPipeline {
            extractor: EvidenceExtractor::new(config.extractor.clone(), directory.clone()),
            classifier: AuthenticityClassifier::new(config.classifier.clone()),
            aggregator: TrustScoreAggregator::new(config.scoring.clone()),
            directory,
            ledger,
            store,
        }
    }

    pub fn store(&self) -> &Arc<CredentialStore> {
        &self.store
    }

    /// Extracts, classifies and scores one submission, then stores it.
    ///
    /// # Errors
    /// Extraction errors only; nothing is stored when extraction fails.
    pub fn ingest(&self, input: &DocumentInput, now: NaiveDate) -> Result<Credential> {
        let evidence = self.extractor.extract(input)?;
        let credential = self.evaluate(Credential::generate_id(), evidence, now);

        info!(
            "ingested {} {:?}: {} (score {})",
            credential.id,
            credential.name(),
            credential.status(),
            credential.score()
        );
        self.store.put(credential.clone());
        Ok(credential)
    }

    /// Ingests many submissions concurrently.
    ///
    /// Results come back in input order. A failed submission does not
    /// affect the others.
    pub async fn ingest_batch(
        &self,
        inputs: Vec<DocumentInput>,
        now: NaiveDate,
    ) -> Vec<Result<Credential>> {
        let handles: Vec<_> = inputs
            .into_iter()
            .map(|input| {
                let pipeline = self.clone();
                tokio::task::spawn_blocking(move || pipeline.ingest(&input, now))
            })
            .collect();

        let mut results = Vec::with_capacity(handles.len());
        for handle in handles {
            let result = match handle.await {
                Ok(result) => result,
                Err(e) => Err(WalletError::Task(e.to_string())),
            };
            if let Err(e) = &result {
                warn!("batch ingestion failed: {}", e);
            }
            results.push(result);
        }
        results
    }

    /// Classifies and scores `evidence` without storing anything.
    pub fn evaluate(&self, id: String, evidence: EvidenceRecord, now: NaiveDate) -> Credential {
        let classification = self.classifier.classify(&evidence);
        let trust_score = self.aggregator.score(
            &classification,
            self.directory.reputation_of(&evidence.issuer),
            self.ledger.votes_for(&id),
            evidence.issued_date,
            now,
        );
        Credential::new(id, evidence, classification, trust_score)
    }

    /// Records a peer vote and rescores the credential.
    ///
    /// The vote is appended and the score recomputed under the
    /// credential's lock, so concurrent votes all land in the final score.
    pub fn record_vote(&self, id: &str, vote: Vote, now: NaiveDate) -> Result<TrustScore> {
        self.store.try_update(id, |credential| {
            self.ledger.record(id, vote);
            let score = self.score_of(credential, now);
            debug!("{:?} on {}: score now {}", vote, id, score.total);
            credential.trust_score = score.clone();
            Ok(score)
        })
    }

    /// Recomputes the trust score of one credential as of `now`.
    pub fn rescore(&self, id: &str, now: NaiveDate) -> Result<TrustScore> {
        self.store.update(id, |credential| {
            let score = self.score_of(credential, now);
            credential.trust_score = score.clone();
            score
        })
    }

    /// Scheduled re-evaluation: recomputes every trust score as of `now`.
    ///
    /// # Returns
    /// Number of credentials rescored.
    pub fn rescore_all(&self, now: NaiveDate) -> Result<usize> {
        let mut rescored = 0;
        for id in self.store.ids() {
            match self.rescore(&id, now) {
                Ok(_) => rescored += 1,
                // Removed since the id list was taken
                Err(WalletError::NotFound(_)) => continue,
                Err(e) => return Err(e),
            }
        }
        info!("rescored {} credentials as of {}", rescored, now);
        Ok(rescored)
    }

    /// Re-runs classification on the stored evidence and rescores.
    ///
    /// Classification and score are replaced together.
    pub fn reclassify(&self, id: &str, now: NaiveDate) -> Result<Credential> {
        self.store.update(id, |credential| {
            credential.classification = self.classifier.classify(&credential.evidence);
            credential.trust_score = self.score_of(credential, now);
            credential.clone()
        })
    }

    /// Sets or clears the user's notes. Blank notes clear them.
    pub fn set_notes(&self, id: &str, notes: Option<String>) -> Result<()> {
        let notes = notes
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());
        self.store.update(id, |credential| credential.notes = notes)
    }

    pub fn set_selected(&self, id: &str, selected: bool) -> Result<()> {
        self.store.update(id, |credential| credential.selected = selected)
    }

    /// Selects or deselects every credential.
    ///
    /// # Returns
    /// Number of credentials updated.
    pub fn select_all(&self, selected: bool) -> usize {
        let mut updated = 0;
        for id in self.store.ids() {
            match self.set_selected(&id, selected) {
                Ok(()) => updated += 1,
                // Removed since the id list was taken
                Err(WalletError::NotFound(_)) => {}
                Err(e) => warn!("could not update selection of {}: {}", id, e),
            }
        }
        updated
    }

    /// Removes a credential and the votes held for it.
    ///
    /// # Errors
    /// `NotFound` when no credential has that id; the ledger is then left
    /// untouched.
    pub fn remove(&self, id: &str) -> Result<Credential> {
        let credential = self.store.remove(id)?;
        let votes = self.ledger.forget(id);
        info!(
            "removed {} with {} upvotes and {} downvotes",
            id, votes.upvotes, votes.downvotes
        );
        Ok(credential)
    }

    pub fn stats(&self) -> CredentialStats {
        CredentialStats::from_credentials(&self.store.list(&CredentialFilter::all()))
    }

    fn score_of(&self, credential: &Credential, now: NaiveDate) -> TrustScore {
        self.aggregator.score(
            &credential.classification,
            self.directory.reputation_of(credential.issuer()),
            self.ledger.votes_for(&credential.id),
            credential.evidence.issued_date,
            now,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::classification::FraudStatus;
    use crate::models::evidence::{ReportedSignals, Signals};
    use crate::models::trust_score::PeerVotes;
    use crate::services::directory::{InMemoryVoteLedger, StaticIssuerDirectory};
    use crate::services::extractor::{FileUpload, ManualEntry};
    use std::thread;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn pipeline() -> CredentialPipeline {
        let mut directory = StaticIssuerDirectory::new(5);
        directory.insert("Stanford University", 45);
        CredentialPipeline::new(
            &EngineConfig::default(),
            Arc::new(directory),
            Arc::new(InMemoryVoteLedger::new()),
            Arc::new(CredentialStore::new()),
        )
    }

    fn verified_entry(issued: NaiveDate) -> ManualEntry {
        ManualEntry::new("Bachelor of Computer Science", "Stanford University", issued)
            .with_reported(ReportedSignals::from(Signals::all()))
    }

    #[test]
    fn test_ingest_stores_classified_and_scored_credential() {
        let pipeline = pipeline();
        let now = date(2026, 10, 19);

        let credential = pipeline
            .ingest(&verified_entry(date(2026, 4, 2)).into(), now)
            .unwrap();

        assert_eq!(credential.status(), FraudStatus::Valid);
        // 45 reputation + 0 votes + 20 baseline - 3 decay
        assert_eq!(credential.score(), 62);
        assert_eq!(pipeline.store().get(&credential.id).unwrap(), credential);
    }

    #[test]
    fn test_failed_extraction_stores_nothing() {
        let pipeline = pipeline();
        let upload = FileUpload::new("notes.docx", "application/msword", vec![1, 2, 3], date(2024, 1, 1));

        let err = pipeline.ingest(&upload.into(), date(2026, 10, 19)).unwrap_err();
        assert!(err.is_user_correctable());
        assert_eq!(pipeline.store().count(), 0);
    }

    #[test]
    fn test_votes_move_the_score() {
        let pipeline = pipeline();
        let now = date(2026, 10, 19);
        let id = pipeline
            .ingest(&verified_entry(date(2026, 4, 2)).into(), now)
            .unwrap()
            .id;

        for _ in 0..20 {
            pipeline.record_vote(&id, Vote::Upvote, now).unwrap();
        }
        pipeline.record_vote(&id, Vote::Downvote, now).unwrap();
        let score = pipeline.record_vote(&id, Vote::Downvote, now).unwrap();

        assert_eq!(score.peer_votes.upvotes, 20);
        assert_eq!(score.net_votes, 18);
        assert_eq!(score.total, 80);
        assert_eq!(pipeline.store().get(&id).unwrap().trust_score, score);
    }

    #[test]
    fn test_vote_on_missing_credential() {
        let pipeline = pipeline();
        assert!(matches!(
            pipeline.record_vote("ghost", Vote::Upvote, date(2026, 1, 1)),
            Err(WalletError::NotFound(_))
        ));
    }

    #[test]
    fn test_rescore_all_applies_decay() {
        let pipeline = pipeline();
        let id = pipeline
            .ingest(&verified_entry(date(2026, 4, 2)).into(), date(2026, 4, 2))
            .unwrap()
            .id;
        assert_eq!(pipeline.store().get(&id).unwrap().score(), 65);

        assert_eq!(pipeline.rescore_all(date(2027, 4, 2)).unwrap(), 1);
        let credential = pipeline.store().get(&id).unwrap();
        assert_eq!(credential.trust_score.time_decay, -6.0);
        assert_eq!(credential.score(), 59);
    }

    #[test]
    fn test_reclassify_replaces_verdict_and_score_together() {
        let pipeline = pipeline();
        let now = date(2026, 10, 19);
        let id = pipeline
            .ingest(&verified_entry(date(2026, 10, 1)).into(), now)
            .unwrap()
            .id;

        pipeline
            .store()
            .update(&id, |c| c.evidence.raw_signals = Signals::from_mask(0b0001))
            .unwrap();
        let credential = pipeline.reclassify(&id, now).unwrap();

        assert_eq!(credential.status(), FraudStatus::Suspicious);
        assert_eq!(credential.trust_score.classification_baseline, -20);
        assert_eq!(credential.score(), 25);
    }

    #[test]
    fn test_notes_and_selection() {
        let pipeline = pipeline();
        let now = date(2026, 10, 19);
        let first = pipeline.ingest(&verified_entry(now).into(), now).unwrap().id;
        let second = pipeline.ingest(&verified_entry(now).into(), now).unwrap().id;

        pipeline.set_notes(&first, Some("  for grad school  ".into())).unwrap();
        assert_eq!(
            pipeline.store().get(&first).unwrap().notes.as_deref(),
            Some("for grad school")
        );
        pipeline.set_notes(&first, Some("   ".into())).unwrap();
        assert!(pipeline.store().get(&first).unwrap().notes.is_none());

        assert_eq!(pipeline.select_all(true), 2);
        pipeline.set_selected(&second, false).unwrap();
        assert_eq!(pipeline.stats().selected, 1);
    }

    #[test]
    fn test_remove_drops_credential_and_its_votes() {
        let pipeline = pipeline();
        let now = date(2026, 10, 19);
        let kept = pipeline.ingest(&verified_entry(now).into(), now).unwrap().id;
        let dropped = pipeline.ingest(&verified_entry(now).into(), now).unwrap().id;
        pipeline.record_vote(&kept, Vote::Upvote, now).unwrap();
        pipeline.record_vote(&dropped, Vote::Downvote, now).unwrap();

        let removed = pipeline.remove(&dropped).unwrap();
        assert_eq!(removed.trust_score.peer_votes.downvotes, 1);
        assert_eq!(pipeline.ledger.votes_for(&dropped), PeerVotes::default());
        assert_eq!(pipeline.ledger.votes_for(&kept).upvotes, 1);
        assert!(matches!(pipeline.remove(&dropped), Err(WalletError::NotFound(_))));

        assert_eq!(pipeline.select_all(true), 1);
        assert_eq!(pipeline.stats().total, 1);
    }

    #[test]
    fn test_concurrent_votes_and_note_edit() {
        let pipeline = pipeline();
        let now = date(2026, 10, 19);
        let id = pipeline.ingest(&verified_entry(now).into(), now).unwrap().id;

        let voters: Vec<_> = (0..4)
            .map(|_| {
                let pipeline = pipeline.clone();
                let id = id.clone();
                thread::spawn(move || {
                    for _ in 0..5 {
                        pipeline.record_vote(&id, Vote::Upvote, now).unwrap();
                    }
                })
            })
            .collect();
        let editor = {
            let pipeline = pipeline.clone();
            let id = id.clone();
            thread::spawn(move || pipeline.set_notes(&id, Some("checked".into())).unwrap())
        };
        for handle in voters {
            handle.join().unwrap();
        }
        editor.join().unwrap();

        let credential = pipeline.store().get(&id).unwrap();
        assert_eq!(credential.trust_score.peer_votes.upvotes, 20);
        assert_eq!(credential.trust_score.net_votes, 20);
        assert_eq!(credential.notes.as_deref(), Some("checked"));
    }

    #[tokio::test]
    async fn test_batch_keeps_input_order_and_isolates_failures() {
        let pipeline = pipeline();
        let now = date(2026, 10, 19);
        let inputs: Vec<DocumentInput> = vec![
            verified_entry(now).into(),
            ManualEntry::new("", "Stanford University", now).into(),
            ManualEntry::new("Fake Degree", "Nowhere College", now).into(),
        ];

        let results = pipeline.ingest_batch(inputs, now).await;
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].as_ref().unwrap().status(), FraudStatus::Valid);
        assert!(matches!(results[1], Err(WalletError::MissingRequiredField("name"))));
        let fake = results[2].as_ref().unwrap();
        assert_eq!(fake.status(), FraudStatus::Suspicious);
        assert!(fake.evidence.fraud_hint);
        assert_eq!(pipeline.store().count(), 2);
    }
}
