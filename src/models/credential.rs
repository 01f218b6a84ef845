// src/models/credential.rs
//! Credential data model.
//!
//! Defines the one canonical record for an uploaded or manually entered
//! educational credential. Every view (dashboard card, detail page, career
//! profile) is a projection of this type; see `services::views`.

use crate::models::classification::{ClassificationResult, FraudStatus};
use crate::models::evidence::EvidenceRecord;
use crate::models::trust_score::TrustScore;
use chrono::Datelike;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// An educational credential held in the wallet.
///
/// # Fields
/// - `id`: unique identifier, assigned at ingestion and never changed
/// - `evidence`: what was extracted from the submitted document
/// - `classification`: authenticity verdict, replaced on re-classification
/// - `trust_score`: aggregate score, recomputed on votes and re-evaluation
/// - `selected`: user picked this credential for career analysis
/// - `notes`: free-form user annotation
///
/// `classification` and `trust_score` are always written together so a
/// stored credential never carries a score computed from another verdict.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Credential {
    /// Example: "cred-3f9a0c1d7e2b4a68"
    pub id: String,

    pub evidence: EvidenceRecord,

    pub classification: ClassificationResult,

    pub trust_score: TrustScore,

    #[serde(default)]
    pub selected: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Credential {
    /// Assembles a freshly ingested credential. It starts unselected and
    /// without notes.
    pub fn new(
        id: String,
        evidence: EvidenceRecord,
        classification: ClassificationResult,
        trust_score: TrustScore,
    ) -> Self {
        Credential {
            id,
            evidence,
            classification,
            trust_score,
            selected: false,
            notes: None,
        }
    }

    /// Generates a random credential identifier.
    pub fn generate_id() -> String {
        let bytes: [u8; 8] = rand::thread_rng().gen();
        format!("cred-{}", hex::encode(bytes))
    }

    pub fn name(&self) -> &str {
        &self.evidence.source_name
    }

    pub fn issuer(&self) -> &str {
        &self.evidence.issuer
    }

    pub fn status(&self) -> FraudStatus {
        self.classification.status
    }

    pub fn score(&self) -> u8 {
        self.trust_score.total
    }

    /// Issue year, derived from the issue date.
    pub fn year(&self) -> i32 {
        self.evidence.issued_date.year()
    }
}
