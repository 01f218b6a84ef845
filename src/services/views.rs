// src/services/views.rs
//! View projections of the canonical [`Credential`].
//!
//! Each screen gets its own explicit shape instead of reading whichever
//! fields happen to be present on a loosely typed record.

use crate::models::classification::FraudStatus;
use crate::models::credential::Credential;
use crate::models::trust_score::ScoreBand;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Dashboard card.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CredentialCard {
    pub id: String,
    pub name: String,
    pub issuer: String,
    pub date: NaiveDate,
    pub fraud_status: FraudStatus,
    pub score: u8,
    pub band: ScoreBand,
}

impl From<&Credential> for CredentialCard {
    fn from(credential: &Credential) -> Self {
        CredentialCard {
            id: credential.id.clone(),
            name: credential.name().to_string(),
            issuer: credential.issuer().to_string(),
            date: credential.evidence.issued_date,
            fraud_status: credential.status(),
            score: credential.score(),
            band: credential.trust_score.band(),
        }
    }
}

/// Trust score breakdown shown on the detail page.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TrustBreakdown {
    pub issuer_reputation: i64,
    pub upvotes: u32,
    pub downvotes: u32,
    pub net_votes: i64,
    pub time_decay: f64,
    pub classification_baseline: i64,
    pub total: u8,
    pub confidence: u8,
    pub display_confidence: u8,
}

impl From<&Credential> for TrustBreakdown {
    fn from(credential: &Credential) -> Self {
        let score = &credential.trust_score;
        TrustBreakdown {
            issuer_reputation: score.issuer_reputation,
            upvotes: score.peer_votes.upvotes,
            downvotes: score.peer_votes.downvotes,
            net_votes: score.net_votes,
            time_decay: score.time_decay,
            classification_baseline: score.classification_baseline,
            total: score.total,
            confidence: credential.classification.confidence,
            display_confidence: credential.classification.display_confidence,
        }
    }
}

/// Entry of the career wizard's credential list.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CareerProfileEntry {
    pub id: String,
    pub name: String,
    pub issuer: String,
    pub skills: Vec<String>,
    pub year: i32,
    pub is_selected: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl From<&Credential> for CareerProfileEntry {
    fn from(credential: &Credential) -> Self {
        CareerProfileEntry {
            id: credential.id.clone(),
            name: credential.name().to_string(),
            issuer: credential.issuer().to_string(),
            skills: credential.evidence.skills.clone(),
            year: credential.year(),
            is_selected: credential.selected,
            notes: credential.notes.clone(),
        }
    }
}

/// Aggregates for the statistics panel.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct CredentialStats {
    pub total: usize,
    pub valid: usize,
    pub suspicious: usize,
    pub selected: usize,
    /// Mean trust score, rounded; 0 for an empty wallet
    pub average_score: u8,
}

impl CredentialStats {
    pub fn from_credentials(credentials: &[Credential]) -> Self {
        let total = credentials.len();
        let count = |status| credentials.iter().filter(|c| c.status() == status).count();
        let sum: u64 = credentials.iter().map(|c| u64::from(c.score())).sum();
        let average_score = if total == 0 {
            0
        } else {
            (sum as f64 / total as f64).round() as u8
        };

        CredentialStats {
            total,
            valid: count(FraudStatus::Valid),
            suspicious: count(FraudStatus::Suspicious),
            selected: credentials.iter().filter(|c| c.selected).count(),
            average_score,
        }
    }
}

/// Skills of the selected credentials, deduplicated case-insensitively,
/// in first-seen order. This is what the career wizard sends for analysis.
pub fn selected_skills(credentials: &[Credential]) -> Vec<String> {
    let mut skills: Vec<String> = Vec::new();
    for skill in credentials
        .iter()
        .filter(|c| c.selected)
        .flat_map(|c| c.evidence.skills.iter())
    {
        if !skills.iter().any(|s| s.eq_ignore_ascii_case(skill)) {
            skills.push(skill.clone());
        }
    }
    skills
}
