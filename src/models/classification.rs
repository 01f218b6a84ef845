// src/models/classification.rs
//! Authenticity verdict produced by the classifier.

use crate::models::evidence::Signals;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Binary authenticity verdict.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FraudStatus {
    Valid,
    Suspicious,
}

impl fmt::Display for FraudStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FraudStatus::Valid => write!(f, "Valid"),
            FraudStatus::Suspicious => write!(f, "Suspicious"),
        }
    }
}

impl FromStr for FraudStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "valid" => Ok(FraudStatus::Valid),
            "suspicious" => Ok(FraudStatus::Suspicious),
            other => Err(format!("unknown fraud status: {}", other)),
        }
    }
}

/// Result of classifying one evidence record.
///
/// `status` and `confidence` are authoritative and reproducible for
/// identical evidence. `display_confidence` is `confidence` with a small
/// cosmetic jitter for presentation; nothing may base a decision on it.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationResult {
    pub status: FraudStatus,

    /// Confidence in `[0, 100]`, monotonic in the number of true signals
    pub confidence: u8,

    /// Non-authoritative, presentation only
    pub display_confidence: u8,

    /// Carried through unchanged from the evidence
    pub signals: Signals,
}

impl ClassificationResult {
    pub fn is_valid(&self) -> bool {
        self.status == FraudStatus::Valid
    }
}
