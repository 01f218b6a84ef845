// src/services/classifier.rs
//! Authenticity Classifier
//!
//! Deterministic core, stochastic shell. The verdict and the
//! authoritative confidence are pure functions of the evidence; only the
//! presentation copy of the confidence (`display_confidence`) carries a
//! bounded random jitter, and nothing downstream reads it.

use crate::config::ClassifierPolicy;
use crate::models::classification::{ClassificationResult, FraudStatus};
use crate::models::evidence::EvidenceRecord;
use log::debug;
use rand::Rng;

/// Classifies evidence records into `Valid` / `Suspicious`.
#[derive(Debug, Clone)]
pub struct AuthenticityClassifier {
    policy: ClassifierPolicy,
}

impl AuthenticityClassifier {
    pub fn new(policy: ClassifierPolicy) -> Self {
        AuthenticityClassifier { policy }
    }

    /// Classifies `evidence`, drawing display jitter from the thread RNG.
    pub fn classify(&self, evidence: &EvidenceRecord) -> ClassificationResult {
        self.classify_with_rng(evidence, &mut rand::thread_rng())
    }

    /// Classifies `evidence` with an explicit RNG for the display jitter.
    ///
    /// `status` is `Valid` iff at least `valid_threshold` of the four
    /// signals hold. The fraud hint lowers `confidence` but never changes
    /// `status`.
    pub fn classify_with_rng<R: Rng + ?Sized>(
        &self,
        evidence: &EvidenceRecord,
        rng: &mut R,
    ) -> ClassificationResult {
        let signals = evidence.raw_signals;
        let count = signals.count();

        let status = if count >= self.policy.valid_threshold {
            FraudStatus::Valid
        } else {
            FraudStatus::Suspicious
        };
        let confidence = self.confidence(count, evidence.fraud_hint);
        let display_confidence = self.jitter(confidence, rng);

        debug!(
            "classified {:?} as {} ({} signals, confidence {})",
            evidence.source_name, status, count, confidence
        );

        ClassificationResult {
            status,
            confidence,
            display_confidence,
            signals,
        }
    }

    /// Authoritative confidence for `count` true signals.
    pub fn confidence(&self, count: u8, fraud_hint: bool) -> u8 {
        let mut value =
            self.policy.base_confidence + self.policy.confidence_per_signal * f64::from(count);
        if fraud_hint {
            value -= self.policy.fraud_hint_penalty;
        }
        clamp_percent(value)
    }

    fn jitter<R: Rng + ?Sized>(&self, confidence: u8, rng: &mut R) -> u8 {
        let spread = i16::from(self.policy.display_jitter);
        if spread == 0 {
            return confidence;
        }
        let offset = rng.gen_range(-spread..=spread);
        (i16::from(confidence) + offset).clamp(0, 100) as u8
    }
}

fn clamp_percent(value: f64) -> u8 {
    if value.is_nan() {
        return 0;
    }
    value.round().clamp(0.0, 100.0) as u8
}
