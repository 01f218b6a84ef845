// src/services/trust.rs
//! Trust Score Aggregator
//!
//! ```text
//! total = clamp(reputation + net_votes + time_decay + baseline, 0, 100)
//!
//! reputation = clamp(issuer_reputation, 0, max_issuer_reputation)
//! net_votes  = clamp(upvotes - downvotes, -vote_cap, vote_cap)
//! time_decay = -min(months_since_issue * decay_per_month, max_decay)
//! baseline   = valid_baseline | suspicious_baseline
//! ```
//!
//! Months are calendar months; an issue date in the future yields no
//! decay. The score is a pure function of its inputs, so it can be
//! computed in parallel across credentials.

use crate::config::ScoringWeights;
use crate::models::classification::{ClassificationResult, FraudStatus};
use crate::models::trust_score::{PeerVotes, TrustScore};
use chrono::{Datelike, NaiveDate};

/// Combines issuer reputation, votes and age into a [`TrustScore`].
#[derive(Debug, Clone)]
pub struct TrustScoreAggregator {
    weights: ScoringWeights,
}

impl TrustScoreAggregator {
    pub fn new(weights: ScoringWeights) -> Self {
        TrustScoreAggregator { weights }
    }

    /// Computes the trust score of a classified credential as of `now`.
    ///
    /// # Arguments
    /// * `classification` - Authenticity verdict of the credential
    /// * `issuer_reputation` - Raw directory value, clamped here
    /// * `votes` - Current peer vote tallies
    /// * `issued_date` - Issue date of the credential
    /// * `now` - Evaluation date
    pub fn score(
        &self,
        classification: &ClassificationResult,
        issuer_reputation: i64,
        votes: PeerVotes,
        issued_date: NaiveDate,
        now: NaiveDate,
    ) -> TrustScore {
        let max_reputation = self.weights.max_issuer_reputation.max(0);
        let reputation = issuer_reputation.clamp(0, max_reputation);

        let cap = self.weights.vote_cap.max(0);
        let net_votes = votes.net().clamp(-cap, cap);

        let time_decay = self.time_decay(issued_date, now);
        let baseline = self.baseline(classification.status);

        let raw = reputation.saturating_add(net_votes).saturating_add(baseline) as f64 + time_decay;
        let total = if raw.is_nan() {
            0
        } else {
            raw.round().clamp(0.0, 100.0) as u8
        };

        TrustScore {
            issuer_reputation: reputation,
            peer_votes: votes,
            net_votes,
            time_decay,
            classification_baseline: baseline,
            total,
        }
    }

    /// Age penalty, always in `[-max_decay, 0]`.
    pub fn time_decay(&self, issued_date: NaiveDate, now: NaiveDate) -> f64 {
        let months = months_between(issued_date, now);
        if months <= 0 {
            return 0.0;
        }
        let rate = self.weights.decay_per_month.max(0.0);
        let cap = self.weights.max_decay.max(0.0);
        let penalty = (months as f64 * rate).min(cap);
        if penalty == 0.0 {
            0.0
        } else {
            -penalty
        }
    }

    fn baseline(&self, status: FraudStatus) -> i64 {
        match status {
            FraudStatus::Valid => self.weights.valid_baseline,
            FraudStatus::Suspicious => self.weights.suspicious_baseline,
        }
    }
}

/// Whole calendar months from `from` to `to`, ignoring the day of month.
/// Negative when `to` precedes `from`.
pub fn months_between(from: NaiveDate, to: NaiveDate) -> i64 {
    let years = i64::from(to.year()) - i64::from(from.year());
    let months = i64::from(to.month()) - i64::from(from.month());
    years * 12 + months
}
