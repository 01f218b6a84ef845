// src/models/trust_score.rs
//! Trust score data model.
//!
//! A [`TrustScore`] combines issuer reputation, community votes and the
//! age of the credential into one bounded number. The components are kept
//! next to the total so views can show the breakdown.

use serde::{Deserialize, Serialize};

/// Current peer vote tallies for one credential.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PeerVotes {
    pub upvotes: u32,
    pub downvotes: u32,
}

impl PeerVotes {
    pub fn new(upvotes: u32, downvotes: u32) -> Self {
        PeerVotes { upvotes, downvotes }
    }

    /// Signed difference `upvotes - downvotes`, without clamping.
    pub fn net(&self) -> i64 {
        i64::from(self.upvotes) - i64::from(self.downvotes)
    }
}

/// A single vote cast on a credential.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vote {
    Upvote,
    Downvote,
}

/// Score band used for colouring and sorting in views.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ScoreBand {
    Low,
    Moderate,
    High,
}

impl ScoreBand {
    pub fn of(total: u8) -> Self {
        if total >= 75 {
            ScoreBand::High
        } else if total >= 50 {
            ScoreBand::Moderate
        } else {
            ScoreBand::Low
        }
    }
}

/// Aggregated trust score with its components.
///
/// # Fields
/// - `issuer_reputation`: clamped issuer contribution
/// - `peer_votes`: tallies the score was computed from
/// - `net_votes`: clamped vote contribution
/// - `time_decay`: age penalty, always `<= 0`
/// - `classification_baseline`: contribution of the verdict
/// - `total`: clamped aggregate in `[0, 100]`
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TrustScore {
    pub issuer_reputation: i64,
    pub peer_votes: PeerVotes,
    pub net_votes: i64,
    pub time_decay: f64,
    pub classification_baseline: i64,
    pub total: u8,
}

impl TrustScore {
    pub fn band(&self) -> ScoreBand {
        ScoreBand::of(self.total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_net_votes_never_overflow() {
        let votes = PeerVotes::new(0, u32::MAX);
        assert_eq!(votes.net(), -(u32::MAX as i64));
    }

    #[test]
    fn test_band_edges() {
        assert_eq!(ScoreBand::of(100), ScoreBand::High);
        assert_eq!(ScoreBand::of(75), ScoreBand::High);
        assert_eq!(ScoreBand::of(74), ScoreBand::Moderate);
        assert_eq!(ScoreBand::of(50), ScoreBand::Moderate);
        assert_eq!(ScoreBand::of(49), ScoreBand::Low);
        assert_eq!(ScoreBand::of(0), ScoreBand::Low);
    }
}
