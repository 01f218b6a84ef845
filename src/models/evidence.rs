// src/models/evidence.rs
//! Evidence data model.
//!
//! An [`EvidenceRecord`] is the structured form of a submitted credential
//! document: who issued it, when, and which authenticity signals were
//! observed on it. It is the only input the authenticity classifier reads.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// The four authenticity signals observed on a document.
///
/// Every signal is always present. A signal that could not be observed is
/// recorded as `false`, never left out.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Signals {
    /// A watermark was found on the document
    pub watermark_present: bool,

    /// A digital or handwritten signature was found
    pub signature_present: bool,

    /// The document content matches its declared type and metadata
    pub text_consistent: bool,

    /// The issuer is known to the issuer directory
    pub issuer_verifiable: bool,
}

impl Signals {
    /// Number of signals evaluated per document.
    pub const COUNT: u8 = 4;

    /// Signals with every check passing.
    pub fn all() -> Self {
        Signals {
            watermark_present: true,
            signature_present: true,
            text_consistent: true,
            issuer_verifiable: true,
        }
    }

    /// Builds signals from a 4-bit mask, lowest bit first
    /// (watermark, signature, text, issuer).
    pub fn from_mask(mask: u8) -> Self {
        Signals {
            watermark_present: mask & 0b0001 != 0,
            signature_present: mask & 0b0010 != 0,
            text_consistent: mask & 0b0100 != 0,
            issuer_verifiable: mask & 0b1000 != 0,
        }
    }

    /// Number of signals that are `true`, in `0..=4`.
    pub fn count(&self) -> u8 {
        [
            self.watermark_present,
            self.signature_present,
            self.text_consistent,
            self.issuer_verifiable,
        ]
        .iter()
        .filter(|s| **s)
        .count() as u8
    }
}

/// Signals reported by an upstream scanner.
///
/// Each field is optional: `Some` overrides what the extractor would
/// derive on its own, `None` leaves the extractor's own observation (or
/// `false`) in place.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ReportedSignals {
    pub watermark_present: Option<bool>,
    pub signature_present: Option<bool>,
    pub text_consistent: Option<bool>,
    pub issuer_verifiable: Option<bool>,
}

impl ReportedSignals {
    /// Overlays the reported values on top of `observed`.
    pub fn merge_into(&self, observed: Signals) -> Signals {
        Signals {
            watermark_present: self.watermark_present.unwrap_or(observed.watermark_present),
            signature_present: self.signature_present.unwrap_or(observed.signature_present),
            text_consistent: self.text_consistent.unwrap_or(observed.text_consistent),
            issuer_verifiable: self.issuer_verifiable.unwrap_or(observed.issuer_verifiable),
        }
    }
}

impl From<Signals> for ReportedSignals {
    fn from(signals: Signals) -> Self {
        ReportedSignals {
            watermark_present: Some(signals.watermark_present),
            signature_present: Some(signals.signature_present),
            text_consistent: Some(signals.text_consistent),
            issuer_verifiable: Some(signals.issuer_verifiable),
        }
    }
}

/// Accepted document types.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Pdf,
    Png,
    Jpeg,
    /// Manually entered metadata, no document body
    Manual,
}

impl DocumentKind {
    /// Magic header a well-formed file of this kind starts with.
    pub fn magic(&self) -> &'static [u8] {
        match self {
            DocumentKind::Pdf => b"%PDF-",
            DocumentKind::Png => &[0x89, b'P', b'N', b'G'],
            DocumentKind::Jpeg => &[0xFF, 0xD8, 0xFF],
            DocumentKind::Manual => &[],
        }
    }

    /// File name extensions that agree with this kind.
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            DocumentKind::Pdf => &["pdf"],
            DocumentKind::Png => &["png"],
            DocumentKind::Jpeg => &["jpg", "jpeg"],
            DocumentKind::Manual => &[],
        }
    }
}

/// Structured evidence extracted from one submitted credential.
///
/// # Fields
/// - `source_name`: file name or user-entered credential title
/// - `issuer`: issuing institution as submitted
/// - `issued_date`: date the credential was issued
/// - `raw_signals`: the four authenticity observations
/// - `fraud_hint`: the source name or description carries a fraud marker;
///   this only lowers classifier confidence, it never decides the verdict
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EvidenceRecord {
    pub source_name: String,
    pub issuer: String,
    pub issued_date: NaiveDate,
    pub kind: DocumentKind,
    pub raw_signals: Signals,
    pub fraud_hint: bool,

    /// Hex SHA-256 of the document bytes; `None` for manual entries
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,

    #[serde(default)]
    pub skills: Vec<String>,
}
