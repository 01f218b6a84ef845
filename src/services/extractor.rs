// src/services/extractor.rs
//! Evidence Extractor
//!
//! Turns a submitted document, either an uploaded file or a manually
//! entered credential, into an [`EvidenceRecord`]. Extraction is a pure
//! transform: it reads the input and the issuer directory and writes
//! nothing.
//!
//! Signals are resolved in this order:
//! 1. Values reported by an upstream scanner (`ReportedSignals`)
//! 2. What the extractor can observe on its own (file bytes, directory)
//! 3. `false`

use crate::config::ExtractorSettings;
use crate::error::{Result, WalletError};
use crate::models::evidence::{DocumentKind, EvidenceRecord, ReportedSignals, Signals};
use crate::services::directory::IssuerDirectory;
use crate::utils::crypto::fingerprint;
use chrono::NaiveDate;
use log::debug;
use std::sync::Arc;

/// An uploaded credential file.
#[derive(Debug, Clone)]
pub struct FileUpload {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
    /// Issuer metadata, if the uploader supplied it
    pub issuer: Option<String>,
    pub issued_date: NaiveDate,
    pub skills: Vec<String>,
    /// Free text the uploader attached to the file
    pub description: Option<String>,
    pub reported: ReportedSignals,
}

impl FileUpload {
    pub fn new(
        file_name: impl Into<String>,
        mime_type: impl Into<String>,
        bytes: Vec<u8>,
        issued_date: NaiveDate,
    ) -> Self {
        FileUpload {
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            bytes,
            issuer: None,
            issued_date,
            skills: Vec::new(),
            description: None,
            reported: ReportedSignals::default(),
        }
    }

    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = Some(issuer.into());
        self
    }

    pub fn with_skills(mut self, skills: Vec<String>) -> Self {
        self.skills = skills;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_reported(mut self, reported: ReportedSignals) -> Self {
        self.reported = reported;
        self
    }
}

/// A credential entered by hand through the manual form.
#[derive(Debug, Clone)]
pub struct ManualEntry {
    pub name: String,
    pub issuer: String,
    pub issued_date: NaiveDate,
    /// Comma-separated, as typed into the form
    pub skills: String,
    pub description: Option<String>,
    pub reported: ReportedSignals,
}

impl ManualEntry {
    pub fn new(name: impl Into<String>, issuer: impl Into<String>, issued_date: NaiveDate) -> Self {
        ManualEntry {
            name: name.into(),
            issuer: issuer.into(),
            issued_date,
            skills: String::new(),
            description: None,
            reported: ReportedSignals::default(),
        }
    }

    pub fn with_skills(mut self, skills: impl Into<String>) -> Self {
        self.skills = skills.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_reported(mut self, reported: ReportedSignals) -> Self {
        self.reported = reported;
        self
    }
}

/// Raw input handed to the extractor.
#[derive(Debug, Clone)]
pub enum DocumentInput {
    File(FileUpload),
    Manual(ManualEntry),
}

impl From<FileUpload> for DocumentInput {
    fn from(upload: FileUpload) -> Self {
        DocumentInput::File(upload)
    }
}

impl From<ManualEntry> for DocumentInput {
    fn from(entry: ManualEntry) -> Self {
        DocumentInput::Manual(entry)
    }
}

/// Builds evidence records from submitted documents.
#[derive(Clone)]
pub struct EvidenceExtractor {
    settings: ExtractorSettings,
    directory: Arc<dyn IssuerDirectory>,
}

impl EvidenceExtractor {
    pub fn new(settings: ExtractorSettings, directory: Arc<dyn IssuerDirectory>) -> Self {
        EvidenceExtractor {
            settings,
            directory,
        }
    }

    /// Extracts an evidence record from `input`.
    ///
    /// # Errors
    /// - `UnsupportedFormat` when an upload's MIME type is not allow-listed
    /// - `MissingRequiredField` when the file name, credential name or
    ///   issuer is blank
    pub fn extract(&self, input: &DocumentInput) -> Result<EvidenceRecord> {
        match input {
            DocumentInput::File(upload) => self.extract_file(upload),
            DocumentInput::Manual(entry) => self.extract_manual(entry),
        }
    }

    fn extract_file(&self, upload: &FileUpload) -> Result<EvidenceRecord> {
        let kind = self.document_kind(&upload.mime_type)?;

        let source_name = upload.file_name.trim();
        if source_name.is_empty() {
            return Err(WalletError::MissingRequiredField("file_name"));
        }

        let issuer = match upload.issuer.as_deref().map(str::trim) {
            Some(issuer) if !issuer.is_empty() => issuer.to_string(),
            _ => self.settings.default_issuer.clone(),
        };

        let observed = Signals {
            watermark_present: contains_token(&upload.bytes, b"watermark"),
            signature_present: has_signature(kind, &upload.bytes),
            text_consistent: content_matches(kind, source_name, &upload.bytes),
            issuer_verifiable: self.directory.is_known(&issuer),
        };
        let raw_signals = upload.reported.merge_into(observed);
        let fraud_hint = self.has_fraud_marker(source_name)
            || self.description_has_fraud_marker(upload.description.as_deref());

        debug!(
            "extracted {:?} ({:?}): {} of 4 signals, fraud hint {}",
            source_name,
            kind,
            raw_signals.count(),
            fraud_hint
        );

        Ok(EvidenceRecord {
            source_name: source_name.to_string(),
            issuer,
            issued_date: upload.issued_date,
            kind,
            raw_signals,
            fraud_hint,
            fingerprint: Some(fingerprint(&upload.bytes)),
            skills: upload.skills.clone(),
        })
    }

    fn extract_manual(&self, entry: &ManualEntry) -> Result<EvidenceRecord> {
        let name = entry.name.trim();
        if name.is_empty() {
            return Err(WalletError::MissingRequiredField("name"));
        }
        let issuer = entry.issuer.trim();
        if issuer.is_empty() {
            return Err(WalletError::MissingRequiredField("issuer"));
        }

        // Without a document body only the issuer can be checked here.
        let observed = Signals {
            issuer_verifiable: self.directory.is_known(issuer),
            ..Signals::default()
        };
        let raw_signals = entry.reported.merge_into(observed);

        let fraud_hint = self.has_fraud_marker(name)
            || self.description_has_fraud_marker(entry.description.as_deref());

        let skills = entry
            .skills
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect();

        Ok(EvidenceRecord {
            source_name: name.to_string(),
            issuer: issuer.to_string(),
            issued_date: entry.issued_date,
            kind: DocumentKind::Manual,
            raw_signals,
            fraud_hint,
            fingerprint: None,
            skills,
        })
    }

    fn document_kind(&self, mime_type: &str) -> Result<DocumentKind> {
        if !self.settings.allowed_mime_types.iter().any(|m| m == mime_type) {
            return Err(WalletError::UnsupportedFormat(mime_type.to_string()));
        }
        match mime_type {
            "application/pdf" => Ok(DocumentKind::Pdf),
            "image/png" => Ok(DocumentKind::Png),
            "image/jpeg" | "image/jpg" => Ok(DocumentKind::Jpeg),
            other => Err(WalletError::UnsupportedFormat(other.to_string())),
        }
    }

    fn has_fraud_marker(&self, text: &str) -> bool {
        let text = text.to_lowercase();
        self.settings
            .fraud_markers
            .iter()
            .filter(|m| !m.is_empty())
            .any(|marker| text.contains(&marker.to_lowercase()))
    }

    fn description_has_fraud_marker(&self, description: Option<&str>) -> bool {
        description.map_or(false, |d| self.has_fraud_marker(d))
    }
}

fn contains_token(haystack: &[u8], token: &[u8]) -> bool {
    !token.is_empty()
        && haystack
            .windows(token.len())
            .any(|window| window.eq_ignore_ascii_case(token))
}

fn has_signature(kind: DocumentKind, bytes: &[u8]) -> bool {
    match kind {
        DocumentKind::Pdf => contains_token(bytes, b"/ByteRange") || contains_token(bytes, b"/Sig"),
        DocumentKind::Png | DocumentKind::Jpeg => contains_token(bytes, b"signature"),
        DocumentKind::Manual => false,
    }
}

/// The body starts with the declared type's magic header and the file
/// extension, if any, agrees with it.
fn content_matches(kind: DocumentKind, file_name: &str, bytes: &[u8]) -> bool {
    if !bytes.starts_with(kind.magic()) {
        return false;
    }
    match file_name.rsplit_once('.') {
        Some((_, extension)) => kind
            .extensions()
            .iter()
            .any(|e| e.eq_ignore_ascii_case(extension)),
        None => true,
    }
}
