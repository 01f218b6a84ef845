// src/config.rs
//! Engine configuration.
//!
//! Settings are layered, later sources overriding earlier ones:
//! 1. Built-in defaults (the `Default` impls below)
//! 2. Optional TOML file, `educhain.toml` or the path in `EDUCHAIN_CONFIG`
//! 3. Environment variables prefixed `EDUCHAIN`, nested with `__`,
//!    e.g. `EDUCHAIN_SCORING__DECAY_PER_MONTH=0.25`
//!
//! A `.env` file is loaded into the environment before step 3.

use crate::error::{Result, WalletError};
use crate::models::evidence::Signals;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

const DEFAULT_CONFIG_FILE: &str = "educhain.toml";

/// Top-level configuration for the wallet engine and binary.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    /// `env_logger` filter, e.g. "info" or "educhain_wallet=debug"
    pub log_level: String,

    /// Where the credential store snapshot is read from and written to
    pub snapshot_path: Option<PathBuf>,

    pub extractor: ExtractorSettings,
    pub classifier: ClassifierPolicy,
    pub scoring: ScoringWeights,
    pub directory: DirectorySettings,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            log_level: "info".to_string(),
            snapshot_path: None,
            extractor: ExtractorSettings::default(),
            classifier: ClassifierPolicy::default(),
            scoring: ScoringWeights::default(),
            directory: DirectorySettings::default(),
        }
    }
}

impl EngineConfig {
    /// Loads configuration from the default file location and environment.
    pub fn load() -> Result<Self> {
        dotenv::dotenv().ok();
        let path = std::env::var("EDUCHAIN_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_FILE.into());
        Self::load_from(&path)
    }

    /// Loads configuration from `path` (skipped when missing) and environment.
    pub fn load_from(path: &str) -> Result<Self> {
        let settings = Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(
                Environment::with_prefix("EDUCHAIN")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: EngineConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects settings under which a verdict or score would stop
    /// following the evidence.
    ///
    /// # Errors
    /// `InvalidConfig` naming the first offending key.
    pub fn validate(&self) -> Result<()> {
        let classifier = &self.classifier;
        if classifier.valid_threshold == 0 || classifier.valid_threshold > Signals::COUNT {
            return Err(invalid(format!(
                "classifier.valid_threshold must be in 1..={}, got {}",
                Signals::COUNT,
                classifier.valid_threshold
            )));
        }
        check_non_negative("classifier.confidence_per_signal", classifier.confidence_per_signal)?;
        check_non_negative("classifier.fraud_hint_penalty", classifier.fraud_hint_penalty)?;

        let scoring = &self.scoring;
        if scoring.valid_baseline <= scoring.suspicious_baseline {
            return Err(invalid(format!(
                "scoring.valid_baseline ({}) must exceed scoring.suspicious_baseline ({})",
                scoring.valid_baseline, scoring.suspicious_baseline
            )));
        }
        if scoring.max_issuer_reputation < 0 {
            return Err(invalid("scoring.max_issuer_reputation must not be negative".into()));
        }
        if scoring.vote_cap < 0 {
            return Err(invalid("scoring.vote_cap must not be negative".into()));
        }
        check_non_negative("scoring.decay_per_month", scoring.decay_per_month)?;
        check_non_negative("scoring.max_decay", scoring.max_decay)?;
        Ok(())
    }
}

fn invalid(message: String) -> WalletError {
    WalletError::InvalidConfig(message)
}

fn check_non_negative(key: &str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(invalid(format!("{} must be a non-negative number, got {}", key, value)))
    }
}

/// Evidence extractor settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ExtractorSettings {
    /// Exact MIME strings accepted for uploads
    pub allowed_mime_types: Vec<String>,

    /// Case-insensitive tokens that mark a submission as a likely forgery
    pub fraud_markers: Vec<String>,

    /// Issuer recorded for uploads that carry no issuer metadata
    pub default_issuer: String,
}

impl Default for ExtractorSettings {
    fn default() -> Self {
        ExtractorSettings {
            allowed_mime_types: vec![
                "application/pdf".to_string(),
                "image/png".to_string(),
                "image/jpeg".to_string(),
                "image/jpg".to_string(),
            ],
            fraud_markers: vec!["fake".to_string()],
            default_issuer: "Derived from document".to_string(),
        }
    }
}

/// Classification policy.
///
/// `status` is `Valid` when at least `valid_threshold` signals hold.
/// `confidence` is `base_confidence + confidence_per_signal * count`,
/// lowered by `fraud_hint_penalty` when a fraud marker was seen, clamped
/// to `[0, 100]`. `display_jitter` bounds the cosmetic noise added to
/// `display_confidence`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ClassifierPolicy {
    pub valid_threshold: u8,
    pub base_confidence: f64,
    pub confidence_per_signal: f64,
    pub fraud_hint_penalty: f64,
    pub display_jitter: u8,
}

impl Default for ClassifierPolicy {
    fn default() -> Self {
        ClassifierPolicy {
            valid_threshold: 3,
            base_confidence: 50.0,
            confidence_per_signal: 12.5,
            fraud_hint_penalty: 15.0,
            display_jitter: 3,
        }
    }
}

/// Trust score weights.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ScoringWeights {
    /// Issuer reputation is clamped to `[0, max_issuer_reputation]`
    pub max_issuer_reputation: i64,

    /// Net votes are clamped to `[-vote_cap, vote_cap]`
    pub vote_cap: i64,

    /// Penalty per elapsed calendar month
    pub decay_per_month: f64,

    /// Largest total age penalty
    pub max_decay: f64,

    pub valid_baseline: i64,
    pub suspicious_baseline: i64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        ScoringWeights {
            max_issuer_reputation: 50,
            vote_cap: 30,
            decay_per_month: 0.5,
            max_decay: 20.0,
            valid_baseline: 20,
            suspicious_baseline: -20,
        }
    }
}

/// Issuer directory seed data.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DirectorySettings {
    /// Reputation reported for issuers the directory does not know
    pub default_reputation: i64,

    /// Known issuers and their reputation
    pub issuers: HashMap<String, i64>,
}

impl Default for DirectorySettings {
    fn default() -> Self {
        let issuers = [
            ("Stanford University", 45),
            ("Massachusetts Institute of Technology", 45),
            ("MIT OpenCourseWare", 35),
            ("Amazon Web Services", 40),
            ("DeepLearning.AI", 38),
        ]
        .into_iter()
        .map(|(name, reputation)| (name.to_string(), reputation))
        .collect();

        DirectorySettings {
            default_reputation: 10,
            issuers,
        }
    }
}
