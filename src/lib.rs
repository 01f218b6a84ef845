// src/lib.rs

//! # EduChain Wallet - Credential Trust Engine
//!
//! Scores uploaded educational credentials: how likely each one is
//! authentic, and how much it should be trusted given its issuer,
//! community votes and age.
//!
//! ## Architecture Overview
//! 1. **Models**: evidence, classification, trust score and credential types
//! 2. **Services**: evidence extraction, authenticity classification, trust
//!    score aggregation, the ingestion pipeline and view projections
//! 3. **Wallet**: the credential store, serializing edits per credential
//! 4. **Storage**: JSON snapshots of the store
//!
//! ## Example
//! ```no_run
//! use educhain_wallet::config::EngineConfig;
//! use educhain_wallet::services::directory::{InMemoryVoteLedger, StaticIssuerDirectory};
//! use educhain_wallet::services::extractor::ManualEntry;
//! use educhain_wallet::services::pipeline::CredentialPipeline;
//! use educhain_wallet::wallet::credential_store::CredentialStore;
//! use std::sync::Arc;
//!
//! let config = EngineConfig::default();
//! let pipeline = CredentialPipeline::new(
//!     &config,
//!     Arc::new(StaticIssuerDirectory::from_settings(&config.directory)),
//!     Arc::new(InMemoryVoteLedger::new()),
//!     Arc::new(CredentialStore::new()),
//! );
//!
//! let today = chrono::Utc::now().date_naive();
//! let entry = ManualEntry::new("BSc Computer Science", "Stanford University", today);
//! let credential = pipeline.ingest(&entry.into(), today)?;
//! println!("{} scored {}", credential.name(), credential.score());
//! # Ok::<(), educhain_wallet::error::WalletError>(())
//! ```

pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod storage;
pub mod utils;
pub mod wallet;

pub use error::{Result, WalletError};
