// src/main.rs

//! # EduChain Wallet - Command Line Entry Point
//!
//! Loads configuration, restores the credential store from its snapshot,
//! ingests the documents named on the command line and prints the
//! dashboard view as JSON.
//!
//! ```text
//! educhain-wallet [FILE...]
//! ```
//!
//! With no files and an empty store, a few sample credentials are
//! entered so the output is not empty.
//!
//! ## Environment Variables
//! - `EDUCHAIN_CONFIG`: (Optional) config file path (default: educhain.toml)
//! - `EDUCHAIN_SNAPSHOT_PATH`: (Optional) snapshot file to load and save
//! - `RUST_LOG`: (Optional) overrides the configured log filter

use anyhow::Context;
use chrono::{NaiveDate, Utc};
use educhain_wallet::config::EngineConfig;
use educhain_wallet::models::evidence::{ReportedSignals, Signals};
use educhain_wallet::services::directory::{InMemoryVoteLedger, StaticIssuerDirectory};
use educhain_wallet::services::extractor::{DocumentInput, FileUpload, ManualEntry};
use educhain_wallet::services::pipeline::CredentialPipeline;
use educhain_wallet::services::views::{CredentialCard, CredentialStats};
use educhain_wallet::storage::snapshot::SnapshotStorage;
use educhain_wallet::utils::serialization::serialize_pretty;
use educhain_wallet::wallet::credential_store::{CredentialFilter, CredentialStore};
use log::{info, warn};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;

#[derive(Serialize)]
struct DashboardOutput {
    stats: CredentialStats,
    credentials: Vec<CredentialCard>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = EngineConfig::load().context("failed to load configuration")?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_level))
        .init();

    let snapshot = config.snapshot_path.clone().map(SnapshotStorage::new);
    let store = match &snapshot {
        Some(storage) => storage
            .load()
            .await
            .with_context(|| format!("failed to load snapshot {}", storage.path().display()))?,
        None => CredentialStore::new(),
    };

    // Votes live in the snapshot's scores; the ledger resumes from them.
    let ledger = InMemoryVoteLedger::with_tallies(store.vote_tallies());

    let pipeline = CredentialPipeline::new(
        &config,
        Arc::new(StaticIssuerDirectory::from_settings(&config.directory)),
        Arc::new(ledger),
        Arc::new(store),
    );
    let today = Utc::now().date_naive();

    let paths: Vec<String> = std::env::args().skip(1).collect();
    let mut inputs = Vec::with_capacity(paths.len());
    for path in &paths {
        inputs.push(read_upload(Path::new(path), today).await?);
    }
    if inputs.is_empty() && pipeline.store().count() == 0 {
        info!("empty wallet, entering sample credentials");
        inputs = sample_entries();
    }

    for (index, result) in pipeline.ingest_batch(inputs, today).await.into_iter().enumerate() {
        if let Err(e) = result {
            warn!("submission {} rejected: {}", index + 1, e);
        }
    }
    pipeline.rescore_all(today)?;

    let credentials = pipeline.store().list(&CredentialFilter::all());
    let output = DashboardOutput {
        stats: CredentialStats::from_credentials(&credentials),
        credentials: credentials.iter().map(CredentialCard::from).collect(),
    };
    println!("{}", serialize_pretty(&output)?);

    if let Some(storage) = &snapshot {
        storage.save(pipeline.store()).await?;
    }
    Ok(())
}

async fn read_upload(path: &Path, today: NaiveDate) -> anyhow::Result<DocumentInput> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    Ok(FileUpload::new(file_name, mime_type_of(path), bytes, today).into())
}

fn mime_type_of(path: &Path) -> String {
    let extension = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "pdf" => "application/pdf",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        _ => "application/octet-stream",
    }
    .to_string()
}

fn sample_entries() -> Vec<DocumentInput> {
    let verified = ReportedSignals::from(Signals::all());
    let unverified = ReportedSignals {
        watermark_present: Some(false),
        text_consistent: Some(false),
        ..ReportedSignals::default()
    };
    let date = |y, m, d| NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default();

    vec![
        ManualEntry::new("Bachelor of Computer Science", "Stanford University", date(2023, 5, 15))
            .with_skills("Algorithms, Systems Programming")
            .with_reported(verified)
            .into(),
        ManualEntry::new("AWS Certified Developer", "Amazon Web Services", date(2022, 11, 20))
            .with_skills("Cloud Computing")
            .with_reported(unverified)
            .into(),
        ManualEntry::new("Machine Learning Specialization", "DeepLearning.AI", date(2023, 1, 10))
            .with_skills("Python, Machine Learning")
            .with_reported(verified)
            .into(),
        ManualEntry::new("Blockchain Fundamentals", "MIT OpenCourseWare", date(2022, 8, 5))
            .with_skills("Blockchain")
            .with_reported(verified)
            .into(),
    ]
}
