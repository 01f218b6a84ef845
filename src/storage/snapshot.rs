// src/storage/snapshot.rs
//! File-backed snapshots of the credential store.
//!
//! The store itself lives in memory; this module persists it as one JSON
//! document so a restarted process picks up where it left off.
//!
//! # Features
//! - Asynchronous file I/O on the Tokio runtime
//! - Write-then-rename, so a crash mid-save leaves the old snapshot intact
//! - Insertion order of the store is preserved across save and load

use crate::error::Result;
use crate::models::credential::Credential;
use crate::utils::serialization::{deserialize, serialize_pretty};
use crate::wallet::credential_store::{CredentialFilter, CredentialStore};
use chrono::{DateTime, Utc};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;

const SNAPSHOT_VERSION: u32 = 1;

/// On-disk layout of a snapshot.
#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct Snapshot {
    version: u32,
    saved_at: DateTime<Utc>,
    credentials: Vec<Credential>,
}

/// Reads and writes store snapshots at a fixed path.
#[derive(Debug, Clone)]
pub struct SnapshotStorage {
    path: PathBuf,
}

impl SnapshotStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        SnapshotStorage { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes every credential in `store` to the snapshot file.
    ///
    /// # Returns
    /// Number of credentials written.
    pub async fn save(&self, store: &CredentialStore) -> Result<usize> {
        let snapshot = Snapshot {
            version: SNAPSHOT_VERSION,
            saved_at: Utc::now(),
            credentials: store.list(&CredentialFilter::all()),
        };
        let json = serialize_pretty(&snapshot)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }
        let staging = self.path.with_extension("json.tmp");
        fs::write(&staging, json).await?;
        fs::rename(&staging, &self.path).await?;

        info!(
            "saved {} credentials to {}",
            snapshot.credentials.len(),
            self.path.display()
        );
        Ok(snapshot.credentials.len())
    }

    /// Loads a store from the snapshot file.
    ///
    /// A missing file yields an empty store.
    pub async fn load(&self) -> Result<CredentialStore> {
        let json = match fs::read_to_string(&self.path).await {
            Ok(json) => json,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!("no snapshot at {}, starting empty", self.path.display());
                return Ok(CredentialStore::new());
            }
            Err(e) => return Err(e.into()),
        };

        let snapshot: Snapshot = deserialize(&json)?;
        if snapshot.version != SNAPSHOT_VERSION {
            warn!(
                "snapshot {} has version {}, expected {}",
                self.path.display(),
                snapshot.version,
                SNAPSHOT_VERSION
            );
        }

        info!(
            "loaded {} credentials saved at {}",
            snapshot.credentials.len(),
            snapshot.saved_at
        );
        Ok(CredentialStore::from_credentials(snapshot.credentials))
    }
}
