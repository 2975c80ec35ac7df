//! Catalog persistence
//!
//! The catalog is a JSON array of model records. Writes are atomic (temp
//! file, fsync, rename) and the previous content is copied byte-for-byte to
//! a sibling `.backup` file first; that single backup is the only durability
//! guarantee.

use anyhow::{Context, Result};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// What to do when an incoming record's id already exists in the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuplicatePolicy {
    /// Keep the existing record, drop the incoming one
    Skip,
    /// Replace the existing record with the incoming one
    Replace,
}

/// Result of merging new records into an existing catalog
#[derive(Debug)]
pub struct MergeOutcome {
    pub models: Vec<Value>,
    /// Ids that were present on both sides, in encounter order
    pub duplicates: Vec<String>,
}

/// Handle to the catalog file at an explicit location
pub struct CatalogStore {
    path: PathBuf,
}

impl CatalogStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sibling path the previous catalog content is copied to before an
    /// overwrite, e.g. `models.json` -> `models.json.backup`
    pub fn backup_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".backup");
        self.path.with_file_name(name)
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Load the raw catalog value without shape checks
    ///
    /// Used by validate-only mode, which routes shape problems through the
    /// validator instead of failing here.
    pub async fn load_raw(&self) -> Result<Value> {
        let content = fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("Failed to read catalog file: {:?}", self.path))?;

        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse catalog file: {:?}", self.path))
    }

    /// Load the catalog as untrusted JSON values
    ///
    /// A missing file is an empty catalog; a file whose root is not an array
    /// is an error.
    pub async fn load(&self) -> Result<Vec<Value>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        match self.load_raw().await? {
            Value::Array(models) => Ok(models),
            _ => anyhow::bail!("Catalog root must be a JSON array: {:?}", self.path),
        }
    }

    /// Write the catalog, backing up the previous content first
    pub async fn save(&self, models: &[Value]) -> Result<()> {
        if self.path.exists() {
            let previous = fs::read(&self.path)
                .await
                .with_context(|| format!("Failed to read catalog for backup: {:?}", self.path))?;
            let backup = self.backup_path();
            fs::write(&backup, previous)
                .await
                .with_context(|| format!("Failed to write backup file: {:?}", backup))?;
            tracing::debug!(backup = ?backup, "Catalog backup written");
        }

        let content = serde_json::to_string_pretty(&models)
            .context("Failed to serialize catalog to JSON")?;

        // Atomic write: write to temp file, then rename
        let temp_file = self.path.with_extension("tmp");

        let mut file = fs::File::create(&temp_file)
            .await
            .context("Failed to create temp catalog file")?;
        file.write_all(content.as_bytes())
            .await
            .context("Failed to write catalog file")?;
        file.sync_all()
            .await
            .context("Failed to sync catalog file")?;

        fs::rename(&temp_file, &self.path)
            .await
            .context("Failed to rename temp catalog file")?;

        tracing::debug!(path = ?self.path, models = models.len(), "Catalog saved");

        Ok(())
    }
}

/// Ids appearing in both the existing catalog and the incoming batch
pub fn duplicate_ids(existing: &[Value], incoming: &[Value]) -> Vec<String> {
    let existing_ids: Vec<&str> = existing
        .iter()
        .filter_map(|m| m.get("id").and_then(Value::as_str))
        .collect();

    incoming
        .iter()
        .filter_map(|m| m.get("id").and_then(Value::as_str))
        .filter(|id| existing_ids.contains(id))
        .map(|id| id.to_string())
        .collect()
}

/// Merge incoming records into the existing catalog, deduplicating by id
pub fn merge(existing: Vec<Value>, incoming: Vec<Value>, policy: DuplicatePolicy) -> MergeOutcome {
    let duplicates = duplicate_ids(&existing, &incoming);

    let (mut models, incoming) = match policy {
        DuplicatePolicy::Skip => {
            let kept: Vec<Value> = incoming
                .into_iter()
                .filter(|m| {
                    m.get("id")
                        .and_then(Value::as_str)
                        .is_none_or(|id| !duplicates.iter().any(|d| d == id))
                })
                .collect();
            (existing, kept)
        }
        DuplicatePolicy::Replace => {
            let kept: Vec<Value> = existing
                .into_iter()
                .filter(|m| {
                    m.get("id")
                        .and_then(Value::as_str)
                        .is_none_or(|id| !duplicates.iter().any(|d| d == id))
                })
                .collect();
            (kept, incoming)
        }
    };

    models.extend(incoming);

    MergeOutcome { models, duplicates }
}
