//! Configuration structures and loading logic

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Curator configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CuratorConfig {
    /// Catalog file the curated records are merged into
    pub catalog_file: PathBuf,
    /// Hub API base URL, without a trailing slash
    pub hub_base_url: String,
    /// Bearer token for gated models
    pub hub_token: Option<String>,
    /// How many times the result limit to fetch before post-filtering
    pub search_overfetch: usize,
    /// Context window assumed when upstream config carries none
    pub default_context_window: u32,
}

impl Default for CuratorConfig {
    fn default() -> Self {
        Self {
            catalog_file: default_catalog_file(),
            hub_base_url: default_hub_base_url(),
            hub_token: None,
            search_overfetch: default_search_overfetch(),
            default_context_window: default_context_window(),
        }
    }
}

impl CuratorConfig {
    /// Load configuration from file with environment variable overrides
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        let mut config = if let Some(path) = path {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            toml::from_str(&content).context("Failed to parse TOML config")?
        } else {
            Self::default()
        };

        // Environment variable overrides
        if let Ok(catalog_file) = std::env::var("MODEL_CURATOR_CATALOG_FILE") {
            config.catalog_file = PathBuf::from(catalog_file);
        }
        if let Ok(base_url) = std::env::var("MODEL_CURATOR_HUB_URL") {
            config.hub_base_url = base_url;
        }
        if let Ok(token) = std::env::var("HF_TOKEN")
            && !token.is_empty()
        {
            config.hub_token = Some(token);
        }

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.search_overfetch == 0 {
            anyhow::bail!("search_overfetch must be >= 1");
        }

        if !self.hub_base_url.starts_with("http") {
            anyhow::bail!(
                "hub_base_url must be an http(s) URL (got {})",
                self.hub_base_url
            );
        }

        if !(1000..=500_000).contains(&self.default_context_window) {
            anyhow::bail!(
                "default_context_window must be within 1000..=500000 (got {})",
                self.default_context_window
            );
        }

        Ok(())
    }
}

// Default functions
fn default_catalog_file() -> PathBuf {
    PathBuf::from("models.json")
}
fn default_hub_base_url() -> String {
    "https://huggingface.co/api".to_string()
}
fn default_search_overfetch() -> usize {
    10
}
fn default_context_window() -> u32 {
    8192
}
