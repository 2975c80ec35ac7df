//! Hugging Face Hub collaborator
//!
//! The curation pipeline consumes the Hub through the [`ModelHub`] trait:
//! a search over model records and a repository file listing. Upstream
//! records are modeled with every field present-or-absent; extractors
//! pattern-match over these structures instead of probing raw JSON.

use async_trait::async_trait;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod client;

pub use client::HubClient;

/// Errors from Hub API calls
#[derive(Debug, Error)]
pub enum HubError {
    #[error("Hub request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Hub returned status {status} for {url}")]
    Status { status: u16, url: String },
}

/// Read access to the model hosting service
#[async_trait]
pub trait ModelHub: Send + Sync {
    /// Search for model records matching the criteria
    ///
    /// Implementations should over-fetch relative to `criteria.limit`; the
    /// caller narrows the listing with heavy post-filtering.
    async fn search(&self, criteria: &SearchCriteria) -> Result<Vec<HubModel>, HubError>;

    /// List the files in a model repository
    async fn get_files(&self, model_id: &str) -> Result<Vec<RepoFile>, HubError>;
}

/// Search parameters for [`ModelHub::search`]
#[derive(Debug, Clone)]
pub struct SearchCriteria {
    pub size_range: SizeRange,
    pub category: Category,
    /// Maximum number of results after post-filtering
    pub limit: usize,
    pub min_downloads: Option<u64>,
    pub min_likes: Option<u64>,
    /// Only keep models whose repository carries GGUF files
    pub require_gguf: bool,
    /// Language filter (e.g. "en", "zh")
    pub language: Option<String>,
}

/// Parameter-count bracket used to narrow search results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SizeRange {
    /// 0-5B
    Small,
    /// 5-15B
    Medium,
    /// 15-40B
    Large,
    /// 40B+
    Xl,
    /// No limit
    Any,
}

impl SizeRange {
    /// Inclusive bounds in billions of parameters
    pub fn bounds(self) -> (f64, f64) {
        match self {
            Self::Small => (0.0, 5.0),
            Self::Medium => (5.0, 15.0),
            Self::Large => (15.0, 40.0),
            Self::Xl => (40.0, 200.0),
            Self::Any => (0.0, 1000.0),
        }
    }
}

/// Model category used both as a search filter and as a use-case hint
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Category {
    Chat,
    Coding,
    Writing,
    Reasoning,
    Multilingual,
    General,
    Any,
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Chat => "chat",
            Self::Coding => "coding",
            Self::Writing => "writing",
            Self::Reasoning => "reasoning",
            Self::Multilingual => "multilingual",
            Self::General => "general",
            Self::Any => "any",
        }
    }
}

/// One raw model record as returned by the Hub
///
/// Every field is optional; the Hub serves both `id` and `modelId`
/// depending on the endpoint, and card data is frequently absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HubModel {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "modelId", skip_serializing_if = "Option::is_none")]
    pub model_id: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub downloads: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub likes: Option<u64>,
    #[serde(rename = "cardData", skip_serializing_if = "Option::is_none")]
    pub card_data: Option<CardData>,
    /// Raw model config blob (context-window keys live here)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<serde_json::Value>,
    #[serde(default)]
    pub siblings: Vec<RepoFile>,
}

impl HubModel {
    /// The repository identifier, whichever key the Hub populated
    pub fn identifier(&self) -> Option<&str> {
        self.id.as_deref().or(self.model_id.as_deref())
    }
}

/// Structured card metadata attached to a model record
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CardData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_name: Option<String>,
    /// Usually a string, occasionally a list of identifiers
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// String or list, depending on the card author
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_model: Option<serde_json::Value>,
    /// Everything else on the card, kept for free-text scans
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl CardData {
    /// License field flattened to text, taking the first entry of a list
    pub fn license_text(&self) -> Option<String> {
        flatten_text(self.license.as_ref())
    }

    /// Base-model field flattened to text
    pub fn base_model_text(&self) -> Option<String> {
        flatten_text(self.base_model.as_ref())
    }

    /// The whole card as one string, for keyword and phrase scans
    pub fn full_text(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

fn flatten_text(value: Option<&serde_json::Value>) -> Option<String> {
    match value? {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Array(items) => items
            .iter()
            .find_map(|v| v.as_str().map(|s| s.to_string())),
        _ => None,
    }
}

/// One file in a model repository
///
/// The tree endpoint serves `path`, search results embed `rfilename`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RepoFile {
    #[serde(alias = "rfilename", skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}
