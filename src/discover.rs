//! Search orchestration and post-filtering
//!
//! The Hub returns a broad, download-sorted listing; everything that narrows
//! it — size tier, category, popularity thresholds, GGUF availability — is
//! applied here. Filtered hits can be captured to a file and reloaded later
//! so a slow search does not have to be repeated.

use crate::extract;
use crate::hub::{Category, HubError, HubModel, ModelHub, SearchCriteria, SizeRange};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::fs;

/// Tag and keyword vocabulary per category, used for matching
const CATEGORY_VOCAB: &[(Category, &[&str], &[&str])] = &[
    (
        Category::Chat,
        &["conversational", "chat", "assistant", "instruct"],
        &["chat", "assistant", "instruct", "dialogue"],
    ),
    (
        Category::Coding,
        &["code", "programming", "coding", "codegen"],
        &["code", "coder", "coding", "program", "dev"],
    ),
    (
        Category::Writing,
        &["creative", "writing", "story", "content"],
        &["write", "creative", "story", "author"],
    ),
    (
        Category::Reasoning,
        &["reasoning", "math", "logic", "thinking"],
        &["reason", "math", "logic", "think", "analyz"],
    ),
    (
        Category::Multilingual,
        &["multilingual", "translation", "international"],
        &["multilingual", "translate", "language"],
    ),
    (
        Category::General,
        &["text-generation", "general-purpose"],
        &["general", "versatile", "multi"],
    ),
];

/// One filtered search result, ready for display and selection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    pub model_id: String,
    /// Extracted parameter count in billions, if any rule matched
    pub params: Option<f64>,
    pub downloads: u64,
    pub likes: u64,
    /// Leading tags, for display
    pub tags: Vec<String>,
    /// The raw upstream record, kept for assembly
    pub record: HubModel,
}

/// Search output persisted for `--save` / `--load` reuse
#[derive(Debug, Serialize, Deserialize)]
pub struct SearchCapture {
    pub fetched_at: DateTime<Utc>,
    pub hits: Vec<SearchHit>,
}

/// Run a search and narrow the listing to `criteria.limit` hits
pub async fn run_search(
    hub: &dyn ModelHub,
    criteria: &SearchCriteria,
) -> Result<Vec<SearchHit>, HubError> {
    let raw = hub.search(criteria).await?;
    tracing::info!(fetched = raw.len(), "Hub listing fetched, filtering");

    let mut hits = filter_models(raw, criteria);

    if criteria.require_gguf {
        let mut confirmed = Vec::new();
        for hit in hits {
            if has_gguf_files(hub, &hit.model_id).await {
                confirmed.push(hit);
            }
            if confirmed.len() >= criteria.limit {
                break;
            }
        }
        hits = confirmed;
    }

    hits.truncate(criteria.limit);
    Ok(hits)
}

/// Apply the pure post-filters (size tier, category, popularity thresholds)
pub fn filter_models(models: Vec<HubModel>, criteria: &SearchCriteria) -> Vec<SearchHit> {
    models
        .into_iter()
        .filter_map(|model| {
            let model_id = model.identifier()?.to_string();
            let params =
                extract::parameter_count(&model_id, model.card_data.as_ref(), &model.siblings);

            if criteria.size_range != SizeRange::Any {
                let (min, max) = criteria.size_range.bounds();
                match params {
                    Some(p) if p >= min && p <= max => {}
                    _ => return None,
                }
            }

            if criteria.category != Category::Any && !matches_category(&model, criteria.category) {
                return None;
            }

            if let Some(min) = criteria.min_downloads
                && model.downloads.unwrap_or(0) < min
            {
                return None;
            }
            if let Some(min) = criteria.min_likes
                && model.likes.unwrap_or(0) < min
            {
                return None;
            }

            Some(SearchHit {
                downloads: model.downloads.unwrap_or(0),
                likes: model.likes.unwrap_or(0),
                tags: model.tags.iter().take(5).cloned().collect(),
                params,
                model_id,
                record: model,
            })
        })
        .collect()
}

/// Whether a model's tags or free text place it in the category
pub fn matches_category(model: &HubModel, category: Category) -> bool {
    if category == Category::Any {
        return true;
    }

    let Some((_, cat_tags, keywords)) = CATEGORY_VOCAB.iter().find(|(c, _, _)| *c == category)
    else {
        return false;
    };

    let model_tags: Vec<String> = model.tags.iter().map(|t| t.to_lowercase()).collect();
    if model_tags.iter().any(|t| cat_tags.contains(&t.as_str())) {
        return true;
    }

    let mut text = model.identifier().unwrap_or_default().to_lowercase();
    if let Some(card) = &model.card_data {
        text.push(' ');
        text.push_str(&card.full_text().to_lowercase());
    }

    keywords.iter().any(|kw| text.contains(kw))
}

async fn has_gguf_files(hub: &dyn ModelHub, model_id: &str) -> bool {
    match hub.get_files(model_id).await {
        Ok(files) => files.iter().any(|f| {
            f.path
                .as_deref()
                .is_some_and(|p| p.to_lowercase().ends_with(".gguf"))
        }),
        Err(e) => {
            tracing::info!(model_id = %model_id, error = %e, "File listing unavailable, skipping GGUF check");
            false
        }
    }
}

/// Persist search hits for later reuse
pub async fn save_capture(path: &Path, hits: &[SearchHit]) -> Result<()> {
    let capture = SearchCapture {
        fetched_at: Utc::now(),
        hits: hits.to_vec(),
    };
    let content =
        serde_json::to_string_pretty(&capture).context("Failed to serialize search results")?;
    fs::write(path, content)
        .await
        .with_context(|| format!("Failed to save search results: {path:?}"))?;
    Ok(())
}

/// Load previously captured search hits
pub async fn load_capture(path: &Path) -> Result<Vec<SearchHit>> {
    let content = fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read search results: {path:?}"))?;
    let capture: SearchCapture =
        serde_json::from_str(&content).context("Failed to parse search results")?;
    tracing::info!(
        fetched_at = %capture.fetched_at,
        hits = capture.hits.len(),
        "Search results loaded"
    );
    Ok(capture.hits)
}
