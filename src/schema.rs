//! Catalog schema types
//!
//! The persisted unit is [`ModelRecord`], serialized with camelCase keys to
//! match the application's `models.json` layout. Records are produced by the
//! assembler and gated by the validator before they reach disk.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One curated model in the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelRecord {
    /// Catalog slug (lowercase alphanumeric with hyphens and dots)
    pub id: String,
    /// Display name
    pub name: String,
    /// Short description (at most 200 characters)
    pub description: String,
    /// Parameter count label, e.g. "7B" or "350M"
    pub parameters: String,
    /// Organization the model comes from
    pub provider: String,
    /// License display text
    pub license: String,
    /// Non-empty, sorted list of use-case categories
    pub use_cases: Vec<String>,
    /// Derived tags (possibly empty)
    pub tags: Vec<String>,
    /// Non-empty, ordered list of deployable quantizations
    pub variants: Vec<Variant>,
    /// At least one entry; values are URLs, except the "ollama" key which
    /// holds an `ollama run` command
    pub links: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality_metrics: Option<QualityMetrics>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub performance_profile: Option<PerformanceProfile>,
    /// Recommended context window per use case, in tokens
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommended_contexts: Option<BTreeMap<String, u32>>,
}

/// One quantized, deployable form of a model with resource estimates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Variant {
    /// Quantization label, e.g. "Q4_K_M" or "FP16"
    pub quantization: String,
    /// Estimated VRAM requirement in GB
    pub vram_required: u32,
    /// Estimated system RAM requirement in GB
    pub ram_required: u32,
    /// File size in GB
    pub file_size: f64,
    /// Context window in tokens
    pub context_window: u32,
}

/// Benchmark-derived quality metrics, curated manually
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityMetrics {
    /// Overall rating on a 0-5 scale
    pub overall_rating: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mmlu: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub human_eval: Option<f64>,
    /// Kept snake_case on the wire; the application schema predates the
    /// camelCase convention for this one key
    #[serde(rename = "mt_bench", skip_serializing_if = "Option::is_none")]
    pub mt_bench: Option<f64>,
}

/// Coarse speed/quality classification derived from model size
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceProfile {
    pub inference_speed: InferenceSpeed,
    pub quality_level: QualityLevel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InferenceSpeed {
    Fast,
    Medium,
    Slow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityLevel {
    High,
    Medium,
    Low,
}
