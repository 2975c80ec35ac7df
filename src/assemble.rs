//! Model assembly
//!
//! Composes the extractors and the variant synthesizer into one
//! [`ModelRecord`]. Assembly is total: no field computation may fail, and a
//! field-poor but structurally complete record is always produced.
//! Correctness is enforced entirely by the validator.

use crate::extract;
use crate::hub::{HubModel, RepoFile};
use crate::schema::{InferenceSpeed, ModelRecord, PerformanceProfile, QualityLevel};
use crate::variants;
use std::collections::BTreeMap;

/// Known model families with an Ollama equivalent
///
/// Checked in order by substring; "llama" must stay first so that
/// "codellama" resolves the way the curated table always has.
const OLLAMA_FAMILIES: &[(&str, &str)] = &[
    ("llama", "llama3"),
    ("mistral", "mistral"),
    ("phi", "phi"),
    ("gemma", "gemma"),
    ("qwen", "qwen"),
    ("codellama", "codellama"),
    ("deepseek", "deepseek-coder"),
];

/// Recommended context window per use case, in tokens
const RECOMMENDED_CONTEXTS: &[(&str, u32)] = &[
    ("chat", 4096),
    ("coding", 8192),
    ("writing", 8192),
    ("reasoning", 4096),
    ("multilingual", 4096),
    ("general", 4096),
];

/// Parameter count assumed when every extraction rule missed, in billions.
/// Only used to size the variant set; the displayed count stays "Unknown".
const FALLBACK_PARAMS_BILLIONS: f64 = 7.0;

/// Build a catalog record from an upstream model record
///
/// `estimated_params` is the pre-extracted parameter count in billions;
/// `files` is the repository listing when enrichment succeeded, `None`
/// otherwise.
pub fn assemble(
    identifier: &str,
    record: &HubModel,
    category_hint: Option<&str>,
    estimated_params: Option<f64>,
    files: Option<&[RepoFile]>,
    default_context_window: u32,
) -> ModelRecord {
    let card = record.card_data.as_ref();

    let name = extract::model_name(identifier, card);
    let id = extract::slug(&name);
    let use_cases = extract::use_cases(&record.tags, category_hint);
    let context_window = extract::context_window(record.config.as_ref(), default_context_window);

    let params_for_variants = estimated_params.unwrap_or(FALLBACK_PARAMS_BILLIONS);
    let model_variants = variants::build_variants(params_for_variants, context_window, files);

    let mut links = BTreeMap::new();
    links.insert(
        "huggingFace".to_string(),
        format!("https://huggingface.co/{identifier}"),
    );
    if let Some(command) = ollama_command(&name, identifier) {
        links.insert("ollama".to_string(), command);
    }

    let recommended_contexts = recommended_contexts(&use_cases);

    ModelRecord {
        id,
        name,
        description: extract::description(card),
        parameters: extract::format_parameters(estimated_params),
        provider: extract::provider(identifier),
        license: extract::license(card),
        use_cases,
        tags: extract::derived_tags(record),
        variants: model_variants,
        links,
        quality_metrics: None,
        performance_profile: performance_profile(estimated_params),
        recommended_contexts: Some(recommended_contexts),
    }
}

/// Best-effort Ollama run command for a known model family
pub fn ollama_command(name: &str, identifier: &str) -> Option<String> {
    let name_lower = name.to_lowercase();
    let id_lower = identifier.to_lowercase();

    for (family, ollama_name) in OLLAMA_FAMILIES {
        if name_lower.contains(family) || id_lower.contains(family) {
            return Some(format!("ollama run {ollama_name}"));
        }
    }

    None
}

/// Speed/quality classification tiered on model size
pub fn performance_profile(params_billions: Option<f64>) -> Option<PerformanceProfile> {
    let params = params_billions?;

    let (inference_speed, quality_level) = if params < 7.0 {
        (InferenceSpeed::Fast, QualityLevel::Medium)
    } else if params < 15.0 {
        (InferenceSpeed::Fast, QualityLevel::High)
    } else if params < 40.0 {
        (InferenceSpeed::Medium, QualityLevel::High)
    } else {
        (InferenceSpeed::Slow, QualityLevel::High)
    };

    Some(PerformanceProfile {
        inference_speed,
        quality_level,
    })
}

fn recommended_contexts(use_cases: &[String]) -> BTreeMap<String, u32> {
    use_cases
        .iter()
        .map(|case| {
            let tokens = RECOMMENDED_CONTEXTS
                .iter()
                .find(|(name, _)| name == case)
                .map(|(_, tokens)| *tokens)
                .unwrap_or(4096);
            (case.clone(), tokens)
        })
        .collect()
}
