//! Catalog schema validation
//!
//! Pure predicates over structurally-untrusted JSON. Every check routes its
//! outcome through a returned error list; nothing here panics on missing or
//! wrong-typed fields, and an empty list means the input is valid. Input is
//! never mutated.

use regex::{Regex, RegexBuilder};
use serde_json::Value;
use std::collections::BTreeSet;
use std::sync::LazyLock;

const MODEL_REQUIRED: &[&str] = &[
    "id",
    "name",
    "description",
    "parameters",
    "provider",
    "license",
    "useCases",
    "tags",
    "variants",
    "links",
];

const VARIANT_REQUIRED: &[&str] = &[
    "quantization",
    "vramRequired",
    "ramRequired",
    "fileSize",
    "contextWindow",
];

const INFERENCE_SPEEDS: &[&str] = &["fast", "medium", "slow"];
const QUALITY_LEVELS: &[&str] = &["high", "medium", "low"];

static ID_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[a-z0-9.-]+$").unwrap());

static PARAMS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+(\.\d+)?[BM]$").unwrap());

// GGUF K-quants and legacy quants, standard float/int formats, AWQ/GPTQ
// with optional bit suffix, and the full/none literals.
static QUANTIZATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    RegexBuilder::new(
        r"^(Q[2-8]_[0-1]|Q[2-8]_K(_[SML])?|FP(16|32)|BF16|INT[248]|W[0-9]A[0-9]{1,2}|(AWQ|GPTQ)(-[0-9]+bit)?|full|none)$",
    )
    .case_insensitive(true)
    .build()
    .unwrap()
});

static URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    RegexBuilder::new(
        r"^https?://(([A-Z0-9]([A-Z0-9-]{0,61}[A-Z0-9])?\.)+[A-Z]{2,6}\.?|localhost|\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3})(:\d+)?(/?|[/?]\S+)$",
    )
    .case_insensitive(true)
    .build()
    .unwrap()
});

/// Validate one variant object; an empty result means valid
pub fn validate_variant(variant: &Value) -> Vec<String> {
    let mut errors = Vec::new();

    let Some(obj) = variant.as_object() else {
        return vec!["variant must be an object".to_string()];
    };

    for field in VARIANT_REQUIRED {
        if !obj.contains_key(*field) {
            errors.push(format!("Missing required field: {field}"));
        }
    }
    // Malformed shape is not worth further inspection
    if !errors.is_empty() {
        return errors;
    }

    match obj["quantization"].as_str() {
        Some(label) if QUANTIZATION_RE.is_match(label) => {}
        _ => errors.push(format!(
            "Invalid quantization format: {}",
            display(&obj["quantization"])
        )),
    }

    for field in &["vramRequired", "ramRequired", "fileSize", "contextWindow"] {
        match obj[*field].as_f64() {
            Some(value) if value > 0.0 => {}
            _ => errors.push(format!(
                "{field} must be a positive number, got: {}",
                display(&obj[*field])
            )),
        }
    }

    // Sanity ceilings are appended as errors, never hard failures
    if obj["vramRequired"].as_f64().unwrap_or(0.0) > 200.0 {
        errors.push(format!(
            "vramRequired seems too high: {}GB",
            display(&obj["vramRequired"])
        ));
    }
    if obj["ramRequired"].as_f64().unwrap_or(0.0) > 500.0 {
        errors.push(format!(
            "ramRequired seems too high: {}GB",
            display(&obj["ramRequired"])
        ));
    }
    if obj["fileSize"].as_f64().unwrap_or(0.0) > 300.0 {
        errors.push(format!(
            "fileSize seems too high: {}GB",
            display(&obj["fileSize"])
        ));
    }

    let context = obj["contextWindow"].as_f64().unwrap_or(0.0);
    if !(1000.0..=500_000.0).contains(&context) {
        errors.push(format!(
            "contextWindow seems unusual: {} tokens",
            display(&obj["contextWindow"])
        ));
    }

    errors
}

/// Validate one model object; an empty result means valid
pub fn validate_model(model: &Value) -> Vec<String> {
    let mut errors = Vec::new();

    let Some(obj) = model.as_object() else {
        return vec!["model must be an object".to_string()];
    };

    for field in MODEL_REQUIRED {
        if !obj.contains_key(*field) {
            errors.push(format!("Missing required field: {field}"));
        }
    }
    if !errors.is_empty() {
        return errors;
    }

    match obj["id"].as_str() {
        Some(id) if ID_RE.is_match(id) => {}
        _ => errors.push(format!(
            "Invalid ID format: {}. Use lowercase alphanumeric with hyphens and dots.",
            display(&obj["id"])
        )),
    }

    match obj["parameters"].as_str() {
        Some(params) if PARAMS_RE.is_match(params) => {}
        _ => errors.push(format!(
            "Invalid parameters format: {}. Use format like '7B' or '13B'.",
            display(&obj["parameters"])
        )),
    }

    match obj["useCases"].as_array() {
        Some(cases) if !cases.is_empty() => {}
        _ => errors.push("useCases must be a non-empty list".to_string()),
    }

    if !obj["tags"].is_array() {
        errors.push("tags must be a list".to_string());
    }

    match obj["variants"].as_array() {
        Some(variants) if !variants.is_empty() => {
            for (i, variant) in variants.iter().enumerate() {
                for error in validate_variant(variant) {
                    errors.push(format!("Variant {i}: {error}"));
                }
            }
        }
        _ => errors.push("variants must be a non-empty list".to_string()),
    }

    errors.extend(validate_links(&obj["links"]));

    if let Some(metrics) = obj.get("qualityMetrics") {
        errors.extend(validate_quality_metrics(metrics));
    }
    if let Some(profile) = obj.get("performanceProfile") {
        errors.extend(validate_performance_profile(profile));
    }
    if let Some(contexts) = obj.get("recommendedContexts") {
        errors.extend(validate_recommended_contexts(contexts));
    }

    errors
}

/// Validate a whole catalog (a JSON array of model objects)
pub fn validate_catalog(models: &Value) -> Vec<String> {
    let Some(list) = models.as_array() else {
        return vec!["Models must be a list".to_string()];
    };
    validate_models(list)
}

/// Validate an already-unwrapped list of model objects
pub fn validate_models(list: &[Value]) -> Vec<String> {
    let mut errors = Vec::new();

    // Duplicate ids are aggregated into one error naming every offender
    let ids: Vec<&str> = list
        .iter()
        .filter_map(|m| m.get("id").and_then(Value::as_str))
        .collect();
    let duplicates: BTreeSet<&str> = ids
        .iter()
        .filter(|id| ids.iter().filter(|other| other == id).count() > 1)
        .copied()
        .collect();
    if !duplicates.is_empty() {
        let joined: Vec<&str> = duplicates.into_iter().collect();
        errors.push(format!("Duplicate model IDs found: {}", joined.join(", ")));
    }

    for (i, model) in list.iter().enumerate() {
        let id = model
            .get("id")
            .and_then(Value::as_str)
            .unwrap_or("unknown");
        for error in validate_model(model) {
            errors.push(format!("Model {i} ({id}): {error}"));
        }
    }

    errors
}

fn validate_links(links: &Value) -> Vec<String> {
    let mut errors = Vec::new();

    let non_empty = links.as_object().is_some_and(|map| !map.is_empty());
    if !non_empty {
        return vec!["links must contain at least one link".to_string()];
    }

    for (key, value) in links.as_object().into_iter().flatten() {
        if key.as_str() == "ollama" {
            // Ollama links are commands, not URLs
            let ok = value
                .as_str()
                .is_some_and(|cmd| cmd.starts_with("ollama run "));
            if !ok {
                errors.push(format!(
                    "Ollama link should start with 'ollama run ', got: {}",
                    display(value)
                ));
            }
        } else {
            let ok = value.as_str().is_some_and(|url| URL_RE.is_match(url));
            if !ok {
                errors.push(format!("Invalid URL for {key}: {}", display(value)));
            }
        }
    }

    errors
}

fn validate_quality_metrics(metrics: &Value) -> Vec<String> {
    let mut errors = Vec::new();

    let Some(obj) = metrics.as_object() else {
        return vec!["qualityMetrics must be an object".to_string()];
    };

    let Some(rating) = obj.get("overallRating") else {
        return vec!["qualityMetrics missing required field: overallRating".to_string()];
    };
    match rating.as_f64() {
        Some(value) if (0.0..=5.0).contains(&value) => {}
        _ => errors.push(format!(
            "overallRating must be between 0 and 5, got: {}",
            display(rating)
        )),
    }

    for (field, max) in &[("mmlu", 100.0), ("humanEval", 100.0), ("mt_bench", 10.0)] {
        if let Some(score) = obj.get(*field) {
            match score.as_f64() {
                Some(value) if (0.0..=*max).contains(&value) => {}
                _ => errors.push(format!(
                    "{field} must be between 0 and {max}, got: {}",
                    display(score)
                )),
            }
        }
    }

    errors
}

fn validate_performance_profile(profile: &Value) -> Vec<String> {
    let mut errors = Vec::new();

    let Some(obj) = profile.as_object() else {
        return vec!["performanceProfile must be an object".to_string()];
    };

    for field in &["inferenceSpeed", "qualityLevel"] {
        if !obj.contains_key(*field) {
            errors.push(format!("performanceProfile missing required field: {field}"));
        }
    }
    if !errors.is_empty() {
        return errors;
    }

    let speed_ok = obj["inferenceSpeed"]
        .as_str()
        .is_some_and(|s| INFERENCE_SPEEDS.contains(&s));
    if !speed_ok {
        errors.push(format!(
            "Invalid inferenceSpeed: {}",
            display(&obj["inferenceSpeed"])
        ));
    }

    let level_ok = obj["qualityLevel"]
        .as_str()
        .is_some_and(|s| QUALITY_LEVELS.contains(&s));
    if !level_ok {
        errors.push(format!(
            "Invalid qualityLevel: {}",
            display(&obj["qualityLevel"])
        ));
    }

    errors
}

fn validate_recommended_contexts(contexts: &Value) -> Vec<String> {
    let mut errors = Vec::new();

    let Some(obj) = contexts.as_object() else {
        return vec!["recommendedContexts must be a dictionary".to_string()];
    };

    for (use_case, size) in obj {
        if size.as_u64().is_none() {
            errors.push(format!(
                "Context size for {use_case} must be a positive integer, got: {}",
                display(size)
            ));
        }
    }

    errors
}

/// Render a JSON value into an error message without the quoting noise
/// `Value`'s Display adds around strings
fn display(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
