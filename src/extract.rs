//! Per-field metadata extraction heuristics
//!
//! Each function derives one catalog field from a raw upstream record and is
//! total: malformed input resolves to a documented default, never an error.
//! The heuristics are ordered rule lists over identifiers, tags and card
//! text; first match wins.

use crate::hub::{CardData, HubModel, RepoFile};
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::LazyLock;

/// Organization slug to display name, matched by substring
const PROVIDERS: &[(&str, &str)] = &[
    ("meta-llama", "Meta"),
    ("mistralai", "Mistral AI"),
    ("google", "Google"),
    ("microsoft", "Microsoft"),
    ("tiiuae", "TII UAE"),
    ("01-ai", "01.AI"),
    ("qwen", "Alibaba"),
    ("deepseek", "DeepSeek"),
    ("anthropic", "Anthropic"),
    ("openai", "OpenAI"),
];

/// Common license identifiers to display text, matched by substring on a
/// hyphen-joined lowercase form
const LICENSES: &[(&str, &str)] = &[
    ("apache-2.0", "Apache 2.0"),
    ("mit", "MIT"),
    ("llama3", "Llama 3 Community License"),
    ("llama2", "Llama 2 Community License"),
    ("gpl", "GPL"),
    ("cc-by-nc-4.0", "Research Only"),
];

/// Use-case category to the tag keywords that imply it
const USE_CASE_KEYWORDS: &[(&str, &[&str])] = &[
    ("chat", &["chat", "conversational", "assistant", "instruct"]),
    ("coding", &["code", "coding", "programming"]),
    ("writing", &["creative", "writing", "story"]),
    ("reasoning", &["math", "reasoning", "logic"]),
    ("multilingual", &["multilingual", "translation"]),
];

/// Upstream config keys that may carry the context window, in priority order
const CONTEXT_KEYS: &[&str] = &[
    "max_position_embeddings",
    "n_positions",
    "max_seq_length",
    "model_max_length",
];

static NAME_SUFFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)-instruct|-chat|-base").unwrap());

static NON_SLUG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^a-z0-9\s-]").unwrap());
static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
static HYPHEN_RUN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"-+").unwrap());

static PARAM_SUFFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+(?:\.\d+)?)b").unwrap());
static PARAM_DELIMITED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-(\d+)-|_(\d+)_").unwrap());
static BILLION_PHRASE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+(?:\.\d+)?)\s*billion").unwrap());
static PARAM_PHRASE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+(?:\.\d+)?)b\s*param").unwrap());

/// Display name for a model
///
/// Prefers an explicit card name; otherwise cleans the final path segment of
/// the identifier. Role suffixes (`-instruct`, `-chat`, `-base`) are
/// stripped; numeric size suffixes like "8B" are deliberately kept.
pub fn model_name(identifier: &str, card: Option<&CardData>) -> String {
    if let Some(name) = card.and_then(|c| c.model_name.as_deref())
        && !name.trim().is_empty()
    {
        return name.trim().to_string();
    }

    let segment = identifier.rsplit('/').next().unwrap_or(identifier);
    let stripped = NAME_SUFFIX_RE.replace_all(segment, "");
    stripped.replace(['-', '_'], " ").trim().to_string()
}

/// Catalog slug derived from a display name
pub fn slug(name: &str) -> String {
    let lower = name.to_lowercase();
    let cleaned = NON_SLUG_RE.replace_all(&lower, "");
    let hyphenated = WHITESPACE_RE.replace_all(cleaned.trim(), "-");
    let collapsed = HYPHEN_RUN_RE.replace_all(&hyphenated, "-");
    collapsed.trim_matches('-').to_string()
}

/// Provider display name from the organization segment of the identifier
pub fn provider(identifier: &str) -> String {
    let org = identifier
        .split('/')
        .next()
        .unwrap_or(identifier)
        .to_lowercase();

    for (key, display) in PROVIDERS {
        if org.contains(key) {
            return (*display).to_string();
        }
    }

    title_case(&org.replace('-', " "))
}

/// License display text from card data
///
/// Unrecognized license text passes through unchanged; a missing field
/// defaults to "Custom".
pub fn license(card: Option<&CardData>) -> String {
    let Some(raw) = card.and_then(|c| c.license_text()) else {
        return "Custom".to_string();
    };

    let normalized = raw.to_lowercase().replace(' ', "-");
    for (key, display) in LICENSES {
        if normalized.contains(key) {
            return (*display).to_string();
        }
    }

    raw
}

/// Use-case categories from tags plus an optional category hint
///
/// Empty results default to {general}; more than two matches also add
/// general (broad-applicability heuristic). Sorted and deduplicated.
pub fn use_cases(tags: &[String], category_hint: Option<&str>) -> Vec<String> {
    let mut cases: BTreeSet<String> = BTreeSet::new();

    if let Some(hint) = category_hint
        && hint != "any"
    {
        cases.insert(hint.to_string());
    }

    let tag_text = tags.join(" ").to_lowercase();
    for (case, keywords) in USE_CASE_KEYWORDS {
        if keywords.iter().any(|kw| tag_text.contains(kw)) {
            cases.insert((*case).to_string());
        }
    }

    if cases.is_empty() {
        cases.insert("general".to_string());
    }
    if cases.len() > 2 {
        cases.insert("general".to_string());
    }

    cases.into_iter().collect()
}

/// Catalog tags derived from popularity counters and upstream tag text
pub fn derived_tags(record: &HubModel) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();

    if record.downloads.unwrap_or(0) > 100_000 || record.likes.unwrap_or(0) > 100 {
        tags.push("popular".to_string());
    }

    let tag_text = record.tags.join(" ").to_lowercase();
    if ["apache", "mit", "open"]
        .iter()
        .any(|kw| tag_text.contains(kw))
    {
        tags.push("open-source".to_string());
    }
    if tag_text.contains("efficient") || tag_text.contains("fast") {
        tags.push("efficient".to_string());
    }

    tags
}

/// Short description from card data, truncated to 200 characters
pub fn description(card: Option<&CardData>) -> String {
    let text = card.and_then(|c| {
        c.description
            .as_deref()
            .map(|s| s.to_string())
            .or_else(|| c.base_model_text())
    });

    match text {
        Some(t) if !t.trim().is_empty() => t.chars().take(200).collect(),
        _ => "Large language model for text generation tasks".to_string(),
    }
}

/// Parameter count in billions, or `None` when nothing matches
///
/// Ordered rules: size suffix in the identifier, delimited bare number in
/// the identifier, "N billion" phrase in the card, "Nb param" phrase in the
/// card, then largest repository file at 2 bytes per parameter.
pub fn parameter_count(
    identifier: &str,
    card: Option<&CardData>,
    files: &[RepoFile],
) -> Option<f64> {
    let id_lower = identifier.to_lowercase();

    if let Some(caps) = PARAM_SUFFIX_RE.captures(&id_lower) {
        return caps[1].parse().ok();
    }
    if let Some(caps) = PARAM_DELIMITED_RE.captures(&id_lower) {
        let digits = caps.get(1).or_else(|| caps.get(2))?;
        return digits.as_str().parse().ok();
    }

    if let Some(card) = card {
        let card_text = card.full_text().to_lowercase();
        if let Some(caps) = BILLION_PHRASE_RE.captures(&card_text) {
            return caps[1].parse().ok();
        }
        if let Some(caps) = PARAM_PHRASE_RE.captures(&card_text) {
            return caps[1].parse().ok();
        }
    }

    // Last resort: largest file as proxy, ~2 bytes per parameter in FP16
    let max_size = files.iter().filter_map(|f| f.size).max().unwrap_or(0);
    if max_size > 0 {
        return Some(max_size as f64 / (1024.0 * 1024.0 * 1024.0) / 2.0);
    }

    None
}

/// Context window from the upstream config blob
pub fn context_window(config: Option<&serde_json::Value>, fallback: u32) -> u32 {
    if let Some(cfg) = config {
        for key in CONTEXT_KEYS {
            if let Some(value) = cfg.get(key).and_then(|v| v.as_u64()) {
                return value.min(u64::from(u32::MAX)) as u32;
            }
        }
    }
    fallback
}

/// Format a parameter count for display, e.g. "7B", "3.8B", "350M"
///
/// `None` (and non-positive counts) format as "Unknown", which downstream
/// validation rejects; an unknown count is never coerced to zero.
pub fn format_parameters(params: Option<f64>) -> String {
    match params {
        Some(p) if p >= 1.0 => format!("{p:.1}B").replace(".0B", "B"),
        Some(p) if p > 0.0 => format!("{}M", (p * 1000.0) as i64),
        _ => "Unknown".to_string(),
    }
}

fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hub::HubModel;

    fn card(json: &str) -> CardData {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_name_from_identifier() {
        let name = model_name("meta-llama/Meta-Llama-3-8B", None);
        // The "8B" size marker survives name cleanup; only role suffixes go
        assert_eq!(name, "Meta Llama 3 8B");
    }

    #[test]
    fn test_name_strips_role_suffixes() {
        assert_eq!(
            model_name("mistralai/Mistral-7B-Instruct", None),
            "Mistral 7B"
        );
        assert_eq!(model_name("org/model-chat", None), "model");
        assert!(!model_name("org/Some-Model-Base", None).to_lowercase().contains("base"));
    }

    #[test]
    fn test_name_prefers_card() {
        let c = card(r#"{"model_name": "Fancy Model"}"#);
        assert_eq!(model_name("org/whatever-7b", Some(&c)), "Fancy Model");
    }

    #[test]
    fn test_slug() {
        assert_eq!(slug("Meta Llama 3 8B"), "meta-llama-3-8b");
        assert_eq!(slug("  Phi 1.5  "), "phi-15");
        assert_eq!(slug("a -- b"), "a-b");
        assert_eq!(slug("-edge-"), "edge");
    }

    #[test]
    fn test_provider_table() {
        assert_eq!(provider("meta-llama/Meta-Llama-3-8B"), "Meta");
        assert_eq!(provider("mistralai/Mistral-7B-v0.1"), "Mistral AI");
        assert_eq!(provider("Qwen/Qwen2-7B"), "Alibaba");
    }

    #[test]
    fn test_provider_fallback_title_case() {
        assert_eq!(provider("some-startup/their-model"), "Some Startup");
    }

    #[test]
    fn test_license_normalization() {
        let c = card(r#"{"license": "apache-2.0"}"#);
        assert_eq!(license(Some(&c)), "Apache 2.0");

        let c = card(r#"{"license": "llama3"}"#);
        assert_eq!(license(Some(&c)), "Llama 3 Community License");
    }

    #[test]
    fn test_license_passthrough_and_default() {
        let c = card(r#"{"license": "xyz-license"}"#);
        assert_eq!(license(Some(&c)), "xyz-license");

        assert_eq!(license(None), "Custom");
        let c = card(r#"{}"#);
        assert_eq!(license(Some(&c)), "Custom");
    }

    #[test]
    fn test_use_cases_from_tags() {
        let tags = vec!["conversational".to_string(), "text-generation".to_string()];
        assert_eq!(use_cases(&tags, None), vec!["chat"]);
    }

    #[test]
    fn test_use_cases_default_general() {
        assert_eq!(use_cases(&[], None), vec!["general"]);
        assert_eq!(use_cases(&[], Some("any")), vec!["general"]);
    }

    #[test]
    fn test_use_cases_broad_adds_general() {
        let tags = vec![
            "chat".to_string(),
            "code".to_string(),
            "reasoning".to_string(),
        ];
        let cases = use_cases(&tags, None);
        assert!(cases.contains(&"general".to_string()));
        assert_eq!(cases.len(), 4);
        // Sorted output
        let mut sorted = cases.clone();
        sorted.sort();
        assert_eq!(cases, sorted);
    }

    #[test]
    fn test_use_cases_hint_included() {
        let cases = use_cases(&[], Some("coding"));
        assert_eq!(cases, vec!["coding"]);
    }

    #[test]
    fn test_derived_tags_popular() {
        let record = HubModel {
            downloads: Some(500_000),
            ..Default::default()
        };
        assert_eq!(derived_tags(&record), vec!["popular"]);

        let record = HubModel {
            likes: Some(250),
            ..Default::default()
        };
        assert_eq!(derived_tags(&record), vec!["popular"]);
    }

    #[test]
    fn test_derived_tags_open_source_and_efficient() {
        let record = HubModel {
            tags: vec!["apache-2.0".to_string(), "fast-inference".to_string()],
            ..Default::default()
        };
        let tags = derived_tags(&record);
        assert!(tags.contains(&"open-source".to_string()));
        assert!(tags.contains(&"efficient".to_string()));
    }

    #[test]
    fn test_description_truncated() {
        let long = "x".repeat(300);
        let c = card(&format!(r#"{{"description": "{long}"}}"#));
        assert_eq!(description(Some(&c)).chars().count(), 200);
    }

    #[test]
    fn test_description_fallback_names_no_model() {
        let text = description(None);
        assert_eq!(text, "Large language model for text generation tasks");
    }

    #[test]
    fn test_parameter_count_from_identifier() {
        assert_eq!(
            parameter_count("meta-llama/Meta-Llama-3-8B", None, &[]),
            Some(8.0)
        );
        assert_eq!(
            parameter_count("microsoft/phi-3.8b-mini", None, &[]),
            Some(3.8)
        );
    }

    #[test]
    fn test_parameter_count_delimited() {
        assert_eq!(parameter_count("org/falcon-40-tuned", None, &[]), Some(40.0));
        assert_eq!(parameter_count("org/model_13_v2", None, &[]), Some(13.0));
    }

    #[test]
    fn test_parameter_count_from_card_text() {
        let c = card(r#"{"summary": "A 7 billion parameter model"}"#);
        assert_eq!(parameter_count("org/model", Some(&c), &[]), Some(7.0));
    }

    #[test]
    fn test_parameter_count_from_file_size() {
        // 14GB largest file / 2 bytes per param = 7B
        let files = vec![
            RepoFile {
                path: Some("model.safetensors".to_string()),
                size: Some(14 * 1024 * 1024 * 1024),
            },
            RepoFile {
                path: Some("config.json".to_string()),
                size: Some(1024),
            },
        ];
        let params = parameter_count("org/model", None, &files).unwrap();
        assert!((params - 7.0).abs() < 1e-9);
    }

    #[test]
    fn test_parameter_count_none() {
        assert_eq!(parameter_count("org/model", None, &[]), None);
    }

    #[test]
    fn test_context_window_keys() {
        let cfg = serde_json::json!({"max_position_embeddings": 32768});
        assert_eq!(context_window(Some(&cfg), 8192), 32768);

        let cfg = serde_json::json!({"n_positions": 2048});
        assert_eq!(context_window(Some(&cfg), 8192), 2048);

        assert_eq!(context_window(None, 8192), 8192);
    }

    #[test]
    fn test_format_parameters() {
        assert_eq!(format_parameters(Some(7.0)), "7B");
        assert_eq!(format_parameters(Some(3.8)), "3.8B");
        assert_eq!(format_parameters(Some(0.35)), "350M");
        assert_eq!(format_parameters(None), "Unknown");
    }
}
