//! Quantization variant synthesis
//!
//! Builds the variant list for a model either from a size-tiered default set
//! mapped through the estimator, or from real GGUF files in the repository
//! listing. When both are available the file-confirmed data wins for any
//! label the two sets share.

use crate::estimate::{estimate_variant, variant_from_file_size};
use crate::hub::RepoFile;
use crate::schema::Variant;
use regex::{Regex, RegexBuilder};
use std::collections::BTreeMap;
use std::sync::LazyLock;

// Ordered filename patterns; the specific K-quant forms must come before
// the bare Qn alternative.
static GGUF_LABEL_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"[_-](Q\d+_K_[SML])",
        r"[_-](Q\d+_\d+)",
        r"[_-](Q\d+)",
        r"[_-](FP16|FP32)",
    ]
    .into_iter()
    .map(|pattern| {
        RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .unwrap()
    })
    .collect()
});

/// Default quantization labels offered for a model of the given size
///
/// Smaller models get a short list; past 40B the full S/M spread is worth
/// offering because the aggressive quantizations are the only ones that fit
/// consumer hardware.
pub fn tier_labels(params_billions: f64) -> &'static [&'static str] {
    if params_billions < 3.0 {
        &["Q4_K_M", "Q5_K_M", "Q8_0"]
    } else if params_billions < 10.0 {
        &["Q4_0", "Q4_K_M", "Q5_K_M", "Q8_0"]
    } else if params_billions < 20.0 {
        &["Q3_K_M", "Q4_0", "Q4_K_M", "Q5_K_M", "Q6_K", "Q8_0"]
    } else if params_billions < 40.0 {
        &["Q2_K", "Q3_K_M", "Q4_0", "Q4_K_M", "Q5_K_M", "Q6_K", "Q8_0"]
    } else {
        &[
            "Q2_K", "Q3_K_S", "Q3_K_M", "Q4_0", "Q4_K_S", "Q4_K_M", "Q5_K_S", "Q5_K_M", "Q6_K",
            "Q8_0",
        ]
    }
}

/// Synthesize the size-tiered default variant set
pub fn synthesize(params_billions: f64, context_window: u32) -> Vec<Variant> {
    tier_labels(params_billions)
        .iter()
        .map(|label| estimate_variant(params_billions, label, context_window))
        .collect()
}

/// Extract a quantization label from a GGUF filename, e.g.
/// "llama-7b-q5_k_s.gguf" -> "Q5_K_S"
pub fn parse_gguf_label(filename: &str) -> Option<String> {
    for re in GGUF_LABEL_RES.iter() {
        if let Some(caps) = re.captures(filename) {
            return Some(caps[1].to_uppercase());
        }
    }
    None
}

/// Parse confirmed variants from a repository file listing
///
/// Total function: entries without a parseable GGUF label or a byte size are
/// skipped. Sizes come from the actual files; VRAM/RAM use the estimator's
/// ratios. One variant per label, first file wins.
pub fn parse_from_files(files: &[RepoFile], context_window: u32) -> Vec<Variant> {
    let mut by_label: BTreeMap<String, Variant> = BTreeMap::new();

    for file in files {
        let Some(path) = file.path.as_deref() else {
            continue;
        };
        if !path.to_lowercase().ends_with(".gguf") {
            continue;
        }
        let Some(label) = parse_gguf_label(path) else {
            continue;
        };
        let Some(size) = file.size else {
            continue;
        };

        let file_gb = ((size as f64 / (1024.0 * 1024.0 * 1024.0)) * 10.0).round() / 10.0;
        by_label
            .entry(label.clone())
            .or_insert_with(|| variant_from_file_size(file_gb, &label, context_window));
    }

    by_label.into_values().collect()
}

/// Reconcile a synthesized set against file-confirmed variants
///
/// If the two sets share at least one label, only the shared labels survive
/// and the file-derived numbers are kept (real data over estimate), in tier
/// order. With no overlap the synthesized set is returned unchanged.
pub fn reconcile(synthesized: Vec<Variant>, confirmed: &[Variant]) -> Vec<Variant> {
    let confirmed_by_label: BTreeMap<&str, &Variant> = confirmed
        .iter()
        .map(|v| (v.quantization.as_str(), v))
        .collect();

    let intersection: Vec<Variant> = synthesized
        .iter()
        .filter_map(|s| confirmed_by_label.get(s.quantization.as_str()))
        .map(|v| (*v).clone())
        .collect();

    if intersection.is_empty() {
        synthesized
    } else {
        intersection
    }
}

/// Build the final variant list for a model
///
/// `files` is `None` when the repository listing could not be fetched;
/// enrichment is best-effort and its absence falls back to the synthesized
/// defaults.
pub fn build_variants(
    params_billions: f64,
    context_window: u32,
    files: Option<&[RepoFile]>,
) -> Vec<Variant> {
    let synthesized = synthesize(params_billions, context_window);

    match files {
        Some(files) => {
            let confirmed = parse_from_files(files, context_window);
            reconcile(synthesized, &confirmed)
        }
        None => synthesized,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gguf(path: &str, size_gb: u64) -> RepoFile {
        RepoFile {
            path: Some(path.to_string()),
            size: Some(size_gb * 1024 * 1024 * 1024),
        }
    }

    #[test]
    fn test_tier_labels() {
        assert_eq!(tier_labels(1.5), &["Q4_K_M", "Q5_K_M", "Q8_0"]);
        assert_eq!(tier_labels(7.0), &["Q4_0", "Q4_K_M", "Q5_K_M", "Q8_0"]);
        assert_eq!(tier_labels(13.0).len(), 6);
        assert_eq!(tier_labels(30.0).len(), 7);
        assert_eq!(tier_labels(70.0).len(), 10);
    }

    #[test]
    fn test_synthesize_orders_by_tier() {
        let variants = synthesize(7.0, 8192);
        let labels: Vec<&str> = variants.iter().map(|v| v.quantization.as_str()).collect();
        assert_eq!(labels, vec!["Q4_0", "Q4_K_M", "Q5_K_M", "Q8_0"]);
        assert!(variants.iter().all(|v| v.context_window == 8192));
    }

    #[test]
    fn test_parse_gguf_label() {
        assert_eq!(
            parse_gguf_label("model-Q4_K_M.gguf"),
            Some("Q4_K_M".to_string())
        );
        assert_eq!(
            parse_gguf_label("llama-7b-q5_k_s.gguf"),
            Some("Q5_K_S".to_string())
        );
        assert_eq!(parse_gguf_label("model-Q4_0.gguf"), Some("Q4_0".to_string()));
        assert_eq!(
            parse_gguf_label("mistral-7b-fp16.gguf"),
            Some("FP16".to_string())
        );
        assert_eq!(parse_gguf_label("notes.txt"), None);
    }

    #[test]
    fn test_parse_from_files_skips_non_gguf() {
        let files = vec![
            gguf("model-Q4_K_M.gguf", 4),
            RepoFile {
                path: Some("README.md".to_string()),
                size: Some(100),
            },
            RepoFile {
                path: None,
                size: Some(100),
            },
        ];
        let variants = parse_from_files(&files, 8192);
        assert_eq!(variants.len(), 1);
        assert_eq!(variants[0].quantization, "Q4_K_M");
        assert_eq!(variants[0].file_size, 4.0);
    }

    #[test]
    fn test_parse_from_files_uses_real_sizes() {
        let variants = parse_from_files(&[gguf("model-Q8_0.gguf", 8)], 8192);
        assert_eq!(variants[0].file_size, 8.0);
        // vram = round(8 * 1.2) = 10, ram = round(8 * 1.5) = 12
        assert_eq!(variants[0].vram_required, 10);
        assert_eq!(variants[0].ram_required, 12);
    }

    #[test]
    fn test_reconcile_keeps_intersection_with_real_data() {
        let synthesized = synthesize(7.0, 8192);
        let confirmed = parse_from_files(
            &[gguf("model-Q4_K_M.gguf", 4), gguf("model-Q6_K.gguf", 6)],
            8192,
        );

        let result = reconcile(synthesized, &confirmed);
        // Q6_K is not in the 7B tier, so only Q4_K_M survives, with the
        // file-derived size
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].quantization, "Q4_K_M");
        assert_eq!(result[0].file_size, 4.0);
    }

    #[test]
    fn test_reconcile_no_overlap_keeps_synthesized() {
        let synthesized = synthesize(7.0, 8192);
        let confirmed = parse_from_files(&[gguf("model-Q6_K.gguf", 6)], 8192);

        let result = reconcile(synthesized.clone(), &confirmed);
        assert_eq!(result, synthesized);
    }

    #[test]
    fn test_build_variants_without_files() {
        let variants = build_variants(7.0, 8192, None);
        assert_eq!(variants.len(), 4);
    }

    #[test]
    fn test_build_variants_with_files() {
        let files = vec![gguf("model-Q4_0.gguf", 4), gguf("model-Q8_0.gguf", 8)];
        let variants = build_variants(7.0, 8192, Some(&files));
        let labels: Vec<&str> = variants.iter().map(|v| v.quantization.as_str()).collect();
        assert_eq!(labels, vec!["Q4_0", "Q8_0"]);
    }
}
