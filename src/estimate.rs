//! Resource estimation for quantized model variants
//!
//! Maps quantization labels to approximate bits-per-parameter and derives
//! file size / VRAM / RAM figures from a parameter count. These are rough,
//! order-of-magnitude estimates, not measured values; callers must not treat
//! them as guarantees.

use crate::schema::Variant;

/// Approximate bits per parameter for a quantization label
///
/// Unknown labels degrade to 4.5 bits (the Q4_K_M equivalent) rather than
/// erroring; estimation must never fail.
pub fn bits_per_parameter(quantization: &str) -> f64 {
    match quantization {
        // GGUF quantizations
        "Q2_K" => 2.5,
        "Q3_K_S" => 3.0,
        "Q3_K_M" => 3.5,
        "Q3_K_L" => 3.75,
        "Q4_0" => 4.0,
        "Q4_1" => 4.5,
        "Q4_K_S" => 4.0,
        "Q4_K_M" => 4.5,
        "Q5_0" => 5.0,
        "Q5_1" => 5.5,
        "Q5_K_S" => 5.0,
        "Q5_K_M" => 5.5,
        "Q6_K" => 6.5,
        "Q8_0" => 8.5,
        // Standard formats
        "FP16" | "BF16" => 16.0,
        "FP32" => 32.0,
        "INT4" => 4.0,
        "INT8" => 8.0,
        // AWQ/GPTQ (approximate)
        "AWQ" | "GPTQ" | "GPTQ-4bit" => 4.0,
        "GPTQ-8bit" => 8.0,
        "W4A16" => 4.5,
        // Full precision
        "Full" | "full" | "None" | "none" => 16.0,
        _ => 4.5,
    }
}

/// Estimate resource requirements for one variant of a model
///
/// `file_size = params * bits / 8` GB rounded to one decimal, floored at
/// 0.1GB. VRAM adds ~20% loading overhead; RAM covers the weights plus a
/// per-token context allowance of 2 bytes.
pub fn estimate_variant(params_billions: f64, quantization: &str, context_window: u32) -> Variant {
    let bits = bits_per_parameter(quantization);
    let file_size = ((params_billions * bits / 8.0) * 10.0).round() / 10.0;
    variant_from_file_size(file_size, quantization, context_window)
}

/// Build a variant from a known file size in GB, applying the same VRAM/RAM
/// ratios as [`estimate_variant`]
///
/// Used when a repository listing supplies real byte counts instead of a
/// parameter-based estimate.
pub fn variant_from_file_size(file_size: f64, quantization: &str, context_window: u32) -> Variant {
    let file_size = file_size.max(0.1);

    let vram_required = ((file_size * 1.2).round() as i64).max(1) as u32;

    let context_overhead = f64::from(context_window) * 2.0 / (1024.0 * 1024.0 * 1024.0);
    let ram_required = ((file_size * 1.5 + context_overhead).round() as i64).max(2) as u32;

    Variant {
        quantization: quantization.to_string(),
        vram_required,
        ram_required,
        file_size,
        context_window,
    }
}
