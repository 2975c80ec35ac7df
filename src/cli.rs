//! Interactive prompt and terminal rendering layer
//!
//! Thin plumbing around dialoguer/console: result tables, candidate
//! selection, record preview and field editing. Malformed selections are
//! reported and re-prompted, never propagated.

use crate::discover::SearchHit;
use crate::schema::ModelRecord;
use anyhow::Result;
use console::style;
use dialoguer::{Confirm, Input};

/// Format large counters with K/M suffixes
pub fn format_number(n: u64) -> String {
    if n >= 1_000_000 {
        format!("{:.1}M", n as f64 / 1_000_000.0)
    } else if n >= 1_000 {
        format!("{:.1}K", n as f64 / 1_000.0)
    } else {
        n.to_string()
    }
}

/// Print search hits as a numbered table
pub fn display_hits(hits: &[SearchHit]) {
    if hits.is_empty() {
        println!("{}", style("No models found matching criteria").yellow());
        return;
    }

    println!(
        "{:>3}  {:<42} {:>8} {:>10} {:>8}  {}",
        style("#").dim(),
        style("Model ID").bold(),
        style("Size").bold(),
        style("Downloads").bold(),
        style("Likes").bold(),
        style("Tags").bold(),
    );

    for (i, hit) in hits.iter().enumerate() {
        let size = hit
            .params
            .map(|p| format!("{p:.1}B"))
            .unwrap_or_else(|| "?".to_string());

        println!(
            "{:>3}  {:<42} {:>8} {:>10} {:>8}  {}",
            i + 1,
            style(&hit.model_id).cyan(),
            size,
            format_number(hit.downloads),
            format_number(hit.likes),
            hit.tags
                .iter()
                .take(3)
                .cloned()
                .collect::<Vec<_>>()
                .join(", "),
        );
    }
}

/// Parse a selection string against a result count
///
/// `"all"` selects everything, `"q"` selects nothing, otherwise
/// comma-separated 1-based indices. `None` means the input was malformed or
/// out of range.
pub fn parse_selection(input: &str, count: usize) -> Option<Vec<usize>> {
    let trimmed = input.trim().to_lowercase();

    if trimmed == "q" {
        return Some(Vec::new());
    }
    if trimmed == "all" {
        return Some((1..=count).collect());
    }

    let indices: Option<Vec<usize>> = trimmed
        .split(',')
        .map(|part| part.trim().parse::<usize>().ok())
        .collect();

    let indices = indices?;
    if !indices.is_empty() && indices.iter().all(|i| (1..=count).contains(i)) {
        Some(indices)
    } else {
        None
    }
}

/// Prompt for model selection, re-prompting until the input parses
pub fn select_indices(count: usize) -> Result<Vec<usize>> {
    println!("\n{}", style("Select models to add:").bold());
    println!("Enter model numbers separated by commas (e.g. 1,3,5)");
    println!("Or enter 'all' to select all models, 'q' to quit");

    loop {
        let input: String = Input::new()
            .with_prompt("Your selection")
            .default("q".to_string())
            .interact_text()?;

        match parse_selection(&input, count) {
            Some(indices) => return Ok(indices),
            None => println!(
                "{}",
                style(format!(
                    "Invalid selection. Enter comma-separated numbers between 1 and {count}, or 'all'"
                ))
                .red()
            ),
        }
    }
}

/// Print a record preview before the user accepts it
pub fn preview_model(model: &ModelRecord) {
    println!("\n{}", style(&model.name).cyan().bold());
    println!("{} {}", style("ID:").dim(), model.id);
    println!("{} {}", style("Provider:").dim(), model.provider);
    println!("{} {}", style("Parameters:").dim(), model.parameters);
    println!("{} {}", style("License:").dim(), model.license);
    println!("\n{}", style("Description:").bold());
    println!("{}", model.description);
    println!(
        "\n{} {}",
        style("Use Cases:").bold(),
        model.use_cases.join(", ")
    );
    println!("{} {}", style("Tags:").bold(), model.tags.join(", "));

    println!("\n{}", style("Variants:").bold());
    for variant in &model.variants {
        println!(
            "  - {}: {}GB file, {}GB VRAM, {}GB RAM",
            variant.quantization, variant.file_size, variant.vram_required, variant.ram_required
        );
    }

    println!("\n{}", style("Links:").bold());
    for (key, value) in &model.links {
        println!("  - {key}: {value}");
    }
}

/// Yes/no confirmation
pub fn confirm(prompt: &str, default: bool) -> Result<bool> {
    Ok(Confirm::new()
        .with_prompt(prompt)
        .default(default)
        .interact()?)
}

/// Let the user edit the mutable fields of a candidate record
pub fn edit_record(model: &mut ModelRecord) -> Result<()> {
    println!("\n{}", style("Edit Model Fields").bold());
    println!("Press Enter to keep current value\n");

    model.name = Input::new()
        .with_prompt("Name")
        .default(model.name.clone())
        .interact_text()?;
    model.description = Input::new()
        .with_prompt("Description")
        .default(model.description.clone())
        .interact_text()?;
    model.parameters = Input::new()
        .with_prompt("Parameters")
        .default(model.parameters.clone())
        .interact_text()?;
    model.license = Input::new()
        .with_prompt("License")
        .default(model.license.clone())
        .interact_text()?;

    let use_cases: String = Input::new()
        .with_prompt("Use cases (comma-separated)")
        .default(model.use_cases.join(","))
        .interact_text()?;
    model.use_cases = split_list(&use_cases);

    let tags: String = Input::new()
        .with_prompt("Tags (comma-separated)")
        .default(model.tags.join(","))
        .interact_text()?;
    model.tags = split_list(&tags);

    Ok(())
}

/// Print a validation report, one error per line
pub fn print_validation_report(errors: &[String]) {
    if errors.is_empty() {
        println!("{}", style("Validation passed").green());
    } else {
        println!("{}", style("Validation failed:").red());
        for error in errors {
            println!("  - {error}");
        }
    }
}

fn split_list(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}
