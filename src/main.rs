//! Model Curator - Main entry point
//!
//! One request-parse-validate-persist pass per invocation: search the Hub
//! (or reload a captured search), let the user pick and edit candidates,
//! validate, merge into the catalog, back up and write.

use anyhow::{Context, Result};
use clap::Parser;
use model_curator::{
    CatalogStore, Category, CuratorConfig, DuplicatePolicy, HubClient, ModelHub, SearchCriteria,
    SizeRange, assemble, catalog, cli, discover, validate,
};
use serde_json::Value;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "model-curator")]
#[command(about = "Discover and curate LLM models from the Hugging Face Hub", long_about = None)]
#[command(version)]
struct Cli {
    /// Model size range
    #[arg(long, value_enum, default_value = "any")]
    size: SizeRange,

    /// Model category
    #[arg(long, value_enum, default_value = "any")]
    category: Category,

    /// Maximum number of results
    #[arg(long, default_value_t = 10)]
    limit: usize,

    /// Minimum download count
    #[arg(long)]
    min_downloads: Option<u64>,

    /// Minimum likes count
    #[arg(long)]
    min_likes: Option<u64>,

    /// Only keep models with GGUF files
    #[arg(long)]
    has_gguf: bool,

    /// Filter by language (e.g. en, zh)
    #[arg(long)]
    language: Option<String>,

    /// Catalog file to merge into (overrides config)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Save search results to a file for later reuse
    #[arg(long)]
    save: Option<PathBuf>,

    /// Load search results from a file instead of querying the Hub
    #[arg(long)]
    load: Option<PathBuf>,

    /// Add all results without confirmation
    #[arg(long)]
    auto_add: bool,

    /// Only validate the existing catalog file, no search
    #[arg(long)]
    validate_only: bool,

    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    log_level: String,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(&args.log_level)
        .init();

    tokio::select! {
        result = run(args) => match result {
            Ok(code) => code,
            Err(e) => {
                eprintln!("Error: {e:#}");
                ExitCode::FAILURE
            }
        },
        _ = shutdown_signal() => {
            eprintln!("\nCancelled by user");
            ExitCode::from(130)
        }
    }
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        tracing::error!("Failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
}

async fn run(args: Cli) -> Result<ExitCode> {
    let mut config = CuratorConfig::load(args.config.clone())?;
    if let Some(output) = &args.output {
        config.catalog_file = output.clone();
    }
    config.validate()?;

    let store = CatalogStore::new(config.catalog_file.clone());

    if args.validate_only {
        return validate_catalog_file(&store).await;
    }

    let criteria = SearchCriteria {
        size_range: args.size,
        category: args.category,
        limit: args.limit,
        min_downloads: args.min_downloads,
        min_likes: args.min_likes,
        require_gguf: args.has_gguf,
        language: args.language.clone(),
    };

    let hub = HubClient::new(
        config.hub_base_url.clone(),
        config.hub_token.clone(),
        config.search_overfetch,
    );

    // Search, or reuse a previous capture
    let hits = if let Some(path) = &args.load {
        println!("Loading search results from {path:?}");
        discover::load_capture(path).await?
    } else {
        println!("Searching the Hugging Face Hub...");
        let hits = discover::run_search(&hub, &criteria)
            .await
            .context("Hub search failed")?;
        if let Some(path) = &args.save {
            discover::save_capture(path, &hits).await?;
            println!("Search results saved to {path:?}");
        }
        hits
    };

    if hits.is_empty() {
        println!("No models found matching criteria");
        return Ok(ExitCode::SUCCESS);
    }

    println!("Found {} models\n", hits.len());
    cli::display_hits(&hits);

    let selected: Vec<usize> = if args.auto_add {
        println!("Auto-adding all {} models", hits.len());
        (1..=hits.len()).collect()
    } else {
        cli::select_indices(hits.len())?
    };

    if selected.is_empty() {
        println!("No models selected. Exiting.");
        return Ok(ExitCode::SUCCESS);
    }

    let category_hint = (args.category != Category::Any).then(|| args.category.as_str());

    let mut new_models: Vec<Value> = Vec::new();
    for index in selected {
        let hit = &hits[index - 1];
        println!("\nProcessing: {}", hit.model_id);

        // Best-effort enrichment; a failed listing never aborts the pass
        let files = if args.has_gguf {
            match hub.get_files(&hit.model_id).await {
                Ok(files) => Some(files),
                Err(e) => {
                    tracing::info!(
                        model_id = %hit.model_id,
                        error = %e,
                        "File listing unavailable, using synthesized variants"
                    );
                    None
                }
            }
        } else {
            None
        };

        let mut model = assemble::assemble(
            &hit.model_id,
            &hit.record,
            category_hint,
            hit.params,
            files.as_deref(),
            config.default_context_window,
        );

        let errors = validate::validate_model(&serde_json::to_value(&model)?);
        if !errors.is_empty() {
            cli::print_validation_report(&errors);
            continue;
        }

        cli::preview_model(&model);

        if !args.auto_add {
            if !cli::confirm("Add this model?", true)? {
                println!("Skipped");
                continue;
            }
            if cli::confirm("Edit model before adding?", false)? {
                cli::edit_record(&mut model)?;
                let errors = validate::validate_model(&serde_json::to_value(&model)?);
                if !errors.is_empty() {
                    cli::print_validation_report(&errors);
                    if !cli::confirm("Add anyway?", false)? {
                        continue;
                    }
                }
            }
        }

        println!("Added {}", model.name);
        new_models.push(serde_json::to_value(&model)?);
    }

    if new_models.is_empty() {
        println!("No models to add. Exiting.");
        return Ok(ExitCode::SUCCESS);
    }

    let existing = store.load().await?;
    println!(
        "\nMerging with existing catalog: {} existing, {} new",
        existing.len(),
        new_models.len()
    );

    let duplicates = catalog::duplicate_ids(&existing, &new_models);
    let policy = if duplicates.is_empty() {
        DuplicatePolicy::Skip
    } else {
        println!("Warning: {} duplicate model(s) found:", duplicates.len());
        for id in &duplicates {
            println!("  - {id}");
        }
        if !args.auto_add && cli::confirm("Replace existing models with new data?", false)? {
            DuplicatePolicy::Replace
        } else {
            DuplicatePolicy::Skip
        }
    };

    let outcome = catalog::merge(existing, new_models, policy);
    println!("Total models after merge: {}", outcome.models.len());

    // The validator gates persistence; an invalid merge leaves the file
    // untouched
    let errors = validate::validate_models(&outcome.models);
    if !errors.is_empty() {
        println!("Validation failed! Models not saved.");
        cli::print_validation_report(&errors);
        return Ok(ExitCode::FAILURE);
    }

    let had_previous = store.exists();
    store.save(&outcome.models).await?;
    if had_previous {
        println!("Backup created: {:?}", store.backup_path());
    }
    println!("Models saved to {:?}", store.path());

    Ok(ExitCode::SUCCESS)
}

async fn validate_catalog_file(store: &CatalogStore) -> Result<ExitCode> {
    if !store.exists() {
        eprintln!("Catalog file not found: {:?}", store.path());
        return Ok(ExitCode::FAILURE);
    }

    let raw = store.load_raw().await?;
    let errors = validate::validate_catalog(&raw);
    cli::print_validation_report(&errors);

    Ok(if errors.is_empty() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
