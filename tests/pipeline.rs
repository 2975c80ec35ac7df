//! End-to-end pipeline tests against a mock hub
//!
//! Exercises search -> filter -> assemble -> validate -> merge -> persist
//! without touching the network, using an in-memory [`ModelHub`]
//! implementation.

use async_trait::async_trait;
use model_curator::hub::CardData;
use model_curator::{
    CatalogStore, Category, DuplicatePolicy, HubError, HubModel, ModelHub, RepoFile,
    SearchCriteria, SizeRange, assemble, catalog, discover, validate,
};
use serde_json::Value;
use std::sync::Mutex;
use tempfile::TempDir;

/// In-memory hub serving canned records
struct MockHub {
    models: Vec<HubModel>,
    files: Vec<RepoFile>,
    fail_files: bool,
    file_calls: Mutex<usize>,
}

impl MockHub {
    fn new(models: Vec<HubModel>) -> Self {
        Self {
            models,
            files: Vec::new(),
            fail_files: false,
            file_calls: Mutex::new(0),
        }
    }

    fn with_files(mut self, files: Vec<RepoFile>) -> Self {
        self.files = files;
        self
    }

    fn failing_files(mut self) -> Self {
        self.fail_files = true;
        self
    }
}

#[async_trait]
impl ModelHub for MockHub {
    async fn search(&self, _criteria: &SearchCriteria) -> Result<Vec<HubModel>, HubError> {
        Ok(self.models.clone())
    }

    async fn get_files(&self, _model_id: &str) -> Result<Vec<RepoFile>, HubError> {
        *self.file_calls.lock().unwrap() += 1;
        if self.fail_files {
            return Err(HubError::Status {
                status: 500,
                url: "mock".to_string(),
            });
        }
        Ok(self.files.clone())
    }
}

fn criteria() -> SearchCriteria {
    SearchCriteria {
        size_range: SizeRange::Any,
        category: Category::Any,
        limit: 10,
        min_downloads: None,
        min_likes: None,
        require_gguf: false,
        language: None,
    }
}

fn llama_record() -> HubModel {
    HubModel {
        id: Some("meta-llama/Meta-Llama-3-8B".to_string()),
        tags: vec![
            "conversational".to_string(),
            "text-generation".to_string(),
        ],
        downloads: Some(2_000_000),
        likes: Some(5_000),
        card_data: Some(CardData {
            license: Some(Value::String("llama3".to_string())),
            description: Some("Meta's third-generation open LLM".to_string()),
            ..Default::default()
        }),
        ..Default::default()
    }
}

fn gguf(path: &str, size_gb: u64) -> RepoFile {
    RepoFile {
        path: Some(path.to_string()),
        size: Some(size_gb * 1024 * 1024 * 1024),
    }
}

#[tokio::test]
async fn test_search_assemble_validate_round_trip() {
    let hub = MockHub::new(vec![llama_record()]);

    let hits = discover::run_search(&hub, &criteria()).await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].params, Some(8.0));

    let model = assemble::assemble(
        &hits[0].model_id,
        &hits[0].record,
        Some("chat"),
        hits[0].params,
        None,
        8192,
    );

    // A record with all required upstream fields must validate cleanly
    let errors = validate::validate_model(&serde_json::to_value(&model).unwrap());
    assert!(errors.is_empty(), "unexpected errors: {errors:?}");
    assert_eq!(model.name, "Meta Llama 3 8B");
    assert_eq!(model.parameters, "8B");
}

#[tokio::test]
async fn test_gguf_filter_drops_models_without_files() {
    let hub = MockHub::new(vec![llama_record()]).with_files(vec![RepoFile {
        path: Some("README.md".to_string()),
        size: Some(100),
    }]);

    let mut c = criteria();
    c.require_gguf = true;
    let hits = discover::run_search(&hub, &c).await.unwrap();
    assert!(hits.is_empty());
    assert_eq!(*hub.file_calls.lock().unwrap(), 1);
}

#[tokio::test]
async fn test_file_enrichment_narrows_variants() {
    let hub = MockHub::new(vec![llama_record()])
        .with_files(vec![gguf("llama-3-8b-Q4_K_M.gguf", 5)]);

    let files = hub
        .get_files("meta-llama/Meta-Llama-3-8B")
        .await
        .unwrap();

    let model = assemble::assemble(
        "meta-llama/Meta-Llama-3-8B",
        &llama_record(),
        None,
        Some(8.0),
        Some(&files),
        8192,
    );

    // The 8B tier offers four labels; only the confirmed one survives, with
    // the real file size
    assert_eq!(model.variants.len(), 1);
    assert_eq!(model.variants[0].quantization, "Q4_K_M");
    assert_eq!(model.variants[0].file_size, 5.0);

    let errors = validate::validate_model(&serde_json::to_value(&model).unwrap());
    assert!(errors.is_empty(), "unexpected errors: {errors:?}");
}

#[tokio::test]
async fn test_failed_enrichment_falls_back_to_synthesized() {
    let hub = MockHub::new(vec![llama_record()]).failing_files();

    // The flow swallows the failure and assembles with files = None
    let files = match hub.get_files("meta-llama/Meta-Llama-3-8B").await {
        Ok(files) => Some(files),
        Err(_) => None,
    };
    assert!(files.is_none());

    let model = assemble::assemble(
        "meta-llama/Meta-Llama-3-8B",
        &llama_record(),
        None,
        Some(8.0),
        files.as_deref(),
        8192,
    );
    assert_eq!(model.variants.len(), 4);
}

#[tokio::test]
async fn test_merge_and_persist_with_backup() {
    let dir = TempDir::new().unwrap();
    let store = CatalogStore::new(dir.path().join("models.json"));

    let model = assemble::assemble(
        "meta-llama/Meta-Llama-3-8B",
        &llama_record(),
        Some("chat"),
        Some(8.0),
        None,
        8192,
    );
    let value = serde_json::to_value(&model).unwrap();

    // First pass: empty catalog, one new record
    let existing = store.load().await.unwrap();
    let outcome = catalog::merge(existing, vec![value.clone()], DuplicatePolicy::Skip);
    assert!(outcome.duplicates.is_empty());
    assert!(validate::validate_models(&outcome.models).is_empty());
    store.save(&outcome.models).await.unwrap();

    // Second pass with the same record: duplicate detected, skip keeps one
    let existing = store.load().await.unwrap();
    assert_eq!(existing.len(), 1);
    let outcome = catalog::merge(existing, vec![value], DuplicatePolicy::Skip);
    assert_eq!(outcome.duplicates, vec!["meta-llama-3-8b"]);
    assert_eq!(outcome.models.len(), 1);
    store.save(&outcome.models).await.unwrap();

    // The overwrite backed up the previous content
    assert!(store.backup_path().exists());
    let backup: Value =
        serde_json::from_str(&std::fs::read_to_string(store.backup_path()).unwrap()).unwrap();
    assert_eq!(backup.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_duplicate_ids_fail_catalog_validation() {
    let model = assemble::assemble(
        "meta-llama/Meta-Llama-3-8B",
        &llama_record(),
        None,
        Some(8.0),
        None,
        8192,
    );
    let value = serde_json::to_value(&model).unwrap();

    let errors = validate::validate_models(&[value.clone(), value]);
    assert!(
        errors
            .iter()
            .any(|e| e.contains("Duplicate model IDs found") && e.contains("meta-llama-3-8b"))
    );
}

#[tokio::test]
async fn test_validate_only_flow_on_saved_catalog() {
    let dir = TempDir::new().unwrap();
    let store = CatalogStore::new(dir.path().join("models.json"));

    let model = assemble::assemble(
        "mistralai/Mistral-7B-Instruct",
        &HubModel {
            id: Some("mistralai/Mistral-7B-Instruct".to_string()),
            tags: vec!["conversational".to_string()],
            downloads: Some(900_000),
            likes: Some(2_000),
            ..Default::default()
        },
        Some("chat"),
        Some(7.0),
        None,
        8192,
    );
    store
        .save(&[serde_json::to_value(&model).unwrap()])
        .await
        .unwrap();

    let raw = store.load_raw().await.unwrap();
    let errors = validate::validate_catalog(&raw);
    assert!(errors.is_empty(), "unexpected errors: {errors:?}");

    // Idempotent: a second pass reports the identical (empty) list
    assert_eq!(errors, validate::validate_catalog(&raw));
}
