//! Hub REST API client
//!
//! Talks to `https://huggingface.co/api` over reqwest with rustls. Search
//! results are fetched sorted by downloads with `full=true` so card data and
//! sibling listings come back in one round trip.

use super::{HubError, HubModel, ModelHub, RepoFile, SearchCriteria};
use async_trait::async_trait;

/// Production [`ModelHub`] backed by the Hub REST API
pub struct HubClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
    overfetch: usize,
}

impl HubClient {
    /// Create a client against a Hub API base URL (no trailing slash)
    pub fn new(base_url: impl Into<String>, token: Option<String>, overfetch: usize) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            token,
            overfetch: overfetch.max(1),
        }
    }

    fn request(&self, url: &str) -> reqwest::RequestBuilder {
        let mut req = self.http.get(url);
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }
        req
    }
}

#[async_trait]
impl ModelHub for HubClient {
    async fn search(&self, criteria: &SearchCriteria) -> Result<Vec<HubModel>, HubError> {
        let url = format!("{}/models", self.base_url);

        // Fetch well past the requested limit; size and category filtering
        // discards most of the listing.
        let fetch_limit = criteria.limit.saturating_mul(self.overfetch);

        let mut params: Vec<(&str, String)> = vec![
            ("pipeline_tag", "text-generation".to_string()),
            ("library", "transformers".to_string()),
            ("sort", "downloads".to_string()),
            ("direction", "-1".to_string()),
            ("limit", fetch_limit.to_string()),
            ("full", "true".to_string()),
        ];
        if let Some(language) = &criteria.language {
            params.push(("language", language.clone()));
        }

        tracing::debug!(url = %url, limit = fetch_limit, "Searching hub");

        let response = self.request(&url).query(&params).send().await?;
        if !response.status().is_success() {
            return Err(HubError::Status {
                status: response.status().as_u16(),
                url,
            });
        }

        let models: Vec<HubModel> = response.json().await?;
        tracing::debug!(count = models.len(), "Hub search returned");
        Ok(models)
    }

    async fn get_files(&self, model_id: &str) -> Result<Vec<RepoFile>, HubError> {
        let url = format!("{}/models/{}/tree/main", self.base_url, model_id);

        tracing::debug!(model_id = %model_id, "Fetching repository file list");

        let response = self.request(&url).send().await?;
        if !response.status().is_success() {
            return Err(HubError::Status {
                status: response.status().as_u16(),
                url,
            });
        }

        let files: Vec<RepoFile> = response.json().await?;
        Ok(files)
    }
}
