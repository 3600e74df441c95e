//! Bank source served over HTTP.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CACHE_CONTROL};
use serde_json::Value;
use tracing::instrument;

use quizrun_core::error::DataLoadError;
use quizrun_core::model::Manifest;
use quizrun_core::traits::BankSource;

use crate::MANIFEST_FILE;

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Fetches `{base_url}/banks.json` and `{base_url}/{file}`.
///
/// Every request carries `Cache-Control: no-store` so edited banks show up
/// on the next load.
#[derive(Debug, Clone)]
pub struct HttpSource {
    base_url: String,
    client: reqwest::Client,
}

/// Why a GET failed, before it is mapped onto the resource that was requested.
enum FetchFailure {
    Unavailable(String),
    Malformed(String),
}

impl HttpSource {
    pub fn new(base_url: &str) -> anyhow::Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-store"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json(&self, resource: &str) -> Result<Value, FetchFailure> {
        let url = format!("{}/{}", self.base_url, resource.trim_start_matches('/'));
        let response = self.client.get(&url).send().await.map_err(|e| {
            if e.is_timeout() {
                FetchFailure::Unavailable(format!("timed out after {DEFAULT_TIMEOUT_SECS}s"))
            } else if e.is_connect() {
                FetchFailure::Unavailable(format!("{} is not reachable", self.base_url))
            } else {
                FetchFailure::Unavailable(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchFailure::Unavailable(format!("HTTP {}", status.as_u16())));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| FetchFailure::Unavailable(e.to_string()))?;
        serde_json::from_slice(&body).map_err(|e| FetchFailure::Malformed(e.to_string()))
    }
}

#[async_trait]
impl BankSource for HttpSource {
    fn name(&self) -> &str {
        "http"
    }

    #[instrument(skip(self), fields(base_url = %self.base_url))]
    async fn manifest(&self) -> Result<Manifest, DataLoadError> {
        let malformed = |reason: String| DataLoadError::Malformed {
            resource: MANIFEST_FILE.to_string(),
            reason,
        };
        let value = self.get_json(MANIFEST_FILE).await.map_err(|f| match f {
            FetchFailure::Unavailable(reason) => DataLoadError::ManifestUnavailable { reason },
            FetchFailure::Malformed(reason) => malformed(reason),
        })?;
        serde_json::from_value(value).map_err(|e| malformed(e.to_string()))
    }

    #[instrument(skip(self), fields(base_url = %self.base_url))]
    async fn fetch_bank(&self, file: &str) -> Result<Value, DataLoadError> {
        self.get_json(file).await.map_err(|f| match f {
            FetchFailure::Unavailable(reason) => DataLoadError::BankUnavailable {
                file: file.to_string(),
                reason,
            },
            FetchFailure::Malformed(reason) => DataLoadError::Malformed {
                resource: file.to_string(),
                reason,
            },
        })
    }
}
