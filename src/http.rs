//! [`SceneStore`] over HTTP.
//!
//! A path maps to `<base>/api/<segment>/<segment>...`. Bodies are JSON; DELETE
//! carries none. Any non-success status is a rejection.

use crate::path::Path;
use crate::store::{Method, SceneStore, StoreError};
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct HttpStore {
    client: reqwest::Client,
    base_url: String,
}

impl HttpStore {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, StoreError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| StoreError::Transport {
                method: Method::Get,
                path: Path::new(),
                reason: format!("failed to create HTTP client: {e}"),
            })?;
        Ok(Self::with_client(client, base_url))
    }

    /// Uses a preconfigured client, e.g. one with custom proxy settings.
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn url(&self, path: &Path) -> String {
        if path.is_empty() {
            format!("{}/api", self.base_url)
        } else {
            format!("{}/api/{}", self.base_url, path)
        }
    }

    async fn send(
        &self,
        method: Method,
        path: &Path,
        body: Option<Value>,
    ) -> Result<reqwest::Response, StoreError> {
        let url = self.url(path);
        tracing::debug!(%method, %url, "store request");
        let verb = match method {
            Method::Get => reqwest::Method::GET,
            Method::Put => reqwest::Method::PUT,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
        };
        let mut request = self.client.request(verb, &url);
        if let Some(body) = body {
            request = request.json(&body);
        }
        let response = request.send().await.map_err(|e| StoreError::Transport {
            method,
            path: path.clone(),
            reason: e.to_string(),
        })?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            match method {
                Method::Get => return Err(StoreError::NotFound(path.clone())),
                // Deleting what is already gone succeeds.
                Method::Delete => return Ok(response),
                _ => {}
            }
        }
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(StoreError::Rejected {
                method,
                path: path.clone(),
                reason: format!("{status}: {detail}"),
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl SceneStore for HttpStore {
    async fn get(&self, path: &Path) -> Result<Value, StoreError> {
        let response = self.send(Method::Get, path, None).await?;
        response.json().await.map_err(|e| StoreError::Decode {
            path: path.clone(),
            reason: e.to_string(),
        })
    }

    async fn put(&self, path: &Path, value: Value) -> Result<(), StoreError> {
        self.send(Method::Put, path, Some(value)).await.map(drop)
    }

    async fn patch(&self, path: &Path, value: Value) -> Result<(), StoreError> {
        self.send(Method::Patch, path, Some(value)).await.map(drop)
    }

    async fn delete(&self, path: &Path) -> Result<(), StoreError> {
        self.send(Method::Delete, path, None).await.map(drop)
    }
}
