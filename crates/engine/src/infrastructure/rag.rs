//! Retrieval service clients.
//!
//! The retrieval service is optional. When no base URL is configured the
//! engine uses [`DisabledRag`], which always reports unavailable so the
//! generator never issues a query.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

use crate::infrastructure::ports::{RagError, RagPort, RagResult};

/// HTTP client for a retrieval service exposing `GET /health` and `POST /query`.
#[derive(Clone)]
pub struct HttpRagClient {
    client: Client,
    base_url: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RagQueryBody<'a> {
    category: &'a str,
    keywords: &'a [String],
    topics_text: &'a str,
}

impl HttpRagClient {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl RagPort for HttpRagClient {
    async fn is_available(&self) -> Result<bool, RagError> {
        let response = self
            .client
            .get(format!("{}/health", self.base_url))
            .send()
            .await
            .map_err(|e| RagError::RequestFailed(e.to_string()))?;
        Ok(response.status().is_success())
    }

    async fn query(
        &self,
        category: &str,
        keywords: &[String],
        topics_text: &str,
    ) -> Result<Option<RagResult>, RagError> {
        let response = self
            .client
            .post(format!("{}/query", self.base_url))
            .json(&RagQueryBody {
                category,
                keywords,
                topics_text,
            })
            .send()
            .await
            .map_err(|e| RagError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RagError::RequestFailed(format!("status {}", status.as_u16())));
        }

        response
            .json::<Option<RagResult>>()
            .await
            .map_err(|e| RagError::InvalidResponse(e.to_string()))
    }
}

/// Stand-in used when no retrieval service is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledRag;

#[async_trait]
impl RagPort for DisabledRag {
    async fn is_available(&self) -> Result<bool, RagError> {
        Ok(false)
    }

    async fn query(
        &self,
        _category: &str,
        _keywords: &[String],
        _topics_text: &str,
    ) -> Result<Option<RagResult>, RagError> {
        Ok(None)
    }
}
