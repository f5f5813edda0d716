//! HTTP client for the engine API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use url::Url;

use sessioncraft_domain::{DraftPayload, SessionId};
use sessioncraft_shared::{ErrorBody, GenerateOutlineRequest, GenerateOutlineResponse};

use crate::ports::{ClientError, DraftStore, OutlineGenerator};

#[derive(Clone)]
pub struct EngineClient {
    client: Client,
    base_url: Url,
}

impl EngineClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        // A trailing slash keeps `join` from dropping the last path segment.
        let normalized = format!("{}/", base_url.trim().trim_end_matches('/'));
        let base_url = Url::parse(&normalized)
            .map_err(|e| ClientError::Transport(format!("invalid engine URL {}: {}", base_url, e)))?;
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Ok(Self { client, base_url })
    }

    fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        self.base_url
            .join(path)
            .map_err(|e| ClientError::Transport(format!("invalid path {}: {}", path, e)))
    }

    fn draft_url(&self, session_id: SessionId) -> Result<Url, ClientError> {
        self.endpoint(&format!("api/drafts/{}", session_id))
    }
}

#[async_trait]
impl DraftStore for EngineClient {
    async fn save(&self, session_id: SessionId, payload: &DraftPayload) -> Result<(), ClientError> {
        let response = self
            .client
            .put(self.draft_url(session_id)?)
            .json(payload)
            .send()
            .await
            .map_err(transport)?;
        check_status(response).await?;
        Ok(())
    }

    async fn load(&self, session_id: SessionId) -> Result<Option<DraftPayload>, ClientError> {
        let response = self
            .client
            .get(self.draft_url(session_id)?)
            .send()
            .await
            .map_err(transport)?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = check_status(response).await?;
        decode(response).await.map(Some)
    }
}

#[async_trait]
impl OutlineGenerator for EngineClient {
    async fn generate(
        &self,
        request: &GenerateOutlineRequest,
    ) -> Result<GenerateOutlineResponse, ClientError> {
        let response = self
            .client
            .post(self.endpoint("api/outlines/generate")?)
            .json(request)
            .send()
            .await
            .map_err(transport)?;
        let response = check_status(response).await?;
        decode(response).await
    }
}

fn transport(e: reqwest::Error) -> ClientError {
    ClientError::Transport(e.to_string())
}

/// Turn a non-2xx response into [`ClientError::Status`], preferring the
/// engine's error message over the raw body.
async fn check_status(response: Response) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&body)
        .map(|e| e.message)
        .unwrap_or(body);
    Err(ClientError::Status {
        status: status.as_u16(),
        message,
    })
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    response
        .json::<T>()
        .await
        .map_err(|e| ClientError::Decode(e.to_string()))
}
