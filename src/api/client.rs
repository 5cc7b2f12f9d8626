//! HTTP implementation of [`Authority`]

use reqwest::{RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;

use super::Authority;
use super::types::{
    ErrorBody, HealthResponse, LeaderboardResponse, LevelResponse, ResetGameRequest, SessionId,
    StartGameRequest, StartGameResponse, SubmitAnswerRequest, SubmitAnswerResponse,
};
use crate::error::{GameError, Result};
use crate::settings::Settings;

/// JSON-over-HTTP client for the scoring service
#[derive(Debug, Clone)]
pub struct HttpAuthority {
    client: reqwest::Client,
    base_url: String,
}

impl HttpAuthority {
    pub fn new(settings: &Settings) -> Result<Self> {
        let builder = reqwest::Client::builder();
        #[cfg(not(target_arch = "wasm32"))]
        let builder =
            builder.timeout(std::time::Duration::from_secs(settings.request_timeout_secs));
        let client = builder
            .build()
            .map_err(|e| GameError::InvalidInput(format!("HTTP client: {e}")))?;
        Ok(Self::with_client(client, &settings.api_base_url))
    }

    pub fn with_client(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> Result<Url> {
        Url::parse(&format!("{}{path}", self.base_url))
            .map_err(|e| GameError::InvalidInput(format!("bad service URL: {e}")))
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let err = remote_error(status, &body);
            log::warn!("Scoring service returned {status}: {err}");
            return Err(err);
        }

        response
            .json::<T>()
            .await
            .map_err(|e| GameError::Remote(format!("invalid response body: {e}")))
    }

    /// Liveness probe
    pub async fn health(&self) -> Result<HealthResponse> {
        self.send(self.client.get(self.url("/health")?)).await
    }
}

/// Non-2xx: prefer the service's `error` string, else the status code
fn remote_error(status: StatusCode, body: &str) -> GameError {
    let message = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.error)
        .filter(|e| !e.trim().is_empty())
        .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));
    GameError::Remote(message)
}

impl Authority for HttpAuthority {
    async fn start_game(&self, request: &StartGameRequest) -> Result<StartGameResponse> {
        self.send(self.client.post(self.url("/start-game")?).json(request))
            .await
    }

    async fn get_level(&self, level_id: u32, session_id: &SessionId) -> Result<LevelResponse> {
        let mut url = self.url(&format!("/level/{level_id}"))?;
        url.query_pairs_mut()
            .append_pair("session_id", session_id.as_str());
        self.send(self.client.get(url)).await
    }

    async fn submit_answer(&self, request: &SubmitAnswerRequest) -> Result<SubmitAnswerResponse> {
        self.send(self.client.post(self.url("/submit-answer")?).json(request))
            .await
    }

    async fn leaderboard(&self, limit: u32) -> Result<LeaderboardResponse> {
        let mut url = self.url("/leaderboard")?;
        url.query_pairs_mut()
            .append_pair("limit", &limit.to_string());
        self.send(self.client.get(url)).await
    }

    async fn reset_game(&self, session_id: &SessionId) -> Result<()> {
        let body = ResetGameRequest {
            session_id: session_id.clone(),
        };
        let response = self
            .client
            .post(self.url("/reset-game")?)
            .json(&body)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(remote_error(status, &text));
        }
        Ok(())
    }
}
