//! REST client for the orchestration engine's execution endpoints.

use std::time::Duration;

use async_trait::async_trait;
use jobdeck_core::execution_state::ExecutionStateSnapshot;
use reqwest::StatusCode;

use super::{ExecutionStateSource, OrchestratorConfig, OrchestratorError};

/// Header carrying the engine API token.
const AUTH_TOKEN_HEADER: &str = "X-Rundeck-Auth-Token";

/// HTTP client for one orchestration engine.
pub struct OrchestratorApi {
    client: reqwest::Client,
    base_url: String,
    api_version: u32,
    api_token: String,
}

impl OrchestratorApi {
    /// Build a client from configuration.
    pub fn new(config: &OrchestratorConfig) -> Result<Self, OrchestratorError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self::with_client(client, config))
    }

    /// Build a client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, config: &OrchestratorConfig) -> Self {
        Self {
            client,
            base_url: config.base_url.clone(),
            api_version: config.api_version,
            api_token: config.api_token.clone(),
        }
    }

    /// URL of the state report for an execution.
    pub fn execution_state_url(&self, execution_id: i64) -> String {
        format!(
            "{}/api/{}/execution/{}/state",
            self.base_url, self.api_version, execution_id
        )
    }
}

#[async_trait]
impl ExecutionStateSource for OrchestratorApi {
    async fn fetch_execution_state(
        &self,
        execution_id: i64,
    ) -> Result<Option<ExecutionStateSnapshot>, OrchestratorError> {
        let response = self
            .client
            .get(self.execution_state_url(execution_id))
            .header(AUTH_TOKEN_HEADER, &self.api_token)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(OrchestratorError::ApiError {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.bytes().await?;
        match serde_json::from_slice::<ExecutionStateSnapshot>(&body) {
            Ok(snapshot) => Ok(Some(snapshot)),
            Err(e) => {
                // Malformed reports are treated as absent.
                tracing::warn!(
                    execution_id,
                    error = %e,
                    "Malformed execution state report",
                );
                Ok(None)
            }
        }
    }
}
