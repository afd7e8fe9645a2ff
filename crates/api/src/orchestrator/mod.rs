//! Job-orchestration engine integration.
//!
//! The engine owns jobs and executions; this backend only reads execution
//! state reports from it. [`ExecutionStateSource`] is the seam handlers
//! depend on, and [`OrchestratorApi`] is the HTTP implementation.

pub mod client;

use async_trait::async_trait;
use jobdeck_core::execution_state::ExecutionStateSnapshot;

use crate::config::env_or;

pub use client::OrchestratorApi;

/// Default engine base URL.
const DEFAULT_URL: &str = "http://localhost:4440";
/// Default engine REST API version.
const DEFAULT_API_VERSION: u32 = 41;
/// Default per-request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Connection settings for the orchestration engine.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Base URL, e.g. `http://rundeck:4440`.
    pub base_url: String,
    /// REST API version segment used in request paths.
    pub api_version: u32,
    /// API token sent with every request.
    pub api_token: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl OrchestratorConfig {
    /// Load the engine settings from environment variables.
    ///
    /// | Env Var                     | Required | Default                 |
    /// |-----------------------------|----------|-------------------------|
    /// | `ORCHESTRATOR_URL`          | no       | `http://localhost:4440` |
    /// | `ORCHESTRATOR_API_VERSION`  | no       | `41`                    |
    /// | `ORCHESTRATOR_API_TOKEN`    | **yes**  | --                      |
    /// | `ORCHESTRATOR_TIMEOUT_SECS` | no       | `10`                    |
    ///
    /// # Panics
    ///
    /// Panics if the token is missing or a numeric value does not parse.
    pub fn from_env() -> Self {
        let base_url = env_or("ORCHESTRATOR_URL", DEFAULT_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let api_token = std::env::var("ORCHESTRATOR_API_TOKEN")
            .expect("ORCHESTRATOR_API_TOKEN must be set in the environment");

        Self {
            base_url,
            api_version: env_or("ORCHESTRATOR_API_VERSION", DEFAULT_API_VERSION),
            api_token,
            timeout_secs: env_or("ORCHESTRATOR_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS),
        }
    }
}

/// Errors from the orchestration engine layer.
#[derive(Debug, thiserror::Error)]
pub enum OrchestratorError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The engine returned a non-2xx status code other than 404.
    #[error("Orchestrator API error ({status}): {body}")]
    ApiError {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },
}

/// Source of execution-state reports.
#[async_trait]
pub trait ExecutionStateSource: Send + Sync {
    /// Fetch the current state report of an execution.
    ///
    /// `Ok(None)` means the engine has no report for that execution.
    async fn fetch_execution_state(
        &self,
        execution_id: i64,
    ) -> Result<Option<ExecutionStateSnapshot>, OrchestratorError>;
}
