//! Process configuration, read once at startup.
//!
//! Every setting comes from the environment (after `.env` is loaded in
//! `main`). Bad values abort startup with a message naming the variable.

use std::fmt::Display;
use std::str::FromStr;

use crate::auth::jwt::JwtConfig;
use crate::orchestrator::OrchestratorConfig;

/// Read `key`, falling back to `default`, and parse it.
///
/// # Panics
///
/// Panics if the value does not parse as `T`.
pub(crate) fn env_or<T>(key: &str, default: T) -> T
where
    T: FromStr,
    T::Err: Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .unwrap_or_else(|e| panic!("{key} has an invalid value '{raw}': {e}")),
        Err(_) => default,
    }
}

/// HTTP server settings plus the nested auth and engine sections.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Browser origins allowed by CORS.
    pub cors_origins: Vec<String>,
    /// Requests running longer than this get a 408.
    pub request_timeout_secs: u64,
    pub jwt: JwtConfig,
    pub orchestrator: OrchestratorConfig,
}

impl ServerConfig {
    /// | Env Var                | Default                 |
    /// |------------------------|-------------------------|
    /// | `HOST`                 | `0.0.0.0`               |
    /// | `PORT`                 | `3000`                  |
    /// | `CORS_ORIGINS`         | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                    |
    ///
    /// See [`JwtConfig::from_env`] and [`OrchestratorConfig::from_env`] for
    /// the nested sections.
    pub fn from_env() -> Self {
        let cors_origins = env_or("CORS_ORIGINS", "http://localhost:5173".to_string())
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect();

        Self {
            host: env_or("HOST", "0.0.0.0".to_string()),
            port: env_or("PORT", 3000),
            cors_origins,
            request_timeout_secs: env_or("REQUEST_TIMEOUT_SECS", 30),
            jwt: JwtConfig::from_env(),
            orchestrator: OrchestratorConfig::from_env(),
        }
    }
}
