//! jobdeck HTTP API.
//!
//! Serves live execution progress (fetched from the orchestration engine)
//! and notification preference, eligibility and subscription management.
//! The binary in `main.rs` only wires configuration into [`app::build_router`].

pub mod app;
pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod orchestrator;
pub mod response;
pub mod routes;
pub mod state;
