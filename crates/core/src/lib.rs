//! Domain logic for the jobdeck administration backend.
//!
//! This crate holds no database or HTTP dependencies. Everything here works
//! on data already loaded by the caller.

pub mod error;
pub mod execution_state;
pub mod notification_eligibility;
pub mod progress;
pub mod roles;
pub mod types;
