//! Request extractors for authentication and role checks.
//!
//! Handlers declare what they need in their signature: [`rbac::RequireAuth`]
//! for reads and [`rbac::RequireAdmin`] for writes. Both reject before the
//! handler body runs.

pub mod auth;
pub mod rbac;
