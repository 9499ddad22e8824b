//! Orchestration adapter wire models
//!
//! Request and response payloads of the adapter's `/services` API.

pub mod models;

pub use models::*;
