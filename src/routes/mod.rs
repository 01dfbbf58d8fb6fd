//! Route configuration
//!
//! - `api` - REST endpoints (health, incoming-call webhook, call records,
//!   audio logs)
//! - `stream` - WebSocket audio streaming endpoint

pub mod api;
pub mod stream;
