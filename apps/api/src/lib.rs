//! # Kasir API
//!
//! HTTP server for the Kasir POS backend.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Kasir API Server                                 │
//! │                                                                         │
//! │  Client ───► axum Router ───► handlers ───► kasir-db ───► SQLite       │
//! │                  │                │                                      │
//! │                  │                └── kasir-core validation             │
//! │                  ▼                                                      │
//! │              ApiError ───► {"code": "...", "message": "..."}            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`config`] - File and environment configuration
//! - [`error`] - Error to HTTP status mapping
//! - [`extract`] - Extractors with JSON rejections
//! - [`handlers`] - Request handlers per resource
//! - [`router`] - Route table
//! - [`state`] - Shared application state

pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod router;
pub mod state;

pub use config::ApiConfig;
pub use error::{ApiError, ErrorCode};
pub use router::router;
pub use state::AppState;
