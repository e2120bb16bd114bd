//! IdVerify Server Library - REST API components for identity verification proxying
//!
//! This library exposes the server components for use in integration tests.
//! The main binary uses these same components.

pub mod config;
pub mod error;
pub mod handlers;
pub mod multipart;
pub mod openapi;
pub mod routes;
pub mod state;
pub mod upstream;
pub mod validation;

pub use config::Config;
pub use error::ApiError;
pub use multipart::{FileField, VerifyUpload, DOCUMENT_PART, SELFIE_PART};
pub use openapi::ApiDoc;
pub use routes::{create_router, create_router_with_config};
pub use state::AppState;
pub use upstream::{HttpUpstream, Upstream, UpstreamError, UpstreamReply};
