//! Application state module
//!
//! Defines shared state accessible across all request handlers.

use std::sync::Arc;

use crate::config::Config;
use crate::upstream::{HttpUpstream, Upstream, UpstreamError};

/// Application state containing shared resources.
#[derive(Clone)]
pub struct AppState {
    /// Forwarding seam toward the remote verification service
    pub upstream: Arc<dyn Upstream>,
    /// Maximum uploaded part size in bytes
    pub max_file_size: usize,
}

impl AppState {
    /// Build the production state from configuration.
    pub fn from_config(config: &Config) -> Result<Self, UpstreamError> {
        let upstream = HttpUpstream::new(config.upstream_url.clone(), config.upstream_timeout())?;
        Ok(Self {
            upstream: Arc::new(upstream),
            max_file_size: config.max_file_size(),
        })
    }

    /// State with a caller-provided upstream (used by tests).
    pub fn with_upstream(upstream: Arc<dyn Upstream>, max_file_size: usize) -> Self {
        Self {
            upstream,
            max_file_size,
        }
    }
}
