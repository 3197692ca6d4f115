//! Access logging middleware.
//!
//! Logs one structured line per request on the `access` tracing target.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;

use super::{Middleware, Next};
use crate::core::{Request, ResponseHandle, Result};

/// Access log middleware configuration.
#[derive(Clone, Debug)]
pub struct AccessLogConfig {
    /// Whether logging is enabled.
    pub enabled: bool,
    /// Include the number of response body bytes written.
    pub include_response_body: bool,
}

impl Default for AccessLogConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            include_response_body: true,
        }
    }
}

/// Access logging middleware.
///
/// Log entries are emitted at INFO level with target "access". A failed
/// request is logged with status 500 and its error, then the error is
/// passed on untouched.
#[derive(Default)]
pub struct AccessLogMiddleware {
    config: AccessLogConfig,
}

impl AccessLogMiddleware {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: AccessLogConfig) -> Self {
        Self { config }
    }

    pub fn with_enabled(enabled: bool) -> Self {
        Self {
            config: AccessLogConfig {
                enabled,
                ..Default::default()
            },
        }
    }

    pub fn config(&self) -> &AccessLogConfig {
        &self.config
    }
}

#[async_trait]
impl Middleware for AccessLogMiddleware {
    fn name(&self) -> &'static str {
        "access_log"
    }

    fn priority(&self) -> i32 {
        -90 // Outermost, so timing covers the whole pipeline
    }

    async fn handle(&self, req: Arc<Request>, res: ResponseHandle, next: Next<'_>) -> Result<()> {
        if !self.config.enabled {
            return next.run(req, res).await;
        }

        let started_at = Instant::now();
        let result = next.run(Arc::clone(&req), res.clone()).await;
        let duration_ms = started_at.elapsed().as_secs_f64() * 1000.0;

        let status = match result {
            Ok(()) => res.status().as_u16(),
            Err(_) => 500,
        };
        let bytes = if self.config.include_response_body {
            Some(res.body_len() as u64)
        } else {
            None
        };
        let error = result.as_ref().err().map(|e| e.to_string());

        tracing::info!(
            target: "access",
            method = %req.method(),
            path = req.path(),
            query = req.query(),
            status = status,
            bytes = bytes,
            duration_ms = duration_ms,
            ua = req.user_agent(),
            request_id = req.request_id(),
            error = error.as_deref(),
            "{} {} {}",
            req.method(),
            req.path(),
            status
        );

        result
    }
}
