//! Configuration loaded from environment variables.
//!
//! # Example
//!
//! ```rust,ignore
//! use request_scope::config::Config;
//! use request_scope::RequestResolver;
//!
//! let config = Config::from_env()?;
//! request_scope::logging::init(&config.logging)?;
//! config.log_summary();
//!
//! let resolver = RequestResolver::new();
//! let chain = config.middleware_chain(resolver.store());
//! ```
//!
//! | Variable | Default | Meaning |
//! |----------|---------|---------|
//! | `CONTEXT_URL_PATTERNS` | `/*` | comma-separated paths that get a bound context |
//! | `ACCESS_LOG` | off | log one line per request |
//! | `LOG_LEVEL` / `RUST_LOG` | `info` | log filter |
//! | `LOG_FORMAT` | `text` | `text` or `json` |
//! | `SERVICE_NAME` | `request_scope` | service name in JSON logs |

mod context;
mod error;
mod logging;
mod parse;

pub use context::{parse_url_patterns, ContextConfig};
pub use error::ConfigError;
pub use logging::{parse_log_format, LogFormat, LoggingConfig};

use crate::context::ScopedContextStore;
use crate::middleware::{AccessLogMiddleware, MiddlewareChain, RequestContextMiddleware};

/// Complete configuration.
#[derive(Clone, Debug, Default)]
pub struct Config {
    /// Request context configuration.
    pub context: ContextConfig,
    /// Logging configuration.
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            context: ContextConfig::from_env()?,
            logging: LoggingConfig::from_env()?,
        })
    }

    /// Build the configured middleware chain around `store`.
    pub fn middleware_chain(&self, store: ScopedContextStore) -> MiddlewareChain {
        let mut chain = MiddlewareChain::new().add(RequestContextMiddleware::with_patterns(
            store,
            self.context.url_patterns.clone(),
        ));
        if self.context.access_log {
            chain = chain.add(AccessLogMiddleware::new());
        }
        chain
    }

    /// Print configuration summary to log.
    pub fn log_summary(&self) {
        use tracing::info;

        info!("Configuration loaded:");
        let patterns: Vec<String> = self
            .context
            .url_patterns
            .iter()
            .map(|p| p.to_string())
            .collect();
        info!("  Context URL patterns: {}", patterns.join(", "));
        info!("  Log filter: {}", self.logging.filter);
        info!("  Log format: {:?}", self.logging.format);

        if self.context.access_log {
            info!("  Access log: enabled");
        }
    }
}
