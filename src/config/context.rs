//! Request context configuration.

use super::parse::{env_bool, env_or, split_list};
use super::ConfigError;
use crate::middleware::UrlPattern;

const URL_PATTERNS_KEY: &str = "CONTEXT_URL_PATTERNS";

/// Which requests get a bound context, loaded from environment.
#[derive(Clone, Debug)]
pub struct ContextConfig {
    /// Paths the context middleware applies to (default: all).
    pub url_patterns: Vec<UrlPattern>,
    /// Access logging enabled.
    pub access_log: bool,
}

impl ContextConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            url_patterns: parse_url_patterns(&env_or(URL_PATTERNS_KEY, "/*"))?,
            access_log: env_bool("ACCESS_LOG", false),
        })
    }

    /// Check whether every request gets a bound context.
    pub fn applies_to_all(&self) -> bool {
        self.url_patterns.contains(&UrlPattern::All)
    }
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            url_patterns: vec![UrlPattern::All],
            access_log: false,
        }
    }
}

/// Parse a comma-separated list of URL patterns.
pub fn parse_url_patterns(value: &str) -> Result<Vec<UrlPattern>, ConfigError> {
    let patterns = split_list(value)
        .iter()
        .map(|raw| {
            UrlPattern::parse(raw).map_err(|error| ConfigError::Parse {
                key: URL_PATTERNS_KEY.into(),
                value: raw.clone(),
                error,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    if patterns.is_empty() {
        return Err(ConfigError::Invalid {
            key: URL_PATTERNS_KEY.into(),
            message: "at least one pattern is required (use /* for all requests)".into(),
        });
    }

    Ok(patterns)
}
