//! URL patterns selecting which requests a middleware applies to.

use std::fmt;
use std::str::FromStr;

/// Servlet-style URL pattern.
///
/// | Pattern   | Matches                                  |
/// |-----------|------------------------------------------|
/// | `/*`      | every path                               |
/// | `/app/*`  | `/app` and everything below it           |
/// | `*.html`  | paths whose last segment ends in `.html` |
/// | `/login`  | exactly `/login`                         |
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UrlPattern {
    All,
    Prefix(String),
    Extension(String),
    Exact(String),
}

impl UrlPattern {
    /// Parse a pattern string.
    pub fn parse(pattern: &str) -> Result<Self, String> {
        let pattern = pattern.trim();

        if pattern == "/*" || pattern == "*" {
            return Ok(UrlPattern::All);
        }

        if let Some(ext) = pattern.strip_prefix("*.") {
            if ext.is_empty() || ext.contains(['*', '/']) {
                return Err(format!("invalid extension pattern: {}", pattern));
            }
            return Ok(UrlPattern::Extension(ext.to_string()));
        }

        if !pattern.starts_with('/') {
            return Err(format!("pattern must start with '/' or '*.': {:?}", pattern));
        }

        if let Some(prefix) = pattern.strip_suffix("/*") {
            if prefix.contains('*') {
                return Err(format!("wildcard only allowed at the end: {}", pattern));
            }
            return Ok(UrlPattern::Prefix(prefix.to_string()));
        }

        if pattern.contains('*') {
            return Err(format!("wildcard only allowed at the end: {}", pattern));
        }

        Ok(UrlPattern::Exact(pattern.to_string()))
    }

    /// Check whether a request path matches.
    pub fn matches(&self, path: &str) -> bool {
        match self {
            UrlPattern::All => true,
            UrlPattern::Prefix(prefix) => {
                path == prefix
                    || path
                        .strip_prefix(prefix.as_str())
                        .is_some_and(|rest| rest.starts_with('/'))
            }
            UrlPattern::Extension(ext) => {
                let last = path.rsplit('/').next().unwrap_or(path);
                last.rsplit_once('.').is_some_and(|(_, e)| e == ext)
            }
            UrlPattern::Exact(exact) => path == exact,
        }
    }
}

impl FromStr for UrlPattern {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for UrlPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UrlPattern::All => f.write_str("/*"),
            UrlPattern::Prefix(prefix) => write!(f, "{}/*", prefix),
            UrlPattern::Extension(ext) => write!(f, "*.{}", ext),
            UrlPattern::Exact(exact) => f.write_str(exact),
        }
    }
}
