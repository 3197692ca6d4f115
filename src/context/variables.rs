//! Layered variable lookup over the scopes of a bound request.
//!
//! Lookup order, first hit wins:
//!
//! 1. request attributes
//! 2. request parameters (first submitted value, as a string)
//! 3. session attributes, when the request has a session
//! 4. application attributes, when the request has an application scope

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use super::BoundContext;
use crate::core::Request;

/// Attribute scope a variable was found in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Scope {
    Request,
    Parameter,
    Session,
    Application,
}

impl Scope {
    /// Scopes in lookup order.
    pub const ORDER: [Scope; 4] = [
        Scope::Request,
        Scope::Parameter,
        Scope::Session,
        Scope::Application,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Scope::Request => "request",
            Scope::Parameter => "parameter",
            Scope::Session => "session",
            Scope::Application => "application",
        }
    }

    fn lookup(self, request: &Request, key: &str) -> Option<Value> {
        match self {
            Scope::Request => request.attributes().get(key),
            Scope::Parameter => request.parameter(key).map(|v| Value::String(v.to_string())),
            Scope::Session => request.session().and_then(|s| s.attributes().get(key)),
            Scope::Application => request.application().and_then(|a| a.attributes().get(key)),
        }
    }

    fn entries(self, request: &Request) -> HashMap<String, Value> {
        match self {
            Scope::Request => request.attributes().snapshot(),
            Scope::Parameter => {
                let mut params = HashMap::new();
                for (k, v) in request.parameters() {
                    params
                        .entry(k.clone())
                        .or_insert_with(|| Value::String(v.clone()));
                }
                params
            }
            Scope::Session => request
                .session()
                .map(|s| s.attributes().snapshot())
                .unwrap_or_default(),
            Scope::Application => request
                .application()
                .map(|a| a.attributes().snapshot())
                .unwrap_or_default(),
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolve `key` against the layered scopes of `request`.
pub fn resolve(request: &Request, key: &str) -> Option<Value> {
    find(request, key).map(|(_, value)| value)
}

/// Like [`resolve`], also reporting the scope that matched.
pub fn find(request: &Request, key: &str) -> Option<(Scope, Value)> {
    Scope::ORDER
        .into_iter()
        .find_map(|scope| scope.lookup(request, key).map(|value| (scope, value)))
}

/// Map-like view of the variable namespace of a bound request.
///
/// Returned by the strict accessor; reads always reflect the current state
/// of the underlying scopes.
#[derive(Clone, Debug)]
pub struct Variables {
    context: Arc<BoundContext>,
}

impl Variables {
    pub fn new(context: Arc<BoundContext>) -> Self {
        Self { context }
    }

    #[inline]
    pub fn context(&self) -> &Arc<BoundContext> {
        &self.context
    }

    #[inline]
    pub fn get(&self, key: &str) -> Option<Value> {
        resolve(self.context.request(), key)
    }

    #[inline]
    pub fn find(&self, key: &str) -> Option<(Scope, Value)> {
        find(self.context.request(), key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.find(key).is_some()
    }

    /// All visible variable names, sorted.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.to_map().into_keys().collect();
        keys.sort();
        keys
    }

    /// Materialise the merged namespace. Higher-priority scopes shadow
    /// lower ones.
    pub fn to_map(&self) -> HashMap<String, Value> {
        let request = self.context.request();
        let mut merged = HashMap::new();
        for scope in Scope::ORDER.into_iter().rev() {
            merged.extend(scope.entries(request));
        }
        merged
    }
}
