//! Session and application scopes.
//!
//! Both are owned by the hosting server. Requests only hold shared handles
//! to them, and the resolver only reads their attributes.

use std::time::Instant;

use super::Attributes;

/// Attribute scope that spans the requests of one client session.
#[derive(Debug)]
pub struct Session {
    id: String,
    created_at: Instant,
    attributes: Attributes,
}

impl Session {
    /// Create a session with a random id.
    pub fn new() -> Self {
        Self::with_id(uuid::Uuid::new_v4().to_string())
    }

    /// Create a session with a known id (e.g. restored from a cookie).
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            created_at: Instant::now(),
            attributes: Attributes::new(),
        }
    }

    #[inline]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[inline]
    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    /// Time since the session was created.
    #[inline]
    pub fn age(&self) -> std::time::Duration {
        self.created_at.elapsed()
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// Application-wide attribute scope, shared by every request.
#[derive(Debug)]
pub struct Application {
    name: String,
    attributes: Attributes,
}

impl Application {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Attributes::new(),
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }
}
