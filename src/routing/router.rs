//! Route table.
//!
//! # Responsibilities
//! - Map exact paths to handlers
//! - Reject configurations the dispatcher cannot serve
//!
//! # Design Decisions
//! - Exact-path dispatch only; no patterns or wildcards
//! - The static asset prefix is reserved
//! - Validation happens once, before the router is built

use std::collections::BTreeMap;

use axum::routing::MethodRouter;
use thiserror::Error;

use crate::http::assets::STATIC_PREFIX;
use crate::http::context::AppContext;

/// The root path, optionally owned by the not-found fallback.
pub const ROOT_PATH: &str = "/";

/// Invalid route table entry.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RouteError {
    #[error("reserved path: {0}")]
    Reserved(String),

    #[error("invalid route path {0:?}: paths are exact and must start with '/'")]
    Invalid(String),
}

/// Exact path → handler table.
#[derive(Debug, Default)]
pub struct Routes {
    entries: BTreeMap<String, MethodRouter<AppContext>>,
}

impl Routes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` at `path`, replacing any previous entry.
    pub fn insert(&mut self, path: impl Into<String>, handler: MethodRouter<AppContext>) {
        self.entries.insert(path.into(), handler);
    }

    pub fn has_root(&self) -> bool {
        self.entries.contains_key(ROOT_PATH)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Check every path. The first offending path is reported.
    pub fn validate(&self) -> Result<(), RouteError> {
        self.entries.keys().try_for_each(|path| validate_path(path))
    }

    pub fn into_entries(self) -> impl Iterator<Item = (String, MethodRouter<AppContext>)> {
        self.entries.into_iter()
    }
}

fn validate_path(path: &str) -> Result<(), RouteError> {
    let reserved_root = STATIC_PREFIX.trim_end_matches('/');
    if path == reserved_root || path.starts_with(STATIC_PREFIX) {
        return Err(RouteError::Reserved(path.to_string()));
    }

    if !path.starts_with('/') || path.contains(['{', '}', '*']) {
        return Err(RouteError::Invalid(path.to_string()));
    }

    Ok(())
}
