//! Static asset source.

use std::path::{Path, PathBuf};

use tower_http::services::ServeDir;

/// Path prefix reserved for static assets.
pub const STATIC_PREFIX: &str = "/static/";

/// Read-only handle on the static asset directory.
#[derive(Debug, Clone)]
pub struct StaticAssets {
    root: PathBuf,
}

impl StaticAssets {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Service answering requests below [`STATIC_PREFIX`].
    ///
    /// Paths escaping the root are refused by `ServeDir` itself.
    pub fn service(&self) -> ServeDir {
        ServeDir::new(&self.root)
    }
}
