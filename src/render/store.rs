//! Two-layer template composition.
//!
//! # Responsibilities
//! - Read a shared base layout and a page-specific child from the template dir
//! - Compile both into one named, reusable page
//! - Keep composed pages addressable by name
//!
//! # Design Decisions
//! - The child extends the base implicitly; blocks it defines override the base
//! - A child that declares its own `{% extends %}` is used as written
//! - Missing or unparsable files are errors for the caller to abort startup on

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;
use tera::{Context, Tera};
use thiserror::Error;

/// Failure while composing a page.
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("failed to read template {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse template {name}: {source}")]
    Parse {
        name: String,
        #[source]
        source: tera::Error,
    },
}

/// A compiled base + child template, ready to execute.
#[derive(Debug, Clone)]
pub struct Page {
    tera: Tera,
    name: String,
}

impl Page {
    /// Name of the child template this page was built from.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Execute the page against `data` into a string.
    pub fn execute<D: Serialize>(&self, data: &D) -> Result<String, tera::Error> {
        let context = Context::from_serialize(data)?;
        self.tera.render(&self.name, &context)
    }
}

/// Composed pages keyed by name.
#[derive(Debug, Clone)]
pub struct TemplateStore {
    root: PathBuf,
    pages: HashMap<String, Arc<Page>>,
}

impl TemplateStore {
    /// Create an empty store reading templates below `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            pages: HashMap::new(),
        }
    }

    /// Compose `name` on top of `base` and register the page under `name`.
    pub fn compose(&mut self, name: &str, base: &str) -> Result<Arc<Page>, TemplateError> {
        let base_source = self.read(base)?;
        let child_source = self.read(name)?;

        let mut tera = Tera::default();
        tera.add_raw_template(base, &base_source)
            .map_err(|source| TemplateError::Parse {
                name: base.to_string(),
                source,
            })?;

        let child_source = if declares_extends(&child_source) {
            child_source
        } else {
            format!("{{% extends {:?} %}}\n{}", base, child_source)
        };
        tera.add_raw_template(name, &child_source)
            .map_err(|source| TemplateError::Parse {
                name: name.to_string(),
                source,
            })?;

        let page = Arc::new(Page {
            tera,
            name: name.to_string(),
        });
        self.pages.insert(name.to_string(), page.clone());

        tracing::debug!(template = %name, base = %base, "Template composed");
        Ok(page)
    }

    /// Look up a previously composed page.
    pub fn get(&self, name: &str) -> Option<Arc<Page>> {
        self.pages.get(name).cloned()
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    fn read(&self, name: &str) -> Result<String, TemplateError> {
        let path = self.root.join(name);
        fs::read_to_string(&path).map_err(|source| TemplateError::Io { path, source })
    }
}

fn declares_extends(source: &str) -> bool {
    source.trim_start().starts_with("{% extends") || source.trim_start().starts_with("{%- extends")
}
