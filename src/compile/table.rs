//! Compiler registry and the ordered pattern table.

use regex::Regex;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

use crate::compile::{Compiler, StylesheetCompiler};
use crate::config::CompilerMapping;

/// Error type for compiler table construction.
#[derive(Debug, Error)]
pub enum CompilerTableError {
    #[error("invalid compiler pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("no compiler registered under {0:?}")]
    UnknownCompiler(String),
}

/// Named compilers available to `[[site.compilers]]` entries.
#[derive(Debug, Clone)]
pub struct CompilerRegistry {
    compilers: HashMap<String, Arc<dyn Compiler>>,
}

impl CompilerRegistry {
    /// Registry without any compilers.
    pub fn empty() -> Self {
        Self {
            compilers: HashMap::new(),
        }
    }

    /// Register (or replace) a compiler under `name`.
    pub fn register(&mut self, name: impl Into<String>, compiler: Arc<dyn Compiler>) {
        self.compilers.insert(name.into(), compiler);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Compiler>> {
        self.compilers.get(name).cloned()
    }
}

impl Default for CompilerRegistry {
    /// Registry holding the built-in `stylesheet` compiler.
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register("stylesheet", Arc::new(StylesheetCompiler::default()));
        registry
    }
}

/// Ordered pattern → compiler associations.
#[derive(Debug, Clone, Default)]
pub struct CompilerTable {
    entries: Vec<(Regex, Arc<dyn Compiler>)>,
}

impl CompilerTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the table from config mappings, keeping their order.
    pub fn from_mappings(
        mappings: &[CompilerMapping],
        registry: &CompilerRegistry,
    ) -> Result<Self, CompilerTableError> {
        let mut table = Self::new();
        for mapping in mappings {
            let compiler = registry
                .get(&mapping.compiler)
                .ok_or_else(|| CompilerTableError::UnknownCompiler(mapping.compiler.clone()))?;
            table.register(&mapping.pattern, compiler)?;
        }
        Ok(table)
    }

    /// Append a pattern. Later registrations are tried after earlier ones.
    pub fn register(
        &mut self,
        pattern: &str,
        compiler: Arc<dyn Compiler>,
    ) -> Result<&mut Self, CompilerTableError> {
        let regex = Regex::new(pattern).map_err(|source| CompilerTableError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })?;
        self.entries.push((regex, compiler));
        Ok(self)
    }

    /// First compiler whose pattern matches `path`.
    pub fn find(&self, path: &str) -> Option<&Arc<dyn Compiler>> {
        self.entries
            .iter()
            .find(|(regex, _)| regex.is_match(path))
            .map(|(_, compiler)| compiler)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
