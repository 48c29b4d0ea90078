//! Request path resolution.
//!
//! # Responsibilities
//! - Turn a request path into something to serve
//! - Run the three stages in order: compilers, prefix mappings, fallback
//!
//! # Design Decisions
//! - Each stage returns a hit or a miss; a missing file is a miss
//! - Only a failing compiler surfaces an error
//! - No caching, every request re-reads from disk
//! - Paths with `..` segments never resolve to a file

use bytes::Bytes;
use std::borrow::Cow;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::compile::{CompileContext, CompileError, CompiledAsset, CompilerTable};
use crate::routing::table::RouteTable;

/// What to answer a request with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// A compiler produced the body.
    Compiled { source: PathBuf, asset: CompiledAsset },
    /// A file under a prefix mapping.
    Static { path: PathBuf, body: Bytes },
    /// The index document, for client-side routing.
    Fallback { path: PathBuf, body: Bytes },
    /// Nothing matched.
    NotFound,
}

/// Resolves request paths against the route and compiler tables.
#[derive(Debug, Clone)]
pub struct PathResolver {
    root: String,
    routes: Arc<RouteTable>,
    compilers: Arc<CompilerTable>,
    index: PathBuf,
    push_state: bool,
}

impl PathResolver {
    pub fn new(
        root: impl Into<String>,
        routes: Arc<RouteTable>,
        compilers: Arc<CompilerTable>,
        index: PathBuf,
        push_state: bool,
    ) -> Self {
        Self {
            root: root.into(),
            routes,
            compilers,
            index,
            push_state,
        }
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    /// Resolve a request path, query string allowed.
    pub async fn resolve(&self, request_path: &str) -> Result<Decision, CompileError> {
        let Some(path) = self.relative_path(request_path) else {
            return Ok(self.fallback().await);
        };

        if let Some(decision) = self.compile_stage(request_path, &path).await? {
            return Ok(decision);
        }

        if let Some(decision) = self.static_stage(&path).await {
            return Ok(decision);
        }

        Ok(self.fallback().await)
    }

    /// Strip query and root, then percent-decode.
    ///
    /// `None` when the path is outside the root, cannot be decoded, or
    /// tries to climb out with `..`.
    fn relative_path<'a>(&self, request_path: &'a str) -> Option<Cow<'a, str>> {
        let path = request_path.split('?').next().unwrap_or_default();
        let path = path.strip_prefix(self.root.as_str()).or_else(|| {
            // "/app" for a root of "/app/".
            (path == self.root.trim_end_matches('/')).then_some("")
        })?;

        let decoded = match urlencoding::decode(path) {
            Ok(decoded) => decoded,
            Err(e) => {
                tracing::debug!(path = %request_path, error = %e, "Undecodable request path");
                return None;
            }
        };

        if decoded.split(['/', '\\']).any(|segment| segment == "..") {
            tracing::warn!(path = %request_path, "Rejecting path traversal");
            return None;
        }

        Some(decoded)
    }

    async fn compile_stage(
        &self,
        request_path: &str,
        path: &str,
    ) -> Result<Option<Decision>, CompileError> {
        let Some(compiler) = self.compilers.find(path) else {
            return Ok(None);
        };

        let source = self.routes.map_path(path).path;
        let Some(bytes) = read_if_present(&source).await else {
            tracing::debug!(path = %path, source = %source.display(), "Compiler source missing");
            return Ok(None);
        };

        let compiler = Arc::clone(compiler);
        let ctx = CompileContext {
            request_path: request_path.to_string(),
            source_path: source.clone(),
        };
        let asset = tokio::task::spawn_blocking(move || compiler.compile(&bytes, &ctx))
            .await
            .map_err(|e| CompileError::Aborted(e.to_string()))??;

        tracing::debug!(source = %source.display(), bytes = asset.body.len(), "Compiled asset");
        Ok(Some(Decision::Compiled { source, asset }))
    }

    async fn static_stage(&self, path: &str) -> Option<Decision> {
        let mapped = self.routes.map_path(path);
        mapped.prefix.as_ref()?;

        let body = read_if_present(&mapped.path).await?;
        Some(Decision::Static {
            path: mapped.path,
            body,
        })
    }

    /// Fallback stage on its own, for requests that skip the file stages.
    pub async fn fallback(&self) -> Decision {
        if !self.push_state {
            return Decision::NotFound;
        }
        match read_if_present(&self.index).await {
            Some(body) => Decision::Fallback {
                path: self.index.clone(),
                body,
            },
            None => {
                tracing::warn!(index = %self.index.display(), "Index document missing");
                Decision::NotFound
            }
        }
    }
}

/// Read a whole file, treating any failure as a miss.
///
/// Plain absence is silent; other I/O errors are logged since they
/// usually point at a permissions problem in the served tree.
pub(crate) async fn read_if_present(path: &Path) -> Option<Bytes> {
    match tokio::fs::read(path).await {
        Ok(bytes) => Some(Bytes::from(bytes)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => None,
        Err(e) => {
            if !is_absent(path).await {
                tracing::warn!(path = %path.display(), error = %e, "Failed to read file");
            }
            None
        }
    }
}

/// Whether a failed read was plain absence: a directory at the path, or
/// nothing statable there (e.g. a parent component is a file).
async fn is_absent(path: &Path) -> bool {
    match tokio::fs::metadata(path).await {
        Ok(meta) => meta.is_dir(),
        Err(_) => true,
    }
}
