//! Compile-on-read subsystem.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     [[site.compilers]] (pattern → name)
//!     → CompilerRegistry (name → Arc<dyn Compiler>)
//!     → CompilerTable (ordered regex → compiler, frozen)
//!
//! Request:
//!     root-relative path → first matching pattern
//!     → resolver reads the mapped file
//!     → Compiler::compile(bytes, context) on the blocking pool
//!     → CompiledAsset (content type + body)
//! ```
//!
//! # Design Decisions
//! - Compilers are synchronous; the resolver moves them off the runtime
//! - Patterns are tried in registration order, first match wins
//! - A compiler error is the only error a request can produce

pub mod stylesheet;
pub mod table;

use bytes::Bytes;
use std::path::PathBuf;
use thiserror::Error;

pub use stylesheet::StylesheetCompiler;
pub use table::{CompilerRegistry, CompilerTable, CompilerTableError};

/// Request details handed to a compiler alongside the source bytes.
#[derive(Debug, Clone)]
pub struct CompileContext {
    /// Request path as received, query string included.
    pub request_path: String,
    /// File the source bytes were read from.
    pub source_path: PathBuf,
}

/// Output of a compiler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledAsset {
    pub content_type: String,
    pub body: Bytes,
}

impl CompiledAsset {
    pub fn new(content_type: impl Into<String>, body: impl Into<Bytes>) -> Self {
        Self {
            content_type: content_type.into(),
            body: body.into(),
        }
    }
}

/// Failure while compiling a matched source file.
#[derive(Debug, Error)]
pub enum CompileError {
    #[error("{path:?} is not valid UTF-8")]
    InvalidUtf8 { path: PathBuf },

    #[error("import {import:?} in {from:?} not found")]
    ImportNotFound { import: String, from: PathBuf },

    #[error("import cycle through {0:?}")]
    ImportCycle(PathBuf),

    #[error("IO error reading {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("compiler task aborted: {0}")]
    Aborted(String),

    #[error("{0}")]
    Failed(String),
}

/// Turns a source file into a servable asset.
pub trait Compiler: Send + Sync + std::fmt::Debug {
    /// Compile `source`, read from `ctx.source_path`.
    fn compile(&self, source: &[u8], ctx: &CompileContext) -> Result<CompiledAsset, CompileError>;
}
