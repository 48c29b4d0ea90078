//! Stylesheet preprocessor.
//!
//! Flattens `@import` directives into a single CSS document and drops
//! whole-line `//` comments. Imports resolve against the directory of the
//! file that contains them; an import without an extension tries `.styl`
//! and then `.css`. Imports of URLs (`url(...)`, `http://`, `//cdn`) are
//! left for the browser.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::compile::{CompileContext, CompileError, CompiledAsset, Compiler};

const CONTENT_TYPE: &str = "text/css; charset=utf-8";

#[derive(Debug, Clone)]
pub struct StylesheetCompiler {
    extensions: Vec<String>,
    max_depth: usize,
}

impl Default for StylesheetCompiler {
    fn default() -> Self {
        Self {
            extensions: vec!["styl".to_string(), "css".to_string()],
            max_depth: 32,
        }
    }
}

impl Compiler for StylesheetCompiler {
    fn compile(&self, source: &[u8], ctx: &CompileContext) -> Result<CompiledAsset, CompileError> {
        let text = std::str::from_utf8(source).map_err(|_| CompileError::InvalidUtf8 {
            path: ctx.source_path.clone(),
        })?;

        let mut stack = vec![normalize(&ctx.source_path)];
        let mut out = String::with_capacity(text.len());
        self.expand(text, &ctx.source_path, &mut stack, &mut out)?;

        Ok(CompiledAsset::new(CONTENT_TYPE, out))
    }
}

impl StylesheetCompiler {
    fn expand(
        &self,
        text: &str,
        file: &Path,
        stack: &mut Vec<PathBuf>,
        out: &mut String,
    ) -> Result<(), CompileError> {
        let dir = file.parent().unwrap_or_else(|| Path::new(""));

        for line in text.lines() {
            let trimmed = line.trim();
            if trimmed.starts_with("//") {
                continue;
            }

            let Some(import) = parse_import(trimmed) else {
                out.push_str(line);
                out.push('\n');
                continue;
            };

            if is_remote(import) {
                out.push_str(line);
                out.push('\n');
                continue;
            }

            let resolved = self
                .locate(dir, import)
                .ok_or_else(|| CompileError::ImportNotFound {
                    import: import.to_string(),
                    from: file.to_path_buf(),
                })?;
            let key = normalize(&resolved);
            if stack.contains(&key) || stack.len() >= self.max_depth {
                return Err(CompileError::ImportCycle(resolved));
            }

            let nested = fs::read_to_string(&resolved).map_err(|source| match source.kind() {
                io::ErrorKind::InvalidData => CompileError::InvalidUtf8 {
                    path: resolved.clone(),
                },
                _ => CompileError::Io {
                    path: resolved.clone(),
                    source,
                },
            })?;

            stack.push(key);
            self.expand(&nested, &resolved, stack, out)?;
            stack.pop();
        }

        Ok(())
    }

    fn locate(&self, dir: &Path, import: &str) -> Option<PathBuf> {
        let direct = dir.join(import);
        if Path::new(import).extension().is_some() {
            return direct.is_file().then_some(direct);
        }
        self.extensions
            .iter()
            .map(|ext| dir.join(format!("{import}.{ext}")))
            .find(|candidate| candidate.is_file())
    }
}

/// Target of an `@import "x"` / `@import 'x'` / `@import x` line.
fn parse_import(line: &str) -> Option<&str> {
    let rest = line.strip_prefix("@import")?;
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let target = rest.trim().trim_end_matches(';').trim();
    let target = target
        .strip_prefix('"')
        .and_then(|t| t.strip_suffix('"'))
        .or_else(|| target.strip_prefix('\'').and_then(|t| t.strip_suffix('\'')))
        .unwrap_or(target);
    (!target.is_empty()).then_some(target)
}

fn is_remote(import: &str) -> bool {
    import.starts_with("url(")
        || import.starts_with("//")
        || import.starts_with("http://")
        || import.starts_with("https://")
}

fn normalize(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}
