//! URL prefix to filesystem mapping table.
//!
//! # Responsibilities
//! - Discover the immediate subdirectories of the base directory
//! - Merge explicit overrides on top of discovered entries
//! - Find the most specific mapping for a request path
//!
//! # Design Decisions
//! - Built once at startup, immutable afterwards (shared via Arc)
//! - Keys held in a BTreeMap and scanned in reverse order, so `a/b` is
//!   tested before `a`
//! - Target kind (directory or file) is sampled at build time

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::routing::matcher::{PrefixRule, TargetKind};

/// One prefix mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mapping {
    rule: PrefixRule,
    target: PathBuf,
}

impl Mapping {
    fn new(prefix: String, target: PathBuf) -> Self {
        let kind = if target.is_dir() {
            TargetKind::Directory
        } else {
            TargetKind::File
        };
        Self {
            rule: PrefixRule::new(prefix, kind),
            target,
        }
    }

    pub fn prefix(&self) -> &str {
        self.rule.prefix()
    }

    pub fn target(&self) -> &Path {
        &self.target
    }

    pub fn kind(&self) -> TargetKind {
        self.rule.kind()
    }
}

/// Result of looking a path up in the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappedPath {
    /// Filesystem location the request refers to.
    pub path: PathBuf,
    /// Prefix that produced the location, `None` for the base directory default.
    pub prefix: Option<String>,
}

/// Frozen set of prefix mappings.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    base_dir: PathBuf,
    mappings: BTreeMap<String, Mapping>,
}

impl RouteTable {
    /// Build the table from the subdirectories of `base_dir` plus `overrides`.
    ///
    /// Entries whose name starts with `.` or appears in `exclude` are skipped,
    /// as is anything that is not a directory. Override keys replace
    /// discovered ones; leading and trailing slashes on keys are ignored.
    pub fn build<'a>(
        base_dir: &Path,
        exclude: impl IntoIterator<Item = &'a str>,
        overrides: &BTreeMap<String, PathBuf>,
    ) -> io::Result<Self> {
        let exclude: HashSet<&str> = exclude.into_iter().collect();
        let mut mappings = BTreeMap::new();

        for entry in fs::read_dir(base_dir)? {
            let entry = entry?;
            let name = match entry.file_name().into_string() {
                Ok(name) => name,
                Err(raw) => {
                    tracing::debug!(name = ?raw, "Skipping non UTF-8 directory name");
                    continue;
                }
            };
            if name.starts_with('.') || exclude.contains(name.as_str()) {
                continue;
            }
            let target = base_dir.join(&name);
            if !target.is_dir() {
                continue;
            }
            mappings.insert(name.clone(), Mapping::new(name, target));
        }

        for (key, target) in overrides {
            let prefix = key.trim_matches('/').to_string();
            mappings.insert(prefix.clone(), Mapping::new(prefix, target.clone()));
        }

        tracing::debug!(
            base_dir = %base_dir.display(),
            prefixes = ?mappings.keys().collect::<Vec<_>>(),
            "Route table built"
        );

        Ok(Self {
            base_dir: base_dir.to_path_buf(),
            mappings,
        })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }

    pub fn get(&self, prefix: &str) -> Option<&Mapping> {
        self.mappings.get(prefix)
    }

    /// Mappings in evaluation order (reverse lexicographic by prefix).
    pub fn iter(&self) -> impl Iterator<Item = &Mapping> {
        self.mappings.values().rev()
    }

    /// First mapping whose rule matches `path`, with the remainder after its prefix.
    pub fn lookup<'p>(&self, path: &'p str) -> Option<(&Mapping, &'p str)> {
        self.iter()
            .find_map(|mapping| mapping.rule.strip(path).map(|rest| (mapping, rest)))
    }

    /// Map a root-relative request path onto the filesystem.
    ///
    /// Unmatched paths land under the base directory.
    pub fn map_path(&self, path: &str) -> MappedPath {
        match self.lookup(path) {
            Some((mapping, rest)) => MappedPath {
                path: join_remainder(&mapping.target, rest),
                prefix: Some(mapping.prefix().to_string()),
            },
            None => MappedPath {
                path: join_remainder(&self.base_dir, path),
                prefix: None,
            },
        }
    }
}

fn join_remainder(base: &Path, rest: &str) -> PathBuf {
    let rest = rest.trim_start_matches('/');
    if rest.is_empty() {
        base.to_path_buf()
    } else {
        base.join(rest)
    }
}
