//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check that the served tree and TLS files exist
//! - Check URL shapes (root, push endpoint) and compiler patterns
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServerConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::path::PathBuf;
use thiserror::Error;

use crate::config::schema::ServerConfig;

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("base directory {0:?} is not a directory")]
    BaseDirMissing(PathBuf),

    #[error("root {0:?} must start and end with '/'")]
    InvalidRoot(String),

    #[error("push path {path:?} {reason}")]
    InvalidPushPath { path: String, reason: &'static str },

    #[error("push buffer must be greater than zero")]
    ZeroPushBuffer,

    #[error("compiler pattern {pattern:?} is not a valid regex: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("map entry {0:?} has an empty prefix")]
    EmptyMapPrefix(String),

    #[error("TLS file {0:?} not found")]
    TlsFileMissing(PathBuf),
}

/// Validate a configuration, collecting every problem found.
pub fn validate_config(config: &ServerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let site = &config.site;

    if !site.base_dir.is_dir() {
        errors.push(ValidationError::BaseDirMissing(site.base_dir.clone()));
    }

    if !site.root.starts_with('/') || !site.root.ends_with('/') {
        errors.push(ValidationError::InvalidRoot(site.root.clone()));
    }

    if let Some(reason) = push_path_problem(&config.push.path) {
        errors.push(ValidationError::InvalidPushPath {
            path: config.push.path.clone(),
            reason,
        });
    }

    if config.push.buffer == 0 {
        errors.push(ValidationError::ZeroPushBuffer);
    }

    for mapping in &site.compilers {
        if let Err(e) = regex::Regex::new(&mapping.pattern) {
            errors.push(ValidationError::InvalidPattern {
                pattern: mapping.pattern.clone(),
                reason: e.to_string(),
            });
        }
    }

    for key in site.map.keys() {
        if key.trim_matches('/').is_empty() {
            errors.push(ValidationError::EmptyMapPrefix(key.clone()));
        }
    }

    if let Some((cert, key)) = config.listener.ssl.files() {
        for file in [cert, key] {
            if !file.is_file() {
                errors.push(ValidationError::TlsFileMissing(file.to_path_buf()));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// The push path becomes a literal router route; it must not capture or
/// collide with the favicon route.
fn push_path_problem(path: &str) -> Option<&'static str> {
    if !path.starts_with('/') {
        return Some("must start with '/'");
    }
    if path == "/favicon.ico" {
        return Some("collides with the favicon route");
    }
    if path.contains(['{', '}', '*']) || path.split('/').any(|s| s.starts_with(':')) {
        return Some("must not contain path parameters or wildcards");
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::{CompilerMapping, TlsSetting};

    fn valid_config(dir: &tempfile::TempDir) -> ServerConfig {
        let mut config = ServerConfig::default();
        config.site.base_dir = dir.path().to_path_buf();
        config.listener.ssl = TlsSetting::Toggle(false);
        config
    }

    #[test]
    fn accepts_defaults_on_existing_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(validate_config(&valid_config(&dir)), Ok(()));
    }

    #[test]
    fn reports_every_problem() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = valid_config(&dir);
        config.site.base_dir = dir.path().join("missing");
        config.site.root = "app".into();
        config.site.compilers.push(CompilerMapping {
            pattern: "(".into(),
            compiler: "stylesheet".into(),
        });
        config.site.map.insert("/".into(), PathBuf::from("x"));
        config.push.buffer = 0;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 5);
        assert!(matches!(errors[0], ValidationError::BaseDirMissing(_)));
        assert!(matches!(errors[1], ValidationError::InvalidRoot(_)));
        assert!(errors.contains(&ValidationError::ZeroPushBuffer));
    }

    #[test]
    fn tls_files_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = valid_config(&dir);
        config.listener.ssl = TlsSetting::Files {
            cert_path: dir.path().join("server.crt"),
            key_path: dir.path().join("server.key"),
        };

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors
            .iter()
            .all(|e| matches!(e, ValidationError::TlsFileMissing(_))));
    }

    #[test]
    fn push_path_must_be_a_plain_route() {
        let dir = tempfile::tempdir().unwrap();
        for path in ["socket", "/favicon.ico", "/live/*rest", "/live/{id}", "/live/:id"] {
            let mut config = valid_config(&dir);
            config.push.path = path.into();
            let errors = validate_config(&config).unwrap_err();
            assert!(
                matches!(&errors[..], [ValidationError::InvalidPushPath { path: p, .. }] if p == path),
                "{path} accepted"
            );
        }

        let mut config = valid_config(&dir);
        config.push.path = "/live/reload".into();
        assert_eq!(validate_config(&config), Ok(()));
    }
}
