//! Configuration loading from disk.

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::schema::ServerConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Read and deserialize a TOML config file without validating it.
///
/// Callers that layer CLI overrides on top validate afterwards with
/// [`validate_config`].
pub fn parse_config(path: &Path) -> Result<ServerConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config_str(&content)
}

/// Deserialize a config from TOML text.
pub fn parse_config_str(content: &str) -> Result<ServerConfig, ConfigError> {
    Ok(toml::from_str(content)?)
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ServerConfig, ConfigError> {
    let config = parse_config(path)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::TlsSetting;

    #[test]
    fn parses_sections() {
        let config = parse_config_str(
            r#"
            [site]
            base_dir = "public"
            root = "/app/"
            push_state = false
            exclude = ["vendor"]

            [site.map]
            "lib/js" = "bower_components"

            [[site.compilers]]
            pattern = "\\.less$"
            compiler = "stylesheet"

            [listener]
            host = "0.0.0.0"
            port = 9000
            ssl = false
            compression = false

            [push]
            path = "/live"
            watch = true
            "#,
        )
        .unwrap();

        assert_eq!(config.site.base_dir, PathBuf::from("public"));
        assert_eq!(config.site.root, "/app/");
        assert!(!config.site.push_state);
        assert_eq!(config.site.exclude, vec!["vendor".to_string()]);
        assert_eq!(
            config.site.map.get("lib/js"),
            Some(&PathBuf::from("bower_components"))
        );
        assert_eq!(config.site.compilers[0].pattern, r"\.less$");
        assert_eq!(config.listener.host, "0.0.0.0");
        assert_eq!(config.listener.port, 9000);
        assert_eq!(config.listener.ssl, TlsSetting::Toggle(false));
        assert!(!config.listener.compression);
        assert_eq!(config.push.path, "/live");
        assert!(config.push.watch);
        assert_eq!(config.push.buffer, 64);
    }

    #[test]
    fn empty_file_is_all_defaults() {
        let config = parse_config_str("").unwrap();
        assert_eq!(config.site.root, "/");
        assert!(config.site.push_state);
        assert_eq!(config.push.path, "/socket");
    }

    #[test]
    fn rejects_unknown_types() {
        let err = parse_config_str("[listener]\nport = \"eighty\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn load_validates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("server.toml");
        fs::write(
            &path,
            format!(
                "[site]\nbase_dir = {:?}\nroot = \"nope\"\n[listener]\nssl = false\n",
                dir.path().display().to_string()
            ),
        )
        .unwrap();

        let err = load_config(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ref v) if v.len() == 1));
        assert!(err.to_string().contains("root"));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_config(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    /// Sets an environment variable for the guard's lifetime.
    struct EnvVar {
        name: &'static str,
        previous: Option<String>,
    }

    impl EnvVar {
        fn set(name: &'static str, value: &str) -> Self {
            let previous = std::env::var(name).ok();
            std::env::set_var(name, value);
            Self { name, previous }
        }
    }

    impl Drop for EnvVar {
        fn drop(&mut self) {
            match &self.previous {
                Some(value) => std::env::set_var(self.name, value),
                None => std::env::remove_var(self.name),
            }
        }
    }

    #[test]
    fn env_fills_only_what_the_file_leaves_out() {
        let dir = tempfile::tempdir().unwrap();
        let _port = EnvVar::set("PORT", "4321");
        let _host = EnvVar::set("HOST", "0.0.0.0");

        let explicit = dir.path().join("explicit.toml");
        fs::write(&explicit, "[listener]\nport = 9000\nhost = \"localhost\"\n").unwrap();
        let config = parse_config(&explicit).unwrap();
        assert_eq!(config.listener.port, 9000);
        assert_eq!(config.listener.host, "localhost");

        let silent = dir.path().join("silent.toml");
        fs::write(&silent, "[listener]\ncompression = false\n").unwrap();
        let config = parse_config(&silent).unwrap();
        assert_eq!(config.listener.port, 4321);
        assert_eq!(config.listener.host, "0.0.0.0");
        assert!(!config.listener.compression);

        // No [listener] table at all.
        let config = parse_config_str("").unwrap();
        assert_eq!(config.listener.port, 4321);
    }
}
