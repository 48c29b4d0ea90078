//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the dev server.
//! All types derive Serde traits for deserialization from config files.
//!
//! Listener defaults fall back to the `HOST`, `PORT` and `SSL` environment
//! variables when the file does not set them.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Root configuration for the dev server.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServerConfig {
    /// What is served and how URLs map onto the disk.
    pub site: SiteConfig,

    /// Listener configuration (bind address, TLS, compression).
    pub listener: ListenerConfig,

    /// Push channel and live reload settings.
    pub push: PushConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl ServerConfig {
    /// Favicon location, defaulting to `<base_dir>/favicon.ico`.
    pub fn favicon_path(&self) -> PathBuf {
        self.site
            .favicon
            .clone()
            .unwrap_or_else(|| self.site.base_dir.join("favicon.ico"))
    }

    /// Fallback document location, defaulting to `<base_dir>/index.html`.
    pub fn index_path(&self) -> PathBuf {
        self.site
            .index
            .clone()
            .unwrap_or_else(|| self.site.base_dir.join("index.html"))
    }

    /// URL scheme the listener speaks.
    pub fn protocol(&self) -> &'static str {
        if self.listener.ssl.is_enabled() {
            "https"
        } else {
            "http"
        }
    }
}

/// Site layout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Root of the served tree.
    pub base_dir: PathBuf,

    /// URL prefix every mapping is relative to.
    pub root: String,

    /// Favicon file. `None` means `<base_dir>/favicon.ico`.
    pub favicon: Option<PathBuf>,

    /// Fallback document. `None` means `<base_dir>/index.html`.
    pub index: Option<PathBuf>,

    /// Answer unmatched requests with the index document.
    pub push_state: bool,

    /// Directory names never auto-mapped.
    pub exclude: Vec<String>,

    /// Explicit URL prefix to path overrides, merged over discovered directories.
    pub map: BTreeMap<String, PathBuf>,

    /// Ordered compile-on-read mappings.
    pub compilers: Vec<CompilerMapping>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from("."),
            root: "/".to_string(),
            favicon: None,
            index: None,
            push_state: true,
            exclude: default_exclude(),
            map: BTreeMap::new(),
            compilers: vec![CompilerMapping {
                pattern: r"\.styl$".to_string(),
                compiler: "stylesheet".to_string(),
            }],
        }
    }
}

fn default_exclude() -> Vec<String> {
    [".git", "node_modules", "log", "test"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// Associates a request path pattern with a named compiler.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CompilerMapping {
    /// Regular expression tested against the root-relative request path.
    pub pattern: String,

    /// Name of a registered compiler.
    pub compiler: String,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Host name or address to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind.
    #[serde(default = "default_port")]
    pub port: u16,

    /// TLS toggle or material.
    #[serde(default = "default_ssl")]
    pub ssl: TlsSetting,

    /// Gzip responses when the client accepts it.
    pub compression: bool,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            ssl: default_ssl(),
            compression: true,
        }
    }
}

fn default_host() -> String {
    host_or_default(std::env::var("HOST").ok())
}

fn default_port() -> u16 {
    port_or_default(std::env::var("PORT").ok())
}

fn default_ssl() -> TlsSetting {
    ssl_or_default(std::env::var("SSL").ok())
}

pub(crate) fn host_or_default(env: Option<String>) -> String {
    env.filter(|h| !h.trim().is_empty())
        .unwrap_or_else(|| "127.0.0.1".to_string())
}

pub(crate) fn port_or_default(env: Option<String>) -> u16 {
    env.and_then(|p| p.trim().parse().ok()).unwrap_or(8000)
}

pub(crate) fn ssl_or_default(env: Option<String>) -> TlsSetting {
    let enabled = env
        .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(false);
    TlsSetting::Toggle(enabled)
}

/// TLS configuration for the listener.
///
/// In a config file this is either a boolean, a table with `cert_path` and
/// `key_path`, or a table with inline PEM `cert` and `key`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum TlsSetting {
    /// `true` loads `ssl/server.crt` and `ssl/server.key`, relative to the
    /// working directory.
    Toggle(bool),

    /// PEM files on disk.
    Files { cert_path: PathBuf, key_path: PathBuf },

    /// PEM text supplied directly.
    Pem { cert: String, key: String },
}

impl TlsSetting {
    /// Whether the listener terminates TLS.
    pub fn is_enabled(&self) -> bool {
        !matches!(self, TlsSetting::Toggle(false))
    }

    /// Certificate and key files this setting reads, if any.
    pub fn files(&self) -> Option<(&Path, &Path)> {
        match self {
            TlsSetting::Toggle(true) => Some((
                Path::new(crate::net::tls::DEFAULT_CERT_PATH),
                Path::new(crate::net::tls::DEFAULT_KEY_PATH),
            )),
            TlsSetting::Files { cert_path, key_path } => Some((cert_path, key_path)),
            _ => None,
        }
    }
}

impl Default for TlsSetting {
    fn default() -> Self {
        TlsSetting::Toggle(false)
    }
}

/// Push channel configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PushConfig {
    /// URL path of the WebSocket endpoint.
    pub path: String,

    /// Messages buffered per client before it starts lagging.
    pub buffer: usize,

    /// Broadcast file change notifications for the base directory.
    pub watch: bool,

    /// Poll interval for the file watcher backend, in milliseconds.
    pub poll_interval_ms: u64,
}

impl Default for PushConfig {
    fn default() -> Self {
        Self {
            path: "/socket".to_string(),
            buffer: 64,
            watch: false,
            poll_interval_ms: 2000,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn site_defaults() {
        let site = SiteConfig::default();
        assert_eq!(site.root, "/");
        assert!(site.push_state);
        assert!(site.exclude.iter().any(|e| e == "node_modules"));
        assert_eq!(site.compilers.len(), 1);
        assert_eq!(site.compilers[0].compiler, "stylesheet");
    }

    #[test]
    fn derived_paths_follow_base_dir() {
        let mut config = ServerConfig::default();
        config.site.base_dir = PathBuf::from("app");
        assert_eq!(config.favicon_path(), PathBuf::from("app/favicon.ico"));
        assert_eq!(config.index_path(), PathBuf::from("app/index.html"));

        config.site.index = Some(PathBuf::from("dist/main.html"));
        assert_eq!(config.index_path(), PathBuf::from("dist/main.html"));
    }

    #[test]
    fn env_defaults() {
        assert_eq!(host_or_default(None), "127.0.0.1");
        assert_eq!(host_or_default(Some("0.0.0.0".into())), "0.0.0.0");
        assert_eq!(port_or_default(Some("9001".into())), 9001);
        assert_eq!(port_or_default(Some("nope".into())), 8000);
        assert_eq!(ssl_or_default(Some("true".into())), TlsSetting::Toggle(true));
        assert_eq!(ssl_or_default(Some("0".into())), TlsSetting::Toggle(false));
        assert_eq!(ssl_or_default(None), TlsSetting::Toggle(false));
    }

    #[test]
    fn tls_setting_shapes() {
        #[derive(Deserialize)]
        struct Wrap {
            ssl: TlsSetting,
        }

        let w: Wrap = toml::from_str("ssl = true").unwrap();
        assert_eq!(w.ssl, TlsSetting::Toggle(true));
        // Relative, so they follow the working directory.
        assert_eq!(
            w.ssl.files(),
            Some((Path::new("ssl/server.crt"), Path::new("ssl/server.key")))
        );

        let w: Wrap =
            toml::from_str("ssl = { cert_path = \"c.pem\", key_path = \"k.pem\" }").unwrap();
        assert_eq!(
            w.ssl.files(),
            Some((Path::new("c.pem"), Path::new("k.pem")))
        );

        let w: Wrap = toml::from_str("ssl = { cert = \"C\", key = \"K\" }").unwrap();
        assert!(w.ssl.is_enabled());
        assert!(w.ssl.files().is_none());
    }
}
