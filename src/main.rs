//! Single-page-application development server.
//!
//! # Architecture Overview
//!
//! ```text
//!                      ┌──────────────────────────────────────────────────┐
//!                      │                 SPA DEV SERVER                   │
//!                      │                                                  │
//!   Browser request    │  ┌─────────┐   ┌───────────┐   ┌──────────────┐  │
//!   ───────────────────┼─▶│  http   │──▶│  routing  │──▶│   compile    │  │
//!                      │  │ server  │   │ resolver  │   │ (on-read)    │  │
//!                      │  └────┬────┘   └─────┬─────┘   └──────────────┘  │
//!                      │       │              │ mappings / index.html     │
//!   Push frames        │  ┌────▼────┐         ▼                           │
//!   ◀──────────────────┼──│  push   │◀── watcher (optional)                │
//!                      │  │ channel │◀── extensions                        │
//!                      │  └─────────┘                                     │
//!                      │                                                  │
//!                      │  config · lifecycle · observability · net(tls)   │
//!                      └──────────────────────────────────────────────────┘
//! ```

use clap::Parser;
use std::path::PathBuf;

use spa_dev_server::config::{parse_config, validate_config, ConfigError, ServerConfig, TlsSetting};
use spa_dev_server::lifecycle::{self, signals::spawn_signal_listener, Shutdown};
use spa_dev_server::observability::init_logging;

#[derive(Parser, Debug)]
#[command(name = "spa-dev-server")]
#[command(about = "Development server for single-page applications", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory to serve
    #[arg(short = 'd', long)]
    base_dir: Option<PathBuf>,

    /// URL prefix the site lives under
    #[arg(long)]
    root: Option<String>,

    #[arg(long)]
    host: Option<String>,

    #[arg(short, long)]
    port: Option<u16>,

    /// Serve over TLS with ssl/server.{crt,key} from the working directory
    #[arg(long)]
    ssl: bool,

    /// Answer unmatched paths with 404 instead of the index document
    #[arg(long)]
    no_push_state: bool,

    /// Broadcast file changes on the push channel
    #[arg(short, long)]
    watch: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,
}

impl Cli {
    fn apply(self, config: &mut ServerConfig) {
        if let Some(base_dir) = self.base_dir {
            config.site.base_dir = base_dir;
        }
        if let Some(root) = self.root {
            config.site.root = root;
        }
        if let Some(host) = self.host {
            config.listener.host = host;
        }
        if let Some(port) = self.port {
            config.listener.port = port;
        }
        if self.ssl && !config.listener.ssl.is_enabled() {
            config.listener.ssl = TlsSetting::Toggle(true);
        }
        if self.no_push_state {
            config.site.push_state = false;
        }
        if self.watch {
            config.push.watch = true;
        }
        if let Some(level) = self.log_level {
            config.observability.log_level = level;
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut cli = Cli::parse();

    // Validation waits until CLI overrides are applied.
    let mut config = match cli.config.take() {
        Some(path) => parse_config(&path)?,
        None => ServerConfig::default(),
    };
    cli.apply(&mut config);

    init_logging(&config.observability.log_level);
    tracing::info!("spa-dev-server v{} starting", env!("CARGO_PKG_VERSION"));

    if let Err(errors) = validate_config(&config) {
        for error in &errors {
            tracing::error!(error = %error, "Invalid configuration");
        }
        return Err(ConfigError::Validation(errors).into());
    }

    let shutdown = Shutdown::new();
    spawn_signal_listener(&shutdown);

    lifecycle::run(config, Vec::new(), &shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
