//! Startup orchestration.
//!
//! # Responsibilities
//! - Validate configuration
//! - Initialize subsystems in dependency order (routes, compilers, TLS, push)
//! - Run extension hooks
//! - Bind the listener and begin accepting traffic
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Subsystems initialize in order, not concurrently
//! - Listener starts last (traffic only when ready)

use axum_server::Handle;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

use crate::compile::CompilerTableError;
use crate::config::{ConfigError, ServerConfig};
use crate::http::DevServer;
use crate::lifecycle::hooks::ServerExtension;
use crate::lifecycle::shutdown::Shutdown;
use crate::net::TlsError;

/// Anything that stops the server from coming up.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to map base directory {path:?}: {source}")]
    Routes {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Compilers(#[from] CompilerTableError),

    #[error(transparent)]
    Tls(#[from] TlsError),

    #[error("failed to start file watcher: {0}")]
    Watch(#[from] notify::Error),

    #[error("failed to resolve bind address {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[source] io::Error),
}

/// Build the server from `config` and serve until `shutdown` fires.
pub async fn run(
    config: ServerConfig,
    extensions: Vec<Arc<dyn ServerExtension>>,
    shutdown: &Shutdown,
) -> Result<(), StartupError> {
    // Subscribe first so a signal during startup is not missed.
    let stop = shutdown.subscribe();

    tracing::info!(
        base_dir = %config.site.base_dir.display(),
        root = %config.site.root,
        push_state = config.site.push_state,
        "Starting dev server"
    );

    let server = DevServer::builder(config)
        .extensions(extensions)
        .build()
        .await?;

    tracing::info!(
        mappings = server.resolver().routes().len(),
        "Route table ready"
    );

    server.run(Handle::new(), stop).await
}
