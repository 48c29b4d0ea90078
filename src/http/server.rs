//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (tracing, request ID, compression)
//! - Mount the push channel endpoint and the favicon
//! - Dispatch everything else to the path resolver
//! - Bind the listener (plain or TLS) and serve until shutdown

use axum::{
    extract::State,
    http::{Method, Uri},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use axum_server::{tls_rustls::RustlsConfig, Handle};
use notify::RecommendedWatcher;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tower_http::{compression::CompressionLayer, trace::TraceLayer};

use crate::compile::{Compiler, CompilerRegistry, CompilerTable};
use crate::config::{validate_config, ConfigError, ListenerConfig, ServerConfig};
use crate::http::request::{propagate_request_id_layer, set_request_id_layer};
use crate::http::response::file_response;
use crate::http::websocket::push_socket;
use crate::lifecycle::{ServerExtension, StartupError};
use crate::net::load_tls_config;
use crate::push::{ChangeNotifier, PushChannel};
use crate::routing::resolver::read_if_present;
use crate::routing::{PathResolver, RouteTable};

/// How long in-flight requests and push sockets get after shutdown fires.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub resolver: Arc<PathResolver>,
    pub push: PushChannel,
    pub favicon: Arc<PathBuf>,
}

/// The development server, fully assembled but not yet listening.
pub struct DevServer {
    config: Arc<ServerConfig>,
    router: Router,
    resolver: Arc<PathResolver>,
    push: PushChannel,
    tls: Option<RustlsConfig>,
    watcher: Option<RecommendedWatcher>,
}

/// Collects compilers and extensions before the server is built.
pub struct DevServerBuilder {
    config: ServerConfig,
    registry: CompilerRegistry,
    extensions: Vec<Arc<dyn ServerExtension>>,
}

impl DevServerBuilder {
    /// Register a compiler that `[[site.compilers]]` entries can name.
    pub fn compiler(mut self, name: impl Into<String>, compiler: impl Compiler + 'static) -> Self {
        self.registry.register(name, Arc::new(compiler));
        self
    }

    pub fn extension(mut self, extension: impl ServerExtension + 'static) -> Self {
        self.extensions.push(Arc::new(extension));
        self
    }

    pub fn extensions(mut self, extensions: impl IntoIterator<Item = Arc<dyn ServerExtension>>) -> Self {
        self.extensions.extend(extensions);
        self
    }

    /// Validate the config and initialize every subsystem.
    pub async fn build(self) -> Result<DevServer, StartupError> {
        let config = self.config;
        validate_config(&config).map_err(ConfigError::Validation)?;
        let site = &config.site;

        let routes = RouteTable::build(
            &site.base_dir,
            site.exclude.iter().map(String::as_str),
            &site.map,
        )
        .map_err(|source| StartupError::Routes {
            path: site.base_dir.clone(),
            source,
        })?;
        let compilers = CompilerTable::from_mappings(&site.compilers, &self.registry)?;
        let tls = load_tls_config(&config.listener.ssl).await?;

        let resolver = Arc::new(PathResolver::new(
            site.root.clone(),
            Arc::new(routes),
            Arc::new(compilers),
            config.index_path(),
            site.push_state,
        ));

        let push = PushChannel::new(config.push.buffer);
        for extension in &self.extensions {
            extension.push_init(&push, &config);
        }

        let watcher = if config.push.watch {
            let notifier = ChangeNotifier::new(
                &site.base_dir,
                push.clone(),
                Duration::from_millis(config.push.poll_interval_ms),
            )
            .exclude(site.exclude.iter().cloned());
            Some(notifier.run()?)
        } else {
            None
        };

        let state = AppState {
            resolver: Arc::clone(&resolver),
            push: push.clone(),
            favicon: Arc::new(config.favicon_path()),
        };

        let mut router = Router::new()
            .route("/favicon.ico", get(favicon_handler).fallback(serve_handler))
            .route(&config.push.path, get(push_socket).fallback(serve_handler))
            .fallback(serve_handler)
            .with_state(state);

        for extension in &self.extensions {
            router = extension.web_init(router, &config);
        }

        Ok(DevServer {
            router: Self::wrap_router(router, &config.listener),
            config: Arc::new(config),
            resolver,
            push,
            tls,
            watcher,
        })
    }

    /// Add the middleware stack around the assembled routes.
    fn wrap_router(router: Router, listener: &ListenerConfig) -> Router {
        let router = if listener.compression {
            router.layer(CompressionLayer::new())
        } else {
            router
        };

        router
            .layer(propagate_request_id_layer())
            .layer(TraceLayer::new_for_http())
            .layer(set_request_id_layer())
    }
}

impl DevServer {
    pub fn builder(config: ServerConfig) -> DevServerBuilder {
        DevServerBuilder {
            config,
            registry: CompilerRegistry::default(),
            extensions: Vec::new(),
        }
    }

    /// Build with the built-in compilers and no extensions.
    pub async fn new(config: ServerConfig) -> Result<Self, StartupError> {
        Self::builder(config).build().await
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn resolver(&self) -> &PathResolver {
        &self.resolver
    }

    pub fn push_channel(&self) -> PushChannel {
        self.push.clone()
    }

    /// The fully layered router, for driving the server without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Serve until `shutdown` fires (or its sender is dropped).
    ///
    /// `handle` reports the bound address through `Handle::listening`.
    pub async fn run(
        self,
        handle: Handle,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), StartupError> {
        let addr = bind_addr(&self.config.listener).await?;
        let protocol = self.config.protocol();
        let host = self.config.listener.host.clone();

        let listening = handle.clone();
        tokio::spawn(async move {
            if let Some(bound) = listening.listening().await {
                tracing::info!("Listening on {}://{}:{}", protocol, host, bound.port());
            }
        });

        let stopping = handle.clone();
        tokio::spawn(async move {
            let _ = shutdown.recv().await;
            tracing::info!("Shutdown signal received");
            stopping.graceful_shutdown(Some(SHUTDOWN_GRACE));
        });

        // Keeps the file watcher alive while serving.
        let _watcher = self.watcher;
        let app = self.router.into_make_service();

        let served = match self.tls {
            Some(tls) => {
                axum_server::bind_rustls(addr, tls)
                    .handle(handle)
                    .serve(app)
                    .await
            }
            None => axum_server::bind(addr).handle(handle).serve(app).await,
        };
        served.map_err(StartupError::Serve)?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

async fn bind_addr(listener: &ListenerConfig) -> Result<SocketAddr, StartupError> {
    let display = format!("{}:{}", listener.host, listener.port);
    let mut addrs = tokio::net::lookup_host((listener.host.as_str(), listener.port))
        .await
        .map_err(|source| StartupError::Bind {
            addr: display.clone(),
            source,
        })?;
    addrs.next().ok_or_else(|| StartupError::Bind {
        addr: display,
        source: std::io::Error::new(std::io::ErrorKind::AddrNotAvailable, "no address found"),
    })
}

/// Everything not claimed by a route: compilers, mappings, then fallback.
async fn serve_handler(State(state): State<AppState>, method: Method, uri: Uri) -> Response {
    let request_path = uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or_else(|| uri.path());

    if method != Method::GET && method != Method::HEAD {
        return state.resolver.fallback().await.into_response();
    }

    match state.resolver.resolve(request_path).await {
        Ok(decision) => {
            tracing::trace!(path = %request_path, decision = decision_kind(&decision), "Resolved");
            decision.into_response()
        }
        Err(e) => {
            tracing::error!(path = %request_path, error = %e, "Compile failed");
            e.into_response()
        }
    }
}

async fn favicon_handler(State(state): State<AppState>, method: Method, uri: Uri) -> Response {
    match read_if_present(&state.favicon).await {
        Some(body) => file_response(&state.favicon, body),
        None => serve_handler(State(state), method, uri).await,
    }
}

fn decision_kind(decision: &crate::routing::Decision) -> &'static str {
    use crate::routing::Decision;
    match decision {
        Decision::Compiled { .. } => "compiled",
        Decision::Static { .. } => "static",
        Decision::Fallback { .. } => "fallback",
        Decision::NotFound => "not_found",
    }
}
