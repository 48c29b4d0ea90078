//! Shared utilities for integration tests.

#![allow(dead_code)]

use axum_server::Handle;
use spa_dev_server::config::{ServerConfig, TlsSetting};
use spa_dev_server::http::DevServerBuilder;
use spa_dev_server::lifecycle::Shutdown;
use spa_dev_server::{DevServer, PushChannel};
use std::fs;
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;

pub const INDEX: &str = "<!doctype html><title>spa</title>";

/// A throwaway site tree on disk.
pub struct Site {
    pub dir: TempDir,
}

impl Site {
    /// `index.html` plus whatever files are given, parents created.
    pub fn new(files: &[(&str, &str)]) -> Self {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("index.html"), INDEX).unwrap();
        let site = Self { dir };
        for (path, content) in files {
            site.write(path, content);
        }
        site
    }

    pub fn write(&self, path: &str, content: &str) {
        let full = self.dir.path().join(path);
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(full, content).unwrap();
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Plain HTTP on an ephemeral local port.
    pub fn config(&self) -> ServerConfig {
        let mut config = ServerConfig::default();
        config.site.base_dir = self.path().to_path_buf();
        config.listener.host = "127.0.0.1".into();
        config.listener.port = 0;
        config.listener.ssl = TlsSetting::Toggle(false);
        config
    }
}

/// A server running in the background.
pub struct Running {
    pub addr: SocketAddr,
    pub push: PushChannel,
    pub shutdown: Shutdown,
    pub task: tokio::task::JoinHandle<()>,
}

impl Running {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn ws_url(&self, path: &str) -> String {
        format!("ws://{}{}", self.addr, path)
    }

    /// Trigger shutdown and wait for the server task to finish.
    pub async fn stop(self) {
        self.shutdown.trigger();
        tokio::time::timeout(Duration::from_secs(5), self.task)
            .await
            .expect("server did not stop")
            .unwrap();
    }
}

pub async fn start(config: ServerConfig) -> Running {
    start_with(DevServer::builder(config)).await
}

pub async fn start_with(builder: DevServerBuilder) -> Running {
    let server = builder.build().await.expect("server builds");
    let push = server.push_channel();
    let shutdown = Shutdown::new();
    let handle = Handle::new();

    let rx = shutdown.subscribe();
    let serving = handle.clone();
    let task = tokio::spawn(async move {
        server.run(serving, rx).await.expect("server runs");
    });

    let addr = tokio::time::timeout(Duration::from_secs(5), handle.listening())
        .await
        .expect("server did not bind")
        .expect("server failed to bind");

    Running {
        addr,
        push,
        shutdown,
        task,
    }
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}
