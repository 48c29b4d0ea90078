//! File change notifier for live reload.

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::push::channel::PushChannel;

/// Watches the served tree and broadcasts changes on the push channel.
///
/// Every create, modify or remove event becomes one message:
/// `{"type":"change","paths":["app/main.js"]}` with paths relative to the
/// watched directory. Hidden paths and paths under an excluded top-level
/// directory are not reported.
pub struct ChangeNotifier {
    path: PathBuf,
    channel: PushChannel,
    poll_interval: Duration,
    exclude: HashSet<String>,
}

impl ChangeNotifier {
    pub fn new(path: &Path, channel: PushChannel, poll_interval: Duration) -> Self {
        Self {
            path: path.to_path_buf(),
            channel,
            poll_interval,
            exclude: HashSet::new(),
        }
    }

    /// Skip changes under these top-level directory names.
    pub fn exclude<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude.extend(names.into_iter().map(Into::into));
        self
    }

    /// Start watching. The watcher stops when the returned handle is dropped.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let channel = self.channel.clone();
        // Event paths are reported under the watched path; watching the
        // canonical form keeps them strippable.
        let watched = std::fs::canonicalize(&self.path).unwrap_or_else(|_| self.path.clone());
        let root = watched.clone();
        let exclude = self.exclude;

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if let Some(message) = change_message(&root, &exclude, &event) {
                        let receivers = channel.broadcast(message);
                        tracing::debug!(paths = ?event.paths, receivers, "File change broadcast");
                    }
                }
                Err(e) => tracing::error!("Watch error: {:?}", e),
            },
            Config::default().with_poll_interval(self.poll_interval),
        )?;

        watcher.watch(&watched, RecursiveMode::Recursive)?;

        tracing::info!(path = %watched.display(), "File watcher started");
        Ok(watcher)
    }
}

/// Notification text for an event, `None` for events clients don't care about.
fn change_message(root: &Path, exclude: &HashSet<String>, event: &Event) -> Option<String> {
    if !(event.kind.is_create() || event.kind.is_modify() || event.kind.is_remove()) {
        return None;
    }

    let paths: Vec<String> = event
        .paths
        .iter()
        .map(|p| {
            p.strip_prefix(root)
                .unwrap_or(p)
                .to_string_lossy()
                .replace('\\', "/")
        })
        .filter(|p| !p.split('/').any(|segment| segment.starts_with('.')))
        .filter(|p| {
            p.split('/')
                .next()
                .map_or(true, |first| !exclude.contains(first))
        })
        .collect();

    if paths.is_empty() {
        return None;
    }

    Some(serde_json::json!({ "type": "change", "paths": paths }).to_string())
}
