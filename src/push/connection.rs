//! Push client identity and lifetime tracking.
//!
//! # Responsibilities
//! - Generate unique client IDs for tracing
//! - Count connected push clients
//! - Release the slot when a client goes away, even on panic

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

/// Global atomic counter for client IDs.
/// Relaxed ordering is enough, only uniqueness matters.
static CLIENT_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for a push client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClientId(u64);

impl ClientId {
    /// Generate a new unique client ID.
    pub fn next() -> Self {
        Self(CLIENT_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for ClientId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "push-{}", self.0)
    }
}

/// Counts connected clients.
#[derive(Debug, Clone, Default)]
pub struct ClientTracker {
    connected: Arc<AtomicUsize>,
}

impl ClientTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new client. The returned guard releases it on drop.
    pub fn track(&self) -> ClientGuard {
        self.connected.fetch_add(1, Ordering::SeqCst);
        let id = ClientId::next();
        tracing::debug!(client_id = %id, "Push client connected");
        ClientGuard {
            connected: Arc::clone(&self.connected),
            id,
        }
    }

    pub fn connected(&self) -> usize {
        self.connected.load(Ordering::SeqCst)
    }
}

/// Held for as long as a client is connected.
#[derive(Debug)]
pub struct ClientGuard {
    connected: Arc<AtomicUsize>,
    id: ClientId,
}

impl ClientGuard {
    pub fn id(&self) -> ClientId {
        self.id
    }
}

impl Drop for ClientGuard {
    fn drop(&mut self) {
        self.connected.fetch_sub(1, Ordering::SeqCst);
        tracing::debug!(client_id = %self.id, "Push client disconnected");
    }
}
