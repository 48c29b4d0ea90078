//! Push channel hub.
//!
//! Fans server-side messages out to every connected WebSocket client and
//! republishes what clients send as [`PushEvent`]s. The payload is opaque
//! text; its format belongs to whoever broadcasts.

use tokio::sync::broadcast;

use crate::push::connection::{ClientGuard, ClientId, ClientTracker};

/// A text frame received from a push client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushEvent {
    pub client: ClientId,
    pub message: String,
}

/// Handle to the push channel. Cheap to clone; all clones share the hub.
#[derive(Debug, Clone)]
pub struct PushChannel {
    outbound: broadcast::Sender<String>,
    inbound: broadcast::Sender<PushEvent>,
    clients: ClientTracker,
}

impl PushChannel {
    /// Create a channel buffering `capacity` messages per receiver.
    pub fn new(capacity: usize) -> Self {
        let (outbound, _) = broadcast::channel(capacity);
        let (inbound, _) = broadcast::channel(capacity);
        Self {
            outbound,
            inbound,
            clients: ClientTracker::new(),
        }
    }

    /// Send a message to every connected client.
    ///
    /// Returns how many clients it was queued for; zero when nobody listens.
    pub fn broadcast(&self, message: impl Into<String>) -> usize {
        match self.outbound.send(message.into()) {
            Ok(receivers) => {
                tracing::trace!(receivers, "Broadcast push message");
                receivers
            }
            Err(_) => 0,
        }
    }

    /// Stream of messages sent by clients.
    pub fn subscribe_inbound(&self) -> broadcast::Receiver<PushEvent> {
        self.inbound.subscribe()
    }

    /// Number of connected clients.
    pub fn client_count(&self) -> usize {
        self.clients.connected()
    }

    /// Register a client connection and its outbound feed.
    pub(crate) fn connect(&self) -> (ClientGuard, broadcast::Receiver<String>) {
        // Subscribe before counting so a counted client never misses a message.
        let feed = self.outbound.subscribe();
        (self.clients.track(), feed)
    }

    pub(crate) fn publish_inbound(&self, client: ClientId, message: String) {
        // No subscribers is fine, the message is simply dropped.
        let _ = self.inbound.send(PushEvent { client, message });
    }
}
