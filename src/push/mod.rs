//! Push channel subsystem.
//!
//! # Data Flow
//! ```text
//! Server side (extensions, watcher.rs)
//!     → channel.rs broadcast
//!     → one receiver per WebSocket client (http/websocket.rs)
//!     → text frames to the browser
//!
//! Browser text frames
//!     → http/websocket.rs
//!     → channel.rs inbound events
//!     → extension subscribers
//! ```
//!
//! # Design Decisions
//! - Payloads are opaque text, owned by the caller
//! - Slow clients lag and skip messages instead of blocking the sender
//! - Client lifetime tracked by a drop guard (connection.rs)

pub mod channel;
pub mod connection;
pub mod watcher;

pub use channel::{PushChannel, PushEvent};
pub use connection::ClientId;
pub use watcher::ChangeNotifier;
