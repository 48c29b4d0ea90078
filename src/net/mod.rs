//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! [listener] ssl setting
//!     → tls.rs (boolean → ./ssl/ files, paths, or inline PEM)
//!     → RustlsConfig handed to axum-server
//!     → TLS handshake handled by the server runtime
//! ```
//!
//! # Design Decisions
//! - TLS is optional and handled transparently
//! - Missing or unreadable material is fatal at startup

pub mod tls;

pub use tls::{load_tls_config, TlsError};
