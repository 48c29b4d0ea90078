//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP/TLS connection
//!     → server.rs (Axum setup, middleware, route mounting)
//!     → request.rs (request ID generation and propagation)
//!     → /favicon.ico, push path, extension routes
//!     → fallback: routing::PathResolver (compilers → mappings → index)
//!     → response.rs (content type, status)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;
pub mod websocket;

pub use request::X_REQUEST_ID;
pub use server::{AppState, DevServer, DevServerBuilder};
