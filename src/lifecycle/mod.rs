//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Validate config → Route table → Compilers → TLS → Push channel
//!     → Extension hooks (hooks.rs) → Start listener
//!
//! Shutdown (shutdown.rs):
//!     Signal received → Stop accepting → Drain connections → Exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, then core, then listener
//! - Ordered shutdown: stop accept, drain, close
//! - Shutdown has a grace period: connections are cut after it

pub mod hooks;
pub mod shutdown;
pub mod signals;
pub mod startup;

pub use hooks::ServerExtension;
pub use shutdown::Shutdown;
pub use startup::{run, StartupError};
