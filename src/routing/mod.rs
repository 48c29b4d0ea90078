//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request path
//!     → resolver.rs (strip query and root, decode)
//!     → compiler table (first matching pattern, read + compile)
//!     → table.rs (most specific prefix mapping, read file)
//!     → fallback (index document or NotFound)
//!
//! Table Compilation (at startup):
//!     base_dir children + [site.map] overrides
//!     → table.rs (discover, exclude, merge)
//!     → matcher.rs (directory / file rules)
//!     → Freeze as immutable RouteTable
//! ```
//!
//! # Design Decisions
//! - Tables built at startup, immutable at runtime
//! - No regex in the prefix path (string prefix matching only)
//! - Deterministic: same input always resolves the same way
//! - Most specific prefix wins (reverse lexicographic scan)

pub mod matcher;
pub mod resolver;
pub mod table;

pub use matcher::{PrefixRule, TargetKind};
pub use resolver::{Decision, PathResolver};
pub use table::{MappedPath, Mapping, RouteTable};
