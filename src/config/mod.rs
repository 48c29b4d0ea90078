//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)            environment (HOST, PORT, SSL)
//!     → loader.rs (parse & deserialize, env fills unset listener fields)
//!     → CLI overrides (main.rs)
//!     → validation.rs (semantic checks)
//!     → ServerConfig (validated, immutable)
//!     → shared via Arc to all subsystems
//! ```
//!
//! # Design Decisions
//! - Config is immutable once the server is built
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{
    CompilerMapping, ListenerConfig, ObservabilityConfig, PushConfig, ServerConfig, SiteConfig,
    TlsSetting,
};
pub use validation::{validate_config, ValidationError};
