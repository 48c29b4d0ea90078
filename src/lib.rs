//! Single-page-application development server library.

pub mod compile;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod push;
pub mod routing;

pub use compile::{CompileContext, CompileError, CompiledAsset, Compiler};
pub use config::schema::ServerConfig;
pub use http::DevServer;
pub use lifecycle::{ServerExtension, Shutdown};
pub use push::PushChannel;
