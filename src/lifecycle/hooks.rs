//! Extension points invoked while the server is assembled.

use axum::Router;

use crate::config::ServerConfig;
use crate::push::PushChannel;

/// Hooks run once at startup, before the listener accepts connections.
///
/// Routes added in [`ServerExtension::web_init`] take precedence over file
/// resolution, which is mounted as the router fallback. Replacing the
/// fallback disables file resolution altogether.
pub trait ServerExtension: Send + Sync {
    /// Add routes or layers to the HTTP router.
    fn web_init(&self, router: Router, _config: &ServerConfig) -> Router {
        router
    }

    /// Grab the push channel, e.g. to spawn a task that broadcasts to it or
    /// consumes [`PushChannel::subscribe_inbound`].
    fn push_init(&self, _channel: &PushChannel, _config: &ServerConfig) {}
}
