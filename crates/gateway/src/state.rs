use std::sync::Arc;

use sl_domain::config::Config;
use sl_providers::RunnerSource;
use sl_sessions::SessionStore;

use crate::runtime::session_lock::SessionLockMap;

/// Shared application state passed to all API handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub sessions: Arc<SessionStore>,
    /// One lock per session; runs and mutations serialise through it.
    pub session_locks: Arc<SessionLockMap>,
    /// Where runs get their agent runtime from.
    pub runners: Arc<dyn RunnerSource>,
}
