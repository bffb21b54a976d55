use std::sync::Arc;

use whaileys_client::SessionApi;

use crate::activity::ActivitySink;
use crate::commands::SessionCommands;
use crate::config::ServerConfig;
use crate::ws::Relay;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: everything is behind `Arc` or already `Clone`.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool. `None` when `DATABASE_URL` is unset; every
    /// store-dependent path degrades instead of failing.
    pub pool: Option<whaileys_db::DbPool>,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Live connection relay (browser clients).
    pub relay: Arc<Relay>,
    /// External session API.
    pub session_api: Arc<dyn SessionApi>,
    /// Where activity entries go.
    pub activity: Arc<dyn ActivitySink>,
}

impl AppState {
    /// Session command handlers wired to this state's collaborators.
    pub fn session_commands(&self) -> SessionCommands {
        SessionCommands::new(
            Arc::clone(&self.session_api),
            Arc::clone(&self.activity),
            Arc::clone(&self.relay),
        )
    }
}
