//! Realtime relay: browser WebSocket connections and topic fan-out.
//!
//! Provides the relay itself, the wire protocol, heartbeat monitoring and
//! the HTTP upgrade handler used by Axum routes.

mod handler;
mod heartbeat;
pub mod protocol;
pub mod relay;

pub use handler::ws_handler;
pub use heartbeat::start_heartbeat;
pub use relay::Relay;
