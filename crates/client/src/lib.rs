//! Client for the external Whaileys session API.
//!
//! The external service owns WhatsApp session state; this crate only
//! translates its `{success, data, error}` envelopes into typed records.
//!
//! - [`SessionApi`] -- the seam the command handlers depend on.
//! - [`WhaileysApi`] -- the `reqwest` implementation.

pub mod api;
pub mod types;

pub use api::{SessionApi, WhaileysApi, WhaileysApiError, WhaileysConfig, DEFAULT_API_URL};
pub use types::{ApiEnvelope, QrCodePayload, SessionRecord};
