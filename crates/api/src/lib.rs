//! Whaileys dashboard API server library.
//!
//! Exposes the building blocks (config, state, error handling, gate,
//! command handlers, routes, realtime relay) so integration tests and the
//! binary entrypoint share them.

pub mod activity;
pub mod auth;
pub mod background;
pub mod commands;
pub mod config;
pub mod error;
pub mod gate;
pub mod handlers;
pub mod response;
pub mod router;
pub mod routes;
pub mod seed;
pub mod state;
pub mod ws;
