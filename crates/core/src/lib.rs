//! Domain primitives shared by every crate in the workspace.
//!
//! Nothing in here performs I/O: error taxonomy, id and timestamp aliases,
//! role names, activity tags, session status and the input validation rules
//! applied before any side effect happens.

pub mod activity;
pub mod credentials;
pub mod error;
pub mod roles;
pub mod session;
pub mod types;
