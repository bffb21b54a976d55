//! Row models and DTOs, one module per table.

pub mod activity_log;
pub mod api_config;
pub mod user;
