//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument.

pub mod activity_log_repo;
pub mod api_config_repo;
pub mod user_repo;

pub use activity_log_repo::ActivityLogRepo;
pub use api_config_repo::ApiConfigRepo;
pub use user_repo::UserRepo;
