//! Well-known role name constants.
//!
//! These must match the `ck_users_role` constraint in `20260301000001_create_users.sql`.

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_USER: &str = "user";

/// Returns `true` when `role` carries unrestricted visibility.
pub fn is_admin(role: &str) -> bool {
    role == ROLE_ADMIN
}

/// Returns `true` if `role` is one of the roles the `users` table accepts.
pub fn is_known(role: &str) -> bool {
    matches!(role, ROLE_ADMIN | ROLE_USER)
}
