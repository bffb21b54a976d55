//! Authentication primitives.
//!
//! - [`password`] -- Argon2id password hashing and verification.
//! - [`jwt`] -- HS256 session tokens carried in the session cookie or a
//!   Bearer header.
//! - [`cookie`] -- the `app_session_id` cookie.

pub mod cookie;
pub mod jwt;
pub mod password;
