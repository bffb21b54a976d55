//! Startup admin account.
//!
//! When `SEED_ADMIN_EMAIL` and `SEED_ADMIN_PASSWORD` are both set, the server
//! makes sure an `admin` user with that email exists before it starts
//! serving. An existing account is left untouched.

use whaileys_core::credentials::{
    default_display_name, normalize_email, validate_email, validate_password_strength,
};
use whaileys_core::roles::ROLE_ADMIN;
use whaileys_core::types::DbId;
use whaileys_db::models::user::CreateUser;
use whaileys_db::repositories::{user_repo, UserRepo};
use whaileys_db::DbPool;

use crate::auth::password::hash_password;
use crate::error::{AppError, AppResult};
use crate::handlers::auth::LOCAL_LOGIN_METHOD;

/// Credentials for the startup admin.
#[derive(Debug, Clone)]
pub struct AdminSeed {
    pub email: String,
    pub password: String,
    pub name: Option<String>,
}

impl AdminSeed {
    /// Read `SEED_ADMIN_EMAIL`, `SEED_ADMIN_PASSWORD` and optional
    /// `SEED_ADMIN_NAME`. Returns `None` unless both credentials are set.
    pub fn from_env() -> Option<Self> {
        let email = std::env::var("SEED_ADMIN_EMAIL").ok()?;
        let password = std::env::var("SEED_ADMIN_PASSWORD").ok()?;
        if email.trim().is_empty() || password.is_empty() {
            return None;
        }
        Some(Self {
            email,
            password,
            name: std::env::var("SEED_ADMIN_NAME").ok(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    Created(DbId),
    AlreadyExists,
}

/// Create the admin described by `seed` unless the email is taken.
pub async fn seed_admin(pool: &DbPool, seed: &AdminSeed) -> AppResult<SeedOutcome> {
    let email = normalize_email(&seed.email);
    validate_email(&email)?;
    validate_password_strength(&seed.password)?;

    if UserRepo::find_by_email(pool, &email).await?.is_some() {
        tracing::info!(email = %email, "Seed admin already exists");
        return Ok(SeedOutcome::AlreadyExists);
    }

    let password_hash = hash_password(&seed.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let create = CreateUser {
        open_id: format!("local_{}", uuid::Uuid::new_v4().simple()),
        name: Some(
            seed.name
                .clone()
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| default_display_name(&email)),
        ),
        email: Some(email.clone()),
        password_hash: Some(password_hash),
        login_method: Some(LOCAL_LOGIN_METHOD.to_string()),
        role: ROLE_ADMIN.to_string(),
    };

    match UserRepo::create(pool, &create).await {
        Ok(user) => {
            tracing::info!(user_id = user.id, email = %email, "Seed admin created");
            Ok(SeedOutcome::Created(user.id))
        }
        Err(e) if user_repo::is_duplicate_email(&e) => {
            tracing::info!(email = %email, "Seed admin already exists");
            Ok(SeedOutcome::AlreadyExists)
        }
        Err(e) => Err(e.into()),
    }
}
