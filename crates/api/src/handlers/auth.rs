//! Handlers for the `/auth` resource (login, register, me, logout).

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};
use whaileys_core::activity::{action_types, entity_types};
use whaileys_core::credentials::{
    default_display_name, normalize_email, validate_email, validate_login_password,
    validate_password_strength,
};
use whaileys_core::error::CoreError;
use whaileys_core::roles::ROLE_USER;
use whaileys_core::types::DbId;
use whaileys_db::models::user::{CreateUser, PublicUser, User};
use whaileys_db::repositories::{user_repo, UserRepo};

use crate::activity::{ActivityEntry, RequestOrigin};
use crate::auth::cookie::{clear_session_cookie, session_cookie};
use crate::auth::jwt::generate_token;
use crate::auth::password::{hash_password, verify_password};
use crate::error::{AppError, AppResult, DUPLICATE_EMAIL_MSG};
use crate::gate::RequestContext;
use crate::response::SuccessResponse;
use crate::state::AppState;

const USER_NOT_FOUND: &str = "Usuário não encontrado";
const NO_PASSWORD: &str = "Usuário sem senha configurada";
const WRONG_PASSWORD: &str = "Senha incorreta";
const CREATE_USER_FAILED: &str = "Erro ao criar usuário";

/// `login_method` stored for email + password accounts.
pub const LOCAL_LOGIN_METHOD: &str = "local";

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Request body for `POST /auth/register`.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: Option<String>,
}

/// Successful authentication response returned by login and register.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub success: bool,
    pub user: PublicUser,
    /// Same token as the session cookie, for non-browser clients.
    pub token: String,
}

/// Body of `GET /auth/me` when a caller is present.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum CurrentUser {
    Stored(PublicUser),
    /// No store configured: what the token says.
    Token {
        id: DbId,
        role: String,
        email: Option<String>,
    },
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/auth/login
///
/// Authenticate with email + password. Sets the session cookie.
pub async fn login(
    State(state): State<AppState>,
    ctx: RequestContext,
    jar: CookieJar,
    Json(input): Json<LoginRequest>,
) -> AppResult<(CookieJar, Json<AuthResponse>)> {
    let email = normalize_email(&input.email);
    validate_email(&email)?;
    validate_login_password(&input.password)?;

    let Some(pool) = &state.pool else {
        tracing::warn!("Login attempted without a database");
        return Err(CoreError::Unauthorized(USER_NOT_FOUND.into()).into());
    };

    let user = UserRepo::find_by_email(pool, &email)
        .await?
        .ok_or_else(|| CoreError::Unauthorized(USER_NOT_FOUND.into()))?;

    let hash = user
        .password_hash
        .as_deref()
        .ok_or_else(|| CoreError::Unauthorized(NO_PASSWORD.into()))?;

    let valid = verify_password(&input.password, hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    if !valid {
        tracing::info!(user_id = user.id, "Login rejected: wrong password");
        return Err(CoreError::Unauthorized(WRONG_PASSWORD.into()).into());
    }

    UserRepo::record_successful_login(pool, user.id).await?;

    let (jar, response) = start_session(&state, jar, user, &ctx.origin).await?;
    Ok((jar, Json(response)))
}

/// POST /api/auth/register
///
/// Create a local `user` account and sign it in.
pub async fn register(
    State(state): State<AppState>,
    ctx: RequestContext,
    jar: CookieJar,
    Json(input): Json<RegisterRequest>,
) -> AppResult<(StatusCode, CookieJar, Json<AuthResponse>)> {
    let email = normalize_email(&input.email);
    validate_email(&email)?;
    validate_password_strength(&input.password)?;

    let Some(pool) = &state.pool else {
        tracing::warn!("Registration attempted without a database");
        return Err(CoreError::Internal(CREATE_USER_FAILED.into()).into());
    };

    if UserRepo::find_by_email(pool, &email).await?.is_some() {
        return Err(CoreError::Conflict(DUPLICATE_EMAIL_MSG.into()).into());
    }

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let name = input
        .name
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| default_display_name(&email));

    let create = CreateUser {
        open_id: format!("local_{}", uuid::Uuid::new_v4().simple()),
        name: Some(name),
        email: Some(email),
        password_hash: Some(password_hash),
        login_method: Some(LOCAL_LOGIN_METHOD.to_string()),
        role: ROLE_USER.to_string(),
    };

    let user = match UserRepo::create(pool, &create).await {
        Ok(user) => user,
        // Lost a race with a concurrent registration.
        Err(e) if user_repo::is_duplicate_email(&e) => {
            return Err(CoreError::Conflict(DUPLICATE_EMAIL_MSG.into()).into());
        }
        Err(e) => return Err(e.into()),
    };
    tracing::info!(user_id = user.id, "User registered");

    let (jar, response) = start_session(&state, jar, user, &ctx.origin).await?;
    Ok((StatusCode::CREATED, jar, Json(response)))
}

/// GET /api/auth/me
///
/// The current caller, or `null`.
pub async fn me(
    State(state): State<AppState>,
    ctx: RequestContext,
) -> AppResult<Json<Option<CurrentUser>>> {
    let Some(caller) = ctx.caller else {
        return Ok(Json(None));
    };

    let current = match &state.pool {
        Some(pool) => UserRepo::find_by_id(pool, caller.user_id)
            .await?
            .map(|user| CurrentUser::Stored(user.into())),
        None => Some(CurrentUser::Token {
            id: caller.user_id,
            role: caller.role,
            email: caller.email,
        }),
    };

    Ok(Json(current))
}

/// POST /api/auth/logout
///
/// Clear the session cookie. Always succeeds.
pub async fn logout(
    State(state): State<AppState>,
    ctx: RequestContext,
    jar: CookieJar,
) -> (CookieJar, Json<SuccessResponse>) {
    if let Some(caller) = &ctx.caller {
        state
            .activity
            .record(
                ActivityEntry::new(caller.user_id, action_types::LOGOUT, &ctx.origin)
                    .on_entity(entity_types::USER, caller.user_id.to_string()),
            )
            .await;
        tracing::info!(user_id = caller.user_id, "User logged out");
    }

    let jar = clear_session_cookie(jar, state.config.cookie_secure);
    (jar, Json(SuccessResponse::ok()))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Issue a token, set the cookie and record the login.
async fn start_session(
    state: &AppState,
    jar: CookieJar,
    user: User,
    origin: &RequestOrigin,
) -> AppResult<(CookieJar, AuthResponse)> {
    let token = generate_token(user.id, &user.role, user.email.as_deref(), &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    state
        .activity
        .record(
            ActivityEntry::new(user.id, action_types::LOGIN, origin)
                .on_entity(entity_types::USER, user.id.to_string()),
        )
        .await;
    tracing::debug!(user_id = user.id, "Session started");

    let jar = jar.add(session_cookie(token.clone(), state.config.cookie_secure));
    Ok((
        jar,
        AuthResponse {
            success: true,
            user: user.into(),
            token,
        },
    ))
}
