//! Authorization gate.
//!
//! Every HTTP procedure is an [`Operation`] with a fixed [`Access`] level.
//! Handlers resolve the caller through the [`RequestContext`] extractor and
//! call [`RequestContext::require`] before touching any collaborator, so an
//! unauthenticated request never reaches the external API, the activity log
//! or the relay.

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use axum_extra::extract::cookie::CookieJar;
use whaileys_core::error::CoreError;
use whaileys_core::roles;
use whaileys_core::types::DbId;

use crate::activity::RequestOrigin;
use crate::auth::cookie::session_token;
use crate::auth::jwt::{validate_token, JwtConfig};
use crate::state::AppState;

/// Message returned when a protected operation has no identity.
pub const UNAUTHENTICATED_MSG: &str = "Faça login para continuar";

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Public,
    Protected,
}

/// Every procedure the server exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    AuthLogin,
    AuthRegister,
    AuthMe,
    AuthLogout,
    SessionsList,
    SessionsGet,
    SessionsCreate,
    SessionsDelete,
    SessionsQrCode,
    SessionsHealth,
    ActivityLogsList,
    LiveChannel,
}

impl Operation {
    pub const ALL: [Operation; 12] = [
        Operation::AuthLogin,
        Operation::AuthRegister,
        Operation::AuthMe,
        Operation::AuthLogout,
        Operation::SessionsList,
        Operation::SessionsGet,
        Operation::SessionsCreate,
        Operation::SessionsDelete,
        Operation::SessionsQrCode,
        Operation::SessionsHealth,
        Operation::ActivityLogsList,
        Operation::LiveChannel,
    ];

    /// Dotted procedure name used in logs.
    pub fn name(self) -> &'static str {
        match self {
            Operation::AuthLogin => "auth.login",
            Operation::AuthRegister => "auth.register",
            Operation::AuthMe => "auth.me",
            Operation::AuthLogout => "auth.logout",
            Operation::SessionsList => "sessions.list",
            Operation::SessionsGet => "sessions.get",
            Operation::SessionsCreate => "sessions.create",
            Operation::SessionsDelete => "sessions.delete",
            Operation::SessionsQrCode => "sessions.getQrCode",
            Operation::SessionsHealth => "sessions.health",
            Operation::ActivityLogsList => "activityLogs.list",
            Operation::LiveChannel => "live",
        }
    }

    pub fn access(self) -> Access {
        match self {
            Operation::AuthLogin
            | Operation::AuthRegister
            | Operation::AuthMe
            | Operation::AuthLogout
            | Operation::SessionsHealth
            | Operation::LiveChannel => Access::Public,
            Operation::SessionsList
            | Operation::SessionsGet
            | Operation::SessionsCreate
            | Operation::SessionsDelete
            | Operation::SessionsQrCode
            | Operation::ActivityLogsList => Access::Protected,
        }
    }
}

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// The authenticated principal behind a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub user_id: DbId,
    pub role: String,
    pub email: Option<String>,
}

impl Caller {
    pub fn is_admin(&self) -> bool {
        roles::is_admin(&self.role)
    }
}

/// Check `caller` against the access level of `op`.
pub fn authorize(op: Operation, caller: Option<&Caller>) -> Result<(), CoreError> {
    match (op.access(), caller) {
        (Access::Public, _) | (Access::Protected, Some(_)) => Ok(()),
        (Access::Protected, None) => {
            tracing::debug!(operation = op.name(), "Rejected unauthenticated call");
            Err(CoreError::Unauthorized(UNAUTHENTICATED_MSG.into()))
        }
    }
}

/// Row-level rule for `activityLogs.list`: non-admins only ever see their
/// own entries, whatever they asked for.
pub fn scope_activity_filter(caller: &Caller, requested_user: Option<DbId>) -> Option<DbId> {
    if caller.is_admin() {
        requested_user
    } else {
        Some(caller.user_id)
    }
}

/// Resolve the caller from the session cookie, then the Bearer header.
///
/// Missing or invalid tokens yield `None`; rejecting is the gate's job.
pub fn resolve_caller(headers: &HeaderMap, jwt: &JwtConfig) -> Option<Caller> {
    let jar = CookieJar::from_headers(headers);
    let bearer = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim);

    let caller = [session_token(&jar), bearer]
        .into_iter()
        .flatten()
        .find_map(|token| match validate_token(token, jwt) {
            Ok(claims) => Some(Caller {
                user_id: claims.sub,
                role: claims.role,
                email: claims.email,
            }),
            Err(e) => {
                tracing::debug!(error = %e, "Ignoring invalid session token");
                None
            }
        });
    caller
}

// ---------------------------------------------------------------------------
// Extractor
// ---------------------------------------------------------------------------

/// Per-request identity and origin. Never rejects.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub caller: Option<Caller>,
    pub origin: RequestOrigin,
}

impl RequestContext {
    /// Authorize `op` and return the caller it will act as.
    ///
    /// Only meaningful for protected operations; public handlers read
    /// [`RequestContext::caller`] directly.
    pub fn require(&self, op: Operation) -> Result<&Caller, CoreError> {
        authorize(op, self.caller.as_ref())?;
        self.caller
            .as_ref()
            .ok_or_else(|| CoreError::Unauthorized(UNAUTHENTICATED_MSG.into()))
    }
}

impl FromRequestParts<AppState> for RequestContext {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(RequestContext {
            caller: resolve_caller(&parts.headers, &state.config.jwt),
            origin: RequestOrigin::from_headers(&parts.headers),
        })
    }
}
