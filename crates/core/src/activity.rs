//! Activity log vocabulary and helpers.
//!
//! This module lives in `core` (zero internal deps) so that the repository
//! layer, the command handlers and the listing endpoint agree on tags and
//! limits.

// ---------------------------------------------------------------------------
// Action tags
// ---------------------------------------------------------------------------

/// Known action tags for activity log entries.
pub mod action_types {
    pub const CREATE_SESSION: &str = "create_session";
    pub const DELETE_SESSION: &str = "delete_session";
    pub const LOGIN: &str = "login";
    pub const LOGOUT: &str = "logout";
}

/// Known entity types referenced by activity log entries.
pub mod entity_types {
    pub const SESSION: &str = "session";
    pub const USER: &str = "user";
}

// ---------------------------------------------------------------------------
// Listing limits
// ---------------------------------------------------------------------------

/// Number of entries returned when the caller does not ask for a limit.
pub const DEFAULT_LIST_LIMIT: i64 = 100;

/// Hard upper bound for a single listing call.
pub const MAX_LIST_LIMIT: i64 = 500;

/// Resolve the effective page size for an activity listing.
///
/// `None` falls back to [`DEFAULT_LIST_LIMIT`]; anything else is clamped to
/// `1..=MAX_LIST_LIMIT`.
pub fn clamp_limit(requested: Option<i64>) -> i64 {
    requested
        .unwrap_or(DEFAULT_LIST_LIMIT)
        .clamp(1, MAX_LIST_LIMIT)
}

// ---------------------------------------------------------------------------
// Sensitive field redaction
// ---------------------------------------------------------------------------

/// Keys whose values must never reach the `details` column.
pub const SENSITIVE_FIELDS: &[&str] = &[
    "password",
    "token",
    "secret",
    "authorization",
    "cookie",
];

/// Redact sensitive fields from a JSON value.
///
/// Replaces the value of any object key containing one of
/// [`SENSITIVE_FIELDS`] (case-insensitive) with `"[REDACTED]"`, recursing
/// into nested objects and arrays.
pub fn redact_sensitive_fields(value: &serde_json::Value) -> serde_json::Value {
    match value {
        serde_json::Value::Object(map) => {
            let mut redacted = serde_json::Map::new();
            for (key, val) in map {
                let lower_key = key.to_lowercase();
                if SENSITIVE_FIELDS.iter().any(|f| lower_key.contains(f)) {
                    redacted.insert(
                        key.clone(),
                        serde_json::Value::String("[REDACTED]".to_string()),
                    );
                } else {
                    redacted.insert(key.clone(), redact_sensitive_fields(val));
                }
            }
            serde_json::Value::Object(redacted)
        }
        serde_json::Value::Array(arr) => {
            serde_json::Value::Array(arr.iter().map(redact_sensitive_fields).collect())
        }
        other => other.clone(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
