//! The browser session cookie.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

/// Cookie holding the session token.
pub const SESSION_COOKIE: &str = "app_session_id";

/// Cookie carrying a freshly issued token.
///
/// The cookie itself is long-lived; the token's `exp` claim bounds the
/// session.
pub fn session_cookie(token: String, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .http_only(true)
        .same_site(SameSite::Lax)
        .path("/")
        .secure(secure)
        .permanent()
        .build()
}

/// Add a removal for the session cookie to `jar`.
///
/// Path and flags must match [`session_cookie`] or browsers keep the old one.
pub fn clear_session_cookie(jar: CookieJar, secure: bool) -> CookieJar {
    jar.remove(
        Cookie::build((SESSION_COOKIE, ""))
            .http_only(true)
            .same_site(SameSite::Lax)
            .path("/")
            .secure(secure),
    )
}

/// Token carried by the session cookie, if any.
pub fn session_token(jar: &CookieJar) -> Option<&str> {
    jar.get(SESSION_COOKIE)
        .map(|cookie| cookie.value())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_cookie_flags() {
        let cookie = session_cookie("tok".into(), false);
        assert_eq!(cookie.name(), SESSION_COOKIE);
        assert_eq!(cookie.value(), "tok");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.path(), Some("/"));
    }

    #[test]
    fn token_is_read_back_from_jar() {
        let jar = CookieJar::new().add(session_cookie("tok".into(), true));
        assert_eq!(session_token(&jar), Some("tok"));
    }

    #[test]
    fn cleared_jar_has_no_token() {
        let jar = CookieJar::new().add(session_cookie("tok".into(), false));
        let jar = clear_session_cookie(jar, false);
        assert_eq!(session_token(&jar), None);
    }
}
