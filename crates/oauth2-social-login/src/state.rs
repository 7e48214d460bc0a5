//! Per-login CSRF state, kept in the signed and encrypted session cookie.

use actix_session::config::CookieContentSecurity;
use actix_session::storage::CookieSessionStore;
use actix_session::{Session, SessionMiddleware};
use actix_web::cookie::{Key, SameSite};
use oauth2::CsrfToken;
use subtle::ConstantTimeEq;

use oauth2_core::SocialLoginError;

pub const SESSION_COOKIE_NAME: &str = "github_oauth_session";
pub const STATE_SESSION_KEY: &str = "oauth_state";

/// Session middleware used by the login routes.
///
/// SameSite=Lax so the cookie survives the top-level redirect back from GitHub.
pub fn session_middleware(key: Key, secure: bool) -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_name(SESSION_COOKIE_NAME.to_string())
        .cookie_secure(secure)
        .cookie_http_only(true)
        .cookie_same_site(SameSite::Lax)
        .cookie_content_security(CookieContentSecurity::Private)
        .build()
}

pub fn remember_state(session: &Session, state: &CsrfToken) -> Result<(), SocialLoginError> {
    session
        .insert(STATE_SESSION_KEY, state.secret())
        .map_err(|e| SocialLoginError::Session(e.to_string()))
}

/// Remove and return the pending state. Each state can be checked only once.
pub fn take_state(session: &Session) -> Option<String> {
    let pending = match session.get::<String>(STATE_SESSION_KEY) {
        Ok(pending) => pending,
        Err(e) => {
            tracing::warn!(error = %e, "unreadable oauth state in session");
            None
        }
    };
    session.remove(STATE_SESSION_KEY);
    pending
}

/// Compare the returned `state` against the one issued at login, in constant time.
pub fn verify_state(expected: Option<&str>, received: Option<&str>) -> Result<(), SocialLoginError> {
    match (expected, received) {
        (Some(expected), Some(received))
            if !expected.is_empty() && bool::from(expected.as_bytes().ct_eq(received.as_bytes())) =>
        {
            Ok(())
        }
        _ => Err(SocialLoginError::InvalidState),
    }
}
