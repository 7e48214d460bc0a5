use actix_web::web;

pub mod auth;

pub use auth::*;

pub const INDEX_PATH: &str = "/";
pub const LOGIN_PATH: &str = "/login";
pub const CALLBACK_PATH: &str = "/auth/github/callback";

/// Register the login routes.
///
/// Expects `web::Data` for `AuthorizationFlow`, `dyn GithubApi` and `PageRenderer`,
/// plus the session middleware from [`crate::state::session_middleware`].
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route(INDEX_PATH, web::get().to(auth::index))
        .route(LOGIN_PATH, web::get().to(auth::login))
        .route(CALLBACK_PATH, web::get().to(auth::callback));
}
