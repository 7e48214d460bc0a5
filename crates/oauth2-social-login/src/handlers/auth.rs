use actix_session::Session;
use actix_web::http::header::{self, ContentType, HeaderValue};
use actix_web::{web, HttpResponse};

use oauth2_core::{missing_scopes, SocialLoginError};

use crate::client::GithubApi;
use crate::flow::AuthorizationFlow;
use crate::models::{CallbackPage, CallbackQuery};
use crate::render::PageRenderer;
use crate::state::{remember_state, take_state, verify_state};

fn no_store_headers(mut resp: HttpResponse) -> HttpResponse {
    resp.headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    resp.headers_mut()
        .insert(header::PRAGMA, HeaderValue::from_static("no-cache"));
    resp
}

fn auth_response_security_headers(mut resp: HttpResponse) -> HttpResponse {
    resp.headers_mut()
        .insert(header::REFERRER_POLICY, HeaderValue::from_static("no-referrer"));
    resp.headers_mut()
        .insert(header::X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
    resp.headers_mut().insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );
    resp
}

/// Landing page with the login link.
pub async fn index(renderer: web::Data<PageRenderer>) -> Result<HttpResponse, SocialLoginError> {
    let body = renderer.index()?;
    Ok(HttpResponse::Ok().content_type(ContentType::html()).body(body))
}

/// Start the authorization code flow: remember a fresh state and send the browser
/// to GitHub.
pub async fn login(
    session: Session,
    flow: web::Data<AuthorizationFlow>,
) -> Result<HttpResponse, SocialLoginError> {
    let (url, state) = flow.authorize_url();
    remember_state(&session, &state)?;

    tracing::debug!("redirecting to GitHub authorization endpoint");

    Ok(auth_response_security_headers(no_store_headers(
        HttpResponse::Found()
            .append_header((header::LOCATION, url.to_string()))
            .finish(),
    )))
}

/// GitHub redirect target: verify state, redeem the code, fetch the profile and
/// e-mails, render everything.
pub async fn callback(
    session: Session,
    query: web::Query<CallbackQuery>,
    flow: web::Data<AuthorizationFlow>,
    github: web::Data<dyn GithubApi>,
    renderer: web::Data<PageRenderer>,
) -> Result<HttpResponse, SocialLoginError> {
    let body = complete_login(&session, &query, &flow, github.get_ref(), &renderer)
        .await
        .inspect_err(|e| {
            if e.is_client_error() {
                tracing::warn!(error = %e, outcome = e.outcome(), "rejected GitHub callback");
            } else {
                tracing::error!(error = %e, outcome = e.outcome(), "GitHub login failed");
            }
        })?;
    Ok(auth_response_security_headers(no_store_headers(
        HttpResponse::Ok().content_type(ContentType::html()).body(body),
    )))
}

async fn complete_login(
    session: &Session,
    query: &CallbackQuery,
    flow: &AuthorizationFlow,
    github: &dyn GithubApi,
    renderer: &PageRenderer,
) -> Result<String, SocialLoginError> {
    let expected = take_state(session);
    verify_state(expected.as_deref(), query.state.as_deref())?;

    if let Some(reason) = query.provider_error() {
        return Err(SocialLoginError::AuthorizationDenied(reason.to_string()));
    }

    let token = github
        .exchange_code(query.code.as_deref().unwrap_or_default())
        .await?;

    if let Some(granted) = token.scope.as_deref() {
        let missing = missing_scopes(flow.requested_scopes(), granted);
        if !missing.is_empty() {
            tracing::warn!(?missing, "GitHub granted fewer scopes than requested");
        }
    }

    let user = github.current_user(&token).await?;
    let emails = github.current_user_emails(&token).await?;

    tracing::info!(
        login = %user.login,
        user_id = user.id,
        emails = emails.len(),
        "GitHub login completed"
    );

    renderer.callback(&CallbackPage {
        user: &user,
        emails: &emails,
        token: &token,
    })
}
