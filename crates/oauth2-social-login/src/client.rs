use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use url::Url;

use oauth2_config::GithubConfig;
use oauth2_core::{GithubEmail, GithubUser, ProviderToken, SocialLoginError};

use crate::flow::AuthorizationFlow;

const USER_AGENT: &str = concat!("github-oauth-demo/", env!("CARGO_PKG_VERSION"));
const GITHUB_JSON: &str = "application/vnd.github+json";
const GITHUB_API_VERSION: &str = "2022-11-28";

#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    #[error("invalid endpoint URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("failed to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),
}

/// Everything the callback needs from GitHub.
///
/// Handlers only see this trait, so tests can substitute a scripted implementation.
#[async_trait]
pub trait GithubApi: Send + Sync {
    async fn exchange_code(&self, code: &str) -> Result<ProviderToken, SocialLoginError>;

    async fn current_user(&self, token: &ProviderToken) -> Result<GithubUser, SocialLoginError>;

    async fn current_user_emails(
        &self,
        token: &ProviderToken,
    ) -> Result<Vec<GithubEmail>, SocialLoginError>;
}

pub type DynGithubApi = Arc<dyn GithubApi>;

/// Production [`GithubApi`] backed by the OAuth2 token endpoint and the REST API.
pub struct GithubClient {
    flow: AuthorizationFlow,
    // Token requests must not follow redirects.
    token_http: oauth2_reqwest::Client,
    api_http: reqwest::Client,
    user_url: Url,
    emails_url: Url,
}

enum FetchError {
    Request(String),
    Parse(String),
}

impl GithubClient {
    pub fn new(config: &GithubConfig, flow: AuthorizationFlow) -> Result<Self, SetupError> {
        let token_http = oauth2_reqwest::ClientBuilder::new()
            .redirect(oauth2_reqwest::redirect::Policy::none())
            .timeout(config.http_timeout())
            .build()?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(GITHUB_JSON));
        headers.insert(
            HeaderName::from_static("x-github-api-version"),
            HeaderValue::from_static(GITHUB_API_VERSION),
        );
        let api_http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .timeout(config.http_timeout())
            .build()?;

        let base = api_base(&config.api_url)?;

        Ok(Self {
            flow,
            token_http,
            api_http,
            user_url: base.join("user")?,
            emails_url: base.join("user/emails")?,
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &Url,
        token: &ProviderToken,
    ) -> Result<T, FetchError> {
        let response = self
            .api_http
            .get(url.clone())
            .bearer_auth(&token.access_token)
            .send()
            .await
            .map_err(|e| FetchError::Request(error_chain(&e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await;
            return Err(FetchError::Request(status_error(status, body)));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::Request(error_chain(&e)))?;

        serde_json::from_slice(&body).map_err(|e| FetchError::Parse(e.to_string()))
    }
}

#[async_trait]
impl GithubApi for GithubClient {
    async fn exchange_code(&self, code: &str) -> Result<ProviderToken, SocialLoginError> {
        self.flow.exchange(&self.token_http, code).await
    }

    async fn current_user(&self, token: &ProviderToken) -> Result<GithubUser, SocialLoginError> {
        self.get_json(&self.user_url, token)
            .await
            .map_err(|e| match e {
                FetchError::Request(msg) => SocialLoginError::UserInfoRequest(msg),
                FetchError::Parse(msg) => SocialLoginError::UserInfoParse(msg),
            })
    }

    async fn current_user_emails(
        &self,
        token: &ProviderToken,
    ) -> Result<Vec<GithubEmail>, SocialLoginError> {
        self.get_json(&self.emails_url, token)
            .await
            .map_err(|e| match e {
                FetchError::Request(msg) => SocialLoginError::EmailsRequest(msg),
                FetchError::Parse(msg) => SocialLoginError::EmailsParse(msg),
            })
    }
}

/// API base with a trailing slash so `join` appends instead of replacing the last
/// segment (matters for GitHub Enterprise's `/api/v3`).
fn api_base(raw: &str) -> Result<Url, url::ParseError> {
    let mut url = Url::parse(raw)?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

/// Message for a non-2xx API response. A body that cannot be read is reported in
/// its place.
fn status_error<E>(status: StatusCode, body: Result<String, E>) -> String
where
    E: std::error::Error + 'static,
{
    match body {
        Ok(body) => format!("GitHub API returned {status}: {}", body.trim()),
        Err(e) => format!(
            "GitHub API returned {status} (failed to read body: {})",
            error_chain(&e)
        ),
    }
}

/// Render an error with its whole `source()` chain; reqwest keeps the interesting
/// part (connection refused, timeout) in the sources.
pub(crate) fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
