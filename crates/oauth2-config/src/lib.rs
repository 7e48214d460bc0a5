use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const CLIENT_ID_VAR: &str = "GITHUB_CLIENT_ID";
pub const CLIENT_SECRET_VAR: &str = "GITHUB_CLIENT_SECRET";

pub const DEFAULT_REDIRECT_URI: &str = "http://localhost:8080/auth/github/callback";
pub const GITHUB_AUTH_URL: &str = "https://github.com/login/oauth/authorize";
pub const GITHUB_TOKEN_URL: &str = "https://github.com/login/oauth/access_token";
pub const GITHUB_API_URL: &str = "https://api.github.com";

/// Scopes requested on every login: profile read access and the e-mail list.
pub const GITHUB_SCOPES: [&str; 2] = ["read:user", "user:email"];

/// Minimum length accepted for `OAUTH2_SESSION_KEY` (cookie signing + encryption).
pub const MIN_SESSION_KEY_LEN: usize = 64;

const MASKED: &str = "***MASKED***";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    MissingVariable(&'static str),

    #[error("OAUTH2_SESSION_KEY must be at least {MIN_SESSION_KEY_LEN} bytes long (current: {0})")]
    SessionKeyTooShort(usize),

    #[error("invalid configuration: {0}")]
    Source(#[from] config::ConfigError),
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub server: ServerConfig,
    pub github: GithubConfig,
    pub session: SessionConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GithubConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub scopes: Vec<String>,
    pub auth_url: String,
    pub token_url: String,
    pub api_url: String,
    pub http_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SessionConfig {
    pub key: Option<String>,
}

/// Flat view of the `OAUTH2_*` variables as produced by `config::Environment`.
#[derive(Debug, Deserialize)]
struct EnvSettings {
    server_host: String,
    server_port: u16,
    github_redirect_uri: String,
    github_auth_url: String,
    github_token_url: String,
    github_api_url: String,
    github_http_timeout_secs: u64,
    #[serde(default)]
    session_key: Option<String>,
}

impl GithubConfig {
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

impl Config {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(std::env::vars())
    }

    /// Load configuration from an explicit set of environment-style variables.
    ///
    /// `GITHUB_CLIENT_ID` and `GITHUB_CLIENT_SECRET` are required and must be
    /// non-empty. Everything else is read from `OAUTH2_`-prefixed variables and
    /// falls back to defaults that match the GitHub cloud endpoints.
    pub fn from_vars<I>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let vars: config::Map<String, String> = vars.into_iter().collect();

        let client_id = required(&vars, CLIENT_ID_VAR)?;
        let client_secret = required(&vars, CLIENT_SECRET_VAR)?;

        let settings: EnvSettings = config::Config::builder()
            .set_default("server_host", "127.0.0.1")?
            .set_default("server_port", 8080)?
            .set_default("github_redirect_uri", DEFAULT_REDIRECT_URI)?
            .set_default("github_auth_url", GITHUB_AUTH_URL)?
            .set_default("github_token_url", GITHUB_TOKEN_URL)?
            .set_default("github_api_url", GITHUB_API_URL)?
            .set_default("github_http_timeout_secs", 10)?
            .add_source(
                config::Environment::with_prefix("OAUTH2").source(Some(vars)),
            )
            .build()?
            .try_deserialize()?;

        let session_key = settings.session_key.filter(|k| !k.trim().is_empty());
        if let Some(key) = &session_key {
            if key.len() < MIN_SESSION_KEY_LEN {
                return Err(ConfigError::SessionKeyTooShort(key.len()));
            }
        }

        Ok(Self {
            server: ServerConfig {
                host: settings.server_host,
                port: settings.server_port,
            },
            github: GithubConfig {
                client_id,
                client_secret,
                redirect_uri: settings.github_redirect_uri,
                scopes: GITHUB_SCOPES.iter().map(|s| s.to_string()).collect(),
                auth_url: settings.github_auth_url,
                token_url: settings.github_token_url,
                api_url: settings.github_api_url,
                http_timeout_secs: settings.github_http_timeout_secs,
            },
            session: SessionConfig { key: session_key },
        })
    }

    /// Produce a version safe to log (secrets masked).
    pub fn sanitized(&self) -> Self {
        let mut clone = self.clone();
        clone.github.client_secret = MASKED.to_string();
        if let Some(ref mut key) = clone.session.key {
            *key = MASKED.to_string();
        }
        clone
    }
}

fn required(
    vars: &config::Map<String, String>,
    name: &'static str,
) -> Result<String, ConfigError> {
    vars.get(name)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or(ConfigError::MissingVariable(name))
}
