use oauth2::basic::{BasicClient, BasicErrorResponse, BasicTokenResponse, BasicTokenType};
use oauth2::{
    AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken, EndpointNotSet, EndpointSet,
    RedirectUrl, RequestTokenError, Scope, TokenResponse, TokenUrl,
};
use url::Url;

use oauth2_config::GithubConfig;
use oauth2_core::{ProviderToken, SocialLoginError};

use crate::client::{error_chain, SetupError};

/// `BasicClient` with the authorization and token endpoints configured.
pub type GithubOAuthClient =
    BasicClient<EndpointSet, EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointSet>;

/// The protocol half of the login: authorize URL construction and code redemption.
#[derive(Clone)]
pub struct AuthorizationFlow {
    client: GithubOAuthClient,
    scopes: Vec<String>,
}

impl AuthorizationFlow {
    pub fn from_config(config: &GithubConfig) -> Result<Self, SetupError> {
        let client = BasicClient::new(ClientId::new(config.client_id.clone()))
            .set_client_secret(ClientSecret::new(config.client_secret.clone()))
            .set_auth_uri(AuthUrl::new(config.auth_url.clone())?)
            .set_token_uri(TokenUrl::new(config.token_url.clone())?)
            .set_redirect_uri(RedirectUrl::new(config.redirect_uri.clone())?);

        Ok(Self {
            client,
            scopes: config.scopes.clone(),
        })
    }

    pub fn requested_scopes(&self) -> &[String] {
        &self.scopes
    }

    /// Authorize URL with a fresh random state. The returned token must be stored
    /// for comparison on callback.
    pub fn authorize_url(&self) -> (Url, CsrfToken) {
        self.authorize_url_with_state(CsrfToken::new_random())
    }

    pub fn authorize_url_with_state(&self, state: CsrfToken) -> (Url, CsrfToken) {
        let mut request = self.client.authorize_url(|| state);
        for scope in &self.scopes {
            request = request.add_scope(Scope::new(scope.clone()));
        }

        // Online access: no refresh token is requested.
        request.add_extra_param("access_type", "online").url()
    }

    /// Redeem an authorization code at the token endpoint.
    pub async fn exchange(
        &self,
        http: &oauth2_reqwest::Client,
        code: &str,
    ) -> Result<ProviderToken, SocialLoginError> {
        let response = self
            .client
            .exchange_code(AuthorizationCode::new(code.to_string()))
            .request_async(http)
            .await
            .map_err(|e| SocialLoginError::TokenExchange(describe_token_error(&e)))?;

        Ok(provider_token(&response))
    }
}

fn describe_token_error<RE>(err: &RequestTokenError<RE, BasicErrorResponse>) -> String
where
    RE: std::error::Error + 'static,
{
    match err {
        RequestTokenError::ServerResponse(response) => response.to_string(),
        RequestTokenError::Request(e) => error_chain(e),
        // GitHub answers some failures with 200 and an error body, which surfaces as a
        // parse failure; the body is the useful part.
        RequestTokenError::Parse(e, body) => format!(
            "failed to parse token response: {}; body: {}",
            e,
            String::from_utf8_lossy(body).trim()
        ),
        RequestTokenError::Other(msg) => msg.clone(),
    }
}

fn provider_token(response: &BasicTokenResponse) -> ProviderToken {
    let token_type = match response.token_type() {
        BasicTokenType::Bearer => "bearer".to_string(),
        BasicTokenType::Mac => "mac".to_string(),
        BasicTokenType::Extension(other) => other.clone(),
    };

    ProviderToken {
        access_token: response.access_token().secret().clone(),
        token_type,
        scope: response.scopes().map(|scopes| {
            scopes
                .iter()
                .map(|s| s.as_str())
                .collect::<Vec<_>>()
                .join(" ")
        }),
        expires_in: response.expires_in().map(|d| d.as_secs()),
        refresh_token: response.refresh_token().map(|t| t.secret().clone()),
    }
}
