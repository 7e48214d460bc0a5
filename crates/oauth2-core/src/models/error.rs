#[cfg(feature = "actix")]
use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};

/// Everything that can end a login request early.
///
/// The `Display` text is what the browser sees, so the underlying error
/// message is carried verbatim.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SocialLoginError {
    #[error("State invalid")]
    InvalidState,

    #[error("Authorization denied: {0}")]
    AuthorizationDenied(String),

    #[error("Failed to exchange token: {0}")]
    TokenExchange(String),

    #[error("Failed to get user info: {0}")]
    UserInfoRequest(String),

    #[error("Failed to parse user info: {0}")]
    UserInfoParse(String),

    #[error("Failed to get user emails: {0}")]
    EmailsRequest(String),

    #[error("Failed to parse user emails: {0}")]
    EmailsParse(String),

    #[error("Failed to update session: {0}")]
    Session(String),

    #[error("Failed to render page: {0}")]
    Render(String),
}

impl SocialLoginError {
    /// Whether the failure was caused by the incoming request rather than the server
    /// or the provider.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidState | Self::AuthorizationDenied(_))
    }

    /// Stable label used for the callback outcome metric.
    pub fn outcome(&self) -> &'static str {
        match self {
            Self::InvalidState => "invalid_state",
            Self::AuthorizationDenied(_) => "denied",
            Self::TokenExchange(_) => "token_exchange_failed",
            Self::UserInfoRequest(_) | Self::UserInfoParse(_) => "user_fetch_failed",
            Self::EmailsRequest(_) | Self::EmailsParse(_) => "emails_fetch_failed",
            Self::Session(_) => "session_failed",
            Self::Render(_) => "render_failed",
        }
    }
}

#[cfg(feature = "actix")]
impl ResponseError for SocialLoginError {
    fn status_code(&self) -> StatusCode {
        if self.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .content_type("text/plain; charset=utf-8")
            .body(self.to_string())
    }
}
