use serde::Deserialize;

use oauth2_core::{GithubEmail, GithubUser, ProviderToken};

/// Query string GitHub appends when redirecting back to the callback.
#[derive(Debug, Default, Deserialize)]
pub struct CallbackQuery {
    pub state: Option<String>,
    pub code: Option<String>,
    /// Set instead of `code` when the user declines or the request is rejected.
    pub error: Option<String>,
    pub error_description: Option<String>,
}

impl CallbackQuery {
    /// Provider-reported failure, preferring the human readable description.
    pub fn provider_error(&self) -> Option<&str> {
        self.error
            .as_deref()
            .map(|error| self.error_description.as_deref().unwrap_or(error))
    }
}

/// Everything shown on the post-login page.
#[derive(Debug)]
pub struct CallbackPage<'a> {
    pub user: &'a GithubUser,
    pub emails: &'a [GithubEmail],
    pub token: &'a ProviderToken,
}
