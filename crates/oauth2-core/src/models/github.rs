use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Response of `GET /user`.
///
/// Only the fields the flow relies on are typed; the rest of the payload is kept
/// in `extra` so new or optional GitHub fields survive a decode/encode cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GithubUser {
    pub id: u64,
    pub login: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl GithubUser {
    pub fn name(&self) -> Option<&str> {
        self.extra.get("name").and_then(Value::as_str)
    }

    /// Public profile e-mail. Usually absent; the e-mails endpoint is authoritative.
    pub fn email(&self) -> Option<&str> {
        self.extra.get("email").and_then(Value::as_str)
    }

    pub fn avatar_url(&self) -> Option<&str> {
        self.extra.get("avatar_url").and_then(Value::as_str)
    }
}

/// One entry of `GET /user/emails`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GithubEmail {
    pub email: String,
    pub primary: bool,
    pub verified: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Pick the address to greet the user with: primary and verified first, then any
/// verified address.
pub fn preferred_email(emails: &[GithubEmail]) -> Option<&GithubEmail> {
    emails
        .iter()
        .find(|e| e.primary && e.verified)
        .or_else(|| emails.iter().find(|e| e.verified))
}
