use serde::Serialize;
use tera::{Context, Tera};

use oauth2_core::{preferred_email, SocialLoginError};

use crate::models::CallbackPage;

const INDEX_TEMPLATE: &str = "index.html";
const CALLBACK_TEMPLATE: &str = "callback.html";

/// HTML pages, compiled once at startup. Template output is HTML-escaped.
pub struct PageRenderer {
    tera: Tera,
}

impl PageRenderer {
    pub fn new() -> Result<Self, tera::Error> {
        let mut tera = Tera::default();
        tera.add_raw_templates(vec![
            (INDEX_TEMPLATE, include_str!("../templates/index.html")),
            (CALLBACK_TEMPLATE, include_str!("../templates/callback.html")),
        ])?;
        Ok(Self { tera })
    }

    pub fn index(&self) -> Result<String, SocialLoginError> {
        self.render(INDEX_TEMPLATE, &Context::new())
    }

    pub fn callback(&self, page: &CallbackPage<'_>) -> Result<String, SocialLoginError> {
        let mut context = Context::new();
        context.insert(
            "display_name",
            page.user.name().unwrap_or(page.user.login.as_str()),
        );
        context.insert(
            "primary_email",
            &preferred_email(page.emails)
                .map(|e| e.email.as_str())
                .or_else(|| page.user.email()),
        );
        context.insert("avatar_url", &page.user.avatar_url());
        context.insert("user_json", &pretty_json(page.user));
        context.insert("emails_json", &pretty_json(&page.emails));
        context.insert("token_json", &pretty_json(page.token));
        self.render(CALLBACK_TEMPLATE, &context)
    }

    fn render(&self, template: &str, context: &Context) -> Result<String, SocialLoginError> {
        self.tera
            .render(template, context)
            .map_err(|e| SocialLoginError::Render(e.to_string()))
    }
}

/// Two-space indented JSON; on failure the error text takes the value's place.
pub fn pretty_json<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use oauth2_core::{GithubEmail, GithubUser, ProviderToken};
    use serde_json::json;

    fn user(name: &str) -> GithubUser {
        serde_json::from_value(json!({ "id": 1, "login": "octocat", "name": name })).unwrap()
    }

    #[test]
    fn index_links_to_login() {
        let html = PageRenderer::new().unwrap().index().unwrap();
        assert!(html.contains(r#"<a href="/login">Login with GitHub</a>"#));
    }

    #[test]
    fn pretty_json_uses_two_space_indent() {
        assert_eq!(pretty_json(&json!({ "a": [1] })), "{\n  \"a\": [\n    1\n  ]\n}");
    }

    #[test]
    fn callback_escapes_provider_data() {
        let renderer = PageRenderer::new().unwrap();
        let user = user("<script>alert(1)</script>");
        let emails: Vec<GithubEmail> = Vec::new();
        let token = ProviderToken::bearer("gho_abc");

        let html = renderer
            .callback(&CallbackPage {
                user: &user,
                emails: &emails,
                token: &token,
            })
            .unwrap();

        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
        assert_eq!(html.matches("<pre>").count(), 3);
    }

    #[test]
    fn callback_falls_back_to_profile_email() {
        let renderer = PageRenderer::new().unwrap();
        let user: GithubUser = serde_json::from_value(json!({
            "id": 1,
            "login": "octocat",
            "email": "octocat@example.com"
        }))
        .unwrap();
        let emails: Vec<GithubEmail> = Vec::new();
        let token = ProviderToken::bearer("gho_abc");

        let html = renderer
            .callback(&CallbackPage {
                user: &user,
                emails: &emails,
                token: &token,
            })
            .unwrap();

        assert!(html.contains("Signed in as octocat (octocat@example.com)"));
        assert!(!html.contains("<img"));
    }
}
