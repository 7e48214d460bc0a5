//! GitHub login over the OAuth2 authorization-code flow.
//!
//! - [`flow::AuthorizationFlow`] builds the authorize URL and redeems codes.
//! - [`client::GithubApi`] is the seam between handlers and GitHub; the
//!   production implementation is [`client::GithubClient`].
//! - [`state`] keeps the per-login CSRF token in the session cookie.
//! - [`handlers`] exposes `/`, `/login` and `/auth/github/callback`.

extern crate reqwest as oauth2_reqwest;

pub mod client;
pub mod flow;
pub mod handlers;
pub mod models;
pub mod render;
pub mod state;

pub use client::{DynGithubApi, GithubApi, GithubClient, SetupError};
pub use flow::AuthorizationFlow;
pub use render::PageRenderer;
