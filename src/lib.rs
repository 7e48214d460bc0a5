//! Library exports.
//!
//! Re-exports the workspace crates under one name so integration tests and
//! additional binaries have a single entry point.

pub use oauth2_config as config;
pub use oauth2_core as models;
pub use oauth2_observability as observability;
pub use oauth2_server::{run, AppState, StartupError};
pub use oauth2_social_login as social_login;
pub use oauth2_social_login::handlers;
