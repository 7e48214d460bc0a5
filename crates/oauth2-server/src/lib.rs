//! Server assembly: configuration, shared state, middleware and routes.

use std::sync::Arc;

use actix_session::storage::CookieSessionStore;
use actix_session::SessionMiddleware;
use actix_web::cookie::Key;
use actix_web::{web, App, HttpResponse, HttpServer};
use tracing_actix_web::TracingLogger;

use oauth2_config::Config;
use oauth2_observability::actix::{FlowMetrics, FlowRoutes};
use oauth2_observability::Metrics;
use oauth2_social_login::state::session_middleware;
use oauth2_social_login::{
    handlers, AuthorizationFlow, DynGithubApi, GithubApi, GithubClient, PageRenderer, SetupError,
};

const SERVICE_NAME: &str = "github-oauth-demo";

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error(transparent)]
    Setup(#[from] SetupError),

    #[error("failed to initialize metrics: {0}")]
    Metrics(String),

    #[error("failed to compile templates: {0}")]
    Templates(String),
}

/// Read-only values shared by every worker.
#[derive(Clone)]
pub struct AppState {
    pub flow: web::Data<AuthorizationFlow>,
    pub github: web::Data<dyn GithubApi>,
    pub renderer: web::Data<PageRenderer>,
    pub metrics: web::Data<Metrics>,
    session_key: Key,
    secure_cookies: bool,
}

impl AppState {
    pub fn from_config(config: &Config) -> Result<Self, StartupError> {
        let flow = AuthorizationFlow::from_config(&config.github)?;
        let github: DynGithubApi = Arc::new(GithubClient::new(&config.github, flow.clone())?);

        let session_key = match &config.session.key {
            Some(key) => Key::from(key.as_bytes()),
            None => {
                tracing::warn!(
                    "OAUTH2_SESSION_KEY not set; generated an ephemeral key, pending logins will not survive a restart"
                );
                Key::generate()
            }
        };

        Self::new(
            flow,
            github,
            session_key,
            config.github.redirect_uri.starts_with("https://"),
        )
    }

    pub fn new(
        flow: AuthorizationFlow,
        github: DynGithubApi,
        session_key: Key,
        secure_cookies: bool,
    ) -> Result<Self, StartupError> {
        let metrics = Metrics::new().map_err(|e| StartupError::Metrics(e.to_string()))?;
        let renderer = PageRenderer::new().map_err(|e| StartupError::Templates(e.to_string()))?;

        Ok(Self {
            flow: web::Data::new(flow),
            github: web::Data::from(github),
            renderer: web::Data::new(renderer),
            metrics: web::Data::new(metrics),
            session_key,
            secure_cookies,
        })
    }

    pub fn session_middleware(&self) -> SessionMiddleware<CookieSessionStore> {
        session_middleware(self.session_key.clone(), self.secure_cookies)
    }

    pub fn metrics_middleware(&self) -> FlowMetrics {
        FlowMetrics::new(
            self.metrics.get_ref().clone(),
            FlowRoutes {
                login: handlers::LOGIN_PATH.to_string(),
                callback: handlers::CALLBACK_PATH.to_string(),
            },
        )
    }

    /// Register shared data and every route.
    pub fn configure(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(self.flow.clone())
            .app_data(self.github.clone())
            .app_data(self.renderer.clone())
            .app_data(self.metrics.clone())
            .route("/health", web::get().to(health))
            .route("/metrics", web::get().to(metrics_endpoint))
            .configure(handlers::configure);
    }
}

async fn health() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({ "status": "healthy" }))
}

async fn metrics_endpoint(metrics: web::Data<Metrics>) -> HttpResponse {
    match oauth2_observability::encode_prometheus_text(&metrics.registry) {
        Ok(body) => HttpResponse::Ok()
            .content_type("text/plain; version=0.0.4")
            .body(body),
        Err(e) => {
            tracing::error!(error = %e, "failed to encode metrics");
            HttpResponse::InternalServerError().finish()
        }
    }
}

/// Load configuration, then serve until shutdown.
///
/// Missing GitHub credentials end the process before any listener is opened.
pub async fn run() -> std::io::Result<()> {
    if let Err(e) = oauth2_observability::init_telemetry(SERVICE_NAME) {
        eprintln!("failed to initialize telemetry: {e}");
    }

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "invalid configuration, exiting");
            std::process::exit(1);
        }
    };
    tracing::info!(config = ?config.sanitized(), "configuration loaded");

    let state = AppState::from_config(&config).map_err(std::io::Error::other)?;

    let bind_addr = (config.server.host.clone(), config.server.port);
    tracing::info!(
        "Server running on http://{}:{}",
        config.server.host,
        config.server.port
    );

    HttpServer::new(move || {
        let state = state.clone();
        App::new()
            .wrap(state.session_middleware())
            .wrap(state.metrics_middleware())
            .wrap(TracingLogger::default())
            .configure(move |cfg| state.configure(cfg))
    })
    .bind(bind_addr)?
    .run()
    .await
}
