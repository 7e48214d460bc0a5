//! Actix middleware feeding [`Metrics`] from responses.
//!
//! Besides per-route request counts and latencies, it derives the login flow
//! counters: a redirect from the login route counts as a login, and every
//! response from the callback route is labelled with the [`SocialLoginError`]
//! outcome it carries (or `success`).

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error, HttpResponse,
};
use futures::future::LocalBoxFuture;
use oauth2_core::SocialLoginError;
use std::future::{ready, Ready};
use std::rc::Rc;
use std::time::Instant;

use crate::metrics::{Metrics, UNMATCHED_ROUTE};

/// Route patterns the flow counters are keyed on.
#[derive(Debug, Clone)]
pub struct FlowRoutes {
    pub login: String,
    pub callback: String,
}

pub struct FlowMetrics {
    metrics: Metrics,
    routes: Rc<FlowRoutes>,
}

impl FlowMetrics {
    pub fn new(metrics: Metrics, routes: FlowRoutes) -> Self {
        Self {
            metrics,
            routes: Rc::new(routes),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for FlowMetrics
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = FlowMetricsService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(FlowMetricsService {
            service,
            metrics: self.metrics.clone(),
            routes: Rc::clone(&self.routes),
        }))
    }
}

pub struct FlowMetricsService<S> {
    service: S,
    metrics: Metrics,
    routes: Rc<FlowRoutes>,
}

impl<S, B> Service<ServiceRequest> for FlowMetricsService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let started = Instant::now();
        let method = req.method().to_string();
        let metrics = self.metrics.clone();
        let routes = Rc::clone(&self.routes);
        let response = self.service.call(req);

        Box::pin(async move {
            let res = response.await?;

            let route = res
                .request()
                .match_pattern()
                .unwrap_or_else(|| UNMATCHED_ROUTE.to_string());
            let status = res.status();
            metrics.record_request(
                &method,
                &route,
                status.as_u16(),
                started.elapsed().as_secs_f64(),
            );

            if route == routes.login && status.is_redirection() {
                metrics.github_login_redirects_total.inc();
            } else if route == routes.callback {
                metrics.record_callback(callback_outcome(res.response()));
            }

            Ok(res)
        })
    }
}

/// Outcome label for a callback response; errors other than [`SocialLoginError`]
/// (extractor failures and the like) are grouped as `error`.
fn callback_outcome<B>(res: &HttpResponse<B>) -> &'static str {
    match res.error() {
        None => "success",
        Some(err) => err
            .as_error::<SocialLoginError>()
            .map(SocialLoginError::outcome)
            .unwrap_or("error"),
    }
}
