use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry};

/// Label used for requests that matched no route.
pub const UNMATCHED_ROUTE: &str = "unmatched";

/// Process metrics. Cloning is cheap; every clone shares the same collectors.
#[derive(Clone)]
pub struct Metrics {
    pub registry: Registry,

    /// Requests by `method`, matched `route` pattern and `status`.
    pub http_requests_total: IntCounterVec,
    /// Latency by matched `route` pattern.
    pub http_request_duration_seconds: HistogramVec,

    pub github_login_redirects_total: IntCounter,
    /// Callback completions labelled by `outcome` (`success`, `invalid_state`, ...).
    pub github_callbacks_total: IntCounterVec,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let http_requests_total = IntCounterVec::new(
            Opts::new("http_requests_total", "HTTP requests by method, route and status"),
            &["method", "route", "status"],
        )?;
        let http_request_duration_seconds = HistogramVec::new(
            HistogramOpts::new("http_request_duration_seconds", "HTTP request latency by route")
                .buckets(vec![0.005, 0.025, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]),
            &["route"],
        )?;
        let github_login_redirects_total = IntCounter::new(
            "github_login_redirects_total",
            "Redirects issued to the GitHub authorization endpoint",
        )?;
        let github_callbacks_total = IntCounterVec::new(
            Opts::new(
                "github_callbacks_total",
                "GitHub OAuth callbacks handled, by outcome",
            ),
            &["outcome"],
        )?;

        registry.register(Box::new(http_requests_total.clone()))?;
        registry.register(Box::new(http_request_duration_seconds.clone()))?;
        registry.register(Box::new(github_login_redirects_total.clone()))?;
        registry.register(Box::new(github_callbacks_total.clone()))?;

        Ok(Self {
            registry,
            http_requests_total,
            http_request_duration_seconds,
            github_login_redirects_total,
            github_callbacks_total,
        })
    }

    pub fn record_request(&self, method: &str, route: &str, status: u16, seconds: f64) {
        self.http_requests_total
            .with_label_values(&[method, route, status.to_string().as_str()])
            .inc();
        self.http_request_duration_seconds
            .with_label_values(&[route])
            .observe(seconds);
    }

    pub fn record_callback(&self, outcome: &str) {
        self.github_callbacks_total
            .with_label_values(&[outcome])
            .inc();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flow_metrics_are_exported() {
        let metrics = Metrics::new().expect("metrics");
        metrics.record_callback("success");
        metrics.record_callback("success");
        metrics.record_callback("invalid_state");
        metrics.github_login_redirects_total.inc();
        metrics.record_request("GET", "/login", 302, 0.01);

        let text = String::from_utf8(crate::encode_prometheus_text(&metrics.registry).unwrap())
            .unwrap();

        assert!(text.contains(r#"github_callbacks_total{outcome="success"} 2"#));
        assert!(text.contains(r#"github_callbacks_total{outcome="invalid_state"} 1"#));
        assert!(text.contains("github_login_redirects_total 1"));
        assert!(text.contains(r#"http_requests_total{method="GET",route="/login",status="302"} 1"#));
    }

    #[test]
    fn instances_do_not_share_registries() {
        let a = Metrics::new().expect("metrics");
        let b = Metrics::new().expect("metrics");
        a.github_login_redirects_total.inc();

        assert_eq!(a.github_login_redirects_total.get(), 1);
        assert_eq!(b.github_login_redirects_total.get(), 0);
    }
}
