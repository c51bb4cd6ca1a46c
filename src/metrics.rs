//! Prometheus request counters.
//!
//! Each `AppState` owns its own registry, exposed as text on `/metrics`.

use prometheus::{IntCounterVec, Opts, Registry, TextEncoder};

/// Label used for requests that matched no route.
pub const UNMATCHED_PATH: &str = "unmatched";

/// Request metrics for the HTTP surface.
///
/// # Metric Specification
///
/// - **Name**: `http_requests_total`
/// - **Type**: Counter
/// - **Labels**: `path`, the route template (`/messages/{username}`, not the
///   concrete URI)
#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    http_requests_total: IntCounterVec,
}

impl Metrics {
    /// Creates a fresh registry with every metric registered.
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();
        let http_requests_total = IntCounterVec::new(
            Opts::new("http_requests_total", "Total number of HTTP requests by path"),
            &["path"],
        )?;
        registry.register(Box::new(http_requests_total.clone()))?;

        Ok(Self {
            registry,
            http_requests_total,
        })
    }

    /// Counts one request against `path`.
    pub fn record_request(&self, path: &str) {
        self.http_requests_total.with_label_values(&[path]).inc();
    }

    /// Requests counted so far for `path`.
    pub fn requests(&self, path: &str) -> u64 {
        self.http_requests_total.with_label_values(&[path]).get()
    }

    /// Renders the registry in the Prometheus text exposition format.
    pub fn render(&self) -> Result<String, prometheus::Error> {
        TextEncoder::new().encode_to_string(&self.registry.gather())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_per_path() {
        let metrics = Metrics::new().unwrap();
        metrics.record_request("/messages");
        metrics.record_request("/messages");
        metrics.record_request("/send");

        assert_eq!(metrics.requests("/messages"), 2);
        assert_eq!(metrics.requests("/send"), 1);
        assert_eq!(metrics.requests("/login"), 0);
    }

    #[test]
    fn test_registries_are_independent() {
        let first = Metrics::new().unwrap();
        let second = Metrics::new().unwrap();
        first.record_request("/messages");

        assert_eq!(second.requests("/messages"), 0);
    }

    #[test]
    fn test_render_uses_text_format() {
        let metrics = Metrics::new().unwrap();
        metrics.record_request("/messages");

        let text = metrics.render().unwrap();
        assert!(text.contains("# TYPE http_requests_total counter"));
        assert!(text.contains(r#"http_requests_total{path="/messages"} 1"#));
    }
}
