//! Client for the reports API.
//!
//! Consumers get an outcome value on every call: transport failures and
//! non-success statuses are logged and folded into it, never raised.

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;

use crate::esg::DashboardSummary;

const CSRF_HEADER: &str = "X-CSRF-Token";

/// Yields the anti-forgery token to attach to state-changing requests.
///
/// The original client scraped a page meta tag or the `csrf-token` cookie;
/// here the lookup is injected. A source returning `None` never blocks a
/// request.
pub trait CsrfTokenSource: Send + Sync {
    fn token(&self) -> Option<String>;
}

/// Fixed token, mostly useful for tests and scripts.
pub struct StaticCsrfToken(pub String);

impl CsrfTokenSource for StaticCsrfToken {
    fn token(&self) -> Option<String> {
        Some(self.0.clone())
    }
}

/// Result of a reports API call.
#[derive(Clone, Debug, PartialEq)]
pub struct ApiOutcome<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
}

impl<T> ApiOutcome<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }

    fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message.into()),
        }
    }
}

/// Request body of `POST /api/reports/generate`.
#[derive(Debug, Serialize)]
struct GenerateBody<'a> {
    r#type: &'a str,
    data: serde_json::Value,
}

/// HTTP client for the reports endpoints.
pub struct ReportsClient {
    http: reqwest::Client,
    base_url: Url,
    csrf: Option<Arc<dyn CsrfTokenSource>>,
}

impl ReportsClient {
    /// Create a new [`ReportsClient`].
    pub fn new(base_url: &str) -> Result<Self, url::ParseError> {
        Ok(Self {
            http: reqwest::Client::new(),
            base_url: Url::parse(base_url)?,
            csrf: None,
        })
    }

    /// Attach a CSRF token source, consulted once per call.
    pub fn with_csrf_source(mut self, source: Arc<dyn CsrfTokenSource>) -> Self {
        self.csrf = Some(source);
        self
    }

    /// Fetch the dashboard aggregates.
    pub async fn fetch_dashboard_summary(&self) -> ApiOutcome<DashboardSummary> {
        let url = match self.base_url.join("api/reports/dashboard-summary") {
            Ok(url) => url,
            Err(err) => return ApiOutcome::failed(err.to_string()),
        };

        self.execute(self.http.get(url), "dashboard summary").await
    }

    /// Request report generation on the server.
    pub async fn generate_report(
        &self,
        kind: &str,
        data: serde_json::Value,
    ) -> ApiOutcome<serde_json::Value> {
        let url = match self.base_url.join("api/reports/generate") {
            Ok(url) => url,
            Err(err) => return ApiOutcome::failed(err.to_string()),
        };

        let mut request = self.http.post(url).json(&GenerateBody { r#type: kind, data });
        if let Some(token) = self.csrf.as_ref().and_then(|source| source.token()) {
            request = request.header(CSRF_HEADER, token);
        }

        self.execute(request, "report generation").await
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        what: &str,
    ) -> ApiOutcome<T> {
        let response = match request.send().await {
            Ok(response) => response,
            Err(err) => {
                tracing::warn!(error = %err, "{what} request failed");
                return ApiOutcome::failed(err.to_string());
            },
        };

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "{what} returned non-success status");
            return ApiOutcome::failed(format!("server returned status {status}"));
        }

        match response.json::<T>().await {
            Ok(data) => ApiOutcome::ok(data),
            Err(err) => {
                tracing::warn!(error = %err, "{what} returned malformed body");
                ApiOutcome::failed(err.to_string())
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use sqlx::SqlitePool;

    use super::*;

    // Discard port on loopback: connection refused immediately.
    const DEAD_BASE: &str = "http://127.0.0.1:9";

    #[sqlx::test]
    async fn test_roundtrip_against_live_server(pool: SqlitePool) {
        let state = crate::router::state(pool);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, crate::app(state)).await.unwrap();
        });

        let client = ReportsClient::new(&format!("http://{addr}"))
            .unwrap()
            .with_csrf_source(Arc::new(StaticCsrfToken("token".into())));

        let outcome = client
            .generate_report(
                "esg_summary",
                json!({
                    "companyName": "Acme",
                    "year": 2024,
                    "environmentalScore": 72.0,
                    "socialScore": 64.0,
                    "governanceScore": 81.0,
                }),
            )
            .await;
        assert!(outcome.success, "{:?}", outcome.message);

        let summary = client.fetch_dashboard_summary().await;
        assert!(summary.success);
        let summary = summary.data.unwrap();
        assert_eq!(summary.records, 1);
        assert_eq!(summary.latest_year, Some(2024));
    }

    #[tokio::test]
    async fn test_summary_failure_is_an_outcome() {
        let client = ReportsClient::new(DEAD_BASE).unwrap();

        let outcome = client.fetch_dashboard_summary().await;
        assert!(!outcome.success);
        assert!(outcome.data.is_none());
        assert!(outcome.message.is_some());
    }

    #[tokio::test]
    async fn test_generate_failure_is_an_outcome() {
        let client = ReportsClient::new(DEAD_BASE)
            .unwrap()
            .with_csrf_source(Arc::new(StaticCsrfToken("token".into())));

        let outcome = client
            .generate_report("esg_summary", serde_json::json!({}))
            .await;
        assert!(!outcome.success);
        assert!(outcome.message.is_some());
    }
}
