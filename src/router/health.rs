//! Liveness endpoint for smoke tests and orchestration probes.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use serde::{Deserialize, Serialize};

use crate::config::Configuration;

#[derive(Debug, Serialize, Deserialize)]
pub struct Health {
    pub status: String,
    pub version: String,
    pub name: String,
}

/// Report the server as reachable.
pub async fn handler(
    State(config): State<Arc<Configuration>>,
) -> Json<Health> {
    Json(Health {
        status: "ok".into(),
        version: env!("CARGO_PKG_VERSION").into(),
        name: if config.name.is_empty() {
            env!("CARGO_CRATE_NAME").into()
        } else {
            config.name.clone()
        },
    })
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use http_body_util::BodyExt;
    use sqlx::SqlitePool;

    use super::*;
    use crate::*;

    #[sqlx::test]
    async fn test_health_handler(pool: SqlitePool) {
        let app = app(router::state(pool));

        let response =
            make_request(app, Method::GET, "/api/health", String::default())
                .await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let body: Health = serde_json::from_slice(&body).unwrap();
        assert_eq!(body.status, "ok");
        assert_eq!(body.name, "esgrid-test");
    }
}
