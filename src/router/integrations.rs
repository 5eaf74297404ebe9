//! Connector availability endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use serde::{Deserialize, Serialize};

use crate::config::Configuration;

#[derive(Debug, Serialize, Deserialize)]
pub struct ConnectorStatus {
    pub configured: bool,
    pub base_url: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct IntegrationsStatus {
    pub erp: ConnectorStatus,
    pub sheq: ConnectorStatus,
}

/// Report which external systems this instance is wired to.
///
/// Credentials never leave the server; only base URLs are exposed.
pub async fn handler(
    State(config): State<Arc<Configuration>>,
) -> Json<IntegrationsStatus> {
    Json(IntegrationsStatus {
        erp: ConnectorStatus {
            configured: config.erp.is_some(),
            base_url: config.erp.as_ref().map(|c| c.base_url.clone()),
        },
        sheq: ConnectorStatus {
            configured: config.sheq.is_some(),
            base_url: config.sheq.as_ref().map(|c| c.base_url.clone()),
        },
    })
}
