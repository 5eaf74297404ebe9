//! Thin pull connectors for third-party ERP and SHEQ systems.
//!
//! Each connector makes a single request per call: no retry, pagination or
//! rate limiting. Authentication failures never escape `connect()`.

pub mod model;

use serde::Deserialize;
use url::Url;

use model::{
    EnvironmentalData, FinancialData, SafetyIncident, SupplierRecord,
    TrainingRecord, VendorEnvironmental, VendorFinancial, VendorIncident,
    VendorSupplier, VendorTraining,
};

const API_KEY_HEADER: &str = "X-API-Key";

type Result<T> = std::result::Result<T, ConnectorError>;

#[derive(Debug, thiserror::Error)]
pub enum ConnectorError {
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error("invalid base URL: {0}")]
    InvalidBase(#[from] url::ParseError),

    #[error("vendor returned status {0}")]
    Status(u16),
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct AuthAck {
    success: Option<bool>,
}

/// Connector for the financial/supplier ERP system.
///
/// Authenticates with an `X-API-Key` header.
pub struct ErpConnector {
    http: reqwest::Client,
    base_url: Url,
    api_key: String,
}

impl ErpConnector {
    /// Create a new [`ErpConnector`].
    pub fn new(base_url: &str, api_key: &str) -> Result<Self> {
        Ok(Self {
            http: reqwest::Client::new(),
            base_url: Url::parse(base_url)?,
            api_key: api_key.to_owned(),
        })
    }

    /// Authenticate against the vendor.
    ///
    /// Returns `false` on any failure; errors are logged, never propagated.
    pub async fn connect(&self) -> bool {
        match self.authenticate().await {
            Ok(ok) => ok,
            Err(err) => {
                tracing::warn!(error = %err, "ERP authentication failed");
                false
            },
        }
    }

    async fn authenticate(&self) -> Result<bool> {
        let url = self.base_url.join("api/auth")?;
        let response = self
            .http
            .post(url)
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ConnectorError::Status(response.status().as_u16()));
        }

        let ack: AuthAck = response.json().await.unwrap_or_default();
        Ok(ack.success.unwrap_or(true))
    }

    /// Pull financial figures and remap them into canonical field names.
    pub async fn sync_financial_data(&self) -> Result<FinancialData> {
        let payload: VendorFinancial = self.get("api/financial").await?;
        Ok(payload.into())
    }

    /// Pull the supplier list and remap it into canonical field names.
    pub async fn sync_supplier_data(&self) -> Result<Vec<SupplierRecord>> {
        let payload: Vec<VendorSupplier> = self.get("api/suppliers").await?;
        Ok(payload.into_iter().map(Into::into).collect())
    }

    async fn get<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.base_url.join(path)?;
        let response = self
            .http
            .get(url)
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ConnectorError::Status(response.status().as_u16()));
        }

        Ok(response.json().await?)
    }
}

/// Connector for the safety/training/environmental SHEQ system.
///
/// Authenticates with a bearer token.
pub struct SheqConnector {
    http: reqwest::Client,
    base_url: Url,
    token: String,
}

impl SheqConnector {
    /// Create a new [`SheqConnector`].
    pub fn new(base_url: &str, token: &str) -> Result<Self> {
        Ok(Self {
            http: reqwest::Client::new(),
            base_url: Url::parse(base_url)?,
            token: token.to_owned(),
        })
    }

    /// Authenticate against the vendor.
    ///
    /// Returns `false` on any failure; errors are logged, never propagated.
    pub async fn connect(&self) -> bool {
        match self.authenticate().await {
            Ok(ok) => ok,
            Err(err) => {
                tracing::warn!(error = %err, "SHEQ authentication failed");
                false
            },
        }
    }

    async fn authenticate(&self) -> Result<bool> {
        let url = self.base_url.join("api/auth")?;
        let response = self
            .http
            .post(url)
            .bearer_auth(&self.token)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ConnectorError::Status(response.status().as_u16()));
        }

        let ack: AuthAck = response.json().await.unwrap_or_default();
        Ok(ack.success.unwrap_or(true))
    }

    /// Pull safety incidents and remap them into canonical field names.
    pub async fn sync_safety_incidents(&self) -> Result<Vec<SafetyIncident>> {
        let payload: Vec<VendorIncident> = self.get("api/incidents").await?;
        Ok(payload.into_iter().map(Into::into).collect())
    }

    /// Pull training records and remap them into canonical field names.
    pub async fn sync_training_records(&self) -> Result<Vec<TrainingRecord>> {
        let payload: Vec<VendorTraining> = self.get("api/training").await?;
        Ok(payload.into_iter().map(Into::into).collect())
    }

    /// Pull environmental figures and remap them into canonical field names.
    pub async fn sync_environmental_data(&self) -> Result<EnvironmentalData> {
        let payload: VendorEnvironmental = self.get("api/environmental").await?;
        Ok(payload.into())
    }

    async fn get<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.base_url.join(path)?;
        let response = self
            .http
            .get(url)
            .bearer_auth(&self.token)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ConnectorError::Status(response.status().as_u16()));
        }

        Ok(response.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Discard port on loopback: connection refused immediately.
    const DEAD_BASE: &str = "http://127.0.0.1:9";

    #[tokio::test]
    async fn test_erp_connect_swallows_failure() {
        let connector = ErpConnector::new(DEAD_BASE, "key").unwrap();
        assert!(!connector.connect().await);
    }

    #[tokio::test]
    async fn test_sheq_connect_swallows_failure() {
        let connector = SheqConnector::new(DEAD_BASE, "token").unwrap();
        assert!(!connector.connect().await);
    }

    #[test]
    fn test_rejects_invalid_base() {
        assert!(ErpConnector::new("not a url", "key").is_err());
        assert!(SheqConnector::new("not a url", "token").is_err());
    }
}
