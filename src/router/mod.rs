pub mod compliance;
pub mod health;
pub mod integrations;
pub mod reports;

use axum::Json;
use axum::extract::{FromRequest, Request};
use validator::Validate;

use crate::error::ServerError;

/// JSON extractor running the body's validation rules.
pub struct ValidJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidJson<T>
where
    S: Send + Sync,
    T: serde::de::DeserializeOwned + Validate,
{
    type Rejection = ServerError;

    async fn from_request(
        req: Request,
        state: &S,
    ) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        value.validate()?;
        Ok(ValidJson(value))
    }
}

#[cfg(test)]
pub(crate) fn state(pool: sqlx::SqlitePool) -> crate::AppState {
    use std::sync::Arc;

    let mut config = crate::config::Configuration::default();
    config.name = "esgrid-test".into();
    config.url = "http://localhost".into();
    config.erp = Some(crate::config::Erp {
        base_url: "http://localhost:9010".into(),
        api_key: "test-key".into(),
    });

    crate::AppState {
        config: Arc::new(config),
        db: crate::database::Database { sqlite: pool },
    }
}
