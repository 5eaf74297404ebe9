//! Dashboard read path and report generation write path.

use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::AppState;
use crate::error::{Result, ServerError};
use crate::esg::{DashboardSummary, EsgRecord, EsgRepository, NewEsgRecord};
use crate::router::ValidJson;

pub const ESG_SUMMARY: &str = "esg_summary";

/// Request body of the generation endpoint: `{type, data}`.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct Body {
    #[validate(length(min = 1, message = "Report type must be provided."))]
    pub r#type: String,
    #[validate(nested)]
    pub data: ReportData,
}

/// Scores carried by a generation request.
#[derive(Debug, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ReportData {
    #[validate(length(
        min = 1,
        max = 120,
        message = "Company name must be provided."
    ))]
    pub company_name: String,
    #[validate(range(min = 1900, max = 2100, message = "Year is out of range."))]
    pub year: i64,
    #[validate(range(min = 0.0, max = 100.0, message = "Score must be within 0-100."))]
    pub environmental_score: f64,
    #[validate(range(min = 0.0, max = 100.0, message = "Score must be within 0-100."))]
    pub social_score: f64,
    #[validate(range(min = 0.0, max = 100.0, message = "Score must be within 0-100."))]
    pub governance_score: f64,
    #[validate(range(min = 0.0, max = 100.0, message = "Rate must be within 0-100."))]
    pub compliance_rate: Option<f64>,
}

/// Serve the dashboard aggregates.
pub async fn summary(
    State(state): State<AppState>,
) -> Result<Json<DashboardSummary>> {
    let summary = EsgRepository::new(state.db.sqlite.clone())
        .dashboard_summary()
        .await?;

    Ok(Json(summary))
}

/// Generate a report: upsert the carried company-year row.
///
/// An `X-CSRF-Token` header may accompany the request; enforcing it is the
/// reverse proxy's concern.
pub async fn generate(
    State(state): State<AppState>,
    ValidJson(body): ValidJson<Body>,
) -> Result<(StatusCode, Json<EsgRecord>)> {
    if body.r#type != ESG_SUMMARY {
        return Err(ServerError::UnknownReportType(body.r#type));
    }

    let record = NewEsgRecord {
        company_name: body.data.company_name,
        year: body.data.year,
        environmental_score: body.data.environmental_score,
        social_score: body.data.social_score,
        governance_score: body.data.governance_score,
        compliance_rate: body.data.compliance_rate,
    };

    let stored = EsgRepository::new(state.db.sqlite.clone())
        .upsert(&record)
        .await?;

    tracing::info!(company = %stored.company_name, year = stored.year, "report generated");

    Ok((StatusCode::CREATED, Json(stored)))
}

/// Query parameters of the per-company listing.
#[derive(Debug, Deserialize)]
pub struct CompanyQuery {
    pub company: String,
}

/// All rows of one company, most recent first.
pub async fn by_company(
    State(state): State<AppState>,
    Query(query): Query<CompanyQuery>,
) -> Result<Json<Vec<EsgRecord>>> {
    let records = EsgRepository::new(state.db.sqlite.clone())
        .list_by_company(&query.company)
        .await?;

    Ok(Json(records))
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::json;
    use sqlx::SqlitePool;

    use super::*;
    use crate::*;

    fn acme_body(environmental: f64) -> String {
        json!({
            "type": ESG_SUMMARY,
            "data": {
                "companyName": "Acme",
                "year": 2024,
                "environmentalScore": environmental,
                "socialScore": 64.0,
                "governanceScore": 81.0,
                "complianceRate": 93.5,
            }
        })
        .to_string()
    }

    #[sqlx::test]
    async fn test_generate_then_summary(pool: SqlitePool) {
        let state = router::state(pool);

        let response = make_request(
            app(state.clone()),
            Method::POST,
            "/api/reports/generate",
            acme_body(72.0),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let record: EsgRecord = serde_json::from_slice(&body).unwrap();
        assert_eq!(record.company_name, "Acme");
        assert_eq!(record.sustainability_index.as_deref(), Some("Good"));

        let response = make_request(
            app(state),
            Method::GET,
            "/api/reports/dashboard-summary",
            String::default(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let summary: DashboardSummary = serde_json::from_slice(&body).unwrap();
        assert_eq!(summary.companies, 1);
        assert_eq!(summary.latest_year, Some(2024));
    }

    #[sqlx::test]
    async fn test_generate_twice_updates(pool: SqlitePool) {
        let state = router::state(pool);

        make_request(
            app(state.clone()),
            Method::POST,
            "/api/reports/generate",
            acme_body(72.0),
        )
        .await;
        let response = make_request(
            app(state.clone()),
            Method::POST,
            "/api/reports/generate",
            acme_body(90.0),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);

        let records = esg::EsgRepository::new(state.db.sqlite.clone())
            .list_by_company("Acme")
            .await
            .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].environmental_score, 90.0);
    }

    #[sqlx::test]
    async fn test_unknown_type_rejected(pool: SqlitePool) {
        let body = json!({
            "type": "pdf_export",
            "data": {
                "companyName": "Acme",
                "year": 2024,
                "environmentalScore": 50.0,
                "socialScore": 50.0,
                "governanceScore": 50.0,
            }
        })
        .to_string();

        let response = make_request(
            app(router::state(pool)),
            Method::POST,
            "/api/reports/generate",
            body,
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[sqlx::test]
    async fn test_out_of_range_scores_rejected(pool: SqlitePool) {
        let body = json!({
            "type": ESG_SUMMARY,
            "data": {
                "companyName": "Acme",
                "year": 2024,
                "environmentalScore": 150.0,
                "socialScore": 50.0,
                "governanceScore": 50.0,
            }
        })
        .to_string();

        let response = make_request(
            app(router::state(pool)),
            Method::POST,
            "/api/reports/generate",
            body,
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
