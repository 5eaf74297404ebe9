//! Handle database requests for ESG rows.

use chrono::Utc;
use sqlx::SqlitePool;

use crate::error::Result;
use crate::esg::{DashboardSummary, EsgRecord, NewEsgRecord, SustainabilityIndex};

const SELECT_COLUMNS: &str = r#"SELECT
        id,
        company_name,
        year,
        environmental_score,
        social_score,
        governance_score,
        compliance_rate,
        sustainability_index,
        created_at,
        updated_at
    FROM esg_data"#;

#[derive(Clone)]
pub struct EsgRepository {
    pool: SqlitePool,
}

impl EsgRepository {
    /// Create a new [`EsgRepository`].
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a new company-year row.
    ///
    /// A duplicate `(company_name, year)` pair fails with a conflict;
    /// callers wanting insert-or-update semantics use [`Self::upsert`].
    pub async fn insert(&self, record: &NewEsgRecord) -> Result<EsgRecord> {
        let index = derive_index(record);
        let now = Utc::now();

        sqlx::query(
            r#"INSERT INTO esg_data
                (company_name, year, environmental_score, social_score, governance_score,
                 compliance_rate, sustainability_index, created_at, updated_at)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(&record.company_name)
        .bind(record.year)
        .bind(record.environmental_score)
        .bind(record.social_score)
        .bind(record.governance_score)
        .bind(record.compliance_rate)
        .bind(&index)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(crate::error::ServerError::from)?;

        self.fetch(&record.company_name, record.year).await
    }

    /// Explicit update of an existing company-year row.
    pub async fn update(&self, record: &NewEsgRecord) -> Result<EsgRecord> {
        let index = derive_index(record);

        sqlx::query(
            r#"UPDATE esg_data
                SET environmental_score = ?, social_score = ?, governance_score = ?,
                    compliance_rate = ?, sustainability_index = ?, updated_at = ?
                WHERE company_name = ? AND year = ?"#,
        )
        .bind(record.environmental_score)
        .bind(record.social_score)
        .bind(record.governance_score)
        .bind(record.compliance_rate)
        .bind(&index)
        .bind(Utc::now())
        .bind(&record.company_name)
        .bind(record.year)
        .execute(&self.pool)
        .await?;

        self.fetch(&record.company_name, record.year).await
    }

    /// Database-level insert-or-update keyed on the composite identity.
    pub async fn upsert(&self, record: &NewEsgRecord) -> Result<EsgRecord> {
        let index = derive_index(record);
        let now = Utc::now();

        sqlx::query(
            r#"INSERT INTO esg_data
                (company_name, year, environmental_score, social_score, governance_score,
                 compliance_rate, sustainability_index, created_at, updated_at)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
                ON CONFLICT (company_name, year) DO UPDATE SET
                    environmental_score = excluded.environmental_score,
                    social_score = excluded.social_score,
                    governance_score = excluded.governance_score,
                    compliance_rate = excluded.compliance_rate,
                    sustainability_index = excluded.sustainability_index,
                    updated_at = excluded.updated_at"#,
        )
        .bind(&record.company_name)
        .bind(record.year)
        .bind(record.environmental_score)
        .bind(record.social_score)
        .bind(record.governance_score)
        .bind(record.compliance_rate)
        .bind(&index)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        self.fetch(&record.company_name, record.year).await
    }

    /// Find a row by its composite identity.
    pub async fn find(
        &self,
        company_name: &str,
        year: i64,
    ) -> Result<Option<EsgRecord>> {
        let query = format!("{SELECT_COLUMNS} WHERE company_name = ? AND year = ?");
        let record = sqlx::query_as::<_, EsgRecord>(&query)
            .bind(company_name)
            .bind(year)
            .fetch_optional(&self.pool)
            .await?;

        Ok(record)
    }

    /// All rows of a company, most recent year first.
    pub async fn list_by_company(
        &self,
        company_name: &str,
    ) -> Result<Vec<EsgRecord>> {
        let query = format!("{SELECT_COLUMNS} WHERE company_name = ? ORDER BY year DESC");
        let records = sqlx::query_as::<_, EsgRecord>(&query)
            .bind(company_name)
            .fetch_all(&self.pool)
            .await?;

        Ok(records)
    }

    /// Aggregates for the dashboard read path.
    pub async fn dashboard_summary(&self) -> Result<DashboardSummary> {
        let summary = sqlx::query_as::<_, DashboardSummary>(
            r#"SELECT
                COUNT(DISTINCT company_name) AS companies,
                COUNT(*) AS records,
                MAX(year) AS latest_year,
                AVG(environmental_score) AS average_environmental,
                AVG(social_score) AS average_social,
                AVG(governance_score) AS average_governance,
                AVG(compliance_rate) AS average_compliance_rate
            FROM esg_data"#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(summary)
    }

    async fn fetch(&self, company_name: &str, year: i64) -> Result<EsgRecord> {
        let query = format!("{SELECT_COLUMNS} WHERE company_name = ? AND year = ?");
        let record = sqlx::query_as::<_, EsgRecord>(&query)
            .bind(company_name)
            .bind(year)
            .fetch_one(&self.pool)
            .await?;

        Ok(record)
    }
}

fn derive_index(record: &NewEsgRecord) -> String {
    SustainabilityIndex::from_scores(
        record.environmental_score,
        record.social_score,
        record.governance_score,
    )
    .to_string()
}

#[cfg(test)]
mod tests {
    use sqlx::SqlitePool;

    use super::*;
    use crate::error::ServerError;

    fn acme_2024() -> NewEsgRecord {
        NewEsgRecord {
            company_name: "Acme".into(),
            year: 2024,
            environmental_score: 72.0,
            social_score: 64.0,
            governance_score: 81.0,
            compliance_rate: Some(93.5),
        }
    }

    #[sqlx::test]
    async fn test_duplicate_insert_conflicts(pool: SqlitePool) {
        let repo = EsgRepository::new(pool);

        let stored = repo.insert(&acme_2024()).await.unwrap();
        assert_eq!(stored.sustainability_index.as_deref(), Some("Good"));

        let err = repo.insert(&acme_2024()).await.unwrap_err();
        assert!(matches!(err, ServerError::Conflict { .. }));
    }

    #[sqlx::test]
    async fn test_update_and_upsert(pool: SqlitePool) {
        let repo = EsgRepository::new(pool);
        repo.insert(&acme_2024()).await.unwrap();

        let mut revised = acme_2024();
        revised.environmental_score = 88.0;
        revised.social_score = 85.0;
        revised.governance_score = 90.0;

        let updated = repo.update(&revised).await.unwrap();
        assert_eq!(updated.environmental_score, 88.0);
        assert_eq!(updated.sustainability_index.as_deref(), Some("Excellent"));

        // upsert on a fresh identity inserts, on an existing one overwrites.
        let mut other = acme_2024();
        other.year = 2025;
        repo.upsert(&other).await.unwrap();
        let again = repo.upsert(&other).await.unwrap();
        assert_eq!(again.year, 2025);

        let rows = repo.list_by_company("Acme").await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].year, 2025);
    }

    #[sqlx::test]
    async fn test_dashboard_summary(pool: SqlitePool) {
        let repo = EsgRepository::new(pool);

        let empty = repo.dashboard_summary().await.unwrap();
        assert_eq!(empty.records, 0);
        assert_eq!(empty.latest_year, None);
        assert_eq!(empty.average_environmental, None);

        repo.insert(&acme_2024()).await.unwrap();
        let mut globex = acme_2024();
        globex.company_name = "Globex".into();
        globex.year = 2025;
        globex.environmental_score = 52.0;
        repo.insert(&globex).await.unwrap();

        let summary = repo.dashboard_summary().await.unwrap();
        assert_eq!(summary.companies, 2);
        assert_eq!(summary.records, 2);
        assert_eq!(summary.latest_year, Some(2025));
        assert_eq!(summary.average_environmental, Some(62.0));
        assert_eq!(summary.average_compliance_rate, Some(93.5));
    }
}
