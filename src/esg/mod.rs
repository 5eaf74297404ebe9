mod repository;
pub mod taxonomy;

pub use repository::*;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// ESG metric row as saved on database.
///
/// One row per company per year, enforced by a unique index.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct EsgRecord {
    pub id: i64,
    pub company_name: String,
    pub year: i64,
    pub environmental_score: f64,
    pub social_score: f64,
    pub governance_score: f64,
    pub compliance_rate: Option<f64>,
    pub sustainability_index: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Scores for a company-year pair, before persistence.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewEsgRecord {
    pub company_name: String,
    pub year: i64,
    pub environmental_score: f64,
    pub social_score: f64,
    pub governance_score: f64,
    pub compliance_rate: Option<f64>,
}

/// Label derived from the mean of the three scores.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SustainabilityIndex {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl SustainabilityIndex {
    /// Derive the label from the three component scores.
    pub fn from_scores(
        environmental: f64,
        social: f64,
        governance: f64,
    ) -> Self {
        let mean = (environmental + social + governance) / 3.0;

        if mean >= 80.0 {
            Self::Excellent
        } else if mean >= 60.0 {
            Self::Good
        } else if mean >= 40.0 {
            Self::Fair
        } else {
            Self::Poor
        }
    }
}

impl std::fmt::Display for SustainabilityIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Excellent => write!(f, "Excellent"),
            Self::Good => write!(f, "Good"),
            Self::Fair => write!(f, "Fair"),
            Self::Poor => write!(f, "Poor"),
        }
    }
}

/// Aggregates served on the dashboard read path.
#[derive(
    Clone, Debug, Default, PartialEq, Serialize, Deserialize, sqlx::FromRow,
)]
pub struct DashboardSummary {
    pub companies: i64,
    pub records: i64,
    pub latest_year: Option<i64>,
    pub average_environmental: Option<f64>,
    pub average_social: Option<f64>,
    pub average_governance: Option<f64>,
    pub average_compliance_rate: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_thresholds() {
        assert_eq!(
            SustainabilityIndex::from_scores(90.0, 85.0, 80.0),
            SustainabilityIndex::Excellent
        );
        assert_eq!(
            SustainabilityIndex::from_scores(60.0, 60.0, 60.0),
            SustainabilityIndex::Good
        );
        assert_eq!(
            SustainabilityIndex::from_scores(40.0, 45.0, 42.0),
            SustainabilityIndex::Fair
        );
        assert_eq!(
            SustainabilityIndex::from_scores(10.0, 20.0, 30.0),
            SustainabilityIndex::Poor
        );
    }
}
