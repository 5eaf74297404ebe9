//! Compliance requirement catalogue.

use axum::Json;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct Requirement {
    pub framework: &'static str,
    pub code: &'static str,
    pub title: &'static str,
    pub category: &'static str,
}

/// Requirements the reporting flows can map metrics onto.
const REQUIREMENTS: &[Requirement] = &[
    Requirement {
        framework: "GRI",
        code: "305-1",
        title: "Direct (Scope 1) GHG emissions",
        category: "environmental",
    },
    Requirement {
        framework: "GRI",
        code: "403-9",
        title: "Work-related injuries",
        category: "social",
    },
    Requirement {
        framework: "GRI",
        code: "404-1",
        title: "Average hours of training per employee",
        category: "social",
    },
    Requirement {
        framework: "SASB",
        code: "EM-MM-140a.1",
        title: "Water withdrawn and consumed",
        category: "environmental",
    },
    Requirement {
        framework: "TCFD",
        code: "GOV-A",
        title: "Board oversight of climate-related risks",
        category: "governance",
    },
];

/// Serve the requirement catalogue.
pub async fn handler() -> Json<&'static [Requirement]> {
    Json(REQUIREMENTS)
}
