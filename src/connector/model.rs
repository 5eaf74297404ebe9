//! Vendor payloads and their canonical shapes.
//!
//! Vendor JSON is parsed into typed payload structs at the boundary, then
//! remapped into the application's field names. Missing nested fields fall
//! back to zero or empty values instead of failing the sync.

use serde::{Deserialize, Serialize};

// ---- ERP: financial -------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VendorFinancial {
    pub revenue: Option<f64>,
    pub operating_costs: Option<f64>,
    pub utility_costs: Option<VendorUtilityCosts>,
    pub waste_management_costs: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VendorUtilityCosts {
    pub electricity: Option<f64>,
    pub water: Option<f64>,
    pub gas: Option<f64>,
}

/// Financial figures in application field names.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FinancialData {
    pub revenue: f64,
    pub operating_costs: f64,
    pub electricity_cost: f64,
    pub water_cost: f64,
    pub gas_cost: f64,
    pub waste_management_cost: f64,
}

impl From<VendorFinancial> for FinancialData {
    fn from(v: VendorFinancial) -> Self {
        let utilities = v.utility_costs.unwrap_or_default();
        Self {
            revenue: v.revenue.unwrap_or(0.0),
            operating_costs: v.operating_costs.unwrap_or(0.0),
            electricity_cost: utilities.electricity.unwrap_or(0.0),
            water_cost: utilities.water.unwrap_or(0.0),
            gas_cost: utilities.gas.unwrap_or(0.0),
            waste_management_cost: v.waste_management_costs.unwrap_or(0.0),
        }
    }
}

// ---- ERP: suppliers -------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VendorSupplier {
    pub supplier_id: Option<String>,
    pub name: Option<String>,
    pub esg_rating: Option<f64>,
    pub certifications: Option<Vec<String>>,
}

/// Supplier row in application field names.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SupplierRecord {
    pub external_id: String,
    pub name: String,
    pub esg_rating: f64,
    pub certifications: Vec<String>,
}

impl From<VendorSupplier> for SupplierRecord {
    fn from(v: VendorSupplier) -> Self {
        Self {
            external_id: v.supplier_id.unwrap_or_default(),
            name: v.name.unwrap_or_default(),
            esg_rating: v.esg_rating.unwrap_or(0.0),
            certifications: v.certifications.unwrap_or_default(),
        }
    }
}

// ---- SHEQ: safety incidents ----------------------------------------------

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VendorIncident {
    pub incident_id: Option<String>,
    pub severity: Option<String>,
    pub date: Option<String>,
    pub description: Option<String>,
    pub lost_time_hours: Option<f64>,
}

/// Safety incident in application field names.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SafetyIncident {
    pub external_id: String,
    pub severity: String,
    pub occurred_on: String,
    pub description: String,
    pub lost_time_hours: f64,
}

impl From<VendorIncident> for SafetyIncident {
    fn from(v: VendorIncident) -> Self {
        Self {
            external_id: v.incident_id.unwrap_or_default(),
            severity: v.severity.unwrap_or_default(),
            occurred_on: v.date.unwrap_or_default(),
            description: v.description.unwrap_or_default(),
            lost_time_hours: v.lost_time_hours.unwrap_or(0.0),
        }
    }
}

// ---- SHEQ: training -------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VendorTraining {
    pub employee_id: Option<String>,
    pub course: Option<String>,
    pub hours: Option<f64>,
    pub completed_at: Option<String>,
}

/// Training record in application field names.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainingRecord {
    pub employee_id: String,
    pub course: String,
    pub hours: f64,
    pub completed_at: String,
}

impl From<VendorTraining> for TrainingRecord {
    fn from(v: VendorTraining) -> Self {
        Self {
            employee_id: v.employee_id.unwrap_or_default(),
            course: v.course.unwrap_or_default(),
            hours: v.hours.unwrap_or(0.0),
            completed_at: v.completed_at.unwrap_or_default(),
        }
    }
}

// ---- SHEQ: environmental --------------------------------------------------

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VendorEnvironmental {
    pub emissions: Option<VendorEmissions>,
    pub energy_kwh: Option<f64>,
    pub water_m3: Option<f64>,
    pub recycling_rate: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VendorEmissions {
    pub co2_tonnes: Option<f64>,
    pub nox_tonnes: Option<f64>,
}

/// Environmental figures in application field names.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentalData {
    pub co2_tonnes: f64,
    pub nox_tonnes: f64,
    pub energy_kwh: f64,
    pub water_m3: f64,
    pub recycling_rate: f64,
}

impl From<VendorEnvironmental> for EnvironmentalData {
    fn from(v: VendorEnvironmental) -> Self {
        let emissions = v.emissions.unwrap_or_default();
        Self {
            co2_tonnes: emissions.co2_tonnes.unwrap_or(0.0),
            nox_tonnes: emissions.nox_tonnes.unwrap_or(0.0),
            energy_kwh: v.energy_kwh.unwrap_or(0.0),
            water_m3: v.water_m3.unwrap_or(0.0),
            recycling_rate: v.recycling_rate.unwrap_or(0.0),
        }
    }
}
