use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub date: String,
    pub budget_allocation: f64,
    pub staff_allocation: f64,
    pub equipment_allocation: f64,
}

/// `GET /analytics/predictions`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionReport {
    pub department: String,
    pub model_type: String,
    #[serde(default)]
    pub predictions: Vec<Prediction>,
    #[serde(default)]
    pub confidence: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Allocation {
    pub budget: f64,
    pub staff: f64,
    pub equipment: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationChange {
    pub budget: f64,
    #[serde(default)]
    pub budget_percent: f64,
    pub staff: f64,
    pub equipment: f64,
    #[serde(default)]
    pub equipment_percent: f64,
}

/// `GET /analytics/optimization/{department}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationReport {
    pub current: Allocation,
    pub recommended: Allocation,
    pub change: AllocationChange,
    #[serde(default)]
    pub explanation: String,
}

/// Forecasting models the backend accepts
pub const MODEL_TYPES: [&str; 3] = ["random_forest", "linear_regression", "gradient_boosting"];

pub const DEFAULT_MODEL_TYPE: &str = "random_forest";

pub const DEFAULT_PREDICTION_PERIODS: u32 = 3;
