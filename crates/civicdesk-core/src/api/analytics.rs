//! Predictive analytics endpoints. Staff receive 403 from all of them.

use serde::Serialize;
use serde_json::Value;

use crate::models::{OptimizationReport, PredictionReport};

use super::{ApiClient, ApiError};

#[derive(Serialize)]
struct ScenarioRequest<'a> {
    department: &'a str,
    scenarios: &'a Value,
}

impl ApiClient {
    pub async fn predictions(
        &self,
        department: &str,
        periods: u32,
        model_type: &str,
    ) -> Result<PredictionReport, ApiError> {
        let periods = periods.to_string();
        let query = [
            ("department", department),
            ("periods", periods.as_str()),
            ("model_type", model_type),
        ];
        self.get_with_query("/analytics/predictions", &query).await
    }

    pub async fn optimal_allocation(&self, department: &str) -> Result<OptimizationReport, ApiError> {
        self.get(&format!("/analytics/optimization/{}", department))
            .await
    }

    pub async fn scenario_analysis(
        &self,
        department: &str,
        scenarios: &Value,
    ) -> Result<Value, ApiError> {
        self.post(
            "/analytics/scenarios",
            &ScenarioRequest {
                department,
                scenarios,
            },
        )
        .await
    }

    pub async fn resource_trends(&self, department: &str, time_range: &str) -> Result<Value, ApiError> {
        let query = [("department", department), ("time_range", time_range)];
        self.get_with_query("/analytics/trends", &query).await
    }

    pub async fn insights(&self, department: &str) -> Result<Value, ApiError> {
        self.get(&format!("/analytics/insights/{}", department))
            .await
    }
}
