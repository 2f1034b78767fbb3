//! Dashboard aggregates. Only the overview has a fixed shape; the other
//! endpoints are displayed as returned.

use serde_json::Value;

use crate::models::DashboardOverview;

use super::{ApiClient, ApiError};

/// Default number of activity log entries
const DEFAULT_ACTIVITY_LIMIT: u32 = 15;

impl ApiClient {
    pub async fn dashboard_overview(
        &self,
        department: Option<&str>,
    ) -> Result<DashboardOverview, ApiError> {
        let query: Vec<(&str, &str)> = department.map(|d| ("department", d)).into_iter().collect();
        self.get_with_query("/dashboard/overview", &query).await
    }

    pub async fn performance_metrics(
        &self,
        department: Option<&str>,
        start_date: Option<&str>,
        end_date: Option<&str>,
    ) -> Result<Value, ApiError> {
        let query: Vec<(&str, &str)> = [
            ("department", department),
            ("start_date", start_date),
            ("end_date", end_date),
        ]
        .into_iter()
        .filter_map(|(k, v)| v.map(|v| (k, v)))
        .collect();
        self.get_with_query("/dashboard/performance", &query).await
    }

    pub async fn resource_allocation(&self, department: Option<&str>) -> Result<Value, ApiError> {
        let query: Vec<(&str, &str)> = department.map(|d| ("department", d)).into_iter().collect();
        self.get_with_query("/dashboard/resources", &query).await
    }

    pub async fn department_data(&self, department: &str) -> Result<Value, ApiError> {
        self.get(&format!("/dashboard/departments/{}", department))
            .await
    }

    pub async fn activity_logs(&self, limit: Option<u32>) -> Result<Value, ApiError> {
        let limit = limit.unwrap_or(DEFAULT_ACTIVITY_LIMIT);
        self.get_with_query("/dashboard/activity", &[("limit", limit)])
            .await
    }
}
