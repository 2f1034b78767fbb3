use serde::{Deserialize, Serialize};

use super::user::Role;

/// `GET /dashboard/overview` payload. The server shapes it by the caller's role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DashboardOverview {
    Administrator {
        total_departments: u32,
        active_tasks: u32,
        total_staff: u32,
        budget_utilization: f64,
        #[serde(default)]
        task_change_percent: Option<f64>,
    },
    DepartmentHead {
        department_tasks: u32,
        completion_rate: f64,
        team_members: u32,
        efficiency_score: f64,
        #[serde(default)]
        task_change_percent: Option<f64>,
    },
    Staff {
        my_tasks: u32,
        completed_week: u32,
        pending_tasks: u32,
    },
}

/// A single labelled figure on a dashboard card
#[derive(Debug, Clone, PartialEq)]
pub struct Statistic {
    pub title: &'static str,
    pub value: String,
    /// Trend annotation such as `+12.5%`
    pub suffix: Option<String>,
}

impl Statistic {
    fn count(title: &'static str, value: u32) -> Self {
        Self {
            title,
            value: value.to_string(),
            suffix: None,
        }
    }

    fn percent(title: &'static str, value: f64) -> Self {
        Self {
            title,
            value: format!("{:.1}%", value),
            suffix: None,
        }
    }

    fn with_trend(mut self, change: Option<f64>) -> Self {
        self.suffix = change.map(|c| format!("{:+.1}%", c));
        self
    }
}

impl DashboardOverview {
    pub fn role(&self) -> Role {
        match self {
            DashboardOverview::Administrator { .. } => Role::Administrator,
            DashboardOverview::DepartmentHead { .. } => Role::DepartmentHead,
            DashboardOverview::Staff { .. } => Role::Staff,
        }
    }

    /// Cards in display order
    pub fn statistics(&self) -> Vec<Statistic> {
        match *self {
            DashboardOverview::Administrator {
                total_departments,
                active_tasks,
                total_staff,
                budget_utilization,
                task_change_percent,
            } => vec![
                Statistic::count("Total Departments", total_departments),
                Statistic::count("Active Tasks", active_tasks).with_trend(task_change_percent),
                Statistic::count("Total Staff", total_staff),
                Statistic::percent("Budget Utilization", budget_utilization),
            ],
            DashboardOverview::DepartmentHead {
                department_tasks,
                completion_rate,
                team_members,
                efficiency_score,
                task_change_percent,
            } => vec![
                Statistic::count("Department Tasks", department_tasks)
                    .with_trend(task_change_percent),
                Statistic::percent("Completion Rate", completion_rate),
                Statistic::count("Team Members", team_members),
                Statistic {
                    title: "Efficiency Score",
                    value: format!("{:.1}", efficiency_score),
                    suffix: None,
                },
            ],
            DashboardOverview::Staff {
                my_tasks,
                completed_week,
                pending_tasks,
            } => vec![
                Statistic::count("My Tasks", my_tasks),
                Statistic::count("Completed This Week", completed_week),
                Statistic::count("Pending Tasks", pending_tasks),
            ],
        }
    }
}
