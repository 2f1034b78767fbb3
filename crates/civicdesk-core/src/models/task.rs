use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::user::{Role, User};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskStatus {
    Pending,
    #[serde(rename = "In Progress")]
    InProgress,
    Completed,
    Canceled,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 4] = [
        TaskStatus::Pending,
        TaskStatus::InProgress,
        TaskStatus::Completed,
        TaskStatus::Canceled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "Pending",
            TaskStatus::InProgress => "In Progress",
            TaskStatus::Completed => "Completed",
            TaskStatus::Canceled => "Canceled",
        }
    }

    /// Next step in the work-through workflow. Terminal states stay put.
    pub fn advance(&self) -> Self {
        match self {
            TaskStatus::Pending => TaskStatus::InProgress,
            TaskStatus::InProgress => TaskStatus::Completed,
            TaskStatus::Completed => TaskStatus::Completed,
            TaskStatus::Canceled => TaskStatus::Canceled,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Canceled)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TaskPriority {
    Low,
    Medium,
    High,
    Critical,
}

impl TaskPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskPriority::Low => "Low",
            TaskPriority::Medium => "Medium",
            TaskPriority::High => "High",
            TaskPriority::Critical => "Critical",
        }
    }
}

impl fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    /// Human-facing identifier, e.g. `T-000042`
    pub task_id: String,
    pub task_name: String,
    #[serde(default)]
    pub description: String,
    pub priority: TaskPriority,
    pub status: TaskStatus,
    pub department: String,
    /// `YYYY-MM-DD`
    pub due_date: String,
    #[serde(default)]
    pub assigned_to: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub creator: Option<User>,
    #[serde(default)]
    pub assignee: Option<User>,
}

impl Task {
    pub fn due(&self) -> Option<NaiveDate> {
        let date = self.due_date.get(..10).unwrap_or(self.due_date.as_str());
        NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
    }

    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        !self.status.is_terminal() && self.due().is_some_and(|due| due < today)
    }

    /// Assignee name, from the nested user or the flat username field
    pub fn assignee_name(&self) -> Option<&str> {
        self.assignee
            .as_ref()
            .map(|u| u.display_name())
            .or(self.assigned_to.as_deref())
    }

    /// Case-insensitive match against id, name, description and assignee
    pub fn matches(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return true;
        }
        [
            Some(self.task_id.as_str()),
            Some(self.task_name.as_str()),
            Some(self.description.as_str()),
            self.assignee_name(),
        ]
        .into_iter()
        .flatten()
        .any(|field| field.to_lowercase().contains(&query))
    }
}

/// Narrow a task list by status and free-text query
pub fn filter_tasks<'a>(
    tasks: &'a [Task],
    status: Option<TaskStatus>,
    query: &str,
) -> Vec<&'a Task> {
    tasks
        .iter()
        .filter(|t| status.map_or(true, |s| t.status == s))
        .filter(|t| t.matches(query))
        .collect()
}

#[derive(Debug, Clone, Serialize)]
pub struct NewTask {
    pub task_name: String,
    pub description: String,
    pub priority: TaskPriority,
    pub department: String,
    /// `YYYY-MM-DD`
    pub due_date: String,
    /// Assignee username
    pub assigned_to: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct TaskUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<TaskPriority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskComment {
    #[serde(default)]
    pub id: Option<String>,
    pub text: String,
    #[serde(default)]
    pub user: Option<User>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Generic `{"message": "..."}` acknowledgement
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StatusMessage {
    pub message: String,
}

/// Server-side list filters for `GET /tasks`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskFilter {
    pub department: Option<String>,
    pub assigned_to: Option<String>,
    pub status: Option<TaskStatus>,
}

impl TaskFilter {
    /// Scope the list to what the role is expected to work on:
    /// staff see their own tasks, department heads their department.
    pub fn for_user(user: &User) -> Self {
        match user.role {
            Role::Staff => Self {
                assigned_to: Some(user.username.clone()),
                ..Default::default()
            },
            Role::DepartmentHead => Self {
                department: user.department.clone(),
                ..Default::default()
            },
            Role::Administrator => Self::default(),
        }
    }

    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        if let Some(ref department) = self.department {
            query.push(("department", department.clone()));
        }
        if let Some(ref assigned_to) = self.assigned_to {
            query.push(("assigned_to", assigned_to.clone()));
        }
        if let Some(status) = self.status {
            query.push(("status", status.as_str().to_string()));
        }
        query
    }
}
