//! Data models for the district administration backend.
//!
//! - `User`, `Role`, login request/response: identity
//! - `Task` and friends: task tracking, role-scoped filters
//! - `DashboardOverview`: role-shaped overview figures
//! - `PredictionReport`, `OptimizationReport`: analytics panels

pub mod analytics;
pub mod dashboard;
pub mod task;
pub mod user;

pub use analytics::{
    Allocation, AllocationChange, OptimizationReport, Prediction, PredictionReport,
    DEFAULT_MODEL_TYPE, DEFAULT_PREDICTION_PERIODS, MODEL_TYPES,
};
pub use dashboard::{DashboardOverview, Statistic};
pub use task::{
    filter_tasks, NewTask, StatusMessage, Task, TaskComment, TaskFilter, TaskPriority,
    TaskStatus, TaskUpdate,
};
pub use user::{LoginRequest, LoginResponse, NewUser, Role, User, UserUpdate};

/// Departments known to the district
pub const DEPARTMENTS: [&str; 7] = [
    "Public Works",
    "Education",
    "Health",
    "Finance",
    "Urban Planning",
    "Transportation",
    "Social Services",
];
