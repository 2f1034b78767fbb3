//! Task tracking endpoints.

use serde::Serialize;

use crate::models::{NewTask, StatusMessage, Task, TaskComment, TaskFilter, TaskStatus, TaskUpdate};

use super::{ApiClient, ApiError};

#[derive(Serialize)]
struct StatusChange {
    status: TaskStatus,
}

#[derive(Serialize)]
struct NewComment<'a> {
    text: &'a str,
}

impl ApiClient {
    pub async fn list_tasks(&self, filter: &TaskFilter) -> Result<Vec<Task>, ApiError> {
        self.get_with_query("/tasks", &filter.to_query()).await
    }

    pub async fn get_task(&self, id: &str) -> Result<Task, ApiError> {
        self.get(&format!("/tasks/{}", id)).await
    }

    /// Staff cannot create tasks; the server answers 403
    pub async fn create_task(&self, task: &NewTask) -> Result<Task, ApiError> {
        self.post("/tasks", task).await
    }

    pub async fn update_task(&self, id: &str, update: &TaskUpdate) -> Result<Task, ApiError> {
        self.put(&format!("/tasks/{}", id), update).await
    }

    pub async fn update_task_status(
        &self,
        id: &str,
        status: TaskStatus,
    ) -> Result<StatusMessage, ApiError> {
        self.patch(&format!("/tasks/{}/status", id), &StatusChange { status })
            .await
    }

    pub async fn add_task_comment(&self, id: &str, text: &str) -> Result<TaskComment, ApiError> {
        self.post(&format!("/tasks/{}/comments", id), &NewComment { text })
            .await
    }

    pub async fn task_comments(&self, id: &str) -> Result<Vec<TaskComment>, ApiError> {
        self.get(&format!("/tasks/{}/comments", id)).await
    }

    pub async fn delete_task(&self, id: &str) -> Result<serde_json::Value, ApiError> {
        self.delete(&format!("/tasks/{}", id)).await
    }
}
