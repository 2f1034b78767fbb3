//! Request shape checks for the endpoint groups: method, path, query,
//! JSON body and bearer header as seen by the server.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::State;
use axum::http::{header, HeaderMap, Method, Uri};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use serde_json::{json, Value};

use civicdesk_core::api::{ApiClient, ResponsePolicy};
use civicdesk_core::auth::MemoryCredentialStore;
use civicdesk_core::models::{
    NewTask, NewUser, Role, TaskPriority, TaskStatus, TaskUpdate, UserUpdate,
};

#[derive(Debug, Clone)]
struct Recorded {
    method: Method,
    path: String,
    query: Option<String>,
    body: Option<Value>,
    auth: Option<String>,
}

#[derive(Clone, Default)]
struct Recorder {
    calls: Arc<Mutex<Vec<Recorded>>>,
    reply: Arc<Mutex<Value>>,
}

impl Recorder {
    fn reply_with(&self, value: Value) {
        *self.reply.lock().unwrap() = value;
    }

    fn last(&self) -> Recorded {
        self.calls.lock().unwrap().last().cloned().unwrap()
    }
}

async fn record(
    State(recorder): State<Recorder>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> Response {
    let auth = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    recorder.calls.lock().unwrap().push(Recorded {
        method,
        path: uri.path().to_string(),
        query: uri.query().map(str::to_string),
        body: serde_json::from_str(&body).ok(),
        auth,
    });
    Json(recorder.reply.lock().unwrap().clone()).into_response()
}

async fn client() -> (ApiClient, Recorder) {
    let recorder = Recorder::default();
    let app = Router::new().fallback(record).with_state(recorder.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let policy = ResponsePolicy::new(Arc::new(MemoryCredentialStore::with_token("abc123")));
    let api = ApiClient::new(&format!("http://{}", addr), Duration::from_secs(5), policy).unwrap();
    (api, recorder)
}

fn user_json() -> Value {
    json!({
        "id": "7",
        "username": "jdoe",
        "full_name": "Jane Doe",
        "email": "jdoe@district.gov",
        "role": "staff",
        "department": "Health"
    })
}

fn task_json() -> Value {
    json!({
        "id": "t1",
        "task_id": "T-000001",
        "task_name": "Repair potholes",
        "priority": "High",
        "status": "Pending",
        "department": "Public Works",
        "due_date": "2024-03-15"
    })
}

#[tokio::test]
async fn test_user_administration_requests() {
    let (api, recorder) = client().await;

    recorder.reply_with(user_json());
    let new_user = NewUser {
        username: "jdoe".to_string(),
        email: "jdoe@district.gov".to_string(),
        full_name: "Jane Doe".to_string(),
        role: Role::Staff,
        department: "Health".to_string(),
        password: "secret".to_string(),
    };
    let created = api.register(&new_user).await.unwrap();
    assert_eq!(created.username, "jdoe");
    let call = recorder.last();
    assert_eq!(call.method, Method::POST);
    assert_eq!(call.path, "/auth/register");
    assert_eq!(call.body.unwrap()["role"], "staff");
    assert_eq!(call.auth.as_deref(), Some("Bearer abc123"));

    recorder.reply_with(json!([user_json()]));
    assert_eq!(api.list_users().await.unwrap().len(), 1);
    let call = recorder.last();
    assert_eq!((call.method, call.path.as_str()), (Method::GET, "/auth/users"));

    recorder.reply_with(user_json());
    let update = UserUpdate {
        role: Some(Role::DepartmentHead),
        ..Default::default()
    };
    api.update_user("7", &update).await.unwrap();
    let call = recorder.last();
    assert_eq!((call.method, call.path.as_str()), (Method::PUT, "/auth/users/7"));
    // Unset fields are left out so the server keeps them
    assert_eq!(call.body, Some(json!({"role": "department_head"})));

    recorder.reply_with(json!({"message": "User deleted"}));
    let reply = api.delete_user("7").await.unwrap();
    assert_eq!(reply["message"], "User deleted");
    let call = recorder.last();
    assert_eq!((call.method, call.path.as_str()), (Method::DELETE, "/auth/users/7"));
    assert_eq!(call.auth.as_deref(), Some("Bearer abc123"));
}

#[tokio::test]
async fn test_task_requests() {
    let (api, recorder) = client().await;
    recorder.reply_with(task_json());

    let task = api.get_task("t1").await.unwrap();
    assert_eq!(task.task_id, "T-000001");
    assert_eq!(task.priority, TaskPriority::High);
    let call = recorder.last();
    assert_eq!((call.method, call.path.as_str()), (Method::GET, "/tasks/t1"));

    let new_task = NewTask {
        task_name: "Repair potholes".to_string(),
        description: "Main street".to_string(),
        priority: TaskPriority::High,
        department: "Public Works".to_string(),
        due_date: "2024-03-15".to_string(),
        assigned_to: "staff".to_string(),
    };
    api.create_task(&new_task).await.unwrap();
    let call = recorder.last();
    assert_eq!((call.method, call.path.as_str()), (Method::POST, "/tasks"));
    let body = call.body.unwrap();
    assert_eq!(body["task_name"], "Repair potholes");
    assert_eq!(body["priority"], "High");
    assert_eq!(body["assigned_to"], "staff");

    let update = TaskUpdate {
        status: Some(TaskStatus::InProgress),
        ..Default::default()
    };
    api.update_task("t1", &update).await.unwrap();
    let call = recorder.last();
    assert_eq!((call.method, call.path.as_str()), (Method::PUT, "/tasks/t1"));
    assert_eq!(call.body, Some(json!({"status": "In Progress"})));

    recorder.reply_with(json!({"id": "c1", "text": "On it"}));
    let comment = api.add_task_comment("t1", "On it").await.unwrap();
    assert_eq!(comment.text, "On it");
    let call = recorder.last();
    assert_eq!((call.method, call.path.as_str()), (Method::POST, "/tasks/t1/comments"));
    assert_eq!(call.body, Some(json!({"text": "On it"})));
    assert_eq!(call.auth.as_deref(), Some("Bearer abc123"));
}

#[tokio::test]
async fn test_dashboard_requests() {
    let (api, recorder) = client().await;
    recorder.reply_with(json!({"ok": true}));

    api.performance_metrics(Some("Health"), Some("2024-01-01"), None)
        .await
        .unwrap();
    let call = recorder.last();
    assert_eq!(call.path, "/dashboard/performance");
    assert_eq!(call.query.as_deref(), Some("department=Health&start_date=2024-01-01"));

    api.resource_allocation(None).await.unwrap();
    let call = recorder.last();
    assert_eq!(call.path, "/dashboard/resources");
    assert_eq!(call.query, None);

    api.department_data("Public Works").await.unwrap();
    assert_eq!(recorder.last().path, "/dashboard/departments/Public%20Works");

    api.activity_logs(None).await.unwrap();
    let call = recorder.last();
    assert_eq!(call.path, "/dashboard/activity");
    assert_eq!(call.query.as_deref(), Some("limit=15"));
    assert_eq!(call.auth.as_deref(), Some("Bearer abc123"));
}

#[tokio::test]
async fn test_analytics_requests() {
    let (api, recorder) = client().await;
    recorder.reply_with(json!({"ok": true}));

    let scenarios = json!([{"name": "budget cut", "budget_change": -10}]);
    api.scenario_analysis("Health", &scenarios).await.unwrap();
    let call = recorder.last();
    assert_eq!((call.method, call.path.as_str()), (Method::POST, "/analytics/scenarios"));
    assert_eq!(
        call.body,
        Some(json!({"department": "Health", "scenarios": scenarios}))
    );

    api.resource_trends("Health", "6m").await.unwrap();
    let call = recorder.last();
    assert_eq!(call.path, "/analytics/trends");
    assert_eq!(call.query.as_deref(), Some("department=Health&time_range=6m"));

    api.insights("Health").await.unwrap();
    let call = recorder.last();
    assert_eq!((call.method, call.path.as_str()), (Method::GET, "/analytics/insights/Health"));
    assert_eq!(call.auth.as_deref(), Some("Bearer abc123"));
}
