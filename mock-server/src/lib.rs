//! In-memory test double for a REST entity server.
//!
//! Speaks the dialect the client expects for one sample entity (`Task`):
//! payloads wrapped in `{"result": ...}` envelopes, `X-User` /
//! `X-Password` credential headers, 201 + `Location` on create, and
//! `key=value` / `sort` / `order=desc` query parameters on the collection.
//! Identifiers are always server-assigned, so a client-side pre-set
//! identifier is observably different from the `Location` one.

use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    pub done: bool,
}

/// Create payload. A client-supplied `id` is accepted but ignored; the
/// server assigns its own.
#[derive(Deserialize)]
pub struct TaskInput {
    pub title: String,
    #[serde(default)]
    pub done: bool,
}

/// Store payload; the fields present replace the stored ones.
#[derive(Deserialize)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub done: Option<bool>,
}

struct AppState {
    tasks: RwLock<HashMap<String, Task>>,
    credentials: Option<(String, String)>,
}

type SharedState = Arc<AppState>;

/// Router that accepts any credentials.
pub fn app() -> Router {
    router(None)
}

/// Router that requires the given credential pair on every request.
pub fn app_with_credentials(username: &str, password: &str) -> Router {
    router(Some((username.to_string(), password.to_string())))
}

fn router(credentials: Option<(String, String)>) -> Router {
    let state: SharedState = Arc::new(AppState {
        tasks: RwLock::new(HashMap::new()),
        credentials,
    });
    Router::new()
        .route("/Task", get(list_tasks).post(create_task))
        .route("/Task/{id}", get(get_task).put(update_task).delete(delete_task))
        .with_state(state)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

pub async fn run_with_credentials(
    listener: TcpListener,
    username: &str,
    password: &str,
) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with_credentials(username, password)).await
}

fn authorized(state: &AppState, headers: &HeaderMap) -> bool {
    let Some((username, password)) = &state.credentials else {
        return true;
    };
    let value = |name: &str| headers.get(name).and_then(|v| v.to_str().ok());
    value("X-User") == Some(username) && value("X-Password") == Some(password)
}

fn deny() -> Response {
    (StatusCode::FORBIDDEN, "Access denied").into_response()
}

/// A task field rendered as query-comparable text.
fn field_text(task: &Task, key: &str) -> Option<String> {
    let value = serde_json::to_value(task).ok()?;
    match value.get(key)? {
        serde_json::Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

async fn list_tasks(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    if !authorized(&state, &headers) {
        return deny();
    }

    let tasks = state.tasks.read().await;
    let mut rows: Vec<Task> = tasks.values().cloned().collect();

    for (key, value) in &params {
        if key == "sort" || key == "order" {
            continue;
        }
        rows.retain(|task| field_text(task, key).as_deref() == Some(value.as_str()));
    }

    if let Some(sort_key) = params.get("sort") {
        rows.sort_by(|a, b| field_text(a, sort_key).cmp(&field_text(b, sort_key)));
        if params.get("order").map(String::as_str) == Some("desc") {
            rows.reverse();
        }
    }

    Json(json!({ "result": rows })).into_response()
}

async fn create_task(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Json(input): Json<TaskInput>,
) -> Response {
    if !authorized(&state, &headers) {
        return deny();
    }

    let task = Task {
        id: Uuid::new_v4().to_string(),
        title: input.title,
        done: input.done,
    };
    let id = task.id.clone();
    state.tasks.write().await.insert(id.clone(), task);

    let host = headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("localhost");
    let location = format!("http://{host}/Task/{id}");

    (StatusCode::CREATED, [(header::LOCATION, location)]).into_response()
}

async fn get_task(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    if !authorized(&state, &headers) {
        return deny();
    }

    let tasks = state.tasks.read().await;
    match tasks.get(&id) {
        Some(task) => Json(json!({ "result": task })).into_response(),
        None => (StatusCode::NOT_FOUND, format!("Task {id} not found")).into_response(),
    }
}

async fn update_task(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(patch): Json<TaskPatch>,
) -> Response {
    if !authorized(&state, &headers) {
        return deny();
    }

    let mut tasks = state.tasks.write().await;
    let Some(task) = tasks.get_mut(&id) else {
        return (StatusCode::NOT_FOUND, format!("Task {id} not found")).into_response();
    };
    if let Some(title) = patch.title {
        task.title = title;
    }
    if let Some(done) = patch.done {
        task.done = done;
    }
    StatusCode::OK.into_response()
}

async fn delete_task(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    if !authorized(&state, &headers) {
        return deny();
    }

    let mut tasks = state.tasks.write().await;
    match tasks.remove(&id) {
        Some(_) => StatusCode::OK.into_response(),
        None => (StatusCode::NOT_FOUND, format!("Task {id} not found")).into_response(),
    }
}
