//! HTTP server implementation.
//!
//! This module provides the axum router exposing task and goal endpoints
//! and the listener lifecycle around it.

use axum::{
    Json, Router,
    extract::State,
    http::HeaderValue,
    response::IntoResponse,
    routing::get,
};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

use super::extract::{ValidJson, ValidPath};
use crate::config::{CorsConfig, ServerConfig};
use crate::db::Database;
use crate::error::{ApiError, ApiResult};
use crate::types::{GoalWithTasks, Task, TaskInput};

/// Server state shared across handlers.
#[derive(Clone)]
pub struct ApiState {
    db: Arc<Database>,
}

impl ApiState {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &Database {
        &self.db
    }
}

/// Health check response.
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

/// Acknowledgement returned by `DELETE /tasks/{task_id}`.
#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub status: &'static str,
}

/// Health check endpoint.
async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// `POST /tasks/` - a body `id` is ignored; the store assigns ids.
async fn create_task(
    State(state): State<ApiState>,
    ValidJson(input): ValidJson<TaskInput>,
) -> ApiResult<Json<Task>> {
    input.validate()?;
    let task = state.db().create_task(&input)?;
    info!(task_id = task.id, goal_id = task.goal_id, "Task created");
    Ok(Json(task))
}

/// `GET /tasks/`
async fn list_tasks(State(state): State<ApiState>) -> ApiResult<Json<Vec<Task>>> {
    Ok(Json(state.db().list_tasks()?))
}

/// `GET /tasks/{task_id}`
async fn get_task(
    State(state): State<ApiState>,
    ValidPath(task_id): ValidPath<i64>,
) -> ApiResult<Json<Task>> {
    state
        .db()
        .get_task(task_id)?
        .map(Json)
        .ok_or_else(|| ApiError::task_not_found(task_id))
}

/// `PUT /tasks/{task_id}` - replaces every writable field.
async fn update_task(
    State(state): State<ApiState>,
    ValidPath(task_id): ValidPath<i64>,
    ValidJson(input): ValidJson<TaskInput>,
) -> ApiResult<Json<Task>> {
    debug!(task_id, ?input, "Updating task");
    input.check_target(task_id)?;
    input.validate()?;
    let task = state
        .db()
        .update_task(task_id, &input)?
        .ok_or_else(|| ApiError::task_not_found(task_id))?;
    info!(task_id, progress = task.progress, status = %task.status, "Task updated");
    Ok(Json(task))
}

/// `DELETE /tasks/{task_id}`
async fn delete_task(
    State(state): State<ApiState>,
    ValidPath(task_id): ValidPath<i64>,
) -> ApiResult<Json<DeleteResponse>> {
    if !state.db().delete_task(task_id)? {
        return Err(ApiError::task_not_found(task_id));
    }
    info!(task_id, "Task deleted");
    Ok(Json(DeleteResponse { status: "success" }))
}

/// `GET /goals/`
async fn list_goals(State(state): State<ApiState>) -> ApiResult<Json<Vec<GoalWithTasks>>> {
    Ok(Json(state.db().list_goals_with_tasks()?))
}

/// `GET /goals/{goal_id}/tasks`
async fn list_goal_tasks(
    State(state): State<ApiState>,
    ValidPath(goal_id): ValidPath<i64>,
) -> ApiResult<Json<Vec<Task>>> {
    state
        .db()
        .list_tasks_for_goal(goal_id)?
        .map(Json)
        .ok_or_else(|| ApiError::goal_not_found(goal_id))
}

/// CORS policy admitting exactly one browser origin with any method and header.
///
/// Credentials are allowed, so methods and headers are mirrored from the
/// preflight request rather than answered with a wildcard.
pub fn cors_layer(cors: &CorsConfig) -> anyhow::Result<CorsLayer> {
    let origin = HeaderValue::from_str(&cors.allowed_origin).map_err(|e| {
        anyhow::anyhow!("invalid CORS origin '{}': {}", cors.allowed_origin, e)
    })?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::exact(origin))
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true))
}

/// Build the router with all routes.
pub fn build_router(state: ApiState, cors: &CorsConfig) -> anyhow::Result<Router> {
    let router = Router::new()
        .route("/tasks", get(list_tasks).post(create_task))
        .route("/tasks/", get(list_tasks).post(create_task))
        .route(
            "/tasks/{task_id}",
            get(get_task).put(update_task).delete(delete_task),
        )
        .route("/goals", get(list_goals))
        .route("/goals/", get(list_goals))
        .route("/goals/{goal_id}/tasks", get(list_goal_tasks))
        .route("/health", get(health))
        .layer(cors_layer(cors)?)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    Ok(router)
}

/// Handle for a running server.
pub struct ServerHandle {
    addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
    join: JoinHandle<()>,
}

impl ServerHandle {
    /// Address the listener is bound to.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Stop accepting connections and wait for in-flight requests to finish.
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        let _ = self.join.await;
    }
}

/// Bind the listener and serve in a background task.
///
/// Port 0 binds an ephemeral port; see [`ServerHandle::addr`].
pub async fn start_server(
    db: Arc<Database>,
    server: &ServerConfig,
    cors: &CorsConfig,
) -> anyhow::Result<ServerHandle> {
    let app = build_router(ApiState::new(db), cors)?;

    let listener = tokio::net::TcpListener::bind(server.bind_addr()).await?;
    let addr = listener.local_addr()?;

    info!("Server listening on http://{}", addr);

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    let join = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
                info!("Server shutting down");
            })
            .await
        {
            tracing::error!("Server error: {}", e);
        }
    });

    Ok(ServerHandle {
        addr,
        shutdown_tx: Some(shutdown_tx),
        join,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_response_serialization() {
        let response = HealthResponse {
            status: "healthy",
            version: "0.1.0",
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("healthy"));
        assert!(json.contains("0.1.0"));
    }

    #[test]
    fn test_delete_response_shape() {
        let json = serde_json::to_value(DeleteResponse { status: "success" }).unwrap();
        assert_eq!(json, serde_json::json!({"status": "success"}));
    }

    #[test]
    fn test_cors_rejects_invalid_origin() {
        let cors = CorsConfig {
            allowed_origin: "http://bad\norigin".to_string(),
        };
        assert!(cors_layer(&cors).is_err());
    }
}
