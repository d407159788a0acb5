//! HTTP route handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{get, post, put},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::ai::TaskAi;
use crate::config::Config;
use crate::llm::{DeepSeekClient, SharedCompletionClient};
use crate::store::TaskStore;
use crate::task::{Status, Task};

use super::types::*;

/// Shared application state.
pub struct AppState {
    pub store: TaskStore,
    pub ai: Arc<TaskAi>,
    pub ai_enabled: bool,
}

/// Start the HTTP server.
pub async fn serve(config: Config) -> anyhow::Result<()> {
    let store = TaskStore::open(&config.database_path)?;
    tracing::info!("task store opened at {}", config.database_path.display());

    let client: SharedCompletionClient = Arc::new(DeepSeekClient::new(&config));
    let ai = Arc::new(TaskAi::new(client, store.clone(), &config));

    let state = Arc::new(AppState {
        store,
        ai,
        ai_enabled: config.api_key.is_some(),
    });

    let app = router(Arc::clone(&state));

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/v1/tasks", post(create_task).get(list_tasks))
        .route(
            "/api/v1/tasks/:id",
            get(get_task).put(update_task).delete(delete_task),
        )
        .route("/api/v1/tasks/:id/complete", put(complete_task))
        .route("/api/v1/report/weekly", get(weekly_report))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Wait for a shutdown signal.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

/// Health check endpoint.
async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        ai_enabled: state.ai_enabled,
    })
}

/// Create a task from raw input text.
///
/// The reverse-dependency synchronizer is spawned detached: the response does
/// not wait for it, and its failures are only visible in the log.
async fn create_task(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateTaskRequest>,
) -> Result<(StatusCode, Json<CreateTaskResponse>), (StatusCode, String)> {
    let input = if req.prompt.trim().is_empty() {
        req.title
    } else {
        req.prompt
    };
    let input = input.trim();
    if input.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            "title or prompt is required".to_string(),
        ));
    }

    let draft = state.ai.parse_task_from_input(input).await;
    let task = state.store.create(&draft).map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("failed to create task: {}", e),
        )
    })?;

    let ai = Arc::clone(&state.ai);
    let trigger = task.clone();
    tokio::spawn(async move {
        ai.sync_priorities(&trigger).await;
    });

    Ok((
        StatusCode::CREATED,
        Json(CreateTaskResponse {
            message: "Task created".to_string(),
            task,
        }),
    ))
}

/// List all tasks, newest first.
async fn list_tasks(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Task>>, (StatusCode, String)> {
    let tasks = state
        .store
        .find_all()
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
    Ok(Json(tasks))
}

async fn get_task(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Task>, (StatusCode, String)> {
    match state.store.find_by_id(id) {
        Ok(Some(task)) => Ok(Json(task)),
        Ok(None) => Err((StatusCode::NOT_FOUND, format!("task {} not found", id))),
        Err(e) => Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string())),
    }
}

/// Partial update of a task.
async fn update_task(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateTaskRequest>,
) -> Result<Json<Task>, (StatusCode, String)> {
    let mut task = match state.store.find_by_id(id) {
        Ok(Some(task)) => task,
        Ok(None) => return Err((StatusCode::NOT_FOUND, format!("task {} not found", id))),
        Err(e) => return Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string())),
    };

    if let Some(title) = req.title {
        task.title = title;
    }
    if let Some(description) = req.description {
        task.description = description;
    }
    if let Some(status) = req.status {
        task.status = status;
    }
    if let Some(due_date) = req.due_date {
        task.due_date = Some(due_date);
    }
    if let Some(priority) = req.priority {
        task.priority = priority;
    }
    if let Some(estimated_hours) = req.estimated_hours {
        task.estimated_hours = estimated_hours;
    }

    state
        .store
        .update(&task)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
    Ok(Json(task))
}

/// Force a task to Completed.
async fn complete_task(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Task>, (StatusCode, String)> {
    let mut task = match state.store.find_by_id(id) {
        Ok(Some(task)) => task,
        Ok(None) => return Err((StatusCode::NOT_FOUND, format!("task {} not found", id))),
        Err(e) => return Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string())),
    };

    task.status = Status::Completed;
    state
        .store
        .update(&task)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
    Ok(Json(task))
}

async fn delete_task(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, (StatusCode, String)> {
    state
        .store
        .delete(id)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
    Ok(Json(MessageResponse {
        message: "Deleted".to_string(),
    }))
}

/// Weekly report over completed tasks. AI failures yield the fixed fallback
/// string, never an HTTP error.
async fn weekly_report(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ReportResponse>, (StatusCode, String)> {
    let completed = state
        .store
        .find_by_status(Status::Completed)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
    let report = state.ai.generate_report(&completed).await;
    Ok(Json(ReportResponse { report }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::Priority;

    /// State wired to an unconfigured completion client: every AI call fails
    /// like a deployment without a credential.
    fn state_without_credential() -> Arc<AppState> {
        let config = Config::default();
        let store = TaskStore::open_in_memory().unwrap();
        let client: SharedCompletionClient = Arc::new(DeepSeekClient::new(&config));
        let ai = Arc::new(TaskAi::new(client, store.clone(), &config));
        Arc::new(AppState {
            store,
            ai,
            ai_enabled: false,
        })
    }

    #[tokio::test]
    async fn test_create_rejects_empty_input() {
        let state = state_without_credential();
        let req = CreateTaskRequest {
            title: "  ".to_string(),
            prompt: String::new(),
        };
        let err = create_task(State(state), Json(req)).await.unwrap_err();
        assert_eq!(err.0, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_create_without_credential_persists_pending_task() {
        let state = state_without_credential();
        let req = CreateTaskRequest {
            title: String::new(),
            prompt: "tidy the backlog".to_string(),
        };
        let (status, Json(response)) = create_task(State(Arc::clone(&state)), Json(req))
            .await
            .unwrap();

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(response.task.status, Status::Pending);
        assert_eq!(response.task.priority, Priority::Low);

        let stored = state.store.find_by_id(response.task.id).unwrap();
        assert!(stored.is_some());
    }

    #[tokio::test]
    async fn test_get_missing_task_is_404() {
        let state = state_without_credential();
        let err = get_task(State(state), Path(99)).await.unwrap_err();
        assert_eq!(err.0, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_complete_marks_task_completed() {
        let state = state_without_credential();
        let req = CreateTaskRequest {
            title: "finish the report".to_string(),
            prompt: String::new(),
        };
        let (_, Json(created)) = create_task(State(Arc::clone(&state)), Json(req))
            .await
            .unwrap();

        let Json(completed) = complete_task(State(Arc::clone(&state)), Path(created.task.id))
            .await
            .unwrap();
        assert_eq!(completed.status, Status::Completed);
    }

    #[tokio::test]
    async fn test_update_applies_partial_fields() {
        let state = state_without_credential();
        let req = CreateTaskRequest {
            title: "draft the plan".to_string(),
            prompt: String::new(),
        };
        let (_, Json(created)) = create_task(State(Arc::clone(&state)), Json(req))
            .await
            .unwrap();

        let update = UpdateTaskRequest {
            priority: Some(Priority::High),
            ..UpdateTaskRequest::default()
        };
        let Json(updated) = update_task(
            State(Arc::clone(&state)),
            Path(created.task.id),
            Json(update),
        )
        .await
        .unwrap();
        assert_eq!(updated.priority, Priority::High);
        assert_eq!(updated.title, "draft the plan");
    }

    #[tokio::test]
    async fn test_weekly_report_with_nothing_completed() {
        let state = state_without_credential();
        let Json(response) = weekly_report(State(state)).await.unwrap();
        assert_eq!(response.report, "No tasks were completed this period.");
    }
}
