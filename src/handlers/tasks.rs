// src/handlers/tasks.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::task::{CompleteTaskPayload, Task, TaskStatus},
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListTasksQuery {
    pub status: Option<TaskStatus>,
    pub assigned_to: Option<Uuid>,
}

// GET /api/tasks
#[utoipa::path(
    get,
    path = "/api/tasks",
    tag = "Tasks",
    params(
        ("status" = Option<String>, Query, description = "Filtra por status"),
        ("assignedTo" = Option<Uuid>, Query, description = "Filtra por responsável")
    ),
    responses(
        (status = 200, description = "Tarefas", body = Vec<Task>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_tasks(
    State(app_state): State<AppState>,
    Query(query): Query<ListTasksQuery>,
) -> Result<impl IntoResponse, AppError> {
    let tasks = app_state
        .task_service
        .list(&app_state.db_pool, query.status, query.assigned_to)
        .await?;

    Ok((StatusCode::OK, Json(tasks)))
}

// POST /api/tasks/{id}/complete
#[utoipa::path(
    post,
    path = "/api/tasks/{id}/complete",
    tag = "Tasks",
    params(("id" = Uuid, Path, description = "ID da tarefa")),
    request_body = CompleteTaskPayload,
    responses(
        (status = 200, description = "Tarefa concluída", body = Task),
        (status = 404, description = "Não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn complete_task(
    State(app_state): State<AppState>,
    AuthenticatedUser(_user): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<CompleteTaskPayload>,
) -> Result<impl IntoResponse, AppError> {
    let task = app_state
        .task_service
        .complete(&app_state.db_pool, id, payload.notes.as_deref())
        .await?;

    Ok((StatusCode::OK, Json(task)))
}
