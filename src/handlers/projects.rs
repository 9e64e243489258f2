// src/handlers/projects.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::{require_manager, AuthenticatedUser},
    models::project::{CreateProjectPayload, Project},
    services::majority::ProjectAggregate,
};

// POST /api/projects
#[utoipa::path(
    post,
    path = "/api/projects",
    tag = "Projects",
    request_body = CreateProjectPayload,
    responses(
        (status = 201, description = "Projeto criado", body = Project),
        (status = 400, description = "Limiares inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_project(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<CreateProjectPayload>,
) -> Result<impl IntoResponse, AppError> {
    require_manager(&user)?;
    payload.validate()?;

    let project = app_state
        .project_service
        .create_project(&app_state.db_pool, &payload)
        .await?;

    Ok((StatusCode::CREATED, Json(project)))
}

// GET /api/projects
#[utoipa::path(
    get,
    path = "/api/projects",
    tag = "Projects",
    responses(
        (status = 200, description = "Lista de projetos", body = Vec<Project>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_projects(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let projects = app_state
        .project_service
        .list_projects(&app_state.db_pool)
        .await?;

    Ok((StatusCode::OK, Json(projects)))
}

// GET /api/projects/{id}
#[utoipa::path(
    get,
    path = "/api/projects/{id}",
    tag = "Projects",
    params(("id" = Uuid, Path, description = "ID do projeto")),
    responses(
        (status = 200, description = "Projeto", body = Project),
        (status = 404, description = "Não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_project(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let project = app_state
        .project_service
        .get_project(&app_state.db_pool, id)
        .await?;

    Ok((StatusCode::OK, Json(project)))
}

// DELETE /api/projects/{id}
#[utoipa::path(
    delete,
    path = "/api/projects/{id}",
    tag = "Projects",
    params(("id" = Uuid, Path, description = "ID do projeto")),
    responses(
        (status = 204, description = "Soft-delete em cascata efetuado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_project(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    require_manager(&user)?;

    app_state
        .project_service
        .delete_project(&app_state.db_pool, id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

// POST /api/projects/{id}/calculate-majority
// Recalcula todos os prédios do projeto; idempotente, serve de manutenção.
#[utoipa::path(
    post,
    path = "/api/projects/{id}/calculate-majority",
    tag = "Projects",
    params(("id" = Uuid, Path, description = "ID do projeto")),
    responses(
        (status = 200, description = "Agregado recalculado", body = ProjectAggregate),
        (status = 404, description = "Não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn calculate_project_majority(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let aggregate = app_state
        .majority_engine
        .calculate_project(&app_state.db_pool, id)
        .await?;

    Ok((StatusCode::OK, Json(aggregate)))
}
