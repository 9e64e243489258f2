// src/handlers/buildings.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::{require_manager, AuthenticatedUser},
    models::building::{Building, CreateBuildingPayload},
    services::majority::BuildingAggregate,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListBuildingsQuery {
    pub project_id: Uuid,
}

// POST /api/buildings
#[utoipa::path(
    post,
    path = "/api/buildings",
    tag = "Buildings",
    request_body = CreateBuildingPayload,
    responses(
        (status = 201, description = "Prédio criado", body = Building),
        (status = 404, description = "Projeto não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_building(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<CreateBuildingPayload>,
) -> Result<impl IntoResponse, AppError> {
    require_manager(&user)?;
    payload.validate()?;

    let building = app_state
        .project_service
        .create_building(&app_state.db_pool, &payload)
        .await?;

    Ok((StatusCode::CREATED, Json(building)))
}

// GET /api/buildings?projectId=...
#[utoipa::path(
    get,
    path = "/api/buildings",
    tag = "Buildings",
    params(("projectId" = Uuid, Query, description = "ID do projeto")),
    responses(
        (status = 200, description = "Prédios do projeto", body = Vec<Building>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_buildings(
    State(app_state): State<AppState>,
    Query(query): Query<ListBuildingsQuery>,
) -> Result<impl IntoResponse, AppError> {
    let buildings = app_state
        .project_service
        .list_buildings(&app_state.db_pool, query.project_id)
        .await?;

    Ok((StatusCode::OK, Json(buildings)))
}

// GET /api/buildings/{id}
#[utoipa::path(
    get,
    path = "/api/buildings/{id}",
    tag = "Buildings",
    params(("id" = Uuid, Path, description = "ID do prédio")),
    responses(
        (status = 200, description = "Prédio", body = Building),
        (status = 404, description = "Não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_building(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let building = app_state
        .project_service
        .get_building(&app_state.db_pool, id)
        .await?;

    Ok((StatusCode::OK, Json(building)))
}

// DELETE /api/buildings/{id}
#[utoipa::path(
    delete,
    path = "/api/buildings/{id}",
    tag = "Buildings",
    params(("id" = Uuid, Path, description = "ID do prédio")),
    responses(
        (status = 204, description = "Soft-delete em cascata efetuado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_building(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    require_manager(&user)?;

    app_state
        .project_service
        .delete_building(&app_state.db_pool, id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

// POST /api/buildings/{id}/calculate-majority
// Recalcula o agregado do prédio; idempotente, serve de manutenção/reparo.
#[utoipa::path(
    post,
    path = "/api/buildings/{id}/calculate-majority",
    tag = "Buildings",
    params(("id" = Uuid, Path, description = "ID do prédio")),
    responses(
        (status = 200, description = "Agregado recalculado", body = BuildingAggregate),
        (status = 404, description = "Não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn calculate_building_majority(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let aggregate = app_state
        .majority_engine
        .calculate_building(&app_state.db_pool, id)
        .await?;

    Ok((StatusCode::OK, Json(aggregate)))
}
