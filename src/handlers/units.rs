// src/handlers/units.rs

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
    models::unit::{CreateUnitPayload, Unit},
    services::cascade::CascadeOutcome,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListUnitsQuery {
    pub building_id: Uuid,
}

// POST /api/units
#[utoipa::path(
    post,
    path = "/api/units",
    tag = "Units",
    request_body = CreateUnitPayload,
    responses(
        (status = 201, description = "Unidade criada", body = Unit),
        (status = 404, description = "Prédio não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_unit(
    State(app_state): State<AppState>,
    Json(payload): Json<CreateUnitPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let unit = app_state
        .project_service
        .create_unit(&app_state.db_pool, &payload)
        .await?;

    Ok((StatusCode::CREATED, Json(unit)))
}

// GET /api/units?buildingId=...
#[utoipa::path(
    get,
    path = "/api/units",
    tag = "Units",
    params(("buildingId" = Uuid, Query, description = "ID do prédio")),
    responses(
        (status = 200, description = "Unidades do prédio", body = Vec<Unit>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_units(
    State(app_state): State<AppState>,
    Query(query): Query<ListUnitsQuery>,
) -> Result<impl IntoResponse, AppError> {
    let units = app_state
        .project_service
        .list_units(&app_state.db_pool, query.building_id)
        .await?;

    Ok((StatusCode::OK, Json(units)))
}

// GET /api/units/{id}
#[utoipa::path(
    get,
    path = "/api/units/{id}",
    tag = "Units",
    params(("id" = Uuid, Path, description = "ID da unidade")),
    responses(
        (status = 200, description = "Unidade", body = Unit),
        (status = 404, description = "Não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_unit(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let unit = app_state
        .project_service
        .get_unit(&app_state.db_pool, id)
        .await?;

    Ok((StatusCode::OK, Json(unit)))
}

// DELETE /api/units/{id}
#[utoipa::path(
    delete,
    path = "/api/units/{id}",
    tag = "Units",
    params(("id" = Uuid, Path, description = "ID da unidade")),
    responses(
        (status = 204, description = "Soft-delete em cascata efetuado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_unit(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    require_manager(&user)?;

    app_state
        .project_service
        .delete_unit(&app_state.db_pool, id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

// POST /api/units/{id}/recalculate-status
// Rotina de manutenção: re-deriva a unidade e propaga prédio -> projeto.
#[utoipa::path(
    post,
    path = "/api/units/{id}/recalculate-status",
    tag = "Units",
    params(("id" = Uuid, Path, description = "ID da unidade")),
    responses(
        (status = 200, description = "Resultado da cascata", body = CascadeOutcome)
    ),
    security(("api_jwt" = []))
)]
pub async fn recalculate_unit_status(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    require_manager(&user)?;

    let outcome = app_state.cascade.run_for_unit(&app_state.db_pool, id).await;

    Ok((StatusCode::OK, Json(outcome)))
}
