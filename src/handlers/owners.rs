// src/handlers/owners.rs

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
    models::owner::{CreateOwnerPayload, Owner, UpdateOwnerStatusPayload},
    services::{cascade::CascadeOutcome, owner_service::OwnerStatusUpdate},
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListOwnersQuery {
    pub unit_id: Uuid,
}

// POST /api/owners
#[utoipa::path(
    post,
    path = "/api/owners",
    tag = "Owners",
    request_body = CreateOwnerPayload,
    responses(
        (status = 201, description = "Proprietário criado", body = Owner),
        (status = 400, description = "Soma das quotas passaria de 100%"),
        (status = 404, description = "Unidade não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_owner(
    State(app_state): State<AppState>,
    Json(payload): Json<CreateOwnerPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let owner = app_state
        .owner_service
        .create(&app_state.db_pool, &payload)
        .await?;

    Ok((StatusCode::CREATED, Json(owner)))
}

// GET /api/owners?unitId=...
#[utoipa::path(
    get,
    path = "/api/owners",
    tag = "Owners",
    params(("unitId" = Uuid, Query, description = "ID da unidade")),
    responses(
        (status = 200, description = "Proprietários atuais da unidade", body = Vec<Owner>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_owners(
    State(app_state): State<AppState>,
    Query(query): Query<ListOwnersQuery>,
) -> Result<impl IntoResponse, AppError> {
    let owners = app_state
        .owner_service
        .list_by_unit(&app_state.db_pool, query.unit_id)
        .await?;

    Ok((StatusCode::OK, Json(owners)))
}

// GET /api/owners/{id}
#[utoipa::path(
    get,
    path = "/api/owners/{id}",
    tag = "Owners",
    params(("id" = Uuid, Path, description = "ID do proprietário")),
    responses(
        (status = 200, description = "Proprietário", body = Owner),
        (status = 404, description = "Não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_owner(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let owner = app_state.owner_service.get(&app_state.db_pool, id).await?;

    Ok((StatusCode::OK, Json(owner)))
}

// PUT /api/owners/{id}/status
// Dispara a cascata, exceto para WAIT_FOR_SIGN (adiada até a aprovação).
#[utoipa::path(
    put,
    path = "/api/owners/{id}/status",
    tag = "Owners",
    params(("id" = Uuid, Path, description = "ID do proprietário")),
    request_body = UpdateOwnerStatusPayload,
    responses(
        (status = 200, description = "Status atualizado", body = OwnerStatusUpdate),
        (status = 403, description = "Status restrito a gerente")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_owner_status(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateOwnerStatusPayload>,
) -> Result<impl IntoResponse, AppError> {
    let update = app_state
        .owner_service
        .set_status(
            &app_state.db_pool,
            id,
            payload.owner_status,
            payload.signed_document_id,
            &user,
        )
        .await?;

    Ok((StatusCode::OK, Json(update)))
}

// DELETE /api/owners/{id}
#[utoipa::path(
    delete,
    path = "/api/owners/{id}",
    tag = "Owners",
    params(("id" = Uuid, Path, description = "ID do proprietário")),
    responses(
        (status = 200, description = "Soft-delete efetuado; cascata recalculada", body = CascadeOutcome)
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_owner(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    require_manager(&user)?;

    let outcome = app_state
        .owner_service
        .delete(&app_state.db_pool, id)
        .await?;

    Ok((StatusCode::OK, Json(outcome)))
}
