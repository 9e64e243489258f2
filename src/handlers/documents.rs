// src/handlers/documents.rs

use axum::{
    extract::{Query, State},
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
    middleware::auth::AuthenticatedUser,
    models::document::{CreateDocumentPayload, Document},
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListDocumentsQuery {
    pub owner_id: Option<Uuid>,
    pub building_id: Option<Uuid>,
    pub project_id: Option<Uuid>,
}

// POST /api/documents
#[utoipa::path(
    post,
    path = "/api/documents",
    tag = "Documents",
    request_body = CreateDocumentPayload,
    responses(
        (status = 201, description = "Metadados registrados", body = Document),
        (status = 404, description = "Proprietário não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_document(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<CreateDocumentPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let document = app_state
        .document_service
        .create(&app_state.db_pool, &payload, user.id)
        .await?;

    Ok((StatusCode::CREATED, Json(document)))
}

// GET /api/documents
#[utoipa::path(
    get,
    path = "/api/documents",
    tag = "Documents",
    params(
        ("ownerId" = Option<Uuid>, Query, description = "Filtra por proprietário"),
        ("buildingId" = Option<Uuid>, Query, description = "Filtra por prédio"),
        ("projectId" = Option<Uuid>, Query, description = "Filtra por projeto")
    ),
    responses(
        (status = 200, description = "Documentos", body = Vec<Document>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_documents(
    State(app_state): State<AppState>,
    Query(query): Query<ListDocumentsQuery>,
) -> Result<impl IntoResponse, AppError> {
    let documents = app_state
        .document_service
        .list(
            &app_state.db_pool,
            query.owner_id,
            query.building_id,
            query.project_id,
        )
        .await?;

    Ok((StatusCode::OK, Json(documents)))
}
