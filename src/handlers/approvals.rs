// src/handlers/approvals.rs
//
// Fluxo de aprovação de assinaturas. Os endpoints de token (validate/sign)
// são públicos: o token de uso único é a credencial do proprietário.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::{require_manager, AuthenticatedUser},
    models::signature::{
        ApprovalPayload, InitiateSignaturePayload, RejectionPayload, SignByTokenPayload,
        Signature, SigningTokenInfo,
    },
    services::cascade::CascadeOutcome,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaitingQuery {
    pub owner_id: Option<Uuid>,
}

// A ação primária e o resultado (possivelmente degradado) da cascata
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignatureActionResponse {
    pub signature: Signature,
    pub cascade: CascadeOutcome,
}

// POST /api/approvals/signatures/initiate
#[utoipa::path(
    post,
    path = "/api/approvals/signatures/initiate",
    tag = "Approvals",
    request_body = InitiateSignaturePayload,
    responses(
        (status = 201, description = "Assinatura iniciada com token cunhado", body = Signature),
        (status = 404, description = "Proprietário ou documento não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn initiate_signature(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<InitiateSignaturePayload>,
) -> Result<impl IntoResponse, AppError> {
    let signature = app_state
        .signature_service
        .initiate(
            &app_state.db_pool,
            payload.owner_id,
            payload.document_id,
            payload.signed_document_id,
            user.id,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(signature)))
}

// GET /api/approvals/signatures/waiting?ownerId=...
#[utoipa::path(
    get,
    path = "/api/approvals/signatures/waiting",
    tag = "Approvals",
    params(("ownerId" = Option<Uuid>, Query, description = "Filtra por proprietário")),
    responses(
        (status = 200, description = "Assinaturas aguardando o proprietário", body = Vec<Signature>)
    ),
    security(("api_jwt" = []))
)]
pub async fn waiting_signatures(
    State(app_state): State<AppState>,
    Query(query): Query<WaitingQuery>,
) -> Result<impl IntoResponse, AppError> {
    let signatures = app_state
        .signature_service
        .waiting(&app_state.db_pool, query.owner_id)
        .await?;

    Ok((StatusCode::OK, Json(signatures)))
}

// GET /api/approvals/sign/validate/{token} (público)
#[utoipa::path(
    get,
    path = "/api/approvals/sign/validate/{token}",
    tag = "Approvals",
    params(("token" = String, Path, description = "Token do link de assinatura")),
    responses(
        (status = 200, description = "Contexto do token", body = SigningTokenInfo),
        (status = 401, description = "Token desconhecido")
    )
)]
pub async fn validate_signing_token(
    State(app_state): State<AppState>,
    Path(token): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let info = app_state
        .signature_service
        .validate_token(&app_state.db_pool, &token)
        .await?;

    Ok((StatusCode::OK, Json(info)))
}

// POST /api/approvals/sign/{token} (público)
#[utoipa::path(
    post,
    path = "/api/approvals/sign/{token}",
    tag = "Approvals",
    params(("token" = String, Path, description = "Token do link de assinatura")),
    request_body = SignByTokenPayload,
    responses(
        (status = 200, description = "Assinada, pendente de aprovação", body = Signature),
        (status = 400, description = "Assinatura fora de WAIT_FOR_SIGN"),
        (status = 401, description = "Token desconhecido")
    )
)]
pub async fn sign_by_token(
    State(app_state): State<AppState>,
    Path(token): Path<String>,
    Json(payload): Json<SignByTokenPayload>,
) -> Result<impl IntoResponse, AppError> {
    let signature = app_state
        .signature_service
        .sign_by_token(&app_state.db_pool, &token, &payload.signature_data)
        .await?;

    Ok((StatusCode::OK, Json(signature)))
}

// GET /api/approvals/queue
#[utoipa::path(
    get,
    path = "/api/approvals/queue",
    tag = "Approvals",
    responses(
        (status = 200, description = "Assinaturas pendentes de aprovação", body = Vec<Signature>)
    ),
    security(("api_jwt" = []))
)]
pub async fn approval_queue(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    require_manager(&user)?;

    let signatures = app_state
        .signature_service
        .approval_queue(&app_state.db_pool)
        .await?;

    Ok((StatusCode::OK, Json(signatures)))
}

// POST /api/approvals/{id}/approve
#[utoipa::path(
    post,
    path = "/api/approvals/{id}/approve",
    tag = "Approvals",
    params(("id" = Uuid, Path, description = "ID da assinatura")),
    request_body = ApprovalPayload,
    responses(
        (status = 200, description = "Finalizada; cascata executada", body = SignatureActionResponse),
        (status = 400, description = "Assinatura não está pendente de aprovação")
    ),
    security(("api_jwt" = []))
)]
pub async fn approve_signature(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<ApprovalPayload>,
) -> Result<impl IntoResponse, AppError> {
    require_manager(&user)?;

    let (signature, cascade) = app_state
        .signature_service
        .approve(&app_state.db_pool, id, user.id, payload.reason.as_deref())
        .await?;

    Ok((StatusCode::OK, Json(SignatureActionResponse { signature, cascade })))
}

// POST /api/approvals/{id}/reject
#[utoipa::path(
    post,
    path = "/api/approvals/{id}/reject",
    tag = "Approvals",
    params(("id" = Uuid, Path, description = "ID da assinatura")),
    request_body = RejectionPayload,
    responses(
        (status = 200, description = "Rejeitada, devolvida para nova tentativa", body = SignatureActionResponse),
        (status = 400, description = "Motivo curto demais ou transição inválida")
    ),
    security(("api_jwt" = []))
)]
pub async fn reject_signature(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<RejectionPayload>,
) -> Result<impl IntoResponse, AppError> {
    require_manager(&user)?;

    let (signature, cascade) = app_state
        .signature_service
        .reject(&app_state.db_pool, id, user.id, &payload.reason)
        .await?;

    Ok((StatusCode::OK, Json(SignatureActionResponse { signature, cascade })))
}
