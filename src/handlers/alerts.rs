// src/handlers/alerts.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::{require_manager, AuthenticatedUser},
    models::alert::{Alert, AlertCheckSummary, AlertStatus},
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListAlertsQuery {
    pub status: Option<AlertStatus>,
    pub building_id: Option<Uuid>,
}

// GET /api/alerts
#[utoipa::path(
    get,
    path = "/api/alerts",
    tag = "Alerts",
    params(
        ("status" = Option<String>, Query, description = "Filtra por status"),
        ("buildingId" = Option<Uuid>, Query, description = "Filtra por prédio")
    ),
    responses(
        (status = 200, description = "Alertas", body = Vec<Alert>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_alerts(
    State(app_state): State<AppState>,
    Query(query): Query<ListAlertsQuery>,
) -> Result<impl IntoResponse, AppError> {
    let alerts = app_state
        .alert_service
        .list(&app_state.db_pool, query.status, query.building_id)
        .await?;

    Ok((StatusCode::OK, Json(alerts)))
}

// GET /api/alerts/count
#[utoipa::path(
    get,
    path = "/api/alerts/count",
    tag = "Alerts",
    responses(
        (status = 200, description = "Total de alertas ativos")
    ),
    security(("api_jwt" = []))
)]
pub async fn count_alerts(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let count = app_state.alert_service.count_active(&app_state.db_pool).await?;

    Ok((StatusCode::OK, Json(json!({ "count": count }))))
}

// POST /api/alerts/{id}/acknowledge
#[utoipa::path(
    post,
    path = "/api/alerts/{id}/acknowledge",
    tag = "Alerts",
    params(("id" = Uuid, Path, description = "ID do alerta")),
    responses(
        (status = 200, description = "Alerta reconhecido", body = Alert),
        (status = 400, description = "Alerta não está ativo")
    ),
    security(("api_jwt" = []))
)]
pub async fn acknowledge_alert(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let alert = app_state
        .alert_service
        .acknowledge(&app_state.db_pool, id, user.id)
        .await?;

    Ok((StatusCode::OK, Json(alert)))
}

// POST /api/alerts/{id}/resolve
#[utoipa::path(
    post,
    path = "/api/alerts/{id}/resolve",
    tag = "Alerts",
    params(("id" = Uuid, Path, description = "ID do alerta")),
    responses(
        (status = 200, description = "Alerta resolvido", body = Alert),
        (status = 403, description = "Apenas gerentes resolvem alertas")
    ),
    security(("api_jwt" = []))
)]
pub async fn resolve_alert(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    require_manager(&user)?;

    let alert = app_state
        .alert_service
        .resolve(&app_state.db_pool, id, user.id)
        .await?;

    Ok((StatusCode::OK, Json(alert)))
}

// POST /api/alerts/{id}/dismiss
#[utoipa::path(
    post,
    path = "/api/alerts/{id}/dismiss",
    tag = "Alerts",
    params(("id" = Uuid, Path, description = "ID do alerta")),
    responses(
        (status = 200, description = "Alerta descartado", body = Alert)
    ),
    security(("api_jwt" = []))
)]
pub async fn dismiss_alert(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let alert = app_state
        .alert_service
        .dismiss(&app_state.db_pool, id, user.id)
        .await?;

    Ok((StatusCode::OK, Json(alert)))
}

// POST /api/alerts/check
// Disparo manual das checagens (o agendador externo chama o mesmo endpoint)
#[utoipa::path(
    post,
    path = "/api/alerts/check",
    tag = "Alerts",
    responses(
        (status = 200, description = "Resumo das checagens", body = AlertCheckSummary),
        (status = 403, description = "Apenas gerentes disparam checagens")
    ),
    security(("api_jwt" = []))
)]
pub async fn run_alert_checks(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    require_manager(&user)?;

    let summary = app_state.alert_service.run_checks(&app_state.db_pool).await?;

    Ok((StatusCode::OK, Json(summary)))
}
