// src/models/building.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// O "farol" de consenso de um prédio. GRAY = sem dados.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "traffic_light", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TrafficLight {
    Green,
    Yellow,
    Red,
    Gray,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Building {
    pub id: Uuid,
    pub project_id: Uuid,
    pub building_name: String,
    pub address: Option<String>,

    // Campos derivados: nunca autoritativos, o motor de maioria é o único
    // escritor. Leitores toleram staleness (ver last_calculated_at).
    pub signature_percentage: Decimal,
    pub signature_percentage_by_area: Decimal,
    pub traffic_light_status: TrafficLight,
    pub units_signed: i32,
    pub units_partially_signed: i32,
    pub units_not_signed: i32,
    pub last_calculated_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub is_deleted: bool,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateBuildingPayload {
    pub project_id: Uuid,

    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "Bloco A")]
    pub building_name: String,

    pub address: Option<String>,
}
