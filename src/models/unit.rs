// src/models/unit.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// Mapeia o CREATE TYPE unit_status do banco.
// NOT_CONTACTED / SIGNED / PARTIALLY_SIGNED são mantidos pela contabilidade
// de assinaturas; os demais são qualitativos, definidos pelo agente.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "unit_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UnitStatus {
    NotContacted,
    Negotiating,
    AgreedToSign,
    Signed,
    PartiallySigned,
    Finalized,
    Refused,
    Inactive,
}

impl UnitStatus {
    /// Status controlados pela contabilidade de assinaturas. Os outros
    /// (NEGOTIATING, REFUSED...) nunca são sobrescritos por ela.
    pub fn is_signature_driven(self) -> bool {
        matches!(
            self,
            UnitStatus::NotContacted | UnitStatus::Signed | UnitStatus::PartiallySigned
        )
    }
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Unit {
    pub id: Uuid,
    pub building_id: Uuid,
    pub floor_number: Option<i16>,
    pub unit_number: String,
    pub area_sqm: Option<Decimal>,

    pub unit_status: UnitStatus,

    // Tallies derivados dos proprietários atuais
    pub total_owners: i32,
    pub owners_signed: i32,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub is_deleted: bool,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateUnitPayload {
    pub building_id: Uuid,

    pub floor_number: Option<i16>,

    #[validate(length(min = 1, max = 10, message = "required"))]
    #[schema(example = "12")]
    pub unit_number: String,

    #[schema(value_type = Option<f64>, example = 84.5)]
    pub area_sqm: Option<Decimal>,
}
