// src/models/project.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// Mapeia o CREATE TYPE majority_calc_type do banco
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "majority_calc_type", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MajorityCalcType {
    Headcount,
    Area,
    Weighted,
    Custom,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: Uuid,
    pub project_name: String,
    pub project_code: String,
    pub description: Option<String>,

    // Limiares de consenso: o farol do prédio é classificado contra eles.
    // Invariante (também no banco): critical <= required.
    pub required_majority_percent: Decimal,
    pub critical_threshold_percent: Decimal,
    pub majority_calc_type: MajorityCalcType,

    // Campos derivados: o motor de maioria é o único escritor
    pub signature_percentage: Decimal,
    pub signature_percentage_by_area: Decimal,
    pub last_calculated_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub is_deleted: bool,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectPayload {
    #[validate(length(min = 2, message = "O nome deve ter no mínimo 2 caracteres."))]
    #[schema(example = "Retrofit Edifício Aurora")]
    pub project_name: String,

    #[validate(length(min = 2, message = "O código deve ter no mínimo 2 caracteres."))]
    #[schema(example = "AURORA-01")]
    pub project_code: String,

    pub description: Option<String>,

    #[schema(value_type = f64, example = 66.67)]
    pub required_majority_percent: Decimal,

    #[schema(value_type = f64, example = 50.0)]
    pub critical_threshold_percent: Decimal,

    pub majority_calc_type: MajorityCalcType,
}
