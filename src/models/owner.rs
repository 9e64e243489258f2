// src/models/owner.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// Mapeia o CREATE TYPE owner_status do banco
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "owner_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OwnerStatus {
    NotContacted,
    PendingSignature,
    Negotiating,
    AgreedToSign,
    WaitForSign,
    Signed,
    Refused,
    Deceased,
    Incapacitated,
}

impl OwnerStatus {
    /// Status de fluxo que um agente pode definir diretamente.
    /// SIGNED e REFUSED são restritos a gerente/admin; SIGNED só entra
    /// pela aprovação da assinatura.
    pub fn agent_may_set(self) -> bool {
        matches!(
            self,
            OwnerStatus::NotContacted
                | OwnerStatus::PendingSignature
                | OwnerStatus::Negotiating
                | OwnerStatus::AgreedToSign
                | OwnerStatus::WaitForSign
        )
    }
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Owner {
    pub id: Uuid,
    pub unit_id: Uuid,
    pub full_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,

    // Quotas dos proprietários atuais de uma unidade somam 100
    // (validado na criação, não continuamente)
    pub ownership_share_percent: Decimal,

    pub owner_status: OwnerStatus,
    pub signature_date: Option<NaiveDate>,
    pub signature_session_id: Option<Uuid>,

    // Proprietários históricos ficam no banco mas fora de toda agregação
    pub is_current_owner: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub is_deleted: bool,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOwnerPayload {
    pub unit_id: Uuid,

    #[validate(length(min = 2, message = "O nome deve ter no mínimo 2 caracteres."))]
    #[schema(example = "Dana Cohen")]
    pub full_name: String,

    #[validate(email(message = "invalid_email"))]
    pub email: Option<String>,
    pub phone: Option<String>,

    #[schema(value_type = f64, example = 50.0)]
    pub ownership_share_percent: Decimal,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOwnerStatusPayload {
    pub owner_status: OwnerStatus,
    // Documento já assinado (upload manual/offline); quando presente junto
    // de WAIT_FOR_SIGN, a assinatura nasce pendente de aprovação
    pub signed_document_id: Option<Uuid>,
}
