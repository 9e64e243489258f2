// src/models/document.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "document_type", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentType {
    Contract,
    IdCard,
    Signature,
    RenovationPlan,
    Permit,
    Other,
}

// Somente metadados: o arquivo em si vive no serviço de storage externo
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: Uuid,
    pub owner_id: Option<Uuid>,
    pub building_id: Option<Uuid>,
    pub project_id: Option<Uuid>,
    pub document_type: DocumentType,
    pub file_name: String,
    pub description: Option<String>,
    pub uploaded_by_user_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub is_deleted: bool,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateDocumentPayload {
    pub owner_id: Option<Uuid>,
    pub building_id: Option<Uuid>,
    pub project_id: Option<Uuid>,
    pub document_type: DocumentType,

    #[validate(length(min = 1, max = 255, message = "required"))]
    #[schema(example = "contrato_reforma.pdf")]
    pub file_name: String,

    pub description: Option<String>,
}
