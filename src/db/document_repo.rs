// src/db/document_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::document::{Document, DocumentType},
};

const DOCUMENT_COLUMNS: &str = "id, owner_id, building_id, project_id, document_type, \
    file_name, description, uploaded_by_user_id, created_at, is_deleted";

#[derive(Clone)]
pub struct DocumentRepository {
    pool: PgPool,
}

impl DocumentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        owner_id: Option<Uuid>,
        building_id: Option<Uuid>,
        project_id: Option<Uuid>,
        document_type: DocumentType,
        file_name: &str,
        description: Option<&str>,
        uploaded_by_user_id: Option<Uuid>,
    ) -> Result<Document, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let document = sqlx::query_as::<_, Document>(&format!(
            r#"
            INSERT INTO documents (
                owner_id, building_id, project_id, document_type,
                file_name, description, uploaded_by_user_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {DOCUMENT_COLUMNS}
            "#
        ))
        .bind(owner_id)
        .bind(building_id)
        .bind(project_id)
        .bind(document_type)
        .bind(file_name)
        .bind(description)
        .bind(uploaded_by_user_id)
        .fetch_one(executor)
        .await?;

        Ok(document)
    }

    pub async fn find_by_id<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<Document>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let document = sqlx::query_as::<_, Document>(&format!(
            "SELECT {DOCUMENT_COLUMNS} FROM documents WHERE id = $1 AND is_deleted = FALSE"
        ))
        .bind(id)
        .fetch_optional(executor)
        .await?;

        Ok(document)
    }

    /// Contrato mais antigo do proprietário (usado como documento padrão do
    /// fluxo de assinatura disparado por mudança de status)
    pub async fn find_contract_by_owner<'e, E>(
        &self,
        executor: E,
        owner_id: Uuid,
    ) -> Result<Option<Document>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let document = sqlx::query_as::<_, Document>(&format!(
            r#"
            SELECT {DOCUMENT_COLUMNS} FROM documents
            WHERE owner_id = $1 AND document_type = 'CONTRACT' AND is_deleted = FALSE
            ORDER BY created_at ASC
            LIMIT 1
            "#
        ))
        .bind(owner_id)
        .fetch_optional(executor)
        .await?;

        Ok(document)
    }

    pub async fn list<'e, E>(
        &self,
        executor: E,
        owner_id: Option<Uuid>,
        building_id: Option<Uuid>,
        project_id: Option<Uuid>,
    ) -> Result<Vec<Document>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let documents = sqlx::query_as::<_, Document>(&format!(
            r#"
            SELECT {DOCUMENT_COLUMNS} FROM documents
            WHERE is_deleted = FALSE
              AND ($1::uuid IS NULL OR owner_id = $1)
              AND ($2::uuid IS NULL OR building_id = $2)
              AND ($3::uuid IS NULL OR project_id = $3)
            ORDER BY created_at DESC
            "#
        ))
        .bind(owner_id)
        .bind(building_id)
        .bind(project_id)
        .fetch_all(executor)
        .await?;

        Ok(documents)
    }
}
