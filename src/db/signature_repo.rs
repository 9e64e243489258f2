// src/db/signature_repo.rs

use chrono::{DateTime, Utc};
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::signature::{Signature, SignatureStatus},
};

const SIGNATURE_COLUMNS: &str = "id, document_id, owner_id, signature_status, \
    signing_token, signature_data, signed_at, signed_document_id, task_id, \
    approved_by_user_id, approved_at, approval_reason, \
    rejected_by_user_id, rejected_at, rejection_reason, created_at, updated_at";

#[derive(Clone)]
pub struct SignatureRepository {
    pool: PgPool,
}

impl SignatureRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        document_id: Uuid,
        owner_id: Uuid,
        status: SignatureStatus,
        signing_token: &str,
        signed_at: Option<DateTime<Utc>>,
        signed_document_id: Option<Uuid>,
    ) -> Result<Signature, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let signature = sqlx::query_as::<_, Signature>(&format!(
            r#"
            INSERT INTO document_signatures (
                document_id, owner_id, signature_status, signing_token,
                signed_at, signed_document_id
            )
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {SIGNATURE_COLUMNS}
            "#
        ))
        .bind(document_id)
        .bind(owner_id)
        .bind(status)
        .bind(signing_token)
        .bind(signed_at)
        .bind(signed_document_id)
        .fetch_one(executor)
        .await?;

        Ok(signature)
    }

    pub async fn find_by_id<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<Signature>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let signature = sqlx::query_as::<_, Signature>(&format!(
            "SELECT {SIGNATURE_COLUMNS} FROM document_signatures WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(executor)
        .await?;

        Ok(signature)
    }

    pub async fn find_by_token<'e, E>(
        &self,
        executor: E,
        token: &str,
    ) -> Result<Option<Signature>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let signature = sqlx::query_as::<_, Signature>(&format!(
            "SELECT {SIGNATURE_COLUMNS} FROM document_signatures WHERE signing_token = $1"
        ))
        .bind(token)
        .fetch_optional(executor)
        .await?;

        Ok(signature)
    }

    /// Sessão ainda ativa (não-terminal) do proprietário, a mais recente
    pub async fn find_active_by_owner<'e, E>(
        &self,
        executor: E,
        owner_id: Uuid,
    ) -> Result<Option<Signature>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let signature = sqlx::query_as::<_, Signature>(&format!(
            r#"
            SELECT {SIGNATURE_COLUMNS} FROM document_signatures
            WHERE owner_id = $1
              AND signature_status IN ('WAIT_FOR_SIGN', 'SIGNED_PENDING_APPROVAL')
            ORDER BY created_at DESC
            LIMIT 1
            "#
        ))
        .bind(owner_id)
        .fetch_optional(executor)
        .await?;

        Ok(signature)
    }

    pub async fn list_by_status<'e, E>(
        &self,
        executor: E,
        status: SignatureStatus,
        owner_id: Option<Uuid>,
    ) -> Result<Vec<Signature>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let signatures = sqlx::query_as::<_, Signature>(&format!(
            r#"
            SELECT {SIGNATURE_COLUMNS} FROM document_signatures
            WHERE signature_status = $1
              AND ($2::uuid IS NULL OR owner_id = $2)
            ORDER BY created_at DESC
            "#
        ))
        .bind(status)
        .bind(owner_id)
        .fetch_all(executor)
        .await?;

        Ok(signatures)
    }

    /// Assinaturas paradas em WAIT_FOR_SIGN desde antes do corte
    pub async fn list_waiting_older_than<'e, E>(
        &self,
        executor: E,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<Signature>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let signatures = sqlx::query_as::<_, Signature>(&format!(
            r#"
            SELECT {SIGNATURE_COLUMNS} FROM document_signatures
            WHERE signature_status = 'WAIT_FOR_SIGN' AND created_at < $1
            ORDER BY created_at ASC
            "#
        ))
        .bind(cutoff)
        .fetch_all(executor)
        .await?;

        Ok(signatures)
    }

    /// Proprietário assinou: WAIT_FOR_SIGN -> SIGNED_PENDING_APPROVAL
    pub async fn mark_signed<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        signature_data: &str,
    ) -> Result<Signature, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let signature = sqlx::query_as::<_, Signature>(&format!(
            r#"
            UPDATE document_signatures
            SET signature_status = 'SIGNED_PENDING_APPROVAL',
                signature_data = $2,
                signed_at = NOW(),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {SIGNATURE_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(signature_data)
        .fetch_one(executor)
        .await?;

        Ok(signature)
    }

    /// Gerente aprovou: SIGNED_PENDING_APPROVAL -> FINALIZED
    pub async fn mark_approved<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        approved_by: Uuid,
        reason: Option<&str>,
    ) -> Result<Signature, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let signature = sqlx::query_as::<_, Signature>(&format!(
            r#"
            UPDATE document_signatures
            SET signature_status = 'FINALIZED',
                approved_by_user_id = $2,
                approved_at = NOW(),
                approval_reason = $3,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {SIGNATURE_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(approved_by)
        .bind(reason)
        .fetch_one(executor)
        .await?;

        Ok(signature)
    }

    /// Gerente rejeitou: volta para WAIT_FOR_SIGN com motivo registrado
    pub async fn mark_rejected<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        rejected_by: Uuid,
        reason: &str,
    ) -> Result<Signature, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let signature = sqlx::query_as::<_, Signature>(&format!(
            r#"
            UPDATE document_signatures
            SET signature_status = 'WAIT_FOR_SIGN',
                rejected_by_user_id = $2,
                rejected_at = NOW(),
                rejection_reason = $3,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {SIGNATURE_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(rejected_by)
        .bind(reason)
        .fetch_one(executor)
        .await?;

        Ok(signature)
    }

    /// Atualiza o documento assinado anexado (upload manual tardio)
    pub async fn set_signed_document<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        signed_document_id: Uuid,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            r#"
            UPDATE document_signatures
            SET signed_document_id = $2,
                signature_status = 'SIGNED_PENDING_APPROVAL',
                signed_at = COALESCE(signed_at, NOW()),
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(signed_document_id)
        .execute(executor)
        .await?;

        Ok(())
    }

    /// Vínculo bidirecional Assinatura -> Tarefa de aprovação
    pub async fn link_task<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        task_id: Uuid,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            "UPDATE document_signatures SET task_id = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(task_id)
        .execute(executor)
        .await?;

        Ok(())
    }
}
