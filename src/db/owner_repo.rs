// src/db/owner_repo.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::owner::{Owner, OwnerStatus},
};

const OWNER_COLUMNS: &str = "id, unit_id, full_name, email, phone, \
    ownership_share_percent, owner_status, signature_date, signature_session_id, \
    is_current_owner, created_at, updated_at, is_deleted";

#[derive(Clone)]
pub struct OwnerRepository {
    pool: PgPool,
}

impl OwnerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        unit_id: Uuid,
        full_name: &str,
        email: Option<&str>,
        phone: Option<&str>,
        ownership_share_percent: Decimal,
    ) -> Result<Owner, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let owner = sqlx::query_as::<_, Owner>(&format!(
            r#"
            INSERT INTO owners (unit_id, full_name, email, phone, ownership_share_percent)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {OWNER_COLUMNS}
            "#
        ))
        .bind(unit_id)
        .bind(full_name)
        .bind(email)
        .bind(phone)
        .bind(ownership_share_percent)
        .fetch_one(executor)
        .await?;

        Ok(owner)
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Owner>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let owner = sqlx::query_as::<_, Owner>(&format!(
            "SELECT {OWNER_COLUMNS} FROM owners WHERE id = $1 AND is_deleted = FALSE"
        ))
        .bind(id)
        .fetch_optional(executor)
        .await?;

        Ok(owner)
    }

    /// Proprietários ATUAIS de uma unidade. Históricos (is_current_owner =
    /// FALSE) ficam fora de toda agregação.
    pub async fn list_current_by_unit<'e, E>(
        &self,
        executor: E,
        unit_id: Uuid,
    ) -> Result<Vec<Owner>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let owners = sqlx::query_as::<_, Owner>(&format!(
            r#"
            SELECT {OWNER_COLUMNS} FROM owners
            WHERE unit_id = $1 AND is_deleted = FALSE AND is_current_owner = TRUE
            ORDER BY created_at ASC
            "#
        ))
        .bind(unit_id)
        .fetch_all(executor)
        .await?;

        Ok(owners)
    }

    /// Soma das quotas dos proprietários atuais (validação de criação)
    pub async fn sum_current_shares<'e, E>(
        &self,
        executor: E,
        unit_id: Uuid,
    ) -> Result<Decimal, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let row: (Option<Decimal>,) = sqlx::query_as(
            r#"
            SELECT SUM(ownership_share_percent) FROM owners
            WHERE unit_id = $1 AND is_deleted = FALSE AND is_current_owner = TRUE
            "#,
        )
        .bind(unit_id)
        .fetch_one(executor)
        .await?;

        Ok(row.0.unwrap_or(Decimal::ZERO))
    }

    pub async fn update_status<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        status: OwnerStatus,
        signature_date: Option<NaiveDate>,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            r#"
            UPDATE owners
            SET owner_status = $2,
                signature_date = COALESCE($3, signature_date),
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(status)
        .bind(signature_date)
        .execute(executor)
        .await?;

        Ok(())
    }

    /// Vincula o proprietário à sessão de assinatura mais recente
    pub async fn link_signature_session<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        signature_id: Uuid,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            "UPDATE owners SET signature_session_id = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(signature_id)
        .execute(executor)
        .await?;

        Ok(())
    }

    pub async fn soft_delete<'e, E>(&self, executor: E, id: Uuid) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result =
            sqlx::query("UPDATE owners SET is_deleted = TRUE, updated_at = NOW() WHERE id = $1")
                .bind(id)
                .execute(executor)
                .await?;

        Ok(result.rows_affected())
    }
}
