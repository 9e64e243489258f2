// src/db/unit_repo.rs

use rust_decimal::Decimal;
use sqlx::{Acquire, Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::unit::{Unit, UnitStatus},
};

const UNIT_COLUMNS: &str = "id, building_id, floor_number, unit_number, area_sqm, \
    unit_status, total_owners, owners_signed, created_at, updated_at, is_deleted";

#[derive(Clone)]
pub struct UnitRepository {
    pool: PgPool,
}

impl UnitRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        building_id: Uuid,
        floor_number: Option<i16>,
        unit_number: &str,
        area_sqm: Option<Decimal>,
    ) -> Result<Unit, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let unit = sqlx::query_as::<_, Unit>(&format!(
            r#"
            INSERT INTO units (building_id, floor_number, unit_number, area_sqm)
            VALUES ($1, $2, $3, $4)
            RETURNING {UNIT_COLUMNS}
            "#
        ))
        .bind(building_id)
        .bind(floor_number)
        .bind(unit_number)
        .bind(area_sqm)
        .fetch_one(executor)
        .await?;

        Ok(unit)
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Unit>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let unit = sqlx::query_as::<_, Unit>(&format!(
            "SELECT {UNIT_COLUMNS} FROM units WHERE id = $1 AND is_deleted = FALSE"
        ))
        .bind(id)
        .fetch_optional(executor)
        .await?;

        Ok(unit)
    }

    pub async fn list_by_building<'e, E>(
        &self,
        executor: E,
        building_id: Uuid,
    ) -> Result<Vec<Unit>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let units = sqlx::query_as::<_, Unit>(&format!(
            r#"
            SELECT {UNIT_COLUMNS} FROM units
            WHERE building_id = $1 AND is_deleted = FALSE
            ORDER BY unit_number ASC
            "#
        ))
        .bind(building_id)
        .fetch_all(executor)
        .await?;

        Ok(units)
    }

    /// Escreve status + tallies derivados. O chamador (resolvedor de status)
    /// já aplicou a regra de write-back antes de chegar aqui.
    pub async fn update_status_and_tallies<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        status: UnitStatus,
        total_owners: i32,
        owners_signed: i32,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            r#"
            UPDATE units
            SET unit_status = $2, total_owners = $3, owners_signed = $4, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(status)
        .bind(total_owners)
        .bind(owners_signed)
        .execute(executor)
        .await?;

        Ok(())
    }

    /// Soft-delete em cascata: unidade -> proprietários
    pub async fn soft_delete_cascade<'e, E>(&self, executor: E, id: Uuid) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let result =
            sqlx::query("UPDATE units SET is_deleted = TRUE, updated_at = NOW() WHERE id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;

        sqlx::query(
            "UPDATE owners SET is_deleted = TRUE, updated_at = NOW() WHERE unit_id = $1",
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(result.rows_affected())
    }
}
