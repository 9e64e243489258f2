// src/db/building_repo.rs

use sqlx::{Acquire, Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::building::Building,
    services::majority::BuildingAggregate,
};

const BUILDING_COLUMNS: &str = "id, project_id, building_name, address, \
    signature_percentage, signature_percentage_by_area, traffic_light_status, \
    units_signed, units_partially_signed, units_not_signed, last_calculated_at, \
    created_at, updated_at, is_deleted";

#[derive(Clone)]
pub struct BuildingRepository {
    pool: PgPool,
}

impl BuildingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        project_id: Uuid,
        building_name: &str,
        address: Option<&str>,
    ) -> Result<Building, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let building = sqlx::query_as::<_, Building>(&format!(
            r#"
            INSERT INTO buildings (project_id, building_name, address)
            VALUES ($1, $2, $3)
            RETURNING {BUILDING_COLUMNS}
            "#
        ))
        .bind(project_id)
        .bind(building_name)
        .bind(address)
        .fetch_one(executor)
        .await?;

        Ok(building)
    }

    pub async fn find_by_id<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<Building>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let building = sqlx::query_as::<_, Building>(&format!(
            "SELECT {BUILDING_COLUMNS} FROM buildings WHERE id = $1 AND is_deleted = FALSE"
        ))
        .bind(id)
        .fetch_optional(executor)
        .await?;

        Ok(building)
    }

    pub async fn list_by_project<'e, E>(
        &self,
        executor: E,
        project_id: Uuid,
    ) -> Result<Vec<Building>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let buildings = sqlx::query_as::<_, Building>(&format!(
            r#"
            SELECT {BUILDING_COLUMNS} FROM buildings
            WHERE project_id = $1 AND is_deleted = FALSE
            ORDER BY created_at ASC
            "#
        ))
        .bind(project_id)
        .fetch_all(executor)
        .await?;

        Ok(buildings)
    }

    /// Prédios com farol vermelho (consumidos pelo checador de alertas)
    pub async fn list_red<'e, E>(&self, executor: E) -> Result<Vec<Building>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let buildings = sqlx::query_as::<_, Building>(&format!(
            r#"
            SELECT {BUILDING_COLUMNS} FROM buildings
            WHERE traffic_light_status = 'RED' AND is_deleted = FALSE
            "#
        ))
        .fetch_all(executor)
        .await?;

        Ok(buildings)
    }

    /// Persiste o agregado calculado. Único ponto de escrita dos campos
    /// derivados do prédio; `last_calculated_at` torna o staleness observável.
    pub async fn update_aggregates<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        aggregate: &BuildingAggregate,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            r#"
            UPDATE buildings
            SET signature_percentage = $2,
                signature_percentage_by_area = $3,
                traffic_light_status = $4,
                units_signed = $5,
                units_partially_signed = $6,
                units_not_signed = $7,
                last_calculated_at = NOW(),
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(aggregate.signature_percentage.round_dp(2))
        .bind(aggregate.signature_percentage_by_area.round_dp(2))
        .bind(aggregate.traffic_light)
        .bind(aggregate.units_signed)
        .bind(aggregate.units_partially_signed)
        .bind(aggregate.units_not_signed)
        .execute(executor)
        .await?;

        Ok(())
    }

    /// Soft-delete em cascata: prédio -> unidades -> proprietários
    pub async fn soft_delete_cascade<'e, E>(&self, executor: E, id: Uuid) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let result = sqlx::query(
            "UPDATE buildings SET is_deleted = TRUE, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "UPDATE units SET is_deleted = TRUE, updated_at = NOW() WHERE building_id = $1",
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            UPDATE owners SET is_deleted = TRUE, updated_at = NOW()
            WHERE unit_id IN (SELECT id FROM units WHERE building_id = $1)
            "#,
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(result.rows_affected())
    }
}
