// src/db/project_repo.rs

use rust_decimal::Decimal;
use sqlx::{Acquire, Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::project::{MajorityCalcType, Project},
};

const PROJECT_COLUMNS: &str = "id, project_name, project_code, description, \
    required_majority_percent, critical_threshold_percent, majority_calc_type, \
    signature_percentage, signature_percentage_by_area, last_calculated_at, \
    created_at, updated_at, is_deleted";

#[derive(Clone)]
pub struct ProjectRepository {
    pool: PgPool,
}

impl ProjectRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        project_name: &str,
        project_code: &str,
        description: Option<&str>,
        required_majority_percent: Decimal,
        critical_threshold_percent: Decimal,
        majority_calc_type: MajorityCalcType,
    ) -> Result<Project, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let project = sqlx::query_as::<_, Project>(&format!(
            r#"
            INSERT INTO projects (
                project_name, project_code, description,
                required_majority_percent, critical_threshold_percent, majority_calc_type
            )
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {PROJECT_COLUMNS}
            "#
        ))
        .bind(project_name)
        .bind(project_code)
        .bind(description)
        .bind(required_majority_percent)
        .bind(critical_threshold_percent)
        .bind(majority_calc_type)
        .fetch_one(executor)
        .await?;

        Ok(project)
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Project>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let project = sqlx::query_as::<_, Project>(&format!(
            "SELECT {PROJECT_COLUMNS} FROM projects WHERE id = $1 AND is_deleted = FALSE"
        ))
        .bind(id)
        .fetch_optional(executor)
        .await?;

        Ok(project)
    }

    pub async fn list<'e, E>(&self, executor: E) -> Result<Vec<Project>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let projects = sqlx::query_as::<_, Project>(&format!(
            "SELECT {PROJECT_COLUMNS} FROM projects WHERE is_deleted = FALSE ORDER BY created_at ASC"
        ))
        .fetch_all(executor)
        .await?;

        Ok(projects)
    }

    /// Persiste o cache agregado do projeto. Escrito somente pelo motor de
    /// maioria; `last_calculated_at` torna o staleness observável.
    pub async fn update_aggregates<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        signature_percentage: Decimal,
        signature_percentage_by_area: Decimal,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            r#"
            UPDATE projects
            SET signature_percentage = $2,
                signature_percentage_by_area = $3,
                last_calculated_at = NOW(),
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(signature_percentage)
        .bind(signature_percentage_by_area)
        .execute(executor)
        .await?;

        Ok(())
    }

    /// Soft-delete em cascata: projeto -> prédios -> unidades -> proprietários.
    /// Nunca removemos linhas de verdade.
    pub async fn soft_delete_cascade<'e, E>(&self, executor: E, id: Uuid) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let result = sqlx::query(
            "UPDATE projects SET is_deleted = TRUE, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "UPDATE buildings SET is_deleted = TRUE, updated_at = NOW() WHERE project_id = $1",
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            UPDATE units SET is_deleted = TRUE, updated_at = NOW()
            WHERE building_id IN (SELECT id FROM buildings WHERE project_id = $1)
            "#,
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            UPDATE owners SET is_deleted = TRUE, updated_at = NOW()
            WHERE unit_id IN (
                SELECT u.id FROM units u
                JOIN buildings b ON b.id = u.building_id
                WHERE b.project_id = $1
            )
            "#,
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(result.rows_affected())
    }
}
