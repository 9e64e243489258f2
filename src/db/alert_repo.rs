// src/db/alert_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::alert::{Alert, AlertSeverity, AlertStatus, AlertType},
};

const ALERT_COLUMNS: &str = "id, alert_type, severity, title, message, \
    project_id, building_id, owner_id, task_id, signature_id, status, \
    acknowledged_by_user_id, acknowledged_at, resolved_by_user_id, resolved_at, created_at";

#[derive(Clone)]
pub struct AlertRepository {
    pool: PgPool,
}

impl AlertRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        alert_type: AlertType,
        severity: AlertSeverity,
        title: &str,
        message: &str,
        project_id: Option<Uuid>,
        building_id: Option<Uuid>,
        owner_id: Option<Uuid>,
        task_id: Option<Uuid>,
        signature_id: Option<Uuid>,
    ) -> Result<Alert, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let alert = sqlx::query_as::<_, Alert>(&format!(
            r#"
            INSERT INTO alerts (
                alert_type, severity, title, message,
                project_id, building_id, owner_id, task_id, signature_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {ALERT_COLUMNS}
            "#
        ))
        .bind(alert_type)
        .bind(severity)
        .bind(title)
        .bind(message)
        .bind(project_id)
        .bind(building_id)
        .bind(owner_id)
        .bind(task_id)
        .bind(signature_id)
        .fetch_one(executor)
        .await?;

        Ok(alert)
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Alert>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let alert = sqlx::query_as::<_, Alert>(&format!(
            "SELECT {ALERT_COLUMNS} FROM alerts WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(executor)
        .await?;

        Ok(alert)
    }

    pub async fn list<'e, E>(
        &self,
        executor: E,
        status: Option<AlertStatus>,
        building_id: Option<Uuid>,
    ) -> Result<Vec<Alert>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let alerts = sqlx::query_as::<_, Alert>(&format!(
            r#"
            SELECT {ALERT_COLUMNS} FROM alerts
            WHERE ($1::alert_status IS NULL OR status = $1)
              AND ($2::uuid IS NULL OR building_id = $2)
            ORDER BY created_at DESC
            "#
        ))
        .bind(status)
        .bind(building_id)
        .fetch_all(executor)
        .await?;

        Ok(alerts)
    }

    pub async fn count_active<'e, E>(&self, executor: E) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let row: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM alerts WHERE status = 'ACTIVE'")
                .fetch_one(executor)
                .await?;

        Ok(row.0)
    }

    /// Dedup: já existe alerta ATIVO deste tipo para o mesmo assunto?
    pub async fn exists_active<'e, E>(
        &self,
        executor: E,
        alert_type: AlertType,
        building_id: Option<Uuid>,
        task_id: Option<Uuid>,
        signature_id: Option<Uuid>,
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let row: (bool,) = sqlx::query_as(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM alerts
                WHERE alert_type = $1
                  AND status = 'ACTIVE'
                  AND ($2::uuid IS NULL OR building_id = $2)
                  AND ($3::uuid IS NULL OR task_id = $3)
                  AND ($4::uuid IS NULL OR signature_id = $4)
            )
            "#,
        )
        .bind(alert_type)
        .bind(building_id)
        .bind(task_id)
        .bind(signature_id)
        .fetch_one(executor)
        .await?;

        Ok(row.0)
    }

    pub async fn set_status<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        status: AlertStatus,
        user_id: Uuid,
    ) -> Result<Alert, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let alert = sqlx::query_as::<_, Alert>(&format!(
            r#"
            UPDATE alerts
            SET status = $2,
                acknowledged_by_user_id = CASE
                    WHEN $2 IN ('ACKNOWLEDGED', 'DISMISSED') THEN $3
                    ELSE acknowledged_by_user_id
                END,
                acknowledged_at = CASE
                    WHEN $2 IN ('ACKNOWLEDGED', 'DISMISSED') THEN NOW()
                    ELSE acknowledged_at
                END,
                resolved_by_user_id = CASE WHEN $2 = 'RESOLVED' THEN $3 ELSE resolved_by_user_id END,
                resolved_at = CASE WHEN $2 = 'RESOLVED' THEN NOW() ELSE resolved_at END
            WHERE id = $1
            RETURNING {ALERT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(status)
        .bind(user_id)
        .fetch_one(executor)
        .await?;

        Ok(alert)
    }
}
