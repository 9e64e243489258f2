// src/db/task_repo.rs

use chrono::NaiveDate;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::task::{Task, TaskPriority, TaskStatus, TaskType},
};

const TASK_COLUMNS: &str = "id, building_id, owner_id, task_type, title, description, \
    assigned_to_user_id, assigned_by_user_id, due_date, status, priority, notes, \
    completed_at, created_at, updated_at";

#[derive(Clone)]
pub struct TaskRepository {
    pool: PgPool,
}

impl TaskRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        building_id: Option<Uuid>,
        owner_id: Option<Uuid>,
        task_type: TaskType,
        title: &str,
        description: Option<&str>,
        assigned_to_user_id: Uuid,
        assigned_by_user_id: Uuid,
        due_date: Option<NaiveDate>,
        priority: TaskPriority,
    ) -> Result<Task, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let task = sqlx::query_as::<_, Task>(&format!(
            r#"
            INSERT INTO tasks (
                building_id, owner_id, task_type, title, description,
                assigned_to_user_id, assigned_by_user_id, due_date, priority
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {TASK_COLUMNS}
            "#
        ))
        .bind(building_id)
        .bind(owner_id)
        .bind(task_type)
        .bind(title)
        .bind(description)
        .bind(assigned_to_user_id)
        .bind(assigned_by_user_id)
        .bind(due_date)
        .bind(priority)
        .fetch_one(executor)
        .await?;

        Ok(task)
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Task>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let task = sqlx::query_as::<_, Task>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(executor)
        .await?;

        Ok(task)
    }

    pub async fn list<'e, E>(
        &self,
        executor: E,
        status: Option<TaskStatus>,
        assigned_to: Option<Uuid>,
    ) -> Result<Vec<Task>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let tasks = sqlx::query_as::<_, Task>(&format!(
            r#"
            SELECT {TASK_COLUMNS} FROM tasks
            WHERE ($1::task_status IS NULL OR status = $1)
              AND ($2::uuid IS NULL OR assigned_to_user_id = $2)
            ORDER BY due_date ASC NULLS LAST, created_at DESC
            "#
        ))
        .bind(status)
        .bind(assigned_to)
        .fetch_all(executor)
        .await?;

        Ok(tasks)
    }

    /// Conclui a tarefa; a nota (ex.: motivo da rejeição) é anexada ao fim
    /// das notas existentes.
    pub async fn complete<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        note: Option<&str>,
    ) -> Result<Task, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let task = sqlx::query_as::<_, Task>(&format!(
            r#"
            UPDATE tasks
            SET status = 'COMPLETED',
                completed_at = NOW(),
                notes = CASE
                    WHEN $2::text IS NULL THEN notes
                    WHEN notes IS NULL THEN $2
                    ELSE notes || E'\n' || $2
                END,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {TASK_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(note)
        .fetch_one(executor)
        .await?;

        Ok(task)
    }

    /// Marca como OVERDUE toda tarefa aberta com prazo vencido e devolve as
    /// linhas afetadas (o checador de alertas gera um alerta por tarefa).
    pub async fn mark_overdue<'e, E>(
        &self,
        executor: E,
        today: NaiveDate,
    ) -> Result<Vec<Task>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let tasks = sqlx::query_as::<_, Task>(&format!(
            r#"
            UPDATE tasks
            SET status = 'OVERDUE', updated_at = NOW()
            WHERE due_date < $1
              AND status IN ('NOT_STARTED', 'IN_PROGRESS', 'BLOCKED')
            RETURNING {TASK_COLUMNS}
            "#
        ))
        .bind(today)
        .fetch_all(executor)
        .await?;

        Ok(tasks)
    }
}
