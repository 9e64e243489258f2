// src/services/task_service.rs

use chrono::Utc;
use sqlx::{Acquire, Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{BuildingRepository, TaskRepository, UnitRepository, UserRepository},
    models::{
        owner::Owner,
        task::{Task, TaskPriority, TaskStatus, TaskType},
    },
};

// Prazo da tarefa de aprovação de assinatura
const APPROVAL_DUE_DAYS: i64 = 2;

#[derive(Clone)]
pub struct TaskService {
    tasks: TaskRepository,
    users: UserRepository,
    units: UnitRepository,
    buildings: BuildingRepository,
}

impl TaskService {
    pub fn new(
        tasks: TaskRepository,
        users: UserRepository,
        units: UnitRepository,
        buildings: BuildingRepository,
    ) -> Self {
        Self {
            tasks,
            users,
            units,
            buildings,
        }
    }

    /// Cria a tarefa MANAGER_REVIEW para aprovar a assinatura de um
    /// proprietário: atribuída ao primeiro gerente/admin ativo, prazo de
    /// 2 dias, prioridade HIGH.
    pub async fn create_signature_approval_task<'e, E>(
        &self,
        executor: E,
        owner: &Owner,
        requested_by: Option<Uuid>,
    ) -> Result<Task, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let unit = self
            .units
            .find_by_id(&mut *tx, owner.unit_id)
            .await?
            .ok_or(AppError::UnitNotFound)?;

        let building = self
            .buildings
            .find_by_id(&mut *tx, unit.building_id)
            .await?
            .ok_or(AppError::BuildingNotFound)?;

        let managers = self.users.find_active_managers(&mut *tx).await?;
        let manager = managers.first().ok_or_else(|| {
            anyhow::anyhow!("Nenhum gerente ou admin ativo para receber a tarefa de aprovação")
        })?;

        let due_date = Utc::now().date_naive() + chrono::Duration::days(APPROVAL_DUE_DAYS);
        let title = format!("Aprovar assinatura de {}", owner.full_name);
        let description = format!(
            "Solicitação para marcar {} (unidade {}, prédio {}) como SIGNED.",
            owner.full_name, unit.unit_number, building.building_name
        );

        let task = self
            .tasks
            .create(
                &mut *tx,
                Some(unit.building_id),
                Some(owner.id),
                TaskType::ManagerReview,
                &title,
                Some(&description),
                manager.id,
                requested_by.unwrap_or(manager.id),
                Some(due_date),
                TaskPriority::High,
            )
            .await?;

        tx.commit().await?;

        tracing::info!(
            task_id = %task.id,
            owner_id = %owner.id,
            assigned_to = %manager.id,
            "Tarefa de aprovação de assinatura criada"
        );

        Ok(task)
    }

    /// Conclui a tarefa dentro da transação do chamador,
    /// anexando a nota (ex.: motivo da rejeição) às notas existentes.
    pub async fn complete_linked<'e, E>(
        &self,
        executor: E,
        task_id: Uuid,
        note: Option<&str>,
    ) -> Result<Task, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.tasks.complete(executor, task_id, note).await
    }

    pub async fn complete(
        &self,
        pool: &PgPool,
        task_id: Uuid,
        note: Option<&str>,
    ) -> Result<Task, AppError> {
        self.tasks
            .find_by_id(pool, task_id)
            .await?
            .ok_or(AppError::TaskNotFound)?;

        self.tasks.complete(pool, task_id, note).await
    }

    pub async fn list(
        &self,
        pool: &PgPool,
        status: Option<TaskStatus>,
        assigned_to: Option<Uuid>,
    ) -> Result<Vec<Task>, AppError> {
        self.tasks.list(pool, status, assigned_to).await
    }
}
