// src/services/alert_service.rs
//
// Checador de limiares: consumidor dos agregados do motor de maioria e das
// idades de tarefas/assinaturas. Não adiciona lógica de agregação própria.

use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{AlertRepository, BuildingRepository, SignatureRepository, TaskRepository},
    models::alert::{Alert, AlertCheckSummary, AlertSeverity, AlertStatus, AlertType},
};

// Assinatura parada em WAIT_FOR_SIGN além disso vira alerta
const STALE_SIGNATURE_DAYS: i64 = 7;

#[derive(Clone)]
pub struct AlertService {
    alerts: AlertRepository,
    buildings: BuildingRepository,
    signatures: SignatureRepository,
    tasks: TaskRepository,
}

impl AlertService {
    pub fn new(
        alerts: AlertRepository,
        buildings: BuildingRepository,
        signatures: SignatureRepository,
        tasks: TaskRepository,
    ) -> Self {
        Self {
            alerts,
            buildings,
            signatures,
            tasks,
        }
    }

    /// Roda todas as checagens. Alertas ATIVOS do mesmo assunto não são
    /// re-emitidos.
    pub async fn run_checks(&self, pool: &PgPool) -> Result<AlertCheckSummary, AppError> {
        let mut created = 0usize;

        // 1. Prédios com farol vermelho (abaixo do limiar crítico)
        let red_buildings = self.buildings.list_red(pool).await?;
        for building in &red_buildings {
            let exists = self
                .alerts
                .exists_active(
                    pool,
                    AlertType::BelowCriticalThreshold,
                    Some(building.id),
                    None,
                    None,
                )
                .await?;
            if !exists {
                self.alerts
                    .create(
                        pool,
                        AlertType::BelowCriticalThreshold,
                        AlertSeverity::High,
                        &format!("Prédio {} abaixo do limiar crítico", building.building_name),
                        &format!(
                            "Percentual de assinaturas em {}% (farol vermelho).",
                            building.signature_percentage
                        ),
                        Some(building.project_id),
                        Some(building.id),
                        None,
                        None,
                        None,
                    )
                    .await?;
                created += 1;
            }
        }

        // 2. Assinaturas paradas em WAIT_FOR_SIGN há mais de 7 dias
        let cutoff = Utc::now() - chrono::Duration::days(STALE_SIGNATURE_DAYS);
        let stale_signatures = self.signatures.list_waiting_older_than(pool, cutoff).await?;
        for signature in &stale_signatures {
            let exists = self
                .alerts
                .exists_active(pool, AlertType::StaleSignature, None, None, Some(signature.id))
                .await?;
            if !exists {
                self.alerts
                    .create(
                        pool,
                        AlertType::StaleSignature,
                        AlertSeverity::Medium,
                        "Assinatura aguardando há mais de 7 dias",
                        &format!(
                            "A assinatura criada em {} continua em WAIT_FOR_SIGN.",
                            signature.created_at.format("%Y-%m-%d")
                        ),
                        None,
                        None,
                        Some(signature.owner_id),
                        None,
                        Some(signature.id),
                    )
                    .await?;
                created += 1;
            }
        }

        // 3. Tarefas com prazo vencido viram OVERDUE e geram alerta
        let overdue_tasks = self.tasks.mark_overdue(pool, Utc::now().date_naive()).await?;
        for task in &overdue_tasks {
            let exists = self
                .alerts
                .exists_active(pool, AlertType::TaskOverdue, None, Some(task.id), None)
                .await?;
            if !exists {
                self.alerts
                    .create(
                        pool,
                        AlertType::TaskOverdue,
                        AlertSeverity::High,
                        &format!("Tarefa vencida: {}", task.title),
                        &format!(
                            "Prazo era {}.",
                            task.due_date.map(|d| d.to_string()).unwrap_or_default()
                        ),
                        None,
                        task.building_id,
                        task.owner_id,
                        Some(task.id),
                        None,
                    )
                    .await?;
                created += 1;
            }
        }

        let summary = AlertCheckSummary {
            buildings_below_critical: red_buildings.len(),
            stale_signatures: stale_signatures.len(),
            overdue_tasks: overdue_tasks.len(),
            alerts_created: created,
        };

        tracing::info!(
            buildings_below_critical = summary.buildings_below_critical,
            stale_signatures = summary.stale_signatures,
            overdue_tasks = summary.overdue_tasks,
            alerts_created = summary.alerts_created,
            "Checagens de alerta concluídas"
        );

        Ok(summary)
    }

    pub async fn list(
        &self,
        pool: &PgPool,
        status: Option<AlertStatus>,
        building_id: Option<Uuid>,
    ) -> Result<Vec<Alert>, AppError> {
        self.alerts.list(pool, status, building_id).await
    }

    pub async fn count_active(&self, pool: &PgPool) -> Result<i64, AppError> {
        self.alerts.count_active(pool).await
    }

    pub async fn acknowledge(
        &self,
        pool: &PgPool,
        alert_id: Uuid,
        user_id: Uuid,
    ) -> Result<Alert, AppError> {
        let alert = self
            .alerts
            .find_by_id(pool, alert_id)
            .await?
            .ok_or(AppError::AlertNotFound)?;

        if alert.status != AlertStatus::Active {
            return Err(AppError::InvalidAlertState(format!(
                "alerta já está {:?}",
                alert.status
            )));
        }

        self.alerts
            .set_status(pool, alert_id, AlertStatus::Acknowledged, user_id)
            .await
    }

    pub async fn resolve(
        &self,
        pool: &PgPool,
        alert_id: Uuid,
        user_id: Uuid,
    ) -> Result<Alert, AppError> {
        let alert = self
            .alerts
            .find_by_id(pool, alert_id)
            .await?
            .ok_or(AppError::AlertNotFound)?;

        if alert.status == AlertStatus::Resolved {
            return Err(AppError::InvalidAlertState("alerta já resolvido".into()));
        }

        self.alerts
            .set_status(pool, alert_id, AlertStatus::Resolved, user_id)
            .await
    }

    pub async fn dismiss(
        &self,
        pool: &PgPool,
        alert_id: Uuid,
        user_id: Uuid,
    ) -> Result<Alert, AppError> {
        let alert = self
            .alerts
            .find_by_id(pool, alert_id)
            .await?
            .ok_or(AppError::AlertNotFound)?;

        if alert.status == AlertStatus::Resolved {
            return Err(AppError::InvalidAlertState(
                "alerta resolvido não pode ser descartado".into(),
            ));
        }

        self.alerts
            .set_status(pool, alert_id, AlertStatus::Dismissed, user_id)
            .await
    }
}
