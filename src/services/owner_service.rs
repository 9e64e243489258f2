// src/services/owner_service.rs

use chrono::Utc;
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::PgPool;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{
        BuildingRepository, DocumentRepository, OwnerRepository, SignatureRepository,
        UnitRepository,
    },
    models::{
        auth::User,
        document::DocumentType,
        owner::{CreateOwnerPayload, Owner, OwnerStatus},
        signature::SignatureStatus,
    },
    services::{
        cascade::{CascadeCoordinator, CascadeOutcome},
        task_service::TaskService,
        unit_status::UnitStatusResolver,
    },
};

/// As quotas dos proprietários atuais de uma unidade nunca passam de 100.
/// Validado na criação (não continuamente).
pub fn validate_share_sum(existing_total: Decimal, new_share: Decimal) -> Result<(), AppError> {
    let total = existing_total + new_share;
    if total > Decimal::ONE_HUNDRED {
        return Err(AppError::OwnershipShareExceeded(total));
    }
    Ok(())
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OwnerStatusUpdate {
    pub owner_id: Uuid,
    pub owner_status: OwnerStatus,
    pub spawned_task_id: Option<Uuid>,
    // None quando a cascata foi adiada (WAIT_FOR_SIGN aguarda aprovação)
    pub cascade: Option<CascadeOutcome>,
}

#[derive(Clone)]
pub struct OwnerService {
    owners: OwnerRepository,
    units: UnitRepository,
    buildings: BuildingRepository,
    documents: DocumentRepository,
    signatures: SignatureRepository,
    tasks: TaskService,
    resolver: UnitStatusResolver,
    cascade: CascadeCoordinator,
}

impl OwnerService {
    pub fn new(
        owners: OwnerRepository,
        units: UnitRepository,
        buildings: BuildingRepository,
        documents: DocumentRepository,
        signatures: SignatureRepository,
        tasks: TaskService,
        resolver: UnitStatusResolver,
        cascade: CascadeCoordinator,
    ) -> Self {
        Self {
            owners,
            units,
            buildings,
            documents,
            signatures,
            tasks,
            resolver,
            cascade,
        }
    }

    pub async fn create(
        &self,
        pool: &PgPool,
        payload: &CreateOwnerPayload,
    ) -> Result<Owner, AppError> {
        let mut tx = pool.begin().await?;

        let unit = self
            .units
            .find_by_id(&mut *tx, payload.unit_id)
            .await?
            .ok_or(AppError::UnitNotFound)?;

        let existing_total = self.owners.sum_current_shares(&mut *tx, unit.id).await?;
        validate_share_sum(existing_total, payload.ownership_share_percent)?;

        let owner = self
            .owners
            .create(
                &mut *tx,
                unit.id,
                &payload.full_name,
                payload.email.as_deref(),
                payload.phone.as_deref(),
                payload.ownership_share_percent,
            )
            .await?;

        // Tallies da unidade acompanham a criação na mesma transação
        self.resolver.refresh_unit(&mut *tx, unit.id).await?;

        tx.commit().await?;

        tracing::info!(owner_id = %owner.id, unit_id = %unit.id, "Proprietário criado");

        Ok(owner)
    }

    pub async fn get(&self, pool: &PgPool, owner_id: Uuid) -> Result<Owner, AppError> {
        self.owners
            .find_by_id(pool, owner_id)
            .await?
            .ok_or(AppError::OwnerNotFound)
    }

    pub async fn list_by_unit(&self, pool: &PgPool, unit_id: Uuid) -> Result<Vec<Owner>, AppError> {
        self.units
            .find_by_id(pool, unit_id)
            .await?
            .ok_or(AppError::UnitNotFound)?;

        self.owners.list_current_by_unit(pool, unit_id).await
    }

    /// Mudança direta de status do proprietário.
    ///
    /// - Agentes só definem status de fluxo; SIGNED/REFUSED são de gerente.
    /// - WAIT_FOR_SIGN abre (ou reaproveita) a sessão de assinatura; com
    ///   documento já assinado anexado, ela nasce pendente de aprovação e a
    ///   tarefa do gerente é criada.
    /// - A cascata roda em seguida, EXCETO para WAIT_FOR_SIGN: aí ela fica
    ///   adiada até a aprovação, para não contar assinatura não aprovada.
    pub async fn set_status(
        &self,
        pool: &PgPool,
        owner_id: Uuid,
        new_status: OwnerStatus,
        signed_document_id: Option<Uuid>,
        acting: &User,
    ) -> Result<OwnerStatusUpdate, AppError> {
        if !acting.role.is_manager() && !new_status.agent_may_set() {
            return Err(AppError::Forbidden(format!(
                "Agentes não podem definir o status {:?}. Use WAIT_FOR_SIGN para pedir aprovação.",
                new_status
            )));
        }

        let mut tx = pool.begin().await?;

        let owner = self
            .owners
            .find_by_id(&mut *tx, owner_id)
            .await?
            .ok_or(AppError::OwnerNotFound)?;

        let mut spawned_task_id = None;

        if new_status == OwnerStatus::WaitForSign {
            let signature = match self.signatures.find_active_by_owner(&mut *tx, owner_id).await? {
                Some(existing) => {
                    if let Some(signed_doc) = signed_document_id {
                        self.documents
                            .find_by_id(&mut *tx, signed_doc)
                            .await?
                            .ok_or(AppError::DocumentNotFound)?;
                        self.signatures
                            .set_signed_document(&mut *tx, existing.id, signed_doc)
                            .await?;
                    }
                    self.signatures
                        .find_by_id(&mut *tx, existing.id)
                        .await?
                        .ok_or(AppError::SignatureNotFound)?
                }
                None => {
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

                    // Sem contrato cadastrado: cria um registro placeholder
                    // para ancorar o fluxo de assinatura
                    let document = match self
                        .documents
                        .find_contract_by_owner(&mut *tx, owner_id)
                        .await?
                    {
                        Some(document) => document,
                        None => {
                            self.documents
                                .create(
                                    &mut *tx,
                                    Some(owner_id),
                                    Some(unit.building_id),
                                    Some(building.project_id),
                                    DocumentType::Contract,
                                    "Solicitação de mudança de status",
                                    Some("Registro criado para o fluxo de WAIT_FOR_SIGN"),
                                    Some(acting.id),
                                )
                                .await?
                        }
                    };

                    let (status, signed_at) = if signed_document_id.is_some() {
                        (SignatureStatus::SignedPendingApproval, Some(Utc::now()))
                    } else {
                        (SignatureStatus::WaitForSign, None)
                    };

                    self.signatures
                        .create(
                            &mut *tx,
                            document.id,
                            owner_id,
                            status,
                            &Uuid::new_v4().to_string(),
                            signed_at,
                            signed_document_id,
                        )
                        .await?
                }
            };

            // Tarefa de aprovação só quando já existe assinatura pendente
            if signature.signature_status == SignatureStatus::SignedPendingApproval
                && signature.task_id.is_none()
            {
                let task = self
                    .tasks
                    .create_signature_approval_task(&mut *tx, &owner, Some(acting.id))
                    .await?;
                self.signatures
                    .link_task(&mut *tx, signature.id, task.id)
                    .await?;
                spawned_task_id = Some(task.id);
            }

            self.owners
                .link_signature_session(&mut *tx, owner_id, signature.id)
                .await?;
        }

        self.owners
            .update_status(&mut *tx, owner_id, new_status, None)
            .await?;

        tx.commit().await?;

        let cascade = if new_status == OwnerStatus::WaitForSign {
            None
        } else {
            Some(self.cascade.run_for_owner(pool, owner_id).await)
        };

        tracing::info!(
            owner_id = %owner_id,
            old_status = ?owner.owner_status,
            new_status = ?new_status,
            spawned_task_id = ?spawned_task_id,
            "Status do proprietário atualizado"
        );

        Ok(OwnerStatusUpdate {
            owner_id,
            owner_status: new_status,
            spawned_task_id,
            cascade,
        })
    }

    /// Soft-delete do proprietário; a cascata recalcula a unidade em seguida
    /// (a remoção muda a agregação).
    pub async fn delete(&self, pool: &PgPool, owner_id: Uuid) -> Result<CascadeOutcome, AppError> {
        let owner = self
            .owners
            .find_by_id(pool, owner_id)
            .await?
            .ok_or(AppError::OwnerNotFound)?;

        self.owners.soft_delete(pool, owner_id).await?;

        Ok(self.cascade.run_for_unit(pool, owner.unit_id).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn soma_ate_cem_passa() {
        assert!(validate_share_sum(dec("60"), dec("40")).is_ok());
        assert!(validate_share_sum(Decimal::ZERO, dec("100")).is_ok());
    }

    #[test]
    fn soma_acima_de_cem_falha() {
        let err = validate_share_sum(dec("60"), dec("50")).unwrap_err();
        assert!(matches!(err, AppError::OwnershipShareExceeded(total) if total == dec("110")));
    }
}
