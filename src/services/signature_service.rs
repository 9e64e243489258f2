// src/services/signature_service.rs
//
// Máquina de estados de uma tentativa de assinatura:
// WAIT_FOR_SIGN -> SIGNED_PENDING_APPROVAL -> FINALIZED (aprovada)
//                                          -> WAIT_FOR_SIGN (rejeitada, volta)
//                                          -> REJECTED (encerrada)
//
// Fonte da verdade para agregação é Owner.owner_status, e SIGNED só entra
// pela aprovação do gerente: assinar cru NÃO marca o proprietário como
// SIGNED (isso contaria uma assinatura ainda não aprovada).

use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{DocumentRepository, OwnerRepository, SignatureRepository},
    models::{
        owner::OwnerStatus,
        signature::{Signature, SignatureStatus, SigningTokenInfo},
    },
    services::{
        cascade::{CascadeCoordinator, CascadeOutcome},
        task_service::TaskService,
    },
};

const MIN_REJECTION_REASON_LEN: usize = 10;

/// Motivo de rejeição é obrigatório e tem tamanho mínimo
pub fn validate_rejection_reason(reason: &str) -> Result<&str, AppError> {
    let trimmed = reason.trim();
    if trimmed.chars().count() < MIN_REJECTION_REASON_LEN {
        return Err(AppError::RejectionReasonTooShort(MIN_REJECTION_REASON_LEN));
    }
    Ok(trimmed)
}

#[derive(Clone)]
pub struct SignatureService {
    signatures: SignatureRepository,
    documents: DocumentRepository,
    owners: OwnerRepository,
    tasks: TaskService,
    cascade: CascadeCoordinator,
}

impl SignatureService {
    pub fn new(
        signatures: SignatureRepository,
        documents: DocumentRepository,
        owners: OwnerRepository,
        tasks: TaskService,
        cascade: CascadeCoordinator,
    ) -> Self {
        Self {
            signatures,
            documents,
            owners,
            tasks,
            cascade,
        }
    }

    /// Inicia o processo de assinatura e cunha o token do link.
    ///
    /// Com documento pré-assinado (colhido offline), a Signature já nasce
    /// SIGNED_PENDING_APPROVAL e a tarefa de aprovação é criada na hora;
    /// sem ele, nasce WAIT_FOR_SIGN e a tarefa fica adiada até o
    /// proprietário assinar de fato.
    pub async fn initiate(
        &self,
        pool: &PgPool,
        owner_id: Uuid,
        document_id: Uuid,
        signed_document_id: Option<Uuid>,
        requested_by: Uuid,
    ) -> Result<Signature, AppError> {
        let mut tx = pool.begin().await?;

        let owner = self
            .owners
            .find_by_id(&mut *tx, owner_id)
            .await?
            .ok_or(AppError::OwnerNotFound)?;

        self.documents
            .find_by_id(&mut *tx, document_id)
            .await?
            .ok_or(AppError::DocumentNotFound)?;

        if let Some(signed_doc) = signed_document_id {
            self.documents
                .find_by_id(&mut *tx, signed_doc)
                .await?
                .ok_or(AppError::DocumentNotFound)?;
        }

        // Token aleatório não-adivinhável; basta para o link de assinatura
        let signing_token = Uuid::new_v4().to_string();

        let (status, signed_at) = if signed_document_id.is_some() {
            (SignatureStatus::SignedPendingApproval, Some(Utc::now()))
        } else {
            (SignatureStatus::WaitForSign, None)
        };

        let mut signature = self
            .signatures
            .create(
                &mut *tx,
                document_id,
                owner_id,
                status,
                &signing_token,
                signed_at,
                signed_document_id,
            )
            .await?;

        self.owners
            .update_status(&mut *tx, owner_id, OwnerStatus::WaitForSign, None)
            .await?;
        self.owners
            .link_signature_session(&mut *tx, owner_id, signature.id)
            .await?;

        if status == SignatureStatus::SignedPendingApproval {
            let task = self
                .tasks
                .create_signature_approval_task(&mut *tx, &owner, Some(requested_by))
                .await?;
            self.signatures.link_task(&mut *tx, signature.id, task.id).await?;
            signature.task_id = Some(task.id);
        }

        tx.commit().await?;

        tracing::info!(
            signature_id = %signature.id,
            owner_id = %owner_id,
            document_id = %document_id,
            status = ?signature.signature_status,
            "Assinatura iniciada"
        );

        Ok(signature)
    }

    /// Proprietário assina pelo link público.
    /// Guarda de entrada: só com o token exato e ainda em WAIT_FOR_SIGN.
    pub async fn sign_by_token(
        &self,
        pool: &PgPool,
        token: &str,
        signature_data: &str,
    ) -> Result<Signature, AppError> {
        let mut tx = pool.begin().await?;

        let signature = self
            .signatures
            .find_by_token(&mut *tx, token)
            .await?
            .ok_or(AppError::InvalidSigningToken)?;

        if !signature
            .signature_status
            .can_transition_to(SignatureStatus::SignedPendingApproval)
        {
            return Err(AppError::InvalidTransition(format!(
                "assinatura em {:?} não está disponível para assinar",
                signature.signature_status
            )));
        }

        let owner = self
            .owners
            .find_by_id(&mut *tx, signature.owner_id)
            .await?
            .ok_or(AppError::OwnerNotFound)?;

        let mut updated = self
            .signatures
            .mark_signed(&mut *tx, signature.id, signature_data)
            .await?;

        // A tarefa de aprovação, adiada na iniciação, nasce agora
        if updated.task_id.is_none() {
            let task = self
                .tasks
                .create_signature_approval_task(&mut *tx, &owner, None)
                .await?;
            self.signatures.link_task(&mut *tx, updated.id, task.id).await?;
            updated.task_id = Some(task.id);
        }

        // Owner permanece WAIT_FOR_SIGN: SIGNED só com aprovação do gerente
        tx.commit().await?;

        tracing::info!(
            signature_id = %updated.id,
            owner_id = %updated.owner_id,
            "Documento assinado via token"
        );

        Ok(updated)
    }

    /// Gerente aprova: FINALIZED, proprietário vira SIGNED, tarefa vinculada
    /// é concluída e a cascata unidade -> prédio -> projeto roda em seguida.
    pub async fn approve(
        &self,
        pool: &PgPool,
        signature_id: Uuid,
        approved_by: Uuid,
        reason: Option<&str>,
    ) -> Result<(Signature, CascadeOutcome), AppError> {
        let mut tx = pool.begin().await?;

        let signature = self
            .signatures
            .find_by_id(&mut *tx, signature_id)
            .await?
            .ok_or(AppError::SignatureNotFound)?;

        if !signature
            .signature_status
            .can_transition_to(SignatureStatus::Finalized)
        {
            return Err(AppError::InvalidTransition(format!(
                "assinatura em {:?} não está pendente de aprovação",
                signature.signature_status
            )));
        }

        let reason = reason.map(str::trim).filter(|r| !r.is_empty());

        let updated = self
            .signatures
            .mark_approved(&mut *tx, signature.id, approved_by, reason)
            .await?;

        self.owners
            .update_status(
                &mut *tx,
                signature.owner_id,
                OwnerStatus::Signed,
                Some(Utc::now().date_naive()),
            )
            .await?;

        if let Some(task_id) = signature.task_id {
            self.tasks.complete_linked(&mut *tx, task_id, reason).await?;
        }

        tx.commit().await?;

        // A ação primária já está gravada; a cascata pode degradar sem
        // derrubar a aprovação
        let outcome = self.cascade.run_for_owner(pool, signature.owner_id).await;

        tracing::info!(
            signature_id = %updated.id,
            approved_by = %approved_by,
            degraded = outcome.is_degraded(),
            "Assinatura aprovada"
        );

        Ok((updated, outcome))
    }

    /// Gerente rejeita: volta para WAIT_FOR_SIGN para nova tentativa.
    /// Motivo obrigatório (mínimo de caracteres); a tarefa vinculada é
    /// concluída com o motivo anexado às notas.
    pub async fn reject(
        &self,
        pool: &PgPool,
        signature_id: Uuid,
        rejected_by: Uuid,
        reason: &str,
    ) -> Result<(Signature, CascadeOutcome), AppError> {
        let reason = validate_rejection_reason(reason)?;

        let mut tx = pool.begin().await?;

        let signature = self
            .signatures
            .find_by_id(&mut *tx, signature_id)
            .await?
            .ok_or(AppError::SignatureNotFound)?;

        if !signature
            .signature_status
            .can_transition_to(SignatureStatus::WaitForSign)
        {
            return Err(AppError::InvalidTransition(format!(
                "assinatura em {:?} não pode ser rejeitada",
                signature.signature_status
            )));
        }

        let updated = self
            .signatures
            .mark_rejected(&mut *tx, signature.id, rejected_by, reason)
            .await?;

        self.owners
            .update_status(&mut *tx, signature.owner_id, OwnerStatus::WaitForSign, None)
            .await?;

        if let Some(task_id) = signature.task_id {
            self.tasks
                .complete_linked(&mut *tx, task_id, Some(reason))
                .await?;
        }

        tx.commit().await?;

        let outcome = self.cascade.run_for_owner(pool, signature.owner_id).await;

        tracing::info!(
            signature_id = %updated.id,
            rejected_by = %rejected_by,
            "Assinatura rejeitada, devolvida para nova tentativa"
        );

        Ok((updated, outcome))
    }

    /// Endpoint público da página de assinatura: valida o token e devolve o
    /// contexto sem exigir autenticação.
    pub async fn validate_token(
        &self,
        pool: &PgPool,
        token: &str,
    ) -> Result<SigningTokenInfo, AppError> {
        let signature = self
            .signatures
            .find_by_token(pool, token)
            .await?
            .ok_or(AppError::InvalidSigningToken)?;

        let owner = self
            .owners
            .find_by_id(pool, signature.owner_id)
            .await?
            .ok_or(AppError::OwnerNotFound)?;

        let document = self
            .documents
            .find_by_id(pool, signature.document_id)
            .await?
            .ok_or(AppError::DocumentNotFound)?;

        Ok(SigningTokenInfo {
            signature_id: signature.id,
            document_id: document.id,
            owner_id: owner.id,
            owner_name: owner.full_name,
            document_name: document.file_name,
            signature_status: signature.signature_status,
            is_valid: signature.signature_status == SignatureStatus::WaitForSign,
        })
    }

    /// Fila de aprovação do gerente
    pub async fn approval_queue(&self, pool: &PgPool) -> Result<Vec<Signature>, AppError> {
        self.signatures
            .list_by_status(pool, SignatureStatus::SignedPendingApproval, None)
            .await
    }

    /// Assinaturas aguardando o proprietário assinar
    pub async fn waiting(
        &self,
        pool: &PgPool,
        owner_id: Option<Uuid>,
    ) -> Result<Vec<Signature>, AppError> {
        self.signatures
            .list_by_status(pool, SignatureStatus::WaitForSign, owner_id)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn motivo_curto_demais_falha() {
        assert!(matches!(
            validate_rejection_reason("não"),
            Err(AppError::RejectionReasonTooShort(_))
        ));
    }

    #[test]
    fn espacos_nao_contam_no_minimo() {
        assert!(matches!(
            validate_rejection_reason("   abc   "),
            Err(AppError::RejectionReasonTooShort(_))
        ));
    }

    #[test]
    fn motivo_com_dez_caracteres_passa() {
        let reason = validate_rejection_reason("ilegível, reenviar").unwrap();
        assert_eq!(reason, "ilegível, reenviar");
    }
}
