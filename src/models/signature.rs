// src/models/signature.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// Mapeia o CREATE TYPE signature_status do banco.
// FINALIZED e REJECTED são terminais.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "signature_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SignatureStatus {
    WaitForSign,
    SignedPendingApproval,
    Finalized,
    Rejected,
}

impl SignatureStatus {
    /// Tabela de transições do ciclo de vida de uma assinatura.
    /// Match exaustivo: adicionar um estado novo força revisar a tabela.
    pub fn can_transition_to(self, next: SignatureStatus) -> bool {
        use SignatureStatus::*;
        match (self, next) {
            // proprietário assina (via token ou upload manual)
            (WaitForSign, SignedPendingApproval) => true,
            // gerente aprova
            (SignedPendingApproval, Finalized) => true,
            // gerente rejeita e devolve para nova tentativa
            (SignedPendingApproval, WaitForSign) => true,
            // gerente encerra de vez
            (SignedPendingApproval, Rejected) => true,

            (WaitForSign, WaitForSign)
            | (WaitForSign, Finalized)
            | (WaitForSign, Rejected)
            | (SignedPendingApproval, SignedPendingApproval)
            | (Finalized, _)
            | (Rejected, _) => false,
        }
    }
}

// Uma tentativa de assinatura: um proprietário, um documento.
// No caminho feliz existe no máximo uma linha não-terminal por proprietário.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Signature {
    pub id: Uuid,
    pub document_id: Uuid,
    pub owner_id: Uuid,
    pub signature_status: SignatureStatus,

    // Token de uso único para o link de assinatura (não é chave criptográfica)
    pub signing_token: Option<String>,
    pub signature_data: Option<String>,
    pub signed_at: Option<DateTime<Utc>>,

    pub signed_document_id: Option<Uuid>,
    pub task_id: Option<Uuid>,

    pub approved_by_user_id: Option<Uuid>,
    pub approved_at: Option<DateTime<Utc>>,
    pub approval_reason: Option<String>,

    pub rejected_by_user_id: Option<Uuid>,
    pub rejected_at: Option<DateTime<Utc>>,
    pub rejection_reason: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InitiateSignaturePayload {
    pub owner_id: Uuid,
    pub document_id: Uuid,
    // Assinatura colhida offline: a Signature já nasce pendente de aprovação
    pub signed_document_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignByTokenPayload {
    // Imagem/dados da assinatura em base64
    pub signature_data: String,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalPayload {
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RejectionPayload {
    pub reason: String,
}

// Resposta do endpoint público de validação do token de assinatura
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SigningTokenInfo {
    pub signature_id: Uuid,
    pub document_id: Uuid,
    pub owner_id: Uuid,
    pub owner_name: String,
    pub document_name: String,
    pub signature_status: SignatureStatus,
    pub is_valid: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use SignatureStatus::*;

    #[test]
    fn caminho_feliz_ate_finalizada() {
        assert!(WaitForSign.can_transition_to(SignedPendingApproval));
        assert!(SignedPendingApproval.can_transition_to(Finalized));
    }

    #[test]
    fn rejeicao_devolve_para_nova_tentativa() {
        assert!(SignedPendingApproval.can_transition_to(WaitForSign));
        assert!(SignedPendingApproval.can_transition_to(Rejected));
    }

    #[test]
    fn assinar_duas_vezes_nao_e_permitido() {
        // segunda chamada de signByToken encontra SIGNED_PENDING_APPROVAL
        assert!(!SignedPendingApproval.can_transition_to(SignedPendingApproval));
    }

    #[test]
    fn estados_terminais_nao_saem() {
        for next in [WaitForSign, SignedPendingApproval, Finalized, Rejected] {
            assert!(!Finalized.can_transition_to(next));
            assert!(!Rejected.can_transition_to(next));
        }
    }

    #[test]
    fn espera_nao_pula_direto_para_terminal() {
        assert!(!WaitForSign.can_transition_to(Finalized));
        assert!(!WaitForSign.can_transition_to(Rejected));
    }
}
