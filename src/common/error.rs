use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use rust_decimal::Decimal;
use serde_json::json;
use thiserror::Error;

// Nosso tipo de erro central, com `thiserror` para melhor ergonomia.
// Taxonomia: NotFound / InvalidTransition / ValidationError / infraestrutura.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("E-mail já existe")]
    EmailAlreadyExists,

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token inválido")]
    InvalidToken,

    #[error("Acesso negado: {0}")]
    Forbidden(String),

    #[error("Usuário não encontrado")]
    UserNotFound,

    #[error("Projeto não encontrado")]
    ProjectNotFound,

    #[error("Prédio não encontrado")]
    BuildingNotFound,

    #[error("Unidade não encontrada")]
    UnitNotFound,

    #[error("Proprietário não encontrado")]
    OwnerNotFound,

    #[error("Documento não encontrado")]
    DocumentNotFound,

    #[error("Assinatura não encontrada")]
    SignatureNotFound,

    #[error("Tarefa não encontrada")]
    TaskNotFound,

    #[error("Alerta não encontrado")]
    AlertNotFound,

    // Token de assinatura desconhecido ou divergente do registrado
    #[error("Token de assinatura inválido ou expirado")]
    InvalidSigningToken,

    #[error("Transição inválida: {0}")]
    InvalidTransition(String),

    #[error("O motivo da rejeição deve ter no mínimo {0} caracteres")]
    RejectionReasonTooShort(usize),

    #[error("O limiar crítico não pode ser maior que a maioria exigida")]
    InvalidThresholds,

    #[error("A soma das quotas de propriedade não pode passar de 100% (total: {0}%)")]
    OwnershipShareExceeded(Decimal),

    #[error("Estado do alerta não permite a operação: {0}")]
    InvalidAlertState(String),

    // Variante para erros de banco de dados
    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            // Retorna todos os detalhes da validação, campo a campo.
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let body = Json(json!({
                    "error": "Um ou mais campos são inválidos.",
                    "details": details,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }

            AppError::EmailAlreadyExists => {
                (StatusCode::CONFLICT, "Este e-mail já está em uso.".to_string())
            }
            AppError::InvalidCredentials => {
                (StatusCode::UNAUTHORIZED, "E-mail ou senha inválidos.".to_string())
            }
            AppError::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                "Token de autenticação inválido ou ausente.".to_string(),
            ),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.clone()),

            AppError::UserNotFound
            | AppError::ProjectNotFound
            | AppError::BuildingNotFound
            | AppError::UnitNotFound
            | AppError::OwnerNotFound
            | AppError::DocumentNotFound
            | AppError::SignatureNotFound
            | AppError::TaskNotFound
            | AppError::AlertNotFound => (StatusCode::NOT_FOUND, self.to_string()),

            AppError::InvalidSigningToken => (StatusCode::UNAUTHORIZED, self.to_string()),

            AppError::InvalidTransition(_)
            | AppError::RejectionReasonTooShort(_)
            | AppError::InvalidThresholds
            | AppError::OwnershipShareExceeded(_)
            | AppError::InvalidAlertState(_) => (StatusCode::BAD_REQUEST, self.to_string()),

            // Todos os outros (DatabaseError, InternalServerError...) viram 500.
            // O `tracing` loga a mensagem detalhada que o `thiserror` nos deu.
            e => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Ocorreu um erro inesperado.".to_string(),
                )
            }
        };

        // Resposta padrão para erros simples que só têm uma mensagem.
        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}
