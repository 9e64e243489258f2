// src/services/document_service.rs
//
// Somente metadados de documentos: o arquivo em si (upload, storage,
// renderização) fica com o serviço externo.

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{DocumentRepository, OwnerRepository},
    models::document::{CreateDocumentPayload, Document},
};

#[derive(Clone)]
pub struct DocumentService {
    documents: DocumentRepository,
    owners: OwnerRepository,
}

impl DocumentService {
    pub fn new(documents: DocumentRepository, owners: OwnerRepository) -> Self {
        Self { documents, owners }
    }

    pub async fn create(
        &self,
        pool: &PgPool,
        payload: &CreateDocumentPayload,
        uploaded_by: Uuid,
    ) -> Result<Document, AppError> {
        if let Some(owner_id) = payload.owner_id {
            self.owners
                .find_by_id(pool, owner_id)
                .await?
                .ok_or(AppError::OwnerNotFound)?;
        }

        let document = self
            .documents
            .create(
                pool,
                payload.owner_id,
                payload.building_id,
                payload.project_id,
                payload.document_type,
                &payload.file_name,
                payload.description.as_deref(),
                Some(uploaded_by),
            )
            .await?;

        tracing::info!(
            document_id = %document.id,
            file_name = %document.file_name,
            "Documento registrado"
        );

        Ok(document)
    }

    pub async fn list(
        &self,
        pool: &PgPool,
        owner_id: Option<Uuid>,
        building_id: Option<Uuid>,
        project_id: Option<Uuid>,
    ) -> Result<Vec<Document>, AppError> {
        self.documents.list(pool, owner_id, building_id, project_id).await
    }
}
