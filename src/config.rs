// src/config.rs

use std::sync::Arc;
use std::{env, time::Duration};

use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    db::{
        AlertRepository, BuildingRepository, DocumentRepository, OwnerRepository,
        ProjectRepository, SignatureRepository, TaskRepository, UnitRepository, UserRepository,
    },
    services::{
        alert_service::AlertService,
        auth::AuthService,
        cascade::{CascadeCoordinator, CascadeLocks},
        document_service::DocumentService,
        majority::MajorityEngine,
        owner_service::OwnerService,
        project_service::ProjectService,
        signature_service::SignatureService,
        task_service::TaskService,
        unit_status::UnitStatusResolver,
    },
};

// O estado compartilhado que será acessível em toda a aplicação
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub auth_service: AuthService,
    pub project_service: ProjectService,
    pub owner_service: OwnerService,
    pub document_service: DocumentService,
    pub signature_service: SignatureService,
    pub task_service: TaskService,
    pub alert_service: AlertService,
    pub majority_engine: MajorityEngine,
    pub cascade: CascadeCoordinator,
}

impl AppState {
    // A assinatura retorna um Result: se a configuração falhar, o main decide
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL deve ser definida");
        let jwt_secret = env::var("JWT_SECRET").expect("JWT_SECRET deve ser definido");

        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        // --- Monta o gráfico de dependências ---
        let user_repo = UserRepository::new(db_pool.clone());
        let project_repo = ProjectRepository::new(db_pool.clone());
        let building_repo = BuildingRepository::new(db_pool.clone());
        let unit_repo = UnitRepository::new(db_pool.clone());
        let owner_repo = OwnerRepository::new(db_pool.clone());
        let document_repo = DocumentRepository::new(db_pool.clone());
        let signature_repo = SignatureRepository::new(db_pool.clone());
        let task_repo = TaskRepository::new(db_pool.clone());
        let alert_repo = AlertRepository::new(db_pool.clone());

        let resolver = UnitStatusResolver::new(unit_repo.clone(), owner_repo.clone());
        let majority_engine = MajorityEngine::new(
            project_repo.clone(),
            building_repo.clone(),
            unit_repo.clone(),
            owner_repo.clone(),
            resolver.clone(),
        );

        // Exclusão mútua por projeto durante a cascata
        let cascade_locks = Arc::new(CascadeLocks::new());
        let cascade = CascadeCoordinator::new(
            unit_repo.clone(),
            owner_repo.clone(),
            building_repo.clone(),
            resolver.clone(),
            majority_engine.clone(),
            cascade_locks,
        );

        let auth_service = AuthService::new(user_repo.clone(), jwt_secret, db_pool.clone());
        let task_service = TaskService::new(
            task_repo.clone(),
            user_repo,
            unit_repo.clone(),
            building_repo.clone(),
        );
        let project_service = ProjectService::new(
            project_repo,
            building_repo.clone(),
            unit_repo.clone(),
        );
        let document_service = DocumentService::new(document_repo.clone(), owner_repo.clone());
        let signature_service = SignatureService::new(
            signature_repo.clone(),
            document_repo.clone(),
            owner_repo.clone(),
            task_service.clone(),
            cascade.clone(),
        );
        let owner_service = OwnerService::new(
            owner_repo,
            unit_repo,
            building_repo.clone(),
            document_repo,
            signature_repo.clone(),
            task_service.clone(),
            resolver,
            cascade.clone(),
        );
        let alert_service = AlertService::new(
            alert_repo,
            building_repo,
            signature_repo,
            task_repo,
        );

        Ok(Self {
            db_pool,
            auth_service,
            project_service,
            owner_service,
            document_service,
            signature_service,
            task_service,
            alert_service,
            majority_engine,
            cascade,
        })
    }
}
