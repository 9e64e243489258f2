// src/docs.rs

use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::handlers;
use crate::models;
use crate::services;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::get_me,

        // --- Projects ---
        handlers::projects::create_project,
        handlers::projects::list_projects,
        handlers::projects::get_project,
        handlers::projects::delete_project,
        handlers::projects::calculate_project_majority,

        // --- Buildings ---
        handlers::buildings::create_building,
        handlers::buildings::list_buildings,
        handlers::buildings::get_building,
        handlers::buildings::delete_building,
        handlers::buildings::calculate_building_majority,

        // --- Units ---
        handlers::units::create_unit,
        handlers::units::list_units,
        handlers::units::get_unit,
        handlers::units::delete_unit,
        handlers::units::recalculate_unit_status,

        // --- Owners ---
        handlers::owners::create_owner,
        handlers::owners::list_owners,
        handlers::owners::get_owner,
        handlers::owners::update_owner_status,
        handlers::owners::delete_owner,

        // --- Documents ---
        handlers::documents::create_document,
        handlers::documents::list_documents,

        // --- Approvals ---
        handlers::approvals::initiate_signature,
        handlers::approvals::waiting_signatures,
        handlers::approvals::validate_signing_token,
        handlers::approvals::sign_by_token,
        handlers::approvals::approval_queue,
        handlers::approvals::approve_signature,
        handlers::approvals::reject_signature,

        // --- Tasks ---
        handlers::tasks::list_tasks,
        handlers::tasks::complete_task,

        // --- Alerts ---
        handlers::alerts::list_alerts,
        handlers::alerts::count_alerts,
        handlers::alerts::acknowledge_alert,
        handlers::alerts::resolve_alert,
        handlers::alerts::dismiss_alert,
        handlers::alerts::run_alert_checks,
    ),
    components(schemas(
        models::auth::User,
        models::auth::UserRole,
        models::auth::RegisterUserPayload,
        models::auth::LoginUserPayload,
        models::auth::AuthResponse,
        models::project::Project,
        models::project::MajorityCalcType,
        models::project::CreateProjectPayload,
        models::building::Building,
        models::building::TrafficLight,
        models::building::CreateBuildingPayload,
        models::unit::Unit,
        models::unit::UnitStatus,
        models::unit::CreateUnitPayload,
        models::owner::Owner,
        models::owner::OwnerStatus,
        models::owner::CreateOwnerPayload,
        models::owner::UpdateOwnerStatusPayload,
        models::document::Document,
        models::document::DocumentType,
        models::document::CreateDocumentPayload,
        models::signature::Signature,
        models::signature::SignatureStatus,
        models::signature::InitiateSignaturePayload,
        models::signature::SignByTokenPayload,
        models::signature::ApprovalPayload,
        models::signature::RejectionPayload,
        models::signature::SigningTokenInfo,
        models::task::Task,
        models::task::TaskType,
        models::task::TaskStatus,
        models::task::TaskPriority,
        models::task::CompleteTaskPayload,
        models::alert::Alert,
        models::alert::AlertType,
        models::alert::AlertSeverity,
        models::alert::AlertStatus,
        models::alert::AlertCheckSummary,
        services::majority::BuildingAggregate,
        services::majority::ProjectAggregate,
        services::cascade::CascadeOutcome,
        services::cascade::CascadeFailure,
        services::cascade::CascadeStage,
        services::owner_service::OwnerStatusUpdate,
        handlers::approvals::SignatureActionResponse,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Registro e login"),
        (name = "Projects", description = "Projetos de reforma"),
        (name = "Buildings", description = "Prédios e agregados de consenso"),
        (name = "Units", description = "Unidades"),
        (name = "Owners", description = "Proprietários"),
        (name = "Documents", description = "Metadados de documentos"),
        (name = "Approvals", description = "Fluxo de assinatura e aprovação"),
        (name = "Tasks", description = "Tarefas"),
        (name = "Alerts", description = "Alertas de limiar")
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "api_jwt",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            );
        }
    }
}
