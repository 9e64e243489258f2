// src/main.rs

use axum::{
    middleware as axum_middleware,
    routing::{get, post, put},
    Router,
};
use tokio::net::TcpListener;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

// Declaração dos nossos módulos
mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod services;

use crate::config::AppState;
use crate::middleware::auth::auth_guard;

#[tokio::main]
async fn main() {
    // Inicializa o logger
    tracing_subscriber::fmt().with_target(false).compact().init();

    // .expect() aqui: se a configuração falhar, a aplicação não deve iniciar.
    let app_state = AppState::new()
        .await
        .expect("Falha ao inicializar o estado da aplicação.");

    // Roda as migrações do SQLx na inicialização
    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .expect("Falha ao rodar as migrações do banco de dados.");

    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    // Rotas de autenticação (públicas)
    let auth_routes = Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login));

    // Rotas de usuário (protegidas)
    let user_routes = Router::new()
        .route("/me", get(handlers::auth::get_me))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let project_routes = Router::new()
        .route(
            "/",
            post(handlers::projects::create_project).get(handlers::projects::list_projects),
        )
        .route(
            "/{id}",
            get(handlers::projects::get_project).delete(handlers::projects::delete_project),
        )
        .route(
            "/{id}/calculate-majority",
            post(handlers::projects::calculate_project_majority),
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let building_routes = Router::new()
        .route(
            "/",
            post(handlers::buildings::create_building).get(handlers::buildings::list_buildings),
        )
        .route(
            "/{id}",
            get(handlers::buildings::get_building).delete(handlers::buildings::delete_building),
        )
        .route(
            "/{id}/calculate-majority",
            post(handlers::buildings::calculate_building_majority),
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let unit_routes = Router::new()
        .route(
            "/",
            post(handlers::units::create_unit).get(handlers::units::list_units),
        )
        .route(
            "/{id}",
            get(handlers::units::get_unit).delete(handlers::units::delete_unit),
        )
        .route(
            "/{id}/recalculate-status",
            post(handlers::units::recalculate_unit_status),
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let owner_routes = Router::new()
        .route(
            "/",
            post(handlers::owners::create_owner).get(handlers::owners::list_owners),
        )
        .route(
            "/{id}",
            get(handlers::owners::get_owner).delete(handlers::owners::delete_owner),
        )
        .route("/{id}/status", put(handlers::owners::update_owner_status))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let document_routes = Router::new()
        .route(
            "/",
            post(handlers::documents::create_document).get(handlers::documents::list_documents),
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    // Endpoints de token são públicos: o token de uso único É a credencial
    let approval_public_routes = Router::new()
        .route(
            "/sign/validate/{token}",
            get(handlers::approvals::validate_signing_token),
        )
        .route("/sign/{token}", post(handlers::approvals::sign_by_token));

    let approval_protected_routes = Router::new()
        .route(
            "/signatures/initiate",
            post(handlers::approvals::initiate_signature),
        )
        .route(
            "/signatures/waiting",
            get(handlers::approvals::waiting_signatures),
        )
        .route("/queue", get(handlers::approvals::approval_queue))
        .route("/{id}/approve", post(handlers::approvals::approve_signature))
        .route("/{id}/reject", post(handlers::approvals::reject_signature))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let task_routes = Router::new()
        .route("/", get(handlers::tasks::list_tasks))
        .route("/{id}/complete", post(handlers::tasks::complete_task))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let alert_routes = Router::new()
        .route("/", get(handlers::alerts::list_alerts))
        .route("/count", get(handlers::alerts::count_alerts))
        .route("/check", post(handlers::alerts::run_alert_checks))
        .route(
            "/{id}/acknowledge",
            post(handlers::alerts::acknowledge_alert),
        )
        .route("/{id}/resolve", post(handlers::alerts::resolve_alert))
        .route("/{id}/dismiss", post(handlers::alerts::dismiss_alert))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    // Combina tudo no router principal
    let app = Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/auth", auth_routes)
        .nest("/api/users", user_routes)
        .nest("/api/projects", project_routes)
        .nest("/api/buildings", building_routes)
        .nest("/api/units", unit_routes)
        .nest("/api/owners", owner_routes)
        .nest("/api/documents", document_routes)
        .nest(
            "/api/approvals",
            approval_public_routes.merge(approval_protected_routes),
        )
        .nest("/api/tasks", task_routes)
        .nest("/api/alerts", alert_routes)
        .merge(
            SwaggerUi::new("/docs").url("/api-docs/openapi.json", docs::ApiDoc::openapi()),
        )
        .with_state(app_state);

    // Inicia o servidor
    let addr = "0.0.0.0:3000";
    let listener = TcpListener::bind(addr)
        .await
        .expect("Falha ao iniciar o listener TCP");
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr().unwrap());
    axum::serve(listener, app)
        .await
        .expect("Erro no servidor Axum");
}
