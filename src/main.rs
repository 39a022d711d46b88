// src/main.rs

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod services;

use crate::config::AppState;
use crate::middleware::auth::auth_middleware;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().with_target(false).compact().init();

    // Se a configuração falhar, a aplicação não deve iniciar.
    let app_state = AppState::new()
        .await
        .expect("Falha ao inicializar o estado da aplicação.");

    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .expect("Falha ao rodar as migrações do banco de dados.");

    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    // Assinante de telemetria: loga cada evento de domínio commitado.
    // Assinantes de tempo real (telões, KDS) entram pelo mesmo canal.
    let mut events = app_state.event_bus.subscribe();
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => {
                    tracing::debug!("evento {:?} em {}", event.event_type, event.entity_table);
                }
                Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!("assinante de eventos atrasado, {} perdidos", skipped);
                }
                Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
            }
        }
    });

    // Rotas públicas
    let auth_routes = Router::new().route("/login", post(handlers::auth::login));

    // Tudo abaixo exige Bearer token; o restaurante vem no X-Restaurant-ID.
    let me_routes = Router::new().route("/me", get(handlers::auth::get_me));

    let order_routes = Router::new()
        .route("/", post(handlers::orders::create_order))
        .route("/{id}", get(handlers::orders::get_order))
        .route("/{id}/transition", post(handlers::orders::transition_order))
        .route("/{id}/assign-driver", post(handlers::orders::assign_driver))
        .route("/{id}/delivered", post(handlers::orders::mark_delivered));

    let session_routes = Router::new()
        .route("/", post(handlers::sessions::open_session))
        .route("/metrics", get(handlers::sessions::session_metrics))
        .route("/{id}/entries", post(handlers::sessions::append_entry))
        .route("/{id}/close", post(handlers::sessions::close_session))
        .route("/{id}/z-report", get(handlers::sessions::z_report));

    let rider_routes = Router::new()
        .route("/", post(handlers::riders::open_shift))
        .route("/active", get(handlers::riders::active_shift))
        .route("/{id}/close", post(handlers::riders::close_shift))
        .route(
            "/{id}/pending-settlement",
            get(handlers::riders::pending_settlement),
        );

    let settings_routes = Router::new().route(
        "/",
        get(handlers::settings::get_settings).put(handlers::settings::update_settings),
    );

    let protected_routes = Router::new()
        .nest("/api/auth", me_routes)
        .nest("/api/orders", order_routes)
        .nest("/api/sessions", session_routes)
        .nest("/api/rider-shifts", rider_routes)
        .nest("/api/settings", settings_routes)
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_middleware,
        ));

    let app = Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/auth", auth_routes)
        .merge(protected_routes)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", docs::ApiDoc::openapi()))
        .with_state(app_state);

    let addr = "0.0.0.0:3000";
    let listener = TcpListener::bind(addr)
        .await
        .expect("Falha ao iniciar o listener TCP");
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr().unwrap());
    axum::serve(listener, app).await.expect("Erro no servidor Axum");
}
