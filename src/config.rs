// src/config.rs

use sqlx::{postgres::PgPoolOptions, PgPool};
use std::{env, time::Duration};

use crate::{
    common::events::EventBus,
    db::{
        AuditRepository, OrderRepository, RiderShiftRepository, SessionRepository,
        SettingsRepository, StaffRepository, TableRepository,
    },
    services::{AuthService, OrderService, RiderService, SessionService},
};

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub event_bus: EventBus,
    pub auth_service: AuthService,
    pub order_service: OrderService,
    pub session_service: SessionService,
    pub rider_service: RiderService,
    pub settings_repo: SettingsRepository,
}

impl AppState {
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

        let event_bus = EventBus::new(256);

        // --- Monta o gráfico de dependências ---
        let staff_repo = StaffRepository::new(db_pool.clone());
        let order_repo = OrderRepository::new(db_pool.clone());
        let table_repo = TableRepository::new(db_pool.clone());
        let session_repo = SessionRepository::new(db_pool.clone());
        let rider_repo = RiderShiftRepository::new(db_pool.clone());
        let settings_repo = SettingsRepository::new(db_pool.clone());
        let audit_repo = AuditRepository::new(db_pool.clone());

        let auth_service = AuthService::new(staff_repo.clone(), jwt_secret);
        let order_service = OrderService::new(
            order_repo.clone(),
            table_repo,
            session_repo.clone(),
            settings_repo.clone(),
            event_bus.clone(),
        );
        let session_service = SessionService::new(session_repo, event_bus.clone());
        let rider_service = RiderService::new(
            order_repo,
            rider_repo,
            staff_repo,
            audit_repo,
            event_bus.clone(),
        );

        Ok(Self {
            db_pool,
            event_bus,
            auth_service,
            order_service,
            session_service,
            rider_service,
            settings_repo,
        })
    }
}
