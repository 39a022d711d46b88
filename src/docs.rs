// src/docs.rs

use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::OpenApi;

use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::login,
        handlers::auth::get_me,

        // --- Pedidos ---
        handlers::orders::create_order,
        handlers::orders::get_order,
        handlers::orders::transition_order,
        handlers::orders::assign_driver,
        handlers::orders::mark_delivered,

        // --- Sessões de Caixa ---
        handlers::sessions::open_session,
        handlers::sessions::append_entry,
        handlers::sessions::close_session,
        handlers::sessions::session_metrics,
        handlers::sessions::z_report,

        // --- Turnos de Entregador ---
        handlers::riders::open_shift,
        handlers::riders::close_shift,
        handlers::riders::active_shift,
        handlers::riders::pending_settlement,

        // --- Settings ---
        handlers::settings::get_settings,
        handlers::settings::update_settings,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::Staff,
            models::auth::LoginPayload,
            models::auth::AuthResponse,

            // --- Pedidos ---
            models::orders::OrderType,
            models::orders::OrderStatus,
            models::orders::OrderItemStatus,
            models::orders::Order,
            models::orders::OrderItem,
            models::orders::Breakdown,
            models::orders::DineInDetail,
            models::orders::TakeawayDetail,
            models::orders::DeliveryDetail,
            models::orders::OrderSubRecord,
            models::orders::OrderDetail,
            models::orders::OrderDetailsPayload,
            models::orders::OrderItemPayload,

            // --- Mesas ---
            models::tables::TableStatus,
            models::tables::DiningTable,

            // --- Sessões de Caixa ---
            models::sessions::SessionStatus,
            models::sessions::LedgerEntryKind,
            models::sessions::CashSession,
            models::sessions::LedgerEntry,
            models::sessions::SessionMetrics,
            models::sessions::ZReport,

            // --- Turnos de Entregador ---
            models::riders::RiderShift,
            models::riders::RiderSettlement,

            // --- Settings ---
            models::settings::RestaurantSettings,
            models::settings::UpdateSettingsRequest,

            // --- Payloads ---
            handlers::orders::CreateOrderPayload,
            handlers::orders::DiscountPayload,
            handlers::orders::TransitionPayload,
            handlers::orders::AssignDriverPayload,
            handlers::sessions::OpenSessionPayload,
            handlers::sessions::AppendEntryPayload,
            handlers::sessions::CloseSessionPayload,
            handlers::riders::OpenShiftPayload,
            handlers::riders::CloseShiftPayload,
        )
    ),
    tags(
        (name = "Autenticação", description = "Login e identidade do staff"),
        (name = "Pedidos", description = "Ciclo de vida do pedido (DINE_IN, TAKEAWAY, DELIVERY)"),
        (name = "Sessões de Caixa", description = "Sessões de caixa, ledger e Z-report"),
        (name = "Turnos de Entregador", description = "Turnos, despacho e acerto de entregadores"),
        (name = "Configurações", description = "Taxas e regras financeiras do restaurante")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}
