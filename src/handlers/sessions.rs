// src/handlers/sessions.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    common::{db_utils::get_scoped_connection, error::AppError},
    config::AppState,
    middleware::{auth::AuthenticatedStaff, tenancy::RestaurantContext},
    models::sessions::{CashSession, LedgerEntry, LedgerEntryKind, SessionMetrics, ZReport},
};

// =============================================================================
//  PAYLOADS
// =============================================================================

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OpenSessionPayload {
    #[schema(example = "5000.00")]
    pub opening_balance: Decimal,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AppendEntryPayload {
    // Só PAYOUT e ADJUSTMENT: SALE nasce da liquidação do pedido
    pub kind: LedgerEntryKind,
    #[schema(example = "-200.00")]
    pub amount: Decimal,
    #[schema(example = "fornecedor")]
    pub category: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CloseSessionPayload {
    #[schema(example = "6300.00")]
    pub actual_balance: Decimal,
}

// =============================================================================
//  HANDLERS
// =============================================================================

// POST /api/sessions
#[utoipa::path(
    post,
    path = "/api/sessions",
    tag = "Sessões de Caixa",
    request_body = OpenSessionPayload,
    responses(
        (status = 201, description = "Sessão aberta", body = CashSession),
        (status = 409, description = "Operador já possui sessão aberta")
    ),
    params(
        ("x-restaurant-id" = Uuid, Header, description = "ID do Restaurante")
    ),
    security(("api_jwt" = []))
)]
pub async fn open_session(
    State(app_state): State<AppState>,
    restaurant: RestaurantContext,
    staff: AuthenticatedStaff,
    Json(payload): Json<OpenSessionPayload>,
) -> Result<impl IntoResponse, AppError> {
    let mut conn = get_scoped_connection(&app_state, &restaurant, &staff).await?;

    let session = app_state
        .session_service
        .open(&mut *conn, restaurant.0, &staff.0, payload.opening_balance)
        .await?;

    Ok((StatusCode::CREATED, Json(session)))
}

// POST /api/sessions/{id}/entries
#[utoipa::path(
    post,
    path = "/api/sessions/{id}/entries",
    tag = "Sessões de Caixa",
    request_body = AppendEntryPayload,
    responses(
        (status = 201, description = "Entrada registrada", body = LedgerEntry),
        (status = 400, description = "Tipo ou sinal inválido"),
        (status = 409, description = "Sessão já fechada")
    ),
    params(
        ("id" = Uuid, Path, description = "ID da sessão"),
        ("x-restaurant-id" = Uuid, Header, description = "ID do Restaurante")
    ),
    security(("api_jwt" = []))
)]
pub async fn append_entry(
    State(app_state): State<AppState>,
    restaurant: RestaurantContext,
    staff: AuthenticatedStaff,
    Path(session_id): Path<Uuid>,
    Json(payload): Json<AppendEntryPayload>,
) -> Result<impl IntoResponse, AppError> {
    let mut conn = get_scoped_connection(&app_state, &restaurant, &staff).await?;

    let entry = app_state
        .session_service
        .append_entry(
            &mut *conn,
            restaurant.0,
            session_id,
            payload.kind,
            payload.amount,
            payload.category.as_deref(),
            payload.notes.as_deref(),
            &staff.0,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(entry)))
}

// POST /api/sessions/{id}/close
#[utoipa::path(
    post,
    path = "/api/sessions/{id}/close",
    tag = "Sessões de Caixa",
    request_body = CloseSessionPayload,
    responses(
        (status = 200, description = "Sessão fechada com variância calculada", body = CashSession),
        (status = 409, description = "Sessão já fechada")
    ),
    params(
        ("id" = Uuid, Path, description = "ID da sessão"),
        ("x-restaurant-id" = Uuid, Header, description = "ID do Restaurante")
    ),
    security(("api_jwt" = []))
)]
pub async fn close_session(
    State(app_state): State<AppState>,
    restaurant: RestaurantContext,
    staff: AuthenticatedStaff,
    Path(session_id): Path<Uuid>,
    Json(payload): Json<CloseSessionPayload>,
) -> Result<Json<CashSession>, AppError> {
    let mut conn = get_scoped_connection(&app_state, &restaurant, &staff).await?;

    let session = app_state
        .session_service
        .close(&mut *conn, restaurant.0, session_id, payload.actual_balance)
        .await?;

    Ok(Json(session))
}

// GET /api/sessions/metrics
#[utoipa::path(
    get,
    path = "/api/sessions/metrics",
    tag = "Sessões de Caixa",
    responses(
        (status = 200, description = "Fotografia da sessão aberta do operador", body = SessionMetrics)
    ),
    params(
        ("x-restaurant-id" = Uuid, Header, description = "ID do Restaurante")
    ),
    security(("api_jwt" = []))
)]
pub async fn session_metrics(
    State(app_state): State<AppState>,
    restaurant: RestaurantContext,
    staff: AuthenticatedStaff,
) -> Result<Json<SessionMetrics>, AppError> {
    let mut conn = get_scoped_connection(&app_state, &restaurant, &staff).await?;

    let metrics = app_state
        .session_service
        .metrics(&mut *conn, restaurant.0, &staff.0)
        .await?;

    Ok(Json(metrics))
}

// GET /api/sessions/{id}/z-report
#[utoipa::path(
    get,
    path = "/api/sessions/{id}/z-report",
    tag = "Sessões de Caixa",
    responses(
        (status = 200, description = "Z-report recalculado do ledger", body = ZReport),
        (status = 404, description = "Sessão não encontrada")
    ),
    params(
        ("id" = Uuid, Path, description = "ID da sessão"),
        ("x-restaurant-id" = Uuid, Header, description = "ID do Restaurante")
    ),
    security(("api_jwt" = []))
)]
pub async fn z_report(
    State(app_state): State<AppState>,
    restaurant: RestaurantContext,
    staff: AuthenticatedStaff,
    Path(session_id): Path<Uuid>,
) -> Result<Json<ZReport>, AppError> {
    let mut conn = get_scoped_connection(&app_state, &restaurant, &staff).await?;

    let report = app_state
        .session_service
        .z_report(&mut *conn, restaurant.0, session_id)
        .await?;

    Ok(Json(report))
}
