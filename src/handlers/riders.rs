// src/handlers/riders.rs

use axum::{
    extract::{Path, Query, State},
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
    models::riders::{RiderSettlement, RiderShift},
};

// =============================================================================
//  PAYLOADS
// =============================================================================

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OpenShiftPayload {
    pub rider_id: Uuid,
    #[schema(example = "100.00")]
    pub opening_float: Decimal,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CloseShiftPayload {
    #[schema(example = "350.00")]
    pub closing_cash: Decimal,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveShiftQuery {
    pub rider_id: Uuid,
}

// =============================================================================
//  HANDLERS
// =============================================================================

// POST /api/rider-shifts
#[utoipa::path(
    post,
    path = "/api/rider-shifts",
    tag = "Turnos de Entregador",
    request_body = OpenShiftPayload,
    responses(
        (status = 201, description = "Turno aberto", body = RiderShift),
        (status = 409, description = "Entregador já possui turno aberto")
    ),
    params(
        ("x-restaurant-id" = Uuid, Header, description = "ID do Restaurante")
    ),
    security(("api_jwt" = []))
)]
pub async fn open_shift(
    State(app_state): State<AppState>,
    restaurant: RestaurantContext,
    staff: AuthenticatedStaff,
    Json(payload): Json<OpenShiftPayload>,
) -> Result<impl IntoResponse, AppError> {
    let mut conn = get_scoped_connection(&app_state, &restaurant, &staff).await?;

    let shift = app_state
        .rider_service
        .open_shift(
            &mut *conn,
            restaurant.0,
            payload.rider_id,
            payload.opening_float,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(shift)))
}

// POST /api/rider-shifts/{id}/close
#[utoipa::path(
    post,
    path = "/api/rider-shifts/{id}/close",
    tag = "Turnos de Entregador",
    request_body = CloseShiftPayload,
    responses(
        (status = 200, description = "Turno fechado com responsabilidade calculada", body = RiderShift),
        (status = 409, description = "Turno já fechado")
    ),
    params(
        ("id" = Uuid, Path, description = "ID do turno"),
        ("x-restaurant-id" = Uuid, Header, description = "ID do Restaurante")
    ),
    security(("api_jwt" = []))
)]
pub async fn close_shift(
    State(app_state): State<AppState>,
    restaurant: RestaurantContext,
    staff: AuthenticatedStaff,
    Path(shift_id): Path<Uuid>,
    Json(payload): Json<CloseShiftPayload>,
) -> Result<Json<RiderShift>, AppError> {
    let mut conn = get_scoped_connection(&app_state, &restaurant, &staff).await?;

    let shift = app_state
        .rider_service
        .close_shift(&mut *conn, restaurant.0, shift_id, payload.closing_cash)
        .await?;

    Ok(Json(shift))
}

// GET /api/rider-shifts/active?riderId=...
#[utoipa::path(
    get,
    path = "/api/rider-shifts/active",
    tag = "Turnos de Entregador",
    responses(
        (status = 200, description = "Turno aberto do entregador, se houver", body = Option<RiderShift>)
    ),
    params(
        ("riderId" = Uuid, Query, description = "ID do entregador"),
        ("x-restaurant-id" = Uuid, Header, description = "ID do Restaurante")
    ),
    security(("api_jwt" = []))
)]
pub async fn active_shift(
    State(app_state): State<AppState>,
    restaurant: RestaurantContext,
    staff: AuthenticatedStaff,
    Query(query): Query<ActiveShiftQuery>,
) -> Result<Json<Option<RiderShift>>, AppError> {
    let mut conn = get_scoped_connection(&app_state, &restaurant, &staff).await?;

    let shift = app_state
        .rider_service
        .active_shift(&mut *conn, restaurant.0, query.rider_id)
        .await?;

    Ok(Json(shift))
}

// GET /api/rider-shifts/{id}/pending-settlement
#[utoipa::path(
    get,
    path = "/api/rider-shifts/{id}/pending-settlement",
    tag = "Turnos de Entregador",
    responses(
        (status = 200, description = "Posição de acerto ao vivo", body = RiderSettlement),
        (status = 404, description = "Turno não encontrado")
    ),
    params(
        ("id" = Uuid, Path, description = "ID do turno"),
        ("x-restaurant-id" = Uuid, Header, description = "ID do Restaurante")
    ),
    security(("api_jwt" = []))
)]
pub async fn pending_settlement(
    State(app_state): State<AppState>,
    restaurant: RestaurantContext,
    staff: AuthenticatedStaff,
    Path(shift_id): Path<Uuid>,
) -> Result<Json<RiderSettlement>, AppError> {
    let mut conn = get_scoped_connection(&app_state, &restaurant, &staff).await?;

    let settlement = app_state
        .rider_service
        .pending_settlement(&mut *conn, restaurant.0, shift_id)
        .await?;

    Ok(Json(settlement))
}
