// src/handlers/settings.rs

use axum::{extract::State, Json};
use rust_decimal::Decimal;

use crate::{
    common::{db_utils::get_scoped_connection, error::AppError},
    config::AppState,
    middleware::{auth::AuthenticatedStaff, tenancy::RestaurantContext},
    models::settings::{RestaurantSettings, UpdateSettingsRequest},
};

// Taxas como frações de 1, nunca percentuais.
fn validate_rate(name: &str, rate: Option<Decimal>) -> Result<(), AppError> {
    if let Some(rate) = rate {
        if rate < Decimal::ZERO || rate > Decimal::ONE {
            return Err(AppError::Invalid(format!(
                "`{}` deve estar entre 0 e 1.",
                name
            )));
        }
    }
    Ok(())
}

// GET /api/settings
#[utoipa::path(
    get,
    path = "/api/settings",
    tag = "Configurações",
    responses(
        (status = 200, description = "Taxas do restaurante (defaults quando nunca configuradas)", body = RestaurantSettings)
    ),
    params(
        ("x-restaurant-id" = Uuid, Header, description = "ID do Restaurante")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_settings(
    State(app_state): State<AppState>,
    restaurant: RestaurantContext,
    staff: AuthenticatedStaff,
) -> Result<Json<RestaurantSettings>, AppError> {
    let mut conn = get_scoped_connection(&app_state, &restaurant, &staff).await?;

    let settings = app_state
        .settings_repo
        .get_settings(&mut *conn, restaurant.0)
        .await?;

    Ok(Json(settings))
}

// PUT /api/settings
#[utoipa::path(
    put,
    path = "/api/settings",
    tag = "Configurações",
    request_body = UpdateSettingsRequest,
    responses(
        (status = 200, description = "Taxas atualizadas", body = RestaurantSettings),
        (status = 400, description = "Taxa fora do intervalo [0, 1]")
    ),
    params(
        ("x-restaurant-id" = Uuid, Header, description = "ID do Restaurante")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_settings(
    State(app_state): State<AppState>,
    restaurant: RestaurantContext,
    staff: AuthenticatedStaff,
    Json(payload): Json<UpdateSettingsRequest>,
) -> Result<Json<RestaurantSettings>, AppError> {
    validate_rate("serviceChargeRate", payload.service_charge_rate)?;
    validate_rate("taxRate", payload.tax_rate)?;
    validate_rate("maxDiscountRate", payload.max_discount_rate)?;
    if let Some(fee) = payload.default_delivery_fee {
        if fee < Decimal::ZERO {
            return Err(AppError::Invalid(
                "`defaultDeliveryFee` não pode ser negativa.".to_string(),
            ));
        }
    }

    let mut conn = get_scoped_connection(&app_state, &restaurant, &staff).await?;

    let settings = app_state
        .settings_repo
        .update_settings(&mut *conn, restaurant.0, payload)
        .await?;

    Ok(Json(settings))
}
