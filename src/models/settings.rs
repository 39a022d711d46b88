// src/models/settings.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::orders::OrderType;

// Taxas configuráveis por restaurante. O motor de preços NUNCA lê estado
// global: este registro é carregado e passado explicitamente como config.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RestaurantSettings {
    #[schema(ignore)] // O contexto (Header) já define o restaurante
    pub restaurant_id: Uuid,

    #[schema(example = "0.10")]
    pub service_charge_rate: Decimal,

    #[schema(example = "0.16")]
    pub tax_rate: Decimal,

    // Teto do desconto como fração do subtotal
    #[schema(example = "0.50")]
    pub max_discount_rate: Decimal,

    #[schema(example = "8.00")]
    pub default_delivery_fee: Decimal,

    pub service_charge_types: Vec<OrderType>,
    pub tax_types: Vec<OrderType>,

    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSettingsRequest {
    #[schema(example = "0.10")]
    pub service_charge_rate: Option<Decimal>,
    #[schema(example = "0.16")]
    pub tax_rate: Option<Decimal>,
    #[schema(example = "0.50")]
    pub max_discount_rate: Option<Decimal>,
    #[schema(example = "8.00")]
    pub default_delivery_fee: Option<Decimal>,
    pub service_charge_types: Option<Vec<OrderType>>,
    pub tax_types: Option<Vec<OrderType>>,
}
