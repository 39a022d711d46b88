// src/models/riders.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::orders::Order;
use crate::models::sessions::SessionStatus;

// Janela de responsabilidade de um entregador, estruturalmente paralela à
// CashSession mas escopada aos pedidos DELIVERY em vez da gaveta.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RiderShift {
    pub id: Uuid,
    #[schema(ignore)]
    pub restaurant_id: Uuid,
    pub rider_id: Uuid,
    pub status: SessionStatus,
    #[schema(example = "100.00")]
    pub opening_float: Decimal,
    pub closing_cash: Option<Decimal>,
    // opening_float + Σ(total dos pedidos entregues no turno)
    pub expected_liability: Option<Decimal>,
    pub opened_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
}

// Posição de acerto do turno: o que o entregador ainda deve devolver.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RiderSettlement {
    pub shift: RiderShift,
    pub delivered_orders: Vec<Order>,
    #[schema(example = "350.00")]
    pub expected_liability: Decimal,
}
