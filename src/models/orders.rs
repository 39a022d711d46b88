// src/models/orders.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// --- Enums (mapeando o Postgres) ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "order_type", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderType {
    DineIn,
    Takeaway,
    Delivery,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "order_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Draft,
    Confirmed,
    Preparing,
    Ready,
    Served,
    BillRequested,
    OutForDelivery,
    Delivered,
    Paid,
    Cancelled,
    Voided,
}

impl OrderStatus {
    /// Estados terminais são imutáveis: nenhuma transição sai deles.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Paid | Self::Cancelled | Self::Voided)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "DRAFT",
            Self::Confirmed => "CONFIRMED",
            Self::Preparing => "PREPARING",
            Self::Ready => "READY",
            Self::Served => "SERVED",
            Self::BillRequested => "BILL_REQUESTED",
            Self::OutForDelivery => "OUT_FOR_DELIVERY",
            Self::Delivered => "DELIVERED",
            Self::Paid => "PAID",
            Self::Cancelled => "CANCELLED",
            Self::Voided => "VOIDED",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "order_item_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderItemStatus {
    Pending,
    Preparing,
    Served,
    Cancelled,
}

// --- Structs principais ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: Uuid,
    #[schema(ignore)]
    pub restaurant_id: Uuid,
    pub order_type: OrderType,
    pub status: OrderStatus,

    // Breakdown financeiro calculado pelo motor de preços
    #[schema(example = "150.50")]
    pub subtotal: Decimal,
    pub discount: Decimal,
    pub service_charge: Decimal,
    pub tax: Decimal,
    pub delivery_fee: Decimal,
    pub total: Decimal,

    // Vínculos (o pedido é o dono destas referências)
    pub table_id: Option<Uuid>,
    pub driver_id: Option<Uuid>,
    pub rider_shift_id: Option<Uuid>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub settled_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub id: Uuid,
    #[schema(ignore)]
    pub restaurant_id: Uuid,
    pub order_id: Uuid,
    pub menu_item_id: Uuid,
    #[schema(example = "Feijoada completa")]
    pub name: String,
    #[schema(example = 2)]
    pub quantity: i32,
    #[schema(example = "50.00")]
    pub unit_price: Decimal,
    // Itens "por pessoa" (couvert, rodízio): cobrados uma vez por referência
    // de cardápio a unit_price × max(1, guest_count), ignorando quantity.
    pub fixed_per_head: bool,
    pub status: OrderItemStatus,
    pub created_at: DateTime<Utc>,
}

// Resultado do motor de preços. total = subtotal - discount + service_charge
// + tax + delivery_fee, sempre.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Breakdown {
    pub subtotal: Decimal,
    pub discount: Decimal,
    pub service_charge: Decimal,
    pub tax: Decimal,
    pub delivery_fee: Decimal,
    pub total: Decimal,
}

// --- Sub-registros (exatamente UM por pedido, casando com order_type) ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DineInDetail {
    pub order_id: Uuid,
    pub table_id: Uuid,
    #[schema(example = 4)]
    pub guest_count: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TakeawayDetail {
    pub order_id: Uuid,
    pub customer_name: Option<String>,
    #[schema(example = "(11) 99999-8888")]
    pub customer_phone: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryDetail {
    pub order_id: Uuid,
    pub customer_name: Option<String>,
    #[schema(example = "(11) 99999-8888")]
    pub customer_phone: String,
    #[schema(example = "Rua das Flores, 123 - Centro")]
    pub address: String,
    pub dispatched_at: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub delivery_minutes: Option<i32>,
}

// União etiquetada, discriminada por `type` — nunca "tudo opcional".
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderSubRecord {
    DineIn(DineInDetail),
    Takeaway(TakeawayDetail),
    Delivery(DeliveryDetail),
}

// Pedido completo: cabeçalho + itens + sub-registro.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetail {
    #[serde(flatten)]
    pub header: Order,
    pub items: Vec<OrderItem>,
    pub details: OrderSubRecord,
}

// --- Payloads de entrada ---

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(
    tag = "type",
    rename_all = "SCREAMING_SNAKE_CASE",
    rename_all_fields = "camelCase"
)]
pub enum OrderDetailsPayload {
    DineIn {
        table_id: Uuid,
        guest_count: i32,
    },
    Takeaway {
        customer_name: Option<String>,
        customer_phone: String,
    },
    Delivery {
        customer_name: Option<String>,
        customer_phone: String,
        address: String,
    },
}

impl OrderDetailsPayload {
    pub fn order_type(&self) -> OrderType {
        match self {
            Self::DineIn { .. } => OrderType::DineIn,
            Self::Takeaway { .. } => OrderType::Takeaway,
            Self::Delivery { .. } => OrderType::Delivery,
        }
    }
}

// Dinheiro que entra pela API nunca é negativo: desconto e estorno têm
// caminhos próprios (discount, ADJUSTMENT), nunca um preço com sinal trocado.
pub fn validate_money_non_negative(value: &Decimal) -> Result<(), validator::ValidationError> {
    if value.is_sign_negative() {
        let mut error = validator::ValidationError::new("negative_money");
        error.message = Some("O valor não pode ser negativo.".into());
        return Err(error);
    }
    Ok(())
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemPayload {
    pub menu_item_id: Uuid,

    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "Feijoada completa")]
    pub name: String,

    #[validate(range(min = 1, message = "A quantidade deve ser no mínimo 1."))]
    #[schema(example = 2)]
    pub quantity: i32,

    #[validate(custom(function = validate_money_non_negative))]
    #[schema(example = "50.00")]
    pub unit_price: Decimal,

    #[serde(default)]
    pub fixed_per_head: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    fn item(price: i64) -> OrderItemPayload {
        OrderItemPayload {
            menu_item_id: Uuid::new_v4(),
            name: "item".to_string(),
            quantity: 1,
            unit_price: Decimal::from(price),
            fixed_per_head: false,
        }
    }

    #[test]
    fn preco_unitario_negativo_e_rejeitado() {
        assert!(item(-100).validate().is_err());
    }

    #[test]
    fn preco_unitario_zero_ou_positivo_passa() {
        // cortesia (preço zero) é legítima
        assert!(item(0).validate().is_ok());
        assert!(item(50).validate().is_ok());
    }
}
