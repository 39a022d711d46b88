// src/models/tables.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "table_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TableStatus {
    Available,
    Occupied,
    Dirty,
    Cleaning,
    Reserved,
    OutOfService,
}

// Uma mesa física. Invariante: OCCUPIED se e somente se um pedido DINE_IN
// não-terminal a referencia. Enquanto houver pedido vinculado, o status só
// muda como CONSEQUÊNCIA de uma transição do pedido.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DiningTable {
    pub id: Uuid,
    #[schema(ignore)]
    pub restaurant_id: Uuid,
    #[schema(example = "M12")]
    pub code: String,
    #[schema(example = 4)]
    pub capacity: i32,
    pub status: TableStatus,
    // Referência fraca de volta ao pedido: o pedido é o dono do vínculo.
    pub active_order_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}
