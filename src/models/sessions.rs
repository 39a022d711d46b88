// src/models/sessions.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "session_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionStatus {
    Open,
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "ledger_entry_kind", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LedgerEntryKind {
    Sale,       // Sempre positivo
    Payout,     // Sempre negativo
    Adjustment, // Sinal livre
}

// Janela de responsabilidade de um operador sobre a gaveta de dinheiro.
// Depois de CLOSED os números nunca mais mudam.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CashSession {
    pub id: Uuid,
    #[schema(ignore)]
    pub restaurant_id: Uuid,
    pub staff_id: Uuid,
    pub status: SessionStatus,
    #[schema(example = "5000.00")]
    pub opening_balance: Decimal,
    pub expected_balance: Option<Decimal>,
    pub actual_balance: Option<Decimal>,
    // variance = actual - expected, calculado no fechamento
    pub variance: Option<Decimal>,
    pub opened_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
}

// Fato financeiro imutável: append-only, nunca UPDATE ou DELETE.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntry {
    pub id: Uuid,
    #[schema(ignore)]
    pub restaurant_id: Uuid,
    pub session_id: Uuid,
    pub kind: LedgerEntryKind,
    #[schema(example = "-200.00")]
    pub amount: Decimal,
    #[schema(example = "fornecedor")]
    pub category: Option<String>,
    pub notes: Option<String>,
    pub staff_id: Uuid,
    // SALE referencia o pedido liquidado
    pub order_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

// Snapshot read-only da sessão aberta do operador.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionMetrics {
    pub open_session: Option<CashSession>,
    #[schema(example = "6300.00")]
    pub running_total: Decimal,
}

// Z-report: reconciliação calculada sob demanda a partir do ledger —
// nunca cacheada para não divergir das entradas.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ZReport {
    pub session_id: Uuid,
    pub total_sales: Decimal,
    // Soma dos valores absolutos dos PAYOUTs
    pub total_payouts: Decimal,
    pub opening_balance: Decimal,
    pub expected_balance: Decimal,
    pub actual_balance: Option<Decimal>,
    pub variance: Option<Decimal>,
    pub transaction_count: i64,
}
