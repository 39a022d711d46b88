// src/db/session_repo.rs

use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::sessions::{CashSession, LedgerEntry, LedgerEntryKind},
};

// Agregado do ledger para o Z-report, calculado sob demanda.
#[derive(Debug, sqlx::FromRow)]
pub struct LedgerTotals {
    pub total_sales: Decimal,
    pub total_payouts: Decimal,
    pub total_adjustments: Decimal,
    pub entry_sum: Decimal,
    pub transaction_count: i64,
}

#[derive(Clone)]
pub struct SessionRepository {
    pool: PgPool,
}

impl SessionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  SESSÕES
    // =========================================================================

    pub async fn insert_session<'e, E>(
        &self,
        executor: E,
        restaurant_id: Uuid,
        staff_id: Uuid,
        opening_balance: Decimal,
    ) -> Result<CashSession, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let session = sqlx::query_as::<_, CashSession>(
            r#"
            INSERT INTO cash_sessions (restaurant_id, staff_id, opening_balance)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(restaurant_id)
        .bind(staff_id)
        .bind(opening_balance)
        .fetch_one(executor)
        .await?;

        Ok(session)
    }

    pub async fn find_open_by_staff<'e, E>(
        &self,
        executor: E,
        restaurant_id: Uuid,
        staff_id: Uuid,
    ) -> Result<Option<CashSession>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let session = sqlx::query_as::<_, CashSession>(
            r#"
            SELECT * FROM cash_sessions
            WHERE restaurant_id = $1 AND staff_id = $2 AND status = 'OPEN'
            "#,
        )
        .bind(restaurant_id)
        .bind(staff_id)
        .fetch_optional(executor)
        .await?;

        Ok(session)
    }

    /// Variante com lock: a venda que liquida um pedido precisa segurar a
    /// sessão para o append não correr contra um fechamento.
    pub async fn find_open_by_staff_for_update<'e, E>(
        &self,
        executor: E,
        restaurant_id: Uuid,
        staff_id: Uuid,
    ) -> Result<Option<CashSession>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let session = sqlx::query_as::<_, CashSession>(
            r#"
            SELECT * FROM cash_sessions
            WHERE restaurant_id = $1 AND staff_id = $2 AND status = 'OPEN'
            FOR UPDATE
            "#,
        )
        .bind(restaurant_id)
        .bind(staff_id)
        .fetch_optional(executor)
        .await?;

        Ok(session)
    }

    pub async fn get<'e, E>(
        &self,
        executor: E,
        restaurant_id: Uuid,
        session_id: Uuid,
    ) -> Result<Option<CashSession>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let session = sqlx::query_as::<_, CashSession>(
            "SELECT * FROM cash_sessions WHERE id = $1 AND restaurant_id = $2",
        )
        .bind(session_id)
        .bind(restaurant_id)
        .fetch_optional(executor)
        .await?;

        Ok(session)
    }

    pub async fn get_for_update<'e, E>(
        &self,
        executor: E,
        restaurant_id: Uuid,
        session_id: Uuid,
    ) -> Result<Option<CashSession>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let session = sqlx::query_as::<_, CashSession>(
            "SELECT * FROM cash_sessions WHERE id = $1 AND restaurant_id = $2 FOR UPDATE",
        )
        .bind(session_id)
        .bind(restaurant_id)
        .fetch_optional(executor)
        .await?;

        Ok(session)
    }

    /// Fechamento: grava os números finais e marca CLOSED. Depois disso a
    /// sessão nunca mais muda.
    pub async fn close<'e, E>(
        &self,
        executor: E,
        restaurant_id: Uuid,
        session_id: Uuid,
        expected_balance: Decimal,
        actual_balance: Decimal,
        variance: Decimal,
    ) -> Result<CashSession, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let session = sqlx::query_as::<_, CashSession>(
            r#"
            UPDATE cash_sessions
            SET status = 'CLOSED', expected_balance = $1, actual_balance = $2,
                variance = $3, closed_at = NOW()
            WHERE id = $4 AND restaurant_id = $5
            RETURNING *
            "#,
        )
        .bind(expected_balance)
        .bind(actual_balance)
        .bind(variance)
        .bind(session_id)
        .bind(restaurant_id)
        .fetch_one(executor)
        .await?;

        Ok(session)
    }

    // =========================================================================
    //  LEDGER (append-only)
    // =========================================================================

    #[allow(clippy::too_many_arguments)]
    pub async fn insert_entry<'e, E>(
        &self,
        executor: E,
        restaurant_id: Uuid,
        session_id: Uuid,
        kind: LedgerEntryKind,
        amount: Decimal,
        category: Option<&str>,
        notes: Option<&str>,
        staff_id: Uuid,
        order_id: Option<Uuid>,
    ) -> Result<LedgerEntry, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let entry = sqlx::query_as::<_, LedgerEntry>(
            r#"
            INSERT INTO ledger_entries (
                restaurant_id, session_id, kind, amount, category, notes,
                staff_id, order_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(restaurant_id)
        .bind(session_id)
        .bind(kind)
        .bind(amount)
        .bind(category)
        .bind(notes)
        .bind(staff_id)
        .bind(order_id)
        .fetch_one(executor)
        .await?;

        Ok(entry)
    }

    /// Soma líquida das entradas (SALE positivo, PAYOUT negativo).
    pub async fn sum_entries<'e, E>(
        &self,
        executor: E,
        session_id: Uuid,
    ) -> Result<Decimal, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sum = sqlx::query_scalar::<_, Decimal>(
            "SELECT COALESCE(SUM(amount), 0) FROM ledger_entries WHERE session_id = $1",
        )
        .bind(session_id)
        .fetch_one(executor)
        .await?;

        Ok(sum)
    }

    pub async fn aggregate_entries<'e, E>(
        &self,
        executor: E,
        session_id: Uuid,
    ) -> Result<LedgerTotals, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let totals = sqlx::query_as::<_, LedgerTotals>(
            r#"
            SELECT
                COALESCE(SUM(amount) FILTER (WHERE kind = 'SALE'), 0)       AS total_sales,
                COALESCE(SUM(ABS(amount)) FILTER (WHERE kind = 'PAYOUT'), 0) AS total_payouts,
                COALESCE(SUM(amount) FILTER (WHERE kind = 'ADJUSTMENT'), 0)  AS total_adjustments,
                COALESCE(SUM(amount), 0)                                     AS entry_sum,
                COUNT(*)                                                     AS transaction_count
            FROM ledger_entries
            WHERE session_id = $1
            "#,
        )
        .bind(session_id)
        .fetch_one(executor)
        .await?;

        Ok(totals)
    }
}
