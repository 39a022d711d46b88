// src/db/rider_repo.rs

use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{common::error::AppError, models::riders::RiderShift};

#[derive(Clone)]
pub struct RiderShiftRepository {
    pool: PgPool,
}

impl RiderShiftRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert_shift<'e, E>(
        &self,
        executor: E,
        restaurant_id: Uuid,
        rider_id: Uuid,
        opening_float: Decimal,
    ) -> Result<RiderShift, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let shift = sqlx::query_as::<_, RiderShift>(
            r#"
            INSERT INTO rider_shifts (restaurant_id, rider_id, opening_float)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(restaurant_id)
        .bind(rider_id)
        .bind(opening_float)
        .fetch_one(executor)
        .await?;

        Ok(shift)
    }

    pub async fn find_open_by_rider<'e, E>(
        &self,
        executor: E,
        restaurant_id: Uuid,
        rider_id: Uuid,
    ) -> Result<Option<RiderShift>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let shift = sqlx::query_as::<_, RiderShift>(
            r#"
            SELECT * FROM rider_shifts
            WHERE restaurant_id = $1 AND rider_id = $2 AND status = 'OPEN'
            "#,
        )
        .bind(restaurant_id)
        .bind(rider_id)
        .fetch_optional(executor)
        .await?;

        Ok(shift)
    }

    /// Variante com lock, usada dentro da atribuição atômica de entregador:
    /// o turno não pode fechar entre a checagem e a escrita do pedido.
    pub async fn find_open_by_rider_for_update<'e, E>(
        &self,
        executor: E,
        restaurant_id: Uuid,
        rider_id: Uuid,
    ) -> Result<Option<RiderShift>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let shift = sqlx::query_as::<_, RiderShift>(
            r#"
            SELECT * FROM rider_shifts
            WHERE restaurant_id = $1 AND rider_id = $2 AND status = 'OPEN'
            FOR UPDATE
            "#,
        )
        .bind(restaurant_id)
        .bind(rider_id)
        .fetch_optional(executor)
        .await?;

        Ok(shift)
    }

    pub async fn get_for_update<'e, E>(
        &self,
        executor: E,
        restaurant_id: Uuid,
        shift_id: Uuid,
    ) -> Result<Option<RiderShift>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let shift = sqlx::query_as::<_, RiderShift>(
            "SELECT * FROM rider_shifts WHERE id = $1 AND restaurant_id = $2 FOR UPDATE",
        )
        .bind(shift_id)
        .bind(restaurant_id)
        .fetch_optional(executor)
        .await?;

        Ok(shift)
    }

    pub async fn get<'e, E>(
        &self,
        executor: E,
        restaurant_id: Uuid,
        shift_id: Uuid,
    ) -> Result<Option<RiderShift>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let shift = sqlx::query_as::<_, RiderShift>(
            "SELECT * FROM rider_shifts WHERE id = $1 AND restaurant_id = $2",
        )
        .bind(shift_id)
        .bind(restaurant_id)
        .fetch_optional(executor)
        .await?;

        Ok(shift)
    }

    pub async fn close<'e, E>(
        &self,
        executor: E,
        restaurant_id: Uuid,
        shift_id: Uuid,
        expected_liability: Decimal,
        closing_cash: Decimal,
    ) -> Result<RiderShift, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let shift = sqlx::query_as::<_, RiderShift>(
            r#"
            UPDATE rider_shifts
            SET status = 'CLOSED', expected_liability = $1, closing_cash = $2,
                closed_at = NOW()
            WHERE id = $3 AND restaurant_id = $4
            RETURNING *
            "#,
        )
        .bind(expected_liability)
        .bind(closing_cash)
        .bind(shift_id)
        .bind(restaurant_id)
        .fetch_one(executor)
        .await?;

        Ok(shift)
    }
}
