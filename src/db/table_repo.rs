// src/db/table_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::tables::{DiningTable, TableStatus},
};

#[derive(Clone)]
pub struct TableRepository {
    pool: PgPool,
}

impl TableRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Busca a mesa COM lock de linha (`FOR UPDATE`): a decisão de ocupar e a
    /// escrita precisam acontecer sob o mesmo lock, nunca check-then-act em
    /// duas idas ao banco.
    pub async fn get_for_update<'e, E>(
        &self,
        executor: E,
        restaurant_id: Uuid,
        table_id: Uuid,
    ) -> Result<Option<DiningTable>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let table = sqlx::query_as::<_, DiningTable>(
            "SELECT * FROM dining_tables WHERE id = $1 AND restaurant_id = $2 FOR UPDATE",
        )
        .bind(table_id)
        .bind(restaurant_id)
        .fetch_optional(executor)
        .await?;

        Ok(table)
    }

    /// Única escrita permitida em dining_tables: status + referência fraca.
    /// Só a máquina de estados do pedido chama isto.
    pub async fn set_status<'e, E>(
        &self,
        executor: E,
        restaurant_id: Uuid,
        table_id: Uuid,
        status: TableStatus,
        active_order_id: Option<Uuid>,
    ) -> Result<DiningTable, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let table = sqlx::query_as::<_, DiningTable>(
            r#"
            UPDATE dining_tables
            SET status = $1, active_order_id = $2
            WHERE id = $3 AND restaurant_id = $4
            RETURNING *
            "#,
        )
        .bind(status)
        .bind(active_order_id)
        .bind(table_id)
        .bind(restaurant_id)
        .fetch_one(executor)
        .await?;

        Ok(table)
    }
}
