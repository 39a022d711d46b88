// src/db/audit_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::common::error::AppError;

#[derive(Clone)]
pub struct AuditRepository {
    pool: PgPool,
}

impl AuditRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Registra uma ação sensível DENTRO da transação da operação: se a
    /// operação sofre rollback, o registro de auditoria some junto.
    pub async fn record<'e, E>(
        &self,
        executor: E,
        restaurant_id: Uuid,
        staff_id: Uuid,
        action: &str,
        entity: &str,
        entity_id: Uuid,
        details: serde_json::Value,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            r#"
            INSERT INTO audit_log (restaurant_id, staff_id, action, entity, entity_id, details)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(restaurant_id)
        .bind(staff_id)
        .bind(action)
        .bind(entity)
        .bind(entity_id)
        .bind(details)
        .execute(executor)
        .await?;

        Ok(())
    }
}
