// src/db/staff_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{common::error::AppError, models::auth::Staff};

#[derive(Clone)]
pub struct StaffRepository {
    pool: PgPool,
}

impl StaffRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<Staff>, AppError> {
        let staff = sqlx::query_as::<_, Staff>("SELECT * FROM staff WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(staff)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Staff>, AppError> {
        let staff = sqlx::query_as::<_, Staff>("SELECT * FROM staff WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(staff)
    }

    // Parte da operação atômica de despacho: conta entregas do motorista.
    pub async fn increment_delivery_count<'e, E>(
        &self,
        executor: E,
        restaurant_id: Uuid,
        driver_id: Uuid,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            r#"
            UPDATE staff
            SET delivery_count = delivery_count + 1, updated_at = NOW()
            WHERE id = $1 AND restaurant_id = $2
            "#,
        )
        .bind(driver_id)
        .bind(restaurant_id)
        .execute(executor)
        .await?;

        Ok(())
    }
}
