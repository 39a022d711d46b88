// src/db/settings_repo.rs

use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::orders::OrderType,
    models::settings::{RestaurantSettings, UpdateSettingsRequest},
};

#[derive(Clone)]
pub struct SettingsRepository {
    pool: PgPool,
}

impl SettingsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get_settings<'e, E>(
        &self,
        executor: E,
        restaurant_id: Uuid,
    ) -> Result<RestaurantSettings, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        // Restaurante sem registro usa os mesmos defaults do schema.
        let settings = sqlx::query_as::<_, RestaurantSettings>(
            "SELECT * FROM restaurant_settings WHERE restaurant_id = $1",
        )
        .bind(restaurant_id)
        .fetch_optional(executor)
        .await?;

        match settings {
            Some(s) => Ok(s),
            None => Ok(RestaurantSettings {
                restaurant_id,
                service_charge_rate: Decimal::new(10, 2),  // 0.10
                tax_rate: Decimal::new(16, 2),             // 0.16
                max_discount_rate: Decimal::new(50, 2),    // 0.50
                default_delivery_fee: Decimal::ZERO,
                service_charge_types: vec![OrderType::DineIn],
                tax_types: vec![
                    OrderType::DineIn,
                    OrderType::Takeaway,
                    OrderType::Delivery,
                ],
                updated_at: None,
            }),
        }
    }

    pub async fn update_settings<'e, E>(
        &self,
        executor: E,
        restaurant_id: Uuid,
        input: UpdateSettingsRequest,
    ) -> Result<RestaurantSettings, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        // UPSERT (Insert or Update); campos ausentes mantêm o valor atual.
        let settings = sqlx::query_as::<_, RestaurantSettings>(
            r#"
            INSERT INTO restaurant_settings (
                restaurant_id, service_charge_rate, tax_rate, max_discount_rate,
                default_delivery_fee, service_charge_types, tax_types, updated_at
            )
            VALUES (
                $1,
                COALESCE($2, 0.10), COALESCE($3, 0.16), COALESCE($4, 0.50),
                COALESCE($5, 0),
                COALESCE($6, '{DINE_IN}'::order_type[]),
                COALESCE($7, '{DINE_IN,TAKEAWAY,DELIVERY}'::order_type[]),
                NOW()
            )
            ON CONFLICT (restaurant_id)
            DO UPDATE SET
                service_charge_rate  = COALESCE($2, restaurant_settings.service_charge_rate),
                tax_rate             = COALESCE($3, restaurant_settings.tax_rate),
                max_discount_rate    = COALESCE($4, restaurant_settings.max_discount_rate),
                default_delivery_fee = COALESCE($5, restaurant_settings.default_delivery_fee),
                service_charge_types = COALESCE($6, restaurant_settings.service_charge_types),
                tax_types            = COALESCE($7, restaurant_settings.tax_types),
                updated_at           = NOW()
            RETURNING *
            "#,
        )
        .bind(restaurant_id)
        .bind(input.service_charge_rate)
        .bind(input.tax_rate)
        .bind(input.max_discount_rate)
        .bind(input.default_delivery_fee)
        .bind(input.service_charge_types)
        .bind(input.tax_types)
        .fetch_one(executor)
        .await?;

        Ok(settings)
    }
}
