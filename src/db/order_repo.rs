// src/db/order_repo.rs

use chrono::{DateTime, Utc};
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::orders::{
        Breakdown, DeliveryDetail, DineInDetail, Order, OrderItem, OrderItemPayload, OrderStatus,
        OrderType, TakeawayDetail,
    },
};

#[derive(Clone)]
pub struct OrderRepository {
    pool: PgPool,
}

impl OrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  CABEÇALHO
    // =========================================================================

    pub async fn insert_order<'e, E>(
        &self,
        executor: E,
        restaurant_id: Uuid,
        order_type: OrderType,
        status: OrderStatus,
        breakdown: &Breakdown,
        table_id: Option<Uuid>,
    ) -> Result<Order, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let order = sqlx::query_as::<_, Order>(
            r#"
            INSERT INTO orders (
                restaurant_id, order_type, status,
                subtotal, discount, service_charge, tax, delivery_fee, total,
                table_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(restaurant_id)
        .bind(order_type)
        .bind(status)
        .bind(breakdown.subtotal)
        .bind(breakdown.discount)
        .bind(breakdown.service_charge)
        .bind(breakdown.tax)
        .bind(breakdown.delivery_fee)
        .bind(breakdown.total)
        .bind(table_id)
        .fetch_one(executor)
        .await?;

        Ok(order)
    }

    /// Busca o pedido COM lock de linha. Toda decisão da máquina de estados
    /// (transição, despacho, entrega) parte daqui, dentro da transação.
    pub async fn get_for_update<'e, E>(
        &self,
        executor: E,
        restaurant_id: Uuid,
        order_id: Uuid,
    ) -> Result<Option<Order>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let order = sqlx::query_as::<_, Order>(
            "SELECT * FROM orders WHERE id = $1 AND restaurant_id = $2 FOR UPDATE",
        )
        .bind(order_id)
        .bind(restaurant_id)
        .fetch_optional(executor)
        .await?;

        Ok(order)
    }

    pub async fn get<'e, E>(
        &self,
        executor: E,
        restaurant_id: Uuid,
        order_id: Uuid,
    ) -> Result<Option<Order>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let order = sqlx::query_as::<_, Order>(
            "SELECT * FROM orders WHERE id = $1 AND restaurant_id = $2",
        )
        .bind(order_id)
        .bind(restaurant_id)
        .fetch_optional(executor)
        .await?;

        Ok(order)
    }

    pub async fn update_status<'e, E>(
        &self,
        executor: E,
        restaurant_id: Uuid,
        order_id: Uuid,
        status: OrderStatus,
        settled_at: Option<DateTime<Utc>>,
    ) -> Result<Order, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let order = sqlx::query_as::<_, Order>(
            r#"
            UPDATE orders
            SET status = $1, settled_at = COALESCE($2, settled_at), updated_at = NOW()
            WHERE id = $3 AND restaurant_id = $4
            RETURNING *
            "#,
        )
        .bind(status)
        .bind(settled_at)
        .bind(order_id)
        .bind(restaurant_id)
        .fetch_one(executor)
        .await?;

        Ok(order)
    }

    /// Escrita do despacho: motorista + turno + OUT_FOR_DELIVERY numa única
    /// instrução, parte da operação atômica de atribuição.
    pub async fn set_driver<'e, E>(
        &self,
        executor: E,
        restaurant_id: Uuid,
        order_id: Uuid,
        driver_id: Uuid,
        rider_shift_id: Uuid,
    ) -> Result<Order, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let order = sqlx::query_as::<_, Order>(
            r#"
            UPDATE orders
            SET driver_id = $1, rider_shift_id = $2, status = 'OUT_FOR_DELIVERY',
                updated_at = NOW()
            WHERE id = $3 AND restaurant_id = $4
            RETURNING *
            "#,
        )
        .bind(driver_id)
        .bind(rider_shift_id)
        .bind(order_id)
        .bind(restaurant_id)
        .fetch_one(executor)
        .await?;

        Ok(order)
    }

    // =========================================================================
    //  ITENS
    // =========================================================================

    pub async fn insert_items<'e, E>(
        &self,
        executor: E,
        restaurant_id: Uuid,
        order_id: Uuid,
        items: &[OrderItemPayload],
    ) -> Result<Vec<OrderItem>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        // UNNEST insere todos os itens em uma única query.
        let menu_item_ids: Vec<Uuid> = items.iter().map(|i| i.menu_item_id).collect();
        let names: Vec<String> = items.iter().map(|i| i.name.clone()).collect();
        let quantities: Vec<i32> = items.iter().map(|i| i.quantity).collect();
        let unit_prices: Vec<rust_decimal::Decimal> =
            items.iter().map(|i| i.unit_price).collect();
        let per_head: Vec<bool> = items.iter().map(|i| i.fixed_per_head).collect();

        let rows = sqlx::query_as::<_, OrderItem>(
            r#"
            INSERT INTO order_items (
                restaurant_id, order_id, menu_item_id, name, quantity,
                unit_price, fixed_per_head
            )
            SELECT $1, $2, m, n, q, p, f
            FROM UNNEST($3::uuid[], $4::text[], $5::int[], $6::numeric[], $7::bool[])
                AS t(m, n, q, p, f)
            RETURNING *
            "#,
        )
        .bind(restaurant_id)
        .bind(order_id)
        .bind(&menu_item_ids)
        .bind(&names)
        .bind(&quantities)
        .bind(&unit_prices)
        .bind(&per_head)
        .fetch_all(executor)
        .await?;

        Ok(rows)
    }

    pub async fn list_items<'e, E>(
        &self,
        executor: E,
        restaurant_id: Uuid,
        order_id: Uuid,
    ) -> Result<Vec<OrderItem>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let items = sqlx::query_as::<_, OrderItem>(
            r#"
            SELECT * FROM order_items
            WHERE restaurant_id = $1 AND order_id = $2
            ORDER BY created_at ASC
            "#,
        )
        .bind(restaurant_id)
        .bind(order_id)
        .fetch_all(executor)
        .await?;

        Ok(items)
    }

    // =========================================================================
    //  SUB-REGISTROS (um por pedido, discriminado por order_type)
    // =========================================================================

    pub async fn insert_dine_in_detail<'e, E>(
        &self,
        executor: E,
        order_id: Uuid,
        table_id: Uuid,
        guest_count: i32,
    ) -> Result<DineInDetail, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let detail = sqlx::query_as::<_, DineInDetail>(
            r#"
            INSERT INTO order_dine_in_details (order_id, table_id, guest_count)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(order_id)
        .bind(table_id)
        .bind(guest_count)
        .fetch_one(executor)
        .await?;

        Ok(detail)
    }

    pub async fn insert_takeaway_detail<'e, E>(
        &self,
        executor: E,
        order_id: Uuid,
        customer_name: Option<&str>,
        customer_phone: &str,
    ) -> Result<TakeawayDetail, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let detail = sqlx::query_as::<_, TakeawayDetail>(
            r#"
            INSERT INTO order_takeaway_details (order_id, customer_name, customer_phone)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(order_id)
        .bind(customer_name)
        .bind(customer_phone)
        .fetch_one(executor)
        .await?;

        Ok(detail)
    }

    pub async fn insert_delivery_detail<'e, E>(
        &self,
        executor: E,
        order_id: Uuid,
        customer_name: Option<&str>,
        customer_phone: &str,
        address: &str,
    ) -> Result<DeliveryDetail, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let detail = sqlx::query_as::<_, DeliveryDetail>(
            r#"
            INSERT INTO order_delivery_details (order_id, customer_name, customer_phone, address)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(order_id)
        .bind(customer_name)
        .bind(customer_phone)
        .bind(address)
        .fetch_one(executor)
        .await?;

        Ok(detail)
    }

    pub async fn get_dine_in_detail<'e, E>(
        &self,
        executor: E,
        order_id: Uuid,
    ) -> Result<Option<DineInDetail>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let detail = sqlx::query_as::<_, DineInDetail>(
            "SELECT * FROM order_dine_in_details WHERE order_id = $1",
        )
        .bind(order_id)
        .fetch_optional(executor)
        .await?;

        Ok(detail)
    }

    pub async fn get_takeaway_detail<'e, E>(
        &self,
        executor: E,
        order_id: Uuid,
    ) -> Result<Option<TakeawayDetail>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let detail = sqlx::query_as::<_, TakeawayDetail>(
            "SELECT * FROM order_takeaway_details WHERE order_id = $1",
        )
        .bind(order_id)
        .fetch_optional(executor)
        .await?;

        Ok(detail)
    }

    pub async fn get_delivery_detail<'e, E>(
        &self,
        executor: E,
        order_id: Uuid,
    ) -> Result<Option<DeliveryDetail>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let detail = sqlx::query_as::<_, DeliveryDetail>(
            "SELECT * FROM order_delivery_details WHERE order_id = $1",
        )
        .bind(order_id)
        .fetch_optional(executor)
        .await?;

        Ok(detail)
    }

    pub async fn set_dispatched<'e, E>(
        &self,
        executor: E,
        order_id: Uuid,
        dispatched_at: DateTime<Utc>,
    ) -> Result<DeliveryDetail, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let detail = sqlx::query_as::<_, DeliveryDetail>(
            r#"
            UPDATE order_delivery_details
            SET dispatched_at = $1
            WHERE order_id = $2
            RETURNING *
            "#,
        )
        .bind(dispatched_at)
        .bind(order_id)
        .fetch_one(executor)
        .await?;

        Ok(detail)
    }

    pub async fn set_delivered<'e, E>(
        &self,
        executor: E,
        order_id: Uuid,
        delivered_at: DateTime<Utc>,
        delivery_minutes: Option<i32>,
    ) -> Result<DeliveryDetail, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let detail = sqlx::query_as::<_, DeliveryDetail>(
            r#"
            UPDATE order_delivery_details
            SET delivered_at = $1, delivery_minutes = $2
            WHERE order_id = $3
            RETURNING *
            "#,
        )
        .bind(delivered_at)
        .bind(delivery_minutes)
        .bind(order_id)
        .fetch_one(executor)
        .await?;

        Ok(detail)
    }

    // =========================================================================
    //  CONSULTAS DO ACERTO DE TURNO
    // =========================================================================

    /// Pedidos efetivamente entregues no turno (cancelado/anulado fica fora).
    pub async fn list_delivered_for_shift<'e, E>(
        &self,
        executor: E,
        restaurant_id: Uuid,
        rider_shift_id: Uuid,
    ) -> Result<Vec<Order>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let orders = sqlx::query_as::<_, Order>(
            r#"
            SELECT o.* FROM orders o
            JOIN order_delivery_details d ON d.order_id = o.id
            WHERE o.restaurant_id = $1
              AND o.rider_shift_id = $2
              AND d.delivered_at IS NOT NULL
              AND o.status NOT IN ('CANCELLED', 'VOIDED')
            ORDER BY d.delivered_at ASC
            "#,
        )
        .bind(restaurant_id)
        .bind(rider_shift_id)
        .fetch_all(executor)
        .await?;

        Ok(orders)
    }
}
