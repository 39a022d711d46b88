// src/services/rider_service.rs

use rust_decimal::Decimal;
use serde_json::json;
use sqlx::{Acquire, Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::{
        error::AppError,
        events::{EventBus, EventType},
    },
    db::{AuditRepository, OrderRepository, RiderShiftRepository, StaffRepository},
    models::{
        auth::Staff,
        orders::{Order, OrderStatus, OrderType},
        riders::{RiderSettlement, RiderShift},
        sessions::SessionStatus,
    },
};

/// O que o entregador deve devolver ao fechar: troco inicial + total dos
/// pedidos efetivamente entregues no turno.
pub fn expected_liability(opening_float: Decimal, delivered_orders: &[Order]) -> Decimal {
    opening_float
        + delivered_orders
            .iter()
            .map(|order| order.total)
            .sum::<Decimal>()
}

#[derive(Clone)]
pub struct RiderService {
    orders: OrderRepository,
    shifts: RiderShiftRepository,
    staff: StaffRepository,
    audit: AuditRepository,
    events: EventBus,
}

impl RiderService {
    pub fn new(
        orders: OrderRepository,
        shifts: RiderShiftRepository,
        staff: StaffRepository,
        audit: AuditRepository,
        events: EventBus,
    ) -> Self {
        Self {
            orders,
            shifts,
            staff,
            audit,
            events,
        }
    }

    // =========================================================================
    //  TURNOS
    // =========================================================================

    /// Abre um turno com o troco inicial. No máximo UM turno aberto por
    /// entregador, garantido pela checagem + índice único parcial.
    pub async fn open_shift<'e, E>(
        &self,
        executor: E,
        restaurant_id: Uuid,
        rider_id: Uuid,
        opening_float: Decimal,
    ) -> Result<RiderShift, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        if opening_float < Decimal::ZERO {
            return Err(AppError::Invalid(
                "O troco inicial não pode ser negativo.".to_string(),
            ));
        }

        let mut tx = executor.begin().await?;

        if self
            .shifts
            .find_open_by_rider(&mut *tx, restaurant_id, rider_id)
            .await?
            .is_some()
        {
            return Err(AppError::ShiftAlreadyOpen);
        }

        // Corrida com outra abertura: o índice parcial decide, e o perdedor
        // responde o mesmo 409 da checagem.
        let shift = self
            .shifts
            .insert_shift(&mut *tx, restaurant_id, rider_id, opening_float)
            .await
            .map_err(|e| e.on_unique_violation("ux_rider_shifts_open", AppError::ShiftAlreadyOpen))?;

        tx.commit().await?;

        self.events
            .publish("rider_shifts", EventType::Insert, &shift);

        Ok(shift)
    }

    /// Fecha o turno: recomputa a responsabilidade esperada a partir dos
    /// pedidos entregues e grava o dinheiro devolvido.
    pub async fn close_shift<'e, E>(
        &self,
        executor: E,
        restaurant_id: Uuid,
        shift_id: Uuid,
        closing_cash: Decimal,
    ) -> Result<RiderShift, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let shift = self
            .shifts
            .get_for_update(&mut *tx, restaurant_id, shift_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Turno".to_string()))?;

        if shift.status == SessionStatus::Closed {
            return Err(AppError::ShiftClosed);
        }

        let delivered = self
            .orders
            .list_delivered_for_shift(&mut *tx, restaurant_id, shift_id)
            .await?;
        let liability = expected_liability(shift.opening_float, &delivered);

        let closed = self
            .shifts
            .close(&mut *tx, restaurant_id, shift_id, liability, closing_cash)
            .await?;

        tx.commit().await?;

        self.events
            .publish("rider_shifts", EventType::Update, &closed);

        Ok(closed)
    }

    pub async fn active_shift<'e, E>(
        &self,
        executor: E,
        restaurant_id: Uuid,
        rider_id: Uuid,
    ) -> Result<Option<RiderShift>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.shifts
            .find_open_by_rider(executor, restaurant_id, rider_id)
            .await
    }

    /// Posição de acerto ao vivo, sem fechar nada.
    pub async fn pending_settlement<'e, E>(
        &self,
        executor: E,
        restaurant_id: Uuid,
        shift_id: Uuid,
    ) -> Result<RiderSettlement, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let shift = self
            .shifts
            .get(&mut *tx, restaurant_id, shift_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Turno".to_string()))?;

        let delivered = self
            .orders
            .list_delivered_for_shift(&mut *tx, restaurant_id, shift_id)
            .await?;
        tx.commit().await?;

        let liability = expected_liability(shift.opening_float, &delivered);

        Ok(RiderSettlement {
            shift,
            delivered_orders: delivered,
            expected_liability: liability,
        })
    }

    // =========================================================================
    //  DESPACHO ATÔMICO
    // =========================================================================

    /// Atribui um entregador a um pedido DELIVERY. Tudo numa transação só,
    /// com o pedido travado primeiro: dois despachos concorrentes sobre o
    /// mesmo pedido terminam com exatamente UM vencedor e um 409.
    pub async fn assign_driver<'e, E>(
        &self,
        executor: E,
        restaurant_id: Uuid,
        order_id: Uuid,
        driver_id: Uuid,
        actor: &Staff,
    ) -> Result<Order, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let order = self
            .orders
            .get_for_update(&mut *tx, restaurant_id, order_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Pedido".to_string()))?;

        if order.order_type != OrderType::Delivery {
            return Err(AppError::Invalid(
                "Só pedidos DELIVERY recebem entregador.".to_string(),
            ));
        }
        // Quem perdeu a corrida encontra o motorista já gravado.
        if order.driver_id.is_some() || order.status == OrderStatus::OutForDelivery {
            return Err(AppError::AlreadyAssigned);
        }
        if !matches!(order.status, OrderStatus::Confirmed | OrderStatus::Ready) {
            return Err(AppError::IllegalTransition {
                from: order.status.to_string(),
                to: OrderStatus::OutForDelivery.to_string(),
            });
        }

        let shift = self
            .shifts
            .find_open_by_rider_for_update(&mut *tx, restaurant_id, driver_id)
            .await?
            .ok_or(AppError::NoActiveShift)?;

        let updated = self
            .orders
            .set_driver(&mut *tx, restaurant_id, order_id, driver_id, shift.id)
            .await?;
        self.orders
            .set_dispatched(&mut *tx, order_id, chrono::Utc::now())
            .await?;
        self.staff
            .increment_delivery_count(&mut *tx, restaurant_id, driver_id)
            .await?;

        self.audit
            .record(
                &mut *tx,
                restaurant_id,
                actor.id,
                "order.assign_driver",
                "orders",
                order_id,
                json!({ "driverId": driver_id, "riderShiftId": shift.id }),
            )
            .await?;

        tx.commit().await?;

        self.events.publish("orders", EventType::Update, &updated);

        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn delivered_order(total: i64) -> Order {
        Order {
            id: Uuid::new_v4(),
            restaurant_id: Uuid::new_v4(),
            order_type: OrderType::Delivery,
            status: OrderStatus::Delivered,
            subtotal: Decimal::from(total),
            discount: Decimal::ZERO,
            service_charge: Decimal::ZERO,
            tax: Decimal::ZERO,
            delivery_fee: Decimal::ZERO,
            total: Decimal::from(total),
            table_id: None,
            driver_id: Some(Uuid::new_v4()),
            rider_shift_id: Some(Uuid::new_v4()),
            settled_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn responsabilidade_soma_troco_e_entregas() {
        let orders = vec![delivered_order(120), delivered_order(80)];
        assert_eq!(
            expected_liability(Decimal::from(100), &orders),
            Decimal::from(300)
        );
    }

    #[test]
    fn turno_sem_entregas_deve_so_o_troco() {
        assert_eq!(expected_liability(Decimal::from(100), &[]), Decimal::from(100));
    }
}
