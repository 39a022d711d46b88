// src/services/order_service.rs

use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::{Acquire, Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::{
        error::AppError,
        events::{EventBus, EventType},
    },
    db::{OrderRepository, SessionRepository, SettingsRepository, TableRepository},
    models::{
        auth::Staff,
        orders::{
            Order, OrderDetail, OrderDetailsPayload, OrderItemPayload, OrderStatus, OrderSubRecord,
            OrderType,
        },
        sessions::LedgerEntryKind,
        tables::TableStatus,
    },
    services::{
        occupancy,
        pricing::{self, Discount},
    },
};

/// Tabela de transições legais da máquina de estados do pedido.
///
/// CANCELLED/VOIDED só têm entrada, de qualquer estado não-terminal.
/// OUT_FOR_DELIVERY e DELIVERED não aparecem como destino aqui de propósito:
/// só se entra neles por `assign_driver` / `mark_delivered`.
pub fn transition_allowed(from: OrderStatus, to: OrderStatus) -> bool {
    use OrderStatus::*;

    if from.is_terminal() {
        return false;
    }
    if matches!(to, Cancelled | Voided) {
        return true;
    }

    matches!(
        (from, to),
        (Draft, Confirmed)
            | (Confirmed, Preparing)
            | (Confirmed, Ready)
            | (Preparing, Ready)
            | (Ready, Served)
            | (Ready, BillRequested)
            | (Ready, Paid)
            | (Served, BillRequested)
            | (Served, Paid)
            | (BillRequested, Paid)
            | (OutForDelivery, Delivered)
            | (Delivered, Paid)
    )
}

#[derive(Clone)]
pub struct OrderService {
    orders: OrderRepository,
    tables: TableRepository,
    sessions: SessionRepository,
    settings: SettingsRepository,
    events: EventBus,
}

impl OrderService {
    pub fn new(
        orders: OrderRepository,
        tables: TableRepository,
        sessions: SessionRepository,
        settings: SettingsRepository,
        events: EventBus,
    ) -> Self {
        Self {
            orders,
            tables,
            sessions,
            settings,
            events,
        }
    }

    // =========================================================================
    //  CRIAÇÃO
    // =========================================================================

    #[allow(clippy::too_many_arguments)]
    pub async fn create<'e, E>(
        &self,
        executor: E,
        restaurant_id: Uuid,
        details: &OrderDetailsPayload,
        items: &[OrderItemPayload],
        target_status: OrderStatus,
        discount: Option<Discount>,
        delivery_fee_override: Option<Decimal>,
    ) -> Result<OrderDetail, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let order_type = details.order_type();

        // Pedido nasce em DRAFT ou já disparado em CONFIRMED — nada além disso.
        if !matches!(target_status, OrderStatus::Draft | OrderStatus::Confirmed) {
            return Err(AppError::Invalid(
                "Um pedido só pode ser criado em DRAFT ou CONFIRMED.".to_string(),
            ));
        }
        if items.is_empty() && target_status != OrderStatus::Draft {
            return Err(AppError::Invalid(
                "Um pedido disparado precisa de ao menos um item.".to_string(),
            ));
        }
        // Dinheiro negativo nunca entra no motor de preços nem, via PAID,
        // numa entrada SALE do ledger.
        if items.iter().any(|item| item.unit_price.is_sign_negative()) {
            return Err(AppError::Invalid(
                "O preço unitário de um item não pode ser negativo.".to_string(),
            ));
        }
        if delivery_fee_override.is_some_and(|fee| fee.is_sign_negative()) {
            return Err(AppError::Invalid(
                "A taxa de entrega não pode ser negativa.".to_string(),
            ));
        }

        let guest_count = match details {
            OrderDetailsPayload::DineIn { guest_count, .. } => {
                if *guest_count < 1 {
                    return Err(AppError::Invalid(
                        "O número de pessoas deve ser no mínimo 1.".to_string(),
                    ));
                }
                *guest_count
            }
            OrderDetailsPayload::Takeaway { customer_phone, .. } => {
                if customer_phone.trim().is_empty() {
                    return Err(AppError::Invalid(
                        "Pedido TAKEAWAY exige telefone do cliente.".to_string(),
                    ));
                }
                1
            }
            OrderDetailsPayload::Delivery {
                customer_phone,
                address,
                ..
            } => {
                if customer_phone.trim().is_empty() {
                    return Err(AppError::Invalid(
                        "Pedido DELIVERY exige telefone do cliente.".to_string(),
                    ));
                }
                if address.trim().is_empty() {
                    return Err(AppError::Invalid(
                        "Pedido DELIVERY exige endereço de entrega.".to_string(),
                    ));
                }
                1
            }
        };

        let mut tx = executor.begin().await?;

        // Taxas explícitas do restaurante → motor de preços puro.
        let settings = self.settings.get_settings(&mut *tx, restaurant_id).await?;
        let breakdown = pricing::breakdown(
            items,
            order_type,
            guest_count,
            discount,
            delivery_fee_override,
            &(&settings).into(),
        );

        // DINE_IN: trava a mesa ANTES de decidir — ocupar é parte da criação.
        let mut table_update = None;
        let table_id = match details {
            OrderDetailsPayload::DineIn { table_id, .. } => {
                let table = self
                    .tables
                    .get_for_update(&mut *tx, restaurant_id, *table_id)
                    .await?
                    .ok_or_else(|| AppError::ResourceNotFound("Mesa".to_string()))?;

                if !matches!(table.status, TableStatus::Available | TableStatus::Reserved) {
                    return Err(AppError::Invalid(format!(
                        "A mesa {} não está disponível.",
                        table.code
                    )));
                }
                Some(*table_id)
            }
            _ => None,
        };

        let order = self
            .orders
            .insert_order(
                &mut *tx,
                restaurant_id,
                order_type,
                target_status,
                &breakdown,
                table_id,
            )
            .await?;

        let inserted_items = if items.is_empty() {
            Vec::new()
        } else {
            self.orders
                .insert_items(&mut *tx, restaurant_id, order.id, items)
                .await?
        };

        let sub_record = match details {
            OrderDetailsPayload::DineIn {
                table_id,
                guest_count,
            } => {
                let detail = self
                    .orders
                    .insert_dine_in_detail(&mut *tx, order.id, *table_id, *guest_count)
                    .await?;

                let table = self
                    .tables
                    .set_status(
                        &mut *tx,
                        restaurant_id,
                        *table_id,
                        TableStatus::Occupied,
                        Some(order.id),
                    )
                    .await?;
                table_update = Some(table);

                OrderSubRecord::DineIn(detail)
            }
            OrderDetailsPayload::Takeaway {
                customer_name,
                customer_phone,
            } => OrderSubRecord::Takeaway(
                self.orders
                    .insert_takeaway_detail(
                        &mut *tx,
                        order.id,
                        customer_name.as_deref(),
                        customer_phone,
                    )
                    .await?,
            ),
            OrderDetailsPayload::Delivery {
                customer_name,
                customer_phone,
                address,
            } => OrderSubRecord::Delivery(
                self.orders
                    .insert_delivery_detail(
                        &mut *tx,
                        order.id,
                        customer_name.as_deref(),
                        customer_phone,
                        address,
                    )
                    .await?,
            ),
        };

        tx.commit().await?;

        let detail = OrderDetail {
            header: order,
            items: inserted_items,
            details: sub_record,
        };

        // Eventos SÓ depois do commit, um por entidade mutada.
        self.events.publish("orders", EventType::Insert, &detail);
        if let Some(table) = table_update {
            self.events
                .publish("dining_tables", EventType::Update, &table);
        }

        Ok(detail)
    }

    // =========================================================================
    //  TRANSIÇÃO
    // =========================================================================

    pub async fn transition<'e, E>(
        &self,
        executor: E,
        restaurant_id: Uuid,
        order_id: Uuid,
        target: OrderStatus,
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

        // Despacho e entrega têm operações próprias com pré-condições extras.
        if matches!(target, OrderStatus::OutForDelivery | OrderStatus::Delivered)
            || !transition_allowed(order.status, target)
        {
            return Err(AppError::IllegalTransition {
                from: order.status.to_string(),
                to: target.to_string(),
            });
        }

        let settled_at = (target == OrderStatus::Paid).then(Utc::now);
        let updated = self
            .orders
            .update_status(&mut *tx, restaurant_id, order_id, target, settled_at)
            .await?;

        // PAID = reconhecimento de receita: exatamente UMA entrada SALE na
        // sessão aberta do operador. Sem sessão, a operação inteira falha.
        let mut ledger_event = None;
        if target == OrderStatus::Paid {
            let session = self
                .sessions
                .find_open_by_staff_for_update(&mut *tx, restaurant_id, actor.id)
                .await?
                .ok_or(AppError::NoOpenSession)?;

            let entry = self
                .sessions
                .insert_entry(
                    &mut *tx,
                    restaurant_id,
                    session.id,
                    LedgerEntryKind::Sale,
                    updated.total,
                    Some("venda"),
                    None,
                    actor.id,
                    Some(order_id),
                )
                .await?;
            ledger_event = Some(entry);
        }

        // A mesa segue o pedido, nunca o contrário.
        let mut table_event = None;
        if updated.order_type == OrderType::DineIn {
            if let Some(table_id) = updated.table_id {
                let table = self
                    .tables
                    .set_status(
                        &mut *tx,
                        restaurant_id,
                        table_id,
                        occupancy::table_status_after(updated.status),
                        occupancy::active_order_reference(&updated),
                    )
                    .await?;
                table_event = Some(table);
            }
        }

        tx.commit().await?;

        self.events.publish("orders", EventType::Update, &updated);
        if let Some(entry) = ledger_event {
            self.events
                .publish("ledger_entries", EventType::Insert, &entry);
        }
        if let Some(table) = table_event {
            self.events
                .publish("dining_tables", EventType::Update, &table);
        }

        Ok(updated)
    }

    // =========================================================================
    //  ENTREGA
    // =========================================================================

    /// Só registra o fato logístico: a receita é reconhecida em PAID, na
    /// liquidação, nunca aqui.
    pub async fn mark_delivered<'e, E>(
        &self,
        executor: E,
        restaurant_id: Uuid,
        order_id: Uuid,
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

        if order.status != OrderStatus::OutForDelivery {
            return Err(AppError::IllegalTransition {
                from: order.status.to_string(),
                to: OrderStatus::Delivered.to_string(),
            });
        }

        let detail = self
            .orders
            .get_delivery_detail(&mut *tx, order_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Pedido".to_string()))?;

        let now = Utc::now();
        let delivery_minutes = detail
            .dispatched_at
            .map(|dispatched| (now - dispatched).num_minutes() as i32);

        self.orders
            .set_delivered(&mut *tx, order_id, now, delivery_minutes)
            .await?;
        let updated = self
            .orders
            .update_status(&mut *tx, restaurant_id, order_id, OrderStatus::Delivered, None)
            .await?;

        tx.commit().await?;

        self.events.publish("orders", EventType::Update, &updated);

        Ok(updated)
    }

    // =========================================================================
    //  LEITURA
    // =========================================================================

    pub async fn get_detail<'e, E>(
        &self,
        executor: E,
        restaurant_id: Uuid,
        order_id: Uuid,
    ) -> Result<OrderDetail, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        // Transação só de leitura: as três consultas veem o mesmo snapshot.
        let mut tx = executor.begin().await?;

        let order = self
            .orders
            .get(&mut *tx, restaurant_id, order_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Pedido".to_string()))?;
        let items = self
            .orders
            .list_items(&mut *tx, restaurant_id, order_id)
            .await?;

        let details = match order.order_type {
            OrderType::DineIn => OrderSubRecord::DineIn(
                self.orders
                    .get_dine_in_detail(&mut *tx, order_id)
                    .await?
                    .ok_or_else(|| AppError::ResourceNotFound("Pedido".to_string()))?,
            ),
            OrderType::Takeaway => OrderSubRecord::Takeaway(
                self.orders
                    .get_takeaway_detail(&mut *tx, order_id)
                    .await?
                    .ok_or_else(|| AppError::ResourceNotFound("Pedido".to_string()))?,
            ),
            OrderType::Delivery => OrderSubRecord::Delivery(
                self.orders
                    .get_delivery_detail(&mut *tx, order_id)
                    .await?
                    .ok_or_else(|| AppError::ResourceNotFound("Pedido".to_string()))?,
            ),
        };

        tx.commit().await?;

        Ok(OrderDetail {
            header: order,
            items,
            details,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use OrderStatus::*;

    #[test]
    fn fluxo_feliz_dine_in() {
        assert!(transition_allowed(Draft, Confirmed));
        assert!(transition_allowed(Confirmed, Preparing));
        assert!(transition_allowed(Preparing, Ready));
        assert!(transition_allowed(Ready, Served));
        assert!(transition_allowed(Served, BillRequested));
        assert!(transition_allowed(BillRequested, Paid));
    }

    #[test]
    fn pago_e_imutavel() {
        // PAID -> qualquer coisa é sempre ilegal.
        for target in [
            Draft, Confirmed, Preparing, Ready, Served, BillRequested, OutForDelivery, Delivered,
            Paid, Cancelled, Voided,
        ] {
            assert!(!transition_allowed(Paid, target), "PAID -> {target}");
        }
    }

    #[test]
    fn terminais_sao_imutaveis() {
        assert!(!transition_allowed(Cancelled, Confirmed));
        assert!(!transition_allowed(Voided, Draft));
        assert!(!transition_allowed(Cancelled, Voided));
    }

    #[test]
    fn cancelamento_entra_de_qualquer_estado_nao_terminal() {
        for from in [
            Draft, Confirmed, Preparing, Ready, Served, BillRequested, OutForDelivery, Delivered,
        ] {
            assert!(transition_allowed(from, Cancelled), "{from} -> CANCELLED");
            assert!(transition_allowed(from, Voided), "{from} -> VOIDED");
        }
    }

    #[test]
    fn sem_atalhos_ilegais() {
        assert!(!transition_allowed(Draft, Paid));
        assert!(!transition_allowed(Draft, Preparing));
        assert!(!transition_allowed(Confirmed, Served));
        assert!(!transition_allowed(Preparing, Paid));
        assert!(!transition_allowed(Delivered, Served));
    }

    #[test]
    fn entrega_vem_do_despacho() {
        assert!(transition_allowed(OutForDelivery, Delivered));
        assert!(transition_allowed(Delivered, Paid));
        assert!(!transition_allowed(Ready, Delivered));
        assert!(!transition_allowed(Confirmed, Delivered));
    }
}
