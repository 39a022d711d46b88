// src/services/occupancy.rs

// Rastreador de ocupação de mesa: redutor PURO dirigido pelos eventos da
// máquina de estados do pedido. Antes, cada tela inferia o status da mesa
// do seu jeito; agora a derivação mora num único lugar e SÓ a máquina de
// estados o invoca.

use crate::models::orders::{Order, OrderStatus};
use crate::models::tables::TableStatus;

/// Novo status da mesa depois de uma transição do pedido DINE_IN vinculado.
///
/// PAID / CANCELLED / VOIDED ⇒ DIRTY (mesa liberada, aguardando limpeza);
/// qualquer estado ativo ⇒ OCCUPIED.
pub fn table_status_after(order_status: OrderStatus) -> TableStatus {
    if order_status.is_terminal() {
        TableStatus::Dirty
    } else {
        TableStatus::Occupied
    }
}

/// Referência fraca da mesa de volta ao pedido: mantida enquanto o pedido
/// está vivo, limpa quando ele termina.
pub fn active_order_reference(order: &Order) -> Option<uuid::Uuid> {
    if order.status.is_terminal() {
        None
    } else {
        Some(order.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn estados_terminais_sujam_a_mesa() {
        assert_eq!(table_status_after(OrderStatus::Paid), TableStatus::Dirty);
        assert_eq!(table_status_after(OrderStatus::Cancelled), TableStatus::Dirty);
        assert_eq!(table_status_after(OrderStatus::Voided), TableStatus::Dirty);
    }

    #[test]
    fn estados_ativos_ocupam_a_mesa() {
        for status in [
            OrderStatus::Confirmed,
            OrderStatus::Preparing,
            OrderStatus::Ready,
            OrderStatus::Served,
            OrderStatus::BillRequested,
        ] {
            assert_eq!(table_status_after(status), TableStatus::Occupied);
        }
    }

    #[test]
    fn mesa_ocupada_se_e_somente_se_pedido_nao_terminal() {
        for status in [
            OrderStatus::Draft,
            OrderStatus::Confirmed,
            OrderStatus::Preparing,
            OrderStatus::Ready,
            OrderStatus::Served,
            OrderStatus::BillRequested,
            OrderStatus::OutForDelivery,
            OrderStatus::Delivered,
            OrderStatus::Paid,
            OrderStatus::Cancelled,
            OrderStatus::Voided,
        ] {
            let occupied = table_status_after(status) == TableStatus::Occupied;
            assert_eq!(occupied, !status.is_terminal());
        }
    }
}
