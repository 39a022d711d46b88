// src/services/pricing.rs

// Motor de preços: função PURA. Itens + tipo do pedido + contexto entram,
// breakdown sai. Nada de I/O, nada de estado global — as taxas chegam na
// PricingConfig carregada de restaurant_settings e passada explicitamente.

use std::collections::HashSet;

use rust_decimal::Decimal;

use crate::models::orders::{Breakdown, OrderItemPayload, OrderType};
use crate::models::settings::RestaurantSettings;

#[derive(Debug, Clone)]
pub struct PricingConfig {
    pub service_charge_rate: Decimal,
    pub tax_rate: Decimal,
    pub max_discount_rate: Decimal,
    pub default_delivery_fee: Decimal,
    pub service_charge_types: Vec<OrderType>,
    pub tax_types: Vec<OrderType>,
}

impl From<&RestaurantSettings> for PricingConfig {
    fn from(s: &RestaurantSettings) -> Self {
        Self {
            service_charge_rate: s.service_charge_rate,
            tax_rate: s.tax_rate,
            max_discount_rate: s.max_discount_rate,
            default_delivery_fee: s.default_delivery_fee,
            service_charge_types: s.service_charge_types.clone(),
            tax_types: s.tax_types.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Discount {
    Amount(Decimal),
    Percent(Decimal),
}

/// Calcula o breakdown financeiro de um pedido.
///
/// A ORDEM das camadas importa e é reproduzida exatamente:
/// desconto (com teto) → taxa de serviço sobre (subtotal − desconto) →
/// imposto sobre o valor JÁ com taxa de serviço → taxa de entrega.
pub fn breakdown(
    items: &[OrderItemPayload],
    order_type: OrderType,
    guest_count: i32,
    discount: Option<Discount>,
    delivery_fee_override: Option<Decimal>,
    config: &PricingConfig,
) -> Breakdown {
    let guests = Decimal::from(guest_count.max(1));

    // Subtotal: itens "por pessoa" contam uma única vez por referência de
    // cardápio, a unit_price × max(1, guests), independente da quantity.
    let mut seen_per_head: HashSet<uuid::Uuid> = HashSet::new();
    let mut subtotal = Decimal::ZERO;
    for item in items {
        if item.fixed_per_head {
            if seen_per_head.insert(item.menu_item_id) {
                subtotal += item.unit_price * guests;
            }
        } else {
            subtotal += item.unit_price * Decimal::from(item.quantity);
        }
    }
    let subtotal = subtotal.round_dp(2);

    // Desconto explícito ou percentual, nunca negativo, com teto configurável.
    let requested = match discount {
        Some(Discount::Amount(amount)) => amount,
        Some(Discount::Percent(pct)) => subtotal * pct / Decimal::from(100),
        None => Decimal::ZERO,
    };
    let cap = subtotal * config.max_discount_rate;
    let discount = requested.max(Decimal::ZERO).min(cap).round_dp(2);

    let discounted = subtotal - discount;

    let service_charge = if config.service_charge_types.contains(&order_type) {
        (discounted * config.service_charge_rate).round_dp(2)
    } else {
        Decimal::ZERO
    };

    // Imposto sobre o valor PÓS taxa de serviço.
    let tax = if config.tax_types.contains(&order_type) {
        ((discounted + service_charge) * config.tax_rate).round_dp(2)
    } else {
        Decimal::ZERO
    };

    let delivery_fee = if order_type == OrderType::Delivery {
        delivery_fee_override.unwrap_or(config.default_delivery_fee)
    } else {
        Decimal::ZERO
    };

    let total = subtotal - discount + service_charge + tax + delivery_fee;

    Breakdown {
        subtotal,
        discount,
        service_charge,
        tax,
        delivery_fee,
        total,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn config() -> PricingConfig {
        PricingConfig {
            service_charge_rate: Decimal::new(5, 2), // 0.05
            tax_rate: Decimal::new(16, 2),           // 0.16
            max_discount_rate: Decimal::new(50, 2),  // 0.50
            default_delivery_fee: Decimal::new(800, 2),
            service_charge_types: vec![OrderType::DineIn],
            tax_types: vec![OrderType::DineIn, OrderType::Takeaway, OrderType::Delivery],
        }
    }

    fn item(price: i64, qty: i32) -> OrderItemPayload {
        OrderItemPayload {
            menu_item_id: Uuid::new_v4(),
            name: "item".to_string(),
            quantity: qty,
            unit_price: Decimal::from(price),
            fixed_per_head: false,
        }
    }

    fn per_head(menu_item_id: Uuid, price: i64, qty: i32) -> OrderItemPayload {
        OrderItemPayload {
            menu_item_id,
            name: "couvert".to_string(),
            quantity: qty,
            unit_price: Decimal::from(price),
            fixed_per_head: true,
        }
    }

    #[test]
    fn cenario_dine_in_sem_desconto() {
        // [{price: 1000, qty: 2}], DINE_IN, serviço 5%, imposto 16%
        let b = breakdown(
            &[item(1000, 2)],
            OrderType::DineIn,
            2,
            None,
            None,
            &config(),
        );

        assert_eq!(b.subtotal, Decimal::from(2000));
        assert_eq!(b.service_charge, Decimal::from(100));
        // imposto sobre o valor pós-serviço: (2000 + 100) * 0.16 = 336
        assert_eq!(b.tax, Decimal::from(336));
        assert_eq!(b.delivery_fee, Decimal::ZERO);
        assert_eq!(b.total, Decimal::from(2436));
    }

    #[test]
    fn total_e_sempre_a_soma_das_camadas() {
        let b = breakdown(
            &[item(990, 3), item(1250, 1)],
            OrderType::Delivery,
            1,
            Some(Discount::Percent(Decimal::from(10))),
            None,
            &config(),
        );

        assert_eq!(
            b.total,
            b.subtotal - b.discount + b.service_charge + b.tax + b.delivery_fee
        );
    }

    #[test]
    fn e_puro_e_deterministico() {
        let items = [item(1000, 2), item(500, 1)];
        let a = breakdown(&items, OrderType::DineIn, 4, None, None, &config());
        let b = breakdown(&items, OrderType::DineIn, 4, None, None, &config());
        assert_eq!(a, b);
    }

    #[test]
    fn item_por_pessoa_ignora_quantity() {
        let couvert = Uuid::new_v4();
        // Mesmo couvert duas vezes com qty 3: conta UMA vez, por 4 pessoas.
        let b = breakdown(
            &[per_head(couvert, 10, 3), per_head(couvert, 10, 1)],
            OrderType::DineIn,
            4,
            None,
            None,
            &config(),
        );
        assert_eq!(b.subtotal, Decimal::from(40));
    }

    #[test]
    fn item_por_pessoa_com_zero_convidados_cobra_um() {
        let b = breakdown(
            &[per_head(Uuid::new_v4(), 10, 1)],
            OrderType::Takeaway,
            0,
            None,
            None,
            &config(),
        );
        assert_eq!(b.subtotal, Decimal::from(10));
    }

    #[test]
    fn desconto_percentual_e_clampado_ao_teto() {
        // 90% pedido, teto 50% → desconto = 500
        let b = breakdown(
            &[item(1000, 1)],
            OrderType::Takeaway,
            1,
            Some(Discount::Percent(Decimal::from(90))),
            None,
            &config(),
        );
        assert_eq!(b.discount, Decimal::from(500));
    }

    #[test]
    fn desconto_negativo_vira_zero() {
        let b = breakdown(
            &[item(1000, 1)],
            OrderType::Takeaway,
            1,
            Some(Discount::Amount(Decimal::from(-50))),
            None,
            &config(),
        );
        assert_eq!(b.discount, Decimal::ZERO);
    }

    #[test]
    fn taxa_de_servico_so_para_tipos_configurados() {
        let b = breakdown(
            &[item(1000, 1)],
            OrderType::Takeaway,
            1,
            None,
            None,
            &config(),
        );
        assert_eq!(b.service_charge, Decimal::ZERO);
        // imposto direto sobre o subtotal, já que não houve serviço
        assert_eq!(b.tax, Decimal::from(160));
    }

    #[test]
    fn taxa_de_entrega_com_override() {
        let b = breakdown(
            &[item(1000, 1)],
            OrderType::Delivery,
            1,
            None,
            Some(Decimal::new(1250, 2)),
            &config(),
        );
        assert_eq!(b.delivery_fee, Decimal::new(1250, 2));

        let b = breakdown(&[item(1000, 1)], OrderType::Delivery, 1, None, None, &config());
        assert_eq!(b.delivery_fee, Decimal::new(800, 2));

        // Fora de DELIVERY o override é ignorado.
        let b = breakdown(
            &[item(1000, 1)],
            OrderType::DineIn,
            1,
            None,
            Some(Decimal::from(99)),
            &config(),
        );
        assert_eq!(b.delivery_fee, Decimal::ZERO);
    }
}
