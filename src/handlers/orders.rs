// src/handlers/orders.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{db_utils::get_scoped_connection, error::AppError},
    config::AppState,
    middleware::{auth::AuthenticatedStaff, tenancy::RestaurantContext},
    models::orders::{
        Order, OrderDetail, OrderDetailsPayload, OrderItemPayload, OrderStatus,
    },
    services::pricing::Discount,
};

// =============================================================================
//  PAYLOADS
// =============================================================================

// Desconto na criação: valor OU percentual, nunca os dois.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DiscountPayload {
    #[schema(example = "15.00")]
    pub amount: Option<Decimal>,
    #[schema(example = "10")]
    pub percent: Option<Decimal>,
}

impl DiscountPayload {
    fn into_discount(self) -> Result<Discount, AppError> {
        match (self.amount, self.percent) {
            (Some(amount), None) => Ok(Discount::Amount(amount)),
            (None, Some(percent)) => Ok(Discount::Percent(percent)),
            _ => Err(AppError::Invalid(
                "Informe `amount` OU `percent` no desconto, nunca ambos.".to_string(),
            )),
        }
    }
}

fn default_status() -> OrderStatus {
    OrderStatus::Draft
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderPayload {
    // Sub-registro discriminado por `type`: DINE_IN, TAKEAWAY ou DELIVERY
    pub details: OrderDetailsPayload,

    #[validate(nested)]
    pub items: Vec<OrderItemPayload>,

    // DRAFT por omissão; CONFIRMED dispara direto para a cozinha
    #[serde(default = "default_status")]
    pub status: OrderStatus,

    pub discount: Option<DiscountPayload>,

    // Só para DELIVERY; ausente usa a taxa padrão do restaurante
    #[validate(custom(function = crate::models::orders::validate_money_non_negative))]
    #[schema(example = "12.50")]
    pub delivery_fee: Option<Decimal>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransitionPayload {
    pub status: OrderStatus,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssignDriverPayload {
    pub driver_id: Uuid,
}

// =============================================================================
//  HANDLERS
// =============================================================================

// POST /api/orders
#[utoipa::path(
    post,
    path = "/api/orders",
    tag = "Pedidos",
    request_body = CreateOrderPayload,
    responses(
        (status = 201, description = "Pedido criado", body = OrderDetail),
        (status = 400, description = "Dados inválidos")
    ),
    params(
        ("x-restaurant-id" = Uuid, Header, description = "ID do Restaurante")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_order(
    State(app_state): State<AppState>,
    restaurant: RestaurantContext,
    staff: AuthenticatedStaff,
    Json(payload): Json<CreateOrderPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;
    let discount = payload.discount.map(DiscountPayload::into_discount).transpose()?;

    let mut conn = get_scoped_connection(&app_state, &restaurant, &staff).await?;

    let detail = app_state
        .order_service
        .create(
            &mut *conn,
            restaurant.0,
            &payload.details,
            &payload.items,
            payload.status,
            discount,
            payload.delivery_fee,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(detail)))
}

// GET /api/orders/{id}
#[utoipa::path(
    get,
    path = "/api/orders/{id}",
    tag = "Pedidos",
    responses(
        (status = 200, description = "Pedido completo", body = OrderDetail),
        (status = 404, description = "Pedido não encontrado")
    ),
    params(
        ("id" = Uuid, Path, description = "ID do pedido"),
        ("x-restaurant-id" = Uuid, Header, description = "ID do Restaurante")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_order(
    State(app_state): State<AppState>,
    restaurant: RestaurantContext,
    staff: AuthenticatedStaff,
    Path(order_id): Path<Uuid>,
) -> Result<Json<OrderDetail>, AppError> {
    let mut conn = get_scoped_connection(&app_state, &restaurant, &staff).await?;

    let detail = app_state
        .order_service
        .get_detail(&mut *conn, restaurant.0, order_id)
        .await?;

    Ok(Json(detail))
}

// POST /api/orders/{id}/transition
#[utoipa::path(
    post,
    path = "/api/orders/{id}/transition",
    tag = "Pedidos",
    request_body = TransitionPayload,
    responses(
        (status = 200, description = "Pedido atualizado", body = Order),
        (status = 409, description = "Transição ilegal ou pré-condição violada")
    ),
    params(
        ("id" = Uuid, Path, description = "ID do pedido"),
        ("x-restaurant-id" = Uuid, Header, description = "ID do Restaurante")
    ),
    security(("api_jwt" = []))
)]
pub async fn transition_order(
    State(app_state): State<AppState>,
    restaurant: RestaurantContext,
    staff: AuthenticatedStaff,
    Path(order_id): Path<Uuid>,
    Json(payload): Json<TransitionPayload>,
) -> Result<Json<Order>, AppError> {
    let mut conn = get_scoped_connection(&app_state, &restaurant, &staff).await?;

    let order = app_state
        .order_service
        .transition(&mut *conn, restaurant.0, order_id, payload.status, &staff.0)
        .await?;

    Ok(Json(order))
}

// POST /api/orders/{id}/assign-driver
#[utoipa::path(
    post,
    path = "/api/orders/{id}/assign-driver",
    tag = "Pedidos",
    request_body = AssignDriverPayload,
    responses(
        (status = 200, description = "Entregador atribuído, pedido OUT_FOR_DELIVERY", body = Order),
        (status = 409, description = "Pedido já atribuído ou entregador sem turno aberto")
    ),
    params(
        ("id" = Uuid, Path, description = "ID do pedido"),
        ("x-restaurant-id" = Uuid, Header, description = "ID do Restaurante")
    ),
    security(("api_jwt" = []))
)]
pub async fn assign_driver(
    State(app_state): State<AppState>,
    restaurant: RestaurantContext,
    staff: AuthenticatedStaff,
    Path(order_id): Path<Uuid>,
    Json(payload): Json<AssignDriverPayload>,
) -> Result<Json<Order>, AppError> {
    let mut conn = get_scoped_connection(&app_state, &restaurant, &staff).await?;

    let order = app_state
        .rider_service
        .assign_driver(
            &mut *conn,
            restaurant.0,
            order_id,
            payload.driver_id,
            &staff.0,
        )
        .await?;

    Ok(Json(order))
}

// POST /api/orders/{id}/delivered
#[utoipa::path(
    post,
    path = "/api/orders/{id}/delivered",
    tag = "Pedidos",
    responses(
        (status = 200, description = "Entrega registrada", body = Order),
        (status = 409, description = "O pedido não está em rota de entrega")
    ),
    params(
        ("id" = Uuid, Path, description = "ID do pedido"),
        ("x-restaurant-id" = Uuid, Header, description = "ID do Restaurante")
    ),
    security(("api_jwt" = []))
)]
pub async fn mark_delivered(
    State(app_state): State<AppState>,
    restaurant: RestaurantContext,
    staff: AuthenticatedStaff,
    Path(order_id): Path<Uuid>,
) -> Result<Json<Order>, AppError> {
    let mut conn = get_scoped_connection(&app_state, &restaurant, &staff).await?;

    let order = app_state
        .order_service
        .mark_delivered(&mut *conn, restaurant.0, order_id)
        .await?;

    Ok(Json(order))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::orders::OrderDetailsPayload;
    use uuid::Uuid;

    fn item(price: i64) -> OrderItemPayload {
        OrderItemPayload {
            menu_item_id: Uuid::new_v4(),
            name: "item".to_string(),
            quantity: 2,
            unit_price: Decimal::from(price),
            fixed_per_head: false,
        }
    }

    fn delivery_payload(price: i64, delivery_fee: Option<Decimal>) -> CreateOrderPayload {
        CreateOrderPayload {
            details: OrderDetailsPayload::Delivery {
                customer_name: None,
                customer_phone: "(11) 99999-8888".to_string(),
                address: "Rua das Flores, 123".to_string(),
            },
            items: vec![item(price)],
            status: OrderStatus::Confirmed,
            discount: None,
            delivery_fee,
        }
    }

    #[test]
    fn item_com_preco_negativo_nao_passa_da_validacao() {
        // unit_price -100 × qty 2 daria um total de -200 no motor de preços
        let payload = delivery_payload(-100, None);
        assert!(payload.validate().is_err());
    }

    #[test]
    fn taxa_de_entrega_negativa_nao_passa_da_validacao() {
        let payload = delivery_payload(100, Some(Decimal::from(-500)));
        assert!(payload.validate().is_err());
    }

    #[test]
    fn payload_de_entrega_valido_passa() {
        let payload = delivery_payload(100, Some(Decimal::from(12)));
        assert!(payload.validate().is_ok());
    }

    #[test]
    fn desconto_com_amount_e_percent_e_rejeitado() {
        let result = DiscountPayload {
            amount: Some(Decimal::from(10)),
            percent: Some(Decimal::from(5)),
        }
        .into_discount();
        assert!(matches!(result, Err(AppError::Invalid(_))));
    }
}
