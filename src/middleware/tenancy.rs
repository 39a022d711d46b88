// src/middleware/tenancy.rs

use axum::{extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use crate::common::error::AppError;

// O nome do nosso cabeçalho HTTP customizado
const RESTAURANT_ID_HEADER: &str = "x-restaurant-id";

// Extrator do restaurante que o utilizador quer aceder. A verificação de que
// o staff do token PERTENCE a este restaurante acontece depois, na hora de
// abrir a conexão escopada.
#[derive(Debug, Clone)]
pub struct RestaurantContext(pub Uuid);

impl<S> FromRequestParts<S> for RestaurantContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header_value = parts
            .headers
            .get(RESTAURANT_ID_HEADER)
            .ok_or_else(|| {
                AppError::Invalid("O cabeçalho X-Restaurant-ID é obrigatório.".to_string())
            })?;

        let value_str = header_value.to_str().map_err(|_| {
            AppError::Invalid("Cabeçalho X-Restaurant-ID contém caracteres inválidos.".to_string())
        })?;

        let restaurant_id = Uuid::parse_str(value_str).map_err(|_| {
            AppError::Invalid("Cabeçalho X-Restaurant-ID inválido (não é um UUID).".to_string())
        })?;

        Ok(RestaurantContext(restaurant_id))
    }
}
