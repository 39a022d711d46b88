// src/common/db_utils.rs

use crate::common::error::AppError;
use crate::config::AppState;
use crate::middleware::auth::AuthenticatedStaff;
use crate::middleware::tenancy::RestaurantContext;

// ---
// Helper de escopo: a "Chave" para o Banco de Dados
// ---
/// Adquire uma conexão da pool, verifica que o staff do token pertence ao
/// restaurante do cabeçalho e define as variáveis de sessão do Postgres.
///
/// Staff de outro restaurante recebe `ResourceNotFound` — indistinguível de
/// "não existe", para não vazar existência entre tenants.
pub(crate) async fn get_scoped_connection(
    app_state: &AppState,
    restaurant: &RestaurantContext,
    staff: &AuthenticatedStaff,
) -> Result<sqlx::pool::PoolConnection<sqlx::Postgres>, AppError> {
    if staff.0.restaurant_id != restaurant.0 {
        return Err(AppError::ResourceNotFound("Restaurante".to_string()));
    }

    // 1. Adquire conexão
    // O operador '?' converte automaticamente sqlx::Error -> AppError::DatabaseError
    let mut conn = app_state.db_pool.acquire().await?;

    // 2. Define Restaurant ID
    sqlx::query("SELECT set_config('app.restaurant_id', $1, true)")
        .bind(restaurant.0.to_string())
        .execute(&mut *conn)
        .await?;

    // 3. Define Staff ID
    sqlx::query("SELECT set_config('app.staff_id', $1, true)")
        .bind(staff.0.id.to_string())
        .execute(&mut *conn)
        .await?;

    Ok(conn)
}
