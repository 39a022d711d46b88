// src/common/error.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// Nosso tipo de erro, com `thiserror` para melhor ergonomia.
// Nada aqui é fatal: todo erro é um comando rejeitado, nunca um crash.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    // Entrada malformada/incompleta que o `validator` não cobre
    // (ex.: DELIVERY sem telefone, itens vazios fora de DRAFT).
    #[error("Entrada inválida: {0}")]
    Invalid(String),

    #[error("Transição ilegal: {from} -> {to}")]
    IllegalTransition { from: String, to: String },

    #[error("Nenhuma sessão de caixa aberta para este operador")]
    NoOpenSession,

    #[error("O entregador não possui turno aberto")]
    NoActiveShift,

    #[error("O pedido já possui entregador atribuído")]
    AlreadyAssigned,

    #[error("A sessão de caixa já está fechada")]
    SessionClosed,

    #[error("O turno do entregador já está fechado")]
    ShiftClosed,

    #[error("Já existe uma sessão de caixa aberta para este operador")]
    SessionAlreadyOpen,

    #[error("Já existe um turno aberto para este entregador")]
    ShiftAlreadyOpen,

    // Também usado para acesso fora do restaurante do token: de propósito,
    // o chamador não distingue "não existe" de "não é seu".
    #[error("{0} não encontrado")]
    ResourceNotFound(String),

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token inválido")]
    InvalidToken,

    // Variante para erros de banco de dados (sqlx)
    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    // Variante genérica para qualquer outro erro inesperado.
    // `anyhow::Error` é ótimo para capturar o contexto do erro.
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl AppError {
    /// Converte a violação de um índice único ESPECÍFICO no erro de conflito
    /// de negócio correspondente; qualquer outro erro passa intacto.
    ///
    /// As checagens check-then-insert (sessão/turno aberto) perdem corridas
    /// para o índice parcial: o perdedor recebe 23505 do Postgres e deve
    /// responder 409, nunca 500.
    pub fn on_unique_violation(self, constraint: &str, conflict: Self) -> Self {
        match &self {
            AppError::DatabaseError(sqlx::Error::Database(db_err))
                if db_err.constraint() == Some(constraint) =>
            {
                conflict
            }
            _ => self,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            // Retorna todos os detalhes da validação.
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let body = Json(json!({
                    "error": "Um ou mais campos são inválidos.",
                    "details": details,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            AppError::Invalid(msg) => {
                let body = Json(json!({ "error": msg }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            AppError::IllegalTransition { ref from, ref to } => {
                let body = Json(json!({
                    "error": format!("Transição de status ilegal: {} -> {}", from, to),
                }));
                return (StatusCode::CONFLICT, body).into_response();
            }

            // Violações de pré-condição / concorrência viram 409.
            AppError::NoOpenSession => (
                StatusCode::CONFLICT,
                "Nenhuma sessão de caixa aberta para este operador.",
            ),
            AppError::NoActiveShift => (
                StatusCode::CONFLICT,
                "O entregador não possui turno aberto.",
            ),
            AppError::AlreadyAssigned => (
                StatusCode::CONFLICT,
                "O pedido já possui entregador atribuído.",
            ),
            AppError::SessionClosed => (
                StatusCode::CONFLICT,
                "A sessão de caixa já está fechada.",
            ),
            AppError::ShiftClosed => (
                StatusCode::CONFLICT,
                "O turno do entregador já está fechado.",
            ),
            AppError::SessionAlreadyOpen => (
                StatusCode::CONFLICT,
                "Já existe uma sessão de caixa aberta para este operador.",
            ),
            AppError::ShiftAlreadyOpen => (
                StatusCode::CONFLICT,
                "Já existe um turno aberto para este entregador.",
            ),

            AppError::ResourceNotFound(resource) => {
                let body = Json(json!({
                    "error": format!("{} não encontrado.", resource),
                }));
                return (StatusCode::NOT_FOUND, body).into_response();
            }
            AppError::InvalidCredentials => {
                (StatusCode::UNAUTHORIZED, "E-mail ou senha inválidos.")
            }
            AppError::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                "Token de autenticação inválido ou ausente.",
            ),

            // RowNotFound quase sempre significa escopo errado (outro tenant).
            AppError::DatabaseError(sqlx::Error::RowNotFound) => {
                (StatusCode::NOT_FOUND, "Recurso não encontrado.")
            }

            // Todos os outros erros (DatabaseError, InternalServerError) viram 500.
            // O `tracing` loga a mensagem detalhada que `thiserror` nos deu.
            ref e => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Ocorreu um erro inesperado.")
            }
        };

        // Resposta padrão para erros simples que só têm uma mensagem.
        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct UniqueViolation(&'static str);

    impl std::fmt::Display for UniqueViolation {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "duplicate key value violates unique constraint \"{}\"", self.0)
        }
    }

    impl std::error::Error for UniqueViolation {}

    impl sqlx::error::DatabaseError for UniqueViolation {
        fn message(&self) -> &str {
            "duplicate key value violates unique constraint"
        }

        fn kind(&self) -> sqlx::error::ErrorKind {
            sqlx::error::ErrorKind::UniqueViolation
        }

        fn as_error(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn std::error::Error + Send + Sync + 'static> {
            self
        }

        fn constraint(&self) -> Option<&str> {
            Some(self.0)
        }
    }

    fn db_error(constraint: &'static str) -> AppError {
        AppError::DatabaseError(sqlx::Error::Database(Box::new(UniqueViolation(constraint))))
    }

    #[test]
    fn corrida_no_indice_de_sessao_aberta_vira_conflito() {
        let mapped = db_error("ux_cash_sessions_open")
            .on_unique_violation("ux_cash_sessions_open", AppError::SessionAlreadyOpen);
        assert!(matches!(mapped, AppError::SessionAlreadyOpen));
    }

    #[test]
    fn outra_constraint_passa_intacta() {
        let mapped = db_error("ux_ledger_sale_per_order")
            .on_unique_violation("ux_cash_sessions_open", AppError::SessionAlreadyOpen);
        assert!(matches!(mapped, AppError::DatabaseError(_)));
    }

    #[test]
    fn erro_que_nao_e_de_banco_passa_intacto() {
        let mapped = AppError::NoOpenSession
            .on_unique_violation("ux_cash_sessions_open", AppError::SessionAlreadyOpen);
        assert!(matches!(mapped, AppError::NoOpenSession));
    }
}
