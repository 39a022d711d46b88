// src/services/session_service.rs

use rust_decimal::Decimal;
use sqlx::{Acquire, Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::{
        error::AppError,
        events::{EventBus, EventType},
    },
    db::SessionRepository,
    models::{
        auth::Staff,
        sessions::{CashSession, LedgerEntry, LedgerEntryKind, SessionMetrics, SessionStatus, ZReport},
    },
};

/// Saldo esperado do fechamento: abertura + vendas − sangrias + ajustes.
/// Os PAYOUTs chegam aqui em valor absoluto (o agregado já aplica ABS).
pub fn expected_balance(
    opening_balance: Decimal,
    total_sales: Decimal,
    total_payouts: Decimal,
    total_adjustments: Decimal,
) -> Decimal {
    opening_balance + total_sales - total_payouts + total_adjustments
}

pub fn variance(actual_balance: Decimal, expected_balance: Decimal) -> Decimal {
    actual_balance - expected_balance
}

/// Regras de sinal e de origem das entradas vindas da API:
/// SALE só nasce da liquidação de um pedido, PAYOUT é sempre negativo.
pub fn validate_entry(kind: LedgerEntryKind, amount: Decimal) -> Result<(), AppError> {
    match kind {
        LedgerEntryKind::Sale => Err(AppError::Invalid(
            "Entradas SALE são criadas pela liquidação do pedido, não pela API.".to_string(),
        )),
        LedgerEntryKind::Payout if amount >= Decimal::ZERO => Err(AppError::Invalid(
            "PAYOUT deve ter valor negativo.".to_string(),
        )),
        _ if amount == Decimal::ZERO => Err(AppError::Invalid(
            "O valor da entrada não pode ser zero.".to_string(),
        )),
        _ => Ok(()),
    }
}

#[derive(Clone)]
pub struct SessionService {
    sessions: SessionRepository,
    events: EventBus,
}

impl SessionService {
    pub fn new(sessions: SessionRepository, events: EventBus) -> Self {
        Self { sessions, events }
    }

    /// Abre uma sessão de caixa para o operador. No máximo UMA aberta por
    /// operador: a checagem aqui e o índice único parcial no banco garantem
    /// isso mesmo sob corrida.
    pub async fn open<'e, E>(
        &self,
        executor: E,
        restaurant_id: Uuid,
        actor: &Staff,
        opening_balance: Decimal,
    ) -> Result<CashSession, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        if opening_balance < Decimal::ZERO {
            return Err(AppError::Invalid(
                "O saldo de abertura não pode ser negativo.".to_string(),
            ));
        }

        let mut tx = executor.begin().await?;

        if self
            .sessions
            .find_open_by_staff(&mut *tx, restaurant_id, actor.id)
            .await?
            .is_some()
        {
            return Err(AppError::SessionAlreadyOpen);
        }

        // Se outra abertura vencer a corrida entre a checagem e o INSERT, o
        // índice parcial barra a nossa; o 23505 vira o mesmo 409.
        let session = self
            .sessions
            .insert_session(&mut *tx, restaurant_id, actor.id, opening_balance)
            .await
            .map_err(|e| {
                e.on_unique_violation("ux_cash_sessions_open", AppError::SessionAlreadyOpen)
            })?;

        tx.commit().await?;

        self.events
            .publish("cash_sessions", EventType::Insert, &session);

        Ok(session)
    }

    /// Append manual no ledger: só PAYOUT e ADJUSTMENT. A sessão é travada
    /// para o append não correr contra um fechamento concorrente.
    #[allow(clippy::too_many_arguments)]
    pub async fn append_entry<'e, E>(
        &self,
        executor: E,
        restaurant_id: Uuid,
        session_id: Uuid,
        kind: LedgerEntryKind,
        amount: Decimal,
        category: Option<&str>,
        notes: Option<&str>,
        actor: &Staff,
    ) -> Result<LedgerEntry, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        validate_entry(kind, amount)?;

        let mut tx = executor.begin().await?;

        let session = self
            .sessions
            .get_for_update(&mut *tx, restaurant_id, session_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Sessão de caixa".to_string()))?;

        if session.status == SessionStatus::Closed {
            return Err(AppError::SessionClosed);
        }

        let entry = self
            .sessions
            .insert_entry(
                &mut *tx,
                restaurant_id,
                session_id,
                kind,
                amount,
                category,
                notes,
                actor.id,
                None,
            )
            .await?;

        tx.commit().await?;

        self.events
            .publish("ledger_entries", EventType::Insert, &entry);

        Ok(entry)
    }

    /// Fechamento: calcula o esperado a partir das ENTRADAS (nunca de um
    /// total cacheado), grava o contado e a variância, e sela a sessão.
    pub async fn close<'e, E>(
        &self,
        executor: E,
        restaurant_id: Uuid,
        session_id: Uuid,
        actual_balance: Decimal,
    ) -> Result<CashSession, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let session = self
            .sessions
            .get_for_update(&mut *tx, restaurant_id, session_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Sessão de caixa".to_string()))?;

        if session.status == SessionStatus::Closed {
            return Err(AppError::SessionClosed);
        }

        let totals = self.sessions.aggregate_entries(&mut *tx, session_id).await?;
        let expected = expected_balance(
            session.opening_balance,
            totals.total_sales,
            totals.total_payouts,
            totals.total_adjustments,
        );
        let variance = variance(actual_balance, expected);

        let closed = self
            .sessions
            .close(
                &mut *tx,
                restaurant_id,
                session_id,
                expected,
                actual_balance,
                variance,
            )
            .await?;

        tx.commit().await?;

        self.events
            .publish("cash_sessions", EventType::Update, &closed);

        Ok(closed)
    }

    /// Fotografia ao vivo da sessão aberta do operador: saldo corrente =
    /// abertura + soma líquida das entradas até agora.
    pub async fn metrics<'e, E>(
        &self,
        executor: E,
        restaurant_id: Uuid,
        actor: &Staff,
    ) -> Result<SessionMetrics, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let session = self
            .sessions
            .find_open_by_staff(&mut *tx, restaurant_id, actor.id)
            .await?;

        let running_total = match &session {
            Some(session) => {
                let sum = self.sessions.sum_entries(&mut *tx, session.id).await?;
                session.opening_balance + sum
            }
            None => Decimal::ZERO,
        };

        tx.commit().await?;

        Ok(SessionMetrics {
            open_session: session,
            running_total,
        })
    }

    /// Z-report: agregado fiscal da sessão, recomputado das entradas a cada
    /// chamada. Para sessão aberta, contado e variância ainda não existem.
    pub async fn z_report<'e, E>(
        &self,
        executor: E,
        restaurant_id: Uuid,
        session_id: Uuid,
    ) -> Result<ZReport, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let session = self
            .sessions
            .get(&mut *tx, restaurant_id, session_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Sessão de caixa".to_string()))?;

        let totals = self.sessions.aggregate_entries(&mut *tx, session_id).await?;
        tx.commit().await?;

        let expected = expected_balance(
            session.opening_balance,
            totals.total_sales,
            totals.total_payouts,
            totals.total_adjustments,
        );

        Ok(ZReport {
            session_id: session.id,
            total_sales: totals.total_sales,
            total_payouts: totals.total_payouts,
            opening_balance: session.opening_balance,
            expected_balance: expected,
            actual_balance: session.actual_balance,
            variance: session.variance,
            transaction_count: totals.transaction_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fechamento_sem_variancia() {
        // abertura 5000, vendas 1500, sangria 200, contado 6300
        let expected = expected_balance(
            Decimal::from(5000),
            Decimal::from(1500),
            Decimal::from(200),
            Decimal::ZERO,
        );
        assert_eq!(expected, Decimal::from(6300));
        assert_eq!(variance(Decimal::from(6300), expected), Decimal::ZERO);
    }

    #[test]
    fn falta_de_caixa_da_variancia_negativa() {
        let expected = expected_balance(
            Decimal::from(1000),
            Decimal::from(500),
            Decimal::ZERO,
            Decimal::from(-50),
        );
        assert_eq!(expected, Decimal::from(1450));
        assert_eq!(variance(Decimal::from(1400), expected), Decimal::from(-50));
    }

    #[test]
    fn api_nao_aceita_sale() {
        assert!(matches!(
            validate_entry(LedgerEntryKind::Sale, Decimal::from(100)),
            Err(AppError::Invalid(_))
        ));
    }

    #[test]
    fn payout_positivo_e_rejeitado() {
        assert!(matches!(
            validate_entry(LedgerEntryKind::Payout, Decimal::from(200)),
            Err(AppError::Invalid(_))
        ));
        assert!(validate_entry(LedgerEntryKind::Payout, Decimal::from(-200)).is_ok());
    }

    #[test]
    fn ajuste_aceita_ambos_os_sinais_mas_nao_zero() {
        assert!(validate_entry(LedgerEntryKind::Adjustment, Decimal::from(35)).is_ok());
        assert!(validate_entry(LedgerEntryKind::Adjustment, Decimal::from(-35)).is_ok());
        assert!(matches!(
            validate_entry(LedgerEntryKind::Adjustment, Decimal::ZERO),
            Err(AppError::Invalid(_))
        ));
    }
}
