// src/common/events.rs

use serde::Serialize;
use tokio::sync::broadcast;
use utoipa::ToSchema;

// Evento de domínio publicado UMA vez por mutação commitada, na ordem dos
// commits. Os serviços só publicam DEPOIS do tx.commit() — nunca antes.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    Insert,
    Update,
    Delete,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DomainEvent {
    #[schema(example = "orders")]
    pub entity_table: String,
    pub event_type: EventType,
    pub data: serde_json::Value,
}

/// Canal de broadcast para assinantes em tempo real (telas de salão, KDS...).
/// Envelopa um `tokio::sync::broadcast`: assinantes lentos perdem eventos
/// antigos em vez de travar os publicadores.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<DomainEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DomainEvent> {
        self.tx.subscribe()
    }

    pub fn publish<T: Serialize>(&self, entity_table: &str, event_type: EventType, data: &T) {
        let data = match serde_json::to_value(data) {
            Ok(value) => value,
            Err(e) => {
                tracing::error!("Falha ao serializar evento de {}: {}", entity_table, e);
                return;
            }
        };

        let event = DomainEvent {
            entity_table: entity_table.to_string(),
            event_type,
            data,
        };

        // Sem assinantes não é erro: o core só tem obrigação de emitir.
        if self.tx.send(event).is_err() {
            tracing::debug!("Evento de {} sem assinantes", entity_table);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn publica_na_ordem_de_commit() {
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();

        bus.publish("orders", EventType::Insert, &serde_json::json!({"n": 1}));
        bus.publish("orders", EventType::Update, &serde_json::json!({"n": 2}));

        let first = rx.recv().await.unwrap();
        let second = rx.recv().await.unwrap();
        assert_eq!(first.event_type, EventType::Insert);
        assert_eq!(second.event_type, EventType::Update);
        assert_eq!(second.data["n"], 2);
    }

    #[test]
    fn publicar_sem_assinantes_nao_falha() {
        let bus = EventBus::new(4);
        bus.publish("dining_tables", EventType::Update, &serde_json::json!({}));
    }
}
