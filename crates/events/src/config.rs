use std::sync::Arc;

use crate::bus::EventBus;
use crate::sender::{BusSender, EventSender};
use crate::PublishError;

/// Producer configuration loaded from environment variables.
///
/// With no brokers configured, messages go to the in-process bus and are
/// only logged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KafkaConfig {
    /// Bootstrap servers, parsed from comma-separated `KAFKA_BROKERS`.
    pub brokers: Vec<String>,
    /// Messages handed to the sender per call (default: `1`).
    pub batch_size: usize,
    pub client_id: String,
}

impl Default for KafkaConfig {
    fn default() -> Self {
        Self {
            brokers: Vec::new(),
            batch_size: 1,
            client_id: "opsync".into(),
        }
    }
}

impl KafkaConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var            | Default  |
    /// |--------------------|----------|
    /// | `KAFKA_BROKERS`    | (empty)  |
    /// | `KAFKA_BATCH_SIZE` | `1`      |
    /// | `KAFKA_CLIENT_ID`  | `opsync` |
    pub fn from_env() -> Result<Self, PublishError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, PublishError> {
        let defaults = Self::default();

        let brokers = get("KAFKA_BROKERS")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let batch_size = match get("KAFKA_BATCH_SIZE") {
            Some(raw) => match raw.trim().parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(PublishError::Config(format!(
                        "KAFKA_BATCH_SIZE must be a positive integer, got {raw:?}"
                    )))
                }
            },
            None => defaults.batch_size,
        };

        let client_id = get("KAFKA_CLIENT_ID")
            .filter(|s| !s.is_empty())
            .unwrap_or(defaults.client_id);

        Ok(Self {
            brokers,
            batch_size,
            client_id,
        })
    }

    pub fn is_enabled(&self) -> bool {
        !self.brokers.is_empty()
    }

    /// Kafka producer when brokers are configured, otherwise the bus.
    pub fn build_sender(&self, bus: Arc<EventBus>) -> Result<Arc<dyn EventSender>, PublishError> {
        if !self.is_enabled() {
            tracing::info!("no Kafka brokers configured, events are logged only");
            return Ok(Arc::new(BusSender::new(bus)));
        }

        #[cfg(feature = "kafka")]
        {
            let sender = crate::kafka::KafkaSender::new(self)?;
            tracing::info!(brokers = %self.brokers.join(","), "Kafka producer ready");
            Ok(Arc::new(sender))
        }

        #[cfg(not(feature = "kafka"))]
        {
            tracing::warn!(
                brokers = %self.brokers.join(","),
                "built without the kafka feature, events are logged only"
            );
            Ok(Arc::new(BusSender::new(bus)))
        }
    }
}
