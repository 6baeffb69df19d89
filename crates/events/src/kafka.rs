//! Kafka producer for outbound messages.

use std::time::Duration;

use async_trait::async_trait;
use rdkafka::config::ClientConfig;
use rdkafka::message::{Header, OwnedHeaders};
use rdkafka::producer::{FutureProducer, FutureRecord};

use crate::config::KafkaConfig;
use crate::envelope::OutboundMessage;
use crate::sender::EventSender;
use crate::PublishError;

/// How long a send may wait for room in the producer queue.
const QUEUE_TIMEOUT: Duration = Duration::from_secs(5);

pub struct KafkaSender {
    producer: FutureProducer,
}

impl KafkaSender {
    pub fn new(config: &KafkaConfig) -> Result<Self, PublishError> {
        let producer = ClientConfig::new()
            .set("bootstrap.servers", config.brokers.join(","))
            .set("client.id", &config.client_id)
            .set("message.timeout.ms", "30000")
            .create()
            .map_err(|e| PublishError::Config(e.to_string()))?;
        Ok(Self { producer })
    }
}

#[async_trait]
impl EventSender for KafkaSender {
    async fn send(&self, messages: Vec<OutboundMessage>) -> Result<(), PublishError> {
        for message in &messages {
            let headers = message
                .headers
                .iter()
                .fold(OwnedHeaders::new(), |headers, (key, value)| {
                    headers.insert(Header {
                        key,
                        value: Some(value.as_str()),
                    })
                });
            let record = FutureRecord::to(&message.topic)
                .key(&message.key)
                .payload(&message.payload)
                .headers(headers);

            self.producer
                .send(record, QUEUE_TIMEOUT)
                .await
                .map_err(|(e, _)| PublishError::Producer(e.to_string()))?;
        }
        Ok(())
    }
}
