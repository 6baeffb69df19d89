//! Encode written documents and hand them to an [`EventSender`].

use opsync_core::scope::ScopeEnv;

use crate::envelope::{OutboundMessage, Publishable};
use crate::sender::EventSender;

/// Publish one `Create` event per document, `batch_size` messages per send.
///
/// Failures are logged and never propagated. Returns how many messages
/// the sender accepted.
pub async fn publish_batch<T: Publishable + Sync>(
    sender: &dyn EventSender,
    batch_size: usize,
    scope_env: &ScopeEnv,
    docs: &[T],
) -> usize {
    let topic = T::ENTITY.topic();
    let messages: Vec<OutboundMessage> = docs
        .iter()
        .filter_map(|doc| match doc.to_message(scope_env) {
            Ok(message) => Some(message),
            Err(e) => {
                tracing::error!(error = %e, topic = %topic, key = %doc.key(), "failed to encode event");
                None
            }
        })
        .collect();

    let mut published = 0;
    for chunk in messages.chunks(batch_size.max(1)) {
        match sender.send(chunk.to_vec()).await {
            Ok(()) => published += chunk.len(),
            Err(e) => {
                tracing::error!(
                    error = %e,
                    topic = %topic,
                    scope = %scope_env.scope,
                    env = %scope_env.env,
                    count = chunk.len(),
                    "failed to publish events"
                );
            }
        }
    }

    tracing::debug!(topic = %topic, published, total = docs.len(), "events published");
    published
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envelope::NamedH5Properties;
    use crate::PublishError;
    use async_trait::async_trait;
    use opsync_core::h5::H5Properties;
    use opsync_core::types::DocId;
    use std::sync::Mutex;

    /// Records batch sizes and rejects every batch after `fail_after`.
    struct Recording {
        batches: Mutex<Vec<usize>>,
        fail_after: usize,
    }

    #[async_trait]
    impl EventSender for Recording {
        async fn send(&self, messages: Vec<OutboundMessage>) -> Result<(), PublishError> {
            let mut batches = self.batches.lock().unwrap();
            if batches.len() >= self.fail_after {
                return Err(PublishError::Producer("broker down".into()));
            }
            batches.push(messages.len());
            Ok(())
        }
    }

    fn props(n: usize) -> Vec<NamedH5Properties> {
        (0..n)
            .map(|_| {
                let id = DocId::new();
                NamedH5Properties {
                    properties: H5Properties {
                        id,
                        attribute: "{}".into(),
                        style: "{}".into(),
                        activity_id: id.to_hex(),
                    },
                    activity_name: "a".into(),
                }
            })
            .collect()
    }

    #[tokio::test]
    async fn sends_in_batches() {
        let sender = Recording {
            batches: Mutex::new(Vec::new()),
            fail_after: usize::MAX,
        };
        let n = publish_batch(&sender, 2, &ScopeEnv::new("icc", "dev"), &props(5)).await;
        assert_eq!(n, 5);
        assert_eq!(*sender.batches.lock().unwrap(), vec![2, 2, 1]);
    }

    #[tokio::test]
    async fn failed_batches_are_not_counted() {
        let sender = Recording {
            batches: Mutex::new(Vec::new()),
            fail_after: 1,
        };
        let n = publish_batch(&sender, 2, &ScopeEnv::new("icc", "dev"), &props(5)).await;
        assert_eq!(n, 2);
    }
}
