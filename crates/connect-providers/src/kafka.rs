use crate::failure_message;
use connect_core::{KafkaBackend, Result};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::warn;

#[derive(Debug, Clone, Default)]
pub struct KafkaState {
    pub topics: Vec<String>,
    pub loading: bool,
    pub last_error: Option<String>,
}

pub struct KafkaProvider {
    backend: Arc<dyn KafkaBackend>,
    state: RwLock<KafkaState>,
}

impl KafkaProvider {
    pub fn new(backend: Arc<dyn KafkaBackend>) -> Self {
        Self {
            backend,
            state: RwLock::new(KafkaState::default()),
        }
    }

    pub async fn state(&self) -> KafkaState {
        self.state.read().await.clone()
    }

    pub async fn refresh_topics(&self, include_internal: bool) -> Result<Vec<String>> {
        {
            let mut state = self.state.write().await;
            state.loading = true;
            state.last_error = None;
        }

        let result = self.backend.list_topics(include_internal).await;

        let mut state = self.state.write().await;
        state.loading = false;
        match result {
            Ok(topics) => {
                state.topics = topics.clone();
                Ok(topics)
            }
            Err(e) => {
                let message = failure_message(&e, "Failed to load topics");
                warn!("{}", message);
                state.last_error = Some(message);
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeBackend;
    use connect_core::Error;

    #[tokio::test]
    async fn test_refresh_topics() {
        let backend = FakeBackend::new();
        let provider = KafkaProvider::new(backend.clone());

        assert_eq!(provider.refresh_topics(false).await.unwrap(), vec!["orders"]);
        let topics = provider.refresh_topics(true).await.unwrap();
        assert_eq!(topics, vec!["__consumer_offsets", "orders"]);
        assert_eq!(provider.state().await.topics.len(), 2);
    }

    #[tokio::test]
    async fn test_refresh_topics_failure_fallback() {
        let backend = FakeBackend::new();
        backend.fail_with(Error::Generic(anyhow::anyhow!("boom"))).await;
        let provider = KafkaProvider::new(backend.clone());

        assert!(provider.refresh_topics(false).await.is_err());
        let state = provider.state().await;
        assert_eq!(
            state.last_error.as_deref(),
            Some("Failed to load topics due to unknown error")
        );
        assert!(!state.loading);
    }
}
