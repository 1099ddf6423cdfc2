use crate::client::ApiClient;
use async_trait::async_trait;
use connect_core::{KafkaBackend, Result};

impl ApiClient {
    pub async fn get_kafka_topics(&self, include_internal: bool) -> Result<Vec<String>> {
        let request = self
            .get("/api/kafka/topics")?
            .query(&[("includeInternal", include_internal)]);
        self.fetch(request).await
    }
}

#[async_trait]
impl KafkaBackend for ApiClient {
    async fn list_topics(&self, include_internal: bool) -> Result<Vec<String>> {
        self.get_kafka_topics(include_internal).await
    }
}
