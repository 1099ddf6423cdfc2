use crate::client::{segment, ApiClient};
use async_trait::async_trait;
use connect_core::{Error, Result, SchemaRegistration, SchemaRegistryBackend, SchemaRegistryHealth};
use serde_json::Value;
use tracing::info;

impl ApiClient {
    pub async fn list_schema_subjects(&self) -> Result<Vec<String>> {
        self.fetch(self.get("/api/schema-registry/subjects")?).await
    }

    /// Registers a new schema version under `subject`. An answer without a
    /// body or `id` still counts as registered.
    pub async fn register_json_schema(
        &self,
        subject: &str,
        schema: &Value,
    ) -> Result<SchemaRegistration> {
        info!("Registering schema under subject '{}'", subject);
        let path = format!("/api/schema-registry/subjects/{}/versions", segment(subject));
        self.fetch(self.post(&path)?.json(schema)).await
    }

    pub async fn schema_registry_health(&self) -> Result<SchemaRegistryHealth> {
        let response = self.send(self.get("/api/schema-registry/health")?).await?;
        response
            .json()
            .await
            .map_err(|e| Error::Transport(e.to_string()))
    }
}

#[async_trait]
impl SchemaRegistryBackend for ApiClient {
    async fn list_subjects(&self) -> Result<Vec<String>> {
        self.list_schema_subjects().await
    }

    async fn register_schema(&self, subject: &str, schema: &Value) -> Result<SchemaRegistration> {
        self.register_json_schema(subject, schema).await
    }

    async fn health(&self) -> Result<SchemaRegistryHealth> {
        self.schema_registry_health().await
    }
}
