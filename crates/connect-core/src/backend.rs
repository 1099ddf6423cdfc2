use crate::{
    ConfigDef, Connector, ConnectorConfig, ConnectorPlugin, ConnectorStatus,
    CreateConnectorRequest, DataFileInfo, Result, SchemaRegistration, SchemaRegistryHealth,
};
use async_trait::async_trait;
use serde_json::Value;

/// Connector management surface of the organization backend
#[async_trait]
pub trait ExternalSourcesBackend: Send + Sync {
    // Connector operations
    async fn list_connectors(&self) -> Result<Vec<Connector>>;
    async fn create_connector(&self, request: &CreateConnectorRequest) -> Result<String>;
    async fn delete_connector(&self, name: &str) -> Result<()>;
    async fn get_connector_config(&self, name: &str) -> Result<ConnectorConfig>;
    async fn update_connector_config(&self, name: &str, config: &ConnectorConfig) -> Result<()>;
    async fn get_connector_status(&self, name: &str) -> Result<ConnectorStatus>;
    async fn pause_connector(&self, name: &str) -> Result<()>;
    async fn resume_connector(&self, name: &str) -> Result<()>;

    // Plugin metadata
    async fn list_plugins(&self) -> Result<Vec<ConnectorPlugin>>;
    async fn list_config_defs(&self, connector_class: &str) -> Result<Vec<ConfigDef>>;

    // Data directory
    async fn list_files(&self) -> Result<Vec<DataFileInfo>>;
    async fn upload_file(&self, file_name: &str, contents: Vec<u8>) -> Result<String>;
}

#[async_trait]
pub trait SchemaRegistryBackend: Send + Sync {
    async fn list_subjects(&self) -> Result<Vec<String>>;
    async fn register_schema(&self, subject: &str, schema: &Value) -> Result<SchemaRegistration>;
    async fn health(&self) -> Result<SchemaRegistryHealth>;
}

#[async_trait]
pub trait KafkaBackend: Send + Sync {
    async fn list_topics(&self, include_internal: bool) -> Result<Vec<String>>;
}
