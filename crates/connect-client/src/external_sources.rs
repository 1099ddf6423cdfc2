use crate::client::{segment, ApiClient};
use async_trait::async_trait;
use connect_core::{
    ConfigDef, Connector, ConnectorConfig, ConnectorPlugin, ConnectorStatus,
    CreateConnectorRequest, DataFileInfo, ExternalSourcesBackend, Result,
};
use reqwest::multipart::{Form, Part};
use tracing::info;

const BASE: &str = "/api/external-sources";

fn connector_path(name: &str, suffix: &str) -> String {
    format!("{}/connectors/{}{}", BASE, segment(name), suffix)
}

impl ApiClient {
    pub async fn get_all_external_sources(&self) -> Result<Vec<Connector>> {
        self.fetch(self.get(BASE)?).await
    }

    /// Creates a connector, returns the backend's confirmation message
    pub async fn create_external_source(&self, request: &CreateConnectorRequest) -> Result<String> {
        info!("Creating connector '{}'", request.name);
        let message = self.send_for_message(self.post(BASE)?.json(request)).await?;
        Ok(message.unwrap_or_else(|| "Connector created".to_string()))
    }

    pub async fn delete_external_source(&self, name: &str) -> Result<()> {
        info!("Deleting connector '{}'", name);
        self.send(self.delete(&connector_path(name, ""))?).await?;
        Ok(())
    }

    pub async fn get_external_source_connector_config(&self, name: &str) -> Result<ConnectorConfig> {
        self.fetch(self.get(&connector_path(name, "/config"))?).await
    }

    pub async fn update_external_source_connector_config(
        &self,
        name: &str,
        config: &ConnectorConfig,
    ) -> Result<()> {
        info!("Updating config of connector '{}'", name);
        self.send(self.put(&connector_path(name, "/config"))?.json(config))
            .await?;
        Ok(())
    }

    pub async fn get_external_source_connector_status(&self, name: &str) -> Result<ConnectorStatus> {
        let response = self
            .send(self.get(&connector_path(name, "/status"))?)
            .await?;
        response
            .json()
            .await
            .map_err(|e| connect_core::Error::Transport(e.to_string()))
    }

    pub async fn pause_external_source_connector(&self, name: &str) -> Result<()> {
        info!("Pausing connector '{}'", name);
        self.send(self.put(&connector_path(name, "/pause"))?).await?;
        Ok(())
    }

    pub async fn resume_external_source_connector(&self, name: &str) -> Result<()> {
        info!("Resuming connector '{}'", name);
        self.send(self.put(&connector_path(name, "/resume"))?).await?;
        Ok(())
    }

    pub async fn get_connector_plugins(&self) -> Result<Vec<ConnectorPlugin>> {
        self.fetch(self.get(&format!("{}/plugins", BASE))?).await
    }

    pub async fn get_connector_plugin_config_defs(
        &self,
        connector_class: &str,
    ) -> Result<Vec<ConfigDef>> {
        let path = format!("{}/plugins/{}/config-defs", BASE, segment(connector_class));
        self.fetch(self.get(&path)?).await
    }

    pub async fn list_files_in_data_dir(&self) -> Result<Vec<DataFileInfo>> {
        self.fetch(self.get("/api/files")?).await
    }

    /// Uploads a file to the data directory as multipart field `file`
    pub async fn upload_file_to_data_dir(&self, file_name: &str, contents: Vec<u8>) -> Result<String> {
        info!("Uploading '{}' ({} bytes)", file_name, contents.len());
        let part = Part::bytes(contents).file_name(file_name.to_string());
        let form = Form::new().part("file", part);
        let message = self
            .send_for_message(self.post("/api/files/upload")?.multipart(form))
            .await?;
        Ok(message.unwrap_or_else(|| "File uploaded".to_string()))
    }
}

#[async_trait]
impl ExternalSourcesBackend for ApiClient {
    async fn list_connectors(&self) -> Result<Vec<Connector>> {
        self.get_all_external_sources().await
    }

    async fn create_connector(&self, request: &CreateConnectorRequest) -> Result<String> {
        self.create_external_source(request).await
    }

    async fn delete_connector(&self, name: &str) -> Result<()> {
        self.delete_external_source(name).await
    }

    async fn get_connector_config(&self, name: &str) -> Result<ConnectorConfig> {
        self.get_external_source_connector_config(name).await
    }

    async fn update_connector_config(&self, name: &str, config: &ConnectorConfig) -> Result<()> {
        self.update_external_source_connector_config(name, config)
            .await
    }

    async fn get_connector_status(&self, name: &str) -> Result<ConnectorStatus> {
        self.get_external_source_connector_status(name).await
    }

    async fn pause_connector(&self, name: &str) -> Result<()> {
        self.pause_external_source_connector(name).await
    }

    async fn resume_connector(&self, name: &str) -> Result<()> {
        self.resume_external_source_connector(name).await
    }

    async fn list_plugins(&self) -> Result<Vec<ConnectorPlugin>> {
        self.get_connector_plugins().await
    }

    async fn list_config_defs(&self, connector_class: &str) -> Result<Vec<ConfigDef>> {
        self.get_connector_plugin_config_defs(connector_class).await
    }

    async fn list_files(&self) -> Result<Vec<DataFileInfo>> {
        self.list_files_in_data_dir().await
    }

    async fn upload_file(&self, file_name: &str, contents: Vec<u8>) -> Result<String> {
        self.upload_file_to_data_dir(file_name, contents).await
    }
}
