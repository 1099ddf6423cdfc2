use crate::failure_message;
use chrono::{DateTime, Utc};
use connect_core::{
    ConfigDef, Connector, ConnectorConfig, ConnectorPlugin, ConnectorState, ConnectorStatus,
    CreateConnectorRequest, DataFileInfo, Error, ExternalSourcesBackend, OperationResult, Result,
};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

#[derive(Debug, Clone, Default)]
pub struct ExternalSourcesState {
    /// Last fetched connector list, `None` until the first load
    pub external_sources: Option<Vec<Connector>>,
    pub fetched_at: Option<DateTime<Utc>>,
    pub loading: bool,
    pub deleting: bool,
    pub last_error: Option<String>,
}

/// Connector operations plus the cached connector list
pub struct ExternalSourcesProvider {
    backend: Arc<dyn ExternalSourcesBackend>,
    state: RwLock<ExternalSourcesState>,
}

impl ExternalSourcesProvider {
    pub fn new(backend: Arc<dyn ExternalSourcesBackend>) -> Self {
        Self {
            backend,
            state: RwLock::new(ExternalSourcesState::default()),
        }
    }

    pub async fn state(&self) -> ExternalSourcesState {
        self.state.read().await.clone()
    }

    pub async fn external_sources(&self) -> Option<Vec<Connector>> {
        self.state.read().await.external_sources.clone()
    }

    pub async fn last_error(&self) -> Option<String> {
        self.state.read().await.last_error.clone()
    }

    pub async fn set_loading(&self, loading: bool) {
        self.state.write().await.loading = loading;
    }

    async fn record_error(&self, message: &str) {
        self.state.write().await.last_error = Some(message.to_string());
    }

    // ========== Connector list ==========

    /// Reloads the connector list into the cache
    pub async fn get_sources(&self) -> Result<Vec<Connector>> {
        {
            let mut state = self.state.write().await;
            state.loading = true;
            state.last_error = None;
        }

        let result = self.backend.list_connectors().await;

        let mut state = self.state.write().await;
        state.loading = false;
        match result {
            Ok(connectors) => {
                info!("Loaded {} connector(s)", connectors.len());
                state.external_sources = Some(connectors.clone());
                state.fetched_at = Some(Utc::now());
                Ok(connectors)
            }
            Err(e) => {
                if matches!(e, Error::MissingDomain) {
                    state.external_sources = Some(Vec::new());
                }
                let message = failure_message(&e, "Get External Sources failed");
                warn!("Failed to load connectors: {}", message);
                state.last_error = Some(message);
                Err(e)
            }
        }
    }

    /// Refresh after a successful mutation; a failure only lands in `last_error`
    async fn refresh_after_change(&self) {
        if let Err(e) = self.get_sources().await {
            warn!("Connector list refresh failed: {}", e);
        }
    }

    pub async fn add_external_source(&self, request: &CreateConnectorRequest) -> OperationResult {
        match self.backend.create_connector(request).await {
            Ok(message) => {
                info!("Created connector '{}'", request.name);
                self.refresh_after_change().await;
                OperationResult::ok(message)
            }
            Err(e) => {
                let message = failure_message(&e, "Create external source failed");
                self.record_error(&message).await;
                OperationResult::failed(message)
            }
        }
    }

    pub async fn update_external_source_config(
        &self,
        name: &str,
        config: &ConnectorConfig,
    ) -> OperationResult {
        match self.backend.update_connector_config(name, config).await {
            Ok(()) => {
                self.refresh_after_change().await;
                OperationResult::ok("Connector updated successfully")
            }
            Err(e) => OperationResult::failed(failure_message(&e, "Update connector failed")),
        }
    }

    pub async fn delete_external_source(&self, name: &str) -> OperationResult {
        self.state.write().await.deleting = true;

        let result = match self.backend.delete_connector(name).await {
            Ok(()) => {
                info!("Deleted connector '{}'", name);
                self.refresh_after_change().await;
                OperationResult::ok("External source connector deleted successfully")
            }
            Err(e) => {
                OperationResult::failed(failure_message(&e, "Delete external source failed"))
            }
        };

        self.state.write().await.deleting = false;
        result
    }

    // ========== Single connector ==========

    pub async fn get_external_source_config(&self, name: &str) -> Result<ConnectorConfig> {
        self.backend.get_connector_config(name).await
    }

    pub async fn get_external_source_status(&self, name: &str) -> Result<ConnectorStatus> {
        self.backend.get_connector_status(name).await
    }

    pub async fn pause_external_source(&self, name: &str) -> Result<ConnectorState> {
        self.backend.pause_connector(name).await?;
        Ok(self.refresh_state(name).await)
    }

    pub async fn resume_external_source(&self, name: &str) -> Result<ConnectorState> {
        self.backend.resume_connector(name).await?;
        Ok(self.refresh_state(name).await)
    }

    /// Re-reads one connector's state and patches the cached list entry in
    /// place. An unreadable status shows as `Unknown`.
    async fn refresh_state(&self, name: &str) -> ConnectorState {
        let connector_state = match self.backend.get_connector_status(name).await {
            Ok(status) => status.state,
            Err(e) => {
                warn!("Status of '{}' unavailable: {}", name, e);
                ConnectorState::Unknown
            }
        };

        let mut state = self.state.write().await;
        if let Some(entry) = state
            .external_sources
            .as_mut()
            .and_then(|list| list.iter_mut().find(|c| c.name == name))
        {
            entry.state = connector_state;
        }
        connector_state
    }

    // ========== Plugins ==========

    /// Installed plugins, MirrorMaker plugins left out
    pub async fn get_connector_plugins(&self) -> Result<Vec<ConnectorPlugin>> {
        self.state.write().await.last_error = None;
        match self.backend.list_plugins().await {
            Ok(plugins) => Ok(plugins.into_iter().filter(|p| !p.is_mirror()).collect()),
            Err(e) => {
                self.record_error(&failure_message(&e, "Failed to load connector plugins"))
                    .await;
                Err(e)
            }
        }
    }

    pub async fn get_connector_plugin_config_defs(
        &self,
        connector_class: &str,
    ) -> Result<Vec<ConfigDef>> {
        self.state.write().await.last_error = None;
        match self.backend.list_config_defs(connector_class).await {
            Ok(defs) => Ok(defs),
            Err(e) => {
                self.record_error(&failure_message(&e, "Failed to load config definitions"))
                    .await;
                Err(e)
            }
        }
    }

    // ========== Data directory ==========

    pub async fn list_files(&self) -> Result<Vec<DataFileInfo>> {
        self.state.write().await.last_error = None;
        match self.backend.list_files().await {
            Ok(files) => Ok(files),
            Err(e) => {
                self.record_error(&failure_message(&e, "Failed to list files"))
                    .await;
                Err(e)
            }
        }
    }

    pub async fn upload_file(&self, file_name: &str, contents: Vec<u8>) -> OperationResult {
        match self.backend.upload_file(file_name, contents).await {
            Ok(message) => OperationResult::ok(message),
            Err(e) => OperationResult::failed(failure_message(&e, "Upload failed")),
        }
    }
}
