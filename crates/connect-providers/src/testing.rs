//! In-memory backend shared by the provider and session tests.

use connect_core::{
    async_trait, ConfigDef, Connector, ConnectorConfig, ConnectorPlugin, ConnectorState,
    ConnectorStatus, CreateConnectorRequest, DataFileInfo, Error, ExternalSourcesBackend,
    KafkaBackend, PluginCategory, Result, SchemaRegistration, SchemaRegistryBackend,
    SchemaRegistryHealth, FILE_SOURCE_CONNECTOR_CLASS,
};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

pub const FILE_SOURCE: &str = FILE_SOURCE_CONNECTOR_CLASS;
pub const JDBC_SOURCE: &str = "io.confluent.connect.jdbc.JdbcSourceConnector";

#[derive(Default)]
struct Inner {
    connectors: Vec<Connector>,
    configs: HashMap<String, ConnectorConfig>,
    created: Vec<CreateConnectorRequest>,
    updated: Vec<(String, ConnectorConfig)>,
    files: Vec<DataFileInfo>,
    subjects: Vec<String>,
    registered: Vec<(String, Value)>,
    list_calls: usize,
    /// Returned by the next backend call, then cleared
    pending_error: Option<Error>,
    status_fails: bool,
    hold_config_defs: bool,
    hold_creates: bool,
    hide_uploads: bool,
}

pub struct FakeBackend {
    inner: Mutex<Inner>,
}

impl FakeBackend {
    pub fn new() -> Arc<Self> {
        let inner = Inner {
            files: vec![DataFileInfo {
                name: "lines.txt".into(),
                size: 4,
                connect_path: "/data/lines.txt".into(),
            }],
            subjects: vec!["orders-value".into()],
            ..Inner::default()
        };
        Arc::new(Self {
            inner: Mutex::new(inner),
        })
    }

    /// Backend holding one file-source connector
    pub fn with_connector(name: &str, state: ConnectorState) -> Arc<Self> {
        let backend = Self::new();
        {
            let mut inner = backend.inner.try_lock().expect("fresh backend");
            inner.connectors.push(Connector {
                name: name.into(),
                connector_class: FILE_SOURCE.into(),
                category: Some("source".into()),
                topics: "orders".into(),
                state,
                pipelines: None,
            });
            let config: ConnectorConfig = [
                ("connector.class", FILE_SOURCE),
                ("name", name),
                ("topic", "orders"),
                ("file", "/data/lines.txt"),
            ]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
            inner.configs.insert(name.into(), config);
        }
        backend
    }

    pub async fn fail_with(&self, error: Error) {
        self.inner.lock().await.pending_error = Some(error);
    }

    pub async fn fail_status(&self) {
        self.inner.lock().await.status_fails = true;
    }

    /// Config-def requests never complete
    pub async fn hold_config_defs(&self) {
        self.inner.lock().await.hold_config_defs = true;
    }

    /// Create requests are recorded but never answered
    pub async fn hold_creates(&self) {
        self.inner.lock().await.hold_creates = true;
    }

    /// Uploaded files are accepted but left out of the file list
    pub async fn hide_uploads(&self) {
        self.inner.lock().await.hide_uploads = true;
    }

    pub async fn list_calls(&self) -> usize {
        self.inner.lock().await.list_calls
    }

    pub async fn created(&self) -> Vec<CreateConnectorRequest> {
        self.inner.lock().await.created.clone()
    }

    pub async fn updated(&self) -> Vec<(String, ConnectorConfig)> {
        self.inner.lock().await.updated.clone()
    }

    pub async fn registered(&self) -> Vec<(String, Value)> {
        self.inner.lock().await.registered.clone()
    }

    async fn check(&self) -> Result<tokio::sync::MutexGuard<'_, Inner>> {
        let mut inner = self.inner.lock().await;
        match inner.pending_error.take() {
            Some(error) => Err(error),
            None => Ok(inner),
        }
    }

    fn not_found(name: &str) -> Error {
        Error::Api {
            status: 404,
            message: format!("Connector {} not found", name),
        }
    }
}

#[async_trait]
impl ExternalSourcesBackend for FakeBackend {
    async fn list_connectors(&self) -> Result<Vec<Connector>> {
        let mut inner = self.check().await?;
        inner.list_calls += 1;
        Ok(inner.connectors.clone())
    }

    async fn create_connector(&self, request: &CreateConnectorRequest) -> Result<String> {
        let mut inner = self.check().await?;
        inner.created.push(request.clone());
        if inner.hold_creates {
            drop(inner);
            return std::future::pending().await;
        }
        inner.connectors.push(Connector {
            name: request.name.clone(),
            connector_class: request.config.get("connector.class").cloned().unwrap_or_default(),
            category: None,
            topics: String::new(),
            state: ConnectorState::Running,
            pipelines: None,
        });
        inner.configs.insert(request.name.clone(), request.config.clone());
        Ok(format!("Connector {} created", request.name))
    }

    async fn delete_connector(&self, name: &str) -> Result<()> {
        let mut inner = self.check().await?;
        inner.connectors.retain(|c| c.name != name);
        inner.configs.remove(name);
        Ok(())
    }

    async fn get_connector_config(&self, name: &str) -> Result<ConnectorConfig> {
        let inner = self.check().await?;
        inner.configs.get(name).cloned().ok_or_else(|| Self::not_found(name))
    }

    async fn update_connector_config(&self, name: &str, config: &ConnectorConfig) -> Result<()> {
        let mut inner = self.check().await?;
        inner.updated.push((name.to_string(), config.clone()));
        inner.configs.insert(name.to_string(), config.clone());
        Ok(())
    }

    async fn get_connector_status(&self, name: &str) -> Result<ConnectorStatus> {
        let inner = self.check().await?;
        if inner.status_fails {
            return Err(Error::Transport("status unavailable".into()));
        }
        inner
            .connectors
            .iter()
            .find(|c| c.name == name)
            .map(|c| ConnectorStatus {
                name: c.name.clone(),
                state: c.state,
            })
            .ok_or_else(|| Self::not_found(name))
    }

    async fn pause_connector(&self, name: &str) -> Result<()> {
        let mut inner = self.check().await?;
        let connector = inner
            .connectors
            .iter_mut()
            .find(|c| c.name == name)
            .ok_or_else(|| Self::not_found(name))?;
        connector.state = ConnectorState::Paused;
        Ok(())
    }

    async fn resume_connector(&self, name: &str) -> Result<()> {
        let mut inner = self.check().await?;
        let connector = inner
            .connectors
            .iter_mut()
            .find(|c| c.name == name)
            .ok_or_else(|| Self::not_found(name))?;
        connector.state = ConnectorState::Running;
        Ok(())
    }

    async fn list_plugins(&self) -> Result<Vec<ConnectorPlugin>> {
        self.check().await?;
        Ok(vec![
            ConnectorPlugin::new(FILE_SOURCE, PluginCategory::Source),
            ConnectorPlugin::new(JDBC_SOURCE, PluginCategory::Source),
            ConnectorPlugin::new(
                "org.apache.kafka.connect.mirror.MirrorSourceConnector",
                PluginCategory::Source,
            ),
        ])
    }

    async fn list_config_defs(&self, connector_class: &str) -> Result<Vec<ConfigDef>> {
        let hold = self.check().await?.hold_config_defs;
        if hold {
            std::future::pending::<()>().await;
        }

        let defs = match connector_class {
            JDBC_SOURCE => vec![
                ConfigDef::new("connection.url").required().with_default("x"),
                ConfigDef::new("topic.prefix").required(),
                ConfigDef::new("batch.max.rows")
                    .with_default("100")
                    .with_group("Connector"),
            ],
            FILE_SOURCE => vec![
                ConfigDef::new("topic").required(),
                ConfigDef::new("file"),
                ConfigDef::new("batch.size").with_default("2000"),
            ],
            _ => Vec::new(),
        };
        Ok(defs)
    }

    async fn list_files(&self) -> Result<Vec<DataFileInfo>> {
        let inner = self.check().await?;
        Ok(inner.files.clone())
    }

    async fn upload_file(&self, file_name: &str, contents: Vec<u8>) -> Result<String> {
        let mut inner = self.check().await?;
        if !inner.hide_uploads {
            inner.files.push(DataFileInfo {
                name: file_name.to_string(),
                size: contents.len() as u64,
                connect_path: format!("/mnt/connect/{}", file_name),
            });
        }
        Ok(format!("Uploaded {}", file_name))
    }
}

#[async_trait]
impl SchemaRegistryBackend for FakeBackend {
    async fn list_subjects(&self) -> Result<Vec<String>> {
        let inner = self.check().await?;
        Ok(inner.subjects.clone())
    }

    async fn register_schema(&self, subject: &str, schema: &Value) -> Result<SchemaRegistration> {
        let mut inner = self.check().await?;
        inner.registered.push((subject.to_string(), schema.clone()));
        if !inner.subjects.iter().any(|s| s == subject) {
            inner.subjects.push(subject.to_string());
        }
        Ok(SchemaRegistration {
            id: Some(inner.registered.len() as i64),
        })
    }

    async fn health(&self) -> Result<SchemaRegistryHealth> {
        self.check().await?;
        Ok(SchemaRegistryHealth {
            status: "UP".into(),
        })
    }
}

#[async_trait]
impl KafkaBackend for FakeBackend {
    async fn list_topics(&self, include_internal: bool) -> Result<Vec<String>> {
        self.check().await?;
        let mut topics = vec!["orders".to_string()];
        if include_internal {
            topics.insert(0, "__consumer_offsets".to_string());
        }
        Ok(topics)
    }
}
