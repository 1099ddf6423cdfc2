use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Flat connector configuration, one string value per key
pub type ConnectorConfig = BTreeMap<String, String>;

/// Connector identifier key, travels as a top-level field
pub const NAME_KEY: &str = "name";

/// Connector implementation key, injected at submit time
pub const CONNECTOR_CLASS_KEY: &str = "connector.class";

/// Keys owned by the editor rather than by the user
pub const RESERVED_KEYS: [&str; 2] = [NAME_KEY, CONNECTOR_CLASS_KEY];

/// File path key of the file-source connector
pub const FILE_KEY: &str = "file";

/// Schema Registry subject picked for a connector
pub const SCHEMA_SUBJECT_KEY: &str = "dapm.schema.subject";

pub const FILE_SOURCE_CONNECTOR_CLASS: &str =
    "org.apache.kafka.connect.file.FileStreamSourceConnector";

pub fn is_reserved_key(key: &str) -> bool {
    RESERVED_KEYS.contains(&key)
}

pub fn is_file_source_connector(connector_class: &str) -> bool {
    connector_class == FILE_SOURCE_CONNECTOR_CLASS
}

/// Copy of `config` without the reserved keys
pub fn strip_reserved_keys(config: &ConnectorConfig) -> ConnectorConfig {
    config
        .iter()
        .filter(|(k, _)| !is_reserved_key(k))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

/// Lifecycle state reported for a connector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ConnectorState {
    Running,
    Paused,
    Failed,
    #[default]
    Unknown,
}

impl ConnectorState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectorState::Running => "RUNNING",
            ConnectorState::Paused => "PAUSED",
            ConnectorState::Failed => "FAILED",
            ConnectorState::Unknown => "UNKNOWN",
        }
    }
}

impl From<String> for ConnectorState {
    fn from(value: String) -> Self {
        match value.trim().to_ascii_uppercase().as_str() {
            "RUNNING" => ConnectorState::Running,
            "PAUSED" => ConnectorState::Paused,
            "FAILED" => ConnectorState::Failed,
            _ => ConnectorState::Unknown,
        }
    }
}

impl From<ConnectorState> for String {
    fn from(value: ConnectorState) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for ConnectorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reads an explicit `null` as the type's default
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Connector as listed by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connector {
    /// Unique connector name
    pub name: String,

    /// Fully-qualified implementation class
    #[serde(default, deserialize_with = "null_as_default")]
    pub connector_class: String,

    /// Plugin category (source, sink, ...)
    #[serde(default, alias = "type")]
    pub category: Option<String>,

    /// Topic descriptor as reported by the backend
    #[serde(default, deserialize_with = "null_as_default")]
    pub topics: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub state: ConnectorState,

    /// Pipelines referencing this connector, informational only
    #[serde(default)]
    pub pipelines: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectorStatus {
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub state: ConnectorState,
}

/// Body of a create request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateConnectorRequest {
    pub name: String,
    pub config: ConnectorConfig,
}

/// File available to file-source connectors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataFileInfo {
    pub name: String,
    #[serde(default)]
    pub size: u64,
    /// Path of the file as seen by the Connect workers
    pub connect_path: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SchemaRegistration {
    /// Missing when the registry answers without one
    #[serde(default)]
    pub id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaRegistryHealth {
    pub status: String,
}

/// Uniform outcome of a mutating operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationResult {
    pub success: bool,
    pub message: String,
}

impl OperationResult {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}
