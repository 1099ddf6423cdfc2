mod backend;
mod config_def;
pub mod editor;
mod error;
mod models;
mod plugin;
mod session;

pub use backend::{ExternalSourcesBackend, KafkaBackend, SchemaRegistryBackend};
pub use config_def::{group_defs, ConfigDef, ConfigGroup, FieldKind, DEFAULT_GROUP};
pub use editor::{ConnectorEditor, DefsRequest, EditorMode, RawBody, Submission, ViewMode};
pub use error::{Error, Result};
pub use models::{
    is_file_source_connector, is_reserved_key, strip_reserved_keys, Connector, ConnectorConfig,
    ConnectorState, ConnectorStatus, CreateConnectorRequest, DataFileInfo, OperationResult,
    SchemaRegistration, SchemaRegistryHealth, CONNECTOR_CLASS_KEY, FILE_KEY,
    FILE_SOURCE_CONNECTOR_CLASS, NAME_KEY, RESERVED_KEYS, SCHEMA_SUBJECT_KEY,
};
pub use plugin::{group_plugins, short_name, ConnectorPlugin, GroupedPlugins, PluginCategory};
pub use session::Session;

// Re-export for backend implementors
pub use async_trait::async_trait;
