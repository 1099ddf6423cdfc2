//! Create/edit session for one connector.
//!
//! Wraps a [`ConnectorEditor`] and performs the backend calls it asks for.
//! Every await is raced against the session's cancellation token, so results
//! that arrive after [`FormSession::close`] are dropped instead of applied.

use crate::{failure_message, ExternalSourcesProvider, SchemaRegistryProvider, SchemaUploadResult};
use connect_core::{
    group_plugins, is_file_source_connector, ConnectorEditor, ConnectorPlugin, DataFileInfo,
    DefsRequest, Error, GroupedPlugins, OperationResult, Result, Submission, ViewMode, FILE_KEY,
    SCHEMA_SUBJECT_KEY,
};
use std::future::Future;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

async fn guarded<T>(cancel: &CancellationToken, future: impl Future<Output = T>) -> Result<T> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(Error::Cancelled),
        value = future => Ok(value),
    }
}

pub struct FormSession {
    editor: ConnectorEditor,
    sources: Arc<ExternalSourcesProvider>,
    schemas: Arc<SchemaRegistryProvider>,
    cancel: CancellationToken,

    plugins: Vec<ConnectorPlugin>,
    schema_subjects: Vec<String>,
    files: Vec<DataFileInfo>,

    plugins_error: Option<String>,
    defs_error: Option<String>,
    files_error: Option<String>,
    upload_error: Option<String>,
}

impl FormSession {
    /// Session with an empty create-mode editor; nothing is loaded yet
    pub fn new(sources: Arc<ExternalSourcesProvider>, schemas: Arc<SchemaRegistryProvider>) -> Self {
        Self {
            editor: ConnectorEditor::create(),
            sources,
            schemas,
            cancel: CancellationToken::new(),
            plugins: Vec::new(),
            schema_subjects: Vec::new(),
            files: Vec::new(),
            plugins_error: None,
            defs_error: None,
            files_error: None,
            upload_error: None,
        }
    }

    pub fn editor(&self) -> &ConnectorEditor {
        &self.editor
    }

    pub fn plugins(&self) -> &[ConnectorPlugin] {
        &self.plugins
    }

    pub fn grouped_plugins(&self) -> GroupedPlugins {
        group_plugins(&self.plugins)
    }

    pub fn schema_subjects(&self) -> &[String] {
        &self.schema_subjects
    }

    pub fn files(&self) -> &[DataFileInfo] {
        &self.files
    }

    pub fn plugins_error(&self) -> Option<&str> {
        self.plugins_error.as_deref()
    }

    pub fn defs_error(&self) -> Option<&str> {
        self.defs_error.as_deref()
    }

    pub fn files_error(&self) -> Option<&str> {
        self.files_error.as_deref()
    }

    pub fn upload_error(&self) -> Option<&str> {
        self.upload_error.as_deref()
    }

    /// Token that closes this session when cancelled
    pub fn cancel_handle(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn is_closed(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn close(&self) {
        self.cancel.cancel();
    }

    // ========== Opening ==========

    /// Starts a new connector: loads plugins and schema subjects
    pub async fn open_create(&mut self) -> Result<()> {
        self.editor = ConnectorEditor::create();

        let sources = self.sources.clone();
        let schemas = self.schemas.clone();
        let (plugins, subjects) = guarded(&self.cancel, async {
            tokio::join!(sources.get_connector_plugins(), schemas.refresh_subjects())
        })
        .await?;

        match plugins {
            Ok(plugins) => {
                self.plugins = plugins;
                self.plugins_error = None;
            }
            Err(e) => {
                self.plugins.clear();
                self.plugins_error = Some(failure_message(&e, "Failed to load connector plugins"));
            }
        }
        self.schema_subjects = subjects;
        Ok(())
    }

    /// Hydrates the editor from an existing connector's configuration
    pub async fn open_edit(&mut self, name: &str) -> Result<()> {
        let config = guarded(&self.cancel, self.sources.get_external_source_config(name)).await??;
        info!("Editing connector '{}'", name);
        self.editor = ConnectorEditor::edit(name, &config);

        let request = self.editor.request_defs();
        self.load_defs(request).await?;
        self.refresh_schema_subjects().await
    }

    // ========== Editing ==========

    pub async fn select_connector_class(&mut self, connector_class: &str) -> Result<()> {
        let request = self.editor.select_connector_class(connector_class)?;
        self.load_defs(request).await
    }

    /// Applies a raw JSON edit, loading defs when it switched the class
    pub async fn edit_raw(&mut self, text: &str) -> Result<()> {
        let request = self.editor.edit_raw(text);
        self.load_defs(request).await
    }

    pub fn set_value(&mut self, key: &str, value: &str) -> Result<()> {
        self.editor.set_value(key, value)
    }

    pub fn set_name(&mut self, name: &str) -> Result<()> {
        self.editor.set_name(name)
    }

    pub fn set_schema_subject(&mut self, subject: &str) -> Result<()> {
        self.editor.set_value(SCHEMA_SUBJECT_KEY, subject)
    }

    pub fn switch_view(&mut self, view: ViewMode) {
        self.editor.switch_view(view);
    }

    pub fn refresh_raw_from_form(&mut self) {
        self.editor.refresh_raw_from_form();
    }

    async fn load_defs(&mut self, request: Option<DefsRequest>) -> Result<()> {
        let Some(request) = request else {
            return Ok(());
        };
        let with_files = is_file_source_connector(&request.connector_class);
        debug!("Loading config defs for '{}'", request.connector_class);

        let sources = self.sources.clone();
        let outcome = guarded(&self.cancel, async {
            tokio::join!(
                sources.get_connector_plugin_config_defs(&request.connector_class),
                async {
                    if with_files {
                        Some(sources.list_files().await)
                    } else {
                        None
                    }
                }
            )
        })
        .await;

        let (defs, files) = match outcome {
            Ok(loaded) => loaded,
            Err(e) => {
                self.editor.abandon_defs_request(&request);
                return Err(e);
            }
        };

        match defs {
            Ok(defs) => {
                self.defs_error = None;
                self.editor.apply_config_defs(&request, defs);
            }
            Err(e) => {
                self.editor.abandon_defs_request(&request);
                self.defs_error = Some(failure_message(&e, "Failed to load config definitions"));
            }
        }
        if let Some(files) = files {
            self.apply_files(files);
        }
        Ok(())
    }

    // ========== Files and schemas ==========

    fn apply_files(&mut self, files: Result<Vec<DataFileInfo>>) {
        match files {
            Ok(files) => {
                self.files = files;
                self.files_error = None;
            }
            Err(e) => {
                self.files.clear();
                self.files_error = Some(failure_message(&e, "Failed to load files."));
            }
        }
    }

    pub async fn refresh_files(&mut self) -> Result<()> {
        let files = guarded(&self.cancel, self.sources.list_files()).await?;
        self.apply_files(files);
        Ok(())
    }

    /// Uploads a data file and points the `file` key at it
    pub async fn upload_file(&mut self, file_name: &str, contents: Vec<u8>) -> Result<OperationResult> {
        self.upload_error = None;
        let result = guarded(&self.cancel, self.sources.upload_file(file_name, contents)).await?;
        if !result.success {
            self.upload_error = Some(result.message.clone());
            return Ok(result);
        }

        let files = guarded(&self.cancel, self.sources.list_files()).await?;
        let path = match &files {
            Ok(files) => files
                .iter()
                .find(|f| f.name == file_name)
                .map(|f| f.connect_path.clone()),
            Err(e) => {
                warn!("File list unavailable after upload: {}", e);
                None
            }
        }
        .unwrap_or_else(|| format!("/data/{}", file_name));
        self.apply_files(files);

        self.editor.set_value(FILE_KEY, path)?;
        Ok(result)
    }

    pub async fn refresh_schema_subjects(&mut self) -> Result<()> {
        self.schema_subjects = guarded(&self.cancel, self.schemas.refresh_subjects()).await?;
        Ok(())
    }

    pub async fn upload_schema(&mut self, subject: &str, schema_text: &str) -> Result<SchemaUploadResult> {
        let result = guarded(&self.cancel, self.schemas.upload_schema(subject, schema_text)).await?;
        if result.success {
            self.schema_subjects = self.schemas.subjects().await;
        }
        Ok(result)
    }

    // ========== Submission ==========

    /// Validates locally, then creates or updates the connector. Local
    /// failures are returned as errors and nothing is sent.
    ///
    /// `Error::Cancelled` after the request went out means the outcome is
    /// unknown: the backend may have applied it. The editor keeps its state,
    /// so reload the connector list before submitting again.
    pub async fn submit(&mut self) -> Result<OperationResult> {
        let submission = self.editor.build_submission()?;
        if self.cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }
        let target = match &submission {
            Submission::Create(request) => request.name.clone(),
            Submission::Update { name, .. } => name.clone(),
        };

        let sources = self.sources.clone();
        sources.set_loading(true).await;
        let result = guarded(&self.cancel, async {
            match submission {
                Submission::Create(request) => sources.add_external_source(&request).await,
                Submission::Update { name, config } => {
                    sources.update_external_source_config(&name, &config).await
                }
            }
        })
        .await;
        sources.set_loading(false).await;

        if matches!(result, Err(Error::Cancelled)) {
            warn!(
                "Session closed while submitting '{}', the backend may still apply it",
                target
            );
        }
        let result = result?;
        if result.success {
            self.editor.complete_submission();
        }
        Ok(result)
    }
}

impl Drop for FormSession {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
