use crate::failure_message;
use connect_core::{Result, SchemaRegistryBackend, SchemaRegistryHealth};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

#[derive(Debug, Clone, Default)]
pub struct SchemaRegistryState {
    pub subjects: Vec<String>,
    pub loading: bool,
    pub last_error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaUploadResult {
    pub success: bool,
    pub message: String,
    /// Registry id of the uploaded schema
    pub schema_id: Option<i64>,
}

impl SchemaUploadResult {
    fn rejected(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            schema_id: None,
        }
    }
}

pub struct SchemaRegistryProvider {
    backend: Arc<dyn SchemaRegistryBackend>,
    state: RwLock<SchemaRegistryState>,
}

impl SchemaRegistryProvider {
    pub fn new(backend: Arc<dyn SchemaRegistryBackend>) -> Self {
        Self {
            backend,
            state: RwLock::new(SchemaRegistryState::default()),
        }
    }

    pub async fn state(&self) -> SchemaRegistryState {
        self.state.read().await.clone()
    }

    pub async fn subjects(&self) -> Vec<String> {
        self.state.read().await.subjects.clone()
    }

    /// Reloads the subject list. A failure clears the list and is kept in
    /// `last_error`.
    pub async fn refresh_subjects(&self) -> Vec<String> {
        {
            let mut state = self.state.write().await;
            state.loading = true;
            state.last_error = None;
        }

        let result = self.backend.list_subjects().await;

        let mut state = self.state.write().await;
        state.loading = false;
        match result {
            Ok(subjects) => {
                state.subjects = subjects;
            }
            Err(e) => {
                let message = failure_message(&e, "Failed to load schema subjects");
                warn!("Schema subjects unavailable: {}", message);
                state.subjects.clear();
                state.last_error = Some(message);
            }
        }
        state.subjects.clone()
    }

    pub async fn upload_schema(&self, subject: &str, schema_text: &str) -> SchemaUploadResult {
        self.state.write().await.last_error = None;
        let subject = subject.trim();
        if subject.is_empty() {
            return SchemaUploadResult::rejected("Subject is required.");
        }
        if schema_text.trim().is_empty() {
            return SchemaUploadResult::rejected("Schema text is required.");
        }
        let schema: Value = match serde_json::from_str(schema_text) {
            Ok(schema) => schema,
            Err(_) => return SchemaUploadResult::rejected("Schema must be valid JSON."),
        };

        match self.backend.register_schema(subject, &schema).await {
            Ok(registration) => {
                info!("Registered schema {:?} under '{}'", registration.id, subject);
                self.refresh_subjects().await;
                SchemaUploadResult {
                    success: true,
                    message: "Schema uploaded.".to_string(),
                    schema_id: registration.id,
                }
            }
            Err(e) => {
                let message = failure_message(&e, "Schema upload failed");
                self.state.write().await.last_error = Some(message.clone());
                SchemaUploadResult::rejected(message)
            }
        }
    }

    pub async fn health(&self) -> Result<SchemaRegistryHealth> {
        self.backend.health().await
    }
}
