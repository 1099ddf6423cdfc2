//! Connector configuration editor.
//!
//! One connector configuration is edited through three views at once: typed
//! fields bound to single keys, a freeform JSON body, and the required and
//! optional keys the backend declares for the selected connector class. The
//! canonical config held here is the source of truth; the JSON body is a
//! projection of it that the user may edit by hand.

use crate::config_def::{group_defs, ConfigDef, ConfigGroup};
use crate::models::{
    is_file_source_connector, is_reserved_key, strip_reserved_keys, ConnectorConfig,
    CreateConnectorRequest, CONNECTOR_CLASS_KEY, FILE_KEY, NAME_KEY,
};
use crate::{Error, Result};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use tracing::debug;

/// Error kept on the raw view while its text does not parse
pub const RAW_PARSE_ERROR: &str = "Invalid JSON (not saved to form until fixed).";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorMode {
    Create,
    /// Editing an existing connector; its name and class are fixed
    Edit {
        name: String,
        connector_class: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    #[default]
    Form,
    Raw,
    Schema,
}

/// Ticket for one config-def fetch. Results are only applied while the
/// ticket is still the latest one issued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefsRequest {
    pub connector_class: String,
    generation: u64,
}

/// Payload ready to be sent to the backend
#[derive(Debug, Clone, PartialEq)]
pub enum Submission {
    Create(CreateConnectorRequest),
    Update {
        name: String,
        config: ConnectorConfig,
    },
}

/// Parsed form of the raw JSON body `{ "name": ..., "config": { ... } }`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawBody {
    pub name: Option<String>,
    /// `config["connector.class"]` when it is a string
    pub connector_class: Option<String>,
    /// Config entries with reserved keys removed and values stringified
    pub config: Option<ConnectorConfig>,
}

impl RawBody {
    pub fn parse(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)?;
        let body = match value {
            Value::Object(body) => body,
            _ => {
                return Err(Error::InvalidRawJson(
                    "raw body must be a JSON object".to_string(),
                ))
            }
        };

        let name = body.get(NAME_KEY).and_then(Value::as_str).map(str::to_string);

        let raw_config = body.get("config").and_then(Value::as_object);
        let connector_class = raw_config
            .and_then(|c| c.get(CONNECTOR_CLASS_KEY))
            .and_then(Value::as_str)
            .map(str::to_string);
        let config = raw_config.map(stringify_entries);

        Ok(Self {
            name,
            connector_class,
            config,
        })
    }
}

fn stringify_entries(entries: &Map<String, Value>) -> ConnectorConfig {
    entries
        .iter()
        .filter(|(k, _)| !is_reserved_key(k))
        .map(|(k, v)| {
            let value = match v {
                Value::String(s) => s.clone(),
                Value::Null => String::new(),
                other => other.to_string(),
            };
            (k.clone(), value)
        })
        .collect()
}

#[derive(Serialize)]
struct RawProjection<'a> {
    name: &'a str,
    config: &'a ConnectorConfig,
}

#[derive(Debug, Clone, Default)]
struct RawState {
    text: String,
    /// Text was edited by hand since the last sync
    dirty: bool,
    last_synced: String,
    error: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ConnectorEditor {
    mode: EditorMode,
    name: String,
    connector_class: String,
    /// Canonical config, never holds reserved keys
    config: ConnectorConfig,
    defs: Vec<ConfigDef>,
    defs_loading: bool,
    generation: u64,
    view: ViewMode,
    raw: RawState,
}

impl ConnectorEditor {
    /// Empty editor for a new connector
    pub fn create() -> Self {
        Self {
            mode: EditorMode::Create,
            name: String::new(),
            connector_class: String::new(),
            config: ConnectorConfig::new(),
            defs: Vec::new(),
            defs_loading: false,
            generation: 0,
            view: ViewMode::Form,
            raw: RawState::default(),
        }
    }

    /// Editor hydrated from an existing connector's configuration
    pub fn edit(name: impl Into<String>, existing: &ConnectorConfig) -> Self {
        let name = name.into();
        let connector_class = existing
            .get(CONNECTOR_CLASS_KEY)
            .cloned()
            .unwrap_or_default();

        Self {
            mode: EditorMode::Edit {
                name: name.clone(),
                connector_class: connector_class.clone(),
            },
            name,
            connector_class,
            config: strip_reserved_keys(existing),
            ..Self::create()
        }
    }

    pub fn mode(&self) -> &EditorMode {
        &self.mode
    }

    pub fn is_edit(&self) -> bool {
        matches!(self.mode, EditorMode::Edit { .. })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn connector_class(&self) -> &str {
        &self.connector_class
    }

    pub fn config(&self) -> &ConnectorConfig {
        &self.config
    }

    pub fn value(&self, key: &str) -> Option<&str> {
        self.config.get(key).map(String::as_str)
    }

    pub fn view(&self) -> ViewMode {
        self.view
    }

    pub fn defs(&self) -> &[ConfigDef] {
        &self.defs
    }

    pub fn defs_loading(&self) -> bool {
        self.defs_loading
    }

    pub fn raw_text(&self) -> &str {
        &self.raw.text
    }

    pub fn raw_dirty(&self) -> bool {
        self.raw.dirty
    }

    pub fn raw_error(&self) -> Option<&str> {
        self.raw.error.as_deref()
    }

    // ========== Field edits ==========

    pub fn set_value(&mut self, key: impl Into<String>, value: impl Into<String>) -> Result<()> {
        let key = key.into();
        if is_reserved_key(&key) {
            return Err(Error::ReservedKey(key));
        }
        self.config.insert(key, value.into());
        self.sync_raw_if_clean();
        Ok(())
    }

    pub fn set_name(&mut self, name: impl Into<String>) -> Result<()> {
        if self.is_edit() {
            return Err(Error::Immutable("Connector name"));
        }
        self.name = name.into();
        self.sync_raw_if_clean();
        Ok(())
    }

    /// Changes the connector class. Returns the ticket for the config-def
    /// fetch the new class needs, or `None` when nothing has to be loaded.
    pub fn select_connector_class(
        &mut self,
        connector_class: impl Into<String>,
    ) -> Result<Option<DefsRequest>> {
        if self.is_edit() {
            return Err(Error::Immutable("Connector type"));
        }
        let connector_class = connector_class.into();
        if connector_class == self.connector_class {
            return Ok(None);
        }
        Ok(self.change_class(connector_class))
    }

    /// Ticket for (re)loading the defs of the current class
    pub fn request_defs(&mut self) -> Option<DefsRequest> {
        self.generation += 1;
        self.defs.clear();
        if self.connector_class.is_empty() {
            self.defs_loading = false;
            return None;
        }
        self.defs_loading = true;
        Some(DefsRequest {
            connector_class: self.connector_class.clone(),
            generation: self.generation,
        })
    }

    fn change_class(&mut self, connector_class: String) -> Option<DefsRequest> {
        debug!(
            "Connector class changed from '{}' to '{}'",
            self.connector_class, connector_class
        );
        self.connector_class = connector_class;
        let request = self.request_defs();
        self.sync_raw_if_clean();
        request
    }

    fn is_current(&self, request: &DefsRequest) -> bool {
        request.generation == self.generation && request.connector_class == self.connector_class
    }

    /// Applies fetched defs and seeds missing required keys with their
    /// defaults. Returns `false` when the ticket is stale.
    pub fn apply_config_defs(&mut self, request: &DefsRequest, defs: Vec<ConfigDef>) -> bool {
        if !self.is_current(request) {
            debug!(
                "Dropping config defs for '{}', class is now '{}'",
                request.connector_class, self.connector_class
            );
            return false;
        }

        self.defs = defs;
        self.defs_loading = false;

        let seeds: Vec<(String, String)> = self
            .required_defs()
            .filter(|d| !self.config.contains_key(&d.name))
            .map(|d| (d.name.clone(), d.seed_value()))
            .collect();
        self.config.extend(seeds);

        self.sync_raw_if_clean();
        true
    }

    /// Marks a failed fetch as finished if it is still the current one
    pub fn abandon_defs_request(&mut self, request: &DefsRequest) {
        if self.is_current(request) {
            self.defs_loading = false;
        }
    }

    // ========== Declared fields ==========

    /// Required defs, reserved keys excluded
    pub fn required_defs(&self) -> impl Iterator<Item = &ConfigDef> {
        self.defs
            .iter()
            .filter(|d| d.required && !is_reserved_key(&d.name))
    }

    /// Optional defs; reserved keys and the file key are shown elsewhere
    pub fn optional_defs(&self) -> impl Iterator<Item = &ConfigDef> {
        self.defs
            .iter()
            .filter(|d| !d.required && !is_reserved_key(&d.name) && d.name != FILE_KEY)
    }

    pub fn optional_groups(&self, search: &str) -> Vec<ConfigGroup> {
        let optional: Vec<ConfigDef> = self.optional_defs().cloned().collect();
        group_defs(&optional, search)
    }

    // ========== Raw view ==========

    pub fn switch_view(&mut self, view: ViewMode) {
        self.view = view;
        self.sync_raw_if_clean();
    }

    /// Config shown in the raw view. In create mode only required keys and
    /// keys with a non-blank value are listed.
    pub fn projected_config(&self) -> ConnectorConfig {
        let mut projected = ConnectorConfig::new();
        if !self.connector_class.is_empty() {
            projected.insert(CONNECTOR_CLASS_KEY.to_string(), self.connector_class.clone());
        }

        match self.mode {
            EditorMode::Edit { .. } => {
                projected.extend(self.config.clone());
            }
            EditorMode::Create => {
                let required: BTreeSet<&str> =
                    self.required_defs().map(|d| d.name.as_str()).collect();

                for (key, value) in &self.config {
                    if required.contains(key.as_str()) || !value.trim().is_empty() {
                        projected.insert(key.clone(), value.clone());
                    }
                }
                for def in self.required_defs() {
                    projected
                        .entry(def.name.clone())
                        .or_insert_with(|| def.seed_value());
                }
            }
        }

        projected.remove(NAME_KEY);
        projected
    }

    pub fn raw_projection(&self) -> String {
        let config = self.projected_config();
        let body = RawProjection {
            name: &self.name,
            config: &config,
        };
        serde_json::to_string_pretty(&body).unwrap_or_default()
    }

    /// Replaces the raw text with the projection of the canonical state
    pub fn refresh_raw_from_form(&mut self) {
        self.resync_raw();
        self.raw.dirty = false;
    }

    pub fn can_refresh_raw(&self) -> bool {
        self.raw.dirty || self.raw.text != self.raw.last_synced
    }

    fn resync_raw(&mut self) {
        let text = self.raw_projection();
        self.raw.last_synced = text.clone();
        self.raw.text = text;
        self.raw.error = None;
    }

    fn sync_raw_if_clean(&mut self) {
        if self.view == ViewMode::Raw && !self.raw.dirty {
            self.resync_raw();
        }
    }

    /// Takes a hand edit of the raw text. Valid JSON flows back into the
    /// canonical state; anything else only records the parse error. Returns
    /// a defs ticket when the edit switched the connector class.
    pub fn edit_raw(&mut self, text: impl Into<String>) -> Option<DefsRequest> {
        self.raw.text = text.into();
        self.raw.dirty = true;

        let body = match RawBody::parse(&self.raw.text) {
            Ok(body) => body,
            Err(e) => {
                debug!("Raw body not applied: {}", e);
                self.raw.error = Some(RAW_PARSE_ERROR.to_string());
                return None;
            }
        };
        self.raw.error = None;

        if self.is_edit() {
            if let Some(config) = body.config {
                self.config = config;
            }
            return None;
        }

        if let Some(name) = body.name {
            self.name = name;
        }

        let mut request = None;
        if let Some(class) = body.connector_class {
            if class != self.connector_class {
                request = self.change_class(class);
            }
        }
        if let Some(config) = body.config {
            self.config.extend(config);
        }
        request
    }

    // ========== Submission ==========

    pub fn can_submit(&self) -> bool {
        self.raw.error.is_none()
    }

    /// Required keys whose value is missing or blank, in declaration order
    pub fn missing_required_fields(&self) -> Vec<String> {
        let mut keys: Vec<&str> = Vec::new();
        if is_file_source_connector(&self.connector_class) {
            keys.push(FILE_KEY);
        }
        for def in self.required_defs() {
            if !keys.contains(&def.name.as_str()) {
                keys.push(&def.name);
            }
        }

        keys.into_iter()
            .filter(|k| self.value(k).map(|v| v.trim().is_empty()).unwrap_or(true))
            .map(str::to_string)
            .collect()
    }

    /// Validates locally and builds the payload. Nothing here touches the
    /// network; a failure means the request must not be sent.
    pub fn build_submission(&self) -> Result<Submission> {
        if let Some(error) = &self.raw.error {
            return Err(Error::InvalidRawJson(error.clone()));
        }

        let submission = match &self.mode {
            EditorMode::Create => {
                let name = self.name.trim();
                if name.is_empty() {
                    return Err(Error::Validation("Connector name is required".to_string()));
                }
                if self.connector_class.trim().is_empty() {
                    return Err(Error::Validation("Connector type is required".to_string()));
                }
                Submission::Create(CreateConnectorRequest {
                    name: name.to_string(),
                    config: self.payload_config(&self.connector_class),
                })
            }
            EditorMode::Edit {
                name,
                connector_class,
            } => {
                if name.is_empty() {
                    return Err(Error::Validation(
                        "Missing connector name for edit.".to_string(),
                    ));
                }
                Submission::Update {
                    name: name.clone(),
                    config: self.payload_config(connector_class),
                }
            }
        };

        let missing = self.missing_required_fields();
        if !missing.is_empty() {
            return Err(Error::MissingFields(missing));
        }
        Ok(submission)
    }

    fn payload_config(&self, connector_class: &str) -> ConnectorConfig {
        let mut config = self.config.clone();
        if !connector_class.is_empty() {
            config.insert(CONNECTOR_CLASS_KEY.to_string(), connector_class.to_string());
        }
        config.remove(NAME_KEY);
        config
    }

    /// State after the backend accepted the submission
    pub fn complete_submission(&mut self) {
        if self.is_edit() {
            self.raw = RawState::default();
        } else {
            *self = Self::create();
        }
    }
}

impl Default for ConnectorEditor {
    fn default() -> Self {
        Self::create()
    }
}
