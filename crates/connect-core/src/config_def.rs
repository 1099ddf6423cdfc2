use crate::models::null_as_default;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Group label used when a definition carries none
pub const DEFAULT_GROUP: &str = "Other";

/// Value kind declared for a configuration key
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FieldKind {
    #[default]
    String,
    Int,
    Long,
    Short,
    Double,
    Boolean,
    List,
    Class,
    Password,
    Other(String),
}

impl From<String> for FieldKind {
    fn from(value: String) -> Self {
        match value.trim().to_ascii_uppercase().as_str() {
            "" | "STRING" => FieldKind::String,
            "INT" => FieldKind::Int,
            "LONG" => FieldKind::Long,
            "SHORT" => FieldKind::Short,
            "DOUBLE" => FieldKind::Double,
            "BOOLEAN" => FieldKind::Boolean,
            "LIST" => FieldKind::List,
            "CLASS" => FieldKind::Class,
            "PASSWORD" => FieldKind::Password,
            _ => FieldKind::Other(value),
        }
    }
}

impl From<FieldKind> for String {
    fn from(value: FieldKind) -> Self {
        match value {
            FieldKind::String => "STRING".to_string(),
            FieldKind::Int => "INT".to_string(),
            FieldKind::Long => "LONG".to_string(),
            FieldKind::Short => "SHORT".to_string(),
            FieldKind::Double => "DOUBLE".to_string(),
            FieldKind::Boolean => "BOOLEAN".to_string(),
            FieldKind::List => "LIST".to_string(),
            FieldKind::Class => "CLASS".to_string(),
            FieldKind::Password => "PASSWORD".to_string(),
            FieldKind::Other(raw) => raw,
        }
    }
}

/// Backend-declared metadata for one configuration key of a connector class
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigDef {
    pub name: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub required: bool,

    /// Default value, scalars of any JSON type are kept as text
    #[serde(default, deserialize_with = "deserialize_scalar")]
    pub default_value: Option<String>,

    #[serde(default)]
    pub documentation: Option<String>,

    #[serde(default)]
    pub group: Option<String>,

    #[serde(default)]
    pub order: Option<i64>,

    #[serde(default, rename = "type", deserialize_with = "null_as_default")]
    pub kind: FieldKind,

    /// Attributes this client does not interpret
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl ConfigDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            required: false,
            default_value: None,
            documentation: None,
            group: None,
            order: None,
            kind: FieldKind::default(),
            extra: BTreeMap::new(),
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_default(mut self, value: impl Into<String>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    /// Group label for display, blank groups fall into `Other`
    pub fn group_label(&self) -> &str {
        match self.group.as_deref().map(str::trim) {
            Some(g) if !g.is_empty() => g,
            _ => DEFAULT_GROUP,
        }
    }

    /// Value seeded into an empty config for this key
    pub fn seed_value(&self) -> String {
        self.default_value.clone().unwrap_or_default()
    }
}

fn deserialize_scalar<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

/// Optional definitions sharing one group label
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigGroup {
    pub name: String,
    pub defs: Vec<ConfigDef>,
}

/// Groups definitions by label, filtered by a case-insensitive search on
/// name or group. Groups and their members come back sorted by name.
pub fn group_defs(defs: &[ConfigDef], search: &str) -> Vec<ConfigGroup> {
    let query = search.trim().to_lowercase();

    let mut groups: BTreeMap<String, Vec<ConfigDef>> = BTreeMap::new();
    for def in defs {
        if !query.is_empty() {
            let in_name = def.name.to_lowercase().contains(&query);
            let in_group = def
                .group
                .as_deref()
                .map(|g| g.to_lowercase().contains(&query))
                .unwrap_or(false);
            if !in_name && !in_group {
                continue;
            }
        }
        groups
            .entry(def.group_label().to_string())
            .or_default()
            .push(def.clone());
    }

    groups
        .into_iter()
        .map(|(name, mut defs)| {
            defs.sort_by(|a, b| a.name.cmp(&b.name));
            ConfigGroup { name, defs }
        })
        .collect()
}
