use serde::{Deserialize, Serialize};

/// Class prefix of MirrorMaker plugins, never offered for selection
pub const MIRROR_PLUGIN_PREFIX: &str = "org.apache.kafka.connect.mirror.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PluginCategory {
    Source,
    Sink,
    Other(String),
}

impl From<String> for PluginCategory {
    fn from(value: String) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "source" => PluginCategory::Source,
            "sink" => PluginCategory::Sink,
            _ => PluginCategory::Other(value),
        }
    }
}

impl From<PluginCategory> for String {
    fn from(value: PluginCategory) -> Self {
        match value {
            PluginCategory::Source => "source".to_string(),
            PluginCategory::Sink => "sink".to_string(),
            PluginCategory::Other(raw) => raw,
        }
    }
}

impl Default for PluginCategory {
    fn default() -> Self {
        PluginCategory::Other(String::new())
    }
}

/// Connector implementation installed on the Connect cluster
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectorPlugin {
    #[serde(rename = "clazz", alias = "class")]
    pub class: String,

    #[serde(default, rename = "type")]
    pub category: PluginCategory,

    #[serde(default)]
    pub version: Option<String>,
}

impl ConnectorPlugin {
    pub fn new(class: impl Into<String>, category: PluginCategory) -> Self {
        Self {
            class: class.into(),
            category,
            version: None,
        }
    }

    pub fn short_name(&self) -> &str {
        short_name(&self.class)
    }

    /// Short class name followed by the version when known
    pub fn label(&self) -> String {
        match &self.version {
            Some(v) if !v.is_empty() => format!("{} ({})", self.short_name(), v),
            _ => self.short_name().to_string(),
        }
    }

    pub fn is_mirror(&self) -> bool {
        self.class.starts_with(MIRROR_PLUGIN_PREFIX)
    }
}

/// Last segment of a dotted class name
pub fn short_name(class: &str) -> &str {
    match class.rsplit('.').next() {
        Some(last) if !last.is_empty() => last,
        _ => class,
    }
}

/// Plugins split by category, each list sorted by short name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupedPlugins {
    pub source: Vec<ConnectorPlugin>,
    pub sink: Vec<ConnectorPlugin>,
    pub other: Vec<ConnectorPlugin>,
}

impl GroupedPlugins {
    pub fn is_empty(&self) -> bool {
        self.source.is_empty() && self.sink.is_empty() && self.other.is_empty()
    }

    pub fn contains(&self, class: &str) -> bool {
        self.source
            .iter()
            .chain(&self.sink)
            .chain(&self.other)
            .any(|p| p.class == class)
    }
}

pub fn group_plugins(plugins: &[ConnectorPlugin]) -> GroupedPlugins {
    let mut grouped = GroupedPlugins::default();
    for plugin in plugins {
        match plugin.category {
            PluginCategory::Source => grouped.source.push(plugin.clone()),
            PluginCategory::Sink => grouped.sink.push(plugin.clone()),
            PluginCategory::Other(_) => grouped.other.push(plugin.clone()),
        }
    }

    for list in [&mut grouped.source, &mut grouped.sink, &mut grouped.other] {
        list.sort_by(|a, b| a.short_name().cmp(b.short_name()));
    }
    grouped
}
