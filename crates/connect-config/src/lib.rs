use connect_client::ClientOptions;
use connect_core::Session;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub session: SessionConfig,
    pub http: HttpConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Organization domain the backend is reached at
    pub domain: String,

    /// URL scheme used when the domain carries none
    pub scheme: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Per-request timeout in seconds
    pub timeout_secs: u64,

    pub user_agent: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// JSON formatted logs
    pub json: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            domain: String::new(),
            scheme: "http".to_string(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        let options = ClientOptions::default();
        Self {
            timeout_secs: options.timeout.as_secs(),
            user_agent: options.user_agent,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl SessionConfig {
    pub fn to_session(&self) -> Session {
        Session::new(self.domain.clone()).with_scheme(self.scheme.clone())
    }
}

impl HttpConfig {
    pub fn to_client_options(&self) -> ClientOptions {
        ClientOptions {
            timeout: Duration::from_secs(self.timeout_secs),
            user_agent: self.user_agent.clone(),
        }
    }
}

impl AppConfig {
    pub fn load(config_dir: impl AsRef<Path>) -> anyhow::Result<Self> {
        let config_dir = config_dir.as_ref();
        let s = config::Config::builder()
            .add_source(config::Config::try_from(&Self::default())?)
            .add_source(
                config::File::with_name(&config_dir.join("default.yaml").to_string_lossy())
                    .required(false),
            )
            // Machine-local overrides, not checked in
            .add_source(
                config::File::with_name(&config_dir.join("local.yaml").to_string_lossy())
                    .required(false),
            )
            // CONNECT_ADMIN_SESSION__DOMAIN=acme.example.com
            .add_source(
                config::Environment::with_prefix("CONNECT_ADMIN")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        let config = s.try_deserialize()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    pub fn to_file(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn session(&self) -> Session {
        self.session.to_session()
    }

    pub fn client_options(&self) -> ClientOptions {
        self.http.to_client_options()
    }
}
