use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Organization the client acts for. Every request is addressed to the
/// organization's own domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Organization domain name, optionally with a port (`acme.example.com:8080`)
    pub domain: String,

    /// URL scheme used to reach the domain
    #[serde(default = "default_scheme")]
    pub scheme: String,
}

fn default_scheme() -> String {
    "http".to_string()
}

impl Session {
    pub fn new(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            scheme: default_scheme(),
        }
    }

    pub fn with_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = scheme.into();
        self
    }

    pub fn domain(&self) -> &str {
        self.domain.trim()
    }

    pub fn has_domain(&self) -> bool {
        !self.domain().is_empty()
    }

    /// Base URL of the organization's backend, without a trailing slash.
    pub fn base_url(&self) -> Result<String> {
        let domain = self.domain();
        if domain.is_empty() {
            return Err(Error::MissingDomain);
        }

        let base = if domain.contains("://") {
            domain.to_string()
        } else {
            format!("{}://{}", self.scheme.trim(), domain)
        };
        Ok(base.trim_end_matches('/').to_string())
    }
}
