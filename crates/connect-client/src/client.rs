use connect_core::{Error, Result, Session};
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Per-request timeout
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            user_agent: concat!("connect-admin/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// HTTP client for one organization's backend
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    session: Session,
}

impl ApiClient {
    pub fn new(session: Session) -> Result<Self> {
        Self::with_options(session, ClientOptions::default())
    }

    pub fn with_options(session: Session, options: ClientOptions) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(options.user_agent)
            .timeout(options.timeout)
            .build()
            .map_err(|e| Error::Configuration(e.to_string()))?;
        Ok(Self { http, session })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub(crate) fn url(&self, path: &str) -> Result<String> {
        Ok(format!("{}{}", self.session.base_url()?, path))
    }

    pub(crate) fn get(&self, path: &str) -> Result<RequestBuilder> {
        Ok(self.http.get(self.url(path)?))
    }

    pub(crate) fn post(&self, path: &str) -> Result<RequestBuilder> {
        Ok(self.http.post(self.url(path)?))
    }

    pub(crate) fn put(&self, path: &str) -> Result<RequestBuilder> {
        Ok(self.http.put(self.url(path)?))
    }

    pub(crate) fn delete(&self, path: &str) -> Result<RequestBuilder> {
        Ok(self.http.delete(self.url(path)?))
    }

    /// Sends the request and turns non-2xx answers into `Error::Api`
    pub(crate) async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = request.send().await.map_err(|e| {
            warn!("Request failed: {}", e);
            Error::Transport(e.to_string())
        })?;

        let status = response.status();
        debug!("{} {}", status.as_u16(), response.url().path());
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = error_message(status, &body);
        warn!("Backend rejected request ({}): {}", status.as_u16(), message);
        Err(Error::Api {
            status: status.as_u16(),
            message,
        })
    }

    /// Sends the request and decodes the body, an empty or `null` body
    /// decodes to the default value
    pub(crate) async fn fetch<T>(&self, request: RequestBuilder) -> Result<T>
    where
        T: DeserializeOwned + Default,
    {
        let response = self.send(request).await?;
        let body = response
            .text()
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;

        let trimmed = body.trim();
        if trimmed.is_empty() || trimmed == "null" {
            return Ok(T::default());
        }
        Ok(serde_json::from_str(trimmed)?)
    }

    /// Sends the request and returns the `message` of the answer, if any
    pub(crate) async fn send_for_message(&self, request: RequestBuilder) -> Result<Option<String>> {
        let response = self.send(request).await?;
        let body = response.text().await.unwrap_or_default();
        Ok(message_field(&body))
    }
}

/// Percent-encodes one path segment
pub(crate) fn segment(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

fn message_field(body: &str) -> Option<String> {
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(map)) => map
            .get("message")
            .and_then(Value::as_str)
            .filter(|m| !m.trim().is_empty())
            .map(str::to_string),
        _ => None,
    }
}

/// Message for a failed response: the body's `message`, then its `error`,
/// then a plain-text body, then a generic status message.
pub fn error_message(status: StatusCode, body: &str) -> String {
    let trimmed = body.trim();
    match serde_json::from_str::<Value>(trimmed) {
        Ok(Value::Object(map)) => {
            for key in ["message", "error"] {
                if let Some(text) = map.get(key).and_then(Value::as_str) {
                    if !text.trim().is_empty() {
                        return text.to_string();
                    }
                }
            }
        }
        Ok(Value::String(text)) if !text.trim().is_empty() => return text,
        Ok(_) => {}
        Err(_) if !trimmed.is_empty() => return trimmed.to_string(),
        Err(_) => {}
    }
    format!("Request failed with status code {}", status.as_u16())
}
