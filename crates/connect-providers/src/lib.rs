mod external_sources;
mod form;
mod kafka;
mod schema_registry;

pub use external_sources::{ExternalSourcesProvider, ExternalSourcesState};
pub use form::FormSession;
pub use kafka::{KafkaProvider, KafkaState};
pub use schema_registry::{SchemaRegistryProvider, SchemaRegistryState, SchemaUploadResult};

use connect_core::Error;

/// Message shown for a failed call: backend text verbatim when there is one
pub(crate) fn failure_message(err: &Error, fallback: &str) -> String {
    match err {
        Error::Api { message, .. } if !message.trim().is_empty() => message.clone(),
        Error::Transport(message) if !message.trim().is_empty() => message.clone(),
        Error::Generic(_) => format!("{} due to unknown error", fallback),
        Error::Api { .. } | Error::Transport(_) => fallback.to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod testing;
