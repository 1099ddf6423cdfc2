mod client;
mod external_sources;
mod kafka;
mod schema_registry;

pub use client::{error_message, ApiClient, ClientOptions};

#[cfg(test)]
mod test_backend;
