use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Connection error: {0}")]
    Transport(String),

    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("{0}")]
    Validation(String),

    #[error("Please fill required fields: {}", .0.join(", "))]
    MissingFields(Vec<String>),

    #[error("Invalid JSON: {0}")]
    InvalidRawJson(String),

    #[error("'{0}' is managed by the editor and cannot be set directly")]
    ReservedKey(String),

    #[error("{0} is locked during edit")]
    Immutable(&'static str),

    #[error("Missing org domain.")]
    MissingDomain,

    #[error("Request cancelled")]
    Cancelled,

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Generic error: {0}")]
    Generic(#[from] anyhow::Error),
}

impl Error {
    /// True for failures caught before any request leaves the process.
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            Error::Validation(_)
                | Error::MissingFields(_)
                | Error::InvalidRawJson(_)
                | Error::ReservedKey(_)
                | Error::Immutable(_)
                | Error::MissingDomain
        )
    }
}
