//! Rackspace provider error types

use thiserror::Error;
use topolab_cloud::DriverError;

#[derive(Error, Debug)]
pub enum RackspaceError {
    #[error("No cloudServersOpenStack endpoint for region '{0}'")]
    EndpointNotFound(String),

    #[error("Rackspace API returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("No resource can be named '{0}'")]
    InvalidId(String),
}

pub type Result<T> = std::result::Result<T, RackspaceError>;

impl From<RackspaceError> for DriverError {
    fn from(err: RackspaceError) -> Self {
        match err {
            RackspaceError::Api { status, message } => DriverError::new(status, message),
            // Such a name never reaches the API; answer as the API would
            RackspaceError::InvalidId(_) => DriverError::new(404, err.to_string()),
            RackspaceError::Http(ref e) => match e.status() {
                Some(status) => DriverError::new(status.as_u16(), e.to_string()),
                None if e.is_builder() => DriverError::permanent(err.to_string()),
                None => DriverError::transport(err.to_string()),
            },
            RackspaceError::EndpointNotFound(_)
            | RackspaceError::InvalidConfig(_)
            | RackspaceError::JsonError(_) => DriverError::permanent(err.to_string()),
        }
    }
}
