use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum DomainError {
    #[error("Invalid IP address: {0}")]
    InvalidIpAddress(String),

    #[error("Invalid name pattern '{0}': {1}")]
    InvalidPattern(String, String),

    #[error("Invalid domain entry: {0}")]
    InvalidEntry(String),
}
