use thiserror::Error;

#[derive(Error, Debug)]
pub enum CloudError {
    #[error("Object store error: {0}")]
    ObjectStore(#[from] object_store::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Runtime error: {0}")]
    Runtime(String),

    #[error("Invalid connection string: {0}")]
    InvalidConnectionString(String),

    #[error("Invalid remote name: {0}")]
    InvalidName(String),
}

pub type Result<T> = std::result::Result<T, CloudError>;
