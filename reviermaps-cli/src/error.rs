//! CLI error handling with user-friendly messages.

use reviermaps::service::ServiceError;
use std::fmt;
use std::process;

/// CLI-specific errors.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(String),
    /// Invalid command-line input
    InvalidInput(String),
    /// Failed to create or drive the service
    Service(ServiceError),
}

impl CliError {
    /// Exit the process with an error message and a non-zero code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);
        process::exit(1)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(msg) => write!(f, "Failed to initialize logging: {}", msg),
            CliError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            CliError::Service(e) => write!(f, "{}", e),
        }
    }
}

impl From<ServiceError> for CliError {
    fn from(e: ServiceError) -> Self {
        CliError::Service(e)
    }
}
