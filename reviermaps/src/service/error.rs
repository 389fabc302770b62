//! Service error types.

use crate::backend::BackendError;
use crate::cache::CacheError;
use crate::coord::CoordError;
use std::fmt;

/// Errors surfaced by service maintenance operations.
///
/// Request-serving paths never return these; they degrade to fallbacks.
/// Only setup, activation and explicit cache management can fail loudly.
#[derive(Debug)]
pub enum ServiceError {
    /// Cache store failure during setup or maintenance
    Cache(CacheError),
    /// Backend transport failure outside the degradable request paths
    Backend(BackendError),
    /// Invalid geographic input (bounds, zoom range)
    Coord(CoordError),
    /// Invalid configuration
    Config(String),
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cache(e) => write!(f, "Cache error: {}", e),
            Self::Backend(e) => write!(f, "Backend error: {}", e),
            Self::Coord(e) => write!(f, "Coordinate error: {}", e),
            Self::Config(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl std::error::Error for ServiceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Cache(e) => Some(e),
            Self::Backend(e) => Some(e),
            Self::Coord(e) => Some(e),
            Self::Config(_) => None,
        }
    }
}

impl From<CacheError> for ServiceError {
    fn from(e: CacheError) -> Self {
        Self::Cache(e)
    }
}

impl From<BackendError> for ServiceError {
    fn from(e: BackendError) -> Self {
        Self::Backend(e)
    }
}

impl From<CoordError> for ServiceError {
    fn from(e: CoordError) -> Self {
        Self::Coord(e)
    }
}
