//! Shared service construction for CLI commands.

use crate::error::CliError;
use reviermaps::backend::ReqwestClient;
use reviermaps::cache::{DiskCacheStore, DiskStoreConfig};
use reviermaps::network::NetworkMonitor;
use reviermaps::service::{OfflineMapService, ServiceConfig, ServiceError};
use std::sync::Arc;

/// Build a service against the real backend and the on-disk cache.
pub async fn build_service(
    origin: &str,
) -> Result<OfflineMapService<ReqwestClient, DiskCacheStore>, CliError> {
    let client = Arc::new(ReqwestClient::new().map_err(ServiceError::Backend)?);
    let store = Arc::new(DiskCacheStore::new(DiskStoreConfig::default()).map_err(ServiceError::Cache)?);
    let monitor = Arc::new(NetworkMonitor::default());

    let config = ServiceConfig::default().with_origin(origin);
    let service = OfflineMapService::new(config, client, store, monitor).await?;
    service.activate().await?;
    Ok(service)
}
