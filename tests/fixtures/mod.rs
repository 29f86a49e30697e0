//! Shared setup for the store-backed integration tests

use anyhow::Result;
use tempfile::TempDir;

use workshop_yard::{OpenMode, OrderService, WorkshopYardConfig};

/// Configuration pointing at a fresh store file inside `temp_dir`
pub fn test_config(temp_dir: &TempDir) -> WorkshopYardConfig {
    let mut config = WorkshopYardConfig::default();
    config.database.path = temp_dir
        .path()
        .join("workshop_yard.db")
        .to_string_lossy()
        .into_owned();
    config.database.busy_timeout_ms = 5_000;
    config.retry.base_delay_ms = 10;
    config.retry.max_delay_ms = 50;
    config
}

/// A service session on the store, creating it on first use
pub async fn open_service(config: &WorkshopYardConfig) -> Result<OrderService> {
    Ok(OrderService::open_with_mode(config, OpenMode::CreateIfMissing).await?)
}
