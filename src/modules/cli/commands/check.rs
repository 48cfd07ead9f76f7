//! Check command implementation

use clap::Args;
use portfolio_core::{AppConfig, PortfolioError};
use portfolio_runtime::StoreManager;
use tracing::info;

/// Check command arguments
#[derive(Args, Debug)]
pub struct CheckCommand {}

impl CheckCommand {
    /// Connect to the configured store and ping it
    pub async fn execute(&self, config: AppConfig) -> Result<(), PortfolioError> {
        let database = &config.database;
        info!("Checking {} store at {}", database.backend, database.target());

        let manager = StoreManager::new(database.ready_timeout());
        manager.initialize(database).await?;
        let store_type = manager.health_check().await?;
        manager.close().await?;

        info!("{} store at {} is reachable", store_type, database.target());
        Ok(())
    }
}
