//! Run command implementation

use clap::Args;
use portfolio_core::{AppConfig, PortfolioError, StoreBackend};
use portfolio_runtime::Runtime;
use tracing::info;

/// Run command arguments
#[derive(Args, Debug)]
pub struct RunCommand {
    /// Override server port
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Keep data in memory instead of MongoDB
    #[arg(long)]
    pub memory: bool,
}

impl RunCommand {
    /// Apply command-line overrides to the loaded configuration
    pub fn apply(&self, config: AppConfig) -> AppConfig {
        let backend = self.memory.then_some(StoreBackend::Memory);
        config.with_port(self.port).with_backend(backend)
    }

    /// Execute the run command
    pub async fn execute(&self, config: AppConfig) -> Result<(), PortfolioError> {
        let config = self.apply(config);
        info!(
            "Starting portfolio server on port {} ({} store)",
            config.server.port, config.database.backend
        );

        let runtime = Runtime::new(config);
        runtime.run().await?;

        Ok(())
    }
}
