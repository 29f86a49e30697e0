use anyhow::Result;
use std::path::PathBuf;

use crate::cli::commands::Command;
use crate::config::WorkshopYardConfig;
use crate::database::OpenMode;
use crate::orders::OrderService;

/// Create the store file and schema; the only command allowed to create it
pub struct InitCommand {
    config: WorkshopYardConfig,
    write_config: Option<PathBuf>,
}

impl InitCommand {
    pub fn new(config: WorkshopYardConfig, write_config: Option<PathBuf>) -> Self {
        Self {
            config,
            write_config,
        }
    }
}

impl Command for InitCommand {
    async fn execute(&self) -> Result<()> {
        println!("⚙️  Initializing workshop yard store...");

        let service = OrderService::open_with_mode(&self.config, OpenMode::CreateIfMissing).await?;
        let active = service.list_active().await?.len();
        service.shutdown().await;

        println!("✅ Store ready at {}", self.config.database.path);
        println!("   🚚 {} active orders", active);

        if let Some(path) = &self.write_config {
            self.config.save_to_file(path)?;
            println!("   📝 Configuration written to {}", path.display());
        }

        Ok(())
    }
}
