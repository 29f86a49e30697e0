use anyhow::Result;

use crate::cli::commands::{print_outcome, with_order_service, Command};
use crate::config::WorkshopYardConfig;

pub struct DepartCommand {
    config: WorkshopYardConfig,
    order_number: String,
}

impl DepartCommand {
    pub fn new(config: WorkshopYardConfig, order_number: String) -> Self {
        Self {
            config,
            order_number,
        }
    }
}

impl Command for DepartCommand {
    async fn execute(&self) -> Result<()> {
        with_order_service(&self.config, |service| async move {
            let outcome = service.toggle_departure_flag(&self.order_number).await?;
            print_outcome(&outcome);
            Ok(())
        })
        .await
    }
}
