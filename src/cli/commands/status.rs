use anyhow::Result;

use crate::cli::commands::{print_outcome, with_order_service, Command};
use crate::config::WorkshopYardConfig;

pub struct SetStatusCommand {
    config: WorkshopYardConfig,
    order_number: String,
    status: String,
}

impl SetStatusCommand {
    pub fn new(config: WorkshopYardConfig, order_number: String, status: String) -> Self {
        Self {
            config,
            order_number,
            status,
        }
    }
}

impl Command for SetStatusCommand {
    async fn execute(&self) -> Result<()> {
        with_order_service(&self.config, |service| async move {
            let outcome = service.set_status(&self.order_number, &self.status).await?;
            print_outcome(&outcome);
            if service.policy().is_terminal(&self.status) {
                println!("   🏁 Order left the board; see `workshop-yard history`");
            }
            Ok(())
        })
        .await
    }
}
