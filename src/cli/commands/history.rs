use anyhow::Result;

use crate::cli::commands::{with_order_service, Command};
use crate::config::WorkshopYardConfig;
use crate::orders::timestamps::format_timestamp;

pub struct HistoryCommand {
    config: WorkshopYardConfig,
    json: bool,
}

impl HistoryCommand {
    pub fn new(config: WorkshopYardConfig) -> Self {
        Self {
            config,
            json: false,
        }
    }

    pub fn with_json(mut self, json: bool) -> Self {
        self.json = json;
        self
    }
}

impl Command for HistoryCommand {
    async fn execute(&self) -> Result<()> {
        with_order_service(&self.config, |service| async move {
            let orders = service.list_all().await?;

            if self.json {
                println!("{}", serde_json::to_string_pretty(&orders)?);
                return Ok(());
            }

            println!("📚 {} orders on record", orders.len());
            for order in &orders {
                let completed = order
                    .completed_at
                    .map(format_timestamp)
                    .unwrap_or_else(|| "-".to_string());
                println!(
                    "  OS {} • {} • {} | {} | created {} | completed {}",
                    order.order_number,
                    order.plate,
                    order.customer,
                    order.status,
                    format_timestamp(order.created_at),
                    completed
                );
            }
            Ok(())
        })
        .await
    }
}
