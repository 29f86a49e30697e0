use anyhow::Result;

use crate::cli::commands::{print_outcome, with_order_service, Command};
use crate::config::WorkshopYardConfig;
use crate::orders::NewOrder;

pub struct CreateCommand {
    config: WorkshopYardConfig,
    new_order: NewOrder,
}

impl CreateCommand {
    pub fn new(
        config: WorkshopYardConfig,
        order_number: String,
        plate: String,
        customer: String,
        note: Option<String>,
    ) -> Self {
        Self {
            config,
            new_order: NewOrder {
                order_number,
                plate,
                customer,
                note,
            },
        }
    }
}

impl Command for CreateCommand {
    async fn execute(&self) -> Result<()> {
        with_order_service(&self.config, |service| async move {
            let outcome = service.create(self.new_order.clone()).await?;
            print_outcome(&outcome);
            println!(
                "   🚗 {} • {} • {}",
                outcome.value.plate, outcome.value.customer, outcome.value.status
            );
            Ok(())
        })
        .await
    }
}
