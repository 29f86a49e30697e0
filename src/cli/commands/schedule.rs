use anyhow::Result;

use crate::cli::commands::{print_outcome, with_order_service, Command};
use crate::config::WorkshopYardConfig;

pub struct ScheduleCommand {
    config: WorkshopYardConfig,
    order_number: String,
    /// `None` clears the estimate
    when: Option<String>,
}

impl ScheduleCommand {
    pub fn new(config: WorkshopYardConfig, order_number: String, when: Option<String>) -> Self {
        Self {
            config,
            order_number,
            when,
        }
    }
}

impl Command for ScheduleCommand {
    async fn execute(&self) -> Result<()> {
        with_order_service(&self.config, |service| async move {
            let outcome = match &self.when {
                Some(text) => service.schedule_from_text(&self.order_number, text).await?,
                None => {
                    service
                        .set_scheduled_completion(&self.order_number, None)
                        .await?
                }
            };
            print_outcome(&outcome);
            Ok(())
        })
        .await
    }
}
