use anyhow::Result;

use crate::cli::commands::Command;
use crate::config::WorkshopYardConfig;
use crate::workflows::WorkflowPolicy;

pub struct StagesCommand {
    config: WorkshopYardConfig,
}

impl StagesCommand {
    pub fn new(config: WorkshopYardConfig) -> Self {
        Self { config }
    }
}

impl Command for StagesCommand {
    async fn execute(&self) -> Result<()> {
        let policy = WorkflowPolicy::new(self.config.workflow.statuses.clone())?;
        println!("🔧 Workflow stages:");
        for (rank, stage) in policy.stages().iter().enumerate() {
            let marker = if policy.is_terminal(stage) { " (terminal)" } else { "" };
            println!("  {}. {}{}", rank + 1, stage, marker);
        }
        Ok(())
    }
}
