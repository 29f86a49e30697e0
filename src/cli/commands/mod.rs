use anyhow::Result;

use crate::config::WorkshopYardConfig;
use crate::orders::{CommandOutcome, OrderService};

pub mod board;
pub mod create;
pub mod depart;
pub mod history;
pub mod init;
pub mod schedule;
pub mod stages;
pub mod status;

#[allow(async_fn_in_trait)]
pub trait Command {
    async fn execute(&self) -> Result<()>;
}

/// Open the shared store, run `f`, and close the pool whatever `f` returned.
///
/// A store that cannot be opened aborts the command before anything is shown.
pub async fn with_order_service<F, Fut, R>(config: &WorkshopYardConfig, f: F) -> Result<R>
where
    F: FnOnce(OrderService) -> Fut,
    Fut: std::future::Future<Output = Result<R>>,
{
    let service = OrderService::open(config).await?;
    let result = f(service.clone()).await;
    service.shutdown().await;
    result
}

pub fn print_outcome<T>(outcome: &CommandOutcome<T>) {
    println!("✅ {}", outcome.message);
}
