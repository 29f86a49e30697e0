use chrono::NaiveDateTime;
use std::future::Future;
use std::sync::Arc;
use tracing::{error, info};

use super::cache::RefreshCache;
use super::errors::OrderError;
use super::repository::{OrderStore, SqliteOrderRepository};
use super::retry::StoreRetryHandler;
use super::timestamps::parse_timestamp;
use super::types::{CommandOutcome, NewOrder, Order};
use crate::config::WorkshopYardConfig;
use crate::database::{DatabaseManager, OpenMode};
use crate::observability::{OperationTimer, StoreMetrics};
use crate::workflows::WorkflowPolicy;

/// Query/command API consumed by the presentation layer.
///
/// Owns the board cache; every successful command invalidates it and
/// reports `invalidate = true` so views can re-query. Cloning is cheap and
/// clones share the cache, the metrics and the connection pool.
#[derive(Clone)]
pub struct OrderService {
    store: Arc<dyn OrderStore>,
    policy: Arc<WorkflowPolicy>,
    cache: RefreshCache,
    retry: StoreRetryHandler,
    metrics: Arc<StoreMetrics>,
    database: Option<DatabaseManager>,
}

impl OrderService {
    pub fn new(
        store: Arc<dyn OrderStore>,
        policy: Arc<WorkflowPolicy>,
        cache: RefreshCache,
        retry: StoreRetryHandler,
    ) -> Self {
        Self {
            store,
            policy,
            cache,
            retry,
            metrics: Arc::new(StoreMetrics::new()),
            database: None,
        }
    }

    /// Open an existing store; a missing store is fatal
    pub async fn open(config: &WorkshopYardConfig) -> Result<Self, OrderError> {
        Self::open_with_mode(config, OpenMode::ExistingOnly).await
    }

    pub async fn open_with_mode(
        config: &WorkshopYardConfig,
        mode: OpenMode,
    ) -> Result<Self, OrderError> {
        let policy = Arc::new(WorkflowPolicy::new(config.workflow.statuses.clone())?);
        let database = DatabaseManager::open(&config.database, mode).await?;
        let repository = SqliteOrderRepository::new(database.pool().clone(), policy.clone());

        let mut service = Self::new(
            Arc::new(repository),
            policy,
            RefreshCache::new(config.cache.ttl()),
            StoreRetryHandler::new(config.retry.clone()),
        );
        service.database = Some(database);
        Ok(service)
    }

    pub fn policy(&self) -> &WorkflowPolicy {
        &self.policy
    }

    pub fn metrics(&self) -> &StoreMetrics {
        &self.metrics
    }

    /// Active orders in board order, served from the cache while fresh
    pub async fn list_active(&self) -> Result<Arc<Vec<Order>>, OrderError> {
        if let Some(snapshot) = self.cache.get().await {
            self.metrics.record_board_read(true);
            return Ok(snapshot);
        }
        self.load_active().await
    }

    /// Force refresh: drop the cached snapshot and re-query
    pub async fn refresh(&self) -> Result<Arc<Vec<Order>>, OrderError> {
        self.cache.invalidate().await;
        self.load_active().await
    }

    async fn load_active(&self) -> Result<Arc<Vec<Order>>, OrderError> {
        let generation = self.cache.generation();
        let orders = self
            .retry
            .execute_with_retry("list_active", || self.store.list_active())
            .await
            .inspect_err(|e| error!(error = %e, "Failed to load board"))?;

        let orders = Arc::new(orders);
        self.cache.store(orders.clone(), generation).await;
        self.metrics.record_board_read(false);
        Ok(orders)
    }

    /// Every order, completed ones included; never cached
    pub async fn list_all(&self) -> Result<Vec<Order>, OrderError> {
        self.retry
            .execute_with_retry("list_all", || self.store.list_all())
            .await
    }

    pub async fn get(&self, order_number: &str) -> Result<Order, OrderError> {
        self.retry
            .execute_with_retry("get", || self.store.get(order_number))
            .await
    }

    pub async fn create(&self, new_order: NewOrder) -> Result<CommandOutcome<Order>, OrderError> {
        let new_order = &new_order;
        let order = self
            .run_command("create", || self.store.create(new_order))
            .await?;
        let message = format!("Order {} registered", order.order_number);
        Ok(CommandOutcome::changed(order, message))
    }

    pub async fn set_status(
        &self,
        order_number: &str,
        status: &str,
    ) -> Result<CommandOutcome<()>, OrderError> {
        if !self.policy.contains(status) {
            self.metrics.record_command(false);
            return Err(OrderError::InvalidStatus(status.to_string()));
        }

        self.run_command("set_status", || self.store.set_status(order_number, status))
            .await?;
        Ok(CommandOutcome::changed(
            (),
            format!("Order {order_number} moved to {status}"),
        ))
    }

    pub async fn toggle_departure_flag(
        &self,
        order_number: &str,
    ) -> Result<CommandOutcome<bool>, OrderError> {
        let departing = self
            .run_command("toggle_departure_flag", || {
                self.store.toggle_departure_flag(order_number)
            })
            .await?;

        let message = if departing {
            format!("Order {order_number} marked to leave today")
        } else {
            format!("Order {order_number} staying in the yard")
        };
        Ok(CommandOutcome::changed(departing, message))
    }

    pub async fn set_scheduled_completion(
        &self,
        order_number: &str,
        scheduled: Option<NaiveDateTime>,
    ) -> Result<CommandOutcome<()>, OrderError> {
        self.run_command("set_scheduled_completion", || {
            self.store.set_scheduled_completion(order_number, scheduled)
        })
        .await?;

        let message = match scheduled {
            Some(at) => format!("Order {order_number} due {}", at.format("%Y-%m-%d %H:%M")),
            None => format!("Order {order_number} estimate cleared"),
        };
        Ok(CommandOutcome::changed((), message))
    }

    /// Same as [`set_scheduled_completion`](Self::set_scheduled_completion),
    /// taking the estimate as typed by staff
    pub async fn schedule_from_text(
        &self,
        order_number: &str,
        text: &str,
    ) -> Result<CommandOutcome<()>, OrderError> {
        let scheduled =
            parse_timestamp(text).ok_or_else(|| OrderError::InvalidSchedule(text.to_string()))?;
        self.set_scheduled_completion(order_number, Some(scheduled))
            .await
    }

    async fn run_command<T, F, Fut>(&self, name: &str, operation: F) -> Result<T, OrderError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, OrderError>>,
    {
        let timer = OperationTimer::new(name);
        let result = self.retry.execute_with_retry(name, operation).await;
        self.metrics.record_command(result.is_ok());
        timer.finish();

        match &result {
            Ok(_) => self.cache.invalidate().await,
            Err(e) if e.is_user_facing() => info!(command = name, outcome = %e, "Command rejected"),
            Err(e) => error!(command = name, error = %e, "Command failed"),
        }
        result
    }

    /// Close the connection pool, if this service opened one
    pub async fn shutdown(&self) {
        self.metrics.log_stats();
        if let Some(database) = &self.database {
            database.shutdown().await;
        }
    }
}
