use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use std::cmp::Ordering;
use std::sync::Arc;
use tracing::{debug, info};

use super::errors::OrderError;
use super::timestamps::{format_timestamp, now, parse_timestamp};
use super::types::{NewOrder, Order};
use crate::workflows::WorkflowPolicy;

const ORDER_COLUMNS: &str = "order_number, plate, customer, status, scheduled_completion, note, \
     created_at, last_modified_at, completed_at, same_day_departure";

/// Typed query/command layer over the order store.
///
/// Every mutation is a single statement against one row, so a concurrent
/// reader sees either the old row or the new one.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Orders not in the terminal stage, in board order
    async fn list_active(&self) -> Result<Vec<Order>, OrderError>;

    /// Every order ever registered, completed ones included, in board order
    async fn list_all(&self) -> Result<Vec<Order>, OrderError>;

    async fn get(&self, order_number: &str) -> Result<Order, OrderError>;

    async fn create(&self, new_order: &NewOrder) -> Result<Order, OrderError>;

    async fn set_status(&self, order_number: &str, status: &str) -> Result<(), OrderError>;

    /// Flip the same-day-departure flag and return its new value
    async fn toggle_departure_flag(&self, order_number: &str) -> Result<bool, OrderError>;

    async fn set_scheduled_completion(
        &self,
        order_number: &str,
        scheduled: Option<NaiveDateTime>,
    ) -> Result<(), OrderError>;
}

/// SQLite-backed order repository
#[derive(Debug, Clone)]
pub struct SqliteOrderRepository {
    pool: SqlitePool,
    policy: Arc<WorkflowPolicy>,
}

impl SqliteOrderRepository {
    pub fn new(pool: SqlitePool, policy: Arc<WorkflowPolicy>) -> Self {
        Self { pool, policy }
    }

    pub fn policy(&self) -> &WorkflowPolicy {
        &self.policy
    }
}

#[async_trait]
impl OrderStore for SqliteOrderRepository {
    async fn list_active(&self) -> Result<Vec<Order>, OrderError> {
        let rows = sqlx::query(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE status != ?1"
        ))
        .bind(self.policy.terminal())
        .fetch_all(&self.pool)
        .await?;

        let mut orders = rows
            .iter()
            .map(order_from_row)
            .collect::<Result<Vec<_>, _>>()?;
        sort_for_board(&self.policy, &mut orders);

        debug!("Loaded {} active orders", orders.len());
        Ok(orders)
    }

    async fn list_all(&self) -> Result<Vec<Order>, OrderError> {
        let rows = sqlx::query(&format!("SELECT {ORDER_COLUMNS} FROM orders"))
            .fetch_all(&self.pool)
            .await?;

        let mut orders = rows
            .iter()
            .map(order_from_row)
            .collect::<Result<Vec<_>, _>>()?;
        sort_for_board(&self.policy, &mut orders);
        Ok(orders)
    }

    async fn get(&self, order_number: &str) -> Result<Order, OrderError> {
        let row = sqlx::query(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE order_number = ?1"
        ))
        .bind(order_number)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => order_from_row(&row),
            None => Err(OrderError::NotFound(order_number.to_string())),
        }
    }

    async fn create(&self, new_order: &NewOrder) -> Result<Order, OrderError> {
        let order_number = required(&new_order.order_number, "order number")?;
        let plate = required(&new_order.plate, "plate")?.to_uppercase();
        let customer = required(&new_order.customer, "customer")?;
        let note = new_order
            .note
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string);

        let created_at = now();
        let stamp = format_timestamp(created_at);

        sqlx::query(
            r#"
            INSERT INTO orders
                (order_number, plate, customer, status, note,
                 created_at, last_modified_at, same_day_departure)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6, 0)
            "#,
        )
        .bind(order_number)
        .bind(&plate)
        .bind(customer)
        .bind(self.policy.first())
        .bind(&note)
        .bind(&stamp)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            let duplicate = e
                .as_database_error()
                .is_some_and(|db_err| db_err.is_unique_violation());
            if duplicate {
                OrderError::Duplicate(order_number.to_string())
            } else {
                OrderError::from(e)
            }
        })?;

        info!(order_number, plate = %plate, "Registered order");

        Ok(Order {
            order_number: order_number.to_string(),
            plate,
            customer: customer.to_string(),
            status: self.policy.first().to_string(),
            scheduled_completion: None,
            note,
            created_at,
            last_modified_at: created_at,
            completed_at: None,
            same_day_departure: false,
        })
    }

    async fn set_status(&self, order_number: &str, status: &str) -> Result<(), OrderError> {
        if !self.policy.contains(status) {
            return Err(OrderError::InvalidStatus(status.to_string()));
        }

        // A repeated move to the terminal stage keeps the first completion time
        let result = sqlx::query(
            r#"
            UPDATE orders SET
                completed_at = CASE
                    WHEN ?1 = ?2 THEN
                        CASE WHEN status = ?2 AND completed_at IS NOT NULL
                             THEN completed_at ELSE ?3 END
                    ELSE NULL
                END,
                status = ?1,
                last_modified_at = ?3
            WHERE order_number = ?4
            "#,
        )
        .bind(status)
        .bind(self.policy.terminal())
        .bind(format_timestamp(now()))
        .bind(order_number)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(OrderError::NotFound(order_number.to_string()));
        }

        info!(order_number, status, "Order status changed");
        Ok(())
    }

    async fn toggle_departure_flag(&self, order_number: &str) -> Result<bool, OrderError> {
        let flag: Option<i64> = sqlx::query_scalar(
            r#"
            UPDATE orders SET
                same_day_departure = NOT same_day_departure,
                last_modified_at = ?1
            WHERE order_number = ?2
            RETURNING same_day_departure
            "#,
        )
        .bind(format_timestamp(now()))
        .bind(order_number)
        .fetch_optional(&self.pool)
        .await?;

        let departing = flag
            .map(|value| value != 0)
            .ok_or_else(|| OrderError::NotFound(order_number.to_string()))?;

        info!(order_number, departing, "Same-day departure toggled");
        Ok(departing)
    }

    async fn set_scheduled_completion(
        &self,
        order_number: &str,
        scheduled: Option<NaiveDateTime>,
    ) -> Result<(), OrderError> {
        let result = sqlx::query(
            r#"
            UPDATE orders SET
                scheduled_completion = ?1,
                last_modified_at = ?2
            WHERE order_number = ?3
            "#,
        )
        .bind(scheduled.map(format_timestamp))
        .bind(format_timestamp(now()))
        .bind(order_number)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(OrderError::NotFound(order_number.to_string()));
        }

        info!(order_number, scheduled = ?scheduled, "Scheduled completion updated");
        Ok(())
    }
}

fn required<'a>(value: &'a str, field: &'static str) -> Result<&'a str, OrderError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(OrderError::Validation { field })
    } else {
        Ok(trimmed)
    }
}

fn order_from_row(row: &SqliteRow) -> Result<Order, OrderError> {
    let order_number: String = row.try_get("order_number")?;

    let timestamp = |field: &'static str, raw: String| {
        parse_timestamp(&raw).ok_or_else(|| OrderError::CorruptRow {
            order: order_number.clone(),
            field,
        })
    };

    let created_at = timestamp("created_at", row.try_get("created_at")?)?;
    let last_modified_at = timestamp("last_modified_at", row.try_get("last_modified_at")?)?;
    let completed_at = match row.try_get::<Option<String>, _>("completed_at")? {
        Some(raw) if !raw.trim().is_empty() => Some(timestamp("completed_at", raw)?),
        _ => None,
    };
    let same_day_departure: i64 = row.try_get("same_day_departure")?;

    Ok(Order {
        plate: row.try_get("plate")?,
        customer: row.try_get("customer")?,
        status: row.try_get("status")?,
        scheduled_completion: row.try_get("scheduled_completion")?,
        note: row.try_get("note")?,
        created_at,
        last_modified_at,
        completed_at,
        same_day_departure: same_day_departure != 0,
        order_number,
    })
}

/// Board order: stage rank, then scheduled completion with missing
/// estimates last, then order number.
pub fn sort_for_board(policy: &WorkflowPolicy, orders: &mut [Order]) {
    orders.sort_by(|a, b| {
        policy
            .sort_rank(&a.status)
            .cmp(&policy.sort_rank(&b.status))
            .then_with(|| compare_schedule(a.scheduled_at(), b.scheduled_at()))
            .then_with(|| a.order_number.cmp(&b.order_number))
    });
}

fn compare_schedule(a: Option<NaiveDateTime>, b: Option<NaiveDateTime>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
