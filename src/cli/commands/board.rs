use anyhow::Result;
use chrono::NaiveDateTime;
use serde::Serialize;
use std::fmt::{self, Write as _};
use std::time::Duration;

use crate::cli::commands::{with_order_service, Command};
use crate::config::WorkshopYardConfig;
use crate::orders::timestamps::now;
use crate::orders::Order;
use crate::urgency::Urgency;
use crate::workflows::WorkflowPolicy;

pub struct BoardCommand {
    config: WorkshopYardConfig,
    json: bool,
    watch: Option<u64>,
}

/// One board row: the stored order plus urgency evaluated at render time
#[derive(Debug, Serialize)]
pub struct BoardEntry<'a> {
    #[serde(flatten)]
    pub order: &'a Order,
    pub urgency: Urgency,
    pub urgency_color: &'static str,
}

impl BoardCommand {
    pub fn new(config: WorkshopYardConfig) -> Self {
        Self {
            config,
            json: false,
            watch: None,
        }
    }

    pub fn with_json(mut self, json: bool) -> Self {
        self.json = json;
        self
    }

    pub fn with_watch(mut self, watch: Option<u64>) -> Self {
        self.watch = watch;
        self
    }
}

impl Command for BoardCommand {
    async fn execute(&self) -> Result<()> {
        with_order_service(&self.config, |service| async move {
            let Some(interval) = self.watch else {
                let orders = service.list_active().await?;
                self.print(service.policy(), &orders)?;
                return Ok(());
            };

            let interval = Duration::from_secs(interval.max(1));
            loop {
                // reads inside the cache window are served without touching the store
                let orders = service.list_active().await?;
                self.print(service.policy(), &orders)?;

                tokio::select! {
                    _ = tokio::signal::ctrl_c() => break,
                    _ = tokio::time::sleep(interval) => {}
                }
            }
            Ok(())
        })
        .await
    }
}

impl BoardCommand {
    fn print(&self, policy: &WorkflowPolicy, orders: &[Order]) -> Result<()> {
        let now = now();
        if self.json {
            println!("{}", serde_json::to_string_pretty(&board_entries(orders, now))?);
        } else {
            print!("{}", render_board(policy, orders, now)?);
        }
        Ok(())
    }
}

pub fn board_entries(orders: &[Order], now: NaiveDateTime) -> Vec<BoardEntry<'_>> {
    orders
        .iter()
        .map(|order| {
            let urgency = order.urgency(now);
            BoardEntry {
                order,
                urgency,
                urgency_color: urgency.color_hex(),
            }
        })
        .collect()
}

/// Text board: a vehicle count, then one section per non-empty stage
pub fn render_board(
    policy: &WorkflowPolicy,
    orders: &[Order],
    now: NaiveDateTime,
) -> Result<String, fmt::Error> {
    let mut out = String::new();
    writeln!(out, "🚚 {} vehicles in the yard", orders.len())?;

    for stage in policy.active_stages() {
        let in_stage: Vec<&Order> = orders.iter().filter(|o| &o.status == stage).collect();
        render_section(&mut out, stage, &in_stage, now)?;
    }

    let unknown: Vec<&Order> = orders.iter().filter(|o| !policy.contains(&o.status)).collect();
    render_section(&mut out, "unrecognised stage", &unknown, now)?;

    Ok(out)
}

fn render_section(
    out: &mut String,
    title: &str,
    orders: &[&Order],
    now: NaiveDateTime,
) -> fmt::Result {
    if orders.is_empty() {
        return Ok(());
    }
    writeln!(out)?;
    writeln!(out, "## {} ({})", title, orders.len())?;
    for order in orders {
        render_row(out, order, now)?;
    }
    Ok(())
}

fn render_row(out: &mut String, order: &Order, now: NaiveDateTime) -> fmt::Result {
    let departure = if order.same_day_departure {
        "LEAVES TODAY"
    } else {
        "In yard"
    };
    let due = order.scheduled_completion.as_deref().unwrap_or("No estimate");
    let urgency = order.urgency(now);

    writeln!(
        out,
        "  [{:<7}] OS {} • {} • {} | Due: {} | {}",
        urgency, order.order_number, order.plate, order.customer, due, departure
    )?;
    if let Some(note) = &order.note {
        writeln!(out, "            {}", note)?;
    }
    Ok(())
}
