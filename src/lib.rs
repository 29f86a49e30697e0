// Workshop Yard Library - shared service-order board
// This exposes the core components for the CLI, tests and other front ends

pub mod cli;
pub mod config;
pub mod database;
pub mod observability;
pub mod orders;
pub mod telemetry;
pub mod urgency;
pub mod workflows;

// Re-export key types for easy access
pub use config::WorkshopYardConfig;
pub use database::{DatabaseManager, OpenMode};
pub use observability::{StoreMetrics, StoreStats};
pub use orders::{CommandOutcome, NewOrder, Order, OrderError, OrderService, OrderStore};
pub use telemetry::{create_command_span, generate_correlation_id, init_telemetry};
pub use urgency::{urgency, Urgency};
pub use workflows::{PolicyError, WorkflowPolicy};
