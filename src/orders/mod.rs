// Service orders on the yard board
// The store is the single source of truth; rows are never deleted

pub mod cache;
pub mod errors;
pub mod repository;
pub mod retry;
pub mod service;
pub mod timestamps;
pub mod types;

pub use cache::RefreshCache;
pub use errors::OrderError;
pub use repository::{sort_for_board, OrderStore, SqliteOrderRepository};
pub use retry::StoreRetryHandler;
pub use service::OrderService;
pub use types::{CommandOutcome, NewOrder, Order};
