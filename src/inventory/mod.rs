pub mod client;
pub mod stats;
pub mod stock;

pub use client::{InventoryClient, PartDraft};
pub use stats::{filter_parts, DashboardStats};
pub use stock::{apply_delta, parse_delta, parse_price, parse_quantity, valid_price, StockOperation};
