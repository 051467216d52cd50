pub mod backend;
pub mod compress;
pub mod config;
pub mod error;
pub mod http_client;
pub mod inventory;
pub mod middleware;
pub mod models;
pub mod services;
pub mod session;
pub mod storage;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use inventory::InventoryClient;
pub use middleware::Identity;
