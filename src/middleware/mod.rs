pub mod auth;

pub use auth::{AuthLayer, Claims, Identity};
