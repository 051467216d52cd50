pub mod part;

pub use part::*;
