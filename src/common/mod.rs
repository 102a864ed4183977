pub mod error;
pub mod event;
pub mod money;
pub mod quantity;
