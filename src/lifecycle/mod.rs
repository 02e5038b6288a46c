//! Orchestration: starting, wiring and stopping the actors.

pub mod shop_system;

pub use shop_system::ShopSystem;
