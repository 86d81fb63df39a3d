pub mod accounts;
pub mod bidding;
pub mod config;
pub mod database;
pub mod error;
pub mod forms;
pub mod handlers;
pub mod query;
pub mod router;
pub mod store;
pub mod views;
