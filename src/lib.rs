pub mod app;
pub mod assistant;
pub mod auth;
pub mod config;
pub mod ledger;
pub mod meals;
pub mod state;
pub mod storage;
