pub mod config;
pub mod error;
pub mod format;
pub mod handler;
pub mod http_client;
pub mod mock;
pub mod models;
pub mod odds_fetch;
