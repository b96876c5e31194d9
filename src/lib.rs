pub mod api;
pub mod channel;
pub mod config;
pub mod error;
pub mod models;
pub mod notify;
pub mod repositories;
pub mod services;
