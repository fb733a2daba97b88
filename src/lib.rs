pub mod ai;
pub mod app;
pub mod auth;
pub mod chat;
pub mod config;
pub mod error;
pub mod insights;
pub mod meals;
pub mod medications;
pub mod scores;
pub mod state;
pub mod store;
pub mod symptoms;
