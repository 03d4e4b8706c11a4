//! crm-server: HTTP backend for the CRM core service
//!
//! Exposes CRUD endpoints for accounts, contacts, opportunities, notes
//! and users over PostgreSQL, with bearer-token authentication on every
//! route except health and login.

pub mod auth;
pub mod config;
pub mod db;
pub mod http;
pub mod models;

pub use config::{AppConfig, ConfigError, DatabaseConfig};
pub use http::{build_router, run_server, AppState, ServerConfig};
