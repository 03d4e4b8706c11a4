//! Database layer - connection pool, schema and repositories
//!
//! - One `PgPool` shared by every request; no connection-level locking
//! - Lists page in SQL and count with a window function
//! - Multi-statement writes go through [`pool::with_transaction`]

pub mod migrations;
pub mod pool;
pub mod repos;

pub use pool::{connect, health_check, with_transaction, ConnectError, PoolStatus};
pub use repos::*;
