//! Route handlers organized by resource

pub mod accounts;
pub mod admin;
pub mod auth;
pub mod contacts;
pub mod health;
pub mod notes;
pub mod opportunities;
pub mod users;

use serde::Serialize;

/// `{"message": ...}` body for deletes and association changes
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
