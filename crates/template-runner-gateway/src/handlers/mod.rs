//! HTTP request handlers.

pub mod health;
pub mod templates;
