//! HTTP handlers for all API routes.

pub mod drugs;
pub mod health;
