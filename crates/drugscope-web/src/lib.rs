//! Drugscope web API over the drug exploration query layer.
//!   - Drug search with ranked suggestions
//!   - Per-drug details, properties and interactions
//!   - Interaction network graph
//!   - Backend health

pub mod error;
pub mod handlers;
pub mod router;
pub mod state;
