//! drugscope data layer
//!
//! Read-only access to a ChEMBL-style PostgreSQL store.
//!
//! # Layout
//!
//! - [`DrugBackend`]: the query surface, one method per aggregator need
//! - [`PgBackend`]: the PostgreSQL implementation over a deadpool pool
//! - [`ConnectionManager`]: liveness probing, call timeouts and error translation
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use drugscope_config::Config;
//! use drugscope_db::{ConnectionManager, PgBackend};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load()?;
//!     let backend = PgBackend::connect(&config.database, &config.pool, &config.query)?;
//!     let manager = ConnectionManager::new(Arc::new(backend), &config.query);
//!     manager.check_schema().await?;
//!     Ok(())
//! }
//! ```

pub mod backend;
pub mod error;
pub mod manager;
pub mod postgres;
pub mod rows;
pub mod schema;

pub use backend::DrugBackend;
pub use error::{DbError, Result};
pub use manager::{ConnectionManager, LinkState};
pub use postgres::PgBackend;
pub use rows::{
    CandidateFilter, CandidateQuery, CandidateRow, DetailRow, InteractionLookup, InteractionRow,
    PropertyLookup, PropertyRow,
};
pub use schema::{
    POPULAR_MIN_PHASE, TABLE_COMPOUND_PROPERTIES, TABLE_DRUG_MECHANISM,
    TABLE_MOLECULE_DICTIONARY, TABLE_TARGET_DICTIONARY,
};
