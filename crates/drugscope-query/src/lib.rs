//! Drugscope query layer: search resolution and per-drug aggregation.
//!
//! Every public operation returns a typed [`QueryResult`](drugscope_common::QueryResult);
//! backend error text stays in the logs.

pub mod details;
pub mod explorer;
pub mod interactions;
pub mod properties;
pub mod search;

pub use details::DetailAggregator;
pub use explorer::{DrugExplorer, DrugProfile};
pub use interactions::{collate_interactions, InteractionAggregator};
pub use properties::PropertyAggregator;
pub use search::{rank_candidates, SearchResolver};
