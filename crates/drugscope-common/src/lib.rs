//! Shared types, errors and identity handling for the drugscope crates.

pub mod error;
pub mod entities;
pub mod identity;

// Re-export commonly used types
pub use error::{ErrorKind, QueryError, QueryResult};
pub use entities::{
    ActionType, AdministrationRoute, Chirality, DrugCandidate, DrugDetail, DrugLikeness,
    DrugProperties, InteractionRecord, LipinskiProfile, MolecularTarget, Phase,
};
pub use identity::{normalize_name, DrugIdentity, SearchTerm};
