//! drugscope-test-utils: in-memory backend, fixtures and assertion helpers.

pub mod assertions;
pub mod backend;
pub mod fixtures;

pub use backend::{mechanism, molecule, Fault, InMemoryBackend, MechanismFixture, Operation};
pub use fixtures::chembl_sample;
