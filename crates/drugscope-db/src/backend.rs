//! Backend trait: the read-only query surface the aggregators consume.

use async_trait::async_trait;
use drugscope_common::DrugIdentity;

use crate::error::Result;
use crate::rows::{CandidateQuery, CandidateRow, DetailRow, InteractionLookup, PropertyLookup};

/// Read-only access to the drug store.
///
/// Implementations acquire a connection per call and release it before
/// returning, on success and on error alike. Identity lookups compare the
/// stored name after trimming, whitespace collapsing and case-folding.
#[async_trait]
pub trait DrugBackend: Send + Sync {
    /// Trivial round trip used as the liveness probe.
    async fn ping(&self) -> Result<()>;

    /// At most `query.limit` distinct names ordered by phase descending
    /// (unknown last), then name ascending by byte order.
    async fn candidates(&self, query: &CandidateQuery) -> Result<Vec<CandidateRow>>;

    /// `None` when the identity does not exist.
    async fn drug_detail(&self, identity: &DrugIdentity) -> Result<Option<DetailRow>>;

    /// `None` when the identity does not exist.
    async fn drug_properties(&self, identity: &DrugIdentity) -> Result<Option<PropertyLookup>>;

    /// Other drugs sharing a mechanism with `identity`, at most `limit` raw rows.
    /// `None` when the identity does not exist.
    async fn drug_interactions(
        &self,
        identity: &DrugIdentity,
        limit: usize,
    ) -> Result<Option<InteractionLookup>>;

    /// `(table, column)` pairs visible for the relations in the schema contract.
    async fn schema_columns(&self) -> Result<Vec<(String, String)>>;
}
